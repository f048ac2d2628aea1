use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use config::{Config, ConfigBuilder, Environment, File, builder::DefaultState};
use serde::{Deserialize, Serialize};

use crate::gesture::UnlockGesture;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub schedule: ScheduleConfig,
    pub scheduler: SchedulerConfig,
    pub display: DisplayConfig,
    pub lock: LockConfig,
    pub gesture: GestureConfig,
    pub notification: NotificationConfig,
    pub ringer: RingerConfig,
}

/// Quiet-hours window. Hours are local wall-clock hours in `0..24`.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleConfig {
    pub enabled: bool,
    pub start_hour: u32,
    pub end_hour: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            start_hour: 22,
            end_hour: 7,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SchedulerConfig {
    pub tick_interval_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: 30,
        }
    }
}

/// Screen size in device-independent pixels, used to locate the drag origin.
#[derive(Debug, Deserialize, Clone)]
pub struct DisplayConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 800.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LockConfig {
    pub unlock_drag_distance: f32,
    pub blackout_taps: u32,
    pub brightness_step: f32,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            unlock_drag_distance: 200.0,
            blackout_taps: 3,
            brightness_step: 0.1,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GestureConfig {
    pub unlock_gesture: UnlockGesture,
    pub swipe_threshold: f32,
    pub tap_tolerance: f32,
    pub double_tap_window_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            unlock_gesture: UnlockGesture::SwipeRight,
            swipe_threshold: 150.0,
            tap_tolerance: 20.0,
            double_tap_window_ms: 400,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotificationConfig {
    pub enabled: bool,
    pub channel_id: String,
    pub channel_name: String,
    pub title: String,
    pub message: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            channel_id: "pocket_lock_channel".to_string(),
            channel_name: "Pocket Lock Controls".to_string(),
            title: "Pocket Lock Active".to_string(),
            message: "Tap here to open Controls (Lock/Screen Off)".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RingerBackend {
    /// In-memory device that starts in `Normal`.
    #[default]
    Simulated,
    /// No audio service; the scheduler stays inert.
    None,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RingerConfig {
    pub backend: RingerBackend,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            schedule: ScheduleConfig::default(),
            scheduler: SchedulerConfig::default(),
            display: DisplayConfig::default(),
            lock: LockConfig::default(),
            gesture: GestureConfig::default(),
            notification: NotificationConfig::default(),
            ringer: RingerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from defaults, `./config.toml`, the user config directory and the
    /// environment, in increasing priority.
    pub fn load() -> Result<Self> {
        // Load .env file (silently ignore if not present)
        let _ = dotenvy::dotenv();

        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pocket-lock");

        let builder = with_defaults(Config::builder())?
            .add_source(File::from(PathBuf::from("config.toml")).required(false))
            .add_source(File::from(config_dir.join("config.toml")).required(false))
            .add_source(Environment::with_prefix("POCKET_LOCK").separator("__"));

        finish(builder)
    }

    /// Load from defaults, one explicit file and the environment.
    pub fn load_from(path: &Path) -> Result<Self> {
        let builder = with_defaults(Config::builder())?
            .add_source(File::from(path.to_path_buf()).required(true))
            .add_source(Environment::with_prefix("POCKET_LOCK").separator("__"));

        finish(builder).with_context(|| format!("Failed to load {}", path.display()))
    }

    /// Reject values the components cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.schedule.start_hour > 23 || self.schedule.end_hour > 23 {
            bail!(
                "schedule hours must be within 0-23 (got {}-{})",
                self.schedule.start_hour,
                self.schedule.end_hour
            );
        }
        if self.scheduler.tick_interval_secs == 0 {
            bail!("scheduler.tick_interval_secs must be positive");
        }
        if !(self.lock.brightness_step > 0.0 && self.lock.brightness_step <= 1.0) {
            bail!(
                "lock.brightness_step must be within (0, 1], got {}",
                self.lock.brightness_step
            );
        }
        if self.lock.blackout_taps == 0 {
            bail!("lock.blackout_taps must be at least 1");
        }
        if self.display.width <= 0.0 || self.display.height <= 0.0 {
            bail!("display size must be positive");
        }
        Ok(())
    }
}

fn with_defaults(builder: ConfigBuilder<DefaultState>) -> Result<ConfigBuilder<DefaultState>> {
    Ok(builder
        // Schedule
        .set_default("schedule.enabled", false)?
        .set_default("schedule.start_hour", 22)?
        .set_default("schedule.end_hour", 7)?
        // Scheduler
        .set_default("scheduler.tick_interval_secs", 30)?
        // Display
        .set_default("display.width", 400.0)?
        .set_default("display.height", 800.0)?
        // Lock
        .set_default("lock.unlock_drag_distance", 200.0)?
        .set_default("lock.blackout_taps", 3)?
        .set_default("lock.brightness_step", 0.1)?
        // Gesture
        .set_default("gesture.unlock_gesture", "swipe-right")?
        .set_default("gesture.swipe_threshold", 150.0)?
        .set_default("gesture.tap_tolerance", 20.0)?
        .set_default("gesture.double_tap_window_ms", 400)?
        // Notification
        .set_default("notification.enabled", true)?
        .set_default("notification.channel_id", "pocket_lock_channel")?
        .set_default("notification.channel_name", "Pocket Lock Controls")?
        .set_default("notification.title", "Pocket Lock Active")?
        .set_default(
            "notification.message",
            "Tap here to open Controls (Lock/Screen Off)",
        )?
        // Ringer
        .set_default("ringer.backend", "simulated")?)
}

fn finish(builder: ConfigBuilder<DefaultState>) -> Result<AppConfig> {
    let config: AppConfig = builder.build()?.try_deserialize()?;
    config.validate()?;
    Ok(config)
}
