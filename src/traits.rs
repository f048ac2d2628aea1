//! Abstractions for time and platform services to enable testing.
//!
//! This module provides traits for:
//! - `Clock`: local wall-clock access for the quiet-hours check
//! - `Ringer`: the device audio service that owns the ringer mode
//! - `Notifier`: the notification service that shows the persistent entry

#[cfg(feature = "desktop")]
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{Local, NaiveDateTime, Timelike};
#[cfg(feature = "desktop")]
use tokio::sync::mpsc::UnboundedSender;

use crate::error::PlatformError;
use crate::schedule::SoundMode;

// ==================== Clock Trait ====================

/// Trait for abstracting time access.
pub trait Clock: Send + Sync {
    /// Current local wall-clock time.
    fn now(&self) -> NaiveDateTime;

    fn current_hour(&self) -> u32 {
        self.now().hour()
    }
}

/// System clock implementation using real time.
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Mock clock for testing with controllable time.
#[derive(Debug, Clone)]
pub struct MockClock {
    time: Arc<Mutex<NaiveDateTime>>,
}

impl MockClock {
    pub fn new(time: NaiveDateTime) -> Self {
        Self {
            time: Arc::new(Mutex::new(time)),
        }
    }

    pub fn set_time(&self, time: NaiveDateTime) {
        *self.time.lock().unwrap() = time;
    }

    pub fn advance(&self, duration: chrono::Duration) {
        let mut time = self.time.lock().unwrap();
        *time += duration;
    }
}

impl Clock for MockClock {
    fn now(&self) -> NaiveDateTime {
        *self.time.lock().unwrap()
    }
}

// ==================== Ringer Trait ====================

/// Trait for the platform audio service.
pub trait Ringer: Send + Sync {
    fn mode(&self) -> Result<SoundMode, PlatformError>;

    fn set_mode(&self, mode: SoundMode) -> Result<(), PlatformError>;
}

/// In-memory ringer standing in for a device audio service.
///
/// Records every successful write and can be told to fail the next writes,
/// which makes it usable both as the headless backend and in tests.
#[derive(Debug, Clone)]
pub struct SimulatedRinger {
    inner: Arc<Mutex<SimulatedRingerState>>,
}

#[derive(Debug)]
struct SimulatedRingerState {
    mode: SoundMode,
    writes: Vec<SoundMode>,
    failing: bool,
}

impl SimulatedRinger {
    pub fn new(mode: SoundMode) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SimulatedRingerState {
                mode,
                writes: Vec::new(),
                failing: false,
            })),
        }
    }

    /// Change the mode as the user would from the system settings. Not recorded
    /// as a write.
    pub fn set_by_user(&self, mode: SoundMode) {
        self.inner.lock().unwrap().mode = mode;
    }

    /// Modes written through [`Ringer::set_mode`], oldest first.
    pub fn writes(&self) -> Vec<SoundMode> {
        self.inner.lock().unwrap().writes.clone()
    }

    pub fn write_count(&self) -> usize {
        self.inner.lock().unwrap().writes.len()
    }

    /// Make subsequent writes fail with [`PlatformError::CallFailed`].
    pub fn set_failing(&self, failing: bool) {
        self.inner.lock().unwrap().failing = failing;
    }
}

impl Default for SimulatedRinger {
    fn default() -> Self {
        Self::new(SoundMode::Normal)
    }
}

impl Ringer for SimulatedRinger {
    fn mode(&self) -> Result<SoundMode, PlatformError> {
        Ok(self.inner.lock().unwrap().mode)
    }

    fn set_mode(&self, mode: SoundMode) -> Result<(), PlatformError> {
        let mut state = self.inner.lock().unwrap();
        if state.failing {
            return Err(PlatformError::CallFailed {
                service: "ringer",
                reason: "simulated failure".to_string(),
            });
        }
        state.mode = mode;
        state.writes.push(mode);
        Ok(())
    }
}

/// Ringer for environments without an audio service.
#[derive(Debug, Clone, Default)]
pub struct UnavailableRinger;

impl Ringer for UnavailableRinger {
    fn mode(&self) -> Result<SoundMode, PlatformError> {
        Err(PlatformError::Unavailable("ringer"))
    }

    fn set_mode(&self, _mode: SoundMode) -> Result<(), PlatformError> {
        Err(PlatformError::Unavailable("ringer"))
    }
}

// ==================== Notifier Trait ====================

/// Notification channel registered once before the first post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSpec {
    pub id: String,
    pub name: String,
}

/// Ongoing, non-dismissible notification pointing the user at the controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistentNotification {
    pub channel_id: String,
    pub title: String,
    pub body: String,
}

/// Trait for abstracting the platform notification service.
pub trait Notifier: Send + Sync {
    fn create_channel(&self, channel: &ChannelSpec) -> Result<(), PlatformError>;

    fn post_persistent(&self, notification: &PersistentNotification) -> Result<(), PlatformError>;
}

/// Desktop notifier implementation using notify-rust.
///
/// Every post replaces the previous notification. Clicking it is forwarded to
/// the sender given to [`DesktopNotifier::with_open_requests`], if any.
#[cfg(feature = "desktop")]
#[derive(Debug, Clone, Default)]
pub struct DesktopNotifier {
    open_requests: Option<UnboundedSender<()>>,
    shown_id: Arc<Mutex<Option<u32>>>,
    listening: Arc<AtomicBool>,
}

#[cfg(feature = "desktop")]
impl DesktopNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send `()` on `tx` each time the notification's default action is invoked.
    pub fn with_open_requests(tx: UnboundedSender<()>) -> Self {
        Self {
            open_requests: Some(tx),
            ..Self::default()
        }
    }

    fn build(&self, notification: &PersistentNotification) -> notify_rust::Notification {
        let mut builder = notify_rust::Notification::new();
        builder
            .summary(&notification.title)
            .body(&notification.body)
            .appname("Pocket Lock")
            .action(OPEN_ACTION, "Open controls")
            .timeout(notify_rust::Timeout::Never);
        if let Some(id) = *self.shown_id.lock().unwrap() {
            builder.id(id);
        }
        builder
    }
}

#[cfg(feature = "desktop")]
const OPEN_ACTION: &str = "default";

#[cfg(feature = "desktop")]
impl Notifier for DesktopNotifier {
    fn create_channel(&self, _channel: &ChannelSpec) -> Result<(), PlatformError> {
        // Desktop notification daemons have no channel concept; registering one
        // only checks that a server is reachable.
        require_server(check_server())
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    fn post_persistent(&self, notification: &PersistentNotification) -> Result<(), PlatformError> {
        let notification = self.build(notification);

        // One listener at a time; replaced notifications keep the same id.
        let listener = match &self.open_requests {
            Some(tx) if !self.listening.swap(true, Ordering::SeqCst) => tx.clone(),
            _ => {
                let handle = notification.show().map_err(call_failed)?;
                *self.shown_id.lock().unwrap() = Some(handle.id());
                return Ok(());
            }
        };

        // The handle stays on the thread that waits on it.
        let (shown_tx, shown_rx) = std::sync::mpsc::sync_channel(1);
        let listening = Arc::clone(&self.listening);
        std::thread::spawn(move || {
            match notification.show() {
                Ok(handle) => {
                    let _ = shown_tx.send(Ok(handle.id()));
                    handle.wait_for_action(|action| {
                        forward_action(action, &listener);
                    });
                }
                Err(e) => {
                    let _ = shown_tx.send(Err(e.to_string()));
                }
            }
            listening.store(false, Ordering::SeqCst);
        });

        let id = shown_rx.recv().map_err(call_failed)?.map_err(call_failed)?;
        *self.shown_id.lock().unwrap() = Some(id);
        Ok(())
    }

    #[cfg(not(all(unix, not(target_os = "macos"))))]
    fn post_persistent(&self, notification: &PersistentNotification) -> Result<(), PlatformError> {
        self.build(notification).show().map_err(call_failed)?;
        Ok(())
    }
}

/// Pass a click on the open action on to the controls.
#[cfg(feature = "desktop")]
fn forward_action(action: &str, open_requests: &UnboundedSender<()>) -> bool {
    if action != OPEN_ACTION {
        return false;
    }
    tracing::info!("Notification clicked, reopening controls");
    open_requests.send(()).is_ok()
}

#[cfg(feature = "desktop")]
fn call_failed(e: impl std::fmt::Display) -> PlatformError {
    PlatformError::CallFailed {
        service: "notification",
        reason: e.to_string(),
    }
}

#[cfg(all(feature = "desktop", unix, not(target_os = "macos")))]
fn check_server() -> Result<(), notify_rust::error::Error> {
    let server = notify_rust::get_server_information()?;
    tracing::debug!("Notification server: {} {}", server.name, server.version);
    Ok(())
}

#[cfg(all(feature = "desktop", not(all(unix, not(target_os = "macos")))))]
fn check_server() -> Result<(), std::convert::Infallible> {
    Ok(())
}

/// Map a failed server check to a missing notification service.
#[cfg(feature = "desktop")]
fn require_server<T, E: std::fmt::Display>(check: Result<T, E>) -> Result<T, PlatformError> {
    check.map_err(|e| {
        tracing::warn!("No notification server: {}", e);
        PlatformError::Unavailable("notification")
    })
}

/// Notifier for environments without a notification service.
#[derive(Debug, Clone, Default)]
pub struct UnavailableNotifier;

impl Notifier for UnavailableNotifier {
    fn create_channel(&self, _channel: &ChannelSpec) -> Result<(), PlatformError> {
        Err(PlatformError::Unavailable("notification"))
    }

    fn post_persistent(&self, _notification: &PersistentNotification) -> Result<(), PlatformError> {
        Err(PlatformError::Unavailable("notification"))
    }
}

/// Mock notifier for testing that records channels and posts.
#[derive(Debug, Clone, Default)]
pub struct MockNotifier {
    channels: Arc<Mutex<Vec<ChannelSpec>>>,
    posts: Arc<Mutex<Vec<PersistentNotification>>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channels(&self) -> Vec<ChannelSpec> {
        self.channels.lock().unwrap().clone()
    }

    pub fn posts(&self) -> Vec<PersistentNotification> {
        self.posts.lock().unwrap().clone()
    }

    pub fn post_count(&self) -> usize {
        self.posts.lock().unwrap().len()
    }
}

impl Notifier for MockNotifier {
    fn create_channel(&self, channel: &ChannelSpec) -> Result<(), PlatformError> {
        self.channels.lock().unwrap().push(channel.clone());
        Ok(())
    }

    fn post_persistent(&self, notification: &PersistentNotification) -> Result<(), PlatformError> {
        self.posts.lock().unwrap().push(notification.clone());
        Ok(())
    }
}
