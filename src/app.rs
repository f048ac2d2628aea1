use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::{AppConfig, ScheduleConfig};
use crate::error::ValidationError;
use crate::gesture::UnlockGesture;
use crate::notification::{NotificationStatus, StatusNotification};
use crate::overlay::{Command, InputEvent, LockOverlayController, OverlayKind, Outcome};
use crate::schedule::{SchedulerAction, SoundMode};
use crate::scheduler::QuietHoursScheduler;
use crate::traits::{Clock, Notifier, Ringer};

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Periodic scheduler check.
    Tick,
    Overlay(Command),
    Input(InputEvent),
    /// Save the hour fields from the settings form. `enabled: None` toggles the
    /// current state, as the dashboard's single schedule button does.
    SaveSchedule {
        start: String,
        end: String,
        enabled: Option<bool>,
    },
    SetUnlockGesture(UnlockGesture),
    ActivateNotification,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Overlay(Outcome),
    Scheduler(SchedulerAction),
    ScheduleSaved(ScheduleConfig),
    ScheduleRejected(ValidationError),
    GestureChanged(UnlockGesture),
    Notification(NotificationStatus),
}

/// What the presentation layer needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub state: &'static str,
    pub overlay: Option<OverlayKind>,
    pub dashboard_visible: bool,
    pub brightness: f32,
    pub dim_alpha: f32,
    pub schedule: ScheduleConfig,
    pub schedule_error: Option<String>,
    pub scheduler_available: bool,
    pub ringer_mode: Option<SoundMode>,
    pub unlock_gesture: UnlockGesture,
    pub notification_inert: bool,
}

/// Application state owned by the front end and driven by [`Message`]s.
pub struct PocketLockApp {
    overlay: LockOverlayController,
    scheduler: QuietHoursScheduler,
    notification: StatusNotification,
    schedule_error: Option<ValidationError>,
}

impl PocketLockApp {
    pub fn new(
        config: &AppConfig,
        clock: Arc<dyn Clock>,
        ringer: Arc<dyn Ringer>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            overlay: LockOverlayController::new(&config.lock, &config.gesture, &config.display),
            scheduler: QuietHoursScheduler::new(config.schedule, ringer, clock),
            notification: StatusNotification::new(&config.notification, notifier),
            schedule_error: None,
        }
    }

    pub fn overlay(&self) -> &LockOverlayController {
        &self.overlay
    }

    pub fn schedule(&self) -> &ScheduleConfig {
        self.scheduler.config()
    }

    pub fn schedule_error(&self) -> Option<&ValidationError> {
        self.schedule_error.as_ref()
    }

    pub fn update(&mut self, message: Message) -> Response {
        match message {
            Message::Tick => Response::Scheduler(self.scheduler.tick()),
            Message::Overlay(command) => Response::Overlay(self.overlay.handle_command(command)),
            Message::Input(event) => Response::Overlay(self.overlay.handle_input(event)),
            Message::SaveSchedule {
                start,
                end,
                enabled,
            } => self.save_schedule(&start, &end, enabled),
            Message::SetUnlockGesture(gesture) => {
                info!("Unlock gesture set to {}", gesture.as_str());
                self.overlay.set_unlock_gesture(gesture);
                Response::GestureChanged(gesture)
            }
            Message::ActivateNotification => Response::Notification(self.notification.activate()),
        }
    }

    fn save_schedule(&mut self, start: &str, end: &str, enabled: Option<bool>) -> Response {
        let current = *self.scheduler.config();
        let enabled = enabled.unwrap_or(!current.enabled);

        match ScheduleConfig::from_form(start, end, enabled) {
            Ok(next) => {
                self.schedule_error = None;
                self.scheduler.set_config(next);
                Response::ScheduleSaved(next)
            }
            Err(e) => {
                warn!("Rejected schedule edit: {}", e);
                self.schedule_error = Some(e.clone());
                Response::ScheduleRejected(e)
            }
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let state = self.overlay.state();
        let brightness = self.overlay.brightness();
        Snapshot {
            state: state.name(),
            overlay: state.kind(),
            dashboard_visible: !self.overlay.is_locked(),
            brightness: brightness.level(),
            dim_alpha: brightness.dim_alpha(),
            schedule: *self.scheduler.config(),
            schedule_error: self.schedule_error.as_ref().map(ToString::to_string),
            scheduler_available: self.scheduler.is_available(),
            ringer_mode: self.scheduler.ringer_mode(),
            unlock_gesture: self.overlay.unlock_gesture(),
            notification_inert: self.notification.is_inert(),
        }
    }
}
