//! Pocket Lock Library
//!
//! Core of the pocket-lock utility: the quiet-hours ringer scheduler, the lock
//! overlay state machine and the platform seams they run against. The
//! presentation layer drives everything through [`PocketLockApp`].

pub mod app;
pub mod brightness;
pub mod config;
pub mod console;
pub mod error;
pub mod gesture;
pub mod notification;
pub mod overlay;
pub mod schedule;
pub mod scheduler;
pub mod traits;

// Re-export commonly used types
pub use app::{Message, PocketLockApp, Response, Snapshot};
pub use brightness::Brightness;
pub use config::{AppConfig, ScheduleConfig};
pub use error::{PlatformError, ValidationError};
pub use gesture::{GestureDetector, UnlockGesture};
pub use notification::{NotificationStatus, StatusNotification};
pub use overlay::{Command, InputEvent, LockOverlayController, OverlayKind, OverlayState, Outcome};
pub use schedule::{SchedulerAction, SoundMode, decide, is_quiet_hour, parse_hour};
pub use scheduler::QuietHoursScheduler;
pub use traits::{
    Clock, MockClock, MockNotifier, Notifier, Ringer, SimulatedRinger, SystemClock,
    UnavailableNotifier, UnavailableRinger,
};
#[cfg(feature = "desktop")]
pub use traits::DesktopNotifier;
