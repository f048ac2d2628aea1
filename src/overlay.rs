//! Lock overlay state machine.
//!
//! The dashboard is the unlocked state. Each lock overlay carries its own
//! transient data and its own unlock condition:
//!
//! - touch lock: drag the lock control far enough from the screen centre
//! - blackout: tap the dark surface a fixed number of times
//! - pocket mode: perform the configured [`UnlockGesture`]
//!
//! Entering or leaving an overlay resets the dimming level.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use crate::brightness::Brightness;
use crate::config::{DisplayConfig, GestureConfig, LockConfig};
use crate::gesture::{GestureDetector, UnlockGesture};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlayKind {
    TouchLock,
    Blackout,
    GestureLock,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OverlayState {
    Dashboard,
    TouchLock { center: (f32, f32) },
    Blackout { taps: u32 },
    GestureLock { detector: GestureDetector },
}

impl OverlayState {
    pub fn kind(&self) -> Option<OverlayKind> {
        match self {
            Self::Dashboard => None,
            Self::TouchLock { .. } => Some(OverlayKind::TouchLock),
            Self::Blackout { .. } => Some(OverlayKind::Blackout),
            Self::GestureLock { .. } => Some(OverlayKind::GestureLock),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::TouchLock { .. } => "touch-lock",
            Self::Blackout { .. } => "blackout",
            Self::GestureLock { .. } => "gesture-lock",
        }
    }
}

/// Explicit user commands from the dashboard or the overlay buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ActivateTouchLock,
    ActivateBlackout,
    ActivatePocketMode,
    Dim,
    Brighten,
}

/// Raw input routed from the presentation layer to the active overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// The lock control was dragged to this point.
    Drag { x: f32, y: f32 },
    /// A tap anywhere on the overlay surface.
    Tap,
    TouchDown { x: f32 },
    TouchUp { x: f32, at: Duration },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    Locked(OverlayKind),
    Unlocked(OverlayKind),
    BrightnessChanged(f32),
    /// The event was valid for the state but did not change it.
    Unchanged,
    /// The event does not apply to the current state.
    Ignored,
}

#[derive(Debug, Clone)]
pub struct LockOverlayController {
    state: OverlayState,
    brightness: Brightness,
    lock: LockConfig,
    gesture: GestureConfig,
    center: (f32, f32),
}

impl LockOverlayController {
    pub fn new(lock: &LockConfig, gesture: &GestureConfig, display: &DisplayConfig) -> Self {
        Self {
            state: OverlayState::Dashboard,
            brightness: Brightness::new(lock.brightness_step),
            lock: lock.clone(),
            gesture: gesture.clone(),
            center: (display.width / 2.0, display.height / 2.0),
        }
    }

    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    pub fn is_locked(&self) -> bool {
        !matches!(self.state, OverlayState::Dashboard)
    }

    pub fn brightness(&self) -> &Brightness {
        &self.brightness
    }

    pub fn unlock_gesture(&self) -> UnlockGesture {
        self.gesture.unlock_gesture
    }

    /// Takes effect immediately, including for an already armed pocket mode.
    pub fn set_unlock_gesture(&mut self, gesture: UnlockGesture) {
        self.gesture.unlock_gesture = gesture;
    }

    pub fn handle_command(&mut self, command: Command) -> Outcome {
        match command {
            Command::ActivateTouchLock => self.lock_with(OverlayState::TouchLock {
                center: self.center,
            }),
            Command::ActivateBlackout => self.lock_with(OverlayState::Blackout { taps: 0 }),
            Command::ActivatePocketMode => self.lock_with(OverlayState::GestureLock {
                detector: GestureDetector::new(&self.gesture),
            }),
            Command::Dim | Command::Brighten if !self.is_locked() => {
                debug!("Brightness controls are only available while locked");
                Outcome::Ignored
            }
            Command::Dim => Outcome::BrightnessChanged(self.brightness.dim()),
            Command::Brighten => Outcome::BrightnessChanged(self.brightness.brighten()),
        }
    }

    pub fn handle_input(&mut self, event: InputEvent) -> Outcome {
        let unlock_distance = self.lock.unlock_drag_distance;
        let required_taps = self.lock.blackout_taps;
        let unlock_gesture = self.gesture.unlock_gesture;

        let unlock = match (&mut self.state, event) {
            (OverlayState::TouchLock { center }, InputEvent::Drag { x, y }) => {
                let distance = (x - center.0).hypot(y - center.1);
                debug!("Lock dragged {:.1}dp from centre", distance);
                distance > unlock_distance
            }
            (OverlayState::Blackout { taps }, InputEvent::Tap) => {
                *taps += 1;
                debug!("Blackout tap {}/{}", taps, required_taps);
                *taps >= required_taps
            }
            (OverlayState::GestureLock { detector }, InputEvent::TouchDown { x }) => {
                detector.touch_down(x);
                false
            }
            (OverlayState::GestureLock { detector }, InputEvent::TouchUp { x, at }) => {
                match detector.touch_up(x, at) {
                    Some(gesture) if gesture == unlock_gesture => true,
                    Some(gesture) => {
                        debug!("Gesture {} does not match {}", gesture.as_str(), unlock_gesture.as_str());
                        false
                    }
                    None => false,
                }
            }
            (state, event) => {
                debug!("Ignoring {:?} in {}", event, state.name());
                return Outcome::Ignored;
            }
        };

        if unlock {
            self.restore_dashboard()
        } else {
            Outcome::Unchanged
        }
    }

    fn lock_with(&mut self, next: OverlayState) -> Outcome {
        if self.is_locked() {
            debug!("Already locked in {}, ignoring activation", self.state.name());
            return Outcome::Ignored;
        }
        self.brightness.reset();
        info!("Locking screen: {}", next.name());
        let kind = next.kind();
        self.state = next;
        kind.map_or(Outcome::Ignored, Outcome::Locked)
    }

    fn restore_dashboard(&mut self) -> Outcome {
        let previous = std::mem::replace(&mut self.state, OverlayState::Dashboard);
        self.brightness.reset();
        info!("Unlocked from {}", previous.name());
        previous.kind().map_or(Outcome::Ignored, Outcome::Unlocked)
    }
}
