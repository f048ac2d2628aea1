//! Line-oriented front end.
//!
//! Each input line maps to one [`Message`] for [`crate::app::PocketLockApp`] or
//! to a front-end action (`status`, `help`, `quit`).

use std::time::Duration;

use thiserror::Error;

use crate::app::{Message, Response};
use crate::gesture::UnlockGesture;
use crate::notification::NotificationStatus;
use crate::overlay::{Command, InputEvent, Outcome};
use crate::schedule::SchedulerAction;

pub const HELP: &str = "\
commands:
  lock | blackout | pocket        activate touch lock, blackout or pocket mode
  dim | brighten                  adjust the dimming layer while locked
  tap                             tap the overlay surface
  drag <x> <y>                    drag the lock control to a point
  down <x> | up <x>               touch down / up for pocket-mode gestures
  schedule <start> <end> [on|off] save quiet hours (toggles when on/off is omitted)
  gesture <swipe-right|swipe-left|double-tap-top>
  notify                          post the persistent notification
  status | help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Send(Message),
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsoleError {
    #[error("unknown command {0:?} (try `help`)")]
    Unknown(String),
    #[error("`{command}` expects {expected}")]
    Usage {
        command: &'static str,
        expected: &'static str,
    },
    #[error("invalid coordinate {0:?}")]
    Coordinate(String),
    #[error("unknown gesture {0:?}")]
    Gesture(String),
}

/// Parse one line. `elapsed` is the session's monotonic time, used to stamp
/// touch-up events. Blank lines yield `None`.
pub fn parse_line(line: &str, elapsed: Duration) -> Result<Option<ConsoleCommand>, ConsoleError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let command = match (head, args.as_slice()) {
        ("lock", []) => send(Message::Overlay(Command::ActivateTouchLock)),
        ("blackout", []) => send(Message::Overlay(Command::ActivateBlackout)),
        ("pocket", []) => send(Message::Overlay(Command::ActivatePocketMode)),
        ("dim", []) => send(Message::Overlay(Command::Dim)),
        ("brighten", []) => send(Message::Overlay(Command::Brighten)),
        ("tap", []) => send(Message::Input(InputEvent::Tap)),
        ("drag", [x, y]) => send(Message::Input(InputEvent::Drag {
            x: coordinate(x)?,
            y: coordinate(y)?,
        })),
        ("drag", _) => return Err(usage("drag", "<x> <y>")),
        ("down", [x]) => send(Message::Input(InputEvent::TouchDown { x: coordinate(x)? })),
        ("up", [x]) => send(Message::Input(InputEvent::TouchUp {
            x: coordinate(x)?,
            at: elapsed,
        })),
        ("down" | "up", _) => return Err(usage("down/up", "<x>")),
        ("schedule", [start, end, rest @ ..]) => {
            let enabled = match rest {
                [] => None,
                ["on"] => Some(true),
                ["off"] => Some(false),
                _ => return Err(usage("schedule", "<start> <end> [on|off]")),
            };
            // Hours are validated by the app so that rejections surface there.
            send(Message::SaveSchedule {
                start: start.to_string(),
                end: end.to_string(),
                enabled,
            })
        }
        ("schedule", _) => return Err(usage("schedule", "<start> <end> [on|off]")),
        ("gesture", [name]) => {
            let gesture =
                UnlockGesture::parse(name).ok_or_else(|| ConsoleError::Gesture(name.to_string()))?;
            send(Message::SetUnlockGesture(gesture))
        }
        ("gesture", _) => return Err(usage("gesture", "one gesture name")),
        ("notify", []) => send(Message::ActivateNotification),
        ("status", []) => ConsoleCommand::Status,
        ("help", []) => ConsoleCommand::Help,
        ("quit" | "exit", []) => ConsoleCommand::Quit,
        _ => return Err(ConsoleError::Unknown(line.trim().to_string())),
    };
    Ok(Some(command))
}

/// One-line human summary of what a message did.
pub fn describe(response: &Response) -> String {
    match response {
        Response::Overlay(Outcome::Locked(kind)) => format!("locked ({kind:?})"),
        Response::Overlay(Outcome::Unlocked(kind)) => format!("unlocked from {kind:?}"),
        Response::Overlay(Outcome::BrightnessChanged(level)) => format!("dimming {:.0}%", level * 100.0),
        Response::Overlay(Outcome::Unchanged) => "still locked".to_string(),
        Response::Overlay(Outcome::Ignored) => "ignored".to_string(),
        Response::Scheduler(SchedulerAction::SetMode(mode)) => format!("ringer set to {mode:?}"),
        Response::Scheduler(SchedulerAction::NoOp) => "ringer unchanged".to_string(),
        Response::ScheduleSaved(schedule) => format!(
            "schedule {}: quiet {}:00-{}:00",
            if schedule.enabled { "on" } else { "off" },
            schedule.start_hour,
            schedule.end_hour
        ),
        Response::ScheduleRejected(e) => format!("error in time: {e}"),
        Response::GestureChanged(gesture) => format!("unlock gesture: {}", gesture.as_str()),
        Response::Notification(NotificationStatus::Posted) => "notification active".to_string(),
        Response::Notification(NotificationStatus::Inert) => "notifications unavailable".to_string(),
        Response::Notification(NotificationStatus::Failed) => "notification failed".to_string(),
    }
}

fn send(message: Message) -> ConsoleCommand {
    ConsoleCommand::Send(message)
}

fn usage(command: &'static str, expected: &'static str) -> ConsoleError {
    ConsoleError::Usage { command, expected }
}

fn coordinate(input: &str) -> Result<f32, ConsoleError> {
    input
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ConsoleError::Coordinate(input.to_string()))
}
