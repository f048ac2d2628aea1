//! Touch gesture classification for pocket mode.
//!
//! The presentation layer forwards raw touch-down/touch-up events, touch-ups
//! with a monotonic timestamp; [`GestureDetector`] turns each touch-up into at
//! most one recognised [`UnlockGesture`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::GestureConfig;

/// The gestures pocket mode can be configured to unlock on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnlockGesture {
    SwipeRight,
    SwipeLeft,
    DoubleTapTop,
}

impl UnlockGesture {
    pub const ALL: [UnlockGesture; 3] = [Self::SwipeRight, Self::SwipeLeft, Self::DoubleTapTop];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SwipeRight => "swipe-right",
            Self::SwipeLeft => "swipe-left",
            Self::DoubleTapTop => "double-tap-top",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.as_str() == input)
    }
}

/// Per-activation gesture state. A fresh detector is armed every time pocket
/// mode is entered.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureDetector {
    swipe_threshold: f32,
    tap_tolerance: f32,
    double_tap_window: Duration,
    start_x: Option<f32>,
    last_tap: Option<Duration>,
}

impl GestureDetector {
    pub fn new(config: &GestureConfig) -> Self {
        Self {
            swipe_threshold: config.swipe_threshold,
            tap_tolerance: config.tap_tolerance,
            double_tap_window: Duration::from_millis(config.double_tap_window_ms),
            start_x: None,
            last_tap: None,
        }
    }

    pub fn touch_down(&mut self, x: f32) {
        self.start_x = Some(x);
    }

    /// Classify the touch that ends at `x`.
    ///
    /// A touch-up without a matching touch-down is dropped. Only a tap-sized
    /// touch-up becomes the reference for the next double-tap check; swipes and
    /// medium drags clear it, and so does a recognised double tap.
    pub fn touch_up(&mut self, x: f32, at: Duration) -> Option<UnlockGesture> {
        let start_x = self.start_x.take()?;
        let dx = x - start_x;

        if dx > self.swipe_threshold {
            self.last_tap = None;
            return Some(UnlockGesture::SwipeRight);
        }
        if dx < -self.swipe_threshold {
            self.last_tap = None;
            return Some(UnlockGesture::SwipeLeft);
        }
        if dx.abs() >= self.tap_tolerance {
            self.last_tap = None;
            return None;
        }

        let within_window = self
            .last_tap
            .and_then(|prev| at.checked_sub(prev))
            .is_some_and(|gap| gap <= self.double_tap_window);
        if within_window {
            self.last_tap = None;
            return Some(UnlockGesture::DoubleTapTop);
        }
        self.last_tap = Some(at);
        None
    }
}
