use serde::Serialize;

/// Dimming level painted over the lock overlay.
///
/// The value is the alpha of a black layer: `0.0` leaves the screen clear and
/// `1.0` is fully dark. `dim` raises it, `brighten` lowers it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Brightness {
    level: f32,
    step: f32,
}

impl Brightness {
    pub const NEUTRAL: f32 = 0.0;
    pub const MAX: f32 = 1.0;

    pub fn new(step: f32) -> Self {
        Self {
            level: Self::NEUTRAL,
            step,
        }
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    /// Alpha for the translucent dimming layer.
    pub fn dim_alpha(&self) -> f32 {
        self.level
    }

    pub fn dim(&mut self) -> f32 {
        self.level = (self.level + self.step).clamp(Self::NEUTRAL, Self::MAX);
        self.level
    }

    pub fn brighten(&mut self) -> f32 {
        self.level = (self.level - self.step).clamp(Self::NEUTRAL, Self::MAX);
        // Snap float residue back to exactly clear.
        if self.level < self.step / 2.0 {
            self.level = Self::NEUTRAL;
        }
        self.level
    }

    pub fn reset(&mut self) {
        self.level = Self::NEUTRAL;
    }
}
