//! Brightness level definitions.

use std::fmt;

/// One of the four fixed backlight steps (0 = off, 3 = brightest).
///
/// Values are always in `0..=3`; arithmetic wraps around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BrightnessLevel(u8);

impl BrightnessLevel {
    /// Number of distinct levels.
    pub const COUNT: u8 = 4;

    /// The lowest level (backlight off).
    pub const OFF: Self = Self(0);

    /// The highest level.
    pub const MAX: Self = Self(Self::COUNT - 1);

    /// Create a level, returning `None` if `value` is not in `0..=3`.
    pub fn new(value: u8) -> Option<Self> {
        (value < Self::COUNT).then_some(Self(value))
    }

    /// Interpret an arbitrary persisted integer.
    ///
    /// Negative values mean "no prior state". Anything else is reduced
    /// modulo [`COUNT`](Self::COUNT).
    pub fn from_persisted(value: i64) -> Option<Self> {
        if value < 0 {
            return None;
        }
        Some(Self((value % i64::from(Self::COUNT)) as u8))
    }

    /// The level that follows `previous`, wrapping 3 back to 0.
    ///
    /// With no previous level the cycle starts at 0.
    pub fn after(previous: Option<Self>) -> Self {
        match previous {
            Some(level) => level.next(),
            None => Self::OFF,
        }
    }

    /// The next level in the cycle.
    pub fn next(self) -> Self {
        Self((self.0 + 1) % Self::COUNT)
    }

    /// The raw value sent to the device.
    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for BrightnessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<BrightnessLevel> for u8 {
    fn from(level: BrightnessLevel) -> Self {
        level.0
    }
}
