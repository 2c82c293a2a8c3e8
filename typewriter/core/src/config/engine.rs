//! Engine timing configuration
//!
//! `Speed` and `Delay` only hold the values a host is allowed to pick, so
//! an [`EngineConfig`] that reaches the engine is always usable.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Typing speed in characters per second (10, 20, ... 100)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Speed(u32);

impl Speed {
    /// Slowest speed, 100ms per character
    pub const MIN: Self = Self(10);
    /// Fastest speed, 10ms per character
    pub const MAX: Self = Self(100);
    /// Distance between allowed speeds
    pub const STEP: u32 = 10;

    /// Validate a speed value
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] unless `value` is a multiple
    /// of 10 between 10 and 100.
    pub fn new(value: u32) -> Result<Self, ConfigError> {
        if (Self::MIN.0..=Self::MAX.0).contains(&value) && value % Self::STEP == 0 {
            Ok(Self(value))
        } else {
            Err(ConfigError::ValidationError(format!(
                "speed must be one of 10, 20, ... 100 (got {value})"
            )))
        }
    }

    /// Raw characters-per-second value
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Time between two typed (or erased) characters: `1000 / speed` ms
    #[must_use]
    pub fn interval(self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.0))
    }
}

impl Default for Speed {
    fn default() -> Self {
        Self::MIN
    }
}

impl TryFrom<u32> for Speed {
    type Error = ConfigError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Speed> for u32 {
    fn from(speed: Speed) -> Self {
        speed.0
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} chars/s", self.0)
    }
}

/// Pause after a term is fully typed, in whole seconds (1..=10)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Delay(u32);

impl Delay {
    /// Shortest pause
    pub const MIN: Self = Self(1);
    /// Longest pause
    pub const MAX: Self = Self(10);

    /// Validate a delay value
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] unless `value` is 1..=10.
    pub fn new(value: u32) -> Result<Self, ConfigError> {
        if (Self::MIN.0..=Self::MAX.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ConfigError::ValidationError(format!(
                "delay must be between 1 and 10 seconds (got {value})"
            )))
        }
    }

    /// Raw seconds value
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Pause length
    #[must_use]
    pub fn duration(self) -> Duration {
        Duration::from_secs(u64::from(self.0))
    }
}

impl Default for Delay {
    fn default() -> Self {
        Self(2)
    }
}

impl TryFrom<u32> for Delay {
    type Error = ConfigError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Delay> for u32 {
    fn from(delay: Delay) -> Self {
        delay.0
    }
}

impl fmt::Display for Delay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

/// Timing and behaviour knobs for one engine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Characters per second while typing and erasing
    pub speed: Speed,

    /// Pause between finishing a term and erasing it
    pub delay: Delay,

    /// Erase and move on to the next term, forever
    #[serde(rename = "loop")]
    pub looping: bool,

    /// Whether the cursor starts out visible
    pub cursor: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            speed: Speed::default(),
            delay: Delay::default(),
            looping: true,
            cursor: true,
        }
    }
}

impl EngineConfig {
    /// Create a config with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the typing speed
    #[must_use]
    pub fn with_speed(mut self, speed: Speed) -> Self {
        self.speed = speed;
        self
    }

    /// Set the pause between typing and erasing
    #[must_use]
    pub fn with_delay(mut self, delay: Delay) -> Self {
        self.delay = delay;
        self
    }

    /// Enable or disable looping
    #[must_use]
    pub fn with_loop(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Enable or disable the cursor
    #[must_use]
    pub fn with_cursor(mut self, cursor: bool) -> Self {
        self.cursor = cursor;
        self
    }

    /// Time between two character steps
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.speed.interval()
    }
}
