//! Minutes/seconds countdown value

use std::fmt;
use serde::{Deserialize, Serialize};

/// Upper bound for both the minutes and the seconds field
pub const MAX_FIELD: u8 = 60;

/// Countdown value adjusted by the user and decremented by the driver
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeState {
    minutes: u8,
    seconds: u8,
}

impl TimeState {
    /// Create a timer at 00:00
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a timer from raw fields, clamped into range
    pub fn from_parts(minutes: u8, seconds: u8) -> Self {
        Self {
            minutes: minutes.min(MAX_FIELD),
            seconds: seconds.min(MAX_FIELD),
        }
    }

    pub fn minutes(&self) -> u8 {
        self.minutes
    }

    pub fn seconds(&self) -> u8 {
        self.seconds
    }

    /// Step the minutes field by one, saturating at 0 and 60
    pub fn adjust_minutes(&mut self, increase: bool) {
        self.minutes = step(self.minutes, increase);
    }

    /// Step the seconds field by one, saturating at 0 and 60
    pub fn adjust_seconds(&mut self, increase: bool) {
        self.seconds = step(self.seconds, increase);
    }

    /// Total countdown length in seconds
    pub fn total_seconds(&self) -> u32 {
        u32::from(self.minutes) * 60 + u32::from(self.seconds)
    }

    pub fn is_zero(&self) -> bool {
        self.total_seconds() == 0
    }

    /// Count down one second and report whether the countdown is over.
    ///
    /// The fields are renormalised from the total, so `01:00` becomes `00:59`
    /// and `00:60` becomes `00:59` as well. Ticking at zero changes nothing
    /// and reports `true`.
    pub fn tick(&mut self) -> bool {
        let total = self.total_seconds();
        if total == 0 {
            return true;
        }

        let current = total - 1;
        // current < 3660, so the quotient is at most 60
        self.minutes = (current / 60) as u8;
        self.seconds = (current % 60) as u8;

        current == 0
    }
}

fn step(value: u8, increase: bool) -> u8 {
    if increase {
        value.saturating_add(1).min(MAX_FIELD)
    } else {
        value.saturating_sub(1)
    }
}

impl fmt::Display for TimeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.minutes, self.seconds)
    }
}
