//! Countdown phase and the snapshot published to observers

use serde::{Deserialize, Serialize};

use super::{TimeState, VisibilityState};

/// Whether a countdown is currently in progress
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountdownPhase {
    #[default]
    Idle,
    Running,
}

impl CountdownPhase {
    pub fn is_running(&self) -> bool {
        matches!(self, CountdownPhase::Running)
    }
}

/// Read-only view of the timer handed to the rendering layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub minutes: u8,
    pub seconds: u8,
    pub controls_visible: bool,
    pub phase: CountdownPhase,
    /// True when a start request would be accepted
    pub start_enabled: bool,
    /// Bumped on every start and cancel
    pub generation: u64,
}

impl TimerSnapshot {
    pub fn new(
        time: &TimeState,
        visibility: &VisibilityState,
        phase: CountdownPhase,
        generation: u64,
    ) -> Self {
        // minutes + seconds > 0 is the same test as total > 0 for non-negative fields
        let start_enabled =
            !time.is_zero() && visibility.controls_visible && !phase.is_running();

        Self {
            minutes: time.minutes(),
            seconds: time.seconds(),
            controls_visible: visibility.controls_visible,
            phase,
            start_enabled,
            generation,
        }
    }

    /// Remaining time formatted as `mm:ss`
    pub fn remaining(&self) -> String {
        TimeState::from_parts(self.minutes, self.seconds).to_string()
    }
}

impl Default for TimerSnapshot {
    fn default() -> Self {
        Self::new(&TimeState::new(), &VisibilityState::new(), CountdownPhase::Idle, 0)
    }
}
