//! Reasons a timer request is turned down

use thiserror::Error;

/// Rejections of user requests. None of these change any state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    #[error("Controls are hidden. Show them before adjusting or starting the timer")]
    ControlsHidden,

    #[error("Timer is at 00:00. Add some time before starting")]
    NothingToCount,

    #[error("A countdown is already running")]
    AlreadyRunning,

    #[error("No countdown is running")]
    NotRunning,

    #[error("Failed to lock {0}")]
    Lock(String),
}

impl TimerError {
    /// Whether the error is a refused request rather than an internal failure
    pub fn is_rejection(&self) -> bool {
        !matches!(self, TimerError::Lock(_))
    }
}
