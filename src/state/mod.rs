//! State management module
//!
//! This module contains the timer's state holders and the shared application state.

pub mod time_state;
pub mod visibility_state;
pub mod timer_state;
pub mod app_state;

// Re-export main types
pub use time_state::{TimeState, MAX_FIELD};
pub use visibility_state::VisibilityState;
pub use timer_state::{CountdownPhase, TimerSnapshot};
pub use app_state::AppState;
