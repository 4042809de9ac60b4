//! Tea Timer - A minute/second countdown timer served over HTTP
//!
//! This library holds the timer's state, the countdown driver that ticks it
//! once per second, and the routes a rendering client uses to adjust, start
//! and observe it.

pub mod config;
pub mod error;
pub mod state;
pub mod api;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::TimerError;
pub use state::{AppState, TimeState, TimerSnapshot, VisibilityState};
pub use tasks::{CountdownDriver, Scheduler};
pub use api::create_router;
pub use utils::signals::shutdown_signal;
