//! Background tasks module
//!
//! This module contains the scheduling primitive and the countdown driver
//! that runs on top of it.

pub mod scheduler;
pub mod countdown;

// Re-export main types
pub use scheduler::{Callback, ManualScheduler, ScheduleHandle, Scheduler, TokioScheduler};
pub use countdown::{CountdownDriver, TICK_INTERVAL};
