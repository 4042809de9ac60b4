//! Countdown driver
//!
//! Bridges a [`Scheduler`] to the shared [`AppState`]: a start request hides
//! the controls and schedules the first tick, every tick counts down one
//! second and schedules the next one until the timer reaches zero.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};
use tracing::{debug, error, info};

use crate::{
    error::TimerError,
    state::{AppState, TimerSnapshot},
};
use super::scheduler::{ScheduleHandle, Scheduler};

/// Default delay between two ticks
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Drives the countdown of one [`AppState`]
pub struct CountdownDriver {
    state: Arc<AppState>,
    scheduler: Arc<dyn Scheduler>,
    tick_interval: Duration,
    /// Callback waiting to deliver the next tick, tagged with its countdown generation
    pending: Mutex<Option<(u64, ScheduleHandle)>>,
}

impl CountdownDriver {
    pub fn new(state: Arc<AppState>, scheduler: Arc<dyn Scheduler>) -> Arc<Self> {
        Self::with_interval(state, scheduler, TICK_INTERVAL)
    }

    pub fn with_interval(
        state: Arc<AppState>,
        scheduler: Arc<dyn Scheduler>,
        tick_interval: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            state,
            scheduler,
            tick_interval,
            pending: Mutex::new(None),
        })
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Start counting down.
    ///
    /// Refused without any state change when the timer is at zero, the
    /// controls are hidden, or a countdown is already running.
    pub fn start(self: &Arc<Self>) -> Result<TimerSnapshot, TimerError> {
        let (generation, snapshot) = self.state.begin_countdown()?;
        info!(
            "Starting countdown from {} (generation {})",
            snapshot.remaining(),
            generation
        );

        self.schedule_tick(generation);
        Ok(snapshot)
    }

    /// Stop a running countdown early. The remaining time is kept.
    pub fn cancel(&self) -> Result<TimerSnapshot, TimerError> {
        let snapshot = self.state.end_countdown()?;

        let pending = self.pending.lock().ok().and_then(|mut pending| pending.take());
        if let Some((_, handle)) = pending {
            self.scheduler.cancel(handle);
        }

        info!("Countdown cancelled at {}", snapshot.remaining());
        Ok(snapshot)
    }

    fn schedule_tick(self: &Arc<Self>, generation: u64) {
        let driver = Arc::clone(self);
        let handle = self.scheduler.schedule_once(
            self.tick_interval,
            Box::new(move || driver.on_tick(generation)),
        );

        match self.pending.lock() {
            // A tick from an older countdown must not replace the newer one's handle
            Ok(mut pending) => match *pending {
                Some((current, _)) if current > generation => {}
                _ => *pending = Some((generation, handle)),
            },
            Err(e) => error!("Failed to record pending tick: {}", e),
        }
    }

    /// Forget the pending handle if it belongs to `generation`
    fn clear_pending(&self, generation: u64) {
        if let Ok(mut pending) = self.pending.lock() {
            if matches!(*pending, Some((current, _)) if current == generation) {
                *pending = None;
            }
        }
    }

    fn on_tick(self: Arc<Self>, generation: u64) {
        self.clear_pending(generation);

        match self.state.apply_tick(generation) {
            Ok(Some((false, snapshot))) => {
                debug!("Tick: {} remaining", snapshot.remaining());
                self.schedule_tick(generation);
            }
            Ok(Some((true, _))) => {
                info!("Countdown finished");
            }
            Ok(None) => {
                debug!("Dropping tick from stale countdown generation {}", generation);
            }
            Err(e) => {
                error!("Failed to apply tick: {}", e);
            }
        }
    }
}
