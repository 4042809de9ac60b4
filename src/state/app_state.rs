//! Shared timer state and change notification

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex, MutexGuard,
    },
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::error::TimerError;
use super::{CountdownPhase, TimeState, TimerSnapshot, VisibilityState};

/// Locked view over the three state holders, always acquired in the same order
pub(crate) struct Guards<'a> {
    pub(crate) time: MutexGuard<'a, TimeState>,
    pub(crate) visibility: MutexGuard<'a, VisibilityState>,
    pub(crate) phase: MutexGuard<'a, CountdownPhase>,
}

/// Application state shared between the HTTP handlers and the countdown driver
#[derive(Debug)]
pub struct AppState {
    pub time_state: Mutex<TimeState>,
    pub visibility_state: Mutex<VisibilityState>,
    pub phase: Mutex<CountdownPhase>,
    /// Bumped whenever a countdown starts or is cancelled
    generation: AtomicU64,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
    /// Channel for snapshot updates, only written while the state locks are held
    snapshot_tx: watch::Sender<TimerSnapshot>,
}

impl AppState {
    /// Create a state holder at 00:00 with controls visible
    pub fn new(port: u16, host: String) -> Self {
        let (snapshot_tx, _) = watch::channel(TimerSnapshot::default());

        Self {
            time_state: Mutex::new(TimeState::new()),
            visibility_state: Mutex::new(VisibilityState::new()),
            phase: Mutex::new(CountdownPhase::Idle),
            generation: AtomicU64::new(0),
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
            snapshot_tx,
        }
    }

    fn lock_all(&self) -> Result<Guards<'_>, TimerError> {
        let time = self.time_state.lock()
            .map_err(|e| TimerError::Lock(format!("time state: {}", e)))?;
        let visibility = self.visibility_state.lock()
            .map_err(|e| TimerError::Lock(format!("visibility state: {}", e)))?;
        let phase = self.phase.lock()
            .map_err(|e| TimerError::Lock(format!("countdown phase: {}", e)))?;

        Ok(Guards { time, visibility, phase })
    }

    fn snapshot_of(&self, guards: &Guards<'_>) -> TimerSnapshot {
        TimerSnapshot::new(
            &guards.time,
            &guards.visibility,
            *guards.phase,
            self.generation.load(Ordering::SeqCst),
        )
    }

    /// Apply `updater` and notify watchers under all locks, then record the action.
    ///
    /// Nothing is recorded or published when the updater rejects the request.
    pub(crate) fn update<T, F>(&self, action: &str, updater: F) -> Result<(T, TimerSnapshot), TimerError>
    where
        F: FnOnce(&mut Guards<'_>) -> Result<T, TimerError>,
    {
        let mut guards = self.lock_all()?;
        let output = updater(&mut guards)?;
        let snapshot = self.snapshot_of(&guards);
        self.publish(snapshot);
        drop(guards);

        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }

        Ok((output, snapshot))
    }

    /// Callers hold the state locks so watchers see updates in the order they were made
    fn publish(&self, snapshot: TimerSnapshot) {
        self.snapshot_tx.send_replace(snapshot);
    }

    fn ensure_editable(guards: &Guards<'_>) -> Result<(), TimerError> {
        if guards.phase.is_running() {
            return Err(TimerError::AlreadyRunning);
        }
        if !guards.visibility.controls_visible {
            return Err(TimerError::ControlsHidden);
        }
        Ok(())
    }

    /// Step the minutes field; refused while hidden or counting down
    pub fn adjust_minutes(&self, increase: bool) -> Result<TimerSnapshot, TimerError> {
        let action = if increase { "minutes-increase" } else { "minutes-decrease" };
        let (_, snapshot) = self.update(action, |guards| {
            Self::ensure_editable(guards)?;
            guards.time.adjust_minutes(increase);
            Ok(())
        })?;

        debug!("Minutes adjusted, timer now {}", snapshot.remaining());
        Ok(snapshot)
    }

    /// Step the seconds field; refused while hidden or counting down
    pub fn adjust_seconds(&self, increase: bool) -> Result<TimerSnapshot, TimerError> {
        let action = if increase { "seconds-increase" } else { "seconds-decrease" };
        let (_, snapshot) = self.update(action, |guards| {
            Self::ensure_editable(guards)?;
            guards.time.adjust_seconds(increase);
            Ok(())
        })?;

        debug!("Seconds adjusted, timer now {}", snapshot.remaining());
        Ok(snapshot)
    }

    /// Flip the control visibility, or assign it when a value is given
    pub fn toggle_or_set(&self, value: Option<bool>) -> Result<TimerSnapshot, TimerError> {
        let action = match value {
            None => "controls-toggle",
            Some(true) => "controls-show",
            Some(false) => "controls-hide",
        };
        let (_, snapshot) = self.update(action, |guards| {
            guards.visibility.toggle_or_set(value);
            Ok(())
        })?;

        info!("Controls visible: {}", snapshot.controls_visible);
        Ok(snapshot)
    }

    /// Enter the running phase and hide the controls.
    ///
    /// Returns the generation the new countdown's ticks must carry.
    pub fn begin_countdown(&self) -> Result<(u64, TimerSnapshot), TimerError> {
        self.update("start", |guards| {
            if guards.phase.is_running() {
                return Err(TimerError::AlreadyRunning);
            }
            if guards.time.is_zero() {
                return Err(TimerError::NothingToCount);
            }
            if !guards.visibility.controls_visible {
                return Err(TimerError::ControlsHidden);
            }

            guards.visibility.toggle_or_set(Some(false));
            *guards.phase = CountdownPhase::Running;
            Ok(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
        })
    }

    /// Count down one second on behalf of the countdown `generation`.
    ///
    /// Returns `None` when the generation is stale, i.e. the countdown it
    /// belonged to was cancelled. Otherwise returns whether the countdown
    /// finished; visibility is set to that value and a finished countdown
    /// goes back to idle.
    pub fn apply_tick(&self, generation: u64) -> Result<Option<(bool, TimerSnapshot)>, TimerError> {
        let mut guards = self.lock_all()?;
        if !guards.phase.is_running() || self.generation.load(Ordering::SeqCst) != generation {
            return Ok(None);
        }

        let done = guards.time.tick();
        guards.visibility.toggle_or_set(Some(done));
        if done {
            *guards.phase = CountdownPhase::Idle;
        }
        let snapshot = self.snapshot_of(&guards);
        self.publish(snapshot);
        drop(guards);

        Ok(Some((done, snapshot)))
    }

    /// Stop a running countdown, keeping the remaining time and showing the controls
    pub fn end_countdown(&self) -> Result<TimerSnapshot, TimerError> {
        let (_, snapshot) = self.update("cancel", |guards| {
            if !guards.phase.is_running() {
                return Err(TimerError::NotRunning);
            }

            self.generation.fetch_add(1, Ordering::SeqCst);
            *guards.phase = CountdownPhase::Idle;
            guards.visibility.toggle_or_set(Some(true));
            Ok(())
        })?;

        Ok(snapshot)
    }

    /// Get the current snapshot
    pub fn snapshot(&self) -> Result<TimerSnapshot, TimerError> {
        let guards = self.lock_all()?;
        Ok(self.snapshot_of(&guards))
    }

    /// Subscribe to snapshot updates
    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
