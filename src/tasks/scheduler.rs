//! One-shot delayed callback scheduling

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};
use tokio::{runtime::Handle, task::AbortHandle, time::sleep};
use tracing::{debug, warn};

/// Callback run once by a scheduler
pub type Callback = Box<dyn FnOnce() + Send + 'static>;

/// Identifies one scheduled callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScheduleHandle(u64);

/// Runs a callback once after a delay.
///
/// Repeating ticks are built by re-issuing a request from inside the callback.
pub trait Scheduler: Send + Sync {
    fn schedule_once(&self, delay: Duration, callback: Callback) -> ScheduleHandle;

    /// Drop a pending callback. Returns false if it already ran or is unknown.
    fn cancel(&self, handle: ScheduleHandle) -> bool;
}

/// Scheduler backed by tokio tasks
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    runtime: Handle,
    next_id: Arc<AtomicU64>,
    pending: Arc<Mutex<HashMap<u64, AbortHandle>>>,
}

impl TokioScheduler {
    /// Use the runtime of the calling context. Panics outside a tokio runtime.
    pub fn new() -> Self {
        Self::with_handle(Handle::current())
    }

    pub fn with_handle(runtime: Handle) -> Self {
        Self {
            runtime,
            next_id: Arc::new(AtomicU64::new(0)),
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_once(&self, delay: Duration, callback: Callback) -> ScheduleHandle {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let pending = Arc::clone(&self.pending);

        // Hold the lock across spawn so the task cannot remove its entry before it is inserted
        let mut map = match self.pending.lock() {
            Ok(map) => map,
            Err(poisoned) => poisoned.into_inner(),
        };

        let task = self.runtime.spawn(async move {
            sleep(delay).await;
            if let Ok(mut map) = pending.lock() {
                map.remove(&id);
            }
            callback();
        });
        map.insert(id, task.abort_handle());

        debug!("Scheduled callback {} in {:?}", id, delay);
        ScheduleHandle(id)
    }

    fn cancel(&self, handle: ScheduleHandle) -> bool {
        let removed = match self.pending.lock() {
            Ok(mut map) => map.remove(&handle.0),
            Err(e) => {
                warn!("Failed to lock pending callbacks: {}", e);
                None
            }
        };

        match removed {
            Some(task) => {
                task.abort();
                debug!("Cancelled callback {}", handle.0);
                true
            }
            None => false,
        }
    }
}

/// Scheduler that only runs callbacks when told to.
///
/// Delays are recorded but never waited on, so a whole countdown can be
/// stepped through without a clock.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    next_id: Arc<AtomicU64>,
    queue: Arc<Mutex<VecDeque<(ScheduleHandle, Duration, Callback)>>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of callbacks waiting to run
    pub fn pending(&self) -> usize {
        self.queue.lock().map(|queue| queue.len()).unwrap_or(0)
    }

    /// Delay requested by the oldest pending callback
    pub fn next_delay(&self) -> Option<Duration> {
        self.queue.lock().ok()?.front().map(|(_, delay, _)| *delay)
    }

    /// Run the oldest pending callback. Returns false if nothing was pending.
    pub fn fire_next(&self) -> bool {
        // Pop before running so the callback can schedule again
        let next = match self.queue.lock() {
            Ok(mut queue) => queue.pop_front(),
            Err(_) => None,
        };

        match next {
            Some((_, _, callback)) => {
                callback();
                true
            }
            None => false,
        }
    }

    /// Keep firing until nothing is pending, returning how many callbacks ran
    pub fn run_until_idle(&self) -> usize {
        let mut fired = 0;
        while self.fire_next() {
            fired += 1;
        }
        fired
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_once(&self, delay: Duration, callback: Callback) -> ScheduleHandle {
        let handle = ScheduleHandle(self.next_id.fetch_add(1, Ordering::SeqCst));
        if let Ok(mut queue) = self.queue.lock() {
            queue.push_back((handle, delay, callback));
        }
        handle
    }

    fn cancel(&self, handle: ScheduleHandle) -> bool {
        match self.queue.lock() {
            Ok(mut queue) => {
                let before = queue.len();
                queue.retain(|(queued, _, _)| *queued != handle);
                queue.len() != before
            }
            Err(_) => false,
        }
    }
}
