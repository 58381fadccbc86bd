//! Cancellable one-shot timers
//!
//! - [`ManualTimer`]: virtual clock advanced explicitly (simulation, tests)
//! - [`ThreadTimer`]: wall-clock timer, one short-lived thread per task

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{RecvTimeoutError, Sender, bounded};
use parking_lot::Mutex;

/// Deferred callback
pub type TimerTask = Box<dyn FnOnce() + Send + 'static>;

/// Schedules one-shot callbacks
pub trait Timer: Send + Sync {
    /// Run `task` once after `delay_ms`, unless the returned handle is cancelled first
    fn schedule(&self, delay_ms: f64, task: TimerTask) -> TimerHandle;
}

/// Handle to a scheduled task
#[derive(Debug, Clone)]
pub struct TimerHandle {
    cancelled: Arc<AtomicBool>,
    wake: Option<Sender<()>>,
}

impl TimerHandle {
    fn new(wake: Option<Sender<()>>) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            wake,
        }
    }

    /// Cancel the task. Safe to call any number of times.
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::AcqRel) {
            if let Some(wake) = &self.wake {
                let _ = wake.try_send(());
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// MANUAL (VIRTUAL CLOCK) TIMER
// ═══════════════════════════════════════════════════════════════════════════

struct Scheduled {
    due_ms: f64,
    seq: u64,
    handle: TimerHandle,
    task: TimerTask,
}

#[derive(Default)]
struct ManualQueue {
    now_ms: f64,
    next_seq: u64,
    entries: Vec<Scheduled>,
}

/// Deterministic timer driven by [`ManualTimer::advance`].
///
/// Due tasks fire in (due time, insertion) order. A task may schedule further
/// tasks; those fire in the same `advance` call if they fall due before its end.
#[derive(Default)]
pub struct ManualTimer {
    queue: Mutex<ManualQueue>,
}

impl ManualTimer {
    /// Safety cap on tasks fired by one call, against zero-delay loops
    const MAX_FIRES_PER_CALL: usize = 100_000;

    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time (ms)
    pub fn now_ms(&self) -> f64 {
        self.queue.lock().now_ms
    }

    /// Number of scheduled, uncancelled tasks
    pub fn pending(&self) -> usize {
        self.queue
            .lock()
            .entries
            .iter()
            .filter(|e| !e.handle.is_cancelled())
            .count()
    }

    /// Due time of the earliest uncancelled task
    pub fn next_due(&self) -> Option<f64> {
        self.queue
            .lock()
            .entries
            .iter()
            .filter(|e| !e.handle.is_cancelled())
            .map(|e| e.due_ms)
            .reduce(f64::min)
    }

    /// Advance the clock by `ms`, firing every task that falls due.
    /// Returns the number of tasks fired.
    pub fn advance(&self, ms: f64) -> usize {
        let target = self.now_ms() + ms.max(0.0);
        let fired = self.fire_until(target);
        let mut queue = self.queue.lock();
        if queue.now_ms < target {
            queue.now_ms = target;
        }
        fired
    }

    /// Fire tasks until none remain. Returns the number of tasks fired.
    pub fn run_until_idle(&self) -> usize {
        self.fire_until(f64::INFINITY)
    }

    fn fire_until(&self, target: f64) -> usize {
        let mut fired = 0;
        while fired < Self::MAX_FIRES_PER_CALL {
            let Some(entry) = self.pop_due(target) else {
                break;
            };
            // Run outside the lock so the task can schedule again
            if !entry.handle.is_cancelled() {
                (entry.task)();
                fired += 1;
            }
        }
        if fired == Self::MAX_FIRES_PER_CALL {
            log::warn!("[ManualTimer] Fire cap reached at {} ms", self.now_ms());
        }
        fired
    }

    fn pop_due(&self, target: f64) -> Option<Scheduled> {
        let mut queue = self.queue.lock();
        queue.entries.retain(|e| !e.handle.is_cancelled());

        let index = queue
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due_ms <= target)
            .min_by(|(_, a), (_, b)| a.due_ms.total_cmp(&b.due_ms).then(a.seq.cmp(&b.seq)))
            .map(|(i, _)| i)?;

        let entry = queue.entries.swap_remove(index);
        if entry.due_ms > queue.now_ms {
            queue.now_ms = entry.due_ms;
        }
        Some(entry)
    }
}

impl Timer for ManualTimer {
    fn schedule(&self, delay_ms: f64, task: TimerTask) -> TimerHandle {
        let handle = TimerHandle::new(None);
        let mut queue = self.queue.lock();
        let seq = queue.next_seq;
        queue.next_seq += 1;
        let due_ms = queue.now_ms + delay_ms.max(0.0);
        queue.entries.push(Scheduled {
            due_ms,
            seq,
            handle: handle.clone(),
            task,
        });
        handle
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// WALL-CLOCK TIMER
// ═══════════════════════════════════════════════════════════════════════════

/// Wall-clock timer. Each task waits on its own thread; cancelling wakes the
/// thread immediately and the task is dropped without running.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadTimer;

impl ThreadTimer {
    pub fn new() -> Self {
        Self
    }
}

impl Timer for ThreadTimer {
    fn schedule(&self, delay_ms: f64, task: TimerTask) -> TimerHandle {
        let (wake_tx, wake_rx) = bounded::<()>(1);
        let keepalive = wake_tx.clone();
        let handle = TimerHandle::new(Some(wake_tx));
        let cancelled = Arc::clone(&handle.cancelled);
        let delay = match Duration::try_from_secs_f64(delay_ms.max(0.0) / 1000.0) {
            Ok(delay) => delay,
            Err(e) => {
                log::error!("[ThreadTimer] Invalid delay {} ms: {}", delay_ms, e);
                handle.cancel();
                return handle;
            }
        };

        let spawned = thread::Builder::new()
            .name("rf-wheel-timer".into())
            .spawn(move || {
                // Holding a sender keeps the channel connected until timeout
                let _keepalive = keepalive;
                match wake_rx.recv_timeout(delay) {
                    Err(RecvTimeoutError::Timeout) if !cancelled.load(Ordering::Acquire) => task(),
                    _ => {}
                }
            });

        if let Err(e) = spawned {
            log::error!("[ThreadTimer] Failed to spawn timer thread: {}", e);
            handle.cancel();
        }
        handle
    }
}
