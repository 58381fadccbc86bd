//! Spin scheduler: decelerating tick sequence
//!
//! Ticks start `base_interval_ms` apart and the gap grows with the square of
//! spin progress, like a flywheel running down:
//!
//! ```text
//! interval(p) = base + p² · max_extra        p = elapsed / total, clamped to [0, 1]
//! ```
//!
//! The sequence is a self-rescheduling timer chain. Each `start()` opens a new
//! generation; `stop()` closes it and cancels the pending task under the same
//! lock, so a callback from an older generation is always a no-op.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::TickConfig;
use crate::timer::{Timer, TimerHandle};

/// Floor for a tick interval, so a zero base interval cannot spin the chain
const MIN_INTERVAL_MS: f64 = 1.0;

/// One emitted tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickEvent {
    /// Position in the sequence (0 = first)
    pub index: u32,
    /// Offset from sequence start (ms)
    pub at_ms: f64,
    /// Gap since the previous tick (0 for the first)
    pub since_previous_ms: f64,
    /// Click pitch, jitter included (Hz)
    pub pitch_hz: f64,
}

/// Receives ticks as they are emitted
pub trait TickSink: Send + Sync {
    fn on_tick(&self, tick: &TickEvent);
}

impl<F> TickSink for F
where
    F: Fn(&TickEvent) + Send + Sync,
{
    fn on_tick(&self, tick: &TickEvent) {
        self(tick)
    }
}

/// Sink that keeps every tick it receives
#[derive(Debug, Default)]
pub struct TickLog {
    ticks: Mutex<Vec<TickEvent>>,
}

impl TickLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ticks(&self) -> Vec<TickEvent> {
        self.ticks.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.ticks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.lock().is_empty()
    }

    pub fn clear(&self) {
        self.ticks.lock().clear();
    }
}

impl TickSink for TickLog {
    fn on_tick(&self, tick: &TickEvent) {
        self.ticks.lock().push(*tick);
    }
}

/// Quadratic deceleration curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickCurve {
    pub base_interval_ms: f64,
    pub max_extra_interval_ms: f64,
}

impl TickCurve {
    pub fn from_config(config: &TickConfig) -> Self {
        Self {
            base_interval_ms: config.base_interval_ms,
            max_extra_interval_ms: config.max_extra_interval_ms,
        }
    }

    /// Gap after a tick emitted at `elapsed_ms` into a `total_ms` sequence
    pub fn interval_at(&self, elapsed_ms: f64, total_ms: f64) -> f64 {
        let progress = if total_ms > 0.0 {
            (elapsed_ms / total_ms).clamp(0.0, 1.0)
        } else {
            1.0
        };
        (self.base_interval_ms + progress * progress * self.max_extra_interval_ms)
            .max(MIN_INTERVAL_MS)
    }

    /// Full tick schedule for a `total_ms` sequence, at nominal pitch
    pub fn plan(&self, total_ms: f64, pitch_hz: f64) -> Vec<TickEvent> {
        let total_ms = sanitize_total(total_ms);
        let mut ticks = Vec::new();
        let mut elapsed = 0.0;
        let mut previous = 0.0;

        while elapsed < total_ms {
            let index = ticks.len() as u32;
            ticks.push(TickEvent {
                index,
                at_ms: elapsed,
                since_previous_ms: if index == 0 { 0.0 } else { elapsed - previous },
                pitch_hz,
            });
            previous = elapsed;
            elapsed += self.interval_at(elapsed, total_ms);
        }
        ticks
    }
}

impl Default for TickCurve {
    fn default() -> Self {
        Self::from_config(&TickConfig::default())
    }
}

fn sanitize_total(total_ms: f64) -> f64 {
    if total_ms.is_finite() { total_ms.max(0.0) } else { 0.0 }
}

struct ChainState {
    generation: u64,
    active: bool,
    pending: Option<TimerHandle>,
    elapsed_ms: f64,
    total_ms: f64,
    next_index: u32,
    last_at_ms: f64,
    rng: ChaCha8Rng,
}

impl ChainState {
    /// Close the current generation and cancel its pending tick
    fn close(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.active = false;
        if let Some(handle) = self.pending.take() {
            handle.cancel();
        }
    }
}

struct SchedulerShared {
    timer: Arc<dyn Timer>,
    sink: Arc<dyn TickSink>,
    curve: TickCurve,
    pitch_hz: f64,
    pitch_jitter_hz: f64,
    state: Mutex<ChainState>,
}

impl SchedulerShared {
    fn jittered_pitch(&self, rng: &mut ChaCha8Rng) -> f64 {
        if self.pitch_jitter_hz > 0.0 {
            self.pitch_hz + rng.random_range(-self.pitch_jitter_hz..=self.pitch_jitter_hz)
        } else {
            self.pitch_hz
        }
    }
}

/// Drives the deceleration ticks of one wheel
pub struct SpinScheduler {
    shared: Arc<SchedulerShared>,
}

impl SpinScheduler {
    pub fn new(
        timer: Arc<dyn Timer>,
        sink: Arc<dyn TickSink>,
        config: &TickConfig,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_os_rng(),
        };
        Self {
            shared: Arc::new(SchedulerShared {
                timer,
                sink,
                curve: TickCurve::from_config(config),
                pitch_hz: config.pitch_hz,
                pitch_jitter_hz: config.pitch_jitter_hz.max(0.0),
                state: Mutex::new(ChainState {
                    generation: 0,
                    active: false,
                    pending: None,
                    elapsed_ms: 0.0,
                    total_ms: 0.0,
                    next_index: 0,
                    last_at_ms: 0.0,
                    rng,
                }),
            }),
        }
    }

    /// Start a new tick sequence lasting at most `total_ms`.
    ///
    /// Any sequence still running is cancelled first. The first tick is
    /// emitted before this returns.
    pub fn start(&self, total_ms: f64) {
        let generation = {
            let mut state = self.shared.state.lock();
            state.close();
            state.active = true;
            state.elapsed_ms = 0.0;
            state.total_ms = sanitize_total(total_ms);
            state.next_index = 0;
            state.last_at_ms = 0.0;
            state.generation
        };
        log::debug!("[SpinScheduler] Start: {} ms (generation {})", total_ms, generation);
        fire(&self.shared, generation);
    }

    /// Cancel the pending tick, if any. Idempotent.
    pub fn stop(&self) {
        let mut state = self.shared.state.lock();
        if state.active {
            log::debug!("[SpinScheduler] Stop (generation {})", state.generation);
        }
        state.close();
    }

    /// A sequence is running and has ticks left
    pub fn is_active(&self) -> bool {
        self.shared.state.lock().active
    }

    pub fn curve(&self) -> TickCurve {
        self.shared.curve
    }
}

impl Drop for SpinScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Emit one tick for `generation` and schedule the next
fn fire(shared: &Arc<SchedulerShared>, generation: u64) {
    let tick = {
        let mut state = shared.state.lock();
        if state.generation != generation || !state.active {
            return;
        }
        state.pending = None;
        if state.elapsed_ms >= state.total_ms {
            state.active = false;
            return;
        }

        let at_ms = state.elapsed_ms;
        let index = state.next_index;
        let pitch_hz = shared.jittered_pitch(&mut state.rng);
        let tick = TickEvent {
            index,
            at_ms,
            since_previous_ms: if index == 0 { 0.0 } else { at_ms - state.last_at_ms },
            pitch_hz,
        };
        state.next_index += 1;
        state.last_at_ms = at_ms;

        let interval = shared.curve.interval_at(at_ms, state.total_ms);
        state.elapsed_ms += interval;

        if state.elapsed_ms < state.total_ms {
            let weak: Weak<SchedulerShared> = Arc::downgrade(shared);
            let handle = shared.timer.schedule(
                interval,
                Box::new(move || {
                    if let Some(shared) = weak.upgrade() {
                        fire(&shared, generation);
                    }
                }),
            );
            state.pending = Some(handle);
        } else {
            state.active = false;
        }
        tick
    };

    shared.sink.on_tick(&tick);
}
