//! Headless wheel
//!
//! The whole spin pipeline on one virtual clock.
//!
//! ```text
//!            ┌──────────────┐ animate_to ┌───────────────────┐
//!  spin() ──▶│ SpinMachine  │───────────▶│ TransitionTracker │
//!            └──────┬───────┘            └─────────┬─────────┘
//!                   │ start                        │ finished (spin id)
//!            ┌──────▼───────┐  ticks  ┌──────────┐ │
//!            │SpinScheduler │────────▶│SoundBoard│ │
//!            └──────┬───────┘         └────┬─────┘ │
//!                   │ schedule             │ clips │
//!            ┌──────▼───────┐         ┌────▼─────┐ │
//!            │ ManualTimer  │         │ Recorder │ │
//!            └──────────────┘         └──────────┘ │
//!  advance(ms) drives the timer and the tracker, then feeds the
//!  completion back into the machine ◀──────────────┘
//! ```

use std::sync::Arc;

use rf_core::{Partition, RfResult};

use crate::audio::{AudioOutput, ClipRecorder, SoundBoard};
use crate::config::WheelConfig;
use crate::machine::{SpinMachine, SpinOutcome, SpinTarget, validate_offset};
use crate::scheduler::{SpinScheduler, TickSink};
use crate::session::SpinSession;
use crate::timer::{ManualTimer, Timer};
use crate::transition::TransitionTracker;

/// Animation frame step used by [`HeadlessWheel::run_to_completion`] (60 fps)
pub const FRAME_MS: f64 = 1000.0 / 60.0;

/// Upper bound on frames stepped by one `run_to_completion` call
const MAX_FRAMES: usize = 1_000_000;

/// A complete wheel driven by explicit clock steps
pub struct HeadlessWheel {
    config: WheelConfig,
    partitions: Vec<Partition>,
    machine: SpinMachine,
    face: TransitionTracker,
    timer: Arc<ManualTimer>,
    sound: Arc<SoundBoard>,
    recorder: Arc<ClipRecorder>,
    history: Vec<SpinOutcome>,
}

impl HeadlessWheel {
    pub fn new(config: WheelConfig, partitions: Vec<Partition>) -> Self {
        Self::with_session(config, partitions, SpinSession::new())
    }

    /// Continue from a restored session
    pub fn with_session(
        config: WheelConfig,
        partitions: Vec<Partition>,
        session: SpinSession,
    ) -> Self {
        let timer = Arc::new(ManualTimer::new());
        let recorder = Arc::new(ClipRecorder::new(config.audio.sample_rate));
        let sound = Arc::new(SoundBoard::new(
            &config,
            Some(Arc::clone(&recorder) as Arc<dyn AudioOutput>),
        ));
        let scheduler = SpinScheduler::new(
            Arc::clone(&timer) as Arc<dyn Timer>,
            Arc::clone(&sound) as Arc<dyn TickSink>,
            &config.ticks,
            config.spin.seed,
        );
        let machine = SpinMachine::with_session(config.spin.clone(), session)
            .with_scheduler(scheduler)
            .with_sound(Arc::clone(&sound));

        let mut face = TransitionTracker::new();
        face.set_rest(machine.rotation_degrees());

        log::info!(
            "[HeadlessWheel] Ready: {} partitions, {:?} profile",
            partitions.len(),
            config.profile
        );

        Self {
            config,
            partitions,
            machine,
            face,
            timer,
            sound,
            recorder,
            history: Vec::new(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // ACCESSORS
    // ═══════════════════════════════════════════════════════════════════════

    pub fn config(&self) -> &WheelConfig {
        &self.config
    }

    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    /// Replace the partition list. Allowed mid-spin; the spin in flight
    /// resolves per the configured partition source.
    pub fn set_partitions(&mut self, partitions: Vec<Partition>) {
        self.partitions = partitions;
    }

    pub fn machine(&self) -> &SpinMachine {
        &self.machine
    }

    pub fn session(&self) -> &SpinSession {
        self.machine.session()
    }

    pub fn face(&self) -> &TransitionTracker {
        &self.face
    }

    /// Rotation currently shown by the wheel face
    pub fn displayed_rotation(&self) -> f64 {
        self.face.current_rotation()
    }

    pub fn sound(&self) -> &SoundBoard {
        &self.sound
    }

    /// Clips of the latest spin
    pub fn recorder(&self) -> &ClipRecorder {
        &self.recorder
    }

    /// Virtual time since construction (ms)
    pub fn now_ms(&self) -> f64 {
        self.timer.now_ms()
    }

    /// Every outcome delivered so far, oldest first
    pub fn history(&self) -> &[SpinOutcome] {
        &self.history
    }

    pub fn dismiss_result(&mut self) {
        self.machine.dismiss_result();
    }

    // ═══════════════════════════════════════════════════════════════════════
    // SPIN CONTROL
    // ═══════════════════════════════════════════════════════════════════════

    /// Start a random spin. `None` while one is already in flight.
    pub fn spin(&mut self) -> Option<SpinTarget> {
        if self.machine.is_spinning() {
            return None;
        }
        self.recorder.clear();
        self.machine.request_spin(&self.partitions, &mut self.face)
    }

    /// Start a spin with an explicit offset in `[0, 360)`
    pub fn spin_with_offset(&mut self, offset_degrees: f64) -> RfResult<Option<SpinTarget>> {
        let offset = validate_offset(offset_degrees)?;
        if !self.machine.is_spinning() {
            self.recorder.clear();
        }
        self.machine
            .request_spin_with_offset(&self.partitions, offset, &mut self.face)
    }

    /// Start a spin that lands on `partition_id`
    pub fn spin_to(&mut self, partition_id: &str) -> RfResult<Option<SpinTarget>> {
        let offset = self.machine.forced_offset(&self.partitions, partition_id)?;
        self.spin_with_offset(offset)
    }

    /// Advance the clock by `ms`. Returns the outcome when the spin in
    /// flight completes during this step.
    pub fn advance(&mut self, ms: f64) -> Option<SpinOutcome> {
        self.timer.advance(ms);
        let finished = self.face.advance(ms)?;
        if self.machine.current_spin() != Some(finished) {
            log::debug!("[HeadlessWheel] Stale completion for spin {}", finished);
            return None;
        }
        let outcome = self.machine.on_animation_complete(&self.partitions)?;
        self.history.push(outcome.clone());
        Some(outcome)
    }

    /// Step frames until the spin in flight completes.
    /// Returns `None` when nothing is spinning.
    pub fn run_to_completion(&mut self) -> Option<SpinOutcome> {
        if !self.machine.is_spinning() {
            return None;
        }
        for _ in 0..MAX_FRAMES {
            if let Some(outcome) = self.advance(FRAME_MS) {
                return Some(outcome);
            }
            if !self.machine.is_spinning() {
                break;
            }
        }
        log::warn!("[HeadlessWheel] Spin did not complete");
        None
    }

    /// Spin and run to the end in one call
    pub fn spin_once(&mut self) -> Option<SpinOutcome> {
        self.spin()?;
        self.run_to_completion()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::ClipKind;
    use crate::scheduler::TickCurve;
    use rf_core::default_partitions;

    fn wheel() -> HeadlessWheel {
        HeadlessWheel::new(WheelConfig::normal().with_seed(42), default_partitions())
    }

    #[test]
    fn test_spin_runs_to_winner() {
        let mut wheel = wheel();
        let target = wheel.spin().unwrap();
        assert!(wheel.session().is_spinning);

        let outcome = wheel.run_to_completion().unwrap();
        let winner = outcome.winner().unwrap();
        assert!(wheel.partitions().iter().any(|p| p.id == winner.id));
        assert_eq!(wheel.session().winner.as_ref(), Some(winner));
        assert_eq!(wheel.displayed_rotation(), target.target_rotation_degrees);
        assert_eq!(wheel.history().len(), 1);
        assert!(wheel.now_ms() >= 4000.0);
    }

    #[test]
    fn test_completion_only_after_duration() {
        let mut wheel = wheel();
        wheel.spin().unwrap();
        assert!(wheel.advance(3999.0).is_none());
        assert!(wheel.session().is_spinning);
        assert!(wheel.advance(1.0).is_some());
        assert!(wheel.advance(1000.0).is_none());
        assert_eq!(wheel.history().len(), 1);
    }

    #[test]
    fn test_spin_while_spinning() {
        let mut wheel = wheel();
        let first = wheel.spin().unwrap();
        wheel.advance(1000.0);
        assert!(wheel.spin().is_none());
        assert_eq!(wheel.session().rotation_degrees, first.target_rotation_degrees);
        assert!(wheel.run_to_completion().is_some());
        assert!(wheel.run_to_completion().is_none());
    }

    #[test]
    fn test_audio_timeline() {
        let mut wheel = wheel();
        wheel.spin_once().unwrap();

        let plan = TickCurve::default().plan(4000.0, 150.0);
        assert_eq!(wheel.recorder().count(ClipKind::Click), plan.len());
        assert_eq!(wheel.recorder().count(ClipKind::WinChime), 1);

        // Next spin starts a fresh recording
        wheel.spin().unwrap();
        assert_eq!(wheel.recorder().count(ClipKind::Click), 1);
        assert_eq!(wheel.recorder().count(ClipKind::WinChime), 0);
    }

    #[test]
    fn test_rejected_spin_keeps_recording() {
        let mut wheel = wheel();
        wheel.spin_once().unwrap();
        let clips = wheel.recorder().clips().len();
        assert!(clips > 0);

        assert!(wheel.spin_with_offset(360.0).is_err());
        assert!(wheel.spin_with_offset(f64::NAN).is_err());
        assert!(wheel.spin_to("ghost").is_err());
        assert!(!wheel.session().is_spinning);
        assert_eq!(wheel.recorder().clips().len(), clips);
        assert_eq!(wheel.recorder().count(ClipKind::WinChime), 1);
    }

    #[test]
    fn test_turbo_keeps_full_turns() {
        let mut wheel =
            HeadlessWheel::new(WheelConfig::turbo().with_seed(8), default_partitions());
        let target = wheel.spin_with_offset(0.0).unwrap().unwrap();
        assert_eq!(target.target_rotation_degrees, 1800.0);
        assert_eq!(target.animation_duration_ms, 2000.0);
        wheel.run_to_completion().unwrap();

        for _ in 0..10 {
            let before = wheel.session().rotation_degrees;
            wheel.spin_once().unwrap();
            assert!(wheel.session().rotation_degrees - before >= 1800.0);
        }
    }

    #[test]
    fn test_muted_wheel_is_silent() {
        let mut wheel = wheel();
        assert!(wheel.sound().toggle_mute());
        wheel.spin_once().unwrap();
        assert!(wheel.recorder().clips().is_empty());
    }

    #[test]
    fn test_forced_spin() {
        let mut wheel = wheel();
        for id in ["3", "1", "6"] {
            wheel.spin_to(id).unwrap().unwrap();
            let outcome = wheel.run_to_completion().unwrap();
            assert_eq!(outcome.winner().unwrap().id, id);
        }
    }

    #[test]
    fn test_edit_mid_spin_uses_snapshot() {
        let mut wheel = HeadlessWheel::new(WheelConfig::turbo().with_seed(5), default_partitions());
        wheel.spin_to("6").unwrap().unwrap();
        wheel.advance(500.0);
        wheel.set_partitions(default_partitions()[..5].to_vec());
        let outcome = wheel.run_to_completion().unwrap();
        assert_eq!(outcome.winner().unwrap().id, "6");
    }

    #[test]
    fn test_restored_session_rests_at_rotation() {
        let session = SpinSession::restore(725.0, None).unwrap();
        let mut wheel =
            HeadlessWheel::with_session(WheelConfig::normal(), default_partitions(), session);
        assert_eq!(wheel.displayed_rotation(), 725.0);

        let target = wheel.spin_with_offset(0.0).unwrap().unwrap();
        assert_eq!(target.target_rotation_degrees, 2525.0);
        assert_eq!(wheel.face().transition().unwrap().from_degrees, 725.0);
    }

    #[test]
    fn test_empty_wheel() {
        let mut wheel = HeadlessWheel::new(WheelConfig::turbo(), Vec::new());
        assert_eq!(wheel.spin_once(), Some(SpinOutcome::NoWinner));
        assert_eq!(wheel.recorder().count(ClipKind::WinChime), 0);
    }
}
