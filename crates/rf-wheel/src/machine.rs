//! Spin state machine
//!
//! ```text
//!   Idle ──request_spin──▶ Spinning ──on_animation_complete──▶ Idle (+ winner)
//!    ▲                        │                                     │
//!    └────────────────────────┴──────────── request_spin ◀──────────┘
//! ```
//!
//! The machine exclusively owns the [`SpinSession`]. Every transition is
//! guarded by `is_spinning`, so overlapping spin requests and duplicate
//! completion signals are no-ops.

use std::sync::Arc;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rf_core::{Partition, RfError, RfResult};
use serde::{Deserialize, Serialize};

use crate::audio::SoundBoard;
use crate::config::{PartitionSource, SpinConfig};
use crate::resolver::{resolve, rotation_offset_for};
use crate::scheduler::SpinScheduler;
use crate::session::{SpinSession, validate_rotation};

/// What the render side needs to animate one spin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpinTarget {
    /// Monotonic spin counter, used to match completion signals
    pub spin_id: u64,
    pub target_rotation_degrees: f64,
    pub animation_duration_ms: f64,
}

/// The animated view. Must signal completion back to the machine exactly
/// once per target, after the transition finishes.
pub trait RenderSync {
    fn animate_to(&mut self, target: &SpinTarget);
}

/// Result of a completed spin
#[derive(Debug, Clone, PartialEq)]
pub enum SpinOutcome {
    Winner(Partition),
    /// Spin finished on an empty wheel
    NoWinner,
}

impl SpinOutcome {
    pub fn winner(&self) -> Option<&Partition> {
        match self {
            Self::Winner(partition) => Some(partition),
            Self::NoWinner => None,
        }
    }
}

/// Owns one wheel's session and drives it through spins
pub struct SpinMachine {
    session: SpinSession,
    config: SpinConfig,
    rng: ChaCha8Rng,
    scheduler: Option<SpinScheduler>,
    sound: Option<Arc<SoundBoard>>,
    /// Partitions captured at spin start (snapshot mode)
    snapshot: Vec<Partition>,
    spin_count: u64,
}

impl SpinMachine {
    /// Machine with a fresh session
    pub fn new(config: SpinConfig) -> Self {
        Self::with_session(config, SpinSession::new())
    }

    /// Machine continuing a restored session
    pub fn with_session(config: SpinConfig, mut session: SpinSession) -> Self {
        let rng = match config.seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_os_rng(),
        };
        // A restored session can never receive the completion of a past spin
        session.is_spinning = false;
        if validate_rotation(session.rotation_degrees).is_err() {
            log::warn!(
                "[SpinMachine] Discarding invalid restored rotation {}",
                session.rotation_degrees
            );
            session.rotation_degrees = 0.0;
        }
        Self {
            session,
            config,
            rng,
            scheduler: None,
            sound: None,
            snapshot: Vec::new(),
            spin_count: 0,
        }
    }

    /// Attach the deceleration tick scheduler
    pub fn with_scheduler(mut self, scheduler: SpinScheduler) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Attach the sound board used for the win chime
    pub fn with_sound(mut self, sound: Arc<SoundBoard>) -> Self {
        self.sound = Some(sound);
        self
    }

    /// Reseed the offset RNG for reproducible spins
    pub fn seed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    // ═══════════════════════════════════════════════════════════════════════
    // STATE ACCESS
    // ═══════════════════════════════════════════════════════════════════════

    pub fn session(&self) -> &SpinSession {
        &self.session
    }

    pub fn config(&self) -> &SpinConfig {
        &self.config
    }

    pub fn is_spinning(&self) -> bool {
        self.session.is_spinning
    }

    pub fn rotation_degrees(&self) -> f64 {
        self.session.rotation_degrees
    }

    pub fn winner(&self) -> Option<&Partition> {
        self.session.winner.as_ref()
    }

    /// Number of spins started by this machine
    pub fn spin_count(&self) -> u64 {
        self.spin_count
    }

    /// Id of the spin in flight
    pub fn current_spin(&self) -> Option<u64> {
        self.session.is_spinning.then_some(self.spin_count)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // TRANSITIONS
    // ═══════════════════════════════════════════════════════════════════════

    /// Start a spin with a random offset.
    ///
    /// Returns `None` (and changes nothing) while a spin is in flight.
    pub fn request_spin(
        &mut self,
        partitions: &[Partition],
        render: &mut dyn RenderSync,
    ) -> Option<SpinTarget> {
        if self.session.is_spinning {
            log::debug!("[SpinMachine] Spin requested while spinning; ignored");
            return None;
        }
        let offset = self.random_offset();
        self.begin_spin(partitions, offset, render)
    }

    /// Start a spin with an explicit offset in `[0, 360)` degrees
    pub fn request_spin_with_offset(
        &mut self,
        partitions: &[Partition],
        offset_degrees: f64,
        render: &mut dyn RenderSync,
    ) -> RfResult<Option<SpinTarget>> {
        validate_offset(offset_degrees)?;
        if self.session.is_spinning {
            log::debug!("[SpinMachine] Spin requested while spinning; ignored");
            return Ok(None);
        }
        Ok(self.begin_spin(partitions, offset_degrees, render))
    }

    /// Start a spin that comes to rest on the centre of `partition_id`
    pub fn request_spin_forced(
        &mut self,
        partitions: &[Partition],
        partition_id: &str,
        render: &mut dyn RenderSync,
    ) -> RfResult<Option<SpinTarget>> {
        let offset = self.forced_offset(partitions, partition_id)?;
        self.request_spin_with_offset(partitions, offset, render)
    }

    /// Offset that brings `partition_id` under the pointer from the current rotation
    pub fn forced_offset(&self, partitions: &[Partition], partition_id: &str) -> RfResult<f64> {
        if partitions.is_empty() {
            return Err(RfError::EmptyWheel);
        }
        let index = partitions
            .iter()
            .position(|p| p.id == partition_id)
            .ok_or_else(|| RfError::UnknownPartition(partition_id.to_string()))?;
        rotation_offset_for(index, partitions.len(), self.session.rotation_degrees)
            .ok_or(RfError::InvalidRotation(self.session.rotation_degrees))
    }

    fn random_offset(&mut self) -> f64 {
        let raw: f64 = self.rng.random_range(0.0..360.0);
        if self.config.whole_degree_offsets {
            raw.floor()
        } else {
            raw
        }
    }

    fn begin_spin(
        &mut self,
        partitions: &[Partition],
        offset_degrees: f64,
        render: &mut dyn RenderSync,
    ) -> Option<SpinTarget> {
        let new_rotation = match validate_rotation(
            self.session.rotation_degrees + self.config.min_increment_degrees() + offset_degrees,
        ) {
            Ok(rotation) => rotation,
            Err(e) => {
                log::error!("[SpinMachine] Spin rejected: {}", e);
                return None;
            }
        };

        self.session.winner = None;
        if let Some(scheduler) = &self.scheduler {
            scheduler.start(self.config.animation_duration_ms);
        }
        self.snapshot = match self.config.partition_source {
            PartitionSource::Snapshot => partitions.to_vec(),
            PartitionSource::Live => Vec::new(),
        };
        self.session.rotation_degrees = new_rotation;
        self.session.is_spinning = true;
        self.spin_count += 1;

        let target = SpinTarget {
            spin_id: self.spin_count,
            target_rotation_degrees: new_rotation,
            animation_duration_ms: self.config.animation_duration_ms,
        };
        log::debug!(
            "[SpinMachine] Spin {} → {:.1}° (offset {:.1}°)",
            target.spin_id,
            new_rotation,
            offset_degrees
        );
        render.animate_to(&target);
        Some(target)
    }

    /// Completion signal from the render side.
    ///
    /// Returns `None` when no spin is in flight (duplicate or stray signal).
    /// `current` is the partition list as it is now; it is only consulted in
    /// [`PartitionSource::Live`] mode.
    pub fn on_animation_complete(&mut self, current: &[Partition]) -> Option<SpinOutcome> {
        if !self.session.is_spinning {
            log::debug!("[SpinMachine] Completion without a spin in flight; ignored");
            return None;
        }

        let snapshot = std::mem::take(&mut self.snapshot);
        let partitions = match self.config.partition_source {
            PartitionSource::Snapshot => snapshot.as_slice(),
            PartitionSource::Live => current,
        };

        let winner = resolve(self.session.rotation_degrees, partitions).cloned();
        self.session.is_spinning = false;
        self.session.winner = winner.clone();

        match winner {
            Some(partition) => {
                log::info!(
                    "[SpinMachine] Spin {} landed on '{}' at {:.1}°",
                    self.spin_count,
                    partition.label,
                    self.session.rotation_degrees
                );
                if let Some(sound) = &self.sound {
                    sound.play_win(self.config.animation_duration_ms);
                }
                Some(SpinOutcome::Winner(partition))
            }
            None => {
                log::warn!("[SpinMachine] Spin {} finished with no winner", self.spin_count);
                Some(SpinOutcome::NoWinner)
            }
        }
    }

    /// Clear the displayed winner. Rotation and spinning state are untouched.
    pub fn dismiss_result(&mut self) {
        self.session.winner = None;
    }
}

/// Accept an explicit spin offset only in `[0, 360)` degrees
pub fn validate_offset(offset_degrees: f64) -> RfResult<f64> {
    if offset_degrees.is_finite() && (0.0..360.0).contains(&offset_degrees) {
        Ok(offset_degrees)
    } else {
        Err(RfError::InvalidRotation(offset_degrees))
    }
}
