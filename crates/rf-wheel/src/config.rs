//! Wheel configuration and timing profiles

use rf_core::{RfResult, SampleRate};
use serde::{Deserialize, Serialize};

/// Timing profile for the spin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimingProfile {
    /// Normal gameplay timing
    #[default]
    Normal,
    /// Fast/Turbo mode
    Turbo,
    /// Scaled from another profile
    Custom,
}

/// Fewest full turns a spin may add
pub const MIN_FULL_TURNS: u32 = 5;

/// Which partition list the winner is resolved against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PartitionSource {
    /// List captured when the spin was requested
    #[default]
    Snapshot,
    /// List current at animation completion
    Live,
}

/// Spin state machine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinConfig {
    /// Duration of the rotation transition (ms)
    pub animation_duration_ms: f64,
    /// Full turns added to every spin before the random offset.
    /// Values below [`MIN_FULL_TURNS`] are raised to it.
    pub min_full_turns: u32,
    /// Floor the random offset to whole degrees
    pub whole_degree_offsets: bool,
    /// Partition list used at resolution time
    pub partition_source: PartitionSource,
    /// Fixed RNG seed for reproducible sessions
    pub seed: Option<u64>,
}

impl Default for SpinConfig {
    fn default() -> Self {
        Self {
            animation_duration_ms: 4000.0,
            min_full_turns: MIN_FULL_TURNS,
            whole_degree_offsets: true,
            partition_source: PartitionSource::Snapshot,
            seed: None,
        }
    }
}

impl SpinConfig {
    /// Smallest rotation increment a spin can produce (degrees)
    pub fn min_increment_degrees(&self) -> f64 {
        360.0 * f64::from(self.full_turns())
    }

    /// Full turns actually applied per spin
    pub fn full_turns(&self) -> u32 {
        self.min_full_turns.max(MIN_FULL_TURNS)
    }
}

/// Deceleration tick settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TickConfig {
    /// Interval between ticks at the start of the spin (ms)
    pub base_interval_ms: f64,
    /// Extra interval reached at the end of the spin (ms, quadratic ramp)
    pub max_extra_interval_ms: f64,
    /// Click start pitch (Hz)
    pub pitch_hz: f64,
    /// Click end pitch (Hz)
    pub pitch_end_hz: f64,
    /// Max random pitch offset, either direction (Hz)
    pub pitch_jitter_hz: f64,
    /// Click peak gain (0-1)
    pub gain: f64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            base_interval_ms: 50.0,
            max_extra_interval_ms: 500.0,
            pitch_hz: 150.0,
            pitch_end_hz: 40.0,
            pitch_jitter_hz: 10.0,
            gain: 0.8,
        }
    }
}

/// Procedural audio settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub sample_rate: SampleRate,
    /// Start muted
    pub muted: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: SampleRate::Hz48000,
            muted: false,
        }
    }
}

/// Complete wheel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelConfig {
    pub profile: TimingProfile,
    pub spin: SpinConfig,
    pub ticks: TickConfig,
    pub audio: AudioConfig,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self::normal()
    }
}

impl WheelConfig {
    /// Normal gameplay timing
    pub fn normal() -> Self {
        Self {
            profile: TimingProfile::Normal,
            spin: SpinConfig::default(),
            ticks: TickConfig::default(),
            audio: AudioConfig::default(),
        }
    }

    /// Turbo mode: half the spin, tighter ticks
    pub fn turbo() -> Self {
        Self {
            profile: TimingProfile::Turbo,
            spin: SpinConfig {
                animation_duration_ms: 2000.0,
                ..SpinConfig::default()
            },
            ticks: TickConfig {
                base_interval_ms: 35.0,
                max_extra_interval_ms: 250.0,
                ..TickConfig::default()
            },
            audio: AudioConfig::default(),
        }
    }

    /// Get config for profile
    pub fn from_profile(profile: TimingProfile) -> Self {
        match profile {
            TimingProfile::Normal => Self::normal(),
            TimingProfile::Turbo => Self::turbo(),
            TimingProfile::Custom => Self::normal(),
        }
    }

    /// Scale timing by factor (< 1.0 = faster)
    pub fn scaled(&self, factor: f64) -> Self {
        let factor = factor.max(0.01);
        let mut scaled = self.clone();
        scaled.profile = TimingProfile::Custom;
        scaled.spin.animation_duration_ms *= factor;
        scaled.ticks.base_interval_ms *= factor;
        scaled.ticks.max_extra_interval_ms *= factor;
        scaled
    }

    /// Parse from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> RfResult<Self> {
        let mut config: Self = serde_json::from_str(json)?;
        if config.spin.min_full_turns < MIN_FULL_TURNS {
            log::warn!(
                "[WheelConfig] min_full_turns {} raised to {}",
                config.spin.min_full_turns,
                MIN_FULL_TURNS
            );
            config.spin.min_full_turns = MIN_FULL_TURNS;
        }
        Ok(config)
    }

    pub fn to_json(&self) -> RfResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Fix the RNG seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.spin.seed = Some(seed);
        self
    }
}
