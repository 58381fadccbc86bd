//! rf-core: Shared types, traits, and utilities for the ReelForge wheel
//!
//! This crate provides the foundational types used across the wheel crates:
//! partitions, players, and the common error type.

mod error;
mod partition;
mod player;

pub use error::*;
pub use partition::*;
pub use player::*;

/// Output sample rate options for procedural audio
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[repr(u32)]
pub enum SampleRate {
    Hz22050 = 22050,
    Hz44100 = 44100,
    Hz48000 = 48000,
}

impl SampleRate {
    #[inline]
    pub fn as_f64(self) -> f64 {
        self as u32 as f64
    }

    #[inline]
    pub fn as_u32(self) -> u32 {
        self as u32
    }

    /// Number of samples covering `ms` milliseconds
    #[inline]
    pub fn samples_for_ms(self, ms: f64) -> usize {
        (ms.max(0.0) * self.as_f64() / 1000.0).round() as usize
    }
}

impl Default for SampleRate {
    fn default() -> Self {
        Self::Hz48000
    }
}
