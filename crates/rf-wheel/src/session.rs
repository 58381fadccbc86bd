//! Spin session: the accumulated wheel state that survives across spins

use rf_core::{Partition, RfError, RfResult};
use serde::{Deserialize, Serialize};

/// Rotation/spinning/winner state of one wheel.
///
/// `rotation_degrees` never decreases: the wheel always keeps turning forward
/// from where it last came to rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpinSession {
    pub rotation_degrees: f64,
    pub is_spinning: bool,
    pub winner: Option<Partition>,
}

impl SpinSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a session from persisted values, validating the rotation
    pub fn restore(rotation_degrees: f64, winner: Option<Partition>) -> RfResult<Self> {
        Ok(Self {
            rotation_degrees: validate_rotation(rotation_degrees)?,
            // A persisted spin can never complete, so it comes back at rest
            is_spinning: false,
            winner,
        })
    }

    /// Idle with a result on display
    pub fn has_result(&self) -> bool {
        !self.is_spinning && self.winner.is_some()
    }
}

/// Reject rotations that cannot be resolved (non-finite or negative)
pub fn validate_rotation(degrees: f64) -> RfResult<f64> {
    if degrees.is_finite() && degrees >= 0.0 {
        Ok(degrees)
    } else {
        Err(RfError::InvalidRotation(degrees))
    }
}
