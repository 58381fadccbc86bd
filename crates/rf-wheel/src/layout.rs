//! Partition layout: equal-weight pie slices
//!
//! Slice `k` of `n` covers `[k·2π/n, (k+1)·2π/n)`, starting at angle 0 and
//! proceeding in the increasing-angle direction, in source order. Angles are
//! derived from the turn fraction `k/n` so that a pointer expressed as a turn
//! fraction compares exactly against slice boundaries.

use std::f64::consts::TAU;

use rf_core::Partition;
use serde::{Deserialize, Serialize};

/// Angular interval assigned to one partition (radians)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AngularSlice {
    pub partition_id: String,
    pub start_angle: f64,
    pub end_angle: f64,
}

impl AngularSlice {
    /// Half-open containment: `start <= angle < end`
    #[inline]
    pub fn contains(&self, angle: f64) -> bool {
        angle >= self.start_angle && angle < self.end_angle
    }

    /// Angular width (radians)
    pub fn span(&self) -> f64 {
        self.end_angle - self.start_angle
    }

    /// Bisector angle (radians)
    pub fn mid_angle(&self) -> f64 {
        (self.start_angle + self.end_angle) / 2.0
    }

    /// Rotation that keeps a label readable along the slice bisector (degrees)
    pub fn label_rotation_degrees(&self) -> f64 {
        self.mid_angle().to_degrees() - 90.0
    }
}

/// Angle of boundary `k` on an `n`-slice wheel
#[inline]
pub(crate) fn boundary_angle(k: usize, n: usize) -> f64 {
    TAU * (k as f64 / n as f64)
}

/// Lay partitions out as contiguous equal slices covering `[0, 2π)`.
///
/// Returns an empty list for an empty wheel.
pub fn layout(partitions: &[Partition]) -> Vec<AngularSlice> {
    let n = partitions.len();
    partitions
        .iter()
        .enumerate()
        .map(|(k, partition)| AngularSlice {
            partition_id: partition.id.clone(),
            start_angle: boundary_angle(k, n),
            end_angle: boundary_angle(k + 1, n),
        })
        .collect()
}

/// Label font size used by the wheel face for `count` partitions (px)
pub fn label_font_size(count: usize) -> f64 {
    (24.0 - count as f64).max(12.0)
}
