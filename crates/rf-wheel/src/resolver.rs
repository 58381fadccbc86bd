//! Winner resolution: final rotation → winning partition
//!
//! The wheel rotates clockwise with increasing degrees while the pointer
//! stays fixed at slice-space angle 0. The pointer therefore sits at
//! `(360 − rotation mod 360) mod 360` degrees in slice space.

use std::f64::consts::TAU;

use rf_core::Partition;

use crate::layout::layout;

/// Normalize a rotation into `[0, 360)`
#[inline]
pub fn normalize_degrees(degrees: f64) -> f64 {
    let normalized = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if normalized >= 360.0 { 0.0 } else { normalized }
}

/// Pointer position in slice space (degrees, `[0, 360)`)
#[inline]
pub fn pointer_degrees(rotation_degrees: f64) -> f64 {
    normalize_degrees(360.0 - normalize_degrees(rotation_degrees))
}

/// Pointer position in slice space (radians, `[0, 2π)`)
#[inline]
pub fn pointer_radians(rotation_degrees: f64) -> f64 {
    TAU * (pointer_degrees(rotation_degrees) / 360.0)
}

/// Index of the partition under the pointer.
///
/// `None` for an empty wheel or a non-finite rotation.
pub fn resolve_index(rotation_degrees: f64, partitions: &[Partition]) -> Option<usize> {
    if partitions.is_empty() {
        return None;
    }
    if !rotation_degrees.is_finite() {
        log::warn!("[WinnerResolver] Ignoring non-finite rotation {rotation_degrees}");
        return None;
    }

    let pointer = pointer_radians(rotation_degrees);
    let index = layout(partitions)
        .iter()
        .position(|slice| slice.contains(pointer))
        // Only reachable on the 0/2π wrap edge
        .unwrap_or(0);
    Some(index)
}

/// Partition under the pointer after the wheel comes to rest.
///
/// Pure: the slices are re-derived from `partitions` on every call.
pub fn resolve(rotation_degrees: f64, partitions: &[Partition]) -> Option<&Partition> {
    resolve_index(rotation_degrees, partitions).map(|index| &partitions[index])
}

/// Offset (degrees, `[0, 360)`) that brings the pointer to the centre of
/// slice `index` when added to `current_rotation` plus any whole turns.
pub fn rotation_offset_for(index: usize, count: usize, current_rotation: f64) -> Option<f64> {
    if count == 0 || index >= count || !current_rotation.is_finite() {
        return None;
    }
    let pointer_deg = 360.0 * ((index as f64 + 0.5) / count as f64);
    let target_rest = normalize_degrees(360.0 - pointer_deg);
    Some(normalize_degrees(target_rest - normalize_degrees(current_rotation)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rf_core::ColorToken;
    use std::f64::consts::FRAC_PI_2;

    fn abcd() -> Vec<Partition> {
        ["A", "B", "C", "D"]
            .iter()
            .enumerate()
            .map(|(i, label)| Partition::new(*label, *label, ColorToken::cycled(i)))
            .collect()
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_degrees(1830.0), 30.0);
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(-1e-20), 0.0);
    }

    #[test]
    fn test_pointer_conversion() {
        assert_eq!(pointer_degrees(0.0), 0.0);
        assert_eq!(pointer_degrees(30.0), 330.0);
        assert_eq!(pointer_degrees(270.0), 90.0);
        assert_eq!(pointer_radians(270.0), FRAC_PI_2);
    }

    #[test]
    fn test_scenario_offset_thirty() {
        let partitions = abcd();
        let rotation = 0.0 + 360.0 * 5.0 + 30.0;
        assert_eq!(rotation, 1830.0);
        assert_abs_diff_eq!(pointer_radians(rotation), 5.7596, epsilon = 1e-4);
        assert_eq!(resolve(rotation, &partitions).unwrap().id, "D");
    }

    #[test]
    fn test_boundary_belongs_to_next_slice() {
        let partitions = abcd();
        // pointer exactly at π/2 → slice starting at π/2 (B), not A
        assert_eq!(resolve(270.0, &partitions).unwrap().id, "B");
        // pointer exactly at π → C
        assert_eq!(resolve(180.0, &partitions).unwrap().id, "C");
        // pointer exactly at 3π/2 → D
        assert_eq!(resolve(90.0, &partitions).unwrap().id, "D");
        // pointer at 0 → A
        assert_eq!(resolve(0.0, &partitions).unwrap().id, "A");
    }

    #[test]
    fn test_periodicity() {
        let partitions = abcd();
        for r in [0.0, 1.0, 30.0, 89.5, 90.0, 180.0, 270.0, 359.0] {
            let base = resolve(r, &partitions).unwrap().id.clone();
            for k in 1..=20 {
                let turned = r + 360.0 * k as f64;
                assert_eq!(resolve(turned, &partitions).unwrap().id, base, "r={r} k={k}");
            }
        }
    }

    #[test]
    fn test_every_rotation_resolves() {
        let partitions = abcd();
        let mut r = 0.0;
        while r < 720.0 {
            assert!(resolve(r, &partitions).is_some());
            r += 0.25;
        }
    }

    #[test]
    fn test_empty_and_non_finite() {
        assert!(resolve(30.0, &[]).is_none());
        assert!(resolve(f64::NAN, &abcd()).is_none());
        assert!(resolve(f64::INFINITY, &abcd()).is_none());
    }

    #[test]
    fn test_single_partition_always_wins() {
        let single = vec![Partition::new("only", "Only", ColorToken::default())];
        for r in [0.0, 45.0, 180.0, 359.999] {
            assert_eq!(resolve(r, &single).unwrap().id, "only");
        }
    }

    #[test]
    fn test_offset_lands_on_centre() {
        let partitions = abcd();
        for current in [0.0, 17.0, 1830.0, 3725.5] {
            for index in 0..partitions.len() {
                let offset = rotation_offset_for(index, partitions.len(), current).unwrap();
                assert!((0.0..360.0).contains(&offset));
                let rest = current + 1800.0 + offset;
                assert_eq!(resolve_index(rest, &partitions), Some(index));
            }
        }
        assert!(rotation_offset_for(4, 4, 0.0).is_none());
        assert!(rotation_offset_for(0, 0, 0.0).is_none());
    }
}
