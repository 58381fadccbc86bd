//! Render-side rotation transition
//!
//! The wheel face eases from its resting rotation to the spin target over a
//! fixed duration and reports completion exactly once per spin.

use serde::{Deserialize, Serialize};

use crate::machine::{RenderSync, SpinTarget};

/// CSS-style cubic Bézier timing function through (0,0), (x1,y1), (x2,y2), (1,1)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CubicBezier {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl CubicBezier {
    const NEWTON_ITERATIONS: usize = 8;
    const BISECTION_ITERATIONS: usize = 32;
    const EPSILON: f64 = 1e-7;

    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            x1: x1.clamp(0.0, 1.0),
            y1,
            x2: x2.clamp(0.0, 1.0),
            y2,
        }
    }

    /// Heavy-wheel deceleration curve used for spins
    pub fn wheel() -> Self {
        Self::new(0.15, 0.0, 0.15, 1.0)
    }

    pub fn linear() -> Self {
        Self::new(0.0, 0.0, 1.0, 1.0)
    }

    #[inline]
    fn component(t: f64, p1: f64, p2: f64) -> f64 {
        // B(t) = 3(1-t)²t·p1 + 3(1-t)t²·p2 + t³
        let u = 1.0 - t;
        3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t
    }

    #[inline]
    fn component_derivative(t: f64, p1: f64, p2: f64) -> f64 {
        let u = 1.0 - t;
        3.0 * u * u * p1 + 6.0 * u * t * (p2 - p1) + 3.0 * t * t * (1.0 - p2)
    }

    /// Curve parameter whose x equals `x`
    fn solve_t(&self, x: f64) -> f64 {
        let mut t = x;
        for _ in 0..Self::NEWTON_ITERATIONS {
            let err = Self::component(t, self.x1, self.x2) - x;
            if err.abs() < Self::EPSILON {
                return t;
            }
            let slope = Self::component_derivative(t, self.x1, self.x2);
            if slope.abs() < 1e-6 {
                break;
            }
            t = (t - err / slope).clamp(0.0, 1.0);
        }

        // Newton stalled; x(t) is monotonic on [0, 1] so bisection converges
        let (mut lo, mut hi) = (0.0, 1.0);
        t = x;
        for _ in 0..Self::BISECTION_ITERATIONS {
            let value = Self::component(t, self.x1, self.x2);
            if (value - x).abs() < Self::EPSILON {
                break;
            }
            if value < x {
                lo = t;
            } else {
                hi = t;
            }
            t = (lo + hi) / 2.0;
        }
        t
    }

    /// Eased progress for linear progress `x` in [0, 1]
    pub fn ease(&self, x: f64) -> f64 {
        if x <= 0.0 {
            return 0.0;
        }
        if x >= 1.0 {
            return 1.0;
        }
        Self::component(self.solve_t(x), self.y1, self.y2)
    }
}

impl Default for CubicBezier {
    fn default() -> Self {
        Self::wheel()
    }
}

/// One eased rotation from `from_degrees` to `to_degrees`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationTransition {
    pub spin_id: u64,
    pub from_degrees: f64,
    pub to_degrees: f64,
    pub duration_ms: f64,
    pub easing: CubicBezier,
}

impl RotationTransition {
    /// Rotation shown `elapsed_ms` into the transition
    pub fn rotation_at(&self, elapsed_ms: f64) -> f64 {
        if self.duration_ms <= 0.0 {
            return self.to_degrees;
        }
        let progress = (elapsed_ms / self.duration_ms).clamp(0.0, 1.0);
        if progress >= 1.0 {
            return self.to_degrees;
        }
        self.from_degrees + (self.to_degrees - self.from_degrees) * self.easing.ease(progress)
    }

    pub fn is_finished(&self, elapsed_ms: f64) -> bool {
        elapsed_ms >= self.duration_ms
    }
}

#[derive(Debug, Clone)]
struct ActiveTransition {
    transition: RotationTransition,
    elapsed_ms: f64,
}

/// Headless wheel face.
///
/// Tracks at most one transition. Completion is reported once, and only for
/// the spin that started the transition; any other completion signal is
/// ignored.
#[derive(Debug, Clone)]
pub struct TransitionTracker {
    easing: CubicBezier,
    rest_degrees: f64,
    active: Option<ActiveTransition>,
}

impl TransitionTracker {
    pub fn new() -> Self {
        Self::with_easing(CubicBezier::wheel())
    }

    pub fn with_easing(easing: CubicBezier) -> Self {
        Self {
            easing,
            rest_degrees: 0.0,
            active: None,
        }
    }

    /// Snap the face to `degrees`, dropping any running transition
    pub fn set_rest(&mut self, degrees: f64) {
        self.rest_degrees = degrees;
        self.active = None;
    }

    /// Rotation currently shown
    pub fn current_rotation(&self) -> f64 {
        match &self.active {
            Some(active) => active.transition.rotation_at(active.elapsed_ms),
            None => self.rest_degrees,
        }
    }

    /// Spin whose transition is still running
    pub fn pending_spin(&self) -> Option<u64> {
        self.active.as_ref().map(|a| a.transition.spin_id)
    }

    pub fn transition(&self) -> Option<&RotationTransition> {
        self.active.as_ref().map(|a| &a.transition)
    }

    /// Advance the animation clock. Returns the spin id when its transition
    /// finishes during this call.
    pub fn advance(&mut self, ms: f64) -> Option<u64> {
        let active = self.active.as_mut()?;
        active.elapsed_ms += ms.max(0.0);
        if active.transition.is_finished(active.elapsed_ms) {
            let spin_id = active.transition.spin_id;
            self.complete(spin_id).then_some(spin_id)
        } else {
            None
        }
    }

    /// Finish the transition for `spin_id` now.
    ///
    /// Returns `false` (and changes nothing) when no transition for that spin
    /// is running.
    pub fn complete(&mut self, spin_id: u64) -> bool {
        match &self.active {
            Some(active) if active.transition.spin_id == spin_id => {
                self.rest_degrees = active.transition.to_degrees;
                self.active = None;
                true
            }
            _ => {
                log::debug!("[TransitionTracker] Ignoring completion for spin {}", spin_id);
                false
            }
        }
    }
}

impl Default for TransitionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSync for TransitionTracker {
    fn animate_to(&mut self, target: &SpinTarget) {
        let from = self.current_rotation();
        self.active = Some(ActiveTransition {
            transition: RotationTransition {
                spin_id: target.spin_id,
                from_degrees: from,
                to_degrees: target.target_rotation_degrees,
                duration_ms: target.animation_duration_ms,
                easing: self.easing,
            },
            elapsed_ms: 0.0,
        });
    }
}
