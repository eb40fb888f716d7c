//! Geometric kernel abstraction following CGAL's design.
//!
//! The [`Kernel`] trait defines the point predicates the segment Delaunay
//! graph relies on for its exact decisions, plus the tolerance configuration
//! of the error-bounded path. Swapping the kernel swaps the numeric strategy
//! of every point-only decision without touching the triangulation code.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::geometry::point::Point;
use crate::geometry::predicates::{
    InCircle, Orientation, in_circle, in_circle_inexact, orientation, orientation_inexact,
    segment_in_circle,
};
use crate::geometry::robust_predicates::{RobustPredicateConfig, config_presets};

/// Geometric kernel trait defining predicates for triangulation algorithms.
///
/// # Examples
///
/// ```
/// use segment_voronoi::geometry::kernel::{Kernel, RobustKernel};
/// use segment_voronoi::geometry::point::Point;
/// use segment_voronoi::geometry::predicates::{InCircle, Orientation};
///
/// let kernel = RobustKernel::new();
/// let a = Point::new(0.0, 0.0);
/// let b = Point::new(1.0, 0.0);
/// let c = Point::new(0.5, 1.0);
/// assert_eq!(kernel.orientation(&a, &b, &c), Orientation::POSITIVE);
/// assert_eq!(kernel.in_circle(&a, &b, &c, &Point::new(0.5, 0.3)), InCircle::INSIDE);
/// ```
pub trait Kernel: Clone + Debug + Default {
    /// Orientation of `(a, b, c)`.
    fn orientation(&self, a: &Point, b: &Point, c: &Point) -> Orientation;

    /// Position of `d` relative to the circle through the counter-clockwise triple `(a, b, c)`.
    fn in_circle(&self, a: &Point, b: &Point, c: &Point, d: &Point) -> InCircle;

    /// Position of the closed segment `[s, t]` relative to the disk through `(a, b, c)`.
    ///
    /// Rarely on a hot path, so every kernel shares the exact evaluation.
    fn segment_in_circle(&self, a: &Point, b: &Point, c: &Point, s: &Point, t: &Point) -> InCircle {
        segment_in_circle(a, b, c, s, t)
    }

    /// Tolerances for decisions involving segment sites.
    fn config(&self) -> &RobustPredicateConfig;
}

/// Kernel with sign-exact point predicates (floating filter + exact fallback).
///
/// This is the default kernel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RobustKernel {
    config: RobustPredicateConfig,
}

impl RobustKernel {
    /// Create a robust kernel with the general-purpose configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            config: config_presets::general_triangulation(),
        }
    }

    /// Create a robust kernel with a custom tolerance configuration.
    #[must_use]
    pub const fn with_config(config: RobustPredicateConfig) -> Self {
        Self { config }
    }
}

impl Kernel for RobustKernel {
    fn orientation(&self, a: &Point, b: &Point, c: &Point) -> Orientation {
        orientation(a, b, c)
    }

    fn in_circle(&self, a: &Point, b: &Point, c: &Point, d: &Point) -> InCircle {
        in_circle(a, b, c, d)
    }

    fn config(&self) -> &RobustPredicateConfig {
        &self.config
    }
}

/// Kernel with plain floating-point point predicates.
///
/// Faster, but may return inconsistent signs on nearly degenerate input.
/// Intended for benchmarking against [`RobustKernel`] on well-separated data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FastKernel {
    config: RobustPredicateConfig,
}

impl FastKernel {
    /// Create a fast kernel.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            config: config_presets::general_triangulation(),
        }
    }
}

impl Kernel for FastKernel {
    fn orientation(&self, a: &Point, b: &Point, c: &Point) -> Orientation {
        orientation_inexact(a, b, c)
    }

    fn in_circle(&self, a: &Point, b: &Point, c: &Point, d: &Point) -> InCircle {
        in_circle_inexact(a, b, c, d)
    }

    fn config(&self) -> &RobustPredicateConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernels_agree_on_clear_cases() {
        let robust = RobustKernel::new();
        let fast = FastKernel::new();
        let a = Point::new(0.0, 0.0);
        let b = Point::new(4.0, 0.0);
        let c = Point::new(0.0, 4.0);
        for d in [Point::new(1.0, 1.0), Point::new(5.0, 5.0), Point::new(4.0, 4.0)] {
            assert_eq!(robust.in_circle(&a, &b, &c, &d), fast.in_circle(&a, &b, &c, &d));
        }
        assert_eq!(robust.orientation(&a, &b, &c), fast.orientation(&a, &b, &c));
        assert_eq!(robust.orientation(&c, &b, &a), Orientation::NEGATIVE);
    }

    #[test]
    fn robust_kernel_custom_config() {
        let config = config_presets::degenerate_robust();
        let kernel = RobustKernel::with_config(config);
        assert_eq!(*kernel.config(), config);
    }
}
