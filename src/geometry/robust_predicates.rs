//! Tolerance configuration for the error-bounded predicate path.
//!
//! Point-only decisions (orientation, in-circle, betweenness) are exact and do
//! not consult this configuration. Decisions that involve a segment site are
//! evaluated in `f64` on constructed quantities (Voronoi circle centers,
//! bisector samples); those comparisons use the tolerance band described by
//! [`RobustPredicateConfig`]. A value inside the band is a tie, and ties never
//! count as conflicts.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Configuration for error-bounded geometric comparisons.
///
/// The tolerance for a comparison at magnitude `scale` is
/// `relative_tolerance_factor * scale`. There is no absolute floor: callers
/// pass the magnitude of the sites involved, so scaling every coordinate by a
/// constant scales every tolerance with it.
///
/// # Examples
///
/// ```rust
/// use segment_voronoi::geometry::robust_predicates::RobustPredicateConfigBuilder;
///
/// let config = RobustPredicateConfigBuilder::default()
///     .relative_tolerance_factor(1e-9)
///     .build()
///     .unwrap();
/// assert!(config.tolerance(10.0) > config.tolerance(1.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Builder, Serialize, Deserialize)]
#[builder(default)]
pub struct RobustPredicateConfig {
    /// Relative tolerance factor (multiplied by the magnitude of the operands)
    pub relative_tolerance_factor: f64,
    /// Minimum angle, in radians, below which two directions are treated as equal
    pub angular_tolerance: f64,
}

impl Default for RobustPredicateConfig {
    fn default() -> Self {
        config_presets::general_triangulation()
    }
}

impl RobustPredicateConfig {
    /// Tolerance for values of magnitude `scale`.
    #[inline]
    #[must_use]
    pub fn tolerance(&self, scale: f64) -> f64 {
        self.relative_tolerance_factor * scale.abs()
    }

    /// Compare `value` against `reference` with the tolerance band at `scale`.
    ///
    /// Returns `Ordering::Equal` when the two are within tolerance.
    #[must_use]
    pub fn compare(&self, value: f64, reference: f64, scale: f64) -> Ordering {
        let tol = self.tolerance(scale);
        if value < reference - tol {
            Ordering::Less
        } else if value > reference + tol {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }

    /// `true` when `value` is strictly below `reference` by more than the tolerance.
    #[inline]
    #[must_use]
    pub fn definitely_less(&self, value: f64, reference: f64, scale: f64) -> bool {
        self.compare(value, reference, scale) == Ordering::Less
    }

    /// `true` when `value` is within tolerance of zero.
    #[inline]
    #[must_use]
    pub fn is_zero(&self, value: f64, scale: f64) -> bool {
        value.abs() <= self.tolerance(scale)
    }
}

/// Preset configurations.
pub mod config_presets {
    use super::RobustPredicateConfig;

    /// Configuration for general-purpose construction.
    #[must_use]
    pub const fn general_triangulation() -> RobustPredicateConfig {
        RobustPredicateConfig {
            relative_tolerance_factor: 1e-10,
            angular_tolerance: 1e-10,
        }
    }

    /// Stricter tolerances for well-conditioned input.
    #[must_use]
    pub const fn high_precision() -> RobustPredicateConfig {
        RobustPredicateConfig {
            relative_tolerance_factor: 1e-12,
            angular_tolerance: 1e-12,
        }
    }

    /// More lenient tolerances for nearly degenerate input.
    #[must_use]
    pub const fn degenerate_robust() -> RobustPredicateConfig {
        RobustPredicateConfig {
            relative_tolerance_factor: 1e-8,
            angular_tolerance: 1e-8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerance_scales_with_magnitude() {
        let config = config_presets::general_triangulation();
        assert!(config.tolerance(1e6) > config.tolerance(1.0));
        assert_eq!(config.compare(1.0, 1.0 + 1e-13, 1.0), Ordering::Equal);
        assert_eq!(config.compare(1.0, 2.0, 1.0), Ordering::Less);
        assert!(config.definitely_less(0.5, 1.0, 1.0));
        assert!(!config.definitely_less(1.0 - 1e-13, 1.0, 1.0));
        assert!(config.is_zero(1e-13, 1.0));
    }

    #[test]
    fn tolerance_is_purely_relative() {
        let config = config_presets::general_triangulation();
        for scale in [1e-6, 1e-3, 1.0, 1e4, 1e8] {
            let tol = config.tolerance(scale);
            assert!((tol / scale - config.relative_tolerance_factor).abs() < 1e-20);
            // The same relative gap decides the same way at every scale.
            assert!(config.definitely_less(0.5 * scale, scale, scale));
            assert!(!config.definitely_less(scale * (1.0 - 1e-13), scale, scale));
        }
        assert_eq!(config.tolerance(0.0), 0.0);
    }

    #[test]
    fn presets_are_ordered() {
        let strict = config_presets::high_precision();
        let general = config_presets::general_triangulation();
        let lenient = config_presets::degenerate_robust();
        assert!(strict.tolerance(1.0) < general.tolerance(1.0));
        assert!(general.tolerance(1.0) < lenient.tolerance(1.0));
        assert_eq!(RobustPredicateConfig::default(), general);
    }

    #[test]
    fn builder_overrides_defaults() {
        let config = RobustPredicateConfigBuilder::default()
            .relative_tolerance_factor(0.5)
            .build()
            .unwrap();
        assert!((config.relative_tolerance_factor - 0.5).abs() < f64::EPSILON);
        assert!(
            (config.angular_tolerance - config_presets::general_triangulation().angular_tolerance)
                .abs()
                < f64::EPSILON
        );
    }
}
