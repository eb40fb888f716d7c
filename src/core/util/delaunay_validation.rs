//! Generalized Delaunay property validation.
//!
//! Three strictness levels build on each other:
//!
//! - [`ValidationLevel::Combinatorial`]: [`Tds::is_valid`] only.
//! - [`ValidationLevel::Local`]: every finite face has a Voronoi circle that
//!   touches its sites in face order, and no face is in conflict with the
//!   apex of a neighboring face.
//! - [`ValidationLevel::Global`]: no inserted site is in conflict with any
//!   face it is not a vertex of.
//!
//! Validation is read-only and uses the same conflict predicates as insertion,
//! so ties (including tolerance-band ties of the segment predicates) are not
//! violations.

#![forbid(unsafe_code)]

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::core::algorithms::locate::face_in_conflict;
use crate::core::triangulation_data_structure::{
    FaceKey, InvalidTriangulationError, InvariantKind, InvariantViolation, Tds,
    TriangulationValidationReport, VertexKey,
};
use crate::geometry::constructions::voronoi_circle;
use crate::geometry::kernel::Kernel;
use crate::geometry::predicates::Orientation;
use crate::geometry::sdg_predicates::point_triple;

// =============================================================================
// LEVELS
// =============================================================================

/// How much of the triangulation to check.
///
/// # Examples
///
/// ```rust
/// use segment_voronoi::core::util::delaunay_validation::ValidationLevel;
///
/// let level: ValidationLevel = "local".parse().unwrap();
/// assert_eq!(level, ValidationLevel::Local);
/// assert_eq!("2".parse::<ValidationLevel>().unwrap(), ValidationLevel::Global);
/// assert!(ValidationLevel::Global > ValidationLevel::Combinatorial);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValidationLevel {
    /// Structural invariants of the data structure.
    Combinatorial,
    /// Structural invariants plus the Delaunay condition between neighbors.
    Local,
    /// Local checks plus every site against every face.
    #[default]
    Global,
}

/// Unrecognized validation level name.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("Unknown validation level '{input}' (expected combinatorial, local or global)")]
pub struct ValidationLevelParseError {
    /// The rejected input.
    pub input: String,
}

impl FromStr for ValidationLevel {
    type Err = ValidationLevelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "combinatorial" => Ok(Self::Combinatorial),
            "1" | "local" => Ok(Self::Local),
            "2" | "global" => Ok(Self::Global),
            _ => Err(ValidationLevelParseError {
                input: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ValidationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Combinatorial => "combinatorial",
            Self::Local => "local",
            Self::Global => "global",
        };
        f.write_str(name)
    }
}

// =============================================================================
// CHECKS
// =============================================================================

/// Every finite face has a Voronoi circle touching its sites in face order.
///
/// # Errors
///
/// Returns [`InvalidTriangulationError::VoronoiCircle`] for the first face without one.
pub fn validate_voronoi_circles<K: Kernel>(
    tds: &Tds,
    kernel: &K,
) -> Result<(), InvalidTriangulationError> {
    for (f, _) in tds.faces() {
        let Some(sites) = tds.face_sites(f) else {
            continue;
        };
        let has_circle = match point_triple(&sites) {
            Some([a, b, c]) => kernel.orientation(&a, &b, &c) == Orientation::POSITIVE,
            None => voronoi_circle(&sites, kernel.config()).is_some(),
        };
        if !has_circle {
            return Err(InvalidTriangulationError::VoronoiCircle {
                message: format!(
                    "face {f:?} ({}, {}, {}) has no Voronoi circle in face order",
                    sites[0], sites[1], sites[2]
                ),
            });
        }
    }
    Ok(())
}

fn conflict_violation(tds: &Tds, f: FaceKey, v: VertexKey) -> InvalidTriangulationError {
    let site = tds
        .site(v)
        .map_or_else(|| "infinite vertex".to_string(), |s| s.to_string());
    InvalidTriangulationError::DelaunayViolation {
        message: format!("{site} (vertex {v:?}) is in conflict with face {f:?}"),
    }
}

/// No face is in conflict with the apex of a neighboring face.
///
/// # Errors
///
/// Returns [`InvalidTriangulationError::DelaunayViolation`] for the first conflict.
pub fn validate_local_delaunay<K: Kernel>(
    tds: &Tds,
    kernel: &K,
) -> Result<(), InvalidTriangulationError> {
    for (f, face) in tds.faces() {
        for i in 0..3 {
            let Some(d) = tds.mirror_vertex(f, i) else {
                continue;
            };
            if tds.is_infinite(d) || face.has_vertex(d) {
                continue;
            }
            let Some(site) = tds.site(d) else {
                continue;
            };
            if face_in_conflict(tds, kernel, f, &site) {
                tracing::warn!("local Delaunay violation: face {f:?} vs vertex {d:?}");
                return Err(conflict_violation(tds, f, d));
            }
        }
    }
    Ok(())
}

/// No site is in conflict with a face it is not a vertex of.
///
/// Quadratic in the size of the triangulation.
///
/// # Errors
///
/// Returns [`InvalidTriangulationError::DelaunayViolation`] for the first conflict.
pub fn validate_global_delaunay<K: Kernel>(
    tds: &Tds,
    kernel: &K,
) -> Result<(), InvalidTriangulationError> {
    for (v, vertex) in tds.vertices() {
        let Some(site) = vertex.site() else {
            continue;
        };
        for (f, face) in tds.faces() {
            if face.has_vertex(v) {
                continue;
            }
            if face_in_conflict(tds, kernel, f, &site) {
                tracing::warn!("global Delaunay violation: face {f:?} vs vertex {v:?}");
                return Err(conflict_violation(tds, f, v));
            }
        }
    }
    Ok(())
}

/// Validate at `level`, stopping at the first failure.
///
/// # Errors
///
/// Returns the first violated invariant.
pub fn validate<K: Kernel>(
    tds: &Tds,
    kernel: &K,
    level: ValidationLevel,
) -> Result<(), InvalidTriangulationError> {
    tds.is_valid()?;
    if level >= ValidationLevel::Local {
        validate_voronoi_circles(tds, kernel)?;
        validate_local_delaunay(tds, kernel)?;
    }
    if level >= ValidationLevel::Global {
        validate_global_delaunay(tds, kernel)?;
    }
    Ok(())
}

/// Validate at `level`, collecting every failure.
///
/// Geometric checks are skipped when the combinatorial ones fail, since they
/// would only report follow-up errors.
///
/// # Errors
///
/// Returns a report listing every violated invariant.
pub fn validation_report<K: Kernel>(
    tds: &Tds,
    kernel: &K,
    level: ValidationLevel,
) -> Result<(), TriangulationValidationReport> {
    tds.validation_report()?;

    let mut violations = Vec::new();
    if level >= ValidationLevel::Local {
        if let Err(error) = validate_voronoi_circles(tds, kernel) {
            violations.push(InvariantViolation {
                kind: InvariantKind::VoronoiCircles,
                error,
            });
        }
        if let Err(error) = validate_local_delaunay(tds, kernel) {
            violations.push(InvariantViolation {
                kind: InvariantKind::Delaunay,
                error,
            });
        }
    }
    if level >= ValidationLevel::Global && violations.is_empty() {
        if let Err(error) = validate_global_delaunay(tds, kernel) {
            violations.push(InvariantViolation {
                kind: InvariantKind::Delaunay,
                error,
            });
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(TriangulationValidationReport { violations })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::segment_delaunay_graph::SegmentDelaunayGraph;
    use crate::geometry::kernel::RobustKernel;
    use crate::geometry::point::Point;
    use crate::geometry::site::Site;

    fn pt(x: f64, y: f64) -> Site {
        Site::point(x, y).unwrap()
    }

    #[test]
    fn level_parsing_and_display() {
        for level in [
            ValidationLevel::Combinatorial,
            ValidationLevel::Local,
            ValidationLevel::Global,
        ] {
            assert_eq!(level.to_string().parse::<ValidationLevel>(), Ok(level));
        }
        assert_eq!("  LOCAL ".parse::<ValidationLevel>(), Ok(ValidationLevel::Local));
        assert!("strict".parse::<ValidationLevel>().is_err());
        assert_eq!(ValidationLevel::default(), ValidationLevel::Global);
    }

    #[test]
    fn mixed_sites_validate_at_every_level() {
        let sdg = SegmentDelaunayGraph::from_sites([
            Site::segment(Point::new(0.0, 0.0), Point::new(4.0, 0.0)).unwrap(),
            pt(2.0, 3.0),
            pt(-1.0, 2.0),
            pt(5.0, 1.0),
        ])
        .unwrap();
        let kernel = RobustKernel::new();
        for level in [
            ValidationLevel::Combinatorial,
            ValidationLevel::Local,
            ValidationLevel::Global,
        ] {
            assert!(validate(sdg.tds(), &kernel, level).is_ok(), "level {level}");
            assert!(validation_report(sdg.tds(), &kernel, level).is_ok());
        }
    }
}
