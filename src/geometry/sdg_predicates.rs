//! Conflict predicates of the segment Delaunay graph.
//!
//! A new site `q` is *in conflict* with a face when it is strictly closer to
//! the face's Voronoi vertex than the face's own sites, i.e. when `q` meets
//! the open Voronoi disk. For an infinite face `(a, b, ∞)` the Voronoi vertex
//! lies at infinity in the direction of the unbounded bisector of `a` and `b`,
//! and the disk degenerates to an open half-plane (plus, for two points, the
//! open chord between them).
//!
//! Numeric strategy:
//!
//! - point-only faces tested against a point use the kernel's exact in-circle;
//! - infinite faces and zero-radius faces are decided by exact orientations;
//! - every other test compares distances to constructed Voronoi vertices with
//!   the tolerance band of [`RobustPredicateConfig`]; ties are not conflicts.

use smallvec::SmallVec;
use std::f64::consts::{PI, TAU};

use crate::geometry::constructions::{Bisector, Circle, equidistant_circles};
use crate::geometry::kernel::Kernel;
use crate::geometry::point::Point;
use crate::geometry::predicates::{InCircle, Orientation, strictly_between};
use crate::geometry::robust_predicates::RobustPredicateConfig;
use crate::geometry::site::Site;

/// How much of a Voronoi edge a new site swallows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EdgeConflict {
    /// Some interior point of the edge is closer to the new site.
    pub touches_interior: bool,
    /// Every interior point of the edge is closer to the new site.
    pub covers_interior: bool,
}

/// One end of a Voronoi edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EdgeEnd {
    /// A finite Voronoi vertex.
    Vertex(Point),
    /// A Voronoi vertex at infinity in the given direction.
    Infinite(Point),
}

impl EdgeEnd {
    /// The finite vertex, if any.
    #[must_use]
    pub const fn vertex(&self) -> Option<Point> {
        match self {
            Self::Vertex(p) => Some(*p),
            Self::Infinite(_) => None,
        }
    }
}

fn site_scale(sites: &[&Site]) -> f64 {
    sites
        .iter()
        .flat_map(|s| s.support_points())
        .map(|p| p.max_abs())
        .fold(0.0_f64, f64::max)
}

/// The three points of an all-point triple.
#[must_use]
pub fn point_triple(sites: &[Site; 3]) -> Option<[Point; 3]> {
    Some([sites[0].as_point()?, sites[1].as_point()?, sites[2].as_point()?])
}

/// Conflict between `q` and the face of three points, decided by exact
/// orientation and in-circle tests alone.
///
/// A segment conflicts when any of its points lies strictly inside the
/// circumcircle. A face that is not counter-clockwise has no Voronoi circle
/// and conflicts with nothing.
#[must_use]
pub fn point_face_conflict<K: Kernel>(kernel: &K, face: &[Point; 3], q: &Site) -> bool {
    let [a, b, c] = face;
    if kernel.orientation(a, b, c) != Orientation::POSITIVE {
        return false;
    }
    match q {
        Site::Point(p) => kernel.in_circle(a, b, c, p) == InCircle::INSIDE,
        Site::Segment(s) => {
            let (source, target) = (s.source(), s.target());
            kernel.in_circle(a, b, c, &source) == InCircle::INSIDE
                || kernel.in_circle(a, b, c, &target) == InCircle::INSIDE
                || kernel.segment_in_circle(a, b, c, &source, &target) == InCircle::INSIDE
        }
    }
}

// =============================================================================
// FACE CONFLICTS
// =============================================================================

/// Conflict between `q` and the finite face `sites` (counter-clockwise) whose
/// Voronoi circle is `circle`.
#[must_use]
pub fn finite_face_conflict<K: Kernel>(
    kernel: &K,
    sites: &[Site; 3],
    circle: &Circle,
    q: &Site,
) -> bool {
    if circle.radius == 0.0 {
        return zero_radius_conflict(kernel, sites, circle.center, q);
    }

    if let Some(face) = point_triple(sites) {
        return point_face_conflict(kernel, &face, q);
    }

    let scale = site_scale(&[&sites[0], &sites[1], &sites[2], q])
        .max(circle.center.max_abs())
        .max(circle.radius);
    let distance = q.distance_to(&circle.center);
    kernel
        .config()
        .definitely_less(distance, circle.radius, scale)
}

/// Zero-radius face `(p, s, t)` at the common endpoint `p` of segments `s`, `t`:
/// only a segment leaving `p` strictly inside the counter-clockwise gap from
/// `s` to `t` is in conflict.
fn zero_radius_conflict<K: Kernel>(kernel: &K, sites: &[Site; 3], p: Point, q: &Site) -> bool {
    let Some(q_other) = q.as_segment().and_then(|s| s.other_endpoint(&p)) else {
        return false;
    };
    let Some(k) = sites.iter().position(|s| s.as_point() == Some(p)) else {
        return false;
    };
    let first = sites[(k + 1) % 3]
        .as_segment()
        .and_then(|s| s.other_endpoint(&p));
    let second = sites[(k + 2) % 3]
        .as_segment()
        .and_then(|s| s.other_endpoint(&p));
    let (Some(first), Some(second)) = (first, second) else {
        return false;
    };
    kernel.orientation(&p, &first, &q_other) == Orientation::POSITIVE
        && kernel.orientation(&p, &q_other, &second) == Orientation::POSITIVE
}

/// Conflict between `q` and the infinite face `(a, b, ∞)`.
///
/// Only two points, or a segment with one of its endpoints, can share an
/// infinite face; other pairs never conflict.
#[must_use]
pub fn infinite_face_conflict<K: Kernel>(kernel: &K, a: &Site, b: &Site, q: &Site) -> bool {
    match (a, b) {
        (Site::Point(p), Site::Point(r)) => {
            let mut on_line: SmallVec<[Point; 2]> = SmallVec::new();
            for y in q.support_points() {
                match kernel.orientation(p, r, &y) {
                    Orientation::POSITIVE => return true,
                    Orientation::DEGENERATE => on_line.push(y),
                    Orientation::NEGATIVE => {}
                }
            }
            // Second order: the half-plane limit keeps the open chord (p, r).
            match (q, on_line.as_slice()) {
                (Site::Segment(s), [_, _]) => {
                    let (e1, e2) = (s.source(), s.target());
                    s.has_endpoint(p) && s.has_endpoint(r)
                        || strictly_between(p, r, &e1)
                        || strictly_between(p, r, &e2)
                        || strictly_between(&e1, &e2, p)
                        || strictly_between(&e1, &e2, r)
                }
                (_, [y]) => strictly_between(p, r, y),
                _ => false,
            }
        }
        (Site::Point(p), Site::Segment(s)) => s.other_endpoint(p).is_some_and(|other| {
            q.support_points()
                .iter()
                .any(|y| kernel.orientation(p, &other, y) == Orientation::POSITIVE)
        }),
        (Site::Segment(s), Site::Point(p)) => s.other_endpoint(p).is_some_and(|other| {
            q.support_points()
                .iter()
                .any(|y| kernel.orientation(p, &other, y) == Orientation::NEGATIVE)
        }),
        (Site::Segment(_), Site::Segment(_)) => false,
    }
}

// =============================================================================
// EDGE CONFLICTS
// =============================================================================

/// How much of the Voronoi edge of `a` and `b` between `first` and `second`
/// the site `q` swallows.
///
/// Returns `None` when the bisector cannot be parametrized (a curved bisector
/// reaching infinity, or parallel segments without a finite end).
#[must_use]
pub fn finite_edge_conflict(
    config: &RobustPredicateConfig,
    a: &Site,
    b: &Site,
    first: EdgeEnd,
    second: EdgeEnd,
    q: &Site,
) -> Option<EdgeConflict> {
    // The branch hint must lie off both sites; a zero-radius end sits on them.
    let hint = [first.vertex(), second.vertex()]
        .into_iter()
        .flatten()
        .max_by(|x, y| a.distance_to(x).total_cmp(&a.distance_to(y)));
    let bisector = Bisector::new(a, b, hint)?;
    let param = |end: EdgeEnd| -> Option<f64> {
        match end {
            EdgeEnd::Vertex(c) => Some(bisector.parameter_of(&c)),
            EdgeEnd::Infinite(u) => {
                if !bisector.is_line() {
                    return None;
                }
                let s = u.dot(&bisector.direction_at(0.0));
                if s > 0.0 {
                    Some(f64::INFINITY)
                } else if s < 0.0 {
                    Some(f64::NEG_INFINITY)
                } else {
                    None
                }
            }
        }
    };
    let t1 = param(first)?;
    let t2 = param(second)?;
    let (lo, hi) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };

    let mut scale = site_scale(&[a, b, q]);
    for t in [lo, hi] {
        if t.is_finite() {
            scale = scale.max(t.abs());
        }
    }
    let tol = config.tolerance(scale);

    let mut breaks: Vec<f64> = equidistant_circles(&[*a, *b, *q], config)
        .into_iter()
        .filter_map(|circle| {
            let t = bisector.parameter_of(&circle.center);
            let on_branch = bisector.point_at(t).distance(&circle.center) <= tol.max(1e-9 * scale);
            (on_branch && t > lo + tol && t < hi - tol).then_some(t)
        })
        .collect();
    breaks.sort_by(f64::total_cmp);
    breaks.dedup_by(|x, y| (*x - *y).abs() <= tol);

    let conflict_at = |t: f64| -> bool {
        let x = bisector.point_at(t);
        let reference = a.distance_to(&x);
        config.definitely_less(q.distance_to(&x), reference, scale.max(x.max_abs()))
    };

    if lo == hi {
        let hit = conflict_at(lo);
        return Some(EdgeConflict {
            touches_interior: hit,
            covers_interior: hit,
        });
    }

    let mut knots = Vec::with_capacity(breaks.len() + 2);
    knots.push(lo);
    knots.extend(breaks);
    knots.push(hi);

    let mut any = false;
    let mut all = true;
    for window in knots.windows(2) {
        let (x0, x1) = (window[0], window[1]);
        let t = match (x0.is_finite(), x1.is_finite()) {
            (true, true) => 0.5 * (x0 + x1),
            (false, true) => x1 - scale.max(x1.abs()),
            (true, false) => x0 + scale.max(x0.abs()),
            (false, false) => 0.0,
        };
        if conflict_at(t) {
            any = true;
        } else {
            all = false;
        }
    }
    Some(EdgeConflict {
        touches_interior: any,
        covers_interior: all,
    })
}

/// How much of the Voronoi edge at infinity of the point site `x` the site `q`
/// swallows.
///
/// The edge is the arc of directions going counter-clockwise from `from` to
/// `to`. A degenerate (zero-length) arc is reported as covered but untouched.
#[must_use]
pub fn infinite_edge_conflict(
    config: &RobustPredicateConfig,
    x: &Point,
    from: &Point,
    to: &Point,
    q: &Site,
) -> EdgeConflict {
    let tol = config.angular_tolerance;
    let alpha = from.y().atan2(from.x());
    let length = wrap_angle(to.y().atan2(to.x()) - alpha);
    if length <= tol || TAU - length <= tol {
        return EdgeConflict {
            touches_interior: false,
            covers_interior: true,
        };
    }

    // Each support point y beats x on the open half-circle of directions u
    // with u·(y - x) > 0, expressed relative to `alpha`.
    let mut intervals: SmallVec<[(f64, f64); 4]> = SmallVec::new();
    let mut any = false;
    for y in q.support_points() {
        let d = y - *x;
        if d.norm_squared() == 0.0 {
            continue;
        }
        let start = wrap_angle(d.y().atan2(d.x()) - PI / 2.0 - alpha);
        let end = start + PI;
        if start < length - tol || end > TAU + tol {
            any = true;
        }
        if end > TAU {
            intervals.push((start, TAU));
            intervals.push((0.0, end - TAU));
        } else {
            intervals.push((start, end));
        }
    }

    intervals.sort_by(|l, r| l.0.total_cmp(&r.0));
    let mut covered = 0.0_f64;
    let mut all = true;
    for (start, end) in intervals {
        if start > covered + tol {
            break;
        }
        covered = covered.max(end);
    }
    if covered < length - tol {
        all = false;
    }

    EdgeConflict {
        touches_interior: any,
        covers_interior: all && any,
    }
}

fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped >= TAU { 0.0 } else { wrapped }
}
