//! Inexact constructions: Voronoi circles, bisectors and lines.
//!
//! Everything in this module computes coordinates in plain `f64`. The values
//! feed the output primitives of the dual extractor and the error-bounded
//! predicate path in [`sdg_predicates`](crate::geometry::sdg_predicates);
//! point-only topology decisions never read them.
//!
//! # Voronoi circles
//!
//! The Voronoi circle of three sites is a circle with center `v` and radius `r`
//! touching all three. Each site contributes constraints on `(vx, vy, r)`:
//!
//! - a segment `s` with unit direction `u`, left normal `n` and side `ε = ±1`
//!   gives the linear constraint `ε n·(v - s.source) = r`;
//! - a point `p` gives `|v - p|² = r²`; two points give the linear bisector
//!   constraint obtained by subtracting their quadratics;
//! - a point `p` that is an endpoint of a segment `s` of the same triple forces
//!   the tangency onto `p`: `u·(v - p) = 0`.
//!
//! Three independent linear constraints determine `(vx, vy, r)` directly; two
//! leave a line in `(vx, vy, r)` space that is intersected with one point
//! quadratic. Every sign assignment is tried and candidates are validated
//! (positive radius, tangency inside each segment, consistent residuals).
//! The counter-clockwise order of the tangency points then selects the circle
//! of an oriented face.

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::f64::consts::TAU;
use std::fmt;

use crate::geometry::point::Point;
use crate::geometry::predicates::{Orientation, orientation};
use crate::geometry::robust_predicates::RobustPredicateConfig;
use crate::geometry::site::{Segment, Site};

/// Determinant magnitude below which a normalized linear system is treated as singular.
const SINGULAR_DET: f64 = 1e-12;

/// Leading coefficient below which the unit-direction quadratic is linear.
const LINEAR_LEADING: f64 = 1e-14;

// =============================================================================
// CIRCLE AND LINE
// =============================================================================

/// A circle given by center and radius; radius zero is allowed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    /// Center (the Voronoi vertex).
    pub center: Point,
    /// Radius (distance from the center to each defining site).
    pub radius: f64,
}

/// A line `a x + b y + c = 0` with unit normal `(a, b)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// x coefficient
    pub a: f64,
    /// y coefficient
    pub b: f64,
    /// constant term
    pub c: f64,
}

impl Line {
    /// The line through `origin` with direction `direction`.
    ///
    /// The normal is `direction` rotated by -90 degrees, so a line through two
    /// points `p -> q` has `p`'s right side as its positive side.
    ///
    /// Returns `None` for a zero direction.
    #[must_use]
    pub fn through(origin: Point, direction: Point) -> Option<Self> {
        let d = direction.normalized()?;
        let normal = Point::new(d.y(), -d.x());
        Some(Self {
            a: normal.x(),
            b: normal.y(),
            c: -normal.dot(&origin),
        })
    }

    /// The supporting line of a segment, oriented from source to target.
    #[must_use]
    pub fn supporting(segment: &Segment) -> Self {
        let d = segment.direction();
        let normal = Point::new(d.y(), -d.x());
        Self {
            a: normal.x(),
            b: normal.y(),
            c: -normal.dot(&segment.source()),
        }
    }

    /// Signed distance from `p` to the line.
    #[must_use]
    pub fn signed_distance(&self, p: &Point) -> f64 {
        self.a.mul_add(p.x(), self.b.mul_add(p.y(), self.c))
    }

    /// Unit normal `(a, b)`.
    #[must_use]
    pub fn normal(&self) -> Point {
        Point::new(self.a, self.b)
    }

    /// Unit direction (normal rotated by +90 degrees).
    #[must_use]
    pub fn direction(&self) -> Point {
        self.normal().perp()
    }

    /// The point of the line closest to the origin.
    #[must_use]
    pub fn point(&self) -> Point {
        self.normal() * -self.c
    }

    /// Orthogonal projection of `p` onto the line.
    #[must_use]
    pub fn project(&self, p: &Point) -> Point {
        *p - self.normal() * self.signed_distance(p)
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x + {}y + {} = 0", self.a, self.b, self.c)
    }
}

// =============================================================================
// LINEAR SYSTEM HELPERS
// =============================================================================

/// Linear constraint `coeffs · (vx, vy, r) = rhs`, row-normalized.
#[derive(Clone, Copy, Debug)]
struct Constraint {
    coeffs: Vector3<f64>,
    rhs: f64,
}

impl Constraint {
    fn new(a: f64, b: f64, c: f64, rhs: f64) -> Option<Self> {
        let coeffs = Vector3::new(a, b, c);
        let norm = coeffs.norm();
        if norm > 0.0 && norm.is_finite() {
            Some(Self {
                coeffs: coeffs / norm,
                rhs: rhs / norm,
            })
        } else {
            None
        }
    }

    fn residual(&self, x: &Vector3<f64>) -> f64 {
        self.coeffs.dot(x) - self.rhs
    }
}

fn solve3(rows: [&Constraint; 3]) -> Option<Vector3<f64>> {
    let m = Matrix3::from_rows(&[
        rows[0].coeffs.transpose(),
        rows[1].coeffs.transpose(),
        rows[2].coeffs.transpose(),
    ]);
    let b = Vector3::new(rows[0].rhs, rows[1].rhs, rows[2].rhs);
    m.lu().solve(&b)
}

/// Solutions of the constraint set intersected with `|v - p|² = r²`.
fn solve_system(
    constraints: &[Constraint],
    quadratic: Option<Point>,
) -> SmallVec<[Vector3<f64>; 2]> {
    let mut solutions = SmallVec::new();
    let n = constraints.len();

    // Best-conditioned triple of constraints.
    let mut best_triple: Option<([usize; 3], f64)> = None;
    for i in 0..n {
        for j in (i + 1)..n {
            for k in (j + 1)..n {
                let det = constraints[i]
                    .coeffs
                    .dot(&constraints[j].coeffs.cross(&constraints[k].coeffs))
                    .abs();
                if best_triple.is_none_or(|(_, best)| det > best) {
                    best_triple = Some(([i, j, k], det));
                }
            }
        }
    }
    if let Some(([i, j, k], det)) = best_triple {
        if det > SINGULAR_DET {
            if let Some(x) = solve3([&constraints[i], &constraints[j], &constraints[k]]) {
                solutions.push(x);
            }
            return solutions;
        }
    }

    // Rank two: a line of solutions, cut by the point quadratic.
    let Some(p) = quadratic else {
        return solutions;
    };
    let mut best_pair: Option<([usize; 2], Vector3<f64>)> = None;
    for i in 0..n {
        for j in (i + 1)..n {
            let w = constraints[i].coeffs.cross(&constraints[j].coeffs);
            if best_pair.is_none_or(|(_, best)| w.norm() > best.norm()) {
                best_pair = Some(([i, j], w));
            }
        }
    }
    let Some(([i, j], w)) = best_pair else {
        return solutions;
    };
    let w_norm = w.norm();
    if w_norm <= SINGULAR_DET {
        return solutions;
    }
    let w = w / w_norm;
    let Some(along) = Constraint::new(w.x, w.y, w.z, 0.0) else {
        return solutions;
    };
    let Some(x0) = solve3([&constraints[i], &constraints[j], &along]) else {
        return solutions;
    };

    // |(x0 + t w).xy - p|² - (x0.r + t w.r)² = 0
    let dx = x0.x - p.x();
    let dy = x0.y - p.y();
    let qa = w.z.mul_add(-w.z, w.x.mul_add(w.x, w.y * w.y));
    let qb = 2.0 * w.z.mul_add(-x0.z, w.x.mul_add(dx, w.y * dy));
    let qc = x0.z.mul_add(-x0.z, dx.mul_add(dx, dy * dy));

    for t in solve_quadratic(qa, qb, qc) {
        solutions.push(x0 + w * t);
    }
    solutions
}

/// Real roots of `a t² + b t + c`.
///
/// `t` runs along a unit direction, so `a` is dimensionless while `b` and `c`
/// carry one and two powers of length; `a` is tested on its own.
fn solve_quadratic(a: f64, b: f64, c: f64) -> SmallVec<[f64; 2]> {
    let mut roots = SmallVec::new();
    if a.abs() <= LINEAR_LEADING {
        if b != 0.0 {
            roots.push(-c / b);
        }
        return roots;
    }
    let disc = b.mul_add(b, -4.0 * a * c);
    if disc < -1e-12 * b.mul_add(b, (4.0 * a * c).abs()) {
        return roots;
    }
    let sqrt_disc = disc.max(0.0).sqrt();
    // Numerically stable pair of roots.
    let q = -0.5 * (b + b.signum() * sqrt_disc);
    if q == 0.0 {
        roots.push(0.0);
        return roots;
    }
    roots.push(q / a);
    roots.push(c / q);
    roots
}

// =============================================================================
// VORONOI CIRCLES
// =============================================================================

/// All circles touching the three sites (each segment within its closed extent).
///
/// No orientation filter is applied. A zero-radius circle is reported when a
/// point site is a common endpoint of every segment in the triple.
#[must_use]
pub fn equidistant_circles(sites: &[Site; 3], config: &RobustPredicateConfig) -> Vec<Circle> {
    let mut circles: Vec<Circle> = Vec::new();

    if let Some(p) = common_endpoint_point(sites) {
        circles.push(Circle {
            center: p,
            radius: 0.0,
        });
        return circles;
    }

    if let [Site::Point(a), Site::Point(b), Site::Point(c)] = sites {
        circles.extend(circumcircle(a, b, c));
        return circles;
    }

    // Translate so the first support point is the origin; improves conditioning.
    let origin = sites[0].support_points()[0];
    let local: [Site; 3] = sites.map(|s| translate_site(&s, origin));

    let segments: SmallVec<[Segment; 3]> = local.iter().filter_map(Site::as_segment).collect();
    let points: SmallVec<[Point; 3]> = local.iter().filter_map(Site::as_point).collect();
    let scale = local
        .iter()
        .flat_map(|s| s.support_points())
        .map(|p| p.max_abs())
        .fold(0.0_f64, f64::max);
    if scale == 0.0 {
        return circles;
    }

    let combos = 1_usize << segments.len();
    for mask in 0..combos {
        let mut constraints: SmallVec<[Constraint; 6]> = SmallVec::new();
        for (bit, segment) in segments.iter().enumerate() {
            let side = if mask & (1 << bit) == 0 { 1.0 } else { -1.0 };
            let u = segment.direction();
            let n = u.perp();
            for p in &points {
                if segment.has_endpoint(p) {
                    if let Some(c) = Constraint::new(u.x(), u.y(), 0.0, u.dot(p)) {
                        constraints.push(c);
                    }
                }
            }
            if let Some(c) = Constraint::new(
                side * n.x(),
                side * n.y(),
                -1.0,
                side * n.dot(&segment.source()),
            ) {
                constraints.push(c);
            }
        }
        if let Some((p0, rest)) = points.split_first() {
            for pi in rest {
                let d = *pi - *p0;
                if let Some(c) = Constraint::new(
                    2.0 * d.x(),
                    2.0 * d.y(),
                    0.0,
                    pi.norm_squared() - p0.norm_squared(),
                ) {
                    constraints.push(c);
                }
            }
        }

        for x in solve_system(&constraints, points.first().copied()) {
            let center = Point::new(x.x, x.y);
            let radius = x.z;
            if !center.is_finite() || !radius.is_finite() {
                continue;
            }
            let tol = config.tolerance(scale.max(radius.abs()).max(center.max_abs()));
            // A band wider than the sites themselves admits rounding noise,
            // such as the far root of a degenerate quadratic.
            if radius <= tol || tol > scale {
                continue;
            }
            if constraints.iter().any(|c| c.residual(&x).abs() > tol) {
                continue;
            }
            if points
                .iter()
                .any(|p| (p.distance(&center) - radius).abs() > tol)
            {
                continue;
            }
            if segments
                .iter()
                .any(|s| !tangency_within(s, &center, radius, tol))
            {
                continue;
            }
            let global = Circle {
                center: center + origin,
                radius,
            };
            let duplicate = circles.iter().any(|c| {
                c.center.distance(&global.center) <= tol && (c.radius - global.radius).abs() <= tol
            });
            if !duplicate {
                circles.push(global);
            }
        }
    }
    circles
}

/// The Voronoi circle of the counter-clockwise face `(sites[0], sites[1], sites[2])`.
///
/// Returns `None` when no circle touches the sites in that cyclic order.
#[must_use]
pub fn voronoi_circle(sites: &[Site; 3], config: &RobustPredicateConfig) -> Option<Circle> {
    if let Some(p) = common_endpoint_point(sites) {
        return zero_radius_circle(sites, p);
    }
    let mut best: Option<Circle> = None;
    for circle in equidistant_circles(sites, config) {
        if tangency_order_is_ccw(sites, &circle) {
            let better = best.is_none_or(|b| circle.radius < b.radius);
            if better {
                best = Some(circle);
            }
        }
    }
    best
}

/// Closed-form circle through three points, relative to `a`.
///
/// Gated by the exact orientation instead of a tolerance, so thin triangles
/// keep their (large) circle.
fn circumcircle(a: &Point, b: &Point, c: &Point) -> Option<Circle> {
    if orientation(a, b, c) == Orientation::DEGENERATE {
        return None;
    }
    let ab = *b - *a;
    let ac = *c - *a;
    let det = 2.0 * ab.cross(&ac);
    let (bb, cc) = (ab.norm_squared(), ac.norm_squared());
    let offset = Point::new(
        (ac.y() * bb - ab.y() * cc) / det,
        (ab.x() * cc - ac.x() * bb) / det,
    );
    let center = *a + offset;
    let radius = offset.norm();
    (center.is_finite() && radius.is_finite()).then_some(Circle { center, radius })
}

/// The point site that every segment of the triple is incident to, when the
/// triple is one point plus two segments sharing it.
fn common_endpoint_point(sites: &[Site; 3]) -> Option<Point> {
    let points: SmallVec<[Point; 3]> = sites.iter().filter_map(Site::as_point).collect();
    let segments: SmallVec<[Segment; 3]> = sites.iter().filter_map(Site::as_segment).collect();
    if points.len() != 1 || segments.len() != 2 {
        return None;
    }
    let p = points[0];
    segments.iter().all(|s| s.has_endpoint(&p)).then_some(p)
}

/// Zero-radius Voronoi vertex at a shared endpoint.
///
/// The face `(p, s, t)` exists when `t` follows `s` counter-clockwise around
/// `p` with a gap below a half turn.
fn zero_radius_circle(sites: &[Site; 3], p: Point) -> Option<Circle> {
    let k = sites.iter().position(|s| s.as_point() == Some(p))?;
    let first = sites[(k + 1) % 3].as_segment()?.other_endpoint(&p)?;
    let second = sites[(k + 2) % 3].as_segment()?.other_endpoint(&p)?;
    (orientation(&p, &first, &second) == Orientation::POSITIVE).then_some(Circle {
        center: p,
        radius: 0.0,
    })
}

fn translate_site(site: &Site, origin: Point) -> Site {
    match site {
        Site::Point(p) => Site::Point(*p - origin),
        Site::Segment(s) => {
            // Translation preserves distinctness of the endpoints.
            Segment::new(s.source() - origin, s.target() - origin).map_or(*site, Site::Segment)
        }
    }
}

fn tangency_within(segment: &Segment, center: &Point, radius: f64, tol: f64) -> bool {
    let t = (*center - segment.source()).dot(&segment.direction());
    if t < -tol || t > segment.length() + tol {
        return false;
    }
    (segment.distance_to(center) - radius).abs() <= tol
}

/// Tangency point of `site` on `circle` plus the sub-order key used when two
/// sites touch the circle at the same point.
fn tangency_key(site: &Site, sites: &[Site; 3], circle: &Circle) -> (Point, i8) {
    match site {
        Site::Point(p) => (*p, 0),
        Site::Segment(s) => {
            let (foot, _) = s.closest_point(&circle.center);
            let incident = sites
                .iter()
                .filter_map(Site::as_point)
                .find(|p| s.has_endpoint(p));
            if let Some(p) = incident {
                // The tangency sits on the shared endpoint; the segment comes
                // after the point iff it leaves it counter-clockwise.
                if let Some(other) = s.other_endpoint(&p) {
                    let w = other - p;
                    let sub = if (p - circle.center).cross(&w) > 0.0 {
                        1
                    } else {
                        -1
                    };
                    return (p, sub);
                }
            }
            (foot, 0)
        }
    }
}

/// `true` when the tangency points of `sites` appear counter-clockwise on `circle`.
#[must_use]
pub fn tangency_order_is_ccw(sites: &[Site; 3], circle: &Circle) -> bool {
    let keys = sites.map(|s| tangency_key(&s, sites, circle));
    let (ta, sa) = keys[0];
    let da = ta - circle.center;
    let relative = |(t, sub): (Point, i8)| -> (f64, i8) {
        if t == ta {
            return if sub > sa { (0.0, 1) } else { (TAU, -1) };
        }
        let d = t - circle.center;
        let mut angle = da.cross(&d).atan2(da.dot(&d));
        if angle < 0.0 {
            angle += TAU;
        }
        (angle, sub)
    };
    let b = relative(keys[1]);
    let c = relative(keys[2]);
    match b.0.partial_cmp(&c.0) {
        Some(std::cmp::Ordering::Less) => true,
        Some(std::cmp::Ordering::Equal) => b.1 < c.1,
        _ => false,
    }
}

// =============================================================================
// BISECTORS
// =============================================================================

/// Parametrized bisector of two sites.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Bisector {
    /// Straight bisector `origin + t * direction` (unit direction).
    Line {
        /// A point of the line.
        origin: Point,
        /// Unit direction.
        direction: Point,
    },
    /// Parabola with `focus` and directrix through `line_origin` along
    /// `line_direction`; `normal` points from the directrix toward the focus.
    Parabola {
        /// Focus (the point site).
        focus: Point,
        /// A point of the directrix (the segment's source).
        line_origin: Point,
        /// Unit direction of the directrix.
        line_direction: Point,
        /// Unit normal toward the focus.
        normal: Point,
        /// Distance from the focus to the directrix.
        offset: f64,
    },
}

impl Bisector {
    /// Bisector of `a` and `b`.
    ///
    /// `hint` is a point known to lie on the wanted branch (a Voronoi vertex of
    /// the edge); it selects between the two angle bisectors of two segments.
    #[must_use]
    pub fn new(a: &Site, b: &Site, hint: Option<Point>) -> Option<Self> {
        match (a, b) {
            (Site::Point(p), Site::Point(q)) => Some(Self::Line {
                origin: p.midpoint(q),
                direction: (*q - *p).perp().normalized()?,
            }),
            (Site::Point(p), Site::Segment(s)) | (Site::Segment(s), Site::Point(p)) => {
                if let Some(other) = s.other_endpoint(p) {
                    return Some(Self::Line {
                        origin: *p,
                        direction: (other - *p).perp().normalized()?,
                    });
                }
                let line_direction = s.direction();
                let mut normal = line_direction.perp();
                let mut offset = normal.dot(&(*p - s.source()));
                if offset < 0.0 {
                    normal = -normal;
                    offset = -offset;
                }
                if offset <= f64::EPSILON * p.max_abs().max(s.source().max_abs()) {
                    return None;
                }
                Some(Self::Parabola {
                    focus: *p,
                    line_origin: s.source(),
                    line_direction,
                    normal,
                    offset,
                })
            }
            (Site::Segment(s), Site::Segment(t)) => {
                let hint = hint?;
                let ns = s.direction().perp();
                let nt = t.direction().perp();
                let es = ns.dot(&(hint - s.source())).signum();
                let et = nt.dot(&(hint - t.source())).signum();
                let ns = ns * es;
                let nt = nt * et;
                let diff = ns - nt;
                let rhs = ns.dot(&s.source()) - nt.dot(&t.source());
                let diff_norm_sq = diff.norm_squared();
                if diff_norm_sq <= 1e-24 {
                    return None;
                }
                let origin = hint - diff * ((diff.dot(&hint) - rhs) / diff_norm_sq);
                Some(Self::Line {
                    origin,
                    direction: diff.perp().normalized()?,
                })
            }
        }
    }

    /// Point of the bisector at parameter `t`.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point {
        match self {
            Self::Line { origin, direction } => *origin + *direction * t,
            Self::Parabola {
                focus,
                line_origin,
                line_direction,
                normal,
                offset,
            } => {
                let foot = *line_origin + *line_direction * t;
                let h = (foot - *focus).norm_squared() / (2.0 * offset);
                foot + *normal * h
            }
        }
    }

    /// Parameter of the bisector point closest to `p` (exact for points on the bisector).
    #[must_use]
    pub fn parameter_of(&self, p: &Point) -> f64 {
        match self {
            Self::Line { origin, direction } => (*p - *origin).dot(direction),
            Self::Parabola {
                line_origin,
                line_direction,
                ..
            } => (*p - *line_origin).dot(line_direction),
        }
    }

    /// Unit tangent direction at parameter `t`, pointing toward increasing `t`.
    #[must_use]
    pub fn direction_at(&self, t: f64) -> Point {
        match self {
            Self::Line { direction, .. } => *direction,
            Self::Parabola {
                focus,
                line_origin,
                line_direction,
                normal,
                offset,
            } => {
                let foot = *line_origin + *line_direction * t;
                let slope = (foot - *focus).dot(line_direction) / offset;
                (*line_direction + *normal * slope)
                    .normalized()
                    .unwrap_or(*line_direction)
            }
        }
    }

    /// `true` for straight bisectors.
    #[must_use]
    pub const fn is_line(&self) -> bool {
        matches!(self, Self::Line { .. })
    }
}

// =============================================================================
// DIRECTIONS AT INFINITY
// =============================================================================

/// Direction of the Voronoi vertex at infinity of the infinite face `(a, b, ∞)`.
///
/// Defined for two points (perpendicular bisector, left of `a -> b`) and for a
/// segment with one of its endpoints (normal at the endpoint). Other pairs have
/// bounded bisectors and return `None`.
#[must_use]
pub fn direction_at_infinity(a: &Site, b: &Site) -> Option<Point> {
    match (a, b) {
        (Site::Point(p), Site::Point(q)) => (*q - *p).perp().normalized(),
        (Site::Point(p), Site::Segment(s)) => {
            let other = s.other_endpoint(p)?;
            (other - *p).perp().normalized()
        }
        (Site::Segment(s), Site::Point(p)) => {
            let other = s.other_endpoint(p)?;
            (*p - other).perp().normalized()
        }
        (Site::Segment(_), Site::Segment(_)) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pt(x: f64, y: f64) -> Site {
        Site::Point(Point::new(x, y))
    }

    fn sg(x1: f64, y1: f64, x2: f64, y2: f64) -> Site {
        Site::segment(Point::new(x1, y1), Point::new(x2, y2)).unwrap()
    }

    fn config() -> RobustPredicateConfig {
        RobustPredicateConfig::default()
    }

    // =============================================================================
    // VORONOI CIRCLE TESTS
    // =============================================================================

    #[test]
    fn circumcircle_of_three_points() {
        let sites = [pt(0.0, 0.0), pt(2.0, 0.0), pt(1.0, 2.0)];
        let circle = voronoi_circle(&sites, &config()).unwrap();
        assert_relative_eq!(circle.center.x(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(circle.center.y(), 0.75, epsilon = 1e-12);
        assert_relative_eq!(circle.radius, 1.25, epsilon = 1e-12);

        // Clockwise order has no circle.
        let cw = [pt(0.0, 0.0), pt(1.0, 2.0), pt(2.0, 0.0)];
        assert!(voronoi_circle(&cw, &config()).is_none());
    }

    #[test]
    fn circle_of_point_endpoint_and_segment() {
        // Point (1, 2), endpoint (0, 0) and the segment leaving it to the right.
        let sites = [pt(1.0, 2.0), pt(0.0, 0.0), sg(0.0, 0.0, 2.0, 0.0)];
        let circle = voronoi_circle(&sites, &config()).unwrap();
        assert_relative_eq!(circle.center.x(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(circle.center.y(), 1.25, epsilon = 1e-12);
        assert_relative_eq!(circle.radius, 1.25, epsilon = 1e-12);

        let mirrored = [pt(2.0, 0.0), pt(1.0, 2.0), sg(0.0, 0.0, 2.0, 0.0)];
        let circle = voronoi_circle(&mirrored, &config()).unwrap();
        assert_relative_eq!(circle.center.x(), 2.0, epsilon = 1e-12);
        assert_relative_eq!(circle.center.y(), 1.25, epsilon = 1e-12);
    }

    #[test]
    fn circle_of_three_segments_is_incircle() {
        // Triangle edges, listed so the tangency points run counter-clockwise.
        let sites = [
            sg(0.0, 0.0, 4.0, 0.0),
            sg(4.0, 0.0, 0.0, 3.0),
            sg(0.0, 3.0, 0.0, 0.0),
        ];
        let circle = voronoi_circle(&sites, &config()).unwrap();
        // 3-4-5 triangle has inradius 1 centered at (1, 1).
        assert_relative_eq!(circle.center.x(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(circle.center.y(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(circle.radius, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn zero_radius_circle_at_shared_endpoint() {
        let p = pt(0.0, 0.0);
        let s = sg(0.0, 0.0, 1.0, 0.0);
        let t = sg(0.0, 0.0, 0.0, 1.0);
        let circle = voronoi_circle(&[s, t, p], &config()).unwrap();
        assert_eq!(circle.radius, 0.0);
        assert_eq!(circle.center, Point::new(0.0, 0.0));
        assert!(voronoi_circle(&[t, s, p], &config()).is_none());
    }

    #[test]
    fn circles_do_not_depend_on_the_unit() {
        for scale in [1e-6, 1e-3, 1.0, 1e4, 1e8, 1e12] {
            let sites = [pt(0.0, 0.0), pt(2.0 * scale, 0.0), pt(scale, 2.0 * scale)];
            let circle = voronoi_circle(&sites, &config()).unwrap();
            assert_relative_eq!(circle.center.x(), scale, max_relative = 1e-12);
            assert_relative_eq!(circle.center.y(), 0.75 * scale, max_relative = 1e-12);
            assert_relative_eq!(circle.radius, 1.25 * scale, max_relative = 1e-12);

            let mixed = [
                pt(scale, 2.0 * scale),
                pt(0.0, 0.0),
                sg(0.0, 0.0, 2.0 * scale, 0.0),
            ];
            let circle = voronoi_circle(&mixed, &config()).unwrap();
            assert_relative_eq!(circle.center.y(), 1.25 * scale, max_relative = 1e-9);
            assert_relative_eq!(circle.radius, 1.25 * scale, max_relative = 1e-9);
        }
    }

    #[test]
    fn thin_point_triangles_keep_their_circle() {
        for height in [1e-3, 1e-8, 1e-12] {
            let sites = [pt(0.0, 0.0), pt(2.0, 0.0), pt(1.0, height)];
            let circles = equidistant_circles(&sites, &config());
            assert_eq!(circles.len(), 1, "height {height}");
            let expected_y = (height * height - 1.0) / (2.0 * height);
            assert_relative_eq!(circles[0].center.x(), 1.0, max_relative = 1e-9);
            assert_relative_eq!(circles[0].center.y(), expected_y, max_relative = 1e-9);
            assert_relative_eq!(circles[0].radius, expected_y.abs() + height, max_relative = 1e-9);
            assert!(voronoi_circle(&sites, &config()).is_some());
        }
        let collinear = [pt(0.0, 0.0), pt(2.0, 0.0), pt(1.0, 0.0)];
        assert!(equidistant_circles(&collinear, &config()).is_empty());
    }

    #[test]
    fn quadratic_with_large_constant_term_keeps_both_roots() {
        let roots = solve_quadratic(-1.0, 0.0, 1e16);
        assert_eq!(roots.len(), 2);
        for t in roots {
            assert_relative_eq!(t.abs(), 1e8, max_relative = 1e-12);
        }
        let linear = solve_quadratic(0.0, 2.0, -6.0);
        assert_eq!(linear.as_slice(), &[3.0]);
    }

    #[test]
    fn segment_joining_two_points_has_no_circle() {
        let sites = [pt(0.0, 0.0), pt(2.0, 0.0), sg(0.0, 0.0, 2.0, 0.0)];
        assert!(equidistant_circles(&sites, &config()).is_empty());

        // Oblique segments round the degenerate quadratic to a far root.
        for ([x1, y1], [x2, y2]) in [
            ([1.0, 0.0], [6.0, 6.0]),
            ([5.0, -1.0], [-2.0, 9.0]),
            ([3.0, 2.0], [6.0, -9.0]),
            ([0.0, 1.0], [5.0, 3.0]),
        ] {
            for scale in [1e-6, 1.0, 1e8] {
                let (x1, y1, x2, y2) = (x1 * scale, y1 * scale, x2 * scale, y2 * scale);
                let sites = [pt(x1, y1), pt(x2, y2), sg(x1, y1, x2, y2)];
                assert!(
                    equidistant_circles(&sites, &config()).is_empty(),
                    "({x1}, {y1}) - ({x2}, {y2})"
                );
            }
        }
    }

    #[test]
    fn point_between_parallel_segments_has_two_circles() {
        let sites = [
            pt(0.0, 0.0),
            sg(-5.0, 1.0, 5.0, 1.0),
            sg(-5.0, -1.0, 5.0, -1.0),
        ];
        let circles = equidistant_circles(&sites, &config());
        assert_eq!(circles.len(), 2);
        for c in &circles {
            assert_relative_eq!(c.radius, 1.0, epsilon = 1e-9);
            assert_relative_eq!(c.center.y(), 0.0, epsilon = 1e-9);
        }
        // Exactly one of the two has the requested orientation.
        let ccw = circles
            .iter()
            .filter(|c| tangency_order_is_ccw(&sites, c))
            .count();
        assert_eq!(ccw, 1);
    }

    // =============================================================================
    // BISECTOR TESTS
    // =============================================================================

    #[test]
    fn bisector_of_points_is_perpendicular_line() {
        let b = Bisector::new(&pt(0.0, 0.0), &pt(2.0, 0.0), None).unwrap();
        assert!(b.is_line());
        let p = b.point_at(3.0);
        assert_relative_eq!(p.x(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(b.parameter_of(&p), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn bisector_of_point_and_segment_is_parabola() {
        let b = Bisector::new(&pt(1.0, 2.0), &sg(0.0, 0.0, 2.0, 0.0), None).unwrap();
        assert!(!b.is_line());
        let vertex = b.point_at(1.0);
        assert_relative_eq!(vertex.x(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(vertex.y(), 1.0, epsilon = 1e-12);
        let q = b.point_at(0.0);
        assert_relative_eq!(q.distance(&Point::new(1.0, 2.0)), q.y(), epsilon = 1e-12);
    }

    #[test]
    fn bisector_of_segment_and_endpoint_is_normal_line() {
        let b = Bisector::new(&sg(0.0, 0.0, 2.0, 0.0), &pt(0.0, 0.0), None).unwrap();
        let p = b.point_at(5.0);
        assert_relative_eq!(p.x(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn bisector_of_two_segments_uses_hint_branch() {
        let s = sg(0.0, 1.0, 4.0, 1.0);
        let t = sg(0.0, -1.0, 4.0, -1.0);
        let b = Bisector::new(&s, &t, Some(Point::new(2.0, 0.0))).unwrap();
        let p = b.point_at(1.5);
        assert_relative_eq!(p.y(), 0.0, epsilon = 1e-12);
        assert!(Bisector::new(&s, &t, None).is_none());
    }

    #[test]
    fn direction_at_infinity_cases() {
        let u = direction_at_infinity(&pt(0.0, 0.0), &pt(2.0, 0.0)).unwrap();
        assert_eq!(u, Point::new(0.0, 1.0));
        let s = sg(0.0, 0.0, 2.0, 0.0);
        let down = direction_at_infinity(&s, &pt(0.0, 0.0)).unwrap();
        assert_eq!(down, Point::new(0.0, -1.0));
        let up = direction_at_infinity(&pt(0.0, 0.0), &s).unwrap();
        assert_eq!(up, Point::new(0.0, 1.0));
        assert!(direction_at_infinity(&pt(5.0, 5.0), &s).is_none());
    }

    #[test]
    fn line_through_and_distance() {
        let line = Line::through(Point::new(1.0, 0.0), Point::new(0.0, 1.0)).unwrap();
        assert_relative_eq!(line.a, 1.0);
        assert_relative_eq!(line.b, 0.0);
        assert_relative_eq!(line.c, -1.0);
        assert_relative_eq!(line.signed_distance(&Point::new(3.0, 7.0)), 2.0);
        assert_eq!(line.project(&Point::new(3.0, 7.0)), Point::new(1.0, 7.0));
    }
}
