//! Sign-exact geometric predicates on points.
//!
//! Every predicate here first evaluates its determinant in plain `f64` and
//! compares the result against a static forward error bound (Shewchuk's
//! stage-A bounds). Only when the floating value cannot certify the sign is
//! the determinant re-evaluated exactly over [`BigRational`]; every finite
//! `f64` is a dyadic rational, so the fallback is exact.
//!
//! These are the only predicates allowed to decide point-only topology
//! (orientation, in-circle, collinear betweenness).

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, Zero};
use std::cmp::Ordering;

use crate::geometry::point::Point;

/// Unit roundoff for `f64`.
const EPSILON: f64 = f64::EPSILON * 0.5;
/// Error bound for the 2x2 orientation determinant.
const CCW_ERRBOUND: f64 = (3.0 + 16.0 * EPSILON) * EPSILON;
/// Error bound for the 3x3 lifted in-circle determinant.
const ICC_ERRBOUND: f64 = (10.0 + 96.0 * EPSILON) * EPSILON;
/// Error bound for a difference-of-products dot product.
const DOT_ERRBOUND: f64 = (3.0 + 16.0 * EPSILON) * EPSILON;

/// Position of a point relative to the circle through three points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InCircle {
    /// The point is outside the circle
    OUTSIDE,
    /// The point is on the circle
    BOUNDARY,
    /// The point is inside the circle
    INSIDE,
}

impl std::fmt::Display for InCircle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OUTSIDE => write!(f, "OUTSIDE"),
            Self::BOUNDARY => write!(f, "BOUNDARY"),
            Self::INSIDE => write!(f, "INSIDE"),
        }
    }
}

/// Orientation of an ordered triple of points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Clockwise turn (determinant < 0)
    NEGATIVE,
    /// Collinear (determinant == 0)
    DEGENERATE,
    /// Counter-clockwise turn (determinant > 0)
    POSITIVE,
}

impl Orientation {
    /// Orientation from the sign of a value.
    #[must_use]
    pub fn from_ordering(ordering: Ordering) -> Self {
        match ordering {
            Ordering::Less => Self::NEGATIVE,
            Ordering::Equal => Self::DEGENERATE,
            Ordering::Greater => Self::POSITIVE,
        }
    }

    /// The orientation as `-1`, `0` or `1`.
    #[must_use]
    pub const fn sign(self) -> i32 {
        match self {
            Self::NEGATIVE => -1,
            Self::DEGENERATE => 0,
            Self::POSITIVE => 1,
        }
    }

    /// Orientation of the reversed triple.
    #[must_use]
    pub const fn reverse(self) -> Self {
        match self {
            Self::NEGATIVE => Self::POSITIVE,
            Self::DEGENERATE => Self::DEGENERATE,
            Self::POSITIVE => Self::NEGATIVE,
        }
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NEGATIVE => write!(f, "NEGATIVE"),
            Self::DEGENERATE => write!(f, "DEGENERATE"),
            Self::POSITIVE => write!(f, "POSITIVE"),
        }
    }
}

// =============================================================================
// EXACT ARITHMETIC HELPERS
// =============================================================================

fn exact(value: f64) -> BigRational {
    // Callers validate finiteness before any predicate runs.
    BigRational::from_float(value).unwrap_or_else(|| BigRational::from_integer(BigInt::zero()))
}

fn exact_point(p: &Point) -> (BigRational, BigRational) {
    (exact(p.x()), exact(p.y()))
}

fn rational_ordering(value: &BigRational) -> Ordering {
    if value.is_positive() {
        Ordering::Greater
    } else if value.is_negative() {
        Ordering::Less
    } else {
        Ordering::Equal
    }
}

fn filtered_ordering(det: f64, errbound: f64) -> Option<Ordering> {
    if det > errbound {
        Some(Ordering::Greater)
    } else if -det > errbound {
        Some(Ordering::Less)
    } else {
        None
    }
}

// =============================================================================
// ORIENTATION
// =============================================================================

/// Exact orientation of `(a, b, c)`.
///
/// # Examples
///
/// ```rust
/// use segment_voronoi::geometry::point::Point;
/// use segment_voronoi::geometry::predicates::{orientation, Orientation};
///
/// let a = Point::new(0.0, 0.0);
/// let b = Point::new(1.0, 0.0);
/// assert_eq!(orientation(&a, &b, &Point::new(0.0, 1.0)), Orientation::POSITIVE);
/// assert_eq!(orientation(&a, &b, &Point::new(2.0, 0.0)), Orientation::DEGENERATE);
/// ```
#[must_use]
pub fn orientation(a: &Point, b: &Point, c: &Point) -> Orientation {
    let detleft = (a.x() - c.x()) * (b.y() - c.y());
    let detright = (a.y() - c.y()) * (b.x() - c.x());
    let det = detleft - detright;
    let detsum = detleft.abs() + detright.abs();

    if let Some(ordering) = filtered_ordering(det, CCW_ERRBOUND * detsum) {
        return Orientation::from_ordering(ordering);
    }
    if detsum == 0.0 {
        return Orientation::DEGENERATE;
    }
    Orientation::from_ordering(orientation_exact(a, b, c))
}

fn orientation_exact(a: &Point, b: &Point, c: &Point) -> Ordering {
    let (ax, ay) = exact_point(a);
    let (bx, by) = exact_point(b);
    let (cx, cy) = exact_point(c);
    let det = (&ax - &cx) * (&by - &cy) - (&ay - &cy) * (&bx - &cx);
    rational_ordering(&det)
}

/// Plain floating-point orientation, without the exact fallback.
///
/// Used by [`FastKernel`](crate::geometry::kernel::FastKernel) for comparison.
#[must_use]
pub fn orientation_inexact(a: &Point, b: &Point, c: &Point) -> Orientation {
    let det = (b.x() - a.x()) * (c.y() - a.y()) - (b.y() - a.y()) * (c.x() - a.x());
    Orientation::from_ordering(det.partial_cmp(&0.0).unwrap_or(Ordering::Equal))
}

// =============================================================================
// IN-CIRCLE
// =============================================================================

/// Exact position of `d` relative to the circle through `a`, `b`, `c`.
///
/// The triple `(a, b, c)` must be counter-clockwise for `INSIDE` to mean the
/// disk interior; for a clockwise triple the answer is mirrored.
#[must_use]
pub fn in_circle(a: &Point, b: &Point, c: &Point, d: &Point) -> InCircle {
    let adx = a.x() - d.x();
    let bdx = b.x() - d.x();
    let cdx = c.x() - d.x();
    let ady = a.y() - d.y();
    let bdy = b.y() - d.y();
    let cdy = c.y() - d.y();

    let bdxcdy = bdx * cdy;
    let cdxbdy = cdx * bdy;
    let alift = adx * adx + ady * ady;

    let cdxady = cdx * ady;
    let adxcdy = adx * cdy;
    let blift = bdx * bdx + bdy * bdy;

    let adxbdy = adx * bdy;
    let bdxady = bdx * ady;
    let clift = cdx * cdx + cdy * cdy;

    let det = alift * (bdxcdy - cdxbdy) + blift * (cdxady - adxcdy) + clift * (adxbdy - bdxady);
    let permanent = (bdxcdy.abs() + cdxbdy.abs()) * alift
        + (cdxady.abs() + adxcdy.abs()) * blift
        + (adxbdy.abs() + bdxady.abs()) * clift;

    let ordering = filtered_ordering(det, ICC_ERRBOUND * permanent)
        .unwrap_or_else(|| in_circle_exact(a, b, c, d));
    match ordering {
        Ordering::Greater => InCircle::INSIDE,
        Ordering::Equal => InCircle::BOUNDARY,
        Ordering::Less => InCircle::OUTSIDE,
    }
}

fn in_circle_exact(a: &Point, b: &Point, c: &Point, d: &Point) -> Ordering {
    let (ax, ay) = exact_point(a);
    let (bx, by) = exact_point(b);
    let (cx, cy) = exact_point(c);
    let (dx, dy) = exact_point(d);

    let adx = &ax - &dx;
    let ady = &ay - &dy;
    let bdx = &bx - &dx;
    let bdy = &by - &dy;
    let cdx = &cx - &dx;
    let cdy = &cy - &dy;

    let alift = &adx * &adx + &ady * &ady;
    let blift = &bdx * &bdx + &bdy * &bdy;
    let clift = &cdx * &cdx + &cdy * &cdy;

    let det = alift * (&bdx * &cdy - &cdx * &bdy)
        + blift * (&cdx * &ady - &adx * &cdy)
        + clift * (&adx * &bdy - &bdx * &ady);
    rational_ordering(&det)
}

/// Plain floating-point in-circle test, without the exact fallback.
#[must_use]
pub fn in_circle_inexact(a: &Point, b: &Point, c: &Point, d: &Point) -> InCircle {
    let ad = *a - *d;
    let bd = *b - *d;
    let cd = *c - *d;
    let det = ad.norm_squared() * bd.cross(&cd) + bd.norm_squared() * cd.cross(&ad)
        + cd.norm_squared() * ad.cross(&bd);
    match det.partial_cmp(&0.0).unwrap_or(Ordering::Equal) {
        Ordering::Greater => InCircle::INSIDE,
        Ordering::Equal => InCircle::BOUNDARY,
        Ordering::Less => InCircle::OUTSIDE,
    }
}

/// Exact position of the closed segment `[s, t]` relative to the disk
/// bounded by the circle through `a`, `b` and `c`.
///
/// [`InCircle::INSIDE`] when some point of the segment lies strictly inside
/// the disk, [`InCircle::BOUNDARY`] when the segment only touches the circle.
/// Collinear `(a, b, c)` bound no disk and give [`InCircle::OUTSIDE`].
///
/// Always evaluated over rationals; callers settle the easy cases with
/// [`in_circle`] on the endpoints first.
#[must_use]
pub fn segment_in_circle(a: &Point, b: &Point, c: &Point, s: &Point, t: &Point) -> InCircle {
    if orientation(a, b, c) == Orientation::DEGENERATE {
        return InCircle::OUTSIDE;
    }
    let (ax, ay) = exact_point(a);
    let relative = |p: &Point| {
        let (x, y) = exact_point(p);
        (x - &ax, y - &ay)
    };
    let (bx, by) = relative(b);
    let (cx, cy) = relative(c);
    let (sx, sy) = relative(s);
    let (tx, ty) = relative(t);

    // Circumcenter relative to `a`; the radius is its distance to the origin.
    let two = BigRational::from_integer(BigInt::from(2));
    let det = two * (&bx * &cy - &by * &cx);
    let bb = &bx * &bx + &by * &by;
    let cc = &cx * &cx + &cy * &cy;
    let ox = (&cy * &bb - &by * &cc) / &det;
    let oy = (&bx * &cc - &cx * &bb) / &det;
    let radius_sq = &ox * &ox + &oy * &oy;

    let (vx, vy) = (&tx - &sx, &ty - &sy);
    let (wx, wy) = (&ox - &sx, &oy - &sy);
    let along = &wx * &vx + &wy * &vy;
    let length_sq = &vx * &vx + &vy * &vy;
    let distance_sq = if !along.is_positive() {
        &wx * &wx + &wy * &wy
    } else if along >= length_sq {
        let (ux, uy) = (&ox - &tx, &oy - &ty);
        &ux * &ux + &uy * &uy
    } else {
        &wx * &wx + &wy * &wy - &along * &along / &length_sq
    };
    match distance_sq.cmp(&radius_sq) {
        Ordering::Less => InCircle::INSIDE,
        Ordering::Equal => InCircle::BOUNDARY,
        Ordering::Greater => InCircle::OUTSIDE,
    }
}

// =============================================================================
// DOT-PRODUCT SIGNS AND COLLINEAR ORDER
// =============================================================================

/// Exact sign of `(b - a) · (d - c)`.
#[must_use]
pub fn dot_sign(a: &Point, b: &Point, c: &Point, d: &Point) -> Ordering {
    let left = (b.x() - a.x()) * (d.x() - c.x());
    let right = (b.y() - a.y()) * (d.y() - c.y());
    let value = left + right;
    let sum = left.abs() + right.abs();
    if let Some(ordering) = filtered_ordering(value, DOT_ERRBOUND * sum) {
        return ordering;
    }
    if sum == 0.0 {
        return Ordering::Equal;
    }
    let (ax, ay) = exact_point(a);
    let (bx, by) = exact_point(b);
    let (cx, cy) = exact_point(c);
    let (dx, dy) = exact_point(d);
    let value = (bx - ax) * (dx - cx) + (by - ay) * (dy - cy);
    rational_ordering(&value)
}

/// `true` when `p` lies strictly inside the open segment `(a, b)`.
///
/// Exact: requires `p` collinear with `a`, `b` and strictly between them.
#[must_use]
pub fn strictly_between(a: &Point, b: &Point, p: &Point) -> bool {
    if a == b || p == a || p == b {
        return false;
    }
    orientation(a, b, p) == Orientation::DEGENERATE
        && dot_sign(a, p, a, b) == Ordering::Greater
        && dot_sign(b, p, b, a) == Ordering::Greater
}

/// `true` when `p` lies on the closed segment `[a, b]`.
#[must_use]
pub fn on_closed_segment(a: &Point, b: &Point, p: &Point) -> bool {
    p == a || p == b || strictly_between(a, b, p)
}

// =============================================================================
// SEGMENT INTERSECTION
// =============================================================================

/// How two closed segments meet, decided with exact orientations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentIntersection {
    /// The closed segments are disjoint
    Disjoint,
    /// The segments share exactly one endpoint and nothing else
    SharedEndpoint,
    /// An endpoint of one segment lies in the interior of the other
    Touching,
    /// The interiors cross at a single point
    Crossing,
    /// The segments are collinear and share more than one point
    Overlapping,
}

/// Classify how the closed segments `[p1, p2]` and `[q1, q2]` intersect.
#[must_use]
pub fn segment_intersection(p1: &Point, p2: &Point, q1: &Point, q2: &Point) -> SegmentIntersection {
    let o1 = orientation(p1, p2, q1);
    let o2 = orientation(p1, p2, q2);
    let o3 = orientation(q1, q2, p1);
    let o4 = orientation(q1, q2, p2);

    if o1 == Orientation::DEGENERATE && o2 == Orientation::DEGENERATE {
        return collinear_intersection(p1, p2, q1, q2);
    }

    if o1.sign() * o2.sign() > 0 || o3.sign() * o4.sign() > 0 {
        return SegmentIntersection::Disjoint;
    }

    let shares = [p1, p2]
        .into_iter()
        .any(|p| p == q1 || p == q2);
    if shares {
        // Non-collinear segments meet in at most one point.
        return SegmentIntersection::SharedEndpoint;
    }

    if [o1, o2, o3, o4].contains(&Orientation::DEGENERATE) {
        return SegmentIntersection::Touching;
    }
    SegmentIntersection::Crossing
}

fn collinear_intersection(p1: &Point, p2: &Point, q1: &Point, q2: &Point) -> SegmentIntersection {
    let interior_hit = strictly_between(p1, p2, q1)
        || strictly_between(p1, p2, q2)
        || strictly_between(q1, q2, p1)
        || strictly_between(q1, q2, p2);
    let same = (p1 == q1 && p2 == q2) || (p1 == q2 && p2 == q1);
    if interior_hit || same {
        return SegmentIntersection::Overlapping;
    }
    let shares = p1 == q1 || p1 == q2 || p2 == q1 || p2 == q2;
    if shares {
        SegmentIntersection::SharedEndpoint
    } else {
        SegmentIntersection::Disjoint
    }
}
