//! Planar points and the vector arithmetic used by constructions.
//!
//! # Equality Semantics
//!
//! [`Point`] equality and hashing go through [`OrderedFloat`] so points can be
//! used as keys in hash-based collections (site lookup relies on this). Signed
//! zeros are normalized on construction, so `Point::new(-0.0, 1.0)` and
//! `Point::new(0.0, 1.0)` are the same point.
//!
//! Points double as 2D vectors: `b - a` is the vector from `a` to `b`.

#![forbid(unsafe_code)]

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Mul, Neg, Sub};

// =============================================================================
// POINT STRUCT DEFINITION
// =============================================================================

/// A point (or vector) in the plane with `f64` coordinates.
///
/// Points are immutable once created; the coordinates are private and read
/// through [`Point::x`] / [`Point::y`].
///
/// # Examples
///
/// ```rust
/// use segment_voronoi::geometry::point::Point;
///
/// let a = Point::new(1.0, 2.0);
/// let b = Point::new(4.0, 6.0);
/// assert_eq!((b - a).norm(), 5.0);
/// assert_eq!(Point::new(-0.0, 0.0), Point::new(0.0, 0.0));
/// ```
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    x: f64,
    y: f64,
}

impl Point {
    /// Create a point, normalizing `-0.0` to `0.0`.
    #[inline]
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: x + 0.0,
            y: y + 0.0,
        }
    }

    /// The origin.
    #[must_use]
    pub const fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// The x coordinate.
    #[inline]
    #[must_use]
    pub const fn x(&self) -> f64 {
        self.x
    }

    /// The y coordinate.
    #[inline]
    #[must_use]
    pub const fn y(&self) -> f64 {
        self.y
    }

    /// Coordinates as an array.
    #[inline]
    #[must_use]
    pub const fn to_array(&self) -> [f64; 2] {
        [self.x, self.y]
    }

    /// `true` when both coordinates are finite.
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Dot product, treating both points as vectors.
    #[inline]
    #[must_use]
    pub fn dot(&self, other: &Self) -> f64 {
        self.x.mul_add(other.x, self.y * other.y)
    }

    /// 2D cross product (z component of the 3D cross product).
    #[inline]
    #[must_use]
    pub fn cross(&self, other: &Self) -> f64 {
        self.x.mul_add(other.y, -(self.y * other.x))
    }

    /// Squared Euclidean length.
    #[inline]
    #[must_use]
    pub fn norm_squared(&self) -> f64 {
        self.dot(self)
    }

    /// Euclidean length.
    #[inline]
    #[must_use]
    pub fn norm(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Distance to another point.
    #[inline]
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        (*self - *other).norm()
    }

    /// The vector rotated by +90 degrees: `(x, y) -> (-y, x)`.
    #[inline]
    #[must_use]
    pub fn perp(&self) -> Self {
        Self::new(-self.y, self.x)
    }

    /// Unit vector in the same direction, or `None` for the zero vector.
    #[must_use]
    pub fn normalized(&self) -> Option<Self> {
        let n = self.norm();
        if n > 0.0 && n.is_finite() {
            Some(Self::new(self.x / n, self.y / n))
        } else {
            None
        }
    }

    /// Midpoint of `self` and `other`.
    #[inline]
    #[must_use]
    pub fn midpoint(&self, other: &Self) -> Self {
        Self::new(
            0.5f64.mul_add(other.x - self.x, self.x),
            0.5f64.mul_add(other.y - self.y, self.y),
        )
    }

    /// Largest absolute coordinate; used to scale tolerances.
    #[inline]
    #[must_use]
    pub fn max_abs(&self) -> f64 {
        self.x.abs().max(self.y.abs())
    }

    fn ordered(&self) -> [OrderedFloat<f64>; 2] {
        [OrderedFloat(self.x), OrderedFloat(self.y)]
    }
}

// =============================================================================
// TRAIT IMPLEMENTATIONS
// =============================================================================

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.ordered() == other.ordered()
    }
}

impl Eq for Point {}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ordered().hash(state);
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Lexicographic order on `(x, y)`; the deterministic tie-break order of the crate.
impl Ord for Point {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ordered().cmp(&other.ordered())
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<[f64; 2]> for Point {
    fn from(coords: [f64; 2]) -> Self {
        Self::new(coords[0], coords[1])
    }
}

impl From<Point> for [f64; 2] {
    fn from(point: Point) -> Self {
        point.to_array()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Point {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

/// Convenience constructor: `point!(x, y)`.
///
/// # Examples
///
/// ```rust
/// use segment_voronoi::point;
///
/// let p = point!(1.0, 2.0);
/// assert_eq!(p.x(), 1.0);
/// ```
#[macro_export]
macro_rules! point {
    ($x:expr, $y:expr $(,)?) => {
        $crate::geometry::point::Point::new($x, $y)
    };
}
