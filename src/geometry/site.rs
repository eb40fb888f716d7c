//! Point and segment sites.
//!
//! A [`Site`] is the input primitive of the diagram: either a point or a
//! straight segment. Segments are undirected; their endpoints are stored in
//! lexicographic order so `Segment::new(p, q)` and `Segment::new(q, p)` compare
//! equal and hash identically.
//!
//! This module also owns [`DegenerateInputError`], raised for sites the
//! diagram cannot represent, and [`check_compatible`], the exact pairwise test
//! applied before a site touches the triangulation.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use thiserror::Error;

use crate::geometry::point::Point;
use crate::geometry::predicates::{SegmentIntersection, segment_intersection, strictly_between};

// =============================================================================
// ERROR TYPES
// =============================================================================

/// A site that cannot be represented in the diagram.
///
/// Recoverable: an insertion that fails with this error leaves the
/// triangulation unchanged, so callers may skip the site and continue.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DegenerateInputError {
    /// A segment whose endpoints coincide.
    #[error("Zero-length segment at {point}")]
    ZeroLengthSegment {
        /// The repeated endpoint.
        point: Point,
    },
    /// A coordinate is NaN or infinite.
    #[error("Non-finite coordinate in site point {point}")]
    NonFiniteCoordinate {
        /// The offending point.
        point: Point,
    },
    /// A point lies in the interior of an existing segment.
    #[error("Point {point} lies in the interior of segment {segment}")]
    PointOnSegment {
        /// The new point.
        point: Point,
        /// The existing segment.
        segment: Segment,
    },
    /// A new segment passes through an existing point site.
    #[error("Segment {segment} passes through existing point {point}")]
    SegmentThroughPoint {
        /// The new segment.
        segment: Segment,
        /// The existing point.
        point: Point,
    },
    /// An endpoint of one segment lies in the interior of the other.
    #[error("Segments {first} and {second} touch at an interior point")]
    EndpointOnSegment {
        /// The new segment.
        first: Segment,
        /// The existing segment.
        second: Segment,
    },
    /// Two segments cross at interior points.
    #[error("Segments {first} and {second} cross")]
    SegmentsCross {
        /// The new segment.
        first: Segment,
        /// The existing segment.
        second: Segment,
    },
    /// Two collinear segments share more than an endpoint.
    #[error("Segments {first} and {second} overlap")]
    OverlappingSegments {
        /// The new segment.
        first: Segment,
        /// The existing segment.
        second: Segment,
    },
}

// =============================================================================
// SEGMENT
// =============================================================================

/// An undirected segment with distinct endpoints.
///
/// # Examples
///
/// ```rust
/// use segment_voronoi::geometry::point::Point;
/// use segment_voronoi::geometry::site::Segment;
///
/// let a = Point::new(2.0, 0.0);
/// let b = Point::new(0.0, 0.0);
/// let s = Segment::new(a, b).unwrap();
/// assert_eq!(s, Segment::new(b, a).unwrap());
/// assert_eq!(s.source(), b);
/// assert!(Segment::new(a, a).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Segment {
    source: Point,
    target: Point,
}

impl Segment {
    /// Create a segment; endpoints are reordered lexicographically.
    ///
    /// # Errors
    ///
    /// Returns [`DegenerateInputError::ZeroLengthSegment`] when `p == q` and
    /// [`DegenerateInputError::NonFiniteCoordinate`] for NaN or infinite input.
    pub fn new(p: Point, q: Point) -> Result<Self, DegenerateInputError> {
        for point in [p, q] {
            if !point.is_finite() {
                return Err(DegenerateInputError::NonFiniteCoordinate { point });
            }
        }
        if p == q {
            return Err(DegenerateInputError::ZeroLengthSegment { point: p });
        }
        let (source, target) = if p < q { (p, q) } else { (q, p) };
        Ok(Self { source, target })
    }

    /// Lexicographically smaller endpoint.
    #[must_use]
    pub const fn source(&self) -> Point {
        self.source
    }

    /// Lexicographically larger endpoint.
    #[must_use]
    pub const fn target(&self) -> Point {
        self.target
    }

    /// Both endpoints, source first.
    #[must_use]
    pub const fn endpoints(&self) -> [Point; 2] {
        [self.source, self.target]
    }

    /// `true` when `p` is one of the endpoints.
    #[must_use]
    pub fn has_endpoint(&self, p: &Point) -> bool {
        self.source == *p || self.target == *p
    }

    /// The endpoint that is not `p`; `None` when `p` is not an endpoint.
    #[must_use]
    pub fn other_endpoint(&self, p: &Point) -> Option<Point> {
        if self.source == *p {
            Some(self.target)
        } else if self.target == *p {
            Some(self.source)
        } else {
            None
        }
    }

    /// Segment length.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.source.distance(&self.target)
    }

    /// Unit direction from source to target.
    #[must_use]
    pub fn direction(&self) -> Point {
        // Endpoints are distinct and finite, so the length is positive.
        let d = self.target - self.source;
        d * (1.0 / d.norm())
    }

    /// Closest point of the closed segment to `p` and its parameter in `[0, length]`.
    #[must_use]
    pub fn closest_point(&self, p: &Point) -> (Point, f64) {
        let u = self.direction();
        let t = (*p - self.source).dot(&u).clamp(0.0, self.length());
        (self.source + u * t, t)
    }

    /// Euclidean distance from `p` to the closed segment.
    #[must_use]
    pub fn distance_to(&self, p: &Point) -> f64 {
        self.closest_point(p).0.distance(p)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} - {}]", self.source, self.target)
    }
}

// =============================================================================
// SITE
// =============================================================================

/// Input primitive of the diagram.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Site {
    /// A point site.
    Point(Point),
    /// A segment site; its endpoints are point sites of their own.
    Segment(Segment),
}

impl Site {
    /// Create a point site.
    ///
    /// # Errors
    ///
    /// Returns [`DegenerateInputError::NonFiniteCoordinate`] for NaN or infinite input.
    pub fn point(x: f64, y: f64) -> Result<Self, DegenerateInputError> {
        let point = Point::new(x, y);
        if point.is_finite() {
            Ok(Self::Point(point))
        } else {
            Err(DegenerateInputError::NonFiniteCoordinate { point })
        }
    }

    /// Create a segment site.
    ///
    /// # Errors
    ///
    /// See [`Segment::new`].
    pub fn segment(p: Point, q: Point) -> Result<Self, DegenerateInputError> {
        Segment::new(p, q).map(Self::Segment)
    }

    /// `true` for point sites.
    #[must_use]
    pub const fn is_point(&self) -> bool {
        matches!(self, Self::Point(_))
    }

    /// `true` for segment sites.
    #[must_use]
    pub const fn is_segment(&self) -> bool {
        matches!(self, Self::Segment(_))
    }

    /// The point of a point site.
    #[must_use]
    pub const fn as_point(&self) -> Option<Point> {
        match self {
            Self::Point(p) => Some(*p),
            Self::Segment(_) => None,
        }
    }

    /// The segment of a segment site.
    #[must_use]
    pub const fn as_segment(&self) -> Option<Segment> {
        match self {
            Self::Point(_) => None,
            Self::Segment(s) => Some(*s),
        }
    }

    /// Points whose presence the site implies: itself, or both endpoints.
    #[must_use]
    pub fn support_points(&self) -> SmallVec<[Point; 2]> {
        match self {
            Self::Point(p) => SmallVec::from_slice(&[*p]),
            Self::Segment(s) => SmallVec::from_slice(&s.endpoints()),
        }
    }

    /// Distance from `p` to the closed site.
    #[must_use]
    pub fn distance_to(&self, p: &Point) -> f64 {
        match self {
            Self::Point(q) => q.distance(p),
            Self::Segment(s) => s.distance_to(p),
        }
    }

    /// `true` when `point` is a point site that is an endpoint of this segment site
    /// (or vice versa).
    #[must_use]
    pub fn is_endpoint_relation(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Point(p), Self::Segment(s)) | (Self::Segment(s), Self::Point(p)) => {
                s.has_endpoint(p)
            }
            _ => false,
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Point(p) => write!(f, "point {p}"),
            Self::Segment(s) => write!(f, "segment {s}"),
        }
    }
}

impl From<Point> for Site {
    fn from(point: Point) -> Self {
        Self::Point(point)
    }
}

impl From<Segment> for Site {
    fn from(segment: Segment) -> Self {
        Self::Segment(segment)
    }
}

// =============================================================================
// COMPATIBILITY
// =============================================================================

/// Check that `new` can coexist with the already inserted `existing` site.
///
/// Identical sites are compatible (insertion is idempotent); so are segments
/// sharing an endpoint and a segment with its own endpoints.
///
/// # Errors
///
/// Returns the [`DegenerateInputError`] describing the conflict.
pub fn check_compatible(new: &Site, existing: &Site) -> Result<(), DegenerateInputError> {
    match (new, existing) {
        (Site::Point(_), Site::Point(_)) => Ok(()),
        (Site::Point(p), Site::Segment(s)) => {
            if strictly_between(&s.source(), &s.target(), p) {
                Err(DegenerateInputError::PointOnSegment {
                    point: *p,
                    segment: *s,
                })
            } else {
                Ok(())
            }
        }
        (Site::Segment(s), Site::Point(p)) => {
            if strictly_between(&s.source(), &s.target(), p) {
                Err(DegenerateInputError::SegmentThroughPoint {
                    segment: *s,
                    point: *p,
                })
            } else {
                Ok(())
            }
        }
        (Site::Segment(s), Site::Segment(t)) => {
            if s == t {
                return Ok(());
            }
            let first = *s;
            let second = *t;
            match segment_intersection(&s.source(), &s.target(), &t.source(), &t.target()) {
                SegmentIntersection::Disjoint | SegmentIntersection::SharedEndpoint => Ok(()),
                SegmentIntersection::Touching => {
                    Err(DegenerateInputError::EndpointOnSegment { first, second })
                }
                SegmentIntersection::Crossing => {
                    Err(DegenerateInputError::SegmentsCross { first, second })
                }
                SegmentIntersection::Overlapping => {
                    Err(DegenerateInputError::OverlappingSegments { first, second })
                }
            }
        }
    }
}
