//! Voronoi edges as the dual of the segment Delaunay graph.
//!
//! Every finite edge `A-B` of the triangulation is dual to a piece of the
//! bisector of `A` and `B`, bounded by the Voronoi vertices of the two faces
//! sharing the edge. With `C` and `D` the apexes of those faces:
//!
//! | `C`, `D`            | bisector of `A`, `B`           | primitive                  |
//! |---------------------|--------------------------------|----------------------------|
//! | both infinite       | straight                       | [`DualPrimitive::Line`]    |
//! | both finite         | point and non-incident segment | [`DualPrimitive::ParabolicArc`] |
//! | both finite         | otherwise                      | [`DualPrimitive::Segment`] |
//! | one infinite        | straight                       | [`DualPrimitive::Ray`]     |
//!
//! Anything else is reported as [`UnsupportedConfigurationError`]. All
//! coordinates come from the inexact constructions.

use std::iter::FusedIterator;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::algorithms::locate::face_circle;
use crate::core::edge::EdgeHandle;
use crate::core::triangulation_data_structure::{FaceKey, Tds, VertexKey};
use crate::geometry::constructions::{Bisector, Line, direction_at_infinity};
use crate::geometry::point::Point;
use crate::geometry::robust_predicates::RobustPredicateConfig;
use crate::geometry::site::{Segment, Site};

/// A finite edge whose dual has none of the known shapes.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("Unsupported dual configuration at edge {edge:?}: {message}")]
pub struct UnsupportedConfigurationError {
    /// The edge being classified.
    pub edge: EdgeHandle,
    /// What could not be classified.
    pub message: String,
}

// =============================================================================
// PRIMITIVES
// =============================================================================

/// A defining site of a dual edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DualSite {
    /// An inserted site.
    Site(Site),
    /// The vertex at infinity.
    AtInfinity,
}

impl DualSite {
    /// The site, unless at infinity.
    #[must_use]
    pub const fn site(&self) -> Option<Site> {
        match self {
            Self::Site(site) => Some(*site),
            Self::AtInfinity => None,
        }
    }

    /// `true` for the vertex at infinity.
    #[must_use]
    pub const fn is_at_infinity(&self) -> bool {
        matches!(self, Self::AtInfinity)
    }
}

/// Arc of the parabola with `focus` and `directrix` between two of its points.
///
/// # Examples
///
/// ```rust
/// use segment_voronoi::core::dual::ParabolicArc;
/// use segment_voronoi::geometry::constructions::Line;
/// use segment_voronoi::geometry::point::Point;
///
/// // y = x² / 2 + 1/2: focus (0, 1), directrix y = 0.
/// let arc = ParabolicArc {
///     focus: Point::new(0.0, 1.0),
///     directrix: Line::through(Point::new(0.0, 0.0), Point::new(1.0, 0.0)).unwrap(),
///     source: Point::new(-1.0, 1.0),
///     target: Point::new(1.0, 1.0),
/// };
/// assert_eq!(arc.parameters(), (-1.0, 1.0));
/// assert_eq!(arc.point_at(0.0), Point::new(0.0, 0.5));
/// assert_eq!(arc.sample(3).len(), 3);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParabolicArc {
    /// The focus (the point site).
    pub focus: Point,
    /// The directrix (supporting line of the segment site).
    pub directrix: Line,
    /// First endpoint.
    pub source: Point,
    /// Second endpoint.
    pub target: Point,
}

impl ParabolicArc {
    /// Parameters of the endpoints along the directrix direction, measured
    /// from [`Line::point`].
    #[must_use]
    pub fn parameters(&self) -> (f64, f64) {
        let origin = self.directrix.point();
        let direction = self.directrix.direction();
        (
            (self.source - origin).dot(&direction),
            (self.target - origin).dot(&direction),
        )
    }

    /// The axis of symmetry: through the focus, perpendicular to the directrix.
    #[must_use]
    pub fn axis(&self) -> Line {
        let normal = self.directrix.normal();
        Line::through(self.focus, normal).unwrap_or(self.directrix)
    }

    /// Point of the parabola above parameter `t` of the directrix.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point {
        let foot = self.directrix.point() + self.directrix.direction() * t;
        let offset = self.directrix.signed_distance(&self.focus);
        let toward_focus = self.directrix.normal() * offset.signum();
        foot + toward_focus * ((foot - self.focus).norm_squared() / (2.0 * offset.abs()))
    }

    /// `n` points of the arc at equally spaced parameters, endpoints included.
    #[must_use]
    pub fn sample(&self, n: usize) -> Vec<Point> {
        match n {
            0 => Vec::new(),
            1 => vec![self.source],
            _ => {
                let (t0, t1) = self.parameters();
                #[allow(clippy::cast_precision_loss)]
                let step = (t1 - t0) / (n - 1) as f64;
                (0..n)
                    .map(|k| {
                        #[allow(clippy::cast_precision_loss)]
                        let t = t0 + step * k as f64;
                        self.point_at(t)
                    })
                    .collect()
            }
        }
    }
}

/// Shape of a Voronoi edge.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum DualPrimitive {
    /// A full line.
    Line(Line),
    /// A bounded straight piece.
    Segment {
        /// First Voronoi vertex.
        source: Point,
        /// Second Voronoi vertex.
        target: Point,
    },
    /// A half-line.
    Ray {
        /// The finite Voronoi vertex.
        origin: Point,
        /// Unit direction toward infinity.
        direction: Point,
    },
    /// A bounded parabolic piece.
    ParabolicArc(ParabolicArc),
}

impl DualPrimitive {
    /// Short lowercase name of the primitive kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Line(_) => "line",
            Self::Segment { .. } => "segment",
            Self::Ray { .. } => "ray",
            Self::ParabolicArc(_) => "parabolic_arc",
        }
    }
}

/// A classified Voronoi edge with its defining quadruple.
///
/// `sites` is `[A, B, C, D]`: the endpoints of the Delaunay edge, whose
/// bisector carries the Voronoi edge, followed by the apexes of the two faces
/// whose Voronoi vertices bound it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DualEdge {
    /// Defining sites `[A, B, C, D]`.
    pub sites: [DualSite; 4],
    /// Shape of the edge.
    pub primitive: DualPrimitive,
}

// =============================================================================
// CLASSIFICATION
// =============================================================================

fn dual_site(tds: &Tds, v: VertexKey) -> DualSite {
    tds.site(v).map_or(DualSite::AtInfinity, DualSite::Site)
}

/// The segment and the point of a point/segment pair whose bisector is a
/// parabola.
fn parabolic_pair(a: &Site, b: &Site) -> Option<(Point, Segment)> {
    match (a, b) {
        (Site::Point(p), Site::Segment(s)) | (Site::Segment(s), Site::Point(p))
            if !s.has_endpoint(p) =>
        {
            Some((*p, *s))
        }
        _ => None,
    }
}

fn unsupported(edge: EdgeHandle, message: impl Into<String>) -> UnsupportedConfigurationError {
    UnsupportedConfigurationError {
        edge,
        message: message.into(),
    }
}

fn circle_center(
    tds: &Tds,
    config: &RobustPredicateConfig,
    edge: EdgeHandle,
    f: FaceKey,
) -> Result<Point, UnsupportedConfigurationError> {
    face_circle(tds, config, f)
        .map(|circle| circle.center)
        .ok_or_else(|| unsupported(edge, format!("face {f:?} has no Voronoi circle")))
}

fn infinite_direction(
    tds: &Tds,
    edge: EdgeHandle,
    f: FaceKey,
) -> Result<Point, UnsupportedConfigurationError> {
    let (a, b) = tds
        .infinite_face_sites(f)
        .ok_or_else(|| unsupported(edge, format!("face {f:?} is not an infinite face")))?;
    direction_at_infinity(&a, &b)
        .ok_or_else(|| unsupported(edge, format!("bisector of {a} and {b} does not reach infinity")))
}

/// Classify the dual of the finite edge `edge`.
///
/// # Errors
///
/// Returns [`UnsupportedConfigurationError`] if the edge is not a finite edge
/// of `tds` or its dual has none of the four known shapes.
pub fn classify_edge(
    tds: &Tds,
    config: &RobustPredicateConfig,
    edge: EdgeHandle,
) -> Result<DualEdge, UnsupportedConfigurationError> {
    let (f, i) = (edge.face(), edge.index());
    let face = tds
        .face(f)
        .ok_or_else(|| unsupported(edge, "face not found"))?;
    let mirror = tds
        .mirror_edge(edge)
        .ok_or_else(|| unsupported(edge, "edge has no mirror"))?;
    let g = mirror.face();
    let (a, b) = face.edge_vertices(i);
    let c = face.vertex(i);
    let d = tds
        .mirror_vertex(f, i)
        .ok_or_else(|| unsupported(edge, "edge has no mirror vertex"))?;

    let (Some(site_a), Some(site_b)) = (tds.site(a), tds.site(b)) else {
        return Err(unsupported(edge, "edge is incident to the vertex at infinity"));
    };
    let sites = [
        DualSite::Site(site_a),
        DualSite::Site(site_b),
        dual_site(tds, c),
        dual_site(tds, d),
    ];
    let parabola = parabolic_pair(&site_a, &site_b);

    let primitive = match (tds.is_infinite(c), tds.is_infinite(d)) {
        (true, true) => match Bisector::new(&site_a, &site_b, None) {
            Some(Bisector::Line { origin, direction }) => Line::through(origin, direction)
                .map(DualPrimitive::Line)
                .ok_or_else(|| unsupported(edge, "bisector has no direction"))?,
            _ => {
                return Err(unsupported(
                    edge,
                    format!("bisector of {site_a} and {site_b} is not a full line"),
                ));
            }
        },
        (false, false) => {
            let source = circle_center(tds, config, edge, f)?;
            let target = circle_center(tds, config, edge, g)?;
            match parabola {
                Some((focus, segment)) => DualPrimitive::ParabolicArc(ParabolicArc {
                    focus,
                    directrix: Line::supporting(&segment),
                    source,
                    target,
                }),
                None => DualPrimitive::Segment { source, target },
            }
        }
        (c_infinite, _) => {
            if parabola.is_some() {
                return Err(unsupported(
                    edge,
                    format!("parabolic bisector of {site_a} and {site_b} reaches infinity"),
                ));
            }
            let (finite, infinite) = if c_infinite { (g, f) } else { (f, g) };
            DualPrimitive::Ray {
                origin: circle_center(tds, config, edge, finite)?,
                direction: infinite_direction(tds, edge, infinite)?,
            }
        }
    };
    tracing::trace!("edge {edge:?} is dual to a {}", primitive.kind());
    Ok(DualEdge { sites, primitive })
}

// =============================================================================
// ITERATOR
// =============================================================================

/// Lazy iterator over the classified finite edges of a triangulation.
///
/// Cloning restarts from the clone's position; the order is deterministic for
/// a given triangulation state.
#[derive(Clone, Debug)]
pub struct DualEdgeIter<'a> {
    tds: &'a Tds,
    config: RobustPredicateConfig,
    edges: std::vec::IntoIter<EdgeHandle>,
}

impl<'a> DualEdgeIter<'a> {
    /// Iterate over the finite edges of `tds`.
    #[must_use]
    pub fn new(tds: &'a Tds, config: RobustPredicateConfig) -> Self {
        let edges: Vec<EdgeHandle> = tds.finite_edges().collect();
        Self {
            tds,
            config,
            edges: edges.into_iter(),
        }
    }
}

impl Iterator for DualEdgeIter<'_> {
    type Item = Result<DualEdge, UnsupportedConfigurationError>;

    fn next(&mut self) -> Option<Self::Item> {
        let edge = self.edges.next()?;
        Some(classify_edge(self.tds, &self.config, edge))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.edges.size_hint()
    }
}

impl ExactSizeIterator for DualEdgeIter<'_> {}

impl FusedIterator for DualEdgeIter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::segment_delaunay_graph::SegmentDelaunayGraph;
    use approx::assert_relative_eq;

    fn pt(x: f64, y: f64) -> Site {
        Site::point(x, y).unwrap()
    }

    fn edges(sites: &[Site]) -> Vec<DualEdge> {
        let sdg = SegmentDelaunayGraph::from_sites(sites.iter().copied()).unwrap();
        sdg.dual_edges().collect::<Result<_, _>>().unwrap()
    }

    #[test]
    fn single_point_has_no_edges() {
        assert!(edges(&[pt(0.0, 0.0)]).is_empty());
    }

    #[test]
    fn two_points_give_their_bisector_line() {
        let edges = edges(&[pt(0.0, 0.0), pt(2.0, 0.0)]);
        assert_eq!(edges.len(), 1);
        let DualPrimitive::Line(line) = edges[0].primitive else {
            panic!("expected a line, got {:?}", edges[0].primitive);
        };
        // x = 1 up to the sign of the equation.
        assert_relative_eq!(line.a.abs(), 1.0);
        assert_relative_eq!(line.b, 0.0);
        assert_relative_eq!(line.c, -line.a);
        assert!(edges[0].sites[2].is_at_infinity());
        assert!(edges[0].sites[3].is_at_infinity());
    }

    #[test]
    fn triangle_gives_three_rays_from_circumcenter() {
        let edges = edges(&[pt(0.0, 0.0), pt(2.0, 0.0), pt(1.0, 2.0)]);
        assert_eq!(edges.len(), 3);
        for edge in &edges {
            let DualPrimitive::Ray { origin, direction } = edge.primitive else {
                panic!("expected a ray, got {:?}", edge.primitive);
            };
            assert_relative_eq!(origin.x(), 1.0, epsilon = 1e-12);
            assert_relative_eq!(origin.y(), 0.75, epsilon = 1e-12);
            assert_relative_eq!(direction.norm(), 1.0, epsilon = 1e-12);
            // Perpendicular to the Delaunay edge, pointing away from the triangle.
            let a = edge.sites[0].site().and_then(|s| s.as_point()).unwrap();
            let b = edge.sites[1].site().and_then(|s| s.as_point()).unwrap();
            assert_relative_eq!(direction.dot(&(b - a)), 0.0, epsilon = 1e-12);
            let centroid = Point::new(1.0, 2.0 / 3.0);
            assert!(direction.dot(&(a.midpoint(&b) - centroid)) > 0.0);
        }
        let down = edges
            .iter()
            .find_map(|e| match e.primitive {
                DualPrimitive::Ray { direction, .. } if direction.y() < -0.5 => Some(direction),
                _ => None,
            })
            .unwrap();
        assert_relative_eq!(down.x(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn point_and_segment_give_a_parabolic_arc() {
        let segment = Site::segment(Point::new(0.0, 0.0), Point::new(2.0, 0.0)).unwrap();
        let point = pt(1.0, 2.0);
        let edges = edges(&[segment, point]);
        let arc = edges
            .iter()
            .find_map(|e| match e.primitive {
                DualPrimitive::ParabolicArc(arc) => Some(arc),
                _ => None,
            })
            .unwrap();
        assert_eq!(arc.focus, Point::new(1.0, 2.0));
        for end in [arc.source, arc.target] {
            assert_relative_eq!(end.distance(&arc.focus), end.y().abs(), epsilon = 1e-9);
        }
        let (t0, t1) = arc.parameters();
        assert_relative_eq!(arc.point_at(t0).distance(&arc.source), 0.0, epsilon = 1e-9);
        assert_relative_eq!(arc.point_at(t1).distance(&arc.target), 0.0, epsilon = 1e-9);
        // The vertex of the parabola lies on its axis, halfway to the directrix.
        let along = arc.directrix.direction();
        let apex = arc.point_at(along.dot(&(arc.focus - arc.directrix.point())));
        assert_relative_eq!(apex.y(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(arc.axis().signed_distance(&apex), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn every_reported_site_was_inserted() {
        let input = [
            Site::segment(Point::new(0.0, 0.0), Point::new(3.0, 1.0)).unwrap(),
            pt(1.0, 3.0),
            pt(4.0, -1.0),
            pt(-2.0, 1.0),
        ];
        let sdg = SegmentDelaunayGraph::from_sites(input).unwrap();
        let inserted: Vec<Site> = sdg.sites().collect();
        for edge in sdg.dual_edges() {
            let edge = edge.unwrap();
            for site in edge.sites.iter().filter_map(DualSite::site) {
                assert!(inserted.contains(&site), "{site} was not inserted");
            }
        }
    }

    #[test]
    fn iteration_is_restartable() {
        let sdg =
            SegmentDelaunayGraph::from_sites([pt(0.0, 0.0), pt(2.0, 0.0), pt(1.0, 2.0)]).unwrap();
        let mut iter = sdg.dual_edges();
        assert_eq!(iter.len(), 3);
        let restart = iter.clone();
        let first = iter.next();
        assert_eq!(restart.clone().next(), first);
        assert_eq!(restart.count(), 3);
        assert_eq!(iter.count(), 2);
    }

    #[test]
    fn arc_sampling() {
        let arc = ParabolicArc {
            focus: Point::new(0.0, 1.0),
            directrix: Line::through(Point::new(0.0, 0.0), Point::new(1.0, 0.0)).unwrap(),
            source: Point::new(-2.0, 2.5),
            target: Point::new(2.0, 2.5),
        };
        assert!(arc.sample(0).is_empty());
        assert_eq!(arc.sample(1), vec![arc.source]);
        let points = arc.sample(5);
        assert_eq!(points.len(), 5);
        assert_relative_eq!(points[2].x(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(points[2].y(), 0.5, epsilon = 1e-12);
        assert_relative_eq!(points[4].y(), 2.5, epsilon = 1e-12);
    }
}
