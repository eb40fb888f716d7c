//! Site location and conflict queries.
//!
//! Insertion starts from the site nearest to the new one and looks for a face
//! in conflict around it. The helpers here answer the per-face and per-edge
//! questions ("is this Voronoi vertex swallowed", "how much of this Voronoi
//! edge is swallowed") on top of the predicates in
//! [`sdg_predicates`](crate::geometry::sdg_predicates), translating faces and
//! edges of the [`Tds`] into sites and Voronoi vertices.
//!
//! Nearest-site lookup is a linear scan; the triangulation keeps no spatial
//! index.

use std::cmp::Ordering;

use crate::core::collections::FaceKeyBuffer;
use crate::core::edge::EdgeHandle;
use crate::core::triangulation_data_structure::{FaceKey, InvalidTriangulationError, Tds, VertexKey};
use crate::geometry::constructions::{Circle, direction_at_infinity, voronoi_circle};
use crate::geometry::kernel::Kernel;
use crate::geometry::point::Point;
use crate::geometry::robust_predicates::RobustPredicateConfig;
use crate::geometry::sdg_predicates::{
    EdgeConflict, EdgeEnd, finite_edge_conflict, finite_face_conflict, infinite_edge_conflict,
    infinite_face_conflict, point_face_conflict, point_triple,
};
use crate::geometry::site::Site;

/// Error during site location.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocateError {
    /// The triangulation has no faces to search.
    #[error("Cannot locate in a triangulation without faces")]
    EmptyTriangulation,

    /// The structure around the start vertex is broken.
    #[error("Cannot walk the star of {vertex:?}: {source}")]
    BrokenStar {
        /// The start vertex.
        vertex: VertexKey,
        /// What went wrong.
        source: InvalidTriangulationError,
    },
}

// =============================================================================
// NEAREST SITE
// =============================================================================

/// Distance from `q` to `site` when it counts for nearest-site search.
///
/// A segment counts only where `q` projects strictly inside it; elsewhere one
/// of its endpoints (a point site of its own) is at least as close.
fn nearest_distance(site: &Site, q: &Point) -> Option<f64> {
    match site {
        Site::Point(p) => Some(p.distance(q)),
        Site::Segment(s) => {
            let (_, t) = s.closest_point(q);
            (t > 0.0 && t < s.length()).then(|| s.distance_to(q))
        }
    }
}

/// The finite vertex whose site is nearest to `q`.
///
/// Ties go to the lexicographically smallest site. Returns `None` when no
/// site is inserted.
#[must_use]
pub fn nearest_vertex(tds: &Tds, q: &Point) -> Option<VertexKey> {
    let mut best: Option<(f64, Site, VertexKey)> = None;
    for (key, vertex) in tds.vertices() {
        let Some(site) = vertex.site() else {
            continue;
        };
        let Some(distance) = nearest_distance(&site, q) else {
            continue;
        };
        let better = match &best {
            None => true,
            Some((d, s, _)) => match distance.total_cmp(d) {
                Ordering::Less => true,
                Ordering::Equal => site < *s,
                Ordering::Greater => false,
            },
        };
        if better {
            best = Some((distance, site, key));
        }
    }
    best.map(|(_, _, key)| key)
}

// =============================================================================
// VORONOI VERTICES OF FACES
// =============================================================================

/// Voronoi circle of a finite face.
#[must_use]
pub fn face_circle(tds: &Tds, config: &RobustPredicateConfig, f: FaceKey) -> Option<Circle> {
    voronoi_circle(&tds.face_sites(f)?, config)
}

/// Voronoi vertex of a face: the circle center of a finite face, or the
/// direction at infinity of an infinite one.
#[must_use]
pub fn voronoi_vertex(tds: &Tds, config: &RobustPredicateConfig, f: FaceKey) -> Option<EdgeEnd> {
    if tds.is_infinite_face(f) {
        let (a, b) = tds.infinite_face_sites(f)?;
        direction_at_infinity(&a, &b).map(EdgeEnd::Infinite)
    } else {
        face_circle(tds, config, f).map(|c| EdgeEnd::Vertex(c.center))
    }
}

// =============================================================================
// CONFLICTS
// =============================================================================

/// `true` when `q` is strictly closer to the Voronoi vertex of `f` than the
/// sites of `f`.
pub fn face_in_conflict<K: Kernel>(tds: &Tds, kernel: &K, f: FaceKey, q: &Site) -> bool {
    if tds.is_infinite_face(f) {
        return tds
            .infinite_face_sites(f)
            .is_some_and(|(a, b)| infinite_face_conflict(kernel, &a, &b, q));
    }
    let Some(sites) = tds.face_sites(f) else {
        return false;
    };
    if let Some(face) = point_triple(&sites) {
        return point_face_conflict(kernel, &face, q);
    }
    match voronoi_circle(&sites, kernel.config()) {
        Some(circle) => finite_face_conflict(kernel, &sites, &circle, q),
        None => {
            tracing::trace!("face {f:?} has no Voronoi circle; treated as not in conflict");
            false
        }
    }
}

/// How much of the Voronoi edge dual to `edge` the site `q` swallows.
///
/// Edges to the vertex at infinity are arcs of directions (empty arcs for
/// segment sites, which reach infinity in single directions only). Returns
/// `None` when the edge geometry cannot be evaluated.
#[must_use]
pub fn edge_conflict(
    tds: &Tds,
    config: &RobustPredicateConfig,
    edge: EdgeHandle,
    q: &Site,
) -> Option<EdgeConflict> {
    let (f, i) = (edge.face(), edge.index());
    let face = tds.face(f)?;
    let g = face.neighbor(i)?;
    let (a, b) = face.edge_vertices(i);
    let c = face.vertex(i);
    let d = tds.mirror_vertex(f, i)?;

    if tds.is_infinite(a) || tds.is_infinite(b) {
        let x_first = tds.is_infinite(b);
        let x = if x_first { a } else { b };
        let x_site = tds.site(x)?;
        let Site::Point(xp) = x_site else {
            return Some(EdgeConflict {
                touches_interior: false,
                covers_interior: true,
            });
        };
        let c_site = tds.site(c)?;
        let d_site = tds.site(d)?;
        // X's arc at infinity runs counter-clockwise from the direction of the
        // face right of the edge to the face left of it.
        let (from, to) = if x_first {
            (
                direction_at_infinity(&x_site, &d_site)?,
                direction_at_infinity(&c_site, &x_site)?,
            )
        } else {
            (
                direction_at_infinity(&x_site, &c_site)?,
                direction_at_infinity(&d_site, &x_site)?,
            )
        };
        return Some(infinite_edge_conflict(config, &xp, &from, &to, q));
    }

    let a_site = tds.site(a)?;
    let b_site = tds.site(b)?;
    let first = voronoi_vertex(tds, config, f)?;
    let second = voronoi_vertex(tds, config, g)?;
    finite_edge_conflict(config, &a_site, &b_site, first, second, q)
}

/// Faces around `anchor` in conflict with `q`, in star order.
///
/// # Errors
///
/// Returns [`LocateError::BrokenStar`] if the star of `anchor` cannot be walked.
pub fn conflict_seeds<K: Kernel>(
    tds: &Tds,
    kernel: &K,
    anchor: VertexKey,
    q: &Site,
) -> Result<FaceKeyBuffer, LocateError> {
    let star = tds
        .incident_faces(anchor)
        .map_err(|source| LocateError::BrokenStar {
            vertex: anchor,
            source,
        })?;
    Ok(star
        .into_iter()
        .filter(|&f| face_in_conflict(tds, kernel, f, q))
        .collect())
}

/// Every face in conflict with `q`, by exhaustive scan.
#[must_use]
pub fn conflict_faces_brute_force<K: Kernel>(tds: &Tds, kernel: &K, q: &Site) -> FaceKeyBuffer {
    tds.faces()
        .map(|(f, _)| f)
        .filter(|&f| face_in_conflict(tds, kernel, f, q))
        .collect()
}

/// First edge leaving `anchor` (in star order) whose dual interior `q` touches.
///
/// # Errors
///
/// Returns [`LocateError::BrokenStar`] if the star of `anchor` cannot be walked.
pub fn touched_edge_near<K: Kernel>(
    tds: &Tds,
    kernel: &K,
    anchor: VertexKey,
    q: &Site,
) -> Result<Option<EdgeHandle>, LocateError> {
    let edges = tds
        .incident_edges(anchor)
        .map_err(|source| LocateError::BrokenStar {
            vertex: anchor,
            source,
        })?;
    Ok(edges.into_iter().find(|&edge| {
        edge_conflict(tds, kernel.config(), edge, q).is_some_and(|c| c.touches_interior)
    }))
}

/// First edge anywhere whose dual interior `q` touches, by exhaustive scan.
#[must_use]
pub fn touched_edge_brute_force<K: Kernel>(tds: &Tds, kernel: &K, q: &Site) -> Option<EdgeHandle> {
    tds.faces()
        .flat_map(|(f, _)| (0..3).map(move |i| EdgeHandle::new(f, i)))
        .find(|&edge| {
            edge_conflict(tds, kernel.config(), edge, q).is_some_and(|c| c.touches_interior)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::segment_delaunay_graph::SegmentDelaunayGraph;
    use crate::geometry::kernel::RobustKernel;

    fn pt(x: f64, y: f64) -> Site {
        Site::point(x, y).unwrap()
    }

    #[test]
    fn nearest_vertex_prefers_lexicographic_ties() {
        let sdg = SegmentDelaunayGraph::from_sites([pt(0.0, 0.0), pt(2.0, 0.0)]).unwrap();
        let tds = sdg.tds();
        let v = nearest_vertex(tds, &Point::new(1.0, 5.0)).unwrap();
        assert_eq!(tds.site(v), Some(pt(0.0, 0.0)));
        let v = nearest_vertex(tds, &Point::new(1.5, 0.0)).unwrap();
        assert_eq!(tds.site(v), Some(pt(2.0, 0.0)));
        assert!(nearest_vertex(&Tds::new(), &Point::origin()).is_none());
    }

    #[test]
    fn nearest_vertex_counts_segment_interiors() {
        let s = Site::segment(Point::new(0.0, 0.0), Point::new(4.0, 0.0)).unwrap();
        let sdg = SegmentDelaunayGraph::from_sites([s, pt(2.0, 3.0)]).unwrap();
        let tds = sdg.tds();
        let v = nearest_vertex(tds, &Point::new(2.0, 0.5)).unwrap();
        assert_eq!(tds.site(v), Some(s));
        // Beyond the segment's extent only the endpoint counts.
        let v = nearest_vertex(tds, &Point::new(5.0, 0.5)).unwrap();
        assert_eq!(tds.site(v), Some(pt(4.0, 0.0)));
    }

    #[test]
    fn conflicts_around_triangle() {
        let sdg =
            SegmentDelaunayGraph::from_sites([pt(0.0, 0.0), pt(2.0, 0.0), pt(1.0, 2.0)]).unwrap();
        let tds = sdg.tds();
        let kernel = RobustKernel::new();
        let inside = pt(1.0, 0.5);
        let hits = conflict_faces_brute_force(tds, &kernel, &inside);
        // The finite face is in conflict; the point lies inside the hull.
        assert!(hits.iter().any(|&f| !tds.is_infinite_face(f)));

        let far = pt(1.0, -10.0);
        let hits = conflict_faces_brute_force(tds, &kernel, &far);
        assert!(!hits.is_empty());
        assert!(hits.iter().all(|&f| tds.is_infinite_face(f)));
        assert!(
            hits.iter()
                .any(|&f| tds.infinite_face_sites(f) == Some((pt(2.0, 0.0), pt(0.0, 0.0))))
        );
    }

    #[test]
    fn large_point_faces_are_decided_exactly() {
        let sdg = SegmentDelaunayGraph::from_sites([
            pt(0.0, 0.0),
            pt(2e8, 0.0),
            pt(1e8, 2e8),
        ])
        .unwrap();
        let tds = sdg.tds();
        let kernel = RobustKernel::new();
        let (finite, _) = tds.faces().find(|(f, _)| !tds.is_infinite_face(*f)).unwrap();
        assert!(face_in_conflict(tds, &kernel, finite, &pt(1e8, 5e7)));
        assert!(!face_in_conflict(tds, &kernel, finite, &pt(1e8, -1e8)));
    }

    #[test]
    fn voronoi_vertices_of_triangle_faces() {
        let sdg =
            SegmentDelaunayGraph::from_sites([pt(0.0, 0.0), pt(2.0, 0.0), pt(1.0, 2.0)]).unwrap();
        let tds = sdg.tds();
        let config = RobustPredicateConfig::default();
        let mut finite = 0;
        let mut infinite = 0;
        for (f, _) in tds.faces() {
            match voronoi_vertex(tds, &config, f) {
                Some(EdgeEnd::Vertex(c)) => {
                    finite += 1;
                    assert!((c.x() - 1.0).abs() < 1e-12);
                    assert!((c.y() - 0.75).abs() < 1e-12);
                }
                Some(EdgeEnd::Infinite(_)) => infinite += 1,
                None => panic!("face without Voronoi vertex"),
            }
        }
        assert_eq!((finite, infinite), (1, 3));
    }
}
