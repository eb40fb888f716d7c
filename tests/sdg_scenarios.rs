//! End-to-end scenarios for small site sets.
//!
//! Covers:
//! - Empty, one, two and three point configurations
//! - Dual edge counts and primitive kinds
//! - Degenerate input leaving the graph unchanged
//! - Idempotent re-insertion

use approx::assert_relative_eq;
use segment_voronoi::prelude::*;

fn pt(x: f64, y: f64) -> Site {
    Site::point(x, y).unwrap()
}

fn classified(sdg: &SegmentDelaunayGraph) -> Vec<DualEdge> {
    sdg.dual_edges()
        .collect::<Result<Vec<_>, _>>()
        .expect("every edge should classify")
}

// =============================================================================
// POINT CONFIGURATIONS
// =============================================================================

#[test]
fn single_point_has_no_finite_edges() {
    let sdg = SegmentDelaunayGraph::from_sites([pt(3.0, -1.0)]).unwrap();
    assert_eq!(sdg.number_of_vertices(), 1);
    assert_eq!(sdg.number_of_finite_edges(), 0);
    assert!(classified(&sdg).is_empty());
    assert!(sdg.is_valid(ValidationLevel::Global));
}

#[test]
fn two_points_give_the_line_x_equals_one() {
    let sdg = SegmentDelaunayGraph::from_sites([pt(0.0, 0.0), pt(2.0, 0.0)]).unwrap();
    let edges = classified(&sdg);
    assert_eq!(edges.len(), 1);

    let DualPrimitive::Line(line) = edges[0].primitive else {
        panic!("expected a line, got {:?}", edges[0].primitive);
    };
    // a x + b y + c = 0 with a = ±1, b = 0, c = ∓1.
    assert_relative_eq!(line.a.abs(), 1.0, epsilon = 1e-12);
    assert_relative_eq!(line.b, 0.0, epsilon = 1e-12);
    assert_relative_eq!(line.signed_distance(&Point::new(1.0, 7.0)), 0.0, epsilon = 1e-12);

    let defining: Vec<Option<Site>> = edges[0].sites.iter().map(DualSite::site).collect();
    assert!(defining[..2].contains(&Some(pt(0.0, 0.0))));
    assert!(defining[..2].contains(&Some(pt(2.0, 0.0))));
    assert_eq!(&defining[2..], &[None, None]);
}

#[test]
fn triangle_gives_three_rays_from_the_circumcenter() {
    let sdg = SegmentDelaunayGraph::from_sites([pt(0.0, 0.0), pt(2.0, 0.0), pt(1.0, 2.0)]).unwrap();
    assert_eq!(sdg.number_of_finite_faces(), 1);

    let edges = classified(&sdg);
    assert_eq!(edges.len(), 3);
    for edge in &edges {
        let DualPrimitive::Ray { origin, direction } = edge.primitive else {
            panic!("expected a ray, got {:?}", edge.primitive);
        };
        assert_relative_eq!(origin.x(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(origin.y(), 0.75, epsilon = 1e-12);
        assert_relative_eq!(direction.norm(), 1.0, epsilon = 1e-12);
        assert_eq!(edge.sites.iter().filter(|s| s.is_at_infinity()).count(), 1);
    }
}

#[test]
fn square_with_center_point_has_bounded_edges() {
    let sdg = SegmentDelaunayGraph::from_sites([
        pt(0.0, 0.0),
        pt(4.0, 0.1),
        pt(4.2, 4.0),
        pt(-0.1, 3.9),
        pt(2.0, 2.0),
    ])
    .unwrap();
    assert!(sdg.is_valid(ValidationLevel::Global));
    assert_eq!(sdg.number_of_finite_faces(), 4);

    let edges = classified(&sdg);
    let segments = edges
        .iter()
        .filter(|e| matches!(e.primitive, DualPrimitive::Segment { .. }))
        .count();
    let rays = edges
        .iter()
        .filter(|e| matches!(e.primitive, DualPrimitive::Ray { .. }))
        .count();
    // The center point's cell is a quadrilateral; the hull edges give rays.
    assert_eq!(segments, 4);
    assert_eq!(rays, 4);
}

#[test]
fn collinear_points_give_parallel_lines() {
    let sdg =
        SegmentDelaunayGraph::from_sites([pt(0.0, 0.0), pt(1.0, 1.0), pt(3.0, 3.0), pt(2.0, 2.0)])
            .unwrap();
    assert_eq!(sdg.dimension(), 1);
    assert!(sdg.is_valid(ValidationLevel::Global));

    let edges = classified(&sdg);
    assert_eq!(edges.len(), 3);
    for edge in &edges {
        let DualPrimitive::Line(line) = edge.primitive else {
            panic!("expected a line, got {:?}", edge.primitive);
        };
        assert_relative_eq!(line.a.abs(), line.b.abs(), epsilon = 1e-12);
    }
}

// =============================================================================
// DEGENERATE INPUT AND IDEMPOTENCY
// =============================================================================

#[test]
fn zero_length_segment_is_rejected() {
    assert!(matches!(
        Site::segment(Point::new(1.0, 1.0), Point::new(1.0, 1.0)),
        Err(DegenerateInputError::ZeroLengthSegment { .. })
    ));

    let mut sdg = SegmentDelaunayGraph::from_sites([pt(0.0, 0.0), pt(2.0, 1.0)]).unwrap();
    let before = (sdg.number_of_vertices(), sdg.number_of_faces());
    let result = sdg.insert(Site::Point(Point::new(f64::INFINITY, 0.0)));
    assert!(matches!(
        result,
        Err(InsertionError::DegenerateInput(
            DegenerateInputError::NonFiniteCoordinate { .. }
        ))
    ));
    assert_eq!((sdg.number_of_vertices(), sdg.number_of_faces()), before);
}

#[test]
fn reinserting_points_changes_nothing() {
    let sites = [pt(0.0, 0.0), pt(5.0, 1.0), pt(2.0, 4.0), pt(1.0, 1.5)];
    let mut sdg = SegmentDelaunayGraph::from_sites(sites).unwrap();
    let before = (
        sdg.number_of_vertices(),
        sdg.number_of_faces(),
        classified(&sdg),
    );
    for site in sites {
        let (_, stats) = sdg.insert_with_statistics(site).unwrap();
        assert!(stats.skipped());
    }
    assert_eq!(
        (
            sdg.number_of_vertices(),
            sdg.number_of_faces(),
            classified(&sdg)
        ),
        before
    );
}

#[test]
fn statistics_describe_the_insertion() {
    let mut sdg = SegmentDelaunayGraph::from_sites([pt(0.0, 0.0), pt(4.0, 0.0), pt(2.0, 3.0)])
        .unwrap();
    let (_, stats) = sdg.insert_with_statistics(pt(2.0, 1.0)).unwrap();
    assert!(stats.success());
    assert_eq!(stats.vertices_created, 1);
    assert!(stats.faces_removed >= 1);
    assert_eq!(stats.faces_created, stats.faces_removed + 2);
    assert_eq!(stats.edge_splits, 0);
}
