//! Property-based tests for the documented triangulation invariants (src/lib.rs).
//! - Global validity after random insertions
//! - Euler characteristic of the triangulated sphere
//! - Insertion order independence for points in general position
//! - Segment fans sharing endpoints, in any order and at any unit
//! - Every finite edge classifies, with known defining sites

use proptest::prelude::*;
use segment_voronoi::prelude::*;
use std::collections::HashMap;

// Strategy: finite coordinate range
fn finite_coordinate() -> impl Strategy<Value = f64> {
    (-100.0..100.0).prop_filter("must be finite", |x: &f64| x.is_finite())
}

fn point_site() -> impl Strategy<Value = Site> {
    (finite_coordinate(), finite_coordinate()).prop_map(|(x, y)| Site::point(x, y).unwrap())
}

// Horizontal segments on well separated levels never intersect each other.
fn stacked_segments() -> impl Strategy<Value = Vec<Site>> {
    prop::collection::vec((-50.0..0.0_f64, 5.0..50.0_f64, -1.0..1.0_f64), 1..=4).prop_map(
        |rows| {
            [-30.0, -10.0, 10.0, 30.0]
                .into_iter()
                .zip(rows)
                .map(|(level, (x0, length, jitter))| {
                    let y = level + jitter;
                    Site::segment(Point::new(x0, y), Point::new(x0 + length, y)).unwrap()
                })
                .collect()
        },
    )
}

fn float_point() -> impl Strategy<Value = Point> + Clone {
    (-100.0..100.0_f64, -100.0..100.0_f64).prop_map(|(x, y)| Point::new(x, y))
}

fn grid_point() -> impl Strategy<Value = Point> + Clone {
    (0..=8_i32, 0..=8_i32).prop_map(|(x, y)| Point::new(f64::from(x), f64::from(y)))
}

// Hubs with several segments leaving them, loose segments and points, shuffled.
// Zero-length segments are dropped; crossings are left to the insertion to reject.
fn fan_sites<S>(point: S) -> impl Strategy<Value = Vec<Site>>
where
    S: Strategy<Value = Point> + Clone,
{
    (
        prop::collection::vec((point.clone(), prop::collection::vec(point.clone(), 2..=5)), 1..=3),
        prop::collection::vec((point.clone(), point.clone()), 0..=6),
        prop::collection::vec(point, 0..=6),
    )
        .prop_map(|(fans, loose, points)| {
            let spokes = fans
                .into_iter()
                .flat_map(|(hub, ends)| ends.into_iter().map(move |end| (hub, end)));
            spokes
                .chain(loose)
                .filter_map(|(a, b)| Site::segment(a, b).ok())
                .chain(points.into_iter().map(Site::Point))
                .collect::<Vec<_>>()
        })
        .prop_shuffle()
}

/// Insert `sites` in order, keeping the ones compatible with those before.
fn insert_compatible(sites: &[Site]) -> Result<(SegmentDelaunayGraph, Vec<Site>), TestCaseError> {
    let mut sdg = SegmentDelaunayGraph::new();
    let mut accepted = Vec::new();
    for site in sites {
        match sdg.insert(*site) {
            Ok(_) => accepted.push(*site),
            Err(InsertionError::DegenerateInput(_)) => {}
            Err(e) => return Err(TestCaseError::fail(format!("inserting {site}: {e}"))),
        }
    }
    Ok((sdg, accepted))
}

fn scaled(site: &Site, factor: f64) -> Site {
    match site {
        Site::Point(p) => Site::Point(*p * factor),
        Site::Segment(s) => Site::segment(s.source() * factor, s.target() * factor).unwrap(),
    }
}

fn euler_characteristic(sdg: &SegmentDelaunayGraph) -> i64 {
    let tds = sdg.tds();
    let v = i64::try_from(tds.number_of_vertices() + 1).unwrap();
    let e = i64::try_from(tds.number_of_edges()).unwrap();
    let f = i64::try_from(tds.number_of_faces()).unwrap();
    v - e + f
}

/// Unordered pairs of Delaunay neighbors, as text.
fn neighbor_pairs(sdg: &SegmentDelaunayGraph) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = sdg
        .dual_edges()
        .map(|edge| {
            let edge = edge.unwrap();
            let a = edge.sites[0].site().unwrap().to_string();
            let b = edge.sites[1].site().unwrap().to_string();
            if a <= b { (a, b) } else { (b, a) }
        })
        .collect();
    pairs.sort();
    pairs
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_random_points_are_globally_valid(
        sites in prop::collection::vec(point_site(), 1..=24)
    ) {
        let sdg = SegmentDelaunayGraph::from_sites(sites.iter().copied()).unwrap();
        prop_assert!(sdg.validate(ValidationLevel::Global).is_ok());
        if sdg.number_of_vertices() >= 2 {
            prop_assert_eq!(euler_characteristic(&sdg), 2);
        }
        for site in &sites {
            prop_assert!(sdg.contains(site));
        }
    }

    #[test]
    fn prop_point_order_does_not_matter(
        sites in prop::collection::vec(point_site(), 3..=16)
    ) {
        let forward = SegmentDelaunayGraph::from_sites(sites.iter().copied()).unwrap();
        let backward = SegmentDelaunayGraph::from_sites(sites.iter().rev().copied()).unwrap();
        prop_assert_eq!(forward.number_of_faces(), backward.number_of_faces());
        prop_assert_eq!(neighbor_pairs(&forward), neighbor_pairs(&backward));
    }

    #[test]
    fn prop_segments_and_points_are_globally_valid(
        segments in stacked_segments(),
        points in prop::collection::vec(point_site(), 0..=8)
    ) {
        let mut sdg = SegmentDelaunayGraph::new();
        for site in segments.iter().chain(points.iter()) {
            sdg.insert(*site).unwrap();
        }
        prop_assert!(sdg.validate(ValidationLevel::Global).is_ok());
        prop_assert_eq!(euler_characteristic(&sdg), 2);

        for edge in sdg.dual_edges() {
            let edge = edge.unwrap();
            for site in edge.sites.iter().filter_map(DualSite::site) {
                prop_assert!(sdg.contains(&site));
            }
        }
    }

    #[test]
    fn prop_rejected_insertions_leave_the_graph_unchanged(
        segments in stacked_segments(),
        t in 0.1..0.9_f64
    ) {
        let mut sdg = SegmentDelaunayGraph::from_sites(segments.iter().copied()).unwrap();
        let before = (sdg.number_of_vertices(), sdg.number_of_faces());

        // A point strictly inside the first (horizontal) segment.
        let s = segments[0].as_segment().unwrap();
        let x = (s.target().x() - s.source().x()).mul_add(t, s.source().x());
        let result = sdg.insert(Site::point(x, s.source().y()).unwrap());
        prop_assert!(
            matches!(
                result,
                Err(InsertionError::DegenerateInput(DegenerateInputError::PointOnSegment { .. }))
            ),
            "expected PointOnSegment, got {result:?}"
        );
        prop_assert_eq!((sdg.number_of_vertices(), sdg.number_of_faces()), before);
        prop_assert!(sdg.is_valid(ValidationLevel::Global));
    }

    #[test]
    fn prop_segment_fans_are_valid_in_either_order(sites in fan_sites(float_point())) {
        let (forward, accepted) = insert_compatible(&sites)?;
        prop_assert!(forward.validate(ValidationLevel::Global).is_ok());
        prop_assert_eq!(euler_characteristic(&forward), 2);

        let mut backward = SegmentDelaunayGraph::new();
        for site in accepted.iter().rev() {
            let inserted = backward.insert(*site);
            prop_assert!(inserted.is_ok(), "reinserting {}: {:?}", site, inserted);
        }
        prop_assert!(backward.validate(ValidationLevel::Global).is_ok());
        prop_assert_eq!(forward.number_of_faces(), backward.number_of_faces());
        prop_assert_eq!(neighbor_pairs(&forward), neighbor_pairs(&backward));
    }

    #[test]
    fn prop_grid_fans_are_valid_in_either_order(sites in fan_sites(grid_point())) {
        // Grid input is full of cocircular ties, so only validity is compared.
        let (forward, accepted) = insert_compatible(&sites)?;
        prop_assert!(forward.validate(ValidationLevel::Global).is_ok());

        let mut backward = SegmentDelaunayGraph::new();
        for site in accepted.iter().rev() {
            let inserted = backward.insert(*site);
            prop_assert!(inserted.is_ok(), "reinserting {}: {:?}", site, inserted);
        }
        prop_assert!(backward.validate(ValidationLevel::Global).is_ok());
        prop_assert_eq!(forward.number_of_vertices(), backward.number_of_vertices());
    }

    #[test]
    fn prop_segment_fans_do_not_depend_on_the_unit(
        sites in fan_sites(float_point()),
        exponent in prop::sample::select(vec![-40_i32, -20, 20, 40])
    ) {
        // Powers of two rescale exactly, so only the tolerances see the unit.
        let factor = 2.0_f64.powi(exponent);
        let (reference, accepted) = insert_compatible(&sites)?;

        let mut labels: HashMap<String, String> = HashMap::new();
        let mut rescaled = SegmentDelaunayGraph::new();
        for site in &accepted {
            let big = scaled(site, factor);
            labels.insert(big.to_string(), site.to_string());
            for p in site.support_points() {
                labels.insert(Site::Point(p * factor).to_string(), Site::Point(p).to_string());
            }
            let inserted = rescaled.insert(big);
            prop_assert!(inserted.is_ok(), "inserting {}: {:?}", big, inserted);
        }
        prop_assert!(rescaled.validate(ValidationLevel::Global).is_ok());

        let mut relabeled: Vec<(String, String)> = neighbor_pairs(&rescaled)
            .into_iter()
            .map(|(a, b)| {
                let a = labels.get(&a).cloned().unwrap_or(a);
                let b = labels.get(&b).cloned().unwrap_or(b);
                if a <= b { (a, b) } else { (b, a) }
            })
            .collect();
        relabeled.sort();
        prop_assert_eq!(relabeled, neighbor_pairs(&reference));
    }
}
