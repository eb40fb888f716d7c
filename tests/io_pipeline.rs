//! Text input and output around a full construction.
//!
//! Covers:
//! - Reading site files, comments and errors with line numbers
//! - Writing dual edges with their defining sites
//! - Re-reading the written defining sites
//! - Serde round trips of sites and dual edges

use segment_voronoi::io::{ReadOptionsBuilder, format_dual_site, parse_site_line, parse_sites_with};
use segment_voronoi::prelude::*;

const SITES: &str = "\
# a polyline and two points
s 0 0 3 1
s 3 1 5 4
p 1 3
p 4.5 -1.25
";

fn build(text: &str) -> SegmentDelaunayGraph {
    SegmentDelaunayGraph::from_sites(parse_sites(text).unwrap()).unwrap()
}

#[test]
fn output_has_one_line_per_finite_edge() {
    let sdg = build(SITES);
    let edges: Vec<DualEdge> = sdg.dual_edges().map(Result::unwrap).collect();

    let mut out = Vec::new();
    write_dual_edges(&mut out, &edges, false).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert_eq!(text.lines().count(), sdg.number_of_finite_edges());
    for line in text.lines() {
        let tag = line.split_whitespace().next().unwrap();
        assert!(["l", "s", "r", "p"].contains(&tag), "unexpected record {line}");
        assert!(!line.contains('|'));
    }
}

#[test]
fn written_defining_sites_read_back_as_inserted_sites() {
    let sdg = build(SITES);
    let edges: Vec<DualEdge> = sdg.dual_edges().map(Result::unwrap).collect();

    let mut out = Vec::new();
    write_dual_edges(&mut out, &edges, true).unwrap();
    let text = String::from_utf8(out).unwrap();

    let options = ReadOptions::default();
    for line in text.lines() {
        let fields: Vec<&str> = line.split(" | ").collect();
        assert_eq!(fields.len(), 5, "primitive plus four sites: {line}");
        for field in &fields[1..] {
            if *field == "inf" {
                continue;
            }
            let site = parse_site_line(field, 1, &options).unwrap().unwrap();
            assert!(sdg.contains(&site), "{field} was never inserted");
        }
    }
}

#[test]
fn dual_site_text_matches_the_input_notation() {
    let site = DualSite::Site(Site::segment(point!(3.0, 1.0), point!(0.0, 0.0)).unwrap());
    assert_eq!(format_dual_site(&site), "s 0 0 3 1");
    assert_eq!(format_dual_site(&DualSite::AtInfinity), "inf");
}

#[test]
fn read_errors_carry_line_numbers() {
    let err = parse_sites("p 0 0\n\np 1\n").unwrap_err();
    assert!(matches!(err, SiteParseError::Syntax { line: 3, .. }));

    let err = parse_sites("# header\ns 1 1 1 1\n").unwrap_err();
    assert!(matches!(
        err,
        SiteParseError::Degenerate {
            line: 2,
            source: DegenerateInputError::ZeroLengthSegment { .. }
        }
    ));

    let err = parse_sites("q 1 2\n").unwrap_err();
    assert!(err.to_string().contains("Line 1"), "{err}");
}

#[test]
fn collapsed_point_segments_build_like_points() {
    let options = ReadOptionsBuilder::default()
        .collapse_point_segments(true)
        .build()
        .unwrap();
    let sites = parse_sites_with("s 2 2 2 2\np 0 0\n", &options).unwrap();
    assert_eq!(sites, vec![Site::point(2.0, 2.0).unwrap(), Site::point(0.0, 0.0).unwrap()]);

    let sdg = SegmentDelaunayGraph::from_sites(sites).unwrap();
    assert_eq!(sdg.number_of_vertices(), 2);
}

#[test]
fn sites_and_edges_survive_serde() {
    let sdg = build(SITES);
    let sites: Vec<Site> = sdg.sites().collect();
    let json = serde_json::to_string(&sites).unwrap();
    let back: Vec<Site> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, sites);

    let edges: Vec<DualEdge> = sdg.dual_edges().map(Result::unwrap).collect();
    let json = serde_json::to_string(&edges).unwrap();
    let back: Vec<DualEdge> = serde_json::from_str(&json).unwrap();
    assert_eq!(back.len(), edges.len());
    for (read, written) in back.iter().zip(&edges) {
        assert_eq!(read.sites, written.sites);
        assert_eq!(read.primitive.kind(), written.primitive.kind());
    }
}
