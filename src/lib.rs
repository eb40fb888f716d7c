//! # segment-voronoi
//!
//! Voronoi diagrams of points and straight line segments in the plane,
//! computed through their dual: the segment Delaunay graph, a generalized
//! Delaunay triangulation of the sites built by incremental insertion.
//! Inspired by the segment Delaunay graph of [CGAL](https://www.cgal.org).
//!
//! # Features
//!
//! - Point and segment sites; segments may share endpoints
//! - Atomic incremental insertion with rejection of crossing or overlapping input
//! - Exact point predicates (floating filter with a rational fallback)
//! - Validation at three strictness levels
//! - Lazy extraction of Voronoi edges as lines, segments, rays and parabolic arcs
//! - Serialization/Deserialization with [serde](https://serde.rs)
//!
//! # Basic Usage
//!
//! ```rust
//! use segment_voronoi::prelude::*;
//!
//! let sdg = SegmentDelaunayGraph::from_sites([
//!     Site::point(0.0, 0.0).unwrap(),
//!     Site::point(2.0, 0.0).unwrap(),
//!     Site::point(1.0, 2.0).unwrap(),
//! ])
//! .unwrap();
//!
//! assert_eq!(sdg.number_of_vertices(), 3);
//! assert_eq!(sdg.number_of_finite_faces(), 1);
//! assert!(sdg.is_valid(ValidationLevel::Global));
//!
//! // Three rays leave the circumcenter (1, 0.75).
//! for edge in sdg.dual_edges() {
//!     let DualPrimitive::Ray { origin, .. } = edge.unwrap().primitive else {
//!         panic!("expected a ray");
//!     };
//!     assert!((origin.y() - 0.75).abs() < 1e-12);
//! }
//! ```
//!
//! # Segments
//!
//! A segment site inserts its endpoints as point sites first. The bisector of
//! a point and a segment it does not touch is a parabola:
//!
//! ```rust
//! use segment_voronoi::prelude::*;
//!
//! let sdg = SegmentDelaunayGraph::from_sites([
//!     Site::segment(point!(0.0, 0.0), point!(2.0, 0.0)).unwrap(),
//!     Site::point(1.0, 2.0).unwrap(),
//! ])
//! .unwrap();
//!
//! assert_eq!(sdg.number_of_vertices(), 4);
//! assert!(sdg.dual_edges().any(|e| matches!(
//!     e.unwrap().primitive,
//!     DualPrimitive::ParabolicArc(_)
//! )));
//! ```
//!
//! # Triangulation Invariants
//!
//! The triangulation is a topological sphere: finite faces plus faces incident
//! to a single vertex at infinity. It maintains:
//!
//! - **Vertex mappings** – every finite site is indexed exactly once.
//! - **Face validity** – three distinct vertices and three neighbors per face.
//! - **Neighbor consistency** – adjacency is mutual along matching edges.
//! - **Vertex stars** – the faces around every vertex form one closed cycle.
//! - **Euler characteristic** – `V - E + F = 2` (the vertex at infinity included).
//! - **Generalized Delaunay property** – no site is strictly closer to the
//!   Voronoi vertex of a face than the three sites of that face.
//!
//! [`ValidationLevel`](core::util::delaunay_validation::ValidationLevel)
//! selects how many of these are checked; see
//! [`core::util::delaunay_validation`].
//!
//! # Degenerate input
//!
//! Insertion fails with
//! [`DegenerateInputError`](geometry::site::DegenerateInputError) and leaves the
//! graph untouched for zero-length segments, non-finite coordinates, points in
//! the interior of segments, and segments that cross, overlap or touch another
//! segment away from its endpoints:
//!
//! ```rust
//! use segment_voronoi::prelude::*;
//!
//! let mut sdg = SegmentDelaunayGraph::new();
//! sdg.insert(Site::segment(point!(0.0, 0.0), point!(4.0, 0.0)).unwrap()).unwrap();
//! let faces = sdg.number_of_faces();
//!
//! let result = sdg.insert(Site::point(2.0, 0.0).unwrap());
//! assert!(matches!(result, Err(InsertionError::DegenerateInput(_))));
//! assert_eq!(sdg.number_of_faces(), faces);
//! ```
//!
//! # References
//!
//! - M. Karavelas, "A robust and efficient implementation for the segment
//!   Voronoi diagram", 2004.
//! - C. Burnikel, K. Mehlhorn, S. Schirra, "How to compute the Voronoi
//!   diagram of line segments", 1994.
//! - J. R. Shewchuk, "Adaptive Precision Floating-Point Arithmetic and Fast
//!   Robust Geometric Predicates", 1997.

// Allow multiple crate versions due to transitive dependencies
#![expect(clippy::multiple_crate_versions)]
// Forbid unsafe code throughout the entire crate
#![forbid(unsafe_code)]

#[macro_use]
extern crate derive_builder;

/// The `core` module contains the triangulation data structure, the
/// insertion and location algorithms, validation and dual extraction.
pub mod core {
    /// Algorithms that modify or query the triangulation
    pub mod algorithms {
        /// Edge flips for the repair sweep after insertion
        pub mod flips;
        /// Conflict-region insertion of point and segment sites
        pub mod incremental_insertion;
        /// Nearest-site location and conflict queries
        pub mod locate;
    }
    /// High-performance collection types for the triangulation
    pub mod collections;
    pub mod dual;
    pub mod edge;
    pub mod face;
    pub mod segment_delaunay_graph;
    pub mod triangulation_data_structure;
    /// Validation utilities
    pub mod util {
        pub mod delaunay_validation;
    }
    pub mod vertex;

    // Re-export the `core` modules.
    pub use dual::*;
    pub use edge::*;
    pub use face::*;
    pub use segment_delaunay_graph::*;
    pub use triangulation_data_structure::*;
    pub use vertex::*;
}

/// Geometric types, predicates and constructions.
///
/// Decisions about the triangulation only use the predicates: exact for
/// point-only questions, error-bounded for questions involving segments.
/// The constructions compute output coordinates.
pub mod geometry {
    pub mod constructions;
    /// Geometric kernel abstraction (CGAL-style)
    pub mod kernel;
    pub mod point;
    pub mod predicates;
    /// Tolerance configuration of the error-bounded predicates
    pub mod robust_predicates;
    pub mod sdg_predicates;
    pub mod site;

    pub use point::*;
    pub use site::*;
}

pub mod io;

/// A prelude module that re-exports commonly used types and macros.
/// This makes it easier to import the most commonly used items from the crate.
pub mod prelude {
    // Re-export from core
    pub use crate::core::{
        algorithms::incremental_insertion::{InsertionError, InsertionResult, InsertionStatistics},
        dual::*,
        edge::*,
        face::{Face, ccw, cw},
        segment_delaunay_graph::*,
        triangulation_data_structure::*,
        util::delaunay_validation::{ValidationLevel, ValidationLevelParseError},
        vertex::*,
    };

    // Re-export commonly used collection types from core::collections
    pub use crate::core::collections::{
        FastHashMap, FastHashSet, SmallBuffer, fast_hash_map_with_capacity,
        fast_hash_set_with_capacity,
    };

    // Re-export from geometry
    pub use crate::geometry::{
        constructions::{Circle, Line},
        kernel::*,
        point::*,
        predicates::{InCircle, Orientation},
        robust_predicates::{RobustPredicateConfig, RobustPredicateConfigBuilder, config_presets},
        site::*,
    };

    // Text input and output
    pub use crate::io::{ReadOptions, SiteParseError, parse_sites, read_sites, write_dual_edges};

    // Convenience macros
    pub use crate::point;
}

/// The function `is_normal` checks that structs implement `auto` traits.
/// Traits are checked at compile time, so this function is only used for
/// testing.
#[must_use]
pub const fn is_normal<T: Sized + Send + Sync + Unpin>() -> bool {
    true
}

// =============================================================================
// TESTS
// =============================================================================
