//! The segment Delaunay graph: a triangulation of point and segment sites
//! whose dual is their Voronoi diagram.
//!
//! [`SegmentDelaunayGraph`] owns the [`Tds`] and the geometric kernel, makes
//! every insertion atomic, and exposes validation and dual extraction.
//!
//! # Examples
//!
//! ```rust
//! use segment_voronoi::prelude::*;
//!
//! let mut sdg = SegmentDelaunayGraph::new();
//! sdg.insert(Site::point(0.0, 0.0).unwrap()).unwrap();
//! sdg.insert(Site::point(2.0, 0.0).unwrap()).unwrap();
//! sdg.insert(Site::segment(Point::new(0.0, 2.0), Point::new(2.0, 3.0)).unwrap()).unwrap();
//!
//! assert_eq!(sdg.number_of_vertices(), 5);
//! assert!(sdg.is_valid(ValidationLevel::Global));
//! for edge in sdg.dual_edges() {
//!     let edge = edge.unwrap();
//!     println!("{}", edge.primitive.kind());
//! }
//! ```

use thiserror::Error;

use crate::core::algorithms::incremental_insertion::{
    InsertionError, InsertionResult, InsertionStatistics, insert_site,
};
use crate::core::dual::DualEdgeIter;
use crate::core::edge::EdgeHandle;
use crate::core::triangulation_data_structure::{
    InvalidTriangulationError, Tds, TriangulationValidationReport, VertexKey,
};
use crate::core::util::delaunay_validation::{ValidationLevel, validate, validation_report};
use crate::geometry::kernel::{Kernel, RobustKernel};
use crate::geometry::site::Site;

/// Bulk insertion stopped at a site.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("Failed to insert site #{index} ({site}): {source}")]
pub struct SiteInsertionError {
    /// Zero-based position of the site in the input.
    pub index: usize,
    /// The failing site.
    pub site: Site,
    /// Why it failed.
    #[source]
    pub source: InsertionError,
}

/// Incrementally built segment Delaunay graph.
#[derive(Clone, Debug, Default)]
pub struct SegmentDelaunayGraph<K: Kernel = RobustKernel> {
    tds: Tds,
    kernel: K,
}

impl SegmentDelaunayGraph<RobustKernel> {
    /// An empty graph with the robust kernel.
    #[must_use]
    pub fn new() -> Self {
        Self::with_kernel(RobustKernel::new())
    }

    /// Build a graph by inserting `sites` in order.
    ///
    /// # Errors
    ///
    /// Returns [`SiteInsertionError`] for the first site that fails.
    pub fn from_sites<I>(sites: I) -> Result<Self, SiteInsertionError>
    where
        I: IntoIterator<Item = Site>,
    {
        Self::from_sites_with_kernel(RobustKernel::new(), sites)
    }
}

impl<K: Kernel> SegmentDelaunayGraph<K> {
    /// An empty graph with a custom kernel.
    #[must_use]
    pub fn with_kernel(kernel: K) -> Self {
        Self {
            tds: Tds::new(),
            kernel,
        }
    }

    /// Build a graph with a custom kernel by inserting `sites` in order.
    ///
    /// # Errors
    ///
    /// Returns [`SiteInsertionError`] for the first site that fails.
    pub fn from_sites_with_kernel<I>(kernel: K, sites: I) -> Result<Self, SiteInsertionError>
    where
        I: IntoIterator<Item = Site>,
    {
        let mut sdg = Self::with_kernel(kernel);
        sdg.insert_sites(sites)?;
        Ok(sdg)
    }

    /// The underlying triangulation data structure.
    #[must_use]
    pub const fn tds(&self) -> &Tds {
        &self.tds
    }

    /// The geometric kernel.
    #[must_use]
    pub const fn kernel(&self) -> &K {
        &self.kernel
    }

    // =========================================================================
    // INSERTION
    // =========================================================================

    /// Insert a site and return its vertex.
    ///
    /// Re-inserting a present site returns its vertex and changes nothing.
    /// A segment also inserts its missing endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`InsertionError`] if the site is degenerate or incompatible
    /// with the inserted sites, or if insertion fails internally. The graph is
    /// unchanged on error.
    pub fn insert(&mut self, site: Site) -> Result<VertexKey, InsertionError> {
        self.insert_with_statistics(site).map(|(vertex, _)| vertex)
    }

    /// Insert a site and report what the insertion did.
    ///
    /// Rollback restores a snapshot of the whole triangulation taken before
    /// the insertion, so every new site costs at least one `O(n)` clone on
    /// top of the local conflict-region work.
    ///
    /// # Errors
    ///
    /// Same as [`insert`](Self::insert).
    pub fn insert_with_statistics(
        &mut self,
        site: Site,
    ) -> Result<(VertexKey, InsertionStatistics), InsertionError> {
        if let Some(existing) = self.tds.vertex_of(&site) {
            let stats = InsertionStatistics {
                result: InsertionResult::Existing,
                ..InsertionStatistics::default()
            };
            return Ok((existing, stats));
        }

        let snapshot = self.tds.clone();
        match insert_site(&mut self.tds, &self.kernel, site) {
            Ok(result) => Ok(result),
            Err(error) => {
                if matches!(error, InsertionError::DegenerateInput(_)) {
                    tracing::debug!("rejected {site}: {error}");
                } else {
                    tracing::warn!("insertion of {site} failed, rolling back: {error}");
                }
                self.tds = snapshot;
                Err(error)
            }
        }
    }

    /// Insert `sites` in order, returning their vertices.
    ///
    /// Sites inserted before a failure stay inserted.
    ///
    /// # Errors
    ///
    /// Returns [`SiteInsertionError`] naming the first site that fails.
    pub fn insert_sites<I>(&mut self, sites: I) -> Result<Vec<VertexKey>, SiteInsertionError>
    where
        I: IntoIterator<Item = Site>,
    {
        let sites = sites.into_iter();
        let mut vertices = Vec::with_capacity(sites.size_hint().0);
        for (index, site) in sites.enumerate() {
            let vertex = self
                .insert(site)
                .map_err(|source| SiteInsertionError {
                    index,
                    site,
                    source,
                })?;
            vertices.push(vertex);
        }
        Ok(vertices)
    }

    /// Remove every site.
    pub fn clear(&mut self) {
        self.tds = Tds::new();
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Number of inserted sites, segment endpoints included.
    #[must_use]
    pub fn number_of_vertices(&self) -> usize {
        self.tds.number_of_vertices()
    }

    /// Number of faces, infinite ones included.
    #[must_use]
    pub fn number_of_faces(&self) -> usize {
        self.tds.number_of_faces()
    }

    /// Number of faces not incident to the vertex at infinity.
    #[must_use]
    pub fn number_of_finite_faces(&self) -> usize {
        self.tds.number_of_finite_faces()
    }

    /// Number of edges between two finite vertices, each counted once.
    #[must_use]
    pub fn number_of_finite_edges(&self) -> usize {
        self.tds.finite_edges().count()
    }

    /// Combinatorial dimension: -1 when empty, 0 for one site, 1 while all
    /// faces are infinite, 2 otherwise.
    #[must_use]
    pub fn dimension(&self) -> i8 {
        self.tds.dimension()
    }

    /// `true` when no site is inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tds.number_of_vertices() == 0
    }

    /// Inserted sites in vertex order.
    pub fn sites(&self) -> impl Iterator<Item = Site> + '_ {
        self.tds.sites()
    }

    /// Vertex of an inserted site.
    #[must_use]
    pub fn vertex_of(&self, site: &Site) -> Option<VertexKey> {
        self.tds.vertex_of(site)
    }

    /// `true` if `site` is inserted.
    #[must_use]
    pub fn contains(&self, site: &Site) -> bool {
        self.tds.vertex_of(site).is_some()
    }

    /// Finite edges, each once, in a deterministic order.
    pub fn finite_edges(&self) -> impl Iterator<Item = EdgeHandle> + '_ {
        self.tds.finite_edges()
    }

    // =========================================================================
    // VALIDATION
    // =========================================================================

    /// `true` if every check of `level` passes.
    #[must_use]
    pub fn is_valid(&self, level: ValidationLevel) -> bool {
        self.validate(level).is_ok()
    }

    /// Check the graph at `level`.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self, level: ValidationLevel) -> Result<(), InvalidTriangulationError> {
        validate(&self.tds, &self.kernel, level)
    }

    /// Check the graph at `level`, collecting every violation.
    ///
    /// # Errors
    ///
    /// Returns a report of all violated invariants.
    pub fn validation_report(
        &self,
        level: ValidationLevel,
    ) -> Result<(), TriangulationValidationReport> {
        validation_report(&self.tds, &self.kernel, level)
    }

    // =========================================================================
    // DUAL
    // =========================================================================

    /// Lazy iterator over the classified Voronoi edges.
    #[must_use]
    pub fn dual_edges(&self) -> DualEdgeIter<'_> {
        DualEdgeIter::new(&self.tds, *self.kernel.config())
    }
}
