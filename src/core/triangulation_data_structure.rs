//! Triangulation data structure of the segment Delaunay graph.
//!
//! [`Tds`] owns the vertices and faces in slotmap arenas and maintains the
//! purely combinatorial invariants: counter-clockwise faces, symmetric
//! adjacency, one closed star per vertex and a single vertex at infinity that
//! turns the triangulation into a topological sphere.
//!
//! # Shape at small sizes
//!
//! | sites | faces                                                       |
//! |-------|-------------------------------------------------------------|
//! | 0, 1  | none                                                        |
//! | 2     | `(a, b, ∞)` and `(b, a, ∞)`, neighbors of each other thrice |
//! | ≥ 3   | a sphere triangulation; collinear input gives a fan of infinite faces |
//!
//! Multi-edges (two faces sharing two different edges with the same vertex
//! pair is impossible, but two *different* edges joining the same two vertices
//! is allowed) and vertices of degree two are legal. Mirror queries therefore
//! match both the neighbor key and the vertex pair.
//!
//! # Examples
//!
//! ```rust
//! use segment_voronoi::prelude::*;
//!
//! let mut sdg = SegmentDelaunayGraph::new();
//! sdg.insert(Site::point(0.0, 0.0).unwrap()).unwrap();
//! sdg.insert(Site::point(2.0, 0.0).unwrap()).unwrap();
//!
//! let tds = sdg.tds();
//! assert_eq!(tds.number_of_vertices(), 2);
//! assert_eq!(tds.number_of_faces(), 2);
//! assert_eq!(tds.dimension(), 1);
//! assert!(tds.is_valid().is_ok());
//! ```

use slotmap::new_key_type;
use thiserror::Error;

use crate::core::collections::{FastHashMap, StorageMap, VertexKeyBuffer};
use crate::core::edge::EdgeHandle;
use crate::core::face::{Face, FaceValidationError, ccw, cw};
use crate::core::vertex::{FiniteSite, Vertex, VertexKind};
use crate::geometry::point::Point;
use crate::geometry::site::{Segment, Site};

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors reported by triangulation validation.
///
/// Fatal: a triangulation that fails validation cannot be repaired by the
/// library.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InvalidTriangulationError {
    /// A face is structurally broken.
    #[error("Invalid face {face:?}: {source}")]
    InvalidFace {
        /// The broken face.
        face: FaceKey,
        /// What is wrong with it.
        source: FaceValidationError,
    },
    /// Neighbor relationships are invalid.
    #[error("Invalid neighbor relationships: {message}")]
    InvalidNeighbors {
        /// Description of the neighbor validation failure.
        message: String,
    },
    /// A vertex has no valid incident face.
    #[error("Invalid vertex incidence: {message}")]
    InvalidIncidence {
        /// Description of the failure.
        message: String,
    },
    /// The faces around a vertex do not form one closed cycle.
    #[error("Invalid vertex star: {message}")]
    InvalidStar {
        /// Description of the failure.
        message: String,
    },
    /// Site lookup tables disagree with the stored vertices.
    #[error("Site mapping inconsistency: {message}")]
    MappingInconsistency {
        /// Description of the mapping inconsistency.
        message: String,
    },
    /// The triangulation is not a topological sphere.
    #[error("Euler characteristic violated: {message}")]
    EulerCharacteristic {
        /// Counts that failed the relation.
        message: String,
    },
    /// A finite face has no Voronoi circle touching its sites in face order.
    #[error("Missing Voronoi circle: {message}")]
    VoronoiCircle {
        /// Description of the face.
        message: String,
    },
    /// A site is strictly closer to a Voronoi vertex than the vertex's own sites.
    #[error("Delaunay invariant violated: {message}")]
    DelaunayViolation {
        /// Human-readable description of the violation.
        message: String,
    },
    /// Internal data structure inconsistency.
    #[error("Internal data structure inconsistency: {message}")]
    InconsistentDataStructure {
        /// Description of the inconsistency.
        message: String,
    },
}

/// Classifies the kind of triangulation invariant that failed during validation.
///
/// This is used by [`TriangulationValidationReport`] to group related errors.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InvariantKind {
    /// Point and segment lookup tables.
    VertexMappings,
    /// Exactly one vertex at infinity.
    InfiniteVertex,
    /// Per-face validity (distinct vertices, filled neighbor slots).
    FaceValidity,
    /// Neighbor topology and mutual-consistency invariants.
    NeighborConsistency,
    /// Every vertex names a face containing it.
    VertexIncidence,
    /// Every vertex star is one closed cycle.
    StarTopology,
    /// `V - E + F = 2`.
    EulerCharacteristic,
    /// Finite faces have a Voronoi circle.
    VoronoiCircles,
    /// Generalized Delaunay condition.
    Delaunay,
}

/// A single invariant violation recorded during validation diagnostics.
#[derive(Clone, Debug)]
pub struct InvariantViolation {
    /// The kind of invariant that failed.
    pub kind: InvariantKind,
    /// The detailed validation error explaining the failure.
    pub error: InvalidTriangulationError,
}

/// Aggregate report of one or more validation failures.
#[derive(Clone, Debug)]
pub struct TriangulationValidationReport {
    /// The ordered list of invariant violations that occurred.
    pub violations: Vec<InvariantViolation>,
}

impl TriangulationValidationReport {
    /// Returns `true` if no violations were recorded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// `true` if some violation has the given kind.
    #[must_use]
    pub fn contains(&self, kind: InvariantKind) -> bool {
        self.violations.iter().any(|v| v.kind == kind)
    }
}

// =============================================================================
// KEYS
// =============================================================================

new_key_type! {
    /// Key type for accessing vertices in the storage map.
    ///
    /// Vertices are never removed, so a `VertexKey` stays valid for the
    /// lifetime of the triangulation that issued it.
    pub struct VertexKey;
}

new_key_type! {
    /// Key type for accessing faces in the storage map.
    ///
    /// Faces are created and destroyed by every insertion; do not hold a
    /// `FaceKey` across a mutation.
    pub struct FaceKey;
}

// =============================================================================
// TDS
// =============================================================================

/// Arena-backed triangulation with a vertex at infinity.
#[derive(Clone, Debug)]
pub struct Tds {
    vertices: StorageMap<VertexKey, Vertex>,
    faces: StorageMap<FaceKey, Face>,
    infinite: VertexKey,
    point_index: FastHashMap<Point, VertexKey>,
    segment_index: FastHashMap<Segment, VertexKey>,
}

impl Default for Tds {
    fn default() -> Self {
        Self::new()
    }
}

impl Tds {
    /// An empty triangulation holding only the vertex at infinity.
    #[must_use]
    pub fn new() -> Self {
        let mut vertices = StorageMap::with_key();
        let infinite = vertices.insert(Vertex::infinite());
        Self {
            vertices,
            faces: StorageMap::with_key(),
            infinite,
            point_index: FastHashMap::default(),
            segment_index: FastHashMap::default(),
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// The vertex at infinity.
    #[inline]
    #[must_use]
    pub const fn infinite_vertex(&self) -> VertexKey {
        self.infinite
    }

    /// `true` if `v` is the vertex at infinity.
    #[inline]
    #[must_use]
    pub fn is_infinite(&self, v: VertexKey) -> bool {
        v == self.infinite
    }

    /// Vertex by key.
    #[must_use]
    pub fn vertex(&self, v: VertexKey) -> Option<&Vertex> {
        self.vertices.get(v)
    }

    /// Face by key.
    #[must_use]
    pub fn face(&self, f: FaceKey) -> Option<&Face> {
        self.faces.get(f)
    }

    /// All vertices, the infinite one included, in arena order.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexKey, &Vertex)> {
        self.vertices.iter()
    }

    /// All faces, infinite ones included, in arena order.
    pub fn faces(&self) -> impl Iterator<Item = (FaceKey, &Face)> {
        self.faces.iter()
    }

    /// Number of finite vertices (inserted sites).
    #[must_use]
    pub fn number_of_vertices(&self) -> usize {
        self.vertices.len() - 1
    }

    /// Number of faces, infinite ones included.
    #[must_use]
    pub fn number_of_faces(&self) -> usize {
        self.faces.len()
    }

    /// Number of faces without the vertex at infinity.
    #[must_use]
    pub fn number_of_finite_faces(&self) -> usize {
        self.faces
            .values()
            .filter(|face| !face.has_vertex(self.infinite))
            .count()
    }

    /// Number of edges (each face has three, each edge is shared by two faces).
    #[must_use]
    pub fn number_of_edges(&self) -> usize {
        self.faces.len() * 3 / 2
    }

    /// Affine dimension of the site set as seen by the triangulation.
    ///
    /// `-1` when empty, `0` for one site, `1` while every face is infinite
    /// (collinear input), `2` otherwise.
    #[must_use]
    pub fn dimension(&self) -> i8 {
        match self.number_of_vertices() {
            0 => -1,
            1 => 0,
            _ if self.number_of_finite_faces() == 0 => 1,
            _ => 2,
        }
    }

    /// Site of a finite vertex.
    #[must_use]
    pub fn site(&self, v: VertexKey) -> Option<Site> {
        self.vertices.get(v).and_then(Vertex::site)
    }

    /// Every inserted site, in arena order.
    pub fn sites(&self) -> impl Iterator<Item = Site> + '_ {
        self.vertices.values().filter_map(Vertex::site)
    }

    /// Vertex of the point site `p`, if inserted.
    #[must_use]
    pub fn point_vertex(&self, p: &Point) -> Option<VertexKey> {
        self.point_index.get(p).copied()
    }

    /// Vertex of the segment site `s`, if inserted.
    #[must_use]
    pub fn segment_vertex(&self, s: &Segment) -> Option<VertexKey> {
        self.segment_index.get(s).copied()
    }

    /// Vertex of `site`, if inserted.
    #[must_use]
    pub fn vertex_of(&self, site: &Site) -> Option<VertexKey> {
        match site {
            Site::Point(p) => self.point_vertex(p),
            Site::Segment(s) => self.segment_vertex(s),
        }
    }

    // -------------------------------------------------------------------------
    // Face queries
    // -------------------------------------------------------------------------

    /// Local index of the infinite vertex in `f`, if any.
    #[must_use]
    pub fn infinite_index(&self, f: FaceKey) -> Option<usize> {
        self.faces.get(f)?.index_of(self.infinite)
    }

    /// `true` if `f` has the vertex at infinity.
    #[must_use]
    pub fn is_infinite_face(&self, f: FaceKey) -> bool {
        self.infinite_index(f).is_some()
    }

    /// Sites of a finite face, in face order.
    #[must_use]
    pub fn face_sites(&self, f: FaceKey) -> Option<[Site; 3]> {
        let face = self.faces.get(f)?;
        Some([
            self.site(face.vertex(0))?,
            self.site(face.vertex(1))?,
            self.site(face.vertex(2))?,
        ])
    }

    /// The two finite sites of an infinite face `(a, b, ∞)`, rotated so the
    /// vertex at infinity comes last.
    #[must_use]
    pub fn infinite_face_sites(&self, f: FaceKey) -> Option<(Site, Site)> {
        let face = self.faces.get(f)?;
        let k = face.index_of(self.infinite)?;
        Some((
            self.site(face.vertex(ccw(k)))?,
            self.site(face.vertex(cw(k)))?,
        ))
    }

    /// Index `j` such that `(neighbor(f, i), j)` is the same edge as `(f, i)`.
    ///
    /// Matches the back pointer *and* the reversed vertex pair, so it stays
    /// correct when two faces share more than one edge.
    #[must_use]
    pub fn mirror_index(&self, f: FaceKey, i: usize) -> Option<usize> {
        let face = self.faces.get(f)?;
        let g = face.neighbor(i)?;
        let other = self.faces.get(g)?;
        let (a, b) = face.edge_vertices(i);
        (0..3).find(|&j| other.neighbor(j) == Some(f) && other.edge_vertices(j) == (b, a))
    }

    /// The same edge seen from the neighboring face.
    #[must_use]
    pub fn mirror_edge(&self, edge: EdgeHandle) -> Option<EdgeHandle> {
        let g = self.faces.get(edge.face())?.neighbor(edge.index())?;
        let j = self.mirror_index(edge.face(), edge.index())?;
        Some(EdgeHandle::new(g, j))
    }

    /// Apex of the neighboring face across edge `(f, i)`.
    #[must_use]
    pub fn mirror_vertex(&self, f: FaceKey, i: usize) -> Option<VertexKey> {
        let g = self.faces.get(f)?.neighbor(i)?;
        let j = self.mirror_index(f, i)?;
        Some(self.faces.get(g)?.vertex(j))
    }

    /// Endpoints of an edge, in the counter-clockwise order of its face.
    #[must_use]
    pub fn edge_vertices(&self, edge: EdgeHandle) -> Option<(VertexKey, VertexKey)> {
        Some(self.faces.get(edge.face())?.edge_vertices(edge.index()))
    }

    /// `true` if neither endpoint of the edge is the vertex at infinity.
    #[must_use]
    pub fn is_finite_edge(&self, edge: EdgeHandle) -> bool {
        self.edge_vertices(edge)
            .is_some_and(|(a, b)| !self.is_infinite(a) && !self.is_infinite(b))
    }

    /// Every finite edge exactly once, in face-arena order.
    ///
    /// An edge is reported from the face with the smaller key; when both sides
    /// belong to the same face the smaller local index wins.
    pub fn finite_edges(&self) -> impl Iterator<Item = EdgeHandle> + '_ {
        self.faces.iter().flat_map(move |(f, face)| {
            (0..3).filter_map(move |i| {
                let edge = EdgeHandle::new(f, i);
                if !self.is_finite_edge(edge) {
                    return None;
                }
                let canonical = match (face.neighbor(i), self.mirror_index(f, i)) {
                    (Some(g), Some(j)) => f < g || (f == g && i < j),
                    _ => true,
                };
                canonical.then_some(edge)
            })
        })
    }

    // -------------------------------------------------------------------------
    // Vertex queries
    // -------------------------------------------------------------------------

    /// Faces around `v` in counter-clockwise order, starting at its incident face.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTriangulationError::InvalidStar`] when the walk breaks
    /// off or does not close.
    pub fn incident_faces(&self, v: VertexKey) -> Result<Vec<FaceKey>, InvalidTriangulationError> {
        let vertex = self
            .vertices
            .get(v)
            .ok_or_else(|| InvalidTriangulationError::InvalidStar {
                message: format!("vertex {v:?} not found"),
            })?;
        let Some(start) = vertex.incident_face() else {
            return Ok(Vec::new());
        };

        let mut star = Vec::new();
        let mut current = start;
        loop {
            let face =
                self.faces
                    .get(current)
                    .ok_or_else(|| InvalidTriangulationError::InvalidStar {
                        message: format!("face {current:?} around vertex {v:?} not found"),
                    })?;
            let i = face
                .index_of(v)
                .ok_or_else(|| InvalidTriangulationError::InvalidStar {
                    message: format!("face {current:?} does not contain vertex {v:?}"),
                })?;
            star.push(current);
            if star.len() > self.faces.len() {
                return Err(InvalidTriangulationError::InvalidStar {
                    message: format!("star of vertex {v:?} does not close"),
                });
            }
            current = face
                .neighbor(ccw(i))
                .ok_or_else(|| InvalidTriangulationError::InvalidStar {
                    message: format!("face {current:?} has an open edge at vertex {v:?}"),
                })?;
            if current == start {
                return Ok(star);
            }
        }
    }

    /// Edges leaving `v`, one per incident edge, as `(f, i)` with `v = f.vertex(ccw(i))`.
    ///
    /// # Errors
    ///
    /// See [`incident_faces`](Self::incident_faces).
    pub fn incident_edges(&self, v: VertexKey) -> Result<Vec<EdgeHandle>, InvalidTriangulationError> {
        let star = self.incident_faces(v)?;
        let mut edges = Vec::with_capacity(star.len());
        for f in star {
            if let Some(k) = self.faces.get(f).and_then(|face| face.index_of(v)) {
                edges.push(EdgeHandle::new(f, cw(k)));
            }
        }
        Ok(edges)
    }

    /// Vertices joined to `v` by an edge; a multi-edge contributes twice.
    ///
    /// # Errors
    ///
    /// See [`incident_faces`](Self::incident_faces).
    pub fn adjacent_vertices(&self, v: VertexKey) -> Result<VertexKeyBuffer, InvalidTriangulationError> {
        let mut out = VertexKeyBuffer::new();
        for edge in self.incident_edges(v)? {
            if let Some((_, w)) = self.edge_vertices(edge) {
                out.push(w);
            }
        }
        Ok(out)
    }

    /// `true` if some edge joins `u` and `v`.
    #[must_use]
    pub fn are_adjacent(&self, u: VertexKey, v: VertexKey) -> bool {
        self.adjacent_vertices(u)
            .is_ok_and(|neighbors| neighbors.contains(&v))
    }

    // -------------------------------------------------------------------------
    // Mutation (crate internal)
    // -------------------------------------------------------------------------

    pub(crate) fn add_point_vertex(&mut self, point: Point) -> VertexKey {
        let key = self.vertices.insert(Vertex::point(point));
        self.point_index.insert(point, key);
        key
    }

    pub(crate) fn add_segment_vertex(
        &mut self,
        segment: Segment,
        source: VertexKey,
        target: VertexKey,
    ) -> VertexKey {
        let key = self
            .vertices
            .insert(Vertex::segment(segment, source, target));
        self.segment_index.insert(segment, key);
        key
    }

    pub(crate) fn add_face(&mut self, vertices: [VertexKey; 3]) -> FaceKey {
        self.faces.insert(Face::new(vertices))
    }

    pub(crate) fn remove_face(&mut self, f: FaceKey) -> Option<Face> {
        self.faces.remove(f)
    }

    pub(crate) fn face_mut(&mut self, f: FaceKey) -> Option<&mut Face> {
        self.faces.get_mut(f)
    }

    pub(crate) fn set_incident_face(&mut self, v: VertexKey, f: FaceKey) {
        if let Some(vertex) = self.vertices.get_mut(v) {
            vertex.set_incident_face(Some(f));
        }
    }

    /// Make `(f, i)` and `(g, j)` neighbors of each other.
    pub(crate) fn set_adjacency(&mut self, f: FaceKey, i: usize, g: FaceKey, j: usize) {
        if let Some(face) = self.faces.get_mut(f) {
            face.set_neighbor(i, Some(g));
        }
        if let Some(face) = self.faces.get_mut(g) {
            face.set_neighbor(j, Some(f));
        }
    }

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------

    fn validate_vertex_mappings(&self) -> Result<(), InvalidTriangulationError> {
        let mut points = 0;
        let mut segments = 0;
        for (key, vertex) in &self.vertices {
            let indexed = match vertex.kind() {
                VertexKind::Infinite => continue,
                VertexKind::Finite(FiniteSite::Point(p)) => {
                    points += 1;
                    self.point_index.get(p)
                }
                VertexKind::Finite(FiniteSite::Segment {
                    segment,
                    source,
                    target,
                }) => {
                    segments += 1;
                    let endpoints_ok = self.point_vertex(&segment.source()) == Some(*source)
                        && self.point_vertex(&segment.target()) == Some(*target);
                    if !endpoints_ok {
                        return Err(InvalidTriangulationError::MappingInconsistency {
                            message: format!(
                                "segment vertex {key:?} does not reference its endpoint vertices"
                            ),
                        });
                    }
                    self.segment_index.get(segment)
                }
            };
            if indexed != Some(&key) {
                return Err(InvalidTriangulationError::MappingInconsistency {
                    message: format!("vertex {key:?} is not indexed by its site"),
                });
            }
        }
        if points != self.point_index.len() || segments != self.segment_index.len() {
            return Err(InvalidTriangulationError::MappingInconsistency {
                message: format!(
                    "{} point and {} segment entries for {points} point and {segments} segment vertices",
                    self.point_index.len(),
                    self.segment_index.len()
                ),
            });
        }
        Ok(())
    }

    fn validate_infinite_vertex(&self) -> Result<(), InvalidTriangulationError> {
        let infinite_count = self.vertices.values().filter(|v| v.is_infinite()).count();
        let designated = self.vertices.get(self.infinite).is_some_and(Vertex::is_infinite);
        if infinite_count == 1 && designated {
            Ok(())
        } else {
            Err(InvalidTriangulationError::InconsistentDataStructure {
                message: format!("expected one vertex at infinity, found {infinite_count}"),
            })
        }
    }

    fn validate_neighbors(&self) -> Result<(), InvalidTriangulationError> {
        for (f, face) in &self.faces {
            for v in face.vertices() {
                if !self.vertices.contains_key(*v) {
                    return Err(InvalidTriangulationError::InvalidNeighbors {
                        message: format!("face {f:?} references missing vertex {v:?}"),
                    });
                }
            }
            for i in 0..3 {
                let Some(g) = face.neighbor(i) else {
                    continue;
                };
                if !self.faces.contains_key(g) {
                    return Err(InvalidTriangulationError::InvalidNeighbors {
                        message: format!("face {f:?} references missing neighbor {g:?}"),
                    });
                }
                if self.mirror_index(f, i).is_none() {
                    return Err(InvalidTriangulationError::InvalidNeighbors {
                        message: format!(
                            "edge {i} of face {f:?} has no matching edge in neighbor {g:?}"
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    fn validate_incidence(&self) -> Result<(), InvalidTriangulationError> {
        let needs_faces = self.number_of_vertices() >= 2;
        for (v, vertex) in &self.vertices {
            match (vertex.incident_face(), needs_faces) {
                (None, false) => {}
                (None, true) => {
                    return Err(InvalidTriangulationError::InvalidIncidence {
                        message: format!("vertex {v:?} has no incident face"),
                    });
                }
                (Some(f), _) => {
                    if !self.faces.get(f).is_some_and(|face| face.has_vertex(v)) {
                        return Err(InvalidTriangulationError::InvalidIncidence {
                            message: format!("incident face {f:?} does not contain vertex {v:?}"),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn validate_stars(&self) -> Result<(), InvalidTriangulationError> {
        let mut total = 0;
        for v in self.vertices.keys() {
            total += self.incident_faces(v)?.len();
        }
        // Each face appears in the star of each of its three vertices.
        if total == 3 * self.faces.len() {
            Ok(())
        } else {
            Err(InvalidTriangulationError::InvalidStar {
                message: format!(
                    "stars cover {total} face corners, expected {}",
                    3 * self.faces.len()
                ),
            })
        }
    }

    fn validate_euler(&self) -> Result<(), InvalidTriangulationError> {
        let f = self.faces.len();
        if self.number_of_vertices() < 2 {
            return if f == 0 {
                Ok(())
            } else {
                Err(InvalidTriangulationError::EulerCharacteristic {
                    message: format!("{f} faces with fewer than two sites"),
                })
            };
        }
        let v = self.vertices.len();
        if (3 * f) % 2 != 0 {
            return Err(InvalidTriangulationError::EulerCharacteristic {
                message: format!("{f} faces cannot pair up their edges"),
            });
        }
        let e = 3 * f / 2;
        if v + f == e + 2 {
            Ok(())
        } else {
            Err(InvalidTriangulationError::EulerCharacteristic {
                message: format!("V - E + F = {v} - {e} + {f} != 2"),
            })
        }
    }

    /// Check the combinatorial invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn is_valid(&self) -> Result<(), InvalidTriangulationError> {
        self.validate_vertex_mappings()?;
        self.validate_infinite_vertex()?;
        for (f, face) in &self.faces {
            face.is_valid(f)
                .map_err(|source| InvalidTriangulationError::InvalidFace { face: f, source })?;
        }
        self.validate_neighbors()?;
        self.validate_incidence()?;
        self.validate_stars()?;
        self.validate_euler()
    }

    /// Check every combinatorial invariant, collecting all failures.
    ///
    /// # Errors
    ///
    /// Returns a report listing every violated invariant.
    pub fn validation_report(&self) -> Result<(), TriangulationValidationReport> {
        let mut violations = Vec::new();
        let mut record = |kind: InvariantKind, result: Result<(), InvalidTriangulationError>| {
            if let Err(error) = result {
                violations.push(InvariantViolation { kind, error });
            }
        };

        record(InvariantKind::VertexMappings, self.validate_vertex_mappings());
        record(InvariantKind::InfiniteVertex, self.validate_infinite_vertex());
        for (f, face) in &self.faces {
            record(
                InvariantKind::FaceValidity,
                face.is_valid(f)
                    .map_err(|source| InvalidTriangulationError::InvalidFace { face: f, source }),
            );
        }
        record(InvariantKind::NeighborConsistency, self.validate_neighbors());
        record(InvariantKind::VertexIncidence, self.validate_incidence());
        record(InvariantKind::StarTopology, self.validate_stars());
        record(InvariantKind::EulerCharacteristic, self.validate_euler());

        if violations.is_empty() {
            Ok(())
        } else {
            Err(TriangulationValidationReport { violations })
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
