//! Incremental insertion of sites into the segment Delaunay graph.
//!
//! Insertion follows the conflict-region scheme:
//! 1. Reject degenerate input against every inserted site
//! 2. Locate a face in conflict around the nearest site (star walk, then scan)
//! 3. Grow the conflict region (BFS with Voronoi-circle conflict tests)
//! 4. Extract the cavity boundary, keeping internal edges whose dual is only
//!    partially swallowed
//! 5. Fill the cavity with a fan of faces around the new vertex
//! 6. Wire neighbors locally and verify the boundary is a single cycle
//! 7. Run a flip sweep over the new link
//!
//! A site that swallows no Voronoi vertex but cuts a Voronoi edge is inserted
//! with degree two by splitting that edge. Segments insert their endpoints
//! first. On error the triangulation may be partially modified; callers that
//! need atomicity restore a snapshot.

use std::collections::VecDeque;

use crate::core::algorithms::flips::{DelaunayRepairError, repair_delaunay_with_flips};
use crate::core::algorithms::locate::{
    LocateError, conflict_faces_brute_force, conflict_seeds, edge_conflict, face_in_conflict,
    nearest_vertex, touched_edge_brute_force, touched_edge_near,
};
use crate::core::collections::{
    FaceKeyBuffer, FastHashMap, FastHashSet, fast_hash_map_with_capacity,
    fast_hash_set_with_capacity,
};
use crate::core::edge::EdgeHandle;
use crate::core::face::cw;
use crate::core::triangulation_data_structure::{
    FaceKey, InvalidTriangulationError, Tds, VertexKey,
};
use crate::geometry::kernel::Kernel;
use crate::geometry::point::Point;
use crate::geometry::robust_predicates::RobustPredicateConfig;
use crate::geometry::site::{DegenerateInputError, Segment, Site, check_compatible};

/// Error during incremental insertion.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InsertionError {
    /// The site cannot coexist with the inserted sites.
    #[error("Degenerate input: {0}")]
    DegenerateInput(#[from] DegenerateInputError),

    /// The triangulation was found broken while inserting.
    #[error("Invalid triangulation: {0}")]
    InvalidTriangulation(#[from] InvalidTriangulationError),

    /// Site location failed
    #[error("Location error: {0}")]
    Location(#[from] LocateError),

    /// The conflict region could not be determined or is not a disk
    #[error("Conflict region error: {message}")]
    ConflictRegion {
        /// Error message
        message: String,
    },

    /// Cavity filling failed
    #[error("Cavity filling failed: {message}")]
    CavityFilling {
        /// Error message
        message: String,
    },

    /// Neighbor wiring failed
    #[error("Neighbor wiring failed: {message}")]
    NeighborWiring {
        /// Error message
        message: String,
    },

    /// The flip sweep after insertion failed
    #[error("Delaunay repair failed: {0}")]
    Repair(#[from] DelaunayRepairError),
}

/// Outcome of one insertion call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InsertionResult {
    /// A new vertex was created for the site.
    #[default]
    Inserted,
    /// The site was already present; its vertex was returned.
    Existing,
}

/// Counters describing what an insertion did.
///
/// Segment insertions include the work of inserting missing endpoints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InsertionStatistics {
    /// Vertices created (up to three for a segment with new endpoints).
    pub vertices_created: usize,
    /// Faces in conflict that were removed.
    pub faces_removed: usize,
    /// Faces created.
    pub faces_created: usize,
    /// Flips performed by the repair sweep.
    pub flips: usize,
    /// Degree-two insertions into a Voronoi edge.
    pub edge_splits: usize,
    /// Result of the insertion
    pub result: InsertionResult,
}

impl InsertionStatistics {
    /// Returns true if a vertex was created for the site.
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.result, InsertionResult::Inserted)
    }

    /// Returns true if the site was already present.
    #[must_use]
    pub const fn skipped(&self) -> bool {
        matches!(self.result, InsertionResult::Existing)
    }
}

// =============================================================================
// ENTRY POINT
// =============================================================================

/// Insert `site`, returning its vertex.
///
/// Inserting a site that is already present returns its existing vertex with
/// [`InsertionResult::Existing`].
///
/// # Errors
///
/// Returns [`InsertionError::DegenerateInput`] for non-finite coordinates or
/// sites incompatible with the inserted ones; the triangulation is unchanged
/// in that case. Other variants report internal failures and may leave the
/// triangulation partially modified.
pub fn insert_site<K: Kernel>(
    tds: &mut Tds,
    kernel: &K,
    site: Site,
) -> Result<(VertexKey, InsertionStatistics), InsertionError> {
    for point in site.support_points() {
        if !point.is_finite() {
            return Err(DegenerateInputError::NonFiniteCoordinate { point }.into());
        }
    }
    if let Some(existing) = tds.vertex_of(&site) {
        tracing::trace!("{site} already present as {existing:?}");
        let stats = InsertionStatistics {
            result: InsertionResult::Existing,
            ..InsertionStatistics::default()
        };
        return Ok((existing, stats));
    }
    for other in tds.sites() {
        check_compatible(&site, &other)?;
    }

    let mut stats = InsertionStatistics::default();
    let vertex = match site {
        Site::Point(p) => insert_point(tds, kernel, p, &mut stats)?,
        Site::Segment(s) => {
            let source = insert_point(tds, kernel, s.source(), &mut stats)?;
            let target = insert_point(tds, kernel, s.target(), &mut stats)?;
            insert_segment(tds, kernel, s, source, target, &mut stats)?
        }
    };
    tracing::debug!(
        "inserted {site} as {vertex:?}: {} faces removed, {} created, {} flips",
        stats.faces_removed,
        stats.faces_created,
        stats.flips
    );
    Ok((vertex, stats))
}

fn insert_point<K: Kernel>(
    tds: &mut Tds,
    kernel: &K,
    p: Point,
    stats: &mut InsertionStatistics,
) -> Result<VertexKey, InsertionError> {
    if let Some(existing) = tds.point_vertex(&p) {
        return Ok(existing);
    }
    match tds.number_of_vertices() {
        0 => {
            stats.vertices_created += 1;
            Ok(tds.add_point_vertex(p))
        }
        1 => bootstrap_second_point(tds, p, stats),
        _ => {
            let anchor = nearest_vertex(tds, &p).ok_or(LocateError::EmptyTriangulation)?;
            insert_into_graph(tds, kernel, &Site::Point(p), anchor, stats, |tds| {
                tds.add_point_vertex(p)
            })
        }
    }
}

fn insert_segment<K: Kernel>(
    tds: &mut Tds,
    kernel: &K,
    segment: Segment,
    source: VertexKey,
    target: VertexKey,
    stats: &mut InsertionStatistics,
) -> Result<VertexKey, InsertionError> {
    insert_into_graph(tds, kernel, &Site::Segment(segment), source, stats, |tds| {
        tds.add_segment_vertex(segment, source, target)
    })
}

/// Second site: two faces `(a, b, ∞)` and `(b, a, ∞)` glued along all three edges.
fn bootstrap_second_point(
    tds: &mut Tds,
    p: Point,
    stats: &mut InsertionStatistics,
) -> Result<VertexKey, InsertionError> {
    let a = tds
        .vertices()
        .find(|(_, vertex)| !vertex.is_infinite())
        .map(|(key, _)| key)
        .ok_or(LocateError::EmptyTriangulation)?;
    let b = tds.add_point_vertex(p);
    let infinite = tds.infinite_vertex();

    let f1 = tds.add_face([a, b, infinite]);
    let f2 = tds.add_face([b, a, infinite]);
    tds.set_adjacency(f1, 2, f2, 2);
    tds.set_adjacency(f1, 0, f2, 1);
    tds.set_adjacency(f1, 1, f2, 0);
    for v in [a, b, infinite] {
        tds.set_incident_face(v, f1);
    }

    stats.vertices_created += 1;
    stats.faces_created += 2;
    Ok(b)
}

// =============================================================================
// GENERAL INSERTION
// =============================================================================

fn insert_into_graph<K, F>(
    tds: &mut Tds,
    kernel: &K,
    q: &Site,
    anchor: VertexKey,
    stats: &mut InsertionStatistics,
    create_vertex: F,
) -> Result<VertexKey, InsertionError>
where
    K: Kernel,
    F: FnOnce(&mut Tds) -> VertexKey,
{
    let mut seeds = conflict_seeds(tds, kernel, anchor, q)?;
    if seeds.is_empty() {
        let fallback = conflict_faces_brute_force(tds, kernel, q);
        if !fallback.is_empty() {
            tracing::warn!(
                "no conflict around nearest vertex {anchor:?} for {q}; found {} faces by scan",
                fallback.len()
            );
            seeds = fallback;
        }
    }

    if seeds.is_empty() {
        let edge = locate_touched_edge(tds, kernel, anchor, q)?;
        let vertex = create_vertex(tds);
        insert_in_edge(tds, vertex, edge)?;
        stats.vertices_created += 1;
        stats.faces_created += 2;
        stats.edge_splits += 1;
        tracing::debug!("{q} inserted with degree two into edge {edge:?}");
        return Ok(vertex);
    }

    let region = find_conflict_region(tds, kernel, &seeds, q);
    let boundary = find_cavity_boundary(tds, kernel.config(), &region, q)?;
    let vertex = create_vertex(tds);
    let new_faces = fill_cavity(tds, vertex, &boundary)?;
    wire_cavity_neighbors(tds, &region, &boundary, &new_faces)?;

    for &f in &region {
        tds.remove_face(f);
    }
    stats.vertices_created += 1;
    stats.faces_removed += region.len();
    stats.faces_created += new_faces.len();

    let repair = repair_delaunay_with_flips(tds, kernel, vertex, &new_faces)?;
    stats.flips += repair.flips_performed;
    Ok(vertex)
}

fn locate_touched_edge<K: Kernel>(
    tds: &Tds,
    kernel: &K,
    anchor: VertexKey,
    q: &Site,
) -> Result<EdgeHandle, InsertionError> {
    if let Some(edge) = touched_edge_near(tds, kernel, anchor, q)? {
        return Ok(edge);
    }
    let edge = touched_edge_brute_force(tds, kernel, q).ok_or_else(|| {
        InsertionError::ConflictRegion {
            message: format!("{q} conflicts with no face and touches no edge"),
        }
    })?;
    tracing::warn!("no touched edge around nearest vertex {anchor:?} for {q}; found {edge:?} by scan");
    Ok(edge)
}

/// Faces in conflict with `q` connected to `seeds`, in discovery order.
pub fn find_conflict_region<K: Kernel>(
    tds: &Tds,
    kernel: &K,
    seeds: &[FaceKey],
    q: &Site,
) -> FaceKeyBuffer {
    let mut region = FaceKeyBuffer::new();
    let mut visited: FastHashSet<FaceKey> = fast_hash_set_with_capacity(seeds.len() * 4);
    let mut queue = VecDeque::new();
    for &seed in seeds {
        if visited.insert(seed) {
            region.push(seed);
            queue.push_back(seed);
        }
    }

    while let Some(f) = queue.pop_front() {
        let Some(face) = tds.face(f) else {
            continue;
        };
        for &neighbor in face.neighbors().iter().flatten() {
            if !visited.insert(neighbor) {
                continue;
            }
            if face_in_conflict(tds, kernel, neighbor, q) {
                region.push(neighbor);
                queue.push_back(neighbor);
            }
        }
    }
    region
}

/// Whether the dual of an edge between two conflicting faces is swallowed
/// entirely by `q`, so the edge disappears.
fn edge_swallowed(
    tds: &Tds,
    config: &RobustPredicateConfig,
    edge: EdgeHandle,
    q: &Site,
) -> Result<bool, InsertionError> {
    let (a, b) = tds
        .edge_vertices(edge)
        .ok_or_else(|| InsertionError::ConflictRegion {
            message: format!("edge {edge:?} references a missing face"),
        })?;
    // Among points, the new cell is convex: both swallowed ends imply the whole edge.
    let all_points = [tds.site(a), tds.site(b), Some(*q)]
        .iter()
        .all(|s| s.is_some_and(|s| s.is_point()));
    if all_points {
        return Ok(true);
    }
    Ok(edge_conflict(tds, config, edge, q).is_none_or(|c| c.covers_interior))
}

/// Edges of the region whose dual survives, each with the region on its left.
///
/// Besides edges to faces outside the region, this keeps edges between two
/// conflicting faces whose Voronoi edge is only partly swallowed; such an
/// edge appears twice, once from each side.
///
/// # Errors
///
/// Returns [`InsertionError::ConflictRegion`] if a region face is missing or
/// has an empty neighbor slot.
pub fn find_cavity_boundary(
    tds: &Tds,
    config: &RobustPredicateConfig,
    region: &[FaceKey],
    q: &Site,
) -> Result<Vec<EdgeHandle>, InsertionError> {
    let members: FastHashSet<FaceKey> = region.iter().copied().collect();
    let mut internal: FastHashMap<EdgeHandle, bool> = fast_hash_map_with_capacity(region.len());
    let mut boundary = Vec::new();

    for &f in region {
        let face = tds.face(f).ok_or_else(|| InsertionError::ConflictRegion {
            message: format!("conflict face {f:?} not found"),
        })?;
        for i in 0..3 {
            let edge = EdgeHandle::new(f, i);
            let g = face
                .neighbor(i)
                .ok_or_else(|| InsertionError::ConflictRegion {
                    message: format!("conflict face {f:?} has no neighbor {i}"),
                })?;
            if !members.contains(&g) {
                boundary.push(edge);
                continue;
            }
            // Decide each internal edge once so both sides agree.
            let mirror = tds
                .mirror_edge(edge)
                .ok_or_else(|| InsertionError::ConflictRegion {
                    message: format!("edge {edge:?} has no mirror"),
                })?;
            let canonical = edge.min(mirror);
            let swallowed = if let Some(&known) = internal.get(&canonical) {
                known
            } else {
                let value = edge_swallowed(tds, config, canonical, q)?;
                internal.insert(canonical, value);
                value
            };
            if !swallowed {
                tracing::trace!("keeping partially swallowed edge {edge:?}");
                boundary.push(edge);
            }
        }
    }

    if boundary.is_empty() {
        return Err(InsertionError::ConflictRegion {
            message: format!("conflict region of {q} has an empty boundary"),
        });
    }
    Ok(boundary)
}

/// Create one face `(x, y, v)` per boundary edge `x → y`.
///
/// # Errors
///
/// Returns [`InsertionError::CavityFilling`] if a boundary face is missing.
pub fn fill_cavity(
    tds: &mut Tds,
    vertex: VertexKey,
    boundary: &[EdgeHandle],
) -> Result<Vec<FaceKey>, InsertionError> {
    let mut new_faces = Vec::with_capacity(boundary.len());
    for &edge in boundary {
        let (x, y) = tds
            .edge_vertices(edge)
            .ok_or_else(|| InsertionError::CavityFilling {
                message: format!("boundary edge {edge:?} references a missing face"),
            })?;
        new_faces.push(tds.add_face([x, y, vertex]));
    }
    Ok(new_faces)
}

/// Boundary edge following `edge` around the cavity: the next boundary edge
/// leaving the endpoint of `edge`, found by rotating through region faces.
fn next_boundary_edge(
    tds: &Tds,
    edge: EdgeHandle,
    positions: &FastHashMap<EdgeHandle, usize>,
    max_steps: usize,
) -> Result<usize, InsertionError> {
    let wiring_error = |message: String| InsertionError::NeighborWiring { message };
    let face = tds
        .face(edge.face())
        .ok_or_else(|| wiring_error(format!("boundary face {:?} not found", edge.face())))?;
    let y = face.vertex(cw(edge.index()));

    let mut h = edge.face();
    let mut k = face.index_of(y).unwrap_or(cw(edge.index()));
    for _ in 0..=max_steps {
        let candidate = EdgeHandle::new(h, cw(k));
        if let Some(&position) = positions.get(&candidate) {
            return Ok(position);
        }
        let next = tds
            .face(h)
            .and_then(|face| face.neighbor(cw(k)))
            .ok_or_else(|| wiring_error(format!("region face {h:?} lost a neighbor")))?;
        k = tds
            .face(next)
            .and_then(|face| face.index_of(y))
            .ok_or_else(|| wiring_error(format!("face {next:?} does not contain {y:?}")))?;
        h = next;
    }
    Err(wiring_error(format!(
        "no boundary edge leaves {y:?} after {max_steps} steps"
    )))
}

/// Connect the new faces to the outside, to each other across kept edges,
/// and around the new vertex; then update vertex incidences.
///
/// Must run before the region faces are removed.
///
/// # Errors
///
/// Returns [`InsertionError::NeighborWiring`] if the boundary is not a single
/// cycle or a region vertex would be left without faces, and
/// [`InsertionError::ConflictRegion`] if an outer face has no mirror edge.
pub fn wire_cavity_neighbors(
    tds: &mut Tds,
    region: &[FaceKey],
    boundary: &[EdgeHandle],
    new_faces: &[FaceKey],
) -> Result<(), InsertionError> {
    let members: FastHashSet<FaceKey> = region.iter().copied().collect();
    let positions: FastHashMap<EdgeHandle, usize> = boundary
        .iter()
        .enumerate()
        .map(|(position, &edge)| (edge, position))
        .collect();

    // Mirrors first, while the region is still intact.
    let mut mirrors = Vec::with_capacity(boundary.len());
    for &edge in boundary {
        let mirror = tds
            .mirror_edge(edge)
            .ok_or_else(|| InsertionError::ConflictRegion {
                message: format!("boundary edge {edge:?} has no mirror"),
            })?;
        mirrors.push(mirror);
    }
    let max_steps = 3 * region.len();
    let mut successors = Vec::with_capacity(boundary.len());
    for &edge in boundary {
        successors.push(next_boundary_edge(tds, edge, &positions, max_steps)?);
    }

    // The boundary must be one closed cycle.
    let mut position = 0;
    for step in 1..=boundary.len() {
        position = successors[position];
        if position == 0 && step != boundary.len() {
            return Err(InsertionError::NeighborWiring {
                message: format!(
                    "cavity boundary splits into several cycles ({step} of {} edges)",
                    boundary.len()
                ),
            });
        }
    }
    if position != 0 {
        return Err(InsertionError::NeighborWiring {
            message: "cavity boundary does not close".to_string(),
        });
    }

    // Every vertex of a removed face must survive on the boundary.
    let mut boundary_vertices = FastHashSet::default();
    for &edge in boundary {
        if let Some((x, y)) = tds.edge_vertices(edge) {
            boundary_vertices.insert(x);
            boundary_vertices.insert(y);
        }
    }
    for &f in region {
        let Some(face) = tds.face(f) else {
            continue;
        };
        if let Some(&lost) = face.vertices().iter().find(|v| !boundary_vertices.contains(v)) {
            return Err(InsertionError::NeighborWiring {
                message: format!("vertex {lost:?} would lose all its faces"),
            });
        }
    }

    for (position, (&edge, &mirror)) in boundary.iter().zip(&mirrors).enumerate() {
        let new_face = new_faces[position];
        if members.contains(&mirror.face()) {
            let partner = positions
                .get(&mirror)
                .ok_or_else(|| InsertionError::NeighborWiring {
                    message: format!("kept edge {edge:?} has no kept mirror"),
                })?;
            tds.set_adjacency(new_face, 2, new_faces[*partner], 2);
        } else {
            tds.set_adjacency(new_face, 2, mirror.face(), mirror.index());
        }
    }

    for (position, &next) in successors.iter().enumerate() {
        // (x, y, v) and (y, z, v) share y-v: opposite x in the first, z in the second.
        tds.set_adjacency(new_faces[position], 0, new_faces[next], 1);
    }

    for (&edge, &new_face) in boundary.iter().zip(new_faces) {
        if let Some((x, y)) = tds.edge_vertices(edge) {
            tds.set_incident_face(x, new_face);
            tds.set_incident_face(y, new_face);
        }
    }
    if let Some(&first) = new_faces.first() {
        if let Some(apex) = tds.face(first).map(|face| face.vertex(2)) {
            tds.set_incident_face(apex, first);
        }
    }
    Ok(())
}

/// Insert `vertex` with degree two into the Voronoi edge dual to `edge`.
///
/// For `edge = x → y` between faces `f` and `g`, two faces `(y, x, v)` and
/// `(x, y, v)` are glued between them along all their edges.
///
/// # Errors
///
/// Returns [`InsertionError::NeighborWiring`] if the edge has no mirror.
pub fn insert_in_edge(tds: &mut Tds, vertex: VertexKey, edge: EdgeHandle) -> Result<(), InsertionError> {
    let (f, i) = (edge.face(), edge.index());
    let mirror = tds
        .mirror_edge(edge)
        .ok_or_else(|| InsertionError::NeighborWiring {
            message: format!("edge {edge:?} has no mirror"),
        })?;
    let (x, y) = tds
        .edge_vertices(edge)
        .ok_or_else(|| InsertionError::NeighborWiring {
            message: format!("edge {edge:?} references a missing face"),
        })?;

    let g1 = tds.add_face([y, x, vertex]);
    let g2 = tds.add_face([x, y, vertex]);
    tds.set_adjacency(g1, 2, f, i);
    tds.set_adjacency(g2, 2, mirror.face(), mirror.index());
    tds.set_adjacency(g1, 0, g2, 1);
    tds.set_adjacency(g1, 1, g2, 0);
    tds.set_incident_face(vertex, g1);
    Ok(())
}
