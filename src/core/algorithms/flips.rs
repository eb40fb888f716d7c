//! Edge flips for Delaunay repair.
//!
//! The conflict-region insertion produces a generalized Delaunay
//! triangulation on its own; the flip sweep here is a safety net run over the
//! link of the new vertex. It is restricted to the classic case it can decide
//! exactly: two finite faces whose four vertices are all point sites, forming
//! a strictly convex quadrilateral, where the in-circle predicate says the
//! opposite vertex lies inside. Faces involving segments are never flipped.
//!
//! # References
//! - C. L. Lawson, "Software for C1 surface interpolation", 1977.
//! - Edelsbrunner & Shah (1996) - "Incremental Topological Flipping Works for Regular Triangulations"

use std::collections::VecDeque;

use thiserror::Error;

use crate::core::edge::EdgeHandle;
use crate::core::face::{Face, ccw, cw};
use crate::core::triangulation_data_structure::{FaceKey, Tds, VertexKey};
use crate::geometry::kernel::Kernel;
use crate::geometry::predicates::{InCircle, Orientation};

/// Errors from a single edge flip.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FlipError {
    /// The referenced face was not found.
    #[error("Face not found: {face:?}")]
    MissingFace {
        /// Missing face key.
        face: FaceKey,
    },
    /// The edge has no matching edge in its neighbor.
    #[error("Edge {edge:?} has no mirror edge")]
    MissingNeighbor {
        /// The edge.
        edge: EdgeHandle,
    },
    /// The two faces share more than the flipped edge.
    #[error("Edge {edge:?} does not bound a simple quadrilateral")]
    DegenerateQuad {
        /// The edge.
        edge: EdgeHandle,
    },
}

/// Errors from the flip repair sweep.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DelaunayRepairError {
    /// Repair did not converge within the flip budget.
    #[error("Delaunay repair failed to converge after {max_flips} flips")]
    NonConvergent {
        /// Maximum flips allowed.
        max_flips: usize,
    },
    /// Underlying flip error.
    #[error(transparent)]
    Flip(#[from] FlipError),
}

/// Counters of a repair sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DelaunayRepairStats {
    /// Number of queued edges checked.
    pub edges_checked: usize,
    /// Number of flips performed.
    pub flips_performed: usize,
    /// Maximum queue length observed.
    pub max_queue_len: usize,
}

/// Replace the diagonal of the quadrilateral formed by the faces on both sides
/// of `edge` with the other diagonal.
///
/// The faces keep their keys: for `f = (c, a, b)` and its neighbor
/// `g = (d, b, a)` across `a-b`, the result is `f = (c, a, d)` and
/// `g = (d, b, c)`.
///
/// # Errors
///
/// Returns [`FlipError`] if the faces are missing or the quadrilateral is
/// not simple. The triangulation is unchanged on error.
pub fn flip_edge(tds: &mut Tds, edge: EdgeHandle) -> Result<(FaceKey, FaceKey), FlipError> {
    let (f, i) = (edge.face(), edge.index());
    let face = tds
        .face(f)
        .cloned()
        .ok_or(FlipError::MissingFace { face: f })?;
    let g = face.neighbor(i).ok_or(FlipError::MissingNeighbor { edge })?;
    let j = tds
        .mirror_index(f, i)
        .ok_or(FlipError::MissingNeighbor { edge })?;
    let other = tds
        .face(g)
        .cloned()
        .ok_or(FlipError::MissingFace { face: g })?;

    let c = face.vertex(i);
    let a = face.vertex(ccw(i));
    let b = face.vertex(cw(i));
    let d = other.vertex(j);

    let side = |key: FaceKey, k: usize| -> Result<(FaceKey, usize), FlipError> {
        let n = tds
            .face(key)
            .and_then(|x| x.neighbor(k))
            .ok_or(FlipError::MissingNeighbor { edge })?;
        let m = tds
            .mirror_index(key, k)
            .ok_or(FlipError::MissingNeighbor { edge })?;
        Ok((n, m))
    };
    let (f_a, m_fa) = side(f, ccw(i))?;
    let (f_b, m_fb) = side(f, cw(i))?;
    let (g_b, m_gb) = side(g, ccw(j))?;
    let (g_a, m_ga) = side(g, cw(j))?;

    if f == g || c == d || [f_a, f_b, g_a, g_b].iter().any(|&n| n == f || n == g) {
        return Err(FlipError::DegenerateQuad { edge });
    }

    if let Some(slot) = tds.face_mut(f) {
        *slot = Face::new([c, a, d]);
    }
    if let Some(slot) = tds.face_mut(g) {
        *slot = Face::new([d, b, c]);
    }
    tds.set_adjacency(f, 0, g_b, m_gb);
    tds.set_adjacency(f, 1, g, 1);
    tds.set_adjacency(f, 2, f_b, m_fb);
    tds.set_adjacency(g, 0, f_a, m_fa);
    tds.set_adjacency(g, 2, g_a, m_ga);

    tds.set_incident_face(a, f);
    tds.set_incident_face(c, f);
    tds.set_incident_face(b, g);
    tds.set_incident_face(d, g);
    Ok((f, g))
}

/// `true` when `edge` joins two finite point-only faces forming a strictly
/// convex quadrilateral whose far vertex lies inside the near face's circle,
/// and the other diagonal is not already an edge.
pub fn should_flip<K: Kernel>(tds: &Tds, kernel: &K, edge: EdgeHandle) -> bool {
    let (f, i) = (edge.face(), edge.index());
    let Some(face) = tds.face(f) else {
        return false;
    };
    let Some(d) = tds.mirror_vertex(f, i) else {
        return false;
    };
    let c = face.vertex(i);
    let a = face.vertex(ccw(i));
    let b = face.vertex(cw(i));

    let point = |v: VertexKey| tds.site(v).and_then(|s| s.as_point());
    let (Some(pc), Some(pa), Some(pb), Some(pd)) = (point(c), point(a), point(b), point(d)) else {
        return false;
    };
    if kernel.orientation(&pc, &pa, &pd) != Orientation::POSITIVE
        || kernel.orientation(&pd, &pb, &pc) != Orientation::POSITIVE
    {
        return false;
    }
    kernel.in_circle(&pc, &pa, &pb, &pd) == InCircle::INSIDE && !tds.are_adjacent(c, d)
}

/// Lawson flip sweep over the link of `apex`, starting from `seeds`.
///
/// # Errors
///
/// Returns [`DelaunayRepairError`] if a flip fails or the sweep exceeds its
/// flip budget.
pub fn repair_delaunay_with_flips<K: Kernel>(
    tds: &mut Tds,
    kernel: &K,
    apex: VertexKey,
    seeds: &[FaceKey],
) -> Result<DelaunayRepairStats, DelaunayRepairError> {
    let max_flips = 16 * (tds.number_of_faces() + 1);
    let mut stats = DelaunayRepairStats::default();
    let mut queue: VecDeque<FaceKey> = seeds.iter().copied().collect();

    while let Some(f) = queue.pop_front() {
        let Some(k) = tds.face(f).and_then(|face| face.index_of(apex)) else {
            continue;
        };
        stats.edges_checked += 1;
        let edge = EdgeHandle::new(f, k);
        if !should_flip(tds, kernel, edge) {
            continue;
        }
        if stats.flips_performed >= max_flips {
            return Err(DelaunayRepairError::NonConvergent { max_flips });
        }
        let (f, g) = flip_edge(tds, edge)?;
        tracing::debug!("[repair] flipped edge {edge:?} into faces {f:?}, {g:?}");
        stats.flips_performed += 1;
        queue.push_back(f);
        queue.push_back(g);
        stats.max_queue_len = stats.max_queue_len.max(queue.len());
    }
    Ok(stats)
}
