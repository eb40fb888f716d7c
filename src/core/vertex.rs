//! Vertices of the segment Delaunay graph.
//!
//! A vertex is either a finite site or the single infinite vertex that closes
//! the triangulation into a topological sphere. Segment vertices remember the
//! vertex keys of their endpoint point sites, which are always inserted first.

use serde::{Deserialize, Serialize};

use crate::core::triangulation_data_structure::{FaceKey, VertexKey};
use crate::geometry::point::Point;
use crate::geometry::site::{Segment, Site};

/// Site stored in a finite vertex.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FiniteSite {
    /// A point site.
    Point(Point),
    /// A segment site with the vertices of its two endpoints.
    Segment {
        /// The segment.
        segment: Segment,
        /// Vertex of `segment.source()`.
        source: VertexKey,
        /// Vertex of `segment.target()`.
        target: VertexKey,
    },
}

impl FiniteSite {
    /// The geometric site.
    #[must_use]
    pub const fn site(&self) -> Site {
        match self {
            Self::Point(p) => Site::Point(*p),
            Self::Segment { segment, .. } => Site::Segment(*segment),
        }
    }
}

/// Finite site or the vertex at infinity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VertexKind {
    /// A vertex carrying an input site.
    Finite(FiniteSite),
    /// The vertex at infinity.
    Infinite,
}

/// A vertex of the triangulation.
///
/// `incident_face` is `None` while fewer than two sites are present (no faces
/// exist yet); afterwards it always names a face containing the vertex.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    kind: VertexKind,
    incident_face: Option<FaceKey>,
}

impl Vertex {
    /// A new point vertex without an incident face.
    #[must_use]
    pub const fn point(point: Point) -> Self {
        Self {
            kind: VertexKind::Finite(FiniteSite::Point(point)),
            incident_face: None,
        }
    }

    /// A new segment vertex without an incident face.
    #[must_use]
    pub const fn segment(segment: Segment, source: VertexKey, target: VertexKey) -> Self {
        Self {
            kind: VertexKind::Finite(FiniteSite::Segment {
                segment,
                source,
                target,
            }),
            incident_face: None,
        }
    }

    /// The vertex at infinity.
    #[must_use]
    pub const fn infinite() -> Self {
        Self {
            kind: VertexKind::Infinite,
            incident_face: None,
        }
    }

    /// Kind of the vertex.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> &VertexKind {
        &self.kind
    }

    /// Site of a finite vertex, `None` for the infinite vertex.
    #[inline]
    #[must_use]
    pub const fn site(&self) -> Option<Site> {
        match &self.kind {
            VertexKind::Finite(finite) => Some(finite.site()),
            VertexKind::Infinite => None,
        }
    }

    /// `true` for the vertex at infinity.
    #[inline]
    #[must_use]
    pub const fn is_infinite(&self) -> bool {
        matches!(self.kind, VertexKind::Infinite)
    }

    /// Endpoint vertices of a segment vertex.
    #[must_use]
    pub const fn segment_endpoints(&self) -> Option<(VertexKey, VertexKey)> {
        match self.kind {
            VertexKind::Finite(FiniteSite::Segment { source, target, .. }) => {
                Some((source, target))
            }
            _ => None,
        }
    }

    /// A face containing this vertex.
    #[inline]
    #[must_use]
    pub const fn incident_face(&self) -> Option<FaceKey> {
        self.incident_face
    }

    pub(crate) const fn set_incident_face(&mut self, face: Option<FaceKey>) {
        self.incident_face = face;
    }
}
