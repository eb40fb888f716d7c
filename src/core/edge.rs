//! Edge identifiers.
//!
//! Edges are not stored; they are named by a face and the local index of the
//! vertex opposite them. [`EdgeHandle`] is that pair. Because the segment
//! Delaunay graph allows multi-edges (two distinct edges joining the same two
//! vertices), an edge is *not* identified by its endpoints alone. [`EdgeKey`]
//! is the endpoint pair, useful when the question really is "are these two
//! vertices adjacent".

use serde::{Deserialize, Serialize};

use crate::core::triangulation_data_structure::{FaceKey, VertexKey};

/// The edge of `face` opposite its local vertex `index`.
///
/// The edge runs from `face.vertex(ccw(index))` to `face.vertex(cw(index))`
/// in the face's counter-clockwise order.
///
/// # Examples
///
/// ```rust
/// use segment_voronoi::core::edge::EdgeHandle;
/// use segment_voronoi::core::triangulation_data_structure::FaceKey;
/// use slotmap::KeyData;
///
/// let face = FaceKey::from(KeyData::from_ffi(1));
/// let edge = EdgeHandle::new(face, 2);
/// assert_eq!(edge.face(), face);
/// assert_eq!(edge.index(), 2);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeHandle {
    face: FaceKey,
    index: u8,
}

impl EdgeHandle {
    /// Create a handle for the edge of `face` opposite local vertex `index`.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `index > 2`.
    #[must_use]
    pub fn new(face: FaceKey, index: usize) -> Self {
        debug_assert!(index < 3, "edge index {index} out of range");
        Self {
            face,
            // Always < 3 here.
            index: u8::try_from(index).unwrap_or(2),
        }
    }

    /// The face the handle refers to.
    #[inline]
    #[must_use]
    pub const fn face(&self) -> FaceKey {
        self.face
    }

    /// Local index of the vertex opposite the edge.
    #[inline]
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index as usize
    }
}

/// Undirected vertex pair, canonicalized so `(a, b)` and `(b, a)` are equal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    v0: VertexKey,
    v1: VertexKey,
}

impl EdgeKey {
    /// Creates a new canonical edge key.
    #[must_use]
    pub fn new(a: VertexKey, b: VertexKey) -> Self {
        if a <= b {
            Self { v0: a, v1: b }
        } else {
            Self { v0: b, v1: a }
        }
    }

    /// Both endpoints, smaller key first.
    #[must_use]
    pub const fn endpoints(&self) -> (VertexKey, VertexKey) {
        (self.v0, self.v1)
    }

    /// `true` if `v` is one of the endpoints.
    #[must_use]
    pub fn contains(&self, v: VertexKey) -> bool {
        self.v0 == v || self.v1 == v
    }
}
