//! Triangular faces.
//!
//! A face stores three vertex keys in counter-clockwise order and three
//! neighbor slots. Neighbor `i` lies across the edge opposite vertex `i`, the
//! edge running from `vertex(ccw(i))` to `vertex(cw(i))`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::triangulation_data_structure::{FaceKey, VertexKey};

/// Next local index counter-clockwise.
#[inline]
#[must_use]
pub const fn ccw(i: usize) -> usize {
    (i + 1) % 3
}

/// Next local index clockwise.
#[inline]
#[must_use]
pub const fn cw(i: usize) -> usize {
    (i + 2) % 3
}

/// Structural problems of a single face.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FaceValidationError {
    /// The same vertex appears twice.
    #[error("Face has duplicate vertex {vertex:?}")]
    DuplicateVertex {
        /// The repeated vertex.
        vertex: VertexKey,
    },
    /// A neighbor slot is empty.
    #[error("Face has no neighbor across edge {index}")]
    MissingNeighbor {
        /// Local index of the empty slot.
        index: usize,
    },
    /// The face is its own neighbor.
    #[error("Face is its own neighbor across edge {index}")]
    SelfNeighbor {
        /// Local index of the offending slot.
        index: usize,
    },
}

/// A triangular face of the triangulation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Face {
    vertices: [VertexKey; 3],
    neighbors: [Option<FaceKey>; 3],
}

impl Face {
    /// A face with the given counter-clockwise vertices and no neighbors.
    #[must_use]
    pub const fn new(vertices: [VertexKey; 3]) -> Self {
        Self {
            vertices,
            neighbors: [None; 3],
        }
    }

    /// Vertex at local index `i`.
    #[inline]
    #[must_use]
    pub const fn vertex(&self, i: usize) -> VertexKey {
        self.vertices[i]
    }

    /// All three vertices.
    #[inline]
    #[must_use]
    pub const fn vertices(&self) -> &[VertexKey; 3] {
        &self.vertices
    }

    /// Neighbor across the edge opposite vertex `i`.
    #[inline]
    #[must_use]
    pub const fn neighbor(&self, i: usize) -> Option<FaceKey> {
        self.neighbors[i]
    }

    /// All three neighbor slots.
    #[inline]
    #[must_use]
    pub const fn neighbors(&self) -> &[Option<FaceKey>; 3] {
        &self.neighbors
    }

    /// Local index of `v`, if it is a vertex of this face.
    #[must_use]
    pub fn index_of(&self, v: VertexKey) -> Option<usize> {
        self.vertices.iter().position(|&w| w == v)
    }

    /// `true` if `v` is a vertex of this face.
    #[must_use]
    pub fn has_vertex(&self, v: VertexKey) -> bool {
        self.vertices.contains(&v)
    }

    /// Endpoints of the edge opposite vertex `i`, in counter-clockwise order.
    #[inline]
    #[must_use]
    pub const fn edge_vertices(&self, i: usize) -> (VertexKey, VertexKey) {
        (self.vertices[ccw(i)], self.vertices[cw(i)])
    }

    pub(crate) const fn set_neighbor(&mut self, i: usize, neighbor: Option<FaceKey>) {
        self.neighbors[i] = neighbor;
    }

    /// Check the face in isolation.
    ///
    /// # Errors
    ///
    /// Returns the first [`FaceValidationError`] found.
    pub fn is_valid(&self, key: FaceKey) -> Result<(), FaceValidationError> {
        for i in 0..3 {
            if self.vertices[i] == self.vertices[ccw(i)] {
                return Err(FaceValidationError::DuplicateVertex {
                    vertex: self.vertices[i],
                });
            }
        }
        for (index, neighbor) in self.neighbors.iter().enumerate() {
            match neighbor {
                None => return Err(FaceValidationError::MissingNeighbor { index }),
                Some(n) if *n == key => return Err(FaceValidationError::SelfNeighbor { index }),
                Some(_) => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::KeyData;

    fn vk(n: u64) -> VertexKey {
        VertexKey::from(KeyData::from_ffi(n))
    }

    fn fk(n: u64) -> FaceKey {
        FaceKey::from(KeyData::from_ffi(n))
    }

    #[test]
    fn index_arithmetic() {
        for i in 0..3 {
            assert_eq!(cw(ccw(i)), i);
            assert_ne!(ccw(i), i);
            assert_ne!(cw(i), ccw(i));
        }
    }

    #[test]
    fn edge_vertices_follow_orientation() {
        let face = Face::new([vk(1), vk(2), vk(3)]);
        assert_eq!(face.edge_vertices(0), (vk(2), vk(3)));
        assert_eq!(face.edge_vertices(1), (vk(3), vk(1)));
        assert_eq!(face.edge_vertices(2), (vk(1), vk(2)));
        assert_eq!(face.index_of(vk(3)), Some(2));
        assert_eq!(face.index_of(vk(4)), None);
    }

    #[test]
    fn validation_catches_structural_errors() {
        let key = fk(10);
        let mut face = Face::new([vk(1), vk(2), vk(3)]);
        assert_eq!(
            face.is_valid(key),
            Err(FaceValidationError::MissingNeighbor { index: 0 })
        );
        for i in 0..3 {
            face.set_neighbor(i, Some(fk(11)));
        }
        assert!(face.is_valid(key).is_ok());
        face.set_neighbor(1, Some(key));
        assert_eq!(
            face.is_valid(key),
            Err(FaceValidationError::SelfNeighbor { index: 1 })
        );

        let duplicate = Face::new([vk(1), vk(1), vk(3)]);
        assert!(matches!(
            duplicate.is_valid(key),
            Err(FaceValidationError::DuplicateVertex { .. })
        ));
    }
}
