//! Collection types used throughout the triangulation.
//!
//! The storage backend, hash maps and small buffers of the triangulation are
//! aliased here so the backend can be switched by feature flag.

use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};
use smallvec::SmallVec;

#[cfg(not(feature = "dense-slotmap"))]
use slotmap::SlotMap;

#[cfg(feature = "dense-slotmap")]
use slotmap::DenseSlotMap;

use crate::core::triangulation_data_structure::{FaceKey, VertexKey};

// =============================================================================
// STORAGE BACKEND
// =============================================================================

/// Arena backing vertex and face storage.
///
/// `DenseSlotMap` (default feature `dense-slotmap`) keeps values contiguous,
/// which makes the frequent full-face scans cache friendly. Disable the
/// feature to use a plain `SlotMap` instead.
#[cfg(not(feature = "dense-slotmap"))]
pub type StorageMap<K, V> = SlotMap<K, V>;

/// Arena backing vertex and face storage.
#[cfg(feature = "dense-slotmap")]
pub type StorageMap<K, V> = DenseSlotMap<K, V>;

// =============================================================================
// CORE OPTIMIZED TYPES
// =============================================================================

/// Hash map with the non-cryptographic `FxHasher`.
///
/// # Examples
///
/// ```rust
/// use segment_voronoi::core::collections::FastHashMap;
///
/// let mut map: FastHashMap<u32, &str> = FastHashMap::default();
/// map.insert(1, "one");
/// assert_eq!(map.get(&1), Some(&"one"));
/// ```
pub type FastHashMap<K, V> = FxHashMap<K, V>;

/// Build hasher of [`FastHashMap`] and [`FastHashSet`].
pub type FastBuildHasher = FxBuildHasher;

/// Hash set with the non-cryptographic `FxHasher`.
pub type FastHashSet<T> = FxHashSet<T>;

/// Stack-allocated buffer that spills to the heap past `N` elements.
pub type SmallBuffer<T, const N: usize> = SmallVec<[T; N]>;

// =============================================================================
// ALGORITHM-SPECIFIC BUFFER TYPES
// =============================================================================

/// Inline capacity for per-insertion face buffers.
///
/// A typical conflict region in a well-spread input holds a handful of faces.
pub const FACE_BUFFER_SIZE: usize = 16;

/// Faces created or removed by a single operation.
pub type FaceKeyBuffer = SmallBuffer<FaceKey, FACE_BUFFER_SIZE>;

/// Vertices touched by a single operation.
pub type VertexKeyBuffer = SmallBuffer<VertexKey, 8>;

// =============================================================================
// HELPERS
// =============================================================================

/// Create a [`FastHashMap`] with room for `capacity` entries.
#[must_use]
pub fn fast_hash_map_with_capacity<K, V>(capacity: usize) -> FastHashMap<K, V> {
    FastHashMap::with_capacity_and_hasher(capacity, FastBuildHasher::default())
}

/// Create a [`FastHashSet`] with room for `capacity` entries.
#[must_use]
pub fn fast_hash_set_with_capacity<T>(capacity: usize) -> FastHashSet<T> {
    FastHashSet::with_capacity_and_hasher(capacity, FastBuildHasher::default())
}
