// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `SpatialIndex`: id-keyed rectangle index over a pluggable backend.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::backend::Backend;
use crate::backends::FlatVec;
use crate::types::Aabb2D;

#[derive(Clone, Debug)]
struct Slot<T, P> {
    aabb: Aabb2D<T>,
    id: P,
}

/// Rectangle index keyed by caller ids.
///
/// This is the classic R-tree style interface: entries are addressed by the
/// `(rect, id)` pair they were inserted with, so the same id may be removed
/// and re-inserted under a new rectangle as often as needed. Searches never
/// miss an overlapping entry; callers that need exact geometry must
/// re-validate the candidates.
pub struct SpatialIndex<T, P, B = FlatVec<T>>
where
    T: Copy + PartialOrd + Debug,
    B: Backend<T>,
{
    slots: Vec<Option<Slot<T, P>>>,
    free_list: Vec<usize>,
    by_id: HashMap<P, SmallVec<[usize; 1]>>,
    backend: B,
}

impl<T, P, B> Debug for SpatialIndex<T, P, B>
where
    T: Copy + PartialOrd + Debug,
    B: Backend<T> + Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("entries", &(self.slots.len() - self.free_list.len()))
            .field("free_list", &self.free_list.len())
            .field("backend", &self.backend)
            .finish_non_exhaustive()
    }
}

impl<T, P, B> Default for SpatialIndex<T, P, B>
where
    T: Copy + PartialOrd + Debug,
    P: Copy + Eq + Hash,
    B: Backend<T> + Default,
{
    fn default() -> Self {
        Self::with_backend(B::default())
    }
}

impl<T, P, B> SpatialIndex<T, P, B>
where
    T: Copy + PartialOrd + Debug,
    P: Copy + Eq + Hash,
    B: Backend<T> + Default,
{
    /// Create an empty index using the backend's default constructor.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T, P, B> SpatialIndex<T, P, B>
where
    T: Copy + PartialOrd + Debug,
    P: Copy + Eq + Hash,
    B: Backend<T>,
{
    /// Create an empty index over an explicitly configured backend.
    pub fn with_backend(backend: B) -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            by_id: HashMap::new(),
            backend,
        }
    }

    /// Number of `(rect, id)` entries.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free_list.len()
    }

    /// Whether the index has no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether any entry carries `id`.
    pub fn contains(&self, id: P) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Insert `id` under `aabb`.
    pub fn insert(&mut self, aabb: Aabb2D<T>, id: P) {
        let slot = match self.free_list.pop() {
            Some(slot) => {
                self.slots[slot] = Some(Slot { aabb, id });
                slot
            }
            None => {
                self.slots.push(Some(Slot { aabb, id }));
                self.slots.len() - 1
            }
        };
        self.by_id.entry(id).or_default().push(slot);
        self.backend.insert(slot, aabb);
    }

    /// Remove the entry inserted as `(aabb, id)`.
    ///
    /// Returns `false` when no such entry exists; the index is unchanged then.
    pub fn remove(&mut self, aabb: Aabb2D<T>, id: P) -> bool {
        let Some(owned) = self.by_id.get_mut(&id) else {
            return false;
        };
        let found = owned.iter().position(|&slot| {
            self.slots[slot]
                .as_ref()
                .is_some_and(|entry| entry.aabb == aabb)
        });
        let Some(pos) = found else {
            return false;
        };
        let slot = owned.swap_remove(pos);
        if owned.is_empty() {
            self.by_id.remove(&id);
        }
        self.slots[slot] = None;
        self.free_list.push(slot);
        self.backend.remove(slot);
        true
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_list.clear();
        self.by_id.clear();
        self.backend.clear();
    }

    /// Ids of entries whose rectangle overlaps `rect` (edges inclusive).
    ///
    /// Order is backend-dependent. An id inserted under several rectangles
    /// is reported once per matching rectangle.
    pub fn search(&self, rect: Aabb2D<T>) -> Vec<P> {
        let mut out = Vec::new();
        self.visit_rect(rect, |id| out.push(id));
        out
    }

    /// Ids of entries whose rectangle contains the point.
    pub fn search_point(&self, x: T, y: T) -> Vec<P> {
        let mut out = Vec::new();
        self.backend.visit_point(x, y, |slot| {
            if let Some(Some(entry)) = self.slots.get(slot) {
                out.push(entry.id);
            }
        });
        out
    }

    /// Visit ids overlapping `rect` without allocating a result vector.
    pub fn visit_rect<F: FnMut(P)>(&self, rect: Aabb2D<T>, mut f: F) {
        self.backend.visit_rect(rect, |slot| {
            if let Some(Some(entry)) = self.slots.get(slot) {
                f(entry.id);
            }
        });
    }

    /// The backend, for inspection.
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

#[cfg(feature = "backend_grid")]
impl<P: Copy + Eq + Hash> SpatialIndex<f64, P> {
    /// Create an `f64` index over a uniform grid with the given cell size.
    pub fn with_grid(cell_size: f64) -> SpatialIndex<f64, P, crate::backends::GridF64> {
        SpatialIndex::with_backend(crate::backends::GridF64::new(cell_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn sorted(mut ids: Vec<u64>) -> Vec<u64> {
        ids.sort_unstable();
        ids
    }

    #[test]
    fn insert_search_remove() {
        let mut idx: SpatialIndex<f64, u64> = SpatialIndex::new();
        let a = Aabb2D::from_xywh(0.0, 0.0, 10.0, 10.0);
        let b = Aabb2D::from_xywh(20.0, 20.0, 5.0, 5.0);
        idx.insert(a, 1);
        idx.insert(b, 2);

        assert_eq!(idx.search(Aabb2D::from_xywh(5.0, 5.0, 1.0, 1.0)), vec![1]);
        assert_eq!(
            sorted(idx.search(Aabb2D::from_xywh(0.0, 0.0, 30.0, 30.0))),
            vec![1, 2]
        );

        assert!(idx.remove(a, 1));
        assert!(idx.search(a).is_empty());
        assert_eq!(idx.len(), 1);
        assert!(!idx.contains(1));
    }

    #[test]
    fn remove_requires_matching_rect() {
        let mut idx: SpatialIndex<f64, u64> = SpatialIndex::new();
        let a = Aabb2D::from_xywh(0.0, 0.0, 10.0, 10.0);
        idx.insert(a, 7);
        assert!(!idx.remove(Aabb2D::from_xywh(1.0, 0.0, 10.0, 10.0), 7));
        assert!(!idx.remove(a, 8));
        assert_eq!(idx.search(a), vec![7]);
    }

    #[test]
    fn repeated_update_cycles_reuse_slots() {
        let mut idx = SpatialIndex::<f64, u64>::with_grid(16.0);
        let mut rect = Aabb2D::from_xywh(0.0, 0.0, 4.0, 4.0);
        idx.insert(rect, 3);
        for step in 1..50 {
            let next = Aabb2D::from_xywh(f64::from(step) * 10.0, 0.0, 4.0, 4.0);
            assert!(idx.remove(rect, 3));
            idx.insert(next, 3);
            rect = next;
        }
        assert_eq!(idx.len(), 1);
        assert_eq!(idx.search_point(492.0, 2.0), vec![3]);
        assert!(idx.search(Aabb2D::from_xywh(0.0, 0.0, 4.0, 4.0)).is_empty());
    }

    #[test]
    fn clear_forgets_everything() {
        let mut idx: SpatialIndex<i64, u32> = SpatialIndex::new();
        idx.insert(Aabb2D::new(0, 0, 1, 1), 1);
        idx.clear();
        assert!(idx.is_empty());
        assert!(idx.search(Aabb2D::new(0, 0, 1, 1)).is_empty());
    }
}
