// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend trait for spatial strategies behind [`SpatialIndex`][crate::SpatialIndex].

use core::fmt::Debug;

use crate::types::Aabb2D;

/// Spatial structure storing one AABB per slot.
///
/// Slots are dense `usize` handles owned by the index; a backend never invents
/// slots, it only reports the ones it was given.
pub trait Backend<T: Copy + PartialOrd + Debug> {
    /// Insert a slot. Inserting an occupied slot replaces its AABB.
    fn insert(&mut self, slot: usize, aabb: Aabb2D<T>);

    /// Remove a slot. Removing a vacant slot is a no-op.
    fn remove(&mut self, slot: usize);

    /// Clear all spatial structures.
    fn clear(&mut self);

    /// Visit slots whose AABB contains the point.
    fn visit_point<F: FnMut(usize)>(&self, x: T, y: T, f: F);

    /// Visit slots whose AABB overlaps the rectangle, each slot at most once.
    fn visit_rect<F: FnMut(usize)>(&self, rect: Aabb2D<T>, f: F);
}
