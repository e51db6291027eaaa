// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flat vector backend: every query is a linear scan over live slots.

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::backend::Backend;
use crate::types::Aabb2D;

/// Linear-scan backend. Results come out in slot order.
#[derive(Clone)]
pub struct FlatVec<T> {
    slots: Vec<Option<Aabb2D<T>>>,
}

impl<T> Default for FlatVec<T> {
    fn default() -> Self {
        Self { slots: Vec::new() }
    }
}

impl<T: Debug> Debug for FlatVec<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let live = self.slots.iter().filter(|s| s.is_some()).count();
        f.debug_struct("FlatVec")
            .field("total_slots", &self.slots.len())
            .field("live_slots", &live)
            .finish_non_exhaustive()
    }
}

impl<T: Copy + PartialOrd + Debug> Backend<T> for FlatVec<T> {
    fn insert(&mut self, slot: usize, aabb: Aabb2D<T>) {
        if self.slots.len() <= slot {
            self.slots.resize_with(slot + 1, || None);
        }
        self.slots[slot] = Some(aabb);
    }

    fn remove(&mut self, slot: usize) {
        if let Some(s) = self.slots.get_mut(slot) {
            *s = None;
        }
    }

    fn clear(&mut self) {
        self.slots.clear();
    }

    fn visit_point<F: FnMut(usize)>(&self, x: T, y: T, mut f: F) {
        for (i, aabb) in self.slots.iter().enumerate() {
            if let Some(aabb) = aabb
                && aabb.contains_point(x, y)
            {
                f(i);
            }
        }
    }

    fn visit_rect<F: FnMut(usize)>(&self, rect: Aabb2D<T>, mut f: F) {
        for (i, aabb) in self.slots.iter().enumerate() {
            if let Some(aabb) = aabb
                && aabb.overlaps(&rect)
            {
                f(i);
            }
        }
    }
}
