// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Uniform grid backend for 2D AABBs.
//!
//! Each box is registered in every cell it touches; queries only look at the
//! cells overlapping the query primitive. Works well when records are spread
//! fairly evenly and query rectangles are small compared to the occupied world.
//! Boxes touching more than [`MAX_CELLS_PER_ENTRY`] cells go to an overflow
//! list that every query scans, so one huge record never floods the map.

use alloc::vec::Vec;
use core::fmt::Debug;

use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;

use crate::backend::Backend;
use crate::types::{Aabb2D, Scalar};

type CellKey = (i32, i32);

/// Boxes covering more cells than this are kept in the overflow list.
pub const MAX_CELLS_PER_ENTRY: usize = 256;

/// Scalar types the grid can bucket.
pub trait GridScalar: Scalar {
    /// Map a coordinate to its cell index along one axis, flooring towards -∞.
    ///
    /// Must be monotonic in `value`; values outside the `i32` range saturate.
    fn cell_coord(value: Self, cell_size: Self) -> i32;
}

macro_rules! float_grid_scalar {
    ($($t:ty),*) => {$(
        impl GridScalar for $t {
            #[allow(
                clippy::cast_possible_truncation,
                reason = "Cell indices are i32; float-to-int casts saturate out-of-range values."
            )]
            #[inline]
            fn cell_coord(value: Self, cell_size: Self) -> i32 {
                debug_assert!(cell_size > 0.0, "grid cell_size must be strictly positive");
                let t = value / cell_size;
                let coord = t as i32;
                // The cast truncated towards zero; step down for negative fractions.
                if t < 0.0 && (coord as Self) > t {
                    coord.saturating_sub(1)
                } else {
                    coord
                }
            }
        }
    )*};
}

float_grid_scalar!(f32, f64);

impl GridScalar for i64 {
    #[inline]
    fn cell_coord(value: Self, cell_size: Self) -> i32 {
        debug_assert!(cell_size > 0, "grid cell_size must be strictly positive");
        let coord = value.div_euclid(cell_size);
        i32::try_from(coord).unwrap_or(if coord < 0 { i32::MIN } else { i32::MAX })
    }
}

#[derive(Clone, Debug)]
struct Registered<T> {
    aabb: Aabb2D<T>,
    /// Empty for boxes in the overflow list.
    cells: SmallVec<[CellKey; 4]>,
}

/// Uniform grid backend with a fixed cell size, anchored at (0, 0).
pub struct Grid<T: GridScalar> {
    cell_size: T,
    cells: HashMap<CellKey, SmallVec<[usize; 8]>>,
    oversized: Vec<usize>,
    slots: Vec<Option<Registered<T>>>,
}

impl<T: GridScalar> Debug for Grid<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let live = self.slots.iter().filter(|s| s.is_some()).count();
        f.debug_struct("Grid")
            .field("cell_size", &self.cell_size)
            .field("live_slots", &live)
            .field("cells", &self.cells.len())
            .field("oversized", &self.oversized.len())
            .finish_non_exhaustive()
    }
}

impl<T: GridScalar> Grid<T> {
    /// Create a grid with the given cell size.
    pub fn new(cell_size: T) -> Self {
        debug_assert!(cell_size > T::zero(), "cell_size must be strictly positive");
        Self {
            cell_size,
            cells: HashMap::new(),
            oversized: Vec::new(),
            slots: Vec::new(),
        }
    }

    fn span(&self, min: T, max: T) -> (i32, i32) {
        let a = T::cell_coord(min, self.cell_size);
        let b = T::cell_coord(max, self.cell_size);
        if a <= b { (a, b) } else { (b, a) }
    }

    /// The cells `aabb` touches, or `None` past [`MAX_CELLS_PER_ENTRY`].
    fn cells_for(&self, aabb: &Aabb2D<T>) -> Option<SmallVec<[CellKey; 4]>> {
        let (x0, x1) = self.span(aabb.min_x, aabb.max_x);
        let (y0, y1) = self.span(aabb.min_y, aabb.max_y);
        let count = cell_count(x0, x1, y0, y1)?;
        if count > MAX_CELLS_PER_ENTRY {
            return None;
        }
        let mut out = SmallVec::new();
        for ix in x0..=x1 {
            for iy in y0..=y1 {
                out.push((ix, iy));
            }
        }
        Some(out)
    }

    fn unregister(&mut self, slot: usize) {
        let Some(old) = self.slots.get_mut(slot).and_then(Option::take) else {
            return;
        };
        if old.cells.is_empty() {
            self.oversized.retain(|s| *s != slot);
        }
        for key in &old.cells {
            if let Some(bucket) = self.cells.get_mut(key) {
                bucket.retain(|s| *s != slot);
                if bucket.is_empty() {
                    self.cells.remove(key);
                }
            }
        }
    }

    fn registered(&self, slot: usize) -> Option<&Registered<T>> {
        self.slots.get(slot).and_then(Option::as_ref)
    }
}

impl<T: GridScalar> Backend<T> for Grid<T> {
    fn insert(&mut self, slot: usize, aabb: Aabb2D<T>) {
        self.unregister(slot);
        if self.slots.len() <= slot {
            self.slots.resize_with(slot + 1, || None);
        }
        let cells = match self.cells_for(&aabb) {
            Some(cells) => {
                for key in &cells {
                    self.cells.entry(*key).or_default().push(slot);
                }
                cells
            }
            None => {
                self.oversized.push(slot);
                SmallVec::new()
            }
        };
        self.slots[slot] = Some(Registered { aabb, cells });
    }

    fn remove(&mut self, slot: usize) {
        self.unregister(slot);
    }

    fn clear(&mut self) {
        self.cells.clear();
        self.oversized.clear();
        self.slots.clear();
    }

    fn visit_point<F: FnMut(usize)>(&self, x: T, y: T, mut f: F) {
        // Cell assignment is monotonic, so a box containing the point is
        // always registered in the point's own cell (or is oversized).
        let ix = T::cell_coord(x, self.cell_size);
        let iy = T::cell_coord(y, self.cell_size);
        let bucket = self.cells.get(&(ix, iy)).into_iter().flatten();
        for &slot in bucket.chain(&self.oversized) {
            if self
                .registered(slot)
                .is_some_and(|r| r.aabb.contains_point(x, y))
            {
                f(slot);
            }
        }
    }

    fn visit_rect<F: FnMut(usize)>(&self, rect: Aabb2D<T>, mut f: F) {
        for &slot in &self.oversized {
            if self
                .registered(slot)
                .is_some_and(|r| r.aabb.overlaps(&rect))
            {
                f(slot);
            }
        }

        let (x0, x1) = self.span(rect.min_x, rect.max_x);
        let (y0, y1) = self.span(rect.min_y, rect.max_y);
        let mut seen: HashSet<usize> = HashSet::new();
        let mut visit_bucket = |bucket: &SmallVec<[usize; 8]>| {
            for &slot in bucket {
                if seen.insert(slot)
                    && self
                        .registered(slot)
                        .is_some_and(|r| r.aabb.overlaps(&rect))
                {
                    f(slot);
                }
            }
        };

        if cell_count(x0, x1, y0, y1).is_none_or(|n| n > self.cells.len()) {
            // Query covers more cells than are occupied: walk the occupied ones.
            for (&(ix, iy), bucket) in &self.cells {
                if (x0..=x1).contains(&ix) && (y0..=y1).contains(&iy) {
                    visit_bucket(bucket);
                }
            }
        } else {
            for ix in x0..=x1 {
                for iy in y0..=y1 {
                    if let Some(bucket) = self.cells.get(&(ix, iy)) {
                        visit_bucket(bucket);
                    }
                }
            }
        }
    }
}

/// Number of cells in the inclusive index ranges, if it fits a `usize`.
fn cell_count(x0: i32, x1: i32, y0: i32, y1: i32) -> Option<usize> {
    (i64::from(x1) - i64::from(x0) + 1)
        .checked_mul(i64::from(y1) - i64::from(y0) + 1)
        .and_then(|n| usize::try_from(n).ok())
}

/// Grid backend over `f32` coordinates.
pub type GridF32 = Grid<f32>;
/// Grid backend over `f64` coordinates.
pub type GridF64 = Grid<f64>;
/// Grid backend over `i64` coordinates.
pub type GridI64 = Grid<i64>;

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn rect_hits<T: GridScalar>(grid: &Grid<T>, rect: Aabb2D<T>) -> Vec<usize> {
        let mut hits = Vec::new();
        grid.visit_rect(rect, |s| hits.push(s));
        hits.sort_unstable();
        hits
    }

    #[test]
    fn box_spanning_many_cells_reported_once() {
        let mut grid = GridF64::new(5.0);
        grid.insert(3, Aabb2D::new(0.0, 0.0, 40.0, 40.0));
        assert_eq!(rect_hits(&grid, Aabb2D::new(1.0, 1.0, 39.0, 39.0)), vec![3]);
    }

    #[test]
    fn reinsert_moves_box_between_cells() {
        let mut grid = GridF64::new(10.0);
        grid.insert(0, Aabb2D::new(0.0, 0.0, 5.0, 5.0));
        grid.insert(0, Aabb2D::new(100.0, 100.0, 105.0, 105.0));

        assert!(rect_hits(&grid, Aabb2D::new(0.0, 0.0, 5.0, 5.0)).is_empty());
        assert_eq!(
            rect_hits(&grid, Aabb2D::new(101.0, 101.0, 102.0, 102.0)),
            vec![0]
        );
        // Old cells are dropped once empty.
        assert_eq!(grid.cells.len(), 1);
    }

    #[test]
    fn remove_clears_all_cells() {
        let mut grid = GridI64::new(4);
        grid.insert(1, Aabb2D::new(-10, -10, 10, 10));
        grid.remove(1);
        assert!(grid.cells.is_empty());
        assert!(rect_hits(&grid, Aabb2D::new(-100, -100, 100, 100)).is_empty());
    }

    #[test]
    fn point_on_cell_border_finds_box_ending_there() {
        let mut grid = GridF64::new(10.0);
        // Max edge lies exactly on the 10.0 border, so the box also lands in cell (1, 1).
        grid.insert(7, Aabb2D::new(2.0, 2.0, 10.0, 10.0));
        let mut hits = Vec::new();
        grid.visit_point(10.0, 10.0, |s| hits.push(s));
        assert_eq!(hits, vec![7]);
    }

    #[test]
    fn zero_height_box_is_searchable() {
        let mut grid = GridF32::new(8.0);
        grid.insert(0, Aabb2D::new(-20.0, 3.0, 20.0, 3.0));
        assert_eq!(rect_hits(&grid, Aabb2D::new(0.0, 0.0, 1.0, 4.0)), vec![0]);
        assert!(rect_hits(&grid, Aabb2D::new(0.0, 4.0, 1.0, 5.0)).is_empty());
    }

    #[test]
    fn huge_query_walks_occupied_cells() {
        let mut grid = GridF64::new(1.0);
        grid.insert(0, Aabb2D::new(3.0, 3.0, 4.0, 4.0));
        grid.insert(1, Aabb2D::new(-5e8, 2.0, -5e8, 2.0));
        assert_eq!(
            rect_hits(&grid, Aabb2D::new(-1e9, -1e9, 1e9, 1e9)),
            vec![0, 1]
        );
    }

    #[test]
    fn huge_box_goes_to_overflow() {
        let mut grid = GridF64::new(1.0);
        // Four trillion cells if registered one by one.
        grid.insert(2, Aabb2D::new(-1e6, -1e6, 1e6, 1e6));
        grid.insert(5, Aabb2D::new(3.0, 3.0, 4.0, 4.0));
        assert_eq!(grid.oversized, vec![2]);
        assert_eq!(grid.cells.len(), 4);

        assert_eq!(rect_hits(&grid, Aabb2D::new(2.0, 2.0, 5.0, 5.0)), vec![2, 5]);
        assert_eq!(rect_hits(&grid, Aabb2D::new(9e5, 9e5, 9e5, 9e5)), vec![2]);
        assert!(rect_hits(&grid, Aabb2D::new(2e6, 0.0, 3e6, 1.0)).is_empty());
        let mut hits = Vec::new();
        grid.visit_point(-5e5, 7.5, |s| hits.push(s));
        assert_eq!(hits, vec![2]);

        // Shrinking moves it back into the cells; removing clears both.
        grid.insert(2, Aabb2D::new(0.0, 0.0, 1.0, 1.0));
        assert!(grid.oversized.is_empty());
        grid.remove(2);
        grid.remove(5);
        assert!(grid.cells.is_empty());
        assert!(rect_hits(&grid, Aabb2D::new(-1e9, -1e9, 1e9, 1e9)).is_empty());
    }

    #[test]
    fn negative_coordinates_floor() {
        assert_eq!(GridScalar::cell_coord(-0.5_f64, 1.0), -1);
        assert_eq!(GridScalar::cell_coord(-1.0_f64, 1.0), -1);
        assert_eq!(GridScalar::cell_coord(-1_i64, 4), -1);
        assert_eq!(GridScalar::cell_coord(1e20_f64, 1.0), i32::MAX);
        assert_eq!(GridScalar::cell_coord(i64::MIN, 1), i32::MIN);
    }
}
