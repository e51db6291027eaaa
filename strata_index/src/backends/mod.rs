// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend implementations for different spatial strategies.
//!
//! - `flat`: flat vector with linear scans (small, simple, exact order).
//! - `grid` (feature `backend_grid`): uniform grid with configurable cell size
//!   and an overflow list for very large boxes.

pub(crate) mod flat;
#[cfg(feature = "backend_grid")]
pub(crate) mod grid;

pub use flat::FlatVec;
#[cfg(feature = "backend_grid")]
pub use grid::{Grid, GridF32, GridF64, GridI64, GridScalar, MAX_CELLS_PER_ENTRY};
