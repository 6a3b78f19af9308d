//! Grid bounds and boundary policy
//!
//! A clamping grid has hard edges: stepping off it is a collision. A wrapping
//! grid is a torus: coordinates teleport to the opposite edge, and distances
//! are measured the short way round.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::config::BoundaryPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    pub cols: i32,
    pub rows: i32,
    pub policy: BoundaryPolicy,
}

impl Grid {
    pub fn new(cols: i32, rows: i32, policy: BoundaryPolicy) -> Self {
        Self { cols, rows, policy }
    }

    #[inline]
    pub fn size(&self) -> IVec2 {
        IVec2::new(self.cols, self.rows)
    }

    #[inline]
    pub fn contains(&self, p: IVec2) -> bool {
        p.x >= 0 && p.x < self.cols && p.y >= 0 && p.y < self.rows
    }

    /// Wrap a coordinate onto the torus
    #[inline]
    pub fn wrap(&self, p: IVec2) -> IVec2 {
        IVec2::new(p.x.rem_euclid(self.cols), p.y.rem_euclid(self.rows))
    }

    /// Apply the boundary policy to a candidate cell.
    ///
    /// Returns `None` when the cell lies outside a clamping grid.
    pub fn resolve(&self, p: IVec2) -> Option<IVec2> {
        match self.policy {
            BoundaryPolicy::Wrap => Some(self.wrap(p)),
            BoundaryPolicy::Clamp => self.contains(p).then_some(p),
        }
    }

    /// Per-axis distance between two cells (short way round on a torus)
    pub fn axis_distance(&self, a: IVec2, b: IVec2) -> IVec2 {
        let d = (a - b).abs();
        match self.policy {
            BoundaryPolicy::Clamp => d,
            BoundaryPolicy::Wrap => {
                let size = self.size();
                IVec2::new(d.x.min(size.x - d.x), d.y.min(size.y - d.y))
            }
        }
    }

    #[inline]
    pub fn manhattan(&self, a: IVec2, b: IVec2) -> i32 {
        let d = self.axis_distance(a, b);
        d.x + d.y
    }

    /// Pull a cell inside the grid, keeping `margin` cells from a hard edge.
    ///
    /// Wrapping grids have no edges, so the cell is wrapped instead.
    pub fn confine(&self, p: IVec2, margin: i32) -> IVec2 {
        match self.policy {
            BoundaryPolicy::Wrap => self.wrap(p),
            BoundaryPolicy::Clamp => {
                let axis = |v: i32, size: i32| {
                    let lo = margin.min(size - 1).max(0);
                    let hi = (size - margin).min(size - 1).max(lo);
                    v.clamp(lo, hi)
                };
                IVec2::new(axis(p.x, self.cols), axis(p.y, self.rows))
            }
        }
    }

    pub fn cell_count(&self) -> usize {
        self.cols.max(0) as usize * self.rows.max(0) as usize
    }
}
