//! Collision Sector Grid
//!
//! A uniform grid over the world's bounding region. Each sector lists the
//! bodies whose AABB corners currently map into its cell. The grid is sized
//! once at construction (`TESSELLATION_PER_SIDE^(1 + depth)` cells per side)
//! and its contents are cleared and repopulated every step; only the cell
//! *size* tracks the monotonically growing world bounds.
//!
//! Author: Moroya Sakamoto

use glam::Vec2;

use crate::pool::BodyId;
use crate::shape::Aabb;

/// Grid subdivision factor per side and depth level.
pub const TESSELLATION_PER_SIDE: usize = 4;

/// Smallest per-axis cell size; guards division when the world is a point.
const MIN_SECTOR_SIZE: f32 = 1e-6;

// ============================================================================
// Sector
// ============================================================================

/// One grid cell: the bodies currently overlapping it.
///
/// A body straddling cell boundaries legitimately appears in several
/// adjacent sectors, but never twice within the same sector.
#[derive(Clone, Debug, Default)]
pub struct Sector {
    /// Bodies whose AABB corners map into this cell.
    pub bodies: Vec<BodyId>,
}

// ============================================================================
// SectorGrid
// ============================================================================

/// Flat row-major grid of collision sectors.
pub struct SectorGrid {
    side_count: usize,
    origin: Vec2,
    sector_size: Vec2,
    sectors: Vec<Sector>,
}

impl SectorGrid {
    /// Allocate a grid with `TESSELLATION_PER_SIDE^(1 + depth)` cells per
    /// side covering the given initial bounds.
    #[must_use]
    pub fn new(depth: u32, world_min: Vec2, world_max: Vec2) -> Self {
        let side_count = TESSELLATION_PER_SIDE.pow(1 + depth);
        let mut grid = Self {
            side_count,
            origin: world_min,
            sector_size: Vec2::ONE,
            sectors: vec![Sector::default(); side_count * side_count],
        };
        grid.update_bounds(world_min, world_max);
        grid
    }

    /// Cells per side.
    #[inline]
    #[must_use]
    pub fn side_count(&self) -> usize {
        self.side_count
    }

    /// Total cell count.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.sectors.len()
    }

    /// True when the grid has no cells (never the case after construction).
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }

    /// Access one sector.
    #[inline]
    #[must_use]
    pub fn sector(&self, index: usize) -> &Sector {
        &self.sectors[index]
    }

    /// Recompute the cell size from the current (grown) world bounds.
    pub fn update_bounds(&mut self, world_min: Vec2, world_max: Vec2) {
        self.origin = world_min;
        self.sector_size = ((world_max - world_min) / self.side_count as f32)
            .max(Vec2::splat(MIN_SECTOR_SIZE));
    }

    /// Map a world-space point to its sector index, clamped to the grid.
    #[must_use]
    pub fn sector_index_of(&self, point: Vec2) -> usize {
        let side = self.side_count as i64;
        let cell = ((point - self.origin) / self.sector_size).floor();
        let x = (cell.x as i64).clamp(0, side - 1) as usize;
        let y = (cell.y as i64).clamp(0, side - 1) as usize;
        y * self.side_count + x
    }

    /// Clear every sector's body list, retaining allocations.
    pub fn clear(&mut self) {
        for sector in &mut self.sectors {
            sector.bodies.clear();
        }
    }

    /// Insert a body into the sector(s) covering its AABB's four corners.
    ///
    /// The corner indices are sorted so equal neighbors collapse: the first
    /// index is inserted unconditionally, each following one only when
    /// distinct from its predecessor. This is what keeps a body from being
    /// listed twice in the same sector.
    pub fn assign(&mut self, id: BodyId, aabb: &Aabb) {
        let corners = aabb.corners();
        let mut indices = [
            self.sector_index_of(corners[0]),
            self.sector_index_of(corners[1]),
            self.sector_index_of(corners[2]),
            self.sector_index_of(corners[3]),
        ];
        indices.sort_unstable();

        self.sectors[indices[0]].bodies.push(id);
        for k in 1..indices.len() {
            if indices[k] != indices[k - 1] {
                self.sectors[indices[k]].bodies.push(id);
            }
        }
    }

    /// Indices of the up-to-8 neighboring sectors of `index`.
    #[must_use]
    pub fn adjacent_indices(&self, index: usize) -> Vec<usize> {
        let side = self.side_count as i64;
        let x = (index % self.side_count) as i64;
        let y = (index / self.side_count) as i64;

        let mut out = Vec::with_capacity(8);
        for dy in -1..=1i64 {
            for dx in -1..=1i64 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let nx = x + dx;
                let ny = y + dy;
                if nx < 0 || ny < 0 || nx >= side || ny >= side {
                    continue;
                }
                out.push((ny * side + nx) as usize);
            }
        }
        out
    }
}

// ============================================================================
// Tests
// ============================================================================
