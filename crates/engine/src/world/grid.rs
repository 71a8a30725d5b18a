use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{GRID_SIZE, TILE_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCoord {
    pub x: i32,
    pub z: i32,
}

impl GridCoord {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chebyshev distance; the step count between two cells under 8-connected unit moves.
    pub fn chebyshev_distance(self, other: GridCoord) -> u32 {
        self.x.abs_diff(other.x).max(self.z.abs_diff(other.z))
    }

    pub fn is_adjacent_8(self, other: GridCoord) -> bool {
        self != other && self.chebyshev_distance(other) == 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    x: i32,
    z: i32,
    walkable: bool,
}

impl GridCell {
    pub fn coord(&self) -> GridCoord {
        GridCoord::new(self.x, self.z)
    }

    pub fn walkable(&self) -> bool {
        self.walkable
    }
}

/// Axis-aligned world-space rectangle on the ground plane.
///
/// Covers `[origin_x, origin_x + width) x [origin_z, origin_z + depth)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub origin_x: f32,
    pub origin_z: f32,
    pub width: f32,
    pub depth: f32,
}

impl Footprint {
    pub fn contains(&self, x: f32, z: f32) -> bool {
        x >= self.origin_x
            && x < self.origin_x + self.width
            && z >= self.origin_z
            && z < self.origin_z + self.depth
    }
}

/// Square navigation grid centred on the world origin.
///
/// Grid origin convention:
/// - cell `(0,0)` has its centre at `(-size*tile/2 + tile/2, -size*tile/2 + tile/2)`.
/// - cell coordinates never change after construction; only `walkable` does, and only
///   through [`TileGrid::register_obstacle`].
#[derive(Debug, Clone, PartialEq)]
pub struct TileGrid {
    size: u32,
    tile_size: f32,
    cells: Vec<GridCell>,
}

impl Default for TileGrid {
    fn default() -> Self {
        Self::new(GRID_SIZE, TILE_SIZE)
    }
}

impl TileGrid {
    pub fn new(size: u32, tile_size: f32) -> Self {
        let mut cells = Vec::with_capacity(size as usize * size as usize);
        for z in 0..size as i32 {
            for x in 0..size as i32 {
                cells.push(GridCell {
                    x,
                    z,
                    walkable: true,
                });
            }
        }
        Self {
            size,
            tile_size,
            cells,
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Distance from the world origin to the grid edge along either axis.
    pub fn half_extent(&self) -> f32 {
        self.size as f32 * self.tile_size / 2.0
    }

    /// Non-finite input maps to an out-of-range coordinate.
    pub fn world_to_grid(&self, x: f32, z: f32) -> GridCoord {
        GridCoord {
            x: self.axis_to_grid(x),
            z: self.axis_to_grid(z),
        }
    }

    fn axis_to_grid(&self, value: f32) -> i32 {
        if !value.is_finite() {
            return i32::MIN;
        }
        ((value + self.half_extent()) / self.tile_size).floor() as i32
    }

    /// Centre of the cell on the ground plane (`y = 0`).
    pub fn grid_to_world(&self, coord: GridCoord) -> Vec3 {
        let offset = self.tile_size / 2.0 - self.half_extent();
        Vec3::new(
            coord.x as f32 * self.tile_size + offset,
            0.0,
            coord.z as f32 * self.tile_size + offset,
        )
    }

    pub fn is_valid_grid_pos(&self, coord: GridCoord) -> bool {
        let size = self.size as i32;
        (0..size).contains(&coord.x) && (0..size).contains(&coord.z)
    }

    pub fn index_of(&self, coord: GridCoord) -> Option<usize> {
        if !self.is_valid_grid_pos(coord) {
            return None;
        }
        Some(coord.z as usize * self.size as usize + coord.x as usize)
    }

    pub fn coord_of(&self, index: usize) -> Option<GridCoord> {
        self.cells.get(index).map(GridCell::coord)
    }

    pub fn cell(&self, coord: GridCoord) -> Option<&GridCell> {
        self.index_of(coord).and_then(|index| self.cells.get(index))
    }

    pub fn is_walkable(&self, coord: GridCoord) -> bool {
        self.cell(coord).is_some_and(GridCell::walkable)
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn blocked_cell_count(&self) -> usize {
        self.cells.iter().filter(|cell| !cell.walkable).count()
    }

    /// Marks every cell whose centre lies inside `footprint` as unwalkable.
    ///
    /// Returns how many cells changed state, so a repeated registration returns 0.
    pub fn register_obstacle(&mut self, footprint: &Footprint) -> usize {
        let first = self.world_to_grid(footprint.origin_x, footprint.origin_z);
        let last = self.world_to_grid(
            footprint.origin_x + footprint.width,
            footprint.origin_z + footprint.depth,
        );
        let max_index = self.size as i32 - 1;
        if max_index < 0 {
            return 0;
        }

        let mut newly_blocked = 0usize;
        for z in first.z.max(0)..=last.z.min(max_index) {
            for x in first.x.max(0)..=last.x.min(max_index) {
                let coord = GridCoord::new(x, z);
                let center = self.grid_to_world(coord);
                if !footprint.contains(center.x, center.z) {
                    continue;
                }
                let Some(index) = self.index_of(coord) else {
                    continue;
                };
                let cell = &mut self.cells[index];
                if cell.walkable {
                    cell.walkable = false;
                    newly_blocked += 1;
                }
            }
        }

        debug!(
            origin_x = footprint.origin_x,
            origin_z = footprint.origin_z,
            width = footprint.width,
            depth = footprint.depth,
            newly_blocked,
            "obstacle_registered"
        );
        newly_blocked
    }
}
