//! Walkability grid on the ground (XZ) plane

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Integer cell coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCell {
    pub x: i32,
    pub z: i32,
}

impl GridCell {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Octile distance in cells
    pub fn distance(&self, other: &GridCell) -> f32 {
        let dx = (self.x - other.x).abs() as f32;
        let dz = (self.z - other.z).abs() as f32;
        dx.max(dz) + (std::f32::consts::SQRT_2 - 1.0) * dx.min(dz)
    }
}

#[derive(Debug, Clone)]
pub struct NavGrid {
    width: usize,
    depth: usize,
    cell_size: f32,
    origin: Vec3,
    blocked: Vec<bool>,
}

impl NavGrid {
    /// All-walkable grid whose cell (0, 0) has its corner at `origin`
    pub fn new(width: usize, depth: usize, cell_size: f32, origin: Vec3) -> Self {
        Self {
            width,
            depth,
            cell_size: cell_size.max(f32::EPSILON),
            origin,
            blocked: vec![false; width * depth],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    fn index(&self, cell: GridCell) -> Option<usize> {
        if cell.x < 0 || cell.z < 0 {
            return None;
        }
        let (x, z) = (cell.x as usize, cell.z as usize);
        if x >= self.width || z >= self.depth {
            return None;
        }
        Some(z * self.width + x)
    }

    pub fn contains(&self, cell: GridCell) -> bool {
        self.index(cell).is_some()
    }

    /// Out-of-bounds cells are not walkable
    pub fn is_walkable(&self, cell: GridCell) -> bool {
        self.index(cell).map_or(false, |i| !self.blocked[i])
    }

    pub fn set_blocked(&mut self, cell: GridCell, blocked: bool) {
        if let Some(i) = self.index(cell) {
            self.blocked[i] = blocked;
        }
    }

    /// Block every cell in the inclusive rectangle
    pub fn block_rect(&mut self, min: GridCell, max: GridCell) {
        for z in min.z..=max.z {
            for x in min.x..=max.x {
                self.set_blocked(GridCell::new(x, z), true);
            }
        }
    }

    /// Cell containing a world position, if it is on the grid
    pub fn cell_at(&self, position: Vec3) -> Option<GridCell> {
        let local = position - self.origin;
        let cell = GridCell::new(
            (local.x / self.cell_size).floor() as i32,
            (local.z / self.cell_size).floor() as i32,
        );
        self.contains(cell).then_some(cell)
    }

    /// World position of a cell's center, at the grid's height
    pub fn cell_center(&self, cell: GridCell) -> Vec3 {
        self.origin
            + Vec3::new(
                (cell.x as f32 + 0.5) * self.cell_size,
                0.0,
                (cell.z as f32 + 0.5) * self.cell_size,
            )
    }

    /// Walkable neighbors with step cost. Diagonals may not cut corners.
    pub fn neighbors(&self, cell: GridCell) -> Vec<(GridCell, f32)> {
        let mut result = Vec::with_capacity(8);
        for dz in -1..=1 {
            for dx in -1..=1 {
                if dx == 0 && dz == 0 {
                    continue;
                }
                let next = GridCell::new(cell.x + dx, cell.z + dz);
                if !self.is_walkable(next) {
                    continue;
                }
                if dx != 0 && dz != 0 {
                    let side_a = GridCell::new(cell.x + dx, cell.z);
                    let side_b = GridCell::new(cell.x, cell.z + dz);
                    if !self.is_walkable(side_a) || !self.is_walkable(side_b) {
                        continue;
                    }
                    result.push((next, std::f32::consts::SQRT_2));
                } else {
                    result.push((next, 1.0));
                }
            }
        }
        result
    }
}
