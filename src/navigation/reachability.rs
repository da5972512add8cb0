//! Path-backed reachability for slot allocation

use glam::Vec3;

use crate::formation::allocation::ReachabilityTest;
use crate::navigation::grid::NavGrid;
use crate::navigation::pathfinding::find_path;

/// Reachability from a fixed start position over a grid
#[derive(Debug, Clone, Copy)]
pub struct PathReachability<'a> {
    grid: &'a NavGrid,
    from: Vec3,
    max_expansions: usize,
}

impl<'a> PathReachability<'a> {
    pub fn new(grid: &'a NavGrid, from: Vec3, max_expansions: usize) -> Self {
        Self {
            grid,
            from,
            max_expansions,
        }
    }
}

impl ReachabilityTest for PathReachability<'_> {
    fn can_reach(&self, target: Vec3) -> bool {
        find_path(self.grid, self.from, target, self.max_expansions).is_some()
    }
}
