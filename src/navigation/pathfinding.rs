//! A* over a `NavGrid`
//!
//! Queries carry an expansion budget; running out of budget is reported
//! the same as having no path.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use glam::Vec3;

use crate::navigation::grid::{GridCell, NavGrid};

/// Node in the A* open set
#[derive(Debug, Clone)]
struct PathNode {
    cell: GridCell,
    f_cost: f32, // g_cost + heuristic
}

impl PartialEq for PathNode {
    fn eq(&self, other: &Self) -> bool {
        self.cell == other.cell
    }
}

impl Eq for PathNode {}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap
        other
            .f_cost
            .partial_cmp(&self.f_cost)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Waypoints from the start position to the goal position
#[derive(Debug, Clone, PartialEq)]
pub struct NavPath {
    pub waypoints: Vec<Vec3>,
}

impl NavPath {
    pub fn waypoint(&self, index: usize) -> Option<Vec3> {
        self.waypoints.get(index).copied()
    }

    /// First waypoint after the start
    pub fn next_waypoint(&self) -> Option<Vec3> {
        self.waypoint(1)
    }

    pub fn length(&self) -> f32 {
        self.waypoints.windows(2).map(|w| w[0].distance(w[1])).sum()
    }
}

/// Find a path using A*
///
/// Returns None if either end is off the grid, the goal is blocked, no
/// path exists, or more than `max_expansions` nodes would be expanded.
/// Each cell is expanded at most once.
pub fn find_path(grid: &NavGrid, start: Vec3, goal: Vec3, max_expansions: usize) -> Option<NavPath> {
    let start_cell = grid.cell_at(start)?;
    let goal_cell = grid.cell_at(goal)?;
    if !grid.is_walkable(goal_cell) {
        return None;
    }
    if start_cell == goal_cell {
        return Some(NavPath {
            waypoints: vec![start, goal],
        });
    }

    let mut open_set = BinaryHeap::new();
    let mut came_from: HashMap<GridCell, GridCell> = HashMap::new();
    let mut g_scores: HashMap<GridCell, f32> = HashMap::new();
    let mut closed: HashSet<GridCell> = HashSet::new();
    let mut expansions = 0;

    g_scores.insert(start_cell, 0.0);
    open_set.push(PathNode {
        cell: start_cell,
        f_cost: start_cell.distance(&goal_cell),
    });

    while let Some(current) = open_set.pop() {
        if current.cell == goal_cell {
            let cells = reconstruct_path(&came_from, current.cell);
            return Some(to_waypoints(grid, &cells, start, goal));
        }

        // Superseded heap entries don't count against the budget
        if !closed.insert(current.cell) {
            continue;
        }

        expansions += 1;
        if expansions > max_expansions {
            tracing::debug!(
                "Path query ran out of budget ({} expansions) toward {:?}",
                max_expansions,
                goal
            );
            return None;
        }

        let current_g = *g_scores.get(&current.cell).unwrap_or(&f32::INFINITY);

        for (neighbor, step_cost) in grid.neighbors(current.cell) {
            if closed.contains(&neighbor) {
                continue;
            }
            let tentative_g = current_g + step_cost;
            let neighbor_g = *g_scores.get(&neighbor).unwrap_or(&f32::INFINITY);

            if tentative_g < neighbor_g {
                came_from.insert(neighbor, current.cell);
                g_scores.insert(neighbor, tentative_g);

                let f_cost = tentative_g + neighbor.distance(&goal_cell);
                open_set.push(PathNode {
                    cell: neighbor,
                    f_cost,
                });
            }
        }
    }

    None // No path found
}

/// Reconstruct path from came_from map
fn reconstruct_path(came_from: &HashMap<GridCell, GridCell>, mut current: GridCell) -> Vec<GridCell> {
    let mut path = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

/// Start and goal keep their exact positions; cells in between become
/// cell centers at the start's height.
fn to_waypoints(grid: &NavGrid, cells: &[GridCell], start: Vec3, goal: Vec3) -> NavPath {
    let mut waypoints = Vec::with_capacity(cells.len());
    waypoints.push(start);
    if cells.len() > 2 {
        for cell in &cells[1..cells.len() - 1] {
            let center = grid.cell_center(*cell);
            waypoints.push(Vec3::new(center.x, start.y, center.z));
        }
    }
    waypoints.push(goal);
    NavPath { waypoints }
}
