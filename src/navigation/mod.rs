//! Grid navigation used for reachability and facing decisions

pub mod grid;
pub mod pathfinding;
pub mod reachability;

pub use grid::{GridCell, NavGrid};
pub use pathfinding::{find_path, NavPath};
pub use reachability::PathReachability;
