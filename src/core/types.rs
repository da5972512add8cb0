//! Core type definitions used throughout the codebase

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for agents (soldiers, commanders, enemies)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

/// Identifier for single-occupant objectives (cover points)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectiveId(pub u32);

/// Simulation tick counter
pub type Tick = u64;

/// Index into a harness's occupancy table
pub type Slot = usize;

/// Position and orientation snapshot of a formation anchor.
///
/// Y is up. Forward is `rotation * +Z`, right is `rotation * +X`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceFrame {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for ReferenceFrame {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl ReferenceFrame {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Frame at `position` turned `yaw` degrees about the up axis
    pub fn from_yaw_degrees(position: Vec3, yaw: f32) -> Self {
        Self {
            position,
            rotation: Quat::from_rotation_y(yaw.to_radians()),
        }
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Heading about the up axis in degrees, in `[0, 360)`
    pub fn yaw_degrees(&self) -> f32 {
        let forward = self.forward();
        forward.x.atan2(forward.z).to_degrees().rem_euclid(360.0)
    }
}

/// Rotate `v` by `degrees` about the up axis
pub fn rotate_about_up(v: Vec3, degrees: f32) -> Vec3 {
    Quat::from_rotation_y(degrees.to_radians()) * v
}
