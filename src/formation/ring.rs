//! Ring slot layout: evenly spaced positions on a circle around the anchor

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::types::{rotate_about_up, ReferenceFrame, Slot};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RingLayout {
    /// Ring radius
    pub position_distance: f32,
}

impl Default for RingLayout {
    fn default() -> Self {
        Self {
            position_distance: 1.0,
        }
    }
}

impl RingLayout {
    /// One step in front of the anchor
    pub fn fallback(&self, frame: &ReferenceFrame) -> Vec3 {
        frame.position + frame.forward() * self.position_distance
    }

    /// Angle of a slot in degrees, measured from +Z before any anchor yaw
    pub fn slot_angle(slot: Slot, max_positions: usize) -> f32 {
        (360.0 / max_positions as f32) * slot as f32
    }

    pub fn slot_position(
        &self,
        slot: Slot,
        max_positions: usize,
        frame: &ReferenceFrame,
        rotates: bool,
    ) -> Vec3 {
        if slot >= max_positions {
            return self.fallback(frame);
        }

        let mut angle = Self::slot_angle(slot, max_positions);
        if rotates {
            angle += frame.yaw_degrees();
        }

        frame.position + rotate_about_up(Vec3::Z * self.position_distance, angle)
    }
}
