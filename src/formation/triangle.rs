//! Triangle (wedge) slot layout
//!
//! Rows open behind the anchor inside a cone of `angle_spread` degrees.
//! Row 0 holds two slots and every row after holds one more than the last.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::types::{rotate_about_up, ReferenceFrame, Slot};
use crate::formation::constants::{DEFAULT_ANGLE_SPREAD, TRIANGLE_FIRST_ROW_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TriangleLayout {
    /// Distance between rows, front to back
    pub position_distance: f32,
    /// Full cone angle in degrees
    pub angle_spread: f32,
}

impl Default for TriangleLayout {
    fn default() -> Self {
        Self {
            position_distance: 1.0,
            angle_spread: DEFAULT_ANGLE_SPREAD,
        }
    }
}

/// Row number and index within the row for a wedge slot
pub fn triangle_row(slot: Slot) -> (usize, usize) {
    let mut row = 0;
    let mut row_size = TRIANGLE_FIRST_ROW_SIZE;
    let mut index = slot;
    while index >= row_size {
        index -= row_size;
        row += 1;
        row_size += 1;
    }
    (row, index)
}

impl TriangleLayout {
    /// One step directly behind the anchor
    pub fn fallback(&self, frame: &ReferenceFrame) -> Vec3 {
        frame.position - frame.forward() * self.position_distance
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

        let mut angle_left = 180.0 - self.angle_spread / 2.0;
        let mut angle_right = 180.0 + self.angle_spread / 2.0;
        if rotates {
            let yaw = frame.yaw_degrees();
            angle_left += yaw;
            angle_right += yaw;
        }

        let (row, index) = triangle_row(slot);

        // Both edges of the row sit (row + 1) steps out along the cone
        let reach = Vec3::Z * ((row + 1) as f32 * self.position_distance);
        let left = frame.position + rotate_about_up(reach, angle_left);
        let right = frame.position + rotate_about_up(reach, angle_right);

        left.lerp(right, index as f32 / (row + 1) as f32)
    }
}
