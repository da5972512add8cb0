//! Column (rectangular grid) slot layout
//!
//! Slots are numbered across rows from the anchor's left, row 0 being
//! the row directly behind the anchor.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::types::{ReferenceFrame, Slot};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnLayout {
    /// Width of the grid; depth follows from capacity
    pub number_of_columns: usize,
    /// Side-to-side spacing
    pub position_spread: f32,
    /// Front-to-back spacing
    pub position_distance: f32,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            number_of_columns: 3,
            position_spread: 1.0,
            position_distance: 1.0,
        }
    }
}

impl ColumnLayout {
    /// Row and column for a slot. A zero column count behaves as one column.
    pub fn row_and_column(&self, slot: Slot) -> (usize, usize) {
        let columns = self.number_of_columns.max(1);
        (slot / columns, slot % columns)
    }

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

        let columns = self.number_of_columns.max(1);
        let (row, column) = self.row_and_column(slot);

        // Center the row on the anchor
        let x_left = -((columns - 1) as f32 / 2.0) * self.position_spread;
        let x = x_left + column as f32 * self.position_spread;
        let z = -((row + 1) as f32 * self.position_distance);
        let offset = Vec3::new(x, 0.0, z);

        if rotates {
            frame.position + frame.rotation * offset
        } else {
            frame.position + offset
        }
    }
}
