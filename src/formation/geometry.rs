//! Slot geometry strategies
//!
//! A closed set of layouts dispatched by `SlotGeometry`. Occupancy and
//! allocation live on `FormationHarness`; this only maps a slot index
//! and an anchor frame to a world position.

use glam::Vec3;

use crate::core::types::{ReferenceFrame, Slot};
use crate::formation::column::ColumnLayout;
use crate::formation::constants::FIRE_TEAM_SIZE;
use crate::formation::fire_team::{FireTeamFormation, FireTeamLayout};
use crate::formation::ring::RingLayout;
use crate::formation::scattered::ScatteredRadiusLayout;
use crate::formation::triangle::TriangleLayout;

#[derive(Debug, Clone)]
pub enum SlotGeometry {
    Column(ColumnLayout),
    Ring(RingLayout),
    Triangle(TriangleLayout),
    FireTeam(FireTeamLayout),
    ScatteredRadius(ScatteredRadiusLayout),
}

impl SlotGeometry {
    /// Short name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            SlotGeometry::Column(_) => "column",
            SlotGeometry::Ring(_) => "ring",
            SlotGeometry::Triangle(_) => "triangle",
            SlotGeometry::FireTeam(_) => "fire_team",
            SlotGeometry::ScatteredRadius(_) => "scattered_radius",
        }
    }

    /// Capacity the layout insists on, whatever the harness was configured with
    pub fn fixed_capacity(&self) -> Option<usize> {
        match self {
            SlotGeometry::FireTeam(_) => Some(FIRE_TEAM_SIZE),
            _ => None,
        }
    }

    /// World position of `slot`. Out-of-range slots get the layout's
    /// fallback position; this never panics.
    pub fn slot_position(
        &self,
        slot: Slot,
        max_positions: usize,
        frame: &ReferenceFrame,
        rotates: bool,
    ) -> Vec3 {
        match self {
            SlotGeometry::Column(layout) => layout.slot_position(slot, max_positions, frame, rotates),
            SlotGeometry::Ring(layout) => layout.slot_position(slot, max_positions, frame, rotates),
            SlotGeometry::Triangle(layout) => {
                layout.slot_position(slot, max_positions, frame, rotates)
            }
            SlotGeometry::FireTeam(layout) => layout.slot_position(slot, frame),
            SlotGeometry::ScatteredRadius(layout) => {
                layout.slot_position(slot, max_positions, frame, rotates)
            }
        }
    }

    /// Built-in formation mode, for layouts that have one
    pub fn formation_mode(&self) -> Option<&'static str> {
        match self {
            SlotGeometry::FireTeam(layout) => Some(layout.formation.as_str()),
            _ => None,
        }
    }

    /// Apply a mode string. Returns false when the layout has built-in
    /// modes and the string is not one of them.
    pub fn apply_formation_mode(&mut self, mode: &str) -> bool {
        match self {
            SlotGeometry::FireTeam(layout) => match mode.parse::<FireTeamFormation>() {
                Ok(formation) => {
                    layout.formation = formation;
                    true
                }
                Err(_) => false,
            },
            _ => true,
        }
    }

    pub fn on_capacity_changed(&mut self, max_positions: usize) {
        if let SlotGeometry::ScatteredRadius(layout) = self {
            layout.resize(max_positions);
        }
    }

    /// Called once per tick after the anchor frame is refreshed
    pub fn tick(&mut self, frame: &ReferenceFrame, rotates: bool, delta_time: f32) {
        match self {
            SlotGeometry::FireTeam(layout) if rotates => layout.capture_orientation(frame),
            SlotGeometry::ScatteredRadius(layout) => layout.tick(delta_time),
            _ => {}
        }
    }

    /// Called when the harness is first bound to its anchor
    pub fn on_bind(&mut self, frame: &ReferenceFrame) {
        if let SlotGeometry::FireTeam(layout) = self {
            layout.capture_orientation(frame);
        }
    }
}
