//! Formation harness: a named slot layout anchored to a moving frame,
//! plus the occupancy table agents claim slots from.
//!
//! All allocation is synchronous. Agents are processed one at a time
//! within a tick, so the first caller in scan order wins a contested slot.

use glam::Vec3;

use crate::core::types::{EntityId, ReferenceFrame, Slot};
use crate::formation::allocation::{ReachabilityTest, SlotStrategy};
use crate::formation::constants::{DEFAULT_MAX_POSITIONS, FIRE_TEAM_LEADER_SLOT, MAX_POSITIONS};
use crate::formation::fire_team::{FireTeamLayout, FireTeamRole};
use crate::formation::geometry::SlotGeometry;

#[derive(Debug, Clone)]
pub struct FormationHarness {
    name: String,
    max_positions: usize,
    rotates_with_object: bool,
    enabled: bool,
    frame: ReferenceFrame,
    occupants: [Option<EntityId>; MAX_POSITIONS],
    geometry: SlotGeometry,
    formation_mode: Option<String>,
}

impl FormationHarness {
    pub fn new(name: impl Into<String>, geometry: SlotGeometry) -> Self {
        let mut harness = Self {
            name: name.into(),
            max_positions: DEFAULT_MAX_POSITIONS,
            rotates_with_object: false,
            enabled: true,
            frame: ReferenceFrame::default(),
            occupants: [None; MAX_POSITIONS],
            geometry,
            formation_mode: None,
        };
        harness.geometry.on_bind(&harness.frame);
        harness.initialize();
        harness
    }

    pub fn with_max_positions(mut self, max_positions: usize) -> Self {
        self.set_max_positions(max_positions);
        self
    }

    pub fn with_rotation(mut self, rotates_with_object: bool) -> Self {
        self.rotates_with_object = rotates_with_object;
        self
    }

    /// Bind to an anchor frame. Frozen orientations are captured from it.
    pub fn with_frame(mut self, frame: ReferenceFrame) -> Self {
        self.frame = frame;
        self.geometry.on_bind(&frame);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_positions(&self) -> usize {
        self.max_positions
    }

    pub fn rotates_with_object(&self) -> bool {
        self.rotates_with_object
    }

    pub fn set_rotates_with_object(&mut self, rotates: bool) {
        self.rotates_with_object = rotates;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn frame(&self) -> &ReferenceFrame {
        &self.frame
    }

    /// Anchor position
    pub fn position(&self) -> Vec3 {
        self.frame.position
    }

    pub fn geometry(&self) -> &SlotGeometry {
        &self.geometry
    }

    pub fn geometry_mut(&mut self) -> &mut SlotGeometry {
        &mut self.geometry
    }

    fn clamp_capacity(&self, requested: usize) -> usize {
        self.geometry
            .fixed_capacity()
            .unwrap_or(requested)
            .min(MAX_POSITIONS)
    }

    /// Change capacity, clamped to `[0, MAX_POSITIONS]`. Occupants of
    /// slots that no longer exist are dropped.
    pub fn set_max_positions(&mut self, max_positions: usize) {
        self.max_positions = self.clamp_capacity(max_positions);
        for occupant in self.occupants[self.max_positions..].iter_mut() {
            *occupant = None;
        }
        self.geometry.on_capacity_changed(self.max_positions);
    }

    /// Re-clamp capacity, rebuild cached geometry and clear all occupants
    pub fn initialize(&mut self) {
        self.max_positions = self.clamp_capacity(self.max_positions);
        self.geometry.on_capacity_changed(self.max_positions);
        self.clear();
    }

    /// Release every slot. A fire team's preset leader is re-seated.
    pub fn clear(&mut self) {
        self.occupants = [None; MAX_POSITIONS];
        let leader = match &self.geometry {
            SlotGeometry::FireTeam(layout) => layout.leader,
            _ => None,
        };
        if let Some(leader) = leader {
            self.occupy_slot(leader, FIRE_TEAM_LEADER_SLOT);
        }
    }

    /// Release every slot held by `occupant`
    pub fn vacate(&mut self, occupant: EntityId) {
        // Scan the whole table so a duplicated entry can't survive
        for slot in self.occupants.iter_mut() {
            if *slot == Some(occupant) {
                *slot = None;
            }
        }
    }

    pub fn occupant(&self, slot: Slot) -> Option<EntityId> {
        if slot >= self.max_positions {
            return None;
        }
        self.occupants[slot]
    }

    pub fn is_occupied(&self, slot: Slot) -> bool {
        self.occupant(slot).is_some()
    }

    /// Whether `occupant` currently holds `slot`
    pub fn holds(&self, occupant: EntityId, slot: Slot) -> bool {
        self.occupant(slot) == Some(occupant)
    }

    /// Slot currently held by `occupant`, if any
    pub fn slot_of(&self, occupant: EntityId) -> Option<Slot> {
        self.occupants[..self.max_positions]
            .iter()
            .position(|o| *o == Some(occupant))
    }

    pub fn occupied_count(&self) -> usize {
        self.occupants[..self.max_positions]
            .iter()
            .filter(|o| o.is_some())
            .count()
    }

    /// (slot, occupant) pairs for every occupied slot
    pub fn occupants(&self) -> impl Iterator<Item = (Slot, EntityId)> + '_ {
        self.occupants[..self.max_positions]
            .iter()
            .enumerate()
            .filter_map(|(slot, o)| o.map(|id| (slot, id)))
    }

    /// Claim a specific slot. Succeeds if it is free or already ours.
    /// No reachability test is done.
    pub fn occupy_slot(&mut self, occupant: EntityId, slot: Slot) -> bool {
        if slot >= self.max_positions {
            return false;
        }
        match self.occupants[slot] {
            None => {
                self.occupants[slot] = Some(occupant);
                true
            }
            Some(current) => current == occupant,
        }
    }

    /// Claim the lowest-index free slot that passes `reach`
    pub fn occupy_first_available_slot(
        &mut self,
        occupant: EntityId,
        reach: Option<&dyn ReachabilityTest>,
    ) -> Option<Slot> {
        self.occupy(SlotStrategy::First, occupant, self.frame.position, reach)
    }

    /// Claim the free slot nearest `from` that passes `reach`
    pub fn occupy_closest_slot(
        &mut self,
        occupant: EntityId,
        from: Vec3,
        reach: Option<&dyn ReachabilityTest>,
    ) -> Option<Slot> {
        self.occupy(SlotStrategy::Closest, occupant, from, reach)
    }

    /// Like `occupy_closest_slot`, but never picks a slot farther from
    /// `from` than the anchor itself
    pub fn occupy_intermediate_slot(
        &mut self,
        occupant: EntityId,
        from: Vec3,
        reach: Option<&dyn ReachabilityTest>,
    ) -> Option<Slot> {
        self.occupy(SlotStrategy::Intermediate, occupant, from, reach)
    }

    /// Claim a slot using `strategy`. An occupant that already holds a
    /// slot gets that slot back untouched.
    pub fn occupy(
        &mut self,
        strategy: SlotStrategy,
        occupant: EntityId,
        from: Vec3,
        reach: Option<&dyn ReachabilityTest>,
    ) -> Option<Slot> {
        if let Some(slot) = self.slot_of(occupant) {
            return Some(slot);
        }

        let found = self.find_free_slot(strategy, from, reach);
        match found {
            Some(slot) => {
                self.occupants[slot] = Some(occupant);
                tracing::debug!(
                    "{:?} took slot {} of '{}' ({})",
                    occupant,
                    slot,
                    self.name,
                    strategy
                );
            }
            None => {
                tracing::debug!("No {} slot free on '{}' for {:?}", strategy, self.name, occupant);
            }
        }
        found
    }

    fn find_free_slot(
        &self,
        strategy: SlotStrategy,
        from: Vec3,
        reach: Option<&dyn ReachabilityTest>,
    ) -> Option<Slot> {
        let reachable = |position: Vec3| reach.map_or(true, |r| r.can_reach(position));
        let anchor_distance = from.distance(self.frame.position);

        let mut best: Option<(Slot, f32)> = None;
        for slot in 0..self.max_positions {
            if self.occupants[slot].is_some() {
                continue;
            }

            let position = self.slot_position(slot);
            let distance = from.distance(position);

            if strategy == SlotStrategy::Intermediate && distance > anchor_distance {
                continue;
            }
            if !reachable(position) {
                continue;
            }
            if strategy == SlotStrategy::First {
                return Some(slot);
            }

            // Strict comparison keeps the lowest index on ties
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((slot, distance));
            }
        }
        best.map(|(slot, _)| slot)
    }

    /// World position of `slot`; out-of-range slots get the layout fallback
    pub fn slot_position(&self, slot: Slot) -> Vec3 {
        self.geometry
            .slot_position(slot, self.max_positions, &self.frame, self.rotates_with_object)
    }

    pub fn slot_positions(&self) -> Vec<Vec3> {
        (0..self.max_positions).map(|s| self.slot_position(s)).collect()
    }

    /// Current formation mode. Layouts with built-in modes report their
    /// own; others echo whatever was last set.
    pub fn formation_mode(&self) -> Option<String> {
        self.geometry
            .formation_mode()
            .map(str::to_string)
            .or_else(|| self.formation_mode.clone())
    }

    /// Unknown modes are ignored by layouts with built-in modes
    pub fn set_formation_mode(&mut self, mode: &str) {
        if mode.trim().is_empty() {
            return;
        }
        if self.geometry.apply_formation_mode(mode) && self.geometry.formation_mode().is_none() {
            self.formation_mode = Some(mode.to_string());
        }
    }

    /// Refresh the anchor snapshot and advance layout timers
    pub fn update(&mut self, frame: ReferenceFrame, delta_time: f32) {
        self.frame = frame;
        self.geometry
            .tick(&self.frame, self.rotates_with_object, delta_time);
    }

    /// Fire-team slot for a role; `None` on other layouts
    pub fn slot_for_role(&self, role: FireTeamRole) -> Option<Slot> {
        match &self.geometry {
            SlotGeometry::FireTeam(_) => {
                FireTeamLayout::slot_for_role(role, |slot| self.is_occupied(slot))
            }
            _ => None,
        }
    }

    pub fn occupy_slot_for_role(&mut self, occupant: EntityId, role: FireTeamRole) -> bool {
        match self.slot_for_role(role) {
            Some(slot) => self.occupy_slot(occupant, slot),
            None => false,
        }
    }
}
