//! Shared squad world: bodies, harness sets, cover objectives and terrain

use ahash::{AHashMap, AHashSet};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::types::{EntityId, ObjectiveId, ReferenceFrame, Slot};
use crate::formation::allocation::{ReachabilityTest, SlotStrategy};
use crate::formation::harness::FormationHarness;
use crate::formation::objective::Objective;
use crate::formation::selector::HarnessSet;
use crate::navigation::grid::NavGrid;
use crate::navigation::reachability::PathReachability;

/// A physical agent or anchor
#[derive(Debug, Clone, Serialize)]
pub struct Body {
    pub id: EntityId,
    pub name: String,
    pub frame: ReferenceFrame,
}

impl Body {
    pub fn position(&self) -> Vec3 {
        self.frame.position
    }

    pub fn forward(&self) -> Vec3 {
        self.frame.forward()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TacticalKind {
    Cover,
    ThreatArea,
}

/// A sensed point of tactical interest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TacticalPoint {
    pub kind: TacticalKind,
    pub position: Vec3,
    /// Cover points carry an objective so only one soldier uses each
    pub objective: Option<ObjectiveId>,
}

/// Names a harness by its anchor and harness name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HarnessRef {
    pub anchor: EntityId,
    pub name: String,
}

impl HarnessRef {
    pub fn new(anchor: EntityId, name: impl Into<String>) -> Self {
        Self {
            anchor,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SquadWorld {
    bodies: AHashMap<EntityId, Body>,
    body_order: Vec<EntityId>,
    harness_sets: AHashMap<EntityId, HarnessSet>,
    objectives: AHashMap<ObjectiveId, Objective>,
    tactical_points: Vec<TacticalPoint>,
    commanders: AHashSet<EntityId>,
    teams: AHashMap<EntityId, String>,
    nav_grid: Option<NavGrid>,
    next_objective: u32,
    seed: u64,
    seeds_issued: u64,
}

impl SquadWorld {
    /// `seed` drives every scattered layout created in this world
    pub fn new(seed: u64) -> Self {
        Self {
            bodies: AHashMap::new(),
            body_order: Vec::new(),
            harness_sets: AHashMap::new(),
            objectives: AHashMap::new(),
            tactical_points: Vec::new(),
            commanders: AHashSet::new(),
            teams: AHashMap::new(),
            nav_grid: None,
            next_objective: 0,
            seed,
            seeds_issued: 0,
        }
    }

    /// Seed for the next randomized layout
    pub fn next_seed(&mut self) -> u64 {
        self.seeds_issued += 1;
        self.seed.wrapping_add(self.seeds_issued)
    }

    // === BODIES ===

    pub fn spawn_body(&mut self, name: impl Into<String>, frame: ReferenceFrame) -> EntityId {
        let id = EntityId::new();
        self.bodies.insert(
            id,
            Body {
                id,
                name: name.into(),
                frame,
            },
        );
        self.body_order.push(id);
        id
    }

    /// Remove a body along with anything anchored to it. Its slots and
    /// objectives elsewhere are released.
    pub fn despawn_body(&mut self, id: EntityId) -> Option<Body> {
        let body = self.bodies.remove(&id)?;
        self.body_order.retain(|b| *b != id);
        self.harness_sets.remove(&id);
        self.commanders.remove(&id);
        self.teams.remove(&id);
        for set in self.harness_sets.values_mut() {
            set.vacate_all(id);
        }
        for objective in self.objectives.values_mut() {
            objective.vacate(id);
        }
        Some(body)
    }

    pub fn body(&self, id: EntityId) -> Option<&Body> {
        self.bodies.get(&id)
    }

    pub fn body_mut(&mut self, id: EntityId) -> Option<&mut Body> {
        self.bodies.get_mut(&id)
    }

    /// Bodies in spawn order
    pub fn bodies(&self) -> impl Iterator<Item = &Body> {
        self.body_order.iter().filter_map(|id| self.bodies.get(id))
    }

    pub fn position_of(&self, id: EntityId) -> Option<Vec3> {
        self.bodies.get(&id).map(Body::position)
    }

    // === COMMAND ===

    pub fn is_commander(&self, id: EntityId) -> bool {
        self.commanders.contains(&id)
    }

    pub fn set_commander(&mut self, id: EntityId, commander: bool) {
        if commander {
            self.commanders.insert(id);
        } else {
            self.commanders.remove(&id);
        }
    }

    // === TEAMS ===

    /// Team a body is visible as. Bodies without a team are never
    /// detected as enemies.
    pub fn team_of(&self, id: EntityId) -> Option<&str> {
        self.teams.get(&id).map(String::as_str)
    }

    /// Empty names clear the team
    pub fn set_team(&mut self, id: EntityId, team: Option<&str>) {
        match team.filter(|t| !t.is_empty()) {
            Some(team) => {
                self.teams.insert(id, team.to_string());
            }
            None => {
                self.teams.remove(&id);
            }
        }
    }

    // === HARNESSES ===

    pub fn harness_set(&self, anchor: EntityId) -> Option<&HarnessSet> {
        self.harness_sets.get(&anchor)
    }

    pub fn harness_set_mut(&mut self, anchor: EntityId) -> Option<&mut HarnessSet> {
        self.harness_sets.get_mut(&anchor)
    }

    /// Harness set for `anchor`, created empty if missing
    pub fn harness_set_entry(&mut self, anchor: EntityId) -> &mut HarnessSet {
        self.harness_sets.entry(anchor).or_default()
    }

    pub fn remove_harness_set(&mut self, anchor: EntityId) -> Option<HarnessSet> {
        self.harness_sets.remove(&anchor)
    }

    /// Bind a harness to `anchor`'s current frame and attach it outside
    /// the anchor's selection
    pub fn attach_harness(&mut self, anchor: EntityId, harness: FormationHarness) -> Option<HarnessRef> {
        let frame = self.bodies.get(&anchor)?.frame;
        let harness = harness.with_frame(frame);
        let name = harness.name().to_string();
        match self.harness_set_entry(anchor).attach(harness) {
            Ok(()) => Some(HarnessRef::new(anchor, name)),
            Err(e) => {
                tracing::warn!("Could not attach harness: {}", e);
                None
            }
        }
    }

    /// Enabled harness named by `harness`
    pub fn harness(&self, harness: &HarnessRef) -> Option<&FormationHarness> {
        self.harness_sets
            .get(&harness.anchor)?
            .find_enabled(&harness.name)
    }

    pub fn harness_mut(&mut self, harness: &HarnessRef) -> Option<&mut FormationHarness> {
        self.harness_sets
            .get_mut(&harness.anchor)?
            .find_enabled_mut(&harness.name)
    }

    /// The anchor's active harness
    pub fn active_harness_ref(&self, anchor: EntityId) -> Option<HarnessRef> {
        let harness = self.harness_sets.get(&anchor)?.active_harness()?;
        Some(HarnessRef::new(anchor, harness.name()))
    }

    /// Allocate a slot on `harness` for `occupant`, filtered by path
    /// reachability from the occupant when the world has terrain
    pub fn occupy(
        &mut self,
        harness: &HarnessRef,
        strategy: SlotStrategy,
        occupant: EntityId,
        max_expansions: usize,
    ) -> Option<Slot> {
        let from = self.bodies.get(&occupant)?.frame.position;
        let reach = self
            .nav_grid
            .as_ref()
            .map(|grid| PathReachability::new(grid, from, max_expansions));
        let target = self
            .harness_sets
            .get_mut(&harness.anchor)?
            .find_enabled_mut(&harness.name)?;
        target.occupy(
            strategy,
            occupant,
            from,
            reach.as_ref().map(|r| r as &dyn ReachabilityTest),
        )
    }

    /// Release `occupant` from the named harness, enabled or not
    pub fn vacate(&mut self, harness: &HarnessRef, occupant: EntityId) {
        if let Some(target) = self
            .harness_sets
            .get_mut(&harness.anchor)
            .and_then(|set| set.get_mut(&harness.name))
        {
            target.vacate(occupant);
        }
    }

    /// Move every harness to its anchor's frame and re-apply selections
    pub fn sync_harnesses(&mut self, delta_time: f32) {
        for (anchor, set) in self.harness_sets.iter_mut() {
            if let Some(body) = self.bodies.get(anchor) {
                set.update(body.frame, delta_time);
            }
            set.pre_tick();
        }
    }

    // === TACTICAL POINTS ===

    /// Add a cover point backed by a fresh objective
    pub fn add_cover_point(&mut self, position: Vec3) -> ObjectiveId {
        let id = ObjectiveId(self.next_objective);
        self.next_objective += 1;
        self.objectives.insert(id, Objective::new(id, position));
        self.tactical_points.push(TacticalPoint {
            kind: TacticalKind::Cover,
            position,
            objective: Some(id),
        });
        id
    }

    pub fn add_threat_area(&mut self, position: Vec3) {
        self.tactical_points.push(TacticalPoint {
            kind: TacticalKind::ThreatArea,
            position,
            objective: None,
        });
    }

    pub fn tactical_points(&self, kind: TacticalKind) -> impl Iterator<Item = &TacticalPoint> {
        self.tactical_points.iter().filter(move |p| p.kind == kind)
    }

    pub fn objective(&self, id: ObjectiveId) -> Option<&Objective> {
        self.objectives.get(&id)
    }

    pub fn objective_mut(&mut self, id: ObjectiveId) -> Option<&mut Objective> {
        self.objectives.get_mut(&id)
    }

    // === TERRAIN ===

    pub fn nav_grid(&self) -> Option<&NavGrid> {
        self.nav_grid.as_ref()
    }

    pub fn set_nav_grid(&mut self, grid: NavGrid) {
        self.nav_grid = Some(grid);
    }
}

impl Default for SquadWorld {
    fn default() -> Self {
        Self::new(42)
    }
}
