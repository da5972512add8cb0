//! Slot bookkeeping shared by behaviors that hold a harness slot

use glam::Vec3;

use crate::core::types::{EntityId, Slot};
use crate::formation::allocation::SlotStrategy;
use crate::simulation::world::{HarnessRef, SquadWorld};

/// The harness a behavior is bound to and the slot it believes it holds
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotBinding {
    harness: Option<HarnessRef>,
    slot: Option<Slot>,
}

impl SlotBinding {
    pub fn harness(&self) -> Option<&HarnessRef> {
        self.harness.as_ref()
    }

    pub fn slot(&self) -> Option<Slot> {
        self.slot
    }

    /// Bound to a harness that still exists and is enabled
    pub fn is_live(&self, world: &SquadWorld) -> bool {
        self.harness
            .as_ref()
            .map_or(false, |h| world.harness(h).is_some())
    }

    /// Give up the slot but stay bound to the harness
    pub fn vacate(&mut self, world: &mut SquadWorld, agent: EntityId) {
        self.slot = None;
        if let Some(harness) = &self.harness {
            world.vacate(harness, agent);
        }
    }

    /// Switch harnesses, vacating the old one first
    pub fn rebind(&mut self, world: &mut SquadWorld, agent: EntityId, harness: Option<HarnessRef>) {
        if self.harness != harness {
            self.vacate(world, agent);
            self.harness = harness;
        }
    }

    /// Vacate and unbind
    pub fn release(&mut self, world: &mut SquadWorld, agent: EntityId) {
        self.vacate(world, agent);
        self.harness = None;
    }

    /// Forget a slot the harness no longer credits to `agent`
    pub fn drop_if_stale(&mut self, world: &mut SquadWorld, agent: EntityId) {
        let Some(slot) = self.slot else {
            return;
        };
        let holds = self
            .harness
            .as_ref()
            .and_then(|h| world.harness(h))
            .map_or(false, |h| h.holds(agent, slot));
        if !holds {
            tracing::warn!("{:?} lost slot {}, reallocating", agent, slot);
            self.vacate(world, agent);
        }
    }

    /// Allocate a slot if none is held
    pub fn ensure_slot(
        &mut self,
        world: &mut SquadWorld,
        agent: EntityId,
        strategy: SlotStrategy,
        max_expansions: usize,
    ) -> Option<Slot> {
        if self.slot.is_none() {
            if let Some(harness) = &self.harness {
                self.slot = world.occupy(harness, strategy, agent, max_expansions);
            }
        }
        self.slot
    }

    /// World position of the held slot
    pub fn slot_position(&self, world: &SquadWorld) -> Option<Vec3> {
        let slot = self.slot?;
        let harness = world.harness(self.harness.as_ref()?)?;
        Some(harness.slot_position(slot))
    }
}
