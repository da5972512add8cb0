//! What a behavior sees while it runs

use glam::Vec3;

use crate::behavior::memory::Memory;
use crate::comms::bus::CommunicationBus;
use crate::core::config::FormationConfig;
use crate::core::types::{EntityId, ReferenceFrame};
use crate::simulation::world::SquadWorld;

pub struct BehaviorContext<'a> {
    pub agent: EntityId,
    pub memory: &'a mut Memory,
    pub world: &'a mut SquadWorld,
    pub bus: &'a mut CommunicationBus,
    pub config: &'a FormationConfig,
    pub delta_time: f32,
}

impl<'a> BehaviorContext<'a> {
    pub fn new(
        agent: EntityId,
        memory: &'a mut Memory,
        world: &'a mut SquadWorld,
        bus: &'a mut CommunicationBus,
        config: &'a FormationConfig,
        delta_time: f32,
    ) -> Self {
        Self {
            agent,
            memory,
            world,
            bus,
            config,
            delta_time,
        }
    }

    /// The agent's own frame; identity at the origin if it has no body
    pub fn agent_frame(&self) -> ReferenceFrame {
        self.world
            .body(self.agent)
            .map(|b| b.frame)
            .unwrap_or_default()
    }

    pub fn agent_position(&self) -> Vec3 {
        self.agent_frame().position
    }

    /// Position a memory variable points at: a stored position, or the
    /// current position of a stored entity
    pub fn resolve_position(&self, variable: &str) -> Option<Vec3> {
        if let Some(position) = self.memory.position(variable) {
            return Some(position);
        }
        let entity = self.memory.entity(variable)?;
        self.world.position_of(entity)
    }
}
