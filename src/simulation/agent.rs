//! A thinking agent: body id, working memory, team and behaviors

use crate::behavior::memory::Memory;
use crate::behavior::{ActionResult, Behavior};
use crate::comms::team::TeamMembership;
use crate::core::types::EntityId;

pub struct Agent {
    pub id: EntityId,
    pub memory: Memory,
    pub team: TeamMembership,
    pub(crate) behaviors: Vec<Box<dyn Behavior>>,
    pub(crate) started: bool,
    /// Result of each behavior on the last tick, in run order
    pub last_results: Vec<(String, ActionResult)>,
}

impl Agent {
    pub fn new(id: EntityId, team_comm_prefix: &str) -> Self {
        Self {
            id,
            memory: Memory::new(),
            team: TeamMembership::new(team_comm_prefix),
            behaviors: Vec::new(),
            started: false,
            last_results: Vec::new(),
        }
    }

    pub fn behavior_names(&self) -> Vec<&str> {
        self.behaviors.iter().map(|b| b.name()).collect()
    }

    pub fn result_of(&self, behavior: &str) -> Option<ActionResult> {
        self.last_results
            .iter()
            .find(|(name, _)| name == behavior)
            .map(|(_, result)| *result)
    }
}
