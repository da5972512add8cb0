//! Team membership and the team radio channel

use crate::behavior::memory::{Memory, TEAM, TEAM_COMM};
use crate::comms::bus::CommunicationBus;
use crate::core::types::EntityId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamMembership {
    team: Option<String>,
    prefix: String,
}

impl TeamMembership {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            team: None,
            prefix: prefix.into(),
        }
    }

    pub fn team(&self) -> Option<&str> {
        self.team.as_deref()
    }

    /// Channel for the current team
    pub fn channel(&self) -> Option<String> {
        self.team.as_ref().map(|team| format!("{}{}", self.prefix, team))
    }

    /// Switch teams. Drops every team channel subscription, joins the
    /// new team's channel and records both names in memory. Re-joining
    /// the same team is a no-op unless `force` is set.
    pub fn set_team(
        &mut self,
        agent: EntityId,
        team: Option<&str>,
        force: bool,
        memory: &mut Memory,
        bus: &mut CommunicationBus,
    ) {
        let team = team.filter(|t| !t.is_empty()).map(str::to_string);
        if !force && self.team == team {
            return;
        }
        self.team = team;

        match &self.team {
            Some(team) => memory.set(TEAM, team.as_str()),
            None => {
                memory.remove(TEAM);
            }
        }

        for channel in bus.channels_of(agent) {
            if channel.starts_with(&self.prefix) {
                bus.unsubscribe(&channel, agent);
            }
        }

        match self.channel() {
            Some(channel) => {
                bus.subscribe(&channel, agent);
                memory.set(TEAM_COMM, channel);
            }
            None => {
                memory.remove(TEAM_COMM);
            }
        }
    }
}
