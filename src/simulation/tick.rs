//! Simulation driver
//!
//! One synchronous tick: move every harness to its anchor, then let each
//! agent in turn read its messages, think, and take a step. Agents are
//! processed in spawn order, so the earlier agent wins a contested slot.

use glam::{Quat, Vec3};

use crate::behavior::context::BehaviorContext;
use crate::behavior::memory::{Memory, FACE_TARGET, MOVE_SPEED, MOVE_TARGET};
use crate::behavior::{ActionResult, Behavior};
use crate::comms::bus::CommunicationBus;
use crate::core::config::FormationConfig;
use crate::core::types::{EntityId, ReferenceFrame, Tick};
use crate::simulation::agent::Agent;
use crate::simulation::world::SquadWorld;

/// Smallest planar distance treated as movement
const MIN_STEP: f32 = 1e-4;

/// Events generated during a tick
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationEvent {
    /// A behavior returned something other than Running
    BehaviorFinished {
        agent: EntityId,
        behavior: String,
        result: ActionResult,
    },
}

pub struct SquadSimulation {
    pub world: SquadWorld,
    pub bus: CommunicationBus,
    config: FormationConfig,
    agents: Vec<Agent>,
    current_tick: Tick,
}

impl SquadSimulation {
    pub fn new(config: FormationConfig, seed: u64) -> Self {
        Self {
            world: SquadWorld::new(seed),
            bus: CommunicationBus::new(),
            config,
            agents: Vec::new(),
            current_tick: 0,
        }
    }

    pub fn config(&self) -> &FormationConfig {
        &self.config
    }

    pub fn current_tick(&self) -> Tick {
        self.current_tick
    }

    /// Spawn a body with an agent attached
    pub fn spawn_agent(&mut self, name: impl Into<String>, frame: ReferenceFrame) -> EntityId {
        let id = self.world.spawn_body(name, frame);
        self.agents
            .push(Agent::new(id, &self.config.team_comm_prefix));
        id
    }

    pub fn agent(&self, id: EntityId) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn agent_mut(&mut self, id: EntityId) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|a| a.id == id)
    }

    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter()
    }

    /// Add a behavior. If the agent is already running it starts now.
    pub fn add_behavior(&mut self, id: EntityId, mut behavior: Box<dyn Behavior>) {
        let Some(agent) = self.agents.iter_mut().find(|a| a.id == id) else {
            tracing::warn!("No agent {:?} to add '{}' to", id, behavior.name());
            return;
        };
        if agent.started {
            let mut ctx = BehaviorContext::new(
                agent.id,
                &mut agent.memory,
                &mut self.world,
                &mut self.bus,
                &self.config,
                0.0,
            );
            behavior.start(&mut ctx);
        }
        agent.behaviors.push(behavior);
    }

    /// Stop and remove every behavior of an agent
    pub fn clear_behaviors(&mut self, id: EntityId) {
        let Some(agent) = self.agents.iter_mut().find(|a| a.id == id) else {
            return;
        };
        let mut ctx = BehaviorContext::new(
            agent.id,
            &mut agent.memory,
            &mut self.world,
            &mut self.bus,
            &self.config,
            0.0,
        );
        for behavior in agent.behaviors.iter_mut() {
            behavior.stop(&mut ctx);
        }
        agent.behaviors.clear();
        agent.last_results.clear();
        agent.started = false;
    }

    /// Stop and remove a single behavior by name
    pub fn remove_behavior(&mut self, id: EntityId, name: &str) -> bool {
        let Some(agent) = self.agents.iter_mut().find(|a| a.id == id) else {
            return false;
        };
        let Some(index) = agent.behaviors.iter().position(|b| b.name() == name) else {
            return false;
        };
        let mut behavior = agent.behaviors.remove(index);
        let mut ctx = BehaviorContext::new(
            agent.id,
            &mut agent.memory,
            &mut self.world,
            &mut self.bus,
            &self.config,
            0.0,
        );
        behavior.stop(&mut ctx);
        true
    }

    /// Put an agent on a team; `None` leaves its current team. The world
    /// sees the same team so other agents can detect it.
    pub fn set_team(&mut self, id: EntityId, team: Option<&str>) {
        if let Some(agent) = self.agents.iter_mut().find(|a| a.id == id) {
            agent
                .team
                .set_team(id, team, false, &mut agent.memory, &mut self.bus);
            self.world.set_team(id, agent.team.team());
        }
    }

    /// Stop an agent's behaviors and remove it and its body
    pub fn remove_agent(&mut self, id: EntityId) {
        self.clear_behaviors(id);
        self.agents.retain(|a| a.id != id);
        self.bus.forget(id);
        self.world.despawn_body(id);
    }

    /// Advance one tick
    pub fn tick(&mut self, delta_time: f32) -> Vec<SimulationEvent> {
        let mut events = Vec::new();
        self.world.sync_harnesses(delta_time);

        for agent in self.agents.iter_mut() {
            self.bus.drain_into(agent.id, &mut agent.memory);

            let mut ctx = BehaviorContext::new(
                agent.id,
                &mut agent.memory,
                &mut self.world,
                &mut self.bus,
                &self.config,
                delta_time,
            );
            if !agent.started {
                for behavior in agent.behaviors.iter_mut() {
                    behavior.start(&mut ctx);
                }
                agent.started = true;
            }

            agent.last_results.clear();
            for behavior in agent.behaviors.iter_mut() {
                let result = behavior.execute(&mut ctx);
                if result != ActionResult::Running {
                    events.push(SimulationEvent::BehaviorFinished {
                        agent: agent.id,
                        behavior: behavior.name().to_string(),
                        result,
                    });
                }
                agent
                    .last_results
                    .push((behavior.name().to_string(), result));
            }

            step_body(&mut self.world, agent.id, &agent.memory, &self.config, delta_time);
        }

        self.current_tick += 1;
        events
    }

    /// Run `ticks` ticks and return every event
    pub fn run(&mut self, ticks: u64, delta_time: f32) -> Vec<SimulationEvent> {
        let mut events = Vec::new();
        for _ in 0..ticks {
            events.extend(self.tick(delta_time));
        }
        events
    }
}

fn resolve(world: &SquadWorld, memory: &Memory, variable: &str) -> Option<Vec3> {
    memory
        .position(variable)
        .or_else(|| memory.entity(variable).and_then(|e| world.position_of(e)))
}

/// Move toward the move target at the remembered speed and turn toward
/// the face target, or the direction of travel when there is none
fn step_body(
    world: &mut SquadWorld,
    id: EntityId,
    memory: &Memory,
    config: &FormationConfig,
    delta_time: f32,
) {
    let move_target = resolve(world, memory, MOVE_TARGET);
    let face_target = resolve(world, memory, FACE_TARGET);
    let speed = memory.float(MOVE_SPEED).unwrap_or(config.walk_speed);

    let Some(body) = world.body_mut(id) else {
        return;
    };

    let mut heading = None;
    if let Some(target) = move_target {
        let mut to_target = target - body.frame.position;
        to_target.y = 0.0;
        let distance = to_target.length();
        if distance > MIN_STEP {
            let step = (speed * delta_time).min(distance);
            body.frame.position += to_target / distance * step;
            heading = Some(to_target);
        }
    }

    if let Some(face) = face_target {
        let mut to_face = face - body.frame.position;
        to_face.y = 0.0;
        if to_face.length() > MIN_STEP {
            heading = Some(to_face);
        }
    }

    if let Some(direction) = heading {
        body.frame.rotation = Quat::from_rotation_y(direction.x.atan2(direction.z));
    }
}
