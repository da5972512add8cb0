//! Follow a slot in the commander's active formation
//!
//! The commander is read from memory every tick. A new commander, or a
//! harness that has been switched off, triggers a rebind to whatever
//! harness is now active, vacating the old slot first.

use glam::Vec3;

use crate::behavior::context::BehaviorContext;
use crate::behavior::memory::{COMMANDER, FACE_TARGET, MOVE_TARGET};
use crate::behavior::slot_binding::SlotBinding;
use crate::behavior::{ActionResult, Behavior};
use crate::core::types::{EntityId, Slot};
use crate::formation::allocation::SlotStrategy;

#[derive(Debug, Clone)]
pub struct FormationFollow {
    commander_variable: String,
    move_target_variable: String,
    face_target_variable: Option<String>,
    strategy: SlotStrategy,
    commander: Option<EntityId>,
    binding: SlotBinding,
}

impl FormationFollow {
    pub fn new(strategy: SlotStrategy) -> Self {
        Self {
            commander_variable: COMMANDER.into(),
            move_target_variable: MOVE_TARGET.into(),
            face_target_variable: Some(FACE_TARGET.into()),
            strategy,
            commander: None,
            binding: SlotBinding::default(),
        }
    }

    pub fn with_face_target(mut self, variable: Option<&str>) -> Self {
        self.face_target_variable = variable.map(str::to_string);
        self
    }

    pub fn slot(&self) -> Option<Slot> {
        self.binding.slot()
    }

    fn update_commander(&mut self, ctx: &mut BehaviorContext<'_>) {
        let commander = ctx.memory.entity(&self.commander_variable);
        if commander != self.commander {
            tracing::info!("{:?} now follows {:?}", ctx.agent, commander);
            self.commander = commander;
            self.swap_harness(ctx);
        } else if !self.binding.is_live(ctx.world) {
            self.swap_harness(ctx);
        }
    }

    fn swap_harness(&mut self, ctx: &mut BehaviorContext<'_>) {
        let next = self
            .commander
            .and_then(|commander| ctx.world.active_harness_ref(commander));
        self.binding.rebind(ctx.world, ctx.agent, next);
    }

    /// Once in place, or when the slot is behind an agent already facing
    /// the formation's way, keep facing the formation's heading.
    /// Otherwise face the slot.
    fn face_target(&self, ctx: &BehaviorContext<'_>, slot_position: Vec3) -> Vec3 {
        let agent = ctx.agent_frame();
        let Some(harness) = self.binding.harness().and_then(|h| ctx.world.harness(h)) else {
            return slot_position;
        };
        let harness_forward = harness.frame().forward();
        let heading = agent.position + harness_forward;

        if agent.position.distance(slot_position) <= ctx.config.close_enough_distance {
            return heading;
        }

        let dot_harness = harness_forward.dot(agent.forward());
        let dot_position = (slot_position - agent.position).dot(agent.forward());
        if dot_harness >= 0.0 && dot_position < 0.0 {
            heading
        } else {
            slot_position
        }
    }
}

impl Behavior for FormationFollow {
    fn name(&self) -> &str {
        "formation_follow"
    }

    fn start(&mut self, ctx: &mut BehaviorContext<'_>) {
        self.update_commander(ctx);
    }

    fn execute(&mut self, ctx: &mut BehaviorContext<'_>) -> ActionResult {
        self.update_commander(ctx);
        if self.binding.harness().is_none() {
            return ActionResult::Failure;
        }

        self.binding.drop_if_stale(ctx.world, ctx.agent);
        let max_expansions = ctx.config.path_max_expansions;
        if self
            .binding
            .ensure_slot(ctx.world, ctx.agent, self.strategy, max_expansions)
            .is_none()
        {
            return ActionResult::Failure;
        }
        let Some(position) = self.binding.slot_position(ctx.world) else {
            return ActionResult::Failure;
        };

        if let Some(variable) = &self.face_target_variable {
            let face = self.face_target(ctx, position);
            ctx.memory.set(variable, face);
        }
        ctx.memory.set(&self.move_target_variable, position);
        ActionResult::Running
    }

    fn stop(&mut self, ctx: &mut BehaviorContext<'_>) {
        self.binding.release(ctx.world, ctx.agent);
        self.commander = None;
    }
}
