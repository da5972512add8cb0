//! Walk or run to keep up with a moving formation slot

use glam::Vec3;

use crate::behavior::context::BehaviorContext;
use crate::behavior::memory::{MOVE_SPEED, MOVE_TARGET};
use crate::behavior::{ActionResult, Behavior};

/// Runs once the target is farther than the max distance and keeps
/// running until within close-enough distance, then walks. Never
/// finishes on its own.
#[derive(Debug, Clone)]
pub struct PatrolSpeed {
    move_target_variable: String,
    move_speed_variable: String,
    at_target: bool,
}

impl Default for PatrolSpeed {
    fn default() -> Self {
        Self {
            move_target_variable: MOVE_TARGET.into(),
            move_speed_variable: MOVE_SPEED.into(),
            at_target: false,
        }
    }
}

impl PatrolSpeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_at_target(&self) -> bool {
        self.at_target
    }
}

impl Behavior for PatrolSpeed {
    fn name(&self) -> &str {
        "patrol_speed"
    }

    fn start(&mut self, _ctx: &mut BehaviorContext<'_>) {
        self.at_target = false;
    }

    fn execute(&mut self, ctx: &mut BehaviorContext<'_>) -> ActionResult {
        let Some(target) = ctx.resolve_position(&self.move_target_variable) else {
            return ActionResult::Failure;
        };

        let max_distance = ctx.config.effective_max_distance();
        let close_enough = ctx.config.close_enough_distance;

        // Height differences don't count
        let offset = ctx.agent_position() - target;
        let distance = Vec3::new(offset.x, 0.0, offset.z).length();

        let speed = if distance > max_distance {
            self.at_target = false;
            ctx.config.run_speed
        } else if !self.at_target && distance > close_enough {
            ctx.config.run_speed
        } else {
            self.at_target = true;
            ctx.config.walk_speed
        };
        ctx.memory.set(&self.move_speed_variable, speed);
        ActionResult::Running
    }
}
