//! Agent behaviors that consume formation slots and objectives
//!
//! Each behavior runs `start` once, `execute` every tick, and `stop`
//! when it is removed. `stop` must release anything the behavior holds.

pub mod attack_position;
pub mod communicate;
pub mod context;
pub mod cover_face;
pub mod cover_point;
pub mod detect_enemy;
pub mod formation_follow;
pub mod memory;
pub mod patrol_speed;
pub mod slot_binding;
pub mod take_command;

use serde::Serialize;

pub use attack_position::AttackPosition;
pub use communicate::Communicate;
pub use context::BehaviorContext;
pub use cover_face::CoverFaceDirection;
pub use cover_point::FindCoverPoint;
pub use detect_enemy::DetectEnemy;
pub use formation_follow::FormationFollow;
pub use memory::{Memory, MemoryValue};
pub use patrol_speed::PatrolSpeed;
pub use take_command::TakeCommand;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ActionResult {
    Running,
    Success,
    Failure,
}

pub trait Behavior {
    /// Name for logs and reports
    fn name(&self) -> &str;

    fn start(&mut self, _ctx: &mut BehaviorContext<'_>) {}

    fn execute(&mut self, ctx: &mut BehaviorContext<'_>) -> ActionResult;

    fn stop(&mut self, _ctx: &mut BehaviorContext<'_>) {}
}
