//! Pick where to look while in cover

use glam::Vec3;

use crate::behavior::context::BehaviorContext;
use crate::behavior::memory::{ENEMY, FACE_TARGET};
use crate::behavior::{ActionResult, Behavior};
use crate::navigation::pathfinding::find_path;
use crate::simulation::world::TacticalKind;

/// Faces the enemy, or the nearest threat area when no enemy is known.
/// With terrain, faces the first step of the path toward that point, so
/// soldiers look down the route a threat would take.
#[derive(Debug, Clone)]
pub struct CoverFaceDirection {
    enemy_variable: String,
    face_variable: String,
}

impl Default for CoverFaceDirection {
    fn default() -> Self {
        Self {
            enemy_variable: ENEMY.into(),
            face_variable: FACE_TARGET.into(),
        }
    }
}

impl CoverFaceDirection {
    pub fn new() -> Self {
        Self::default()
    }

    fn nearest_threat_area(ctx: &BehaviorContext<'_>) -> Option<Vec3> {
        let own_position = ctx.agent_position();
        let mut best: Option<(Vec3, f32)> = None;
        for point in ctx.world.tactical_points(TacticalKind::ThreatArea) {
            let cost = own_position.distance(point.position);
            if best.map_or(true, |(_, c)| cost < c) {
                best = Some((point.position, cost));
            }
        }
        best.map(|(position, _)| position)
    }
}

impl Behavior for CoverFaceDirection {
    fn name(&self) -> &str {
        "cover_face_direction"
    }

    fn execute(&mut self, ctx: &mut BehaviorContext<'_>) -> ActionResult {
        let target = ctx
            .resolve_position(&self.enemy_variable)
            .or_else(|| Self::nearest_threat_area(ctx));
        let Some(mut face) = target else {
            ctx.memory.remove(&self.face_variable);
            return ActionResult::Success;
        };

        if let Some(grid) = ctx.world.nav_grid() {
            let path = find_path(grid, ctx.agent_position(), face, ctx.config.path_max_expansions);
            if let Some(next) = path.and_then(|p| p.next_waypoint()) {
                face = next;
            }
        }

        ctx.memory.set(&self.face_variable, face);
        ActionResult::Success
    }
}
