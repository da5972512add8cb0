//! Claim the best free cover point relative to the threat

use glam::Vec3;

use crate::behavior::context::BehaviorContext;
use crate::behavior::memory::{COVER, ENEMY};
use crate::behavior::{ActionResult, Behavior};
use crate::core::types::ObjectiveId;
use crate::simulation::world::TacticalKind;

#[derive(Debug, Clone)]
pub struct FindCoverPoint {
    enemy_variable: String,
    cover_variable: String,
    current: Option<ObjectiveId>,
}

impl Default for FindCoverPoint {
    fn default() -> Self {
        Self {
            enemy_variable: ENEMY.into(),
            cover_variable: COVER.into(),
            current: None,
        }
    }
}

impl FindCoverPoint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the chosen position somewhere other than `cover`, e.g.
    /// straight into the move target
    pub fn with_cover_variable(mut self, variable: impl Into<String>) -> Self {
        self.cover_variable = variable.into();
        self
    }

    pub fn current(&self) -> Option<ObjectiveId> {
        self.current
    }

    /// Lower is better
    pub fn cover_cost(ctx: &BehaviorContext<'_>, threat: Vec3, candidate: Vec3) -> f32 {
        ctx.config.cover_threat_weight * threat.distance(candidate)
            + ctx.config.cover_self_weight * ctx.agent_position().distance(candidate)
    }

    fn find_best(&mut self, ctx: &mut BehaviorContext<'_>) {
        let own_position = ctx.agent_position();
        let threat = ctx
            .resolve_position(&self.enemy_variable)
            .unwrap_or(own_position);

        let mut best: Option<(ObjectiveId, Vec3, f32)> = None;
        for point in ctx.world.tactical_points(TacticalKind::Cover) {
            let Some(id) = point.objective else {
                continue;
            };
            if ctx.world.objective(id).map_or(true, |o| o.is_occupied()) {
                continue;
            }
            let cost = Self::cover_cost(ctx, threat, point.position);
            if best.map_or(true, |(_, _, c)| cost < c) {
                best = Some((id, point.position, cost));
            }
        }

        let mut cover_position = own_position;
        if let Some((id, position, _)) = best {
            if let Some(objective) = ctx.world.objective_mut(id) {
                if objective.occupy(ctx.agent, false) {
                    self.current = Some(id);
                    cover_position = position;
                    tracing::debug!("{:?} took cover point {:?}", ctx.agent, id);
                }
            }
        }
        ctx.memory.set(&self.cover_variable, cover_position);
    }

    fn vacate(&mut self, ctx: &mut BehaviorContext<'_>) {
        if let Some(id) = self.current.take() {
            if let Some(objective) = ctx.world.objective_mut(id) {
                objective.vacate(ctx.agent);
            }
        }
    }
}

impl Behavior for FindCoverPoint {
    fn name(&self) -> &str {
        "find_cover_point"
    }

    fn start(&mut self, ctx: &mut BehaviorContext<'_>) {
        self.vacate(ctx);
        self.find_best(ctx);
    }

    fn execute(&mut self, ctx: &mut BehaviorContext<'_>) -> ActionResult {
        let holds = self
            .current
            .and_then(|id| ctx.world.objective(id))
            .map_or(false, |o| o.occupant() == Some(ctx.agent));
        if holds {
            ActionResult::Running
        } else {
            ActionResult::Failure
        }
    }

    fn stop(&mut self, ctx: &mut BehaviorContext<'_>) {
        self.vacate(ctx);
    }
}
