//! Spot the nearest body on another team

use crate::behavior::context::BehaviorContext;
use crate::behavior::memory::ENEMY;
use crate::behavior::{ActionResult, Behavior};
use crate::core::types::EntityId;

/// Writes the nearest visible body of another team into the enemy
/// variable. The enemy from the last tick is kept while it stays in
/// range and on another team, even if someone closer shows up, so
/// targets don't flicker between equally near threats.
///
/// Fails, and clears the variable, when the agent has no team or sees
/// no enemy.
#[derive(Debug, Clone)]
pub struct DetectEnemy {
    enemy_variable: String,
    current: Option<EntityId>,
}

impl Default for DetectEnemy {
    fn default() -> Self {
        Self {
            enemy_variable: ENEMY.into(),
            current: None,
        }
    }
}

impl DetectEnemy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enemy_variable(mut self, variable: impl Into<String>) -> Self {
        self.enemy_variable = variable.into();
        self
    }

    pub fn current(&self) -> Option<EntityId> {
        self.current
    }

    /// Distance to `other` if it is a detectable enemy
    fn enemy_distance(ctx: &BehaviorContext<'_>, own_team: &str, other: EntityId) -> Option<f32> {
        if other == ctx.agent {
            return None;
        }
        let team = ctx.world.team_of(other)?;
        if team == own_team {
            return None;
        }
        let distance = ctx.agent_position().distance(ctx.world.position_of(other)?);
        (distance <= ctx.config.detection_range).then_some(distance)
    }

    fn detect(&self, ctx: &BehaviorContext<'_>) -> Option<EntityId> {
        let own_team = ctx.world.team_of(ctx.agent)?;

        if let Some(previous) = self.current {
            if Self::enemy_distance(ctx, own_team, previous).is_some() {
                return Some(previous);
            }
        }

        let mut best: Option<(EntityId, f32)> = None;
        for body in ctx.world.bodies() {
            let Some(distance) = Self::enemy_distance(ctx, own_team, body.id) else {
                continue;
            };
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((body.id, distance));
            }
        }
        best.map(|(id, _)| id)
    }
}

impl Behavior for DetectEnemy {
    fn name(&self) -> &str {
        "detect_enemy"
    }

    fn execute(&mut self, ctx: &mut BehaviorContext<'_>) -> ActionResult {
        let detected = self.detect(ctx);
        if detected != self.current {
            tracing::debug!("{:?} now targets {:?}", ctx.agent, detected);
        }
        self.current = detected;

        match detected {
            Some(enemy) => {
                ctx.memory.set(&self.enemy_variable, enemy);
                ActionResult::Success
            }
            None => {
                ctx.memory.remove(&self.enemy_variable);
                ActionResult::Failure
            }
        }
    }
}
