//! Pick an attack position around the current enemy
//!
//! Attackers share a scattered harness hung on the enemy. The first
//! attacker to arrive creates it from the configured preset.

use crate::behavior::context::BehaviorContext;
use crate::behavior::memory::{ENEMY, ENEMY_POSITION, MOVE_TARGET};
use crate::behavior::slot_binding::SlotBinding;
use crate::behavior::{ActionResult, Behavior};
use crate::core::types::{EntityId, Slot};
use crate::formation::allocation::SlotStrategy;
use crate::simulation::world::HarnessRef;

#[derive(Debug, Clone)]
pub struct AttackPosition {
    enemy_variable: String,
    enemy_position_variable: String,
    move_target_variable: String,
    strategy: SlotStrategy,
    enemy: Option<EntityId>,
    binding: SlotBinding,
}

impl AttackPosition {
    pub fn new(strategy: SlotStrategy) -> Self {
        Self {
            enemy_variable: ENEMY.into(),
            enemy_position_variable: ENEMY_POSITION.into(),
            move_target_variable: MOVE_TARGET.into(),
            strategy,
            enemy: None,
            binding: SlotBinding::default(),
        }
    }

    pub fn slot(&self) -> Option<Slot> {
        self.binding.slot()
    }

    pub fn harness(&self) -> Option<&HarnessRef> {
        self.binding.harness()
    }

    fn update_enemy(&mut self, ctx: &mut BehaviorContext<'_>) {
        let enemy = ctx.memory.entity(&self.enemy_variable);
        if enemy != self.enemy {
            self.enemy = enemy;
            self.swap_harness(ctx);
        } else if !self.binding.is_live(ctx.world) {
            self.swap_harness(ctx);
        }
    }

    fn swap_harness(&mut self, ctx: &mut BehaviorContext<'_>) {
        self.binding.release(ctx.world, ctx.agent);
        let Some(enemy) = self.enemy else {
            return;
        };

        let name = ctx.config.attack_harness.name.as_str();
        let existing = ctx
            .world
            .harness_set(enemy)
            .and_then(|set| set.find_enabled(name))
            .map(|h| HarnessRef::new(enemy, h.name()));

        let harness = match existing {
            Some(harness) => Some(harness),
            None => {
                let seed = ctx.world.next_seed();
                let created = ctx.world.attach_harness(enemy, ctx.config.attack_harness.build(seed));
                if created.is_some() {
                    tracing::info!("Created '{}' harness on {:?}", name, enemy);
                }
                created
            }
        };
        self.binding.rebind(ctx.world, ctx.agent, harness);
    }
}

impl Behavior for AttackPosition {
    fn name(&self) -> &str {
        "attack_position"
    }

    fn start(&mut self, ctx: &mut BehaviorContext<'_>) {
        self.update_enemy(ctx);
    }

    fn execute(&mut self, ctx: &mut BehaviorContext<'_>) -> ActionResult {
        self.update_enemy(ctx);

        if self.binding.harness().is_some() {
            self.binding.drop_if_stale(ctx.world, ctx.agent);
            let max_expansions = ctx.config.path_max_expansions;
            self.binding
                .ensure_slot(ctx.world, ctx.agent, self.strategy, max_expansions);
        }

        let agent = ctx.agent_frame();
        let target = match self.binding.slot_position(ctx.world) {
            Some(position) => position,
            None => match ctx.memory.position(&self.enemy_position_variable) {
                // Close in on the last sighting
                Some(last_seen) => last_seen - agent.forward(),
                None => agent.position,
            },
        };
        ctx.memory.set(&self.move_target_variable, target);
        ActionResult::Running
    }

    fn stop(&mut self, ctx: &mut BehaviorContext<'_>) {
        self.binding.release(ctx.world, ctx.agent);
        self.enemy = None;
    }
}
