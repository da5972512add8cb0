//! Become a formation anchor

use crate::behavior::context::BehaviorContext;
use crate::behavior::{ActionResult, Behavior};

/// Hangs the configured commander harnesses on the agent with the
/// default formation active. Runs until stopped; stopping takes the
/// harnesses away again, which strands no one because followers notice
/// their harness is gone and let go.
#[derive(Debug, Clone, Default)]
pub struct TakeCommand {
    in_command: bool,
}

impl TakeCommand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_command(&self) -> bool {
        self.in_command
    }
}

impl Behavior for TakeCommand {
    fn name(&self) -> &str {
        "take_command"
    }

    fn start(&mut self, ctx: &mut BehaviorContext<'_>) {
        let Some(frame) = ctx.world.body(ctx.agent).map(|b| b.frame) else {
            tracing::warn!("{:?} has no body to command from", ctx.agent);
            return;
        };

        let mut harnesses = Vec::with_capacity(ctx.config.commander_harnesses.len());
        for spec in &ctx.config.commander_harnesses {
            let seed = ctx.world.next_seed();
            harnesses.push(spec.build(seed).with_frame(frame));
        }

        let set = ctx.world.harness_set_entry(ctx.agent);
        for harness in harnesses {
            if let Err(e) = set.register(harness) {
                tracing::warn!("Skipping commander harness: {}", e);
            }
        }
        set.set_active(&ctx.config.default_formation);

        ctx.world.set_commander(ctx.agent, true);
        self.in_command = true;
        tracing::info!("{:?} took command", ctx.agent);
    }

    fn execute(&mut self, _ctx: &mut BehaviorContext<'_>) -> ActionResult {
        ActionResult::Running
    }

    fn stop(&mut self, ctx: &mut BehaviorContext<'_>) {
        if !self.in_command {
            return;
        }
        if let Some(set) = ctx.world.harness_set_mut(ctx.agent) {
            set.clear_selectable();
            if set.is_empty() {
                ctx.world.remove_harness_set(ctx.agent);
            }
        }
        ctx.world.set_commander(ctx.agent, false);
        self.in_command = false;
        tracing::info!("{:?} gave up command", ctx.agent);
    }
}
