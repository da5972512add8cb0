//! Broadcast a variable on a channel

use crate::behavior::context::BehaviorContext;
use crate::behavior::memory::MemoryValue;
use crate::behavior::{ActionResult, Behavior};

/// Where a value or channel name comes from
#[derive(Debug, Clone, PartialEq)]
pub enum Source<T> {
    Literal(T),
    /// Read from the sender's memory when the message goes out
    Variable(String),
}

#[derive(Debug, Clone)]
pub struct Communicate {
    channel: Source<String>,
    variable: String,
    value: Source<MemoryValue>,
}

impl Communicate {
    pub fn new(channel: Source<String>, variable: impl Into<String>, value: Source<MemoryValue>) -> Self {
        Self {
            channel,
            variable: variable.into(),
            value,
        }
    }

    /// Pass on the sender's own value of `variable` under the same name
    pub fn relay(channel: Source<String>, variable: impl Into<String>) -> Self {
        let variable = variable.into();
        Self {
            channel,
            value: Source::Variable(variable.clone()),
            variable,
        }
    }
}

impl Behavior for Communicate {
    fn name(&self) -> &str {
        "communicate"
    }

    fn execute(&mut self, ctx: &mut BehaviorContext<'_>) -> ActionResult {
        let channel = match &self.channel {
            Source::Literal(channel) => Some(channel.clone()),
            Source::Variable(name) => ctx.memory.text(name).map(str::to_string),
        };
        let value = match &self.value {
            Source::Literal(value) => Some(value.clone()),
            Source::Variable(name) => ctx.memory.get(name).cloned(),
        };

        // Nothing to say is not a failure
        if let (Some(channel), Some(value)) = (channel, value) {
            ctx.bus.broadcast(&channel, &self.variable, value);
        }
        ActionResult::Success
    }
}
