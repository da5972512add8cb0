//! Channel-based message bus
//!
//! Messages are queued per recipient and land in the recipient's working
//! memory when its turn comes up, so delivery order within a tick never
//! depends on who happened to be processed first.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::behavior::memory::{Memory, MemoryValue};
use crate::core::types::EntityId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub channel: String,
    /// Set for direct messages only
    pub sender: Option<EntityId>,
    pub variable: String,
    pub value: MemoryValue,
}

#[derive(Debug, Clone, Default)]
pub struct CommunicationBus {
    subscribers: AHashMap<String, Vec<EntityId>>,
    inboxes: AHashMap<EntityId, Vec<Message>>,
}

impl CommunicationBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty channel names are ignored
    pub fn subscribe(&mut self, channel: &str, subscriber: EntityId) {
        if channel.is_empty() {
            return;
        }
        let list = self.subscribers.entry(channel.to_string()).or_default();
        if !list.contains(&subscriber) {
            list.push(subscriber);
        }
    }

    pub fn unsubscribe(&mut self, channel: &str, subscriber: EntityId) {
        if let Some(list) = self.subscribers.get_mut(channel) {
            list.retain(|s| *s != subscriber);
        }
    }

    pub fn is_subscribed(&self, channel: &str, subscriber: EntityId) -> bool {
        self.subscribers
            .get(channel)
            .map_or(false, |list| list.contains(&subscriber))
    }

    /// Channels `subscriber` listens to, sorted
    pub fn channels_of(&self, subscriber: EntityId) -> Vec<String> {
        let mut channels: Vec<String> = self
            .subscribers
            .iter()
            .filter(|(_, list)| list.contains(&subscriber))
            .map(|(channel, _)| channel.clone())
            .collect();
        channels.sort();
        channels
    }

    /// Queue a variable update for every subscriber of `channel`.
    /// Returns the number of recipients.
    pub fn broadcast(&mut self, channel: &str, variable: &str, value: MemoryValue) -> usize {
        if channel.is_empty() || variable.is_empty() {
            return 0;
        }
        let Some(list) = self.subscribers.get(channel) else {
            return 0;
        };

        for recipient in list {
            self.inboxes.entry(*recipient).or_default().push(Message {
                channel: channel.to_string(),
                sender: None,
                variable: variable.to_string(),
                value: value.clone(),
            });
        }
        tracing::debug!("Broadcast '{}' on '{}' to {} listeners", variable, channel, list.len());
        list.len()
    }

    /// Queue a variable update for a single recipient, subscribed or not
    pub fn send_to(
        &mut self,
        sender: EntityId,
        receiver: EntityId,
        channel: &str,
        variable: &str,
        value: MemoryValue,
    ) {
        if variable.is_empty() {
            return;
        }
        self.inboxes.entry(receiver).or_default().push(Message {
            channel: channel.to_string(),
            sender: Some(sender),
            variable: variable.to_string(),
            value,
        });
    }

    pub fn pending(&self, recipient: EntityId) -> usize {
        self.inboxes.get(&recipient).map_or(0, Vec::len)
    }

    /// Apply queued messages to `memory` in arrival order.
    /// Returns how many were applied.
    pub fn drain_into(&mut self, recipient: EntityId, memory: &mut Memory) -> usize {
        let Some(messages) = self.inboxes.remove(&recipient) else {
            return 0;
        };
        let count = messages.len();
        for message in messages {
            memory.set(&message.variable, message.value);
        }
        count
    }

    /// Drop a departing agent's subscriptions and queued messages
    pub fn forget(&mut self, subscriber: EntityId) {
        for list in self.subscribers.values_mut() {
            list.retain(|s| *s != subscriber);
        }
        self.inboxes.remove(&subscriber);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_broadcast_reaches_subscribers_only() {
        let mut bus = CommunicationBus::new();
        let (a, b, c) = (EntityId::new(), EntityId::new(), EntityId::new());
        bus.subscribe("teamcommblue", a);
        bus.subscribe("teamcommblue", b);
        bus.subscribe("teamcommblue", b);
        bus.subscribe("teamcommred", c);

        let sent = bus.broadcast("teamcommblue", "enemyPosition", MemoryValue::Position(Vec3::X));
        assert_eq!(sent, 2);
        assert_eq!(bus.pending(a), 1);
        assert_eq!(bus.pending(b), 1);
        assert_eq!(bus.pending(c), 0);
    }

    #[test]
    fn test_drain_applies_in_order() {
        let mut bus = CommunicationBus::new();
        let a = EntityId::new();
        bus.subscribe("ch", a);
        bus.broadcast("ch", "x", MemoryValue::Float(1.0));
        bus.broadcast("ch", "x", MemoryValue::Float(2.0));

        let mut memory = Memory::new();
        assert_eq!(bus.drain_into(a, &mut memory), 2);
        assert_eq!(memory.float("x"), Some(2.0));
        assert_eq!(bus.pending(a), 0);
    }

    #[test]
    fn test_empty_names_ignored() {
        let mut bus = CommunicationBus::new();
        let a = EntityId::new();
        bus.subscribe("", a);
        assert!(bus.channels_of(a).is_empty());
        assert_eq!(bus.broadcast("ch", "", MemoryValue::Bool(true)), 0);
        assert_eq!(bus.broadcast("nobody", "x", MemoryValue::Bool(true)), 0);
    }

    #[test]
    fn test_unsubscribe_and_direct_send() {
        let mut bus = CommunicationBus::new();
        let (a, b) = (EntityId::new(), EntityId::new());
        bus.subscribe("ch", a);
        bus.unsubscribe("ch", a);
        assert_eq!(bus.broadcast("ch", "x", MemoryValue::Bool(true)), 0);

        bus.send_to(b, a, "ch", "order", MemoryValue::Text("hold".into()));
        let mut memory = Memory::new();
        bus.drain_into(a, &mut memory);
        assert_eq!(memory.text("order"), Some("hold"));
    }
}
