//! Per-agent working memory
//!
//! A named-variable blackboard shared by an agent's behaviors and
//! written to by incoming messages.

use ahash::AHashMap;
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::types::EntityId;

// Well-known variable names
pub const COMMANDER: &str = "commander";
pub const ENEMY: &str = "enemy";
pub const ENEMY_POSITION: &str = "enemyPosition";
pub const MOVE_TARGET: &str = "moveTarget";
pub const FACE_TARGET: &str = "faceTarget";
pub const MOVE_SPEED: &str = "moveSpeed";
pub const COVER: &str = "cover";
pub const TEAM: &str = "team";
pub const TEAM_COMM: &str = "teamComm";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryValue {
    Bool(bool),
    Float(f32),
    Text(String),
    Position(Vec3),
    Entity(EntityId),
}

impl From<bool> for MemoryValue {
    fn from(v: bool) -> Self {
        MemoryValue::Bool(v)
    }
}

impl From<f32> for MemoryValue {
    fn from(v: f32) -> Self {
        MemoryValue::Float(v)
    }
}

impl From<String> for MemoryValue {
    fn from(v: String) -> Self {
        MemoryValue::Text(v)
    }
}

impl From<&str> for MemoryValue {
    fn from(v: &str) -> Self {
        MemoryValue::Text(v.to_string())
    }
}

impl From<Vec3> for MemoryValue {
    fn from(v: Vec3) -> Self {
        MemoryValue::Position(v)
    }
}

impl From<EntityId> for MemoryValue {
    fn from(v: EntityId) -> Self {
        MemoryValue::Entity(v)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Memory {
    items: AHashMap<String, MemoryValue>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: impl Into<MemoryValue>) {
        self.items.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&MemoryValue> {
        self.items.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<MemoryValue> {
        self.items.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<Vec3> {
        match self.items.get(name) {
            Some(MemoryValue::Position(p)) => Some(*p),
            _ => None,
        }
    }

    pub fn entity(&self, name: &str) -> Option<EntityId> {
        match self.items.get(name) {
            Some(MemoryValue::Entity(id)) => Some(*id),
            _ => None,
        }
    }

    pub fn float(&self, name: &str) -> Option<f32> {
        match self.items.get(name) {
            Some(MemoryValue::Float(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.items.get(name) {
            Some(MemoryValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn flag(&self, name: &str) -> bool {
        matches!(self.items.get(name), Some(MemoryValue::Bool(true)))
    }
}
