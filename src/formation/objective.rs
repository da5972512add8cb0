//! Single-occupant objectives such as cover points

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::types::{EntityId, ObjectiveId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    pub id: ObjectiveId,
    pub position: Vec3,
    occupant: Option<EntityId>,
}

impl Objective {
    pub fn new(id: ObjectiveId, position: Vec3) -> Self {
        Self {
            id,
            position,
            occupant: None,
        }
    }

    pub fn occupant(&self) -> Option<EntityId> {
        self.occupant
    }

    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }

    /// Claim the objective. `force` evicts any current occupant.
    /// Returns whether `occupant` holds it afterwards.
    pub fn occupy(&mut self, occupant: EntityId, force: bool) -> bool {
        if self.occupant.is_none() || force {
            self.occupant = Some(occupant);
        }
        self.occupant == Some(occupant)
    }

    /// Release the objective if `occupant` holds it
    pub fn vacate(&mut self, occupant: EntityId) {
        if self.occupant == Some(occupant) {
            self.occupant = None;
        }
    }
}
