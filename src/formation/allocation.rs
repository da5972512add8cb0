//! Slot allocation strategies and the reachability seam

use std::fmt;
use std::str::FromStr;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::error::FormationError;

/// How a free slot is picked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStrategy {
    /// Lowest free slot index
    #[default]
    First,
    /// Free slot nearest the requester
    Closest,
    /// Nearest free slot that is no farther than the anchor itself
    Intermediate,
}

impl SlotStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotStrategy::First => "first",
            SlotStrategy::Closest => "closest",
            SlotStrategy::Intermediate => "intermediate",
        }
    }

    /// Case-insensitive parse that treats anything unrecognised as `First`
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl fmt::Display for SlotStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SlotStrategy {
    type Err = FormationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(SlotStrategy::First),
            "closest" => Ok(SlotStrategy::Closest),
            "intermediate" => Ok(SlotStrategy::Intermediate),
            _ => Err(FormationError::UnknownStrategy(s.to_string())),
        }
    }
}

/// Answers whether the requesting agent can get to a world position.
/// Backed by a path planner outside the harness.
pub trait ReachabilityTest {
    fn can_reach(&self, target: Vec3) -> bool;
}

impl<F> ReachabilityTest for F
where
    F: Fn(Vec3) -> bool,
{
    fn can_reach(&self, target: Vec3) -> bool {
        self(target)
    }
}
