//! Four-man fire team layouts
//!
//! Slot assignment is fixed across every formation type:
//! 0 = rifleman 2, 1 = leader, 2 = automatic rifleman, 3 = rifleman 1.
//! The leader slot is always the anchor itself.
//!
//! Orientation is read from `last_forward`/`last_right`, which only
//! follow the anchor while the harness rotates. A fixed team does not
//! swing around when the anchor pivots in place.

use std::fmt;
use std::str::FromStr;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::error::FormationError;
use crate::core::types::{EntityId, ReferenceFrame, Slot};
use crate::formation::constants::{
    COLUMN_FORWARD, ECHELON_FORWARD, FIRE_TEAM_AUTOMATIC_SLOT, FIRE_TEAM_LEADER_SLOT,
    FIRE_TEAM_RIFLEMAN_1_SLOT, FIRE_TEAM_RIFLEMAN_2_SLOT, FIRE_TEAM_SIZE, WEDGE_FORWARD,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FireTeamFormation {
    #[default]
    Wedge,
    Column,
    SkirmishLeft,
    SkirmishRight,
    EchelonLeft,
    EchelonRight,
}

impl FireTeamFormation {
    pub const ALL: [FireTeamFormation; 6] = [
        FireTeamFormation::Wedge,
        FireTeamFormation::Column,
        FireTeamFormation::SkirmishLeft,
        FireTeamFormation::SkirmishRight,
        FireTeamFormation::EchelonLeft,
        FireTeamFormation::EchelonRight,
    ];

    /// Formation mode string as exchanged with the selector
    pub fn as_str(&self) -> &'static str {
        match self {
            FireTeamFormation::Wedge => "wedge",
            FireTeamFormation::Column => "column",
            FireTeamFormation::SkirmishLeft => "skirmish left",
            FireTeamFormation::SkirmishRight => "skirmish right",
            FireTeamFormation::EchelonLeft => "echelon left",
            FireTeamFormation::EchelonRight => "echelon right",
        }
    }

    /// (right, forward) multipliers of `position_distance` for a
    /// non-leader slot
    fn offset_factors(&self, slot: Slot) -> (f32, f32) {
        use FireTeamFormation::*;
        match (self, slot) {
            (Column, FIRE_TEAM_RIFLEMAN_2_SLOT) => (COLUMN_FORWARD * 0.5, COLUMN_FORWARD),
            (Column, FIRE_TEAM_AUTOMATIC_SLOT) => (COLUMN_FORWARD, -0.5),
            (Column, _) => (COLUMN_FORWARD * 0.5, -(COLUMN_FORWARD + 0.5)),

            (Wedge, FIRE_TEAM_RIFLEMAN_2_SLOT) => (1.0, WEDGE_FORWARD),
            (Wedge, FIRE_TEAM_AUTOMATIC_SLOT) => (2.0, 0.0),
            (Wedge, _) => (1.0, -1.0),

            (SkirmishLeft, FIRE_TEAM_RIFLEMAN_2_SLOT) => (1.0, 1.0),
            (SkirmishLeft, FIRE_TEAM_AUTOMATIC_SLOT) => (-1.0, 0.5),
            (SkirmishLeft, _) => (-2.0, -1.0),

            (SkirmishRight, FIRE_TEAM_RIFLEMAN_2_SLOT) => (-1.0, 1.0),
            (SkirmishRight, FIRE_TEAM_AUTOMATIC_SLOT) => (1.0, 0.5),
            (SkirmishRight, _) => (2.0, -1.0),

            (EchelonLeft, FIRE_TEAM_RIFLEMAN_2_SLOT) => (1.0, ECHELON_FORWARD),
            (EchelonLeft, FIRE_TEAM_AUTOMATIC_SLOT) => (-1.0, -ECHELON_FORWARD),
            (EchelonLeft, _) => (-2.0, -ECHELON_FORWARD * 2.0),

            (EchelonRight, FIRE_TEAM_RIFLEMAN_2_SLOT) => (-1.0, ECHELON_FORWARD),
            (EchelonRight, FIRE_TEAM_AUTOMATIC_SLOT) => (1.0, -ECHELON_FORWARD),
            (EchelonRight, _) => (2.0, -ECHELON_FORWARD * 2.0),
        }
    }
}

impl fmt::Display for FireTeamFormation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mode names match after trimming, ignoring ASCII case
impl FromStr for FireTeamFormation {
    type Err = FormationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        FireTeamFormation::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == wanted)
            .ok_or_else(|| FormationError::UnknownFormationMode(s.to_string()))
    }
}

/// Role an agent asks for when joining a fire team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FireTeamRole {
    Leader,
    Automatic,
    Rifleman,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireTeamLayout {
    /// Spread factor, both front-to-back and side-to-side
    pub position_distance: f32,
    pub formation: FireTeamFormation,
    /// Preset leader, re-seated whenever the harness is cleared
    pub leader: Option<EntityId>,
    last_forward: Vec3,
    last_right: Vec3,
}

impl Default for FireTeamLayout {
    fn default() -> Self {
        Self::new(1.0, FireTeamFormation::Wedge)
    }
}

impl FireTeamLayout {
    pub fn new(position_distance: f32, formation: FireTeamFormation) -> Self {
        Self {
            position_distance,
            formation,
            leader: None,
            last_forward: Vec3::Z,
            last_right: Vec3::X,
        }
    }

    pub fn with_leader(mut self, leader: EntityId) -> Self {
        self.leader = Some(leader);
        self
    }

    /// Record the anchor's current axes
    pub fn capture_orientation(&mut self, frame: &ReferenceFrame) {
        self.last_forward = frame.forward();
        self.last_right = frame.right();
    }

    pub fn last_forward(&self) -> Vec3 {
        self.last_forward
    }

    pub fn last_right(&self) -> Vec3 {
        self.last_right
    }

    /// One step behind the anchor along the recorded forward axis
    pub fn fallback(&self, frame: &ReferenceFrame) -> Vec3 {
        frame.position - self.last_forward * self.position_distance
    }

    pub fn slot_position(&self, slot: Slot, frame: &ReferenceFrame) -> Vec3 {
        if slot >= FIRE_TEAM_SIZE {
            return self.fallback(frame);
        }
        if slot == FIRE_TEAM_LEADER_SLOT {
            return frame.position;
        }

        let (right, forward) = self.formation.offset_factors(slot);
        frame.position
            + self.last_right * (self.position_distance * right)
            + self.last_forward * (self.position_distance * forward)
    }

    /// Slot for a role given which slots are already taken.
    /// Riflemen fill rifleman 1 first, then rifleman 2.
    pub fn slot_for_role(role: FireTeamRole, is_occupied: impl Fn(Slot) -> bool) -> Option<Slot> {
        match role {
            FireTeamRole::Leader => Some(FIRE_TEAM_LEADER_SLOT),
            FireTeamRole::Automatic => Some(FIRE_TEAM_AUTOMATIC_SLOT),
            FireTeamRole::Rifleman => [FIRE_TEAM_RIFLEMAN_1_SLOT, FIRE_TEAM_RIFLEMAN_2_SLOT]
                .into_iter()
                .find(|slot| !is_occupied(*slot)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_leader_slot_is_anchor_in_every_formation() {
        let frame = ReferenceFrame::from_yaw_degrees(Vec3::new(3.0, 1.0, -2.0), 37.0);
        for formation in FireTeamFormation::ALL {
            let mut layout = FireTeamLayout::new(4.5, formation);
            layout.capture_orientation(&frame);
            assert_eq!(layout.slot_position(FIRE_TEAM_LEADER_SLOT, &frame), frame.position);
        }
    }

    #[test]
    fn test_wedge_offsets() {
        let layout = FireTeamLayout::new(2.0, FireTeamFormation::Wedge);
        let frame = ReferenceFrame::default();

        assert!(approx(layout.slot_position(0, &frame), Vec3::new(2.0, 0.0, 2.0 * WEDGE_FORWARD)));
        assert!(approx(layout.slot_position(2, &frame), Vec3::new(4.0, 0.0, 0.0)));
        assert!(approx(layout.slot_position(3, &frame), Vec3::new(2.0, 0.0, -2.0)));
    }

    #[test]
    fn test_column_offsets() {
        let layout = FireTeamLayout::new(1.0, FireTeamFormation::Column);
        let frame = ReferenceFrame::default();

        assert!(approx(layout.slot_position(0, &frame), Vec3::new(0.75, 0.0, 1.5)));
        assert!(approx(layout.slot_position(2, &frame), Vec3::new(1.5, 0.0, -0.5)));
        assert!(approx(layout.slot_position(3, &frame), Vec3::new(0.75, 0.0, -2.0)));
    }

    #[test]
    fn test_skirmish_and_echelon_mirror_each_other() {
        let frame = ReferenceFrame::default();
        let pairs = [
            (FireTeamFormation::SkirmishLeft, FireTeamFormation::SkirmishRight),
            (FireTeamFormation::EchelonLeft, FireTeamFormation::EchelonRight),
        ];
        for (left, right) in pairs {
            let l = FireTeamLayout::new(1.0, left);
            let r = FireTeamLayout::new(1.0, right);
            for slot in [0, 2, 3] {
                let a = l.slot_position(slot, &frame);
                let b = r.slot_position(slot, &frame);
                assert!(approx(a, Vec3::new(-b.x, b.y, b.z)), "{left} vs {right} slot {slot}");
            }
        }
    }

    #[test]
    fn test_orientation_frozen_until_captured() {
        let mut layout = FireTeamLayout::new(1.0, FireTeamFormation::Wedge);
        let turned = ReferenceFrame::from_yaw_degrees(Vec3::ZERO, 90.0);

        // Not captured yet: still uses the initial +Z/+X axes
        assert!(approx(layout.slot_position(2, &turned), Vec3::new(2.0, 0.0, 0.0)));

        layout.capture_orientation(&turned);
        assert!(approx(layout.slot_position(2, &turned), Vec3::new(0.0, 0.0, -2.0)));
    }

    #[test]
    fn test_out_of_range_is_behind_anchor() {
        let layout = FireTeamLayout::new(2.0, FireTeamFormation::Column);
        let frame = ReferenceFrame::default();
        assert!(approx(layout.slot_position(4, &frame), Vec3::new(0.0, 0.0, -2.0)));
    }

    #[test]
    fn test_mode_strings_round_trip() {
        for formation in FireTeamFormation::ALL {
            assert_eq!(formation.as_str().parse::<FireTeamFormation>().unwrap(), formation);
        }
        assert!("phalanx".parse::<FireTeamFormation>().is_err());
    }

    #[test]
    fn test_mode_parse_ignores_case_and_padding() {
        assert_eq!(
            "  Skirmish Left ".parse::<FireTeamFormation>().unwrap(),
            FireTeamFormation::SkirmishLeft
        );
        assert_eq!("WEDGE".parse::<FireTeamFormation>().unwrap(), FireTeamFormation::Wedge);
        // Inner spacing is not normalised
        assert!("skirmish  left".parse::<FireTeamFormation>().is_err());
        assert!("skirmish_left".parse::<FireTeamFormation>().is_err());
    }

    #[test]
    fn test_slot_for_role() {
        assert_eq!(FireTeamLayout::slot_for_role(FireTeamRole::Leader, |_| true), Some(1));
        assert_eq!(FireTeamLayout::slot_for_role(FireTeamRole::Automatic, |_| false), Some(2));
        assert_eq!(FireTeamLayout::slot_for_role(FireTeamRole::Rifleman, |_| false), Some(3));
        assert_eq!(FireTeamLayout::slot_for_role(FireTeamRole::Rifleman, |s| s == 3), Some(0));
        assert_eq!(FireTeamLayout::slot_for_role(FireTeamRole::Rifleman, |_| true), None);
    }
}
