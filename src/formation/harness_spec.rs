//! Data description of a harness, loadable from TOML

use serde::{Deserialize, Serialize};

use crate::core::error::{FormationError, Result};
use crate::core::types::EntityId;
use crate::formation::column::ColumnLayout;
use crate::formation::constants::{DEFAULT_ANGLE_SPREAD, DEFAULT_MAX_POSITIONS, MAX_POSITIONS};
use crate::formation::fire_team::{FireTeamFormation, FireTeamLayout};
use crate::formation::geometry::SlotGeometry;
use crate::formation::harness::FormationHarness;
use crate::formation::ring::RingLayout;
use crate::formation::scattered::ScatteredRadiusLayout;
use crate::formation::triangle::TriangleLayout;

fn default_max_positions() -> usize {
    DEFAULT_MAX_POSITIONS
}

fn default_distance() -> f32 {
    1.0
}

fn default_columns() -> usize {
    3
}

fn default_angle_spread() -> f32 {
    DEFAULT_ANGLE_SPREAD
}

/// Layout parameters, one variant per geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayoutSpec {
    Column {
        #[serde(default = "default_columns")]
        number_of_columns: usize,
        #[serde(default = "default_distance")]
        position_spread: f32,
        #[serde(default = "default_distance")]
        position_distance: f32,
    },
    Ring {
        #[serde(default = "default_distance")]
        position_distance: f32,
    },
    Triangle {
        #[serde(default = "default_distance")]
        position_distance: f32,
        #[serde(default = "default_angle_spread")]
        angle_spread: f32,
    },
    FireTeam {
        #[serde(default = "default_distance")]
        position_distance: f32,
        #[serde(default)]
        formation: FireTeamFormation,
    },
    ScatteredRadius {
        #[serde(default = "default_distance")]
        position_distance: f32,
        #[serde(default)]
        scatter_weight: f32,
        #[serde(default)]
        scatter_frequency: f32,
    },
}

impl LayoutSpec {
    fn position_distance(&self) -> f32 {
        match self {
            LayoutSpec::Column { position_distance, .. }
            | LayoutSpec::Ring { position_distance }
            | LayoutSpec::Triangle { position_distance, .. }
            | LayoutSpec::FireTeam { position_distance, .. }
            | LayoutSpec::ScatteredRadius { position_distance, .. } => *position_distance,
        }
    }

    /// Build the geometry. `seed` only matters for scattered layouts.
    pub fn geometry(&self, seed: u64) -> SlotGeometry {
        match self {
            LayoutSpec::Column {
                number_of_columns,
                position_spread,
                position_distance,
            } => SlotGeometry::Column(ColumnLayout {
                number_of_columns: *number_of_columns,
                position_spread: *position_spread,
                position_distance: *position_distance,
            }),
            LayoutSpec::Ring { position_distance } => SlotGeometry::Ring(RingLayout {
                position_distance: *position_distance,
            }),
            LayoutSpec::Triangle {
                position_distance,
                angle_spread,
            } => SlotGeometry::Triangle(TriangleLayout {
                position_distance: *position_distance,
                angle_spread: *angle_spread,
            }),
            LayoutSpec::FireTeam {
                position_distance,
                formation,
            } => SlotGeometry::FireTeam(FireTeamLayout::new(*position_distance, *formation)),
            LayoutSpec::ScatteredRadius {
                position_distance,
                scatter_weight,
                scatter_frequency,
            } => SlotGeometry::ScatteredRadius(ScatteredRadiusLayout::new(
                *position_distance,
                *scatter_weight,
                *scatter_frequency,
                seed,
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarnessSpec {
    pub name: String,
    #[serde(default = "default_max_positions")]
    pub max_positions: usize,
    #[serde(default)]
    pub rotates_with_object: bool,
    pub layout: LayoutSpec,
}

impl HarnessSpec {
    pub fn new(name: impl Into<String>, max_positions: usize, layout: LayoutSpec) -> Self {
        Self {
            name: name.into(),
            max_positions,
            rotates_with_object: false,
            layout,
        }
    }

    pub fn rotating(mut self) -> Self {
        self.rotates_with_object = true;
        self
    }

    /// Check parameters that would produce degenerate layouts
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(FormationError::InvalidConfig("harness name is empty".into()));
        }
        if self.max_positions > MAX_POSITIONS {
            return Err(FormationError::InvalidConfig(format!(
                "harness '{}': max_positions {} exceeds {}",
                self.name, self.max_positions, MAX_POSITIONS
            )));
        }
        if self.layout.position_distance() < 0.0 {
            return Err(FormationError::InvalidConfig(format!(
                "harness '{}': position_distance must not be negative",
                self.name
            )));
        }
        if let LayoutSpec::ScatteredRadius {
            scatter_weight,
            scatter_frequency,
            ..
        } = &self.layout
        {
            if !(0.0..=1.0).contains(scatter_weight) || *scatter_frequency < 0.0 {
                return Err(FormationError::InvalidConfig(format!(
                    "harness '{}': scatter_weight must be in [0, 1] and scatter_frequency >= 0",
                    self.name
                )));
            }
        }
        Ok(())
    }

    /// Build a harness with no occupants
    pub fn build(&self, seed: u64) -> FormationHarness {
        FormationHarness::new(self.name.clone(), self.layout.geometry(seed))
            .with_max_positions(self.max_positions)
            .with_rotation(self.rotates_with_object)
    }

    /// Build a fire team with a preset leader in slot 1
    pub fn build_with_leader(&self, seed: u64, leader: EntityId) -> FormationHarness {
        let mut geometry = self.layout.geometry(seed);
        if let SlotGeometry::FireTeam(layout) = &mut geometry {
            layout.leader = Some(leader);
        }
        let mut harness = FormationHarness::new(self.name.clone(), geometry)
            .with_max_positions(self.max_positions)
            .with_rotation(self.rotates_with_object);
        harness.clear();
        harness
    }
}
