//! Formation and squad behavior configuration
//!
//! Every tunable used by the harnesses and the behaviors that consume
//! them lives here. Defaults reproduce the stock squad setup; a TOML file
//! can override any subset of fields.

use ahash::AHashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{FormationError, Result};
use crate::formation::allocation::SlotStrategy;
use crate::formation::constants::{
    ATTACK_HARNESS_NAME, ATTACK_MAX_POSITIONS, ATTACK_POSITION_DISTANCE, ATTACK_SCATTER_FREQUENCY,
    ATTACK_SCATTER_WEIGHT, DEFAULT_COMMAND_HARNESS,
};
use crate::formation::fire_team::FireTeamFormation;
use crate::formation::harness_spec::{HarnessSpec, LayoutSpec};

/// Configuration for formations and slot-consuming behaviors
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormationConfig {
    // === ATTACK ===
    /// Harness put on an enemy the first time someone attacks it
    ///
    /// Scattered so attackers don't all approach from evenly spaced
    /// bearings. Never rotates with the enemy.
    pub attack_harness: HarnessSpec,

    /// How attackers pick a slot on the attack harness
    pub attack_strategy: SlotStrategy,

    // === COVER ===
    /// Weight on a cover point's distance to the threat
    ///
    /// With threat weight 1.5 and self weight 1.0, a soldier prefers cover
    /// that keeps distance from the enemy over cover that is merely near.
    pub cover_threat_weight: f32,

    /// Weight on a cover point's distance to the soldier
    pub cover_self_weight: f32,

    // === DETECTION ===
    /// How far a soldier can spot bodies on other teams
    pub detection_range: f32,

    // === NAVIGATION ===
    /// Node expansion budget for a single path query
    ///
    /// Bounds reachability tests during slot allocation. A query that
    /// runs out of budget counts as unreachable.
    pub path_max_expansions: usize,

    // === PATROL ===
    /// Speed while holding formation
    pub walk_speed: f32,

    /// Speed while catching up to a slot
    pub run_speed: f32,

    /// Distance from the move target that counts as arrived
    ///
    /// Runners drop back to walking once inside this distance.
    pub close_enough_distance: f32,

    /// Distance beyond which a walker starts running
    ///
    /// Never less than twice `close_enough_distance`.
    pub patrol_max_distance: f32,

    // === COMMUNICATION ===
    /// Team channel is this prefix followed by the team name
    pub team_comm_prefix: String,

    // === COMMAND ===
    /// Harness a new commander starts with
    pub default_formation: String,

    /// How followers pick a slot on their commander's harness
    pub follow_strategy: SlotStrategy,

    /// Harnesses every commander carries
    pub commander_harnesses: Vec<HarnessSpec>,
}

impl Default for FormationConfig {
    fn default() -> Self {
        Self {
            // Attack preset
            attack_harness: HarnessSpec::new(
                ATTACK_HARNESS_NAME,
                ATTACK_MAX_POSITIONS,
                LayoutSpec::ScatteredRadius {
                    position_distance: ATTACK_POSITION_DISTANCE,
                    scatter_weight: ATTACK_SCATTER_WEIGHT,
                    scatter_frequency: ATTACK_SCATTER_FREQUENCY,
                },
            ),
            attack_strategy: SlotStrategy::Closest,

            // Cover cost = 1.5 * d(threat) + d(self)
            cover_threat_weight: 1.5,
            cover_self_weight: 1.0,

            detection_range: 50.0,

            path_max_expansions: 500,

            // Patrol
            walk_speed: 1.5,
            run_speed: 4.0,
            close_enough_distance: 0.5,
            patrol_max_distance: 3.0,

            team_comm_prefix: "teamcomm".into(),

            // Command
            default_formation: DEFAULT_COMMAND_HARNESS.into(),
            follow_strategy: SlotStrategy::Closest,
            commander_harnesses: vec![
                HarnessSpec::new(
                    "Column",
                    6,
                    LayoutSpec::Column {
                        number_of_columns: 2,
                        position_spread: 2.0,
                        position_distance: 2.0,
                    },
                )
                .rotating(),
                HarnessSpec::new(
                    "Wedge",
                    9,
                    LayoutSpec::Triangle {
                        position_distance: 2.0,
                        angle_spread: 60.0,
                    },
                )
                .rotating(),
                HarnessSpec::new("Perimeter", 8, LayoutSpec::Ring { position_distance: 4.0 }),
                HarnessSpec::new(
                    "FireTeam",
                    4,
                    LayoutSpec::FireTeam {
                        position_distance: 2.0,
                        formation: FireTeamFormation::Wedge,
                    },
                )
                .rotating(),
            ],
        }
    }
}

impl FormationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        self.attack_harness.validate().map_err(|e| e.to_string())?;

        if self.cover_threat_weight < 0.0 || self.cover_self_weight < 0.0 {
            return Err("Cover weights must not be negative".into());
        }

        if self.detection_range.is_nan() || self.detection_range <= 0.0 {
            return Err("detection_range must be positive".into());
        }

        if self.path_max_expansions == 0 {
            return Err("path_max_expansions must be positive".into());
        }

        if self.walk_speed < 0.0 || self.run_speed < self.walk_speed {
            return Err(format!(
                "walk_speed ({}) should be >= 0 and <= run_speed ({})",
                self.walk_speed, self.run_speed
            ));
        }

        if self.close_enough_distance <= 0.0 {
            return Err("close_enough_distance must be positive".into());
        }

        if self.team_comm_prefix.is_empty() {
            return Err("team_comm_prefix must not be empty".into());
        }

        let mut names = AHashSet::new();
        for spec in &self.commander_harnesses {
            spec.validate().map_err(|e| e.to_string())?;
            if !names.insert(spec.name.as_str()) {
                return Err(format!("Duplicate commander harness '{}'", spec.name));
            }
        }
        if !names.contains(self.default_formation.as_str()) {
            return Err(format!(
                "default_formation '{}' is not one of the commander harnesses",
                self.default_formation
            ));
        }

        Ok(())
    }

    /// Effective run threshold for patrol speed
    pub fn effective_max_distance(&self) -> f32 {
        self.patrol_max_distance.max(self.close_enough_distance * 2.0)
    }
}

/// Read and validate a TOML config file
pub fn load_config(path: impl AsRef<Path>) -> Result<FormationConfig> {
    let contents = fs::read_to_string(path.as_ref())?;
    let config: FormationConfig = toml::from_str(&contents)?;
    config.validate().map_err(FormationError::InvalidConfig)?;
    tracing::info!("Loaded formation config from {}", path.as_ref().display());
    Ok(config)
}

// === GLOBAL CONFIG ACCESS ===

use std::sync::OnceLock;

static CONFIG: OnceLock<FormationConfig> = OnceLock::new();

/// Get the global formation config (initializes with defaults if not set)
pub fn config() -> &'static FormationConfig {
    CONFIG.get_or_init(FormationConfig::default)
}

/// Set the global formation config (can only be called once)
///
/// Returns Err if config was already set.
pub fn set_config(config: FormationConfig) -> std::result::Result<(), FormationConfig> {
    CONFIG.set(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = FormationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.attack_harness.name, "attack");
        assert_eq!(config.attack_harness.max_positions, 10);
        assert_eq!(config.team_comm_prefix, "teamcomm");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: FormationConfig = toml::from_str(
            r#"
            cover_threat_weight = 2.0
            follow_strategy = "intermediate"
            "#,
        )
        .unwrap();
        assert_eq!(config.cover_threat_weight, 2.0);
        assert_eq!(config.cover_self_weight, 1.0);
        assert_eq!(config.follow_strategy, SlotStrategy::Intermediate);
        assert_eq!(config.default_formation, "Column");
    }

    #[test]
    fn test_default_formation_must_exist() {
        let config = FormationConfig {
            default_formation: "Phalanx".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_run_threshold_floor() {
        let config = FormationConfig {
            close_enough_distance: 2.0,
            patrol_max_distance: 1.0,
            ..Default::default()
        };
        assert_eq!(config.effective_max_distance(), 4.0);
    }

    #[test]
    fn test_detection_range_must_be_positive() {
        let config = FormationConfig {
            detection_range: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duplicate_commander_harness_rejected() {
        let mut config = FormationConfig::default();
        let first = config.commander_harnesses[0].clone();
        config.commander_harnesses.push(first);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/formations.toml");
        let config = load_config(path).unwrap();
        let defaults = FormationConfig::default();
        assert_eq!(config.commander_harnesses, defaults.commander_harnesses);
        assert_eq!(config.attack_harness, defaults.attack_harness);
        assert_eq!(config.path_max_expansions, defaults.path_max_expansions);
        assert_eq!(config.detection_range, defaults.detection_range);
    }

    #[test]
    fn test_missing_config_file_is_io_error() {
        let result = load_config("/nonexistent/formations.toml");
        assert!(matches!(result, Err(FormationError::IoError(_))));
    }
}
