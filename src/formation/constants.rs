//! Formation constants - all tunable values in one place

/// Hard upper bound on slots in any harness
pub const MAX_POSITIONS: usize = 50;

/// Slot count used when a harness is created without an explicit capacity
pub const DEFAULT_MAX_POSITIONS: usize = 6;

// Fire team layout
pub const FIRE_TEAM_SIZE: usize = 4;
pub const FIRE_TEAM_RIFLEMAN_2_SLOT: usize = 0;
pub const FIRE_TEAM_LEADER_SLOT: usize = 1;
pub const FIRE_TEAM_AUTOMATIC_SLOT: usize = 2;
pub const FIRE_TEAM_RIFLEMAN_1_SLOT: usize = 3;
pub const WEDGE_FORWARD: f32 = 1.732; // sqrt(3), equilateral wedge
pub const COLUMN_FORWARD: f32 = 1.5;
pub const ECHELON_FORWARD: f32 = 0.75;

// Triangle layout
pub const DEFAULT_ANGLE_SPREAD: f32 = 30.0;
pub const TRIANGLE_FIRST_ROW_SIZE: usize = 2;

// Scatter jitter, as fractions of slice width / radius at full weight
pub const SCATTER_ANGULAR_FACTOR: f32 = 0.5;
pub const SCATTER_RADIAL_FACTOR: f32 = 0.8;

// Attack harness preset created on enemies that have none
pub const ATTACK_HARNESS_NAME: &str = "attack";
pub const ATTACK_MAX_POSITIONS: usize = 10;
pub const ATTACK_POSITION_DISTANCE: f32 = 12.0;
pub const ATTACK_SCATTER_WEIGHT: f32 = 0.5;
pub const ATTACK_SCATTER_FREQUENCY: f32 = 10.0;

/// Harness a freshly promoted commander starts in
pub const DEFAULT_COMMAND_HARNESS: &str = "Column";
