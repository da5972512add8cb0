//! Squad world and the tick loop that drives it

pub mod agent;
pub mod summary;
pub mod tick;
pub mod world;

pub use agent::Agent;
pub use summary::SquadSummary;
pub use tick::{SimulationEvent, SquadSimulation};
pub use world::{Body, HarnessRef, SquadWorld, TacticalKind, TacticalPoint};
