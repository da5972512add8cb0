//! Team communication

pub mod bus;
pub mod team;

pub use bus::{CommunicationBus, Message};
pub use team::TeamMembership;
