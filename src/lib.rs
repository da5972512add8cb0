//! Squad Command - formation harnesses and slot allocation for squad AI

pub mod behavior;
pub mod comms;
pub mod core;
pub mod formation;
pub mod navigation;
pub mod simulation;
