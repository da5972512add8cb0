//! Formation harnesses: slot geometry, occupancy and harness selection

pub mod allocation;
pub mod column;
pub mod constants;
pub mod fire_team;
pub mod geometry;
pub mod harness;
pub mod harness_spec;
pub mod objective;
pub mod ring;
pub mod scattered;
pub mod selector;
pub mod triangle;

pub use allocation::{ReachabilityTest, SlotStrategy};
pub use column::ColumnLayout;
pub use fire_team::{FireTeamFormation, FireTeamLayout, FireTeamRole};
pub use geometry::SlotGeometry;
pub use harness::FormationHarness;
pub use harness_spec::{HarnessSpec, LayoutSpec};
pub use objective::Objective;
pub use ring::RingLayout;
pub use scattered::ScatteredRadiusLayout;
pub use selector::HarnessSet;
pub use triangle::TriangleLayout;
