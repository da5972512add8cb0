//! Serializable snapshot of a running simulation

use glam::Vec3;
use serde::Serialize;

use crate::core::types::Tick;
use crate::simulation::tick::SquadSimulation;

#[derive(Debug, Clone, Serialize)]
pub struct SquadSummary {
    pub tick: Tick,
    pub bodies: Vec<BodySummary>,
    pub harnesses: Vec<HarnessSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BodySummary {
    pub name: String,
    pub position: Vec3,
    pub yaw_degrees: f32,
    pub commander: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HarnessSummary {
    pub anchor: String,
    pub name: String,
    pub enabled: bool,
    pub formation_mode: Option<String>,
    pub capacity: usize,
    pub slots: Vec<SlotSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotSummary {
    pub slot: usize,
    pub position: Vec3,
    pub occupant: Option<String>,
}

impl SquadSummary {
    pub fn capture(sim: &SquadSimulation) -> Self {
        let world = &sim.world;
        let name_of = |id| world.body(id).map(|b| b.name.clone());

        let bodies = world
            .bodies()
            .map(|b| BodySummary {
                name: b.name.clone(),
                position: b.position(),
                yaw_degrees: b.frame.yaw_degrees(),
                commander: world.is_commander(b.id),
            })
            .collect();

        let mut harnesses = Vec::new();
        for anchor in world.bodies() {
            let Some(set) = world.harness_set(anchor.id) else {
                continue;
            };
            for harness in set.iter() {
                let slots = (0..harness.max_positions())
                    .map(|slot| SlotSummary {
                        slot,
                        position: harness.slot_position(slot),
                        occupant: harness.occupant(slot).and_then(name_of),
                    })
                    .collect();
                harnesses.push(HarnessSummary {
                    anchor: anchor.name.clone(),
                    name: harness.name().to_string(),
                    enabled: harness.is_enabled(),
                    formation_mode: harness.formation_mode(),
                    capacity: harness.max_positions(),
                    slots,
                });
            }
        }

        Self {
            tick: sim.current_tick(),
            bodies,
            harnesses,
        }
    }

    pub fn occupied_slots(&self) -> usize {
        self.harnesses
            .iter()
            .flat_map(|h| h.slots.iter())
            .filter(|s| s.occupant.is_some())
            .count()
    }
}
