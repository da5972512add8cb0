//! Scattered radius layout, used for attack positions around an enemy
//!
//! Slots sit roughly evenly around a circle, each jittered in angle and
//! radius so attackers don't close in from perfectly uniform bearings.
//! Offsets are cached and only regenerated on demand, when a parameter
//! or the capacity changes, or when the scatter timer runs out.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::core::types::{rotate_about_up, ReferenceFrame, Slot};
use crate::formation::constants::{SCATTER_ANGULAR_FACTOR, SCATTER_RADIAL_FACTOR};

#[derive(Debug, Clone)]
pub struct ScatteredRadiusLayout {
    position_distance: f32,
    scatter_weight: f32,
    scatter_frequency: f32,
    count: usize,
    positions: Vec<Vec3>,
    since_scatter: f32,
    rng: ChaCha8Rng,
}

impl ScatteredRadiusLayout {
    /// Weight is clamped into `[0, 1]`; 0 gives a perfect circle.
    /// A frequency of 0 disables timed re-scattering. Negative or
    /// non-finite distances collapse to 0.
    pub fn new(position_distance: f32, scatter_weight: f32, scatter_frequency: f32, seed: u64) -> Self {
        Self {
            position_distance: non_negative(position_distance),
            scatter_weight: unit_weight(scatter_weight),
            scatter_frequency: non_negative(scatter_frequency),
            count: 0,
            positions: Vec::new(),
            since_scatter: 0.0,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn position_distance(&self) -> f32 {
        self.position_distance
    }

    pub fn scatter_weight(&self) -> f32 {
        self.scatter_weight
    }

    pub fn scatter_frequency(&self) -> f32 {
        self.scatter_frequency
    }

    /// Cached offsets relative to the anchor, before any rotation
    pub fn offsets(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn set_position_distance(&mut self, distance: f32) {
        self.position_distance = non_negative(distance);
        self.scatter();
    }

    pub fn set_scatter_weight(&mut self, weight: f32) {
        self.scatter_weight = unit_weight(weight);
        self.scatter();
    }

    pub fn set_scatter_frequency(&mut self, frequency: f32) {
        self.scatter_frequency = non_negative(frequency);
    }

    /// Slot count changed on the owning harness
    pub fn resize(&mut self, count: usize) {
        self.count = count;
        self.scatter();
    }

    /// Advance the scatter timer, regenerating when it elapses
    pub fn tick(&mut self, delta_time: f32) {
        if self.scatter_frequency <= 0.0 {
            return;
        }
        self.since_scatter += delta_time;
        if self.since_scatter > self.scatter_frequency {
            self.scatter();
        }
    }

    /// Regenerate every offset now
    pub fn scatter(&mut self) {
        self.since_scatter = 0.0;
        self.positions.clear();
        if self.count < 1 {
            return;
        }

        let slice = 360.0 / self.count as f32;
        let radial = self.scatter_weight * self.position_distance * SCATTER_RADIAL_FACTOR;
        let angular = SCATTER_ANGULAR_FACTOR * self.scatter_weight;

        for i in 0..self.count {
            let angle = slice * (i as f32 + self.rng.gen_range(-angular..=angular));
            let radius = self.position_distance + self.rng.gen_range(-radial..=radial);
            self.positions.push(rotate_about_up(Vec3::Z * radius, angle));
        }
    }

    /// One step in front of the anchor
    pub fn fallback(&self, frame: &ReferenceFrame) -> Vec3 {
        frame.position + frame.forward() * self.position_distance
    }

    pub fn slot_position(
        &self,
        slot: Slot,
        max_positions: usize,
        frame: &ReferenceFrame,
        rotates: bool,
    ) -> Vec3 {
        let Some(offset) = self.positions.get(slot).filter(|_| slot < max_positions) else {
            return self.fallback(frame);
        };

        if rotates {
            frame.position + frame.rotation * *offset
        } else {
            frame.position + *offset
        }
    }
}

// Jitter ranges must stay finite and ordered
fn non_negative(value: f32) -> f32 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

fn unit_weight(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
