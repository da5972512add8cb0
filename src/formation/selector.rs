//! Harness selection
//!
//! An anchor owns a set of selectable harnesses, exactly one of which is
//! enabled at a time, plus attached harnesses (e.g. the attack harness
//! other agents put on it) that selection never touches.

use crate::core::error::{FormationError, Result};
use crate::core::types::{EntityId, ReferenceFrame};
use crate::formation::harness::FormationHarness;

#[derive(Debug, Clone, Default)]
pub struct HarnessSet {
    selectable: Vec<FormationHarness>,
    attached: Vec<FormationHarness>,
    active_name: Option<String>,
    active: Option<usize>,
    formation_mode: Option<String>,
}

impl HarnessSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn contains(&self, name: &str) -> bool {
        self.selectable.iter().chain(self.attached.iter()).any(|h| h.name() == name)
    }

    /// Add a selectable harness. It starts disabled unless it matches
    /// the current selection.
    pub fn register(&mut self, mut harness: FormationHarness) -> Result<()> {
        if self.contains(harness.name()) {
            return Err(FormationError::DuplicateHarness(harness.name().to_string()));
        }
        harness.set_enabled(false);
        self.selectable.push(harness);
        self.apply_selection();
        Ok(())
    }

    /// Add an always-enabled harness outside the selection
    pub fn attach(&mut self, mut harness: FormationHarness) -> Result<()> {
        if self.contains(harness.name()) {
            return Err(FormationError::DuplicateHarness(harness.name().to_string()));
        }
        harness.set_enabled(true);
        self.attached.push(harness);
        Ok(())
    }

    /// Enable the harness called `name` and disable every other
    /// selectable one. With no match nothing stays enabled.
    pub fn set_active(&mut self, name: &str) {
        let previous = self.active_harness().map(|h| h.name().to_string());
        self.active_name = Some(name.to_string());
        self.apply_selection();

        let current = self.active_harness().map(|h| h.name().to_string());
        if previous != current {
            match &current {
                Some(current) => tracing::info!("Active harness switched to '{}'", current),
                None => tracing::warn!("No harness named '{}', formation inactive", name),
            }
        }
    }

    /// Requested harness name, whether or not it resolved
    pub fn active_name(&self) -> Option<&str> {
        self.active_name.as_deref()
    }

    pub fn active_harness(&self) -> Option<&FormationHarness> {
        self.active.and_then(|i| self.selectable.get(i))
    }

    pub fn active_harness_mut(&mut self) -> Option<&mut FormationHarness> {
        self.active.and_then(|i| self.selectable.get_mut(i))
    }

    /// Mode of the active harness
    pub fn formation_mode(&self) -> Option<String> {
        self.active_harness().and_then(|h| h.formation_mode())
    }

    /// Forward a mode to the active harness and remember what it ended
    /// up with. Empty strings change nothing.
    pub fn set_formation_mode(&mut self, mode: &str) {
        let Some(harness) = self.active_harness_mut() else {
            return;
        };
        if !mode.is_empty() {
            harness.set_formation_mode(mode);
        }
        let applied = harness.formation_mode();
        self.formation_mode = applied;
    }

    /// Re-apply the stored selection and mode. Run once per tick before
    /// any agent thinks so late registrations are picked up.
    pub fn pre_tick(&mut self) {
        self.apply_selection();
    }

    fn apply_selection(&mut self) {
        let wanted = self.active_name.as_deref();
        self.active = None;
        for (i, harness) in self.selectable.iter_mut().enumerate() {
            if self.active.is_none() && wanted == Some(harness.name()) {
                harness.set_enabled(true);
                self.active = Some(i);
            } else {
                harness.set_enabled(false);
            }
        }

        if let Some(mode) = self.formation_mode.clone() {
            self.set_formation_mode(&mode);
        }
    }

    /// Harness by name whether enabled or not
    pub fn get(&self, name: &str) -> Option<&FormationHarness> {
        self.iter().find(|h| h.name() == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut FormationHarness> {
        self.selectable
            .iter_mut()
            .chain(self.attached.iter_mut())
            .find(|h| h.name() == name)
    }

    /// Drop every selectable harness, keeping attached ones
    pub fn clear_selectable(&mut self) -> Vec<FormationHarness> {
        self.active = None;
        self.active_name = None;
        self.formation_mode = None;
        std::mem::take(&mut self.selectable)
    }

    pub fn is_empty(&self) -> bool {
        self.selectable.is_empty() && self.attached.is_empty()
    }

    /// Enabled harness by name, selectable or attached
    pub fn find_enabled(&self, name: &str) -> Option<&FormationHarness> {
        self.iter().find(|h| h.is_enabled() && h.name() == name)
    }

    pub fn find_enabled_mut(&mut self, name: &str) -> Option<&mut FormationHarness> {
        self.selectable
            .iter_mut()
            .chain(self.attached.iter_mut())
            .find(|h| h.is_enabled() && h.name() == name)
    }

    /// Every harness, enabled or not
    pub fn iter(&self) -> impl Iterator<Item = &FormationHarness> {
        self.selectable.iter().chain(self.attached.iter())
    }

    pub fn names(&self) -> Vec<&str> {
        self.iter().map(|h| h.name()).collect()
    }

    /// Move every harness to the anchor's new frame
    pub fn update(&mut self, frame: ReferenceFrame, delta_time: f32) {
        for harness in self.selectable.iter_mut().chain(self.attached.iter_mut()) {
            harness.update(frame, delta_time);
        }
    }

    /// Release `occupant` from every harness in the set
    pub fn vacate_all(&mut self, occupant: EntityId) {
        for harness in self.selectable.iter_mut().chain(self.attached.iter_mut()) {
            harness.vacate(occupant);
        }
    }
}
