//! Component Registry: named safety levels behind a clamping setter
//!
//! The registry never re-aggregates; that is the coordinator's job.

use tracing::debug;
use crate::{MIN_LEVEL, MAX_LEVEL};
use crate::types::{ComponentSafetyLevel, SafetyError, SafetyResult};

/// Registered components in registration order
#[derive(Debug, Default, Clone)]
pub struct ComponentRegistry {
    components: Vec<ComponentSafetyLevel>,
}

impl ComponentRegistry {
    /// Create empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a component. Its initial level is clamped like any other write.
    pub fn register_component(
        &mut self,
        component_id: impl Into<String>,
        initial_level: f64,
    ) -> SafetyResult<ComponentSafetyLevel> {
        let component_id = component_id.into();
        if self.contains(&component_id) {
            return Err(SafetyError::DuplicateComponent(component_id));
        }
        let level = clamp_level(initial_level)?;

        let component = ComponentSafetyLevel::new(component_id, level);
        debug!(component = %component.component_id, level, "component registered");
        self.components.push(component.clone());
        Ok(component)
    }

    /// Clamp and store a level, returning what was stored
    pub fn set_level(&mut self, component_id: &str, requested_level: f64) -> SafetyResult<ComponentSafetyLevel> {
        let level = clamp_level(requested_level)?;
        let slot = self
            .components
            .iter_mut()
            .find(|c| c.component_id == component_id)
            .ok_or_else(|| SafetyError::UnknownComponent(component_id.to_string()))?;

        slot.level = level;
        debug!(component = component_id, requested_level, level, "component level stored");
        Ok(slot.clone())
    }

    /// Current level of a component
    pub fn get_level(&self, component_id: &str) -> SafetyResult<f64> {
        self.components
            .iter()
            .find(|c| c.component_id == component_id)
            .map(|c| c.level)
            .ok_or_else(|| SafetyError::UnknownComponent(component_id.to_string()))
    }

    /// Drop a component. Only used to roll back a failed registration.
    pub(crate) fn remove(&mut self, component_id: &str) {
        self.components.retain(|c| c.component_id != component_id);
    }

    pub fn contains(&self, component_id: &str) -> bool {
        self.components.iter().any(|c| c.component_id == component_id)
    }

    /// Levels in registration order
    pub fn levels(&self) -> Vec<f64> {
        self.components.iter().map(|c| c.level).collect()
    }

    /// Ids in registration order
    pub fn component_ids(&self) -> Vec<String> {
        self.components.iter().map(|c| c.component_id.clone()).collect()
    }

    pub fn components(&self) -> &[ComponentSafetyLevel] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// Clamp into [0, 1]. NaN has no clamp target and is rejected.
/// Negative zero comes back as positive zero.
pub fn clamp_level(level: f64) -> SafetyResult<f64> {
    if level.is_nan() {
        return Err(SafetyError::InvalidLevel(level));
    }
    Ok(level.clamp(MIN_LEVEL, MAX_LEVEL) + 0.0)
}

// =============================================================================
// TESTS
// =============================================================================
