//! Safety Coordinator: the only stateful actor
//!
//! Every mutation goes registry write → aggregate → classify → commit.
//! The system level is never stored independently of the component levels
//! and the strategy that produced it.

use chrono::Utc;
use tracing::{debug, info, warn};
use crate::BASELINE;
use crate::core::aggregator::aggregate;
use crate::core::audit::AuditLog;
use crate::core::config::CoordinatorConfig;
use crate::core::registry::{clamp_level, ComponentRegistry};
use crate::core::thresholds::ThresholdTable;
use crate::types::{
    AggregationStrategy, AuditEntry, Classification, ReasonCode,
    SafetyError, SafetyResult, SeverityBucket, SystemSnapshot,
};

/// Coordinator over one set of components
#[derive(Debug, Clone)]
pub struct SafetyCoordinator {
    registry: ComponentRegistry,
    table: ThresholdTable,
    strategy: AggregationStrategy,
    /// None until the first component is registered
    current: Option<Classification>,
    audit: AuditLog,
    update_count: u64,
}

impl Default for SafetyCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl SafetyCoordinator {
    /// Empty coordinator, conservative strategy
    pub fn new() -> Self {
        Self::with_audit_capacity(crate::DEFAULT_AUDIT_CAPACITY)
    }

    pub fn with_audit_capacity(capacity: usize) -> Self {
        Self {
            registry: ComponentRegistry::new(),
            table: ThresholdTable::new(),
            strategy: AggregationStrategy::default(),
            current: None,
            audit: AuditLog::with_capacity(capacity),
            update_count: 0,
        }
    }

    /// Register every id at the baseline
    pub fn with_components<I, S>(component_ids: I) -> SafetyResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut coordinator = Self::new();
        for id in component_ids {
            coordinator.register_component(id, BASELINE)?;
        }
        Ok(coordinator)
    }

    /// Build from configuration
    pub fn from_config(config: &CoordinatorConfig) -> SafetyResult<Self> {
        let mut coordinator = Self::with_audit_capacity(config.audit_capacity);
        coordinator.strategy = config.strategy;
        for component in &config.components {
            coordinator.register_component(component.id.clone(), component.level)?;
        }
        Ok(coordinator)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add a component and reclassify
    pub fn register_component(
        &mut self,
        component_id: impl Into<String>,
        level: f64,
    ) -> SafetyResult<Classification> {
        let stored = self.registry.register_component(component_id, level)?;

        let next = match self.evaluate(self.strategy) {
            Ok(next) => next,
            Err(err) => {
                self.registry.remove(&stored.component_id);
                return Err(err);
            }
        };

        self.record(
            ReasonCode::R001_COMPONENT_REGISTERED,
            Some(format!("{}={:.3}", stored.component_id, stored.level)),
            next,
        );
        self.commit(next);
        Ok(next)
    }

    /// Write one component, recompute, reclassify
    pub fn set_component_safety(&mut self, component_id: &str, level: f64) -> SafetyResult<SeverityBucket> {
        let previous = self.registry.get_level(component_id)?;
        let stored = self.registry.set_level(component_id, level)?;

        let next = match self.evaluate(self.strategy) {
            Ok(next) => next,
            Err(err) => {
                self.registry.set_level(component_id, previous)?;
                return Err(err);
            }
        };

        let (reason, note) = if stored.level == level {
            (ReasonCode::R002_LEVEL_UPDATED, format!("{}={:.3}", component_id, stored.level))
        } else {
            (
                ReasonCode::R002_LEVEL_CLAMPED,
                format!("{}: requested {} stored {:.3}", component_id, level, stored.level),
            )
        };
        self.record(reason, Some(note), next);
        self.commit(next);
        Ok(next.bucket)
    }

    /// Switch strategy and reclassify immediately
    pub fn set_strategy(&mut self, strategy: AggregationStrategy) -> SafetyResult<SeverityBucket> {
        let next = self.evaluate(strategy)?;
        let previous = std::mem::replace(&mut self.strategy, strategy);

        if previous != strategy {
            info!(from = %previous, to = %strategy, "aggregation strategy changed");
            self.record(
                ReasonCode::R003_STRATEGY_CHANGED,
                Some(format!("{} -> {}", previous, strategy)),
                next,
            );
        }
        self.commit(next);
        Ok(next.bucket)
    }

    /// Set every component to `target`, one full recompute per component,
    /// in registration order
    pub fn harmonize_all(&mut self, target: f64) -> SafetyResult<SeverityBucket> {
        if self.registry.is_empty() {
            return Err(SafetyError::NoComponentsRegistered);
        }
        clamp_level(target)?;

        let mut bucket = None;
        for id in self.registry.component_ids() {
            bucket = Some(self.set_component_safety(&id, target)?);
        }
        let bucket = bucket.ok_or(SafetyError::NoComponentsRegistered)?;

        if let Some(current) = self.current {
            self.record(
                ReasonCode::R006_HARMONIZED,
                Some(format!("target={}", target)),
                current,
            );
        }
        Ok(bucket)
    }

    /// Reset every component to the baseline. `reason` is recorded only.
    pub fn emergency_stabilize(&mut self, reason: &str) -> SafetyResult<SeverityBucket> {
        warn!(reason, "emergency stabilization to baseline");
        let bucket = self.harmonize_all(BASELINE)?;

        if let Some(current) = self.current {
            self.record(
                ReasonCode::R006_EMERGENCY_STABILIZED,
                Some(reason.to_string()),
                current,
            );
        }
        Ok(bucket)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Read-only view of the whole state
    pub fn snapshot(&self) -> SafetyResult<SystemSnapshot> {
        let current = self.current.ok_or(SafetyError::NoComponentsRegistered)?;
        Ok(SystemSnapshot {
            timestamp: Utc::now(),
            system_level: current.system_level,
            bucket: current.bucket,
            emergency_active: current.emergency_active(),
            strategy: self.strategy,
            components: self.registry.components().to_vec(),
        })
    }

    pub fn get_level(&self, component_id: &str) -> SafetyResult<f64> {
        self.registry.get_level(component_id)
    }

    pub fn strategy(&self) -> AggregationStrategy {
        self.strategy
    }

    pub fn classification(&self) -> Option<Classification> {
        self.current
    }

    pub fn system_level(&self) -> Option<f64> {
        self.current.map(|c| c.system_level)
    }

    pub fn bucket(&self) -> Option<SeverityBucket> {
        self.current.map(|c| c.bucket)
    }

    pub fn emergency_active(&self) -> bool {
        self.current.map(|c| c.emergency_active()).unwrap_or(false)
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn audit_log(&self) -> &AuditLog {
        &self.audit
    }

    /// Number of committed recomputations
    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Aggregate and classify without touching state
    fn evaluate(&self, strategy: AggregationStrategy) -> SafetyResult<Classification> {
        let system_level = aggregate(&self.registry.levels(), strategy)?;
        let bucket = self.table.classify(system_level)?;
        Ok(Classification { system_level, bucket })
    }

    fn commit(&mut self, next: Classification) {
        let previous = self.current.replace(next);
        self.update_count += 1;
        debug!(system_level = next.system_level, bucket = %next.bucket, "system level recomputed");

        let previous_bucket = previous.map(|c| c.bucket);
        if previous_bucket == Some(next.bucket) {
            return;
        }

        let note = match previous_bucket {
            Some(from) => format!("{} -> {}", from, next.bucket),
            None => format!("-> {}", next.bucket),
        };
        info!(transition = %note, system_level = next.system_level, "severity bucket changed");
        self.record(ReasonCode::R004_BUCKET_TRANSITION, Some(note), next);

        let was_emergency = previous.map(|c| c.emergency_active()).unwrap_or(false);
        match (was_emergency, next.emergency_active()) {
            (false, true) => {
                warn!(bucket = %next.bucket, system_level = next.system_level, "emergency entered");
                self.record(ReasonCode::R005_EMERGENCY_ENTERED, None, next);
            }
            (true, false) => {
                info!(bucket = %next.bucket, "emergency cleared");
                self.record(ReasonCode::R005_EMERGENCY_CLEARED, None, next);
            }
            _ => {}
        }
    }

    fn record(&mut self, reason: ReasonCode, note: Option<String>, at: Classification) {
        self.audit
            .record(AuditEntry::new(reason, note, at.system_level, at.bucket));
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn make_coordinator(levels: &[(&str, f64)]) -> SafetyCoordinator {
        let mut coordinator = SafetyCoordinator::new();
        for (id, level) in levels {
            coordinator.register_component(*id, *level).unwrap();
        }
        coordinator
    }

    fn reasons(coordinator: &SafetyCoordinator) -> Vec<ReasonCode> {
        coordinator.audit_log().entries().map(|e| e.reason).collect()
    }

    #[test]
    fn test_new_is_empty_and_conservative() {
        let coordinator = SafetyCoordinator::new();
        assert_eq!(coordinator.strategy(), AggregationStrategy::Conservative);
        assert_eq!(coordinator.system_level(), None);
        assert!(!coordinator.emergency_active());
        assert_eq!(coordinator.snapshot().unwrap_err(), SafetyError::NoComponentsRegistered);
    }

    #[test]
    fn test_with_components_starts_at_baseline() {
        let coordinator = SafetyCoordinator::with_components(crate::DEFAULT_COMPONENTS).unwrap();
        assert_eq!(coordinator.system_level(), Some(BASELINE));
        assert_eq!(coordinator.bucket(), Some(SeverityBucket::Optimal));
        assert_eq!(coordinator.registry().len(), 4);
    }

    #[test]
    fn test_with_components_rejects_duplicates() {
        let err = SafetyCoordinator::with_components(["ai", "ai"]).unwrap_err();
        assert_eq!(err, SafetyError::DuplicateComponent("ai".into()));
    }

    #[test]
    fn test_set_component_recomputes() {
        let mut coordinator = make_coordinator(&[("quantum", 0.6), ("ai", 0.6)]);
        let bucket = coordinator.set_component_safety("ai", 0.9).unwrap();
        // conservative: min(0.6, 0.9)
        assert_eq!(coordinator.system_level(), Some(0.6));
        assert_eq!(bucket, SeverityBucket::Optimal);

        let bucket = coordinator.set_component_safety("quantum", 0.10).unwrap();
        assert_eq!(coordinator.system_level(), Some(0.10));
        assert_eq!(bucket, SeverityBucket::WarningLow);
    }

    #[test]
    fn test_emergency_flag_follows_bucket() {
        let mut coordinator = make_coordinator(&[("ai", 0.5)]);
        coordinator.set_component_safety("ai", 0.99).unwrap();
        assert!(coordinator.emergency_active());
        assert_eq!(coordinator.bucket(), Some(SeverityBucket::CriticalHigh));

        coordinator.set_component_safety("ai", 0.5).unwrap();
        assert!(!coordinator.emergency_active());
    }

    #[test]
    fn test_unknown_component_leaves_state() {
        let mut coordinator = make_coordinator(&[("ai", 0.5)]);
        let before = coordinator.snapshot().unwrap();
        let updates = coordinator.update_count();

        let err = coordinator.set_component_safety("warp", 0.1).unwrap_err();
        assert_eq!(err, SafetyError::UnknownComponent("warp".into()));
        assert!(coordinator.snapshot().unwrap().same_state(&before));
        assert_eq!(coordinator.update_count(), updates);
    }

    #[test]
    fn test_nan_write_leaves_state() {
        let mut coordinator = make_coordinator(&[("ai", 0.5)]);
        let before = coordinator.snapshot().unwrap();
        assert!(matches!(
            coordinator.set_component_safety("ai", f64::NAN),
            Err(SafetyError::InvalidLevel(_))
        ));
        assert!(coordinator.snapshot().unwrap().same_state(&before));
    }

    #[test]
    fn test_out_of_range_write_clamped_and_audited() {
        let mut coordinator = make_coordinator(&[("ai", 0.5)]);
        coordinator.set_component_safety("ai", -2.0).unwrap();
        assert_eq!(coordinator.get_level("ai"), Ok(0.0));
        assert_eq!(coordinator.bucket(), Some(SeverityBucket::CriticalLow));
        assert!(reasons(&coordinator).contains(&ReasonCode::R002_LEVEL_CLAMPED));
    }

    #[test]
    fn test_strategy_switch_is_immediate() {
        let mut coordinator = make_coordinator(&[("quantum", 0.1), ("ai", 0.9)]);
        assert_eq!(coordinator.system_level(), Some(0.1));

        coordinator.set_strategy(AggregationStrategy::Performance).unwrap();
        assert_eq!(coordinator.system_level(), Some(0.9));
        assert_eq!(coordinator.bucket(), Some(SeverityBucket::WarningHigh));

        coordinator.set_strategy(AggregationStrategy::Balanced).unwrap();
        let level = coordinator.system_level().unwrap();
        assert!((level - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_strategy_on_empty_registry_fails_unchanged() {
        let mut coordinator = SafetyCoordinator::new();
        let err = coordinator.set_strategy(AggregationStrategy::Performance).unwrap_err();
        assert_eq!(err, SafetyError::NoComponentsRegistered);
        assert_eq!(coordinator.strategy(), AggregationStrategy::Conservative);
    }

    #[test]
    fn test_harmonize_all_sets_every_component() {
        let mut coordinator = make_coordinator(&[("quantum", 0.1), ("ai", 0.9), ("launcher", 0.4)]);
        let bucket = coordinator.harmonize_all(0.8).unwrap();
        assert_eq!(bucket, SeverityBucket::CautionHigh);
        for id in ["quantum", "ai", "launcher"] {
            assert_eq!(coordinator.get_level(id), Ok(0.8));
        }
        assert_eq!(coordinator.system_level(), Some(0.8));
    }

    #[test]
    fn test_harmonize_recomputes_per_component() {
        let mut coordinator = make_coordinator(&[("quantum", 0.1), ("ai", 0.9)]);
        let before = coordinator.update_count();
        coordinator.harmonize_all(0.5).unwrap();
        assert_eq!(coordinator.update_count(), before + 2);
    }

    #[test]
    fn test_harmonize_empty_and_nan_fail() {
        let mut empty = SafetyCoordinator::new();
        assert_eq!(empty.harmonize_all(0.5), Err(SafetyError::NoComponentsRegistered));

        let mut coordinator = make_coordinator(&[("quantum", 0.1), ("ai", 0.9)]);
        assert!(coordinator.harmonize_all(f64::NAN).is_err());
        assert_eq!(coordinator.get_level("quantum"), Ok(0.1));
        assert_eq!(coordinator.get_level("ai"), Ok(0.9));
    }

    #[test]
    fn test_emergency_stabilize_records_reason() {
        let mut coordinator = make_coordinator(&[("ai", 0.02)]);
        assert!(coordinator.emergency_active());

        let bucket = coordinator.emergency_stabilize("operator reset").unwrap();
        assert_eq!(bucket, SeverityBucket::Optimal);
        assert!(!coordinator.emergency_active());

        let latest = coordinator.audit_log().latest().unwrap();
        assert_eq!(latest.reason, ReasonCode::R006_EMERGENCY_STABILIZED);
        assert_eq!(latest.note.as_deref(), Some("operator reset"));
        assert!(reasons(&coordinator).contains(&ReasonCode::R005_EMERGENCY_CLEARED));
    }

    #[test]
    fn test_emergency_enter_audited_once() {
        let mut coordinator = make_coordinator(&[("ai", 0.5)]);
        coordinator.set_component_safety("ai", 0.01).unwrap();
        coordinator.set_component_safety("ai", 0.02).unwrap();
        let entered = reasons(&coordinator)
            .into_iter()
            .filter(|r| *r == ReasonCode::R005_EMERGENCY_ENTERED)
            .count();
        assert_eq!(entered, 1);
    }

    #[test]
    fn test_from_config() {
        let config = CoordinatorConfig::from_json(
            r#"{"components": [{"id": "a", "level": 0.2}, {"id": "b", "level": 0.4}], "strategy": "performance"}"#,
        )
        .unwrap();
        let coordinator = SafetyCoordinator::from_config(&config).unwrap();
        assert_eq!(coordinator.strategy(), AggregationStrategy::Performance);
        assert_eq!(coordinator.system_level(), Some(0.4));
    }

    #[test]
    fn test_snapshot_lists_components_in_order() {
        let coordinator = make_coordinator(&[("quantum", 0.3), ("ai", 0.4)]);
        let snapshot = coordinator.snapshot().unwrap();
        let ids: Vec<_> = snapshot.components.iter().map(|c| c.component_id.as_str()).collect();
        assert_eq!(ids, vec!["quantum", "ai"]);
        assert_eq!(snapshot.system_level, 0.3);
        assert_eq!(snapshot.strategy, AggregationStrategy::Conservative);
    }
}
