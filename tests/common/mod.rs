//! Common test utilities for integration tests

#![allow(dead_code)]

use std::time::Duration;
use task_pipeline::pipeline::ProducerSettings;
use task_pipeline::{Entity, EntityId, EntityKind, PipelineConfig, Store};

/// Configuration with short delays so a run finishes quickly
pub fn fast_config(count: usize) -> PipelineConfig {
    PipelineConfig {
        item_count: count,
        min_delay_ms: 1,
        max_delay_ms: 5,
        poll_interval_ms: 3,
        settle_delay_ms: 10,
        shutdown_timeout_ms: 3000,
        ..Default::default()
    }
}

/// Producer settings with a fixed delay and seed
pub fn fixed_delay_producer(count: usize, delay: Duration) -> ProducerSettings {
    ProducerSettings {
        count,
        min_delay: delay,
        max_delay: delay,
        seed: Some(42),
        ..Default::default()
    }
}

/// Ids stored for `kind`, in insertion order
pub fn stored_ids(store: &Store, kind: EntityKind) -> Vec<EntityId> {
    store.snapshot(kind).iter().map(Entity::id).collect()
}

/// Ids from an observer report for `kind`, in report order
pub fn reported_ids(reported: &[(EntityKind, EntityId)], kind: EntityKind) -> Vec<EntityId> {
    reported
        .iter()
        .filter(|(k, _)| *k == kind)
        .map(|(_, id)| *id)
        .collect()
}
