//! Observer: polls the Store for newly appended entities and reports them

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};

use super::shutdown::ShutdownListener;
use crate::formatting::describe_entity;
use crate::model::{EntityId, EntityKind};
use crate::store::{Cursor, Store};

/// Result of one polling pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollOutcome {
    pub tasks: usize,
    pub notes: usize,
}

impl PollOutcome {
    pub fn is_empty(&self) -> bool {
        self.tasks == 0 && self.notes == 0
    }
}

/// Outcome of an observer run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObserverReport {
    /// Timer ticks handled, not counting the final drain
    pub ticks: usize,
    /// Ticks that found nothing new
    pub idle_ticks: usize,
    /// Entities found by the final drain
    pub drained: usize,
    /// Every reported entity, in report order
    pub reported: Vec<(EntityKind, EntityId)>,
}

impl ObserverReport {
    /// Ticks that reported at least one entity
    pub fn busy_ticks(&self) -> usize {
        self.ticks - self.idle_ticks
    }
}

pub struct Observer {
    store: Arc<Store>,
    interval: Duration,
    shutdown: ShutdownListener,
    task_cursor: Cursor,
    note_cursor: Cursor,
    reported: Vec<(EntityKind, EntityId)>,
}

impl Observer {
    pub fn new(store: Arc<Store>, interval: Duration, shutdown: ShutdownListener) -> Self {
        Self {
            store,
            interval,
            shutdown,
            task_cursor: 0,
            note_cursor: 0,
            reported: Vec::new(),
        }
    }

    /// Current cursors as (tasks, notes)
    pub fn cursors(&self) -> (Cursor, Cursor) {
        (self.task_cursor, self.note_cursor)
    }

    /// Everything reported so far, in report order
    pub fn reported(&self) -> &[(EntityKind, EntityId)] {
        &self.reported
    }

    /// Report everything appended since the last poll and advance the cursors
    pub fn poll(&mut self) -> PollOutcome {
        let outcome = PollOutcome {
            tasks: self.poll_kind(EntityKind::Task),
            notes: self.poll_kind(EntityKind::Note),
        };
        if outcome.is_empty() {
            tracing::info!("observer: nothing new");
        }
        outcome
    }

    fn poll_kind(&mut self, kind: EntityKind) -> usize {
        let cursor = match kind {
            EntityKind::Task => &mut self.task_cursor,
            EntityKind::Note => &mut self.note_cursor,
        };
        let batch = self.store.since_cursor(kind, *cursor);
        if batch.is_empty() {
            return 0;
        }

        tracing::info!(%kind, count = batch.len(), "observer found new {}", kind.plural());
        for entity in &batch {
            tracing::info!("  - {}", describe_entity(entity));
            self.reported.push((kind, entity.id()));
        }
        *cursor += batch.len();
        batch.len()
    }

    /// Poll on every tick until cancelled, then drain once more
    pub async fn run(mut self) -> ObserverReport {
        tracing::info!(interval_ms = self.interval.as_millis() as u64, "observer started");

        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut ticks = 0;
        let mut idle_ticks = 0;
        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    ticks += 1;
                    if self.poll().is_empty() {
                        idle_ticks += 1;
                    }
                }
            }
        }

        tracing::info!("observer received stop signal; final drain");
        let last = self.poll();
        let drained = last.tasks + last.notes;

        let (task_cursor, note_cursor) = self.cursors();
        tracing::info!(
            ticks,
            task_cursor,
            note_cursor,
            reported = self.reported.len(),
            "observer finished"
        );
        ObserverReport {
            ticks,
            idle_ticks,
            drained,
            reported: self.reported,
        }
    }
}
