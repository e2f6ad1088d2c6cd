//! Producer: generates tasks and notes at randomized intervals

use chrono::{Duration as ChronoDuration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio::sync::mpsc;

use super::shutdown::ShutdownListener;
use crate::error::Result;
use crate::model::{Entity, Note, NoteCategory, Task, TaskPriority, TaskStatus};

/// What the producer generates and how fast
#[derive(Debug, Clone)]
pub struct ProducerSettings {
    /// Number of entities to generate
    pub count: usize,
    /// Inclusive bounds of the delay before each item
    pub min_delay: Duration,
    pub max_delay: Duration,
    /// Title prefix for tasks ("Task 1", "Task 3", ...)
    pub task_prefix: String,
    /// Title prefix for notes ("Note 2", "Note 4", ...)
    pub note_prefix: String,
    /// Fixed RNG seed; `None` seeds from the OS
    pub seed: Option<u64>,
}

impl Default for ProducerSettings {
    fn default() -> Self {
        Self {
            count: 10,
            min_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(400),
            task_prefix: "Task".to_string(),
            note_prefix: "Note".to_string(),
            seed: None,
        }
    }
}

/// Outcome of a producer run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProducerReport {
    /// Entities handed to the channel
    pub produced: usize,
    /// Items skipped because construction failed
    pub skipped: usize,
    /// Stopped by the cancellation signal before finishing
    pub cancelled: bool,
}

pub struct Producer {
    settings: ProducerSettings,
    sink: mpsc::Sender<Entity>,
    shutdown: ShutdownListener,
    rng: StdRng,
}

impl Producer {
    pub fn new(
        settings: ProducerSettings,
        sink: mpsc::Sender<Entity>,
        shutdown: ShutdownListener,
    ) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            settings,
            sink,
            shutdown,
            rng,
        }
    }

    /// Generate `count` entities, even positions as tasks and odd ones as notes
    ///
    /// Consumes the producer; the channel sender is dropped on return, which
    /// closes the channel once and for all.
    pub async fn run(mut self) -> ProducerReport {
        let mut report = ProducerReport::default();
        tracing::info!(count = self.settings.count, "producer started");

        for index in 0..self.settings.count {
            if self.shutdown.is_triggered() {
                report.cancelled = true;
                break;
            }

            let delay = self.next_delay();
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    report.cancelled = true;
                    break;
                }
                _ = tokio::time::sleep(delay) => {}
            }
            if self.shutdown.is_triggered() {
                report.cancelled = true;
                break;
            }

            let entity = match self.make_entity(index) {
                Ok(entity) => entity,
                Err(e) => {
                    tracing::warn!(index, error = %e, "producer skipped item");
                    report.skipped += 1;
                    continue;
                }
            };
            let kind = entity.kind();
            let title = entity.title().to_string();

            if self.shutdown.is_triggered() {
                report.cancelled = true;
                break;
            }
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    report.cancelled = true;
                    break;
                }
                sent = self.sink.send(entity) => {
                    if sent.is_err() {
                        tracing::warn!("producer channel closed by receiver; stopping");
                        break;
                    }
                }
            }

            report.produced += 1;
            tracing::info!(%kind, %title, "producer created");
        }

        if report.cancelled {
            tracing::info!(produced = report.produced, "producer cancelled");
        } else {
            tracing::info!(
                produced = report.produced,
                skipped = report.skipped,
                "producer finished"
            );
        }
        report
    }

    fn next_delay(&mut self) -> Duration {
        let (min, max) = (self.settings.min_delay, self.settings.max_delay);
        if max <= min {
            return min;
        }
        let millis = self.rng.gen_range(min.as_millis() as u64..=max.as_millis() as u64);
        Duration::from_millis(millis)
    }

    fn make_entity(&mut self, index: usize) -> Result<Entity> {
        let number = index + 1;
        if index % 2 == 0 {
            let due = Utc::now() + ChronoDuration::days(self.rng.gen_range(1..=7));
            let priority = TaskPriority::ALL[self.rng.gen_range(0..TaskPriority::ALL.len())];
            let mut task = Task::new(
                format!("{} {}", self.settings.task_prefix, number),
                format!("Description of task {}", number),
                priority,
                Some(due),
            )?;
            task.set_status(TaskStatus::ALL[self.rng.gen_range(0..TaskStatus::ALL.len())]);
            Ok(task.into())
        } else {
            let category = NoteCategory::ALL[self.rng.gen_range(0..NoteCategory::ALL.len())];
            let note = Note::new(
                format!("{} {}", self.settings.note_prefix, number),
                format!("Content of note {}", number),
                category,
            );
            Ok(note.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityKind;
    use crate::pipeline::Shutdown;

    fn settings(count: usize) -> ProducerSettings {
        ProducerSettings {
            count,
            min_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            seed: Some(7),
            ..Default::default()
        }
    }

    async fn drain(mut rx: mpsc::Receiver<Entity>) -> Vec<Entity> {
        let mut items = Vec::new();
        while let Some(item) = rx.recv().await {
            items.push(item);
        }
        items
    }

    #[tokio::test(start_paused = true)]
    async fn test_alternates_kinds_and_closes_channel() {
        let shutdown = Shutdown::new();
        let (tx, rx) = mpsc::channel(10);
        let producer = Producer::new(settings(5), tx, shutdown.subscribe());

        let (report, items) = tokio::join!(producer.run(), drain(rx));

        assert_eq!(
            report,
            ProducerReport {
                produced: 5,
                skipped: 0,
                cancelled: false,
            }
        );
        let kinds: Vec<_> = items.iter().map(Entity::kind).collect();
        assert_eq!(
            kinds,
            vec![
                EntityKind::Task,
                EntityKind::Note,
                EntityKind::Task,
                EntityKind::Note,
                EntityKind::Task,
            ]
        );
        assert_eq!(items[0].title(), "Task 1");
        assert_eq!(items[1].title(), "Note 2");
        assert!(items.iter().all(|e| !e.is_identified()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_titles_are_skipped() {
        let shutdown = Shutdown::new();
        let (tx, rx) = mpsc::channel(10);
        let mut settings = settings(4);
        settings.task_prefix = "x".repeat(120);
        let producer = Producer::new(settings, tx, shutdown.subscribe());

        let (report, items) = tokio::join!(producer.run(), drain(rx));

        assert_eq!(report.produced, 2);
        assert_eq!(report.skipped, 2);
        assert!(items.iter().all(|e| e.kind() == EntityKind::Note));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_start_produces_nothing() {
        let shutdown = Shutdown::new();
        shutdown.trigger();
        let (tx, rx) = mpsc::channel(10);
        let producer = Producer::new(settings(10), tx, shutdown.subscribe());

        let (report, items) = tokio::join!(producer.run(), drain(rx));
        assert!(report.cancelled);
        assert_eq!(report.produced, 0);
        assert!(items.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_unblocks_full_channel() {
        let shutdown = Shutdown::new();
        let (tx, mut rx) = mpsc::channel(1);
        let producer = Producer::new(settings(10), tx, shutdown.subscribe());
        let handle = tokio::spawn(producer.run());

        // Nobody drains: the first item fills the buffer and the second send blocks
        tokio::time::sleep(Duration::from_millis(100)).await;
        shutdown.trigger();
        let report = handle.await.unwrap();

        assert!(report.cancelled);
        assert_eq!(report.produced, 1);
        assert!(rx.recv().await.is_some());
        assert!(rx.recv().await.is_none());
    }
}
