//! Consumer: drains the channel into the Store

use std::sync::Arc;
use tokio::sync::mpsc;

use super::shutdown::ShutdownListener;
use crate::model::Entity;
use crate::store::Store;

/// Outcome of a consumer run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsumerReport {
    /// Entities appended to the Store
    pub stored: usize,
    /// Stored entities whose follow-up save failed; they remain in memory
    pub persist_failed: usize,
    /// Stopped by the cancellation signal rather than by the channel closing
    pub cancelled: bool,
}

pub struct Consumer {
    source: mpsc::Receiver<Entity>,
    store: Arc<Store>,
    shutdown: ShutdownListener,
}

impl Consumer {
    pub fn new(
        source: mpsc::Receiver<Entity>,
        store: Arc<Store>,
        shutdown: ShutdownListener,
    ) -> Self {
        Self {
            source,
            store,
            shutdown,
        }
    }

    /// Store entities until the channel closes or cancellation fires
    ///
    /// Cancellation is checked first on every iteration, so anything still
    /// buffered when it fires is dropped. An entity that has been received is
    /// always handed to the Store: the add is synchronous and runs to the end.
    pub async fn run(mut self) -> ConsumerReport {
        let mut report = ConsumerReport::default();
        tracing::info!("consumer started");

        loop {
            let entity = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    report.cancelled = true;
                    break;
                }
                received = self.source.recv() => match received {
                    Some(entity) => entity,
                    None => break,
                },
            };

            let kind = entity.kind();
            let title = entity.title().to_string();
            let appended = self.store.add_entity(entity);
            report.stored += 1;
            tracing::info!(%kind, id = appended.id, %title, "consumer stored");
            if let Some(e) = appended.save_error {
                report.persist_failed += 1;
                tracing::warn!(%kind, id = appended.id, error = %e, "save failed; kept in memory");
            }
        }

        if report.cancelled {
            tracing::info!(stored = report.stored, "consumer cancelled");
        } else {
            tracing::info!(
                stored = report.stored,
                persist_failed = report.persist_failed,
                "consumer finished"
            );
        }
        report
    }
}
