//! Orchestrator: owns the channel and the cancellation signal, runs the
//! three actors and enforces the shutdown window

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::consumer::{Consumer, ConsumerReport};
use super::observer::{Observer, ObserverReport};
use super::producer::{Producer, ProducerReport, ProducerSettings};
use super::shutdown::Shutdown;
use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::store::Store;

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// The producer finished its workload and every actor stopped
    Completed,
    /// Termination was requested and every actor stopped within the grace window
    Cancelled,
    /// Termination was requested and the grace window elapsed first
    Forced { grace: Duration },
}

/// Everything known about a run once it has ended
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub outcome: ShutdownOutcome,
    /// Actor reports; `None` for an actor that did not stop in time
    pub producer: Option<ProducerReport>,
    pub consumer: Option<ConsumerReport>,
    pub observer: Option<ObserverReport>,
    /// Store counts at exit
    pub task_count: usize,
    pub note_count: usize,
}

impl RunSummary {
    pub fn is_forced(&self) -> bool {
        matches!(self.outcome, ShutdownOutcome::Forced { .. })
    }

    /// The timeout error for a forced shutdown
    pub fn timeout_error(&self) -> Option<Error> {
        match self.outcome {
            ShutdownOutcome::Forced { grace } => Some(Error::ShutdownTimeout { grace }),
            _ => None,
        }
    }

    pub fn total(&self) -> usize {
        self.task_count + self.note_count
    }
}

/// A spawned actor and, once joined, its report
struct Actor<T> {
    name: &'static str,
    handle: JoinHandle<T>,
    joined: bool,
    report: Option<T>,
}

impl<T> Actor<T> {
    fn new(name: &'static str, handle: JoinHandle<T>) -> Self {
        Self {
            name,
            handle,
            joined: false,
            report: None,
        }
    }

    /// Wait for the actor to end. Safe to call again if a previous call was dropped.
    async fn join(&mut self) {
        if self.joined {
            return;
        }
        let result = (&mut self.handle).await;
        self.joined = true;
        match result {
            Ok(report) => self.report = Some(report),
            Err(e) => {
                let err = Error::Actor {
                    actor: self.name,
                    message: e.to_string(),
                };
                tracing::error!(error = %err, "actor ended abnormally");
            }
        }
    }

    fn abort(&self) {
        if !self.joined {
            tracing::warn!(actor = self.name, "aborting actor");
            self.handle.abort();
        }
    }
}

pub struct Orchestrator {
    config: PipelineConfig,
    producer: ProducerSettings,
    store: Arc<Store>,
}

impl Orchestrator {
    /// Create an orchestrator whose producer settings follow `config`
    pub fn new(config: PipelineConfig, store: Arc<Store>) -> Self {
        let (min_delay, max_delay) = config.delay_range();
        let producer = ProducerSettings {
            count: config.item_count,
            min_delay,
            max_delay,
            ..Default::default()
        };
        Self {
            config,
            producer,
            store,
        }
    }

    /// Replace the producer settings
    pub fn with_producer_settings(mut self, settings: ProducerSettings) -> Self {
        self.producer = settings;
        self
    }

    /// Run the pipeline until the producer's workload is stored or
    /// `terminate` resolves
    ///
    /// Normal path: wait for the producer (its exit closes the channel), wait
    /// for the consumer to drain, settle, then stop the observer.
    ///
    /// Termination path: raise the cancellation signal and give the actors
    /// `shutdown_timeout` to stop; past that they are aborted and the outcome
    /// is [`ShutdownOutcome::Forced`].
    pub async fn run<F>(self, terminate: F) -> Result<RunSummary>
    where
        F: Future<Output = ()>,
    {
        self.config.validate()?;

        let shutdown = Shutdown::new();
        let (tx, rx) = mpsc::channel(self.config.channel_capacity);

        tracing::info!("starting observer");
        let observer_task = Observer::new(
            Arc::clone(&self.store),
            self.config.poll_interval(),
            shutdown.subscribe(),
        );
        let mut observer = Actor::new("observer", tokio::spawn(observer_task.run()));
        tracing::info!("starting consumer");
        let mut consumer = Actor::new(
            "consumer",
            tokio::spawn(Consumer::new(rx, Arc::clone(&self.store), shutdown.subscribe()).run()),
        );
        tracing::info!("starting producer");
        let mut producer = Actor::new(
            "producer",
            tokio::spawn(Producer::new(self.producer.clone(), tx, shutdown.subscribe()).run()),
        );

        let settle = self.config.settle_delay();
        let completed = tokio::select! {
            _ = async {
                producer.join().await;
                // The producer's sender is gone, so the consumer sees the close
                // once the buffer is drained
                consumer.join().await;
                tokio::time::sleep(settle).await;
                shutdown.trigger();
                observer.join().await;
            } => true,
            _ = terminate => false,
        };

        let outcome = if completed {
            tracing::info!("all actors finished");
            ShutdownOutcome::Completed
        } else {
            let grace = self.config.shutdown_timeout();
            tracing::warn!(
                grace_ms = grace.as_millis() as u64,
                "termination requested; stopping actors"
            );
            shutdown.trigger();

            let joined = tokio::time::timeout(grace, async {
                producer.join().await;
                consumer.join().await;
                observer.join().await;
            })
            .await;

            match joined {
                Ok(()) => {
                    tracing::info!("actors stopped within the grace window");
                    ShutdownOutcome::Cancelled
                }
                Err(_) => {
                    producer.abort();
                    consumer.abort();
                    observer.abort();
                    tracing::error!(error = %Error::ShutdownTimeout { grace }, "forced shutdown");
                    ShutdownOutcome::Forced { grace }
                }
            }
        };

        let (task_count, note_count) = self.store.count();
        Ok(RunSummary {
            outcome,
            producer: producer.report,
            consumer: consumer.report,
            observer: observer.report,
            task_count,
            note_count,
        })
    }
}
