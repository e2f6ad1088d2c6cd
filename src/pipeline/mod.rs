//! The three-actor pipeline
//!
//! Data flows Producer → bounded channel → Consumer → Store, while the
//! Observer polls the Store on its own schedule. One cancellation signal
//! reaches all three actors; the Orchestrator owns it, together with the
//! channel.
//!
//! - `shutdown`: level-triggered cancellation signal
//! - `producer`: generates entities at randomized intervals
//! - `consumer`: drains the channel into the Store
//! - `observer`: reports what was appended since its last poll
//! - `orchestrator`: spawns the actors and runs the shutdown protocol

mod consumer;
mod observer;
mod orchestrator;
mod producer;
mod shutdown;

pub use consumer::{Consumer, ConsumerReport};
pub use observer::{Observer, ObserverReport, PollOutcome};
pub use orchestrator::{Orchestrator, RunSummary, ShutdownOutcome};
pub use producer::{Producer, ProducerReport, ProducerSettings};
pub use shutdown::{Shutdown, ShutdownListener};
