//! Task Pipeline Library
//!
//! A small in-process pipeline that produces tasks and notes, funnels them
//! through a bounded channel to a consumer that appends them to a shared
//! store, while an independently scheduled observer polls the store for new
//! records and reports them.
//!
//! # Architecture
//!
//! - **Model Layer**: `model` - `Task`, `Note` and the closed `Entity` enum
//! - **Store Layer**: `store` - `RwLock`-guarded append-only sequences with cursor reads
//! - **Persistence Layer**: `storage` - JSON/CSV files, one per kind
//! - **Pipeline Layer**: `pipeline` - producer, consumer, observer and the orchestrator
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use task_pipeline::{Orchestrator, PipelineConfig, Store};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Arc::new(Store::new());
//!     let summary = Orchestrator::new(PipelineConfig::default(), store)
//!         .run(async {
//!             let _ = tokio::signal::ctrl_c().await;
//!         })
//!         .await?;
//!     println!("stored {} entities", summary.total());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod formatting;
pub mod model;
pub mod pipeline;
pub mod storage;
pub mod store;
pub mod validation;

// Re-export commonly used types
pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use model::{
    Entity, EntityId, EntityKind, Note, NoteCategory, Task, TaskFilter, TaskList, TaskPriority,
    TaskStatus,
};
pub use pipeline::{Orchestrator, RunSummary, ShutdownOutcome};
pub use storage::{Storage, StorageFormat};
pub use store::{Appended, Cursor, Store};
