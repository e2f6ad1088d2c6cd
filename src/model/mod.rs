//! Entity model: tasks and notes
//!
//! This module contains the records that flow through the pipeline.
//! It is split into submodules:
//! - `task`: `Task` with its status and priority enumerations
//! - `note`: `Note` with its category enumeration
//! - `task_list`: in-memory task list with filtering
//!
//! `Entity` is the closed set of kinds the Store partitions by. Any code
//! that needs per-kind behaviour matches on it exhaustively.

mod note;
mod task;
mod task_list;

pub use note::{Note, NoteCategory};
pub use task::{Task, TaskPriority, TaskStatus};
pub use task_list::{TaskFilter, TaskList};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Entity identifier. `0` means the entity has not been stored yet.
pub type EntityId = u64;

/// Sentinel id carried by entities that have not been stored
pub const UNIDENTIFIED: EntityId = 0;

/// Kind tag of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Task,
    Note,
}

impl EntityKind {
    /// Every kind, in reporting order
    pub const ALL: [EntityKind; 2] = [EntityKind::Task, EntityKind::Note];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Task => "task",
            EntityKind::Note => "note",
        }
    }

    /// Plural form, used for file names and statistics
    pub fn plural(&self) -> &'static str {
        match self {
            EntityKind::Task => "tasks",
            EntityKind::Note => "notes",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "task" | "tasks" => Ok(EntityKind::Task),
            "note" | "notes" => Ok(EntityKind::Note),
            other => Err(Error::UnknownKind(other.to_string())),
        }
    }
}

/// A record travelling through the pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Task(Task),
    Note(Note),
}

impl Entity {
    pub fn id(&self) -> EntityId {
        match self {
            Entity::Task(task) => task.id(),
            Entity::Note(note) => note.id(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Task(_) => EntityKind::Task,
            Entity::Note(_) => EntityKind::Note,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Entity::Task(task) => task.title(),
            Entity::Note(note) => note.title(),
        }
    }

    /// Check whether the Store has assigned an id
    pub fn is_identified(&self) -> bool {
        self.id() != UNIDENTIFIED
    }
}

impl From<Task> for Entity {
    fn from(task: Task) -> Self {
        Entity::Task(task)
    }
}

impl From<Note> for Entity {
    fn from(note: Note) -> Self {
        Entity::Note(note)
    }
}

/// A kind-specific record that can be persisted on its own
///
/// Implemented by `Task` and `Note`; the persistence layer uses `KIND`
/// to pick the file a sequence lives in.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const KIND: EntityKind;

    fn id(&self) -> EntityId;

    fn into_entity(self) -> Entity;
}

impl Record for Task {
    const KIND: EntityKind = EntityKind::Task;

    fn id(&self) -> EntityId {
        Task::id(self)
    }

    fn into_entity(self) -> Entity {
        Entity::Task(self)
    }
}

impl Record for Note {
    const KIND: EntityKind = EntityKind::Note;

    fn id(&self) -> EntityId {
        Note::id(self)
    }

    fn into_entity(self) -> Entity {
        Entity::Note(self)
    }
}

/// Next `updated_at` value: now, or one nanosecond past `previous` if the
/// clock has not moved since the last mutation
pub(crate) fn advance_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + chrono::Duration::nanoseconds(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_kind_from_str() {
        assert_eq!("task".parse::<EntityKind>().unwrap(), EntityKind::Task);
        assert_eq!("notes".parse::<EntityKind>().unwrap(), EntityKind::Note);
        match "event".parse::<EntityKind>() {
            Err(Error::UnknownKind(kind)) => assert_eq!(kind, "event"),
            other => panic!("expected UnknownKind, got {:?}", other),
        }
    }

    #[test]
    fn test_entity_dispatch() {
        let task = Task::new("Write report", "", TaskPriority::High, None).unwrap();
        let note = Note::new("Idea", "Try tokio::select!", NoteCategory::Idea);

        let task = Entity::from(task);
        let note = Entity::from(note);
        assert_eq!(task.kind(), EntityKind::Task);
        assert_eq!(note.kind(), EntityKind::Note);
        assert_eq!(task.title(), "Write report");
        assert!(!task.is_identified());
        assert!(!note.is_identified());
    }

    #[test]
    fn test_advance_timestamp_is_strict() {
        let future = Utc::now() + chrono::Duration::hours(1);
        assert!(advance_timestamp(future) > future);
    }
}
