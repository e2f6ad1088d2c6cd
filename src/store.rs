//! Thread-safe entity store
//!
//! The Store keeps two append-only sequences, one per kind, behind a single
//! `RwLock`. Appends take the write lock; every read takes the read lock and
//! returns an owned copy, so no caller ever holds a reference into the
//! sequences. Observers poll with a cursor: the number of items of a kind
//! they have already seen.

use std::sync::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{Error, Result};
use crate::model::{Entity, EntityId, EntityKind, Note, Record, Task, UNIDENTIFIED};
use crate::storage::Storage;

/// Number of items of one kind a reader has already consumed
pub type Cursor = usize;

#[derive(Default)]
struct Partitions {
    tasks: Vec<Task>,
    notes: Vec<Note>,
    /// Next id to hand out; shared by both kinds
    next_id: EntityId,
}

impl Partitions {
    fn len(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Task => self.tasks.len(),
            EntityKind::Note => self.notes.len(),
        }
    }

    fn suffix(&self, kind: EntityKind, from: usize) -> Vec<Entity> {
        match kind {
            EntityKind::Task => copy_from(&self.tasks, from),
            EntityKind::Note => copy_from(&self.notes, from),
        }
    }

    /// Keep an id already carried by the entity, or allocate the next one
    fn claim_id(&mut self, current: EntityId) -> EntityId {
        let id = if current == UNIDENTIFIED { self.next_id } else { current };
        self.next_id = self.next_id.max(id.saturating_add(1));
        id
    }
}

fn copy_from<R: Record>(items: &[R], from: usize) -> Vec<Entity> {
    items
        .get(from..)
        .unwrap_or_default()
        .iter()
        .cloned()
        .map(Record::into_entity)
        .collect()
}

/// Copy of one kind's sequence taken inside the append's critical section
enum PendingSave {
    Tasks(Vec<Task>),
    Notes(Vec<Note>),
}

/// An append that has committed to memory
#[derive(Debug)]
pub struct Appended {
    pub id: EntityId,
    /// Why the follow-up save failed; `None` when it succeeded or persistence is off
    pub save_error: Option<Error>,
}

impl Appended {
    pub fn is_saved(&self) -> bool {
        self.save_error.is_none()
    }
}

/// Mutex-guarded append-only collection of tasks and notes
pub struct Store {
    inner: RwLock<Partitions>,
    storage: Option<Storage>,
    /// Length of the newest snapshot written per kind (tasks, notes)
    saved: Mutex<[usize; 2]>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Partitions {
                next_id: 1,
                ..Default::default()
            }),
            storage: None,
            saved: Mutex::new([0, 0]),
        }
    }

    /// Create a store backed by `storage`, loading whatever it already holds
    ///
    /// A kind that fails to load is logged and starts empty; the run goes on
    /// with in-memory state only for that kind.
    pub fn open(storage: Storage) -> Self {
        let tasks = load_or_empty::<Task>(&storage);
        let notes = load_or_empty::<Note>(&storage);

        let max_id = tasks
            .iter()
            .map(Task::id)
            .chain(notes.iter().map(Note::id))
            .max()
            .unwrap_or(0);
        let saved = [tasks.len(), notes.len()];

        tracing::info!(
            dir = %storage.dir().display(),
            tasks = tasks.len(),
            notes = notes.len(),
            "store opened"
        );

        Self {
            inner: RwLock::new(Partitions {
                tasks,
                notes,
                next_id: max_id.saturating_add(1),
            }),
            storage: Some(storage),
            saved: Mutex::new(saved),
        }
    }

    /// Check whether appends are persisted
    pub fn is_persistent(&self) -> bool {
        self.storage.is_some()
    }

    /// Append an entity to its kind's sequence
    ///
    /// Unidentified entities get the next id; an entity that already carries
    /// one keeps it. With persistence configured, the kind's sequence is saved
    /// after the append. The append is never rolled back: a save failure is
    /// handed back in [`Appended::save_error`] next to the assigned id.
    pub fn add_entity(&self, entity: Entity) -> Appended {
        let (id, pending) = {
            let mut inner = self.write();
            let id = inner.claim_id(entity.id());
            let persist = self.storage.is_some();
            let pending = match entity {
                Entity::Task(mut task) => {
                    task.assign_id(id);
                    inner.tasks.push(task);
                    persist.then(|| PendingSave::Tasks(inner.tasks.clone()))
                }
                Entity::Note(mut note) => {
                    note.assign_id(id);
                    inner.notes.push(note);
                    persist.then(|| PendingSave::Notes(inner.notes.clone()))
                }
            };
            (id, pending)
        };

        let save_error = pending.and_then(|pending| self.persist(pending).err());
        Appended { id, save_error }
    }

    /// Copy of every entity of `kind`, in insertion order
    pub fn snapshot(&self, kind: EntityKind) -> Vec<Entity> {
        self.read().suffix(kind, 0)
    }

    /// Entities of `kind` appended at or after index `cursor`
    ///
    /// Returns an empty vector when `cursor` is at or past the end.
    pub fn since_cursor(&self, kind: EntityKind, cursor: Cursor) -> Vec<Entity> {
        self.read().suffix(kind, cursor)
    }

    /// Number of stored (tasks, notes)
    pub fn count(&self) -> (usize, usize) {
        let inner = self.read();
        (inner.tasks.len(), inner.notes.len())
    }

    /// Number of stored entities of `kind`
    pub fn len(&self, kind: EntityKind) -> usize {
        self.read().len(kind)
    }

    /// Check whether neither kind holds anything
    pub fn is_empty(&self) -> bool {
        self.count() == (0, 0)
    }

    /// Copy of all tasks
    pub fn tasks(&self) -> Vec<Task> {
        self.read().tasks.clone()
    }

    /// Copy of all notes
    pub fn notes(&self) -> Vec<Note> {
        self.read().notes.clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, Partitions> {
        self.inner.read().expect("store lock poisoned")
    }

    fn write(&self) -> RwLockWriteGuard<'_, Partitions> {
        self.inner.write().expect("store lock poisoned")
    }

    /// Write a snapshot unless a newer one has already been written
    fn persist(&self, pending: PendingSave) -> Result<()> {
        let Some(storage) = &self.storage else {
            return Ok(());
        };

        let mut saved = self.saved.lock().expect("store save lock poisoned");
        match pending {
            PendingSave::Tasks(tasks) if tasks.len() > saved[0] => {
                storage.save_kind(&tasks)?;
                saved[0] = tasks.len();
            }
            PendingSave::Notes(notes) if notes.len() > saved[1] => {
                storage.save_kind(&notes)?;
                saved[1] = notes.len();
            }
            _ => {}
        }
        Ok(())
    }
}

fn load_or_empty<R: Record>(storage: &Storage) -> Vec<R> {
    match storage.load_kind::<R>() {
        // no id would be left to hand out after this one
        Ok(items) if items.iter().any(|item| item.id() == EntityId::MAX) => {
            tracing::warn!(kind = %R::KIND, "persisted ids exhaust the id space; starting empty");
            Vec::new()
        }
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(
                kind = %R::KIND,
                error = %e,
                "failed to load persisted items; starting empty"
            );
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::model::{NoteCategory, TaskPriority};
    use crate::storage::StorageFormat;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;
    use tempfile::tempdir;

    fn task(title: &str) -> Entity {
        Task::new(title, "", TaskPriority::Medium, None).unwrap().into()
    }

    fn note(title: &str) -> Entity {
        Note::new(title, "", NoteCategory::Idea).into()
    }

    fn titles(entities: &[Entity]) -> Vec<&str> {
        entities.iter().map(Entity::title).collect()
    }

    #[test]
    fn test_add_partitions_by_kind_and_assigns_ids() {
        let store = Store::new();
        assert!(store.is_empty());

        assert_eq!(store.add_entity(task("t1")).id, 1);
        assert_eq!(store.add_entity(note("n1")).id, 2);
        assert_eq!(store.add_entity(task("t2")).id, 3);

        assert_eq!(store.count(), (2, 1));
        let tasks = store.snapshot(EntityKind::Task);
        assert_eq!(titles(&tasks), vec!["t1", "t2"]);
        assert!(tasks.iter().all(Entity::is_identified));
        assert_eq!(store.snapshot(EntityKind::Note)[0].id(), 2);
    }

    #[test]
    fn test_identified_entity_keeps_its_id() {
        let store = Store::new();
        let mut preset = Task::new("preset", "", TaskPriority::Low, None).unwrap();
        preset.assign_id(40);

        assert_eq!(store.add_entity(preset.into()).id, 40);
        assert_eq!(store.add_entity(note("after")).id, 41);
    }

    #[test]
    fn test_since_cursor() {
        let store = Store::new();
        for title in ["a", "b", "c"] {
            store.add_entity(task(title));
        }

        assert_eq!(titles(&store.since_cursor(EntityKind::Task, 0)), vec!["a", "b", "c"]);
        assert_eq!(titles(&store.since_cursor(EntityKind::Task, 2)), vec!["c"]);
        assert!(store.since_cursor(EntityKind::Task, 3).is_empty());
        assert!(store.since_cursor(EntityKind::Task, 100).is_empty());
        assert!(store.since_cursor(EntityKind::Note, 0).is_empty());
    }

    #[test]
    fn test_since_cursor_is_idempotent() {
        let store = Store::new();
        store.add_entity(note("x"));
        store.add_entity(note("y"));

        let first = store.since_cursor(EntityKind::Note, 1);
        let second = store.since_cursor(EntityKind::Note, 1);
        assert_eq!(first, second);
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let store = Store::new();
        store.add_entity(task("one"));
        let snapshot = store.snapshot(EntityKind::Task);

        store.add_entity(task("two"));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.len(EntityKind::Task), 2);
    }

    #[test]
    fn test_concurrent_writers_and_cursor_reader() {
        const WRITERS: usize = 4;
        const PER_WRITER: usize = 50;

        let store = Arc::new(Store::new());
        let writers: Vec<_> = (0..WRITERS)
            .map(|w| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for i in 0..PER_WRITER {
                        let entity = if i % 2 == 0 {
                            task(&format!("w{}-{}", w, i))
                        } else {
                            note(&format!("w{}-{}", w, i))
                        };
                        store.add_entity(entity);
                    }
                })
            })
            .collect();

        let reader = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let mut cursor = 0;
                let mut seen = Vec::new();
                while cursor < WRITERS * PER_WRITER / 2 {
                    let batch = store.since_cursor(EntityKind::Task, cursor);
                    cursor += batch.len();
                    seen.extend(batch.into_iter().map(|e| e.id()));
                    thread::yield_now();
                }
                seen
            })
        };

        for writer in writers {
            writer.join().unwrap();
        }
        let seen = reader.join().unwrap();

        assert_eq!(store.count(), (WRITERS * PER_WRITER / 2, WRITERS * PER_WRITER / 2));
        let unique: HashSet<_> = seen.iter().collect();
        assert_eq!(unique.len(), seen.len());
        let stored: Vec<_> = store.snapshot(EntityKind::Task).iter().map(Entity::id).collect();
        assert_eq!(seen, stored);
    }

    #[test]
    fn test_add_persists_and_open_reloads() {
        let dir = tempdir().unwrap();
        {
            let store = Store::open(Storage::new(dir.path(), StorageFormat::Json));
            assert!(store.is_persistent());
            assert!(store.add_entity(task("saved task")).is_saved());
            assert!(store.add_entity(note("saved note")).is_saved());
        }

        let reopened = Store::open(Storage::new(dir.path(), StorageFormat::Json));
        assert_eq!(reopened.count(), (1, 1));
        assert_eq!(reopened.tasks()[0].title(), "saved task");
        assert_eq!(reopened.notes()[0].id(), 2);
        // ids continue after the largest loaded one
        assert_eq!(reopened.add_entity(task("next")).id, 3);
    }

    #[test]
    fn test_persistence_failure_keeps_in_memory_append() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "file in the way").unwrap();

        let store = Store::open(Storage::new(&blocker, StorageFormat::Json));
        let appended = store.add_entity(task("kept"));

        assert_eq!(appended.id, 1);
        assert!(matches!(appended.save_error, Some(Error::Persistence { .. })));
        assert_eq!(store.count(), (1, 0));
    }

    #[test]
    fn test_open_with_maximal_id_starts_that_kind_empty() {
        let dir = tempdir().unwrap();
        let mut last = Task::new("last", "", TaskPriority::Low, None).unwrap();
        last.assign_id(EntityId::MAX);
        let mut kept = Note::new("kept", "", NoteCategory::Work);
        kept.assign_id(7);
        let storage = Storage::new(dir.path(), StorageFormat::Json);
        storage.save_kind(&[last]).unwrap();
        storage.save_kind(&[kept]).unwrap();

        let store = Store::open(storage);
        assert_eq!(store.count(), (0, 1));
        assert_eq!(store.add_entity(task("fresh")).id, 8);
    }

    #[test]
    fn test_preset_maximal_id_does_not_overflow() {
        let store = Store::new();
        let mut preset = Task::new("edge", "", TaskPriority::Low, None).unwrap();
        preset.assign_id(EntityId::MAX);

        assert_eq!(store.add_entity(preset.into()).id, EntityId::MAX);
        assert_eq!(store.count(), (1, 0));
    }

    #[test]
    fn test_open_with_corrupt_file_starts_empty() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("tasks.json"), "garbage").unwrap();

        let store = Store::open(Storage::new(dir.path(), StorageFormat::Json));
        assert_eq!(store.count(), (0, 0));
    }
}
