//! Formatting helpers for reports and final statistics
//!
//! Every report line names the entity kind, its id and a kind-specific
//! summary: status and priority for tasks, category for notes.

use crate::model::{Entity, Note, Task, TaskList, TaskStatus};

/// One-line description of a task
pub fn describe_task(task: &Task) -> String {
    let mut line = format!(
        "task #{} '{}' (status: {}, priority: {}",
        task.id(),
        task.title(),
        task.status(),
        task.priority()
    );
    if let Some(days) = task.days_until_due() {
        line.push_str(&format!(", due in {} day(s)", days));
    }
    line.push(')');
    line
}

/// One-line description of a note
pub fn describe_note(note: &Note) -> String {
    format!("note #{} '{}' (category: {})", note.id(), note.title(), note.category())
}

pub fn describe_entity(entity: &Entity) -> String {
    match entity {
        Entity::Task(task) => describe_task(task),
        Entity::Note(note) => describe_note(note),
    }
}

/// Final statistics block printed when the program exits
///
/// # Arguments
/// * `tasks` - Stored tasks, used for the per-status breakdown
/// * `note_count` - Number of stored notes
pub fn format_statistics(tasks: &TaskList, note_count: usize) -> String {
    let mut result = String::from("=== FINAL STATISTICS ===\n");
    result.push_str(&format!("Tasks: {}\n", tasks.count()));
    for status in TaskStatus::ALL {
        result.push_str(&format!("  {}: {}\n", status, tasks.count_by_status(status)));
    }
    result.push_str(&format!("Notes: {}\n", note_count));
    result.push_str(&format!("Total: {}\n", tasks.count() + note_count));
    result
}
