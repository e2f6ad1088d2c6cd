//! In-memory task list with filtering
//!
//! This lives outside the concurrent path: it is built from a Store
//! snapshot when a caller wants to slice tasks by status, priority or
//! creation date.

use chrono::{DateTime, Utc};

use super::{EntityId, Task, TaskPriority, TaskStatus};

/// Filter criteria for tasks; unset criteria match everything
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilter {
    status: Option<TaskStatus>,
    priority: Option<TaskPriority>,
    from_date: Option<DateTime<Utc>>,
    to_date: Option<DateTime<Utc>>,
}

impl TaskFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Restrict to tasks created within `[from, to]`; either bound may be open
    pub fn with_date_range(
        mut self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Self {
        self.from_date = from;
        self.to_date = to;
        self
    }

    /// Check whether a task satisfies every criterion that is set
    pub fn matches(&self, task: &Task) -> bool {
        if self.status.is_some_and(|s| task.status() != s) {
            return false;
        }
        if self.priority.is_some_and(|p| task.priority() != p) {
            return false;
        }
        if self.from_date.is_some_and(|from| task.created_at() < from) {
            return false;
        }
        if self.to_date.is_some_and(|to| task.created_at() > to) {
            return false;
        }
        true
    }
}

/// An ordered list of tasks
#[derive(Debug, Clone, Default)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, task: Task) {
        self.tasks.push(task);
    }

    /// Remove a task by id and return it
    pub fn remove(&mut self, id: EntityId) -> Option<Task> {
        let pos = self.tasks.iter().position(|t| t.id() == id)?;
        Some(self.tasks.remove(pos))
    }

    pub fn get(&self, id: EntityId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id() == id)
    }

    pub fn all(&self) -> &[Task] {
        &self.tasks
    }

    /// Tasks matching `filter`, in list order
    pub fn filter(&self, filter: &TaskFilter) -> Vec<&Task> {
        self.tasks.iter().filter(|t| filter.matches(t)).collect()
    }

    pub fn count(&self) -> usize {
        self.tasks.len()
    }

    pub fn count_by_status(&self, status: TaskStatus) -> usize {
        self.tasks.iter().filter(|t| t.status() == status).count()
    }
}

impl FromIterator<Task> for TaskList {
    fn from_iter<I: IntoIterator<Item = Task>>(iter: I) -> Self {
        Self {
            tasks: iter.into_iter().collect(),
        }
    }
}
