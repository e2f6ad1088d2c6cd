use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{EntityId, UNIDENTIFIED, advance_timestamp};
use crate::error::{Error, Result};
use crate::validation::{parse_enum, validate_title};

/// Task status
///
/// Uses kebab-case naming to match the persisted format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Done => "done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let names = TaskStatus::ALL.map(|v| v.as_str());
        parse_enum("task status", s, &names).map(|i| TaskStatus::ALL[i])
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 3] =
        [TaskPriority::Low, TaskPriority::Medium, TaskPriority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskPriority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let names = TaskPriority::ALL.map(|v| v.as_str());
        parse_enum("task priority", s, &names).map(|i| TaskPriority::ALL[i])
    }
}

/// A task
///
/// Fields are private so that every mutation goes through a setter that
/// validates its input and advances `updated_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    id: EntityId,
    title: String,
    description: String,
    status: TaskStatus,
    priority: TaskPriority,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    due_date: Option<DateTime<Utc>>,
}

impl Task {
    /// Create a new task
    ///
    /// The task starts unidentified with status `todo`.
    ///
    /// # Arguments
    /// * `title` - 1 to 100 characters
    /// * `description` - Free text
    /// * `priority` - Initial priority
    /// * `due_date` - Optional deadline
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        priority: TaskPriority,
        due_date: Option<DateTime<Utc>>,
    ) -> Result<Self> {
        let title = title.into();
        validate_title(&title)?;

        let now = Utc::now();
        Ok(Self {
            id: UNIDENTIFIED,
            title,
            description: description.into(),
            status: TaskStatus::Todo,
            priority,
            created_at: now,
            updated_at: now,
            due_date,
        })
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub(crate) fn assign_id(&mut self, id: EntityId) {
        self.id = id;
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<()> {
        let title = title.into();
        validate_title(&title)?;
        self.title = title;
        self.touch();
        Ok(())
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
        self.touch();
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
        self.touch();
    }

    /// Parse and set the status from its name (e.g. "in-progress")
    pub fn set_status_str(&mut self, status: &str) -> Result<()> {
        self.set_status(status.parse()?);
        Ok(())
    }

    pub fn priority(&self) -> TaskPriority {
        self.priority
    }

    pub fn set_priority(&mut self, priority: TaskPriority) {
        self.priority = priority;
        self.touch();
    }

    /// Parse and set the priority from its name (e.g. "high")
    pub fn set_priority_str(&mut self, priority: &str) -> Result<()> {
        self.set_priority(priority.parse()?);
        Ok(())
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    pub fn set_due_date(&mut self, due_date: Option<DateTime<Utc>>) {
        self.due_date = due_date;
        self.touch();
    }

    pub fn mark_in_progress(&mut self) {
        self.set_status(TaskStatus::InProgress);
    }

    pub fn mark_done(&mut self) {
        self.set_status(TaskStatus::Done);
    }

    /// Check whether the due date has passed
    pub fn is_overdue(&self) -> bool {
        self.due_date.is_some_and(|due| Utc::now() > due)
    }

    /// Whole days until the due date
    ///
    /// Positive before the deadline, negative after it, `None` without one.
    pub fn days_until_due(&self) -> Option<i64> {
        self.due_date.map(|due| (due - Utc::now()).num_days())
    }

    fn touch(&mut self) {
        self.updated_at = advance_timestamp(self.updated_at);
    }
}
