use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{EntityId, UNIDENTIFIED, advance_timestamp};
use crate::error::{Error, Result};
use crate::validation::parse_enum;

/// Note category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoteCategory {
    Personal,
    Work,
    Idea,
}

impl NoteCategory {
    pub const ALL: [NoteCategory; 3] =
        [NoteCategory::Personal, NoteCategory::Work, NoteCategory::Idea];

    pub fn as_str(&self) -> &'static str {
        match self {
            NoteCategory::Personal => "personal",
            NoteCategory::Work => "work",
            NoteCategory::Idea => "idea",
        }
    }
}

impl fmt::Display for NoteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let names = NoteCategory::ALL.map(|v| v.as_str());
        parse_enum("note category", s, &names).map(|i| NoteCategory::ALL[i])
    }
}

/// A note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    id: EntityId,
    title: String,
    content: String,
    category: NoteCategory,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Note {
    /// Create a new, unidentified note
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        category: NoteCategory,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: UNIDENTIFIED,
            title: title.into(),
            content: content.into(),
            category,
            created_at: now,
            updated_at: now,
        }
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

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.touch();
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.touch();
    }

    pub fn category(&self) -> NoteCategory {
        self.category
    }

    pub fn set_category(&mut self, category: NoteCategory) {
        self.category = category;
        self.touch();
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn touch(&mut self) {
        self.updated_at = advance_timestamp(self.updated_at);
    }
}
