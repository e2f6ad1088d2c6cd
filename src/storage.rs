//! File persistence for tasks and notes
//!
//! Each kind lives in its own file inside the data directory
//! (`tasks.json`, `notes.csv`, ...). Saving writes the configured format;
//! loading reads JSON when present and falls back to CSV. A directory with
//! neither file loads as empty.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::model::{EntityKind, Record};

/// On-disk encoding of a persisted kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageFormat {
    #[default]
    Json,
    Csv,
}

impl StorageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            StorageFormat::Json => "json",
            StorageFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for StorageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for StorageFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(StorageFormat::Json),
            "csv" => Ok(StorageFormat::Csv),
            other => Err(Error::Config(format!(
                "unknown storage format '{}'. Valid options are: json, csv",
                other
            ))),
        }
    }
}

pub struct Storage {
    dir: PathBuf,
    format: StorageFormat,
}

impl Storage {
    pub fn new(dir: impl AsRef<Path>, format: StorageFormat) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            format,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding `kind` in `format`
    pub fn path_for(&self, kind: EntityKind, format: StorageFormat) -> PathBuf {
        self.dir.join(format!("{}.{}", kind.plural(), format.extension()))
    }

    /// Write every item of one kind, replacing the previous file
    pub fn save_kind<R: Record>(&self, items: &[R]) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| Error::persistence(&self.dir, e))?;

        let path = self.path_for(R::KIND, self.format);
        match self.format {
            StorageFormat::Json => save_json(&path, items),
            StorageFormat::Csv => {
                save_csv(&path, items)?;
                // JSON is read first, so an older JSON file would shadow this save
                let stale = self.path_for(R::KIND, StorageFormat::Json);
                match fs::remove_file(&stale) {
                    Err(e) if e.kind() != io::ErrorKind::NotFound => {
                        Err(Error::persistence(&stale, e))
                    }
                    _ => Ok(()),
                }
            }
        }
    }

    /// Read every item of one kind, JSON first, then CSV
    ///
    /// Returns an empty sequence when no file exists for the kind.
    pub fn load_kind<R: Record>(&self) -> Result<Vec<R>> {
        for format in [StorageFormat::Json, StorageFormat::Csv] {
            let path = self.path_for(R::KIND, format);
            if !path.exists() {
                continue;
            }
            return match format {
                StorageFormat::Json => load_json(&path),
                StorageFormat::Csv => load_csv(&path),
            };
        }
        Ok(Vec::new())
    }
}

fn save_json<R: Record>(path: &Path, items: &[R]) -> Result<()> {
    let content = serde_json::to_string_pretty(items).map_err(|e| Error::persistence(path, e))?;
    fs::write(path, content).map_err(|e| Error::persistence(path, e))
}

fn load_json<R: Record>(path: &Path) -> Result<Vec<R>> {
    let content = fs::read_to_string(path).map_err(|e| Error::persistence(path, e))?;
    serde_json::from_str(&content).map_err(|e| Error::persistence(path, e))
}

fn save_csv<R: Record>(path: &Path, items: &[R]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| Error::persistence(path, e))?;
    for item in items {
        writer.serialize(item).map_err(|e| Error::persistence(path, e))?;
    }
    writer.flush().map_err(|e| Error::persistence(path, e))
}

fn load_csv<R: Record>(path: &Path) -> Result<Vec<R>> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| Error::persistence(path, e))?;
    reader
        .deserialize()
        .collect::<std::result::Result<Vec<R>, _>>()
        .map_err(|e| Error::persistence(path, e))
}
