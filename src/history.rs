//! Command history: the capability trait the `history` builtin relies on and
//! the file-backed store used by the interactive shell.

use crate::config::Config;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Fields per persisted line: `timestamp|directory|command`.
const LINE_PARTS: usize = 3;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("unsupported export format: {0}")]
    UnsupportedFormat(String),

    #[error("history file {}: {source}", path.display())]
    File { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub command: String,
    pub timestamp: DateTime<Local>,
    pub directory: String,
}

/// What the shell core needs from a history backend.
pub trait HistoryStore {
    fn append(&mut self, command: &str);

    fn all(&self) -> &[Entry];

    /// Most recent `n` entries, oldest first.
    fn recent(&self, n: usize) -> &[Entry] {
        let all = self.all();
        &all[all.len().saturating_sub(n)..]
    }

    /// Entries whose command contains `term`, ignoring case.
    fn search(&self, term: &str) -> Vec<&Entry> {
        if term.is_empty() {
            return Vec::new();
        }
        let term = term.to_lowercase();
        self.all()
            .iter()
            .filter(|e| e.command.to_lowercase().contains(&term))
            .collect()
    }

    fn clear(&mut self) -> Result<(), HistoryError>;

    fn export(&self, path: &Path, format: &str) -> Result<(), HistoryError>;
}

/// In-memory history, optionally mirrored to a file after every change.
#[derive(Debug)]
pub struct History {
    entries: Vec<Entry>,
    max_size: usize,
    allow_duplicates: bool,
    file: Option<PathBuf>,
}

impl History {
    /// A history that never touches the filesystem.
    pub fn in_memory(max_size: usize, allow_duplicates: bool) -> Self {
        Self {
            entries: Vec::new(),
            max_size,
            allow_duplicates,
            file: None,
        }
    }

    /// Builds the store described by `cfg`, loading the existing file if any.
    ///
    /// A file that cannot be read is reported and the history starts empty.
    pub fn from_config(cfg: &Config) -> Self {
        let mut history = Self::in_memory(cfg.history_size, cfg.history_duplicates);
        if cfg.save_history {
            history.file = cfg.history_file.clone();
            if let Err(e) = history.load() {
                tracing::warn!("failed to load history: {e}");
            }
        }
        history
    }

    fn load(&mut self) -> Result<(), HistoryError> {
        let Some(path) = &self.file else {
            return Ok(());
        };
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(source) => {
                return Err(HistoryError::File {
                    path: path.clone(),
                    source,
                });
            }
        };
        self.entries = text.lines().filter_map(parse_line).collect();
        self.trim();
        Ok(())
    }

    fn save(&self) -> Result<(), HistoryError> {
        let Some(path) = &self.file else {
            return Ok(());
        };
        let file_err = |source| HistoryError::File {
            path: path.clone(),
            source,
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(file_err)?;
        }
        let mut out = io::BufWriter::new(fs::File::create(path).map_err(file_err)?);
        for e in &self.entries {
            writeln!(
                out,
                "{}|{}|{}",
                e.timestamp.to_rfc3339(),
                e.directory,
                e.command
            )
            .map_err(file_err)?;
        }
        out.flush().map_err(file_err)
    }

    fn trim(&mut self) {
        if self.entries.len() > self.max_size {
            let excess = self.entries.len() - self.max_size;
            self.entries.drain(..excess);
        }
    }
}

fn parse_line(line: &str) -> Option<Entry> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let parts: Vec<&str> = line.splitn(LINE_PARTS, '|').collect();
    if parts.len() < LINE_PARTS {
        // Legacy format: the command alone.
        return Some(Entry {
            command: line.to_string(),
            timestamp: Local::now(),
            directory: String::new(),
        });
    }
    let timestamp = DateTime::parse_from_rfc3339(parts[0])
        .map(|t| t.with_timezone(&Local))
        .unwrap_or_else(|_| Local::now());
    Some(Entry {
        command: parts[2].to_string(),
        timestamp,
        directory: parts[1].to_string(),
    })
}

impl HistoryStore for History {
    fn append(&mut self, command: &str) {
        let command = command.trim();
        if command.is_empty() {
            return;
        }
        if !self.allow_duplicates && self.entries.last().is_some_and(|e| e.command == command) {
            return;
        }
        let directory = std::env::current_dir()
            .map(|d| d.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.entries.push(Entry {
            command: command.to_string(),
            timestamp: Local::now(),
            directory,
        });
        self.trim();
        if let Err(e) = self.save() {
            tracing::warn!("failed to save history: {e}");
        }
    }

    fn all(&self) -> &[Entry] {
        &self.entries
    }

    fn clear(&mut self) -> Result<(), HistoryError> {
        self.entries.clear();
        if let Some(path) = &self.file {
            match fs::remove_file(path) {
                Err(e) if e.kind() != io::ErrorKind::NotFound => {
                    return Err(HistoryError::File {
                        path: path.clone(),
                        source: e,
                    });
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn export(&self, path: &Path, format: &str) -> Result<(), HistoryError> {
        let body = match format {
            "bash" => self
                .entries
                .iter()
                .map(|e| format!("{}\n", e.command))
                .collect::<String>(),
            "json" => {
                let mut s = serde_json::to_string_pretty(&self.entries)?;
                s.push('\n');
                s
            }
            other => return Err(HistoryError::UnsupportedFormat(other.to_string())),
        };
        fs::write(path, body).map_err(|source| HistoryError::File {
            path: path.to_path_buf(),
            source,
        })
    }
}
