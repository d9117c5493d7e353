//! Compilation database model
//!
//! A compilation database (conventionally `compile_commands.json`) is a JSON
//! array with one compiler invocation per translation unit. Only `file` and
//! `command` are required here; other fields are ignored.

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::flags::FlagExtractor;

/// Source file path -> flag tokens, in database order
pub type FlagMap = IndexMap<String, Vec<String>, FxBuildHasher>;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Compilation database not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Failed to read compilation database {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed compilation database {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A single compile command entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileCommand {
    pub file: String,
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CompilationDatabase {
    entries: Vec<CompileCommand>,
}

impl CompilationDatabase {
    /// Read the raw database bytes
    pub fn read_bytes(path: &Path) -> Result<Vec<u8>, DatabaseError> {
        std::fs::read(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                DatabaseError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                DatabaseError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })
    }

    /// Read and decode a compilation database file
    pub fn load(path: &Path) -> Result<Self, DatabaseError> {
        let bytes = Self::read_bytes(path)?;
        Self::from_slice(&bytes, path)
    }

    /// Decode a database already read into memory. `path` is only used for errors.
    pub fn from_slice(bytes: &[u8], path: &Path) -> Result<Self, DatabaseError> {
        let entries: Vec<CompileCommand> =
            serde_json::from_slice(bytes).map_err(|source| DatabaseError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;
        debug!("Decoded {} compile commands from {:?}", entries.len(), path);
        Ok(Self { entries })
    }

    pub fn from_entries(entries: Vec<CompileCommand>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CompileCommand] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Extract flags for every entry. A file listed more than once keeps only
    /// the flags of its last entry.
    pub fn to_flag_map(&self) -> FlagMap {
        let extractor = FlagExtractor::new();
        let mut map = FlagMap::default();
        for entry in &self.entries {
            map.insert(entry.file.clone(), extractor.extract(&entry.command));
        }
        map
    }
}
