//! Queryable view of the watched directory.
//!
//! A snapshot is rebuilt wholesale by [`DirectorySnapshot::refresh`]; there is
//! no incremental patching, so readers never observe a torn state.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while listing the directory
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("watch directory is unreadable: {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Kind of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    RegularFile,
    Other,
}

/// One entry of the watched directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// File name, unique within a snapshot.
    pub name: String,

    /// Regular file or anything else (directory, symlink, socket).
    pub kind: EntryKind,
}

/// Ordered, deduplicated listing of the watched directory at one refresh.
#[derive(Debug, Clone, Default)]
pub struct DirectorySnapshot {
    entries: Vec<DirectoryEntry>,
}

impl DirectorySnapshot {
    /// List `dir` flat (no recursion), skipping `ignored` names.
    ///
    /// Entries appear in the order the filesystem reports them. Fails if the
    /// directory cannot be read at all; individual entries whose metadata has
    /// vanished mid-listing are kept with [`EntryKind::Other`] rather than
    /// failing the whole refresh.
    pub async fn refresh(dir: &Path, ignored: &[String]) -> Result<Self, SnapshotError> {
        let unreadable = |source| SnapshotError::Unreadable {
            path: dir.to_path_buf(),
            source,
        };

        let mut entries = Vec::new();
        let mut read_dir = tokio::fs::read_dir(dir).await.map_err(unreadable)?;

        while let Some(entry) = read_dir.next_entry().await.map_err(unreadable)? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if ignored.iter().any(|ignored| ignored == &name) {
                continue;
            }

            let kind = match entry.file_type().await {
                Ok(file_type) if file_type.is_file() => EntryKind::RegularFile,
                _ => EntryKind::Other,
            };

            entries.push(DirectoryEntry { name, kind });
        }

        Ok(Self { entries })
    }

    /// Read-only view of the entries, in listing order.
    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    /// Entry names, in listing order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
