//! Classification of raw filesystem notifications into domain events.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

/// What happened to a path, as far as the watcher can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// The path now exists and was not known before.
    Appeared,

    /// The path no longer exists.
    Removed,

    /// The path exists and was already known (content change, metadata churn).
    Unknown,
}

/// A classified filesystem change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub path: PathBuf,
    pub observed_at: DateTime<Utc>,
}

impl ChangeEvent {
    /// Final path component, if representable.
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|name| name.to_str())
    }
}

/// Check whether a path names an artifact file, by extension alone.
///
/// Case-insensitive, no I/O.
pub fn is_artifact(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

/// Turns raw rename/mutation notifications into [`ChangeEvent`]s.
///
/// The classifier tracks which paths are known to exist. It is seeded from an
/// initial listing so files present before the watch started do not register
/// as appearances on their first unrelated notification.
#[derive(Debug)]
pub struct EventClassifier {
    artifact_extension: String,
    known: HashSet<PathBuf>,
}

impl EventClassifier {
    pub fn new(artifact_extension: impl Into<String>) -> Self {
        Self {
            artifact_extension: artifact_extension.into(),
            known: HashSet::new(),
        }
    }

    /// Mark paths as already existing.
    pub fn seed(&mut self, paths: impl IntoIterator<Item = PathBuf>) {
        self.known.extend(paths);
    }

    /// Classify one notified path.
    ///
    /// The existence check decides: a path deleted between the notification
    /// and this call classifies as [`ChangeKind::Removed`], never an error.
    pub fn classify(&mut self, path: PathBuf) -> ChangeEvent {
        let kind = if path.exists() {
            if self.known.insert(path.clone()) {
                ChangeKind::Appeared
            } else {
                ChangeKind::Unknown
            }
        } else {
            self.known.remove(&path);
            ChangeKind::Removed
        };

        ChangeEvent {
            kind,
            path,
            observed_at: Utc::now(),
        }
    }

    /// Whether the path matches the configured artifact extension.
    pub fn is_artifact(&self, path: &Path) -> bool {
        is_artifact(path, &self.artifact_extension)
    }
}
