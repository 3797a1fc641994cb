//! Directory observation: snapshots, event classification, and the watcher.
//!
//! The pipeline:
//!
//! ```text
//! raw notify events → debounce → EventClassifier → ChangeEvent → Reactions
//!                                      ↑
//!                     DirectorySnapshot (queried on demand)
//! ```

pub mod classifier;
pub mod snapshot;
pub mod watcher;

// Re-export key types
pub use classifier::{is_artifact, ChangeEvent, ChangeKind, EventClassifier};
pub use snapshot::{DirectoryEntry, DirectorySnapshot, EntryKind, SnapshotError};
pub use watcher::{DirectoryWatcher, Reaction, WatchHandle, WatcherError};
