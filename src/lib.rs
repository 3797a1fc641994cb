//! midiwatch - directory watcher and generation-job dispatcher
//!
//! Watches one flat directory of generated MIDI artifacts, announces new
//! artifacts to the hosting environment, and runs external generator
//! processes on command.
//!
//! # Architecture
//!
//! - The watcher owns the filesystem-notification subscription for its
//!   lifetime and fans classified change events out to registered reactions.
//! - Directory state is never patched incrementally: every listing is a
//!   fresh, atomic snapshot.
//! - Generation is delegated to external processes through a dispatcher that
//!   holds a single job slot; a second concurrent request is rejected.
//!
//! # Modules
//!
//! - `watch`: snapshots, event classification, the watcher loop
//! - `dispatch`: generation requests, validation, process supervision
//! - `commands`: the command surface and the artifact-announcing reaction
//! - `outlet`: outbound notification protocol and sinks
//! - `config`, `cli`: configuration and the binary surface
//!
//! # Usage
//!
//! ```bash
//! # Observe the generation directory
//! midiwatch watch
//!
//! # Emit the current listing
//! midiwatch list-files
//!
//! # Run the parameterized generator
//! midiwatch generate 12 30 43 480 0.05 0.7 0.5
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod outlet;
pub mod watch;

// Re-export main types at crate root for convenience
pub use commands::{ArtifactAnnouncer, Command, CommandRegistry};
pub use config::Config;
pub use dispatch::{
    DispatchError, ExitStatus, GenerationOutcome, GenerationRequest, JobDispatcher,
    ValidationError,
};
pub use outlet::{ConsoleOutlet, MemoryOutlet, Notification, Outlet};
pub use watch::{
    ChangeEvent, ChangeKind, DirectoryEntry, DirectorySnapshot, DirectoryWatcher, EntryKind,
    EventClassifier, Reaction, SnapshotError, WatchHandle, WatcherError,
};
