//! Outbound notification sink.
//!
//! Everything the core tells the hosting environment goes through an
//! [`Outlet`]: artifact announcements, the file-listing protocol, and
//! free-text diagnostics. The sink itself is opaque to the core.

use std::path::PathBuf;
use std::sync::Mutex;

/// A single outbound message.
///
/// The listing protocol is `Clear`, then `Location`, then one `File` per
/// directory entry. A new artifact is announced as the bare `Artifact` path
/// followed by the `Midi` tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// Path of a newly detected artifact file (untagged payload).
    Artifact(PathBuf),

    /// Tag confirming the detected file matches the artifact extension.
    Midi,

    /// Start of a file listing.
    Clear,

    /// The watched directory a listing refers to.
    Location(PathBuf),

    /// One directory entry in a listing.
    File(String),

    /// Free-text diagnostic line (errors, process output).
    Diagnostic(String),
}

/// Sink for outbound notifications.
pub trait Outlet: Send + Sync {
    fn send(&self, notification: Notification);
}

/// Outlet that writes protocol messages to stdout, one per line, and routes
/// diagnostics through tracing.
#[derive(Debug, Default)]
pub struct ConsoleOutlet;

impl ConsoleOutlet {
    pub fn new() -> Self {
        Self
    }
}

impl Outlet for ConsoleOutlet {
    fn send(&self, notification: Notification) {
        match notification {
            Notification::Artifact(path) => println!("{}", path.display()),
            Notification::Midi => println!("midi"),
            Notification::Clear => println!("clear clear"),
            Notification::Location(dir) => println!("location {}", dir.display()),
            Notification::File(name) => println!("file {}", name),
            Notification::Diagnostic(message) => tracing::info!("{message}"),
        }
    }
}

/// Outlet that records every notification, for tests and embedders that want
/// to inspect the stream.
#[derive(Debug, Default)]
pub struct MemoryOutlet {
    sent: Mutex<Vec<Notification>>,
}

impl MemoryOutlet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything sent so far, in order.
    pub fn snapshot(&self) -> Vec<Notification> {
        self.sent.lock().expect("outlet mutex poisoned").clone()
    }
}

impl Outlet for MemoryOutlet {
    fn send(&self, notification: Notification) {
        self.sent
            .lock()
            .expect("outlet mutex poisoned")
            .push(notification);
    }
}
