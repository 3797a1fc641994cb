//! Filesystem watcher for the generation directory.
//!
//! Owns the notification subscription for its lifetime: raw events are
//! debounced, classified, and fanned out to registered reactions on a
//! dedicated task. The watched directory disappearing is fatal to the loop
//! and surfaces as a [`WatcherError`] to the owner.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{new_debouncer, DebounceEventResult, Debouncer};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::config::Config;

use super::classifier::{ChangeEvent, EventClassifier};

/// Errors that can occur with the watcher
#[derive(Debug, Error)]
pub enum WatcherError {
    #[error("watch directory does not exist: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("watch directory disappeared: {0}")]
    DirectoryLost(PathBuf),

    #[error("notify error: {0}")]
    Notify(#[from] notify::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("raw notification channel disconnected")]
    ChannelClosed,

    #[error("watch loop terminated abnormally")]
    Join(#[from] tokio::task::JoinError),
}

/// Something that reacts to a classified directory change.
///
/// Reactions are invoked sequentially in registration order, so a reaction's
/// own notifications are fully emitted before the next reaction runs.
#[async_trait]
pub trait Reaction: Send + Sync {
    async fn on_event(&self, event: &ChangeEvent);
}

/// Watcher for the generation directory.
pub struct DirectoryWatcher {
    watch_dir: PathBuf,
    artifact_extension: String,
    ignored_names: Vec<String>,
    debounce: Duration,
    reactions: Vec<Arc<dyn Reaction>>,
}

impl DirectoryWatcher {
    pub fn new(config: &Config) -> Self {
        Self {
            watch_dir: config.watch_dir.clone(),
            artifact_extension: config.artifact_extension.clone(),
            ignored_names: config.ignored_names.clone(),
            debounce: Duration::from_millis(config.debounce_ms),
            reactions: Vec::new(),
        }
    }

    /// Register a reaction. Order of registration is order of delivery.
    pub fn register(&mut self, reaction: Arc<dyn Reaction>) {
        self.reactions.push(reaction);
    }

    /// Begin observing. The subscription is fully established when this
    /// returns: a file created immediately afterwards is already covered.
    /// Observation runs on its own task until [`WatchHandle::stop`] or a
    /// fatal error.
    pub async fn start(self) -> Result<WatchHandle, WatcherError> {
        if !self.watch_dir.is_dir() {
            return Err(WatcherError::DirectoryNotFound(self.watch_dir));
        }

        let mut classifier = EventClassifier::new(self.artifact_extension.clone());

        // Seed with what already exists so pre-existing files do not register
        // as appearances on their first unrelated notification.
        let mut existing = Vec::new();
        for entry in std::fs::read_dir(&self.watch_dir)? {
            existing.push(entry?.path());
        }
        classifier.seed(existing);

        // Create debounced watcher
        let (tx, rx) = std::sync::mpsc::channel();
        let mut debouncer = new_debouncer(self.debounce, tx)?;
        debouncer
            .watcher()
            .watch(&self.watch_dir, RecursiveMode::NonRecursive)?;

        tracing::info!("Watching for changes in: {}", self.watch_dir.display());

        let (stop_tx, stop_rx) = mpsc::channel::<()>(1);
        let task = tokio::spawn(run_watch_loop(self, classifier, debouncer, rx, stop_rx));

        Ok(WatchHandle { stop_tx, task })
    }
}

/// Handle to control the watcher
pub struct WatchHandle {
    stop_tx: mpsc::Sender<()>,
    task: tokio::task::JoinHandle<Result<(), WatcherError>>,
}

impl WatchHandle {
    /// Stop the watcher and release the subscription.
    pub async fn stop(self) -> Result<()> {
        let _ = self.stop_tx.send(()).await;
        self.task.await??;
        Ok(())
    }

    /// Wait for the watch loop to exit on its own, surfacing its fatal error.
    pub async fn wait(&mut self) -> Result<(), WatcherError> {
        match (&mut self.task).await {
            Ok(result) => result,
            Err(join_error) => Err(WatcherError::Join(join_error)),
        }
    }
}

/// Internal watch loop. Holds the debouncer so the subscription lives exactly
/// as long as the loop.
async fn run_watch_loop(
    watcher: DirectoryWatcher,
    mut classifier: EventClassifier,
    _debouncer: Debouncer<RecommendedWatcher>,
    rx: std::sync::mpsc::Receiver<DebounceEventResult>,
    mut stop_rx: mpsc::Receiver<()>,
) -> Result<(), WatcherError> {
    loop {
        // Check for stop signal
        if stop_rx.try_recv().is_ok() {
            tracing::info!("Watcher stopping...");
            break;
        }

        // The watched directory vanishing is fatal; the owner decides whether
        // to re-create the watch.
        if !watcher.watch_dir.is_dir() {
            tracing::error!("Watch directory lost: {}", watcher.watch_dir.display());
            return Err(WatcherError::DirectoryLost(watcher.watch_dir.clone()));
        }

        // Check for file events (non-blocking with timeout)
        match rx.recv_timeout(Duration::from_millis(200)) {
            Ok(Ok(events)) => {
                for event in events {
                    let path = event.path;

                    let name = path
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    if watcher.ignored_names.iter().any(|ignored| ignored == &name) {
                        continue;
                    }

                    let change = classifier.classify(path);
                    tracing::debug!(?change.kind, path = %change.path.display(), "change");

                    for reaction in &watcher.reactions {
                        reaction.on_event(&change).await;
                    }
                }
            }
            Ok(Err(e)) => {
                tracing::warn!("Watcher error: {:?}", e);
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {
                // Expected - loop back to the stop and liveness checks
            }
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => {
                tracing::error!("Watcher channel disconnected");
                return Err(WatcherError::ChannelClosed);
            }
        }

        // Small sleep to prevent busy loop
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    Ok(())
}
