//! Control surface: named commands and the watcher reaction.
//!
//! The registry binds the inbound message names to core operations and
//! translates every result, success or failure, into outbound notifications.
//! No delegate error ever propagates past a handler.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Config;
use crate::dispatch::{DispatchError, GenerationOutcome, GenerationRequest, JobDispatcher};
use crate::outlet::{Notification, Outlet};
use crate::watch::{ChangeEvent, ChangeKind, DirectorySnapshot, Reaction};

/// An inbound command, by host message name.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    ListFiles,
    GenerateMotifs,
    DeleteAllFiles,
    Generate(Vec<String>),
}

impl Command {
    /// Bind a host message name and its arguments to a command.
    pub fn parse(name: &str, args: &[String]) -> Option<Self> {
        match name {
            "list_files" => Some(Self::ListFiles),
            "generateMotifs" => Some(Self::GenerateMotifs),
            "deleteAllFiles" => Some(Self::DeleteAllFiles),
            "generate" => Some(Self::Generate(args.to_vec())),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ListFiles => "list_files",
            Self::GenerateMotifs => "generateMotifs",
            Self::DeleteAllFiles => "deleteAllFiles",
            Self::Generate(_) => "generate",
        }
    }
}

/// Routes commands to the snapshot and dispatcher, reporting through the
/// outlet.
pub struct CommandRegistry {
    config: Config,
    dispatcher: JobDispatcher,
    outlet: Arc<dyn Outlet>,
}

impl CommandRegistry {
    pub fn new(config: Config, outlet: Arc<dyn Outlet>) -> Self {
        let dispatcher = JobDispatcher::new(&config);
        Self {
            config,
            dispatcher,
            outlet,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn dispatcher(&self) -> &JobDispatcher {
        &self.dispatcher
    }

    /// Handle one command. Never returns an error: every fault is reported
    /// outward as a diagnostic.
    pub async fn handle(&self, command: Command) {
        match command {
            Command::ListFiles => self.list_files().await,
            Command::GenerateMotifs => self.generate_motifs().await,
            Command::DeleteAllFiles => self.delete_all_files().await,
            Command::Generate(args) => self.generate(&args).await,
        }
    }

    /// Refresh the snapshot and emit the listing protocol: `Clear`,
    /// `Location`, one `File` per entry. Always a fresh refresh; the last
    /// change event is never trusted.
    pub async fn list_files(&self) {
        let snapshot =
            match DirectorySnapshot::refresh(&self.config.watch_dir, &self.config.ignored_names)
                .await
            {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    self.diagnostic(format!("Error reading directory: {e}"));
                    return;
                }
            };

        self.outlet.send(Notification::Clear);
        self.outlet
            .send(Notification::Location(self.config.watch_dir.clone()));
        for entry in snapshot.entries() {
            self.outlet.send(Notification::File(entry.name.clone()));
        }
    }

    /// Run the fixed generator invocation.
    pub async fn generate_motifs(&self) {
        match self.dispatcher.run_direct().await {
            Ok(outcome) => self.report_outcome(&outcome),
            Err(e) => self.diagnostic(format!("exec error: {e}")),
        }
    }

    /// Parse the seven positional parameters and run the parameterized
    /// generator.
    pub async fn generate(&self, args: &[String]) {
        let request = match GenerationRequest::from_args(args) {
            Ok(request) => request,
            Err(e) => {
                self.diagnostic(format!("exec error: {}", DispatchError::Validation(e)));
                return;
            }
        };

        match self.dispatcher.run_parameterized(&request).await {
            Ok(outcome) => self.report_outcome(&outcome),
            Err(e) => self.diagnostic(format!("exec error: {e}")),
        }
    }

    /// Delete every current directory entry. Partial-failure semantics:
    /// each deletion is attempted and reported individually.
    pub async fn delete_all_files(&self) {
        let snapshot =
            match DirectorySnapshot::refresh(&self.config.watch_dir, &self.config.ignored_names)
                .await
            {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    self.diagnostic(format!("Error reading directory: {e}"));
                    return;
                }
            };

        for entry in snapshot.entries() {
            let path = self.config.watch_dir.join(&entry.name);
            match tokio::fs::remove_file(&path).await {
                Ok(()) => self.diagnostic(format!("Deleted file: {}", entry.name)),
                Err(e) => self.diagnostic(format!("Error deleting file {}: {e}", entry.name)),
            }
        }
    }

    fn report_outcome(&self, outcome: &GenerationOutcome) {
        self.diagnostic(format!("stdout: {}", outcome.stdout));
        self.diagnostic(format!("stderr: {}", outcome.stderr));
        match outcome.status {
            crate::dispatch::ExitStatus::Success => {}
            crate::dispatch::ExitStatus::Failure(code) => {
                self.diagnostic(format!("generator exited with status {code}"));
            }
            crate::dispatch::ExitStatus::Timeout => {
                self.diagnostic("generator timed out".to_string());
            }
        }
    }

    fn diagnostic(&self, message: String) {
        self.outlet.send(Notification::Diagnostic(message));
    }
}

/// Watcher reaction that announces new artifacts and re-emits the listing.
///
/// Ordering contract for a single underlying change: the artifact path and
/// `midi` tag go out first, the refreshed listing second.
pub struct ArtifactAnnouncer {
    registry: Arc<CommandRegistry>,
    outlet: Arc<dyn Outlet>,
}

impl ArtifactAnnouncer {
    pub fn new(registry: Arc<CommandRegistry>, outlet: Arc<dyn Outlet>) -> Self {
        Self { registry, outlet }
    }
}

#[async_trait]
impl Reaction for ArtifactAnnouncer {
    async fn on_event(&self, event: &ChangeEvent) {
        let name = event.file_name().unwrap_or_default();
        match event.kind {
            ChangeKind::Appeared => {
                self.outlet
                    .send(Notification::Diagnostic(format!("New file detected: {name}")));
                if crate::watch::is_artifact(
                    &event.path,
                    &self.registry.config().artifact_extension,
                ) {
                    self.outlet.send(Notification::Artifact(event.path.clone()));
                    self.outlet.send(Notification::Midi);
                }
                self.registry.list_files().await;
            }
            ChangeKind::Removed => {
                self.outlet
                    .send(Notification::Diagnostic(format!("Change detected: {name}")));
                self.registry.list_files().await;
            }
            // Content churn on known files carries no rename semantics.
            ChangeKind::Unknown => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_parse_binds_host_names() {
        assert_eq!(Command::parse("list_files", &[]), Some(Command::ListFiles));
        assert_eq!(
            Command::parse("generateMotifs", &[]),
            Some(Command::GenerateMotifs)
        );
        assert_eq!(
            Command::parse("deleteAllFiles", &[]),
            Some(Command::DeleteAllFiles)
        );

        let args = vec!["12".to_string()];
        assert_eq!(
            Command::parse("generate", &args),
            Some(Command::Generate(args.clone()))
        );
        assert_eq!(Command::parse("reboot", &[]), None);
    }

    #[test]
    fn test_command_names_round_trip() {
        for command in [
            Command::ListFiles,
            Command::GenerateMotifs,
            Command::DeleteAllFiles,
            Command::Generate(Vec::new()),
        ] {
            assert_eq!(Command::parse(command.name(), &[]).unwrap().name(), command.name());
        }
    }
}
