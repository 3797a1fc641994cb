//! Configuration for midiwatch.
//!
//! Sources (highest priority first):
//! 1. CLI flags / environment (`--dir`, `MIDIWATCH_DIR`) applied by the caller
//! 2. Config file (`midiwatch.yaml`, searched upward from the current directory)
//! 3. Defaults matching the original bridge (`./midi_generation`, `.mid` files,
//!    `genetic_ching` generator scripts)
//!
//! Relative paths in a config file resolve against the file's parent directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    pub watch_dir: Option<String>,
    pub artifact_extension: Option<String>,
    pub ignored_names: Option<Vec<String>>,
    pub simple_command: Option<Vec<String>>,
    pub generator_command: Option<Vec<String>>,
    pub generator_cwd: Option<String>,
    pub job_timeout_secs: Option<u64>,
    pub debounce_ms: Option<u64>,
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// The watch domain: one flat directory of generated files.
    pub watch_dir: PathBuf,

    /// Extension (without the dot) of files announced to the host.
    pub artifact_extension: String,

    /// Housekeeping names excluded from snapshots and change handling.
    pub ignored_names: Vec<String>,

    /// Fixed invocation for the simple `generateMotifs` trigger.
    pub simple_command: Vec<String>,

    /// Program + leading args for the parameterized generator.
    pub generator_command: Vec<String>,

    /// Working directory for generator processes, if not the current one.
    pub generator_cwd: Option<PathBuf>,

    /// Kill a generation job that runs longer than this.
    pub job_timeout_secs: u64,

    /// Debounce window for raw filesystem notifications.
    pub debounce_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            watch_dir: PathBuf::from("midi_generation"),
            artifact_extension: "mid".to_string(),
            ignored_names: vec![".DS_Store".to_string()],
            simple_command: vec!["python3".to_string(), "genetic_ching2.py".to_string()],
            generator_command: vec!["python3".to_string(), "genetic_ching4.py".to_string()],
            generator_cwd: None,
            job_timeout_secs: 600,
            debounce_ms: 500,
        }
    }
}

impl Config {
    /// Load configuration: the explicit file if given, else the first
    /// `midiwatch.yaml` found walking up from the current directory, else
    /// defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => find_config_file(),
        };

        match path {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let file: ConfigFile = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        let base = path.parent().unwrap_or(Path::new("."));
        Ok(Self::resolve(file, base))
    }

    /// Apply file values over defaults, resolving relative paths against `base`.
    fn resolve(file: ConfigFile, base: &Path) -> Self {
        let defaults = Self::default();

        Self {
            watch_dir: file
                .watch_dir
                .map(|dir| resolve_path(base, &dir))
                .unwrap_or(defaults.watch_dir),
            artifact_extension: file
                .artifact_extension
                .unwrap_or(defaults.artifact_extension),
            ignored_names: file.ignored_names.unwrap_or(defaults.ignored_names),
            simple_command: file.simple_command.unwrap_or(defaults.simple_command),
            generator_command: file.generator_command.unwrap_or(defaults.generator_command),
            generator_cwd: file.generator_cwd.map(|dir| resolve_path(base, &dir)),
            job_timeout_secs: file.job_timeout_secs.unwrap_or(defaults.job_timeout_secs),
            debounce_ms: file.debounce_ms.unwrap_or(defaults.debounce_ms),
        }
    }

    /// Whether a file name is one of the ignored housekeeping names.
    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignored_names.iter().any(|ignored| ignored == name)
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join("midiwatch.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Resolve a path that may be relative to the config file's parent
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}
