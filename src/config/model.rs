// src/config/model.rs

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [config]
/// name = "bedtime"
/// threads = 2
///
/// [task.hello]
/// cmd = "echo hello"
///
/// [task.eat]
/// cmd = "echo eat"
/// after = ["hello"]
/// ```
///
/// This is the unvalidated form; convert it with `ConfigFile::try_from`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    /// Graph-wide settings from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// All tasks from `[task.<name>]`, keyed by node name.
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,
}

/// Validated configuration.
///
/// Only obtainable through `TryFrom<RawConfigFile>`, so holding one means the
/// task graph is known to be well formed.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub task: BTreeMap<String, TaskConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(config: ConfigSection, task: BTreeMap<String, TaskConfig>) -> Self {
        Self { config, task }
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Label used in logs and reports.
    #[serde(default = "default_name")]
    pub name: String,

    /// Number of concurrent workers. Must be at least 1.
    #[serde(default = "default_threads")]
    pub threads: usize,

    /// Delay each worker waits after finishing a task before taking the
    /// next one, in milliseconds. 0 disables pacing.
    #[serde(default)]
    pub pacing_ms: u64,
}

fn default_name() -> String {
    "dagrun".to_string()
}

fn default_threads() -> usize {
    1
}

impl ConfigSection {
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            name: default_name(),
            threads: default_threads(),
            pacing_ms: 0,
        }
    }
}

/// `[task.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskConfig {
    /// The shell command to execute.
    pub cmd: String,

    /// Dependency list: this task waits for all tasks listed here.
    #[serde(default)]
    pub after: Vec<String>,
}
