#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use dagrun::config::{ConfigFile, ConfigSection, RawConfigFile, TaskConfig};
use dagrun::dag::Graph;

/// Builder for `Graph` to simplify test setup.
pub struct GraphBuilder {
    graph: Graph,
}

impl GraphBuilder {
    pub fn new(name: &str, threads: usize) -> Self {
        Self {
            graph: Graph::new(name, threads),
        }
    }

    /// Add a node; panics on a duplicate name.
    pub fn node(mut self, name: &str, cmd: &str, deps: &[&str]) -> Self {
        self.graph
            .add_task(name, cmd, deps.iter().copied())
            .expect("duplicate node in GraphBuilder");
        self
    }

    pub fn build(self) -> Graph {
        self.graph
    }

    pub fn build_arc(self) -> Arc<Graph> {
        Arc::new(self.graph)
    }
}

/// The bedtime routine: hello -> eat -> {pizza, fruit, candy} -> bed ->
/// sleep -> wake. `snack_ms` is how long each of the three snacks takes.
pub fn bedtime_graph(threads: usize, snack_ms: [u64; 3]) -> Graph {
    GraphBuilder::new("bedtime", threads)
        .node("bed", "ok", &["pizza", "fruit", "candy"])
        .node("sleep", "sleep:20", &["bed"])
        .node("wake", "ok", &["sleep"])
        .node("hello", "ok", &[])
        .node("eat", "ok", &["hello"])
        .node("pizza", &format!("sleep:{}", snack_ms[0]), &["eat"])
        .node("fruit", &format!("sleep:{}", snack_ms[1]), &["eat"])
        .node("candy", &format!("sleep:{}", snack_ms[2]), &["eat"])
        .build()
}

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection::default(),
                task: BTreeMap::new(),
            },
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.config.config.name = name.to_string();
        self
    }

    pub fn threads(mut self, threads: usize) -> Self {
        self.config.config.threads = threads;
        self
    }

    pub fn with_task(mut self, name: &str, task: TaskConfig) -> Self {
        self.config.task.insert(name.to_string(), task);
        self
    }

    pub fn build_raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `TaskConfig`.
pub struct TaskConfigBuilder {
    task: TaskConfig,
}

impl TaskConfigBuilder {
    pub fn new(cmd: &str) -> Self {
        Self {
            task: TaskConfig {
                cmd: cmd.to_string(),
                after: vec![],
            },
        }
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.task.after.push(dep.to_string());
        self
    }

    pub fn build(self) -> TaskConfig {
        self.task
    }
}
