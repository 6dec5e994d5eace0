// src/report/console.rs

use std::io::{self, IsTerminal, Write};
use std::sync::{Mutex, PoisonError};

use tracing::warn;

use crate::dag::NodeSnapshot;
use crate::report::StatusReporter;
use crate::types::NodeStatus;

const RULE: &str =
    "----------------------------------------------------------------------------";

const BLUE: &str = "\x1b[1;34m";
const YELLOW: &str = "\x1b[1;33m";
const GREEN: &str = "\x1b[0;32m";
const RED: &str = "\x1b[1;31m";
const RESET: &str = "\x1b[0m";

/// Prints a table of `graph | status | node | task` rows framed by rules.
///
/// Writes to stderr by default so task output on stdout stays separate.
/// Colour is enabled when the target is a terminal.
pub struct ConsoleReporter {
    out: Mutex<Box<dyn Write + Send>>,
    color: bool,
}

impl ConsoleReporter {
    pub fn stderr() -> Self {
        let color = io::stderr().is_terminal();
        Self {
            out: Mutex::new(Box::new(io::stderr())),
            color,
        }
    }

    /// Report into an arbitrary writer, without colour.
    pub fn with_writer(out: impl Write + Send + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(out)),
            color: false,
        }
    }

    pub fn color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    fn render(&self, graph: &str, nodes: &[NodeSnapshot]) -> String {
        let mut table = String::new();
        table.push_str(RULE);
        table.push('\n');
        for node in nodes {
            let status = if self.color {
                format!("{}{:<7}{}", status_color(node.status), node.status, RESET)
            } else {
                format!("{:<7}", node.status)
            };
            table.push_str(&format!("{} | {} | {} | {}\n", graph, status, node.name, node.task));
        }
        table.push_str(RULE);
        table.push('\n');
        table
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::stderr()
    }
}

impl std::fmt::Debug for ConsoleReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleReporter")
            .field("color", &self.color)
            .finish_non_exhaustive()
    }
}

impl StatusReporter for ConsoleReporter {
    fn report(&self, graph: &str, nodes: &[NodeSnapshot]) {
        let table = self.render(graph, nodes);
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = out.write_all(table.as_bytes()).and_then(|_| out.flush()) {
            warn!(error = %e, "failed to write status table");
        }
    }
}

fn status_color(status: NodeStatus) -> &'static str {
    match status {
        NodeStatus::Init => BLUE,
        NodeStatus::Ready => YELLOW,
        NodeStatus::Running => GREEN,
        NodeStatus::Error => RED,
        NodeStatus::Done => RESET,
    }
}
