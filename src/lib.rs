// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod report;
pub mod types;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::{CliArgs, ReportMode};
use crate::config::loader::load_and_validate;
use crate::config::model::ConfigFile;
use crate::dag::{Graph, RunSummary};
use crate::engine::Scheduler;
use crate::exec::ShellExecutor;
use crate::report::{ConsoleReporter, NoopReporter, StatusReporter, TracingReporter};

pub use crate::dag::Node;
pub use crate::errors::{DagrunError, ExecutionError};
pub use crate::types::{NodeName, NodeStatus, Task};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and validation
/// - graph construction
/// - scheduler + shell executor + status reporter
/// - Ctrl-C handling (aborts the run)
///
/// Returns `None` for `--dry-run`, otherwise the run summary.
pub async fn run(args: CliArgs) -> Result<Option<RunSummary>> {
    let cfg = load_and_validate(&args.config)
        .with_context(|| format!("loading config '{}'", args.config.display()))?;

    if args.dry_run {
        print_dry_run(&cfg)?;
        return Ok(None);
    }

    let graph = Arc::new(Graph::from_config(&cfg)?);
    let threads = args
        .threads
        .map(usize::from)
        .unwrap_or(cfg.config.threads);

    let scheduler = Scheduler::new(ShellExecutor::new())
        .with_threads(threads)
        .with_pacing(cfg.config.pacing())
        .with_reporter(reporter_for(args.report));

    // Ctrl-C → abort: stop dispatching and kill running tasks.
    {
        let abort = scheduler.abort_handle();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            abort.abort();
        });
    }

    info!(graph = %graph.name(), threads, "running graph");
    let summary = scheduler.run(graph).await?;
    Ok(Some(summary))
}

fn reporter_for(mode: ReportMode) -> Arc<dyn StatusReporter> {
    match mode {
        ReportMode::Console => Arc::new(ConsoleReporter::stderr()),
        ReportMode::Log => Arc::new(TracingReporter),
        ReportMode::None => Arc::new(NoopReporter),
    }
}

/// Dry-run output: settings, execution order, then each task.
fn print_dry_run(cfg: &ConfigFile) -> Result<()> {
    let graph = Graph::from_config(cfg)?;
    let order = graph.topological_order()?;

    println!("dagrun dry-run");
    println!("  config.name = {}", cfg.config.name);
    println!("  config.threads = {}", cfg.config.threads);
    println!("  config.pacing_ms = {}", cfg.config.pacing_ms);
    println!();

    println!("execution order ({}):", order.len());
    for (idx, name) in order.iter().enumerate() {
        println!("  {:>3}. {name}", idx + 1);
    }
    println!();

    println!("tasks ({}):", cfg.task.len());
    for (name, task) in cfg.task.iter() {
        println!("  - {name}");
        println!("      cmd: {}", task.cmd);
        if !task.after.is_empty() {
            println!("      after: {:?}", task.after);
        }
    }

    debug!("dry-run complete (no execution)");
    Ok(())
}
