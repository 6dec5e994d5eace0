// src/exec/mod.rs

//! Task execution layer.
//!
//! - [`backend`] defines the [`TaskExecutor`] trait every node delegates to.
//! - [`shell`] provides [`ShellExecutor`], which runs a task as a shell
//!   command in a child process using `tokio::process::Command`.

pub mod backend;
pub mod shell;

pub use backend::{ExecFuture, TaskExecutor};
pub use shell::ShellExecutor;
