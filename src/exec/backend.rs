// src/exec/backend.rs

//! Pluggable executor abstraction.
//!
//! A node never launches anything itself: it hands its [`Task`] to a
//! `TaskExecutor` and waits for the verdict. Production code uses
//! [`ShellExecutor`](super::ShellExecutor); tests provide executors that
//! simulate work without spawning processes.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::engine::CancelSignal;
use crate::errors::ExecutionError;
use crate::types::Task;

/// Future returned by [`TaskExecutor::execute`].
pub type ExecFuture<'a> = Pin<Box<dyn Future<Output = Result<(), ExecutionError>> + Send + 'a>>;

/// Trait abstracting how a node's task is executed.
pub trait TaskExecutor: Send + Sync {
    /// Run `task` on behalf of node `node` and resolve when it has finished.
    ///
    /// `Ok(())` means success (exit code 0 for processes). Implementations
    /// should stop early with [`ExecutionError::Cancelled`] once `cancel`
    /// fires.
    fn execute<'a>(
        &'a self,
        node: &'a str,
        task: &'a Task,
        cancel: CancelSignal,
    ) -> ExecFuture<'a>;
}

impl<E: TaskExecutor + ?Sized> TaskExecutor for Arc<E> {
    fn execute<'a>(
        &'a self,
        node: &'a str,
        task: &'a Task,
        cancel: CancelSignal,
    ) -> ExecFuture<'a> {
        (**self).execute(node, task, cancel)
    }
}
