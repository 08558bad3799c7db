use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::cancel::CancellationToken;
use crate::error::{ExportError, Result};

pub const DEFAULT_CONCURRENCY: usize = 5;
pub const DEFAULT_TASK_TIMEOUT: Duration = Duration::from_secs(30);

/// One blocking unit of work, labelled with the node it belongs to.
pub struct PoolTask<T> {
    pub node_id: String,
    pub work: Box<dyn FnOnce() -> std::result::Result<T, ExportError> + Send + 'static>,
}

impl<T> PoolTask<T> {
    pub fn new<F>(node_id: impl Into<String>, work: F) -> Self
    where
        F: FnOnce() -> std::result::Result<T, ExportError> + Send + 'static,
    {
        Self {
            node_id: node_id.into(),
            work: Box::new(work),
        }
    }
}

/// Runs blocking tasks a fixed-size batch at a time, each under its own
/// timeout. A timed-out task is abandoned: its thread finishes in the
/// background and the result is dropped.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    concurrency: usize,
    task_timeout: Duration,
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(DEFAULT_CONCURRENCY, DEFAULT_TASK_TIMEOUT)
    }
}

impl WorkerPool {
    pub fn new(concurrency: usize, task_timeout: Duration) -> Self {
        Self {
            concurrency: concurrency.max(1),
            task_timeout,
        }
    }

    /// Results in task order. Cancellation is checked before each batch;
    /// a cancelled run returns `Cancelled` and drops finished results.
    pub async fn run<T: Send + 'static>(
        &self,
        tasks: Vec<PoolTask<T>>,
        cancel: &CancellationToken,
    ) -> Result<Vec<std::result::Result<T, ExportError>>> {
        let total = tasks.len();
        let mut results = Vec::with_capacity(total);
        let mut pending = tasks.into_iter().peekable();
        let mut batch_no = 0;

        while pending.peek().is_some() {
            cancel.check()?;
            batch_no += 1;

            let handles: Vec<(String, JoinHandle<_>)> = pending
                .by_ref()
                .take(self.concurrency)
                .map(|PoolTask { node_id, work }| {
                    let timeout = self.task_timeout;
                    let handle = tokio::spawn(async move {
                        tokio::time::timeout(timeout, tokio::task::spawn_blocking(work)).await
                    });
                    (node_id, handle)
                })
                .collect();

            debug!(batch = batch_no, size = handles.len(), total, "export batch started");

            for (node_id, handle) in handles {
                let outcome = match handle.await {
                    Ok(Ok(Ok(result))) => result,
                    Ok(Ok(Err(join_error))) => Err(ExportError::Task {
                        node_id,
                        message: join_error.to_string(),
                    }),
                    Ok(Err(_elapsed)) => {
                        warn!(node = %node_id, timeout = ?self.task_timeout, "export task timed out");
                        Err(ExportError::TimedOut { node_id })
                    }
                    Err(join_error) => Err(ExportError::Task {
                        node_id,
                        message: join_error.to_string(),
                    }),
                };
                results.push(outcome);
            }
        }

        Ok(results)
    }
}
