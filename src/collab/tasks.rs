//! Pending extraction tasks, keyed by project
//!
//! Extraction calls can take seconds. Each one is spawned through
//! `ExtractionTasks` so that deleting the project it targets can abort it
//! before its result is ever applied.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::task::{AbortHandle, JoinHandle};
use tracing::debug;

use crate::models::ProjectId;

type Registry = HashMap<ProjectId, HashMap<u64, AbortHandle>>;

/// Registry of in-flight collaborator tasks
#[derive(Debug, Clone, Default)]
pub struct ExtractionTasks {
    inner: Arc<Mutex<Registry>>,
    next_id: Arc<AtomicU64>,
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ExtractionTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `task` on the current tokio runtime, tracked under `project_id`.
    ///
    /// The task deregisters itself when it finishes. Awaiting the returned
    /// handle of an aborted task yields a cancelled `JoinError`.
    pub fn spawn<F>(&self, project_id: ProjectId, task: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let task_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let registry = Arc::clone(&self.inner);

        // Hold the lock across spawn so the task cannot deregister before it
        // has been registered.
        let mut guard = lock(&self.inner);
        let handle = tokio::spawn(async move {
            let output = task.await;
            let mut tasks = lock(&registry);
            if let Some(pending) = tasks.get_mut(&project_id) {
                pending.remove(&task_id);
                if pending.is_empty() {
                    tasks.remove(&project_id);
                }
            }
            output
        });
        guard
            .entry(project_id)
            .or_default()
            .insert(task_id, handle.abort_handle());
        debug!(project = %project_id.short(), task_id, "extraction task spawned");

        handle
    }

    /// Abort every pending task for a project, returning how many were aborted
    pub fn cancel(&self, project_id: ProjectId) -> usize {
        let pending = lock(&self.inner).remove(&project_id).unwrap_or_default();
        for handle in pending.values() {
            handle.abort();
        }
        if !pending.is_empty() {
            debug!(project = %project_id.short(), count = pending.len(), "extraction tasks aborted");
        }
        pending.len()
    }

    pub fn pending(&self, project_id: ProjectId) -> usize {
        lock(&self.inner).get(&project_id).map_or(0, HashMap::len)
    }

    pub fn total_pending(&self) -> usize {
        lock(&self.inner).values().map(HashMap::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_finished_task_deregisters() {
        let tasks = ExtractionTasks::new();
        let project = ProjectId::new();

        let handle = tasks.spawn(project, async { 7 });
        assert_eq!(handle.await.unwrap(), 7);
        assert_eq!(tasks.pending(project), 0);
    }

    #[tokio::test]
    async fn test_cancel_aborts_only_that_project() {
        let tasks = ExtractionTasks::new();
        let doomed = ProjectId::new();
        let survivor = ProjectId::new();

        let slow = tasks.spawn(doomed, async {
            tokio::time::sleep(Duration::from_secs(60)).await;
        });
        let other = tasks.spawn(survivor, async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            "done"
        });
        assert_eq!(tasks.total_pending(), 2);

        assert_eq!(tasks.cancel(doomed), 1);
        assert!(slow.await.unwrap_err().is_cancelled());
        assert_eq!(other.await.unwrap(), "done");
        assert_eq!(tasks.total_pending(), 0);
    }
}
