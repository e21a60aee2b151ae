use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;

use crate::entities::VerificationId;

/// Owns the reconciliation tasks spawned at intake, keyed by record id, so
/// detached work stays awaitable and abortable instead of fire-and-forget.
#[derive(Clone, Default)]
pub struct TaskRegistry {
    inner: Arc<Mutex<HashMap<VerificationId, JoinHandle<()>>>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, id: VerificationId, handle: JoinHandle<()>) {
        let mut tasks = self.inner.lock().expect("task registry poisoned");
        tasks.retain(|_, h| !h.is_finished());
        tasks.insert(id, handle);
    }

    /// Waits for the task reconciling `id`, if one is registered. Returns
    /// whether a task was found.
    pub async fn wait(&self, id: VerificationId) -> bool {
        let handle = {
            let mut tasks = self.inner.lock().expect("task registry poisoned");
            tasks.remove(&id)
        };
        match handle {
            Some(handle) => {
                if let Err(err) = handle.await {
                    log::error!("reconciliation task for {} panicked: {}", id, err);
                }
                true
            }
            None => false,
        }
    }

    pub fn active_count(&self) -> usize {
        let tasks = self.inner.lock().expect("task registry poisoned");
        tasks.values().filter(|h| !h.is_finished()).count()
    }

    pub fn abort_all(&self) {
        let mut tasks = self.inner.lock().expect("task registry poisoned");
        for (_, handle) in tasks.drain() {
            handle.abort();
        }
    }
}
