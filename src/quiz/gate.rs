//! Task gate: runs a generation call behind a minimum on-screen dwell time.
//!
//! The processing screens must never flash by, even when the backing call
//! returns instantly, and must never drop a result that arrives late. The
//! gate starts the task and the dwell timer together and resolves at
//! `max(task, floor)` on success. On failure it still waits out the full
//! floor and resolves with `None`.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep, sleep_until};
use tracing::{debug, warn};

/// Ties a gate run to the screen that started it.
///
/// Clones share the flag. Cancelling does not abort the in-flight call; it
/// only guarantees the result is never delivered.
#[derive(Debug, Clone)]
pub struct Lease {
    id: u64,
    cancelled: Arc<AtomicBool>,
}

impl Lease {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Dwell floor plus optional upper bound for one kind of processing screen.
#[derive(Debug, Clone, Copy)]
pub struct TaskGate {
    floor: Duration,
    timeout: Option<Duration>,
}

impl TaskGate {
    pub fn new(floor: Duration) -> Self {
        Self {
            floor,
            timeout: None,
        }
    }

    /// Treat a task that runs longer than `timeout` as failed.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run `task` behind the dwell floor.
    ///
    /// - No task: sleep the floor, then `None`.
    /// - Success after `t`: `Some(result)` at `max(t, floor)`.
    /// - Error or timeout: `None`, no earlier than `floor` after start.
    pub async fn run<F, R, E>(&self, task: Option<F>) -> Option<R>
    where
        F: Future<Output = Result<R, E>>,
        E: Display,
    {
        let start = Instant::now();
        let deadline = start + self.floor;

        let Some(task) = task else {
            sleep_until(deadline).await;
            return None;
        };

        let outcome = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, task).await {
                Ok(result) => result.map_err(|e| e.to_string()),
                Err(_) => Err(format!("timed out after {limit:?}")),
            },
            None => task.await.map_err(|e| e.to_string()),
        };

        match outcome {
            Ok(result) => {
                let elapsed = start.elapsed();
                if elapsed < self.floor {
                    sleep(self.floor - elapsed).await;
                }
                debug!(elapsed_ms = elapsed.as_millis() as u64, "Gated task succeeded");
                Some(result)
            }
            Err(reason) => {
                warn!(reason = %reason, "Gated task failed, resolving empty after dwell floor");
                sleep_until(deadline).await;
                None
            }
        }
    }
}

/// Spawn a gate run and hand its outcome to `deliver`, unless `lease` has
/// been cancelled by then.
pub fn spawn_gated<F, R, E, D>(
    gate: TaskGate,
    lease: Lease,
    task: Option<F>,
    deliver: D,
) -> JoinHandle<()>
where
    F: Future<Output = Result<R, E>> + Send + 'static,
    R: Send + 'static,
    E: Display + Send + 'static,
    D: FnOnce(Option<R>) + Send + 'static,
{
    tokio::spawn(async move {
        let outcome = gate.run(task).await;
        if lease.is_cancelled() {
            debug!(lease = lease.id(), "Screen torn down, dropping gate outcome");
            return;
        }
        deliver(outcome);
    })
}
