//! Periodic Sweep Task
//!
//! Background task that repeatedly invokes its owning cache's sweep routine.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::error::{CacheError, Result};

// == Janitor ==
/// Handle to a running periodic sweep task.
///
/// The task ends when [`Janitor::stop`] is called, when the handle is dropped,
/// or when the sweep routine reports that its cache is gone (returns `None`).
/// After `stop` returns, at most the sweep pass already in flight completes;
/// no new pass starts.
#[derive(Debug)]
pub struct Janitor {
    /// Task label used in log events
    name: &'static str,
    /// Time between sweep passes
    interval: Duration,
    /// Stop signal, taken on first stop
    stop: Option<oneshot::Sender<()>>,
    /// Spawned task
    handle: JoinHandle<()>,
}

impl Janitor {
    // == Spawn ==
    /// Spawns a task on the current tokio runtime that calls `sweep` every `interval`.
    ///
    /// `sweep` returns the number of entries it removed, or `None` once the
    /// cache it serves no longer exists.
    ///
    /// # Errors
    /// Returns [`CacheError::RuntimeUnavailable`] when called outside a tokio runtime.
    pub fn spawn<F>(name: &'static str, interval: Duration, mut sweep: F) -> Result<Self>
    where
        F: FnMut() -> Option<usize> + Send + 'static,
    {
        let runtime = Handle::try_current().map_err(|_| CacheError::RuntimeUnavailable)?;
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        let handle = runtime.spawn(async move {
            info!("Starting {} task with interval of {:?}", name, interval);

            let mut ticker = time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    // Fires on an explicit stop and when the handle is dropped
                    _ = &mut stop_rx => {
                        debug!("{} task stopped", name);
                        break;
                    }
                    _ = ticker.tick() => match sweep() {
                        Some(0) => debug!("{}: no expired entries found", name),
                        Some(removed) => info!("{}: removed {} expired entries", name, removed),
                        None => {
                            debug!("{} task exiting, cache dropped", name);
                            break;
                        }
                    },
                }
            }
        });

        Ok(Self {
            name,
            interval,
            stop: Some(stop_tx),
            handle,
        })
    }

    // == Stop ==
    /// Signals the task to stop. Calling it again is a no-op.
    pub fn stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            // The task may already have exited on its own
            let _ = stop.send(());
            debug!("Stop requested for {} task", self.name);
        }
    }

    /// Returns true once a stop has been requested.
    pub fn is_stopped(&self) -> bool {
        self.stop.is_none()
    }

    /// Returns true once the task has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Time between sweep passes.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Drop for Janitor {
    fn drop(&mut self) {
        self.stop();
    }
}
