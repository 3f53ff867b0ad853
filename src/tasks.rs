//! Supervised background threads with explicit start and stop.

use anyhow::{Context, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Cooperative stop signal shared between a task and its supervisor.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub fn set(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

/// Channel on which tasks report errors that must end the session.
pub fn fatal_channel() -> (Sender<anyhow::Error>, Receiver<anyhow::Error>) {
    unbounded()
}

struct Task {
    name: &'static str,
    stop: StopFlag,
    handle: JoinHandle<()>,
}

/// Owns every background loop of a session. `shutdown` signals all of them and
/// joins them in start order.
pub struct TaskSet {
    tasks: Vec<Task>,
    fatal_tx: Sender<anyhow::Error>,
}

impl TaskSet {
    pub fn new(fatal_tx: Sender<anyhow::Error>) -> Self {
        Self {
            tasks: Vec::new(),
            fatal_tx,
        }
    }

    /// Start `body` on a named thread. An `Err` it returns is logged and forwarded
    /// to the fatal channel.
    pub fn spawn<F>(&mut self, name: &'static str, body: F) -> Result<()>
    where
        F: FnOnce(StopFlag) -> Result<()> + Send + 'static,
    {
        let stop = StopFlag::new();
        let task_stop = stop.clone();
        let fatal_tx = self.fatal_tx.clone();
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                tracing::debug!("task {name} started");
                match body(task_stop) {
                    Ok(()) => tracing::debug!("task {name} finished"),
                    Err(err) => {
                        tracing::error!("task {name} failed: {err:#}");
                        let _ = fatal_tx.send(err.context(format!("{name} task failed")));
                    }
                }
            })
            .with_context(|| format!("failed to spawn {name} thread"))?;
        self.tasks.push(Task { name, stop, handle });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tasks.iter().map(|task| task.name).collect()
    }

    pub fn shutdown(&mut self) {
        for task in &self.tasks {
            task.stop.set();
        }
        for task in self.tasks.drain(..) {
            if task.handle.join().is_err() {
                tracing::warn!("task {} panicked", task.name);
            }
        }
    }
}

impl Drop for TaskSet {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::time::Duration;

    #[test]
    fn shutdown_stops_and_joins_every_task() {
        let (fatal_tx, _fatal_rx) = fatal_channel();
        let mut tasks = TaskSet::new(fatal_tx);
        for name in ["a", "b"] {
            tasks
                .spawn(name, |stop| {
                    while !stop.is_set() {
                        thread::sleep(Duration::from_millis(5));
                    }
                    Ok(())
                })
                .expect("spawn");
        }
        assert_eq!(tasks.names(), vec!["a", "b"]);
        tasks.shutdown();
        assert!(tasks.is_empty());
    }

    #[test]
    fn failing_task_reports_on_fatal_channel() {
        let (fatal_tx, fatal_rx) = fatal_channel();
        let mut tasks = TaskSet::new(fatal_tx);
        tasks
            .spawn("broken", |_| Err(anyhow!("pipe closed")))
            .expect("spawn");
        let err = fatal_rx
            .recv_timeout(Duration::from_secs(2))
            .expect("fatal error reported");
        let message = format!("{err:#}");
        assert!(message.contains("broken task failed"));
        assert!(message.contains("pipe closed"));
        tasks.shutdown();
    }
}
