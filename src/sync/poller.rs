//! Fixed-interval background worker with unsubscribe-on-teardown discipline:
//! a stop channel ends the loop and `Drop` joins the thread.

use std::{
    sync::mpsc::{self, RecvTimeoutError, Sender},
    thread::{self, JoinHandle},
    time::Duration,
};

const POLL_WORKER_SHUTDOWN_FAILED: &str = "POLL_WORKER_SHUTDOWN_FAILED";

#[derive(Debug)]
pub struct IntervalWorker {
    stop_tx: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl IntervalWorker {
    pub fn start<F>(
        name: &str,
        interval: Duration,
        mut tick: F,
    ) -> Result<Self, WorkerStartError>
    where
        F: FnMut() + Send + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let worker = thread::Builder::new()
            .name(format!("gowactl-{name}"))
            .spawn(move || loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => tick(),
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })
            .map_err(WorkerStartError::WorkerSpawn)?;

        Ok(Self {
            stop_tx: Some(stop_tx),
            worker: Some(worker),
        })
    }
}

impl Drop for IntervalWorker {
    fn drop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }

        if let Some(worker) = self.worker.take() {
            if let Err(error) = worker.join() {
                tracing::warn!(
                    code = POLL_WORKER_SHUTDOWN_FAILED,
                    error = ?error,
                    "poll worker panicked on shutdown"
                );
            }
        }
    }
}

#[derive(Debug)]
pub enum WorkerStartError {
    WorkerSpawn(std::io::Error),
}

impl std::fmt::Display for WorkerStartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WorkerSpawn(source) => write!(f, "worker spawn failed: {source}"),
        }
    }
}

impl std::error::Error for WorkerStartError {}
