use crossbeam::channel::{self, Receiver, Sender};
use std::sync::{Arc, RwLock};
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

use crate::error::{ProcessingError, Result};
use crate::models::{DeviceSnapshot, Measurement};
use crate::processors::StreamingAggregator;

enum Command {
    Line(String),
    Measurement(Measurement),
    Flush(Sender<()>),
}

/// Read-only view shared with threads that only need snapshots
#[derive(Clone)]
pub struct AggregatorHandle {
    state: Arc<RwLock<StreamingAggregator>>,
}

impl AggregatorHandle {
    pub fn snapshot(&self, device_id: &str) -> Result<DeviceSnapshot> {
        self.state
            .read()
            .map_err(|_| poisoned())?
            .snapshot(device_id)
    }

    pub fn snapshots(&self) -> Result<Vec<DeviceSnapshot>> {
        Ok(self.state.read().map_err(|_| poisoned())?.snapshots())
    }

    /// (devices, accepted, rejected)
    pub fn counts(&self) -> Result<(usize, u64, u64)> {
        let guard = self.state.read().map_err(|_| poisoned())?;
        Ok((guard.len(), guard.accepted(), guard.rejected()))
    }
}

/// Single-writer aggregation service.
///
/// One worker thread applies submitted records in order, each under a single
/// write lock, so readers see a record either fully applied or not at all.
pub struct AggregatorService {
    handle: AggregatorHandle,
    sender: Option<Sender<Command>>,
    worker: Option<JoinHandle<()>>,
}

impl AggregatorService {
    pub fn spawn(aggregator: StreamingAggregator) -> Self {
        let state = Arc::new(RwLock::new(aggregator));
        let (sender, receiver) = channel::unbounded();

        let worker_state = Arc::clone(&state);
        let worker = thread::spawn(move || run_writer(worker_state, receiver));

        Self {
            handle: AggregatorHandle { state },
            sender: Some(sender),
            worker: Some(worker),
        }
    }

    pub fn handle(&self) -> AggregatorHandle {
        self.handle.clone()
    }

    pub fn submit_line(&self, line: impl Into<String>) -> Result<()> {
        self.send(Command::Line(line.into()))
    }

    pub fn submit(&self, measurement: Measurement) -> Result<()> {
        self.send(Command::Measurement(measurement))
    }

    /// Block until every record submitted before this call has been applied
    pub fn flush(&self) -> Result<()> {
        let (done_tx, done_rx) = channel::bounded(1);
        self.send(Command::Flush(done_tx))?;
        done_rx
            .recv()
            .map_err(|_| ProcessingError::Concurrency("aggregator worker stopped".to_string()))
    }

    pub fn snapshot(&self, device_id: &str) -> Result<DeviceSnapshot> {
        self.handle.snapshot(device_id)
    }

    /// Stop the worker after it drains the queue and hand back the aggregator
    pub fn shutdown(mut self) -> Result<StreamingAggregator> {
        self.stop()?;

        let state = Arc::clone(&self.handle.state);
        drop(self);

        let lock = Arc::try_unwrap(state).map_err(|_| {
            ProcessingError::Concurrency("aggregator handle still in use".to_string())
        })?;
        lock.into_inner().map_err(|_| poisoned())
    }

    fn send(&self, command: Command) -> Result<()> {
        self.sender
            .as_ref()
            .ok_or_else(|| ProcessingError::Concurrency("aggregator service stopped".to_string()))?
            .send(command)
            .map_err(|_| ProcessingError::Concurrency("aggregator worker stopped".to_string()))
    }

    fn stop(&mut self) -> Result<()> {
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            worker.join().map_err(|_| {
                ProcessingError::Concurrency("aggregator worker panicked".to_string())
            })?;
        }
        Ok(())
    }
}

impl Drop for AggregatorService {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

fn run_writer(state: Arc<RwLock<StreamingAggregator>>, receiver: Receiver<Command>) {
    for command in receiver {
        let applied = match command {
            Command::Line(line) => state.write().map(|mut aggregator| {
                // rejection is already counted by the aggregator
                let _ = aggregator.ingest_line(&line);
            }),
            Command::Measurement(measurement) => state
                .write()
                .map(|mut aggregator| aggregator.ingest(&measurement)),
            Command::Flush(done) => {
                let _ = done.send(());
                Ok(())
            }
        };

        if applied.is_err() {
            // queued flushes are dropped with the receiver and report the stop
            warn!("aggregator lock poisoned, writer stopping");
            return;
        }
    }
    debug!("aggregator writer stopped");
}

fn poisoned() -> ProcessingError {
    ProcessingError::Concurrency("aggregator lock poisoned".to_string())
}
