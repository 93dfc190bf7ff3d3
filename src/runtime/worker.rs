use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

use log::{debug, info, warn};

use super::RuntimeError;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Single background thread running submitted jobs one at a time, in order.
///
/// Jobs hand their results back through channels of their own; the worker never
/// touches session state.
pub struct BackgroundWorker {
    name: String,
    sender: Option<Sender<Job>>,
    cancelled: Arc<AtomicBool>,
    skipped: Arc<AtomicUsize>,
    handle: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for BackgroundWorker {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("BackgroundWorker")
            .field("name", &self.name)
            .field("running", &self.is_running())
            .finish()
    }
}

impl BackgroundWorker {
    pub fn spawn(name: impl Into<String>) -> Result<Self, RuntimeError> {
        let name = name.into();
        let (sender, receiver) = mpsc::channel::<Job>();
        let cancelled = Arc::new(AtomicBool::new(false));
        let skipped = Arc::new(AtomicUsize::new(0));

        let thread_cancelled = Arc::clone(&cancelled);
        let thread_skipped = Arc::clone(&skipped);
        let thread_name = name.clone();
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                info!("{thread_name} started");
                for job in receiver {
                    if thread_cancelled.load(Ordering::Acquire) {
                        thread_skipped.fetch_add(1, Ordering::Relaxed);
                        continue;
                    }
                    job();
                }
                info!("{thread_name} stopped");
            })
            .map_err(RuntimeError::Spawn)?;

        Ok(Self {
            name,
            sender: Some(sender),
            cancelled,
            skipped,
            handle: Some(handle),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_running(&self) -> bool {
        self.sender.is_some() && !self.cancelled.load(Ordering::Acquire)
    }

    pub fn submit(&self, job: impl FnOnce() + Send + 'static) -> Result<(), RuntimeError> {
        if self.cancelled.load(Ordering::Acquire) {
            return Err(RuntimeError::ShutDown(self.name.clone()));
        }
        let sender = self
            .sender
            .as_ref()
            .ok_or_else(|| RuntimeError::ShutDown(self.name.clone()))?;
        sender
            .send(Box::new(job))
            .map_err(|_| RuntimeError::ShutDown(self.name.clone()))?;
        debug!("queued job on {}", self.name);
        Ok(())
    }

    /// Stops accepting jobs and marks queued ones to be skipped. The running job, if any,
    /// finishes normally.
    pub fn cancel_pending(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Cancels queued jobs, waits for the running one and joins the thread. Returns the
    /// number of jobs that never ran.
    pub fn shutdown(&mut self) -> usize {
        self.cancel_pending();
        self.sender.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("{} panicked", self.name);
            }
        }
        let skipped = self.skipped.load(Ordering::Relaxed);
        if skipped > 0 {
            warn!("{} dropped {skipped} queued job(s)", self.name);
        }
        skipped
    }
}

impl Drop for BackgroundWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}
