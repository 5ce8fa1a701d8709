//! Background maintenance worker.
//!
//! A single named thread that runs two kinds of work:
//! - fire-and-forget jobs submitted by the engine (history saves), in FIFO order
//! - a periodic tick (cache sweep, optional index optimization)
//!
//! Queued jobs always run before the next tick. Shutdown runs what is still
//! queued, then joins the thread.

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, error};

/// Name of the maintenance thread
pub const WORKER_THREAD_NAME: &str = "helpsearch-maint";

/// Default maximum number of queued jobs
pub const DEFAULT_MAX_QUEUE_DEPTH: usize = 1024;

/// Error returned when a job cannot be queued.
#[derive(Debug)]
pub struct BackpressureError;

impl std::fmt::Display for BackpressureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "maintenance queue is full or shut down")
    }
}

impl std::error::Error for BackpressureError {}

/// Worker metrics snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaintenanceStats {
    /// Jobs waiting in the queue
    pub queue_depth: usize,
    /// Jobs currently executing (0 or 1)
    pub active_jobs: usize,
    /// Jobs finished since start, including ones that panicked
    pub jobs_completed: u64,
    /// Periodic ticks run since start
    pub ticks: u64,
}

type Job = Box<dyn FnOnce() + Send>;
type Tick = Box<dyn Fn() + Send + Sync>;

struct WorkerInner {
    queue: Mutex<VecDeque<Job>>,
    work_ready: Condvar,
    drain_cond: Condvar,
    shutdown: AtomicBool,
    active_jobs: AtomicUsize,
    jobs_completed: AtomicU64,
    ticks: AtomicU64,
    max_queue_depth: usize,
    interval: Duration,
    tick: Tick,
}

/// Periodic maintenance thread with a FIFO job queue.
pub struct MaintenanceWorker {
    inner: Arc<WorkerInner>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl MaintenanceWorker {
    /// Spawn the worker thread.
    ///
    /// `tick` runs every `interval` until shutdown.
    pub fn start(
        interval: Duration,
        max_queue_depth: usize,
        tick: impl Fn() + Send + Sync + 'static,
    ) -> io::Result<Self> {
        let inner = Arc::new(WorkerInner {
            queue: Mutex::new(VecDeque::new()),
            work_ready: Condvar::new(),
            drain_cond: Condvar::new(),
            shutdown: AtomicBool::new(false),
            active_jobs: AtomicUsize::new(0),
            jobs_completed: AtomicU64::new(0),
            ticks: AtomicU64::new(0),
            max_queue_depth,
            interval,
            tick: Box::new(tick),
        });

        let worker_inner = Arc::clone(&inner);
        let handle = std::thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || worker_loop(&worker_inner))?;

        debug!(interval_ms = interval.as_millis() as u64, "maintenance worker started");
        Ok(Self {
            inner,
            handle: Mutex::new(Some(handle)),
        })
    }

    /// Queue a job.
    ///
    /// Returns `Err(BackpressureError)` if the queue is full or the worker
    /// has been shut down.
    pub fn submit(&self, job: impl FnOnce() + Send + 'static) -> Result<(), BackpressureError> {
        if self.inner.shutdown.load(Ordering::Acquire) {
            return Err(BackpressureError);
        }
        {
            let mut queue = self.inner.queue.lock();
            if queue.len() >= self.inner.max_queue_depth {
                return Err(BackpressureError);
            }
            queue.push_back(Box::new(job));
        }
        self.inner.work_ready.notify_one();
        Ok(())
    }

    /// Block until every queued and in-flight job has completed.
    ///
    /// The worker keeps running afterwards.
    pub fn drain(&self) {
        let mut queue = self.inner.queue.lock();
        while !queue.is_empty() || self.inner.active_jobs.load(Ordering::Acquire) > 0 {
            // a worker that exited early leaves nothing to wait for
            if self.is_shut_down() && self.handle.lock().is_none() {
                return;
            }
            self.inner.drain_cond.wait(&mut queue);
        }
    }

    /// Signal the worker to exit after the queued jobs, and join it.
    ///
    /// Idempotent.
    pub fn shutdown(&self) {
        self.inner.shutdown.store(true, Ordering::Release);
        {
            // lock before notify so a worker between its check and wait() is not missed
            let _queue = self.inner.queue.lock();
            self.inner.work_ready.notify_all();
        }

        let handle = self.handle.lock().take();
        if let Some(handle) = handle {
            if handle.thread().id() == std::thread::current().id() {
                return;
            }
            if handle.join().is_err() {
                error!("maintenance worker panicked during shutdown");
            }
            debug!("maintenance worker stopped");
        }
    }

    /// Whether shutdown has been requested
    pub fn is_shut_down(&self) -> bool {
        self.inner.shutdown.load(Ordering::Acquire)
    }

    /// Return a snapshot of worker metrics.
    pub fn stats(&self) -> MaintenanceStats {
        MaintenanceStats {
            queue_depth: self.inner.queue.lock().len(),
            active_jobs: self.inner.active_jobs.load(Ordering::Relaxed),
            jobs_completed: self.inner.jobs_completed.load(Ordering::Relaxed),
            ticks: self.inner.ticks.load(Ordering::Relaxed),
        }
    }
}

impl Drop for MaintenanceWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for MaintenanceWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaintenanceWorker")
            .field("interval", &self.inner.interval)
            .field("stats", &self.stats())
            .finish()
    }
}

/// Decrements `active_jobs` and wakes drain waiters, even if the job panicked.
struct ActiveJobGuard<'a> {
    inner: &'a WorkerInner,
}

impl Drop for ActiveJobGuard<'_> {
    fn drop(&mut self) {
        self.inner.active_jobs.fetch_sub(1, Ordering::Release);
        self.inner.jobs_completed.fetch_add(1, Ordering::Relaxed);
        let queue = self.inner.queue.lock();
        if queue.is_empty() {
            self.inner.drain_cond.notify_all();
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("(non-string panic)")
}

enum Step {
    Run(Job),
    Tick,
    Exit,
}

fn next_step(inner: &WorkerInner, next_tick: Instant) -> Step {
    let mut queue = inner.queue.lock();
    loop {
        if let Some(job) = queue.pop_front() {
            inner.active_jobs.fetch_add(1, Ordering::Release);
            return Step::Run(job);
        }
        if inner.shutdown.load(Ordering::Acquire) {
            // wake drain() callers; nothing else will run
            inner.drain_cond.notify_all();
            return Step::Exit;
        }
        if Instant::now() >= next_tick {
            return Step::Tick;
        }
        inner.work_ready.wait_until(&mut queue, next_tick);
    }
}

fn worker_loop(inner: &WorkerInner) {
    let mut next_tick = Instant::now() + inner.interval;
    loop {
        match next_step(inner, next_tick) {
            Step::Run(job) => {
                let _guard = ActiveJobGuard { inner };
                if let Err(e) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(job)) {
                    error!(panic = panic_message(e.as_ref()), "maintenance job panicked");
                }
            }
            Step::Tick => {
                if let Err(e) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| (inner.tick)())) {
                    error!(panic = panic_message(e.as_ref()), "maintenance tick panicked");
                }
                inner.ticks.fetch_add(1, Ordering::Relaxed);
                next_tick = Instant::now() + inner.interval;
            }
            Step::Exit => return,
        }
    }
}
