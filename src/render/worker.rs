//! Background rasterization on one or two worker threads.
//!
//! Every task goes to every worker; with two workers the first draws even scanlines and the
//! second odd ones, so the two never write the same pixel. Queues are bounded and a full queue
//! blocks the caller; when it stays full past the enqueue timeout the engine drains its
//! workers and keeps drawing on the calling thread.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::foundation::error::{RasterError, RasterResult};
use crate::raster::Rows;
use crate::render::{DrawTask, RenderEngine};

/// Async engine settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AsyncEngineOpts {
    /// 1 or 2; other values are clamped.
    pub workers: usize,
    /// Tasks each worker may have queued.
    pub queue_depth: usize,
    /// How long a submit waits on a full queue before falling back to synchronous drawing.
    pub enqueue_timeout: Duration,
}

impl Default for AsyncEngineOpts {
    fn default() -> Self {
        Self {
            workers: 2,
            queue_depth: 64,
            enqueue_timeout: Duration::from_secs(1),
        }
    }
}

impl AsyncEngineOpts {
    /// Defaults overridden by `FBRASTER_WORKERS`, `FBRASTER_QUEUE_DEPTH` and
    /// `FBRASTER_ENQUEUE_TIMEOUT_MS`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let workers = std::env::var("FBRASTER_WORKERS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(defaults.workers);
        let queue_depth = std::env::var("FBRASTER_QUEUE_DEPTH")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(defaults.queue_depth);
        let enqueue_timeout = std::env::var("FBRASTER_ENQUEUE_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.enqueue_timeout);
        Self {
            workers,
            queue_depth,
            enqueue_timeout,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    fn worker_rows(&self) -> &'static [Rows] {
        if self.workers.clamp(1, 2) == 1 {
            &[Rows::All]
        } else {
            &[Rows::Even, Rows::Odd]
        }
    }
}

/// Bounded FIFO between the producer and one worker.
struct TaskQueue {
    state: Mutex<QueueState>,
    capacity: usize,
    not_empty: Condvar,
    not_full: Condvar,
}

#[derive(Default)]
struct QueueState {
    tasks: VecDeque<Arc<DrawTask>>,
    closed: bool,
}

impl TaskQueue {
    fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            capacity: capacity.max(1),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until `task` fits or `timeout` passes; hands it back on failure.
    fn push(&self, task: Arc<DrawTask>, timeout: Duration) -> Result<(), Arc<DrawTask>> {
        // No deadline when the timeout is too large to represent.
        let deadline = Instant::now().checked_add(timeout);
        let mut state = self.lock();
        while state.tasks.len() >= self.capacity && !state.closed {
            state = match deadline {
                Some(deadline) => {
                    let left = deadline.saturating_duration_since(Instant::now());
                    if left.is_zero() {
                        return Err(task);
                    }
                    self.not_full
                        .wait_timeout(state, left)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
                None => self
                    .not_full
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner),
            };
        }
        if state.closed {
            return Err(task);
        }
        state.tasks.push_back(task);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Next task, or `None` once the queue is closed and empty.
    fn pop(&self) -> Option<Arc<DrawTask>> {
        let mut state = self.lock();
        loop {
            if let Some(task) = state.tasks.pop_front() {
                self.not_full.notify_one();
                return Some(task);
            }
            if state.closed {
                return None;
            }
            state = self
                .not_empty
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Refuse further tasks; returns how many queued tasks were discarded.
    fn close(&self, discard: bool) -> usize {
        let mut state = self.lock();
        state.closed = true;
        let dropped = if discard {
            std::mem::take(&mut state.tasks).len()
        } else {
            0
        };
        self.not_empty.notify_all();
        self.not_full.notify_all();
        dropped
    }
}

/// Count of task deliveries not yet drawn.
#[derive(Default)]
struct Pending {
    count: Mutex<usize>,
    idle: Condvar,
}

impl Pending {
    fn add(&self) {
        *self.count.lock().unwrap_or_else(PoisonError::into_inner) += 1;
    }

    fn done(&self, n: usize) {
        let mut count = self.count.lock().unwrap_or_else(PoisonError::into_inner);
        *count = count.saturating_sub(n);
        if *count == 0 {
            self.idle.notify_all();
        }
    }

    fn wait_idle(&self) {
        let mut count = self.count.lock().unwrap_or_else(PoisonError::into_inner);
        while *count > 0 {
            count = self.idle.wait(count).unwrap_or_else(PoisonError::into_inner);
        }
    }
}

// Counts the delivery as drawn when dropped, unwinding included.
struct Delivery<'a>(&'a Pending);

impl Drop for Delivery<'_> {
    fn drop(&mut self) {
        self.0.done(1);
    }
}

// A worker that stops for any reason closes its queue and writes off what was left in it.
struct Shutdown<'a> {
    queue: &'a TaskQueue,
    pending: &'a Pending,
}

impl Drop for Shutdown<'_> {
    fn drop(&mut self) {
        self.pending.done(self.queue.close(true));
    }
}

struct Worker {
    rows: Rows,
    queue: Arc<TaskQueue>,
    handle: Option<JoinHandle<()>>,
}

fn run_worker(index: usize, rows: Rows, queue: Arc<TaskQueue>, pending: Arc<Pending>) {
    debug!(worker = index, ?rows, "render worker started");
    let _shutdown = Shutdown {
        queue: &queue,
        pending: &pending,
    };
    while let Some(task) = queue.pop() {
        let delivery = Delivery(&pending);
        task.run(rows);
        // Joined callers must hold the only reference to their store.
        drop(task);
        drop(delivery);
    }
    debug!(worker = index, "render worker stopped");
}

/// Draws on background workers, splitting scanlines by parity when there are two.
pub struct AsyncEngine {
    opts: AsyncEngineOpts,
    workers: Vec<Worker>,
    pending: Arc<Pending>,
    fallback: bool,
}

impl AsyncEngine {
    pub fn new(opts: AsyncEngineOpts) -> Self {
        Self {
            opts,
            workers: Vec::new(),
            pending: Arc::new(Pending::default()),
            fallback: false,
        }
    }

    pub fn opts(&self) -> &AsyncEngineOpts {
        &self.opts
    }

    /// Number of running workers; 0 before `init` or after falling back.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Whether a full queue made this engine give up on its workers.
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    fn stop_workers(&mut self) {
        self.pending.wait_idle();
        for worker in &self.workers {
            worker.queue.close(false);
        }
        for mut worker in self.workers.drain(..) {
            if let Some(handle) = worker.handle.take()
                && handle.join().is_err()
            {
                warn!(rows = ?worker.rows, "render worker panicked");
            }
        }
    }
}

impl RenderEngine for AsyncEngine {
    fn name(&self) -> &'static str {
        "async"
    }

    #[tracing::instrument(skip(self), fields(workers = self.opts.workers))]
    fn init(&mut self) -> RasterResult<()> {
        if !self.workers.is_empty() {
            return Ok(());
        }
        self.fallback = false;
        let depth = self.opts.queue_depth.max(1);
        for (index, &rows) in self.opts.worker_rows().iter().enumerate() {
            let queue = Arc::new(TaskQueue::new(depth));
            let pending = Arc::clone(&self.pending);
            let worker_queue = Arc::clone(&queue);
            let spawned = thread::Builder::new()
                .name(format!("fbraster-worker-{index}"))
                .spawn(move || run_worker(index, rows, worker_queue, pending));
            match spawned {
                Ok(handle) => self.workers.push(Worker {
                    rows,
                    queue,
                    handle: Some(handle),
                }),
                Err(err) => {
                    self.stop_workers();
                    return Err(RasterError::Other(
                        anyhow::Error::new(err).context("spawn render worker"),
                    ));
                }
            }
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    fn deinit(&mut self) {
        self.stop_workers();
    }

    fn submit(&mut self, task: DrawTask) {
        if self.workers.is_empty() {
            task.run(Rows::All);
            return;
        }
        let task = Arc::new(task);
        for k in 0..self.workers.len() {
            self.pending.add();
            let queued = self.workers[k]
                .queue
                .push(Arc::clone(&task), self.opts.enqueue_timeout);
            if queued.is_ok() {
                continue;
            }
            self.pending.done(1);
            warn!(
                task = task.name(),
                timeout_ms = self.opts.enqueue_timeout.as_millis() as u64,
                "render queue stayed full; drawing synchronously from now on"
            );
            // Workers before `k` already hold this task; draw the rows the rest would have.
            let missed: Vec<Rows> = self.workers[k..].iter().map(|w| w.rows).collect();
            self.stop_workers();
            self.fallback = true;
            for rows in missed {
                task.run(rows);
            }
            return;
        }
    }

    fn join(&mut self) {
        self.pending.wait_idle();
    }
}

impl Drop for AsyncEngine {
    fn drop(&mut self) {
        self.stop_workers();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/worker.rs"]
mod tests;
