//! A fixed-size worker pool fed from a shared FIFO queue.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::{Condvar, Mutex};

use crate::error::TaskPanic;

type Job = Box<dyn FnOnce() + Send + 'static>;

#[derive(Default)]
struct Queue {
    jobs: VecDeque<Job>,
    shutting_down: bool,
}

struct Shared {
    queue: Mutex<Queue>,
    available: Condvar,
}

/// Runs submitted closures on a fixed number of worker threads.
///
/// Jobs are taken in submission order; completion order is unspecified.
/// Dropping or [shutting down](Self::shutdown) the pool runs every job that
/// is still queued before the workers exit.
pub struct ThreadPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl ThreadPool {
    /// Starts `size` workers (at least one).
    pub fn new(size: usize) -> Self {
        let shared = Arc::new(Shared {
            queue: Mutex::new(Queue::default()),
            available: Condvar::new(),
        });
        let workers = (0..size.max(1))
            .map(|i| {
                let shared = Arc::clone(&shared);
                thread::Builder::new()
                    .name(format!("frill-worker-{i}"))
                    .spawn(move || worker_loop(&shared))
            })
            .filter_map(|spawned| match spawned {
                Ok(handle) => Some(handle),
                Err(e) => {
                    log::warn!("failed to spawn worker thread: {e}");
                    None
                }
            })
            .collect();
        Self { shared, workers }
    }

    /// Number of live worker threads.
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Queues `job` and returns a handle to its result.
    ///
    /// A panic inside `job` is caught and reported through the handle; the
    /// worker keeps running.
    pub fn submit<F, T>(&self, job: F) -> TaskHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = flume::bounded(1);
        let job: Job = Box::new(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(job)).map_err(|payload| TaskPanic {
                message: panic_message(payload.as_ref()),
            });
            // The handle may have been dropped; the result is then unwanted.
            let _ = tx.send(result);
        });

        if self.workers.is_empty() {
            job();
        } else {
            self.shared.queue.lock().jobs.push_back(job);
            self.shared.available.notify_one();
        }
        TaskHandle { rx }
    }

    /// Runs every queued job, then stops and joins the workers.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.shared.queue.lock().shutting_down = true;
        self.shared.available.notify_all();
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                log::warn!("worker thread terminated abnormally");
            }
        }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.stop();
    }
}

fn worker_loop(shared: &Shared) {
    loop {
        let job = {
            let mut queue = shared.queue.lock();
            loop {
                if let Some(job) = queue.jobs.pop_front() {
                    break job;
                }
                if queue.shutting_down {
                    return;
                }
                shared.available.wait(&mut queue);
            }
        };
        job();
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// The pending result of a job submitted to a [`ThreadPool`].
#[derive(Debug)]
pub struct TaskHandle<T> {
    rx: flume::Receiver<Result<T, TaskPanic>>,
}

impl<T> TaskHandle<T> {
    /// Blocks until the job has finished.
    pub fn join(self) -> Result<T, TaskPanic> {
        self.rx.recv().unwrap_or_else(|_| {
            Err(TaskPanic {
                message: "task was dropped before completing".to_string(),
            })
        })
    }
}
