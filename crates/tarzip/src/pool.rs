//! Bounded-concurrency scheduling of conversion jobs.

use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};
use std::thread::JoinHandle;

use log::debug;
use tokio::sync::{oneshot, Semaphore};

use crate::config::{PoolConfig, PoolMode};
use crate::convert::{self, JobSpec};
use crate::error::ConvertError;

/// The function a pool runs per job. Injectable so tests can observe
/// concurrency without doing real conversions.
pub type JobRunner = Arc<dyn Fn(&JobSpec) -> Result<PathBuf, ConvertError> + Send + Sync>;

/// A concurrency-bounded executor for conversion jobs.
///
/// Both strategies guarantee: at most `size` jobs run their heavy
/// phase at once, excess submissions queue, one job's failure reaches
/// only its own caller, and outstanding jobs finish before the pool
/// tears down. There is no process-global pool; construct one and own
/// it.
pub enum TaskPool {
    /// Semaphore-bounded tasks on tokio's blocking thread pool.
    Async(AsyncPool),
    /// Dedicated worker threads over a shared queue.
    Workers(WorkerPool),
}

impl TaskPool {
    /// Build a pool that runs [`convert_to_zip`](convert::convert_to_zip).
    #[must_use]
    pub fn new(config: &PoolConfig) -> Self {
        Self::with_runner(config, Arc::new(|spec: &JobSpec| convert::convert_to_zip(spec)))
    }

    /// Build a pool with a custom job runner.
    #[must_use]
    pub fn with_runner(config: &PoolConfig, runner: JobRunner) -> Self {
        let size = config.size.max(1);
        debug!("creating {:?} pool, size {size}", config.mode);
        match config.mode {
            PoolMode::Async => TaskPool::Async(AsyncPool::new(size, runner)),
            PoolMode::Workers => TaskPool::Workers(WorkerPool::new(size, runner)),
        }
    }

    /// Run one job, waiting for a free slot if the pool is saturated.
    ///
    /// # Errors
    ///
    /// The job's own [`ConvertError`], or
    /// [`ConvertError::WorkerGone`] if the executor went away.
    pub async fn run(&self, spec: JobSpec) -> Result<PathBuf, ConvertError> {
        match self {
            TaskPool::Async(pool) => pool.run(spec).await,
            TaskPool::Workers(pool) => pool.run(spec).await,
        }
    }
}

/// Bounds concurrency with a semaphore; the job body runs on tokio's
/// blocking thread pool.
pub struct AsyncPool {
    semaphore: Arc<Semaphore>,
    runner: JobRunner,
}

impl AsyncPool {
    fn new(size: usize, runner: JobRunner) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(size)),
            runner,
        }
    }

    async fn run(&self, spec: JobSpec) -> Result<PathBuf, ConvertError> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| ConvertError::WorkerGone)?;
        let runner = Arc::clone(&self.runner);
        tokio::task::spawn_blocking(move || {
            // Hold the permit for the whole heavy phase.
            let _permit = permit;
            runner(&spec)
        })
        .await
        .map_err(|_| ConvertError::WorkerGone)?
    }
}

struct WorkerJob {
    spec: JobSpec,
    reply: oneshot::Sender<Result<PathBuf, ConvertError>>,
}

/// N dedicated OS threads pulling jobs off a shared queue. Dropping
/// the pool closes the queue and joins the workers, so queued jobs
/// still complete.
pub struct WorkerPool {
    sender: Option<mpsc::Sender<WorkerJob>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    fn new(size: usize, runner: JobRunner) -> Self {
        let (sender, receiver) = mpsc::channel::<WorkerJob>();
        let receiver = Arc::new(Mutex::new(receiver));
        let workers = (0..size)
            .map(|_| {
                let receiver = Arc::clone(&receiver);
                let runner = Arc::clone(&runner);
                std::thread::spawn(move || loop {
                    let job = {
                        let Ok(guard) = receiver.lock() else { break };
                        guard.recv()
                    };
                    let Ok(job) = job else { break };
                    let result = runner(&job.spec);
                    // The caller may have given up waiting.
                    let _ = job.reply.send(result);
                })
            })
            .collect();
        Self {
            sender: Some(sender),
            workers,
        }
    }

    async fn run(&self, spec: JobSpec) -> Result<PathBuf, ConvertError> {
        let (reply, response) = oneshot::channel();
        let Some(sender) = self.sender.as_ref() else {
            return Err(ConvertError::WorkerGone);
        };
        sender
            .send(WorkerJob { spec, reply })
            .map_err(|_| ConvertError::WorkerGone)?;
        response.await.map_err(|_| ConvertError::WorkerGone)?
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Closing the channel lets each worker drain the queue and
        // exit.
        self.sender.take();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}
