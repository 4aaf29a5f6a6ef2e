use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// The single context that owns UI-bound state. Completions arriving on OS
/// threads post their follow-up work here.
pub trait MainContext: Send + Sync {
    fn post(&self, job: Job);
}

/// Runs every job on the posting thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineContext;

impl MainContext for InlineContext {
    fn post(&self, job: Job) {
        job();
    }
}

/// FIFO of jobs drained by the host's main loop.
#[derive(Default)]
pub struct MainQueue {
    jobs: Mutex<VecDeque<Job>>,
    ready: Condvar,
}

impl MainQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.jobs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.lock().is_empty()
    }

    /// Runs queued jobs, including ones they post, until the queue is empty.
    /// The lock is released while each job runs.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            let Some(job) = self.jobs.lock().pop_front() else {
                break;
            };
            job();
            ran += 1;
        }
        ran
    }

    /// Blocks up to `timeout` for a job to arrive, then drains the queue.
    pub fn wait_and_run(&self, timeout: Duration) -> usize {
        {
            let mut jobs = self.jobs.lock();
            if jobs.is_empty() {
                self.ready.wait_for(&mut jobs, timeout);
            }
        }
        self.run_pending()
    }
}

impl MainContext for MainQueue {
    fn post(&self, job: Job) {
        self.jobs.lock().push_back(job);
        self.ready.notify_one();
    }
}
