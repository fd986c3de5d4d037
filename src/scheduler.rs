//! "Next tick" scheduling for work that must not run inside the current
//! reaction (intent resets).
//!
//! Browser builds hand tasks to a zero-delay timer. Everywhere else the host
//! owns a [`TickQueue`] and drains it between turns of its own loop.

#[cfg(test)]
#[path = "scheduler_test.rs"]
mod scheduler_test;

use std::cell::RefCell;
use std::collections::VecDeque;

pub type Task = Box<dyn FnOnce()>;

pub trait Scheduler {
    /// Run `task` on a later tick, never synchronously.
    fn defer(&self, task: Task);
}

/// Explicit run-queue; one call to [`TickQueue::run_pending`] is one tick.
#[derive(Default)]
pub struct TickQueue {
    tasks: RefCell<VecDeque<Task>>,
}

impl TickQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.tasks.borrow().len()
    }

    /// Run the tasks queued before this call. Tasks they schedule wait for
    /// the next tick. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let batch = std::mem::take(&mut *self.tasks.borrow_mut());
        let ran = batch.len();
        for task in batch {
            task();
        }
        ran
    }

    /// Tick until nothing is queued. Returns the total number of tasks run.
    pub fn run_until_idle(&self) -> usize {
        let mut total = 0;
        loop {
            let ran = self.run_pending();
            if ran == 0 {
                return total;
            }
            total += ran;
        }
    }
}

impl Scheduler for TickQueue {
    fn defer(&self, task: Task) {
        self.tasks.borrow_mut().push_back(task);
    }
}

/// Zero-delay `setTimeout` via `gloo-timers`.
#[cfg(feature = "hydrate")]
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserScheduler;

#[cfg(feature = "hydrate")]
impl Scheduler for BrowserScheduler {
    fn defer(&self, task: Task) {
        gloo_timers::callback::Timeout::new(0, task).forget();
    }
}
