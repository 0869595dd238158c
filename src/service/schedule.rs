// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cooperative background scheduler for periodic tasks.
//!
//! One worker thread drives every periodic task registered against a
//! configuration instance: the file watch tick and any plugin-registered
//! refresh work. Tasks run on a delay-then-period schedule. The worker is
//! started lazily on the first registration and stopped explicitly when the
//! owning configuration shuts down.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

struct Task {
    name: String,
    next_run: Instant,
    period: Duration,
    run: Arc<dyn Fn() + Send + Sync>,
}

struct State {
    tasks: Vec<Task>,
    shutdown: bool,
}

/// Single-threaded timer driving delay-then-period tasks.
///
/// Tasks are executed on the worker thread, outside the scheduler lock, so a
/// task may itself register further tasks. A panicking task is caught and
/// logged; it stays scheduled.
pub struct Scheduler {
    state: Arc<(Mutex<State>, Condvar)>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Scheduler {
    /// Creates a scheduler with no worker thread yet.
    pub fn new() -> Self {
        Scheduler {
            state: Arc::new((
                Mutex::new(State {
                    tasks: Vec::new(),
                    shutdown: false,
                }),
                Condvar::new(),
            )),
            worker: Mutex::new(None),
        }
    }

    /// Registers a periodic task: first run after `delay`, then every
    /// `period`.
    pub fn schedule(
        &self,
        name: impl Into<String>,
        delay: Duration,
        period: Duration,
        run: Arc<dyn Fn() + Send + Sync>,
    ) {
        let (lock, cv) = &*self.state;
        {
            let mut state = lock.lock().unwrap_or_else(PoisonError::into_inner);
            if state.shutdown {
                return;
            }
            state.tasks.push(Task {
                name: name.into(),
                next_run: Instant::now() + delay,
                period,
                run,
            });
        }
        cv.notify_all();
        self.ensure_worker();
    }

    fn ensure_worker(&self) {
        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        if worker.is_some() {
            return;
        }
        let state = Arc::clone(&self.state);
        let handle = std::thread::Builder::new()
            .name("layercfg-scheduler".to_string())
            .spawn(move || run_worker(&state))
            .ok();
        *worker = handle;
    }

    /// Stops the worker thread and drops all tasks.
    ///
    /// Idempotent; called from the owning configuration's drop.
    pub fn shutdown(&self) {
        let (lock, cv) = &*self.state;
        {
            let mut state = lock.lock().unwrap_or_else(PoisonError::into_inner);
            state.shutdown = true;
            state.tasks.clear();
        }
        cv.notify_all();
        let handle = {
            let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
            worker.take()
        };
        if let Some(handle) = handle {
            // shutdown can be triggered from a task dropping the last owner;
            // the worker must not join itself, it exits on the flag instead
            if handle.thread().id() == std::thread::current().id() {
                return;
            }
            let _ = handle.join();
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker(state: &(Mutex<State>, Condvar)) {
    let (lock, cv) = state;
    let mut guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
    loop {
        if guard.shutdown {
            return;
        }
        let now = Instant::now();
        let mut due: Vec<(String, Arc<dyn Fn() + Send + Sync>)> = Vec::new();
        for task in guard.tasks.iter_mut() {
            if task.next_run <= now {
                due.push((task.name.clone(), Arc::clone(&task.run)));
                task.next_run = now + task.period;
            }
        }
        if !due.is_empty() {
            drop(guard);
            for (name, run) in due {
                if catch_unwind(AssertUnwindSafe(|| run())).is_err() {
                    tracing::error!("Scheduled task '{}' panicked", name);
                }
            }
            guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            continue;
        }
        let next = guard.tasks.iter().map(|t| t.next_run).min();
        guard = match next {
            None => cv.wait(guard).unwrap_or_else(PoisonError::into_inner),
            Some(at) => {
                let wait = at.saturating_duration_since(now);
                cv.wait_timeout(guard, wait)
                    .map(|(g, _)| g)
                    .unwrap_or_else(|e| e.into_inner().0)
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_task_runs_after_delay_then_periodically() {
        let scheduler = Scheduler::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);
        scheduler.schedule(
            "tick",
            Duration::from_millis(10),
            Duration::from_millis(20),
            Arc::new(move || {
                count_clone.fetch_add(1, Ordering::SeqCst);
            }),
        );
        let deadline = Instant::now() + Duration::from_secs(3);
        while count.load(Ordering::SeqCst) < 3 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(count.load(Ordering::SeqCst) >= 3);
        scheduler.shutdown();
    }

    #[test]
    fn test_shutdown_stops_tasks() {
        let scheduler = Scheduler::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);
        scheduler.schedule(
            "tick",
            Duration::from_millis(1),
            Duration::from_millis(5),
            Arc::new(move || {
                count_clone.fetch_add(1, Ordering::SeqCst);
            }),
        );
        std::thread::sleep(Duration::from_millis(50));
        scheduler.shutdown();
        let after_shutdown = count.load(Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(count.load(Ordering::SeqCst), after_shutdown);
    }

    #[test]
    fn test_panicking_task_stays_scheduled() {
        let scheduler = Scheduler::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);
        scheduler.schedule(
            "explode",
            Duration::from_millis(1),
            Duration::from_millis(10),
            Arc::new(move || {
                count_clone.fetch_add(1, Ordering::SeqCst);
                panic!("boom");
            }),
        );
        let deadline = Instant::now() + Duration::from_secs(3);
        while count.load(Ordering::SeqCst) < 2 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(count.load(Ordering::SeqCst) >= 2);
        scheduler.shutdown();
    }

    #[test]
    fn test_schedule_after_shutdown_is_ignored() {
        let scheduler = Scheduler::new();
        scheduler.shutdown();
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);
        scheduler.schedule(
            "late",
            Duration::from_millis(1),
            Duration::from_millis(5),
            Arc::new(move || {
                count_clone.fetch_add(1, Ordering::SeqCst);
            }),
        );
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
