//! Cancellable periodic tasks driven by frame time.
//!
//! The host calls [`FlowEngine::tick`](crate::FlowEngine::tick) once per
//! displayed frame with the elapsed time. Work that runs on its own cadence,
//! such as the μ-sweep, lives in a [`TaskSlot`] that turns that elapsed time
//! into whole firings. Nothing runs between ticks, so stopping a task can
//! never leave a callback pending.

use std::time::Duration;

/// Firings a single tick may catch up on. A longer stall drops the backlog.
pub const MAX_CATCH_UP: u32 = 8;

/// Identifies one started task. Handles are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

/// Accumulates elapsed time and reports how many intervals have passed.
#[derive(Debug, Clone)]
pub struct PeriodicTimer {
    interval: Duration,
    accumulated: Duration,
}

impl PeriodicTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_micros(1)),
            accumulated: Duration::ZERO,
        }
    }

    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Feed `dt` of elapsed time and return the number of firings now due.
    pub fn advance(&mut self, dt: Duration) -> u32 {
        self.accumulated += dt;
        let mut fired = 0;
        while self.accumulated >= self.interval && fired < MAX_CATCH_UP {
            self.accumulated -= self.interval;
            fired += 1;
        }
        if self.accumulated >= self.interval {
            self.accumulated = Duration::ZERO;
        }
        fired
    }
}

struct Scheduled<T> {
    handle: TaskHandle,
    task: T,
    timer: PeriodicTimer,
}

/// Holds at most one periodic task of type `T`.
///
/// Starting a task replaces the running one. Stopping is idempotent, and a
/// handle only cancels the task it was issued for.
pub struct TaskSlot<T> {
    next_id: u64,
    active: Option<Scheduled<T>>,
}

impl<T> Default for TaskSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TaskSlot<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            active: None,
        }
    }

    /// Start `task`, firing every `interval`. Returns the new handle and the
    /// task it replaced, if any.
    pub fn start(&mut self, task: T, interval: Duration) -> (TaskHandle, Option<T>) {
        let previous = self.stop();
        let handle = TaskHandle(self.next_id);
        self.next_id += 1;
        self.active = Some(Scheduled {
            handle,
            task,
            timer: PeriodicTimer::new(interval),
        });
        (handle, previous)
    }

    /// Stop whatever is running. Returns the stopped task.
    pub fn stop(&mut self) -> Option<T> {
        self.active.take().map(|s| s.task)
    }

    /// Stop the task only if `handle` still refers to it.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        if self.handle() == Some(handle) {
            self.active = None;
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn handle(&self) -> Option<TaskHandle> {
        self.active.as_ref().map(|s| s.handle)
    }

    pub fn task(&self) -> Option<&T> {
        self.active.as_ref().map(|s| &s.task)
    }

    /// Advance the task clock by `dt` and call `fire` once per due firing.
    pub fn run_due(&mut self, dt: Duration, mut fire: impl FnMut(&mut T)) -> u32 {
        let Some(scheduled) = self.active.as_mut() else {
            return 0;
        };
        let due = scheduled.timer.advance(dt);
        for _ in 0..due {
            fire(&mut scheduled.task);
        }
        due
    }
}
