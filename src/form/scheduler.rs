//! Scheduling of transition continuations.
//!
//! Provides a trait-based abstraction over the animation clock to enable:
//! - Unit testing without a real terminal (instant or manually advanced time)
//! - Wall-clock driven animations in the terminal host
//!
//! Everything runs on the interaction thread. The form schedules
//! continuations and later pulls the ones that are due with
//! [`Scheduler::next_due`]; nothing is ever called back from another thread.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use super::transition::Continuation;

/// Source of due continuations.
pub trait Scheduler {
    /// Schedule `task` to become due `delay` after the scheduler's current time.
    fn schedule(&mut self, delay: Duration, task: Continuation);

    /// Pop the earliest continuation that is due, if any.
    fn next_due(&mut self) -> Option<Continuation>;

    /// Number of continuations not yet handed out.
    fn pending(&self) -> usize;

    /// Drop every scheduled continuation.
    fn cancel_all(&mut self);
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    deadline: Duration,
    task: Continuation,
}

/// Ordered queue of continuations on a virtual time axis.
///
/// Entries with equal deadlines keep their scheduling order.
#[derive(Debug, Default)]
struct Timeline {
    now: Duration,
    entries: Vec<Entry>,
}

impl Timeline {
    fn push(&mut self, delay: Duration, task: Continuation) {
        let deadline = self.now + delay;
        let at = self.entries.partition_point(|e| e.deadline <= deadline);
        self.entries.insert(at, Entry { deadline, task });
    }

    /// Pop the first entry due at or before `horizon`, moving `now` to its deadline.
    fn pop_until(&mut self, horizon: Duration) -> Option<Continuation> {
        let first = self.entries.first()?;
        if first.deadline > horizon {
            return None;
        }
        let entry = self.entries.remove(0);
        self.now = self.now.max(entry.deadline);
        Some(entry.task)
    }
}

/// Runs every continuation as soon as it is asked for, in deadline order.
///
/// Virtual time jumps forward to each deadline, so phase ordering is the same
/// as with a real clock.
#[derive(Debug, Default)]
pub struct InstantScheduler {
    timeline: Timeline,
}

impl InstantScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time reached so far.
    pub fn elapsed(&self) -> Duration {
        self.timeline.now
    }
}

impl Scheduler for InstantScheduler {
    fn schedule(&mut self, delay: Duration, task: Continuation) {
        self.timeline.push(delay, task);
    }

    fn next_due(&mut self) -> Option<Continuation> {
        self.timeline.pop_until(Duration::MAX)
    }

    fn pending(&self) -> usize {
        self.timeline.entries.len()
    }

    fn cancel_all(&mut self) {
        self.timeline.entries.clear();
    }
}

/// Virtual clock that only moves when told to.
///
/// Clones share the same clock, so a test can keep one handle while the form
/// owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    inner: Rc<RefCell<ManualClock>>,
}

#[derive(Debug, Default)]
struct ManualClock {
    timeline: Timeline,
    horizon: Duration,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward. Due continuations are handed out on the next `next_due` calls.
    pub fn advance(&self, by: Duration) {
        let mut clock = self.inner.borrow_mut();
        clock.horizon += by;
        let horizon = clock.horizon;
        if clock
            .timeline
            .entries
            .first()
            .map_or(true, |e| e.deadline > horizon)
        {
            clock.timeline.now = horizon;
        }
    }

    pub fn now(&self) -> Duration {
        self.inner.borrow().horizon
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, delay: Duration, task: Continuation) {
        self.inner.borrow_mut().timeline.push(delay, task);
    }

    fn next_due(&mut self) -> Option<Continuation> {
        let mut clock = self.inner.borrow_mut();
        let horizon = clock.horizon;
        let task = clock.timeline.pop_until(horizon);
        if task.is_none() {
            clock.timeline.now = horizon;
        }
        task
    }

    fn pending(&self) -> usize {
        self.inner.borrow().timeline.entries.len()
    }

    fn cancel_all(&mut self) {
        self.inner.borrow_mut().timeline.entries.clear();
    }
}

/// Wall-clock scheduler used by the terminal host.
#[derive(Debug)]
pub struct FrameScheduler {
    origin: Instant,
    timeline: Timeline,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            timeline: Timeline::default(),
        }
    }

    /// Time until the next continuation becomes due, if any is scheduled.
    pub fn time_to_next(&self) -> Option<Duration> {
        self.timeline
            .entries
            .first()
            .map(|e| e.deadline.saturating_sub(self.origin.elapsed()))
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for FrameScheduler {
    fn schedule(&mut self, delay: Duration, task: Continuation) {
        self.timeline.now = self.timeline.now.max(self.origin.elapsed());
        self.timeline.push(delay, task);
    }

    fn next_due(&mut self) -> Option<Continuation> {
        self.timeline.pop_until(self.origin.elapsed())
    }

    fn pending(&self) -> usize {
        self.timeline.entries.len()
    }

    fn cancel_all(&mut self) {
        self.timeline.entries.clear();
    }
}
