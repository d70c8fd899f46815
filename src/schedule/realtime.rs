use super::{Scheduler, Task, TaskHandle, TimerQueue};
use std::time::{Duration, Instant};

/// A scheduler backed by the wall clock.
///
/// Nothing runs on its own: the owner's loop calls [RealtimeScheduler::run_due] and sleeps for
/// [RealtimeScheduler::time_until_next] in between.
pub struct RealtimeScheduler {
    origin: Instant,
    queue: TimerQueue,
}

impl RealtimeScheduler {
    pub fn new() -> Self {
        Self { origin: Instant::now(), queue: TimerQueue::default() }
    }

    /// Run every task whose deadline has passed. Returns the number of tasks run.
    pub fn run_due(&self) -> usize {
        let mut fired = 0;
        while let Some((_, task)) = self.queue.pop_due(self.origin.elapsed()) {
            task();
            fired += 1;
        }
        fired
    }

    /// How long until the next task is due, or `None` if nothing is scheduled.
    pub fn time_until_next(&self) -> Option<Duration> {
        let deadline = self.queue.next_deadline()?;
        Some(deadline.saturating_sub(self.origin.elapsed()))
    }

    pub fn is_idle(&self) -> bool {
        self.queue.next_deadline().is_none()
    }
}

impl Default for RealtimeScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for RealtimeScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TaskHandle {
        self.queue.push(self.origin.elapsed() + delay, task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn runs_expired_tasks_only() {
        let scheduler = RealtimeScheduler::new();
        let fired = Rc::new(Cell::new(0));
        let counter = fired.clone();
        scheduler.schedule(Duration::ZERO, Box::new(move || counter.set(counter.get() + 1)));
        scheduler.schedule(Duration::from_secs(3600), Box::new(|| {}));

        assert_eq!(scheduler.run_due(), 1);
        assert_eq!(fired.get(), 1);
        assert!(!scheduler.is_idle());
        assert!(scheduler.time_until_next().expect("no task") > Duration::from_secs(3000));
    }

    #[test]
    fn idle_when_everything_cancelled() {
        let scheduler = RealtimeScheduler::new();
        let handle = scheduler.schedule(Duration::from_millis(10), Box::new(|| {}));
        handle.cancel();
        assert!(scheduler.is_idle());
        assert_eq!(scheduler.time_until_next(), None);
    }
}
