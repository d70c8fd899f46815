use super::{Scheduler, Task, TaskHandle, TimerQueue};
use std::cell::{Cell, RefCell};
use std::time::Duration;

/// A scheduler driven by a virtual clock.
///
/// Time only moves when [VirtualScheduler::advance] or [VirtualScheduler::run_until_idle] are
/// called, which makes animations fully deterministic.
#[derive(Default)]
pub struct VirtualScheduler {
    now: Cell<Duration>,
    queue: TimerQueue,
    delays: RefCell<Vec<Duration>>,
}

impl VirtualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current virtual time, measured from the scheduler's creation.
    pub fn now(&self) -> Duration {
        self.now.get()
    }

    /// The number of tasks that are scheduled and not cancelled.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Every delay passed to `schedule`, in call order.
    pub fn scheduled_delays(&self) -> Vec<Duration> {
        self.delays.borrow().clone()
    }

    /// Move the clock forward by `duration`, running every task that becomes due on the way.
    ///
    /// Tasks run with the clock set to their own deadline. Returns the number of tasks run.
    pub fn advance(&self, duration: Duration) -> usize {
        let target = self.now.get() + duration;
        let mut fired = 0;
        while let Some((deadline, task)) = self.queue.pop_due(target) {
            self.now.set(deadline.max(self.now.get()));
            task();
            fired += 1;
        }
        self.now.set(target);
        fired
    }

    /// Run tasks in deadline order until none remain or `max_tasks` have run.
    ///
    /// Returns the number of tasks run.
    pub fn run_until_idle(&self, max_tasks: usize) -> usize {
        let mut fired = 0;
        while fired < max_tasks {
            let Some(deadline) = self.queue.next_deadline() else {
                break;
            };
            let Some((deadline, task)) = self.queue.pop_due(deadline) else {
                break;
            };
            self.now.set(deadline.max(self.now.get()));
            task();
            fired += 1;
        }
        fired
    }
}

impl Scheduler for VirtualScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TaskHandle {
        self.delays.borrow_mut().push(delay);
        self.queue.push(self.now.get() + delay, task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn recorder(scheduler: &Rc<VirtualScheduler>, log: &Rc<RefCell<Vec<(u64, &'static str)>>>, name: &'static str) -> Task {
        let scheduler = scheduler.clone();
        let log = log.clone();
        Box::new(move || log.borrow_mut().push((scheduler.now().as_millis() as u64, name)))
    }

    #[test]
    fn advance_runs_due_tasks_at_their_deadline() {
        let scheduler = Rc::new(VirtualScheduler::new());
        let log = Rc::new(RefCell::new(Vec::new()));
        scheduler.schedule(Duration::from_millis(20), recorder(&scheduler, &log, "b"));
        scheduler.schedule(Duration::from_millis(10), recorder(&scheduler, &log, "a"));
        scheduler.schedule(Duration::from_millis(50), recorder(&scheduler, &log, "c"));

        assert_eq!(scheduler.advance(Duration::from_millis(30)), 2);
        assert_eq!(*log.borrow(), vec![(10, "a"), (20, "b")]);
        assert_eq!(scheduler.now(), Duration::from_millis(30));
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn zero_delay_never_runs_inline() {
        let scheduler = VirtualScheduler::new();
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();
        scheduler.schedule(Duration::ZERO, Box::new(move || flag.set(true)));
        assert!(!fired.get());

        scheduler.advance(Duration::ZERO);
        assert!(fired.get());
    }

    #[test]
    fn tasks_can_reschedule_themselves() {
        fn tick(scheduler: Rc<VirtualScheduler>, remaining: u32, count: Rc<Cell<u32>>) {
            count.set(count.get() + 1);
            if remaining > 0 {
                let next = scheduler.clone();
                scheduler.schedule(Duration::from_millis(5), Box::new(move || tick(next, remaining - 1, count)));
            }
        }

        let scheduler = Rc::new(VirtualScheduler::new());
        let count = Rc::new(Cell::new(0));
        let (inner, counter) = (scheduler.clone(), count.clone());
        scheduler.schedule(Duration::ZERO, Box::new(move || tick(inner, 3, counter)));

        assert_eq!(scheduler.run_until_idle(100), 4);
        assert_eq!(count.get(), 4);
        assert_eq!(scheduler.now(), Duration::from_millis(15));
    }

    #[test]
    fn run_until_idle_stops_at_limit() {
        let scheduler = VirtualScheduler::new();
        for _ in 0..5 {
            scheduler.schedule(Duration::from_millis(1), Box::new(|| {}));
        }
        assert_eq!(scheduler.run_until_idle(3), 3);
        assert_eq!(scheduler.pending(), 2);
    }

    #[test]
    fn cancelled_task_does_not_run() {
        let scheduler = VirtualScheduler::new();
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();
        let handle = scheduler.schedule(Duration::from_millis(1), Box::new(move || flag.set(true)));
        handle.cancel();

        assert_eq!(scheduler.advance(Duration::from_millis(10)), 0);
        assert!(!fired.get());
        assert_eq!(scheduler.scheduled_delays(), vec![Duration::from_millis(1)]);
    }
}
