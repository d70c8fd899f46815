use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::rc::Rc;
use std::time::Duration;

mod realtime;
mod virtual_clock;

pub use realtime::RealtimeScheduler;
pub use virtual_clock::VirtualScheduler;

/// A one-shot callback handed to a [Scheduler].
pub type Task = Box<dyn FnOnce()>;

/// Something that can run a callback once after a delay.
///
/// Implementations must never run the task from within `schedule` itself, even for a zero delay:
/// the task fires on a later turn of whatever loop drives the scheduler.
pub trait Scheduler {
    /// Schedule `task` to run once after `delay`.
    fn schedule(&self, delay: Duration, task: Task) -> TaskHandle;
}

impl<S: Scheduler + ?Sized> Scheduler for Rc<S> {
    fn schedule(&self, delay: Duration, task: Task) -> TaskHandle {
        (**self).schedule(delay, task)
    }
}

/// A handle to a scheduled task that allows cancelling it before it fires.
#[derive(Clone, Debug, Default)]
pub struct TaskHandle {
    cancelled: Rc<Cell<bool>>,
}

impl TaskHandle {
    /// Cancel the task. Cancelling an already fired or cancelled task does nothing.
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

struct Entry {
    deadline: Duration,
    sequence: u64,
    task: Task,
    handle: TaskHandle,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // Reversed so the binary heap pops the earliest deadline first, ties broken by insertion order.
    fn cmp(&self, other: &Self) -> Ordering {
        other.deadline.cmp(&self.deadline).then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Pending tasks ordered by deadline, where deadlines are offsets from some clock origin.
#[derive(Default)]
pub(crate) struct TimerQueue {
    entries: RefCell<BinaryHeap<Entry>>,
    next_sequence: Cell<u64>,
}

impl TimerQueue {
    pub(crate) fn push(&self, deadline: Duration, task: Task) -> TaskHandle {
        let handle = TaskHandle::default();
        let sequence = self.next_sequence.get();
        self.next_sequence.set(sequence + 1);
        self.entries.borrow_mut().push(Entry { deadline, sequence, task, handle: handle.clone() });
        handle
    }

    /// Pop the earliest live task whose deadline is at or before `now`.
    ///
    /// The queue is not borrowed once this returns, so the caller can run the task and let it
    /// schedule more work.
    pub(crate) fn pop_due(&self, now: Duration) -> Option<(Duration, Task)> {
        let mut entries = self.entries.borrow_mut();
        Self::discard_cancelled(&mut entries);
        if entries.peek()?.deadline > now {
            return None;
        }
        let entry = entries.pop()?;
        Some((entry.deadline, entry.task))
    }

    pub(crate) fn next_deadline(&self) -> Option<Duration> {
        let mut entries = self.entries.borrow_mut();
        Self::discard_cancelled(&mut entries);
        entries.peek().map(|entry| entry.deadline)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.borrow().iter().filter(|entry| !entry.handle.is_cancelled()).count()
    }

    fn discard_cancelled(entries: &mut BinaryHeap<Entry>) {
        while entries.peek().is_some_and(|entry| entry.handle.is_cancelled()) {
            entries.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Task {
        Box::new(|| {})
    }

    #[test]
    fn pops_in_deadline_order() {
        let queue = TimerQueue::default();
        queue.push(Duration::from_millis(30), noop());
        queue.push(Duration::from_millis(10), noop());
        queue.push(Duration::from_millis(20), noop());

        let now = Duration::from_millis(100);
        let deadlines: Vec<_> = std::iter::from_fn(|| queue.pop_due(now).map(|(deadline, _)| deadline)).collect();
        assert_eq!(deadlines, vec![Duration::from_millis(10), Duration::from_millis(20), Duration::from_millis(30)]);
    }

    #[test]
    fn equal_deadlines_keep_insertion_order() {
        let queue = TimerQueue::default();
        let order = Rc::new(RefCell::new(Vec::new()));
        for id in 0..3 {
            let order = order.clone();
            queue.push(Duration::ZERO, Box::new(move || order.borrow_mut().push(id)));
        }
        while let Some((_, task)) = queue.pop_due(Duration::ZERO) {
            task();
        }
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn future_tasks_are_not_due() {
        let queue = TimerQueue::default();
        queue.push(Duration::from_millis(5), noop());
        assert!(queue.pop_due(Duration::from_millis(4)).is_none());
        assert_eq!(queue.next_deadline(), Some(Duration::from_millis(5)));
    }

    #[test]
    fn cancelled_tasks_are_skipped() {
        let queue = TimerQueue::default();
        let handle = queue.push(Duration::from_millis(1), noop());
        queue.push(Duration::from_millis(2), noop());
        handle.cancel();

        assert_eq!(queue.len(), 1);
        assert_eq!(queue.next_deadline(), Some(Duration::from_millis(2)));
        let (deadline, _) = queue.pop_due(Duration::from_millis(10)).expect("no task");
        assert_eq!(deadline, Duration::from_millis(2));
        assert!(queue.pop_due(Duration::from_millis(10)).is_none());
    }
}
