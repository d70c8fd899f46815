use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::trace;

/// Identifies a render target, such as a page element or a terminal line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(pub u64);

/// Callback invoked the first time a target becomes visible.
pub type VisibilityCallback = Box<dyn FnOnce()>;

/// Reports when a target first becomes visible.
pub trait VisibilityNotifier {
    /// Invoke `callback` at most once, the first time `target` becomes sufficiently visible.
    fn observe_once(&self, target: TargetId, callback: VisibilityCallback) -> ObserverHandle;
}

impl<N: VisibilityNotifier + ?Sized> VisibilityNotifier for Rc<N> {
    fn observe_once(&self, target: TargetId, callback: VisibilityCallback) -> ObserverHandle {
        (**self).observe_once(target, callback)
    }
}

/// A handle to a visibility registration.
#[derive(Clone, Debug, Default)]
pub struct ObserverHandle {
    disconnected: Rc<Cell<bool>>,
}

impl ObserverHandle {
    /// Stop observing. The callback will not be invoked after this.
    pub fn disconnect(&self) {
        self.disconnected.set(true);
    }

    pub fn is_disconnected(&self) -> bool {
        self.disconnected.get()
    }
}

struct Observer {
    target: TargetId,
    callback: VisibilityCallback,
    handle: ObserverHandle,
}

/// A visibility notifier fed by explicit visibility reports.
///
/// The owner of the viewport calls [ViewportTracker::report] whenever the visible fraction of a
/// target changes; observers fire once the fraction reaches the threshold.
pub struct ViewportTracker {
    threshold: f32,
    observers: RefCell<Vec<Observer>>,
}

impl ViewportTracker {
    /// The default fraction of a target that must be visible: 10% of its area.
    pub const DEFAULT_THRESHOLD: f32 = 0.1;

    pub fn new() -> Self {
        Self::with_threshold(Self::DEFAULT_THRESHOLD)
    }

    pub fn with_threshold(threshold: f32) -> Self {
        Self { threshold, observers: Default::default() }
    }

    /// Report that `visible_ratio` (0.0 to 1.0) of `target` is currently visible.
    ///
    /// Returns the number of callbacks invoked.
    pub fn report(&self, target: TargetId, visible_ratio: f32) -> usize {
        if visible_ratio.is_nan() || visible_ratio < self.threshold || visible_ratio <= 0.0 {
            return 0;
        }
        // Take the matching observers out first so callbacks can register new ones.
        let triggered: Vec<Observer> = {
            let mut observers = self.observers.borrow_mut();
            observers.retain(|observer| !observer.handle.is_disconnected());
            let (triggered, remaining): (Vec<_>, Vec<_>) = observers.drain(..).partition(|observer| observer.target == target);
            *observers = remaining;
            triggered
        };
        trace!("target {target:?} visible at {visible_ratio}, notifying {} observers", triggered.len());
        let count = triggered.len();
        for observer in triggered {
            observer.handle.disconnect();
            (observer.callback)();
        }
        count
    }

    /// The number of registrations still waiting for their target.
    pub fn observing(&self) -> usize {
        self.observers.borrow().iter().filter(|observer| !observer.handle.is_disconnected()).count()
    }
}

impl Default for ViewportTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl VisibilityNotifier for ViewportTracker {
    fn observe_once(&self, target: TargetId, callback: VisibilityCallback) -> ObserverHandle {
        let handle = ObserverHandle::default();
        self.observers.borrow_mut().push(Observer { target, callback, handle: handle.clone() });
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn counting(tracker: &ViewportTracker, target: TargetId) -> (Rc<Cell<u32>>, ObserverHandle) {
        let count = Rc::new(Cell::new(0));
        let inner = count.clone();
        let handle = tracker.observe_once(target, Box::new(move || inner.set(inner.get() + 1)));
        (count, handle)
    }

    #[rstest]
    #[case::hidden(0.0, 0)]
    #[case::not_a_number(f32::NAN, 0)]
    #[case::below_threshold(0.09, 0)]
    #[case::at_threshold(0.1, 1)]
    #[case::fully_visible(1.0, 1)]
    fn fires_at_threshold(#[case] ratio: f32, #[case] expected: u32) {
        let tracker = ViewportTracker::new();
        let (count, _handle) = counting(&tracker, TargetId(1));
        tracker.report(TargetId(1), ratio);
        assert_eq!(count.get(), expected);
    }

    #[test]
    fn fires_only_once() {
        let tracker = ViewportTracker::new();
        let (count, handle) = counting(&tracker, TargetId(1));
        assert_eq!(tracker.report(TargetId(1), 1.0), 1);
        assert_eq!(tracker.report(TargetId(1), 1.0), 0);
        assert_eq!(count.get(), 1);
        assert!(handle.is_disconnected());
        assert_eq!(tracker.observing(), 0);
    }

    #[test]
    fn other_targets_are_untouched() {
        let tracker = ViewportTracker::new();
        let (first, _a) = counting(&tracker, TargetId(1));
        let (second, _b) = counting(&tracker, TargetId(2));
        tracker.report(TargetId(2), 0.5);
        assert_eq!((first.get(), second.get()), (0, 1));
        assert_eq!(tracker.observing(), 1);
    }

    #[test]
    fn disconnected_observer_never_fires() {
        let tracker = ViewportTracker::new();
        let (count, handle) = counting(&tracker, TargetId(1));
        handle.disconnect();
        assert_eq!(tracker.report(TargetId(1), 1.0), 0);
        assert_eq!(count.get(), 0);
    }
}
