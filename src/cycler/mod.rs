use crate::render::RenderSink;
use crate::schedule::{Scheduler, TaskHandle};
use crate::visibility::{ObserverHandle, TargetId, VisibilityNotifier};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;
use tracing::debug;

pub(crate) mod machine;
pub(crate) mod options;

pub use machine::{NEXT_TEXT_DELAY, Step, TypingMachine};
pub use options::{TextCyclerOptions, Timing};

/// Errors that can occur when constructing a text cycler
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum TextCyclerError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

struct Shared<S> {
    target: TargetId,
    machine: TypingMachine,
    sink: S,
    scheduler: Rc<dyn Scheduler>,
    armed: bool,
    disposed: bool,
    pending: Option<TaskHandle>,
}

/// Types and deletes a sequence of texts into a render target, one character at a time.
///
/// The cycler stays idle until its target is first reported visible, then drives itself through
/// the scheduler it was given: each tick types or deletes a character, renders the result and
/// schedules the next tick. A non looping cycler stops and hides its cursor once the last text is
/// typed; a looping one runs until it's disposed or dropped.
pub struct TextCycler<S: RenderSink + 'static> {
    shared: Rc<RefCell<Shared<S>>>,
    observer: ObserverHandle,
}

impl<S: RenderSink + 'static> TextCycler<S> {
    /// Bind a new cycler to `target`.
    ///
    /// This takes over the target through `sink`, and registers with `notifier` so the animation
    /// starts the first time the target becomes visible.
    pub fn new(
        target: TargetId,
        mut options: TextCyclerOptions,
        mut sink: S,
        scheduler: Rc<dyn Scheduler>,
        notifier: &dyn VisibilityNotifier,
    ) -> Result<Self, TextCyclerError> {
        let texts = match options.texts.take() {
            Some(texts) => texts,
            None => vec![sink.content().trim().to_string()],
        };
        let machine = TypingMachine::new(texts, options.timing(), options.loop_texts)?;
        sink.mount(&options.cursor_character);

        let shared = Rc::new(RefCell::new(Shared {
            target,
            machine,
            sink,
            scheduler,
            armed: false,
            disposed: false,
            pending: None,
        }));
        let weak = Rc::downgrade(&shared);
        let observer = notifier.observe_once(
            target,
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    start(&shared);
                }
            }),
        );
        Ok(Self { shared, observer })
    }

    /// Signal that the target became visible. Only the first signal has any effect.
    pub fn on_visible(&self) {
        self.observer.disconnect();
        start(&self.shared);
    }

    /// Schedule the first tick after the initial delay. Does nothing if the cycler was already
    /// started or has been disposed.
    pub fn start(&self) {
        start(&self.shared);
    }

    /// Stop the cycler: the pending tick is cancelled and the visibility registration dropped.
    pub fn dispose(&self) {
        self.observer.disconnect();
        let mut shared = self.shared.borrow_mut();
        if shared.disposed {
            return;
        }
        debug!("disposing text cycler for {:?}", shared.target);
        shared.disposed = true;
        if let Some(pending) = shared.pending.take() {
            pending.cancel();
        }
    }

    pub fn target(&self) -> TargetId {
        self.shared.borrow().target
    }

    /// The text currently on screen.
    pub fn displayed(&self) -> String {
        self.shared.borrow().machine.displayed().to_string()
    }

    pub fn text_index(&self) -> usize {
        self.shared.borrow().machine.text_index()
    }

    pub fn is_deleting(&self) -> bool {
        self.shared.borrow().machine.is_deleting()
    }

    /// Whether the animation was started.
    pub fn is_armed(&self) -> bool {
        self.shared.borrow().armed
    }

    /// Whether the animation reached its terminal state.
    pub fn is_finished(&self) -> bool {
        self.shared.borrow().machine.is_finished()
    }

    pub fn is_disposed(&self) -> bool {
        self.shared.borrow().disposed
    }
}

impl<S: RenderSink + 'static> Drop for TextCycler<S> {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn start<S: RenderSink + 'static>(shared: &Rc<RefCell<Shared<S>>>) {
    let delay = {
        let mut state = shared.borrow_mut();
        if state.armed || state.disposed {
            return;
        }
        state.armed = true;
        debug!("starting text cycler for {:?}", state.target);
        state.machine.timing().initial
    };
    schedule_tick(shared, delay);
}

fn schedule_tick<S: RenderSink + 'static>(shared: &Rc<RefCell<Shared<S>>>, delay: Duration) {
    let scheduler = shared.borrow().scheduler.clone();
    let weak: Weak<RefCell<Shared<S>>> = Rc::downgrade(shared);
    let handle = scheduler.schedule(
        delay,
        Box::new(move || {
            if let Some(shared) = weak.upgrade() {
                tick(&shared);
            }
        }),
    );
    shared.borrow_mut().pending = Some(handle);
}

fn tick<S: RenderSink + 'static>(shared: &Rc<RefCell<Shared<S>>>) {
    let step = {
        let mut state = shared.borrow_mut();
        if state.disposed {
            return;
        }
        state.pending = None;
        let Shared { machine, sink, target, .. } = &mut *state;
        let step = machine.advance();
        sink.render(machine.displayed());
        if step == Step::Finished {
            debug!("text cycler for {target:?} finished");
            sink.hide_cursor();
        }
        step
    };
    if let Step::Continue(delay) = step {
        schedule_tick(shared, delay);
    }
}
