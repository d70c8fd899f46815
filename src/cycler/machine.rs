use super::options::Timing;
use super::TextCyclerError;
use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;

/// The fixed gap between finishing deleting one text and typing the next.
pub const NEXT_TEXT_DELAY: std::time::Duration = std::time::Duration::from_millis(500);

/// The outcome of a single [TypingMachine::advance].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Advance again after this long.
    Continue(std::time::Duration),

    /// The last text is fully typed and the machine won't loop: nothing else will change.
    Finished,
}

/// A text split into its characters, as byte offsets of where each character ends.
#[derive(Debug)]
struct Text {
    value: String,
    ends: Vec<usize>,
}

impl Text {
    fn new(value: String) -> Self {
        let ends = value.grapheme_indices(true).map(|(start, grapheme)| start + grapheme.len()).collect();
        Self { value, ends }
    }

    fn prefix(&self, length: usize) -> &str {
        match length {
            0 => "",
            length => &self.value[..self.ends[length - 1]],
        }
    }

    fn len(&self) -> usize {
        self.ends.len()
    }
}

/// The typing and deleting state machine, with no notion of time or rendering.
///
/// Every call to [TypingMachine::advance] types or deletes one character and says how long to
/// wait before the next call.
#[derive(Debug)]
pub struct TypingMachine {
    texts: Vec<Text>,
    timing: Timing,
    loop_texts: bool,
    text_index: usize,
    displayed: usize,
    deleting: bool,
    finished: bool,
}

impl TypingMachine {
    /// Construct a machine that cycles through `texts`, starting with nothing displayed.
    ///
    /// This is the standalone form of a [TextCycler](super::TextCycler): callers drive it
    /// themselves, rendering [TypingMachine::displayed] after each [TypingMachine::advance] and
    /// waiting for the returned delay. Fails if `texts` is empty.
    pub fn new(texts: Vec<String>, timing: Timing, loop_texts: bool) -> Result<Self, TextCyclerError> {
        if texts.is_empty() {
            return Err(TextCyclerError::InvalidConfiguration("no texts to cycle through".into()));
        }
        Ok(Self {
            texts: texts.into_iter().map(Text::new).collect(),
            timing,
            loop_texts,
            text_index: 0,
            displayed: 0,
            deleting: false,
            finished: false,
        })
    }

    pub fn advance(&mut self) -> Step {
        if self.finished {
            return Step::Finished;
        }
        let current = &self.texts[self.text_index];
        if self.deleting {
            self.displayed = self.displayed.saturating_sub(1);
        } else {
            self.displayed = (self.displayed + 1).min(current.len());
        }

        if !self.deleting && self.displayed == current.len() {
            if !self.loop_texts && self.text_index == self.texts.len() - 1 {
                debug!("finished typing last text {}", self.text_index);
                self.finished = true;
                return Step::Finished;
            }
            self.deleting = true;
            return Step::Continue(self.timing.pause);
        }
        if self.deleting && self.displayed == 0 {
            self.deleting = false;
            self.text_index = (self.text_index + 1) % self.texts.len();
            debug!("moving on to text {}", self.text_index);
            return Step::Continue(NEXT_TEXT_DELAY);
        }
        match self.deleting {
            true => Step::Continue(self.timing.deleting),
            false => Step::Continue(self.timing.typing),
        }
    }

    /// The part of the current text that is on screen.
    pub fn displayed(&self) -> &str {
        self.texts[self.text_index].prefix(self.displayed)
    }

    pub fn text_index(&self) -> usize {
        self.text_index
    }

    pub fn is_deleting(&self) -> bool {
        self.deleting
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }
}
