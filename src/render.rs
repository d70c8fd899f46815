use crossterm::{
    cursor::MoveToColumn,
    queue,
    style::Print,
    terminal::{Clear, ClearType},
};
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;
use tracing::warn;

/// The surface a text cycler draws into.
///
/// A sink has two regions: the content region holding the currently typed text, and a cursor
/// region showing a fixed glyph until it is hidden.
pub trait RenderSink {
    /// The text the target shows before any cycler takes it over.
    fn content(&self) -> String;

    /// Take over the target: clear the content region and show `cursor` in the cursor region.
    fn mount(&mut self, cursor: &str);

    /// Replace the content region's text.
    fn render(&mut self, text: &str);

    /// Hide the cursor region for good.
    fn hide_cursor(&mut self);
}

/// A single call received by a [RecordingSink].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SinkEvent {
    Mount(String),
    Render(String),
    HideCursor,
}

#[derive(Debug, Default)]
struct Recording {
    initial: String,
    text: String,
    cursor: Option<String>,
    events: Vec<SinkEvent>,
}

/// An in-memory sink that records every call it receives.
///
/// Clones share the same recording, so one clone can be handed to a cycler while another is
/// kept around to inspect what was drawn.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    recording: Rc<RefCell<Recording>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a sink whose target already shows `text`.
    pub fn with_content<S: Into<String>>(text: S) -> Self {
        let text = text.into();
        let recording = Recording { initial: text.clone(), text, ..Default::default() };
        Self { recording: Rc::new(RefCell::new(recording)) }
    }

    /// The text currently in the content region.
    pub fn text(&self) -> String {
        self.recording.borrow().text.clone()
    }

    /// The cursor glyph, if the cursor is visible.
    pub fn cursor(&self) -> Option<String> {
        self.recording.borrow().cursor.clone()
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        self.recording.borrow().events.clone()
    }

    /// Only the rendered texts, in order.
    pub fn renders(&self) -> Vec<String> {
        self.recording
            .borrow()
            .events
            .iter()
            .filter_map(|event| match event {
                SinkEvent::Render(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }
}

impl RenderSink for RecordingSink {
    fn content(&self) -> String {
        self.recording.borrow().initial.clone()
    }

    fn mount(&mut self, cursor: &str) {
        let mut recording = self.recording.borrow_mut();
        recording.text.clear();
        recording.cursor = Some(cursor.to_string());
        recording.events.push(SinkEvent::Mount(cursor.to_string()));
    }

    fn render(&mut self, text: &str) {
        let mut recording = self.recording.borrow_mut();
        recording.text = text.to_string();
        recording.events.push(SinkEvent::Render(text.to_string()));
    }

    fn hide_cursor(&mut self) {
        let mut recording = self.recording.borrow_mut();
        recording.cursor = None;
        recording.events.push(SinkEvent::HideCursor);
    }
}

/// A sink that redraws a single terminal line.
pub struct TerminalSink<W: Write> {
    writer: W,
    initial: String,
    text: String,
    cursor: Option<String>,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(writer: W, initial: String) -> Self {
        Self { writer, initial, text: String::new(), cursor: None }
    }

    fn redraw(&mut self) {
        if let Err(e) = self.try_redraw() {
            warn!("failed to draw text: {e}");
        }
    }

    fn try_redraw(&mut self) -> io::Result<()> {
        queue!(self.writer, MoveToColumn(0), Clear(ClearType::CurrentLine), Print(&self.text))?;
        if let Some(cursor) = &self.cursor {
            queue!(self.writer, Print(cursor))?;
        }
        self.writer.flush()
    }
}

impl<W: Write> RenderSink for TerminalSink<W> {
    fn content(&self) -> String {
        self.initial.clone()
    }

    fn mount(&mut self, cursor: &str) {
        self.text.clear();
        self.cursor = Some(cursor.to_string());
        self.redraw();
    }

    fn render(&mut self, text: &str) {
        self.text = text.to_string();
        self.redraw();
    }

    fn hide_cursor(&mut self) {
        self.cursor = None;
        self.redraw();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_sink_tracks_state() {
        let sink = RecordingSink::with_content("hello");
        let mut cycler_side = sink.clone();
        assert_eq!(cycler_side.content(), "hello");

        cycler_side.mount("_");
        assert_eq!(sink.text(), "");
        assert_eq!(sink.cursor().as_deref(), Some("_"));

        cycler_side.render("he");
        cycler_side.hide_cursor();
        assert_eq!(sink.text(), "he");
        assert_eq!(sink.cursor(), None);
        assert_eq!(
            sink.events(),
            vec![SinkEvent::Mount("_".into()), SinkEvent::Render("he".into()), SinkEvent::HideCursor]
        );
        assert_eq!(sink.renders(), vec!["he".to_string()]);
        assert_eq!(sink.content(), "hello");
    }

    #[test]
    fn terminal_sink_redraws_line() {
        let mut sink = TerminalSink::new(Vec::new(), "initial".into());
        sink.mount("|");
        sink.render("ab");
        sink.hide_cursor();

        let output = String::from_utf8(sink.writer.clone()).expect("invalid utf8");
        assert!(output.contains("ab|"));
        assert!(output.ends_with("ab"));
        assert_eq!(sink.content(), "initial");
    }
}
