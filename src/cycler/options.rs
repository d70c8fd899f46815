use serde::Deserialize;
use std::time::Duration;

/// Configuration for a [TextCycler](super::TextCycler).
///
/// All delays are in milliseconds.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct TextCyclerOptions {
    /// The texts to cycle through. When unset, the target's current content is used.
    #[serde(alias = "text")]
    pub texts: Option<Vec<String>>,

    /// The delay between typed characters.
    pub typing_speed: u64,

    /// The delay between deleted characters.
    pub deleting_speed: u64,

    /// How long a fully typed text stays on screen before deletion starts.
    pub pause_duration: u64,

    /// Whether to start over after the last text.
    #[serde(rename = "loop")]
    pub loop_texts: bool,

    /// The delay between the target becoming visible and the first character.
    pub initial_delay: u64,

    /// The glyph shown in the cursor region.
    pub cursor_character: String,
}

impl TextCyclerOptions {
    pub fn with_texts<I, S>(mut self, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.texts = Some(texts.into_iter().map(Into::into).collect());
        self
    }

    pub(crate) fn timing(&self) -> Timing {
        Timing {
            typing: Duration::from_millis(self.typing_speed),
            deleting: Duration::from_millis(self.deleting_speed),
            pause: Duration::from_millis(self.pause_duration),
            initial: Duration::from_millis(self.initial_delay),
        }
    }
}

impl Default for TextCyclerOptions {
    fn default() -> Self {
        Self {
            texts: None,
            typing_speed: 25,
            deleting_speed: 30,
            pause_duration: 2000,
            loop_texts: false,
            initial_delay: 500,
            cursor_character: "_".into(),
        }
    }
}

/// The delays a cycler waits between steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timing {
    pub typing: Duration,
    pub deleting: Duration,
    pub pause: Duration,
    pub initial: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        TextCyclerOptions::default().timing()
    }
}
