//! Typing and deleting text animations, decoupled from whatever draws them.
//!
//! A [TextCycler] types a list of texts into a [RenderSink] one character at a time, pauses,
//! deletes them and moves on to the next, optionally looping forever. Time comes from an injected
//! [Scheduler] and the animation only starts once a [VisibilityNotifier] reports its target as
//! visible.

pub mod config;
pub mod cycler;
pub mod registry;
pub mod render;
pub mod schedule;
pub mod visibility;

pub use config::{Config, ConfigLoadError};
pub use cycler::{TextCycler, TextCyclerError, TextCyclerOptions};
pub use registry::CyclerRegistry;
pub use render::{RecordingSink, RenderSink, SinkEvent, TerminalSink};
pub use schedule::{RealtimeScheduler, Scheduler, TaskHandle, VirtualScheduler};
pub use visibility::{ObserverHandle, TargetId, ViewportTracker, VisibilityNotifier};
