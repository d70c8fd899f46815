use crate::cycler::{TextCycler, TextCyclerError};
use crate::render::RenderSink;
use crate::visibility::TargetId;
use std::collections::BTreeMap;
use tracing::debug;

/// Owns the text cyclers bound to a set of targets, at most one per target.
pub struct CyclerRegistry<S: RenderSink + 'static> {
    cyclers: BTreeMap<TargetId, TextCycler<S>>,
}

impl<S: RenderSink + 'static> CyclerRegistry<S> {
    pub fn new() -> Self {
        Self { cyclers: BTreeMap::new() }
    }

    /// Attach a cycler to `target` unless one is already attached.
    ///
    /// `make` is only called when the target has no cycler yet. Returns whether a new cycler was
    /// attached.
    pub fn attach<F>(&mut self, target: TargetId, make: F) -> Result<bool, TextCyclerError>
    where
        F: FnOnce(TargetId) -> Result<TextCycler<S>, TextCyclerError>,
    {
        if self.cyclers.contains_key(&target) {
            debug!("target {target:?} already has a text cycler");
            return Ok(false);
        }
        let cycler = make(target)?;
        self.cyclers.insert(target, cycler);
        Ok(true)
    }

    pub fn get(&self, target: TargetId) -> Option<&TextCycler<S>> {
        self.cyclers.get(&target)
    }

    /// Dispose and forget the cycler attached to `target`. Returns whether there was one.
    pub fn detach(&mut self, target: TargetId) -> bool {
        match self.cyclers.remove(&target) {
            Some(cycler) => {
                cycler.dispose();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.cyclers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cyclers.is_empty()
    }

    /// Whether every attached cycler reached its terminal state.
    pub fn all_finished(&self) -> bool {
        self.cyclers.values().all(TextCycler::is_finished)
    }

    pub fn dispose_all(&mut self) {
        for cycler in std::mem::take(&mut self.cyclers).into_values() {
            cycler.dispose();
        }
    }
}

impl<S: RenderSink + 'static> Default for CyclerRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}
