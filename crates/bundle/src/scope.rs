//! Per-call resolution state

use crate::{Args, Bundle, error::RenderError};
use lilt_syntax::Pattern;
use std::collections::HashSet;

/// Cap on placeable expansions per format call. Matches the parser's static
/// per-pattern cap, so expansion through message and term references cannot
/// exceed what a single pattern could contain outright.
pub(crate) const MAX_PLACEABLES: usize = 100;

/// State owned by exactly one `format_pattern` call: the caller's arguments,
/// the error sink, the cycle guard and the placeable budget. Resolving a
/// parameterized term swaps in a parameter frame; the sink, guard and budget
/// stay shared down the whole resolution tree.
pub(crate) struct Scope<'bundle, 'args, 'errors> {
    pub(crate) bundle: &'bundle Bundle,
    pub(crate) args: Option<&'args Args>,
    errors: Option<&'errors mut Vec<RenderError>>,
    /// Patterns currently being resolved, by node identity. Identity matters:
    /// two messages with identical bodies are still independently resolvable.
    dirty: HashSet<PatternId>,
    /// Parameter frame installed while a parameterized term resolves.
    /// Variable lookups inside a term see only this frame.
    pub(crate) params: Option<Args>,
    placeables: usize,
}

/// Stable identity of a pattern node for the duration of one format call.
/// The bundle is immutably borrowed throughout, so addresses cannot move.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
struct PatternId(usize);

impl PatternId {
    fn new(pattern: &Pattern) -> Self {
        Self(std::ptr::from_ref(pattern) as usize)
    }
}

impl<'bundle, 'args, 'errors> Scope<'bundle, 'args, 'errors> {
    pub fn new(
        bundle: &'bundle Bundle,
        args: Option<&'args Args>,
        errors: Option<&'errors mut Vec<RenderError>>,
    ) -> Self {
        Self {
            bundle,
            args,
            errors,
            dirty: HashSet::new(),
            params: None,
            placeables: 0,
        }
    }

    /// Report a non-fatal error: collected if the caller supplied a sink,
    /// fatal otherwise
    pub fn report(&mut self, error: RenderError) -> Result<(), RenderError> {
        tracing::debug!(%error, "pattern resolution error");
        match &mut self.errors {
            Some(errors) => {
                errors.push(error);
                Ok(())
            }
            None => Err(error),
        }
    }

    /// Install a term's parameter frame, returning the previous frame so the
    /// caller can restore it once the term is resolved
    pub fn enter_term(&mut self, params: Args) -> Option<Args> {
        self.params.replace(params)
    }

    pub fn exit_term(&mut self, previous: Option<Args>) {
        self.params = previous;
    }

    /// Mark a pattern as being resolved. `false` means it already was, i.e.
    /// this resolution is a cycle.
    pub fn begin(&mut self, pattern: &Pattern) -> bool {
        self.dirty.insert(PatternId::new(pattern))
    }

    /// Unmark a pattern. Must run on every exit path, the fatal ones
    /// included.
    pub fn finish(&mut self, pattern: &Pattern) {
        self.dirty.remove(&PatternId::new(pattern));
    }

    /// Count one placeable expansion against the budget
    pub fn count_placeable(&mut self) -> Result<(), RenderError> {
        self.placeables += 1;
        if self.placeables > MAX_PLACEABLES {
            Err(RenderError::TooManyPlaceables)
        } else {
            Ok(())
        }
    }

    #[cfg(test)]
    pub fn dirty_len(&self) -> usize {
        self.dirty.len()
    }
}
