//! Merge cursor: one lazily advancing SPOG-sorted sequence with lookahead.

use crate::error::Result;
use crate::spill::{remove_session_dir, SortedInput};
use ldfusion_graph_ir::{Quad, Term};
use ldfusion_uri_mapping::UriMapping;
use std::sync::Arc;
use tempfile::TempDir;

/// Pull-based cursor over the sorted, mapped quads of one session.
///
/// Holds one quad of lookahead so that `has_next` needs no I/O. With a
/// subject filter installed, quads whose subject is not an explicit
/// canonicalization target never reach the lookahead.
pub struct MergeCursor {
    // Dropped before `session`: readers close and delete their runs first
    input: SortedInput,
    session: Option<TempDir>,
    subject_filter: Option<Arc<dyn UriMapping>>,
    head: Option<Quad>,
    filtered: u64,
}

impl MergeCursor {
    /// Wrap sorted input and prime the lookahead.
    pub fn new(
        input: SortedInput,
        session: Option<TempDir>,
        subject_filter: Option<Arc<dyn UriMapping>>,
    ) -> Result<Self> {
        let mut cursor = Self {
            input,
            session,
            subject_filter,
            head: None,
            filtered: 0,
        };
        cursor.head = cursor.pull()?;
        Ok(cursor)
    }

    /// True while at least one quad remains
    #[inline]
    pub fn has_next(&self) -> bool {
        self.head.is_some()
    }

    /// Next quad without advancing
    #[inline]
    pub fn peek(&self) -> Option<&Quad> {
        self.head.as_ref()
    }

    /// Take the next quad and advance the lookahead.
    pub fn next_quad(&mut self) -> Result<Option<Quad>> {
        if self.head.is_none() {
            return Ok(None);
        }
        let next = self.pull()?;
        Ok(std::mem::replace(&mut self.head, next))
    }

    /// Quads dropped by the subject filter so far
    pub fn filtered(&self) -> u64 {
        self.filtered
    }

    /// Release every open run and remove the spill directory.
    pub fn close(self) {
        let Self { input, session, .. } = self;
        drop(input);
        if let Some(dir) = session {
            remove_session_dir(dir);
        }
    }

    /// Next quad from the underlying input that passes the filter.
    fn pull(&mut self) -> Result<Option<Quad>> {
        loop {
            let quad = match &mut self.input {
                SortedInput::InMemory(iter) => iter.next(),
                SortedInput::Merged(merge) => merge.next_quad()?,
            };
            let Some(quad) = quad else {
                return Ok(None);
            };
            if self.accepts(&quad) {
                return Ok(Some(quad));
            }
            self.filtered += 1;
        }
    }

    fn accepts(&self, quad: &Quad) -> bool {
        match &self.subject_filter {
            None => true,
            Some(mapping) => match &quad.s {
                Term::Iri(iri) => mapping.is_explicit_target(iri),
                _ => false,
            },
        }
    }
}
