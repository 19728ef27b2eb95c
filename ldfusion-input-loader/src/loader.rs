//! External sort-merge input loader.
//!
//! [`ExternalSortingInputLoader`] reads every configured source, maps each
//! quad through the identifier mapping, sorts the result SPOG with a
//! memory-bounded external sort and then hands out one *resource block*
//! (all quads sharing a subject) per [`InputLoader::next_quads`] call.
//!
//! ## Lifecycle
//!
//! ```text
//! new ──► initialize ──► has_next / next_quads ... ──► close
//!              │                                         ▲
//!              └──────────── error (runs deleted) ───────┘
//! ```
//!
//! `close` is idempotent and is also run on drop, so every temporary file the
//! session created is removed however iteration ends.

use crate::config::LoaderConfig;
use crate::cursor::MergeCursor;
use crate::error::{LoaderError, Result};
use crate::mapper::QuadMapper;
use crate::resolved::ResolvedStatement;
use crate::source::QuadSource;
use crate::spill::{SpillOutcome, SpillStore};
use ldfusion_graph_ir::Quad;
use ldfusion_uri_mapping::{UriMapping, LOG_LOOP_SIZE};
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;

/// Pull-based supplier of resource blocks for the fusion pipeline.
pub trait InputLoader {
    /// Load and prepare all input. Must be called exactly once, before
    /// any other operation.
    fn initialize(&mut self, mapping: Arc<dyn UriMapping>) -> Result<()>;

    /// True iff at least one more resource block remains
    fn has_next(&self) -> bool;

    /// All quads of the next subject, in SPOG order
    fn next_quads(&mut self) -> Result<Vec<Quad>>;

    /// Feedback from conflict resolution for the block just returned
    fn update_with_resolved_statements(&mut self, resolved: &[ResolvedStatement]);

    /// Release every resource held by the loader
    fn close(&mut self);
}

/// Counters describing one loader session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoaderStats {
    pub quads_read: u64,
    pub runs_written: u64,
    pub consolidations: u64,
    pub blocks_emitted: u64,
    pub quads_emitted: u64,
    pub quads_filtered: u64,
}

enum State {
    Created,
    Ready(MergeCursor),
    Closed,
}

/// Input loader backed by an external merge sort.
pub struct ExternalSortingInputLoader {
    sources: Vec<Box<dyn QuadSource>>,
    config: LoaderConfig,
    state: State,
    stats: LoaderStats,
}

impl ExternalSortingInputLoader {
    /// Create a loader over `sources`, read in the given order.
    pub fn new(sources: Vec<Box<dyn QuadSource>>, config: LoaderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            sources,
            config,
            state: State::Created,
            stats: LoaderStats::default(),
        })
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn stats(&self) -> LoaderStats {
        let mut stats = self.stats;
        if let State::Ready(cursor) = &self.state {
            stats.quads_filtered = cursor.filtered();
        }
        stats
    }

    /// Read every source into the spill store.
    fn load_sources(&mut self, mapper: &QuadMapper, store: &mut SpillStore) -> Result<()> {
        let mut quads_read = 0u64;
        for source in self.sources.iter_mut() {
            let start = Instant::now();
            let mut count = 0u64;
            while let Some(quad) = source.next_quad()? {
                store.push(mapper.map(quad))?;
                count += 1;
                quads_read += 1;
                if quads_read % LOG_LOOP_SIZE == 0 {
                    tracing::info!(
                        quads = quads_read,
                        runs = store.run_count(),
                        "loading input"
                    );
                }
            }
            tracing::debug!(
                source = source.label(),
                quads = count,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "source loaded"
            );
        }
        self.stats.quads_read = quads_read;
        Ok(())
    }

    /// Close every source, logging failures.
    fn close_sources(&mut self) {
        for source in self.sources.iter_mut() {
            if let Err(e) = source.close() {
                tracing::warn!(source = source.label(), error = %e, "failed to close source");
            }
        }
    }

    /// Drop the cursor (deleting what is left of the session) and record the
    /// final filter count.
    fn shut_down(&mut self) {
        if let State::Ready(cursor) = std::mem::replace(&mut self.state, State::Closed) {
            self.stats.quads_filtered = cursor.filtered();
            cursor.close();
        }
    }
}

impl InputLoader for ExternalSortingInputLoader {
    fn initialize(&mut self, mapping: Arc<dyn UriMapping>) -> Result<()> {
        match self.state {
            State::Created => {}
            State::Ready(_) => return Err(LoaderError::AlreadyInitialized),
            State::Closed => return Err(LoaderError::Closed),
        }

        tracing::info!(
            sources = self.sources.len(),
            work_dir = %self.config.work_dir.display(),
            memory_limit_bytes = self.config.memory_limit_bytes,
            mapped_subjects_only = self.config.output_mapped_subjects_only,
            map_subjects = self.config.map_subjects,
            map_predicates = self.config.map_predicates,
            map_objects = self.config.map_objects,
            "loading input"
        );
        let start = Instant::now();

        let mapper = QuadMapper::new(Arc::clone(&mapping))
            .with_subjects(self.config.map_subjects)
            .with_predicates(self.config.map_predicates)
            .with_objects(self.config.map_objects);
        let mut store = SpillStore::new(&self.config);
        let loaded = self.load_sources(&mapper, &mut store);
        self.close_sources();
        if let Err(e) = loaded {
            store.abort();
            self.state = State::Closed;
            return Err(e);
        }

        let SpillOutcome {
            input,
            session,
            stats,
        } = store.finish().inspect_err(|_| self.state = State::Closed)?;
        self.stats.runs_written = stats.runs_written;
        self.stats.consolidations = stats.consolidations;

        let filter = self.config.output_mapped_subjects_only.then_some(mapping);
        let cursor = MergeCursor::new(input, session, filter).inspect_err(|_| {
            self.state = State::Closed;
        })?;

        tracing::info!(
            quads = self.stats.quads_read,
            runs = stats.runs_written,
            consolidations = stats.consolidations,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "input loaded and sorted"
        );
        self.state = State::Ready(cursor);
        Ok(())
    }

    fn has_next(&self) -> bool {
        match &self.state {
            State::Ready(cursor) => cursor.has_next(),
            _ => false,
        }
    }

    fn next_quads(&mut self) -> Result<Vec<Quad>> {
        let cursor = match &mut self.state {
            State::Created => return Err(LoaderError::NotInitialized),
            State::Closed => return Err(LoaderError::Closed),
            State::Ready(cursor) => cursor,
        };
        if !cursor.has_next() {
            return Err(LoaderError::Exhausted);
        }

        match read_block(cursor) {
            Ok(block) => {
                self.stats.blocks_emitted += 1;
                self.stats.quads_emitted += block.len() as u64;
                tracing::trace!(
                    subject = %block[0].s,
                    quads = block.len(),
                    "resource block emitted"
                );
                Ok(block)
            }
            Err(e) => {
                self.shut_down();
                Err(e)
            }
        }
    }

    fn update_with_resolved_statements(&mut self, resolved: &[ResolvedStatement]) {
        tracing::trace!(statements = resolved.len(), "resolved statements received");
    }

    fn close(&mut self) {
        match self.state {
            State::Closed => return,
            State::Created => self.close_sources(),
            State::Ready(_) => {}
        }
        self.shut_down();
        let stats = self.stats;
        tracing::info!(
            quads_read = stats.quads_read,
            runs_written = stats.runs_written,
            blocks = stats.blocks_emitted,
            quads_emitted = stats.quads_emitted,
            quads_filtered = stats.quads_filtered,
            "input loader closed"
        );
    }
}

impl Drop for ExternalSortingInputLoader {
    fn drop(&mut self) {
        self.close();
    }
}

/// Take every quad sharing the subject of the cursor head.
///
/// The cursor must not be empty.
fn read_block(cursor: &mut MergeCursor) -> Result<Vec<Quad>> {
    let mut block = Vec::new();
    while let Some(quad) = cursor.next_quad()? {
        let same_subject = cursor
            .peek()
            .is_some_and(|next| next.cmp_subject(&quad) == Ordering::Equal);
        block.push(quad);
        if !same_subject {
            break;
        }
    }
    Ok(block)
}
