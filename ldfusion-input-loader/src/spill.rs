//! Memory-bounded spill store: buffers mapped quads, sorts, and flushes runs.
//!
//! Implements the external-sort pattern: accumulate quads up to a byte
//! budget, sort them SPOG, and write them as an immutable run file in a
//! per-session directory under the configured work directory. At the end of
//! input the store either hands back the sorted buffer (nothing was spilled)
//! or a k-way merge over all runs.

use crate::config::LoaderConfig;
use crate::error::{LoaderError, Result};
use crate::run_index::merge::KWayMerge;
use crate::run_index::run_file::{write_run_file, RunFile, RunFileWriter};
use crate::run_index::streaming_reader::StreamingRunReader;
use ldfusion_graph_ir::Quad;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::TempDir;

/// Prefix of the per-session spill directory.
const SESSION_DIR_PREFIX: &str = "ldfusion-sort-";

/// Sorted output of a finished spill store.
pub enum SortedInput {
    /// Nothing was spilled; the buffer was sorted in place.
    InMemory(std::vec::IntoIter<Quad>),
    /// Merge over every run written during the session.
    Merged(KWayMerge<StreamingRunReader>),
}

/// Counters reported by a spill store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpillStats {
    pub runs_written: u64,
    pub consolidations: u64,
    /// Records rewritten by consolidation merges
    pub consolidated_records: u64,
}

/// Everything the merge phase takes over from the store.
pub struct SpillOutcome {
    pub input: SortedInput,
    /// Spill directory; `None` when nothing was written to disk
    pub session: Option<TempDir>,
    pub stats: SpillStats,
}

/// Memory-bounded quad buffer that spills sorted run files.
pub struct SpillStore {
    work_dir: PathBuf,
    memory_limit_bytes: usize,
    max_open_runs: usize,
    read_batch_size: usize,
    buffer: Vec<Quad>,
    /// Estimated footprint of `buffer`
    buffered_bytes: usize,
    // Declared before `session` so run files are removed before their directory
    runs: Vec<RunFile>,
    /// Merge level of each entry in `runs`; never increases along the vector
    levels: Vec<u32>,
    session: Option<TempDir>,
    next_run_id: u32,
    stats: SpillStats,
}

impl SpillStore {
    pub fn new(config: &LoaderConfig) -> Self {
        Self {
            work_dir: config.work_dir.clone(),
            memory_limit_bytes: config.memory_limit_bytes,
            max_open_runs: config.max_open_runs,
            read_batch_size: config.read_batch_size,
            buffer: Vec::new(),
            buffered_bytes: 0,
            runs: Vec::new(),
            levels: Vec::new(),
            session: None,
            next_run_id: 0,
            stats: SpillStats::default(),
        }
    }

    /// Buffer one mapped quad. Spills a run when the budget is exceeded.
    pub fn push(&mut self, quad: Quad) -> Result<()> {
        self.buffered_bytes += quad.estimated_size();
        self.buffer.push(quad);

        if self.buffered_bytes > self.memory_limit_bytes {
            self.spill()?;
        }
        Ok(())
    }

    /// Number of run files currently held
    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    pub fn stats(&self) -> SpillStats {
        self.stats
    }

    /// Path of the spill directory, if one has been created
    pub fn session_dir(&self) -> Option<&Path> {
        self.session.as_ref().map(TempDir::path)
    }

    /// Sort the buffer and write it as the next run.
    fn spill(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let path = self.next_run_path()?;
        let record_count = self.buffer.len();

        let sort_start = Instant::now();
        self.buffer.sort_unstable();
        let sort_elapsed = sort_start.elapsed();

        let write_start = Instant::now();
        let run = write_run_file(path, &self.buffer)?;
        let write_elapsed = write_start.elapsed();

        tracing::info!(
            run = self.next_run_id - 1,
            records = record_count,
            buffered_bytes = self.buffered_bytes,
            file_bytes = run.byte_len(),
            sort_ms = sort_elapsed.as_millis() as u64,
            write_ms = write_elapsed.as_millis() as u64,
            path = %run.path().display(),
            "run file flushed"
        );

        self.runs.push(run);
        self.levels.push(0);
        self.stats.runs_written += 1;
        self.buffer.clear();
        self.buffered_bytes = 0;

        if self.runs.len() >= self.max_open_runs {
            self.consolidate()?;
        }
        Ok(())
    }

    /// Merge the trailing runs of the lowest level into one run a level up.
    ///
    /// A lone lowest-level run is merged together with the level above it.
    /// Input runs are deleted as the merge consumes them.
    fn consolidate(&mut self) -> Result<()> {
        let first = merge_group_start(&self.levels);
        let level = self.levels[first] + 1;
        let input_runs = self.runs.len() - first;
        let start = Instant::now();
        let path = self.next_run_path()?;

        self.levels.truncate(first);
        let readers = self
            .runs
            .split_off(first)
            .into_iter()
            .map(|run| StreamingRunReader::open(run, self.read_batch_size))
            .collect::<Result<Vec<_>>>()?;
        let mut merge = KWayMerge::new(readers)?;

        let mut writer = RunFileWriter::create(path)?;
        while let Some(quad) = merge.next_quad()? {
            writer.push(&quad)?;
        }
        let run = writer.finish()?;

        tracing::info!(
            input_runs,
            level,
            records = run.record_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            path = %run.path().display(),
            "runs consolidated"
        );

        self.stats.consolidated_records += run.record_count();
        self.runs.push(run);
        self.levels.push(level);
        self.stats.consolidations += 1;
        Ok(())
    }

    /// Path for the next run, creating the session directory on first use.
    fn next_run_path(&mut self) -> Result<PathBuf> {
        if self.session.is_none() {
            let dir = tempfile::Builder::new()
                .prefix(SESSION_DIR_PREFIX)
                .tempdir_in(&self.work_dir)
                .map_err(|e| LoaderError::run_io(&self.work_dir, e))?;
            tracing::debug!(path = %dir.path().display(), "spill directory created");
            self.session = Some(dir);
        }

        let id = self.next_run_id;
        self.next_run_id += 1;
        let dir = self
            .session
            .as_ref()
            .map(TempDir::path)
            .unwrap_or(self.work_dir.as_path());
        Ok(dir.join(format!("run_{:05}.lqr", id)))
    }

    /// End of input: produce the globally sorted sequence.
    pub fn finish(mut self) -> Result<SpillOutcome> {
        if self.runs.is_empty() {
            self.buffer.sort_unstable();
            tracing::debug!(
                records = self.buffer.len(),
                buffered_bytes = self.buffered_bytes,
                "no run spilled; serving sorted input from memory"
            );
            return Ok(SpillOutcome {
                input: SortedInput::InMemory(std::mem::take(&mut self.buffer).into_iter()),
                session: self.session.take(),
                stats: self.stats,
            });
        }

        self.spill()?;

        let runs = std::mem::take(&mut self.runs);
        self.levels.clear();
        let run_count = runs.len();
        let records: u64 = runs.iter().map(RunFile::record_count).sum();
        let readers = runs
            .into_iter()
            .map(|run| StreamingRunReader::open(run, self.read_batch_size))
            .collect::<Result<Vec<_>>>()?;
        let merge = KWayMerge::new(readers)?;

        tracing::info!(runs = run_count, records, "merging sorted runs");
        Ok(SpillOutcome {
            input: SortedInput::Merged(merge),
            session: self.session.take(),
            stats: self.stats,
        })
    }

    /// Abandon the session, deleting every run and the spill directory.
    pub fn abort(mut self) {
        let runs = self.runs.len();
        self.runs.clear();
        self.levels.clear();
        if let Some(dir) = self.session.take() {
            remove_session_dir(dir);
        }
        tracing::debug!(runs, "spill store aborted");
    }
}

/// Index of the first run to merge, given non-increasing run levels.
///
/// Takes the trailing runs of the lowest level, widening to the next level
/// up until at least two runs are covered.
fn merge_group_start(levels: &[u32]) -> usize {
    let mut first = levels.len().saturating_sub(1);
    let mut level = levels.last().copied().unwrap_or(0);
    loop {
        while first > 0 && levels[first - 1] <= level {
            first -= 1;
        }
        if levels.len() - first >= 2 || first == 0 {
            return first;
        }
        level = levels[first - 1];
    }
}

/// Remove a session directory, logging (not propagating) failures.
pub fn remove_session_dir(dir: TempDir) {
    let path = dir.path().to_path_buf();
    if let Err(e) = dir.close() {
        tracing::warn!(path = %path.display(), error = %e, "failed to remove spill directory");
    }
}
