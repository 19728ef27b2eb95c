//! Buffered, forward-only reader for run files.
//!
//! Decodes `batch_size` quads at a time so that a k-way merge over many runs
//! holds only one small batch per run in memory.

use super::run_file::{RunFile, RunFileHeader, RUN_HEADER_LEN};
use super::run_record::read_quad;
use crate::error::{LoaderError, Result};
use ldfusion_graph_ir::Quad;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufReader, Read};

/// Buffered reader that owns its run file.
///
/// The open handle and the [`RunFile`] guard are released as soon as the
/// last quad has been handed out, which deletes the file from disk.
pub struct StreamingRunReader {
    // Declared before `run` so the handle closes before the file is deleted
    file: Option<BufReader<File>>,
    run: Option<RunFile>,
    buffer: VecDeque<Quad>,
    batch_size: usize,
    /// Records still on disk (not yet decoded into the buffer)
    remaining: u64,
    record_count: u64,
}

impl StreamingRunReader {
    /// Open a run file for streaming and decode the first batch.
    pub fn open(run: RunFile, batch_size: usize) -> Result<Self> {
        let path = run.path().to_path_buf();
        let mut file =
            BufReader::new(File::open(&path).map_err(|e| LoaderError::run_io(&path, e))?);

        let mut header_buf = [0u8; RUN_HEADER_LEN];
        file.read_exact(&mut header_buf)
            .map_err(|e| LoaderError::run_read(&path, e))?;
        let header =
            RunFileHeader::read_from(&header_buf).map_err(|e| LoaderError::run_read(&path, e))?;
        if header.record_count != run.record_count() {
            return Err(LoaderError::corrupt(
                &path,
                format!(
                    "header record count {} does not match written count {}",
                    header.record_count,
                    run.record_count()
                ),
            ));
        }

        let mut reader = Self {
            file: Some(file),
            run: Some(run),
            buffer: VecDeque::with_capacity(batch_size.min(header.record_count as usize)),
            batch_size: batch_size.max(1),
            remaining: header.record_count,
            record_count: header.record_count,
        };
        reader.fill_buffer()?;
        Ok(reader)
    }

    /// Peek at the current quad without advancing.
    #[inline]
    pub fn peek(&self) -> Option<&Quad> {
        self.buffer.front()
    }

    /// Take the current quad, refilling the buffer from disk if needed.
    pub fn next_quad(&mut self) -> Result<Option<Quad>> {
        let quad = self.buffer.pop_front();
        if self.buffer.is_empty() {
            self.fill_buffer()?;
        }
        Ok(quad)
    }

    /// True when all quads have been consumed.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.buffer.is_empty() && self.remaining == 0
    }

    /// Number of quads in this run file (from the header).
    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    /// Decode the next batch; releases the file once everything is buffered.
    fn fill_buffer(&mut self) -> Result<()> {
        let to_read = self.remaining.min(self.batch_size as u64);
        if let (Some(file), Some(run)) = (self.file.as_mut(), self.run.as_ref()) {
            for _ in 0..to_read {
                let quad = read_quad(file).map_err(|e| LoaderError::run_read(run.path(), e))?;
                self.buffer.push_back(quad);
            }
        }
        self.remaining -= to_read;

        if self.remaining == 0 {
            self.release();
        }
        Ok(())
    }

    /// Close the handle, then drop the guard (deleting the file).
    fn release(&mut self) {
        drop(self.file.take());
        drop(self.run.take());
    }
}
