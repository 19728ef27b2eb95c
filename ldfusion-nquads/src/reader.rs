//! Streaming line reader

use std::io::BufRead;

use ldfusion_graph_ir::Quad;

use crate::error::{NQuadsError, Result};
use crate::parser::{parse_line, RdfFormat};

/// Iterator over the statements of an N-Quads or N-Triples stream.
///
/// Reads one line at a time; blank and comment lines are skipped. After the
/// first error the iterator is fused and yields `None`.
pub struct NQuadsReader<R> {
    reader: R,
    format: RdfFormat,
    line_number: usize,
    buf: String,
    failed: bool,
}

impl<R: BufRead> NQuadsReader<R> {
    pub fn new(reader: R, format: RdfFormat) -> Self {
        Self {
            reader,
            format,
            line_number: 0,
            buf: String::new(),
            failed: false,
        }
    }

    /// Number of lines consumed so far
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    fn read_next(&mut self) -> Result<Option<Quad>> {
        loop {
            self.buf.clear();
            let read = self
                .reader
                .read_line(&mut self.buf)
                .map_err(|source| NQuadsError::Io {
                    line: self.line_number,
                    source,
                })?;
            if read == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let line = self.buf.trim_end_matches(['\n', '\r']);
            if let Some(quad) = parse_line(line, self.line_number, self.format)? {
                return Ok(Some(quad));
            }
        }
    }
}

impl<R: BufRead> Iterator for NQuadsReader<R> {
    type Item = Result<Quad>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.read_next() {
            Ok(quad) => quad.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
