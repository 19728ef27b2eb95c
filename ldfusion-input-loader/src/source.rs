//! Quad sources feeding the loader.
//!
//! A source is a finite, once-only sequence of quads plus a close
//! operation. The loader concatenates all of its sources before sorting.

use crate::error::{LoaderError, Result};
use ldfusion_graph_ir::{Quad, Term};
use ldfusion_nquads::{NQuadsError, NQuadsReader, RdfFormat};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// A finite stream of quads
pub trait QuadSource {
    /// Human-readable name used in logs and errors
    fn label(&self) -> &str;

    /// Next quad, `None` at end of input
    fn next_quad(&mut self) -> Result<Option<Quad>>;

    /// Release underlying resources. Called once the source is drained or
    /// the load is abandoned.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

// ============================================================================
// File source
// ============================================================================

enum FileState {
    Pending,
    Open(NQuadsReader<BufReader<File>>),
    Done,
}

/// N-Quads or N-Triples file, streamed line by line.
///
/// The file is opened on the first read, so construction never fails.
pub struct NQuadsFileSource {
    label: String,
    path: PathBuf,
    format: RdfFormat,
    default_graph: Option<Term>,
    state: FileState,
}

impl NQuadsFileSource {
    pub fn new(path: impl Into<PathBuf>, format: RdfFormat) -> Self {
        let path = path.into();
        Self {
            label: path.display().to_string(),
            path,
            format,
            default_graph: None,
            state: FileState::Pending,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Graph assigned to statements that carry none
    #[must_use]
    pub fn with_default_graph(mut self, graph: Term) -> Self {
        self.default_graph = Some(graph);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<NQuadsReader<BufReader<File>>> {
        let file = File::open(&self.path).map_err(|source| LoaderError::SourceRead {
            source_label: self.label.clone(),
            source,
        })?;
        tracing::debug!(source = %self.label, path = %self.path.display(), "source opened");
        Ok(NQuadsReader::new(BufReader::new(file), self.format))
    }

    fn map_error(&self, err: NQuadsError) -> LoaderError {
        match err {
            NQuadsError::Io { source, .. } => LoaderError::SourceRead {
                source_label: self.label.clone(),
                source,
            },
            other => LoaderError::Malformed {
                source_label: self.label.clone(),
                source: other,
            },
        }
    }
}

impl QuadSource for NQuadsFileSource {
    fn label(&self) -> &str {
        &self.label
    }

    fn next_quad(&mut self) -> Result<Option<Quad>> {
        if matches!(self.state, FileState::Pending) {
            self.state = FileState::Open(self.open()?);
        }
        let reader = match &mut self.state {
            FileState::Open(reader) => reader,
            _ => return Ok(None),
        };

        match reader.next() {
            Some(Ok(mut quad)) => {
                if quad.g.is_none() {
                    quad.g = self.default_graph.clone();
                }
                Ok(Some(quad))
            }
            Some(Err(e)) => {
                self.state = FileState::Done;
                Err(self.map_error(e))
            }
            None => {
                self.state = FileState::Done;
                Ok(None)
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        self.state = FileState::Done;
        Ok(())
    }
}

// ============================================================================
// In-memory source
// ============================================================================

/// Quads that are already in memory, e.g. the result of an endpoint query.
pub struct VecQuadSource {
    label: String,
    quads: std::vec::IntoIter<Quad>,
}

impl VecQuadSource {
    pub fn new(label: impl Into<String>, quads: Vec<Quad>) -> Self {
        Self {
            label: label.into(),
            quads: quads.into_iter(),
        }
    }
}

impl QuadSource for VecQuadSource {
    fn label(&self) -> &str {
        &self.label
    }

    fn next_quad(&mut self) -> Result<Option<Quad>> {
        Ok(self.quads.next())
    }
}
