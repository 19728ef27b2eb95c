//! Output of conflict resolution, fed back to the loader.

use ldfusion_graph_ir::{Quad, Term};

/// A statement chosen by conflict resolution for one conflict cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStatement {
    pub quad: Quad,
    /// Aggregate quality in `[0, 1]`
    pub quality: f64,
    /// Named graphs the value was taken from
    pub source_graphs: Vec<Term>,
}

impl ResolvedStatement {
    pub fn new(quad: Quad, quality: f64, source_graphs: Vec<Term>) -> Self {
        Self {
            quad,
            quality,
            source_graphs,
        }
    }
}
