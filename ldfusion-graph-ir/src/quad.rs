//! Quads, SPOG ordering and adjacency grouping
//!
//! A sorted slice of quads is sliced into *resource blocks* (maximal runs
//! sharing a subject) and each block into *conflict clusters* (maximal runs
//! sharing a predicate). Both iterators are pure adjacency scans and borrow
//! from the slice.

use crate::Term;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A subject-predicate-object statement with an optional named graph
///
/// `g == None` is the default graph, which sorts before every named graph.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Quad {
    pub s: Term,
    pub p: Term,
    pub o: Term,
    pub g: Option<Term>,
}

impl Quad {
    pub fn new(s: Term, p: Term, o: Term, g: Option<Term>) -> Self {
        Self { s, p, o, g }
    }

    /// Quad in the default graph
    pub fn triple(s: Term, p: Term, o: Term) -> Self {
        Self { s, p, o, g: None }
    }

    /// Full SPOG comparison
    pub fn cmp_spog(&self, other: &Self) -> Ordering {
        self.s
            .cmp(&other.s)
            .then_with(|| self.p.cmp(&other.p))
            .then_with(|| self.o.cmp(&other.o))
            .then_with(|| self.g.cmp(&other.g))
    }

    /// Subject-only comparison, a prefix of [`Quad::cmp_spog`]
    pub fn cmp_subject(&self, other: &Self) -> Ordering {
        self.s.cmp(&other.s)
    }

    /// Subject + predicate comparison, a prefix of [`Quad::cmp_spog`]
    pub fn cmp_subject_predicate(&self, other: &Self) -> Ordering {
        self.s.cmp(&other.s).then_with(|| self.p.cmp(&other.p))
    }

    /// Estimated in-memory footprint in bytes.
    ///
    /// Inline size of the struct plus the heap payload of each term. Used by
    /// the spill store to decide when its buffer exceeds the byte budget.
    pub fn estimated_size(&self) -> usize {
        std::mem::size_of::<Quad>()
            + self.s.heap_size()
            + self.p.heap_size()
            + self.o.heap_size()
            + self.g.as_ref().map_or(0, Term::heap_size)
    }
}

impl PartialOrd for Quad {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Quad {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_spog(other)
    }
}

/// One N-Quads line without the trailing newline
impl fmt::Display for Quad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.s, self.p, self.o)?;
        if let Some(g) = &self.g {
            write!(f, " {}", g)?;
        }
        f.write_str(" .")
    }
}

/// Iterator over conflict clusters of one resource block
///
/// Yields `(predicate, cluster)` for each maximal run sharing a predicate.
/// The input is expected to hold a single subject; mixed subjects are split
/// at every subject change as well.
pub struct ConflictClusters<'a> {
    quads: &'a [Quad],
    index: usize,
}

impl<'a> ConflictClusters<'a> {
    pub fn new(block: &'a [Quad]) -> Self {
        Self {
            quads: block,
            index: 0,
        }
    }
}

impl<'a> Iterator for ConflictClusters<'a> {
    type Item = (&'a Term, &'a [Quad]);

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.quads.len() {
            return None;
        }

        let start = self.index;
        let first = &self.quads[start];

        while self.index < self.quads.len()
            && self.quads[self.index].cmp_subject_predicate(first) == Ordering::Equal
        {
            self.index += 1;
        }

        Some((&first.p, &self.quads[start..self.index]))
    }
}
