//! K-way merge of N sorted quad streams.
//!
//! Uses a manual min-heap holding the head quad of every non-exhausted
//! stream. Quads emerge in SPOG order; equal quads from different streams
//! come out in stream order.

use super::streaming_reader::StreamingRunReader;
use crate::error::Result;
use ldfusion_graph_ir::Quad;
use std::cmp::Ordering;

// ============================================================================
// MergeSource trait
// ============================================================================

/// Forward-only, SPOG-sorted quad stream that can be k-way merged.
pub trait MergeSource {
    /// Take the next quad, `None` once exhausted.
    fn next_quad(&mut self) -> Result<Option<Quad>>;
}

impl MergeSource for StreamingRunReader {
    fn next_quad(&mut self) -> Result<Option<Quad>> {
        StreamingRunReader::next_quad(self)
    }
}

/// Entry in the min-heap: a quad and the stream it came from.
struct HeapEntry {
    quad: Quad,
    stream_idx: usize,
}

// ============================================================================
// KWayMerge
// ============================================================================

/// K-way merge iterator over sorted streams.
pub struct KWayMerge<T: MergeSource> {
    heap: Vec<HeapEntry>,
    streams: Vec<T>,
}

impl<T: MergeSource> KWayMerge<T> {
    /// Create a merge from opened streams. Seeds the heap with the first
    /// quad of each non-empty stream.
    pub fn new(mut streams: Vec<T>) -> Result<Self> {
        let mut heap = Vec::with_capacity(streams.len());
        for (idx, stream) in streams.iter_mut().enumerate() {
            if let Some(quad) = stream.next_quad()? {
                heap.push(HeapEntry {
                    quad,
                    stream_idx: idx,
                });
            }
        }

        let mut me = Self { heap, streams };

        // Build-heap: heapify from the last internal node down to root.
        if me.heap.len() > 1 {
            let last_internal = (me.heap.len() / 2).saturating_sub(1);
            for i in (0..=last_internal).rev() {
                me.sift_down(i);
            }
        }

        Ok(me)
    }

    /// Number of input streams (exhausted ones included)
    pub fn stream_count(&self) -> usize {
        self.streams.len()
    }

    // ---- Manual min-heap operations ----

    /// Compare two heap entries: first SPOG, then stream index.
    #[inline]
    fn heap_less(&self, i: usize, j: usize) -> bool {
        match self.heap[i].quad.cmp_spog(&self.heap[j].quad) {
            Ordering::Less => true,
            Ordering::Greater => false,
            Ordering::Equal => self.heap[i].stream_idx < self.heap[j].stream_idx,
        }
    }

    fn sift_down(&mut self, mut pos: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * pos + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let mut smallest = left;
            if right < len && self.heap_less(right, left) {
                smallest = right;
            }
            if !self.heap_less(smallest, pos) {
                break;
            }
            self.heap.swap(pos, smallest);
            pos = smallest;
        }
    }

    fn sift_up(&mut self, mut pos: usize) {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if !self.heap_less(pos, parent) {
                break;
            }
            self.heap.swap(pos, parent);
            pos = parent;
        }
    }

    fn heap_pop(&mut self) -> Option<HeapEntry> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.heap.swap(0, last);
        let entry = self.heap.pop();
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        entry
    }

    fn heap_push(&mut self, entry: HeapEntry) {
        self.heap.push(entry);
        let pos = self.heap.len() - 1;
        self.sift_up(pos);
    }

    // ---- Public API ----

    /// Smallest pending quad without advancing
    pub fn peek(&self) -> Option<&Quad> {
        self.heap.first().map(|e| &e.quad)
    }

    /// Pop the next quad in merge order.
    pub fn next_quad(&mut self) -> Result<Option<Quad>> {
        let entry = match self.heap_pop() {
            Some(e) => e,
            None => return Ok(None),
        };

        let idx = entry.stream_idx;
        if let Some(next) = self.streams[idx].next_quad()? {
            self.heap_push(HeapEntry {
                quad: next,
                stream_idx: idx,
            });
        }

        Ok(Some(entry.quad))
    }
}
