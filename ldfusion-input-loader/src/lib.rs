//! # LD-Fusion Input Loader
//!
//! Supplies the fusion pipeline with *resource blocks*: every quad sharing
//! one canonical subject, delivered subject by subject in SPOG order.
//!
//! Input quads are read from any number of [`QuadSource`]s, mapped through
//! a frozen [`UriMapping`](ldfusion_uri_mapping::UriMapping) and sorted
//! with a memory-bounded external merge sort:
//!
//! 1. **Spill** ([`spill`]): mapped quads are buffered up to a byte budget,
//!    sorted and written as binary run files in a per-session directory.
//! 2. **Merge** ([`run_index`]): a k-way merge streams the runs back in
//!    global order, deleting each run once consumed.
//! 3. **Group** ([`ExternalSortingInputLoader`]): an adjacency scan over the
//!    merged stream cuts it into resource blocks.
//!
//! When the whole input fits the budget nothing touches disk.

pub mod config;
pub mod cursor;
pub mod error;
mod loader;
mod mapper;
mod resolved;
pub mod run_index;
mod source;
pub mod spill;

pub use config::LoaderConfig;
pub use error::{LoaderError, Result};
pub use loader::{ExternalSortingInputLoader, InputLoader, LoaderStats};
pub use mapper::QuadMapper;
pub use resolved::ResolvedStatement;
pub use source::{NQuadsFileSource, QuadSource, VecQuadSource};
