//! Sorted run files: record codec, file format, streaming reader, k-way merge.

pub mod merge;
pub mod run_file;
pub mod run_record;
pub mod streaming_reader;

pub use merge::{KWayMerge, MergeSource};
pub use run_file::{RunFile, RunFileHeader, RunFileWriter};
pub use streaming_reader::StreamingRunReader;
