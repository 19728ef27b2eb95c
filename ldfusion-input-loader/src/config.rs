//! Loader configuration

use crate::error::{LoaderError, Result};
use std::path::PathBuf;

/// Default in-memory sort budget: 256 MB.
pub const DEFAULT_MEMORY_LIMIT_BYTES: usize = 256 * 1024 * 1024;

/// Default maximum number of run files merged at once.
pub const DEFAULT_MAX_OPEN_RUNS: usize = 256;

/// Default number of quads decoded per run-file read.
pub const DEFAULT_READ_BATCH_SIZE: usize = 1024;

/// Configuration for [`ExternalSortingInputLoader`](crate::ExternalSortingInputLoader)
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Directory in which the per-session spill directory is created.
    ///
    /// Must exist and be writable. The spill directory is only created once
    /// the first run is written, and is removed on close.
    /// Default: the system temp directory.
    pub work_dir: PathBuf,

    /// Byte budget for buffered quads before a run is spilled.
    ///
    /// Compared against the estimated in-memory footprint of the buffer.
    /// 0 and 1 are accepted and spill every quad.
    /// Default: 256 MB.
    pub memory_limit_bytes: usize,

    /// Drop every quad whose mapped subject is not an explicit
    /// canonicalization target.
    /// Default: false
    pub output_mapped_subjects_only: bool,

    /// Canonicalize IRIs in subject position. Default: true
    pub map_subjects: bool,

    /// Canonicalize IRIs in predicate position. Default: true
    pub map_predicates: bool,

    /// Canonicalize IRIs in object position. Default: true
    pub map_objects: bool,

    /// Upper bound on the number of run files held at once.
    ///
    /// When this many runs exist, they are merged into one.
    /// Default: 256
    pub max_open_runs: usize,

    /// Quads decoded per read from a run file.
    /// Default: 1024
    pub read_batch_size: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            work_dir: std::env::temp_dir(),
            memory_limit_bytes: DEFAULT_MEMORY_LIMIT_BYTES,
            output_mapped_subjects_only: false,
            map_subjects: true,
            map_predicates: true,
            map_objects: true,
            max_open_runs: DEFAULT_MAX_OPEN_RUNS,
            read_batch_size: DEFAULT_READ_BATCH_SIZE,
        }
    }
}

impl LoaderConfig {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_memory_limit_bytes(mut self, bytes: usize) -> Self {
        self.memory_limit_bytes = bytes;
        self
    }

    #[must_use]
    pub fn with_output_mapped_subjects_only(mut self, enabled: bool) -> Self {
        self.output_mapped_subjects_only = enabled;
        self
    }

    #[must_use]
    pub fn with_map_subjects(mut self, enabled: bool) -> Self {
        self.map_subjects = enabled;
        self
    }

    #[must_use]
    pub fn with_map_predicates(mut self, enabled: bool) -> Self {
        self.map_predicates = enabled;
        self
    }

    #[must_use]
    pub fn with_map_objects(mut self, enabled: bool) -> Self {
        self.map_objects = enabled;
        self
    }

    #[must_use]
    pub fn with_max_open_runs(mut self, max_open_runs: usize) -> Self {
        self.max_open_runs = max_open_runs;
        self
    }

    #[must_use]
    pub fn with_read_batch_size(mut self, batch: usize) -> Self {
        self.read_batch_size = batch;
        self
    }

    /// Reject settings the loader cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.max_open_runs < 2 {
            return Err(LoaderError::InvalidConfig(format!(
                "max_open_runs must be at least 2, got {}",
                self.max_open_runs
            )));
        }
        if self.read_batch_size == 0 {
            return Err(LoaderError::InvalidConfig(
                "read_batch_size must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LoaderConfig::default();
        assert_eq!(config.memory_limit_bytes, DEFAULT_MEMORY_LIMIT_BYTES);
        assert!(!config.output_mapped_subjects_only);
        assert!(config.map_subjects && config.map_predicates && config.map_objects);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_and_validation() {
        let config = LoaderConfig::new("/tmp/work")
            .with_memory_limit_bytes(1)
            .with_output_mapped_subjects_only(true)
            .with_map_objects(false);
        assert_eq!(config.work_dir, PathBuf::from("/tmp/work"));
        assert!(config.map_subjects);
        assert!(!config.map_objects);
        assert_eq!(config.memory_limit_bytes, 1);
        assert!(config.validate().is_ok());

        assert!(matches!(
            config.clone().with_max_open_runs(1).validate(),
            Err(LoaderError::InvalidConfig(_))
        ));
        assert!(matches!(
            config.with_read_batch_size(0).validate(),
            Err(LoaderError::InvalidConfig(_))
        ));
    }
}
