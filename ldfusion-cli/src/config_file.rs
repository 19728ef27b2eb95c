//! Fusion configuration file.
//!
//! The file is TOML (or JSON when the extension is `.json`):
//!
//! ```toml
//! [[sources]]
//! name = "dbpedia"
//! path = "data/dbpedia.nq"
//! format = "nquads"
//!
//! [[same_as_sources]]
//! path = "links/sameas.nt"
//! format = "ntriples"
//!
//! [processing]
//! work_dir = "/tmp"
//! memory_limit_mb = 512
//! output_mapped_subjects_only = false
//! map_objects = true
//!
//! [output]
//! path = "fused.nq"
//! same_as_path = "sameas-out.nt"
//! ```
//!
//! Relative paths in the file are resolved against the file's directory.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. CLI arguments
//! 2. Config file
//! 3. Hardcoded defaults

use ldfusion_graph_ir::vocab;
use ldfusion_input_loader::LoaderConfig;
use ldfusion_nquads::RdfFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// File config serde types (all Option: absence means "not set in file")
// ---------------------------------------------------------------------------

/// Top-level config file structure.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct FusionFileConfig {
    /// `[[sources]]`
    #[serde(default)]
    pub sources: Vec<SourceFileConfig>,

    /// `[[same_as_sources]]`
    #[serde(default)]
    pub same_as_sources: Vec<SameAsFileConfig>,

    /// `[processing]`
    #[serde(default)]
    pub processing: Option<ProcessingFileConfig>,

    /// `[output]`
    #[serde(default)]
    pub output: Option<OutputFileConfig>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct SourceFileConfig {
    pub name: Option<String>,
    pub path: Option<String>,
    pub format: Option<String>,
    /// Graph IRI for statements read without one
    pub default_graph: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct SameAsFileConfig {
    pub path: Option<String>,
    pub format: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct ProcessingFileConfig {
    pub work_dir: Option<String>,
    pub memory_limit_mb: Option<u64>,
    pub output_mapped_subjects_only: Option<bool>,
    pub map_subjects: Option<bool>,
    pub map_predicates: Option<bool>,
    pub map_objects: Option<bool>,
    pub max_open_runs: Option<usize>,
    pub canonical_uri_input_file: Option<String>,
    pub canonical_uri_output_file: Option<String>,
    pub same_as_link_types: Option<Vec<String>>,
    pub max_output_quads: Option<u64>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct OutputFileConfig {
    pub path: Option<String>,
    pub same_as_path: Option<String>,
}

// ---------------------------------------------------------------------------
// Config file loading
// ---------------------------------------------------------------------------

/// Load a config file from the given path. Detects format by extension:
/// `.json` → JSON, everything else → TOML.
pub fn load_config(path: &Path) -> Result<FusionFileConfig, ConfigFileError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigFileError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    if content.trim().is_empty() {
        return Ok(FusionFileConfig::default());
    }

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&content).map_err(|e| ConfigFileError::Parse {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })
    } else {
        toml::from_str(&content).map_err(|e| ConfigFileError::Parse {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })
    }
}

/// Errors from config file loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {}: {detail}", path.display())]
    Parse { path: PathBuf, detail: String },
    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// An input data source
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSpec {
    pub label: String,
    pub path: PathBuf,
    pub format: RdfFormat,
    pub default_graph: Option<String>,
}

/// A file of sameAs links
#[derive(Debug, Clone, PartialEq)]
pub struct SameAsSpec {
    pub path: PathBuf,
    pub format: RdfFormat,
}

/// Values given on the command line; `None`/`false` means "not given".
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub work_dir: Option<PathBuf>,
    pub memory_limit_mb: Option<u64>,
    pub mapped_subjects_only: bool,
    pub output: Option<PathBuf>,
}

/// Fully resolved run configuration.
#[derive(Debug, Clone)]
pub struct FusionConfig {
    pub sources: Vec<SourceSpec>,
    pub same_as_sources: Vec<SameAsSpec>,
    pub loader: LoaderConfig,
    pub canonical_uri_input: Option<PathBuf>,
    pub canonical_uri_output: Option<PathBuf>,
    pub same_as_link_types: Vec<String>,
    pub max_output_quads: Option<u64>,
    pub output: PathBuf,
    pub same_as_output: Option<PathBuf>,
}

impl FusionConfig {
    /// Merge the file config with CLI overrides and defaults.
    ///
    /// `base_dir` is the directory relative file paths are resolved against.
    pub fn resolve(
        file: FusionFileConfig,
        base_dir: &Path,
        overrides: &ConfigOverrides,
    ) -> Result<Self, ConfigFileError> {
        let resolve_path = |p: &str| base_dir.join(p);

        if file.sources.is_empty() {
            return Err(ConfigFileError::InvalidValue(
                "at least one [[sources]] entry is required".to_string(),
            ));
        }

        let mut sources = Vec::with_capacity(file.sources.len());
        for (i, src) in file.sources.into_iter().enumerate() {
            let path = src.path.as_deref().ok_or_else(|| {
                ConfigFileError::InvalidValue(format!("sources[{i}] has no path"))
            })?;
            let path = resolve_path(path);
            sources.push(SourceSpec {
                label: src.name.unwrap_or_else(|| path.display().to_string()),
                format: parse_format(src.format.as_deref(), &path)?,
                default_graph: src.default_graph,
                path,
            });
        }

        let mut same_as_sources = Vec::with_capacity(file.same_as_sources.len());
        for (i, src) in file.same_as_sources.into_iter().enumerate() {
            let path = src.path.as_deref().ok_or_else(|| {
                ConfigFileError::InvalidValue(format!("same_as_sources[{i}] has no path"))
            })?;
            let path = resolve_path(path);
            same_as_sources.push(SameAsSpec {
                format: parse_format(src.format.as_deref(), &path)?,
                path,
            });
        }

        let processing = file.processing.unwrap_or_default();
        let output = file.output.unwrap_or_default();

        let mut loader = LoaderConfig::default();
        if let Some(dir) = overrides
            .work_dir
            .clone()
            .or_else(|| processing.work_dir.as_deref().map(resolve_path))
        {
            loader.work_dir = dir;
        }
        if let Some(mb) = overrides.memory_limit_mb.or(processing.memory_limit_mb) {
            loader.memory_limit_bytes = mb_to_bytes(mb)?;
        }
        if let Some(max) = processing.max_open_runs {
            loader.max_open_runs = max;
        }
        loader.output_mapped_subjects_only = overrides.mapped_subjects_only
            || processing.output_mapped_subjects_only.unwrap_or(false);
        loader.map_subjects = processing.map_subjects.unwrap_or(true);
        loader.map_predicates = processing.map_predicates.unwrap_or(true);
        loader.map_objects = processing.map_objects.unwrap_or(true);
        loader
            .validate()
            .map_err(|e| ConfigFileError::InvalidValue(e.to_string()))?;

        let output_path = overrides
            .output
            .clone()
            .or_else(|| output.path.as_deref().map(resolve_path))
            .ok_or_else(|| {
                ConfigFileError::InvalidValue(
                    "no output file: set [output].path or pass --output".to_string(),
                )
            })?;

        let same_as_link_types = processing
            .same_as_link_types
            .filter(|types| !types.is_empty())
            .unwrap_or_else(|| vec![vocab::owl::SAME_AS.to_string()]);

        Ok(Self {
            sources,
            same_as_sources,
            loader,
            canonical_uri_input: processing
                .canonical_uri_input_file
                .as_deref()
                .map(resolve_path),
            canonical_uri_output: processing
                .canonical_uri_output_file
                .as_deref()
                .map(resolve_path),
            same_as_link_types,
            max_output_quads: processing.max_output_quads,
            output: output_path,
            same_as_output: output.same_as_path.as_deref().map(resolve_path),
        })
    }
}

/// Read and resolve the config file at `path`.
pub fn load_and_resolve(
    path: &Path,
    overrides: &ConfigOverrides,
) -> Result<FusionConfig, ConfigFileError> {
    let file = load_config(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    let config = FusionConfig::resolve(file, base_dir, overrides)?;
    tracing::debug!(
        path = %path.display(),
        sources = config.sources.len(),
        same_as_sources = config.same_as_sources.len(),
        "configuration loaded"
    );
    Ok(config)
}

/// Explicit format wins; otherwise `.nt` means N-Triples and anything else
/// N-Quads.
fn parse_format(format: Option<&str>, path: &Path) -> Result<RdfFormat, ConfigFileError> {
    match format {
        Some(f) => f.parse().map_err(ConfigFileError::InvalidValue),
        None => {
            let is_nt = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("nt"));
            Ok(if is_nt {
                RdfFormat::NTriples
            } else {
                RdfFormat::NQuads
            })
        }
    }
}

fn mb_to_bytes(mb: u64) -> Result<usize, ConfigFileError> {
    mb.checked_mul(1024 * 1024)
        .and_then(|bytes| usize::try_from(bytes).ok())
        .ok_or_else(|| ConfigFileError::InvalidValue(format!("memory_limit_mb {mb} is too large")))
}
