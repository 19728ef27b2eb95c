//! Canonical URI lists
//!
//! One IRI per line. Blank lines and lines starting with `#` are ignored
//! on read; angle brackets around an IRI are optional.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use crate::error::{MappingError, Result};

/// Read a list of preferred canonical IRIs.
pub fn read_canonical_uris(path: &Path) -> Result<Vec<Arc<str>>> {
    let file = File::open(path).map_err(|e| MappingError::io(path, e))?;
    let mut uris = Vec::new();

    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| MappingError::io(path, e))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let iri = match trimmed.strip_prefix('<') {
            Some(rest) => rest.strip_suffix('>').ok_or_else(|| MappingError::Parse {
                path: path.to_path_buf(),
                line: idx + 1,
                message: format!("unterminated IRI '{}'", trimmed),
            })?,
            None => trimmed,
        };
        if iri.chars().any(char::is_whitespace) {
            return Err(MappingError::Parse {
                path: path.to_path_buf(),
                line: idx + 1,
                message: format!("IRI contains whitespace: '{}'", iri),
            });
        }
        uris.push(Arc::from(iri));
    }

    tracing::debug!(path = %path.display(), count = uris.len(), "read canonical URIs");
    Ok(uris)
}

/// Write `uris` one per line, creating or truncating `path`.
pub fn write_canonical_uris<I, S>(path: &Path, uris: I) -> Result<u64>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let file = File::create(path).map_err(|e| MappingError::io(path, e))?;
    let mut out = BufWriter::new(file);
    let mut count = 0u64;

    for uri in uris {
        writeln!(out, "{}", uri.as_ref()).map_err(|e| MappingError::io(path, e))?;
        count += 1;
    }
    out.flush().map_err(|e| MappingError::io(path, e))?;

    tracing::debug!(path = %path.display(), count, "wrote canonical URIs");
    Ok(count)
}
