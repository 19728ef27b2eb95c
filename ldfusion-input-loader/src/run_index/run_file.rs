//! Run file binary format and ownership guard.
//!
//! ```text
//! [Header: 32 bytes]
//!   magic: "LQR1" (4B), version: u8, flags: u8, _pad: [u8; 2]
//!   record_count: u64
//!   payload_len: u64
//!   _reserved: [u8; 8]
//! [Records: record_count variable-length quads, see run_record]
//! ```
//!
//! The header is written as a placeholder when the file is created and
//! patched with the final counts by [`RunFileWriter::finish`].

use super::run_record::write_quad;
use crate::error::{LoaderError, Result};
use ldfusion_graph_ir::Quad;
use std::fs::File;
use std::io::{self, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Magic bytes for a run file.
pub const RUN_MAGIC: [u8; 4] = *b"LQR1";

/// Current run file format version.
pub const RUN_VERSION: u8 = 1;

/// Header size in bytes.
pub const RUN_HEADER_LEN: usize = 32;

/// Run file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunFileHeader {
    pub version: u8,
    pub record_count: u64,
    pub payload_len: u64,
}

impl RunFileHeader {
    /// Encode into the 32-byte on-disk form.
    pub fn to_bytes(&self) -> [u8; RUN_HEADER_LEN] {
        let mut buf = [0u8; RUN_HEADER_LEN];
        buf[0..4].copy_from_slice(&RUN_MAGIC);
        buf[4] = self.version;
        buf[8..16].copy_from_slice(&self.record_count.to_le_bytes());
        buf[16..24].copy_from_slice(&self.payload_len.to_le_bytes());
        buf
    }

    /// Decode the 32-byte on-disk form.
    pub fn read_from(buf: &[u8; RUN_HEADER_LEN]) -> io::Result<Self> {
        if buf[0..4] != RUN_MAGIC {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "run file: invalid magic bytes",
            ));
        }
        let version = buf[4];
        if version != RUN_VERSION {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("run file: unsupported version {}", version),
            ));
        }

        let mut count = [0u8; 8];
        count.copy_from_slice(&buf[8..16]);
        let mut payload = [0u8; 8];
        payload.copy_from_slice(&buf[16..24]);

        Ok(Self {
            version,
            record_count: u64::from_le_bytes(count),
            payload_len: u64::from_le_bytes(payload),
        })
    }
}

// ============================================================================
// Ownership guard
// ============================================================================

/// Owning handle for a finished run file on disk.
///
/// Dropping the handle deletes the file. Deletion is best effort: a file
/// that is already gone is ignored, any other failure is logged.
#[derive(Debug)]
pub struct RunFile {
    path: PathBuf,
    record_count: u64,
    byte_len: u64,
}

impl RunFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    /// Total file size including the header
    pub fn byte_len(&self) -> u64 {
        self.byte_len
    }
}

impl Drop for RunFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::trace!(path = %self.path.display(), "run file deleted");
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "failed to delete run file"
                );
            }
        }
    }
}

// ============================================================================
// Writer
// ============================================================================

/// Streaming writer for one run file.
///
/// Quads must be pushed in SPOG order. A writer dropped without `finish`
/// deletes its partial file.
pub struct RunFileWriter {
    out: Option<BufWriter<File>>,
    path: PathBuf,
    record_count: u64,
    payload_len: u64,
}

impl RunFileWriter {
    /// Create `path` and reserve space for the header.
    pub fn create(path: PathBuf) -> Result<Self> {
        let file = File::create(&path).map_err(|e| LoaderError::run_io(&path, e))?;
        let mut writer = Self {
            out: Some(BufWriter::new(file)),
            path,
            record_count: 0,
            payload_len: 0,
        };
        let placeholder = RunFileHeader {
            version: RUN_VERSION,
            record_count: 0,
            payload_len: 0,
        };
        writer.write_bytes(&placeholder.to_bytes())?;
        Ok(writer)
    }

    pub fn push(&mut self, quad: &Quad) -> Result<()> {
        let Self { out, path, .. } = self;
        let out = out
            .as_mut()
            .ok_or_else(|| LoaderError::corrupt(path.as_path(), "write after finish"))?;
        let written = write_quad(out, quad).map_err(|e| LoaderError::run_io(path.as_path(), e))?;
        self.record_count += 1;
        self.payload_len += written;
        Ok(())
    }

    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    /// Patch the header, flush, and hand the file over to a [`RunFile`] guard.
    pub fn finish(mut self) -> Result<RunFile> {
        let header = RunFileHeader {
            version: RUN_VERSION,
            record_count: self.record_count,
            payload_len: self.payload_len,
        };
        let path = self.path.clone();
        if let Some(mut out) = self.out.take() {
            let patched = out
                .seek(SeekFrom::Start(0))
                .and_then(|_| out.write_all(&header.to_bytes()))
                .and_then(|_| out.flush());
            if let Err(e) = patched {
                self.out = Some(out);
                return Err(LoaderError::run_io(&path, e));
            }
        }

        // Taking the path moves ownership of the file to the guard
        let guard = RunFile {
            path: std::mem::take(&mut self.path),
            record_count: header.record_count,
            byte_len: RUN_HEADER_LEN as u64 + header.payload_len,
        };
        Ok(guard)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        match self.out.as_mut() {
            Some(out) => out
                .write_all(bytes)
                .map_err(|e| LoaderError::run_io(&self.path, e)),
            None => Err(LoaderError::corrupt(&self.path, "write after finish")),
        }
    }
}

impl Drop for RunFileWriter {
    fn drop(&mut self) {
        // An empty path means finish() handed the file to a RunFile guard.
        if self.path.as_os_str().is_empty() {
            return;
        }
        drop(self.out.take());
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "failed to delete partial run file"
                );
            }
        }
    }
}

/// Write an already sorted slice as a complete run file.
pub fn write_run_file(path: PathBuf, quads: &[Quad]) -> Result<RunFile> {
    let mut writer = RunFileWriter::create(path)?;
    for quad in quads {
        writer.push(quad)?;
    }
    writer.finish()
}
