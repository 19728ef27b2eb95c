//! N-Quads and N-Triples support for LD-Fusion.
//!
//! Both syntaxes are line based: every statement sits on its own line, so the
//! reader streams input of any size one line at a time.
//!
//! # Example
//!
//! ```
//! use ldfusion_nquads::{NQuadsReader, RdfFormat};
//!
//! let input = "<http://ex.org/s> <http://ex.org/p> \"v\" <http://ex.org/g> .\n";
//! let quads: Vec<_> = NQuadsReader::new(input.as_bytes(), RdfFormat::NQuads)
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(quads.len(), 1);
//! ```

pub mod error;
pub mod lex;
pub mod parser;
mod reader;
mod writer;

pub use error::{NQuadsError, Result};
pub use parser::{parse_line, RdfFormat};
pub use reader::NQuadsReader;
pub use writer::NQuadsWriter;
