//! Canonical URI mapping for LD-Fusion
//!
//! Resources linked by `owl:sameAs` (or another configured link type) form
//! equivalence classes. Each class has one representative IRI that replaces
//! every member during fusion.
//!
//! Classes are built with [`UriMappingBuilder`], a union-find with path
//! compression and union-by-rank, and then frozen into a
//! [`FrozenUriMapping`] that is read-only and `Send + Sync`.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use ldfusion_uri_mapping::{UriMapping, UriMappingBuilder};
//!
//! let mut builder = UriMappingBuilder::new();
//! builder.add_canonical_target("http://ex.org/berlin");
//! builder.add_link("http://dbpedia.org/resource/Berlin", "http://ex.org/berlin");
//! let mapping = builder.build();
//!
//! let iri: Arc<str> = Arc::from("http://dbpedia.org/resource/Berlin");
//! assert_eq!(&*mapping.canonicalize(&iri), "http://ex.org/berlin");
//! ```

mod builder;
mod canonical_file;
pub mod error;
mod links;
mod mapping;

pub use builder::UriMappingBuilder;
pub use canonical_file::{read_canonical_uris, write_canonical_uris};
pub use error::{MappingError, Result};
pub use links::{load_same_as_links, LOG_LOOP_SIZE};
pub use mapping::{FrozenUriMapping, UriMapping};
