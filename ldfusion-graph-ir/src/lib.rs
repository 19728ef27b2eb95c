//! RDF quad intermediate representation for the fusion pipeline
//!
//! This crate provides the record types every other crate exchanges: terms,
//! datatypes, and quads together with their SPOG total order.
//!
//! # Key Design Principles
//!
//! 1. **Expanded IRIs only** - IRIs are stored in expanded form.
//!
//! 2. **Explicit datatypes** - Literals always have an explicit datatype. Plain
//!    strings use `xsd:string`, language-tagged strings use `rdf:langString`.
//!
//! 3. **Bag semantics** - Exact duplicate quads are kept as distinct entries.
//!
//! 4. **Deterministic order** - `Quad` implements `Ord` as subject, predicate,
//!    object, graph. The order is the same on every run and its prefixes
//!    (subject, subject + predicate) drive block and cluster grouping.
//!
//! # Example
//!
//! ```
//! use ldfusion_graph_ir::{ConflictClusters, Quad, Term};
//!
//! let mut quads = vec![
//!     Quad::triple(Term::iri("http://ex.org/a"), Term::iri("http://ex.org/q"), Term::string("2")),
//!     Quad::triple(Term::iri("http://ex.org/a"), Term::iri("http://ex.org/p"), Term::string("1")),
//! ];
//! quads.sort();
//!
//! let predicates: Vec<_> = ConflictClusters::new(&quads).map(|(p, _)| p.clone()).collect();
//! assert_eq!(predicates[0], Term::iri("http://ex.org/p"));
//! ```

pub mod datatype;
mod quad;
mod term;
pub mod vocab;

pub use datatype::Datatype;
pub use quad::{ConflictClusters, Quad};
pub use term::{BlankId, LiteralValue, Term};
