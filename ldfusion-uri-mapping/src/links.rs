//! Loading equivalence links from a quad stream

use std::time::Instant;

use hashbrown::HashSet;
use ldfusion_graph_ir::{Quad, Term};
use std::sync::Arc;

use crate::UriMappingBuilder;

/// Progress is logged every this many links or quads.
pub const LOG_LOOP_SIZE: u64 = 100_000;

/// Add every link statement of `quads` to `builder`.
///
/// A statement is a link when its predicate is one of `link_types` and both
/// subject and object are IRIs; anything else is ignored. Returns the number
/// of links loaded. The first error from the stream aborts loading.
pub fn load_same_as_links<I, E>(
    builder: &mut UriMappingBuilder,
    label: &str,
    quads: I,
    link_types: &HashSet<Arc<str>>,
) -> Result<u64, E>
where
    I: IntoIterator<Item = Result<Quad, E>>,
{
    tracing::info!(source = label, "parsing sameAs links");
    let start = Instant::now();
    let mut loaded = 0u64;

    for quad in quads {
        let quad = quad?;
        let is_link_type = quad
            .p
            .as_iri()
            .is_some_and(|p| link_types.contains(p));
        if !is_link_type {
            continue;
        }
        if let (Term::Iri(s), Term::Iri(o)) = (&quad.s, &quad.o) {
            builder.add_link(Arc::clone(s), Arc::clone(o));
            loaded += 1;

            if loaded % LOG_LOOP_SIZE == 0 {
                tracing::info!(source = label, loaded, "... loaded sameAs links");
            }
        }
    }

    tracing::debug!(
        source = label,
        loaded,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "loaded and resolved sameAs links"
    );
    Ok(loaded)
}
