//! Identifier canonicalization applied to quads as they are loaded.

use ldfusion_graph_ir::{Quad, Term};
use ldfusion_uri_mapping::UriMapping;
use std::sync::Arc;

/// Rewrites the IRIs of a quad to their canonical representatives.
///
/// Subjects, predicates and objects are mapped by default; each position
/// can be switched off. Blank nodes and literals pass through untouched,
/// and the graph position is never mapped.
#[derive(Clone)]
pub struct QuadMapper {
    mapping: Arc<dyn UriMapping>,
    subjects: bool,
    predicates: bool,
    objects: bool,
}

impl QuadMapper {
    pub fn new(mapping: Arc<dyn UriMapping>) -> Self {
        Self {
            mapping,
            subjects: true,
            predicates: true,
            objects: true,
        }
    }

    #[must_use]
    pub fn with_subjects(mut self, enabled: bool) -> Self {
        self.subjects = enabled;
        self
    }

    #[must_use]
    pub fn with_predicates(mut self, enabled: bool) -> Self {
        self.predicates = enabled;
        self
    }

    #[must_use]
    pub fn with_objects(mut self, enabled: bool) -> Self {
        self.objects = enabled;
        self
    }

    pub fn mapping(&self) -> &Arc<dyn UriMapping> {
        &self.mapping
    }

    pub fn map(&self, quad: Quad) -> Quad {
        let Quad { s, p, o, g } = quad;
        Quad {
            s: self.map_term(s, self.subjects),
            p: self.map_term(p, self.predicates),
            o: self.map_term(o, self.objects),
            g,
        }
    }

    #[inline]
    fn map_term(&self, term: Term, enabled: bool) -> Term {
        match term {
            Term::Iri(iri) if enabled => Term::Iri(self.mapping.canonicalize(&iri)),
            other => other,
        }
    }
}

impl std::fmt::Debug for QuadMapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuadMapper")
            .field("subjects", &self.subjects)
            .field("predicates", &self.predicates)
            .field("objects", &self.objects)
            .finish_non_exhaustive()
    }
}
