//! Read-only URI mapping
//!
//! The frozen mapping is shared by every consumer of a fusion run; nothing
//! mutates it once [`UriMappingBuilder::build`](crate::UriMappingBuilder::build)
//! has returned.

use hashbrown::{HashMap, HashSet};
use std::sync::Arc;

/// Canonicalization capability used while quads are sorted
pub trait UriMapping: Send + Sync {
    /// Class representative for `iri`, or `iri` itself when it has no class
    fn canonicalize(&self, iri: &Arc<str>) -> Arc<str>;

    /// True if `iri` was registered as an explicit canonicalization target
    fn is_explicit_target(&self, iri: &str) -> bool;
}

/// Frozen equivalence state
///
/// - O(1) representative lookup
/// - O(1) class enumeration
#[derive(Debug, Clone, Default)]
pub struct FrozenUriMapping {
    /// IRI -> class representative
    canonical: HashMap<Arc<str>, Arc<str>>,
    /// Representative -> sorted class members
    members: HashMap<Arc<str>, Arc<[Arc<str>]>>,
    explicit: HashSet<Arc<str>>,
}

static EMPTY_MEMBERS: &[Arc<str>] = &[];

impl FrozenUriMapping {
    /// Mapping with no classes and no explicit targets
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(
        canonical: HashMap<Arc<str>, Arc<str>>,
        members: HashMap<Arc<str>, Arc<[Arc<str>]>>,
        explicit: HashSet<Arc<str>>,
    ) -> Self {
        Self {
            canonical,
            members,
            explicit,
        }
    }

    /// Representative of `iri`'s class, `None` if `iri` appeared in no link
    pub fn canonical_uri(&self, iri: &str) -> Option<&Arc<str>> {
        self.canonical.get(iri)
    }

    /// All members of `iri`'s class (including the representative), sorted.
    ///
    /// Empty if `iri` is in no class; callers treat it as a singleton.
    pub fn members(&self, iri: &str) -> &[Arc<str>] {
        self.canonical
            .get(iri)
            .and_then(|root| self.members.get(root))
            .map(|m| m.as_ref())
            .unwrap_or(EMPTY_MEMBERS)
    }

    pub fn num_classes(&self) -> usize {
        self.members.len()
    }

    /// Number of IRIs that belong to some class
    pub fn num_elements(&self) -> usize {
        self.canonical.len()
    }

    pub fn num_explicit_targets(&self) -> usize {
        self.explicit.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Iterate over `(representative, members)` pairs in arbitrary order
    pub fn classes(&self) -> impl Iterator<Item = (&Arc<str>, &[Arc<str>])> {
        self.members.iter().map(|(root, m)| (root, m.as_ref()))
    }
}

impl UriMapping for FrozenUriMapping {
    fn canonicalize(&self, iri: &Arc<str>) -> Arc<str> {
        match self.canonical.get(&**iri) {
            Some(root) => Arc::clone(root),
            None => Arc::clone(iri),
        }
    }

    fn is_explicit_target(&self, iri: &str) -> bool {
        self.explicit.contains(iri)
    }
}
