//! Union-find builder for URI equivalence classes
//!
//! Links are added with union-by-rank and path compression. The members map
//! is not maintained during unions; [`UriMappingBuilder::build`] buckets all
//! elements by root once and picks each class representative.

use crate::mapping::FrozenUriMapping;
use hashbrown::{HashMap, HashSet};
use std::sync::Arc;

/// Mutable URI equivalence tracker, used while links are loaded
#[derive(Debug, Clone, Default)]
pub struct UriMappingBuilder {
    /// Union-find structure: maps IRI -> parent (self if root)
    parent: HashMap<Arc<str>, Arc<str>>,
    /// Rank for union-by-rank
    rank: HashMap<Arc<str>, u8>,
    /// IRIs preferred as class representatives
    explicit: HashSet<Arc<str>>,
}

impl UriMappingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an explicit canonicalization target.
    ///
    /// If its class contains several explicit targets, the lexicographically
    /// smallest one wins.
    pub fn add_canonical_target(&mut self, iri: impl Into<Arc<str>>) {
        self.explicit.insert(iri.into());
    }

    pub fn add_canonical_targets<I, S>(&mut self, iris: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        for iri in iris {
            self.add_canonical_target(iri);
        }
    }

    /// Record the equivalence `a ≡ b`.
    ///
    /// Returns `true` if `a` and `b` were in different classes.
    pub fn add_link(&mut self, a: impl Into<Arc<str>>, b: impl Into<Arc<str>>) -> bool {
        let a = a.into();
        let b = b.into();
        self.union(&a, &b)
    }

    fn ensure(&mut self, x: &Arc<str>) {
        if !self.parent.contains_key(x) {
            self.parent.insert(Arc::clone(x), Arc::clone(x));
            self.rank.insert(Arc::clone(x), 0);
        }
    }

    /// Find the root with iterative path compression
    pub fn find(&mut self, x: &Arc<str>) -> Arc<str> {
        self.ensure(x);

        let mut current = Arc::clone(x);
        while self.parent[&current] != current {
            current = Arc::clone(&self.parent[&current]);
        }
        let root = current;

        let mut current = Arc::clone(x);
        while self.parent[&current] != root {
            let next = Arc::clone(&self.parent[&current]);
            self.parent.insert(current, Arc::clone(&root));
            current = next;
        }

        root
    }

    fn union(&mut self, x: &Arc<str>, y: &Arc<str>) -> bool {
        let root_x = self.find(x);
        let root_y = self.find(y);

        if root_x == root_y {
            return false;
        }

        let rank_x = self.rank[&root_x];
        let rank_y = self.rank[&root_y];

        if rank_x < rank_y {
            self.parent.insert(root_x, root_y);
        } else if rank_x > rank_y {
            self.parent.insert(root_y, root_x);
        } else {
            self.parent.insert(root_y, Arc::clone(&root_x));
            self.rank.insert(root_x, rank_x + 1);
        }

        true
    }

    /// Number of IRIs seen in links
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Compress all paths, choose representatives and freeze.
    pub fn build(mut self) -> FrozenUriMapping {
        let elements: Vec<Arc<str>> = self.parent.keys().cloned().collect();

        let mut root_to_members: HashMap<Arc<str>, Vec<Arc<str>>> = HashMap::new();
        for elem in elements {
            let root = self.find(&elem);
            root_to_members.entry(root).or_default().push(elem);
        }

        let mut canonical: HashMap<Arc<str>, Arc<str>> = HashMap::with_capacity(self.parent.len());
        let mut members: HashMap<Arc<str>, Arc<[Arc<str>]>> =
            HashMap::with_capacity(root_to_members.len());

        for (_, mut class) in root_to_members {
            class.sort_unstable();
            // Sorted, so the first explicit member is the smallest one
            let representative = class
                .iter()
                .find(|m| self.explicit.contains(*m))
                .unwrap_or(&class[0])
                .clone();

            for member in &class {
                canonical.insert(Arc::clone(member), Arc::clone(&representative));
            }
            members.insert(representative, class.into());
        }

        FrozenUriMapping::from_parts(canonical, members, self.explicit)
    }
}
