//! Default conflict resolution.

use hashbrown::HashSet;
use ldfusion_graph_ir::{ConflictClusters, Quad, Term};
use ldfusion_input_loader::ResolvedStatement;

/// Turns one resource block into the statements to output.
pub trait ConflictResolver {
    fn resolve(&self, block: &[Quad]) -> Vec<ResolvedStatement>;
}

/// Keeps every distinct value of every conflict cluster.
///
/// The quality of a value is the share of the cluster's graphs that assert
/// it; the default graph counts as one graph.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllValuesResolver;

impl ConflictResolver for AllValuesResolver {
    fn resolve(&self, block: &[Quad]) -> Vec<ResolvedStatement> {
        let mut resolved = Vec::new();
        for (_, cluster) in ConflictClusters::new(block) {
            let cluster_graphs: HashSet<Option<&Term>> =
                cluster.iter().map(|q| q.g.as_ref()).collect();
            let total = cluster_graphs.len() as f64;

            // Quads of a cluster are sorted by object, then graph
            let mut start = 0;
            while start < cluster.len() {
                let object = &cluster[start].o;
                let end = start
                    + cluster[start..]
                        .iter()
                        .take_while(|q| &q.o == object)
                        .count();
                let values = &cluster[start..end];

                let mut asserting: Vec<Option<&Term>> =
                    values.iter().map(|q| q.g.as_ref()).collect();
                asserting.dedup();
                let source_graphs: Vec<Term> = asserting
                    .iter()
                    .flatten()
                    .map(|g| (*g).clone())
                    .collect();

                let first = &values[0];
                resolved.push(ResolvedStatement::new(
                    Quad::triple(first.s.clone(), first.p.clone(), first.o.clone()),
                    asserting.len() as f64 / total,
                    source_graphs,
                ));
                start = end;
            }
        }
        resolved
    }
}
