//! Expansion of a population into its transitive sub-populations.
//!
//! The hierarchy is intended to be acyclic but the data does not enforce
//! that, so both walkers keep a visited set and never re-descend into an id
//! they have seen.  Cycles (including self-edges) are thereby bounded
//! silently rather than surfaced as errors.

use std::collections::{BTreeSet, HashMap};

use crate::common::PopulationId;
use crate::db::{PopulationEdge, PopulationStore};

/// Expand `root` into the set of itself plus all transitively reachable
/// sub-population ids, fetching edges per node from `store`.
pub fn expand(
    root: PopulationId,
    store: &impl PopulationStore,
) -> Result<BTreeSet<PopulationId>, anyhow::Error> {
    let mut seen = BTreeSet::new();
    let mut stack = vec![root];

    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        for edge in store.fetch_population_edges(id)? {
            if seen.contains(&edge.sub_population_id) {
                tracing::trace!(
                    "population {} already visited below {}; cycle or diamond",
                    edge.sub_population_id,
                    root
                );
            } else {
                stack.push(edge.sub_population_id);
            }
        }
    }

    Ok(seen)
}

/// Expand `root` over a pre-fetched full edge list.
///
/// Same semantics as [`expand`] for callers that load the whole
/// `population_structure` relation up front.
pub fn expand_from_edges(root: PopulationId, edges: &[PopulationEdge]) -> BTreeSet<PopulationId> {
    let mut children: HashMap<PopulationId, Vec<PopulationId>> = HashMap::new();
    for edge in edges {
        children
            .entry(edge.super_population_id)
            .or_default()
            .push(edge.sub_population_id);
    }

    let mut seen = BTreeSet::new();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        if let Some(subs) = children.get(&id) {
            stack.extend(subs.iter().filter(|sub| !seen.contains(sub)));
        }
    }

    seen
}

#[cfg(test)]
mod test {
    use std::collections::BTreeSet;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::db::{mem::MemStore, PopulationEdge};

    fn edges(pairs: &[(u64, u64)]) -> Vec<PopulationEdge> {
        pairs
            .iter()
            .map(|&(sup, sub)| PopulationEdge::new(sup, sub))
            .collect()
    }

    #[rstest]
    // Plain chain.
    #[case(&[(1, 2), (2, 3)], 1, &[1, 2, 3])]
    // Full cycle terminates and yields every member once.
    #[case(&[(1, 2), (2, 3), (3, 1)], 1, &[1, 2, 3])]
    // Self-edge is a one-node cycle.
    #[case(&[(1, 1), (1, 2)], 1, &[1, 2])]
    // Diamond counts the shared leaf once.
    #[case(&[(1, 2), (1, 3), (2, 4), (3, 4)], 1, &[1, 2, 3, 4])]
    // Leaf node expands to itself.
    #[case(&[(1, 2)], 2, &[2])]
    // Unrelated branch stays out of scope.
    #[case(&[(1, 2), (5, 6)], 1, &[1, 2])]
    fn expand(
        #[case] edge_pairs: &[(u64, u64)],
        #[case] root: u64,
        #[case] expected: &[u64],
    ) -> Result<(), anyhow::Error> {
        let expected: BTreeSet<u64> = expected.iter().copied().collect();
        let store = MemStore {
            population_edges: edges(edge_pairs),
            ..Default::default()
        };

        assert_eq!(super::expand(root, &store)?, expected);
        assert_eq!(
            super::expand_from_edges(root, &store.population_edges),
            expected
        );

        Ok(())
    }
}
