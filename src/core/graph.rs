//! Similarity graph builder
//!
//! Builds the per-category sparse neighbor graph from the vector
//! provider, blending in rerank scores when a reranker is configured.
//! Raw neighbor results are cached in an explicit cache object owned by
//! the builder; the cache must be invalidated whenever the underlying
//! embeddings change.
//!
//! A provider outage fails the whole build: an empty graph is
//! indistinguishable from "no duplicates", which would be a silent and
//! dangerous failure for an overnight run.

use std::collections::HashMap;

use tracing::warn;
use ulid::Ulid;

use crate::config::Config;

use super::edge::{Edge, SimilarityGraph};
use super::error::CurationError;
use super::item::Item;
use super::providers::{Neighbor, RerankProvider, VectorProvider};

/// Raw neighbor results keyed by item id, reusable across rounds.
/// Merges do not change embeddings, so entries stay valid until the
/// surrounding system re-embeds and calls `invalidate_all`.
#[derive(Debug, Default)]
pub struct NeighborCache {
    entries: HashMap<Ulid, Vec<Neighbor>>,
}

impl NeighborCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: Ulid) -> Option<&[Neighbor]> {
        self.entries.get(&id).map(|v| v.as_slice())
    }

    pub fn put(&mut self, id: Ulid, neighbors: Vec<Neighbor>) {
        self.entries.insert(id, neighbors);
    }

    /// Drop one item's cached neighbors (its embedding changed)
    pub fn invalidate(&mut self, id: Ulid) {
        self.entries.remove(&id);
    }

    /// Drop everything (the index was rebuilt)
    pub fn invalidate_all(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builds per-category similarity graphs
pub struct GraphBuilder<'a> {
    provider: &'a dyn VectorProvider,
    rerank: Option<&'a dyn RerankProvider>,
    config: &'a Config,
    cache: NeighborCache,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(
        provider: &'a dyn VectorProvider,
        rerank: Option<&'a dyn RerankProvider>,
        config: &'a Config,
    ) -> Self {
        Self {
            provider,
            rerank,
            config,
            cache: NeighborCache::new(),
        }
    }

    /// Invalidate cached neighbor results (embeddings changed)
    pub fn invalidate_cache(&mut self) {
        self.cache.invalidate_all();
    }

    /// Build the similarity graph for one category.
    ///
    /// `items` must be the active (pending/synced) items of that
    /// category; rejected items never re-enter the graph. Edges whose
    /// blended score falls below `edge_keep` are discarded before
    /// storage. Cross-category neighbors are logged and dropped.
    pub fn build(
        &mut self,
        category: &str,
        items: &[Item],
    ) -> Result<SimilarityGraph, CurationError> {
        let mut graph = SimilarityGraph::new(category);
        let k = self.config.graph.top_k_neighbors;

        // Active items only; neighbors pointing at merged-away ids are dropped
        let active: HashMap<Ulid, &Item> = items
            .iter()
            .filter(|i| i.is_active() && i.category == category)
            .map(|i| (i.id, i))
            .collect();

        for item in items.iter().filter(|i| active.contains_key(&i.id)) {
            let neighbors = match self.cache.get(item.id) {
                Some(cached) => cached.to_vec(),
                None => {
                    let fetched = self.provider.neighbors(item, k)?;
                    self.cache.put(item.id, fetched.clone());
                    fetched
                }
            };

            let mut candidates: Vec<&Neighbor> = Vec::new();
            for n in &neighbors {
                if n.id == item.id {
                    continue;
                }
                if n.category != item.category {
                    // Invariant breach inside the provider; never surfaced
                    // to the user as a valid duplicate
                    let violation = CurationError::CrossCategory {
                        a: item.id,
                        a_category: item.category.clone(),
                        b: n.id,
                        b_category: n.category.clone(),
                    };
                    warn!(error = %violation, "discarding cross-category edge");
                    continue;
                }
                if !active.contains_key(&n.id) {
                    continue;
                }
                candidates.push(n);
            }

            let rerank_scores = self.rerank_scores(item, &candidates)?;

            for n in candidates {
                let edge = Edge::new(
                    item.id,
                    n.id,
                    n.embed_score,
                    rerank_scores.get(&n.id).copied(),
                    self.config.graph.embed_weight,
                    self.config.graph.rerank_weight,
                );
                if edge.blended_score >= self.config.thresholds.edge_keep {
                    graph.insert_edge(edge);
                }
            }
        }

        Ok(graph)
    }

    fn rerank_scores(
        &self,
        item: &Item,
        candidates: &[&Neighbor],
    ) -> Result<HashMap<Ulid, f64>, CurationError> {
        let Some(reranker) = self.rerank else {
            return Ok(HashMap::new());
        };
        if candidates.is_empty() {
            return Ok(HashMap::new());
        }
        let ids: Vec<Ulid> = candidates.iter().map(|n| n.id).collect();
        let scored = reranker.rerank(item, &ids)?;
        Ok(scored.into_iter().collect())
    }
}
