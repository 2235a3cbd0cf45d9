//! Edge and similarity graph
//!
//! A sparse undirected weighted graph over the items of a single
//! category. Edges below the keep-threshold never enter the graph, so
//! sparsity holds by construction. Adjacency uses `BTreeMap` throughout:
//! every downstream consumer (triad scan, community detection) iterates
//! in sorted-id order, which is what makes the whole pipeline
//! deterministic without any seeding.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Canonical unordered pair key: always (min, max)
pub fn pair_key(a: Ulid, b: Ulid) -> (Ulid, Ulid) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// A scored relationship between two items in the same category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub a: Ulid,
    pub b: Ulid,
    pub embed_score: f64,
    /// Absent when no rerank provider is configured
    pub rerank_score: Option<f64>,
    /// Weighted blend of embed and rerank; equals embed_score when
    /// rerank is absent
    pub blended_score: f64,
}

impl Edge {
    /// Build an edge with the configured blend weights
    pub fn new(
        a: Ulid,
        b: Ulid,
        embed_score: f64,
        rerank_score: Option<f64>,
        embed_weight: f64,
        rerank_weight: f64,
    ) -> Self {
        let (a, b) = pair_key(a, b);
        let blended_score = match rerank_score {
            Some(r) => embed_weight * embed_score + rerank_weight * r,
            None => embed_score,
        };
        Self {
            a,
            b,
            embed_score,
            rerank_score,
            blended_score,
        }
    }
}

/// Sparse undirected weighted graph for one category
#[derive(Debug, Clone, Default)]
pub struct SimilarityGraph {
    pub category: String,
    edges: BTreeMap<(Ulid, Ulid), Edge>,
    adjacency: BTreeMap<Ulid, BTreeMap<Ulid, f64>>,
}

impl SimilarityGraph {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            edges: BTreeMap::new(),
            adjacency: BTreeMap::new(),
        }
    }

    /// Insert an edge, keeping the higher-scoring one if the unordered
    /// pair was already present (neighbor queries return both directions)
    pub fn insert_edge(&mut self, edge: Edge) {
        debug_assert_ne!(edge.a, edge.b, "self-edges are never stored");
        let key = pair_key(edge.a, edge.b);

        let replace = match self.edges.get(&key) {
            Some(existing) => edge.blended_score > existing.blended_score,
            None => true,
        };
        if !replace {
            return;
        }

        self.adjacency
            .entry(key.0)
            .or_default()
            .insert(key.1, edge.blended_score);
        self.adjacency
            .entry(key.1)
            .or_default()
            .insert(key.0, edge.blended_score);
        self.edges.insert(key, edge);
    }

    /// Blended score between two items, if an edge survived the keep-threshold
    pub fn score(&self, a: Ulid, b: Ulid) -> Option<f64> {
        self.edges.get(&pair_key(a, b)).map(|e| e.blended_score)
    }

    /// Neighbors of one item with blended scores, sorted by id
    pub fn neighbors(&self, id: Ulid) -> impl Iterator<Item = (Ulid, f64)> + '_ {
        self.adjacency
            .get(&id)
            .into_iter()
            .flat_map(|m| m.iter().map(|(&n, &w)| (n, w)))
    }

    /// All nodes that have at least one surviving edge, sorted by id
    pub fn nodes(&self) -> impl Iterator<Item = Ulid> + '_ {
        self.adjacency.keys().copied()
    }

    /// All edges in canonical pair order
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.values()
    }

    /// Edges at or above a threshold, highest score first, ties broken
    /// by pair id so the ordering is total
    pub fn edges_at_or_above(&self, threshold: f64) -> Vec<&Edge> {
        let mut out: Vec<&Edge> = self
            .edges
            .values()
            .filter(|e| e.blended_score >= threshold)
            .collect();
        out.sort_by(|x, y| {
            y.blended_score
                .partial_cmp(&x.blended_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| (x.a, x.b).cmp(&(y.a, y.b)))
        });
        out
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}
