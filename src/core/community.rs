//! Community detection
//!
//! Partitions a category's similarity graph into candidate duplicate
//! groups with Louvain modularity maximization. The implementation is
//! fully deterministic: nodes are visited in ascending id order and
//! modularity-gain ties break toward the smallest community index, so a
//! fixed graph always produces the same partition. Determinism is what
//! makes the convergence loop's termination test reproducible.
//!
//! Communities are a view: they are recomputed from the current graph
//! every round and never mutated in place. Isolated nodes are not
//! communities.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

use super::edge::SimilarityGraph;

const GAIN_EPS: f64 = 1e-9;

/// A cluster of mutually similar items (size >= 2)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Community {
    pub category: String,
    /// Member item ids, sorted
    pub members: Vec<Ulid>,
    /// Mean blended score over the community's internal edges
    pub avg_similarity: f64,
}

impl Community {
    /// Processing priority: tighter and larger clusters first.
    /// Exact ties are broken by the smallest member id at the call site.
    pub fn priority(&self) -> f64 {
        self.avg_similarity * (self.members.len() as f64).sqrt()
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }
}

/// Working graph for the aggregation levels: symmetric adjacency plus
/// per-node internal weight (doubled, so degrees stay consistent across
/// levels).
struct LevelGraph {
    weights: Vec<BTreeMap<usize, f64>>,
    self_loops: Vec<f64>,
}

impl LevelGraph {
    fn node_count(&self) -> usize {
        self.weights.len()
    }

    fn degree(&self, i: usize) -> f64 {
        self.self_loops[i] + self.weights[i].values().sum::<f64>()
    }

    fn total_weight(&self) -> f64 {
        (0..self.node_count()).map(|i| self.degree(i)).sum()
    }
}

/// Detect communities in one category graph.
///
/// Returns clusters of size >= 2 sorted by descending priority, ties
/// broken by smallest member id, so processing order is a total order.
pub fn detect_communities(graph: &SimilarityGraph) -> Vec<Community> {
    let nodes: Vec<Ulid> = graph.nodes().collect();
    if nodes.is_empty() {
        return Vec::new();
    }
    let index: BTreeMap<Ulid, usize> = nodes.iter().enumerate().map(|(i, &n)| (n, i)).collect();

    let mut level = LevelGraph {
        weights: vec![BTreeMap::new(); nodes.len()],
        self_loops: vec![0.0; nodes.len()],
    };
    for edge in graph.edges() {
        let (i, j) = (index[&edge.a], index[&edge.b]);
        level.weights[i].insert(j, edge.blended_score);
        level.weights[j].insert(i, edge.blended_score);
    }

    // node -> top-level community, refined level by level
    let mut assignment: Vec<usize> = (0..nodes.len()).collect();

    loop {
        let (partition, improved) = one_level(&level);
        if !improved {
            break;
        }

        let (renumbered, community_count) = renumber(&partition);
        for slot in assignment.iter_mut() {
            *slot = renumbered[*slot];
        }

        if community_count == level.node_count() {
            break;
        }
        level = aggregate(&level, &renumbered, community_count);
    }

    build_communities(graph, &nodes, &assignment)
}

/// One local-moving pass over all nodes until no move improves modularity
fn one_level(g: &LevelGraph) -> (Vec<usize>, bool) {
    let n = g.node_count();
    let m2 = g.total_weight();
    if m2 <= 0.0 {
        return ((0..n).collect(), false);
    }

    let degrees: Vec<f64> = (0..n).map(|i| g.degree(i)).collect();
    let mut comm: Vec<usize> = (0..n).collect();
    let mut sum_tot: Vec<f64> = degrees.clone();
    let mut improved = false;

    loop {
        let mut moved = false;

        for i in 0..n {
            let ci = comm[i];

            // Weight from i into each adjacent community
            let mut links: BTreeMap<usize, f64> = BTreeMap::new();
            for (&j, &w) in &g.weights[i] {
                *links.entry(comm[j]).or_insert(0.0) += w;
            }

            sum_tot[ci] -= degrees[i];

            let own_links = links.get(&ci).copied().unwrap_or(0.0);
            let mut best_comm = ci;
            let mut best_gain = own_links - sum_tot[ci] * degrees[i] / m2;

            for (&c, &w) in &links {
                if c == ci {
                    continue;
                }
                let gain = w - sum_tot[c] * degrees[i] / m2;
                // Strictly better, or an exact tie toward the smaller index
                if gain > best_gain + GAIN_EPS
                    || ((gain - best_gain).abs() <= GAIN_EPS && c < best_comm)
                {
                    best_gain = gain;
                    best_comm = c;
                }
            }

            sum_tot[best_comm] += degrees[i];
            if best_comm != ci {
                comm[i] = best_comm;
                moved = true;
                improved = true;
            }
        }

        if !moved {
            break;
        }
    }

    (comm, improved)
}

/// Renumber community labels densely, in order of first appearance
fn renumber(partition: &[usize]) -> (Vec<usize>, usize) {
    let mut mapping: BTreeMap<usize, usize> = BTreeMap::new();
    let mut next = 0usize;
    let mut out = Vec::with_capacity(partition.len());
    for &c in partition {
        let dense = *mapping.entry(c).or_insert_with(|| {
            let v = next;
            next += 1;
            v
        });
        out.push(dense);
    }
    (out, next)
}

/// Collapse each community into a super-node for the next level
fn aggregate(g: &LevelGraph, partition: &[usize], community_count: usize) -> LevelGraph {
    let mut next = LevelGraph {
        weights: vec![BTreeMap::new(); community_count],
        self_loops: vec![0.0; community_count],
    };

    for i in 0..g.node_count() {
        let ci = partition[i];
        next.self_loops[ci] += g.self_loops[i];
        for (&j, &w) in &g.weights[i] {
            let cj = partition[j];
            if ci == cj {
                // Each undirected internal edge is seen from both ends,
                // which doubles it exactly as the degree bookkeeping expects
                next.self_loops[ci] += w;
            } else {
                // Cross edges are seen once per direction, landing in
                // [ci][cj] and [cj][ci] respectively, so the adjacency
                // stays symmetric without further correction
                *next.weights[ci].entry(cj).or_insert(0.0) += w;
            }
        }
    }

    next
}

/// Materialize size >= 2 clusters with their average internal similarity
fn build_communities(
    graph: &SimilarityGraph,
    nodes: &[Ulid],
    assignment: &[usize],
) -> Vec<Community> {
    let mut groups: BTreeMap<usize, Vec<Ulid>> = BTreeMap::new();
    for (i, &c) in assignment.iter().enumerate() {
        groups.entry(c).or_default().push(nodes[i]);
    }

    let mut communities: Vec<Community> = Vec::new();
    for (_, mut members) in groups {
        if members.len() < 2 {
            continue;
        }
        members.sort();

        let mut total = 0.0;
        let mut count = 0usize;
        for (i, &a) in members.iter().enumerate() {
            for &b in &members[i + 1..] {
                if let Some(w) = graph.score(a, b) {
                    total += w;
                    count += 1;
                }
            }
        }
        if count == 0 {
            continue;
        }

        communities.push(Community {
            category: graph.category.clone(),
            members,
            avg_similarity: total / count as f64,
        });
    }

    communities.sort_by(|x, y| {
        y.priority()
            .partial_cmp(&x.priority())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| x.members[0].cmp(&y.members[0]))
    });
    communities
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::edge::Edge;

    fn uid(n: u128) -> Ulid {
        Ulid::from(n)
    }

    fn graph_with(edges: &[(u128, u128, f64)]) -> SimilarityGraph {
        let mut g = SimilarityGraph::new("skills");
        for &(a, b, w) in edges {
            g.insert_edge(Edge::new(uid(a), uid(b), w, None, 0.7, 0.3));
        }
        g
    }

    #[test]
    fn test_two_clear_clusters() {
        let g = graph_with(&[
            (1, 2, 0.95),
            (2, 3, 0.94),
            (1, 3, 0.93),
            (10, 11, 0.96),
        ]);

        let communities = detect_communities(&g);
        assert_eq!(communities.len(), 2);

        let sizes: Vec<usize> = communities.iter().map(|c| c.size()).collect();
        assert!(sizes.contains(&3));
        assert!(sizes.contains(&2));

        let triple = communities.iter().find(|c| c.size() == 3).unwrap();
        assert_eq!(triple.members, vec![uid(1), uid(2), uid(3)]);
        assert!((triple.avg_similarity - 0.94).abs() < 1e-9);
    }

    #[test]
    fn test_empty_graph() {
        let g = SimilarityGraph::new("skills");
        assert!(detect_communities(&g).is_empty());
    }

    #[test]
    fn test_deterministic_for_fixed_graph() {
        let edges = [
            (1, 2, 0.90),
            (2, 3, 0.88),
            (3, 4, 0.91),
            (4, 5, 0.87),
            (5, 1, 0.89),
            (6, 7, 0.95),
            (7, 8, 0.93),
        ];
        let first = detect_communities(&graph_with(&edges));
        for _ in 0..5 {
            let again = detect_communities(&graph_with(&edges));
            assert_eq!(first.len(), again.len());
            for (x, y) in first.iter().zip(again.iter()) {
                assert_eq!(x.members, y.members);
                assert!((x.avg_similarity - y.avg_similarity).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_priority_orders_tighter_larger_first() {
        let g = graph_with(&[
            // loose pair
            (1, 2, 0.75),
            // tight triple
            (10, 11, 0.97),
            (11, 12, 0.96),
            (10, 12, 0.95),
        ]);

        let communities = detect_communities(&g);
        assert_eq!(communities.len(), 2);
        assert_eq!(communities[0].size(), 3);
        assert!(communities[0].priority() > communities[1].priority());
    }

    #[test]
    fn test_weakly_bridged_clusters_split() {
        // Two tight squares joined by one weak edge
        let g = graph_with(&[
            (1, 2, 0.95),
            (2, 3, 0.95),
            (3, 4, 0.95),
            (4, 1, 0.95),
            (1, 3, 0.95),
            (2, 4, 0.95),
            (5, 6, 0.95),
            (6, 7, 0.95),
            (7, 8, 0.95),
            (8, 5, 0.95),
            (5, 7, 0.95),
            (6, 8, 0.95),
            (4, 5, 0.73),
        ]);

        let communities = detect_communities(&g);
        assert_eq!(communities.len(), 2);
        assert_eq!(communities[0].size(), 4);
        assert_eq!(communities[1].size(), 4);
    }
}
