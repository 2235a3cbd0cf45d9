//! Drift triad detection
//!
//! Flags transitive-similarity violations: A~B and B~C are both high
//! but A~C is not. Community detection would happily merge all three
//! into one group and mask the inconsistency; the triad scan exists to
//! catch exactly that before it happens. Triads are surfaced to a
//! reviewer or the adjudicator, never auto-resolved.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

use super::edge::{pair_key, SimilarityGraph};

/// One detected transitive-similarity violation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftTriad {
    /// The three items, sorted by id
    pub members: [Ulid; 3],
    /// The shared node of the two high edges
    pub pivot: Ulid,
    /// Higher-scoring of the two high edges - the recommended merge
    pub close_pair: (Ulid, Ulid),
    pub close_score: f64,
    /// The other high edge
    pub other_pair: (Ulid, Ulid),
    pub other_score: f64,
    /// The pair that failed the threshold - recommended to keep separate
    pub distant_pair: (Ulid, Ulid),
    /// Score of the distant pair; 0.0 when no edge survived at all
    pub distant_score: f64,
}

/// Scan the graph for high/high/low triples.
///
/// A triple {A, B, C} qualifies when two of its pairwise scores are at
/// or above `high_threshold` and the third is below it (or has no
/// surviving edge). Each set of three items is reported exactly once
/// regardless of pivot permutation, in sorted member order.
pub fn detect_triads(graph: &SimilarityGraph, high_threshold: f64) -> Vec<DriftTriad> {
    let mut seen: BTreeSet<[Ulid; 3]> = BTreeSet::new();
    let mut triads = Vec::new();

    for pivot in graph.nodes() {
        let high_neighbors: Vec<(Ulid, f64)> = graph
            .neighbors(pivot)
            .filter(|&(_, w)| w >= high_threshold)
            .collect();

        for (i, &(a, wa)) in high_neighbors.iter().enumerate() {
            for &(c, wc) in &high_neighbors[i + 1..] {
                let distant_score = graph.score(a, c).unwrap_or(0.0);
                if distant_score >= high_threshold {
                    continue;
                }

                let mut members = [a, pivot, c];
                members.sort();
                if !seen.insert(members) {
                    continue;
                }

                // Recommend merging the tighter of the two high pairs
                let (close_pair, close_score, other_pair, other_score) = if wa >= wc {
                    (pair_key(pivot, a), wa, pair_key(pivot, c), wc)
                } else {
                    (pair_key(pivot, c), wc, pair_key(pivot, a), wa)
                };

                triads.push(DriftTriad {
                    members,
                    pivot,
                    close_pair,
                    close_score,
                    other_pair,
                    other_score,
                    distant_pair: pair_key(a, c),
                    distant_score,
                });
            }
        }
    }

    triads
}
