//! Collaborator contracts
//!
//! The engine does not own embeddings, reranking, or the LLM: it
//! consumes them through these traits. The traits are synchronous on
//! purpose - the engine is a single-threaded sequential process and
//! duplicate decisions must not race each other (see the concurrency
//! notes in the top-level docs).

use serde::Deserialize;
use ulid::Ulid;

use super::error::CurationError;
use super::item::Item;

/// One neighbor returned by the vector provider
#[derive(Debug, Clone)]
pub struct Neighbor {
    pub id: Ulid,
    pub embed_score: f64,
    pub category: String,
}

/// Top-k nearest neighbor queries against the vector index.
///
/// Implementations must only return items from the same category as the
/// query item; the graph builder still verifies this and discards
/// violations as an invariant breach.
pub trait VectorProvider {
    fn neighbors(&self, item: &Item, k: usize) -> Result<Vec<Neighbor>, CurationError>;
}

/// Optional reranker. When absent, blended scores degrade to embed-only.
pub trait RerankProvider {
    fn rerank(&self, item: &Item, candidates: &[Ulid]) -> Result<Vec<(Ulid, f64)>, CurationError>;
}

/// Closed set of adjudicator outcomes. Anything an implementation cannot
/// map onto these is converted to `ManualReview`, never pattern-matched
/// loosely and never defaulted to merge or keep.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Collapse all presented items into one canonical
    Merge,
    /// Merge only the named subset; the remainder returns to the pool
    MergeSubset(Vec<Ulid>),
    /// The items are genuinely distinct
    KeepSeparate,
    /// Break the group into sub-groups for separate consideration
    Split(Vec<Vec<Ulid>>),
    /// Could not or should not decide automatically
    ManualReview { reason: String },
}

/// A parsed adjudicator response
#[derive(Debug, Clone)]
pub struct Adjudication {
    pub verdict: Verdict,
    pub rationale: String,
    /// Self-reported confidence, when the model provides one
    pub confidence: Option<f64>,
}

impl Adjudication {
    pub fn manual(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            rationale: reason.clone(),
            verdict: Verdict::ManualReview { reason },
            confidence: None,
        }
    }
}

/// LLM adjudicator for candidate duplicate groups.
///
/// Timeouts and transport errors surface as `ProviderUnavailable`; the
/// caller treats both errors and `ManualReview` verdicts as "defer to a
/// human", never as an implicit keep-separate.
pub trait Adjudicator {
    fn decide(&self, items: &[Item]) -> Result<Adjudication, CurationError>;
}

#[derive(Debug, Deserialize)]
struct RawAdjudication {
    action: String,
    #[serde(default)]
    subset: Vec<Ulid>,
    #[serde(default)]
    groups: Vec<Vec<Ulid>>,
    #[serde(default)]
    rationale: String,
    #[serde(default)]
    confidence: Option<f64>,
}

/// Parse a raw JSON adjudicator payload into the closed verdict set.
///
/// Unknown actions, unparseable payloads, missing rationales, and
/// structurally invalid subsets all land in `ManualReview` - the engine
/// never guesses on behalf of the model.
pub fn parse_adjudication(raw: &str) -> Adjudication {
    let parsed: RawAdjudication = match serde_json::from_str(raw) {
        Ok(p) => p,
        Err(e) => return Adjudication::manual(format!("unparseable adjudicator payload: {}", e)),
    };

    if parsed.rationale.trim().is_empty() {
        return Adjudication::manual("adjudicator returned no rationale");
    }

    let verdict = match parsed.action.to_uppercase().as_str() {
        "MERGE" => Verdict::Merge,
        "MERGE_SUBSET" => {
            if parsed.subset.len() < 2 {
                return Adjudication::manual(format!(
                    "merge_subset with {} member(s)",
                    parsed.subset.len()
                ));
            }
            Verdict::MergeSubset(parsed.subset)
        }
        "KEEP_SEPARATE" => Verdict::KeepSeparate,
        "SPLIT" => {
            if parsed.groups.len() < 2 {
                return Adjudication::manual("split without at least two groups");
            }
            Verdict::Split(parsed.groups)
        }
        "MANUAL_REVIEW" => Verdict::ManualReview {
            reason: parsed.rationale.clone(),
        },
        other => {
            return Adjudication::manual(format!("unknown adjudicator action '{}'", other));
        }
    };

    Adjudication {
        verdict,
        rationale: parsed.rationale,
        confidence: parsed.confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_merge() {
        let adj = parse_adjudication(r#"{"action":"MERGE","rationale":"same content","confidence":0.94}"#);
        assert_eq!(adj.verdict, Verdict::Merge);
        assert_eq!(adj.rationale, "same content");
        assert_eq!(adj.confidence, Some(0.94));
    }

    #[test]
    fn test_parse_merge_subset() {
        let a = Ulid::from(1u128);
        let b = Ulid::from(2u128);
        let raw = format!(
            r#"{{"action":"merge_subset","subset":["{}","{}"],"rationale":"two of three match"}}"#,
            a, b
        );
        let adj = parse_adjudication(&raw);
        assert_eq!(adj.verdict, Verdict::MergeSubset(vec![a, b]));
    }

    #[test]
    fn test_unknown_action_goes_to_manual() {
        let adj = parse_adjudication(r#"{"action":"DELETE_ALL","rationale":"hm"}"#);
        assert!(matches!(adj.verdict, Verdict::ManualReview { .. }));
    }

    #[test]
    fn test_garbage_payload_goes_to_manual() {
        let adj = parse_adjudication("definitely merge these");
        assert!(matches!(adj.verdict, Verdict::ManualReview { .. }));
    }

    #[test]
    fn test_missing_rationale_goes_to_manual() {
        let adj = parse_adjudication(r#"{"action":"MERGE"}"#);
        assert!(matches!(adj.verdict, Verdict::ManualReview { .. }));
    }

    #[test]
    fn test_undersized_subset_goes_to_manual() {
        let a = Ulid::from(1u128);
        let raw = format!(
            r#"{{"action":"MERGE_SUBSET","subset":["{}"],"rationale":"only one"}}"#,
            a
        );
        let adj = parse_adjudication(&raw);
        assert!(matches!(adj.verdict, Verdict::ManualReview { .. }));
    }
}
