//! Error taxonomy for the curation engine
//!
//! Fatal configuration problems, provider outages, and internal invariant
//! breaches are kept as distinct variants so callers can decide between
//! "fail the round" and "discard and log".

use thiserror::Error;
use ulid::Ulid;

/// Errors raised by the curation core
#[derive(Debug, Error)]
pub enum CurationError {
    /// Malformed or inconsistent configuration; fatal at startup,
    /// never silently clamped
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Vector/rerank/LLM provider unreachable; the affected round or
    /// pair fails rather than proceeding with partial data
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// An edge spanning categories - internal invariant breach.
    /// Logged and discarded, never surfaced as a valid duplicate.
    #[error("cross-category edge: {a} ({a_category}) <-> {b} ({b_category})")]
    CrossCategory {
        a: Ulid,
        a_category: String,
        b: Ulid,
        b_category: String,
    },

    /// Adjudicator returned an unparseable or out-of-range action
    #[error("ambiguous adjudicator decision: {0}")]
    AmbiguousDecision(String),

    /// Item targeted by two decisions in the same round; the second is
    /// deferred to the next round
    #[error("conflicting decisions for item {0} within one round")]
    MutationConflict(Ulid),

    /// A decision that requires a rationale was built without one
    #[error("rationale is required for {actor} decisions")]
    MissingRationale { actor: String },
}
