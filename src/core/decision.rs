//! Decision records - the append-only audit trail
//!
//! Every mutating decision produces exactly one record, written before
//! (or atomically with) the mutation it describes. Records are
//! immutable once stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use super::error::CurationError;

/// What was decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionAction {
    /// Collapse the subject into one canonical item
    Merge,
    /// Merge a subset; the remainder returned to the pool
    MergeSubset,
    /// Genuinely distinct, no mutation
    KeepSeparate,
    /// Explicit rejection without a merge target
    Reject,
    /// Community broken into sub-groups
    Split,
    /// Canonical content edited post-merge
    Update,
}

impl std::fmt::Display for DecisionAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DecisionAction::Merge => "merge",
            DecisionAction::MergeSubset => "merge_subset",
            DecisionAction::KeepSeparate => "keep_separate",
            DecisionAction::Reject => "reject",
            DecisionAction::Split => "split",
            DecisionAction::Update => "update",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for DecisionAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "merge" => Ok(DecisionAction::Merge),
            "merge_subset" => Ok(DecisionAction::MergeSubset),
            "keep_separate" => Ok(DecisionAction::KeepSeparate),
            "reject" => Ok(DecisionAction::Reject),
            "split" => Ok(DecisionAction::Split),
            "update" => Ok(DecisionAction::Update),
            _ => anyhow::bail!("Unknown decision action: {}", s),
        }
    }
}

/// Who decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionActor {
    Human,
    Llm,
    AutoThreshold,
}

impl std::fmt::Display for DecisionActor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DecisionActor::Human => "human",
            DecisionActor::Llm => "llm",
            DecisionActor::AutoThreshold => "auto_threshold",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for DecisionActor {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(DecisionActor::Human),
            "llm" => Ok(DecisionActor::Llm),
            "auto_threshold" => Ok(DecisionActor::AutoThreshold),
            _ => anyhow::bail!("Unknown decision actor: {}", s),
        }
    }
}

/// One append-only audit entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub id: Ulid,
    /// Interactive session or overnight run this belongs to
    pub session_id: String,
    /// Round number for automated runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round: Option<u32>,
    /// Item ids the decision covers (pair or community members)
    pub subject: Vec<Ulid>,
    pub action: DecisionAction,
    pub actor: DecisionActor,
    /// Free text; required for human and LLM actors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DecisionRecord {
    /// Build a record, enforcing that human and LLM decisions carry a
    /// rationale
    pub fn new(
        session_id: impl Into<String>,
        round: Option<u32>,
        subject: Vec<Ulid>,
        action: DecisionAction,
        actor: DecisionActor,
        rationale: Option<String>,
    ) -> Result<Self, CurationError> {
        let needs_rationale = matches!(actor, DecisionActor::Human | DecisionActor::Llm);
        let rationale = rationale.filter(|r| !r.trim().is_empty());
        if needs_rationale && rationale.is_none() {
            return Err(CurationError::MissingRationale {
                actor: actor.to_string(),
            });
        }

        let mut subject = subject;
        subject.sort();

        Ok(Self {
            id: Ulid::new(),
            session_id: session_id.into(),
            round,
            subject,
            action,
            actor,
            rationale,
            created_at: Utc::now(),
        })
    }

    /// Auto-threshold records never need a rationale
    pub fn auto(
        session_id: impl Into<String>,
        round: Option<u32>,
        subject: Vec<Ulid>,
        action: DecisionAction,
    ) -> Self {
        // Constructor cannot fail for the auto actor
        Self::new(
            session_id,
            round,
            subject,
            action,
            DecisionActor::AutoThreshold,
            None,
        )
        .expect("auto records need no rationale")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid(n: u128) -> Ulid {
        Ulid::from(n)
    }

    #[test]
    fn test_human_record_requires_rationale() {
        let err = DecisionRecord::new(
            "s1",
            None,
            vec![uid(1), uid(2)],
            DecisionAction::Merge,
            DecisionActor::Human,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, CurationError::MissingRationale { .. }));

        let blank = DecisionRecord::new(
            "s1",
            None,
            vec![uid(1), uid(2)],
            DecisionAction::Merge,
            DecisionActor::Llm,
            Some("   ".into()),
        );
        assert!(blank.is_err());
    }

    #[test]
    fn test_auto_record_needs_no_rationale() {
        let record = DecisionRecord::auto(
            "overnight",
            Some(3),
            vec![uid(2), uid(1)],
            DecisionAction::Merge,
        );
        assert_eq!(record.actor, DecisionActor::AutoThreshold);
        assert_eq!(record.round, Some(3));
        // Subject is canonicalized to sorted order
        assert_eq!(record.subject, vec![uid(1), uid(2)]);
    }

    #[test]
    fn test_action_roundtrip() {
        for action in [
            DecisionAction::Merge,
            DecisionAction::MergeSubset,
            DecisionAction::KeepSeparate,
            DecisionAction::Reject,
            DecisionAction::Split,
            DecisionAction::Update,
        ] {
            let parsed: DecisionAction = action.to_string().parse().unwrap();
            assert_eq!(parsed, action);
        }
        assert!("delete".parse::<DecisionAction>().is_err());
    }

    #[test]
    fn test_actor_roundtrip() {
        for actor in [
            DecisionActor::Human,
            DecisionActor::Llm,
            DecisionActor::AutoThreshold,
        ] {
            let parsed: DecisionActor = actor.to_string().parse().unwrap();
            assert_eq!(parsed, actor);
        }
    }
}
