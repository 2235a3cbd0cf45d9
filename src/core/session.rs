//! Interactive review session
//!
//! An explicit finite state machine over one bucket's queue. The
//! command set is closed and the cursor is persisted after every
//! decision, so the session is resumable from anywhere a crash or
//! `quit` leaves it, independent of how commands are delivered (stdin,
//! API call, scripted replay).
//!
//! Write-ahead ordering: a mutating command is recorded (DecisionRecord
//! plus item mutation in one transaction) before the session reports it
//! as applied and advances. If persistence fails, nothing moved.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use super::decision::{DecisionAction, DecisionActor, DecisionRecord};
use super::error::CurationError;
use super::item::Item;
use super::policy::Bucket;
use super::storage::{Mutation, Storage};
use super::triad::DriftTriad;

/// One queue entry presented to the reviewer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReviewSubject {
    Pair {
        a: Ulid,
        b: Ulid,
        score: f64,
    },
    Community {
        members: Vec<Ulid>,
        avg_similarity: f64,
        /// Manual-review queue entry this subject was loaded from, if
        /// any; deleted once the group is decided
        #[serde(default, skip_serializing_if = "Option::is_none")]
        queue_entry: Option<Ulid>,
    },
    Triad {
        triad: DriftTriad,
    },
}

impl ReviewSubject {
    /// All item ids the subject covers
    pub fn members(&self) -> Vec<Ulid> {
        match self {
            ReviewSubject::Pair { a, b, .. } => vec![*a, *b],
            ReviewSubject::Community { members, .. } => members.clone(),
            ReviewSubject::Triad { triad } => triad.members.to_vec(),
        }
    }
}

/// Resumable progress cursor, checkpointed after every decision
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub session_id: String,
    /// Which similarity tier this session processes
    pub bucket: Bucket,
    pub queue: Vec<ReviewSubject>,
    /// Index of the next subject to present
    pub cursor: usize,
    #[serde(default)]
    pub round_counter: u32,
    #[serde(default)]
    pub improvement_history: Vec<f64>,
    /// Canonical of the most recent merge, target of a follow-up `update`
    #[serde(default)]
    pub last_canonical: Option<Ulid>,
}

impl SessionState {
    pub fn new(session_id: impl Into<String>, bucket: Bucket, queue: Vec<ReviewSubject>) -> Self {
        Self {
            session_id: session_id.into(),
            bucket,
            queue,
            cursor: 0,
            round_counter: 0,
            improvement_history: Vec::new(),
            last_canonical: None,
        }
    }

    pub fn remaining(&self) -> usize {
        self.queue.len().saturating_sub(self.cursor)
    }
}

/// Closed command set. Anything else is a parse error, shown to the
/// reviewer without touching the queue.
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewCommand {
    /// Merge the subject; canonical defaults to the lowest id
    Merge {
        canonical: Option<Ulid>,
        rationale: Option<String>,
    },
    /// Edit the canonical's content after a merge
    Update { body: String },
    /// Keep separate, no mutation
    Keep { rationale: Option<String> },
    /// Explicit rejection of invalid entries
    Reject { rationale: Option<String> },
    /// Re-render the comparison, no mutation, no cursor move
    Diff,
    /// Break a community into sub-groups and requeue each
    Split { groups: Vec<Vec<Ulid>> },
    /// Persist state and leave; resumable later
    Quit,
}

impl ReviewCommand {
    /// Parse a reviewer line. Grammar:
    ///   merge [<id>] [: <rationale>]
    ///   update <new body>
    ///   keep [: <rationale>]
    ///   reject [: <rationale>]
    ///   diff
    ///   split <id>,<id> / <id>,<id> [/ ...]
    ///   quit
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        // The verb ends at the first whitespace or ':' so that
        // "keep: rationale" parses the same as "keep : rationale"
        let (head, rest) = match line.find(|c: char| c.is_whitespace() || c == ':') {
            Some(i) => (&line[..i], line[i..].trim_start()),
            None => (line, ""),
        };

        match head.to_lowercase().as_str() {
            "merge" => {
                let (arg, rationale) = split_rationale(rest);
                let canonical = if arg.is_empty() {
                    None
                } else {
                    Some(parse_item_id(arg)?)
                };
                Ok(ReviewCommand::Merge {
                    canonical,
                    rationale,
                })
            }
            "update" => {
                let body = rest.trim_start_matches(':').trim();
                if body.is_empty() {
                    anyhow::bail!("update needs the replacement body text");
                }
                Ok(ReviewCommand::Update {
                    body: body.to_string(),
                })
            }
            "keep" => {
                let (_, rationale) = split_rationale(rest);
                Ok(ReviewCommand::Keep { rationale })
            }
            "reject" => {
                let (_, rationale) = split_rationale(rest);
                Ok(ReviewCommand::Reject { rationale })
            }
            "diff" => Ok(ReviewCommand::Diff),
            "split" => {
                let groups: Vec<Vec<Ulid>> = rest
                    .split('/')
                    .map(|g| {
                        g.split(',')
                            .map(|id| parse_item_id(id.trim()))
                            .collect::<Result<Vec<_>>>()
                    })
                    .collect::<Result<Vec<_>>>()?;
                if groups.len() < 2 {
                    anyhow::bail!("split needs at least two groups, e.g. 'split a,b / c'");
                }
                Ok(ReviewCommand::Split { groups })
            }
            "quit" | "q" => Ok(ReviewCommand::Quit),
            other => anyhow::bail!(
                "Unknown command '{}'. Commands: merge, update, keep, reject, diff, split, quit",
                other
            ),
        }
    }
}

fn split_rationale(rest: &str) -> (&str, Option<String>) {
    match rest.split_once(':') {
        Some((arg, rationale)) => {
            let r = rationale.trim();
            (
                arg.trim(),
                if r.is_empty() { None } else { Some(r.to_string()) },
            )
        }
        None => (rest.trim(), None),
    }
}

fn parse_item_id(s: &str) -> Result<Ulid> {
    let clean = s.trim_start_matches("kura-");
    Ulid::from_string(clean).map_err(|e| anyhow::anyhow!("Invalid item id '{}': {}", s, e))
}

/// What a handled command did
#[derive(Debug)]
pub enum StepOutcome {
    /// Decision recorded (and mutation applied); cursor advanced
    Applied(DecisionAction),
    /// Non-mutating render request
    Rendered(Vec<Item>),
    /// Session persisted and left
    Quit,
    /// Queue exhausted
    Done,
}

/// The FSM driver. Owns no I/O: callers render `current()` and feed
/// parsed commands into `handle`.
pub struct ReviewSession<'a> {
    storage: &'a Storage,
    state: SessionState,
}

impl<'a> ReviewSession<'a> {
    /// Resume a persisted session or start a fresh one over `queue`
    pub fn open(
        storage: &'a Storage,
        session_id: &str,
        bucket: Bucket,
        queue: Vec<ReviewSubject>,
    ) -> Result<Self> {
        let state = match storage.load_session_state::<SessionState>(session_id)? {
            Some(saved) if saved.bucket == bucket && saved.remaining() > 0 => saved,
            _ => {
                let state = SessionState::new(session_id, bucket, queue);
                storage.save_session_state(session_id, &state)?;
                state
            }
        };

        Ok(Self { storage, state })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The subject awaiting input, or None when the queue is exhausted
    pub fn current(&self) -> Option<&ReviewSubject> {
        self.state.queue.get(self.state.cursor)
    }

    pub fn is_done(&self) -> bool {
        self.current().is_none()
    }

    /// Handle one reviewer command against the current subject
    pub fn handle(&mut self, command: ReviewCommand) -> Result<StepOutcome> {
        if let ReviewCommand::Quit = command {
            self.storage
                .save_session_state(&self.state.session_id, &self.state)?;
            return Ok(StepOutcome::Quit);
        }

        // Update targets the last merge's canonical, not the current
        // subject, so it must still work after the final queue entry
        // was merged and the cursor sits past the end
        if let ReviewCommand::Update { body } = command {
            let Some(canonical) = self.state.last_canonical else {
                anyhow::bail!("update only applies after a merge in this session");
            };
            let record = DecisionRecord::new(
                self.state.session_id.clone(),
                None,
                vec![canonical],
                DecisionAction::Update,
                DecisionActor::Human,
                Some("canonical content edited post-merge".into()),
            )?;
            self.storage.apply_decision(
                &record,
                &Mutation::UpdateBody {
                    item: canonical,
                    body,
                },
            )?;
            // No cursor move: update is a follow-up, not a queue step
            self.persist()?;
            return Ok(StepOutcome::Applied(DecisionAction::Update));
        }

        let Some(subject) = self.current().cloned() else {
            return Ok(StepOutcome::Done);
        };

        match command {
            ReviewCommand::Merge {
                canonical,
                rationale,
            } => {
                // A triad merge collapses only the close pair; the
                // distant item stays in the pool
                let members = match &subject {
                    ReviewSubject::Triad { triad } => {
                        vec![triad.close_pair.0, triad.close_pair.1]
                    }
                    other => other.members(),
                };
                // Default canonical: lowest id (ULIDs are
                // creation-ordered, so this is the earliest item)
                let canonical = match canonical {
                    Some(chosen) => {
                        if !members.contains(&chosen) {
                            return Err(CurationError::AmbiguousDecision(format!(
                                "{} is not part of the current subject",
                                chosen
                            ))
                            .into());
                        }
                        chosen
                    }
                    None => *members.iter().min().expect("subjects are never empty"),
                };
                // Stale queue entries: another session may have merged
                // a member away since the queue was built
                for member in &members {
                    if let Some(item) = self.storage.get_item(member)? {
                        if !item.is_active() {
                            return Err(CurationError::MutationConflict(*member).into());
                        }
                    }
                }
                let rejected: Vec<Ulid> =
                    members.iter().copied().filter(|&m| m != canonical).collect();

                let record = DecisionRecord::new(
                    self.state.session_id.clone(),
                    None,
                    members.clone(),
                    DecisionAction::Merge,
                    DecisionActor::Human,
                    Some(rationale.unwrap_or_else(|| "merged during interactive review".into())),
                )?;
                self.storage
                    .apply_decision(&record, &Mutation::MergeInto { canonical, rejected })?;

                self.state.last_canonical = Some(canonical);
                self.drain_queue_entry(&subject)?;
                self.advance()?;
                Ok(StepOutcome::Applied(DecisionAction::Merge))
            }

            ReviewCommand::Keep { rationale } => {
                let record = DecisionRecord::new(
                    self.state.session_id.clone(),
                    None,
                    subject.members(),
                    DecisionAction::KeepSeparate,
                    DecisionActor::Human,
                    Some(rationale.unwrap_or_else(|| "kept separate during interactive review".into())),
                )?;
                self.storage.apply_decision(&record, &Mutation::None)?;

                self.drain_queue_entry(&subject)?;
                self.advance()?;
                Ok(StepOutcome::Applied(DecisionAction::KeepSeparate))
            }

            ReviewCommand::Reject { rationale } => {
                let members = subject.members();
                let record = DecisionRecord::new(
                    self.state.session_id.clone(),
                    None,
                    members.clone(),
                    DecisionAction::Reject,
                    DecisionActor::Human,
                    Some(rationale.unwrap_or_else(|| "rejected as invalid during interactive review".into())),
                )?;
                self.storage
                    .apply_decision(&record, &Mutation::RejectAll { items: members })?;

                self.drain_queue_entry(&subject)?;
                self.advance()?;
                Ok(StepOutcome::Applied(DecisionAction::Reject))
            }

            ReviewCommand::Diff => {
                let mut items = Vec::new();
                for id in subject.members() {
                    if let Some(item) = self.storage.get_item(&id)? {
                        items.push(item);
                    }
                }
                Ok(StepOutcome::Rendered(items))
            }

            ReviewCommand::Split { groups } => {
                let members = subject.members();
                let mut covered: Vec<Ulid> = groups.iter().flatten().copied().collect();
                covered.sort();
                let mut expected = members.clone();
                expected.sort();
                if covered != expected {
                    return Err(CurationError::AmbiguousDecision(
                        "split groups must partition the subject exactly".into(),
                    )
                    .into());
                }

                let record = DecisionRecord::new(
                    self.state.session_id.clone(),
                    None,
                    members,
                    DecisionAction::Split,
                    DecisionActor::Human,
                    Some("community split into sub-groups".into()),
                )?;
                self.storage.apply_decision(&record, &Mutation::None)?;

                // Requeue each sub-group of reviewable size
                for group in groups.into_iter().filter(|g| g.len() >= 2) {
                    self.state.queue.push(ReviewSubject::Community {
                        members: group,
                        avg_similarity: 0.0,
                        queue_entry: None,
                    });
                }

                self.drain_queue_entry(&subject)?;
                self.advance()?;
                Ok(StepOutcome::Applied(DecisionAction::Split))
            }

            ReviewCommand::Update { .. } | ReviewCommand::Quit => unreachable!("handled above"),
        }
    }

    /// Decided subjects that came from the manual-review queue are
    /// removed from it, so the queue drains as groups get decided
    fn drain_queue_entry(&self, subject: &ReviewSubject) -> Result<()> {
        if let ReviewSubject::Community {
            queue_entry: Some(id),
            ..
        } = subject
        {
            self.storage.remove_manual_review(id)?;
        }
        Ok(())
    }

    fn advance(&mut self) -> Result<()> {
        self.state.cursor += 1;
        self.persist()?;
        Ok(())
    }

    fn persist(&self) -> Result<()> {
        self.storage
            .save_session_state(&self.state.session_id, &self.state)
    }

    /// Drop the checkpoint once the queue is finished
    pub fn finish(self) -> Result<()> {
        if self.is_done() {
            self.storage.delete_session_state(&self.state.session_id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::item::ItemStatus;

    fn seed_pair(storage: &Storage) -> (Item, Item) {
        let a = Item::new("skills", "Backoff", "Retry with exponential backoff.");
        let b = Item::new("skills", "Retry backoff", "Retries should back off exponentially.");
        storage.insert_item(&a).unwrap();
        storage.insert_item(&b).unwrap();
        (a, b)
    }

    fn pair_queue(a: &Item, b: &Item) -> Vec<ReviewSubject> {
        vec![ReviewSubject::Pair {
            a: a.id,
            b: b.id,
            score: 0.94,
        }]
    }

    #[test]
    fn test_merge_defaults_to_lowest_id() {
        let storage = Storage::open_memory().unwrap();
        let (a, b) = seed_pair(&storage);
        let lowest = a.id.min(b.id);
        let other = a.id.max(b.id);

        let mut session =
            ReviewSession::open(&storage, "s1", Bucket::High, pair_queue(&a, &b)).unwrap();

        let outcome = session
            .handle(ReviewCommand::Merge {
                canonical: None,
                rationale: Some("same advice".into()),
            })
            .unwrap();
        assert!(matches!(outcome, StepOutcome::Applied(DecisionAction::Merge)));

        let loser = storage.get_item(&other).unwrap().unwrap();
        assert_eq!(loser.status, ItemStatus::Rejected);
        assert_eq!(loser.canonical_of, Some(lowest));

        let survivor = storage.get_item(&lowest).unwrap().unwrap();
        assert_ne!(survivor.status, ItemStatus::Rejected);
        assert!(session.is_done());
    }

    #[test]
    fn test_triad_merge_collapses_only_close_pair() {
        let storage = Storage::open_memory().unwrap();
        let mut ids = Vec::new();
        for n in 1u128..=3 {
            let mut item = Item::new("skills", format!("item-{}", n), "body");
            item.id = Ulid::from(n);
            storage.insert_item(&item).unwrap();
            ids.push(item.id);
        }
        let (a, b, c) = (ids[0], ids[1], ids[2]);

        let triad = DriftTriad {
            members: [a, b, c],
            pivot: b,
            close_pair: (a, b),
            close_score: 0.88,
            other_pair: (b, c),
            other_score: 0.87,
            distant_pair: (a, c),
            distant_score: 0.65,
        };
        let queue = vec![ReviewSubject::Triad { triad }];
        let mut session = ReviewSession::open(&storage, "s1", Bucket::High, queue).unwrap();

        session
            .handle(ReviewCommand::Merge {
                canonical: None,
                rationale: Some("close pair duplicates, third drifted".into()),
            })
            .unwrap();

        // The distant item is untouched
        assert!(storage.get_item(&c).unwrap().unwrap().is_active());
        let loser = storage.get_item(&b).unwrap().unwrap();
        assert_eq!(loser.canonical_of, Some(a));
        // The record covers only the merged pair
        let record = &storage.decisions_for_session("s1").unwrap()[0];
        assert_eq!(record.subject, vec![a, b]);
    }

    #[test]
    fn test_merge_refuses_stale_subject() {
        let storage = Storage::open_memory().unwrap();
        let (a, b) = seed_pair(&storage);

        // Another session merged b away before this queue was consumed
        let record = DecisionRecord::auto("other", None, vec![a.id, b.id], DecisionAction::Merge);
        storage
            .apply_decision(
                &record,
                &Mutation::MergeInto {
                    canonical: a.id,
                    rejected: vec![b.id],
                },
            )
            .unwrap();

        let mut session =
            ReviewSession::open(&storage, "s1", Bucket::High, pair_queue(&a, &b)).unwrap();
        let err = session
            .handle(ReviewCommand::Merge {
                canonical: None,
                rationale: Some("same advice".into()),
            })
            .unwrap_err();
        assert!(err.to_string().contains("conflicting decisions"));
    }

    #[test]
    fn test_merge_with_explicit_canonical() {
        let storage = Storage::open_memory().unwrap();
        let (a, b) = seed_pair(&storage);
        let chosen = a.id.max(b.id);
        let other = a.id.min(b.id);

        let mut session =
            ReviewSession::open(&storage, "s1", Bucket::High, pair_queue(&a, &b)).unwrap();
        session
            .handle(ReviewCommand::Merge {
                canonical: Some(chosen),
                rationale: Some("newer phrasing is clearer".into()),
            })
            .unwrap();

        let loser = storage.get_item(&other).unwrap().unwrap();
        assert_eq!(loser.canonical_of, Some(chosen));
    }

    #[test]
    fn test_keep_mutates_nothing_but_records() {
        let storage = Storage::open_memory().unwrap();
        let (a, b) = seed_pair(&storage);

        let mut session =
            ReviewSession::open(&storage, "s1", Bucket::High, pair_queue(&a, &b)).unwrap();
        session
            .handle(ReviewCommand::Keep {
                rationale: Some("different scenarios".into()),
            })
            .unwrap();

        assert_eq!(storage.active_items("skills").unwrap().len(), 2);
        assert_eq!(storage.count_decisions().unwrap(), 1);
    }

    #[test]
    fn test_diff_does_not_advance_or_record() {
        let storage = Storage::open_memory().unwrap();
        let (a, b) = seed_pair(&storage);

        let mut session =
            ReviewSession::open(&storage, "s1", Bucket::High, pair_queue(&a, &b)).unwrap();
        let outcome = session.handle(ReviewCommand::Diff).unwrap();

        match outcome {
            StepOutcome::Rendered(items) => assert_eq!(items.len(), 2),
            other => panic!("expected render, got {:?}", other),
        }
        assert_eq!(session.state().cursor, 0);
        assert_eq!(storage.count_decisions().unwrap(), 0);
    }

    #[test]
    fn test_update_requires_prior_merge() {
        let storage = Storage::open_memory().unwrap();
        let (a, b) = seed_pair(&storage);

        let mut session =
            ReviewSession::open(&storage, "s1", Bucket::High, pair_queue(&a, &b)).unwrap();
        let err = session.handle(ReviewCommand::Update {
            body: "better text".into(),
        });
        assert!(err.is_err());
    }

    #[test]
    fn test_update_edits_last_canonical() {
        let storage = Storage::open_memory().unwrap();
        let (a, b) = seed_pair(&storage);
        let lowest = a.id.min(b.id);

        let mut session =
            ReviewSession::open(&storage, "s1", Bucket::High, pair_queue(&a, &b)).unwrap();
        session
            .handle(ReviewCommand::Merge {
                canonical: None,
                rationale: Some("dupes".into()),
            })
            .unwrap();
        session
            .handle(ReviewCommand::Update {
                body: "Merged and clarified.".into(),
            })
            .unwrap();

        let canonical = storage.get_item(&lowest).unwrap().unwrap();
        assert_eq!(canonical.body, "Merged and clarified.");
        assert_eq!(storage.count_decisions().unwrap(), 2);
    }

    #[test]
    fn test_split_requeues_subgroups() {
        let storage = Storage::open_memory().unwrap();
        let items: Vec<Item> = (0..4)
            .map(|i| {
                let item = Item::new("skills", format!("t{}", i), "b");
                storage.insert_item(&item).unwrap();
                item
            })
            .collect();
        let members: Vec<Ulid> = items.iter().map(|i| i.id).collect();

        let queue = vec![ReviewSubject::Community {
            members: members.clone(),
            avg_similarity: 0.9,
            queue_entry: None,
        }];
        let mut session = ReviewSession::open(&storage, "s1", Bucket::High, queue).unwrap();

        session
            .handle(ReviewCommand::Split {
                groups: vec![
                    vec![members[0], members[1]],
                    vec![members[2], members[3]],
                ],
            })
            .unwrap();

        // Two new sub-group subjects queued behind the cursor
        assert_eq!(session.state().queue.len(), 3);
        assert!(!session.is_done());
        assert_eq!(storage.active_items("skills").unwrap().len(), 4);
    }

    #[test]
    fn test_split_must_partition_exactly() {
        let storage = Storage::open_memory().unwrap();
        let (a, b) = seed_pair(&storage);
        let queue = vec![ReviewSubject::Community {
            members: vec![a.id, b.id],
            avg_similarity: 0.9,
            queue_entry: None,
        }];
        let mut session = ReviewSession::open(&storage, "s1", Bucket::High, queue).unwrap();

        let stranger = Ulid::new();
        let err = session.handle(ReviewCommand::Split {
            groups: vec![vec![a.id], vec![stranger]],
        });
        assert!(err.is_err());
    }

    #[test]
    fn test_deciding_queued_group_drains_manual_review() {
        let storage = Storage::open_memory().unwrap();
        let (a, b) = seed_pair(&storage);
        let entry_id = storage
            .push_manual_review("skills", &[a.id, b.id], "undecided pair")
            .unwrap();
        assert_eq!(storage.count_manual_review().unwrap(), 1);

        let queue = vec![ReviewSubject::Community {
            members: vec![a.id, b.id],
            avg_similarity: 0.0,
            queue_entry: Some(entry_id),
        }];
        let mut session = ReviewSession::open(&storage, "s1", Bucket::High, queue).unwrap();
        session
            .handle(ReviewCommand::Merge {
                canonical: None,
                rationale: Some("same advice".into()),
            })
            .unwrap();

        assert_eq!(storage.count_manual_review().unwrap(), 0);
    }

    #[test]
    fn test_quit_and_resume_from_same_cursor() {
        let storage = Storage::open_memory().unwrap();
        let (a, b) = seed_pair(&storage);
        let (c, d) = seed_pair(&storage);

        let queue = vec![
            ReviewSubject::Pair { a: a.id, b: b.id, score: 0.95 },
            ReviewSubject::Pair { a: c.id, b: d.id, score: 0.93 },
        ];

        {
            let mut session =
                ReviewSession::open(&storage, "s1", Bucket::High, queue.clone()).unwrap();
            session
                .handle(ReviewCommand::Keep {
                    rationale: Some("distinct".into()),
                })
                .unwrap();
            let outcome = session.handle(ReviewCommand::Quit).unwrap();
            assert!(matches!(outcome, StepOutcome::Quit));
        }

        // Resume: cursor sits on the second pair, not the first
        let session = ReviewSession::open(&storage, "s1", Bucket::High, Vec::new()).unwrap();
        assert_eq!(session.state().cursor, 1);
        match session.current().unwrap() {
            ReviewSubject::Pair { a: ra, .. } => assert_eq!(*ra, c.id),
            other => panic!("unexpected subject {:?}", other),
        }
    }

    #[test]
    fn test_finish_clears_checkpoint() {
        let storage = Storage::open_memory().unwrap();
        let (a, b) = seed_pair(&storage);

        let mut session =
            ReviewSession::open(&storage, "s1", Bucket::High, pair_queue(&a, &b)).unwrap();
        session
            .handle(ReviewCommand::Keep {
                rationale: Some("ok".into()),
            })
            .unwrap();
        assert!(session.is_done());
        session.finish().unwrap();

        let state: Option<SessionState> = storage.load_session_state("s1").unwrap();
        assert!(state.is_none());
    }

    #[test]
    fn test_command_parsing() {
        assert_eq!(ReviewCommand::parse("diff").unwrap(), ReviewCommand::Diff);
        assert_eq!(ReviewCommand::parse("quit").unwrap(), ReviewCommand::Quit);
        assert_eq!(ReviewCommand::parse("q").unwrap(), ReviewCommand::Quit);

        match ReviewCommand::parse("merge : obvious duplicates").unwrap() {
            ReviewCommand::Merge {
                canonical: None,
                rationale: Some(r),
            } => assert_eq!(r, "obvious duplicates"),
            other => panic!("unexpected {:?}", other),
        }

        let id = Ulid::new();
        match ReviewCommand::parse(&format!("merge {}", id)).unwrap() {
            ReviewCommand::Merge {
                canonical: Some(c), ..
            } => assert_eq!(c, id),
            other => panic!("unexpected {:?}", other),
        }

        match ReviewCommand::parse("keep: different contexts").unwrap() {
            ReviewCommand::Keep { rationale: Some(r) } => {
                assert_eq!(r, "different contexts")
            }
            other => panic!("unexpected {:?}", other),
        }

        let (a, b, c) = (Ulid::new(), Ulid::new(), Ulid::new());
        match ReviewCommand::parse(&format!("split {},{} / {}", a, b, c)).unwrap() {
            ReviewCommand::Split { groups } => {
                assert_eq!(groups, vec![vec![a, b], vec![c]]);
            }
            other => panic!("unexpected {:?}", other),
        }

        assert!(ReviewCommand::parse("yeet").is_err());
        assert!(ReviewCommand::parse("update").is_err());
        assert!(ReviewCommand::parse("split onlyonegroup").is_err());
    }
}
