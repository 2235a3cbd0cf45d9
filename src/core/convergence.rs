//! Convergence loop - overnight automated curation
//!
//! Each round: auto-dedup pass, graph rebuild, community detection,
//! policy routing (auto / LLM / manual-review queue - automated mode
//! never blocks on a human, it defers), then the improvement rate. The
//! loop halts when improvement drops below `min_improvement_rate` or
//! the round cap is reached; the cap guarantees termination even
//! against oscillating data.
//!
//! State is checkpointed after every round, so a restart resumes at the
//! next round instead of repeating work. `dry_run` performs the full
//! computation but suppresses every record, mutation, and checkpoint.

use std::collections::HashSet;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use ulid::Ulid;

use crate::config::Config;

use super::community::{detect_communities, Community};
use super::decision::{DecisionAction, DecisionActor, DecisionRecord};
use super::graph::GraphBuilder;
use super::policy::{route, Route};
use super::providers::{Adjudicator, RerankProvider, VectorProvider, Verdict};
use super::storage::{Mutation, Storage};
use super::triad::detect_triads;

/// Session id under which overnight checkpoints and records are filed
pub const OVERNIGHT_SESSION: &str = "overnight";

/// Checkpoint persisted between rounds
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoopCheckpoint {
    /// Rounds completed so far
    pub round_counter: u32,
    /// Per-round reduction ratios
    pub improvement_history: Vec<f64>,
}

/// What one round did
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundSummary {
    pub round: u32,
    pub items_before: usize,
    pub items_after: usize,
    /// Merge decisions applied this round
    pub merges: usize,
    /// Groups pushed to the manual-review queue
    pub deferred_to_manual: usize,
    /// Candidates skipped because an item was already decided this round
    pub conflicts_deferred: usize,
    pub improvement_rate: f64,
}

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HaltReason {
    /// Improvement fell below the configured minimum
    Converged,
    /// Round cap reached
    MaxIterations,
    /// Nothing left to process
    Exhausted,
}

/// Result of a full run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurationOutcome {
    pub rounds: Vec<RoundSummary>,
    pub halt: HaltReason,
    pub dry_run: bool,
}

/// Drives repeated build/detect/decide cycles until convergence
pub struct CurationLoop<'a> {
    storage: &'a Storage,
    builder: GraphBuilder<'a>,
    adjudicator: Option<&'a dyn Adjudicator>,
    config: &'a Config,
    dry_run: bool,
}

impl<'a> CurationLoop<'a> {
    pub fn new(
        storage: &'a Storage,
        provider: &'a dyn VectorProvider,
        rerank: Option<&'a dyn RerankProvider>,
        adjudicator: Option<&'a dyn Adjudicator>,
        config: &'a Config,
        dry_run: bool,
    ) -> Self {
        Self {
            storage,
            builder: GraphBuilder::new(provider, rerank, config),
            adjudicator,
            config,
            dry_run,
        }
    }

    /// Run rounds until a halting condition. `categories` limits the
    /// scope; empty means every category in storage.
    pub fn run(&mut self, categories: &[String]) -> Result<CurationOutcome> {
        let categories = if categories.is_empty() {
            self.storage.categories()?
        } else {
            categories.to_vec()
        };

        let mut checkpoint: LoopCheckpoint = if self.dry_run {
            LoopCheckpoint::default()
        } else {
            self.storage
                .load_session_state(OVERNIGHT_SESSION)?
                .unwrap_or_default()
        };

        let max = self.config.convergence.max_iterations;
        let mut rounds = Vec::new();
        let mut halt = HaltReason::MaxIterations;

        while checkpoint.round_counter < max {
            let round = checkpoint.round_counter + 1;
            let summary = self.run_round(round, &categories)?;
            info!(
                round,
                before = summary.items_before,
                after = summary.items_after,
                rate = summary.improvement_rate,
                "curation round finished"
            );

            checkpoint.round_counter = round;
            checkpoint.improvement_history.push(summary.improvement_rate);
            if !self.dry_run {
                self.storage
                    .save_session_state(OVERNIGHT_SESSION, &checkpoint)?;
            }

            let before = summary.items_before;
            let rate = summary.improvement_rate;
            rounds.push(summary);

            if before == 0 {
                halt = HaltReason::Exhausted;
                break;
            }
            if rate < self.config.convergence.min_improvement_rate {
                halt = HaltReason::Converged;
                break;
            }
        }

        // A clean finish discards the resume point; only a crash
        // leaves one behind
        if !self.dry_run {
            self.storage.delete_session_state(OVERNIGHT_SESSION)?;
        }

        Ok(CurationOutcome {
            rounds,
            halt,
            dry_run: self.dry_run,
        })
    }

    fn run_round(&mut self, round: u32, categories: &[String]) -> Result<RoundSummary> {
        let mut items_before = 0usize;
        let mut merges = 0usize;
        let mut deferred_to_manual = 0usize;
        let mut conflicts_deferred = 0usize;
        // Items in communities parked for a human; excluded from the
        // reduction denominator so waiting on review does not read as
        // failure to converge
        let mut deferred_items = 0usize;
        // In dry-run no mutation happens, so removals are simulated
        let mut simulated_removals = 0usize;

        // Items already decided this round; a second decision touching
        // any of them waits for the next round's fresh view
        let mut touched: HashSet<Ulid> = HashSet::new();

        for category in categories {
            let items = self.storage.active_items(category)?;
            items_before += items.len();
            if items.len() < 2 {
                continue;
            }

            // (1) Auto-dedup pass
            let graph = self.builder.build(category, &items)?;
            for edge in graph.edges_at_or_above(self.config.thresholds.auto_dedup) {
                if touched.contains(&edge.a) || touched.contains(&edge.b) {
                    conflicts_deferred += 1;
                    continue;
                }
                let canonical = edge.a.min(edge.b);
                let loser = edge.a.max(edge.b);
                self.apply_merge(round, vec![edge.a, edge.b], canonical, vec![loser], None)?;
                touched.insert(edge.a);
                touched.insert(edge.b);
                merges += 1;
                simulated_removals += 1;
            }

            // (2) Rebuild on the post-merge pool, (3) detect communities
            let items = if self.dry_run {
                items
                    .into_iter()
                    .filter(|i| !touched.contains(&i.id))
                    .collect()
            } else {
                self.storage.active_items(category)?
            };
            let graph = self.builder.build(category, &items)?;

            // Drift triads are never auto-resolved; they wait for a human
            for triad in detect_triads(&graph, self.config.thresholds.high_bucket) {
                if triad.members.iter().any(|m| touched.contains(m)) {
                    continue;
                }
                deferred_to_manual += 1;
                if !self.dry_run {
                    self.storage.push_manual_review(
                        category,
                        &triad.members,
                        &format!(
                            "drift triad: {:.2}/{:.2} high, {:.2} low",
                            triad.close_score, triad.other_score, triad.distant_score
                        ),
                    )?;
                }
            }

            // (4) Communities in priority order
            for community in detect_communities(&graph) {
                if community.members.iter().any(|m| touched.contains(m)) {
                    conflicts_deferred += 1;
                    continue;
                }

                match route(community.avg_similarity, &self.config.thresholds) {
                    Route::AutoMerge => {
                        let canonical = *community.members.iter().min().expect("size >= 2");
                        let rejected: Vec<Ulid> = community
                            .members
                            .iter()
                            .copied()
                            .filter(|&m| m != canonical)
                            .collect();
                        let removed = rejected.len();
                        self.apply_merge(
                            round,
                            community.members.clone(),
                            canonical,
                            rejected,
                            None,
                        )?;
                        touched.extend(community.members.iter().copied());
                        merges += 1;
                        simulated_removals += removed;
                    }
                    Route::HighReview | Route::MediumReview => {
                        let (m, d, removed) =
                            self.adjudicate(round, category, &community, &mut touched)?;
                        merges += m;
                        deferred_to_manual += d;
                        if d > 0 {
                            deferred_items += community.size();
                        }
                        simulated_removals += removed;
                    }
                    Route::BorderlinePreview => {
                        debug!(
                            category = %category,
                            size = community.size(),
                            avg = community.avg_similarity,
                            "borderline community left untouched"
                        );
                    }
                    Route::Ignore => {}
                }
            }
        }

        let items_after = if self.dry_run {
            items_before.saturating_sub(simulated_removals)
        } else {
            let mut after = 0usize;
            for category in categories {
                after += self.storage.count_active(Some(category))?;
            }
            after
        };

        let denominator = items_before.saturating_sub(deferred_items);
        let improvement_rate = if denominator > 0 {
            (items_before - items_after) as f64 / denominator as f64
        } else {
            0.0
        };

        Ok(RoundSummary {
            round,
            items_before,
            items_after,
            merges,
            deferred_to_manual,
            conflicts_deferred,
            improvement_rate,
        })
    }

    /// Route one reviewed-tier community through the adjudicator.
    /// Returns (merges, manual deferrals, items removed).
    fn adjudicate(
        &self,
        round: u32,
        category: &str,
        community: &Community,
        touched: &mut HashSet<Ulid>,
    ) -> Result<(usize, usize, usize)> {
        let Some(adjudicator) = self.adjudicator else {
            // No LLM configured: defer, never guess
            self.defer(category, &community.members, "no adjudicator configured")?;
            return Ok((0, 1, 0));
        };

        let mut items = Vec::new();
        for id in &community.members {
            if let Some(item) = self.storage.get_item(id)? {
                items.push(item);
            }
        }

        let adjudication = match adjudicator.decide(&items) {
            Ok(a) => a,
            Err(e) => {
                // Timeouts and errors mean manual review, never an
                // implicit keep-separate
                warn!(error = %e, "adjudicator failed; deferring to manual review");
                self.defer(category, &community.members, &format!("adjudicator error: {}", e))?;
                return Ok((0, 1, 0));
            }
        };

        if let Some(confidence) = adjudication.confidence {
            if confidence < self.config.convergence.min_adjudicator_confidence {
                self.defer(
                    category,
                    &community.members,
                    &format!("low adjudicator confidence {:.2}", confidence),
                )?;
                return Ok((0, 1, 0));
            }
        }

        match adjudication.verdict {
            Verdict::Merge => {
                let canonical = *community.members.iter().min().expect("size >= 2");
                let rejected: Vec<Ulid> = community
                    .members
                    .iter()
                    .copied()
                    .filter(|&m| m != canonical)
                    .collect();
                let removed = rejected.len();
                self.apply_merge(
                    round,
                    community.members.clone(),
                    canonical,
                    rejected,
                    Some(adjudication.rationale),
                )?;
                touched.extend(community.members.iter().copied());
                Ok((1, 0, removed))
            }
            Verdict::MergeSubset(subset) => {
                let member_set: HashSet<Ulid> = community.members.iter().copied().collect();
                if subset.len() < 2 || !subset.iter().all(|s| member_set.contains(s)) {
                    self.defer(category, &community.members, "merge_subset outside community")?;
                    return Ok((0, 1, 0));
                }
                let canonical = *subset.iter().min().expect("checked above");
                let rejected: Vec<Ulid> =
                    subset.iter().copied().filter(|&m| m != canonical).collect();
                let removed = rejected.len();
                // The remainder stays in the pool untouched
                self.apply_merge_subset(
                    round,
                    subset.clone(),
                    canonical,
                    rejected,
                    adjudication.rationale,
                )?;
                touched.extend(subset);
                Ok((1, 0, removed))
            }
            Verdict::KeepSeparate => {
                if !self.dry_run {
                    let record = DecisionRecord::new(
                        OVERNIGHT_SESSION,
                        Some(round),
                        community.members.clone(),
                        DecisionAction::KeepSeparate,
                        DecisionActor::Llm,
                        Some(adjudication.rationale),
                    )?;
                    self.storage.apply_decision(&record, &Mutation::None)?;
                }
                touched.extend(community.members.iter().copied());
                Ok((0, 0, 0))
            }
            Verdict::Split(_) | Verdict::ManualReview { .. } => {
                // Splits carry structure a human should confirm
                self.defer(category, &community.members, &adjudication.rationale)?;
                Ok((0, 1, 0))
            }
        }
    }

    fn apply_merge(
        &self,
        round: u32,
        subject: Vec<Ulid>,
        canonical: Ulid,
        rejected: Vec<Ulid>,
        llm_rationale: Option<String>,
    ) -> Result<()> {
        if self.dry_run {
            return Ok(());
        }
        let record = match llm_rationale {
            Some(rationale) => DecisionRecord::new(
                OVERNIGHT_SESSION,
                Some(round),
                subject,
                DecisionAction::Merge,
                DecisionActor::Llm,
                Some(rationale),
            )?,
            None => DecisionRecord::auto(
                OVERNIGHT_SESSION,
                Some(round),
                subject,
                DecisionAction::Merge,
            ),
        };
        self.storage
            .apply_decision(&record, &Mutation::MergeInto { canonical, rejected })?;
        Ok(())
    }

    fn apply_merge_subset(
        &self,
        round: u32,
        subject: Vec<Ulid>,
        canonical: Ulid,
        rejected: Vec<Ulid>,
        rationale: String,
    ) -> Result<()> {
        if self.dry_run {
            return Ok(());
        }
        let record = DecisionRecord::new(
            OVERNIGHT_SESSION,
            Some(round),
            subject,
            DecisionAction::MergeSubset,
            DecisionActor::Llm,
            Some(rationale),
        )?;
        self.storage
            .apply_decision(&record, &Mutation::MergeInto { canonical, rejected })?;
        Ok(())
    }

    fn defer(&self, category: &str, members: &[Ulid], reason: &str) -> Result<()> {
        if self.dry_run {
            return Ok(());
        }
        self.storage.push_manual_review(category, members, reason)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::item::{Item, ItemStatus};
    use crate::core::providers::{Adjudication, Neighbor};
    use crate::core::error::CurationError;
    use std::collections::HashMap;

    /// Scripted provider keyed on item id; pairs are symmetric
    struct FakeProvider {
        neighbors: HashMap<Ulid, Vec<Neighbor>>,
    }

    impl FakeProvider {
        fn new() -> Self {
            Self {
                neighbors: HashMap::new(),
            }
        }

        fn pair(&mut self, a: u128, b: u128, score: f64, category: &str) {
            self.neighbors.entry(Ulid::from(a)).or_default().push(Neighbor {
                id: Ulid::from(b),
                embed_score: score,
                category: category.into(),
            });
            self.neighbors.entry(Ulid::from(b)).or_default().push(Neighbor {
                id: Ulid::from(a),
                embed_score: score,
                category: category.into(),
            });
        }
    }

    impl VectorProvider for FakeProvider {
        fn neighbors(&self, item: &Item, _k: usize) -> Result<Vec<Neighbor>, CurationError> {
            Ok(self.neighbors.get(&item.id).cloned().unwrap_or_default())
        }
    }

    struct ScriptedAdjudicator {
        adjudication: Adjudication,
    }

    impl Adjudicator for ScriptedAdjudicator {
        fn decide(&self, _items: &[Item]) -> Result<Adjudication, CurationError> {
            Ok(self.adjudication.clone())
        }
    }

    fn seeded(ids: &[u128], category: &str) -> Storage {
        let storage = Storage::open_memory().unwrap();
        for &n in ids {
            let mut item = Item::new(category, format!("item-{}", n), "body");
            item.id = Ulid::from(n);
            storage.insert_item(&item).unwrap();
        }
        storage
    }

    fn unweighted_config() -> Config {
        // Embed score carries the whole blend so scripted scores pass
        // through unchanged
        let mut config = Config::default();
        config.graph.embed_weight = 1.0;
        config.graph.rerank_weight = 0.0;
        config
    }

    #[test]
    fn test_auto_dedup_merges_near_identical_pairs() {
        let storage = seeded(&[1, 2, 10, 11, 20], "skills");
        let mut provider = FakeProvider::new();
        provider.pair(1, 2, 0.99, "skills");
        provider.pair(10, 11, 0.985, "skills");
        provider.pair(10, 20, 0.60, "skills");
        let config = unweighted_config();

        let mut cloop = CurationLoop::new(&storage, &provider, None, None, &config, false);
        let outcome = cloop.run(&[]).unwrap();

        assert_eq!(outcome.rounds[0].merges, 2);
        assert_eq!(storage.count_active(Some("skills")).unwrap(), 3);
        // Lowest id wins the canonical slot
        let loser = storage.get_item(&Ulid::from(2u128)).unwrap().unwrap();
        assert_eq!(loser.status, ItemStatus::Rejected);
        assert_eq!(loser.canonical_of, Some(Ulid::from(1u128)));
        let survivor = storage.get_item(&Ulid::from(1u128)).unwrap().unwrap();
        assert!(survivor.is_active());
        // One audit record per merge
        assert_eq!(storage.count_decisions().unwrap(), 2);
        // Clean finish leaves no resume point
        let saved: Option<LoopCheckpoint> =
            storage.load_session_state(OVERNIGHT_SESSION).unwrap();
        assert!(saved.is_none());
    }

    #[test]
    fn test_hundred_items_two_near_duplicate_pairs() {
        let ids: Vec<u128> = (1..=100).collect();
        let storage = seeded(&ids, "skills");
        let mut provider = FakeProvider::new();
        provider.pair(1, 2, 0.99, "skills");
        provider.pair(50, 51, 0.99, "skills");
        let config = unweighted_config();

        CurationLoop::new(&storage, &provider, None, None, &config, false)
            .run(&[])
            .unwrap();

        assert_eq!(storage.count_active(Some("skills")).unwrap(), 98);
        let stats = storage.stats().unwrap();
        assert_eq!(stats.rejected_items, 2);
        assert_eq!(stats.decision_count, 2);
        for record in storage.recent_decisions(10).unwrap() {
            assert_eq!(record.actor, DecisionActor::AutoThreshold);
        }
    }

    #[test]
    fn test_resumes_after_checkpointed_round() {
        let storage = seeded(&[1, 2], "skills");
        let mut provider = FakeProvider::new();
        provider.pair(1, 2, 0.99, "skills");
        let config = unweighted_config();

        // A crash left a checkpoint after round 1
        storage
            .save_session_state(
                OVERNIGHT_SESSION,
                &LoopCheckpoint {
                    round_counter: 1,
                    improvement_history: vec![0.5],
                },
            )
            .unwrap();

        let outcome = CurationLoop::new(&storage, &provider, None, None, &config, false)
            .run(&[])
            .unwrap();

        // Work continues at round 2, not from scratch
        assert_eq!(outcome.rounds[0].round, 2);
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let storage = seeded(&[1, 2], "skills");
        let mut provider = FakeProvider::new();
        provider.pair(1, 2, 0.99, "skills");
        let config = unweighted_config();

        CurationLoop::new(&storage, &provider, None, None, &config, false)
            .run(&[])
            .unwrap();
        let decisions_after_first = storage.count_decisions().unwrap();

        CurationLoop::new(&storage, &provider, None, None, &config, false)
            .run(&[])
            .unwrap();

        assert_eq!(storage.count_decisions().unwrap(), decisions_after_first);
        assert_eq!(storage.count_active(Some("skills")).unwrap(), 1);
    }

    #[test]
    fn test_overlapping_pair_waits_for_next_round() {
        // A-B and B-C both clear auto-dedup; B cannot be decided twice
        // in one round, so the chain resolves across two rounds
        let storage = seeded(&[1, 2, 3], "skills");
        let mut provider = FakeProvider::new();
        provider.pair(1, 2, 0.99, "skills");
        provider.pair(2, 3, 0.99, "skills");
        provider.pair(1, 3, 0.99, "skills");
        let config = unweighted_config();

        let outcome = CurationLoop::new(&storage, &provider, None, None, &config, false)
            .run(&[])
            .unwrap();

        assert!(outcome.rounds[0].conflicts_deferred > 0);
        assert!(outcome.rounds.len() >= 2);
        assert_eq!(storage.count_active(Some("skills")).unwrap(), 1);
        // Flattening holds: every loser points straight at the survivor
        for n in [2u128, 3] {
            let item = storage.get_item(&Ulid::from(n)).unwrap().unwrap();
            assert_eq!(item.canonical_of, Some(Ulid::from(1u128)));
        }
    }

    #[test]
    fn test_dry_run_mutates_nothing() {
        let storage = seeded(&[1, 2], "skills");
        let mut provider = FakeProvider::new();
        provider.pair(1, 2, 0.99, "skills");
        let config = unweighted_config();

        let outcome = CurationLoop::new(&storage, &provider, None, None, &config, true)
            .run(&[])
            .unwrap();

        assert!(outcome.dry_run);
        assert_eq!(outcome.rounds[0].merges, 1);
        assert_eq!(storage.count_active(Some("skills")).unwrap(), 2);
        assert_eq!(storage.count_decisions().unwrap(), 0);
        assert_eq!(storage.count_manual_review().unwrap(), 0);
        let saved: Option<LoopCheckpoint> =
            storage.load_session_state(OVERNIGHT_SESSION).unwrap();
        assert!(saved.is_none());
    }

    #[test]
    fn test_round_cap_terminates_loop() {
        let storage = seeded(&[1, 2, 3, 4], "skills");
        let mut provider = FakeProvider::new();
        // Every round finds work, so only the cap can stop it
        provider.pair(1, 2, 0.99, "skills");
        provider.pair(3, 4, 0.99, "skills");
        provider.pair(1, 3, 0.99, "skills");
        let mut config = unweighted_config();
        config.convergence.max_iterations = 1;

        let outcome = CurationLoop::new(&storage, &provider, None, None, &config, false)
            .run(&[])
            .unwrap();

        assert_eq!(outcome.rounds.len(), 1);
        assert_eq!(outcome.halt, HaltReason::MaxIterations);
    }

    #[test]
    fn test_review_tier_without_adjudicator_defers() {
        let storage = seeded(&[1, 2], "skills");
        let mut provider = FakeProvider::new();
        provider.pair(1, 2, 0.94, "skills");
        let config = unweighted_config();

        let outcome = CurationLoop::new(&storage, &provider, None, None, &config, false)
            .run(&[])
            .unwrap();

        assert_eq!(outcome.rounds[0].merges, 0);
        assert!(outcome.rounds[0].deferred_to_manual > 0);
        assert_eq!(storage.count_active(Some("skills")).unwrap(), 2);
        assert!(storage.count_manual_review().unwrap() > 0);
    }

    #[test]
    fn test_repeated_runs_do_not_requeue_deferred_group() {
        // An undecided pair defers every run; the queue must hold one
        // entry for it, not one per run
        let storage = seeded(&[1, 2], "skills");
        let mut provider = FakeProvider::new();
        provider.pair(1, 2, 0.94, "skills");
        let config = unweighted_config();

        CurationLoop::new(&storage, &provider, None, None, &config, false)
            .run(&[])
            .unwrap();
        assert_eq!(storage.count_manual_review().unwrap(), 1);

        CurationLoop::new(&storage, &provider, None, None, &config, false)
            .run(&[])
            .unwrap();
        assert_eq!(storage.count_manual_review().unwrap(), 1);
    }

    #[test]
    fn test_confident_llm_merge_is_applied() {
        let storage = seeded(&[1, 2], "skills");
        let mut provider = FakeProvider::new();
        provider.pair(1, 2, 0.94, "skills");
        let config = unweighted_config();
        let adjudicator = ScriptedAdjudicator {
            adjudication: Adjudication {
                verdict: Verdict::Merge,
                rationale: "same skill, different phrasing".into(),
                confidence: Some(0.9),
            },
        };

        let outcome = CurationLoop::new(
            &storage,
            &provider,
            None,
            Some(&adjudicator),
            &config,
            false,
        )
        .run(&[])
        .unwrap();

        assert_eq!(outcome.rounds[0].merges, 1);
        assert_eq!(storage.count_active(Some("skills")).unwrap(), 1);
        let record = &storage.recent_decisions(1).unwrap()[0];
        assert_eq!(record.actor, DecisionActor::Llm);
        assert!(record.rationale.is_some());
    }

    #[test]
    fn test_low_confidence_verdict_goes_to_manual_queue() {
        let storage = seeded(&[1, 2], "skills");
        let mut provider = FakeProvider::new();
        provider.pair(1, 2, 0.94, "skills");
        let config = unweighted_config();
        let adjudicator = ScriptedAdjudicator {
            adjudication: Adjudication {
                verdict: Verdict::Merge,
                rationale: "probably the same".into(),
                confidence: Some(0.3),
            },
        };

        let outcome = CurationLoop::new(
            &storage,
            &provider,
            None,
            Some(&adjudicator),
            &config,
            false,
        )
        .run(&[])
        .unwrap();

        assert_eq!(outcome.rounds[0].merges, 0);
        assert_eq!(storage.count_active(Some("skills")).unwrap(), 2);
        assert!(storage.count_manual_review().unwrap() > 0);
    }

    #[test]
    fn test_keep_separate_records_without_mutation() {
        let storage = seeded(&[1, 2], "skills");
        let mut provider = FakeProvider::new();
        provider.pair(1, 2, 0.94, "skills");
        let config = unweighted_config();
        let adjudicator = ScriptedAdjudicator {
            adjudication: Adjudication {
                verdict: Verdict::KeepSeparate,
                rationale: "different tools, similar names".into(),
                confidence: Some(0.95),
            },
        };

        CurationLoop::new(
            &storage,
            &provider,
            None,
            Some(&adjudicator),
            &config,
            false,
        )
        .run(&[])
        .unwrap();

        assert_eq!(storage.count_active(Some("skills")).unwrap(), 2);
        let record = &storage.recent_decisions(1).unwrap()[0];
        assert_eq!(record.action, DecisionAction::KeepSeparate);
    }

    #[test]
    fn test_merge_subset_leaves_remainder_in_pool() {
        let storage = seeded(&[1, 2, 3], "skills");
        let mut provider = FakeProvider::new();
        provider.pair(1, 2, 0.94, "skills");
        provider.pair(2, 3, 0.94, "skills");
        provider.pair(1, 3, 0.94, "skills");
        let config = unweighted_config();
        let adjudicator = ScriptedAdjudicator {
            adjudication: Adjudication {
                verdict: Verdict::MergeSubset(vec![Ulid::from(1u128), Ulid::from(2u128)]),
                rationale: "first two duplicate, third is distinct".into(),
                confidence: Some(0.9),
            },
        };

        CurationLoop::new(
            &storage,
            &provider,
            None,
            Some(&adjudicator),
            &config,
            false,
        )
        .run(&[])
        .unwrap();

        assert_eq!(storage.count_active(Some("skills")).unwrap(), 2);
        assert!(storage.get_item(&Ulid::from(3u128)).unwrap().unwrap().is_active());
        let loser = storage.get_item(&Ulid::from(2u128)).unwrap().unwrap();
        assert_eq!(loser.canonical_of, Some(Ulid::from(1u128)));
    }
}
