//! Curation report - snapshot of the knowledge base plus an optional
//! run breakdown, serializable for machine consumers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::convergence::{CurationOutcome, HaltReason, RoundSummary};
use super::decision::DecisionRecord;
use super::storage::{CategoryCount, ManualReviewEntry, Storage, StorageStats};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurationReport {
    pub generated_at: DateTime<Utc>,
    pub stats: StorageStats,
    pub categories: Vec<CategoryCount>,
    /// Present when the report follows a curation run
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub rounds: Vec<RoundSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub halt: Option<HaltReason>,
    pub manual_review: Vec<ManualReviewEntry>,
    pub recent_decisions: Vec<DecisionRecord>,
}

impl CurationReport {
    /// Collect a report from storage, folding in a run outcome when one
    /// is available
    pub fn gather(storage: &Storage, outcome: Option<&CurationOutcome>) -> anyhow::Result<Self> {
        Ok(Self {
            generated_at: Utc::now(),
            stats: storage.stats()?,
            categories: storage.category_breakdown()?,
            rounds: outcome.map(|o| o.rounds.clone()).unwrap_or_default(),
            halt: outcome.map(|o| o.halt),
            manual_review: storage.list_manual_review()?,
            recent_decisions: storage.recent_decisions(10)?,
        })
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Human-readable rendering for the terminal
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let s = &self.stats;

        out.push_str("📊 Knowledge Base\n\n");
        out.push_str(&format!("  Total items:      {}\n", s.total_items));
        out.push_str(&format!("  ├── Pending:      {}\n", s.pending_items));
        out.push_str(&format!("  ├── Synced:       {}\n", s.synced_items));
        out.push_str(&format!("  └── Rejected:     {}\n", s.rejected_items));
        out.push_str(&format!("  Decisions:        {}\n", s.decision_count));

        if !self.categories.is_empty() {
            out.push_str("\n📂 Categories:\n");
            for c in &self.categories {
                out.push_str(&format!(
                    "  {} ({} active, {} rejected)\n",
                    c.category, c.active, c.rejected
                ));
            }
        }

        if !self.rounds.is_empty() {
            out.push_str("\n🔁 Curation rounds:\n");
            for r in &self.rounds {
                out.push_str(&format!(
                    "  Round {}: {} → {} items, {} merged, {} deferred ({:.1}% reduction)\n",
                    r.round,
                    r.items_before,
                    r.items_after,
                    r.merges,
                    r.deferred_to_manual,
                    r.improvement_rate * 100.0
                ));
            }
            if let Some(halt) = self.halt {
                let reason = match halt {
                    HaltReason::Converged => "converged",
                    HaltReason::MaxIterations => "round cap reached",
                    HaltReason::Exhausted => "nothing left to process",
                };
                out.push_str(&format!("  Halted: {}\n", reason));
            }
        }

        if !self.manual_review.is_empty() {
            out.push_str(&format!(
                "\n👀 Awaiting manual review: {}\n",
                self.manual_review.len()
            ));
            for entry in self.manual_review.iter().take(10) {
                out.push_str(&format!(
                    "  [{}] {} items: {}\n",
                    entry.category,
                    entry.members.len(),
                    entry.reason
                ));
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::item::Item;

    #[test]
    fn test_gather_reflects_storage_counts() {
        let storage = Storage::open_memory().unwrap();
        storage
            .insert_item(&Item::new("skills", "a", "body"))
            .unwrap();
        storage
            .insert_item(&Item::new("recipes", "b", "body"))
            .unwrap();

        let report = CurationReport::gather(&storage, None).unwrap();
        assert_eq!(report.stats.total_items, 2);
        assert_eq!(report.categories.len(), 2);
        assert!(report.rounds.is_empty());
        assert!(report.halt.is_none());
    }

    #[test]
    fn test_text_rendering_lists_manual_queue() {
        let storage = Storage::open_memory().unwrap();
        let a = Item::new("skills", "a", "body");
        let b = Item::new("skills", "b", "body");
        storage.insert_item(&a).unwrap();
        storage.insert_item(&b).unwrap();
        storage
            .push_manual_review("skills", &[a.id, b.id], "drift triad")
            .unwrap();

        let report = CurationReport::gather(&storage, None).unwrap();
        let text = report.render_text();
        assert!(text.contains("Awaiting manual review: 1"));
        assert!(text.contains("drift triad"));
    }

    #[test]
    fn test_json_roundtrip() {
        let storage = Storage::open_memory().unwrap();
        let report = CurationReport::gather(&storage, None).unwrap();
        let json = report.to_json().unwrap();
        let parsed: CurationReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.stats.total_items, 0);
    }
}
