//! kura - knowledge base deduplication and curation
//!
//! Builds a category-scoped similarity graph over knowledge items,
//! auto-merges near-identical entries, detects semantic-drift triads
//! and duplicate communities, and routes everything ambiguous to a
//! reviewer. Every mutation is preceded by an append-only decision
//! record, so the full merge lineage of any item can be replayed.
//!
//! ## Key Concepts
//!
//! - **Category isolation**: similarity edges never cross categories
//! - **Blended score**: embedding and rerank scores combined by weight
//! - **Write-ahead decisions**: the audit record lands with (never
//!   after) the mutation it describes
//! - **Flat canonical pointers**: merged items point straight at the
//!   surviving item, never at another merged item

pub mod cli;
pub mod config;
pub mod core;

pub use core::decision::{DecisionAction, DecisionActor, DecisionRecord};
pub use core::edge::SimilarityGraph;
pub use core::item::{Item, ItemStatus};
pub use core::storage::Storage;
