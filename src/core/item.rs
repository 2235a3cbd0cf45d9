//! Item - Core data structure
//!
//! An item is one unit of contributed knowledge: a short free-text
//! experience or skill, scoped to a category. Items never compare or
//! merge across categories.
//!
//! # Key Properties
//! - **id**: ULID (sortable, unique)
//! - **category**: partition key
//! - **body**: text that was embedded
//! - **canonical_of**: set when this item was merged into a survivor

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Item status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Imported, not yet published by the surrounding system
    #[default]
    Pending,
    /// Published to the canonical set
    Synced,
    /// Merged away or explicitly rejected; kept for audit
    Rejected,
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemStatus::Pending => write!(f, "pending"),
            ItemStatus::Synced => write!(f, "synced"),
            ItemStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for ItemStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(ItemStatus::Pending),
            "synced" => Ok(ItemStatus::Synced),
            "rejected" => Ok(ItemStatus::Rejected),
            _ => anyhow::bail!("Unknown status: {}", s),
        }
    }
}

/// A knowledge item - the unit the curation engine deduplicates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier (ULID, creation-ordered)
    pub id: Ulid,

    /// Partition key; similarity never crosses it
    pub category: String,

    /// Short title
    pub title: String,

    /// Full text (what the embedding was computed from)
    pub body: String,

    /// Handle into the vector provider, not the raw vector
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_ref: Option<String>,

    /// Status
    #[serde(default)]
    pub status: ItemStatus,

    /// Surviving item this one was merged into (rejected items only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_of: Option<Ulid>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last mutation timestamp
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Create a new pending item
    pub fn new(
        category: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Ulid::new(),
            category: category.into(),
            title: title.into(),
            body: body.into(),
            embedding_ref: None,
            status: ItemStatus::default(),
            canonical_of: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the embedding handle
    pub fn with_embedding_ref(mut self, handle: impl Into<String>) -> Self {
        self.embedding_ref = Some(handle.into());
        self
    }

    /// Set status
    pub fn with_status(mut self, status: ItemStatus) -> Self {
        self.status = status;
        self
    }

    /// Whether the item participates in similarity graphs
    pub fn is_active(&self) -> bool {
        self.status != ItemStatus::Rejected
    }

    /// Get short ID (first 8 chars)
    pub fn short_id(&self) -> String {
        self.id.to_string()[..8].to_lowercase()
    }

    /// Format as kura ID
    pub fn kura_id(&self) -> String {
        format!("kura-{}", self.short_id())
    }
}

impl std::fmt::Display for Item {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.kura_id(), self.category, self.title)
    }
}
