//! Storage - SQLite backend
//!
//! Durable storage for items, decision records, session state, the
//! precomputed neighbor table, and the manual-review queue.
//!
//! # Key Points
//! - WAL mode for concurrent reads
//! - Decision records are append-only; items are never physically
//!   deleted (rejected is a soft state preserved for audit)
//! - Every mutating decision goes through `apply_decision`, which
//!   writes the record and the item mutation in one transaction so an
//!   item is never mutated without its record

use std::collections::HashSet;
use std::path::Path as FilePath;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use ulid::Ulid;

use super::decision::{DecisionAction, DecisionActor, DecisionRecord};
use super::error::CurationError;
use super::item::{Item, ItemStatus};
use super::providers::{Neighbor, VectorProvider};

/// Database storage
pub struct Storage {
    conn: Connection,
}

/// Item mutation carried by a decision. `None` covers keep-separate
/// and split decisions, which are recorded but mutate nothing.
#[derive(Debug, Clone)]
pub enum Mutation {
    /// Reject everything but the canonical, pointing the losers at it
    MergeInto { canonical: Ulid, rejected: Vec<Ulid> },
    /// Explicit rejection of invalid entries, no merge target
    RejectAll { items: Vec<Ulid> },
    /// Edit the canonical's content post-merge
    UpdateBody { item: Ulid, body: String },
    /// Record only
    None,
}

impl Storage {
    /// Open or create a database
    pub fn open(path: &FilePath) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .context("Failed to open database")?;

        // Enable WAL mode for better concurrent access
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA busy_timeout=5000;")?;

        let storage = Self { conn };
        storage.init_schema()?;

        Ok(storage)
    }

    /// Open an in-memory database (for testing)
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let storage = Self { conn };
        storage.init_schema()?;
        Ok(storage)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            -- Knowledge items
            CREATE TABLE IF NOT EXISTS items (
                id TEXT PRIMARY KEY,
                category TEXT NOT NULL,
                title TEXT NOT NULL,
                body TEXT NOT NULL,
                embedding_ref TEXT,
                status TEXT NOT NULL DEFAULT 'pending',
                canonical_of TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_items_category ON items(category);
            CREATE INDEX IF NOT EXISTS idx_items_status ON items(status);
            CREATE INDEX IF NOT EXISTS idx_items_canonical ON items(canonical_of);

            -- Append-only decision audit trail
            CREATE TABLE IF NOT EXISTS decisions (
                id TEXT PRIMARY KEY,
                session_id TEXT NOT NULL,
                round INTEGER,
                subject TEXT NOT NULL,  -- JSON array of item ids
                action TEXT NOT NULL,
                actor TEXT NOT NULL,
                rationale TEXT,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_decisions_session ON decisions(session_id);

            -- Resumable session / overnight-run cursors
            CREATE TABLE IF NOT EXISTS session_state (
                session_id TEXT PRIMARY KEY,
                state TEXT NOT NULL,  -- JSON
                updated_at TEXT NOT NULL
            );

            -- Precomputed nearest neighbors, maintained by the
            -- surrounding embedding pipeline
            CREATE TABLE IF NOT EXISTS neighbors (
                item_id TEXT NOT NULL,
                neighbor_id TEXT NOT NULL,
                embed_score REAL NOT NULL,
                PRIMARY KEY (item_id, neighbor_id)
            );

            -- Deferred groups awaiting a human
            CREATE TABLE IF NOT EXISTS manual_review (
                id TEXT PRIMARY KEY,
                category TEXT NOT NULL,
                members TEXT NOT NULL,  -- JSON array of item ids
                reason TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )?;

        Ok(())
    }

    // === Items ===

    /// Insert a new item
    pub fn insert_item(&self, item: &Item) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO items (
                id, category, title, body, embedding_ref,
                status, canonical_of, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                item.id.to_string(),
                item.category,
                item.title,
                item.body,
                item.embedding_ref,
                item.status.to_string(),
                item.canonical_of.map(|u| u.to_string()),
                item.created_at.to_rfc3339(),
                item.updated_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    /// Get an item by ID
    pub fn get_item(&self, id: &Ulid) -> Result<Option<Item>> {
        let mut stmt = self.conn.prepare("SELECT * FROM items WHERE id = ?1")?;

        let result = stmt.query_row([id.to_string()], |row| Self::row_to_item(row));

        match result {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Mark an item synced (published by the surrounding system)
    pub fn mark_synced(&self, id: &Ulid) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE items SET status = 'synced', updated_at = ?2 WHERE id = ?1 AND status = 'pending'",
            params![id.to_string(), Utc::now().to_rfc3339()],
        )?;
        if updated == 0 {
            anyhow::bail!("Item {} not found or not pending", id);
        }
        Ok(())
    }

    /// Active (pending/synced) items of one category, sorted by id
    pub fn active_items(&self, category: &str) -> Result<Vec<Item>> {
        let mut stmt = self.conn.prepare(
            "SELECT * FROM items WHERE category = ?1 AND status != 'rejected' ORDER BY id",
        )?;

        let items = stmt
            .query_map([category], |row| Self::row_to_item(row))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    /// All distinct categories, sorted
    pub fn categories(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT category FROM items ORDER BY category")?;

        let cats = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(cats)
    }

    /// Count of active items, optionally restricted to one category
    pub fn count_active(&self, category: Option<&str>) -> Result<usize> {
        let count: i64 = match category {
            Some(cat) => self.conn.query_row(
                "SELECT COUNT(*) FROM items WHERE status != 'rejected' AND category = ?1",
                [cat],
                |row| row.get(0),
            )?,
            None => self.conn.query_row(
                "SELECT COUNT(*) FROM items WHERE status != 'rejected'",
                [],
                |row| row.get(0),
            )?,
        };
        Ok(count as usize)
    }

    /// Resolve an id through its canonical pointer to a surviving item.
    /// Pointers are flattened to depth 1 at merge time, but resolution
    /// follows the chain anyway so a half-migrated database still reads
    /// correctly.
    pub fn resolve_canonical(&self, id: &Ulid) -> Result<Ulid> {
        let mut current = *id;
        let mut seen = HashSet::new();

        while seen.insert(current) {
            match self.get_item(&current)? {
                Some(item) if item.status == ItemStatus::Rejected => match item.canonical_of {
                    Some(next) => current = next,
                    None => break,
                },
                _ => break,
            }
        }

        Ok(current)
    }

    // === Decisions (write-ahead) ===

    /// Apply one decision: record first, mutation second, one
    /// transaction. If anything fails both are rolled back, so an item
    /// is never mutated without its audit record.
    pub fn apply_decision(&self, record: &DecisionRecord, mutation: &Mutation) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;

        Self::insert_decision_tx(&tx, record)?;

        match mutation {
            Mutation::MergeInto { canonical, rejected } => {
                // Never merge into a merged-away item; flatten before writing
                let canonical = self.resolve_canonical(canonical)?;
                let now = Utc::now().to_rfc3339();

                for r in rejected {
                    if *r == canonical {
                        continue;
                    }
                    tx.execute(
                        "UPDATE items SET status = 'rejected', canonical_of = ?2, updated_at = ?3 WHERE id = ?1",
                        params![r.to_string(), canonical.to_string(), now],
                    )?;
                    // Re-point earlier losers so pointer depth stays 1
                    tx.execute(
                        "UPDATE items SET canonical_of = ?2, updated_at = ?3 WHERE canonical_of = ?1",
                        params![r.to_string(), canonical.to_string(), now],
                    )?;
                }
            }
            Mutation::RejectAll { items } => {
                let now = Utc::now().to_rfc3339();
                for id in items {
                    tx.execute(
                        "UPDATE items SET status = 'rejected', canonical_of = NULL, updated_at = ?2 WHERE id = ?1",
                        params![id.to_string(), now],
                    )?;
                }
            }
            Mutation::UpdateBody { item, body } => {
                let updated = tx.execute(
                    "UPDATE items SET body = ?2, updated_at = ?3 WHERE id = ?1",
                    params![item.to_string(), body, Utc::now().to_rfc3339()],
                )?;
                if updated == 0 {
                    anyhow::bail!("Item {} not found", item);
                }
            }
            Mutation::None => {}
        }

        tx.commit()?;
        Ok(())
    }

    fn insert_decision_tx(tx: &rusqlite::Transaction, record: &DecisionRecord) -> Result<()> {
        let subject_json =
            serde_json::to_string(&record.subject.iter().map(|u| u.to_string()).collect::<Vec<_>>())?;

        tx.execute(
            r#"
            INSERT INTO decisions (
                id, session_id, round, subject, action, actor, rationale, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                record.id.to_string(),
                record.session_id,
                record.round,
                subject_json,
                record.action.to_string(),
                record.actor.to_string(),
                record.rationale,
                record.created_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    /// Total number of decision records
    pub fn count_decisions(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM decisions", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// All decisions for a session, oldest first
    pub fn decisions_for_session(&self, session_id: &str) -> Result<Vec<DecisionRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT * FROM decisions WHERE session_id = ?1 ORDER BY created_at, id",
        )?;

        let records = stmt
            .query_map([session_id], |row| Self::row_to_decision(row))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Decisions whose subject includes the given item, oldest first
    pub fn decisions_touching(&self, id: &Ulid) -> Result<Vec<DecisionRecord>> {
        let pattern = format!("%\"{}\"%", id);
        let mut stmt = self.conn.prepare(
            "SELECT * FROM decisions WHERE subject LIKE ?1 ORDER BY created_at, id",
        )?;

        let records = stmt
            .query_map([pattern], |row| Self::row_to_decision(row))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Most recent decisions, newest first
    pub fn recent_decisions(&self, limit: usize) -> Result<Vec<DecisionRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT * FROM decisions ORDER BY created_at DESC, id DESC LIMIT ?1",
        )?;

        let records = stmt
            .query_map([limit as i64], |row| Self::row_to_decision(row))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    // === Session state ===

    /// Persist a session cursor; overwrites any previous checkpoint
    pub fn save_session_state<T: serde::Serialize>(
        &self,
        session_id: &str,
        state: &T,
    ) -> Result<()> {
        let json = serde_json::to_string(state)?;
        self.conn.execute(
            r#"
            INSERT INTO session_state (session_id, state, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(session_id) DO UPDATE SET state = ?2, updated_at = ?3
            "#,
            params![session_id, json, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Load a previously checkpointed session cursor
    pub fn load_session_state<T: serde::de::DeserializeOwned>(
        &self,
        session_id: &str,
    ) -> Result<Option<T>> {
        let mut stmt = self
            .conn
            .prepare("SELECT state FROM session_state WHERE session_id = ?1")?;

        let result = stmt.query_row([session_id], |row| row.get::<_, String>(0));

        match result {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Drop a finished session's checkpoint
    pub fn delete_session_state(&self, session_id: &str) -> Result<()> {
        self.conn.execute(
            "DELETE FROM session_state WHERE session_id = ?1",
            [session_id],
        )?;
        Ok(())
    }

    // === Neighbors ===

    /// Replace the stored neighbor list for one item
    pub fn replace_neighbors(&self, item_id: &Ulid, neighbors: &[(Ulid, f64)]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM neighbors WHERE item_id = ?1",
            [item_id.to_string()],
        )?;
        for (n, score) in neighbors {
            tx.execute(
                "INSERT INTO neighbors (item_id, neighbor_id, embed_score) VALUES (?1, ?2, ?3)",
                params![item_id.to_string(), n.to_string(), score],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Stored neighbors of one item with their categories, best first
    pub fn neighbors_of(&self, item_id: &Ulid, k: usize) -> Result<Vec<Neighbor>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT n.neighbor_id, n.embed_score, i.category
            FROM neighbors n
            JOIN items i ON i.id = n.neighbor_id
            WHERE n.item_id = ?1
            ORDER BY n.embed_score DESC, n.neighbor_id
            LIMIT ?2
            "#,
        )?;

        let rows = stmt
            .query_map(params![item_id.to_string(), k as i64], |row| {
                let id_str: String = row.get(0)?;
                Ok((id_str, row.get::<_, f64>(1)?, row.get::<_, String>(2)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut out = Vec::with_capacity(rows.len());
        for (id_str, score, category) in rows {
            let id = Ulid::from_string(&id_str)
                .map_err(|e| anyhow::anyhow!("Invalid neighbor id '{}': {}", id_str, e))?;
            out.push(Neighbor {
                id,
                embed_score: score,
                category,
            });
        }
        Ok(out)
    }

    /// Total stored neighbor rows
    pub fn neighbor_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM neighbors", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    // === Manual review queue ===

    /// Queue a group for human attention.
    ///
    /// Idempotent on (category, member set): re-pushing a group that is
    /// already queued returns the existing entry's id instead of
    /// inserting a duplicate, so repeated rounds and re-runs never grow
    /// the queue for the same undecided group.
    pub fn push_manual_review(
        &self,
        category: &str,
        members: &[Ulid],
        reason: &str,
    ) -> Result<Ulid> {
        let mut sorted: Vec<String> = members.iter().map(|u| u.to_string()).collect();
        sorted.sort();
        let members_json = serde_json::to_string(&sorted)?;

        let existing: Option<String> = self
            .conn
            .query_row(
                "SELECT id FROM manual_review WHERE category = ?1 AND members = ?2",
                params![category, members_json],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(id_str) = existing {
            return Ok(Ulid::from_string(&id_str)?);
        }

        let id = Ulid::new();
        self.conn.execute(
            r#"
            INSERT INTO manual_review (id, category, members, reason, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                id.to_string(),
                category,
                members_json,
                reason,
                Utc::now().to_rfc3339()
            ],
        )?;
        Ok(id)
    }

    /// All queued manual-review entries, oldest first
    pub fn list_manual_review(&self) -> Result<Vec<ManualReviewEntry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM manual_review ORDER BY created_at, id")?;

        let entries = stmt
            .query_map([], |row| {
                let id_str: String = row.get("id")?;
                let members_json: String = row.get("members")?;
                let created_str: String = row.get("created_at")?;
                Ok(RawManualReview {
                    id: id_str,
                    category: row.get("category")?,
                    members: members_json,
                    reason: row.get("reason")?,
                    created_at: created_str,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        entries.into_iter().map(|raw| raw.parse()).collect()
    }

    /// Remove an entry once a human has handled it
    pub fn remove_manual_review(&self, id: &Ulid) -> Result<()> {
        let deleted = self.conn.execute(
            "DELETE FROM manual_review WHERE id = ?1",
            [id.to_string()],
        )?;
        if deleted == 0 {
            anyhow::bail!("Manual review entry {} not found", id);
        }
        Ok(())
    }

    pub fn count_manual_review(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM manual_review", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    // === Stats ===

    /// Get database statistics
    pub fn stats(&self) -> Result<StorageStats> {
        let count = |sql: &str| -> Result<usize> {
            let n: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
            Ok(n as usize)
        };

        Ok(StorageStats {
            total_items: count("SELECT COUNT(*) FROM items")?,
            pending_items: count("SELECT COUNT(*) FROM items WHERE status = 'pending'")?,
            synced_items: count("SELECT COUNT(*) FROM items WHERE status = 'synced'")?,
            rejected_items: count("SELECT COUNT(*) FROM items WHERE status = 'rejected'")?,
            decision_count: self.count_decisions()?,
            manual_review_count: self.count_manual_review()?,
        })
    }

    /// Per-category active/rejected breakdown
    pub fn category_breakdown(&self) -> Result<Vec<CategoryCount>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT category,
                   SUM(CASE WHEN status != 'rejected' THEN 1 ELSE 0 END),
                   SUM(CASE WHEN status = 'rejected' THEN 1 ELSE 0 END)
            FROM items
            GROUP BY category
            ORDER BY category
            "#,
        )?;

        let counts = stmt
            .query_map([], |row| {
                Ok(CategoryCount {
                    category: row.get(0)?,
                    active: row.get::<_, i64>(1)? as usize,
                    rejected: row.get::<_, i64>(2)? as usize,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(counts)
    }

    // === Row mapping ===

    /// Convert a database row to an Item
    fn row_to_item(row: &rusqlite::Row) -> rusqlite::Result<Item> {
        let id_str: String = row.get("id")?;
        let status_str: String = row.get("status")?;
        let canonical_str: Option<String> = row.get("canonical_of")?;
        let created_str: String = row.get("created_at")?;
        let updated_str: String = row.get("updated_at")?;

        Ok(Item {
            id: Ulid::from_string(&id_str).unwrap_or_else(|_| Ulid::new()),
            category: row.get("category")?,
            title: row.get("title")?,
            body: row.get("body")?,
            embedding_ref: row.get("embedding_ref")?,
            status: status_str.parse().unwrap_or_default(),
            canonical_of: canonical_str.and_then(|s| Ulid::from_string(&s).ok()),
            created_at: parse_rfc3339(&created_str),
            updated_at: parse_rfc3339(&updated_str),
        })
    }

    /// Convert a database row to a DecisionRecord
    fn row_to_decision(row: &rusqlite::Row) -> rusqlite::Result<DecisionRecord> {
        let id_str: String = row.get("id")?;
        let subject_json: String = row.get("subject")?;
        let action_str: String = row.get("action")?;
        let actor_str: String = row.get("actor")?;
        let created_str: String = row.get("created_at")?;

        let subject: Vec<Ulid> = serde_json::from_str::<Vec<String>>(&subject_json)
            .unwrap_or_default()
            .iter()
            .filter_map(|s| Ulid::from_string(s).ok())
            .collect();

        Ok(DecisionRecord {
            id: Ulid::from_string(&id_str).unwrap_or_else(|_| Ulid::new()),
            session_id: row.get("session_id")?,
            round: row.get("round")?,
            subject,
            action: action_str.parse().unwrap_or(DecisionAction::KeepSeparate),
            actor: actor_str.parse().unwrap_or(DecisionActor::AutoThreshold),
            rationale: row.get("rationale")?,
            created_at: parse_rfc3339(&created_str),
        })
    }
}

fn parse_rfc3339(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

struct RawManualReview {
    id: String,
    category: String,
    members: String,
    reason: String,
    created_at: String,
}

impl RawManualReview {
    fn parse(self) -> Result<ManualReviewEntry> {
        let members: Vec<Ulid> = serde_json::from_str::<Vec<String>>(&self.members)?
            .iter()
            .filter_map(|s| Ulid::from_string(s).ok())
            .collect();
        Ok(ManualReviewEntry {
            id: Ulid::from_string(&self.id)
                .map_err(|e| anyhow::anyhow!("Invalid entry id '{}': {}", self.id, e))?,
            category: self.category,
            members,
            reason: self.reason,
            created_at: parse_rfc3339(&self.created_at),
        })
    }
}

/// A deferred group awaiting human review
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ManualReviewEntry {
    pub id: Ulid,
    pub category: String,
    pub members: Vec<Ulid>,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

/// Storage statistics
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StorageStats {
    pub total_items: usize,
    pub pending_items: usize,
    pub synced_items: usize,
    pub rejected_items: usize,
    pub decision_count: usize,
    pub manual_review_count: usize,
}

/// Vector provider backed by the precomputed `neighbors` table.
///
/// The table is maintained by the surrounding embedding pipeline. An
/// entirely empty table while items exist means the pipeline has not
/// run - that is treated as the provider being unavailable rather than
/// as "no duplicates anywhere".
pub struct StoredVectorProvider<'a> {
    storage: &'a Storage,
}

impl<'a> StoredVectorProvider<'a> {
    pub fn new(storage: &'a Storage) -> Result<Self, CurationError> {
        let items = storage
            .stats()
            .map_err(|e| CurationError::ProviderUnavailable(e.to_string()))?;
        let rows = storage
            .neighbor_count()
            .map_err(|e| CurationError::ProviderUnavailable(e.to_string()))?;

        if items.total_items > 0 && rows == 0 {
            return Err(CurationError::ProviderUnavailable(
                "neighbor table is empty; run the embedding pipeline first".into(),
            ));
        }

        Ok(Self { storage })
    }
}

impl VectorProvider for StoredVectorProvider<'_> {
    fn neighbors(&self, item: &Item, k: usize) -> Result<Vec<Neighbor>, CurationError> {
        self.storage
            .neighbors_of(&item.id, k)
            .map_err(|e| CurationError::ProviderUnavailable(e.to_string()))
    }
}


/// Per-category item counts
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub active: usize,
    pub rejected: usize,
}
