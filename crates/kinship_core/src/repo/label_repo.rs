//! Label set repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist one ordered label list per row in `label_sets`.
//! - Serialize label order as a JSON array so positions survive round-trips.
//!
//! # Invariants
//! - Reads return every row matching the item, so callers can detect
//!   duplicate label sets.
//! - `replace_labels` touches at most one row (the oldest for the item).

use super::schema::ensure_table;
use super::{parse_uuid, RepoError, RepoResult};
use crate::model::label::LabelSet;
use crate::model::ItemId;
use rusqlite::{params, Connection, Row};

/// Repository interface for label sets.
pub trait LabelRepository {
    /// Inserts one label set row.
    fn create_label_set(&self, set: &LabelSet) -> RepoResult<()>;
    /// Returns all label set rows stored for `item`, oldest first.
    fn find_label_sets(&self, item: ItemId) -> RepoResult<Vec<LabelSet>>;
    /// Overwrites the label list of one row for `item`.
    ///
    /// Returns the number of rows changed (`0` when no row exists).
    fn replace_labels(&self, item: ItemId, labels: &[String]) -> RepoResult<usize>;
}

/// SQLite-backed label repository.
pub struct SqliteLabelRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLabelRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table(conn, "label_sets", &["id", "item_uuid", "labels"])?;
        Ok(Self { conn })
    }
}

impl LabelRepository for SqliteLabelRepository<'_> {
    fn create_label_set(&self, set: &LabelSet) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO label_sets (item_uuid, labels) VALUES (?1, ?2);",
            params![set.item.to_string(), encode_labels(&set.labels)?],
        )?;
        Ok(())
    }

    fn find_label_sets(&self, item: ItemId) -> RepoResult<Vec<LabelSet>> {
        let mut stmt = self.conn.prepare(
            "SELECT item_uuid, labels
             FROM label_sets
             WHERE item_uuid = ?1
             ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([item.to_string()])?;
        let mut sets = Vec::new();
        while let Some(row) = rows.next()? {
            sets.push(parse_label_set_row(row)?);
        }
        Ok(sets)
    }

    fn replace_labels(&self, item: ItemId, labels: &[String]) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "UPDATE label_sets
             SET
                labels = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = (
                SELECT id FROM label_sets WHERE item_uuid = ?1 ORDER BY id ASC LIMIT 1
             );",
            params![item.to_string(), encode_labels(labels)?],
        )?;
        Ok(changed)
    }
}

fn encode_labels(labels: &[String]) -> RepoResult<String> {
    serde_json::to_string(labels)
        .map_err(|err| RepoError::InvalidData(format!("cannot encode label list: {err}")))
}

fn parse_label_set_row(row: &Row<'_>) -> RepoResult<LabelSet> {
    let item_text: String = row.get("item_uuid")?;
    let labels_text: String = row.get("labels")?;
    let labels = serde_json::from_str::<Vec<String>>(&labels_text).map_err(|err| {
        RepoError::InvalidData(format!(
            "invalid label list for item `{item_text}` in label_sets.labels: {err}"
        ))
    })?;

    Ok(LabelSet {
        item: parse_uuid(&item_text, "label_sets.item_uuid")?,
        labels,
    })
}
