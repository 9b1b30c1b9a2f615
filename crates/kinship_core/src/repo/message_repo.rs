//! Message content and distribution record repositories.
//!
//! # Responsibility
//! - Store authored message payloads (`message_contents`) separately from
//!   their deliveries (`distribution_records`).
//! - Answer record queries by content, party, conversation and sender.
//!
//! # Invariants
//! - Content rows are insert-only.
//! - `insert_record` never checks for an existing record; only
//!   `insert_record_exclusive` does, inside an immediate transaction.

use super::schema::ensure_table;
use super::{parse_optional_uuid, parse_uuid, RepoResult};
use crate::model::message::{ContentId, DistributionRecord, MessageContent};
use crate::model::UserId;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};

const RECORD_SELECT_SQL: &str = "SELECT
    sender_uuid,
    receiver_uuid,
    content_uuid
FROM distribution_records";

const CONTENT_SELECT_SQL: &str = "SELECT
    uuid,
    item_uuid,
    body
FROM message_contents";

/// Exact-match filters over distribution records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFilter {
    /// Every stored record.
    All,
    /// Records delivering one content.
    Content(ContentId),
    /// Records where the user is sender or receiver.
    Party(UserId),
    /// Records exchanged between two users in either direction.
    Between(UserId, UserId),
    /// Records where the user is the sender.
    SentBy(UserId),
}

/// Repository interface for message contents and deliveries.
pub trait MessageRepository {
    /// Inserts one content row and returns its id.
    fn insert_content(&self, content: &MessageContent) -> RepoResult<ContentId>;
    /// Gets one content by id.
    fn get_content(&self, id: ContentId) -> RepoResult<Option<MessageContent>>;
    /// Returns the contents referenced by any record involving `user`, in
    /// storage order. Records pointing at missing content are skipped.
    fn list_contents_for_user(&self, user: UserId) -> RepoResult<Vec<MessageContent>>;
    /// Returns every stored content, in storage order.
    fn list_all_contents(&self) -> RepoResult<Vec<MessageContent>>;
    /// Inserts one delivery record unconditionally.
    fn insert_record(&self, record: &DistributionRecord) -> RepoResult<()>;
    /// Inserts one delivery record unless the content already has one.
    ///
    /// Returns `false` without writing when a record already exists.
    fn insert_record_exclusive(&self, record: &DistributionRecord) -> RepoResult<bool>;
    /// Returns records matching `filter`, in storage order.
    fn list_records(&self, filter: RecordFilter) -> RepoResult<Vec<DistributionRecord>>;
    /// Deletes the records for `content` and returns how many matched.
    ///
    /// When more than one record matches the deletion is rolled back, so
    /// duplicate deliveries stay visible to readers.
    fn delete_records(&self, content: ContentId) -> RepoResult<usize>;
}

/// SQLite-backed message repository.
pub struct SqliteMessageRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMessageRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table(conn, "message_contents", &["uuid", "item_uuid", "body"])?;
        ensure_table(
            conn,
            "distribution_records",
            &["sender_uuid", "receiver_uuid", "content_uuid"],
        )?;
        Ok(Self { conn })
    }
}

impl MessageRepository for SqliteMessageRepository<'_> {
    fn insert_content(&self, content: &MessageContent) -> RepoResult<ContentId> {
        self.conn.execute(
            "INSERT INTO message_contents (uuid, item_uuid, body) VALUES (?1, ?2, ?3);",
            params![
                content.id.to_string(),
                content.item.map(|item| item.to_string()),
                content.text.as_deref(),
            ],
        )?;
        Ok(content.id)
    }

    fn get_content(&self, id: ContentId) -> RepoResult<Option<MessageContent>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CONTENT_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_content_row(row)?));
        }
        Ok(None)
    }

    fn list_contents_for_user(&self, user: UserId) -> RepoResult<Vec<MessageContent>> {
        let sql = format!(
            "{CONTENT_SELECT_SQL}
WHERE uuid IN (
    SELECT content_uuid
    FROM distribution_records
    WHERE sender_uuid = ?1 OR receiver_uuid = ?1
)
ORDER BY rowid ASC;"
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([user.to_string()])?;
        let mut contents = Vec::new();
        while let Some(row) = rows.next()? {
            contents.push(parse_content_row(row)?);
        }
        Ok(contents)
    }

    fn list_all_contents(&self) -> RepoResult<Vec<MessageContent>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CONTENT_SELECT_SQL} ORDER BY rowid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut contents = Vec::new();
        while let Some(row) = rows.next()? {
            contents.push(parse_content_row(row)?);
        }
        Ok(contents)
    }

    fn insert_record(&self, record: &DistributionRecord) -> RepoResult<()> {
        insert_record_row(self.conn, record)
    }

    fn insert_record_exclusive(&self, record: &DistributionRecord) -> RepoResult<bool> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let exists: i64 = tx.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM distribution_records WHERE content_uuid = ?1
            );",
            [record.content.to_string()],
            |row| row.get(0),
        )?;
        if exists == 1 {
            tx.rollback()?;
            return Ok(false);
        }

        insert_record_row(&tx, record)?;
        tx.commit()?;
        Ok(true)
    }

    fn list_records(&self, filter: RecordFilter) -> RepoResult<Vec<DistributionRecord>> {
        let (clause, bind_values) = record_filter_clause(filter);
        let sql = format!("{RECORD_SELECT_SQL}{clause} ORDER BY id ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_record_row(row)?);
        }
        Ok(records)
    }

    fn delete_records(&self, content: ContentId) -> RepoResult<usize> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let deleted = tx.execute(
            "DELETE FROM distribution_records WHERE content_uuid = ?1;",
            [content.to_string()],
        )?;
        if deleted > 1 {
            tx.rollback()?;
        } else {
            tx.commit()?;
        }
        Ok(deleted)
    }
}

fn insert_record_row(conn: &Connection, record: &DistributionRecord) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO distribution_records (sender_uuid, receiver_uuid, content_uuid)
         VALUES (?1, ?2, ?3);",
        params![
            record.sender.to_string(),
            record.receiver.to_string(),
            record.content.to_string(),
        ],
    )?;
    Ok(())
}

fn record_filter_clause(filter: RecordFilter) -> (&'static str, Vec<Value>) {
    let text = |id: uuid::Uuid| Value::Text(id.to_string());
    match filter {
        RecordFilter::All => ("", Vec::new()),
        RecordFilter::Content(content) => (" WHERE content_uuid = ?", vec![text(content)]),
        RecordFilter::Party(user) => (
            " WHERE sender_uuid = ? OR receiver_uuid = ?",
            vec![text(user), text(user)],
        ),
        RecordFilter::Between(first, second) => (
            " WHERE (sender_uuid = ? AND receiver_uuid = ?)
                 OR (sender_uuid = ? AND receiver_uuid = ?)",
            vec![text(first), text(second), text(second), text(first)],
        ),
        RecordFilter::SentBy(user) => (" WHERE sender_uuid = ?", vec![text(user)]),
    }
}

fn parse_content_row(row: &Row<'_>) -> RepoResult<MessageContent> {
    let uuid_text: String = row.get("uuid")?;
    Ok(MessageContent {
        id: parse_uuid(&uuid_text, "message_contents.uuid")?,
        item: parse_optional_uuid(row.get("item_uuid")?, "message_contents.item_uuid")?,
        text: row.get("body")?,
    })
}

fn parse_record_row(row: &Row<'_>) -> RepoResult<DistributionRecord> {
    let sender: String = row.get("sender_uuid")?;
    let receiver: String = row.get("receiver_uuid")?;
    let content: String = row.get("content_uuid")?;
    Ok(DistributionRecord {
        sender: parse_uuid(&sender, "distribution_records.sender_uuid")?,
        receiver: parse_uuid(&receiver, "distribution_records.receiver_uuid")?,
        content: parse_uuid(&content, "distribution_records.content_uuid")?,
    })
}
