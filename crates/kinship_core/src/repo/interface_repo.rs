//! Interface mode repository contracts and SQLite implementation.

use super::schema::ensure_table;
use super::{parse_uuid, RepoError, RepoResult};
use crate::model::interface::{InterfaceId, InterfaceMode, InterfaceRecord};
use crate::model::UserId;
use rusqlite::{params, Connection, Row};

const INTERFACE_SELECT_SQL: &str = "SELECT
    uuid,
    user_uuid,
    mode
FROM interfaces";

/// Repository interface for per-user interface records.
pub trait InterfaceRepository {
    fn create_interface(&self, record: &InterfaceRecord) -> RepoResult<InterfaceId>;
    /// Gets the (oldest) record stored for `user`.
    fn find_by_user(&self, user: UserId) -> RepoResult<Option<InterfaceRecord>>;
    fn find_by_id(&self, id: InterfaceId) -> RepoResult<Option<InterfaceRecord>>;
    /// Sets the mode of the user's record; returns rows changed.
    fn update_mode(&self, user: UserId, mode: InterfaceMode) -> RepoResult<usize>;
}

/// SQLite-backed interface repository.
pub struct SqliteInterfaceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteInterfaceRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table(conn, "interfaces", &["uuid", "user_uuid", "mode"])?;
        Ok(Self { conn })
    }

    fn find_one(&self, column: &str, value: String) -> RepoResult<Option<InterfaceRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{INTERFACE_SELECT_SQL} WHERE {column} = ?1 ORDER BY rowid ASC LIMIT 1;"
        ))?;
        let mut rows = stmt.query([value])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_interface_row(row)?));
        }
        Ok(None)
    }
}

impl InterfaceRepository for SqliteInterfaceRepository<'_> {
    fn create_interface(&self, record: &InterfaceRecord) -> RepoResult<InterfaceId> {
        self.conn.execute(
            "INSERT INTO interfaces (uuid, user_uuid, mode) VALUES (?1, ?2, ?3);",
            params![
                record.id.to_string(),
                record.user.to_string(),
                record.mode.to_db(),
            ],
        )?;
        Ok(record.id)
    }

    fn find_by_user(&self, user: UserId) -> RepoResult<Option<InterfaceRecord>> {
        self.find_one("user_uuid", user.to_string())
    }

    fn find_by_id(&self, id: InterfaceId) -> RepoResult<Option<InterfaceRecord>> {
        self.find_one("uuid", id.to_string())
    }

    fn update_mode(&self, user: UserId, mode: InterfaceMode) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "UPDATE interfaces
             SET
                mode = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE rowid = (
                SELECT rowid FROM interfaces WHERE user_uuid = ?1 ORDER BY rowid ASC LIMIT 1
             );",
            params![user.to_string(), mode.to_db()],
        )?;
        Ok(changed)
    }
}

fn parse_interface_row(row: &Row<'_>) -> RepoResult<InterfaceRecord> {
    let uuid_text: String = row.get("uuid")?;
    let user_text: String = row.get("user_uuid")?;
    let mode_text: String = row.get("mode")?;
    let mode = InterfaceMode::from_db(&mode_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid interface mode `{mode_text}` in interfaces.mode"))
    })?;

    Ok(InterfaceRecord {
        id: parse_uuid(&uuid_text, "interfaces.uuid")?,
        user: parse_uuid(&user_text, "interfaces.user_uuid")?,
        mode,
    })
}
