//! Timeline repository contract and SQLite implementation.
//!
//! # Invariants
//! - `save` is an upsert keyed by owner; `created_at` survives updates.
//! - Stored JSON is decoded with the same defaults as any loaded document.

use crate::db::DbError;
use crate::model::document::{DocumentError, TimelineData};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Stored JSON is not a readable timeline document.
    InvalidDocument { owner_id: String, source: DocumentError },
    Encode(serde_json::Error),
    /// Owner ids are non-blank.
    EmptyOwner,
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidDocument { owner_id, source } => {
                write!(f, "stored timeline for `{owner_id}` is unreadable: {source}")
            }
            Self::Encode(err) => write!(f, "cannot encode timeline: {err}"),
            Self::EmptyOwner => write!(f, "owner id must not be blank"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidDocument { source, .. } => Some(source),
            Self::Encode(err) => Some(err),
            Self::EmptyOwner => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Stored row metadata, for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredTimeline {
    pub owner_id: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    pub updated_at: i64,
}

/// Persistence contract for whole timeline documents.
pub trait TimelineRepository {
    fn load(&self, owner_id: &str) -> RepoResult<Option<TimelineData>>;
    fn save(&self, owner_id: &str, data: &TimelineData) -> RepoResult<()>;
    fn delete(&self, owner_id: &str) -> RepoResult<bool>;
    fn list(&self) -> RepoResult<Vec<StoredTimeline>>;
}

/// SQLite-backed timeline repository.
pub struct SqliteTimelineRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTimelineRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TimelineRepository for SqliteTimelineRepository<'_> {
    fn load(&self, owner_id: &str) -> RepoResult<Option<TimelineData>> {
        let owner_id = normalize_owner(owner_id)?;
        let stored: Option<String> = self
            .conn
            .query_row(
                "SELECT data FROM timelines WHERE owner_id = ?1;",
                params![owner_id],
                |row| row.get(0),
            )
            .optional()?;

        stored
            .map(|text| {
                TimelineData::from_json(&text).map_err(|source| RepoError::InvalidDocument {
                    owner_id: owner_id.to_string(),
                    source,
                })
            })
            .transpose()
    }

    fn save(&self, owner_id: &str, data: &TimelineData) -> RepoResult<()> {
        let owner_id = normalize_owner(owner_id)?;
        let json = serde_json::to_string(data).map_err(RepoError::Encode)?;
        let now = Utc::now().timestamp_millis();
        self.conn.execute(
            "INSERT INTO timelines (owner_id, data, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)
             ON CONFLICT(owner_id) DO UPDATE SET
                data = excluded.data,
                updated_at = excluded.updated_at;",
            params![owner_id, json, now],
        )?;
        Ok(())
    }

    fn delete(&self, owner_id: &str) -> RepoResult<bool> {
        let owner_id = normalize_owner(owner_id)?;
        let changed = self
            .conn
            .execute("DELETE FROM timelines WHERE owner_id = ?1;", params![owner_id])?;
        Ok(changed > 0)
    }

    fn list(&self) -> RepoResult<Vec<StoredTimeline>> {
        let mut stmt = self.conn.prepare(
            "SELECT owner_id, created_at, updated_at
             FROM timelines
             ORDER BY updated_at DESC, owner_id ASC;",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(StoredTimeline {
                owner_id: row.get(0)?,
                created_at: row.get(1)?,
                updated_at: row.get(2)?,
            })
        })?;
        let mut listed = Vec::new();
        for row in rows {
            listed.push(row?);
        }
        Ok(listed)
    }
}

fn normalize_owner(owner_id: &str) -> RepoResult<&str> {
    let trimmed = owner_id.trim();
    if trimmed.is_empty() {
        return Err(RepoError::EmptyOwner);
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::{RepoError, SqliteTimelineRepository, TimelineRepository};
    use crate::db::open_db_in_memory;
    use crate::model::document::TimelineData;

    #[test]
    fn missing_owner_loads_none() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteTimelineRepository::new(&conn);
        assert!(repo.load("nobody").unwrap().is_none());
    }

    #[test]
    fn save_twice_keeps_one_row_with_latest_data() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteTimelineRepository::new(&conn);
        let mut data = TimelineData::default();
        repo.save("owner", &data).unwrap();
        data.current_age = 31.0;
        data.selected_periodization = Some("erikson".to_string());
        repo.save(" owner ", &data).unwrap();

        assert_eq!(repo.list().unwrap().len(), 1);
        assert_eq!(repo.load("owner").unwrap(), Some(data));
    }

    #[test]
    fn unreadable_rows_are_reported() {
        let conn = open_db_in_memory().unwrap();
        conn.execute(
            "INSERT INTO timelines (owner_id, data, created_at, updated_at) VALUES ('o', '{bad', 0, 0);",
            [],
        )
        .unwrap();
        let repo = SqliteTimelineRepository::new(&conn);
        assert!(matches!(
            repo.load("o").unwrap_err(),
            RepoError::InvalidDocument { .. }
        ));
    }

    #[test]
    fn blank_owner_is_rejected_and_delete_reports_presence() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteTimelineRepository::new(&conn);
        assert!(matches!(repo.load("  ").unwrap_err(), RepoError::EmptyOwner));
        repo.save("o", &TimelineData::default()).unwrap();
        assert!(repo.delete("o").unwrap());
        assert!(!repo.delete("o").unwrap());
    }
}
