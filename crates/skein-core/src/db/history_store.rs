//! Per-user history collection persistence.
//!
//! The collection is loaded whole and saved whole: the engine owns the
//! in-memory value between the two, and the save carries the version read
//! at load time. A mismatch at save time means another request committed in
//! between; nothing is written and the caller retries the whole
//! read-modify-write. Combined with the per-user advisory lock this keeps
//! merges and forks from being computed against a stale collection.

use crate::error::StoreError;
use crate::model::{History, PageId, StoryId};
use rusqlite::{Connection, OptionalExtension, params};

/// One user's histories plus the version to echo back at save time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedHistories {
    pub histories: Vec<History>,
    pub version: i64,
}

/// Load a user's full history collection in insertion order.
///
/// An unknown user loads as an empty collection at version 0.
///
/// # Errors
///
/// [`StoreError::CorruptHistory`] when a stored record fails validation;
/// otherwise SQLite/encoding failures.
pub fn load_histories(conn: &Connection, user: &str) -> Result<LoadedHistories, StoreError> {
    let version: i64 = conn
        .query_row(
            "SELECT history_version FROM users WHERE user_id = ?1",
            params![user],
            |row| row.get(0),
        )
        .optional()?
        .unwrap_or(0);

    let mut stmt = conn.prepare(
        "SELECT story_id, pages_json, last_updated_us FROM histories
         WHERE user_id = ?1 ORDER BY position ASC",
    )?;
    let rows = stmt.query_map(params![user], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, i64>(2)?,
        ))
    })?;

    let mut histories = Vec::new();
    for row in rows {
        let (story, pages_json, last_updated_us) = row?;
        let pages: Vec<PageId> = serde_json::from_str(&pages_json)?;
        let history = History {
            story: StoryId(story),
            pages,
            last_updated_us,
        };
        history.check().map_err(|detail| StoreError::CorruptHistory {
            user: user.to_string(),
            detail,
        })?;
        histories.push(history);
    }

    Ok(LoadedHistories { histories, version })
}

/// Rewrite a user's history rows and bump `history_version`.
///
/// Meant to run inside the caller's transaction (a
/// [`rusqlite::Transaction`] derefs to `Connection`), so the activity
/// append of the same visit commits or rolls back together with the save.
///
/// # Errors
///
/// [`StoreError::VersionConflict`] when `expected_version` no longer
/// matches; the caller must treat the computation as uncommitted.
pub fn save_histories(
    conn: &Connection,
    user: &str,
    histories: &[History],
    expected_version: i64,
) -> Result<(), StoreError> {
    conn.execute(
        "INSERT OR IGNORE INTO users (user_id, history_version) VALUES (?1, 0)",
        params![user],
    )?;

    let current: i64 = conn.query_row(
        "SELECT history_version FROM users WHERE user_id = ?1",
        params![user],
        |row| row.get(0),
    )?;
    if current != expected_version {
        return Err(StoreError::VersionConflict {
            user: user.to_string(),
        });
    }

    conn.execute("DELETE FROM histories WHERE user_id = ?1", params![user])?;
    for (position, history) in histories.iter().enumerate() {
        let pages_json = serde_json::to_string(&history.pages)?;
        conn.execute(
            "INSERT INTO histories (user_id, position, story_id, pages_json, last_updated_us)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user,
                position as i64,
                history.story.as_str(),
                pages_json,
                history.last_updated_us
            ],
        )?;
    }

    conn.execute(
        "UPDATE users SET history_version = ?1 WHERE user_id = ?2",
        params![expected_version + 1, user],
    )?;

    Ok(())
}
