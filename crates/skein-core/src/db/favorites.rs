//! Per-user favorites: a `(story, page)` set, read by the navigation layer
//! only to compute the `favorited` flag. The engine never touches it.

use crate::model::{PageId, StoryId};
use anyhow::{Context, Result};
use rusqlite::{Connection, params};

/// A favorited page, as listed by `sk favorite list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Favorite {
    pub story: StoryId,
    pub page: PageId,
    pub created_at_us: i64,
}

/// Whether the user has favorited `(story, page)`.
///
/// # Errors
///
/// Returns an error if querying fails.
pub fn is_favorited(
    conn: &Connection,
    user: &str,
    story: &StoryId,
    page: &PageId,
) -> Result<bool> {
    conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM favorites
            WHERE user_id = ?1 AND story_id = ?2 AND page_id = ?3
         )",
        params![user, story.as_str(), page.as_str()],
        |row| row.get(0),
    )
    .context("query favorite")
}

/// Add a favorite. Returns `false` when it was already present.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn add_favorite(
    conn: &Connection,
    user: &str,
    story: &StoryId,
    page: &PageId,
    now_us: i64,
) -> Result<bool> {
    let inserted = conn
        .execute(
            "INSERT OR IGNORE INTO favorites (user_id, story_id, page_id, created_at_us)
             VALUES (?1, ?2, ?3, ?4)",
            params![user, story.as_str(), page.as_str(), now_us],
        )
        .context("insert favorite")?;
    Ok(inserted > 0)
}

/// Remove a favorite. Returns `false` when it was not present.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn remove_favorite(
    conn: &Connection,
    user: &str,
    story: &StoryId,
    page: &PageId,
) -> Result<bool> {
    let removed = conn
        .execute(
            "DELETE FROM favorites WHERE user_id = ?1 AND story_id = ?2 AND page_id = ?3",
            params![user, story.as_str(), page.as_str()],
        )
        .context("delete favorite")?;
    Ok(removed > 0)
}

/// All of a user's favorites, newest first.
///
/// # Errors
///
/// Returns an error if querying fails.
pub fn list_favorites(conn: &Connection, user: &str) -> Result<Vec<Favorite>> {
    let mut stmt = conn
        .prepare(
            "SELECT story_id, page_id, created_at_us FROM favorites
             WHERE user_id = ?1
             ORDER BY created_at_us DESC, story_id ASC, page_id ASC",
        )
        .context("prepare favorites listing")?;

    let rows = stmt
        .query_map(params![user], |row| {
            Ok(Favorite {
                story: StoryId(row.get(0)?),
                page: PageId(row.get(1)?),
                created_at_us: row.get(2)?,
            })
        })
        .context("query favorites")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("read favorite row")?);
    }
    Ok(out)
}
