//! Append-only visit activity log.
//!
//! One record per non-preview, non-guest visit, appended in the same
//! transaction as the history save so the two never drift apart.

use crate::model::{PageId, StoryId};
use anyhow::{Context, Result};
use rusqlite::{Connection, params};

/// One logged page visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityRecord {
    pub ts_us: i64,
    pub story: StoryId,
    pub page: PageId,
}

/// Append one visit record.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn append_activity(
    conn: &Connection,
    user: &str,
    ts_us: i64,
    story: &StoryId,
    page: &PageId,
) -> Result<()> {
    conn.execute(
        "INSERT INTO activity (user_id, ts_us, story_id, page_id) VALUES (?1, ?2, ?3, ?4)",
        params![user, ts_us, story.as_str(), page.as_str()],
    )
    .context("append activity record")?;
    Ok(())
}

/// The user's most recent visits, newest first.
///
/// # Errors
///
/// Returns an error if querying fails.
pub fn recent_activity(conn: &Connection, user: &str, limit: usize) -> Result<Vec<ActivityRecord>> {
    let mut stmt = conn
        .prepare(
            "SELECT ts_us, story_id, page_id FROM activity
             WHERE user_id = ?1
             ORDER BY ts_us DESC, id DESC
             LIMIT ?2",
        )
        .context("prepare activity listing")?;

    let rows = stmt
        .query_map(params![user, limit as i64], |row| {
            Ok(ActivityRecord {
                ts_us: row.get(0)?,
                story: StoryId(row.get(1)?),
                page: PageId(row.get(2)?),
            })
        })
        .context("query activity")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("read activity row")?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{append_activity, recent_activity};
    use crate::model::{PageId, StoryId};
    use rusqlite::Connection;

    fn test_conn() -> Connection {
        let mut conn = Connection::open_in_memory().expect("open in-memory db");
        crate::db::migrations::migrate(&mut conn).expect("migrate");
        conn
    }

    #[test]
    fn records_come_back_newest_first_and_limited() {
        let conn = test_conn();
        let story = StoryId::from("s1");
        for (i, page) in ["a", "b", "c"].iter().enumerate() {
            append_activity(&conn, "alice", 1_000 + i as i64, &story, &PageId::from(*page))
                .expect("append");
        }

        let recent = recent_activity(&conn, "alice", 2).expect("list");
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].page, PageId::from("c"));
        assert_eq!(recent[1].page, PageId::from("b"));
    }

    #[test]
    fn users_do_not_see_each_other() {
        let conn = test_conn();
        append_activity(&conn, "alice", 1, &StoryId::from("s1"), &PageId::from("a"))
            .expect("append");

        assert!(recent_activity(&conn, "bob", 10).expect("list").is_empty());
    }
}
