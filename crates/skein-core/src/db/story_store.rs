//! Story graph persistence and read-side lookups.
//!
//! The engine never touches these: page existence is validated by the
//! navigation layer before an event is built. All functions take a
//! `&Connection` (or `&mut` for writes) and return typed structs, never raw
//! rows.

use crate::model::{Page, PageId, PageLink, Story, StoryId};
use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::BTreeMap;

/// A story row with its page count, as listed by `sk stories`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorySummary {
    pub id: StoryId,
    pub title: String,
    pub root: PageId,
    pub page_count: usize,
    pub created_at_us: i64,
}

/// Insert or replace a validated story graph.
///
/// Replacing rewrites the full page set; readers' history records keep
/// their page ids and are intentionally left alone.
///
/// # Errors
///
/// Returns an error if any statement fails; the transaction rolls back.
pub fn put_story(conn: &mut Connection, story: &Story, now_us: i64) -> Result<()> {
    let tx = conn.transaction().context("begin story transaction")?;

    tx.execute(
        "INSERT INTO stories (story_id, title, root_id, created_at_us)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(story_id) DO UPDATE SET title = ?2, root_id = ?3",
        params![
            story.id.as_str(),
            story.title,
            story.root.as_str(),
            now_us
        ],
    )
    .context("upsert story row")?;

    tx.execute(
        "DELETE FROM pages WHERE story_id = ?1",
        params![story.id.as_str()],
    )
    .context("clear prior pages")?;

    for page in story.pages.values() {
        tx.execute(
            "INSERT INTO pages (story_id, page_id, name, body) VALUES (?1, ?2, ?3, ?4)",
            params![story.id.as_str(), page.id.as_str(), page.name, page.body],
        )
        .with_context(|| format!("insert page {}", page.id))?;

        for (position, link) in page.links.iter().enumerate() {
            tx.execute(
                "INSERT INTO page_links (story_id, page_id, position, target_id, label)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    story.id.as_str(),
                    page.id.as_str(),
                    position as i64,
                    link.target.as_str(),
                    link.label
                ],
            )
            .with_context(|| format!("insert link {} -> {}", page.id, link.target))?;
        }
    }

    tx.commit().context("commit story transaction")?;
    tracing::info!(story = %story.id, pages = story.pages.len(), "story stored");
    Ok(())
}

/// Load a full story graph, or `None` when the id is unknown.
///
/// # Errors
///
/// Returns an error if querying fails.
pub fn get_story(conn: &Connection, id: &StoryId) -> Result<Option<Story>> {
    let header: Option<(String, String)> = conn
        .query_row(
            "SELECT title, root_id FROM stories WHERE story_id = ?1",
            params![id.as_str()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()
        .context("query story header")?;

    let Some((title, root_id)) = header else {
        return Ok(None);
    };

    let mut pages: BTreeMap<PageId, Page> = BTreeMap::new();
    {
        let mut stmt = conn
            .prepare("SELECT page_id, name, body FROM pages WHERE story_id = ?1")
            .context("prepare page query")?;
        let rows = stmt
            .query_map(params![id.as_str()], |row| {
                Ok(Page {
                    id: PageId(row.get(0)?),
                    name: row.get(1)?,
                    body: row.get(2)?,
                    links: Vec::new(),
                })
            })
            .context("query pages")?;
        for page in rows {
            let page = page.context("read page row")?;
            pages.insert(page.id.clone(), page);
        }
    }

    {
        let mut stmt = conn
            .prepare(
                "SELECT page_id, target_id, label FROM page_links
                 WHERE story_id = ?1 ORDER BY page_id, position",
            )
            .context("prepare link query")?;
        let rows = stmt
            .query_map(params![id.as_str()], |row| {
                Ok((
                    PageId(row.get::<_, String>(0)?),
                    PageLink {
                        target: PageId(row.get(1)?),
                        label: row.get(2)?,
                    },
                ))
            })
            .context("query links")?;
        for link in rows {
            let (page_id, link) = link.context("read link row")?;
            if let Some(page) = pages.get_mut(&page_id) {
                page.links.push(link);
            }
        }
    }

    Ok(Some(Story {
        id: id.clone(),
        title,
        root: PageId(root_id),
        pages,
    }))
}

/// The root page id of a story, or `None` when the id is unknown.
///
/// # Errors
///
/// Returns an error if querying fails.
pub fn get_root(conn: &Connection, id: &StoryId) -> Result<Option<PageId>> {
    conn.query_row(
        "SELECT root_id FROM stories WHERE story_id = ?1",
        params![id.as_str()],
        |row| row.get::<_, String>(0).map(PageId),
    )
    .optional()
    .context("query story root")
}

/// Whether `page` names a page of `story`.
///
/// # Errors
///
/// Returns an error if querying fails.
pub fn page_exists(conn: &Connection, story: &StoryId, page: &PageId) -> Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM pages WHERE story_id = ?1 AND page_id = ?2)",
        params![story.as_str(), page.as_str()],
        |row| row.get(0),
    )
    .context("query page existence")
}

/// All stored stories, newest first.
///
/// # Errors
///
/// Returns an error if querying fails.
pub fn list_stories(conn: &Connection) -> Result<Vec<StorySummary>> {
    let mut stmt = conn
        .prepare(
            "SELECT s.story_id, s.title, s.root_id, s.created_at_us,
                    (SELECT COUNT(*) FROM pages p WHERE p.story_id = s.story_id)
             FROM stories s
             ORDER BY s.created_at_us DESC, s.story_id ASC",
        )
        .context("prepare story listing")?;

    let rows = stmt
        .query_map([], |row| {
            Ok(StorySummary {
                id: StoryId(row.get(0)?),
                title: row.get(1)?,
                root: PageId(row.get(2)?),
                created_at_us: row.get(3)?,
                page_count: row.get::<_, i64>(4)?.max(0) as usize,
            })
        })
        .context("query stories")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("read story row")?);
    }
    Ok(out)
}
