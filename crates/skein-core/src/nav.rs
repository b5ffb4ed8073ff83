//! Navigation request handling.
//!
//! The thin layer between a transport (the CLI) and the engine: it
//! validates the story graph side of a request, builds the navigation
//! event, runs the engine under the per-user lock, and persists the result
//! plus the activity record in one transaction. The engine's computation is
//! committed only if the save succeeds; a version conflict leaves the store
//! untouched and the whole read-modify-write may be retried.

use crate::config::{ProjectConfig, locks_dir};
use crate::db::{activity, favorites, history_store, story_store};
use crate::engine::{self, NavEvent, Visitor};
use crate::error::{NavError, StoreError};
use crate::lock::UserLock;
use crate::model::{History, Page, PageId, StoryId, UserId};
use rusqlite::Connection;
use std::path::Path;

/// Where in the story the request points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageTarget {
    /// The story's root page, no prior path context.
    Root,
    /// An in-story link was followed.
    Linked {
        page: PageId,
        prev_page: PageId,
        history_id: Option<usize>,
        forward: bool,
    },
    /// Arrival without path context (e.g. a pasted URL).
    External { page: PageId },
}

/// One inbound page request, as translated by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitRequest {
    pub story: StoryId,
    pub target: PageTarget,
    /// `None` means a guest: nothing is recorded.
    pub user: Option<UserId>,
    pub preview: bool,
}

/// Everything a renderer needs for the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitOutcome {
    pub story: StoryId,
    pub story_title: String,
    pub page: Page,
    /// Index of the active history. Valid only within this request;
    /// `None` for guest/preview visits.
    pub active_history: Option<usize>,
    pub back: Option<PageId>,
    pub favorited: bool,
    pub guest: bool,
    pub preview: bool,
}

/// Handle one page visit end to end.
///
/// # Errors
///
/// [`NavError::StoryNotFound`] / [`NavError::PageNotFound`] for unknown
/// graph ids; lock and store failures otherwise. Version conflicts
/// propagate as retryable [`StoreError::VersionConflict`].
pub fn handle_visit(
    conn: &mut Connection,
    project_root: &Path,
    config: &ProjectConfig,
    req: &VisitRequest,
    now_us: i64,
) -> Result<VisitOutcome, NavError> {
    let story = story_store::get_story(conn, &req.story)?.ok_or_else(|| {
        NavError::StoryNotFound {
            story: req.story.to_string(),
        }
    })?;

    let page_id = match &req.target {
        PageTarget::Root => story.root.clone(),
        PageTarget::Linked { page, .. } | PageTarget::External { page } => {
            if !story.page_exists(page) {
                return Err(NavError::PageNotFound {
                    story: req.story.to_string(),
                    page: page.to_string(),
                });
            }
            page.clone()
        }
    };

    let event = match &req.target {
        PageTarget::Root => NavEvent::Root {
            story: story.id.clone(),
            page: page_id.clone(),
        },
        PageTarget::External { .. } => NavEvent::External {
            story: story.id.clone(),
            page: page_id.clone(),
        },
        PageTarget::Linked {
            prev_page,
            history_id,
            forward,
            ..
        } => NavEvent::Linked {
            story: story.id.clone(),
            page: page_id.clone(),
            prev_page: prev_page.clone(),
            history_id: *history_id,
            forward: *forward,
        },
    };

    let guest = req.user.is_none();
    let visitor = Visitor {
        preview: req.preview,
        guest,
    };

    let favorited = match &req.user {
        Some(user) => favorites::is_favorited(conn, user, &story.id, &page_id)?,
        None => false,
    };

    // A page is guaranteed present after the existence checks above.
    let page = story.page(&page_id).cloned().ok_or_else(|| {
        NavError::PageNotFound {
            story: req.story.to_string(),
            page: page_id.to_string(),
        }
    })?;

    if visitor.is_passive() {
        // Nothing is recorded; the back pointer falls back to the link's
        // stated previous page, when there is one.
        let back = match &req.target {
            PageTarget::Linked { prev_page, .. } => Some(prev_page.clone()),
            PageTarget::Root | PageTarget::External { .. } => None,
        };
        return Ok(VisitOutcome {
            story: story.id,
            story_title: story.title,
            page,
            active_history: None,
            back,
            favorited,
            guest,
            preview: req.preview,
        });
    }

    // Checked by is_passive: a non-passive visit always has a user.
    let user = req.user.clone().ok_or_else(|| {
        NavError::Io(anyhow::anyhow!("non-guest visit without a user"))
    })?;

    let _lock = UserLock::acquire(
        &locks_dir(project_root),
        &user,
        config.store.lock_timeout(),
    )?;

    let loaded = history_store::load_histories(conn, &user)?;
    let applied = engine::apply(loaded.histories, &event, visitor, now_us);

    let tx = conn.transaction().map_err(StoreError::from)?;
    history_store::save_histories(&tx, &user, &applied.histories, loaded.version)?;
    activity::append_activity(&tx, &user, now_us, &story.id, &page_id)?;
    tx.commit().map_err(StoreError::from)?;

    tracing::debug!(
        user = %user,
        story = %story.id,
        page = %page_id,
        active = ?applied.active,
        "visit recorded"
    );

    let back = applied
        .active
        .and_then(|idx| applied.histories.get(idx))
        .and_then(|h| h.back_of(&page_id))
        .cloned();

    Ok(VisitOutcome {
        story: story.id,
        story_title: story.title,
        page,
        active_history: applied.active,
        back,
        favorited,
        guest,
        preview: req.preview,
    })
}

/// The most recently updated history, optionally restricted to one story.
///
/// Ties keep the earlier-positioned record, so repeated calls are stable.
#[must_use]
pub fn most_recent<'a>(
    histories: &'a [History],
    story: Option<&StoryId>,
) -> Option<(usize, &'a History)> {
    histories
        .iter()
        .enumerate()
        .filter(|(_, h)| story.is_none_or(|s| h.story == *s))
        .reduce(|best, candidate| {
            if candidate.1.last_updated_us > best.1.last_updated_us {
                candidate
            } else {
                best
            }
        })
}

#[cfg(test)]
mod tests {
    use super::{PageTarget, VisitRequest, handle_visit, most_recent};
    use crate::config::ProjectConfig;
    use crate::error::{NavError, StoreError};
    use crate::model::{History, Page, PageId, PageLink, StoryDoc, StoryId};
    use rusqlite::Connection;
    use tempfile::TempDir;

    fn test_store(dir: &TempDir) -> Connection {
        crate::db::open_store(&dir.path().join(".skein").join("skein.db")).expect("open store")
    }

    fn seed_story(conn: &mut Connection) {
        let story = StoryDoc {
            id: StoryId::from("s1"),
            title: "Demo".into(),
            root: PageId::from("R"),
            pages: vec![
                Page {
                    id: PageId::from("R"),
                    name: "Root".into(),
                    body: "root".into(),
                    links: vec![
                        PageLink {
                            target: PageId::from("P"),
                            label: "to P".into(),
                        },
                        PageLink {
                            target: PageId::from("Q"),
                            label: "to Q".into(),
                        },
                    ],
                },
                Page {
                    id: PageId::from("P"),
                    name: "P".into(),
                    body: "p".into(),
                    links: vec![],
                },
                Page {
                    id: PageId::from("Q"),
                    name: "Q".into(),
                    body: "q".into(),
                    links: vec![],
                },
            ],
        }
        .validate()
        .expect("valid story");
        crate::db::story_store::put_story(conn, &story, 1_000).expect("put story");
    }

    fn visit(
        conn: &mut Connection,
        dir: &TempDir,
        target: PageTarget,
        user: Option<&str>,
        now_us: i64,
    ) -> Result<super::VisitOutcome, NavError> {
        handle_visit(
            conn,
            dir.path(),
            &ProjectConfig::default(),
            &VisitRequest {
                story: StoryId::from("s1"),
                target,
                user: user.map(str::to_string),
                preview: false,
            },
            now_us,
        )
    }

    #[test]
    fn unknown_story_is_not_found() {
        let dir = TempDir::new().expect("tempdir");
        let mut conn = test_store(&dir);
        let err = handle_visit(
            &mut conn,
            dir.path(),
            &ProjectConfig::default(),
            &VisitRequest {
                story: StoryId::from("ghost"),
                target: PageTarget::Root,
                user: Some("alice".into()),
                preview: false,
            },
            1_000,
        )
        .unwrap_err();
        assert!(matches!(err, NavError::StoryNotFound { .. }));
    }

    #[test]
    fn unknown_page_is_not_found() {
        let dir = TempDir::new().expect("tempdir");
        let mut conn = test_store(&dir);
        seed_story(&mut conn);

        let err = visit(
            &mut conn,
            &dir,
            PageTarget::External {
                page: PageId::from("ghost"),
            },
            Some("alice"),
            1_000,
        )
        .unwrap_err();
        assert!(matches!(err, NavError::PageNotFound { .. }));
    }

    #[test]
    fn root_visit_records_history_and_activity() {
        let dir = TempDir::new().expect("tempdir");
        let mut conn = test_store(&dir);
        seed_story(&mut conn);

        let out = visit(&mut conn, &dir, PageTarget::Root, Some("alice"), 2_000).expect("visit");
        assert_eq!(out.page.id, PageId::from("R"));
        assert_eq!(out.active_history, Some(0));
        assert_eq!(out.back, None);
        assert!(!out.guest);

        let loaded = crate::db::history_store::load_histories(&conn, "alice").expect("load");
        assert_eq!(loaded.histories.len(), 1);
        assert_eq!(loaded.histories[0].pages, vec![PageId::from("R")]);

        let activity = crate::db::activity::recent_activity(&conn, "alice", 10).expect("activity");
        assert_eq!(activity.len(), 1);
        assert_eq!(activity[0].page, PageId::from("R"));
    }

    #[test]
    fn linked_visit_resolves_the_back_pointer() {
        let dir = TempDir::new().expect("tempdir");
        let mut conn = test_store(&dir);
        seed_story(&mut conn);

        visit(&mut conn, &dir, PageTarget::Root, Some("alice"), 2_000).expect("root");
        let out = visit(
            &mut conn,
            &dir,
            PageTarget::Linked {
                page: PageId::from("P"),
                prev_page: PageId::from("R"),
                history_id: Some(0),
                forward: true,
            },
            Some("alice"),
            3_000,
        )
        .expect("linked");

        assert_eq!(out.active_history, Some(0));
        assert_eq!(out.back, Some(PageId::from("R")));
    }

    #[test]
    fn guest_visit_records_nothing_and_echoes_prev_page() {
        let dir = TempDir::new().expect("tempdir");
        let mut conn = test_store(&dir);
        seed_story(&mut conn);

        let out = visit(
            &mut conn,
            &dir,
            PageTarget::Linked {
                page: PageId::from("P"),
                prev_page: PageId::from("R"),
                history_id: None,
                forward: true,
            },
            None,
            2_000,
        )
        .expect("guest visit");

        assert!(out.guest);
        assert_eq!(out.active_history, None);
        assert_eq!(out.back, Some(PageId::from("R")));

        let loaded = crate::db::history_store::load_histories(&conn, "alice").expect("load");
        assert!(loaded.histories.is_empty());
    }

    #[test]
    fn preview_visit_records_nothing() {
        let dir = TempDir::new().expect("tempdir");
        let mut conn = test_store(&dir);
        seed_story(&mut conn);

        let out = handle_visit(
            &mut conn,
            dir.path(),
            &ProjectConfig::default(),
            &VisitRequest {
                story: StoryId::from("s1"),
                target: PageTarget::Root,
                user: Some("alice".into()),
                preview: true,
            },
            2_000,
        )
        .expect("preview visit");

        assert!(out.preview);
        assert_eq!(out.active_history, None);
        let loaded = crate::db::history_store::load_histories(&conn, "alice").expect("load");
        assert!(loaded.histories.is_empty());
        let activity = crate::db::activity::recent_activity(&conn, "alice", 10).expect("activity");
        assert!(activity.is_empty());
    }

    #[test]
    fn fork_scenario_end_to_end_through_the_store() {
        let dir = TempDir::new().expect("tempdir");
        let mut conn = test_store(&dir);
        seed_story(&mut conn);

        visit(&mut conn, &dir, PageTarget::Root, Some("alice"), 1_000).expect("root");
        visit(
            &mut conn,
            &dir,
            PageTarget::Linked {
                page: PageId::from("P"),
                prev_page: PageId::from("R"),
                history_id: Some(0),
                forward: true,
            },
            Some("alice"),
            2_000,
        )
        .expect("extend");
        let out = visit(
            &mut conn,
            &dir,
            PageTarget::Linked {
                page: PageId::from("Q"),
                prev_page: PageId::from("R"),
                history_id: Some(0),
                forward: true,
            },
            Some("alice"),
            3_000,
        )
        .expect("fork");

        assert_eq!(out.active_history, Some(1));
        let loaded = crate::db::history_store::load_histories(&conn, "alice").expect("load");
        assert_eq!(loaded.histories.len(), 2);
        assert_eq!(
            loaded.histories[0].pages,
            vec![PageId::from("R"), PageId::from("P")]
        );
        assert_eq!(
            loaded.histories[1].pages,
            vec![PageId::from("R"), PageId::from("Q")]
        );
    }

    #[test]
    fn version_conflict_surfaces_as_retryable() {
        let dir = TempDir::new().expect("tempdir");
        let mut conn = test_store(&dir);
        seed_story(&mut conn);
        visit(&mut conn, &dir, PageTarget::Root, Some("alice"), 1_000).expect("root");

        // Simulate a concurrent commit between load and save by bumping the
        // version out from under a hand-rolled save.
        let loaded = crate::db::history_store::load_histories(&conn, "alice").expect("load");
        conn.execute(
            "UPDATE users SET history_version = history_version + 1 WHERE user_id = 'alice'",
            [],
        )
        .expect("bump version");

        let err = crate::db::history_store::save_histories(
            &conn,
            "alice",
            &loaded.histories,
            loaded.version,
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::VersionConflict { .. }));
        assert!(err.code().is_retryable());
    }

    #[test]
    fn most_recent_prefers_latest_timestamp_and_earliest_position_on_ties() {
        let histories = vec![
            History {
                story: StoryId::from("s1"),
                pages: vec![PageId::from("a")],
                last_updated_us: 5,
            },
            History {
                story: StoryId::from("s2"),
                pages: vec![PageId::from("b")],
                last_updated_us: 9,
            },
            History {
                story: StoryId::from("s1"),
                pages: vec![PageId::from("c")],
                last_updated_us: 9,
            },
        ];

        let (idx, h) = most_recent(&histories, None).expect("non-empty");
        assert_eq!(idx, 1);
        assert_eq!(h.story, StoryId::from("s2"));

        let (idx, _) = most_recent(&histories, Some(&StoryId::from("s1"))).expect("non-empty");
        assert_eq!(idx, 2);

        assert!(most_recent(&[], None).is_none());
        assert!(most_recent(&histories, Some(&StoryId::from("zzz"))).is_none());
    }
}
