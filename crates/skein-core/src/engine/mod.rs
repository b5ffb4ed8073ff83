//! The history path engine.
//!
//! Pure decision logic over one reader's history collection: every
//! navigation event either extends a path, forks a new one, merges records
//! that have become identical, or leaves state untouched (guest/preview).
//! The engine performs no I/O and never queries the story graph — callers
//! validate page existence and resolve the root page before building an
//! event. The caller also supplies the clock.
//!
//! Positional indices returned in [`Applied::active`] are valid only within
//! the request that produced them: a merge can shift positions, so callers
//! must never cache an index across requests.

mod merge;

use crate::model::{History, PageId, StoryId};

pub use merge::merge_pass;

/// Who is looking at the page. Either flag set means the engine records
/// nothing: previews must not pollute paths, and guests have no collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Visitor {
    pub preview: bool,
    pub guest: bool,
}

impl Visitor {
    /// A logged-in reader on a real (non-preview) visit.
    #[must_use]
    pub const fn reader() -> Self {
        Self {
            preview: false,
            guest: false,
        }
    }

    /// Whether this visit must leave the collection untouched.
    #[must_use]
    pub const fn is_passive(self) -> bool {
        self.preview || self.guest
    }
}

/// One page-visit event, as translated from an inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavEvent {
    /// Reader opened a story at its root page, no prior path context.
    /// `page` is the root page id, resolved by the caller.
    Root { story: StoryId, page: PageId },

    /// Reader followed an in-story link. `history_id` absent means
    /// "start fresh"; a stale (out-of-range or wrong-story) value is
    /// treated the same way rather than failing.
    Linked {
        story: StoryId,
        page: PageId,
        prev_page: PageId,
        history_id: Option<usize>,
        forward: bool,
    },

    /// Reader arrived without path context (e.g. a pasted URL).
    External { story: StoryId, page: PageId },
}

impl NavEvent {
    /// The story this event belongs to.
    #[must_use]
    pub const fn story(&self) -> &StoryId {
        match self {
            Self::Root { story, .. } | Self::Linked { story, .. } | Self::External { story, .. } => {
                story
            }
        }
    }

    /// The page being visited.
    #[must_use]
    pub const fn page(&self) -> &PageId {
        match self {
            Self::Root { page, .. } | Self::Linked { page, .. } | Self::External { page, .. } => {
                page
            }
        }
    }
}

/// Result of applying one event: the updated collection plus the index of
/// the record the response should be associated with. `active` is `None`
/// exactly when the visit was passive (guest/preview).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub histories: Vec<History>,
    pub active: Option<usize>,
}

/// Apply one navigation event to a reader's history collection.
///
/// Takes the collection by value and returns the updated one; nothing is
/// committed anywhere until the caller persists the result.
#[must_use]
pub fn apply(histories: Vec<History>, event: &NavEvent, visitor: Visitor, now_us: i64) -> Applied {
    if visitor.is_passive() {
        return Applied {
            histories,
            active: None,
        };
    }

    match event {
        NavEvent::Root { story, page } | NavEvent::External { story, page } => {
            seed_visit(histories, story, page, now_us)
        }
        NavEvent::Linked {
            story,
            page,
            prev_page,
            history_id,
            forward,
        } => linked_visit(
            histories, story, page, prev_page, *history_id, *forward, now_us,
        ),
    }
}

/// Root/external visit: re-confirm the matching single-page record or seed
/// a new one. Replaying the same visit any number of times never creates a
/// second matching record.
fn seed_visit(
    mut histories: Vec<History>,
    story: &StoryId,
    page: &PageId,
    now_us: i64,
) -> Applied {
    if let Some(idx) = histories.iter().position(|h| h.is_seed_of(story, page)) {
        histories[idx].last_updated_us = now_us;
        return Applied {
            histories,
            active: Some(idx),
        };
    }

    histories.push(History::seed(story.clone(), page.clone(), now_us));
    let idx = histories.len() - 1;
    Applied {
        histories,
        active: Some(idx),
    }
}

fn linked_visit(
    mut histories: Vec<History>,
    story: &StoryId,
    page: &PageId,
    prev_page: &PageId,
    history_id: Option<usize>,
    forward: bool,
    now_us: i64,
) -> Applied {
    // A reference is usable only if it is in range and names a record of the
    // same story. Anything else is stale client state: fall back to the
    // fresh-start path instead of failing the request.
    let idx = history_id.filter(|&i| i < histories.len() && histories[i].story == *story);
    let Some(idx) = idx else {
        if history_id.is_some() {
            tracing::debug!(?history_id, "stale history reference, starting fresh");
        }
        return seed_visit(histories, story, page, now_us);
    };

    if !forward {
        // Paths are append-only logs; backward navigation never truncates.
        // Only the timestamp is re-confirmed.
        histories[idx].last_updated_us = now_us;
        return Applied {
            histories,
            active: Some(idx),
        };
    }

    if histories[idx].contains(page) {
        // Replay of a page already on this path: never append a duplicate.
        histories[idx].last_updated_us = now_us;
        return Applied {
            histories,
            active: Some(idx),
        };
    }

    let provisional = if histories[idx].tip() == Some(prev_page) {
        // Reader followed the path's current tip.
        histories[idx].pages.push(page.clone());
        histories[idx].last_updated_us = now_us;
        idx
    } else {
        // Reader branched off mid-path: fork, leaving the original intact.
        let fork = histories[idx].forked(prev_page, page.clone(), now_us);
        histories.push(fork);
        histories.len() - 1
    };

    // An extension or fork may have produced a path identical to another
    // existing record.
    let (histories, active) = merge_pass(histories, Some(provisional), now_us);
    Applied { histories, active }
}
