//! History records: one candidate path a reader has walked through a story.
//!
//! Paths are append-only logs of root-to-current choices. Branching never
//! mutates or truncates a previously recorded path; the engine forks a new
//! record instead, and structurally identical records are merged afterwards.
//!
//! Invariants carried by every record:
//! - `pages` is non-empty, root-first
//! - no two consecutive entries are equal
//!
//! Within one reader's collection there is a third invariant the engine
//! enforces: no two records for the same story share an identical `pages`
//! sequence.

use crate::model::story::{PageId, StoryId};
use serde::{Deserialize, Serialize};

/// One recorded path through a story, owned by a single reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    pub story: StoryId,
    /// The path walked, root-first. No two consecutive duplicates.
    pub pages: Vec<PageId>,
    /// Wall-clock microseconds of the last extension or re-confirmation.
    pub last_updated_us: i64,
}

impl History {
    /// A fresh single-page record, as created by a root or external visit.
    #[must_use]
    pub fn seed(story: StoryId, page: PageId, now_us: i64) -> Self {
        Self {
            story,
            pages: vec![page],
            last_updated_us: now_us,
        }
    }

    /// The current end of the path. `None` only for a record that violates
    /// the non-empty invariant (e.g. hand-edited store contents).
    #[must_use]
    pub fn tip(&self) -> Option<&PageId> {
        self.pages.last()
    }

    /// Whether `page` appears anywhere in the path.
    #[must_use]
    pub fn contains(&self, page: &PageId) -> bool {
        self.pages.contains(page)
    }

    /// The page immediately preceding the first occurrence of `page`.
    ///
    /// `None` when `page` is the first element or does not appear at all.
    #[must_use]
    pub fn back_of(&self, page: &PageId) -> Option<&PageId> {
        let pos = self.pages.iter().position(|p| p == page)?;
        pos.checked_sub(1).map(|prev| &self.pages[prev])
    }

    /// Whether this record is a single-page seed for `(story, page)`.
    #[must_use]
    pub fn is_seed_of(&self, story: &StoryId, page: &PageId) -> bool {
        self.story == *story && self.pages.len() == 1 && self.pages[0] == *page
    }

    /// Whether two records are structurally equivalent: same story and an
    /// identical page sequence, element-wise.
    #[must_use]
    pub fn same_path(&self, other: &Self) -> bool {
        self.story == other.story && self.pages == other.pages
    }

    /// Build the fork of this path: the prefix up to and including the first
    /// occurrence of `prev_page`, with `page` appended.
    ///
    /// When `prev_page` does not appear, the whole path is copied before the
    /// append. The divergence point was reported by a client and can be
    /// stale, so this degenerates gracefully instead of failing.
    #[must_use]
    pub fn forked(&self, prev_page: &PageId, page: PageId, now_us: i64) -> Self {
        let mut pages = Vec::with_capacity(self.pages.len() + 1);
        for p in &self.pages {
            pages.push(p.clone());
            if p == prev_page {
                break;
            }
        }
        pages.push(page);
        Self {
            story: self.story.clone(),
            pages,
            last_updated_us: now_us,
        }
    }

    /// Validate the per-record invariants.
    ///
    /// # Errors
    ///
    /// Returns a human-readable description of the violated invariant.
    pub fn check(&self) -> Result<(), String> {
        if self.pages.is_empty() {
            return Err("page sequence is empty".to_string());
        }
        for pair in self.pages.windows(2) {
            if pair[0] == pair[1] {
                return Err(format!("consecutive duplicate page '{}'", pair[0]));
            }
        }
        Ok(())
    }
}
