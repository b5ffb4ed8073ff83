//! Story graphs: pages, links, and the authored story document.
//!
//! A story is a directed graph of pages. Page bodies are Markdown; the
//! history engine only ever looks at page identifiers, the text rides along
//! for rendering. Stories enter the system as JSON documents and are
//! validated before they reach the store: the root must exist, every link
//! target must exist, and page ids must be non-empty and unique.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Opaque identifier naming a story graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoryId(pub String);

impl StoryId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StoryId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Opaque identifier for a page, unique within its story.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(pub String);

impl PageId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// An outgoing edge of a page: where it leads, and the choice text shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLink {
    pub target: PageId,
    #[serde(default)]
    pub label: String,
}

/// One node of a story graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: PageId,
    #[serde(default)]
    pub name: String,
    /// Markdown body. Irrelevant to the history engine.
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub links: Vec<PageLink>,
}

/// A validated story graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Story {
    pub id: StoryId,
    pub title: String,
    pub root: PageId,
    pub pages: BTreeMap<PageId, Page>,
}

impl Story {
    /// Look up a page by id.
    #[must_use]
    pub fn page(&self, id: &PageId) -> Option<&Page> {
        self.pages.get(id)
    }

    /// Whether `id` names a page of this story.
    #[must_use]
    pub fn page_exists(&self, id: &PageId) -> bool {
        self.pages.contains_key(id)
    }
}

/// The authored JSON form of a story, as written by story editors.
///
/// Pages are a flat list here; [`StoryDoc::validate`] turns the document into
/// a [`Story`] with pages keyed by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryDoc {
    pub id: StoryId,
    #[serde(default)]
    pub title: String,
    pub root: PageId,
    pub pages: Vec<Page>,
}

/// Reason an authored story document was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoryDocError {
    #[error("story id must not be empty")]
    EmptyStoryId,

    #[error("page id must not be empty")]
    EmptyPageId,

    #[error("duplicate page id '{0}'")]
    DuplicatePage(PageId),

    #[error("root page '{0}' is not defined")]
    MissingRoot(PageId),

    #[error("page '{from}' links to undefined page '{to}'")]
    DanglingLink { from: PageId, to: PageId },
}

impl StoryDoc {
    /// Validate the document and produce a [`Story`].
    ///
    /// # Errors
    ///
    /// Returns the first structural problem found: empty ids, duplicate
    /// pages, a missing root, or a link to an undefined page.
    pub fn validate(self) -> Result<Story, StoryDocError> {
        if self.id.as_str().trim().is_empty() {
            return Err(StoryDocError::EmptyStoryId);
        }

        let mut pages = BTreeMap::new();
        for page in self.pages {
            if page.id.as_str().trim().is_empty() {
                return Err(StoryDocError::EmptyPageId);
            }
            let id = page.id.clone();
            if pages.insert(id.clone(), page).is_some() {
                return Err(StoryDocError::DuplicatePage(id));
            }
        }

        if !pages.contains_key(&self.root) {
            return Err(StoryDocError::MissingRoot(self.root));
        }

        for page in pages.values() {
            for link in &page.links {
                if !pages.contains_key(&link.target) {
                    return Err(StoryDocError::DanglingLink {
                        from: page.id.clone(),
                        to: link.target.clone(),
                    });
                }
            }
        }

        Ok(Story {
            id: self.id,
            title: self.title,
            root: self.root,
            pages,
        })
    }
}
