use std::fmt;

/// Machine-readable error codes for script-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotInitialized,
    ConfigParseError,
    StoryNotFound,
    PageNotFound,
    InvalidStoryDoc,
    CorruptHistory,
    VersionConflict,
    StoreUnavailable,
    LockContention,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotInitialized => "E1001",
            Self::ConfigParseError => "E1002",
            Self::StoryNotFound => "E2001",
            Self::PageNotFound => "E2002",
            Self::InvalidStoryDoc => "E2003",
            Self::CorruptHistory => "E3001",
            Self::VersionConflict => "E4001",
            Self::StoreUnavailable => "E4002",
            Self::LockContention => "E5001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotInitialized => "Library not initialized",
            Self::ConfigParseError => "Config file parse error",
            Self::StoryNotFound => "Story not found",
            Self::PageNotFound => "Page not found in story",
            Self::InvalidStoryDoc => "Invalid story document",
            Self::CorruptHistory => "Corrupt history record",
            Self::VersionConflict => "Concurrent history update",
            Self::StoreUnavailable => "Store read/write failed",
            Self::LockContention => "Lock contention",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to readers and scripts.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run `sk init` to initialize this library."),
            Self::ConfigParseError => Some("Fix syntax in .skein/config.toml and retry."),
            Self::StoryNotFound => Some("Run `sk stories` to list available story ids."),
            Self::PageNotFound => None,
            Self::InvalidStoryDoc => Some("Validate the story JSON: root page and link targets must exist."),
            Self::CorruptHistory => Some("A stored path record failed validation; re-import or repair the store."),
            Self::VersionConflict => Some("Another process updated this reader's histories; retry the visit."),
            Self::StoreUnavailable => Some("Check disk space and write permissions for .skein/skein.db."),
            Self::LockContention => Some("Retry after the other `sk` process releases its lock."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }

    /// Whether a caller may usefully retry the failed request as-is.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::VersionConflict | Self::StoreUnavailable | Self::LockContention
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Store-layer failures surfaced to navigation callers.
///
/// `VersionConflict` and the SQLite wrapper are retryable: the engine's
/// computation is not committed unless the save succeeds, so the caller may
/// redo the whole read-modify-write.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("history collection for '{user}' changed underneath this request")]
    VersionConflict { user: String },

    #[error("corrupt history record for '{user}': {detail}")]
    CorruptHistory { user: String, detail: String },

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("stored value error: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl StoreError {
    /// Machine-readable code associated with this store error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::VersionConflict { .. } => ErrorCode::VersionConflict,
            Self::CorruptHistory { .. } => ErrorCode::CorruptHistory,
            Self::Sqlite(_) | Self::Encoding(_) => ErrorCode::StoreUnavailable,
        }
    }
}

/// Failures while handling one navigation request.
///
/// `NotFound` variants are client-visible outcomes, never retried. The rest
/// propagate the store/lock taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum NavError {
    #[error("story '{story}' does not exist")]
    StoryNotFound { story: String },

    #[error("page '{page}' does not exist in story '{story}'")]
    PageNotFound { story: String, page: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Lock(#[from] crate::lock::LockError),

    #[error(transparent)]
    Io(#[from] anyhow::Error),
}

impl NavError {
    /// Machine-readable code associated with this navigation error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::StoryNotFound { .. } => ErrorCode::StoryNotFound,
            Self::PageNotFound { .. } => ErrorCode::PageNotFound,
            Self::Store(err) => err.code(),
            Self::Lock(err) => err.code(),
            Self::Io(_) => ErrorCode::StoreUnavailable,
        }
    }

    /// Optional remediation hint for readers and scripts.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}
