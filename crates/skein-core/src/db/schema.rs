//! Canonical SQLite schema for the skein store.
//!
//! The schema is normalized for queryability:
//! - `stories`, `pages`, `page_links` hold imported story graphs
//! - `users` carries the per-user `history_version` used for optimistic
//!   concurrency on history saves
//! - `histories` holds one row per path record, ordered by `position`
//! - `favorites` and `activity` are the per-user side tables
//! - `store_meta` tracks schema versioning alongside `PRAGMA user_version`

/// Migration v1: core tables plus store metadata.
pub const MIGRATION_V1_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS stories (
    story_id TEXT PRIMARY KEY CHECK (length(trim(story_id)) > 0),
    title TEXT NOT NULL,
    root_id TEXT NOT NULL,
    created_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS pages (
    story_id TEXT NOT NULL REFERENCES stories(story_id) ON DELETE CASCADE,
    page_id TEXT NOT NULL CHECK (length(trim(page_id)) > 0),
    name TEXT NOT NULL DEFAULT '',
    body TEXT NOT NULL DEFAULT '',
    PRIMARY KEY (story_id, page_id)
);

CREATE TABLE IF NOT EXISTS page_links (
    story_id TEXT NOT NULL,
    page_id TEXT NOT NULL,
    position INTEGER NOT NULL,
    target_id TEXT NOT NULL,
    label TEXT NOT NULL DEFAULT '',
    PRIMARY KEY (story_id, page_id, position),
    FOREIGN KEY (story_id, page_id) REFERENCES pages(story_id, page_id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS users (
    user_id TEXT PRIMARY KEY CHECK (length(trim(user_id)) > 0),
    history_version INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS histories (
    user_id TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    story_id TEXT NOT NULL,
    pages_json TEXT NOT NULL,
    last_updated_us INTEGER NOT NULL,
    PRIMARY KEY (user_id, position)
);

CREATE TABLE IF NOT EXISTS favorites (
    user_id TEXT NOT NULL,
    story_id TEXT NOT NULL,
    page_id TEXT NOT NULL,
    created_at_us INTEGER NOT NULL,
    PRIMARY KEY (user_id, story_id, page_id)
);

CREATE TABLE IF NOT EXISTS activity (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    ts_us INTEGER NOT NULL,
    story_id TEXT NOT NULL,
    page_id TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS store_meta (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    schema_version INTEGER NOT NULL,
    created_at_us INTEGER NOT NULL DEFAULT 0
);

INSERT OR IGNORE INTO store_meta (id, schema_version, created_at_us)
VALUES (1, 1, 0);
"#;

/// Migration v2: read-path indexes.
pub const MIGRATION_V2_SQL: &str = r#"
CREATE INDEX IF NOT EXISTS idx_histories_user_story
    ON histories(user_id, story_id, last_updated_us DESC);

CREATE INDEX IF NOT EXISTS idx_activity_user_ts
    ON activity(user_id, ts_us DESC);

CREATE INDEX IF NOT EXISTS idx_favorites_user
    ON favorites(user_id, created_at_us DESC);

CREATE INDEX IF NOT EXISTS idx_page_links_target
    ON page_links(story_id, target_id);
"#;
