//! Subcommand handlers, one module per command.

pub mod activity;
pub mod begin;
pub mod completions;
pub mod favorite;
pub mod histories;
pub mod import;
pub mod init;
pub mod resume;
pub mod stories;
pub mod visit;

use anyhow::Result;
use skein_core::config;
use skein_core::error::ErrorCode;
use std::path::Path;

/// Open the store of an initialized library, with a friendly error
/// otherwise.
///
/// # Errors
///
/// Returns [`ErrorCode::NotInitialized`]-coded errors when `.skein/` is
/// missing, or store open/migration failures.
pub fn open_initialized(project_root: &Path) -> Result<rusqlite::Connection> {
    let dir = config::skein_dir(project_root);
    if !dir.exists() {
        anyhow::bail!(
            "{}: {}. Run `sk init` first.",
            ErrorCode::NotInitialized.code(),
            ErrorCode::NotInitialized.message()
        );
    }
    skein_core::db::open_store(&config::db_path(project_root))
}
