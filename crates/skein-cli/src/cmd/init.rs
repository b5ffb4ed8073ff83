use crate::output::OutputMode;
use anyhow::{Context as _, Result};
use clap::Args;
use std::path::Path;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Force re-initialization even if `.skein/` already exists.
    #[arg(long)]
    pub force: bool,
}

const CONFIG_TOML: &str = "[reader]\n\
    # default_user = \"alice\"\n\
    activity_limit = 20\n\
    \n\
    [store]\n\
    lock_timeout_ms = 2000\n";

const GITIGNORE: &str = "skein.db\nskein.db-wal\nskein.db-shm\nlocks/\n";

/// Execute `sk init`. Creates the library skeleton:
///
/// ```text
/// .skein/
///   skein.db            (SQLite store, migrated to the latest schema)
///   locks/              (per-user advisory lock files)
///   config.toml         (default config template)
///   .gitignore          (skein.db*, locks/)
/// ```
///
/// # Errors
///
/// Returns an error if `.skein/` already exists and `--force` is not set,
/// or if any filesystem/store operation fails.
pub fn run_init(
    args: &InitArgs,
    output: OutputMode,
    quiet: bool,
    project_root: &Path,
) -> Result<()> {
    let skein_dir = skein_core::config::skein_dir(project_root);

    if skein_dir.exists() && !args.force {
        anyhow::bail!(".skein/ already exists. Use `sk init --force` to reinitialize.");
    }

    let locks = skein_core::config::locks_dir(project_root);
    std::fs::create_dir_all(&locks)
        .with_context(|| format!("create locks directory {}", locks.display()))?;

    let config_path = skein_core::config::config_path(project_root);
    if !config_path.exists() || args.force {
        std::fs::write(&config_path, CONFIG_TOML)
            .with_context(|| format!("write config {}", config_path.display()))?;
    }

    let gitignore = skein_dir.join(".gitignore");
    std::fs::write(&gitignore, GITIGNORE)
        .with_context(|| format!("write {}", gitignore.display()))?;

    // Creates the database file and applies migrations.
    let conn = skein_core::db::open_store(&skein_core::config::db_path(project_root))?;
    drop(conn);

    tracing::info!(dir = %skein_dir.display(), "library initialized");
    if !quiet {
        crate::output::render_success(output, "initialized .skein/")?;
    }
    Ok(())
}
