//! `sk stories` — list imported stories.

use crate::output::{OutputMode, render};
use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Args, Debug)]
pub struct StoriesArgs {}

#[derive(Debug, Serialize)]
struct StoryRow {
    id: String,
    title: String,
    root: String,
    pages: usize,
    imported_at_us: i64,
}

pub fn run_stories(_args: &StoriesArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let conn = super::open_initialized(project_root)?;
    let rows: Vec<StoryRow> = skein_core::db::story_store::list_stories(&conn)?
        .into_iter()
        .map(|s| StoryRow {
            id: s.id.to_string(),
            title: s.title,
            root: s.root.to_string(),
            pages: s.page_count,
            imported_at_us: s.created_at_us,
        })
        .collect();

    render(output, &rows, |rows, w| {
        if rows.is_empty() {
            return writeln!(w, "no stories imported; try `sk import <file.json>`");
        }
        for row in rows {
            writeln!(
                w,
                "{}  {}  {} pages  (begin at '{}')",
                row.id, row.title, row.pages, row.root
            )?;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::{StoriesArgs, run_stories};
    use crate::output::OutputMode;
    use tempfile::TempDir;

    #[test]
    fn listing_an_empty_library_is_fine() {
        let dir = TempDir::new().expect("tempdir");
        crate::cmd::init::run_init(
            &crate::cmd::init::InitArgs { force: false },
            OutputMode::Text,
            true,
            dir.path(),
        )
        .expect("init");

        run_stories(&StoriesArgs {}, OutputMode::Text, dir.path()).expect("stories");
    }

    #[test]
    fn uninitialized_library_errors() {
        let dir = TempDir::new().expect("tempdir");
        assert!(run_stories(&StoriesArgs {}, OutputMode::Text, dir.path()).is_err());
    }
}
