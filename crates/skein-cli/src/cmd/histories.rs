//! `sk histories` — review the reader's recorded paths.
//!
//! Indices shown here are the positions the engine works with. They are
//! stable only until the next visit that triggers a merge, so take them
//! from the latest listing (or the latest visit response).

use crate::output::{OutputMode, render};
use anyhow::Result;
use clap::Args;
use serde::Serialize;
use skein_core::config::load_project_config;
use skein_core::model::StoryId;
use std::io::Write;
use std::path::Path;

#[derive(Args, Debug)]
pub struct HistoriesArgs {
    /// Only show paths through this story.
    #[arg(long)]
    pub story: Option<String>,

    /// Print every page of each path instead of just the tip.
    #[arg(long)]
    pub full: bool,
}

#[derive(Debug, Serialize)]
struct HistoryRow {
    history: usize,
    story: String,
    length: usize,
    tip: String,
    last_updated_us: i64,
    last_updated: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pages: Option<Vec<String>>,
}

pub fn run_histories(
    args: &HistoriesArgs,
    user_flag: Option<&str>,
    output: OutputMode,
    project_root: &Path,
) -> Result<()> {
    let config = load_project_config(project_root)?;
    let user = crate::user::require_reader(user_flag, &config)?;
    let conn = super::open_initialized(project_root)?;

    let filter = args.story.as_deref().map(StoryId::from);
    let loaded = skein_core::db::history_store::load_histories(&conn, &user)?;

    let rows: Vec<HistoryRow> = loaded
        .histories
        .iter()
        .enumerate()
        .filter(|(_, h)| filter.as_ref().is_none_or(|s| h.story == *s))
        .map(|(idx, h)| HistoryRow {
            history: idx,
            story: h.story.to_string(),
            length: h.pages.len(),
            tip: h.tip().map(ToString::to_string).unwrap_or_default(),
            last_updated_us: h.last_updated_us,
            last_updated: skein_core::time::format_us(h.last_updated_us),
            pages: args
                .full
                .then(|| h.pages.iter().map(ToString::to_string).collect()),
        })
        .collect();

    render(output, &rows, |rows, w| {
        if rows.is_empty() {
            return writeln!(w, "no recorded paths yet; try `sk begin <story>`");
        }
        for row in rows {
            writeln!(
                w,
                "{}  {}  {} pages  tip={}  {}",
                row.history, row.story, row.length, row.tip, row.last_updated
            )?;
            if let Some(pages) = &row.pages {
                writeln!(w, "   {}", pages.join(" -> "))?;
            }
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::HistoriesArgs;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: HistoriesArgs,
    }

    #[test]
    fn histories_args_parse() {
        let w = Wrapper::parse_from(["test", "--story", "demo", "--full"]);
        assert_eq!(w.args.story.as_deref(), Some("demo"));
        assert!(w.args.full);
    }
}
