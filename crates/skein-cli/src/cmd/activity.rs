//! `sk activity` — the reader's recent page visits, newest first.

use crate::output::{OutputMode, render};
use anyhow::Result;
use clap::Args;
use serde::Serialize;
use skein_core::config::load_project_config;
use std::io::Write;
use std::path::Path;

#[derive(Args, Debug)]
pub struct ActivityArgs {
    /// Maximum records to show (defaults to `reader.activity_limit`).
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct ActivityRow {
    ts_us: i64,
    ts: String,
    story: String,
    page: String,
}

pub fn run_activity(
    args: &ActivityArgs,
    user_flag: Option<&str>,
    output: OutputMode,
    project_root: &Path,
) -> Result<()> {
    let config = load_project_config(project_root)?;
    let user = crate::user::require_reader(user_flag, &config)?;
    let conn = super::open_initialized(project_root)?;

    let limit = args.limit.unwrap_or(config.reader.activity_limit);
    let rows: Vec<ActivityRow> = skein_core::db::activity::recent_activity(&conn, &user, limit)?
        .into_iter()
        .map(|r| ActivityRow {
            ts_us: r.ts_us,
            ts: skein_core::time::format_us(r.ts_us),
            story: r.story.to_string(),
            page: r.page.to_string(),
        })
        .collect();

    render(output, &rows, |rows, w| {
        if rows.is_empty() {
            return writeln!(w, "no activity yet");
        }
        for row in rows {
            writeln!(w, "{}  {}/{}", row.ts, row.story, row.page)?;
        }
        Ok(())
    })
}
