//! `sk resume` — pick up the most recently updated path.
//!
//! Read-only: it shows where the reader left off and the exact command
//! that continues the walk. Recording happens on the next visit, which
//! then carries the history index shown here.

use crate::output::{OutputMode, render};
use anyhow::Result;
use clap::Args;
use serde::Serialize;
use skein_core::config::load_project_config;
use skein_core::model::StoryId;
use skein_core::nav::most_recent;
use std::io::Write;
use std::path::Path;

#[derive(Args, Debug)]
pub struct ResumeArgs {
    /// Resume within this story instead of across all stories.
    #[arg(long)]
    pub story: Option<String>,
}

#[derive(Debug, Serialize)]
struct ResumeOutput {
    history: usize,
    story: String,
    story_title: String,
    page: String,
    page_name: String,
    length: usize,
    last_updated_us: i64,
    last_updated: String,
    next: String,
}

pub fn run_resume(
    args: &ResumeArgs,
    user_flag: Option<&str>,
    output: OutputMode,
    project_root: &Path,
) -> Result<()> {
    let config = load_project_config(project_root)?;
    let user = crate::user::require_reader(user_flag, &config)?;
    let conn = super::open_initialized(project_root)?;

    let filter = args.story.as_deref().map(StoryId::from);
    let loaded = skein_core::db::history_store::load_histories(&conn, &user)?;

    let Some((idx, history)) = most_recent(&loaded.histories, filter.as_ref()) else {
        return render(output, &serde_json::json!({ "history": null }), |_, w| {
            writeln!(w, "nothing to resume; try `sk begin <story>`")
        });
    };

    let tip = history
        .tip()
        .map(ToString::to_string)
        .unwrap_or_default();
    let story = skein_core::db::story_store::get_story(&conn, &history.story)?;
    let (story_title, page_name) = story.map_or_else(
        || (history.story.to_string(), String::new()),
        |s| {
            let name = s
                .page(&skein_core::model::PageId::from(tip.as_str()))
                .map(|p| p.name.clone())
                .unwrap_or_default();
            (s.title, name)
        },
    );

    let out = ResumeOutput {
        history: idx,
        story: history.story.to_string(),
        story_title,
        page: tip.clone(),
        page_name,
        length: history.pages.len(),
        last_updated_us: history.last_updated_us,
        last_updated: skein_core::time::format_us(history.last_updated_us),
        next: format!(
            "sk visit {} <page> --from {} --history {}",
            history.story, tip, idx
        ),
    };

    render(output, &out, |out, w| {
        writeln!(
            w,
            "history {}: {} — at '{}' ({} pages, {})",
            out.history, out.story_title, out.page, out.length, out.last_updated
        )?;
        writeln!(w, "continue with: {}", out.next)
    })
}
