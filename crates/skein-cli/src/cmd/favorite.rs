//! `sk favorite` — maintain the reader's favorited pages.

use crate::output::{OutputMode, render, render_success};
use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;
use skein_core::config::load_project_config;
use skein_core::db::{favorites, story_store};
use skein_core::model::{PageId, StoryId};
use std::io::Write;
use std::path::Path;

#[derive(Args, Debug)]
pub struct FavoriteArgs {
    #[command(subcommand)]
    pub command: FavoriteCommand,
}

#[derive(Subcommand, Debug)]
pub enum FavoriteCommand {
    /// Favorite a page.
    Add { story: String, page: String },
    /// Remove a favorited page.
    Rm { story: String, page: String },
    /// List favorited pages, newest first.
    List,
}

#[derive(Debug, Serialize)]
struct FavoriteRow {
    story: String,
    page: String,
    created_at_us: i64,
}

pub fn run_favorite(
    args: &FavoriteArgs,
    user_flag: Option<&str>,
    output: OutputMode,
    quiet: bool,
    project_root: &Path,
) -> Result<()> {
    let config = load_project_config(project_root)?;
    let user = crate::user::require_reader(user_flag, &config)?;
    let conn = super::open_initialized(project_root)?;
    let now_us = skein_core::time::wall_now_us();

    match &args.command {
        FavoriteCommand::Add { story, page } => {
            let story = StoryId::from(story.as_str());
            let page = PageId::from(page.as_str());
            if !story_store::page_exists(&conn, &story, &page)? {
                anyhow::bail!("page '{page}' does not exist in story '{story}'");
            }
            let added = favorites::add_favorite(&conn, &user, &story, &page, now_us)?;
            if !quiet {
                let message = if added {
                    format!("favorited {story}/{page}")
                } else {
                    format!("{story}/{page} was already favorited")
                };
                render_success(output, &message)?;
            }
            Ok(())
        }
        FavoriteCommand::Rm { story, page } => {
            let story = StoryId::from(story.as_str());
            let page = PageId::from(page.as_str());
            let removed = favorites::remove_favorite(&conn, &user, &story, &page)?;
            if !removed {
                anyhow::bail!("{story}/{page} is not favorited");
            }
            if !quiet {
                render_success(output, &format!("removed {story}/{page}"))?;
            }
            Ok(())
        }
        FavoriteCommand::List => {
            let rows: Vec<FavoriteRow> = favorites::list_favorites(&conn, &user)?
                .into_iter()
                .map(|f| FavoriteRow {
                    story: f.story.to_string(),
                    page: f.page.to_string(),
                    created_at_us: f.created_at_us,
                })
                .collect();
            render(output, &rows, |rows, w| {
                if rows.is_empty() {
                    return writeln!(w, "no favorites yet");
                }
                for row in rows {
                    writeln!(w, "{}/{}", row.story, row.page)?;
                }
                Ok(())
            })
        }
    }
}
