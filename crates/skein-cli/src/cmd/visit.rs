//! `sk visit` — follow a link to a page, or arrive without context.
//!
//! With `--from` the visit is a linked navigation and carries the context
//! the engine needs (previous page, history index, direction). Without it
//! the visit is external: the engine starts a fresh path, exactly as a
//! pasted URL would in the original reading flow.

use crate::output::{CliError, OutputMode, render, render_error};
use crate::page_view::PageView;
use anyhow::Result;
use clap::Args;
use skein_core::config::{ProjectConfig, load_project_config};
use skein_core::model::{PageId, StoryId};
use skein_core::nav::{PageTarget, VisitRequest, handle_visit};
use std::path::Path;

#[derive(Args, Debug)]
pub struct VisitArgs {
    /// Story id.
    pub story: String,

    /// Page id to visit.
    pub page: String,

    /// The page the link was followed from. Omit for an external arrival.
    #[arg(long)]
    pub from: Option<String>,

    /// History index from the previous response. Omit to start fresh.
    #[arg(long, requires = "from")]
    pub history: Option<usize>,

    /// This is backward navigation (the path is never truncated).
    #[arg(long, requires = "from")]
    pub back: bool,

    /// View without recording to history.
    #[arg(long)]
    pub preview: bool,

    /// Read as a guest even if an identity would resolve.
    #[arg(long)]
    pub guest: bool,
}

pub fn run_visit(
    args: &VisitArgs,
    user_flag: Option<&str>,
    output: OutputMode,
    project_root: &Path,
) -> Result<()> {
    let config = load_project_config(project_root)?;
    let user = if args.guest {
        None
    } else {
        crate::user::resolve_reader(user_flag, &config)
    };

    let target = match &args.from {
        Some(prev) => PageTarget::Linked {
            page: PageId::from(args.page.as_str()),
            prev_page: PageId::from(prev.as_str()),
            history_id: args.history,
            forward: !args.back,
        },
        None => PageTarget::External {
            page: PageId::from(args.page.as_str()),
        },
    };

    let request = VisitRequest {
        story: StoryId::from(args.story.as_str()),
        target,
        user,
        preview: args.preview,
    };
    perform_visit(project_root, &config, &request, output)
}

/// Shared by `begin` and `visit`: run the request against the store and
/// render the resulting page, or the error with its machine code.
pub fn perform_visit(
    project_root: &Path,
    config: &ProjectConfig,
    request: &VisitRequest,
    output: OutputMode,
) -> Result<()> {
    let mut conn = super::open_initialized(project_root)?;
    match handle_visit(
        &mut conn,
        project_root,
        config,
        request,
        skein_core::time::wall_now_us(),
    ) {
        Ok(outcome) => {
            let view = PageView::from(&outcome);
            render(output, &view, |view, w| view.render_human(w))
        }
        Err(err) => {
            render_error(output, &CliError::from(&err))?;
            anyhow::bail!("visit failed: {err}");
        }
    }
}
