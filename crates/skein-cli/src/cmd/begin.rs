//! `sk begin` — open a story at its root page.

use crate::output::OutputMode;
use anyhow::Result;
use clap::Args;
use skein_core::config::load_project_config;
use skein_core::model::StoryId;
use skein_core::nav::{PageTarget, VisitRequest};
use std::path::Path;

#[derive(Args, Debug)]
pub struct BeginArgs {
    /// Story id to open.
    pub story: String,

    /// View without recording to history.
    #[arg(long)]
    pub preview: bool,

    /// Read as a guest even if an identity would resolve.
    #[arg(long)]
    pub guest: bool,
}

pub fn run_begin(
    args: &BeginArgs,
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

    let request = VisitRequest {
        story: StoryId::from(args.story.as_str()),
        target: PageTarget::Root,
        user,
        preview: args.preview,
    };
    super::visit::perform_visit(project_root, &config, &request, output)
}

#[cfg(test)]
mod tests {
    use super::BeginArgs;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: BeginArgs,
    }

    #[test]
    fn begin_args_parse() {
        let w = Wrapper::parse_from(["test", "demo", "--preview"]);
        assert_eq!(w.args.story, "demo");
        assert!(w.args.preview);
        assert!(!w.args.guest);
    }
}
