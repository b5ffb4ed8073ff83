#![forbid(unsafe_code)]

mod cmd;
mod output;
mod page_view;
mod user;

use clap::{CommandFactory, Parser, Subcommand};
use output::OutputMode;
use std::env;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "skein: a branching-story reader that remembers every path",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Reader identity (skips env/config resolution).
    #[arg(short, long, global = true)]
    user: Option<String>,

    /// Suppress non-essential output.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Derive the output mode from flags and environment.
    fn output_mode(&self) -> OutputMode {
        output::resolve_output_mode(self.json)
    }

    /// Get the user flag as an Option<&str> for resolution.
    fn user_flag(&self) -> Option<&str> {
        self.user.as_deref()
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Library",
        about = "Initialize a skein library",
        long_about = "Initialize a skein library (.skein/) in the current directory.",
        after_help = "EXAMPLES:\n    # Initialize a library in the current directory\n    sk init\n\n    # Reinitialize, keeping nothing\n    sk init --force"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        next_help_heading = "Library",
        about = "Import a story document",
        long_about = "Validate an authored story JSON document and store it.",
        after_help = "EXAMPLES:\n    # Import a story\n    sk import stories/cave.json\n\n    # Machine-readable output\n    sk import stories/cave.json --json"
    )]
    Import(cmd::import::ImportArgs),

    #[command(
        next_help_heading = "Library",
        about = "List imported stories",
        after_help = "EXAMPLES:\n    sk stories\n    sk stories --json"
    )]
    Stories(cmd::stories::StoriesArgs),

    #[command(
        next_help_heading = "Reading",
        about = "Open a story at its root page",
        long_about = "Open a story at its root page, recording (or re-confirming) a single-page path.",
        after_help = "EXAMPLES:\n    # Start reading as alice\n    sk begin cave --user alice\n\n    # Look without recording\n    sk begin cave --preview"
    )]
    Begin(cmd::begin::BeginArgs),

    #[command(
        next_help_heading = "Reading",
        about = "Visit a page",
        long_about = "Follow a link (--from, --history) or arrive without context, extending, forking, or re-confirming the active path.",
        after_help = "EXAMPLES:\n    # Follow a link from the previous response\n    sk visit cave pool --from fork --history 0\n\n    # Navigate backward along the path\n    sk visit cave fork --from pool --history 0 --back\n\n    # Arrive with no context (starts a fresh path)\n    sk visit cave pool"
    )]
    Visit(cmd::visit::VisitArgs),

    #[command(
        next_help_heading = "Reading",
        about = "Pick up the most recent path",
        after_help = "EXAMPLES:\n    sk resume\n    sk resume --story cave"
    )]
    Resume(cmd::resume::ResumeArgs),

    #[command(
        next_help_heading = "Review",
        about = "List recorded paths",
        long_about = "List the reader's recorded paths. Indices are positions and may shift after a merge; always take them from the latest listing.",
        after_help = "EXAMPLES:\n    sk histories\n    sk histories --story cave --full"
    )]
    Histories(cmd::histories::HistoriesArgs),

    #[command(
        next_help_heading = "Review",
        about = "Maintain favorited pages",
        after_help = "EXAMPLES:\n    sk favorite add cave pool\n    sk favorite list"
    )]
    Favorite(cmd::favorite::FavoriteArgs),

    #[command(
        next_help_heading = "Review",
        about = "Show recent page visits",
        after_help = "EXAMPLES:\n    sk activity\n    sk activity -n 50"
    )]
    Activity(cmd::activity::ActivityArgs),

    #[command(
        next_help_heading = "Library",
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n    sk completions bash > /etc/bash_completion.d/sk"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("SKEIN_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "skein=debug,info"
        } else {
            "skein=info,warn"
        })
    });

    let format = env::var("SKEIN_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry.with(fmt::layer().json().with_ansi(false)).init();
        }
        _ => {
            registry.with(fmt::layer().compact()).init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    let project_root = std::env::current_dir()?;
    let output = cli.output_mode();

    match cli.command {
        Commands::Init(ref args) => cmd::init::run_init(args, output, cli.quiet, &project_root),
        Commands::Import(ref args) => {
            cmd::import::run_import(args, output, cli.quiet, &project_root)
        }
        Commands::Stories(ref args) => cmd::stories::run_stories(args, output, &project_root),
        Commands::Begin(ref args) => {
            cmd::begin::run_begin(args, cli.user_flag(), output, &project_root)
        }
        Commands::Visit(ref args) => {
            cmd::visit::run_visit(args, cli.user_flag(), output, &project_root)
        }
        Commands::Resume(ref args) => {
            cmd::resume::run_resume(args, cli.user_flag(), output, &project_root)
        }
        Commands::Histories(ref args) => {
            cmd::histories::run_histories(args, cli.user_flag(), output, &project_root)
        }
        Commands::Favorite(ref args) => {
            cmd::favorite::run_favorite(args, cli.user_flag(), output, cli.quiet, &project_root)
        }
        Commands::Activity(ref args) => {
            cmd::activity::run_activity(args, cli.user_flag(), output, &project_root)
        }
        Commands::Completions(ref args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_subcommand_parses() {
        let cli = Cli::parse_from(["sk", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }

    #[test]
    fn import_subcommand_parses() {
        let cli = Cli::parse_from(["sk", "import", "story.json"]);
        assert!(matches!(cli.command, Commands::Import(_)));
    }

    #[test]
    fn begin_subcommand_parses() {
        let cli = Cli::parse_from(["sk", "begin", "cave"]);
        assert!(matches!(cli.command, Commands::Begin(_)));
    }

    #[test]
    fn visit_subcommand_parses() {
        let cli = Cli::parse_from([
            "sk", "visit", "cave", "pool", "--from", "fork", "--history", "0",
        ]);
        assert!(matches!(cli.command, Commands::Visit(_)));
    }

    #[test]
    fn completions_subcommand_parses() {
        let cli = Cli::parse_from(["sk", "completions", "bash"]);
        assert!(matches!(
            cli.command,
            Commands::Completions(cmd::completions::CompletionsArgs {
                shell: clap_complete::Shell::Bash,
            })
        ));
    }

    #[test]
    fn all_subcommands_listed() {
        // Verify all planned subcommands exist by parsing each
        let subcommands = [
            vec!["sk", "init"],
            vec!["sk", "import", "x.json"],
            vec!["sk", "stories"],
            vec!["sk", "begin", "s"],
            vec!["sk", "visit", "s", "p"],
            vec!["sk", "resume"],
            vec!["sk", "histories"],
            vec!["sk", "favorite", "list"],
            vec!["sk", "activity"],
            vec!["sk", "completions", "bash"],
        ];
        for args in &subcommands {
            let result = Cli::try_parse_from(args.iter());
            assert!(
                result.is_ok(),
                "Failed to parse: {:?} — error: {:?}",
                args,
                result.err()
            );
        }
    }

    #[test]
    fn user_flag_is_global() {
        let cli = Cli::parse_from(["sk", "--user", "alice", "begin", "cave"]);
        assert_eq!(cli.user_flag(), Some("alice"));

        let cli = Cli::parse_from(["sk", "histories", "--user", "alice"]);
        assert_eq!(cli.user_flag(), Some("alice"));
    }

    #[test]
    fn read_only_commands_work_without_user() {
        let cli = Cli::parse_from(["sk", "stories"]);
        assert!(cli.user_flag().is_none());
    }
}
