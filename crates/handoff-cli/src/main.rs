mod cmd;
mod host;
mod menu;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    analytics::{AnalyticsView, ExportFormat},
    config::ConfigSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "handoff",
    about = "Write an AI continuation document and resume prompt before clearing context",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from docs/handoffs/ or .git/)
    #[arg(long, global = true, env = "HANDOFF_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a continuation document, then deliver the resume prompt
    Run {
        /// Copy the resume prompt to the clipboard (this run only)
        #[arg(long, overrides_with = "auto")]
        clipboard: bool,

        /// Submit the resume prompt to a fresh session (this run only)
        #[arg(long, visible_alias = "auto-paste", overrides_with = "clipboard")]
        auto: bool,

        /// JSON session snapshot to build the document from
        #[arg(long, value_name = "FILE")]
        session: Option<PathBuf>,

        /// What the next session should do first. Mode flags may also appear
        /// among these words; the last flag given wins.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        directive: Vec<String>,
    },

    /// Deliver a resume prompt for an existing document
    Resume {
        /// Document to resume from (default: the latest)
        #[arg(long, value_name = "FILE")]
        doc: Option<String>,

        /// Copy the resume prompt to the clipboard
        #[arg(long, overrides_with = "auto")]
        clipboard: bool,

        /// Submit the resume prompt to a fresh session
        #[arg(long, visible_alias = "auto-paste", overrides_with = "clipboard")]
        auto: bool,

        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        directive: Vec<String>,
    },

    /// Show or change preferences
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// List continuation documents, newest first
    List,

    /// Print a continuation document
    Show {
        /// Filename or path (default: the latest)
        file: Option<String>,

        /// Show the latest document
        #[arg(long, conflicts_with = "file")]
        latest: bool,
    },

    /// Print an empty continuation document
    Template,

    /// Trends across all continuation documents
    Analytics {
        #[arg(value_enum)]
        view: Option<AnalyticsView>,

        /// Write the analytics to a file instead
        #[arg(long, short = 'e', value_enum)]
        export: Option<ExportFormat>,

        /// Output file for exports and reports
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,

        /// Open the HTML report in the browser once written
        #[arg(long)]
        open: bool,
    },

    /// Estimate context-window usage and suggest a handoff
    Monitor {
        /// Usage percentage at which to recommend a handoff
        #[arg(long, short = 't', default_value_t = handoff_core::monitor::DEFAULT_THRESHOLD,
              value_parser = clap::value_parser!(u8).range(1..=100))]
        threshold: u8,

        /// Re-check every 30 seconds until interrupted
        #[arg(long, short = 'w')]
        watch: bool,

        /// Print a SessionStart hook snippet that runs this check
        #[arg(long)]
        install_hook: bool,
    },
}

fn mode_flag(clipboard: bool, auto: bool) -> Option<handoff_core::types::HandoffMode> {
    use handoff_core::types::HandoffMode;
    match (clipboard, auto) {
        (_, true) => Some(HandoffMode::AutoPaste),
        (true, false) => Some(HandoffMode::Clipboard),
        (false, false) => None,
    }
}

fn main() {
    let cli = Cli::parse();

    // stdout carries documents and resume prompts; diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());
    let raw: Vec<String> = std::env::args_os()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();

    let result = match cli.command {
        Commands::Run {
            clipboard,
            auto,
            session,
            directive,
        } => cmd::run::run(
            &root,
            mode_flag(clipboard, auto),
            session.as_deref(),
            &cmd::run::restore_separator(&raw, directive),
            cli.json,
        ),
        Commands::Resume {
            doc,
            clipboard,
            auto,
            directive,
        } => cmd::resume::run(
            &root,
            doc.as_deref(),
            mode_flag(clipboard, auto),
            &cmd::run::restore_separator(&raw, directive),
            cli.json,
        ),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
        Commands::List => cmd::list::run(&root, cli.json),
        Commands::Show { file, latest } => {
            cmd::show::run(&root, file.as_deref(), latest, cli.json)
        }
        Commands::Template => cmd::template::run(cli.json),
        Commands::Analytics {
            view,
            export,
            out,
            open,
        } => cmd::analytics::run(&root, view, export, out.as_deref(), open, cli.json),
        Commands::Monitor {
            threshold,
            watch,
            install_hook,
        } => cmd::monitor::run(threshold, watch, install_hook, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
