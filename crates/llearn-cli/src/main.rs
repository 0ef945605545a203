//! llearn CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

#[derive(Parser)]
#[command(
    name = "llearn",
    version,
    about = "Practice prompt-writing lessons in the terminal"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where content and config come from.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Content directory or module file (defaults to the configured content_dir)
    #[arg(long)]
    pub content: Option<PathBuf>,

    /// Config file path
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// How `check` prints its result.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List modules and lessons with completion state
    List {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Check a submission against a lesson's rules
    Check {
        /// Lesson to check, as <module>/<lesson>
        #[arg(long)]
        lesson: String,

        /// File containing the submission, or "-" for stdin
        #[arg(long)]
        input: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Exit code 1 if any rule is unmet
        #[arg(long)]
        fail_on_unmet: bool,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Work through a lesson's exercise interactively
    Practice {
        /// Lesson to practice, as <module>/<lesson>
        #[arg(long)]
        lesson: String,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Show completion per module
    Progress {
        /// Show per-lesson detail for one module
        #[arg(long)]
        module: Option<String>,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Lint lesson content files
    Validate {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Create starter config and example content
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("llearn=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::List { source } => commands::list::execute(source),
        Commands::Check {
            lesson,
            input,
            format,
            fail_on_unmet,
            source,
        } => commands::check::execute(lesson, input, format, fail_on_unmet, source),
        Commands::Practice { lesson, source } => commands::practice::execute(lesson, source),
        Commands::Progress { module, source } => commands::progress::execute(module, source),
        Commands::Validate { source } => commands::validate::execute(source),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
