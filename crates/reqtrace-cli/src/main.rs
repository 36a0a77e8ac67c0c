mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::matrix::MatrixSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "reqtrace",
    about = "Requirement traceability toolkit — link requirements to design, code, tests, and commits",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .reqtrace/ or .git/)
    #[arg(long, global = true, env = "REQTRACE_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize requirement tracing in the current project
    Init,

    /// Scan the tree and git history, then save the traceability matrix
    Scan {
        /// Feature id the matrix is stored under (default: project directory name)
        #[arg(long)]
        feature: Option<String>,

        /// Skip the git history scan
        #[arg(long)]
        no_commits: bool,
    },

    /// One-shot scan and gap check; exits 1 when gaps exist
    Check {
        /// Also report requirements no commit references
        #[arg(long)]
        commits: bool,
    },

    /// Show gaps for a stored matrix; exits 1 when gaps exist
    Gaps {
        /// Matrix file name or feature id (default: project directory name)
        name: Option<String>,

        /// Also report requirements no commit references
        #[arg(long)]
        commits: bool,
    },

    /// Manage stored matrices
    Matrix {
        #[command(subcommand)]
        subcommand: MatrixSubcommand,
    },

    /// Render recent commit history grouped by requirement
    Changelog {
        /// Number of commits to inspect
        #[arg(long, default_value_t = reqtrace_core::scan::DEFAULT_COMMIT_LIMIT)]
        limit: usize,

        /// Write Markdown to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let root_path = cli.root.as_deref();
    let root = root::resolve_root(root_path);

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Scan {
            feature,
            no_commits,
        } => cmd::scan::run(&root, feature.as_deref(), no_commits, cli.json),
        Commands::Check { commits } => cmd::check::run(&root, commits, cli.json),
        Commands::Gaps { name, commits } => {
            cmd::gaps::run(&root, name.as_deref(), commits, cli.json)
        }
        Commands::Matrix { subcommand } => cmd::matrix::run(&root, subcommand, cli.json),
        Commands::Changelog { limit, output } => {
            cmd::changelog::run(&root, limit, output.as_deref(), cli.json)
        }
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
