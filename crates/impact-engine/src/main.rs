//! Impact CLI - change impact analysis from the command line.
//!
//! Loads a project's dependency graph from a JSONL file, enumerates the
//! dependency paths reachable from a changed entity, and reports the scored
//! impact together with the approval decision.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use impact_engine::domain::EntityRef;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::ChangeTypeArg;

/// Default directory holding `{project}.jsonl` graph files
const DEFAULT_GRAPH_DIR: &str = ".impact/graphs";

/// Impact: dependency-path risk analysis for proposed changes.
#[derive(Parser)]
#[command(name = "impact")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Directory containing one `{project}.jsonl` graph file per project
    #[arg(short, long, global = true, default_value = DEFAULT_GRAPH_DIR)]
    graph_dir: PathBuf,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze the impact of changing an entity
    Analyze {
        /// Project whose graph to analyze
        #[arg(short, long)]
        project: i64,

        /// Changed entity, as "type:id" (e.g., "service:billing")
        #[arg(short, long, value_parser = cli::parse_entity_ref)]
        root: EntityRef,

        /// Kind of change
        #[arg(short, long, value_enum, default_value = "modification")]
        change: ChangeTypeArg,

        /// Engine configuration file (YAML), defaults to ./impact.yaml when present
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the configured maximum path depth
        #[arg(long)]
        max_depth: Option<usize>,

        /// Override the configured maximum number of paths
        #[arg(long)]
        max_paths: Option<usize>,

        /// List every enumerated path
        #[arg(long)]
        show_paths: bool,
    },

    /// Show node/edge counts, dangling edges and cycles of a project graph
    Inspect {
        /// Project whose graph to inspect
        #[arg(short, long)]
        project: i64,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn",
        1 => "impact_engine=info",
        2 => "impact_engine=debug",
        _ => "impact_engine=trace",
    };

    // Logs go to stderr so `--json` output stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Analyze {
            project,
            root,
            change,
            config,
            max_depth,
            max_paths,
            show_paths,
        } => {
            cli::analyze::run(cli::analyze::AnalyzeOptions {
                graph_dir: cli.graph_dir,
                project,
                root,
                change: change.into(),
                config,
                max_depth,
                max_paths,
                show_paths,
                json: cli.json,
            })
            .await
        }
        Commands::Inspect { project } => cli::inspect::run(&cli.graph_dir, project, cli.json).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {e}", "error".red().bold());
            // Show cause chain for nested errors
            for cause in e.chain().skip(1) {
                eprintln!("  {}: {cause}", "caused by".dimmed());
            }
            ExitCode::FAILURE
        }
    }
}
