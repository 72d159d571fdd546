mod cmd;
mod output;

use clap::{Parser, Subcommand};
use cmd::{analyze::AnalyzeArgs, merge::MergeArgs};

#[derive(Parser)]
#[command(
    name = "plan-merge",
    about = "Merge subplan documents into the best-matching sections of a master plan",
    version,
    args_conflicts_with_subcommands = true,
    subcommand_negates_reqs = true
)]
struct Cli {
    #[command(flatten)]
    merge: MergeArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a document's heading structure and themes
    Analyze(AnalyzeArgs),
}

fn main() {
    let cli = Cli::parse();

    let verbose = match &cli.command {
        Some(Commands::Analyze(args)) => args.verbose,
        None => cli.merge.verbose,
    };
    let default_level = if verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Some(Commands::Analyze(args)) => cmd::analyze::run(&args),
        None => cmd::merge::run(&cli.merge),
    };

    if let Err(e) = result {
        if verbose {
            // Full cause chain, one cause per line
            eprintln!("error: {e:?}");
        } else {
            eprintln!("error: {e:#}");
        }
        std::process::exit(1);
    }
}
