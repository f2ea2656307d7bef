use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    analyze::{self, AnalyzeArgs},
    closure::{self, ClosureArgs},
    generate::{self, GenerateArgs},
};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "zdecay", version, about = "Resonance decay generator and lineshape fit")]
struct Cli {
    /// Log verbosity (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate events into a run directory with a manifest.
    Generate(GenerateArgs),
    /// Histogram and fit the events of a run directory.
    Analyze(AnalyzeArgs),
    /// Generate, analyze and compare the fit with the generating parameters.
    Closure(ClosureArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    match cli.command {
        Command::Generate(args) => generate::run(&args),
        Command::Analyze(args) => analyze::run(&args),
        Command::Closure(args) => closure::run(&args),
    }
}
