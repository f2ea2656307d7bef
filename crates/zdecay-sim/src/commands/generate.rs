use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use zdecay_sim::run_generation;

use super::{copy_config, print_json, Overrides};

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Run directory receiving events, manifest and summary.
    #[arg(long)]
    pub out: PathBuf,
    #[command(flatten)]
    pub overrides: Overrides,
}

pub fn run(args: &GenerateArgs) -> Result<(), Box<dyn Error>> {
    let config = args.overrides.load()?;
    let outcome = run_generation(&config, &args.out)?;
    copy_config(&config, &args.out)?;
    print_json(&serde_json::json!({
        "manifest": outcome.manifest_path.display().to_string(),
        "events": outcome.summary.events,
        "chunks": outcome.summary.chunks,
        "master_seed": outcome.summary.master_seed,
        "events_sha256": outcome.manifest.events_sha256,
    }))
}
