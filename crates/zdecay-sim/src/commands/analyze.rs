use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use zdecay_hist::JsonRenderer;
use zdecay_sim::{analyze, load_run, write_json, RunConfig};

use super::print_json;

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Run directory produced by `zdecay generate`.
    #[arg(long)]
    pub input: PathBuf,
    /// Output directory for histograms and fit results.
    #[arg(long)]
    pub out: PathBuf,
    /// YAML whose `analysis` section replaces the one recorded in the run.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Seed the fit from the histogram peak instead of the configured guess.
    #[arg(long)]
    pub guess: bool,
}

pub fn run(args: &AnalyzeArgs) -> Result<(), Box<dyn Error>> {
    let (manifest, events) = load_run(&args.input)?;
    let mut analysis_config = match &args.config {
        Some(path) => RunConfig::load(path)?.analysis,
        None => manifest.config.analysis,
    };
    if args.guess {
        analysis_config.fit.guess_from_histogram = true;
    }

    let analysis = analyze(&events, &analysis_config)?;
    let mut renderer = JsonRenderer::new(args.out.join("histograms"));
    analysis.render(
        &mut renderer,
        &analysis_config.fit.target,
        analysis_config.fit.overlay_samples,
    )?;
    let report = analysis.report(events.len(), &analysis_config.fit.target);
    write_json(&args.out.join("fit_result.json"), &analysis.fit)?;
    write_json(&args.out.join("analysis_report.json"), &report)?;
    print_json(&report.fit)
}
