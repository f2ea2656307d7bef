use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use zdecay_hist::JsonRenderer;
use zdecay_sim::{analyze, closure_report, load_run, run_generation, write_json};

use super::{copy_config, print_json, Overrides};

#[derive(Args, Debug)]
pub struct ClosureArgs {
    /// Directory receiving the generated run and its analysis.
    #[arg(long)]
    pub out: PathBuf,
    #[command(flatten)]
    pub overrides: Overrides,
}

pub fn run(args: &ClosureArgs) -> Result<(), Box<dyn Error>> {
    let config = args.overrides.load()?;
    let run_dir = args.out.join("run");
    run_generation(&config, &run_dir)?;
    copy_config(&config, &run_dir)?;

    let (manifest, events) = load_run(&run_dir)?;
    let analysis = analyze(&events, &manifest.config.analysis)?;
    let analysis_dir = args.out.join("analysis");
    let mut renderer = JsonRenderer::new(analysis_dir.join("histograms"));
    analysis.render(
        &mut renderer,
        &manifest.config.analysis.fit.target,
        manifest.config.analysis.fit.overlay_samples,
    )?;
    write_json(&analysis_dir.join("fit_result.json"), &analysis.fit)?;

    let report = closure_report(&config, &analysis.fit);
    write_json(&args.out.join("closure.json"), &report)?;
    print_json(&report)?;
    if !report.passed {
        return Err(format!(
            "closure failed: mass deviation {:.4}, width deviation {:.4}",
            report.mass_deviation, report.width_deviation
        )
        .into());
    }
    tracing::info!(
        mass_deviation = report.mass_deviation,
        width_deviation = report.width_deviation,
        "closure passed"
    );
    Ok(())
}
