use std::error::Error;
use std::path::Path;

use clap::Args;
use zdecay_sim::RunConfig;
use zdecay_store::StoreFormat;

pub mod analyze;
pub mod closure;
pub mod generate;

/// Flags overriding fields of the YAML configuration.
#[derive(Args, Debug, Clone, Default)]
pub struct Overrides {
    /// YAML run configuration; built-in defaults when omitted.
    #[arg(long)]
    pub config: Option<std::path::PathBuf>,
    /// Number of events to generate.
    #[arg(long)]
    pub events: Option<usize>,
    /// Master seed.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Worker threads for generation.
    #[arg(long)]
    pub workers: Option<usize>,
    /// Event store format (csv or binary).
    #[arg(long, value_parser = parse_format)]
    pub format: Option<StoreFormat>,
    /// Disable energy smearing.
    #[arg(long)]
    pub no_smearing: bool,
}

fn parse_format(value: &str) -> Result<StoreFormat, String> {
    match value {
        "csv" => Ok(StoreFormat::Csv),
        "binary" | "zdb" => Ok(StoreFormat::Binary),
        other => Err(format!("unknown store format `{other}`")),
    }
}

impl Overrides {
    pub fn load(&self) -> Result<RunConfig, Box<dyn Error>> {
        let mut config = match &self.config {
            Some(path) => RunConfig::load(path)?,
            None => RunConfig::default(),
        };
        if let Some(events) = self.events {
            config.generator.events = events;
        }
        if let Some(seed) = self.seed {
            config.generator.seed_policy.master_seed = seed;
        }
        if let Some(workers) = self.workers {
            config.generator.workers = workers;
        }
        if let Some(format) = self.format {
            config.store.format = format;
        }
        if self.no_smearing {
            config.generator.physics = config.generator.physics.without_smearing();
        }
        config.validate()?;
        Ok(config)
    }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn copy_config(config: &RunConfig, out: &Path) -> Result<(), Box<dyn Error>> {
    std::fs::write(out.join("config.yaml"), serde_yaml::to_string(config)?)?;
    Ok(())
}
