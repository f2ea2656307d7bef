use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use zdecay_core::errors::{ErrorInfo, ZdError};
use zdecay_core::serde::to_canonical_json_bytes;

use crate::histogram::Histogram;

/// Sampled curve drawn on top of a histogram, typically a fitted lineshape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    /// Label of the curve (model name).
    pub label: String,
    /// Parameters the curve was evaluated with.
    pub parameters: Vec<f64>,
    /// `(x, f(x))` samples across the drawn range.
    pub points: Vec<(f64, f64)>,
}

impl Overlay {
    /// Samples `curve` at `samples` evenly spaced points of `[lo, hi]`.
    pub fn sample<F>(
        label: impl Into<String>,
        parameters: Vec<f64>,
        range: (f64, f64),
        samples: usize,
        curve: F,
    ) -> Self
    where
        F: Fn(f64) -> f64,
    {
        let (lo, hi) = range;
        let points = match samples {
            0 => Vec::new(),
            1 => vec![(lo, curve(lo))],
            n => {
                let step = (hi - lo) / (n - 1) as f64;
                (0..n)
                    .map(|idx| {
                        let x = if idx == n - 1 { hi } else { lo + idx as f64 * step };
                        (x, curve(x))
                    })
                    .collect()
            }
        };
        Self {
            label: label.into(),
            parameters,
            points,
        }
    }
}

/// Consumer of finished histograms. Nothing flows back to the caller.
pub trait Renderer {
    fn render(&mut self, histogram: &Histogram, overlay: Option<&Overlay>) -> Result<(), ZdError>;
}

#[derive(Serialize)]
struct RenderedHistogram<'a> {
    name: &'a str,
    title: &'a str,
    edges: Vec<f64>,
    centers: Vec<f64>,
    counts: &'a [u64],
    underflow: u64,
    overflow: u64,
    non_finite: u64,
    entries: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    overlay: Option<&'a Overlay>,
}

/// Writes `<name>.json` per histogram into an output directory.
#[derive(Debug, Clone)]
pub struct JsonRenderer {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl JsonRenderer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Files written so far, in render order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl Renderer for JsonRenderer {
    fn render(&mut self, histogram: &Histogram, overlay: Option<&Overlay>) -> Result<(), ZdError> {
        fs::create_dir_all(&self.dir).map_err(|err| {
            ZdError::Storage(
                ErrorInfo::new("render-mkdir", err.to_string())
                    .with_context("path", self.dir.display()),
            )
        })?;
        let binning = histogram.binning();
        let payload = RenderedHistogram {
            name: histogram.name(),
            title: histogram.title(),
            edges: binning.edges(),
            centers: (0..binning.bins()).map(|idx| binning.center(idx)).collect(),
            counts: histogram.counts(),
            underflow: histogram.underflow(),
            overflow: histogram.overflow(),
            non_finite: histogram.non_finite(),
            entries: histogram.entries(),
            overlay,
        };
        let path = self.dir.join(format!("{}.json", histogram.name()));
        let bytes = to_canonical_json_bytes(&payload)?;
        fs::write(&path, bytes).map_err(|err| {
            ZdError::Storage(
                ErrorInfo::new("render-write", err.to_string()).with_context("path", path.display()),
            )
        })?;
        tracing::debug!(path = %path.display(), "histogram rendered");
        self.written.push(path);
        Ok(())
    }
}
