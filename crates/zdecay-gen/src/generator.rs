use std::ops::Range;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use zdecay_core::errors::{ErrorInfo, ZdError};
use zdecay_core::{Event, RngHandle};

use crate::config::GeneratorConfig;
use crate::kinematics::decay_event;

/// Summary returned to callers after a generation job completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSummary {
    /// Number of events produced.
    pub events: usize,
    /// Number of independently seeded chunks.
    pub chunks: usize,
    /// Master seed the chunk seeds were derived from.
    pub master_seed: u64,
    /// Mean sampled resonance mass.
    pub mean_mass: f64,
    /// Mean resonance transverse momentum.
    pub mean_pt: f64,
}

#[derive(Debug, Default)]
struct SummaryAccumulator {
    events: usize,
    mass_sum: f64,
    pt_sum: f64,
}

impl SummaryAccumulator {
    fn add(&mut self, events: &[Event]) {
        for event in events {
            self.events += 1;
            self.mass_sum += event.resonance_mass;
            self.pt_sum += event.transverse_momentum;
        }
    }

    fn finish(self, chunks: usize, master_seed: u64) -> GenerationSummary {
        let denom = self.events.max(1) as f64;
        GenerationSummary {
            events: self.events,
            chunks,
            master_seed,
            mean_mass: self.mass_sum / denom,
            mean_pt: self.pt_sum / denom,
        }
    }
}

/// Seeded event generator for a validated configuration.
///
/// Work is split into chunks of `chunk_size` events; chunk `k` draws from its
/// own substream of the master seed. The produced sequence therefore depends
/// on the configuration and the master seed only, never on `workers`.
#[derive(Debug, Clone)]
pub struct EventGenerator {
    config: GeneratorConfig,
}

impl EventGenerator {
    /// Validates the configuration and builds the generator.
    pub fn new(config: GeneratorConfig) -> Result<Self, ZdError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Configuration driving this generator.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Number of chunks needed to cover all events.
    pub fn chunk_count(&self) -> usize {
        self.config.events.div_ceil(self.config.chunk_size)
    }

    /// Global event indices covered by a chunk.
    pub fn chunk_bounds(&self, chunk: usize) -> Range<usize> {
        let start = (chunk * self.config.chunk_size).min(self.config.events);
        let end = (start + self.config.chunk_size).min(self.config.events);
        start..end
    }

    /// Generates the events of one chunk from its own substream.
    pub fn generate_chunk(&self, chunk: usize) -> Result<Vec<Event>, ZdError> {
        let bounds = self.chunk_bounds(chunk);
        let mut rng = RngHandle::for_substream(self.config.seed_policy.master_seed, chunk as u64);
        let mut events = Vec::with_capacity(bounds.len());
        for index in bounds {
            let event = decay_event(&self.config.physics, &mut rng)
                .map_err(|err| with_event_context(err, index, chunk))?;
            events.push(event);
        }
        tracing::debug!(chunk, events = events.len(), "chunk generated");
        Ok(events)
    }

    /// Generates every event, using `workers` threads when more than one is
    /// configured.
    pub fn generate(&self) -> Result<Vec<Event>, ZdError> {
        let chunks = self.chunk_count();
        let per_chunk: Vec<Vec<Event>> = if self.config.workers > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.workers)
                .build()
                .map_err(|err| ZdError::config("thread-pool", err.to_string()))?;
            pool.install(|| {
                (0..chunks)
                    .into_par_iter()
                    .map(|chunk| self.generate_chunk(chunk))
                    .collect::<Result<Vec<_>, ZdError>>()
            })?
        } else {
            (0..chunks)
                .map(|chunk| self.generate_chunk(chunk))
                .collect::<Result<Vec<_>, ZdError>>()?
        };
        let events: Vec<Event> = per_chunk.into_iter().flatten().collect();
        tracing::info!(
            events = events.len(),
            chunks,
            workers = self.config.workers,
            seed = self.config.seed_policy.master_seed,
            "generation complete"
        );
        Ok(events)
    }

    /// Generates chunk by chunk, handing each chunk to `sink` in order.
    ///
    /// Only one chunk is held in memory at a time.
    pub fn stream<F>(&self, mut sink: F) -> Result<GenerationSummary, ZdError>
    where
        F: FnMut(&[Event]) -> Result<(), ZdError>,
    {
        let chunks = self.chunk_count();
        let mut summary = SummaryAccumulator::default();
        for chunk in 0..chunks {
            let events = self.generate_chunk(chunk)?;
            sink(&events)?;
            summary.add(&events);
        }
        let summary = summary.finish(chunks, self.config.seed_policy.master_seed);
        tracing::info!(
            events = summary.events,
            chunks,
            mean_mass = summary.mean_mass,
            "generation streamed"
        );
        Ok(summary)
    }

    /// Summarises an already generated event list.
    pub fn summarise(&self, events: &[Event]) -> GenerationSummary {
        let mut summary = SummaryAccumulator::default();
        summary.add(events);
        summary.finish(self.chunk_count(), self.config.seed_policy.master_seed)
    }
}

/// Validates `config` and generates all of its events.
pub fn generate(config: &GeneratorConfig) -> Result<Vec<Event>, ZdError> {
    EventGenerator::new(config.clone())?.generate()
}

fn with_event_context(err: ZdError, index: usize, chunk: usize) -> ZdError {
    let annotate = |info: ErrorInfo| {
        info.with_context("stage", "generate")
            .with_context("event", index)
            .with_context("chunk", chunk)
    };
    match err {
        ZdError::Config(info) => ZdError::Config(annotate(info)),
        other => other,
    }
}
