//! Event store formats and run manifests.
//!
//! Generators write through [`EventSink`], analyzers read through
//! [`EventSource`]; both formats share the record layout in [`schema`].

pub mod binary_store;
pub mod csv_store;
pub mod manifest;
pub mod schema;

use std::path::Path;

use zdecay_core::errors::ZdError;
use zdecay_core::Event;

pub use binary_store::{BinaryEventReader, BinaryEventWriter};
pub use csv_store::{CsvEventReader, CsvEventWriter};
pub use manifest::{file_digest, stable_hash, RunManifest};
pub use schema::{EventRecord, EventSink, EventSource, StoreFormat, EVENT_SCHEMA, FIELD_NAMES};

/// Opens a writer for `path` in the requested format, truncating any existing file.
pub fn open_sink(format: StoreFormat, path: &Path) -> Result<Box<dyn EventSink>, ZdError> {
    Ok(match format {
        StoreFormat::Csv => Box::new(CsvEventWriter::create(path)?),
        StoreFormat::Binary => Box::new(BinaryEventWriter::create(path)?),
    })
}

/// Opens a reader for `path` in the requested format.
pub fn open_source(format: StoreFormat, path: &Path) -> Result<Box<dyn EventSource>, ZdError> {
    Ok(match format {
        StoreFormat::Csv => Box::new(CsvEventReader::open(path)?),
        StoreFormat::Binary => Box::new(BinaryEventReader::open(path)?),
    })
}

/// Writes `events` to a fresh store at `path`.
pub fn write_events(format: StoreFormat, path: &Path, events: &[Event]) -> Result<(), ZdError> {
    let mut sink = open_sink(format, path)?;
    sink.write_all(events)?;
    sink.finish()?;
    tracing::info!(path = %path.display(), events = events.len(), ?format, "event store written");
    Ok(())
}

/// Reads every event stored at `path`.
pub fn read_events(format: StoreFormat, path: &Path) -> Result<Vec<Event>, ZdError> {
    let events = open_source(format, path)?.read_all()?;
    tracing::info!(path = %path.display(), events = events.len(), ?format, "event store read");
    Ok(events)
}
