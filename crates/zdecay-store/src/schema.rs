use std::path::Path;

use serde::{Deserialize, Serialize};
use zdecay_core::errors::{ErrorInfo, ZdError};
use zdecay_core::{Event, FourMomentum, SchemaVersion};

/// Schema version written into binary headers and manifests.
pub const EVENT_SCHEMA: SchemaVersion = SchemaVersion::new(1, 0, 0);

/// Field names of an event record, in storage order.
pub const FIELD_NAMES: [&str; 10] = [
    "resonance_mass",
    "lepton_a_px",
    "lepton_a_py",
    "lepton_a_pz",
    "lepton_a_e",
    "lepton_b_px",
    "lepton_b_py",
    "lepton_b_pz",
    "lepton_b_e",
    "transverse_momentum",
];

/// Flat, fixed-width storage layout of an [`Event`].
///
/// Field order is part of the on-disk contract and matches [`FIELD_NAMES`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EventRecord {
    pub resonance_mass: f64,
    pub lepton_a_px: f64,
    pub lepton_a_py: f64,
    pub lepton_a_pz: f64,
    pub lepton_a_e: f64,
    pub lepton_b_px: f64,
    pub lepton_b_py: f64,
    pub lepton_b_pz: f64,
    pub lepton_b_e: f64,
    pub transverse_momentum: f64,
}

impl EventRecord {
    /// Record values in storage order.
    pub fn values(&self) -> [f64; 10] {
        [
            self.resonance_mass,
            self.lepton_a_px,
            self.lepton_a_py,
            self.lepton_a_pz,
            self.lepton_a_e,
            self.lepton_b_px,
            self.lepton_b_py,
            self.lepton_b_pz,
            self.lepton_b_e,
            self.transverse_momentum,
        ]
    }
}

impl From<&Event> for EventRecord {
    fn from(event: &Event) -> Self {
        Self {
            resonance_mass: event.resonance_mass,
            lepton_a_px: event.lepton_a.px,
            lepton_a_py: event.lepton_a.py,
            lepton_a_pz: event.lepton_a.pz,
            lepton_a_e: event.lepton_a.e,
            lepton_b_px: event.lepton_b.px,
            lepton_b_py: event.lepton_b.py,
            lepton_b_pz: event.lepton_b.pz,
            lepton_b_e: event.lepton_b.e,
            transverse_momentum: event.transverse_momentum,
        }
    }
}

impl From<EventRecord> for Event {
    fn from(record: EventRecord) -> Self {
        Event {
            resonance_mass: record.resonance_mass,
            lepton_a: FourMomentum::new(
                record.lepton_a_e,
                record.lepton_a_px,
                record.lepton_a_py,
                record.lepton_a_pz,
            ),
            lepton_b: FourMomentum::new(
                record.lepton_b_e,
                record.lepton_b_px,
                record.lepton_b_py,
                record.lepton_b_pz,
            ),
            transverse_momentum: record.transverse_momentum,
        }
    }
}

/// On-disk encoding of an event store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoreFormat {
    /// Comma separated text with a header row.
    #[default]
    Csv,
    /// Fixed 80-byte little-endian records behind a small header.
    Binary,
}

impl StoreFormat {
    /// Picks the format from a file extension (`.csv` or `.zdb`).
    pub fn from_path(path: &Path) -> Result<Self, ZdError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("csv") => Ok(StoreFormat::Csv),
            Some("zdb") | Some("bin") => Ok(StoreFormat::Binary),
            _ => Err(ZdError::Config(
                ErrorInfo::new("store-format", "cannot infer event store format from path")
                    .with_context("path", path.display())
                    .with_hint("use a .csv or .zdb extension or set store.format"),
            )),
        }
    }

    /// Conventional file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            StoreFormat::Csv => "csv",
            StoreFormat::Binary => "zdb",
        }
    }
}

/// Writer side of the event store contract.
pub trait EventSink {
    /// Appends one event.
    fn write_event(&mut self, event: &Event) -> Result<(), ZdError>;

    /// Appends events in order.
    fn write_all(&mut self, events: &[Event]) -> Result<(), ZdError> {
        for event in events {
            self.write_event(event)?;
        }
        Ok(())
    }

    /// Flushes buffered records. Must be called before the store is read.
    fn finish(&mut self) -> Result<(), ZdError>;

    /// Number of events written so far.
    fn written(&self) -> usize;
}

/// Reader side of the event store contract.
pub trait EventSource {
    /// Reads every remaining event in storage order.
    fn read_all(&mut self) -> Result<Vec<Event>, ZdError>;
}
