use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use zdecay_core::errors::{ErrorInfo, ZdError};
use zdecay_core::Event;

use crate::schema::{EventRecord, EventSink, EventSource, FIELD_NAMES};

fn csv_error(code: &str, err: impl ToString) -> ZdError {
    ZdError::storage(code, err)
}

/// CSV event writer. The header row is written on construction so even an
/// empty store carries its schema.
pub struct CsvEventWriter<W: Write> {
    writer: csv::Writer<W>,
    written: usize,
}

impl CsvEventWriter<File> {
    pub fn create(path: &Path) -> Result<Self, ZdError> {
        let file = File::create(path).map_err(|err| {
            ZdError::Storage(
                ErrorInfo::new("csv-create", err.to_string())
                    .with_context("path", path.display()),
            )
        })?;
        Self::from_writer(file)
    }
}

impl<W: Write> CsvEventWriter<W> {
    pub fn from_writer(inner: W) -> Result<Self, ZdError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(inner);
        writer
            .write_record(FIELD_NAMES)
            .map_err(|err| csv_error("csv-header", err))?;
        Ok(Self { writer, written: 0 })
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(self) -> Result<W, ZdError> {
        self.writer
            .into_inner()
            .map_err(|err| csv_error("csv-flush", err.error()))
    }
}

impl<W: Write> EventSink for CsvEventWriter<W> {
    fn write_event(&mut self, event: &Event) -> Result<(), ZdError> {
        self.writer
            .serialize(EventRecord::from(event))
            .map_err(|err| csv_error("csv-write", err))?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ZdError> {
        self.writer
            .flush()
            .map_err(|err| csv_error("csv-flush", err))
    }

    fn written(&self) -> usize {
        self.written
    }
}

/// CSV event reader. Rejects files whose header does not match the schema.
pub struct CsvEventReader<R: Read> {
    reader: csv::Reader<R>,
}

impl CsvEventReader<File> {
    pub fn open(path: &Path) -> Result<Self, ZdError> {
        let file = File::open(path).map_err(|err| {
            ZdError::Storage(
                ErrorInfo::new("csv-open", err.to_string()).with_context("path", path.display()),
            )
        })?;
        Self::from_reader(file)
    }
}

impl<R: Read> CsvEventReader<R> {
    pub fn from_reader(inner: R) -> Result<Self, ZdError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(inner);
        let headers = reader
            .headers()
            .map_err(|err| csv_error("csv-header", err))?;
        if !headers.iter().eq(FIELD_NAMES.iter().copied()) {
            return Err(ZdError::Serde(
                ErrorInfo::new("schema-mismatch", "event store header does not match schema")
                    .with_context("found", headers.iter().collect::<Vec<_>>().join(","))
                    .with_context("expected", FIELD_NAMES.join(",")),
            ));
        }
        Ok(Self { reader })
    }
}

impl<R: Read> EventSource for CsvEventReader<R> {
    fn read_all(&mut self) -> Result<Vec<Event>, ZdError> {
        let mut events = Vec::new();
        for (row, record) in self.reader.deserialize::<EventRecord>().enumerate() {
            let record = record.map_err(|err| {
                ZdError::Serde(ErrorInfo::new("csv-read", err.to_string()).with_context("row", row))
            })?;
            events.push(Event::from(record));
        }
        Ok(events)
    }
}
