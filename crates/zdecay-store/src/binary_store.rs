use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use zdecay_core::errors::{ErrorInfo, ZdError};
use zdecay_core::{Event, SchemaVersion};

use crate::schema::{EventRecord, EventSink, EventSource, EVENT_SCHEMA, FIELD_NAMES};

/// File magic of the binary event store.
pub const MAGIC: [u8; 4] = *b"ZDEV";

/// Size of one encoded record.
pub const RECORD_BYTES: u64 = 8 * FIELD_NAMES.len() as u64;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct BinaryHeader {
    magic: [u8; 4],
    schema: SchemaVersion,
    fields: u32,
}

impl BinaryHeader {
    fn current() -> Self {
        Self {
            magic: MAGIC,
            schema: EVENT_SCHEMA,
            fields: FIELD_NAMES.len() as u32,
        }
    }
}

fn bincode_error(code: &str, err: bincode::Error) -> ZdError {
    match *err {
        bincode::ErrorKind::Io(io) => ZdError::storage(code, io),
        other => ZdError::serde(code, other),
    }
}

/// Binary event writer: header, then one fixed-width record per event.
pub struct BinaryEventWriter<W: Write> {
    writer: BufWriter<W>,
    written: usize,
}

impl BinaryEventWriter<File> {
    pub fn create(path: &Path) -> Result<Self, ZdError> {
        let file = File::create(path).map_err(|err| {
            ZdError::Storage(
                ErrorInfo::new("binary-create", err.to_string())
                    .with_context("path", path.display()),
            )
        })?;
        Self::from_writer(file)
    }
}

impl<W: Write> BinaryEventWriter<W> {
    pub fn from_writer(inner: W) -> Result<Self, ZdError> {
        let mut writer = BufWriter::new(inner);
        bincode::serialize_into(&mut writer, &BinaryHeader::current())
            .map_err(|err| bincode_error("binary-header", err))?;
        Ok(Self { writer, written: 0 })
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(self) -> Result<W, ZdError> {
        self.writer
            .into_inner()
            .map_err(|err| ZdError::storage("binary-flush", err.error()))
    }
}

impl<W: Write> EventSink for BinaryEventWriter<W> {
    fn write_event(&mut self, event: &Event) -> Result<(), ZdError> {
        bincode::serialize_into(&mut self.writer, &EventRecord::from(event))
            .map_err(|err| bincode_error("binary-write", err))?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ZdError> {
        self.writer
            .flush()
            .map_err(|err| ZdError::storage("binary-flush", err))
    }

    fn written(&self) -> usize {
        self.written
    }
}

/// Binary event reader. The record count is derived from the payload length,
/// so a truncated trailing record is reported instead of silently dropped.
pub struct BinaryEventReader<R: Read> {
    reader: BufReader<R>,
    remaining: u64,
}

impl BinaryEventReader<File> {
    pub fn open(path: &Path) -> Result<Self, ZdError> {
        let file = File::open(path).map_err(|err| {
            ZdError::Storage(
                ErrorInfo::new("binary-open", err.to_string())
                    .with_context("path", path.display()),
            )
        })?;
        let len = file
            .metadata()
            .map_err(|err| ZdError::storage("binary-open", err))?
            .len();
        Self::from_reader(file, len)
    }
}

impl<R: Read> BinaryEventReader<R> {
    /// Wraps a reader over `total_len` bytes of encoded store.
    pub fn from_reader(inner: R, total_len: u64) -> Result<Self, ZdError> {
        let mut reader = BufReader::new(inner);
        let header: BinaryHeader = bincode::deserialize_from(&mut reader)
            .map_err(|err| bincode_error("binary-header", err))?;
        if header.magic != MAGIC || header.fields as usize != FIELD_NAMES.len() {
            return Err(ZdError::Serde(
                ErrorInfo::new("schema-mismatch", "not a zdecay binary event store")
                    .with_context("fields", header.fields),
            ));
        }
        if header.schema.major != EVENT_SCHEMA.major {
            return Err(ZdError::Serde(
                ErrorInfo::new("schema-mismatch", "unsupported binary schema version")
                    .with_context("major", header.schema.major),
            ));
        }
        let header_len = bincode::serialized_size(&header)
            .map_err(|err| bincode_error("binary-header", err))?;
        let payload = total_len.saturating_sub(header_len);
        if payload % RECORD_BYTES != 0 {
            return Err(ZdError::Storage(
                ErrorInfo::new("truncated-record", "binary event store ends mid-record")
                    .with_context("payload_bytes", payload),
            ));
        }
        Ok(Self {
            reader,
            remaining: payload / RECORD_BYTES,
        })
    }
}

impl<R: Read> EventSource for BinaryEventReader<R> {
    fn read_all(&mut self) -> Result<Vec<Event>, ZdError> {
        let mut events = Vec::with_capacity(self.remaining as usize);
        while self.remaining > 0 {
            let record: EventRecord = bincode::deserialize_from(&mut self.reader)
                .map_err(|err| bincode_error("binary-read", err))?;
            events.push(Event::from(record));
            self.remaining -= 1;
        }
        Ok(events)
    }
}
