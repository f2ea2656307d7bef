use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zdecay_core::errors::{ErrorInfo, ZdError};
use zdecay_core::serde::{from_json_slice, to_canonical_json_bytes};
use zdecay_core::{RunProvenance, SchemaVersion};

use crate::schema::{StoreFormat, EVENT_SCHEMA};

/// Structured manifest describing a completed generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest<C> {
    /// Event record schema the store was written with.
    pub schema_version: SchemaVersion,
    /// Configuration used for the run.
    pub config: C,
    /// Master seed used to derive chunk substreams.
    pub master_seed: u64,
    /// Optional seed label captured from the configuration.
    pub seed_label: Option<String>,
    /// Encoding of the event file.
    pub format: StoreFormat,
    /// Event file; a relative path resolves against the manifest directory.
    pub events_file: PathBuf,
    /// Number of events in the store.
    pub event_count: usize,
    /// Hex sha256 of the event file.
    pub events_sha256: String,
    /// Run provenance.
    pub provenance: RunProvenance,
}

impl<C: Serialize + DeserializeOwned> RunManifest<C> {
    /// Assembles a manifest for an already written event file.
    pub fn describe(
        config: C,
        master_seed: u64,
        seed_label: Option<String>,
        format: StoreFormat,
        events_path: &Path,
        event_count: usize,
        provenance: RunProvenance,
    ) -> Result<Self, ZdError> {
        Ok(Self {
            schema_version: EVENT_SCHEMA,
            config,
            master_seed,
            seed_label,
            format,
            events_file: events_path.to_path_buf(),
            event_count,
            events_sha256: file_digest(events_path)?,
            provenance,
        })
    }

    /// Records the event file relative to `run_dir`, the directory the
    /// manifest is written to, so the run directory can be moved as a whole.
    pub fn relative_to(mut self, run_dir: &Path) -> Result<Self, ZdError> {
        let relative = self.events_file.strip_prefix(run_dir).map_err(|_| {
            ZdError::Config(
                ErrorInfo::new("events-outside-run", "event file is not inside the run directory")
                    .with_context("events_file", self.events_file.display())
                    .with_context("run_dir", run_dir.display()),
            )
        })?;
        self.events_file = relative.to_path_buf();
        Ok(self)
    }

    /// Writes the manifest as canonical JSON.
    pub fn write(&self, path: &Path) -> Result<(), ZdError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| {
                ZdError::Storage(
                    ErrorInfo::new("manifest-mkdir", err.to_string())
                        .with_context("path", parent.display()),
                )
            })?;
        }
        let bytes = to_canonical_json_bytes(self)?;
        fs::write(path, bytes).map_err(|err| {
            ZdError::Storage(
                ErrorInfo::new("manifest-write", err.to_string())
                    .with_context("path", path.display()),
            )
        })
    }

    /// Loads a manifest from disk.
    pub fn load(path: &Path) -> Result<Self, ZdError> {
        let bytes = fs::read(path).map_err(|err| {
            ZdError::Storage(
                ErrorInfo::new("manifest-read", err.to_string())
                    .with_context("path", path.display()),
            )
        })?;
        from_json_slice(&bytes)
    }

    /// Resolves the event file next to the manifest at `manifest_path`.
    pub fn events_path(&self, manifest_path: &Path) -> PathBuf {
        match manifest_path.parent() {
            Some(dir) => dir.join(&self.events_file),
            None => self.events_file.clone(),
        }
    }

    /// Recomputes the event file digest and compares it to the recorded one.
    pub fn verify(&self, manifest_path: &Path) -> Result<(), ZdError> {
        let path = self.events_path(manifest_path);
        let digest = file_digest(&path)?;
        if digest != self.events_sha256 {
            return Err(ZdError::Storage(
                ErrorInfo::new("digest-mismatch", "event file does not match its manifest")
                    .with_context("path", path.display())
                    .with_context("expected", &self.events_sha256)
                    .with_context("found", digest),
            ));
        }
        Ok(())
    }
}

/// Hex sha256 of the canonical JSON encoding of `value`.
pub fn stable_hash<T: Serialize>(value: &T) -> Result<String, ZdError> {
    let bytes = to_canonical_json_bytes(value)?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

/// Hex sha256 of a file's contents.
pub fn file_digest(path: &Path) -> Result<String, ZdError> {
    let mut file = File::open(path).map_err(|err| {
        ZdError::Storage(
            ErrorInfo::new("digest-open", err.to_string()).with_context("path", path.display()),
        )
    })?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher).map_err(|err| ZdError::storage("digest-read", err))?;
    Ok(format!("{:x}", hasher.finalize()))
}
