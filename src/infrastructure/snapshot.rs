//! Family snapshots stored as JSON or TOML files.
//!
//! JSON snapshots are either `{"families": [...]}` or a bare array of
//! families (the shape a REST backend returns). TOML snapshots use
//! `[[families]]` tables with nested `[[families.members]]`.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::Family;
use crate::infrastructure::traits::{FamilySource, FileSystem};

/// On-disk encoding of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Toml,
}

impl SnapshotFormat {
    /// Detect from the file extension; anything but `.toml` is read as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => SnapshotFormat::Toml,
            _ => SnapshotFormat::Json,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Snapshot {
    #[serde(default)]
    families: Vec<Family>,
}

fn invalid_data<E>(e: E) -> io::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    io::Error::new(io::ErrorKind::InvalidData, e)
}

/// Parse snapshot content in the given format.
pub fn parse_snapshot(content: &str, format: SnapshotFormat) -> io::Result<Vec<Family>> {
    match format {
        SnapshotFormat::Json => {
            let value: serde_json::Value = serde_json::from_str(content).map_err(invalid_data)?;
            if value.is_array() {
                serde_json::from_value(value).map_err(invalid_data)
            } else {
                serde_json::from_value::<Snapshot>(value)
                    .map(|s| s.families)
                    .map_err(invalid_data)
            }
        }
        SnapshotFormat::Toml => toml::from_str::<Snapshot>(content)
            .map(|s| s.families)
            .map_err(invalid_data),
    }
}

/// Reads families from a snapshot file.
pub struct SnapshotSource {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
    format: SnapshotFormat,
}

impl SnapshotSource {
    pub fn new(fs: Arc<dyn FileSystem>, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = SnapshotFormat::from_path(&path);
        Self { fs, path, format }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FamilySource for SnapshotSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    #[instrument(level = "debug", skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> ApplicationResult<Vec<Family>> {
        if !self.fs.is_file(&self.path) {
            return Err(ApplicationError::OperationFailed {
                context: format!("snapshot not found: {}", self.path.display()),
                source: Box::new(io::Error::new(
                    io::ErrorKind::NotFound,
                    "snapshot file does not exist",
                )),
            });
        }
        let content = self
            .fs
            .read_to_string(&self.path)
            .with_path_context("read snapshot", &self.path)?;
        let families =
            parse_snapshot(&content, self.format).with_path_context("parse snapshot", &self.path)?;
        debug!("loaded {} families ({:?})", families.len(), self.format);
        Ok(families)
    }
}
