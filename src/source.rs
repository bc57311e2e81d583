//! Backing stores for the reference catalogue and the narrative corpus.
//!
//! The engine reads its data through the [`ContentSource`] trait exactly once.
//! [`FileContentSource`] reads a content directory with async I/O;
//! [`StaticContentSource`] serves data already held in memory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::catalog::{ProfileRecord, builtin};
use crate::error::InitializationError;
use crate::narrative::RawCorpus;

/// File name of the catalogue inside a content directory.
pub const CATALOG_FILE: &str = "catalog.toml";

/// File name of the narrative corpus inside a content directory.
pub const NARRATIVES_FILE: &str = "narratives.json";

/// Maximum size of `catalog.toml` (256 KiB).
const MAX_CATALOG_FILE_SIZE: u64 = 256 * 1024;

/// Maximum size of `narratives.json` (32 MiB).
const MAX_NARRATIVES_FILE_SIZE: u64 = 32 * 1024 * 1024;

/// Supplies raw reference data to the engine.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Short description used in logs.
    fn describe(&self) -> String;

    /// Raw catalogue records; validated by the caller.
    async fn fetch_catalog(&self) -> Result<Vec<ProfileRecord>, InitializationError>;

    /// Raw narrative corpus; keys are canonicalized by the caller.
    async fn fetch_narratives(&self) -> Result<RawCorpus, InitializationError>;
}

/// On-disk shape of `catalog.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(rename = "profile", default)]
    pub profiles: Vec<ProfileRecord>,
}

/// Reads `catalog.toml` and `narratives.json` from a directory.
#[derive(Debug, Clone)]
pub struct FileContentSource {
    dir: PathBuf,
}

impl FileContentSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl ContentSource for FileContentSource {
    fn describe(&self) -> String {
        format!("directory {}", self.dir.display())
    }

    async fn fetch_catalog(&self) -> Result<Vec<ProfileRecord>, InitializationError> {
        let path = self.dir.join(CATALOG_FILE);
        let content = read_capped(&path, MAX_CATALOG_FILE_SIZE).await?;
        let file: CatalogFile =
            toml::from_str(&content).map_err(|e| InitializationError::ParseFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        tracing::debug!(records = file.profiles.len(), "Read catalog from {:?}", path);
        Ok(file.profiles)
    }

    async fn fetch_narratives(&self) -> Result<RawCorpus, InitializationError> {
        let path = self.dir.join(NARRATIVES_FILE);
        let content = read_capped(&path, MAX_NARRATIVES_FILE_SIZE).await?;
        let corpus: RawCorpus =
            serde_json::from_str(&content).map_err(|e| InitializationError::ParseFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        tracing::debug!(entries = corpus.len(), "Read narratives from {:?}", path);
        Ok(corpus)
    }
}

/// Read a UTF-8 file, rejecting it before reading if it exceeds `max` bytes.
async fn read_capped(path: &Path, max: u64) -> Result<String, InitializationError> {
    let read_failed = |e: std::io::Error| InitializationError::ReadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    };

    let meta = tokio::fs::metadata(path).await.map_err(read_failed)?;
    if meta.len() > max {
        return Err(InitializationError::TooLarge {
            path: path.display().to_string(),
            size: meta.len(),
            max,
        });
    }

    let content = tokio::fs::read_to_string(path).await.map_err(read_failed)?;
    // Strip a UTF-8 BOM left by some editors.
    Ok(content
        .strip_prefix('\u{feff}')
        .map(str::to_string)
        .unwrap_or(content))
}

/// Serves records and narratives held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticContentSource {
    catalog: Vec<ProfileRecord>,
    narratives: RawCorpus,
}

impl StaticContentSource {
    pub fn new(catalog: Vec<ProfileRecord>, narratives: RawCorpus) -> Self {
        Self {
            catalog,
            narratives,
        }
    }

    /// The built-in catalogue with the given narratives.
    pub fn builtin(narratives: RawCorpus) -> Self {
        Self::new(builtin::records(), narratives)
    }
}

#[async_trait]
impl ContentSource for StaticContentSource {
    fn describe(&self) -> String {
        format!(
            "in-memory ({} records, {} narratives)",
            self.catalog.len(),
            self.narratives.len()
        )
    }

    async fn fetch_catalog(&self) -> Result<Vec<ProfileRecord>, InitializationError> {
        Ok(self.catalog.clone())
    }

    async fn fetch_narratives(&self) -> Result<RawCorpus, InitializationError> {
        Ok(self.narratives.clone())
    }
}
