//! Individual source files grouped into bundles.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Content provider for an asset.
#[derive(Debug, Clone)]
pub enum AssetContent {
    /// Content held in memory, supplied at registration time.
    Inline(String),
    /// Content read from disk on demand.
    File(PathBuf),
}

/// A single source file-like unit owned by exactly one bundle.
///
/// The ordering position of an asset is its index in the owning bundle's
/// asset list; insertion order is significant and preserved through
/// processing.
#[derive(Debug, Clone)]
pub struct Asset {
    /// Application-relative identity of the asset, forward slashes only.
    pub path: String,
    /// Provider for the asset's source text.
    pub content: AssetContent,
}

impl Asset {
    /// Create an asset with in-memory content.
    pub fn inline(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: AssetContent::Inline(content.into()),
        }
    }

    /// Create an asset backed by a file on disk.
    pub fn from_file(path: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            content: AssetContent::File(file.into()),
        }
    }

    /// Read the asset's source text.
    pub fn read(&self) -> Result<String> {
        match &self.content {
            AssetContent::Inline(text) => Ok(text.clone()),
            AssetContent::File(file) => fs::read_to_string(file)
                .with_context(|| format!("failed to read asset file {}", file.display())),
        }
    }

    /// Directory containing the asset source, when file-backed.
    ///
    /// Used to resolve relative `url(...)` references during stylesheet
    /// processing; inline assets have no base directory.
    pub fn base_dir(&self) -> Option<PathBuf> {
        match &self.content {
            AssetContent::Inline(_) => None,
            AssetContent::File(file) => file.parent().map(PathBuf::from),
        }
    }

    /// Filename stem of the asset path, used as the template element id.
    pub fn file_stem(&self) -> &str {
        let name = self.path.rsplit('/').next().unwrap_or(&self.path);
        name.rsplit_once('.').map_or(name, |(stem, _)| stem)
    }
}
