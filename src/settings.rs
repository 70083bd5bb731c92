//! Runtime settings consumed by the bundle pipeline, with optional discovery
//! from a project-local JSON configuration file.

use std::fs;
use std::path::Path;

use serde::Deserialize;

const DEFAULT_CONFIG_FILE: &str = "bundlekit.config.json";

/// Default URL prefix under which processed bundles are served.
pub const DEFAULT_URL_PREFIX: &str = "_bundles";

/// Settings shared by processing, rendering and the rewrite pass.
#[derive(Debug, Clone)]
pub struct BundlerSettings {
    /// When enabled, renderers emit uncombined per-asset tags and external
    /// bundles with local assets serve those local sources directly.
    pub is_debugging_enabled: bool,
    /// Read-only flag consumed by the response-rewrite collaborator. The
    /// renderers themselves never branch on it.
    pub is_html_rewriting_enabled: bool,
    /// URL prefix for generated bundle and asset URLs.
    pub url_prefix: String,
}

impl Default for BundlerSettings {
    fn default() -> Self {
        Self {
            is_debugging_enabled: false,
            is_html_rewriting_enabled: true,
            url_prefix: DEFAULT_URL_PREFIX.into(),
        }
    }
}

/// Discoverable configuration file mirroring [`BundlerSettings`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BundlerConfig {
    /// Enables debug-mode rendering of uncombined sources.
    pub is_debugging_enabled: bool,
    /// Enables the placeholder-replacing response rewrite.
    pub is_html_rewriting_enabled: bool,
    /// URL prefix for generated bundle and asset URLs.
    pub url_prefix: String,
}

impl Default for BundlerConfig {
    fn default() -> Self {
        let settings = BundlerSettings::default();
        Self {
            is_debugging_enabled: settings.is_debugging_enabled,
            is_html_rewriting_enabled: settings.is_html_rewriting_enabled,
            url_prefix: settings.url_prefix,
        }
    }
}

impl BundlerConfig {
    /// Attempt to load configuration from the provided directory.
    ///
    /// When the configuration file does not exist or fails to parse we fall
    /// back to default values so downstream callers can continue operating
    /// with sensible assumptions.
    pub fn discover(project_dir: &Path) -> Self {
        let candidate = project_dir.join(DEFAULT_CONFIG_FILE);
        Self::from_path(&candidate).unwrap_or_default()
    }

    /// Read configuration from a specific JSON file.
    pub fn from_path(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Convert the configuration into runtime settings.
    pub fn into_settings(self) -> BundlerSettings {
        BundlerSettings {
            is_debugging_enabled: self.is_debugging_enabled,
            is_html_rewriting_enabled: self.is_html_rewriting_enabled,
            url_prefix: self.url_prefix,
        }
    }
}
