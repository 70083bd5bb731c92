//! Renderer for HTML template bundles.

use anyhow::anyhow;

use crate::bundle::Bundle;
use crate::error::{BundleError, Result};
use crate::render::BundleHtmlRenderer;
use crate::settings::BundlerSettings;

/// Inlines the processed template content directly into the page.
///
/// Template bundles are embedded rather than referenced by URL, so debug mode
/// makes no difference here.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlTemplateHtmlRenderer;

impl BundleHtmlRenderer for HtmlTemplateHtmlRenderer {
    fn render(&self, bundle: &Bundle, _settings: &BundlerSettings) -> Result<String> {
        if bundle.assets.is_empty() {
            return Ok(String::new());
        }

        let content = bundle.processed().ok_or_else(|| BundleError::Processing {
            bundle: bundle.path.clone(),
            source: anyhow!("bundle has not been processed"),
        })?;
        Ok(content.text.clone())
    }
}
