//! Default pipeline for script bundles.

use crate::bundle::{Bundle, ProcessedContent};
use crate::pipeline::{BundleProcessor, concatenate_assets, hash_text};
use crate::settings::BundlerSettings;

/// Concatenates script assets in insertion order.
///
/// Minification is deliberately not performed here; hosts wanting minified
/// output substitute their own [`BundleProcessor`] wrapping their compiler of
/// choice.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScriptPipeline;

impl BundleProcessor for ScriptPipeline {
    fn process(
        &self,
        bundle: &Bundle,
        _settings: &BundlerSettings,
    ) -> anyhow::Result<ProcessedContent> {
        let text = concatenate_assets(bundle)?;
        let hash = hash_text(&text);
        Ok(ProcessedContent { text, hash })
    }
}
