//! Default pipeline for HTML template bundles.

use crate::bundle::{Bundle, ProcessedContent};
use crate::pipeline::{BundleProcessor, hash_text};
use crate::settings::BundlerSettings;

/// Wraps each template asset in a `<script type="text/html">` element so the
/// whole bundle can be inlined into the page and addressed by element id.
///
/// The element id is the asset's filename stem.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlTemplatePipeline;

impl BundleProcessor for HtmlTemplatePipeline {
    fn process(
        &self,
        bundle: &Bundle,
        _settings: &BundlerSettings,
    ) -> anyhow::Result<ProcessedContent> {
        let mut pieces = Vec::with_capacity(bundle.assets.len());
        for asset in &bundle.assets {
            let body = asset.read()?;
            pieces.push(format!(
                "<script id=\"{id}\" type=\"text/html\">{body}</script>",
                id = asset.file_stem(),
                body = body.trim_end_matches('\n'),
            ));
        }
        let text = pieces.join("\n");
        let hash = hash_text(&text);
        Ok(ProcessedContent { text, hash })
    }
}
