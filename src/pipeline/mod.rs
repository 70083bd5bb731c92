//! Per-kind transform pipelines producing final bundle content and hashes.
//!
//! Each bundle kind has a default pipeline; callers may substitute any
//! [`BundleProcessor`] implementation at registration time. Pipelines are
//! pure functions of the bundle's assets, so independent bundles can be
//! processed concurrently by the host.

mod html_template;
mod script;
mod stylesheet;

pub use html_template::HtmlTemplatePipeline;
pub use script::ScriptPipeline;
pub use stylesheet::StylesheetPipeline;

use crate::bundle::{Bundle, BundleKind, ProcessedContent};
use crate::settings::BundlerSettings;

/// Capability for turning a bundle's assets into renderable content.
pub trait BundleProcessor {
    /// Produce the final renderable text and content hash for the bundle.
    fn process(
        &self,
        bundle: &Bundle,
        settings: &BundlerSettings,
    ) -> anyhow::Result<ProcessedContent>;
}

/// Default pipeline for the given bundle kind. External script bundles run
/// their local fallback assets through the script pipeline.
pub fn default_processor(kind: &BundleKind) -> Box<dyn BundleProcessor> {
    match kind {
        BundleKind::Script | BundleKind::ExternalScript { .. } => Box::new(ScriptPipeline),
        BundleKind::Stylesheet => Box::new(StylesheetPipeline::default()),
        BundleKind::HtmlTemplate => Box::new(HtmlTemplatePipeline),
    }
}

/// Hash renderable text for cache-busting URLs.
pub(crate) fn hash_text(text: &str) -> String {
    blake3::hash(text.as_bytes()).to_hex().to_string()
}

/// Read all assets in order and join them with single newlines.
///
/// A trailing newline on each piece is stripped first so that repeated
/// processing never accumulates blank lines between assets.
pub(crate) fn concatenate_assets(bundle: &Bundle) -> anyhow::Result<String> {
    let mut pieces = Vec::with_capacity(bundle.assets.len());
    for asset in &bundle.assets {
        let text = asset.read()?;
        pieces.push(text.trim_end_matches('\n').to_string());
    }
    Ok(pieces.join("\n"))
}
