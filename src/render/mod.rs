//! Per-kind HTML rendering strategies.
//!
//! Renderers are resolved from the bundle's kind tag; hosts needing custom
//! markup implement [`BundleHtmlRenderer`] and bypass [`render_bundle`]. Tag
//! output is byte-for-byte stable, with a fixed attribute order, so pages can
//! be diffed and cached reliably.

mod external;
mod html_template;
mod script;
mod stylesheet;
pub mod urls;

pub use external::{ExternalScriptBundleHtmlRenderer, escape_fallback_html};
pub use html_template::HtmlTemplateHtmlRenderer;
pub use script::ScriptBundleHtmlRenderer;
pub use stylesheet::StylesheetHtmlRenderer;

use crate::bundle::{Bundle, BundleKind};
use crate::error::Result;
use crate::settings::BundlerSettings;

/// Capability for turning a resolved bundle into an HTML fragment.
pub trait BundleHtmlRenderer {
    /// Render the bundle as HTML. A bundle with no assets and no external URL
    /// renders to the empty string.
    fn render(&self, bundle: &Bundle, settings: &BundlerSettings) -> Result<String>;
}

/// Resolve the default renderer for a bundle kind.
///
/// External script bundles get the decorating renderer with the plain script
/// renderer as its fallback strategy.
pub fn renderer_for(kind: &BundleKind) -> Box<dyn BundleHtmlRenderer> {
    match kind {
        BundleKind::Script => Box::new(ScriptBundleHtmlRenderer),
        BundleKind::Stylesheet => Box::new(StylesheetHtmlRenderer),
        BundleKind::HtmlTemplate => Box::new(HtmlTemplateHtmlRenderer),
        BundleKind::ExternalScript { .. } => Box::new(ExternalScriptBundleHtmlRenderer::new(
            Box::new(ScriptBundleHtmlRenderer),
        )),
    }
}

/// Render a bundle with the default renderer for its kind.
pub fn render_bundle(bundle: &Bundle, settings: &BundlerSettings) -> Result<String> {
    renderer_for(&bundle.kind).render(bundle, settings)
}
