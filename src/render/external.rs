//! Renderer for CDN-hosted script bundles with an optional local fallback.

use anyhow::anyhow;

use crate::bundle::{Bundle, BundleKind};
use crate::error::{BundleError, Result};
use crate::render::BundleHtmlRenderer;
use crate::render::script::script_tag;
use crate::settings::BundlerSettings;

/// Decorates a fallback renderer to produce CDN script tags with an optional
/// self-detecting local fallback.
///
/// - No local assets: exactly one external `<script>` tag; the fallback
///   renderer is never consulted.
/// - Local assets in debug mode: the external URL is ignored and only the
///   fallback renderer's output is returned, serving local uncombined sources
///   during development.
/// - Local assets in release mode: the external tag followed by an inline
///   guard that `document.write`s the fallback tags when the configured
///   condition detects that the CDN script failed to load.
pub struct ExternalScriptBundleHtmlRenderer {
    fallback: Box<dyn BundleHtmlRenderer>,
}

impl ExternalScriptBundleHtmlRenderer {
    /// Wrap the renderer used for the bundle's local fallback assets.
    pub fn new(fallback: Box<dyn BundleHtmlRenderer>) -> Self {
        Self { fallback }
    }
}

impl BundleHtmlRenderer for ExternalScriptBundleHtmlRenderer {
    fn render(&self, bundle: &Bundle, settings: &BundlerSettings) -> Result<String> {
        let BundleKind::ExternalScript {
            url,
            fallback_condition,
        } = &bundle.kind
        else {
            return Err(BundleError::Processing {
                bundle: bundle.path.clone(),
                source: anyhow!("renderer requires an external script bundle"),
            });
        };

        if bundle.assets.is_empty() {
            return Ok(script_tag(url));
        }

        if settings.is_debugging_enabled {
            return self.fallback.render(bundle, settings);
        }

        let condition = fallback_condition
            .as_deref()
            .filter(|condition| !condition.is_empty())
            .ok_or_else(|| BundleError::MissingFallbackCondition {
                bundle: bundle.path.clone(),
            })?;

        let fallback_html = self.fallback.render(bundle, settings)?;
        Ok([
            script_tag(url),
            "<script type=\"text/javascript\">".to_string(),
            format!("if({condition}){{"),
            format!(
                "document.write(unescape('{}'));",
                escape_fallback_html(&fallback_html)
            ),
            "}".to_string(),
            "</script>".to_string(),
        ]
        .join("\n"))
    }
}

/// Percent-encode `<` and `>` so fallback HTML can live inside a
/// single-quoted JavaScript string written via client-side `unescape`.
///
/// Every other character passes through unchanged; input containing no angle
/// brackets is returned byte-identical.
pub fn escape_fallback_html(html: &str) -> String {
    html.replace('<', "%3C").replace('>', "%3E")
}
