//! Renderer for local script bundles.

use crate::bundle::Bundle;
use crate::error::Result;
use crate::render::BundleHtmlRenderer;
use crate::render::urls::{asset_url, bundle_url};
use crate::settings::BundlerSettings;

/// Emits `<script>` tags for a bundle's processed content, or one tag per
/// asset in debug mode so developers see the uncombined sources.
///
/// Also serves as the default fallback strategy for external script bundles,
/// rendering their local fallback assets.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScriptBundleHtmlRenderer;

pub(crate) fn script_tag(url: &str) -> String {
    format!("<script src=\"{url}\" type=\"text/javascript\"></script>")
}

impl BundleHtmlRenderer for ScriptBundleHtmlRenderer {
    fn render(&self, bundle: &Bundle, settings: &BundlerSettings) -> Result<String> {
        if bundle.assets.is_empty() {
            return Ok(String::new());
        }

        if settings.is_debugging_enabled {
            let mut tags = Vec::with_capacity(bundle.assets.len());
            for asset in &bundle.assets {
                tags.push(script_tag(&asset_url(bundle, asset, settings)?));
            }
            return Ok(tags.join("\n"));
        }

        Ok(script_tag(&bundle_url(bundle, settings)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::Asset;
    use crate::bundle::BundleKind;

    fn bundle_with_assets() -> Bundle {
        let mut bundle = Bundle::new("scripts/app", BundleKind::Script);
        bundle.push_asset(Asset::inline("scripts/app/a.js", "var a;"));
        bundle.push_asset(Asset::inline("scripts/app/b.js", "var b;"));
        bundle
    }

    #[test]
    fn renders_single_tag_for_processed_bundle() {
        let settings = BundlerSettings::default();
        let mut bundle = bundle_with_assets();
        bundle.process_default(&settings).unwrap();

        let html = ScriptBundleHtmlRenderer.render(&bundle, &settings).unwrap();
        let hash = bundle.content_hash().unwrap();
        assert_eq!(
            html,
            format!("<script src=\"_bundles/script/{hash}/scripts/app\" type=\"text/javascript\"></script>")
        );
    }

    #[test]
    fn renders_one_tag_per_asset_in_debug_mode() {
        let settings = BundlerSettings {
            is_debugging_enabled: true,
            ..BundlerSettings::default()
        };
        let bundle = bundle_with_assets();

        let html = ScriptBundleHtmlRenderer.render(&bundle, &settings).unwrap();
        let a_hash = &crate::pipeline::hash_text("var a;")[..8];
        let b_hash = &crate::pipeline::hash_text("var b;")[..8];
        assert_eq!(
            html,
            format!(
                "<script src=\"_bundles/asset/scripts/app/a.js?{a_hash}\" type=\"text/javascript\"></script>\n\
                 <script src=\"_bundles/asset/scripts/app/b.js?{b_hash}\" type=\"text/javascript\"></script>"
            )
        );
    }

    #[test]
    fn empty_bundle_renders_to_nothing() {
        let settings = BundlerSettings::default();
        let bundle = Bundle::new("scripts/app", BundleKind::Script);

        let html = ScriptBundleHtmlRenderer.render(&bundle, &settings).unwrap();
        assert!(html.is_empty());
    }
}
