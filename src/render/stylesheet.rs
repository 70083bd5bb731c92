//! Renderer for stylesheet bundles.

use crate::bundle::Bundle;
use crate::error::Result;
use crate::render::BundleHtmlRenderer;
use crate::render::urls::{asset_url, bundle_url};
use crate::settings::BundlerSettings;

/// Emits `<link>` tags for a bundle's processed content, or one tag per asset
/// in debug mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct StylesheetHtmlRenderer;

fn link_tag(url: &str) -> String {
    format!("<link href=\"{url}\" type=\"text/css\" rel=\"stylesheet\"/>")
}

impl BundleHtmlRenderer for StylesheetHtmlRenderer {
    fn render(&self, bundle: &Bundle, settings: &BundlerSettings) -> Result<String> {
        if bundle.assets.is_empty() {
            return Ok(String::new());
        }

        if settings.is_debugging_enabled {
            let mut tags = Vec::with_capacity(bundle.assets.len());
            for asset in &bundle.assets {
                tags.push(link_tag(&asset_url(bundle, asset, settings)?));
            }
            return Ok(tags.join("\n"));
        }

        Ok(link_tag(&bundle_url(bundle, settings)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::Asset;
    use crate::bundle::BundleKind;

    #[test]
    fn renders_link_tag_with_fixed_attribute_order() {
        let settings = BundlerSettings::default();
        let mut bundle = Bundle::new("styles", BundleKind::Stylesheet);
        bundle.push_asset(Asset::inline("styles/site.css", "a { color: red; }"));
        bundle.process_default(&settings).unwrap();

        let html = StylesheetHtmlRenderer.render(&bundle, &settings).unwrap();
        let hash = bundle.content_hash().unwrap();
        assert_eq!(
            html,
            format!("<link href=\"_bundles/stylesheet/{hash}/styles\" type=\"text/css\" rel=\"stylesheet\"/>")
        );
    }

    #[test]
    fn renders_per_asset_links_in_debug_mode() {
        let settings = BundlerSettings {
            is_debugging_enabled: true,
            ..BundlerSettings::default()
        };
        let mut bundle = Bundle::new("styles", BundleKind::Stylesheet);
        bundle.push_asset(Asset::inline("styles/reset.css", ""));
        bundle.push_asset(Asset::inline("styles/site.css", ""));

        let html = StylesheetHtmlRenderer.render(&bundle, &settings).unwrap();
        let empty_hash = &crate::pipeline::hash_text("")[..8];
        assert_eq!(
            html,
            format!(
                "<link href=\"_bundles/asset/styles/reset.css?{empty_hash}\" type=\"text/css\" rel=\"stylesheet\"/>\n\
                 <link href=\"_bundles/asset/styles/site.css?{empty_hash}\" type=\"text/css\" rel=\"stylesheet\"/>"
            )
        );
    }
}
