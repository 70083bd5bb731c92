//! Cache-busting URL generation for processed bundles and raw assets.

use anyhow::anyhow;

use crate::asset::Asset;
use crate::bundle::Bundle;
use crate::error::{BundleError, Result};
use crate::settings::BundlerSettings;

/// URL of a processed bundle: `{prefix}/{kind}/{hash}/{path}`.
///
/// The content hash makes the URL change whenever the processed output
/// changes, so far-future cache headers are safe. Fails when the bundle has
/// not been processed yet.
pub fn bundle_url(bundle: &Bundle, settings: &BundlerSettings) -> Result<String> {
    let hash = bundle
        .content_hash()
        .ok_or_else(|| BundleError::Processing {
            bundle: bundle.path.clone(),
            source: anyhow!("bundle has not been processed"),
        })?;
    Ok(format!(
        "{prefix}/{kind}/{hash}/{path}",
        prefix = settings.url_prefix,
        kind = bundle.kind.url_segment(),
        path = bundle.path,
    ))
}

const SHORT_HASH_LEN: usize = 8;

/// URL of a single uncombined asset, used by debug-mode rendering:
/// `{prefix}/asset/{path}?{short-hash}`.
///
/// The query string is a short prefix of the asset content hash so edited
/// sources bypass stale caches during development. Fails when the asset
/// source cannot be read, carrying the owning bundle's identity.
pub fn asset_url(bundle: &Bundle, asset: &Asset, settings: &BundlerSettings) -> Result<String> {
    let text = asset.read().map_err(|source| BundleError::Processing {
        bundle: bundle.path.clone(),
        source,
    })?;
    let hash = crate::pipeline::hash_text(&text);
    Ok(format!(
        "{prefix}/asset/{path}?{short_hash}",
        prefix = settings.url_prefix,
        path = asset.path,
        short_hash = &hash[..SHORT_HASH_LEN],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::Asset;
    use crate::bundle::BundleKind;

    #[test]
    fn bundle_url_embeds_kind_and_hash() {
        let settings = BundlerSettings::default();
        let mut bundle = Bundle::new("scripts/app", BundleKind::Script);
        bundle.push_asset(Asset::inline("scripts/app/a.js", "var a;"));
        bundle.process_default(&settings).unwrap();

        let url = bundle_url(&bundle, &settings).unwrap();
        let hash = bundle.content_hash().unwrap();
        assert_eq!(url, format!("_bundles/script/{hash}/scripts/app"));
    }

    #[test]
    fn bundle_url_fails_for_unprocessed_bundle() {
        let settings = BundlerSettings::default();
        let mut bundle = Bundle::new("scripts/app", BundleKind::Script);
        bundle.push_asset(Asset::inline("scripts/app/a.js", "var a;"));

        let err = bundle_url(&bundle, &settings).unwrap_err();
        assert!(matches!(err, BundleError::Processing { .. }));
    }

    #[test]
    fn asset_url_appends_a_short_content_hash() {
        let settings = BundlerSettings {
            url_prefix: "static".into(),
            ..BundlerSettings::default()
        };
        let bundle = Bundle::new("scripts/app", BundleKind::Script);
        let asset = Asset::inline("scripts/app/a.js", "var a;");

        let short_hash = &crate::pipeline::hash_text("var a;")[..SHORT_HASH_LEN];
        assert_eq!(
            asset_url(&bundle, &asset, &settings).unwrap(),
            format!("static/asset/scripts/app/a.js?{short_hash}")
        );
    }

    #[test]
    fn asset_url_fails_when_the_source_cannot_be_read() {
        let settings = BundlerSettings::default();
        let bundle = Bundle::new("scripts/app", BundleKind::Script);
        let asset = Asset::from_file("scripts/app/a.js", "/no/such/file.js");

        let err = asset_url(&bundle, &asset, &settings).unwrap_err();
        match err {
            BundleError::Processing { bundle, .. } => assert_eq!(bundle, "scripts/app"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
