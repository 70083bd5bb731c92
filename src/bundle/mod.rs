//! The bundle model: an ordered collection of assets plus rendering metadata.

pub mod registry;

use crate::asset::Asset;
use crate::error::{BundleError, Result};
use crate::pipeline::BundleProcessor;
use crate::settings::BundlerSettings;

/// Kind of a bundle, determining its default processor and renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleKind {
    /// JavaScript sources rendered as `<script>` tags.
    Script,
    /// CSS sources rendered as `<link>` tags.
    Stylesheet,
    /// HTML template fragments inlined into the page.
    HtmlTemplate,
    /// A CDN-hosted script. Local assets, if any, serve only as a fallback
    /// source and never as primary content.
    ExternalScript {
        /// Absolute URL of the externally hosted script.
        url: String,
        /// JavaScript boolean expression that evaluates truthy when the
        /// external script failed to load.
        fallback_condition: Option<String>,
    },
}

impl BundleKind {
    /// URL path segment identifying this kind in generated bundle URLs.
    pub fn url_segment(&self) -> &'static str {
        match self {
            BundleKind::Script | BundleKind::ExternalScript { .. } => "script",
            BundleKind::Stylesheet => "stylesheet",
            BundleKind::HtmlTemplate => "htmltemplate",
        }
    }

    /// File extensions harvested for this kind during directory registration.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            BundleKind::Script | BundleKind::ExternalScript { .. } => &["js"],
            BundleKind::Stylesheet => &["css"],
            BundleKind::HtmlTemplate => &["htm", "html"],
        }
    }
}

/// Output of a bundle's processing pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedContent {
    /// Final renderable text of the bundle.
    pub text: String,
    /// BLAKE3 hash of the text, hex encoded, used for cache-busting URLs.
    pub hash: String,
}

/// An ordered collection of assets with bundle-level metadata.
///
/// Bundles are created during the configuration phase and their content is
/// immutable thereafter; processing only populates the cached output.
#[derive(Debug, Clone)]
pub struct Bundle {
    /// Application-relative path (or URL for ad-hoc external bundles).
    pub path: String,
    /// Kind of the bundle, selecting processor and renderer strategies.
    pub kind: BundleKind,
    /// Assets in insertion order.
    pub assets: Vec<Asset>,
    /// Optional page location tag, e.g. `"body"`. `None` means the default
    /// location.
    pub page_location: Option<String>,
    /// Paths of bundles this bundle depends on. Referenced bundles are
    /// rendered before this one.
    pub references: Vec<String>,
    processed: Option<ProcessedContent>,
}

impl Bundle {
    /// Create an empty bundle.
    pub fn new(path: impl Into<String>, kind: BundleKind) -> Self {
        Self {
            path: path.into(),
            kind,
            assets: Vec::new(),
            page_location: None,
            references: Vec::new(),
            processed: None,
        }
    }

    /// Append an asset, invalidating any cached processing output.
    pub fn push_asset(&mut self, asset: Asset) {
        self.assets.push(asset);
        self.processed = None;
    }

    /// Record a dependency on another bundle.
    pub fn add_reference(&mut self, path: impl Into<String>) {
        self.references.push(path.into());
    }

    /// External URL of the bundle, when it is an external script.
    pub fn external_url(&self) -> Option<&str> {
        match &self.kind {
            BundleKind::ExternalScript { url, .. } => Some(url),
            _ => None,
        }
    }

    /// True when the bundle has no assets and no external URL, in which case
    /// it renders to no output.
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty() && self.external_url().is_none()
    }

    /// Run the given processor over the bundle's assets and cache the result.
    ///
    /// Idempotent: reprocessing unchanged assets yields identical content and
    /// hash. Failures carry the bundle identity and leave the cached output
    /// untouched.
    pub fn process(
        &mut self,
        processor: &dyn BundleProcessor,
        settings: &BundlerSettings,
    ) -> Result<()> {
        let content = processor
            .process(self, settings)
            .map_err(|source| BundleError::Processing {
                bundle: self.path.clone(),
                source,
            })?;
        self.processed = Some(content);
        Ok(())
    }

    /// Run the default processor for this bundle's kind.
    pub fn process_default(&mut self, settings: &BundlerSettings) -> Result<()> {
        let processor = crate::pipeline::default_processor(&self.kind);
        self.process(processor.as_ref(), settings)
    }

    /// Cached processing output, if the bundle has been processed.
    pub fn processed(&self) -> Option<&ProcessedContent> {
        self.processed.as_ref()
    }

    /// Content hash of the processed bundle.
    pub fn content_hash(&self) -> Option<&str> {
        self.processed.as_ref().map(|content| content.hash.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::Asset;
    use crate::pipeline::ScriptPipeline;

    #[test]
    fn empty_bundle_has_no_output() {
        let bundle = Bundle::new("scripts/app", BundleKind::Script);
        assert!(bundle.is_empty());
        assert!(bundle.processed().is_none());
    }

    #[test]
    fn external_bundle_without_assets_is_not_empty() {
        let bundle = Bundle::new(
            "http://test.com/",
            BundleKind::ExternalScript {
                url: "http://test.com/".into(),
                fallback_condition: None,
            },
        );
        assert!(!bundle.is_empty());
        assert_eq!(bundle.external_url(), Some("http://test.com/"));
    }

    #[test]
    fn processing_is_idempotent() {
        let settings = BundlerSettings::default();
        let mut bundle = Bundle::new("scripts/app", BundleKind::Script);
        bundle.push_asset(Asset::inline("scripts/app/a.js", "var a = 1;\n"));
        bundle.push_asset(Asset::inline("scripts/app/b.js", "var b = 2;\n"));

        bundle.process(&ScriptPipeline, &settings).unwrap();
        let first = bundle.processed().unwrap().clone();

        bundle.process(&ScriptPipeline, &settings).unwrap();
        let second = bundle.processed().unwrap();

        assert_eq!(&first, second);
        assert_eq!(first.text, "var a = 1;\nvar b = 2;");
    }

    #[test]
    fn pushing_an_asset_invalidates_cached_output() {
        let settings = BundlerSettings::default();
        let mut bundle = Bundle::new("scripts/app", BundleKind::Script);
        bundle.push_asset(Asset::inline("scripts/app/a.js", "var a = 1;"));
        bundle.process(&ScriptPipeline, &settings).unwrap();
        assert!(bundle.processed().is_some());

        bundle.push_asset(Asset::inline("scripts/app/b.js", "var b = 2;"));
        assert!(bundle.processed().is_none());
    }

    #[test]
    fn processing_failure_names_the_bundle() {
        let settings = BundlerSettings::default();
        let mut bundle = Bundle::new("scripts/app", BundleKind::Script);
        bundle.push_asset(Asset::from_file("scripts/app/a.js", "/no/such/file.js"));

        let err = bundle.process(&ScriptPipeline, &settings).unwrap_err();
        match err {
            BundleError::Processing { bundle, .. } => assert_eq!(bundle, "scripts/app"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
