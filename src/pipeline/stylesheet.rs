//! Default pipeline for stylesheet bundles.

use std::fs;
use std::path::Path;

use base64::{Engine as _, engine::general_purpose};
use regex::Regex;

use crate::bundle::{Bundle, ProcessedContent};
use crate::pipeline::{BundleProcessor, hash_text};
use crate::settings::BundlerSettings;

/// Largest file, in bytes, that gets inlined as a data URI.
pub const DATA_URI_SIZE_LIMIT: u64 = 32 * 1024;

/// Concatenates stylesheet assets and inlines small `url(...)` references as
/// base64 data URIs so the processed bundle has fewer follow-up requests.
///
/// Only relative references next to a file-backed asset are considered;
/// absolute URLs, existing data URIs and files above [`DATA_URI_SIZE_LIMIT`]
/// pass through untouched, as do references whose target cannot be read.
#[derive(Debug, Clone)]
pub struct StylesheetPipeline {
    embed_limit: u64,
}

impl Default for StylesheetPipeline {
    fn default() -> Self {
        Self {
            embed_limit: DATA_URI_SIZE_LIMIT,
        }
    }
}

impl StylesheetPipeline {
    /// Pipeline with a custom inlining size limit. A limit of zero disables
    /// data-URI embedding entirely.
    pub fn with_embed_limit(embed_limit: u64) -> Self {
        Self { embed_limit }
    }
}

impl BundleProcessor for StylesheetPipeline {
    fn process(
        &self,
        bundle: &Bundle,
        _settings: &BundlerSettings,
    ) -> anyhow::Result<ProcessedContent> {
        let mut pieces = Vec::with_capacity(bundle.assets.len());
        for asset in &bundle.assets {
            let mut text = asset.read()?;
            if self.embed_limit > 0
                && let Some(base_dir) = asset.base_dir()
            {
                text = embed_data_uris(&text, &base_dir, self.embed_limit);
            }
            pieces.push(text.trim_end_matches('\n').to_string());
        }
        let text = pieces.join("\n");
        let hash = hash_text(&text);
        Ok(ProcessedContent { text, hash })
    }
}

/// Rewrite relative `url(...)` references in `css` into data URIs.
fn embed_data_uris(css: &str, base_dir: &Path, embed_limit: u64) -> String {
    let pattern =
        Regex::new(r#"url\(\s*['"]?([^)'"]+?)['"]?\s*\)"#).expect("invalid css url regex");

    pattern
        .replace_all(css, |caps: &regex::Captures<'_>| {
            let reference = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            match inline_reference(reference, base_dir, embed_limit) {
                Some(data_uri) => format!("url({data_uri})"),
                None => caps.get(0).expect("match always present").as_str().to_string(),
            }
        })
        .into_owned()
}

fn inline_reference(reference: &str, base_dir: &Path, embed_limit: u64) -> Option<String> {
    if should_skip_reference(reference) {
        return None;
    }

    // Query strings and fragments are common on font references.
    let trimmed = reference
        .split(['?', '#'])
        .next()
        .unwrap_or(reference);
    let target = base_dir.join(trimmed);

    let metadata = fs::metadata(&target).ok()?;
    if !metadata.is_file() || metadata.len() > embed_limit {
        return None;
    }

    let bytes = fs::read(&target).ok()?;
    let encoded = general_purpose::STANDARD.encode(bytes);
    Some(format!("data:{};base64,{}", mime_for(trimmed), encoded))
}

fn should_skip_reference(reference: &str) -> bool {
    reference.is_empty()
        || reference.starts_with("data:")
        || reference.starts_with("http://")
        || reference.starts_with("https://")
        || reference.starts_with("//")
        || reference.starts_with('/')
}

fn mime_for(path: &str) -> &'static str {
    match path.rsplit('.').next().map(str::to_ascii_lowercase).as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        _ => "application/octet-stream",
    }
}
