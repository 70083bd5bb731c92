//! Configuration-phase registration of bundles from directories and URLs.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};

use crate::asset::Asset;
use crate::bundle::{Bundle, BundleKind};
use crate::container::{BundleContainer, normalize_reference};
use crate::error::{BundleError, Result};
use crate::pipeline::BundleProcessor;
use crate::settings::BundlerSettings;

/// Accumulates bundle registrations and freezes them into a
/// [`BundleContainer`].
///
/// Directory registrations are resolved against a source root (the current
/// directory by default); the registered path doubles as the bundle's
/// application-relative identity.
pub struct BundleRegistry {
    settings: BundlerSettings,
    source_root: PathBuf,
    bundles: Vec<Bundle>,
    aliases: HashMap<String, String>,
    processors: HashMap<String, Box<dyn BundleProcessor>>,
}

impl BundleRegistry {
    /// Registry rooted at the current directory.
    pub fn new(settings: BundlerSettings) -> Self {
        Self::with_source_root(settings, ".")
    }

    /// Registry resolving directory registrations against `source_root`.
    pub fn with_source_root(settings: BundlerSettings, source_root: impl Into<PathBuf>) -> Self {
        Self {
            settings,
            source_root: source_root.into(),
            bundles: Vec::new(),
            aliases: HashMap::new(),
            processors: HashMap::new(),
        }
    }

    /// Register a pre-built bundle.
    pub fn add_bundle(&mut self, bundle: Bundle) {
        self.bundles.push(bundle);
    }

    /// Register one bundle from all matching files under `path`.
    ///
    /// Files are matched by the kind's extensions, hidden entries are
    /// skipped, and assets are sorted by path so the bundle's content is
    /// deterministic across platforms.
    pub fn add(&mut self, kind: BundleKind, path: impl AsRef<Path>) -> Result<()> {
        let bundle = self.scan_bundle(kind, path.as_ref())?;
        self.bundles.push(bundle);
        Ok(())
    }

    /// Register one bundle from `path` with a custom processor.
    pub fn add_with_processor(
        &mut self,
        kind: BundleKind,
        path: impl AsRef<Path>,
        processor: Box<dyn BundleProcessor>,
    ) -> Result<()> {
        let bundle = self.scan_bundle(kind, path.as_ref())?;
        self.processors.insert(bundle.path.clone(), processor);
        self.bundles.push(bundle);
        Ok(())
    }

    /// Register one bundle per immediate subdirectory of `path`.
    pub fn add_per_subdirectory(&mut self, kind: BundleKind, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let root = self.source_root.join(path);
        let entries = fs::read_dir(&root)
            .with_context(|| format!("failed to read directory {}", root.display()))
            .map_err(|source| registration_error(path, source))?;

        let mut subdirectories = Vec::new();
        for entry in entries {
            let entry = entry
                .with_context(|| format!("failed to read directory {}", root.display()))
                .map_err(|source| registration_error(path, source))?;
            let name = entry.file_name();
            if name.to_string_lossy().starts_with('.') {
                continue;
            }
            if entry.file_type().is_ok_and(|file_type| file_type.is_dir()) {
                subdirectories.push(path.join(name));
            }
        }

        subdirectories.sort();
        for subdirectory in subdirectories {
            self.add(kind.clone(), subdirectory)?;
        }
        Ok(())
    }

    /// Register an externally hosted script under an alias.
    ///
    /// The alias becomes the bundle's application-relative path, so the
    /// local fallback serves from a clean `{prefix}/script/{hash}/{alias}`
    /// URL rather than one with the CDN URL embedded in it; the bundle stays
    /// resolvable by its URL as well. Returns a builder for the optional
    /// page location and local fallback.
    pub fn add_url_with_alias(
        &mut self,
        url: impl Into<String>,
        alias: impl Into<String>,
    ) -> ExternalBundleRegistration<'_> {
        let url = url.into();
        let path = normalize_reference(&alias.into());
        self.aliases.insert(url.clone(), path.clone());
        self.bundles.push(Bundle::new(
            path,
            BundleKind::ExternalScript {
                url,
                fallback_condition: None,
            },
        ));
        let position = self.bundles.len() - 1;
        ExternalBundleRegistration {
            registry: self,
            position,
        }
    }

    /// Record that bundle `from` depends on bundle `to`.
    ///
    /// `from` must already be registered; `to` is validated when the registry
    /// is frozen into a container.
    pub fn add_reference(&mut self, from: &str, to: &str) -> Result<()> {
        let key = normalize_reference(from);
        let bundle = self
            .bundles
            .iter_mut()
            .find(|bundle| normalize_reference(&bundle.path) == key)
            .ok_or_else(|| BundleError::BundleNotFound {
                reference: from.to_string(),
            })?;
        bundle.add_reference(to);
        Ok(())
    }

    /// Process every registered bundle and freeze the registry into a
    /// read-only container.
    ///
    /// External bundles carrying fallback assets without a fallback condition
    /// are rejected here so misconfiguration surfaces at startup rather than
    /// on the first rendered page.
    pub fn into_container(self) -> Result<BundleContainer> {
        let Self {
            settings,
            source_root: _,
            mut bundles,
            aliases,
            processors,
        } = self;

        for bundle in &mut bundles {
            if let BundleKind::ExternalScript {
                fallback_condition, ..
            } = &bundle.kind
                && !bundle.assets.is_empty()
                && fallback_condition.as_deref().is_none_or(str::is_empty)
            {
                return Err(BundleError::MissingFallbackCondition {
                    bundle: bundle.path.clone(),
                });
            }

            if bundle.assets.is_empty() {
                continue;
            }
            match processors.get(&bundle.path) {
                Some(processor) => bundle.process(processor.as_ref(), &settings)?,
                None => bundle.process_default(&settings)?,
            }
        }

        BundleContainer::new(bundles, aliases)
    }

    fn scan_bundle(&self, kind: BundleKind, path: &Path) -> Result<Bundle> {
        let bundle_path = normalize_reference(&path.to_string_lossy());
        let root = self.source_root.join(path);

        let mut files = Vec::new();
        collect_asset_files(&root, Path::new(""), kind.extensions(), &mut files)
            .map_err(|source| registration_error(path, source))?;
        files.sort();

        let mut bundle = Bundle::new(bundle_path.clone(), kind);
        for relative in files {
            let identity = format!("{bundle_path}/{relative}");
            bundle.push_asset(Asset::from_file(identity, root.join(&relative)));
        }
        Ok(bundle)
    }
}

impl std::fmt::Debug for BundleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundleRegistry")
            .field("source_root", &self.source_root)
            .field("bundles", &self.bundles)
            .field("aliases", &self.aliases)
            .finish_non_exhaustive()
    }
}

/// Pending external bundle registration returned by
/// [`BundleRegistry::add_url_with_alias`].
#[derive(Debug)]
pub struct ExternalBundleRegistration<'r> {
    registry: &'r mut BundleRegistry,
    position: usize,
}

impl ExternalBundleRegistration<'_> {
    /// Tag the bundle with a page location, e.g. `"body"`.
    pub fn page_location(self, location: impl Into<String>) -> Self {
        self.registry.bundles[self.position].page_location = Some(location.into());
        self
    }

    /// Attach local fallback assets guarded by `condition`, a JavaScript
    /// expression that evaluates truthy when the CDN script failed to load.
    pub fn fallback(self, condition: impl Into<String>, assets: Vec<Asset>) -> Self {
        {
            let bundle = &mut self.registry.bundles[self.position];
            if let BundleKind::ExternalScript {
                fallback_condition, ..
            } = &mut bundle.kind
            {
                *fallback_condition = Some(condition.into());
            }
            for asset in assets {
                bundle.push_asset(asset);
            }
        }
        self
    }

    /// Attach fallback assets harvested from a directory of script files.
    pub fn fallback_dir(
        self,
        condition: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> Result<Self> {
        let path = path.as_ref();
        let root = self.registry.source_root.join(path);
        let prefix = normalize_reference(&path.to_string_lossy());

        let mut files = Vec::new();
        collect_asset_files(&root, Path::new(""), &["js"], &mut files)
            .map_err(|source| registration_error(path, source))?;
        files.sort();

        let assets = files
            .into_iter()
            .map(|relative| Asset::from_file(format!("{prefix}/{relative}"), root.join(&relative)))
            .collect();
        Ok(self.fallback(condition, assets))
    }
}

fn registration_error(path: &Path, source: anyhow::Error) -> BundleError {
    BundleError::Registration {
        path: path.display().to_string(),
        source,
    }
}

/// Walk `dir` collecting files whose extension matches, as forward-slash
/// paths relative to the scanned root. Hidden entries are skipped.
fn collect_asset_files(
    dir: &Path,
    relative: &Path,
    extensions: &[&str],
    out: &mut Vec<String>,
) -> anyhow::Result<()> {
    if !dir.is_dir() {
        return Err(anyhow!("{} is not a directory", dir.display()));
    }

    for entry in
        fs::read_dir(dir).with_context(|| format!("failed to read directory {}", dir.display()))?
    {
        let entry = entry?;
        let name = entry.file_name();
        if name.to_string_lossy().starts_with('.') {
            continue;
        }

        let next_relative = relative.join(&name);
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            collect_asset_files(&entry.path(), &next_relative, extensions, out)?;
        } else if file_type.is_file() {
            let matches = entry
                .path()
                .extension()
                .and_then(|extension| extension.to_str())
                .is_some_and(|extension| {
                    extensions
                        .iter()
                        .any(|candidate| candidate.eq_ignore_ascii_case(extension))
                });
            if matches {
                out.push(next_relative.to_string_lossy().replace('\\', "/"));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::ProcessedContent;
    use tempfile::tempdir;

    fn write(root: &Path, relative: &str, content: &str) {
        let target = root.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(target, content).unwrap();
    }

    #[test]
    fn add_collects_matching_files_sorted() {
        let dir = tempdir().unwrap();
        write(dir.path(), "scripts/b.js", "b();");
        write(dir.path(), "scripts/a.js", "a();");
        write(dir.path(), "scripts/notes.txt", "skip me");
        write(dir.path(), "scripts/.hidden.js", "skip me");
        write(dir.path(), "scripts/nested/c.js", "c();");

        let mut registry =
            BundleRegistry::with_source_root(BundlerSettings::default(), dir.path());
        registry.add(BundleKind::Script, "scripts").unwrap();
        let container = registry.into_container().unwrap();

        let bundle = container.find("scripts").unwrap();
        let asset_paths: Vec<&str> = bundle
            .assets
            .iter()
            .map(|asset| asset.path.as_str())
            .collect();
        assert_eq!(
            asset_paths,
            ["scripts/a.js", "scripts/b.js", "scripts/nested/c.js"]
        );
        assert_eq!(bundle.processed().unwrap().text, "a();\nb();\nc();");
    }

    #[test]
    fn add_fails_for_missing_directory() {
        let dir = tempdir().unwrap();
        let mut registry =
            BundleRegistry::with_source_root(BundlerSettings::default(), dir.path());

        let err = registry.add(BundleKind::Script, "missing").unwrap_err();
        assert!(matches!(err, BundleError::Registration { .. }));
    }

    #[test]
    fn add_per_subdirectory_registers_one_bundle_each() {
        let dir = tempdir().unwrap();
        write(dir.path(), "scripts/app/main.js", "app();");
        write(dir.path(), "scripts/admin/panel.js", "admin();");
        write(dir.path(), "scripts/loose.js", "ignored at this level");

        let mut registry =
            BundleRegistry::with_source_root(BundlerSettings::default(), dir.path());
        registry
            .add_per_subdirectory(BundleKind::Script, "scripts")
            .unwrap();
        let container = registry.into_container().unwrap();

        assert!(container.get("scripts/app").is_some());
        assert!(container.get("scripts/admin").is_some());
        assert!(container.get("scripts").is_none());
    }

    #[test]
    fn add_url_with_alias_registers_an_external_bundle() {
        let mut registry = BundleRegistry::new(BundlerSettings::default());
        registry
            .add_url_with_alias("http://platform.twitter.com/widgets.js", "twitter")
            .page_location("body");
        let container = registry.into_container().unwrap();

        let bundle = container.find("twitter").unwrap();
        assert_eq!(bundle.path, "twitter");
        assert_eq!(bundle.external_url(), Some("http://platform.twitter.com/widgets.js"));
        assert_eq!(bundle.page_location.as_deref(), Some("body"));

        let by_url = container
            .find("http://platform.twitter.com/widgets.js")
            .unwrap();
        assert_eq!(by_url.path, "twitter");
    }

    #[test]
    fn fallback_urls_use_the_alias_rather_than_the_cdn_url() {
        let settings = BundlerSettings::default();
        let mut registry = BundleRegistry::new(settings.clone());
        registry
            .add_url_with_alias("http://cdn.test/lib.js", "lib")
            .fallback("!window.lib", vec![Asset::inline("scripts/lib.js", "lib();")]);
        let container = registry.into_container().unwrap();

        let bundle = container.find("lib").unwrap();
        let html = crate::render::render_bundle(bundle, &settings).unwrap();
        let hash = bundle.content_hash().unwrap();
        assert!(html.contains(&format!("_bundles/script/{hash}/lib")));
        assert!(!html.contains(&format!("/{hash}/http://")));
    }

    #[test]
    fn fallback_assets_without_condition_fail_at_freeze_time() {
        let mut registry = BundleRegistry::new(BundlerSettings::default());
        registry
            .add_url_with_alias("http://cdn.test/jquery.js", "jquery")
            .fallback("", vec![Asset::inline("scripts/jquery.js", "jq();")]);

        let err = registry.into_container().unwrap_err();
        assert!(matches!(err, BundleError::MissingFallbackCondition { .. }));
    }

    #[test]
    fn fallback_dir_harvests_scripts_and_processes_them() {
        let dir = tempdir().unwrap();
        write(dir.path(), "fallback/jquery.js", "jq();");

        let mut registry =
            BundleRegistry::with_source_root(BundlerSettings::default(), dir.path());
        registry
            .add_url_with_alias("http://cdn.test/jquery.js", "jquery")
            .fallback_dir("!window.jQuery", "fallback")
            .unwrap();
        let container = registry.into_container().unwrap();

        let bundle = container.find("jquery").unwrap();
        assert_eq!(bundle.processed().unwrap().text, "jq();");
    }

    #[test]
    fn custom_processor_overrides_the_default_pipeline() {
        struct UpperCasePipeline;

        impl BundleProcessor for UpperCasePipeline {
            fn process(
                &self,
                bundle: &Bundle,
                _settings: &BundlerSettings,
            ) -> anyhow::Result<ProcessedContent> {
                let text = crate::pipeline::concatenate_assets(bundle)?.to_uppercase();
                let hash = crate::pipeline::hash_text(&text);
                Ok(ProcessedContent { text, hash })
            }
        }

        let dir = tempdir().unwrap();
        write(dir.path(), "scripts/a.js", "shout();");

        let mut registry =
            BundleRegistry::with_source_root(BundlerSettings::default(), dir.path());
        registry
            .add_with_processor(BundleKind::Script, "scripts", Box::new(UpperCasePipeline))
            .unwrap();
        let container = registry.into_container().unwrap();

        assert_eq!(
            container.find("scripts").unwrap().processed().unwrap().text,
            "SHOUT();"
        );
    }

    #[test]
    fn add_reference_wires_dependencies_for_resolution() {
        let dir = tempdir().unwrap();
        write(dir.path(), "scripts/app/main.js", "app();");
        write(dir.path(), "scripts/lib/lib.js", "lib();");

        let mut registry =
            BundleRegistry::with_source_root(BundlerSettings::default(), dir.path());
        registry.add(BundleKind::Script, "scripts/app").unwrap();
        registry.add(BundleKind::Script, "scripts/lib").unwrap();
        registry.add_reference("scripts/app", "scripts/lib").unwrap();
        let container = registry.into_container().unwrap();

        let ordered = container.include_references(["scripts/app"], None).unwrap();
        let paths: Vec<&str> = ordered.iter().map(|bundle| bundle.path.as_str()).collect();
        assert_eq!(paths, ["scripts/lib", "scripts/app"]);
    }
}
