//! Per-request collection of bundle references and deferred rendering.

use std::cell::RefCell;
use std::rc::Rc;

use crate::bundle::{Bundle, BundleKind};
use crate::container::BundleContainer;
use crate::error::Result;
use crate::placeholder::PlaceholderTracker;
use crate::render::render_bundle;
use crate::settings::BundlerSettings;

/// Collects the bundle references made while one page is being built and
/// turns them into deferred render placeholders.
///
/// References recorded after a [`render`](ReferenceBuilder::render) call
/// still participate in that call's output: the placeholder thunk reads the
/// accumulated reference set only when the rewrite pass resolves it, once the
/// full page is known. One builder per logical request.
pub struct ReferenceBuilder<'a> {
    container: &'a BundleContainer,
    settings: &'a BundlerSettings,
    references: Rc<RefCell<Vec<String>>>,
    adhoc: Rc<RefCell<Vec<Bundle>>>,
}

impl<'a> ReferenceBuilder<'a> {
    /// Create a builder for one request against the shared container.
    pub fn new(container: &'a BundleContainer, settings: &'a BundlerSettings) -> Self {
        Self {
            container,
            settings,
            references: Rc::new(RefCell::new(Vec::new())),
            adhoc: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Record a reference to a registered bundle by path or alias, or to an
    /// ad-hoc URL.
    ///
    /// URLs are looked up in the container first, so a URL reference to a
    /// registered external bundle resolves to that bundle — with its fallback
    /// configuration and render-pass deduplication — rather than synthesizing
    /// a transient duplicate. Registered references are validated immediately
    /// so misconfigured pages fail at the reference site rather than during
    /// the response rewrite.
    pub fn reference(&mut self, reference: &str) -> Result<()> {
        let trimmed = reference.trim();
        if trimmed.contains("://") || trimmed.starts_with("//") {
            if self.container.get(trimmed).is_some() {
                self.references.borrow_mut().push(trimmed.to_string());
            } else {
                self.reference_url(trimmed);
            }
            return Ok(());
        }
        self.container.find(trimmed)?;
        self.references.borrow_mut().push(trimmed.to_string());
        Ok(())
    }

    /// Record a reference to an unregistered external script URL.
    ///
    /// Synthesizes a transient external bundle for the request without
    /// consulting the container; ad-hoc bundles render after all registered
    /// bundles, in first-reference order.
    pub fn reference_url(&mut self, url: &str) {
        let mut adhoc = self.adhoc.borrow_mut();
        if adhoc.iter().any(|bundle| bundle.path == url) {
            return;
        }
        adhoc.push(Bundle::new(
            url,
            BundleKind::ExternalScript {
                url: url.to_string(),
                fallback_condition: None,
            },
        ));
    }

    /// Register a deferred render for the given page location and return its
    /// placeholder token for embedding in the page under construction.
    pub fn render(
        &self,
        location: Option<&str>,
        tracker: &mut PlaceholderTracker<'a>,
    ) -> String {
        let container = self.container;
        let settings = self.settings.clone();
        let references = Rc::clone(&self.references);
        let adhoc = Rc::clone(&self.adhoc);
        let location = location.map(str::to_string);

        tracker.insert_placeholder(move || {
            let references = references.borrow();
            let ordered =
                container.include_references(references.iter(), location.as_deref())?;

            let mut parts = Vec::new();
            for bundle in ordered {
                let html = render_bundle(bundle, &settings)?;
                if !html.is_empty() {
                    parts.push(html);
                }
            }
            for bundle in adhoc.borrow().iter() {
                if bundle.page_location.as_deref() != location.as_deref() {
                    continue;
                }
                let html = render_bundle(bundle, &settings)?;
                if !html.is_empty() {
                    parts.push(html);
                }
            }
            Ok(parts.join("\n"))
        })
    }
}
