//! Deferred-render placeholder tracking for a single request.

use crate::error::Result;

type RenderThunk<'a> = Box<dyn Fn() -> Result<String> + 'a>;

/// Per-request registry mapping placeholder tokens to deferred render thunks.
///
/// During page construction each deferred render returns a token immediately;
/// the thunk runs once the full set of page references is known, during the
/// response-body rewrite. A tracker is exclusively owned by one logical
/// request and passed explicitly through the call chain; it must never be
/// shared across requests.
pub struct PlaceholderTracker<'a> {
    entries: Vec<(String, RenderThunk<'a>)>,
}

impl<'a> PlaceholderTracker<'a> {
    /// Create an empty tracker for a new request.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Record a deferred render and return its placeholder token.
    pub fn insert_placeholder<F>(&mut self, render: F) -> String
    where
        F: Fn() -> Result<String> + 'a,
    {
        let token = format!("<!--bundlekit:{}-->", self.entries.len());
        self.entries.push((token.clone(), Box::new(render)));
        token
    }

    /// Run the deferred render recorded for `token`, or `None` when the token
    /// is not recognized.
    pub fn resolve(&self, token: &str) -> Option<Result<String>> {
        self.entries
            .iter()
            .find(|(known, _)| known == token)
            .map(|(_, render)| render())
    }

    /// Tokens in insertion order.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(token, _)| token.as_str())
    }

    /// Number of recorded placeholders.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no placeholders have been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PlaceholderTracker<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PlaceholderTracker<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaceholderTracker")
            .field("tokens", &self.tokens().collect::<Vec<_>>())
            .finish()
    }
}
