//! Placeholder-replacing rewrite pass applied to the outgoing response body.
//!
//! Hosts gate this pass on [`BundlerSettings::is_html_rewriting_enabled`];
//! the pass itself is framework-agnostic and only understands placeholder
//! tokens.
//!
//! [`BundlerSettings::is_html_rewriting_enabled`]: crate::settings::BundlerSettings

use regex::Regex;

use crate::error::Result;
use crate::placeholder::PlaceholderTracker;

const PLACEHOLDER_PATTERN: &str = "<!--bundlekit:[0-9]+-->";

/// Replace every recognized placeholder token in `body` with its resolved
/// HTML.
///
/// A single pass over the body: each occurrence is replaced exactly once and
/// injected HTML is never rescanned. Tokens the tracker does not recognize,
/// and all other text, pass through untouched. Thunk failures propagate to
/// the caller.
pub fn replace_placeholders(body: &str, tracker: &PlaceholderTracker<'_>) -> Result<String> {
    if tracker.is_empty() {
        return Ok(body.to_string());
    }

    let pattern = Regex::new(PLACEHOLDER_PATTERN).expect("invalid placeholder regex");
    let mut output = String::with_capacity(body.len());
    let mut cursor = 0;

    for found in pattern.find_iter(body) {
        output.push_str(&body[cursor..found.start()]);
        match tracker.resolve(found.as_str()) {
            Some(html) => output.push_str(&html?),
            None => output.push_str(found.as_str()),
        }
        cursor = found.end();
    }
    output.push_str(&body[cursor..]);
    Ok(output)
}
