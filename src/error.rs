//! Error taxonomy for bundle registration, resolution and rendering.
//!
//! All failures are deterministic function-call failures surfaced synchronously
//! to the caller; there are no transient faults and no retries.

use thiserror::Error;

/// Convenience result alias used across the crate.
pub type Result<T, E = BundleError> = std::result::Result<T, E>;

/// Errors produced by the bundle pipeline.
#[derive(Debug, Error)]
pub enum BundleError {
    /// A requested reference did not resolve to any registered bundle.
    #[error("no bundle found for reference `{reference}`")]
    BundleNotFound {
        /// The reference as supplied by the caller.
        reference: String,
    },

    /// The bundle reference graph contains a cycle.
    #[error("circular bundle reference: {cycle}")]
    CircularReference {
        /// The cycle rendered as `a -> b -> a`.
        cycle: String,
    },

    /// A bundle's transform pipeline failed. Sibling bundles are unaffected.
    #[error("failed to process bundle `{bundle}`")]
    Processing {
        /// Identity of the bundle whose pipeline failed.
        bundle: String,
        /// Underlying pipeline error.
        #[source]
        source: anyhow::Error,
    },

    /// Registering a bundle failed, typically while scanning source files.
    #[error("failed to register bundle at `{path}`")]
    Registration {
        /// Root path or URL of the registration that failed.
        path: String,
        /// Underlying registration error.
        #[source]
        source: anyhow::Error,
    },

    /// An external bundle carries local fallback assets but no fallback
    /// condition, so the release-mode guard block cannot be emitted.
    #[error("external bundle `{bundle}` has fallback assets but no fallback condition")]
    MissingFallbackCondition {
        /// Identity of the misconfigured bundle.
        bundle: String,
    },
}
