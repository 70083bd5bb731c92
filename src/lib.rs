#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod asset;
pub mod bundle;
pub mod container;
pub mod error;
pub mod pipeline;
pub mod placeholder;
pub mod reference_builder;
pub mod render;
pub mod rewrite;
pub mod settings;

pub use asset::{Asset, AssetContent};
pub use bundle::registry::BundleRegistry;
pub use bundle::{Bundle, BundleKind, ProcessedContent};
pub use container::BundleContainer;
pub use error::{BundleError, Result};
pub use placeholder::PlaceholderTracker;
pub use reference_builder::ReferenceBuilder;
pub use settings::{BundlerConfig, BundlerSettings};
