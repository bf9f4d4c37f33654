//! Embedded-media catalog, resolution, and optimization.
//!
//! The optimizer walks the vault and produces the media catalog; the
//! resolver consumes that catalog plus the direct path map to substitute
//! `![[...]]` embeds with concrete image nodes.

pub mod catalog;
pub mod kinds;
pub mod optimizer;
pub mod resolver;

pub use catalog::{FormatVariant, MediaCatalogEntry, MediaIndex, SourceMetadata};
pub use optimizer::{
    EncodeFormat, MediaOptimizeError, MediaPipelineOutput, MediaProgress, OptimizeOptions,
    SizeSpec, default_sizes, optimize_vault_media,
};
pub use resolver::{
    DEFAULT_PLACEHOLDER, MediaOptions, MediaResolver, MediaToken, PLACEHOLDER_HEIGHT,
    PLACEHOLDER_WIDTH, ResolvedImage, rewrite_embeds,
};
