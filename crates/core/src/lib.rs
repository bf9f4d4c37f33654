//! vaultpub-core: publish an Obsidian vault as a structured dataset.
//!
//! The pipeline walks a vault, decides which notes are public, optimizes
//! and catalogs embedded media, rewrites wiki links and embeds inside each
//! note's parsed tree, and renders per-note HTML plus metadata.
//!
//! Module map:
//! - [`vault`] - note and media discovery
//! - [`frontmatter`] - YAML frontmatter split and parse
//! - [`visibility`] - the public/private allow set
//! - [`links`] - wiki-link classification and resolution
//! - [`media`] - media catalog, resolution, and optimization
//! - [`document`] - per-note parse/transform/render pipeline
//! - [`publish`] - the orchestrator tying it all together

pub mod document;
pub mod frontmatter;
pub mod links;
pub mod media;
pub mod publish;
pub mod vault;
pub mod visibility;

pub use document::{DocumentPipeline, PageResult, TocEntry};
pub use links::{LinkRenderResult, ObsidianLink, WikiLinkToken};
pub use media::{MediaCatalogEntry, MediaOptions, MediaResolver, MediaToken, OptimizeOptions};
pub use publish::{PublishError, PublishOptions, PublishOutput, publish_vault};
pub use visibility::AllowSet;

/// Crate version, for CLI banners and diagnostics.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
