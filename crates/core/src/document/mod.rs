//! Per-note document processing.
//!
//! Parses a note into a comrak AST, runs the link and media rewrite
//! passes over it, renders HTML, and extracts page metadata.

pub mod outline;
pub mod pipeline;
pub(crate) mod tree;

pub use pipeline::{DocumentError, DocumentPipeline, PageResult, TocEntry};
