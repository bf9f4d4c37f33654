//! Per-note pipeline: parse, rewrite passes, render, metadata.

use std::path::PathBuf;

use comrak::{Arena, Options, format_html, parse_document};
use serde::Serialize;
use slug::slugify;
use thiserror::Error;

use super::outline;
use crate::frontmatter::{self, FrontmatterParseError};
use crate::links;
use crate::media::{MediaResolver, rewrite_embeds};
use crate::vault::WalkedFile;
use crate::visibility::AllowSet;

/// One entry of a page's table of contents.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TocEntry {
    pub title: String,
    pub depth: u8,
    pub id: String,
}

/// Output record for one published note. Created once per processed note
/// and never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult {
    pub file_name: String,
    pub slug: String,
    pub frontmatter: serde_json::Map<String, serde_json::Value>,
    pub first_paragraph_text: String,
    pub plain_text: String,
    pub html: String,
    pub table_of_contents: Vec<TocEntry>,
    pub original_relative_path: String,
}

/// Errors for a single note. The orchestrator logs these and moves on.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read note {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse frontmatter in {path}: {source}")]
    Frontmatter {
        path: PathBuf,
        #[source]
        source: FrontmatterParseError,
    },

    #[error("failed to render {path}: {source}")]
    Render {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Processes one note at a time: comrak parse, link pass, media pass,
/// HTML render, metadata extraction. Holds only borrowed run state, so it
/// is cheap to construct per vault run.
pub struct DocumentPipeline<'a> {
    allow_set: &'a AllowSet,
    media: &'a MediaResolver<'a>,
    note_prefix: &'a str,
}

impl<'a> DocumentPipeline<'a> {
    pub fn new(
        allow_set: &'a AllowSet,
        media: &'a MediaResolver<'a>,
        note_prefix: &'a str,
    ) -> Self {
        Self { allow_set, media, note_prefix }
    }

    /// Process a note from disk.
    pub fn process(&self, file: &WalkedFile) -> Result<PageResult, DocumentError> {
        let content = std::fs::read_to_string(&file.absolute_path).map_err(|source| {
            DocumentError::Read { path: file.absolute_path.clone(), source }
        })?;
        self.process_content(file, &content)
    }

    /// Process note content that has already been read.
    pub fn process_content(
        &self,
        file: &WalkedFile,
        content: &str,
    ) -> Result<PageResult, DocumentError> {
        let doc = frontmatter::parse(content).map_err(|source| {
            DocumentError::Frontmatter { path: file.absolute_path.clone(), source }
        })?;

        let arena = Arena::new();
        let options = markdown_options();
        let root = parse_document(&arena, &doc.body, &options);

        links::rewrite_links(&arena, root, self.allow_set, self.note_prefix);
        rewrite_embeds(&arena, root, self.media);

        let mut html = Vec::new();
        format_html(root, &options, &mut html).map_err(|source| DocumentError::Render {
            path: file.absolute_path.clone(),
            source,
        })?;
        let html = String::from_utf8_lossy(&html).into_owned();

        let stem = file
            .relative_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(PageResult {
            file_name: file.file_name(),
            slug: slugify(&stem),
            frontmatter: doc
                .frontmatter
                .map(|fm| fm.to_json_map())
                .unwrap_or_default(),
            first_paragraph_text: outline::first_paragraph(root),
            plain_text: outline::plain_text(root),
            html,
            table_of_contents: outline::table_of_contents(root),
            original_relative_path: file.relative_str(),
        })
    }
}

/// Markdown options shared by parsing and rendering: the GFM extension
/// set plus raw HTML passthrough for the spliced image tags.
fn markdown_options() -> Options<'static> {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.footnotes = true;
    options.extension.description_lists = true;

    options.parse.smart = false; // Don't convert quotes/dashes

    options.render.hardbreaks = false;
    options.render.github_pre_lang = true;
    options.render.unsafe_ = true; // Allow raw HTML passthrough

    options
}
