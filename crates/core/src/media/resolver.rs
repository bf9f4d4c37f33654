//! Embedded-media resolution.
//!
//! Turns a raw `![[...]]` embed value into a concrete image to render.
//! Resolution order, first success wins:
//!
//! 1. Exact path-map hit.
//! 2. Path-variation retry against the path map (fixed probe order).
//! 3. Catalog lookup through the prebuilt indexes, picking a size variant
//!    by preference.
//! 4. Placeholder image.
//!
//! Resolution never fails; a page renders even when every asset is missing.

use std::collections::HashMap;
use std::sync::LazyLock;

use comrak::Arena;
use comrak::nodes::{AstNode, NodeLink, NodeValue};
use regex::Regex;
use tracing::debug;

use super::catalog::{FormatVariant, MediaCatalogEntry, MediaIndex, basename};
use crate::document::tree::make_node;

/// Matches ![[...]] embed tokens.
static EMBED_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[\[([^\]]+)\]\]").unwrap());

/// Default placeholder dimensions.
pub const PLACEHOLDER_WIDTH: u32 = 400;
pub const PLACEHOLDER_HEIGHT: u32 = 300;

/// Default placeholder image path.
pub const DEFAULT_PLACEHOLDER: &str = "/assets/placeholder.png";

/// Tunables for the resolution engine.
#[derive(Debug, Clone)]
pub struct MediaOptions {
    /// Size label tried first when picking a catalog variant.
    pub preferred_size: String,
    /// Prefer `absolutePublicPath` over `publicPath` when set.
    pub use_absolute_paths: bool,
    /// Image substituted when nothing resolves.
    pub placeholder: String,
}

impl Default for MediaOptions {
    fn default() -> Self {
        Self {
            preferred_size: "md".to_string(),
            use_absolute_paths: false,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }
}

/// Raw `![[...]]` embed reference as written in a note: a path or file
/// name, possibly relative, with or without a leading slash, possibly with
/// Windows-style separators. Immutable once parsed from source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaToken {
    raw_value: String,
}

impl MediaToken {
    pub fn new(raw_value: impl Into<String>) -> Self {
        Self { raw_value: raw_value.into() }
    }

    pub fn raw_value(&self) -> &str {
        &self.raw_value
    }
}

/// A renderable image produced by the resolution engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImage {
    pub url: String,
    pub alt: String,
    pub title: Option<String>,
    /// Presentation hints, when the variant dimensions are known.
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// False when the placeholder was substituted.
    pub found: bool,
}

/// The media resolution engine. Holds the run's catalog, path map, and
/// prebuilt lookup indexes; constructed once per vault run.
#[derive(Debug)]
pub struct MediaResolver<'a> {
    entries: &'a [MediaCatalogEntry],
    path_map: &'a HashMap<String, String>,
    index: MediaIndex,
    options: MediaOptions,
}

impl<'a> MediaResolver<'a> {
    pub fn new(
        entries: &'a [MediaCatalogEntry],
        path_map: &'a HashMap<String, String>,
        options: MediaOptions,
    ) -> Self {
        Self { entries, path_map, index: MediaIndex::build(entries), options }
    }

    /// Ordered probe list for the path-map retry step. The order is part
    /// of the engine's contract: leading slash added, leading slash
    /// removed, backslashes normalized, lowercased, basename only.
    pub fn path_variants(raw: &str) -> Vec<String> {
        let forward = raw.replace('\\', "/");
        vec![
            format!("/{}", raw.trim_start_matches('/')),
            raw.trim_start_matches('/').to_string(),
            forward.clone(),
            raw.to_lowercase(),
            basename(&forward).to_string(),
        ]
    }

    /// Resolve a parsed embed token into a renderable image. Never fails.
    pub fn resolve_token(&self, token: &MediaToken) -> ResolvedImage {
        self.resolve(token.raw_value())
    }

    /// Resolve a raw embed value into a renderable image. Never fails.
    pub fn resolve(&self, raw: &str) -> ResolvedImage {
        // 1. Exact path-map hit.
        if let Some(url) = self.path_map.get(raw) {
            return self.path_map_hit(url, raw);
        }

        // 2. Path-variation retry, fixed order, first hit wins.
        for variant in Self::path_variants(raw) {
            if let Some(url) = self.path_map.get(&variant) {
                return self.path_map_hit(url, raw);
            }
        }

        // 3. Catalog lookup.
        if let Some(entry) = self.index.lookup(raw).and_then(|i| self.entries.get(i)) {
            if let Some(variant) = self.pick_variant(entry) {
                return ResolvedImage {
                    url: self.variant_url(variant),
                    alt: entry.file_name.clone(),
                    title: Some(entry.file_name.clone()),
                    width: Some(variant.width),
                    height: Some(variant.height),
                    found: true,
                };
            }
            // An entry with zero variants falls through to the placeholder.
        }

        // 4. Placeholder.
        debug!(embed = raw, "no media found, substituting placeholder");
        ResolvedImage {
            url: self.options.placeholder.clone(),
            alt: basename(raw).to_string(),
            title: Some("not found".to_string()),
            width: Some(PLACEHOLDER_WIDTH),
            height: Some(PLACEHOLDER_HEIGHT),
            found: false,
        }
    }

    fn path_map_hit(&self, url: &str, raw: &str) -> ResolvedImage {
        let name = basename(raw).to_string();
        ResolvedImage {
            url: url.to_string(),
            alt: name.clone(),
            title: Some(name),
            width: None,
            height: None,
            found: true,
        }
    }

    /// Pick the best variant: preference order `preferred, md, sm, lg,
    /// original`, first non-empty bucket wins; the first entry within a
    /// bucket is the best format.
    fn pick_variant<'e>(&self, entry: &'e MediaCatalogEntry) -> Option<&'e FormatVariant> {
        let preferred = self.options.preferred_size.as_str();
        for label in [preferred, "md", "sm", "lg", "original"] {
            if let Some(first) = entry.size_variants.get(label).and_then(|v| v.first()) {
                return Some(first);
            }
        }
        None
    }

    fn variant_url(&self, variant: &FormatVariant) -> String {
        if self.options.use_absolute_paths {
            variant
                .absolute_public_path
                .clone()
                .unwrap_or_else(|| variant.public_path.clone())
        } else {
            variant.public_path.clone()
        }
    }
}

/// Rewrite every `![[...]]` embed token in the document's text nodes into
/// image nodes, preserving surrounding text exactly. All embeds within one
/// text node are resolved in a single left-to-right pass.
pub fn rewrite_embeds<'a>(
    arena: &'a Arena<AstNode<'a>>,
    root: &'a AstNode<'a>,
    resolver: &MediaResolver<'_>,
) {
    let text_nodes: Vec<&AstNode> = root
        .descendants()
        .filter(|n| matches!(n.data.borrow().value, NodeValue::Text(_)))
        .collect();

    for node in text_nodes {
        let text = match &node.data.borrow().value {
            NodeValue::Text(t) => t.clone(),
            _ => continue,
        };

        let mut cursor = 0;
        let mut found_any = false;
        let mut splice: Vec<&AstNode> = Vec::new();

        for caps in EMBED_PATTERN.captures_iter(&text) {
            let m = caps.get(0).unwrap();
            found_any = true;

            if m.start() > cursor {
                splice.push(make_node(
                    arena,
                    NodeValue::Text(text[cursor..m.start()].to_string()),
                ));
            }

            let token = MediaToken::new(caps.get(1).unwrap().as_str());
            splice.push(image_node(arena, &resolver.resolve_token(&token)));
            cursor = m.end();
        }

        if !found_any {
            continue;
        }

        if cursor < text.len() {
            splice.push(make_node(arena, NodeValue::Text(text[cursor..].to_string())));
        }

        for piece in splice {
            node.insert_before(piece);
        }
        node.detach();
    }
}

/// Build the AST node for a resolved image. Dimension hints require a raw
/// `<img>` tag since the markdown image node cannot carry them.
fn image_node<'a>(arena: &'a Arena<AstNode<'a>>, image: &ResolvedImage) -> &'a AstNode<'a> {
    if let (Some(width), Some(height)) = (image.width, image.height) {
        let mut tag = format!(
            "<img src=\"{}\" alt=\"{}\"",
            escape_attr(&image.url),
            escape_attr(&image.alt)
        );
        if let Some(title) = &image.title {
            tag.push_str(&format!(" title=\"{}\"", escape_attr(title)));
        }
        tag.push_str(&format!(" width=\"{width}\" height=\"{height}\" />"));
        return make_node(arena, NodeValue::HtmlInline(tag));
    }

    let link = NodeLink {
        url: image.url.clone(),
        title: image.title.clone().unwrap_or_default(),
    };
    let node = make_node(arena, NodeValue::Image(link));
    node.append(make_node(arena, NodeValue::Text(image.alt.clone())));
    node
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
