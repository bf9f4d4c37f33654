//! Wiki-link classification and resolution.

use std::sync::LazyLock;

use comrak::Arena;
use comrak::nodes::{AstNode, NodeLink, NodeValue};
use regex::Regex;
use slug::slugify;

use super::types::{LinkRenderResult, ObsidianLink, WikiLinkToken};
use crate::document::tree::make_node;
use crate::visibility::AllowSet;

/// Matches [[...]] tokens; embeds are excluded by the leading-`!` check.
static WIKILINK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\]]+)\]\]").unwrap());

impl ObsidianLink {
    /// Classify a raw wiki-link token into exactly one variant.
    ///
    /// The five rules are tested in order and are disjoint only in this
    /// sequence: block-only, header-only, page+block, page+header, page.
    pub fn classify(token: &WikiLinkToken) -> ObsidianLink {
        let raw = token.raw_value();
        let alias = token.alias().map(str::to_string);

        if let Some(block) = raw.strip_prefix("#^") {
            if !block.is_empty() {
                return ObsidianLink::Block { block: block.to_string(), alias };
            }
        }
        if let Some(header) = raw.strip_prefix('#') {
            if !header.is_empty() && !header.starts_with('^') {
                return ObsidianLink::Header { header: header.to_string(), alias };
            }
        }
        if let Some((page, block)) = raw.split_once("#^") {
            return ObsidianLink::PageBlock {
                page: page.to_string(),
                block: block.to_string(),
                alias,
            };
        }
        if let Some((page, header)) = raw.split_once('#') {
            return ObsidianLink::PageHeader {
                page: page.to_string(),
                header: header.to_string(),
                alias,
            };
        }
        ObsidianLink::Page { page: raw.to_string(), alias }
    }

    /// The text shown to the reader. An alias always wins; otherwise each
    /// variant has a fixed textual form (block ids are dropped from
    /// page-level references).
    pub fn display_text(&self) -> String {
        match self {
            ObsidianLink::Page { page, alias } => {
                alias.clone().unwrap_or_else(|| page.clone())
            }
            ObsidianLink::PageHeader { page, header, alias } => {
                alias.clone().unwrap_or_else(|| format!("{page}#{header}"))
            }
            ObsidianLink::PageBlock { page, alias, .. } => {
                alias.clone().unwrap_or_else(|| page.clone())
            }
            ObsidianLink::Header { header, alias } => {
                alias.clone().unwrap_or_else(|| format!("#{header}"))
            }
            ObsidianLink::Block { block, alias } => {
                alias.clone().unwrap_or_else(|| format!("#^{block}"))
            }
        }
    }

    /// The output URI for this link. Block-level anchors are not supported
    /// in the output, so block fragments are dropped and a bare block
    /// reference has no URI at all.
    pub fn uri(&self, prefix: &str) -> String {
        match self {
            ObsidianLink::Page { page, .. } => {
                format!("{prefix}/{}", slugify(page_name(page)))
            }
            ObsidianLink::PageHeader { page, header, .. } => {
                format!("{prefix}/{}#{}", slugify(page_name(page)), slugify(header))
            }
            ObsidianLink::PageBlock { page, .. } => {
                format!("{prefix}/{}", slugify(page_name(page)))
            }
            ObsidianLink::Header { header, .. } => format!("#{}", slugify(header)),
            ObsidianLink::Block { .. } => String::new(),
        }
    }

    /// Resolve against the allow set. Page-carrying variants pass through
    /// the visibility gate; same-document header references always resolve
    /// since they never leave the current document. Bare block references
    /// always degrade to plain text.
    pub fn render(&self, allow: &AllowSet, prefix: &str) -> LinkRenderResult {
        let display_text = self.display_text();
        match self {
            ObsidianLink::Page { page, .. }
            | ObsidianLink::PageHeader { page, .. }
            | ObsidianLink::PageBlock { page, .. } => {
                if allow.contains_name(page_name(page)) {
                    LinkRenderResult::Hyperlink { display_text, uri: self.uri(prefix) }
                } else {
                    LinkRenderResult::PlainText { display_text }
                }
            }
            ObsidianLink::Header { .. } => {
                LinkRenderResult::Hyperlink { display_text, uri: self.uri(prefix) }
            }
            ObsidianLink::Block { .. } => LinkRenderResult::PlainText { display_text },
        }
    }
}

/// Final path segment of a page reference, with a trailing `.md` stripped.
/// `[[folder/Note]]` and `[[Note]]` both target `Note`.
fn page_name(page: &str) -> &str {
    let base = page.rsplit(['/', '\\']).next().unwrap_or(page);
    base.strip_suffix(".md").unwrap_or(base)
}

/// Rewrite every `[[...]]` token in the document's text nodes into anchor
/// or plain-text splices, preserving surrounding text exactly. Embed
/// tokens (`![[...]]`) are left for the media pass.
pub fn rewrite_links<'a>(
    arena: &'a Arena<AstNode<'a>>,
    root: &'a AstNode<'a>,
    allow: &AllowSet,
    prefix: &str,
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

        for caps in WIKILINK_PATTERN.captures_iter(&text) {
            let m = caps.get(0).unwrap();

            // A preceding `!` marks an embed, handled by the media pass.
            if m.start() > 0 && text.as_bytes()[m.start() - 1] == b'!' {
                continue;
            }
            found_any = true;

            if m.start() > cursor {
                splice.push(make_node(
                    arena,
                    NodeValue::Text(text[cursor..m.start()].to_string()),
                ));
            }

            let token = WikiLinkToken::parse(caps.get(1).unwrap().as_str());
            let link = ObsidianLink::classify(&token);
            splice.push(link_node(arena, link.render(allow, prefix)));
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

fn link_node<'a>(
    arena: &'a Arena<AstNode<'a>>,
    result: LinkRenderResult,
) -> &'a AstNode<'a> {
    match result {
        LinkRenderResult::Hyperlink { display_text, uri } => {
            let node = make_node(
                arena,
                NodeValue::Link(NodeLink { url: uri, title: String::new() }),
            );
            node.append(make_node(arena, NodeValue::Text(display_text)));
            node
        }
        LinkRenderResult::PlainText { display_text } => {
            make_node(arena, NodeValue::Text(display_text))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn classify(inner: &str) -> ObsidianLink {
        ObsidianLink::classify(&WikiLinkToken::parse(inner))
    }

    fn allow(names: &[&str]) -> AllowSet {
        let mut set = AllowSet::default();
        for name in names {
            set.insert_name((*name).to_string());
        }
        set
    }

    #[rstest]
    #[case("Page", ObsidianLink::Page { page: "Page".into(), alias: None })]
    #[case(
        "Page#Header",
        ObsidianLink::PageHeader { page: "Page".into(), header: "Header".into(), alias: None }
    )]
    #[case(
        "Page#^abc123",
        ObsidianLink::PageBlock { page: "Page".into(), block: "abc123".into(), alias: None }
    )]
    #[case("#Header", ObsidianLink::Header { header: "Header".into(), alias: None })]
    #[case("#^abc123", ObsidianLink::Block { block: "abc123".into(), alias: None })]
    fn classification_partition(#[case] inner: &str, #[case] expected: ObsidianLink) {
        assert_eq!(classify(inner), expected);
    }

    #[rstest]
    #[case("")]
    #[case("#")]
    #[case("#^")]
    #[case("a#b#c")]
    #[case("a#b#^c")]
    #[case("^leading-caret")]
    #[case("tra/lala/Note.md")]
    #[case("   spaces   ")]
    fn classification_is_total(#[case] inner: &str) {
        // Every string classifies into exactly one variant without panic.
        let _ = classify(inner);
    }

    #[test]
    fn multi_hash_splits_on_first_hash() {
        assert_eq!(
            classify("a#b#c"),
            ObsidianLink::PageHeader { page: "a".into(), header: "b#c".into(), alias: None }
        );
    }

    #[test]
    fn block_marker_beats_header_split() {
        assert_eq!(
            classify("a#b#^c"),
            ObsidianLink::PageBlock { page: "a#b".into(), block: "c".into(), alias: None }
        );
    }

    #[rstest]
    #[case("Page|Alias")]
    #[case("Page#Header|Alias")]
    #[case("Page#^blk|Alias")]
    #[case("#Header|Alias")]
    #[case("#^blk|Alias")]
    fn alias_always_wins_display(#[case] inner: &str) {
        assert_eq!(classify(inner).display_text(), "Alias");
    }

    #[test]
    fn display_text_without_alias() {
        assert_eq!(classify("Page").display_text(), "Page");
        assert_eq!(classify("Page#Header").display_text(), "Page#Header");
        // Block ids are dropped from page-level display text
        assert_eq!(classify("Page#^abc").display_text(), "Page");
        assert_eq!(classify("#Header").display_text(), "#Header");
        assert_eq!(classify("#^abc").display_text(), "#^abc");
    }

    #[test]
    fn uri_forms() {
        assert_eq!(classify("My Page").uri("/content"), "/content/my-page");
        assert_eq!(
            classify("My Page#Some Header").uri("/content"),
            "/content/my-page#some-header"
        );
        // Block fragments are dropped
        assert_eq!(classify("My Page#^abc").uri("/content"), "/content/my-page");
        assert_eq!(classify("#Some Header").uri("/content"), "#some-header");
        assert_eq!(classify("#^abc").uri("/content"), "");
    }

    #[test]
    fn folder_qualified_pages_slug_the_name_only() {
        assert_eq!(classify("notes/My Page").uri("/p"), "/p/my-page");
    }

    #[test]
    fn visibility_gate_allows_public_pages() {
        let allow = allow(&["Page"]);
        let result = classify("Page").render(&allow, "/content");
        assert_eq!(
            result,
            LinkRenderResult::Hyperlink {
                display_text: "Page".into(),
                uri: "/content/page".into()
            }
        );
    }

    #[test]
    fn visibility_gate_degrades_private_pages() {
        let allow = allow(&["Other"]);
        let result = classify("Page#Header").render(&allow, "/content");
        assert_eq!(result, LinkRenderResult::PlainText { display_text: "Page#Header".into() });
    }

    #[test]
    fn gate_is_idempotent() {
        let allow = allow(&["Page"]);
        let link = classify("Page");
        assert_eq!(link.render(&allow, "/c"), link.render(&allow, "/c"));
    }

    #[test]
    fn header_reference_bypasses_gate() {
        let allow = allow(&[]);
        let result = classify("#Header").render(&allow, "/content");
        assert_eq!(
            result,
            LinkRenderResult::Hyperlink {
                display_text: "#Header".into(),
                uri: "#header".into()
            }
        );
    }

    #[test]
    fn block_reference_always_plain_text() {
        // Even a fully public allow set never turns a bare block reference
        // into a hyperlink.
        let allow = allow(&["Page", "Other"]);
        let result = classify("#^abc123").render(&allow, "/content");
        assert_eq!(result, LinkRenderResult::PlainText { display_text: "#^abc123".into() });
    }

    #[test]
    fn folder_qualified_target_passes_gate_by_name() {
        let allow = allow(&["Note"]);
        let result = classify("folder/Note").render(&allow, "/c");
        assert!(matches!(result, LinkRenderResult::Hyperlink { .. }));
    }
}
