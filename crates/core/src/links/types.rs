//! Link data model: raw tokens, classified links, render results.

/// Raw `[[...]]` reference as written in a note, before classification.
/// Immutable once parsed from source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiLinkToken {
    raw_value: String,
    alias: Option<String>,
}

impl WikiLinkToken {
    /// Parse the inner text of a `[[...]]` token. The display alias is
    /// split off at the first `|`, as in `[[Page|Alias]]`.
    pub fn parse(inner: &str) -> Self {
        match inner.split_once('|') {
            Some((value, alias)) => Self {
                raw_value: value.to_string(),
                alias: Some(alias.to_string()),
            },
            None => Self { raw_value: inner.to_string(), alias: None },
        }
    }

    /// The reference value without the alias, e.g. `"Page#Header"`.
    pub fn raw_value(&self) -> &str {
        &self.raw_value
    }

    /// The display override, from `[[Page|Alias]]` syntax.
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }
}

/// A classified wiki reference. Exactly one variant applies to any raw
/// value; the partition is established by [`ObsidianLink::classify`] and
/// every consumer matches exhaustively so the compiler keeps it total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObsidianLink {
    /// `[[Page]]`
    Page { page: String, alias: Option<String> },
    /// `[[Page#Header]]`
    PageHeader { page: String, header: String, alias: Option<String> },
    /// `[[Page#^block]]`
    PageBlock { page: String, block: String, alias: Option<String> },
    /// `[[#Header]]` - reference within the current document.
    Header { header: String, alias: Option<String> },
    /// `[[#^block]]` - block reference within the current document.
    Block { block: String, alias: Option<String> },
}

/// Outcome of resolving a link: either a real hyperlink, or the plain-text
/// degradation used for private targets and bare block references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkRenderResult {
    Hyperlink { display_text: String, uri: String },
    PlainText { display_text: String },
}

impl LinkRenderResult {
    /// The text shown to the reader, regardless of outcome.
    pub fn display_text(&self) -> &str {
        match self {
            LinkRenderResult::Hyperlink { display_text, .. } => display_text,
            LinkRenderResult::PlainText { display_text } => display_text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_without_alias() {
        let token = WikiLinkToken::parse("Page#Header");
        assert_eq!(token.raw_value(), "Page#Header");
        assert_eq!(token.alias(), None);
    }

    #[test]
    fn token_with_alias() {
        let token = WikiLinkToken::parse("Page|Display");
        assert_eq!(token.raw_value(), "Page");
        assert_eq!(token.alias(), Some("Display"));
    }

    #[test]
    fn alias_splits_on_first_pipe() {
        let token = WikiLinkToken::parse("Page|a|b");
        assert_eq!(token.raw_value(), "Page");
        assert_eq!(token.alias(), Some("a|b"));
    }
}
