//! Document outline and text extraction.

use comrak::nodes::{AstNode, NodeValue};
use slug::slugify;

use super::pipeline::TocEntry;
use super::tree::collect_text;

/// Collect the table of contents: one entry per heading, in document
/// order, with the anchor id derived the same way link URIs are.
pub fn table_of_contents<'a>(root: &'a AstNode<'a>) -> Vec<TocEntry> {
    let mut toc = Vec::new();
    for node in root.descendants() {
        if let NodeValue::Heading(ref heading) = node.data.borrow().value {
            let title = collect_text(node);
            toc.push(TocEntry { id: slugify(&title), title, depth: heading.level });
        }
    }
    toc
}

/// Readable plain text of the document: text content with block
/// boundaries collapsed to newlines.
pub fn plain_text<'a>(root: &'a AstNode<'a>) -> String {
    let mut out = String::new();
    append_plain(root, &mut out);
    out.trim().to_string()
}

fn append_plain<'a>(node: &'a AstNode<'a>, out: &mut String) {
    for child in node.children() {
        {
            let value = &child.data.borrow().value;
            match value {
                NodeValue::Text(t) => out.push_str(t),
                NodeValue::Code(code) => out.push_str(&code.literal),
                NodeValue::SoftBreak | NodeValue::LineBreak => out.push(' '),
                _ => {}
            }
        }

        append_plain(child, out);

        let is_block = matches!(
            child.data.borrow().value,
            NodeValue::Paragraph | NodeValue::Heading(_) | NodeValue::Item(_)
        );
        if is_block && !out.ends_with('\n') {
            out.push('\n');
        }
    }
}

/// Text of the first top-level paragraph, or empty when the document has
/// none.
pub fn first_paragraph<'a>(root: &'a AstNode<'a>) -> String {
    for child in root.children() {
        if matches!(child.data.borrow().value, NodeValue::Paragraph) {
            return collect_text(child);
        }
    }
    String::new()
}
