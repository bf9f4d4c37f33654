//! Node construction helpers for comrak AST splicing.

use comrak::Arena;
use comrak::nodes::{AstNode, NodeValue};

/// Allocate a detached node for insertion into a parsed document. Spliced
/// nodes carry no meaningful source position.
pub(crate) fn make_node<'a>(
    arena: &'a Arena<AstNode<'a>>,
    value: NodeValue,
) -> &'a AstNode<'a> {
    arena.alloc(AstNode::from(value))
}

/// Concatenated text content of a node's descendants.
pub(crate) fn collect_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    for child in node.descendants() {
        if let NodeValue::Text(ref t) = child.data.borrow().value {
            text.push_str(t);
        }
    }
    text
}
