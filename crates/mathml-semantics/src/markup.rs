//! The tagged-tree view of a semantic tree.
use std::fmt::{self, Write};

use semantic_attr::attribute::SemanticFont;

use crate::node::{NodeId, SemanticNode};

const INDENT: &str = "    ";

pub(crate) fn new_line_and_indent(s: &mut String, indent_num: usize) {
    if indent_num > 0 {
        s.push('\n');
    }
    for _ in 0..indent_num {
        s.push_str(INDENT);
    }
}

/// Escapes `&`, `<` and `>` in `input` and appends the result to `output`.
pub(crate) fn escape_html_content(output: &mut String, input: &str) {
    let mut haystack = input;
    while let Some(index) = memchr::memchr3(b'&', b'<', b'>', haystack.as_bytes()) {
        // The special characters are ASCII, so `index` is a char boundary.
        let Some((before, after)) = haystack.split_at_checked(index) else {
            break;
        };
        output.push_str(before);
        let mut rest = after.chars();
        match rest.next() {
            Some('&') => output.push_str("&amp;"),
            Some('<') => output.push_str("&lt;"),
            Some('>') => output.push_str("&gt;"),
            _ => {}
        }
        haystack = rest.as_str();
    }
    output.push_str(haystack);
}

pub(crate) struct MarkupEmitter<'tree> {
    s: String,
    nodes: &'tree [SemanticNode],
    brief: bool,
}

impl<'tree> MarkupEmitter<'tree> {
    pub(crate) fn new(nodes: &'tree [SemanticNode], brief: bool) -> Self {
        MarkupEmitter {
            s: String::new(),
            nodes,
            brief,
        }
    }

    #[inline]
    pub(crate) fn into_inner(self) -> String {
        self.s
    }

    #[inline]
    pub(crate) fn push_str(&mut self, s: &str) {
        self.s.push_str(s);
    }

    /// Writes the element of `id` and, recursively, of its content and child nodes.
    ///
    /// An indent of 0 disables pretty printing for the whole subtree.
    pub(crate) fn emit(&mut self, id: NodeId, base_indent: usize) -> fmt::Result {
        let child_indent = if base_indent > 0 {
            base_indent.saturating_add(1)
        } else {
            0
        };
        let nodes = self.nodes;
        let node = &nodes[id.index()];
        let tag = node.node_type.as_str();

        new_line_and_indent(&mut self.s, base_indent);
        write!(self.s, "<{tag}")?;
        if !self.brief {
            write!(self.s, " role=\"{}\"", node.role.as_str())?;
            if node.font != SemanticFont::Unknown {
                write!(self.s, " font=\"{}\"", node.font.as_str())?;
            }
            write!(self.s, " id=\"{}\"", node.id)?;
        }
        if node.text.is_empty() && node.is_leaf() {
            self.s.push_str("/>");
            return Ok(());
        }
        self.s.push('>');
        escape_html_content(&mut self.s, &node.text);

        let groups = [("content", &node.content), ("children", &node.children)];
        let mut has_groups = false;
        for (group, members) in groups {
            if members.is_empty() {
                continue;
            }
            has_groups = true;
            new_line_and_indent(&mut self.s, child_indent);
            write!(self.s, "<{group}>")?;
            let member_indent = if child_indent > 0 { child_indent + 1 } else { 0 };
            for &member in members.iter() {
                self.emit(member, member_indent)?;
            }
            new_line_and_indent(&mut self.s, child_indent);
            write!(self.s, "</{group}>")?;
        }
        if has_groups {
            new_line_and_indent(&mut self.s, base_indent);
        }
        write!(self.s, "</{tag}>")
    }
}

#[cfg(test)]
mod tests {
    use semantic_attr::attribute::{SemanticRole, SemanticType};

    use super::*;

    #[test]
    fn test_empty_input() {
        let mut output = String::new();
        escape_html_content(&mut output, "");
        assert_eq!(output, "");
    }

    #[test]
    fn test_no_special_characters() {
        let mut output = String::new();
        escape_html_content(&mut output, "a + b");
        assert_eq!(output, "a + b");
    }

    #[test]
    fn test_relations() {
        let mut output = String::new();
        escape_html_content(&mut output, "a < b > c");
        assert_eq!(output, "a &lt; b &gt; c");
    }

    #[test]
    fn test_consecutive_special_characters() {
        let mut output = String::new();
        escape_html_content(&mut output, "&<>");
        assert_eq!(output, "&amp;&lt;&gt;");
    }

    #[test]
    fn test_utf8_with_special_characters() {
        let mut output = "prefix: ".to_string();
        escape_html_content(&mut output, "∑ & ≤ < ∫");
        assert_eq!(output, "prefix: ∑ &amp; ≤ &lt; ∫");
    }

    fn leaf(id: u32, node_type: SemanticType, text: &str) -> SemanticNode {
        let mut node = SemanticNode::new(NodeId::new(id as usize));
        node.node_type = node_type;
        node.text = text.to_string();
        node
    }

    fn sum() -> Vec<SemanticNode> {
        let mut a = leaf(0, SemanticType::Identifier, "a");
        a.role = SemanticRole::LatinLetter;
        a.font = SemanticFont::Italic;
        let mut lt = leaf(1, SemanticType::Relation, "<");
        lt.role = SemanticRole::Inequality;
        let b = leaf(2, SemanticType::Empty, "");
        let mut rel = leaf(3, SemanticType::RelSeq, "<");
        rel.role = SemanticRole::Inequality;
        rel.children = vec![NodeId::new(0), NodeId::new(2)];
        rel.content = vec![NodeId::new(1)];
        vec![a, lt, b, rel]
    }

    #[test]
    fn emit_brief() {
        let nodes = sum();
        let mut emitter = MarkupEmitter::new(&nodes, true);
        emitter.emit(NodeId::new(3), 0).unwrap();
        assert_eq!(
            emitter.into_inner(),
            "<relseq>&lt;<content><relation>&lt;</relation></content><children><identifier>a</identifier><empty/></children></relseq>"
        );
    }

    #[test]
    fn emit_with_attributes() {
        let nodes = sum();
        let mut emitter = MarkupEmitter::new(&nodes, false);
        emitter.emit(NodeId::new(0), 0).unwrap();
        emitter.emit(NodeId::new(2), 0).unwrap();
        assert_eq!(
            emitter.into_inner(),
            r#"<identifier role="latinletter" font="italic" id="0">a</identifier><empty role="unknown" id="2"/>"#
        );
    }

    #[test]
    fn emit_pretty() {
        let nodes = sum();
        let mut emitter = MarkupEmitter::new(&nodes, true);
        emitter.emit(NodeId::new(3), 1).unwrap();
        assert_eq!(
            emitter.into_inner(),
            "\n    <relseq>&lt;\n        <content>\n            <relation>&lt;</relation>\n        </content>\n        <children>\n            <identifier>a</identifier>\n            <empty/>\n        </children>\n    </relseq>"
        );
    }
}
