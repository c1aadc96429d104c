//! The row processor: turns a flat sequence of sibling nodes into one nested node.
//!
//! The stages run in a fixed order, each one feeding the next:
//! fences, tables, punctuation, functions, then relations and operators.
mod fences;
mod functions;
mod operators;
mod punctuation;
mod tables;

use tracing::trace;

use crate::builder::TreeBuilder;
use crate::node::NodeId;

impl TreeBuilder<'_> {
    /// Builds the node for a whole row. An empty row yields an EMPTY node.
    pub(crate) fn process_row(&mut self, nodes: Vec<NodeId>) -> NodeId {
        if nodes.is_empty() {
            return self.make_empty();
        }
        trace!(len = nodes.len(), "processing row");
        let nodes = self.get_fences_in_row(nodes);
        let nodes = self.process_tables_in_row(nodes);
        let nodes = self.get_punctuation_in_row(nodes);
        let nodes = self.get_functions_in_row(nodes);
        self.process_relations_in_row(nodes)
    }
}

#[cfg(test)]
pub(super) mod tests {
    use semantic_attr::attribute::SemanticType;
    use semantic_attr::symbol::SymbolTable;

    use super::*;
    use crate::mathml::Document;

    /// Creates one classified leaf per text. Unknown texts become identifiers, as they
    /// would inside `<mi>`.
    pub(in crate::row) fn leaves(builder: &mut TreeBuilder<'_>, texts: &[&str]) -> Vec<NodeId> {
        texts
            .iter()
            .map(|text| {
                let id = builder.create_node();
                builder.update_content(id, text);
                if builder.node_type(id) == SemanticType::Unknown {
                    builder.set_type(id, SemanticType::Identifier);
                }
                id
            })
            .collect()
    }

    /// A compact rendering of a subtree: leaves by text, branches by type and children.
    pub(in crate::row) fn shape(builder: &TreeBuilder<'_>, id: NodeId) -> String {
        let node = builder.node(id);
        if node.children().is_empty() {
            return match node.text_content() {
                "" => node.node_type().as_str().to_string(),
                text => text.to_string(),
            };
        }
        let children: Vec<String> = node
            .children()
            .iter()
            .map(|&child| shape(builder, child))
            .collect();
        format!("{}({})", node.node_type().as_str(), children.join(" "))
    }

    #[test]
    fn empty_row() {
        let doc = Document::new("math");
        let mut builder = TreeBuilder::new(&doc, &SymbolTable);
        let node = builder.process_row(vec![]);
        assert_eq!(shape(&builder, node), "empty");
    }

    #[test]
    fn all_stages() {
        let doc = Document::new("math");
        let mut builder = TreeBuilder::new(&doc, &SymbolTable);
        let nodes = leaves(&mut builder, &["f", "(", "x", ")", "=", "sin", "y", ",", "z"]);
        let node = builder.process_row(nodes);
        assert_eq!(
            shape(&builder, node),
            "punctuated(relseq(appl(f fenced(x)) appl(sin y)) , z)"
        );
    }
}
