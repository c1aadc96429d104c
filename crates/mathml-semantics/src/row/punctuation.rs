use semantic_attr::attribute::{SemanticRole, SemanticType};

use crate::builder::{Partition, TreeBuilder};
use crate::node::NodeId;

impl TreeBuilder<'_> {
    /// Groups a row at its punctuation marks. Ellipses count as operands, not as marks.
    pub(super) fn get_punctuation_in_row(&mut self, nodes: Vec<NodeId>) -> Vec<NodeId> {
        let Partition { rel, comp } = self.partition(&nodes, |n| {
            n.node_type == SemanticType::Punctuation && n.role != SemanticRole::Ellipsis
        });
        if rel.is_empty() {
            return nodes;
        }
        let mut runs = comp.into_iter();
        let mut children = Vec::with_capacity(2 * rel.len() + 1);
        if let Some(first) = runs.next()
            && !first.is_empty()
        {
            children.push(self.process_row(first));
        }
        for (&mark, run) in rel.iter().zip(runs) {
            children.push(mark);
            if !run.is_empty() {
                children.push(self.process_row(run));
            }
        }
        vec![self.make_punctuated_node(children, rel)]
    }

    /// The marks are listed both among `nodes` and as content.
    pub(super) fn make_punctuated_node(
        &mut self,
        nodes: Vec<NodeId>,
        punctuation: Vec<NodeId>,
    ) -> NodeId {
        let is_punct = |id: Option<&NodeId>| {
            id.is_some_and(|&id| self.node_type(id) == SemanticType::Punctuation)
        };
        let role = match (punctuation.len(), is_punct(nodes.first()), is_punct(nodes.last())) {
            (1, true, _) => SemanticRole::StartPunct,
            (1, _, true) => SemanticRole::EndPunct,
            _ => SemanticRole::Sequence,
        };
        let node = self.make_branch(SemanticType::Punctuated, nodes, punctuation, None);
        self.set_role(node, role);
        node
    }
}

#[cfg(test)]
mod tests {
    use semantic_attr::symbol::SymbolTable;

    use super::*;
    use crate::mathml::Document;
    use crate::row::tests::{leaves, shape};

    fn punctuate(texts: &[&str]) -> (String, SemanticRole) {
        let doc = Document::new("math");
        let mut builder = TreeBuilder::new(&doc, &SymbolTable);
        let nodes = leaves(&mut builder, texts);
        let [node] = builder.get_punctuation_in_row(nodes)[..] else {
            panic!("expected a single node");
        };
        (shape(&builder, node), builder.role(node))
    }

    #[test]
    fn sequence() {
        assert_eq!(
            punctuate(&["a", ",", "b", "c", ",", "d"]),
            ("punctuated(a , infixop(b c) , d)".to_string(), SemanticRole::Sequence)
        );
    }

    #[test]
    fn start_and_end_punctuation() {
        assert_eq!(
            punctuate(&[",", "a"]),
            ("punctuated(, a)".to_string(), SemanticRole::StartPunct)
        );
        assert_eq!(
            punctuate(&["a", "b", "."]),
            ("punctuated(infixop(a b) .)".to_string(), SemanticRole::EndPunct)
        );
        // Two marks are always a sequence.
        assert_eq!(
            punctuate(&[",", "a", ","]),
            ("punctuated(, a ,)".to_string(), SemanticRole::Sequence)
        );
    }

    #[test]
    fn marks_are_children_and_content() {
        let doc = Document::new("math");
        let mut builder = TreeBuilder::new(&doc, &SymbolTable);
        let nodes = leaves(&mut builder, &["a", ";", "b"]);
        let [node] = builder.get_punctuation_in_row(nodes.clone())[..] else {
            panic!("expected a single node");
        };
        assert_eq!(builder.node(node).children(), nodes);
        assert_eq!(builder.node(node).content_nodes(), [nodes[1]]);
    }

    #[test]
    fn ellipsis_is_not_a_separator() {
        let doc = Document::new("math");
        let mut builder = TreeBuilder::new(&doc, &SymbolTable);
        let nodes = leaves(&mut builder, &["a", "…", "b"]);
        assert_eq!(builder.get_punctuation_in_row(nodes.clone()), nodes);
    }
}
