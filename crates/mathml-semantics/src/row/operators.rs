use std::mem;

use semantic_attr::attribute::{SemanticRole, SemanticType};

use crate::builder::{Partition, Split, TreeBuilder};
use crate::node::{NodeId, SemanticNode};

fn is_operator(node: &SemanticNode) -> bool {
    node.node_type == SemanticType::Operator
}

impl TreeBuilder<'_> {
    /// Splits a row at its relations. Equal relations form a RELSEQ, mixed ones a MULTIREL.
    pub(super) fn process_relations_in_row(&mut self, nodes: Vec<NodeId>) -> NodeId {
        let Partition { rel, comp } =
            self.partition(&nodes, |n| n.node_type == SemanticType::Relation);
        let Some(&first) = rel.first() else {
            return self.process_operations_in_row(nodes);
        };
        if let [single] = nodes[..] {
            return single;
        }
        let children: Vec<NodeId> = comp
            .into_iter()
            .map(|run| self.process_operations_in_row(run))
            .collect();
        let text = self.text(first).to_string();
        if rel.iter().all(|&relation| self.text(relation) == text) {
            self.make_branch(SemanticType::RelSeq, children, rel, Some(&text))
        } else {
            self.make_branch(SemanticType::MultiRel, children, rel, None)
        }
    }

    /// The operator assembler for a row without relations.
    fn process_operations_in_row(&mut self, nodes: Vec<NodeId>) -> NodeId {
        match nodes[..] {
            [] => return self.make_empty(),
            [single] => return single,
            _ => {}
        }
        let start = nodes
            .iter()
            .position(|&node| !is_operator(self.node(node)))
            .unwrap_or(nodes.len());
        let mut prefix = nodes[..start].to_vec();
        match nodes[start..] {
            // Only operators.
            [] => {
                let Some(last) = prefix.pop() else {
                    return self.make_empty();
                };
                return self.make_prefix_node(last, prefix);
            }
            [single] => return self.make_prefix_node(single, prefix),
            _ => {}
        }
        let Split { head, div, tail } = self.slice(&nodes[start..], is_operator);
        let operand = self.make_implicit_node(head);
        let node = self.make_prefix_node(operand, prefix);
        match div {
            Some(op) => self.make_operations_tree(tail, node, op),
            None => node,
        }
    }

    /// Folds the remaining operator/operand pairs into `root`, left to right.
    ///
    /// Operators directly following `last_op` are prefixes of the next operand; operators
    /// at the end of the row become postfixes of the last operand.
    fn make_operations_tree(
        &mut self,
        mut nodes: Vec<NodeId>,
        mut root: NodeId,
        mut last_op: NodeId,
    ) -> NodeId {
        let mut prefixes = Vec::new();
        loop {
            if nodes.is_empty() {
                prefixes.insert(0, last_op);
                return self.fold_postfix(root, prefixes);
            }
            let Split { head, div, tail } = self.slice(&nodes, is_operator);
            nodes = tail;
            if head.is_empty() {
                prefixes.extend(div);
                continue;
            }
            let operand = self.make_implicit_node(head);
            let operand = self.make_prefix_node(operand, mem::take(&mut prefixes));
            root = self.append_operand(root, last_op, operand);
            match div {
                Some(op) => last_op = op,
                None => return root,
            }
        }
    }

    fn fold_postfix(&mut self, root: NodeId, postfixes: Vec<NodeId>) -> NodeId {
        if self.node_type(root) == SemanticType::InfixOp
            && let Some(&last) = self.node(root).children.last()
        {
            let node = self.make_postfix_node(last, postfixes);
            self.replace_child(root, last, node);
            return root;
        }
        self.make_postfix_node(root, postfixes)
    }

    /// Additive operators stack on top of the whole tree, multiplicative ones bind to the
    /// rightmost operand.
    fn append_operand(&mut self, root: NodeId, op: NodeId, node: NodeId) -> NodeId {
        if self.node_type(root) != SemanticType::InfixOp {
            return self.make_infix_node(vec![root, node], op);
        }
        if self.append_existing_operator(root, op, node) {
            return root;
        }
        if self.role(op) == SemanticRole::Multiplication {
            self.append_multiplicative_op(root, op, node)
        } else {
            self.make_infix_node(vec![root, node], op)
        }
    }

    /// Extends the first INFIXOP on the rightmost path whose operator has the text of `op`.
    fn append_existing_operator(&mut self, root: NodeId, op: NodeId, node: NodeId) -> bool {
        let mut current = root;
        loop {
            if self.node_type(current) != SemanticType::InfixOp {
                return false;
            }
            if self.text(current) == self.text(op) {
                self.append_content(current, op);
                self.append_child(current, node);
                return true;
            }
            match self.node(current).children.last() {
                Some(&last) => current = last,
                None => return false,
            }
        }
    }

    fn append_multiplicative_op(&mut self, root: NodeId, op: NodeId, node: NodeId) -> NodeId {
        let mut last_root = root;
        let mut last_child = self.node(root).children.last().copied();
        while let Some(child) = last_child
            && self.node_type(child) == SemanticType::InfixOp
        {
            last_root = child;
            last_child = self.node(child).children.last().copied();
        }
        let Some(operand) = last_child else {
            return self.make_infix_node(vec![root, node], op);
        };
        let product = self.make_infix_node(vec![operand, node], op);
        self.replace_child(last_root, operand, product);
        root
    }
}

#[cfg(test)]
mod tests {
    use semantic_attr::symbol::SymbolTable;

    use super::*;
    use crate::mathml::Document;
    use crate::row::tests::{leaves, shape};

    /// Renders operator nodes with their text so precedence is visible.
    fn ops(builder: &TreeBuilder<'_>, id: NodeId) -> String {
        let node = builder.node(id);
        match node.node_type() {
            SemanticType::InfixOp
            | SemanticType::PrefixOp
            | SemanticType::PostfixOp
            | SemanticType::RelSeq
            | SemanticType::MultiRel => {
                let children: Vec<String> =
                    node.children().iter().map(|&c| ops(builder, c)).collect();
                let text = match node.role() {
                    SemanticRole::Implicit => "_",
                    SemanticRole::Negative => "neg",
                    _ => node.text_content(),
                };
                format!("[{text} {}]", children.join(" "))
            }
            _ => shape(builder, id),
        }
    }

    fn assemble(texts: &[&str]) -> String {
        let doc = Document::new("math");
        let mut builder = TreeBuilder::new(&doc, &SymbolTable);
        let nodes = leaves(&mut builder, texts);
        let node = builder.process_relations_in_row(nodes);
        ops(&builder, node)
    }

    #[test]
    fn relations() {
        assert_eq!(assemble(&["a", "=", "b", "=", "c"]), "[= a b c]");
        assert_eq!(assemble(&["a", "=", "b", "<", "c"]), "[ a b c]");
        assert_eq!(assemble(&["a", "=", "b", "+", "c"]), "[= a [+ b c]]");
        assert_eq!(assemble(&["=", "b"]), "[= empty b]");
        assert_eq!(assemble(&["="]), "=");
    }

    #[test]
    fn relation_sequence_content() {
        let doc = Document::new("math");
        let mut builder = TreeBuilder::new(&doc, &SymbolTable);
        let nodes = leaves(&mut builder, &["a", "=", "b", "=", "c"]);
        let node = builder.process_relations_in_row(nodes.clone());
        assert_eq!(builder.node_type(node), SemanticType::RelSeq);
        assert_eq!(builder.role(node), SemanticRole::Equality);
        assert_eq!(builder.node(node).content_nodes(), [nodes[1], nodes[3]]);

        let nodes = leaves(&mut builder, &["a", "=", "b", "<", "c"]);
        let node = builder.process_relations_in_row(nodes);
        assert_eq!(builder.node_type(node), SemanticType::MultiRel);
        assert_eq!(builder.text(node), "");
    }

    #[test]
    fn precedence() {
        assert_eq!(assemble(&["a", "+", "b", "*", "c"]), "[+ a [* b c]]");
        assert_eq!(assemble(&["a", "*", "b", "+", "c"]), "[+ [* a b] c]");
        assert_eq!(assemble(&["a", "+", "b", "+", "c"]), "[+ a b c]");
        assert_eq!(assemble(&["a", "-", "b", "+", "c"]), "[+ [- a b] c]");
        assert_eq!(
            assemble(&["a", "+", "b", "*", "c", "*", "d"]),
            "[+ a [* b c d]]"
        );
        assert_eq!(
            assemble(&["a", "*", "b", "+", "c", "*", "d"]),
            "[+ [* a b] [* c d]]"
        );
        assert_eq!(
            assemble(&["a", "+", "b", "*", "c", "+", "d"]),
            "[+ a [* b c] d]"
        );
    }

    #[test]
    fn implicit_multiplication() {
        assert_eq!(assemble(&["a", "b", "c"]), "[_ a b c]");
        assert_eq!(assemble(&["a", "b", "+", "c"]), "[+ [_ a b] c]");
        assert_eq!(assemble(&["a", "b", "*", "c"]), "[_ a [* b c]]");
    }

    #[test]
    fn prefix_operators() {
        assert_eq!(assemble(&["-", "a"]), "[neg a]");
        assert_eq!(assemble(&["+", "-", "a"]), "[+ [neg a]]");
        assert_eq!(assemble(&["-", "+", "a"]), "[neg [+ a]]");
        assert_eq!(assemble(&["-", "-", "a"]), "[neg [neg a]]");
        assert_eq!(assemble(&["-", "a", "+", "b"]), "[+ [neg a] b]");
        assert_eq!(assemble(&["a", "+", "-", "b"]), "[+ a [neg b]]");
        assert_eq!(assemble(&["+", "-"]), "[+ -]");
    }

    #[test]
    fn postfix_operators() {
        assert_eq!(assemble(&["a", "+"]), "[+ a]");
        assert_eq!(assemble(&["a", "+", "b", "+"]), "[+ a [+ b]]");
        assert_eq!(assemble(&["a", "+", "b", "*", "-"]), "[+ a [* - b]]");
    }

    #[test]
    fn operators_keep_their_tokens_as_content() {
        let doc = Document::new("math");
        let mut builder = TreeBuilder::new(&doc, &SymbolTable);
        let nodes = leaves(&mut builder, &["a", "+", "b", "+", "c"]);
        let node = builder.process_relations_in_row(nodes.clone());
        assert_eq!(builder.node(node).content_nodes(), [nodes[1], nodes[3]]);
        assert_eq!(builder.node(node).children(), [nodes[0], nodes[2], nodes[4]]);
        for &child in builder.node(node).children() {
            assert_eq!(builder.node(child).parent(), Some(node));
        }
    }
}
