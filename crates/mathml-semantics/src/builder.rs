use semantic_attr::attribute::{SemanticFont, SemanticRole, SemanticType};
use semantic_attr::symbol::SymbolClassifier;

use crate::mathml::{Document, ElementId};
use crate::node::{NodeId, SemanticNode};

/// Owns the node arena while a tree is being built.
///
/// The arena length doubles as the id counter: a node's id is its index.
pub(crate) struct TreeBuilder<'source> {
    pub(crate) doc: &'source Document,
    pub(crate) symbols: &'source dyn SymbolClassifier,
    nodes: Vec<SemanticNode>,
}

/// A row cut at every node matching a predicate.
///
/// `comp` always holds one more run than there are separators in `rel`.
pub(crate) struct Partition {
    pub rel: Vec<NodeId>,
    pub comp: Vec<Vec<NodeId>>,
}

/// A row cut at the first node matching a predicate.
pub(crate) struct Split {
    pub head: Vec<NodeId>,
    pub div: Option<NodeId>,
    pub tail: Vec<NodeId>,
}

impl<'source> TreeBuilder<'source> {
    pub(crate) fn new(doc: &'source Document, symbols: &'source dyn SymbolClassifier) -> Self {
        TreeBuilder {
            doc,
            symbols,
            nodes: Vec::new(),
        }
    }

    pub(crate) fn into_nodes(self) -> Vec<SemanticNode> {
        self.nodes
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &SemanticNode {
        &self.nodes[id.index()]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut SemanticNode {
        &mut self.nodes[id.index()]
    }

    #[inline]
    pub(crate) fn node_type(&self, id: NodeId) -> SemanticType {
        self.node(id).node_type
    }

    #[inline]
    pub(crate) fn role(&self, id: NodeId) -> SemanticRole {
        self.node(id).role
    }

    #[inline]
    pub(crate) fn text(&self, id: NodeId) -> &str {
        &self.node(id).text
    }

    #[inline]
    pub(crate) fn set_type(&mut self, id: NodeId, node_type: SemanticType) {
        self.node_mut(id).node_type = node_type;
    }

    #[inline]
    pub(crate) fn set_role(&mut self, id: NodeId, role: SemanticRole) {
        self.node_mut(id).role = role;
    }

    pub(crate) fn create_node(&mut self) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(SemanticNode::new(id));
        id
    }

    /// Sets the text of a node and re-derives type, role and font from it.
    ///
    /// Nothing happens if the trimmed text equals the current text.
    pub(crate) fn update_content(&mut self, id: NodeId, content: &str) {
        let content = content.trim();
        let node = &mut self.nodes[id.index()];
        if node.text == content {
            return;
        }
        let meaning = self.symbols.classify(content);
        node.text = content.to_string();
        node.node_type = meaning.node_type;
        node.role = meaning.role;
        node.font = meaning.font;
    }

    /// Adds `entries` to the provenance of `target` and of all its ancestors.
    fn add_provenance(&mut self, target: NodeId, entries: &[ElementId]) {
        let mut current = Some(target);
        // A parent chain can never be longer than the arena.
        for _ in 0..self.nodes.len() {
            let Some(id) = current else {
                break;
            };
            let node = &mut self.nodes[id.index()];
            node.mathml.extend(entries.iter().copied());
            current = node.parent;
        }
    }

    fn absorb_provenance(&mut self, target: NodeId, source: NodeId) {
        let entries: Vec<ElementId> = self.node(source).mathml.iter().copied().collect();
        self.add_provenance(target, &entries);
    }

    pub(crate) fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.node_mut(parent).children.push(child);
        self.absorb_provenance(parent, child);
        self.node_mut(child).parent = Some(parent);
    }

    pub(crate) fn append_content(&mut self, parent: NodeId, node: NodeId) {
        self.node_mut(parent).content.push(node);
        self.absorb_provenance(parent, node);
        self.node_mut(node).parent = Some(parent);
    }

    /// Puts `new` in the child slot of `old`.
    ///
    /// Provenance that only `old` contributed is dropped from `parent`. `old` loses its
    /// parent link only if it still points at `parent`.
    pub(crate) fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) {
        let Some(slot) = self.node(parent).children.iter().position(|&c| c == old) else {
            return;
        };
        self.node_mut(parent).children[slot] = new;
        if self.node(old).parent == Some(parent) {
            self.node_mut(old).parent = None;
        }
        self.node_mut(new).parent = Some(parent);

        let new_mathml = &self.node(new).mathml;
        let stale: Vec<ElementId> = self
            .node(old)
            .mathml
            .iter()
            .filter(|element| !new_mathml.contains(*element))
            .copied()
            .collect();
        let parent_mathml = &mut self.node_mut(parent).mathml;
        for element in &stale {
            parent_mathml.shift_remove(element);
        }
        self.absorb_provenance(parent, new);
    }

    pub(crate) fn make_branch(
        &mut self,
        node_type: SemanticType,
        children: Vec<NodeId>,
        content: Vec<NodeId>,
        text: Option<&str>,
    ) -> NodeId {
        let id = self.create_node();
        if let Some(text) = text {
            self.update_content(id, text);
        }
        self.set_type(id, node_type);
        for &node in children.iter().chain(&content) {
            self.node_mut(node).parent = Some(id);
            self.absorb_provenance(id, node);
        }
        let node = self.node_mut(id);
        node.children = children;
        node.content = content;
        id
    }

    pub(crate) fn make_leaf(&mut self, element: ElementId) -> NodeId {
        let doc = self.doc;
        let id = self.create_node();
        self.node_mut(id).mathml.insert(element);
        self.update_content(id, &doc.text_content(element));
        if let Some(font) = doc
            .element(element)
            .attribute("mathvariant")
            .and_then(|variant| variant.parse::<SemanticFont>().ok())
        {
            self.node_mut(id).font = font;
        }
        id
    }

    pub(crate) fn make_empty(&mut self) -> NodeId {
        let id = self.create_node();
        self.set_type(id, SemanticType::Empty);
        id
    }

    /// A node standing in for an element that is not interpreted.
    pub(crate) fn make_unprocessed(&mut self, element: ElementId) -> NodeId {
        let id = self.create_node();
        self.node_mut(id).mathml.insert(element);
        id
    }

    /// Joins juxtaposed operands with an invisible multiplication.
    pub(crate) fn make_implicit_node(&mut self, nodes: Vec<NodeId>) -> NodeId {
        if let [single] = nodes[..] {
            return single;
        }
        let symbols = self.symbols;
        let operator = self.create_node();
        self.update_content(operator, symbols.invisible_times());
        let node = self.make_infix_node(nodes, operator);
        self.set_role(node, SemanticRole::Implicit);
        node
    }

    pub(crate) fn make_infix_node(&mut self, children: Vec<NodeId>, operator: NodeId) -> NodeId {
        let text = self.text(operator).to_string();
        self.make_branch(SemanticType::InfixOp, children, vec![operator], Some(&text))
    }

    /// Wraps `inner` with the operators in `list`, whose texts become the node's text.
    pub(crate) fn make_concat_node(
        &mut self,
        inner: NodeId,
        list: Vec<NodeId>,
        node_type: SemanticType,
    ) -> NodeId {
        if list.is_empty() {
            return inner;
        }
        let text = list
            .iter()
            .map(|&op| self.text(op))
            .collect::<Vec<_>>()
            .join(" ");
        let multiple = list.len() > 1;
        let node = self.make_branch(node_type, vec![inner], list, Some(&text));
        if multiple {
            self.set_role(node, SemanticRole::MultiOp);
        }
        node
    }

    /// Applies prefix operators to `node`.
    ///
    /// Subtraction signs each produce their own node with role `Negative`; the runs of
    /// other operators between them are combined into one prefix node per run.
    pub(crate) fn make_prefix_node(&mut self, node: NodeId, prefixes: Vec<NodeId>) -> NodeId {
        let Partition {
            rel: mut negatives,
            comp: mut others,
        } = self.partition(&prefixes, |n| n.role == SemanticRole::Subtraction);
        let mut node = self.make_concat_node(
            node,
            others.pop().unwrap_or_default(),
            SemanticType::PrefixOp,
        );
        while let Some(negative) = negatives.pop() {
            node = self.make_concat_node(node, vec![negative], SemanticType::PrefixOp);
            self.set_role(node, SemanticRole::Negative);
            node = self.make_concat_node(
                node,
                others.pop().unwrap_or_default(),
                SemanticType::PrefixOp,
            );
        }
        node
    }

    pub(crate) fn make_postfix_node(&mut self, node: NodeId, postfixes: Vec<NodeId>) -> NodeId {
        self.make_concat_node(node, postfixes, SemanticType::PostfixOp)
    }

    pub(crate) fn partition(
        &self,
        nodes: &[NodeId],
        pred: impl Fn(&SemanticNode) -> bool,
    ) -> Partition {
        let mut rel = Vec::new();
        let mut comp = vec![Vec::new()];
        for &id in nodes {
            if pred(self.node(id)) {
                rel.push(id);
                comp.push(Vec::new());
            } else if let Some(run) = comp.last_mut() {
                run.push(id);
            }
        }
        Partition { rel, comp }
    }

    pub(crate) fn slice(&self, nodes: &[NodeId], pred: impl Fn(&SemanticNode) -> bool) -> Split {
        match nodes.iter().position(|&id| pred(self.node(id))) {
            Some(pos) => Split {
                head: nodes[..pos].to_vec(),
                div: Some(nodes[pos]),
                tail: nodes[pos + 1..].to_vec(),
            },
            None => Split {
                head: nodes.to_vec(),
                div: None,
                tail: Vec::new(),
            },
        }
    }
}
