use std::fmt;
use std::ops::Index;

use tracing::debug;

use semantic_attr::attribute::{SemanticRole, SemanticType};
use semantic_attr::symbol::{SymbolClassifier, SymbolTable};

use crate::builder::TreeBuilder;
use crate::error::ParseError;
use crate::markup::MarkupEmitter;
use crate::mathml::Document;
use crate::node::{NodeId, SemanticNode};
use crate::{PrettyPrint, SemanticsConfig};

/// The semantic interpretation of a MathML element tree.
///
/// The tree owns its source document and all nodes created while building it. Nodes that a
/// later processing stage discarded stay allocated but are not reachable from the root.
#[derive(Debug, Clone)]
pub struct SemanticTree {
    document: Document,
    nodes: Vec<SemanticNode>,
    root: NodeId,
}

impl SemanticTree {
    /// Builds the tree with the default [`SymbolTable`].
    pub fn new(document: Document) -> Self {
        Self::with_classifier(document, &SymbolTable)
    }

    pub fn with_classifier(document: Document, symbols: &dyn SymbolClassifier) -> Self {
        let mut builder = TreeBuilder::new(&document, symbols);
        let root = builder.parse_operand(document.root());
        let nodes = builder.into_nodes();
        debug!(nodes = nodes.len(), root = root.as_u32(), "built semantic tree");
        SemanticTree {
            document,
            nodes,
            root,
        }
    }

    /// Reads MathML source text and builds its tree.
    ///
    /// Only reading the source can fail; every element tree has an interpretation.
    pub fn parse(source: &str) -> Result<Self, Box<ParseError>> {
        Ok(Self::new(Document::parse(source)?))
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn root_node(&self) -> &SemanticNode {
        &self[self.root]
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&SemanticNode> {
        self.nodes.get(id.index())
    }

    #[inline]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The number of distinct nodes reachable from the root through child and content nodes.
    pub fn node_count(&self) -> usize {
        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![self.root];
        let mut count = 0;
        while let Some(id) = stack.pop() {
            let Some(flag) = seen.get_mut(id.index()) else {
                continue;
            };
            if *flag {
                continue;
            }
            *flag = true;
            count += 1;
            let node = &self[id];
            stack.extend(node.children.iter().chain(&node.content));
        }
        count
    }

    /// All nodes matching `pred`, in pre-order over child nodes starting with the root.
    pub fn query(&self, pred: impl Fn(&SemanticNode) -> bool) -> Vec<&SemanticNode> {
        let mut result = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.node(id) else {
                continue;
            };
            if pred(node) {
                result.push(node);
            }
            stack.extend(node.children.iter().rev());
        }
        result
    }

    pub fn find_by_type(&self, node_type: SemanticType) -> Vec<&SemanticNode> {
        self.query(|node| node.node_type == node_type)
    }

    pub fn find_by_role(&self, role: SemanticRole) -> Vec<&SemanticNode> {
        self.query(|node| node.role == role)
    }

    /// The markup view: the root node inside an `<stree>` element.
    pub fn to_markup(&self, config: &SemanticsConfig) -> String {
        let pretty_print = matches!(config.pretty_print, PrettyPrint::Always);
        let base_indent = if pretty_print { 1 } else { 0 };
        let mut emitter = MarkupEmitter::new(&self.nodes, config.brief);
        emitter.push_str("<stree>");
        // Writing to a `String` cannot fail.
        let _ = emitter.emit(self.root, base_indent);
        let mut output = emitter.into_inner();
        if pretty_print {
            output.push('\n');
        }
        output.push_str("</stree>");
        output
    }

    /// The markup view on a single line, optionally without attributes.
    pub fn xml(&self, brief: bool) -> String {
        self.to_markup(&SemanticsConfig {
            brief,
            ..Default::default()
        })
    }

    /// Checks the structural invariants of the finished tree.
    pub fn verify(&self) -> Result<(), TreeDefect> {
        let root = self.root_node();
        if root.parent.is_some() {
            return Err(TreeDefect::RootHasParent(self.root));
        }
        if root.node_type == SemanticType::Fence {
            return Err(TreeDefect::SurvivingFence(self.root));
        }
        let mut walk = Walk {
            on_path: vec![false; self.nodes.len()],
            owner: vec![None; self.nodes.len()],
        };
        self.verify_node(self.root, &mut walk)
    }

    fn verify_node(&self, id: NodeId, walk: &mut Walk) -> Result<(), TreeDefect> {
        let node = &self[id];
        if node.node_type == SemanticType::Empty && !node.children.is_empty() {
            return Err(TreeDefect::EmptyWithChildren(id));
        }
        walk.on_path[id.index()] = true;
        let members = node
            .children
            .iter()
            .map(|&child| (child, true))
            .chain(node.content.iter().map(|&content| (content, false)));
        for (member, is_child) in members {
            if walk.on_path[member.index()] {
                return Err(TreeDefect::Cycle(member));
            }
            let member_node = &self[member];
            if is_child && member_node.node_type == SemanticType::Fence {
                return Err(TreeDefect::SurvivingFence(member));
            }
            if member_node.parent != Some(id) {
                return Err(TreeDefect::ParentMismatch {
                    node: member,
                    owner: id,
                });
            }
            if !member_node.mathml.is_subset(&node.mathml) {
                return Err(TreeDefect::ProvenanceGap {
                    parent: id,
                    child: member,
                });
            }
            match walk.owner[member.index()] {
                // Punctuation marks are listed twice by the same node.
                Some(owner) if owner == id => continue,
                Some(_) => return Err(TreeDefect::SharedNode(member)),
                None => walk.owner[member.index()] = Some(id),
            }
            self.verify_node(member, walk)?;
        }
        walk.on_path[id.index()] = false;
        Ok(())
    }
}

impl Index<NodeId> for SemanticTree {
    type Output = SemanticNode;

    #[inline]
    fn index(&self, id: NodeId) -> &SemanticNode {
        &self.nodes[id.index()]
    }
}

struct Walk {
    on_path: Vec<bool>,
    owner: Vec<Option<NodeId>>,
}

/// A violated structural invariant, found by [`SemanticTree::verify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeDefect {
    /// A FENCE node is the root or still a child of some node.
    SurvivingFence(NodeId),
    /// The node is its own ancestor.
    Cycle(NodeId),
    /// The node is reachable from two different nodes.
    SharedNode(NodeId),
    /// The parent link of `node` does not point at the node that lists it.
    ParentMismatch { node: NodeId, owner: NodeId },
    RootHasParent(NodeId),
    /// `parent` is missing source elements of `child`.
    ProvenanceGap { parent: NodeId, child: NodeId },
    EmptyWithChildren(NodeId),
}

impl fmt::Display for TreeDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeDefect::SurvivingFence(id) => write!(f, "fence node {id} was never resolved"),
            TreeDefect::Cycle(id) => write!(f, "node {id} is its own ancestor"),
            TreeDefect::SharedNode(id) => write!(f, "node {id} has more than one parent"),
            TreeDefect::ParentMismatch { node, owner } => {
                write!(f, "node {node} is listed by {owner} but has a different parent")
            }
            TreeDefect::RootHasParent(id) => write!(f, "root node {id} has a parent"),
            TreeDefect::ProvenanceGap { parent, child } => {
                write!(f, "node {parent} lacks source elements of its child {child}")
            }
            TreeDefect::EmptyWithChildren(id) => write!(f, "empty node {id} has children"),
        }
    }
}

impl std::error::Error for TreeDefect {}
