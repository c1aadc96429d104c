use std::fmt;

use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;

use semantic_attr::attribute::{SemanticFont, SemanticRole, SemanticType};

use crate::mathml::ElementId;

/// The identifier of a semantic node.
///
/// Ids are handed out in creation order, starting at 0, and are unique within one tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub(crate) const fn new(index: usize) -> Self {
        NodeId(index as u32)
    }

    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

static_assertions::assert_eq_size!(NodeId, u32);
static_assertions::assert_eq_size!(Option<NodeId>, u64);

/// The source elements a node was derived from, in insertion order and without duplicates.
pub type Provenance = IndexSet<ElementId, FxBuildHasher>;

/// A node of the semantic tree.
#[derive(Debug, Clone)]
pub struct SemanticNode {
    pub(crate) id: NodeId,
    pub(crate) node_type: SemanticType,
    pub(crate) role: SemanticRole,
    pub(crate) font: SemanticFont,
    pub(crate) text: String,
    pub(crate) children: Vec<NodeId>,
    pub(crate) content: Vec<NodeId>,
    pub(crate) mathml: Provenance,
    pub(crate) parent: Option<NodeId>,
}

impl SemanticNode {
    pub(crate) fn new(id: NodeId) -> Self {
        SemanticNode {
            id,
            node_type: SemanticType::Unknown,
            role: SemanticRole::Unknown,
            font: SemanticFont::Unknown,
            text: String::new(),
            children: Vec::new(),
            content: Vec::new(),
            mathml: Provenance::default(),
            parent: None,
        }
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn node_type(&self) -> SemanticType {
        self.node_type
    }

    #[inline]
    pub fn role(&self) -> SemanticRole {
        self.role
    }

    #[inline]
    pub fn font(&self) -> SemanticFont {
        self.font
    }

    /// The display text: the token text for leaves, the operator or relation text for
    /// operator-like branches, empty otherwise.
    #[inline]
    pub fn text_content(&self) -> &str {
        &self.text
    }

    /// The structural children (operands, arguments, rows, cells, ...).
    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// The syntactic markers of this node: operators, relations, fences, punctuation.
    #[inline]
    pub fn content_nodes(&self) -> &[NodeId] {
        &self.content
    }

    #[inline]
    pub fn mathml(&self) -> &Provenance {
        &self.mathml
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty() && self.content.is_empty()
    }
}
