use phf::phf_map;
use tracing::debug;

use semantic_attr::attribute::{SemanticRole, SemanticType};

use crate::builder::TreeBuilder;
use crate::mathml::ElementId;
use crate::node::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Math,
    Mrow,
    Mpadded,
    Mstyle,
    Semantics,
    Mfrac,
    Script(Script),
    Mroot,
    Msqrt,
    Mtable,
    Mtr,
    Mtd,
    Mtext,
    Mi,
    Mn,
    Mo,
    Maction,
    MathNone,
    /// Purged from rows, cells and square roots.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Script {
    Sub,
    Sup,
    SubSup,
    Under,
    Over,
    UnderOver,
}

impl Script {
    fn arity(self) -> usize {
        match self {
            Script::SubSup | Script::UnderOver => 3,
            Script::Sub | Script::Sup | Script::Under | Script::Over => 2,
        }
    }
}

static TAGS: phf::Map<&'static str, Tag> = phf_map! {
    "math" => Tag::Math,
    "mrow" => Tag::Mrow,
    "mpadded" => Tag::Mpadded,
    "mstyle" => Tag::Mstyle,
    "semantics" => Tag::Semantics,
    "mfrac" => Tag::Mfrac,
    "msub" => Tag::Script(Script::Sub),
    "msup" => Tag::Script(Script::Sup),
    "msubsup" => Tag::Script(Script::SubSup),
    "munder" => Tag::Script(Script::Under),
    "mover" => Tag::Script(Script::Over),
    "munderover" => Tag::Script(Script::UnderOver),
    "mroot" => Tag::Mroot,
    "msqrt" => Tag::Msqrt,
    "mtable" => Tag::Mtable,
    "mtr" => Tag::Mtr,
    "mtd" => Tag::Mtd,
    "mtext" => Tag::Mtext,
    "mi" => Tag::Mi,
    "mn" => Tag::Mn,
    "mo" => Tag::Mo,
    "maction" => Tag::Maction,
    "none" => Tag::MathNone,
    "merror" => Tag::Ignored,
    "mphantom" => Tag::Ignored,
    "mspace" => Tag::Ignored,
    "maligngroup" => Tag::Ignored,
    "malignmark" => Tag::Ignored,
    "mprescripts" => Tag::Ignored,
    "annotation" => Tag::Ignored,
    "annotation-xml" => Tag::Ignored,
};

impl TreeBuilder<'_> {
    /// Translates a MathML element into a semantic node. Never fails: elements without an
    /// interpretation become unprocessed nodes.
    pub(crate) fn parse_mathml(&mut self, element: ElementId) -> NodeId {
        let doc = self.doc;
        let source = doc.element(element);
        let children = source.children();
        let node = match TAGS.get(source.name()).copied() {
            Some(Tag::Math | Tag::Mrow | Tag::Mpadded | Tag::Mstyle) => {
                let children = self.purge_nodes(children);
                if let [single] = children[..] {
                    self.parse_mathml(single)
                } else {
                    let nodes = self.parse_mathml_children(&children);
                    self.process_row(nodes)
                }
            }
            Some(Tag::Semantics | Tag::Maction) => match self.purge_nodes(children).first() {
                Some(&first) => self.parse_mathml(first),
                None => self.make_unprocessed(element),
            },
            Some(Tag::Mfrac) => {
                let numerator = self.parse_required(children, 0);
                let denominator = self.parse_required(children, 1);
                let node = self.make_branch(
                    SemanticType::Fraction,
                    vec![numerator, denominator],
                    vec![],
                    None,
                );
                self.set_role(node, SemanticRole::Division);
                node
            }
            Some(Tag::Script(script)) => {
                let mut nodes: Vec<NodeId> = children
                    .iter()
                    .take(script.arity())
                    .map(|&child| self.parse_operand(child))
                    .collect();
                while nodes.len() < script.arity() {
                    nodes.push(self.make_empty());
                }
                self.make_limit_node(script, nodes)
            }
            Some(Tag::Mroot) => {
                let base = self.parse_required(children, 0);
                let index = self.parse_required(children, 1);
                self.make_branch(SemanticType::Root, vec![base, index], vec![], None)
            }
            Some(Tag::Msqrt) => {
                let children = self.purge_nodes(children);
                let nodes = self.parse_mathml_children(&children);
                let radicand = self.process_row(nodes);
                self.make_branch(SemanticType::Sqrt, vec![radicand], vec![], None)
            }
            Some(Tag::Mtable) => {
                let rows = children
                    .iter()
                    .map(|&row| self.parse_operand(row))
                    .collect();
                let node = self.make_branch(SemanticType::Table, rows, vec![], None);
                if self.table_is_multiline(node) {
                    self.table_to_multiline(node);
                }
                node
            }
            Some(Tag::Mtr) => {
                let cells = children
                    .iter()
                    .map(|&cell| self.parse_operand(cell))
                    .collect();
                let node = self.make_branch(SemanticType::Row, cells, vec![], None);
                self.set_role(node, SemanticRole::Table);
                node
            }
            Some(Tag::Mtd) => {
                let children = self.purge_nodes(children);
                let nodes = self.parse_mathml_children(&children);
                let content = self.process_row(nodes);
                let node = self.make_branch(SemanticType::Cell, vec![content], vec![], None);
                self.set_role(node, SemanticRole::Table);
                node
            }
            Some(Tag::Mtext) => {
                let node = self.make_leaf(element);
                self.set_type(node, SemanticType::Text);
                node
            }
            Some(Tag::Mi) => self.make_typed_leaf(element, SemanticType::Identifier),
            Some(Tag::Mn) => self.make_typed_leaf(element, SemanticType::Number),
            Some(Tag::Mo) => self.make_typed_leaf(element, SemanticType::Operator),
            Some(Tag::MathNone | Tag::Ignored) | None => {
                debug!(tag = source.name(), "element kept as unprocessed node");
                return self.make_unprocessed(element);
            }
        };
        self.node_mut(node).mathml.shift_insert(0, element);
        node
    }

    /// Translates an element whose node never takes part in a row. A fence there has no
    /// partner and becomes punctuation.
    pub(crate) fn parse_operand(&mut self, element: ElementId) -> NodeId {
        let node = self.parse_mathml(element);
        if self.node_type(node) == SemanticType::Fence {
            self.fence_to_punct(node);
        }
        node
    }

    fn parse_mathml_children(&mut self, children: &[ElementId]) -> Vec<NodeId> {
        children.iter().map(|&child| self.parse_mathml(child)).collect()
    }

    /// Translates the child at `index`, or yields an empty node if it is missing.
    fn parse_required(&mut self, children: &[ElementId], index: usize) -> NodeId {
        match children.get(index) {
            Some(&child) => self.parse_operand(child),
            None => self.make_empty(),
        }
    }

    /// Drops children that carry no meaning, and wrappers without children.
    fn purge_nodes(&self, children: &[ElementId]) -> Vec<ElementId> {
        children
            .iter()
            .copied()
            .filter(|&child| {
                let element = self.doc.element(child);
                match TAGS.get(element.name()) {
                    Some(Tag::Ignored) => false,
                    Some(
                        Tag::Math
                        | Tag::Mrow
                        | Tag::Mpadded
                        | Tag::Maction
                        | Tag::MathNone
                        | Tag::Mstyle
                        | Tag::Semantics,
                    ) => !element.children().is_empty(),
                    _ => true,
                }
            })
            .collect()
    }

    /// A leaf whose type falls back to `default` when the classifier does not know the text.
    fn make_typed_leaf(&mut self, element: ElementId, default: SemanticType) -> NodeId {
        let node = self.make_leaf(element);
        if self.node_type(node) == SemanticType::Unknown {
            self.set_type(node, default);
        }
        node
    }

    fn make_limit_node(&mut self, script: Script, nodes: Vec<NodeId>) -> NodeId {
        let [center, ..] = nodes[..] else {
            return self.make_empty();
        };
        let center_type = self.node_type(center);
        let role = self.role(center);
        let is_limit = matches!(
            center_type,
            SemanticType::LargeOp
                | SemanticType::LimBoth
                | SemanticType::LimLower
                | SemanticType::LimUpper
        ) || (center_type == SemanticType::Function && role == SemanticRole::LimFunc);

        let node = if is_limit {
            let node_type = match script {
                Script::Sub | Script::Under => SemanticType::LimLower,
                Script::Sup | Script::Over => SemanticType::LimUpper,
                Script::SubSup | Script::UnderOver => SemanticType::LimBoth,
            };
            self.make_branch(node_type, nodes, vec![], None)
        } else if let (Script::SubSup | Script::UnderOver, &[_, lower, upper]) =
            (script, &nodes[..])
        {
            let (inner_type, outer_type) = if script == Script::SubSup {
                (SemanticType::Subscript, SemanticType::Superscript)
            } else {
                (SemanticType::Underscore, SemanticType::Overscore)
            };
            let inner = self.make_branch(inner_type, vec![center, lower], vec![], None);
            self.set_role(inner, role);
            self.make_branch(outer_type, vec![inner, upper], vec![], None)
        } else {
            let node_type = match script {
                Script::Sub | Script::SubSup => SemanticType::Subscript,
                Script::Sup => SemanticType::Superscript,
                Script::Under | Script::UnderOver => SemanticType::Underscore,
                Script::Over => SemanticType::Overscore,
            };
            self.make_branch(node_type, nodes, vec![], None)
        };
        self.set_role(node, role);
        node
    }
}
