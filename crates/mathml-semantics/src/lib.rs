//! Build a semantic tree from presentation MathML.
//!
//! The semantic tree describes what a formula means rather than how it is laid out: which
//! tokens are operators and how they bind, which fences belong together, which tables are
//! matrices, where functions are applied and what they are applied to. Every node records the
//! MathML elements it was derived from.
//!
//! # Usage
//!
//! The main struct of this library is [`SemanticTree`]. It can be built from MathML source text
//! with [`SemanticTree::parse`], or from an already parsed [`Document`] with
//! [`SemanticTree::new`]. Building the tree never fails; only reading the source can.
//!
//! ```rust
//! use mathml_semantics::{SemanticRole, SemanticTree, SemanticType};
//!
//! let mathml = "<math><mi>a</mi><mo>+</mo><mi>b</mi><mo>=</mo><mi>c</mi></math>";
//! let tree = SemanticTree::parse(mathml).unwrap();
//! let root = tree.root_node();
//! assert_eq!(root.node_type(), SemanticType::RelSeq);
//! assert_eq!(root.role(), SemanticRole::Equality);
//! assert!(tree.verify().is_ok());
//! println!("{}", tree.xml(true));
//! ```
//!
//! # Features
//!
//! - `serde`: With this feature, `SemanticsConfig` implements serde's `Deserialize`.
//! - `ariadne`: With this feature, [`ParseError`] can be turned into an `ariadne` report.
//!
mod builder;
mod error;
mod markup;
pub mod mathml;
mod node;
mod row;
mod translate;
mod tree;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use semantic_attr::attribute::{Meaning, SemanticFont, SemanticRole, SemanticType};
pub use semantic_attr::symbol::{SymbolClassifier, SymbolTable};

pub use self::error::ParseError;
pub use self::mathml::{Document, Element, ElementId};
pub use self::node::{NodeId, Provenance, SemanticNode};
pub use self::tree::{SemanticTree, TreeDefect};

/// Configuration for pretty-printing the markup view.
///
/// Pretty-printing means that newlines and indentation is added to the output, to make it
/// easier to read.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[non_exhaustive]
pub enum PrettyPrint {
    /// Never pretty print.
    #[default]
    Never,
    /// Always pretty print.
    Always,
}

/// Configuration object for the markup view of a [`SemanticTree`].
///
/// # Example usage
///
/// ```rust
/// use mathml_semantics::{PrettyPrint, SemanticsConfig};
///
/// // Default values
/// let config = SemanticsConfig::default();
///
/// // Indented output without role, font and id attributes
/// let config = SemanticsConfig {
///     pretty_print: PrettyPrint::Always,
///     brief: true,
/// };
/// ```
///
#[derive(Debug, Default, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "kebab-case"))]
pub struct SemanticsConfig {
    /// A configuration for pretty-printing the output. See [`PrettyPrint`] for details.
    pub pretty_print: PrettyPrint,
    /// If `true`, leave out the `role`, `font` and `id` attributes.
    pub brief: bool,
}
