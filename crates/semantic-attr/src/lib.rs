//! Internal library for the `mathml-semantics` crate.
//!
//! This library defines the closed sets of semantic types, roles and fonts, and the
//! [`SymbolClassifier`](symbol::SymbolClassifier) that assigns a default meaning to the text
//! of a token.
//!
//! # Example
//!
//! ```rust
//! use mathml_semantics_attr_internal::attribute::{SemanticRole, SemanticType};
//! use mathml_semantics_attr_internal::symbol::{SymbolClassifier, SymbolTable};
//!
//! let meaning = SymbolTable.classify("+");
//! assert_eq!(meaning.node_type, SemanticType::Operator);
//! assert_eq!(meaning.role, SemanticRole::Addition);
//! assert_eq!(meaning.role.as_str(), "addition");
//! ```
pub mod attribute;
pub mod symbol;
