#[cfg(feature = "serde")]
use serde::Serialize;
use strum_macros::{EnumString, IntoStaticStr};

/// The structural category of a semantic node.
///
/// The first group are leaf categories assigned by the symbol classifier, the rest are
/// produced when nodes are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[strum(serialize_all = "lowercase")]
pub enum SemanticType {
    // Leafs.
    Punctuation,
    Fence,
    Number,
    Identifier,
    Text,
    Operator,
    Relation,
    LargeOp,
    Function,
    Accent,
    // Branches.
    Fenced,
    Fraction,
    Punctuated,
    RelSeq,
    MultiRel,
    InfixOp,
    PrefixOp,
    PostfixOp,
    Appl,
    Integral,
    BigOp,
    Sqrt,
    Root,
    LimUpper,
    LimLower,
    LimBoth,
    Subscript,
    Superscript,
    Underscore,
    Overscore,
    // Tables.
    Table,
    MultiLine,
    Matrix,
    Vector,
    Cases,
    Row,
    Line,
    Cell,
    // General.
    #[default]
    Unknown,
    Empty,
}

impl SemanticType {
    #[inline]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// The finer-grained function of a node within its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[strum(serialize_all = "lowercase")]
pub enum SemanticRole {
    // Punctuation.
    Comma,
    Colon,
    Ellipsis,
    FullStop,
    Dash,
    Prime,
    VBar,
    OpenFence,
    CloseFence,
    Application,
    // Fences.
    Open,
    Close,
    Top,
    Bottom,
    Neutral,
    // Letters and numbers.
    LatinLetter,
    GreekLetter,
    OtherLetter,
    Integer,
    Float,
    OtherNumber,
    // Compound nodes.
    Sequence,
    EndPunct,
    StartPunct,
    Negative,
    MultiOp,
    LimFunc,
    PrefixFunc,
    Sum,
    Integral,
    // Operators.
    Addition,
    Multiplication,
    Division,
    Subtraction,
    Implicit,
    // Fenced.
    LeftRight,
    // Relations.
    Equality,
    Inequality,
    Element,
    Arrow,
    // Tables.
    MultiLine,
    Matrix,
    Vector,
    Cases,
    Table,
    #[default]
    Unknown,
}

impl SemanticRole {
    #[inline]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// The font variant of a leaf.
///
/// Parsing accepts the values of the MathML `mathvariant` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, IntoStaticStr, EnumString)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[strum(serialize_all = "kebab-case")]
pub enum SemanticFont {
    Bold,
    BoldFraktur,
    BoldItalic,
    BoldScript,
    DoubleStruck,
    #[strum(to_string = "fullwidth")]
    #[cfg_attr(feature = "serde", serde(rename = "fullwidth"))]
    FullWidth,
    Fraktur,
    Italic,
    Monospace,
    Normal,
    Script,
    SansSerif,
    SansSerifItalic,
    #[strum(to_string = "sans-serif-bold", serialize = "bold-sans-serif")]
    SansSerifBold,
    SansSerifBoldItalic,
    #[default]
    Unknown,
}

impl SemanticFont {
    #[inline]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// The default meaning of a token text: the triple the classifier hands out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Meaning {
    pub node_type: SemanticType,
    pub role: SemanticRole,
    pub font: SemanticFont,
}

impl Meaning {
    #[inline]
    pub const fn new(node_type: SemanticType, role: SemanticRole, font: SemanticFont) -> Self {
        Meaning {
            node_type,
            role,
            font,
        }
    }
}

static_assertions::assert_eq_size!(Meaning, [u8; 3]);
