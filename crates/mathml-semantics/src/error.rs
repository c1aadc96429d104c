use std::fmt;
use std::ops::Range;

/// Represents an error that occurred while reading MathML source text.
///
/// The range is a byte range into the source.
#[derive(Debug, Clone)]
pub struct ParseError(pub Range<usize>, pub(crate) ParseErrKind);

#[derive(Debug, Clone)]
pub(crate) enum ParseErrKind {
    /// The XML reader rejected the input.
    Xml(Box<str>),
    UnmatchedClose(Box<str>),
    UnclosedElement(Box<str>),
    MultipleRoots(Box<str>),
    TextOutsideRoot,
    EmptyDocument,
    InvalidUtf8,
    UnknownEntity(Box<str>),
}

impl ParseErrKind {
    /// Returns the error message as a string.
    pub fn string(&self) -> String {
        match self {
            ParseErrKind::Xml(msg) => "Malformed XML: ".to_string() + msg,
            ParseErrKind::UnmatchedClose(name) => {
                "Unmatched closing tag: \"</".to_string() + name + ">\"."
            }
            ParseErrKind::UnclosedElement(name) => {
                "Element \"<".to_string() + name + ">\" is never closed."
            }
            ParseErrKind::MultipleRoots(name) => {
                "Expected a single root element, but found a second one: \"<".to_string()
                    + name
                    + ">\"."
            }
            ParseErrKind::TextOutsideRoot => "Text outside of the root element.".to_string(),
            ParseErrKind::EmptyDocument => "The input contains no element.".to_string(),
            ParseErrKind::InvalidUtf8 => "Invalid UTF-8 in the input.".to_string(),
            ParseErrKind::UnknownEntity(name) => "Unknown entity \"&".to_string() + name + ";\".",
        }
    }
}

impl ParseError {
    pub(crate) fn new(span: Range<usize>, kind: ParseErrKind) -> Box<Self> {
        Box::new(ParseError(span, kind))
    }

    pub fn error_message(&self) -> String {
        self.1.string()
    }
}

#[cfg(feature = "ariadne")]
impl ParseError {
    /// Convert this error into an [`ariadne::Report`] for pretty-printing.
    pub fn to_report<'name>(
        &self,
        source_name: &'name str,
        with_color: bool,
    ) -> ariadne::Report<'static, (&'name str, Range<usize>)> {
        use ariadne::{Label, Report, ReportKind};

        let label_msg = match &self.1 {
            ParseErrKind::Xml(_) => "here".into(),
            ParseErrKind::UnmatchedClose(_) => "no element to close".into(),
            ParseErrKind::UnclosedElement(name) => format!("\"<{name}>\" is still open here"),
            ParseErrKind::MultipleRoots(_) => "second root element".into(),
            ParseErrKind::TextOutsideRoot => "text outside of the root".into(),
            ParseErrKind::EmptyDocument => "expected an element".into(),
            ParseErrKind::InvalidUtf8 => "invalid UTF-8".into(),
            ParseErrKind::UnknownEntity(_) => "unknown entity".into(),
        };

        let mut config = ariadne::Config::default().with_index_type(ariadne::IndexType::Byte);
        if !with_color {
            config = config.with_color(false);
        }
        Report::build(ReportKind::Error, (source_name, self.0.start..self.0.start))
            .with_config(config)
            .with_message(self.1.string())
            .with_label(Label::new((source_name, self.0.clone())).with_message(label_msg))
            .finish()
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.0.start, self.1.string())
    }
}

impl std::error::Error for ParseError {}
