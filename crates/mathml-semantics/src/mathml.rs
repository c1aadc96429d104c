//! The source side: a read-only tree of presentation MathML elements.
use std::ops::Range;
use std::str;

use quick_xml::escape::{resolve_html5_entity, resolve_predefined_entity, unescape_with};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use tracing::debug;

use crate::error::{ParseErrKind, ParseError};

/// Handle of an element inside its [`Document`].
///
/// Semantic nodes record these handles as their provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u32);

impl ElementId {
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

static_assertions::assert_eq_size!(ElementId, u32);

#[derive(Debug, Clone)]
pub struct Element {
    name: Box<str>,
    attributes: Vec<(Box<str>, Box<str>)>,
    children: Vec<ElementId>,
    text: String,
}

impl Element {
    fn new(name: &str) -> Self {
        Element {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            text: String::new(),
        }
    }

    /// The local name of the element, without any namespace prefix.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.as_ref() == name)
            .map(|(_, value)| value.as_ref())
    }

    /// The text directly inside this element.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A MathML element tree. The root element always exists.
#[derive(Debug, Clone)]
pub struct Document {
    elements: Vec<Element>,
}

impl Document {
    pub fn new(root_name: &str) -> Self {
        Document {
            elements: vec![Element::new(root_name)],
        }
    }

    /// Reads a MathML fragment, e.g. `<math><mi>x</mi></math>`.
    ///
    /// Namespace prefixes on element and attribute names are dropped. Comments, processing
    /// instructions and the XML declaration are skipped.
    pub fn parse(source: &str) -> Result<Self, Box<ParseError>> {
        let mut reader = Reader::from_str(source);
        let mut sink = TreeSink::default();
        loop {
            let start = reader.buffer_position() as usize;
            let event = match reader.read_event() {
                Ok(event) => event,
                Err(err) => {
                    let pos = reader.error_position() as usize;
                    return Err(ParseError::new(
                        pos..pos,
                        ParseErrKind::Xml(err.to_string().into()),
                    ));
                }
            };
            let span = start..reader.buffer_position() as usize;
            match event {
                Event::Start(e) => {
                    let id = sink.open(&e, span)?;
                    sink.stack.push(id);
                }
                Event::Empty(e) => {
                    sink.open(&e, span)?;
                }
                Event::End(e) => {
                    if sink.stack.pop().is_none() {
                        let name = utf8(e.local_name().into_inner(), &span)?;
                        return Err(ParseError::new(
                            span,
                            ParseErrKind::UnmatchedClose(name.into()),
                        ));
                    }
                }
                Event::Text(e) => {
                    let text = utf8(&e, &span)?;
                    sink.text(text, span)?;
                }
                Event::CData(e) => {
                    let text = utf8(&e, &span)?;
                    sink.text(text, span)?;
                }
                Event::GeneralRef(e) => {
                    let resolved = match e.resolve_char_ref() {
                        Ok(Some(ch)) => ch.to_string(),
                        Ok(None) => {
                            let name = utf8(&e, &span)?;
                            let Some(value) = resolve_entity(name) else {
                                return Err(ParseError::new(
                                    span,
                                    ParseErrKind::UnknownEntity(name.into()),
                                ));
                            };
                            value.to_string()
                        }
                        Err(err) => {
                            return Err(ParseError::new(
                                span,
                                ParseErrKind::Xml(err.to_string().into()),
                            ));
                        }
                    };
                    sink.text(&resolved, span)?;
                }
                Event::Eof => break,
                _ => {}
            }
        }
        let end = source.len();
        let Some(document) = sink.document else {
            return Err(ParseError::new(end..end, ParseErrKind::EmptyDocument));
        };
        if let Some(&open) = sink.stack.last() {
            let name = document.element(open).name();
            return Err(ParseError::new(
                end..end,
                ParseErrKind::UnclosedElement(name.into()),
            ));
        }
        debug!(elements = document.len(), "read MathML source");
        Ok(document)
    }

    #[inline]
    pub fn root(&self) -> ElementId {
        ElementId(0)
    }

    #[inline]
    pub fn element(&self, id: ElementId) -> &Element {
        &self.elements[id.index()]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Appends a new element as the last child of `parent`.
    pub fn add_element(&mut self, parent: ElementId, name: &str) -> ElementId {
        let id = ElementId(self.elements.len() as u32);
        self.elements.push(Element::new(name));
        self.elements[parent.index()].children.push(id);
        id
    }

    pub fn push_text(&mut self, id: ElementId, text: &str) {
        self.elements[id.index()].text.push_str(text);
    }

    pub fn set_attribute(&mut self, id: ElementId, name: &str, value: &str) {
        let attributes = &mut self.elements[id.index()].attributes;
        match attributes.iter_mut().find(|(key, _)| key.as_ref() == name) {
            Some((_, old)) => *old = value.into(),
            None => attributes.push((name.into(), value.into())),
        }
    }

    /// The text of the element followed by the text of all its descendants.
    pub fn text_content(&self, id: ElementId) -> String {
        let mut text = String::new();
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let element = self.element(id);
            text.push_str(element.text());
            stack.extend(element.children.iter().rev());
        }
        text
    }
}

#[derive(Default)]
struct TreeSink {
    document: Option<Document>,
    stack: Vec<ElementId>,
}

impl TreeSink {
    fn open(
        &mut self,
        e: &BytesStart<'_>,
        span: Range<usize>,
    ) -> Result<ElementId, Box<ParseError>> {
        let name = utf8(e.local_name().into_inner(), &span)?;
        let parent = self.stack.last().copied();
        if self.document.is_some() && parent.is_none() {
            return Err(ParseError::new(
                span,
                ParseErrKind::MultipleRoots(name.into()),
            ));
        }
        let document = self.document.get_or_insert_with(|| Document::new(name));
        let id = match parent {
            Some(parent) => document.add_element(parent, name),
            None => document.root(),
        };
        for attr in e.attributes() {
            let attr = attr.map_err(|err| {
                ParseError::new(span.clone(), ParseErrKind::Xml(err.to_string().into()))
            })?;
            let key = utf8(attr.key.local_name().into_inner(), &span)?;
            let raw = utf8(&attr.value, &span)?;
            let value = unescape_with(raw, resolve_entity).map_err(|err| {
                ParseError::new(span.clone(), ParseErrKind::Xml(err.to_string().into()))
            })?;
            document.set_attribute(id, key, &value);
        }
        Ok(id)
    }

    fn text(&mut self, text: &str, span: Range<usize>) -> Result<(), Box<ParseError>> {
        match (self.document.as_mut(), self.stack.last()) {
            (Some(document), Some(&id)) => document.push_text(id, text),
            _ if text.trim().is_empty() => {}
            _ => return Err(ParseError::new(span, ParseErrKind::TextOutsideRoot)),
        }
        Ok(())
    }
}

fn resolve_entity(name: &str) -> Option<&'static str> {
    resolve_predefined_entity(name).or_else(|| resolve_html5_entity(name))
}

#[inline]
fn utf8<'a>(bytes: &'a [u8], span: &Range<usize>) -> Result<&'a str, Box<ParseError>> {
    str::from_utf8(bytes).map_err(|_| ParseError::new(span.clone(), ParseErrKind::InvalidUtf8))
}
