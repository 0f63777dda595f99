//! Generic XML tree for .t3r result documents.
//!
//! The instrument writes deeply nested XML whose shape varies between
//! protocol versions (single records vs. lists, optional subtrees). Rather
//! than binding a rigid struct per document shape, files are parsed into a
//! plain element tree and the typed accessors in [`crate::t3r::parser`]
//! navigate it by path.

use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::t3r::error::T3rError;

/// One element of a parsed document: name, attributes, text, children.
#[derive(Debug, Clone, Default)]
pub struct XmlElement {
    name: String,
    attrs: Vec<(String, String)>,
    text: String,
    children: Vec<XmlElement>,
}

impl XmlElement {
    /// Element (tag) name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Text content, trimmed. Empty string when the element holds no text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Value of the named attribute, if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First child with the given name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All children with the given name, in document order. Handles the
    /// instrument's list-or-single ambiguity: a single record is just a
    /// one-element iteration.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Walk a path of child names, returning the first match at each level.
    pub fn descend(&self, path: &[&str]) -> Option<&XmlElement> {
        let mut current = self;
        for name in path {
            current = current.child(name)?;
        }
        Some(current)
    }

    /// Like [`descend`](Self::descend) but absence is a [`T3rError::MissingField`].
    pub fn require(&self, path: &[&str]) -> Result<&XmlElement, T3rError> {
        self.descend(path)
            .ok_or_else(|| T3rError::MissingField(path.join("/")))
    }

    /// Required text content at a path.
    pub fn require_text(&self, path: &[&str]) -> Result<&str, T3rError> {
        Ok(self.require(path)?.text())
    }

    /// Required float at a path.
    pub fn require_f64(&self, path: &[&str]) -> Result<f64, T3rError> {
        self.require(path)?.parse_f64(&path.join("/"))
    }

    /// Parse this element's text as a float, naming `element` on failure.
    pub fn parse_f64(&self, element: &str) -> Result<f64, T3rError> {
        self.text
            .parse::<f64>()
            .map_err(|_| T3rError::InvalidValue {
                element: element.to_string(),
                value: self.text.clone(),
            })
    }
}

/// Parse a whole document from a reader into an element tree.
///
/// Fails with [`T3rError::Xml`] on malformed markup and
/// [`T3rError::InvalidStructure`] when the document holds no root element.
pub fn parse_document<R: BufRead>(reader: R) -> Result<XmlElement, T3rError> {
    let mut xml = Reader::from_reader(reader);
    xml.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                stack.push(element_from_start(e)?);
            }
            Ok(Event::Empty(ref e)) => {
                let elem = element_from_start(e)?;
                attach(&mut stack, &mut root, elem)?;
            }
            Ok(Event::Text(ref t)) => {
                if let Some(top) = stack.last_mut() {
                    let unescaped = t.unescape()?;
                    if !top.text.is_empty() {
                        top.text.push(' ');
                    }
                    top.text.push_str(unescaped.trim());
                }
            }
            Ok(Event::CData(ref t)) => {
                if let Some(top) = stack.last_mut() {
                    let raw = String::from_utf8_lossy(t);
                    if !top.text.is_empty() {
                        top.text.push(' ');
                    }
                    top.text.push_str(raw.trim());
                }
            }
            Ok(Event::End(_)) => {
                let elem = stack.pop().ok_or_else(|| {
                    T3rError::InvalidStructure("unbalanced closing tag".to_string())
                })?;
                attach(&mut stack, &mut root, elem)?;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(T3rError::Xml(e)),
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(T3rError::InvalidStructure(
            "document ended with unclosed elements".to_string(),
        ));
    }
    root.ok_or_else(|| T3rError::InvalidStructure("document has no root element".to_string()))
}

fn element_from_start(e: &BytesStart) -> Result<XmlElement, T3rError> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| T3rError::Xml(quick_xml::Error::from(e)))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attrs.push((key, value));
    }
    Ok(XmlElement {
        name,
        attrs,
        text: String::new(),
        children: Vec::new(),
    })
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    elem: XmlElement,
) -> Result<(), T3rError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(elem);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(elem);
            Ok(())
        }
        None => Err(T3rError::InvalidStructure(
            "multiple root elements".to_string(),
        )),
    }
}
