//! XML response decoding.
//!
//! Plex.tv answers some endpoints with XML only. Documents are decoded into
//! a small tree whose JSON form is stable:
//!
//! - the document is an object with a single key, the root element name;
//! - an element is an object mapping each child tag to an array of children,
//!   repeated siblings accumulating in document order;
//! - attributes live under the reserved `$` key as a flat string map;
//! - an element holding only text collapses to that string, an element
//!   holding nothing (or only whitespace) collapses to `""`;
//! - non-whitespace text next to attributes or children is kept under `_`.
//!
//! `<container size="20"><name>Plex</name></container>` therefore becomes
//! `{"container": {"$": {"size": "20"}, "name": ["Plex"]}}`.

use crate::error::{AccountError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Reserved key holding attributes in the JSON form.
pub const ATTRIBUTES_KEY: &str = "$";
/// Reserved key holding mixed-content text in the JSON form.
pub const TEXT_KEY: &str = "_";

/// A decoded element with attributes or children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    attributes: BTreeMap<String, String>,
    // Tags in order of first appearance.
    children: Vec<(String, Vec<XmlNode>)>,
    text: String,
}

/// A decoded element, after collapsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Text(String),
    Element(XmlElement),
}

/// A decoded XML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    name: String,
    root: XmlNode,
}

impl XmlElement {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// All children with the given tag, in document order.
    pub fn children(&self, tag: &str) -> &[XmlNode] {
        self.children
            .iter()
            .find(|(name, _)| name == tag)
            .map(|(_, nodes)| nodes.as_slice())
            .unwrap_or(&[])
    }

    /// Children with the given tag that kept element form.
    pub fn child_elements<'a>(&'a self, tag: &str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children(tag).iter().filter_map(XmlNode::as_element)
    }

    /// Mixed-content text, if any.
    pub fn text(&self) -> Option<&str> {
        if self.text.is_empty() {
            None
        } else {
            Some(&self.text)
        }
    }

    pub fn to_json(&self) -> Value {
        let mut object = Map::new();

        if !self.attributes.is_empty() {
            let attributes = self
                .attributes
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect();
            object.insert(ATTRIBUTES_KEY.to_string(), Value::Object(attributes));
        }

        if !self.text.is_empty() {
            object.insert(TEXT_KEY.to_string(), Value::String(self.text.clone()));
        }

        for (tag, nodes) in &self.children {
            object.insert(
                tag.clone(),
                Value::Array(nodes.iter().map(XmlNode::to_json).collect()),
            );
        }

        Value::Object(object)
    }

    fn push_child(&mut self, tag: String, node: XmlNode) {
        match self.children.iter_mut().find(|(name, _)| *name == tag) {
            Some((_, nodes)) => nodes.push(node),
            None => self.children.push((tag, vec![node])),
        }
    }

    fn into_node(mut self) -> XmlNode {
        if self.attributes.is_empty() && self.children.is_empty() {
            if self.text.trim().is_empty() {
                self.text.clear();
            }
            return XmlNode::Text(self.text);
        }

        let trimmed = self.text.trim();
        self.text = if trimmed.is_empty() {
            String::new()
        } else {
            trimmed.to_string()
        };

        XmlNode::Element(self)
    }
}

impl XmlNode {
    pub fn as_element(&self) -> Option<&XmlElement> {
        match self {
            Self::Element(element) => Some(element),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Element(_) => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(text) => Value::String(text.clone()),
            Self::Element(element) => element.to_json(),
        }
    }
}

impl XmlDocument {
    /// Name of the root element.
    pub fn root_name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &XmlNode {
        &self.root
    }

    /// The root element, unless it collapsed to text.
    pub fn root_element(&self) -> Option<&XmlElement> {
        self.root.as_element()
    }

    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        object.insert(self.name.clone(), self.root.to_json());
        Value::Object(object)
    }
}

/// Decode an XML document.
pub fn parse(input: &str) -> Result<XmlDocument> {
    let mut reader = Reader::from_str(input);
    let mut stack: Vec<(String, XmlElement)> = Vec::new();
    let mut document: Option<XmlDocument> = None;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                return Err(AccountError::Xml(format!(
                    "error at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
        };

        match event {
            Event::Start(start) => {
                ensure_single_root(document.as_ref())?;
                stack.push(open_element(&start)?);
            }
            Event::Empty(start) => {
                ensure_single_root(document.as_ref())?;
                let (name, element) = open_element(&start)?;
                close_element(&mut stack, &mut document, name, element);
            }
            Event::End(_) => {
                let (name, element) = stack
                    .pop()
                    .ok_or_else(|| AccountError::Xml("unexpected closing tag".to_string()))?;
                close_element(&mut stack, &mut document, name, element);
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| AccountError::Xml(e.to_string()))?;
                append_text(&mut stack, &text)?;
            }
            Event::CData(data) => {
                let data = data.into_inner();
                append_text(&mut stack, &String::from_utf8_lossy(&data))?;
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions and doctypes
            _ => {}
        }
    }

    if let Some((name, _)) = stack.last() {
        return Err(AccountError::Xml(format!("unclosed element <{}>", name)));
    }

    document.ok_or_else(|| AccountError::Xml("document has no root element".to_string()))
}

fn ensure_single_root(document: Option<&XmlDocument>) -> Result<()> {
    if document.is_some() {
        return Err(AccountError::Xml(
            "document has more than one root element".to_string(),
        ));
    }
    Ok(())
}

fn open_element(start: &BytesStart<'_>) -> Result<(String, XmlElement)> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut element = XmlElement::default();

    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| AccountError::Xml(e.to_string()))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|e| AccountError::Xml(e.to_string()))?;
        element.attributes.insert(key, value.into_owned());
    }

    Ok((name, element))
}

fn close_element(
    stack: &mut [(String, XmlElement)],
    document: &mut Option<XmlDocument>,
    name: String,
    element: XmlElement,
) {
    let node = element.into_node();
    match stack.last_mut() {
        Some((_, parent)) => parent.push_child(name, node),
        None => *document = Some(XmlDocument { name, root: node }),
    }
}

fn append_text(stack: &mut [(String, XmlElement)], text: &str) -> Result<()> {
    match stack.last_mut() {
        Some((_, element)) => {
            element.text.push_str(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(AccountError::Xml(
            "text outside of the root element".to_string(),
        )),
    }
}
