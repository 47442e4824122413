//! A minimal mutable element tree over `quick-xml` events.
//!
//! MSBuild files are rewritten structurally (remove some items, add others)
//! while everything else, including comments, the declaration and the exact
//! escaping of attribute values, is written back as it was read. Attribute
//! values and text are therefore stored in their escaped form.

use std::borrow::Cow;

use quick_xml::escape::{escape, unescape};
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::QName;
use quick_xml::{Reader, Writer};

const BOM: char = '\u{feff}';
const INDENT: &str = "  ";

/// Failure to parse or serialize a document.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct XmlError(String);

impl From<quick_xml::Error> for XmlError {
    fn from(e: quick_xml::Error) -> Self {
        XmlError(e.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for XmlError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        XmlError(e.to_string())
    }
}

/// A child of an element.
#[derive(Debug, Clone)]
pub enum Node {
    /// A nested element.
    Element(Element),
    /// Character data, escaped.
    Text(String),
    /// Anything else (comments, CDATA, processing instructions), kept verbatim.
    Other(Event<'static>),
}

/// An element with its attributes and children.
#[derive(Debug, Clone)]
pub struct Element {
    /// Qualified name as written.
    pub name: String,
    /// Attributes in document order; values are escaped.
    pub attrs: Vec<(String, String)>,
    /// Child nodes in document order.
    pub children: Vec<Node>,
}

impl Element {
    /// Creates an element with no attributes or children.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Adds an attribute with an unescaped value.
    pub fn with_attr(mut self, key: &str, value: &str) -> Self {
        self.attrs.push((key.to_string(), escape(value).into_owned()));
        self
    }

    /// Replaces the children with a single text node.
    pub fn with_text(mut self, text: &str) -> Self {
        self.set_text(text);
        self
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self, XmlError> {
        let mut element = Element::new(&String::from_utf8_lossy(start.name().as_ref()));
        for attr in start.attributes() {
            let attr = attr?;
            element.attrs.push((
                String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                String::from_utf8_lossy(&attr.value).into_owned(),
            ));
        }
        Ok(element)
    }

    /// Name without namespace prefix.
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    /// Unescaped value of attribute `key`.
    pub fn attr(&self, key: &str) -> Option<Cow<'_, str>> {
        let raw = self.attrs.iter().find(|(k, _)| k == key)?.1.as_str();
        Some(unescape(raw).unwrap_or(Cow::Borrowed(raw)))
    }

    /// Concatenated, unescaped text content of direct text children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|n| match n {
                Node::Text(raw) => Some(unescape(raw).map_or_else(|_| raw.clone(), Cow::into_owned)),
                _ => None,
            })
            .collect()
    }

    /// Replaces the children with a single text node.
    pub fn set_text(&mut self, text: &str) {
        self.children = vec![Node::Text(escape(text).into_owned())];
    }

    /// Child elements.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Child elements, mutably.
    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// First child element with local name `name`.
    pub fn find_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.elements_mut().find(|e| e.local_name() == name)
    }

    /// Returns `true` if any child is an element.
    pub fn has_element_children(&self) -> bool {
        self.elements().next().is_some()
    }

    /// Appends `child` on its own line, indented for nesting level `depth`.
    pub fn append(&mut self, child: Element, depth: usize) {
        let trailing_ws = matches!(
            self.children.last(),
            Some(Node::Text(t)) if t.trim().is_empty()
        );
        let at = if trailing_ws {
            self.children.len() - 1
        } else {
            self.children.len()
        };
        self.children
            .insert(at, Node::Text(format!("\n{}", INDENT.repeat(depth))));
        self.children.insert(at + 1, Node::Element(child));
        if !trailing_ws {
            self.children
                .push(Node::Text(format!("\n{}", INDENT.repeat(depth.saturating_sub(1)))));
        }
    }

    /// Removes every child element matching `pred`, together with the
    /// whitespace that precedes it. Returns how many were removed.
    pub fn remove_elements(&mut self, mut pred: impl FnMut(&Element) -> bool) -> usize {
        let mut kept: Vec<Node> = Vec::with_capacity(self.children.len());
        let mut removed = 0;
        for node in std::mem::take(&mut self.children) {
            if let Node::Element(e) = &node {
                if pred(e) {
                    if matches!(kept.last(), Some(Node::Text(t)) if t.trim().is_empty()) {
                        kept.pop();
                    }
                    removed += 1;
                    continue;
                }
            }
            kept.push(node);
        }
        self.children = kept;
        removed
    }

    fn write(&self, writer: &mut Writer<Vec<u8>>) -> Result<(), XmlError> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attrs {
            start.push_attribute(Attribute {
                key: QName(key.as_bytes()),
                value: Cow::Borrowed(value.as_bytes()),
            });
        }
        if self.children.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }
        writer.write_event(Event::Start(start))?;
        for child in &self.children {
            write_node(child, writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))?;
        Ok(())
    }
}

fn write_node(node: &Node, writer: &mut Writer<Vec<u8>>) -> Result<(), XmlError> {
    match node {
        Node::Element(e) => e.write(writer),
        Node::Text(raw) => {
            writer.write_event(Event::Text(BytesText::from_escaped(raw.as_str())))?;
            Ok(())
        }
        Node::Other(event) => {
            writer.write_event(event.clone())?;
            Ok(())
        }
    }
}

/// A parsed document: prolog, one root element, epilog.
#[derive(Debug, Clone)]
pub struct Document {
    /// Whether the source began with a byte-order mark.
    pub bom: bool,
    /// Nodes before the root (declaration, comments, whitespace).
    pub prolog: Vec<Node>,
    /// The root element.
    pub root: Element,
    /// Nodes after the root.
    pub epilog: Vec<Node>,
}

impl Document {
    /// Parses `text`.
    pub fn parse(text: &str) -> Result<Self, XmlError> {
        let (bom, text) = match text.strip_prefix(BOM) {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let mut reader = Reader::from_str(text);
        reader.trim_text(false);

        let mut prolog = Vec::new();
        let mut epilog = Vec::new();
        let mut root: Option<Element> = None;
        let mut stack: Vec<Element> = Vec::new();

        loop {
            let node = match reader.read_event()? {
                Event::Start(start) => {
                    stack.push(Element::from_start(&start)?);
                    continue;
                }
                Event::End(_) => match stack.pop() {
                    Some(element) => Node::Element(element),
                    None => return Err(XmlError("unbalanced closing tag".to_string())),
                },
                Event::Empty(start) => Node::Element(Element::from_start(&start)?),
                Event::Text(text) => Node::Text(String::from_utf8_lossy(&text).into_owned()),
                Event::Eof => break,
                other => Node::Other(other.into_owned()),
            };
            if let Some(parent) = stack.last_mut() {
                parent.children.push(node);
            } else if root.is_none() {
                match node {
                    Node::Element(element) => root = Some(element),
                    other => prolog.push(other),
                }
            } else {
                epilog.push(node);
            }
        }

        if !stack.is_empty() {
            return Err(XmlError("unclosed element at end of document".to_string()));
        }
        let root = root.ok_or_else(|| XmlError("document has no root element".to_string()))?;
        Ok(Self {
            bom,
            prolog,
            root,
            epilog,
        })
    }

    /// Serializes the document.
    pub fn to_xml(&self) -> Result<String, XmlError> {
        let mut writer = Writer::new(Vec::new());
        for node in &self.prolog {
            write_node(node, &mut writer)?;
        }
        self.root.write(&mut writer)?;
        for node in &self.epilog {
            write_node(node, &mut writer)?;
        }
        let body = String::from_utf8(writer.into_inner())
            .map_err(|e| XmlError(format!("serialized XML is not UTF-8: {e}")))?;
        Ok(if self.bom {
            format!("{BOM}{body}")
        } else {
            body
        })
    }
}
