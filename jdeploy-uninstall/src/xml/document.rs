//! Minimal owned XML element tree.
//!
//! Manifests are small, so the generator builds a full tree and the
//! validator and parser walk it. Reading and writing go through quick-xml.
//!
//! Text is only kept for leaf elements. Whitespace between child elements is
//! dropped, which lets the writer indent freely without altering values.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;

use super::error::{XmlError, XmlResult};

/// A parsed or generated XML document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlDocument {
    pub root: Option<XmlElement>,
}

/// One element with its attributes, child elements and leaf text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
    /// Text content. `None` when the element had no text at all.
    pub text: Option<String>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Leaf element holding text.
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    /// Append a leaf only when the value is present.
    pub fn optional_child(self, name: &str, text: Option<&str>) -> Self {
        match text {
            Some(text) => self.child(XmlElement::with_text(name, text)),
            None => self,
        }
    }

    pub fn push(&mut self, child: XmlElement) {
        self.children.push(child);
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// First child element with the given name.
    pub fn find(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All child elements with the given name, in document order.
    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Text of a leaf element, empty when none.
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

impl XmlDocument {
    pub fn new(root: XmlElement) -> Self {
        Self { root: Some(root) }
    }

    /// Parse a document from a string.
    ///
    /// An input without any element yields a document with no root; the
    /// validator reports that case.
    pub fn parse(input: &str) -> XmlResult<Self> {
        let mut reader = Reader::from_str(input);
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            let position = reader.buffer_position() as u64;
            let event = reader.read_event().map_err(|e| XmlError::Malformed {
                position,
                message: e.to_string(),
            })?;

            match event {
                Event::Start(start) => {
                    stack.push(element_from_start(&start, position)?);
                }
                Event::Empty(start) => {
                    let element = element_from_start(&start, position)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let mut element = stack.pop().ok_or(XmlError::Malformed {
                        position,
                        message: "unexpected closing tag".to_string(),
                    })?;
                    if !element.children.is_empty() {
                        element.text = None;
                    }
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(|e| XmlError::Malformed {
                        position,
                        message: e.to_string(),
                    })?;
                    append_text(&mut stack, &text, position)?;
                }
                Event::CData(data) => {
                    let raw = data.into_inner();
                    let text = std::str::from_utf8(&raw).map_err(|e| XmlError::Malformed {
                        position,
                        message: e.to_string(),
                    })?;
                    append_text(&mut stack, text, position)?;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(XmlError::Malformed {
                position: input.len() as u64,
                message: format!("element '{}' is not closed", open.name),
            });
        }

        Ok(Self { root })
    }

    /// Serialize as UTF-8 with an XML declaration, indented by two spaces.
    pub fn to_xml_string(&self) -> XmlResult<String> {
        let root = self.root.as_ref().ok_or(XmlError::NoRoot)?;
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        write(
            &mut writer,
            Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
        )?;
        write_element(&mut writer, root)?;

        let mut bytes = writer.into_inner();
        bytes.push(b'\n');
        String::from_utf8(bytes).map_err(|e| XmlError::Write(e.to_string()))
    }
}

fn element_from_start(start: &BytesStart<'_>, position: u64) -> XmlResult<XmlElement> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut element = XmlElement::new(name);
    for attr in start.attributes() {
        let attr = attr.map_err(|e| XmlError::Malformed {
            position,
            message: e.to_string(),
        })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| XmlError::Malformed {
                position,
                message: e.to_string(),
            })?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> XmlResult<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(XmlError::MultipleRoots(element.name)),
    }
}

fn append_text(stack: &mut [XmlElement], text: &str, position: u64) -> XmlResult<()> {
    match stack.last_mut() {
        Some(current) => {
            current
                .text
                .get_or_insert_with(String::new)
                .push_str(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(XmlError::Malformed {
            position,
            message: "text outside of the root element".to_string(),
        }),
    }
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> XmlResult<()> {
    writer
        .write_event(event)
        .map_err(|e| XmlError::Write(e.to_string()))
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &XmlElement) -> XmlResult<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if !element.children.is_empty() {
        write(writer, Event::Start(start))?;
        for child in &element.children {
            write_element(writer, child)?;
        }
        write(writer, Event::End(BytesEnd::new(element.name.as_str())))
    } else if let Some(text) = &element.text {
        // Text event keeps the closing tag on the same line, so the value
        // round-trips byte for byte.
        write(writer, Event::Start(start))?;
        write(writer, Event::Text(BytesText::new(text)))?;
        write(writer, Event::End(BytesEnd::new(element.name.as_str())))
    } else {
        write(writer, Event::Empty(start))
    }
}
