//! Minimal element tree built from a quick-xml event stream.
//!
//! Only elements, attributes and character data are kept; declarations,
//! comments and processing instructions are dropped.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
    /// Concatenated character data directly inside this element.
    pub text: String,
}

impl XmlElement {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First direct child called `name`.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |child| child.name == name)
    }
}

/// Parses a complete document and returns its root element.
pub(crate) fn parse_document(text: &str) -> Result<XmlElement, String> {
    let mut reader = Reader::from_str(text);
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(err) => {
                return Err(format!(
                    "malformed document at byte {}: {err}",
                    reader.buffer_position()
                ))
            }
        };
        match event {
            Event::Start(start) => stack.push(element_from_start(&start)?),
            Event::Empty(start) => {
                let element = element_from_start(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| "unbalanced closing tag".to_string())?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                let value = text
                    .unescape()
                    .map_err(|err| format!("invalid character data: {err}"))?;
                push_text(&mut stack, &value)?;
            }
            Event::CData(data) => {
                let value = std::str::from_utf8(&data)
                    .map_err(|err| format!("invalid CDATA section: {err}"))?
                    .to_string();
                push_text(&mut stack, &value)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(format!("element `{}` is never closed", open.name));
    }
    root.ok_or_else(|| "document has no root element".to_string())
}

fn element_from_start(start: &BytesStart<'_>) -> Result<XmlElement, String> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(|err| format!("invalid element name: {err}"))?
        .to_string();
    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute =
            attribute.map_err(|err| format!("invalid attribute on `{name}`: {err}"))?;
        let key = std::str::from_utf8(attribute.key.as_ref())
            .map_err(|err| format!("invalid attribute name on `{name}`: {err}"))?
            .to_string();
        let value = attribute
            .unescape_value()
            .map_err(|err| format!("invalid attribute value on `{name}`: {err}"))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(XmlElement {
        name,
        attributes,
        children: Vec::new(),
        text: String::new(),
    })
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<(), String> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(format!(
            "second root element `{}` after document end",
            element.name
        ));
    }
    *root = Some(element);
    Ok(())
}

fn push_text(stack: &mut [XmlElement], value: &str) -> Result<(), String> {
    match stack.last_mut() {
        Some(current) => {
            current.text.push_str(value);
            Ok(())
        }
        None if value.trim().is_empty() => Ok(()),
        None => Err("character data outside of the root element".to_string()),
    }
}
