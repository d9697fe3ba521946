//! Owned XML tree for package parts
//!
//! Element and attribute names are kept as written (`w:p`, `r:id`, `xmlns:w`),
//! so namespace declarations and prefixes survive a parse/serialize cycle.

use crate::error::{Result, TailorError};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
    CData(String),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    pub has_declaration: bool,
    pub root: XmlElement,
}

impl XmlNode {
    pub fn as_element(&self) -> Option<&XmlElement> {
        match self {
            XmlNode::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut XmlElement> {
        match self {
            XmlNode::Element(element) => Some(element),
            _ => None,
        }
    }
}

impl From<XmlElement> for XmlNode {
    fn from(element: XmlElement) -> Self {
        XmlNode::Element(element)
    }
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(key, value);
        self
    }

    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    /// Child elements in document order
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(XmlNode::as_element)
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.children.iter_mut().filter_map(XmlNode::as_element_mut)
    }

    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.is(name))
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut XmlElement> {
        self.elements_mut().find(|e| e.is(name))
    }

    /// All descendant elements with the given name, depth first
    pub fn descendants<'a>(&'a self, name: &'a str) -> Vec<&'a XmlElement> {
        let mut found = Vec::new();
        for element in self.elements() {
            if element.is(name) {
                found.push(element);
            }
            found.extend(element.descendants(name));
        }
        found
    }

    /// Concatenated text of direct text and CDATA children
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                XmlNode::Text(text) | XmlNode::CData(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl XmlDocument {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let content = std::str::from_utf8(bytes)
            .map_err(|e| TailorError::InvalidDocument(format!("Part is not UTF-8: {}", e)))?;
        Self::parse_str(content.trim_start_matches('\u{feff}'))
    }

    pub fn parse_str(content: &str) -> Result<Self> {
        let mut reader = Reader::from_str(content);
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;
        let mut has_declaration = false;

        loop {
            match reader.read_event().map_err(TailorError::xml)? {
                Event::Decl(_) => has_declaration = true,
                Event::Start(start) => stack.push(element_from_start(&start)?),
                Event::Empty(start) => {
                    let element = element_from_start(&start)?;
                    attach(&mut stack, &mut root, XmlNode::Element(element))?;
                }
                Event::End(_) => {
                    let element = stack.pop().ok_or_else(|| {
                        TailorError::Xml("Unbalanced closing tag".to_string())
                    })?;
                    attach(&mut stack, &mut root, XmlNode::Element(element))?;
                }
                Event::Text(text) => {
                    if !stack.is_empty() {
                        let text = text.unescape().map_err(TailorError::xml)?.into_owned();
                        attach(&mut stack, &mut root, XmlNode::Text(text))?;
                    }
                }
                Event::CData(data) => {
                    let text = String::from_utf8_lossy(&data).into_owned();
                    attach(&mut stack, &mut root, XmlNode::CData(text))?;
                }
                Event::Comment(comment) => {
                    if !stack.is_empty() {
                        let text = String::from_utf8_lossy(&comment).into_owned();
                        attach(&mut stack, &mut root, XmlNode::Comment(text))?;
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(TailorError::Xml(format!(
                "Unclosed element <{}>",
                stack[stack.len() - 1].name
            )));
        }

        let root = root.ok_or_else(|| TailorError::Xml("Document has no root element".to_string()))?;
        Ok(Self {
            has_declaration,
            root,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        if self.has_declaration {
            writer
                .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
                .map_err(TailorError::xml)?;
            writer
                .write_event(Event::Text(BytesText::from_escaped("\r\n")))
                .map_err(TailorError::xml)?;
        }
        write_element(&mut writer, &self.root)?;
        Ok(writer.into_inner())
    }
}

fn element_from_start(start: &BytesStart) -> Result<XmlElement> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(TailorError::xml)?
        .to_string();
    let mut element = XmlElement::new(name);
    for attribute in start.attributes() {
        let attribute = attribute.map_err(TailorError::xml)?;
        let key = std::str::from_utf8(attribute.key.as_ref())
            .map_err(TailorError::xml)?
            .to_string();
        let value = attribute.unescape_value().map_err(TailorError::xml)?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, node: XmlNode) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => match node {
            XmlNode::Element(element) if root.is_none() => *root = Some(element),
            XmlNode::Element(_) => {
                return Err(TailorError::Xml("Multiple root elements".to_string()));
            }
            _ => {}
        },
    }
    Ok(())
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &XmlElement) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        writer.write_event(Event::Empty(start)).map_err(TailorError::xml)?;
        return Ok(());
    }

    writer.write_event(Event::Start(start)).map_err(TailorError::xml)?;
    for child in &element.children {
        match child {
            XmlNode::Element(child) => write_element(writer, child)?,
            XmlNode::Text(text) => writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(TailorError::xml)?,
            XmlNode::CData(text) => writer
                .write_event(Event::CData(BytesCData::new(text.as_str())))
                .map_err(TailorError::xml)?,
            XmlNode::Comment(text) => writer
                .write_event(Event::Comment(BytesText::from_escaped(text.as_str())))
                .map_err(TailorError::xml)?,
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(TailorError::xml)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:t xml:space="preserve">Fish &amp; Chips </w:t></w:r></w:p></w:body></w:document>"#;

    #[test]
    fn test_parse_keeps_qualified_names() {
        let doc = XmlDocument::parse_str(SAMPLE).unwrap();
        assert!(doc.has_declaration);
        assert_eq!(doc.root.name, "w:document");
        assert_eq!(
            doc.root.attribute("xmlns:w"),
            Some("http://schemas.openxmlformats.org/wordprocessingml/2006/main")
        );

        let paragraph = doc.root.child("w:body").unwrap().child("w:p").unwrap();
        let jc = paragraph.child("w:pPr").unwrap().child("w:jc").unwrap();
        assert_eq!(jc.attribute("w:val"), Some("center"));
    }

    #[test]
    fn test_text_is_unescaped_and_whitespace_kept() {
        let doc = XmlDocument::parse_str(SAMPLE).unwrap();
        let texts = doc.root.descendants("w:t");
        assert_eq!(texts.len(), 1);
        assert_eq!(texts[0].text(), "Fish & Chips ");
        assert_eq!(texts[0].attribute("xml:space"), Some("preserve"));
    }

    #[test]
    fn test_serialize_then_parse_is_stable() {
        let doc = XmlDocument::parse_str(SAMPLE).unwrap();
        let bytes = doc.to_bytes().unwrap();
        let serialized = String::from_utf8(bytes.clone()).unwrap();
        assert!(serialized.contains("Fish &amp; Chips "));
        assert!(serialized.contains(r#"<w:jc w:val="center"/>"#));

        let reparsed = XmlDocument::parse(&bytes).unwrap();
        assert_eq!(reparsed.root, doc.root);
    }

    #[test]
    fn test_unbalanced_document_is_rejected() {
        assert!(XmlDocument::parse_str("<a><b></a>").is_err());
        assert!(XmlDocument::parse_str("").is_err());
    }

    #[test]
    fn test_set_attribute_replaces_existing() {
        let mut element = XmlElement::new("w:sz").with_attribute("w:val", "22");
        element.set_attribute("w:val", "24");
        assert_eq!(element.attributes.len(), 1);
        assert_eq!(element.attribute("w:val"), Some("24"));
    }
}
