//! Paragraph content as inline elements with a character index
//!
//! A paragraph is read into an ordered sequence of [`InlineElement`]s. The
//! rendered text and the [`CharacterIndex`] are both derived from that same
//! sequence, so an offset found by searching the text always resolves to the
//! element that produced it.

use crate::docx::xml::{XmlElement, XmlNode};

pub const PARAGRAPH: &str = "w:p";
pub const PARAGRAPH_PROPERTIES: &str = "w:pPr";
pub const RUN: &str = "w:r";
pub const RUN_PROPERTIES: &str = "w:rPr";
pub const HYPERLINK: &str = "w:hyperlink";
pub const TEXT: &str = "w:t";
pub const TAB: &str = "w:tab";
pub const BREAK: &str = "w:br";

/// The six run attributes carried onto synthesized runs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Formatting {
    pub font_name: Option<String>,
    /// Font size in half-points, as stored in `w:sz`
    pub size: Option<u32>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<String>,
    pub color: Option<String>,
}

impl Formatting {
    pub fn from_run_properties(properties: Option<&XmlElement>) -> Self {
        let Some(rpr) = properties else {
            return Self::default();
        };

        let value = |name: &str| {
            rpr.child(name)
                .and_then(|e| e.attribute("w:val"))
                .map(str::to_string)
        };

        Self {
            font_name: rpr
                .child("w:rFonts")
                .and_then(|f| f.attribute("w:ascii").or_else(|| f.attribute("w:hAnsi")))
                .map(str::to_string),
            size: value("w:sz").and_then(|v| v.parse().ok()),
            bold: rpr.child("w:b").map(toggle_value),
            italic: rpr.child("w:i").map(toggle_value),
            underline: value("w:u"),
            color: value("w:color"),
        }
    }
}

/// `<w:b/>` and `<w:b w:val="true"/>` are on, `w:val="0"|"false"|"off"` is off
fn toggle_value(element: &XmlElement) -> bool {
    !matches!(element.attribute("w:val"), Some("0") | Some("false") | Some("off"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Run,
    Hyperlink,
    Passthrough,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunElement {
    pub node: XmlElement,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HyperlinkElement {
    pub node: XmlElement,
    pub display_text: String,
    pub relationship_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InlineElement {
    Run(RunElement),
    Hyperlink(HyperlinkElement),
    /// Any other paragraph child; contributes no text
    Passthrough(XmlNode),
}

impl RunElement {
    pub fn read(node: &XmlElement) -> Self {
        Self {
            text: run_text(node),
            node: node.clone(),
        }
    }

    pub fn properties(&self) -> Option<&XmlElement> {
        self.node.child(RUN_PROPERTIES)
    }

    pub fn formatting(&self) -> Formatting {
        Formatting::from_run_properties(self.properties())
    }

    /// Copy keeping the rendered chars in `start..end` plus every non-text
    /// child (drawing, field char, symbol) whose char position passes
    /// `keep_child`. None when only the properties would remain.
    fn fragment(&self, start: usize, end: usize, keep_child: impl Fn(usize) -> bool) -> Option<XmlElement> {
        let mut run = XmlElement::new(RUN);
        run.attributes = self.node.attributes.clone();
        if let Some(properties) = self.properties() {
            run.children.push(XmlNode::Element(properties.clone()));
        }

        let mut segment = String::new();
        let mut position = 0;
        for child in self.node.elements() {
            if child.is(RUN_PROPERTIES) {
                continue;
            }
            match child_text(child) {
                Some(text) => {
                    for ch in text.chars() {
                        if (start..end).contains(&position) {
                            segment.push(ch);
                        }
                        position += 1;
                    }
                }
                None if keep_child(position) => {
                    push_content(&mut run, &std::mem::take(&mut segment));
                    run.children.push(XmlNode::Element(child.clone()));
                }
                None => {}
            }
        }
        push_content(&mut run, &segment);

        let has_content = run.elements().any(|e| !e.is(RUN_PROPERTIES));
        has_content.then_some(run)
    }
}

impl HyperlinkElement {
    pub fn read(node: &XmlElement) -> Self {
        let display_text = node
            .descendants(RUN)
            .into_iter()
            .map(run_text)
            .collect();
        Self {
            display_text,
            relationship_id: node.attribute("r:id").map(str::to_string),
            node: node.clone(),
        }
    }

    /// A copy of this hyperlink holding a single run with `text`, styled like its first run
    pub fn with_text(&self, text: &str) -> XmlElement {
        let first_run = self.node.descendants(RUN).into_iter().next();
        let run = match first_run {
            Some(run) => build_run(&run.attributes, run.child(RUN_PROPERTIES), text),
            None => build_run(&[], None, text),
        };
        XmlElement {
            name: self.node.name.clone(),
            attributes: self.node.attributes.clone(),
            children: vec![XmlNode::Element(run)],
        }
    }
}

impl InlineElement {
    pub fn kind(&self) -> ElementKind {
        match self {
            InlineElement::Run(_) => ElementKind::Run,
            InlineElement::Hyperlink(_) => ElementKind::Hyperlink,
            InlineElement::Passthrough(_) => ElementKind::Passthrough,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            InlineElement::Run(run) => &run.text,
            InlineElement::Hyperlink(link) => &link.display_text,
            InlineElement::Passthrough(_) => "",
        }
    }

    /// Content ahead of char `offset`, None when nothing remains.
    /// Passthrough nodes are returned unchanged.
    pub fn before(&self, offset: usize) -> Option<XmlNode> {
        match self {
            InlineElement::Run(run) => run.fragment(0, offset, |p| p <= offset).map(XmlNode::Element),
            InlineElement::Hyperlink(link) => {
                let text: String = link.display_text.chars().take(offset).collect();
                (!text.is_empty()).then(|| XmlNode::Element(link.with_text(&text)))
            }
            InlineElement::Passthrough(node) => Some(node.clone()),
        }
    }

    /// Content from char `offset` on, None when nothing remains
    pub fn after(&self, offset: usize) -> Option<XmlNode> {
        match self {
            InlineElement::Run(run) => run
                .fragment(offset, usize::MAX, |p| p >= offset)
                .map(XmlNode::Element),
            InlineElement::Hyperlink(link) => {
                let text: String = link.display_text.chars().skip(offset).collect();
                (!text.is_empty()).then(|| XmlNode::Element(link.with_text(&text)))
            }
            InlineElement::Passthrough(node) => Some(node.clone()),
        }
    }

    pub fn to_node(&self) -> XmlNode {
        match self {
            InlineElement::Run(run) => XmlNode::Element(run.node.clone()),
            InlineElement::Hyperlink(link) => XmlNode::Element(link.node.clone()),
            InlineElement::Passthrough(node) => node.clone(),
        }
    }
}

/// Rendered text of a `w:r`, the way word processors expose it
pub fn run_text(run: &XmlElement) -> String {
    run.elements().filter_map(child_text).collect()
}

/// Text one run child renders as; None for children that render none
fn child_text(child: &XmlElement) -> Option<String> {
    match child.name.as_str() {
        TEXT => Some(child.text()),
        TAB | "w:ptab" => Some("\t".to_string()),
        BREAK => match child.attribute("w:type").unwrap_or("textWrapping") {
            "textWrapping" => Some("\n".to_string()),
            _ => None,
        },
        "w:cr" => Some("\n".to_string()),
        "w:noBreakHyphen" => Some("-".to_string()),
        _ => None,
    }
}

/// Build a `w:r` with copied properties; tabs and newlines become `w:tab`/`w:br`
pub fn build_run(attributes: &[(String, String)], properties: Option<&XmlElement>, text: &str) -> XmlElement {
    let mut run = XmlElement::new(RUN);
    run.attributes = attributes.to_vec();
    if let Some(properties) = properties {
        run.children.push(XmlNode::Element(properties.clone()));
    }
    push_content(&mut run, text);
    run
}

/// Append `text` to `run`; tabs and newlines become `w:tab`/`w:br`
fn push_content(run: &mut XmlElement, text: &str) {
    let mut segment = String::new();
    for ch in text.chars() {
        match ch {
            '\t' | '\n' => {
                push_text(run, &mut segment);
                let name = if ch == '\t' { TAB } else { BREAK };
                run.children.push(XmlNode::Element(XmlElement::new(name)));
            }
            _ => segment.push(ch),
        }
    }
    push_text(run, &mut segment);
}

fn push_text(run: &mut XmlElement, segment: &mut String) {
    if segment.is_empty() {
        return;
    }
    let mut t = XmlElement::new(TEXT);
    if segment.starts_with(char::is_whitespace) || segment.ends_with(char::is_whitespace) {
        t.set_attribute("xml:space", "preserve");
    }
    t.children.push(XmlNode::Text(std::mem::take(segment)));
    run.children.push(XmlNode::Element(t));
}

/// A paragraph's properties snapshot and inline content
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub properties: Option<XmlElement>,
    pub elements: Vec<InlineElement>,
}

impl Paragraph {
    pub fn read(paragraph: &XmlElement) -> Self {
        let mut properties = None;
        let mut elements = Vec::new();

        for child in &paragraph.children {
            match child {
                XmlNode::Element(e) if e.is(PARAGRAPH_PROPERTIES) && properties.is_none() => {
                    properties = Some(e.clone());
                }
                XmlNode::Element(e) if e.is(RUN) => {
                    elements.push(InlineElement::Run(RunElement::read(e)));
                }
                XmlNode::Element(e) if e.is(HYPERLINK) => {
                    elements.push(InlineElement::Hyperlink(HyperlinkElement::read(e)));
                }
                other => elements.push(InlineElement::Passthrough(other.clone())),
            }
        }

        Self {
            properties,
            elements,
        }
    }

    pub fn text(&self) -> String {
        self.elements.iter().map(InlineElement::text).collect()
    }

    pub fn index(&self) -> CharacterIndex {
        CharacterIndex::build(&self.elements)
    }

    pub fn first_run(&self) -> Option<&RunElement> {
        self.elements.iter().find_map(|e| match e {
            InlineElement::Run(run) => Some(run),
            _ => None,
        })
    }

    /// Replace the content of `paragraph`: properties first, then `content`
    pub fn write_content(&self, paragraph: &mut XmlElement, content: Vec<XmlNode>) {
        paragraph.children.clear();
        if let Some(properties) = &self.properties {
            paragraph.children.push(XmlNode::Element(properties.clone()));
        }
        paragraph.children.extend(content);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub element: usize,
    pub kind: ElementKind,
    pub offset: usize,
}

/// Rendered-text char offset -> (element, kind, offset within element)
#[derive(Debug, Clone, Default)]
pub struct CharacterIndex {
    slots: Vec<Slot>,
}

impl CharacterIndex {
    pub fn build(elements: &[InlineElement]) -> Self {
        let mut slots = Vec::new();
        for (element, inline) in elements.iter().enumerate() {
            let kind = inline.kind();
            for offset in 0..inline.text().chars().count() {
                slots.push(Slot {
                    element,
                    kind,
                    offset,
                });
            }
        }
        Self { slots }
    }

    pub fn get(&self, position: usize) -> Option<Slot> {
        self.slots.get(position).copied()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
