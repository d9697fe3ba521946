//! Package relationship parts (`*.rels`)

use crate::docx::xml::{XmlDocument, XmlElement};
use crate::error::Result;

pub const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
pub const HYPERLINK_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";
/// Namespace bound to the `r:` prefix used by `r:id` references in a part
pub const OFFICE_RELATIONSHIPS_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
pub const OFFICE_DOCUMENT_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";

#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub external: bool,
}

/// Relationships of one package part, tracking whether they need rewriting
#[derive(Debug, Clone)]
pub struct Relationships {
    document: XmlDocument,
    modified: bool,
}

impl Default for Relationships {
    fn default() -> Self {
        Self {
            document: XmlDocument {
                has_declaration: true,
                root: XmlElement::new("Relationships").with_attribute("xmlns", RELATIONSHIPS_NS),
            },
            modified: true,
        }
    }
}

impl Relationships {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        Ok(Self {
            document: XmlDocument::parse(bytes)?,
            modified: false,
        })
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn iter(&self) -> impl Iterator<Item = Relationship> + '_ {
        self.document
            .root
            .elements()
            .filter(|e| e.is("Relationship"))
            .map(|e| Relationship {
                id: e.attribute("Id").unwrap_or_default().to_string(),
                rel_type: e.attribute("Type").unwrap_or_default().to_string(),
                target: e.attribute("Target").unwrap_or_default().to_string(),
                external: e.attribute("TargetMode") == Some("External"),
            })
    }

    pub fn get(&self, id: &str) -> Option<Relationship> {
        self.iter().find(|r| r.id == id)
    }

    pub fn find_by_type(&self, rel_type: &str) -> Option<Relationship> {
        self.iter().find(|r| r.rel_type == rel_type)
    }

    /// Register an external hyperlink target, reusing an identical existing one
    pub fn add_external_hyperlink(&mut self, url: &str) -> String {
        if let Some(existing) = self
            .iter()
            .find(|r| r.external && r.rel_type == HYPERLINK_REL_TYPE && r.target == url)
        {
            return existing.id;
        }

        let id = self.next_id();
        self.document.root.children.push(
            XmlElement::new("Relationship")
                .with_attribute("Id", id.as_str())
                .with_attribute("Type", HYPERLINK_REL_TYPE)
                .with_attribute("Target", url)
                .with_attribute("TargetMode", "External")
                .into(),
        );
        self.modified = true;
        id
    }

    fn next_id(&self) -> String {
        let highest = self
            .iter()
            .filter_map(|r| r.id.strip_prefix("rId").and_then(|n| n.parse::<u32>().ok()))
            .max()
            .unwrap_or(0);
        format!("rId{}", highest + 1)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.document.to_bytes()
    }
}
