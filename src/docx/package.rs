//! DOCX zip container I/O

use crate::docx::relationships::{Relationships, OFFICE_DOCUMENT_REL_TYPE};
use crate::docx::xml::{XmlDocument, XmlElement};
use crate::error::{Result, TailorError};
use log::{debug, info};
use std::io::{Read, Seek, Write};
use std::path::{Path, PathBuf};

const PACKAGE_RELS_PART: &str = "_rels/.rels";
const DEFAULT_DOCUMENT_PART: &str = "word/document.xml";

/// An opened DOCX package: raw entries plus the parsed main document
pub struct DocxPackage {
    entries: Vec<(String, Vec<u8>)>,
    document_part: String,
    relationships_part: String,
    document: XmlDocument,
    relationships: Relationships,
}

impl DocxPackage {
    pub fn open(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|source| TailorError::TemplateNotFound {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Opening template: {}", path.display());
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = zip::ZipArchive::new(reader)?;
        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            let name = entry.name().to_string();
            let mut data = Vec::new();
            entry.read_to_end(&mut data)?;
            entries.push((name, data));
        }

        let document_part = locate_document_part(&entries)?;
        let relationships_part = relationships_part_for(&document_part);
        debug!(
            "Main document part: {} (relationships: {})",
            document_part, relationships_part
        );

        let document_bytes = entry_bytes(&entries, &document_part).ok_or_else(|| {
            TailorError::InvalidDocument(format!("Missing document part: {}", document_part))
        })?;
        let document = XmlDocument::parse(document_bytes)?;
        if document.root.child("w:body").is_none() {
            return Err(TailorError::InvalidDocument(
                "Document part has no w:body".to_string(),
            ));
        }

        let relationships = match entry_bytes(&entries, &relationships_part) {
            Some(bytes) => Relationships::parse(bytes)?,
            None => Relationships::default(),
        };

        Ok(Self {
            entries,
            document_part,
            relationships_part,
            document,
            relationships,
        })
    }

    pub fn document(&self) -> &XmlDocument {
        &self.document
    }

    pub fn relationships(&self) -> &Relationships {
        &self.relationships
    }

    /// Document body and relationships, borrowed together for filling
    pub fn body_mut(&mut self) -> Result<(&mut XmlElement, &mut Relationships)> {
        let body = self
            .document
            .root
            .child_mut("w:body")
            .ok_or_else(|| TailorError::InvalidDocument("Document part has no w:body".to_string()))?;
        Ok((body, &mut self.relationships))
    }

    /// Declare `xmlns:{prefix}` on the document root unless it is already bound.
    /// Returns true when the declaration was added.
    pub fn ensure_namespace(&mut self, prefix: &str, uri: &str) -> bool {
        let key = format!("xmlns:{}", prefix);
        if self.document.root.attribute(&key).is_some() {
            return false;
        }
        self.document.root.set_attribute(key, uri);
        true
    }

    pub fn save(&self, path: &Path) -> Result<PathBuf> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = std::fs::File::create(path)?;
        self.write_to(file)?;
        info!("Document saved: {}", path.display());
        Ok(path.to_path_buf())
    }

    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<W> {
        let document_bytes = self.document.to_bytes()?;
        let relationships_bytes = if self.relationships.is_modified() {
            Some(self.relationships.to_bytes()?)
        } else {
            None
        };

        let mut zip = zip::ZipWriter::new(writer);
        let deflated = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        let stored = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);

        let mut wrote_relationships = false;
        for (name, data) in &self.entries {
            if name.ends_with('/') {
                zip.add_directory(name.as_str(), deflated)?;
                continue;
            }
            let options = if name.starts_with("word/media/") {
                stored
            } else {
                deflated
            };
            let data: &[u8] = if *name == self.document_part {
                &document_bytes
            } else if *name == self.relationships_part {
                wrote_relationships = true;
                relationships_bytes.as_deref().unwrap_or(data)
            } else {
                data
            };
            zip.start_file(name.as_str(), options)?;
            zip.write_all(data)?;
        }

        if let (Some(bytes), false) = (&relationships_bytes, wrote_relationships) {
            zip.start_file(self.relationships_part.as_str(), deflated)?;
            zip.write_all(bytes)?;
        }

        Ok(zip.finish()?)
    }
}

fn entry_bytes<'a>(entries: &'a [(String, Vec<u8>)], name: &str) -> Option<&'a [u8]> {
    entries
        .iter()
        .find(|(entry, _)| entry == name)
        .map(|(_, data)| data.as_slice())
}

/// Resolve the main document part through the package relationships
fn locate_document_part(entries: &[(String, Vec<u8>)]) -> Result<String> {
    if let Some(bytes) = entry_bytes(entries, PACKAGE_RELS_PART) {
        let rels = Relationships::parse(bytes)?;
        if let Some(rel) = rels.find_by_type(OFFICE_DOCUMENT_REL_TYPE) {
            return Ok(rel.target.trim_start_matches('/').to_string());
        }
    }
    Ok(DEFAULT_DOCUMENT_PART.to_string())
}

/// `word/document.xml` -> `word/_rels/document.xml.rels`
fn relationships_part_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}
