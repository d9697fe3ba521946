//! Error handling for the resume tailor

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TailorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Template not found or unreadable: {path}")]
    TemplateNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Profile parse error: {0}")]
    ProfileParse(#[from] serde_yaml::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, TailorError>;

impl TailorError {
    /// Wrap any XML reader/writer failure
    pub fn xml(err: impl std::fmt::Display) -> Self {
        TailorError::Xml(err.to_string())
    }
}

