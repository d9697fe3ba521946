//! Intake of profiles produced by the upstream text-generation pipeline
//!
//! The pipeline returns free text that should be a YAML profile but may be
//! wrapped in a markdown fence or preceded by a sentence of prose. The text is
//! cleaned, then validated; a validation failure is only a warning and the
//! cleaned text is still kept.

use crate::error::Result;
use crate::profile::record::ProfileRecord;
use crate::profile::store::profile_from_str;
use log::{info, warn};
use std::path::Path;

const INTRO_PHRASES: &[&str] = &[
    "Here is the customized CV:",
    "Here's the customized CV:",
    "Below is the customized CV:",
    "The customized CV is:",
    "Customized CV:",
];

#[derive(Debug, Clone)]
pub struct GeneratedProfile {
    /// Cleaned text, always available even when it does not parse
    pub text: String,
    pub record: Option<ProfileRecord>,
    pub warning: Option<String>,
}

impl GeneratedProfile {
    pub fn is_valid(&self) -> bool {
        self.record.is_some()
    }
}

/// Strip markdown fences and introductory prose around generated YAML
pub fn clean_generated_profile(raw: &str) -> String {
    let mut output = if let Some((_, rest)) = raw.split_once("```yaml") {
        rest.split("```").next().unwrap_or_default()
    } else if let Some((_, rest)) = raw.split_once("```") {
        rest.split("```").next().unwrap_or_default()
    } else {
        raw
    };

    for phrase in INTRO_PHRASES {
        if let Some((_, rest)) = output.split_once(phrase) {
            output = rest;
        }
    }

    output.trim().to_string()
}

pub fn accept_generated_profile(raw: &str) -> GeneratedProfile {
    let text = clean_generated_profile(raw);
    match profile_from_str(&text) {
        Ok(record) => {
            info!("Generated profile passed validation");
            GeneratedProfile {
                text,
                record: Some(record),
                warning: None,
            }
        }
        Err(e) => {
            warn!("Generated content may not be a valid profile: {}", e);
            GeneratedProfile {
                text,
                record: None,
                warning: Some(e.to_string()),
            }
        }
    }
}

/// Write the cleaned text, valid or not
pub fn save_generated_profile(profile: &GeneratedProfile, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, &profile.text)?;
    info!("Customized profile saved to {}", path.display());
    Ok(())
}
