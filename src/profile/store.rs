//! Loading and saving profile records as YAML

use crate::error::{Result, TailorError};
use crate::profile::record::ProfileRecord;
use log::info;
use std::path::Path;

pub fn load_profile(path: &Path) -> Result<ProfileRecord> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        TailorError::InvalidInput(format!("Cannot read profile {}: {}", path.display(), e))
    })?;
    let profile = profile_from_str(&content)?;
    info!("Loaded profile from {}", path.display());
    Ok(profile)
}

pub fn save_profile(profile: &ProfileRecord, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, profile_to_string(profile)?)?;
    info!("Profile saved to {}", path.display());
    Ok(())
}

pub fn profile_from_str(content: &str) -> Result<ProfileRecord> {
    // An empty document is an empty profile rather than a parse failure
    if content.trim().is_empty() {
        return Ok(ProfileRecord::default());
    }
    Ok(serde_yaml::from_str(content)?)
}

pub fn profile_to_string(profile: &ProfileRecord) -> Result<String> {
    Ok(serde_yaml::to_string(profile)?)
}
