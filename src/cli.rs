//! CLI interface for the resume tailor

use crate::config::Config;
use clap::Parser;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "resume-tailor")]
#[command(about = "Fill a DOCX resume template with values from a YAML profile")]
#[command(long_about = "Substitute {{TOKEN}} placeholders in a DOCX template with values from a candidate profile, preserving run formatting and turning link fields into hyperlinks")]
pub struct Cli {
    /// DOCX template containing {{TOKEN}} placeholders
    pub template: PathBuf,

    /// YAML candidate profile
    pub profile: PathBuf,

    /// Where to write the filled DOCX
    pub output: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Maximum placeholder passes per paragraph
    #[arg(long)]
    pub max_passes: Option<usize>,

    /// Leave placeholders with no profile value in the document
    #[arg(long)]
    pub keep_unresolved: bool,

    /// Treat PROFILE as raw text-generation output (fenced or prefixed YAML)
    #[arg(long)]
    pub from_generated: bool,

    /// Save the cleaned profile to this path
    #[arg(long, value_name = "PATH")]
    pub save_profile: Option<PathBuf>,

    /// Print the fill report as JSON
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Command-line flags take precedence over the loaded configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(max_passes) = self.max_passes {
            config.filler.max_passes = max_passes;
        }
        if self.keep_unresolved {
            config.filler.clear_unresolved = false;
        }
    }
}

/// Validate file extension
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}
