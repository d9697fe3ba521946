//! Resume tailor library
//!
//! Fills `{{TOKEN}}` placeholders in a DOCX resume template with values from a
//! YAML candidate profile, keeping the template's formatting intact.

pub mod cli;
pub mod config;
pub mod error;
pub mod docx;
pub mod profile;
pub mod fill;

pub use error::{Result, TailorError};
pub use config::Config;
