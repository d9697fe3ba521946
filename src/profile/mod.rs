//! Candidate profile module
//! Handles the YAML record, its flattening into placeholder values, and
//! intake of generated profiles

pub mod record;
pub mod flatten;
pub mod store;
pub mod generated;

pub use flatten::{flatten, PlaceholderMap};
pub use record::ProfileRecord;
