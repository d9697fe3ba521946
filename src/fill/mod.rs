//! Placeholder substitution engine

pub mod scanner;
pub mod hyperlink;
pub mod rebuild;
pub mod filler;

pub use filler::{DocumentFiller, FillOptions, FillReport};
