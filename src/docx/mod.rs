//! DOCX package handling
//! Zip container I/O, the owned XML tree, and the paragraph model

pub mod xml;
pub mod relationships;
pub mod package;
pub mod model;
