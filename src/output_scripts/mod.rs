//! Output formats for extracted text.
pub mod txt;
