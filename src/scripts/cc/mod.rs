//! The CC scenario-script container format: a 0x18-byte header followed by
//! an LZSS-compressed body with inline text records.
pub mod container;
pub mod lzss;
pub mod scan;
pub mod script;
