//! A Rust library for round-tripping the dialogue of CC scenario scripts:
//! unpacking the LZSS-compressed containers, extracting translator text,
//! injecting translated text back at byte-exact positions, repacking, and
//! importing the result into a FAT disk image.
pub mod args;
pub mod config;
pub mod ext;
pub mod format;
pub mod image;
pub mod output_scripts;
pub mod scripts;
pub mod types;
pub mod utils;

lazy_static::lazy_static! {
    pub static ref COUNTER: utils::counter::Counter = utils::counter::Counter::new();
}
