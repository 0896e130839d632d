//! Module for formatting messages.
mod fixed;

pub use fixed::{FixedFormatter, DEFAULT_WRAP_WIDTH};
