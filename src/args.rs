use crate::format::DEFAULT_WRAP_WIDTH;
use clap::{ArgAction, Parser, Subcommand};

fn parse_wrap_width(width: &str) -> Result<usize, String> {
    clap_num::number_range(width, 1, 255)
}

/// Tools for round-tripping CC scenario-script translations
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Arg {
    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = "config.json")]
    pub config: String,
    /// Characters per line before auto wrapping kicks in.
    /// The engine's documentation says 52; the shipped behavior is 53.
    #[arg(long, global = true, value_parser = parse_wrap_width, default_value_t = DEFAULT_WRAP_WIDTH)]
    pub wrap_width: usize,
    #[arg(global = true, action = ArgAction::SetTrue, short, long)]
    /// Print backtrace on error
    pub backtrace: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Unpack the original compressed scripts (jpCC -> decompressJPCC)
    Decompress,
    /// Repack the injected scripts (decompressENCC -> enCC)
    Compress,
    /// Extract translator text (decompressJPCC -> jpTXT)
    Extract,
    /// Inject translated text (decompressJPCC + enTXT -> decompressENCC)
    Inject,
    /// Write rebuilt scripts into the disk image (enCC -> hdiFile)
    #[command(alias = "import-to-image")]
    Import,
    /// Inject, repack, and import in one run
    All,
}

pub fn parse_args() -> Arg {
    Arg::parse()
}
