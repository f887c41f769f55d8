#![doc = include_str!("../README.md")]

extern crate alloc;

pub mod content;
pub mod discover;
pub mod driver;
pub mod format;
pub mod group;
pub mod logger;

use anyhow::Result;

pub use driver::{FileManager, ProcessFileError};
pub use logger::{BufferLog, Log, StderrLog};

use crate::content::ContentSettings;
use crate::group::{ChainBuilder, GroupChain};

/// Produce the canonical form of one file's raw bytes: decode,
/// tokenize, group, render, then restore the original BOM and line
/// terminator.
///
/// # Errors
///
/// Returns charset errors from decoding and parse errors from the
/// tokenizer, both with their original messages.
pub fn format_bytes(input: &[u8], indent: usize) -> Result<Vec<u8>> {
    let (settings, normalized) = ContentSettings::prepare(input)?;
    let chain = parse(&normalized)?;
    let document = format::render(&chain, indent);
    Ok(settings.restore(&document))
}

fn parse(content: &str) -> Result<GroupChain> {
    let mut parser = gherkin_stream::Parser::new(ChainBuilder::default());
    parser.stop_at_first_error(true);
    parser.parse(content)?;
    Ok(parser.into_builder().into_chain())
}
