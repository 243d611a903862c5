//! SPIR-V Module Access
//!
//! - [`WordReader`]: forward-only cursor over a word sequence
//! - [`SpirvParser`]: single-pass structural introspection
//! - [`opcodes`]: instruction statistics categories

pub mod opcodes;
pub mod parser;
pub mod reader;

pub use opcodes::{InstructionCategory, InstructionCounts};
pub use parser::{EntryPoint, Function, SpirvParser, ValueType, Variable, trim_function_name};
pub use reader::WordReader;

/// Converts a little-endian SPIR-V byte stream into words.
///
/// Trailing bytes that do not form a whole word are ignored.
#[must_use]
pub fn words_from_bytes(bytes: &[u8]) -> Vec<u32> {
    bytes
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// Serializes words as a little-endian byte stream.
#[must_use]
pub fn words_to_bytes(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}
