//! Text boundary for compiled units.
//!
//! Cells are bytes, and text crosses the boundary as ISO-8859-1 (Latin-1): byte `b` is the
//! character `U+00bb` and back. Every one of the 256 cell values survives a round trip, which
//! UTF-8 can't promise for output made of arbitrary bytes.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("character {character:?} at offset {offset} has no single-byte encoding")]
pub struct UnencodableChar {
    pub character: char,
    /// offset in characters, not bytes
    pub offset: usize,
}

pub fn encode_latin1(text: &str) -> Result<Vec<u8>, UnencodableChar> {
    text.chars()
        .enumerate()
        .map(|(offset, character)| {
            u8::try_from(u32::from(character)).map_err(|_| UnencodableChar { character, offset })
        })
        .collect()
}

pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}
