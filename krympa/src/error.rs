//! Error types.

use thiserror::Error;

/// Errors raised while encoding, validating or loading a font.
///
/// Failed optimization moves are not errors; the optimizer simply discards
/// them. Anything surfacing here aborts the run.
#[derive(Error, Debug)]
pub enum Error {
    /// The longest-match walk found no terminal at all. The literal bit
    /// terminals make this unreachable from a correctly built tree, so
    /// hitting it means the tree is corrupt.
    #[error("no dictionary match for bit sequence (corrupt lookup tree)")]
    Unencodable,

    #[error("glyph {index}: bitmap has {len} bits, expected {expected}")]
    GlyphSize {
        index: usize,
        len: usize,
        expected: usize,
    },

    #[error("glyph {index}: width {width} exceeds font maximum {max_width}")]
    GlyphWidth {
        index: usize,
        width: u8,
        max_width: u32,
    },

    #[error("dictionary has {len} entries, limit is {limit}")]
    DictionaryOverflow { len: usize, limit: usize },

    #[error("font has no glyph {0}")]
    NoSuchGlyph(usize),

    #[error("invalid character {0:?} in bitstring, expected '0' or '1'")]
    InvalidBitChar(char),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
