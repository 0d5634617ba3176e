//! Compresses monochrome bitmap fonts into dictionary-coded byte tables
//! for embedded targets.
//!
//! Glyphs in a bitmap font share a lot of substructure (straight strokes,
//! serifs, corners). A [`DataFile`] pairs the glyph bitmaps with a
//! fixed-size dictionary of shared pixel runs; [`encode_font`] turns the
//! pair into the compact byte tables a device decodes at runtime, and
//! [`optimize`] searches for the dictionary that makes those tables
//! smallest. [`decode_glyph`] reverses the encoding and exists to verify
//! it.
//!
//! The encoded alphabet is one byte per code: 0 and 1 are literal pixels,
//! 2 pads the rest of a glyph with background, 3 is reserved, and codes
//! from 4 up index the dictionary (run-length entries first, then
//! ref-coded entries).

#![forbid(unsafe_code)]

mod bits;
mod datafile;
mod decode;
mod dicttree;
mod encode;
mod error;
mod optimize;

pub use bits::Bitstring;
pub use datafile::{DataFile, DictEntry, FontInfo, GlyphEntry, DICTIONARY_SIZE};
pub use decode::{decode_glyph, decode_refstring};
pub use encode::{encode_font, encoded_size, get_encoded_size, EncodedFont, RefString, RleString};
pub use error::{Error, Result};
pub use optimize::{init_dictionary, optimize, optimize_bigjump};
