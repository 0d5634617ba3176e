//! Encoding of a datafile into its compact byte form.

use crate::datafile::{DataFile, DictEntry};
use crate::dicttree::{DictTree, CODE_FILL};
use crate::error::Result;

/// Run-length byte string: bit 7 is the pixel value, bits 0..=6 a run
/// length of 1..=127.
pub type RleString = Vec<u8>;

/// Reference byte string: each byte is a code from the font's code
/// alphabet.
pub type RefString = Vec<u8>;

/// The encoded form of a whole font.
///
/// Code space follows list order: dictionary entry codes start at 4, with
/// the RLE strings first and the ref strings directly after them. The
/// external writer serializes this into the on-device tables.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EncodedFont {
    pub rle_dictionary: Vec<RleString>,
    pub ref_dictionary: Vec<RefString>,
    pub glyphs: Vec<RefString>,
}

/// Copies the dictionary into encode order: used slots first, RLE-coded
/// before ref-coded, original order otherwise. The decoder relies on this
/// split to tell the two code ranges apart.
fn sorted_dictionary(datafile: &DataFile) -> Vec<DictEntry> {
    let mut dictionary = datafile.dictionary().to_vec();
    dictionary.sort_by_key(|entry| (entry.replacement.is_empty(), entry.ref_encode));
    dictionary
}

/// Run-length encodes a bitstring. Runs longer than 127 split into
/// multiple bytes; a zero-length run is never emitted.
fn encode_rle(bits: &[bool]) -> RleString {
    let mut result = RleString::new();

    let mut pos = 0;
    while pos < bits.len() {
        let bit = bits[pos];
        let mut count = 1;
        while pos + count < bits.len() && count < 127 && bits[pos + count] == bit {
            count += 1;
        }
        let marker = if bit { 0x80 } else { 0x00 };
        result.push(marker | count as u8);
        pos += count;
    }

    result
}

/// Greedily reference-encodes a bitstring against the lookup tree.
///
/// For glyphs the trailing background pixels are not encoded; if anything
/// was left off, the fill code tells the decoder to pad the box back out.
/// A match is allowed to run past the trimmed end into the trailing
/// background.
fn encode_ref(bits: &[bool], tree: &DictTree, is_glyph: bool) -> Result<RefString> {
    let mut result = RefString::new();

    let end = if is_glyph {
        bits.iter().rposition(|&bit| bit).map_or(0, |pos| pos + 1)
    } else {
        bits.len()
    };

    let mut pos = 0;
    while pos < end {
        let (length, code) = tree.longest_match(&bits[pos..], is_glyph)?;
        result.push(code);
        pos += length;
    }

    if pos < bits.len() {
        result.push(CODE_FILL);
    }

    Ok(result)
}

/// Encodes every dictionary entry and glyph of the datafile.
///
/// Pure: the same datafile always produces byte-identical output.
pub fn encode_font(datafile: &DataFile) -> Result<EncodedFont> {
    let sorted = sorted_dictionary(datafile);
    let tree = DictTree::build(&sorted);

    let mut result = EncodedFont::default();
    for entry in &sorted {
        if entry.replacement.is_empty() {
            continue;
        }
        if entry.ref_encode {
            result
                .ref_dictionary
                .push(encode_ref(&entry.replacement, &tree, false)?);
        } else {
            result.rle_dictionary.push(encode_rle(&entry.replacement));
        }
    }

    for glyph in datafile.glyphs() {
        result.glyphs.push(encode_ref(&glyph.data, &tree, true)?);
    }

    Ok(result)
}

/// Total byte cost of the encoded font: string bytes plus a 2-byte offset
/// slot per used dictionary string, and a 2-byte offset plus 1-byte width
/// per glyph. This is the optimizer's objective.
pub fn get_encoded_size(encoded: &EncodedFont) -> usize {
    let mut total = 0;
    for rle in &encoded.rle_dictionary {
        total += rle.len();
        if !rle.is_empty() {
            total += 2;
        }
    }
    for reference in &encoded.ref_dictionary {
        total += reference.len();
        if !reference.is_empty() {
            total += 2;
        }
    }
    for glyph in &encoded.glyphs {
        total += glyph.len();
        total += 2 + 1;
    }
    total
}

/// Encodes the datafile and measures it in one step.
pub fn encoded_size(datafile: &DataFile) -> Result<usize> {
    Ok(get_encoded_size(&encode_font(datafile)?))
}
