//! Reconstruction of glyph bitmaps from their encoded form.
//!
//! Decoding exists to verify the encoder; nothing on the host side needs it
//! for output. It is the reference for what the on-device decoder must do.

use crate::bits::Bitstring;
use crate::datafile::FontInfo;
use crate::dicttree::{CODE_DICT_START, CODE_FILL, CODE_ONE, CODE_ZERO};
use crate::encode::EncodedFont;
use crate::error::{Error, Result};

/// Expands one reference string into pixels.
///
/// Codes at and above `4 + len(rle_dictionary)` recurse into the ref
/// dictionary; the sort performed while encoding guarantees those entries
/// only contain literal and RLE codes, so the recursion is one level deep.
pub fn decode_refstring(
    encoded: &EncodedFont,
    refstring: &[u8],
    fontinfo: &FontInfo,
) -> Bitstring {
    let mut result = Vec::new();
    decode_into(encoded, refstring, fontinfo, &mut result);
    Bitstring::from(result)
}

/// Decodes the glyph at `index`.
pub fn decode_glyph(encoded: &EncodedFont, index: usize, fontinfo: &FontInfo) -> Result<Bitstring> {
    let refstring = encoded
        .glyphs
        .get(index)
        .ok_or(Error::NoSuchGlyph(index))?;
    Ok(decode_refstring(encoded, refstring, fontinfo))
}

fn decode_into(encoded: &EncodedFont, refstring: &[u8], fontinfo: &FontInfo, out: &mut Vec<bool>) {
    for &code in refstring {
        match code {
            CODE_ZERO => out.push(false),
            CODE_ONE => out.push(true),
            CODE_FILL => out.resize(fontinfo.glyph_bits(), false),
            3 => {} // reserved, never emitted
            _ => {
                let index = (code - CODE_DICT_START) as usize;
                if let Some(rle) = encoded.rle_dictionary.get(index) {
                    for &byte in rle {
                        let bit = byte & 0x80 != 0;
                        for _ in 0..byte & 0x7F {
                            out.push(bit);
                        }
                    }
                } else {
                    let index = index - encoded.rle_dictionary.len();
                    decode_into(encoded, &encoded.ref_dictionary[index], fontinfo, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn fontinfo() -> FontInfo {
        FontInfo {
            max_width: 4,
            max_height: 2,
        }
    }

    #[test]
    fn literal_and_fill_codes() {
        let encoded = EncodedFont::default();
        let bits = decode_refstring(&encoded, &[1, 0, 1, 2], &fontinfo());
        assert_eq!(bits.to_string(), "10100000");
    }

    #[test]
    fn rle_expansion() {
        let encoded = EncodedFont {
            rle_dictionary: vec![vec![0x83, 0x02]],
            ..Default::default()
        };
        let bits = decode_refstring(&encoded, &[4], &fontinfo());
        assert_eq!(bits.to_string(), "11100");
    }

    #[test]
    fn ref_codes_index_past_rle_range() {
        let encoded = EncodedFont {
            rle_dictionary: vec![vec![0x82]],
            ref_dictionary: vec![vec![4, 0, 4]],
            ..Default::default()
        };
        // Code 5 is the first ref entry: "11", literal 0, "11" again.
        let bits = decode_refstring(&encoded, &[5, 1], &fontinfo());
        assert_eq!(bits.to_string(), "110111");
    }

    #[test]
    fn reserved_code_ignored() {
        let encoded = EncodedFont::default();
        let bits = decode_refstring(&encoded, &[1, 3, 1], &fontinfo());
        assert_eq!(bits.to_string(), "11");
    }

    #[test]
    fn missing_glyph_is_an_error() {
        let encoded = EncodedFont::default();
        assert!(matches!(
            decode_glyph(&encoded, 0, &fontinfo()),
            Err(Error::NoSuchGlyph(0))
        ));
    }
}
