//! The in-memory font model the encoder and optimizer work on.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::bits::Bitstring;
use crate::error::{Error, Result};

/// Number of dictionary slots. Entries are replaced in place during
/// optimization; the table never grows or shrinks.
pub const DICTIONARY_SIZE: usize = 96;

/// Pixel dimensions of the glyph box. Every glyph bitmap covers the full
/// box; per-glyph widths only affect layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontInfo {
    pub max_width: u32,
    pub max_height: u32,
}

impl FontInfo {
    /// Bit length of one glyph bitmap.
    pub fn glyph_bits(&self) -> usize {
        (self.max_width * self.max_height) as usize
    }
}

/// One glyph: a full-box bitmap plus layout width.
///
/// `chars` lists the codepoints the glyph renders; the exporter uses it for
/// the character map and the optimizer ignores it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlyphEntry {
    pub data: Bitstring,
    pub width: u8,
    #[serde(default)]
    pub chars: Vec<u32>,
}

/// One dictionary slot.
///
/// An empty `replacement` marks the slot unused. `ref_encode` selects the
/// entry's own encoding: run-length bytes, or references to other entries.
/// `score` caches how many bytes the entry currently saves.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictEntry {
    pub replacement: Bitstring,
    #[serde(default)]
    pub ref_encode: bool,
    #[serde(default)]
    pub score: i32,
}

/// A font plus the dictionary being optimized for it.
///
/// Glyphs are immutable for the whole optimization run and shared behind an
/// `Arc`, so the clone-mutate-compare cycle of the optimizer only copies the
/// dictionary table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DataFile {
    fontinfo: FontInfo,
    glyphs: Arc<Vec<GlyphEntry>>,
    dictionary: Vec<DictEntry>,
    seed: u32,
}

impl DataFile {
    /// Builds a datafile, checking the glyph invariants and padding the
    /// dictionary out to [`DICTIONARY_SIZE`] slots.
    pub fn new(
        fontinfo: FontInfo,
        glyphs: Vec<GlyphEntry>,
        dictionary: Vec<DictEntry>,
        seed: u32,
    ) -> Result<DataFile> {
        let mut datafile = DataFile {
            fontinfo,
            glyphs: Arc::new(glyphs),
            dictionary,
            seed,
        };
        datafile.normalize()?;
        Ok(datafile)
    }

    fn normalize(&mut self) -> Result<()> {
        let expected = self.fontinfo.glyph_bits();
        for (index, glyph) in self.glyphs.iter().enumerate() {
            if glyph.data.len() != expected {
                return Err(Error::GlyphSize {
                    index,
                    len: glyph.data.len(),
                    expected,
                });
            }
            if u32::from(glyph.width) > self.fontinfo.max_width {
                return Err(Error::GlyphWidth {
                    index,
                    width: glyph.width,
                    max_width: self.fontinfo.max_width,
                });
            }
        }
        if self.dictionary.len() > DICTIONARY_SIZE {
            return Err(Error::DictionaryOverflow {
                len: self.dictionary.len(),
                limit: DICTIONARY_SIZE,
            });
        }
        self.dictionary.resize(DICTIONARY_SIZE, DictEntry::default());
        Ok(())
    }

    pub fn fontinfo(&self) -> &FontInfo {
        &self.fontinfo
    }

    pub fn glyphs(&self) -> &[GlyphEntry] {
        &self.glyphs
    }

    pub fn glyph(&self, index: usize) -> &GlyphEntry {
        &self.glyphs[index]
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    pub fn dictionary(&self) -> &[DictEntry] {
        &self.dictionary
    }

    pub fn dictionary_entry(&self, index: usize) -> &DictEntry {
        &self.dictionary[index]
    }

    pub fn set_dictionary_entry(&mut self, index: usize, entry: DictEntry) {
        self.dictionary[index] = entry;
    }

    /// Index of the lowest-scoring dictionary slot. Ties go to the lowest
    /// index so that replays under a fixed seed stay reproducible.
    pub fn low_score_index(&self) -> usize {
        self.dictionary
            .iter()
            .enumerate()
            .min_by_key(|(index, entry)| (entry.score, *index))
            .map(|(index, _)| index)
            .expect("dictionary is never empty")
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn set_seed(&mut self, seed: u32) {
        self.seed = seed;
    }

    pub fn from_json(json: &str) -> Result<DataFile> {
        let mut datafile: DataFile = serde_json::from_str(json)?;
        datafile.normalize()?;
        Ok(datafile)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).expect("datafile serialization cannot fail")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<DataFile> {
        DataFile::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json())?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn glyph(data: &str, width: u8) -> GlyphEntry {
        GlyphEntry {
            data: data.parse().unwrap(),
            width,
            chars: Vec::new(),
        }
    }

    #[test]
    fn dictionary_padded_to_size() {
        let fontinfo = FontInfo {
            max_width: 2,
            max_height: 2,
        };
        let datafile = DataFile::new(fontinfo, vec![glyph("0110", 2)], Vec::new(), 1).unwrap();
        assert_eq!(datafile.dictionary().len(), DICTIONARY_SIZE);
        assert!(datafile.dictionary().iter().all(|d| d.replacement.is_empty()));
    }

    #[test]
    fn glyph_length_checked() {
        let fontinfo = FontInfo {
            max_width: 2,
            max_height: 2,
        };
        let result = DataFile::new(fontinfo, vec![glyph("01101", 2)], Vec::new(), 1);
        assert!(matches!(result, Err(Error::GlyphSize { index: 0, .. })));
    }

    #[test]
    fn low_score_ties_take_lowest_index() {
        let fontinfo = FontInfo {
            max_width: 2,
            max_height: 2,
        };
        let mut datafile = DataFile::new(fontinfo, vec![glyph("0110", 2)], Vec::new(), 1).unwrap();
        assert_eq!(datafile.low_score_index(), 0);

        for index in 0..DICTIONARY_SIZE {
            datafile.set_dictionary_entry(
                index,
                DictEntry {
                    replacement: "01".parse().unwrap(),
                    ref_encode: false,
                    score: 5,
                },
            );
        }
        let mut low = datafile.dictionary_entry(20).clone();
        low.score = 1;
        datafile.set_dictionary_entry(20, low.clone());
        datafile.set_dictionary_entry(33, low);
        assert_eq!(datafile.low_score_index(), 20);
    }

    #[test]
    fn json_round_trip() {
        let fontinfo = FontInfo {
            max_width: 2,
            max_height: 2,
        };
        let mut original = DataFile::new(
            fontinfo,
            vec![GlyphEntry {
                data: "0110".parse().unwrap(),
                width: 2,
                chars: vec![65, 97],
            }],
            Vec::new(),
            1234,
        )
        .unwrap();
        original.set_dictionary_entry(
            3,
            DictEntry {
                replacement: "0110".parse().unwrap(),
                ref_encode: true,
                score: 7,
            },
        );

        let reloaded = DataFile::from_json(&original.to_json()).unwrap();
        assert_eq!(original, reloaded);
        assert_eq!(reloaded.glyph(0).chars, vec![65, 97]);
    }
}
