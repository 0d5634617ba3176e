//! End-to-end checks: every encoded glyph must decode back to its bitmap,
//! and the optimizer must be deterministic and monotone.

use krympa::{
    decode_glyph, decode_refstring, encode_font, encoded_size, get_encoded_size, init_dictionary,
    optimize, DataFile, DictEntry, FontInfo, GlyphEntry, DICTIONARY_SIZE,
};

fn glyph(data: &str, width: u8, chars: &[u32]) -> GlyphEntry {
    GlyphEntry {
        data: data.parse().unwrap(),
        width,
        chars: chars.to_vec(),
    }
}

fn entry(replacement: &str, ref_encode: bool) -> DictEntry {
    DictEntry {
        replacement: replacement.parse().unwrap(),
        ref_encode,
        score: 0,
    }
}

/// An 8x8 font with a handful of digit-like glyphs.
fn sample_font() -> DataFile {
    let fontinfo = FontInfo {
        max_width: 8,
        max_height: 8,
    };
    let glyphs = vec![
        glyph(
            concat!(
                "00111100", "01000010", "01000010", "01000010", "01000010", "01000010", "01000010",
                "00111100"
            ),
            7,
            &[48],
        ),
        glyph(
            concat!(
                "00011000", "00111000", "00011000", "00011000", "00011000", "00011000", "00011000",
                "00111100"
            ),
            7,
            &[49],
        ),
        glyph(
            concat!(
                "00111100", "01000010", "00000010", "00000100", "00011000", "00100000", "01000000",
                "01111110"
            ),
            7,
            &[50],
        ),
        glyph(
            concat!(
                "00000000", "00000000", "00000000", "00000000", "00000000", "00000000", "00000000",
                "00000000"
            ),
            4,
            &[32],
        ),
    ];
    DataFile::new(fontinfo, glyphs, Vec::new(), 2024).unwrap()
}

fn assert_round_trips(datafile: &DataFile) {
    let encoded = encode_font(datafile).unwrap();
    for (index, glyph) in datafile.glyphs().iter().enumerate() {
        let decoded = decode_glyph(&encoded, index, datafile.fontinfo()).unwrap();
        assert_eq!(decoded, glyph.data, "glyph {index} did not round-trip");
    }
}

#[test]
fn all_background_glyph_is_a_single_fill_code() {
    let fontinfo = FontInfo {
        max_width: 8,
        max_height: 8,
    };
    let datafile =
        DataFile::new(fontinfo, vec![glyph(&"0".repeat(64), 8, &[32])], Vec::new(), 1).unwrap();

    let encoded = encode_font(&datafile).unwrap();
    assert_eq!(encoded.glyphs[0], vec![2]);

    let decoded = decode_glyph(&encoded, 0, datafile.fontinfo()).unwrap();
    assert_eq!(decoded.len(), 64);
    assert!(decoded.iter().all(|&bit| !bit));
}

#[test]
fn dictionary_match_plus_fill() {
    let fontinfo = FontInfo {
        max_width: 8,
        max_height: 1,
    };
    let datafile = DataFile::new(
        fontinfo,
        vec![glyph("11110000", 8, &[33])],
        vec![entry("1111", false)],
        1,
    )
    .unwrap();

    let encoded = encode_font(&datafile).unwrap();
    assert_eq!(encoded.glyphs[0], vec![4, 2]);
    assert_round_trips(&datafile);
}

#[test]
fn ref_entry_falls_back_to_literals() {
    let fontinfo = FontInfo {
        max_width: 8,
        max_height: 1,
    };
    let datafile = DataFile::new(
        fontinfo,
        vec![glyph("11000000", 8, &[33])],
        vec![entry("1", false), entry("11", true)],
        1,
    )
    .unwrap();

    let encoded = encode_font(&datafile).unwrap();
    assert_eq!(encoded.ref_dictionary[0], vec![1, 1]);
    assert_round_trips(&datafile);
}

#[test]
fn ref_entries_never_reference_ref_entries() {
    let mut datafile = sample_font();
    init_dictionary(&mut datafile);
    // Force a spread of ref entries into the dictionary.
    for index in (0..DICTIONARY_SIZE).step_by(3) {
        let mut entry = datafile.dictionary_entry(index).clone();
        entry.ref_encode = true;
        datafile.set_dictionary_entry(index, entry);
    }

    let encoded = encode_font(&datafile).unwrap();
    let rle_end = 4 + encoded.rle_dictionary.len() as u8;
    for refstring in &encoded.ref_dictionary {
        for &code in refstring {
            assert!(
                code <= 1 || (4..rle_end).contains(&code),
                "ref dictionary entry contains code {code}"
            );
        }
    }
    assert_round_trips(&datafile);
}

#[test]
fn every_glyph_round_trips_after_optimization() {
    let mut datafile = sample_font();
    init_dictionary(&mut datafile);
    optimize(&mut datafile, 30).unwrap();
    assert_round_trips(&datafile);
}

#[test]
fn ref_dictionary_entries_decode_to_their_replacement() {
    let mut datafile = sample_font();
    init_dictionary(&mut datafile);
    optimize(&mut datafile, 30).unwrap();

    let encoded = encode_font(&datafile).unwrap();
    let mut sorted: Vec<DictEntry> = datafile.dictionary().to_vec();
    sorted.sort_by_key(|entry| (entry.replacement.is_empty(), entry.ref_encode));
    let ref_entries: Vec<&DictEntry> = sorted
        .iter()
        .filter(|entry| !entry.replacement.is_empty() && entry.ref_encode)
        .collect();

    assert_eq!(ref_entries.len(), encoded.ref_dictionary.len());
    for (entry, refstring) in ref_entries.iter().zip(&encoded.ref_dictionary) {
        let decoded = decode_refstring(&encoded, refstring, datafile.fontinfo());
        assert_eq!(decoded, entry.replacement);
    }
}

#[test]
fn optimizer_is_monotone() {
    let mut datafile = sample_font();
    init_dictionary(&mut datafile);

    let mut size = encoded_size(&datafile).unwrap();
    for _ in 0..5 {
        optimize(&mut datafile, 10).unwrap();
        let new_size = encoded_size(&datafile).unwrap();
        assert!(new_size <= size);
        size = new_size;
    }
}

#[test]
fn identical_seeds_produce_identical_runs() {
    let mut first = sample_font();
    let mut second = sample_font();

    init_dictionary(&mut first);
    init_dictionary(&mut second);
    assert_eq!(first, second);

    optimize(&mut first, 40).unwrap();
    optimize(&mut second, 40).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        encode_font(&first).unwrap(),
        encode_font(&second).unwrap()
    );
}

#[test]
fn encoded_font_is_deterministic() {
    let mut datafile = sample_font();
    init_dictionary(&mut datafile);

    let first = encode_font(&datafile).unwrap();
    let second = encode_font(&datafile).unwrap();
    assert_eq!(first, second);
    assert_eq!(get_encoded_size(&first), get_encoded_size(&second));
}

#[test]
fn optimized_datafile_survives_json() {
    let mut datafile = sample_font();
    init_dictionary(&mut datafile);
    optimize(&mut datafile, 10).unwrap();

    let reloaded = DataFile::from_json(&datafile.to_json()).unwrap();
    assert_eq!(datafile, reloaded);
    assert_eq!(
        encode_font(&datafile).unwrap(),
        encode_font(&reloaded).unwrap()
    );
}
