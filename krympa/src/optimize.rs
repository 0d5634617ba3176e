//! Randomized local search for a dictionary that minimizes encoded size.
//!
//! Every move follows the same shape: clone the datafile, mutate one or two
//! dictionary slots, re-encode, and commit only if the font got strictly
//! smaller. Failed moves are silently discarded. Committed moves are logged
//! at debug level, so `RUST_LOG=krympa=debug` acts as the verbose mode.

use fnv::FnvHashSet;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::bits::Bitstring;
use crate::datafile::{DataFile, DictEntry, DICTIONARY_SIZE};
use crate::encode::encoded_size;
use crate::error::Result;

/// Copies a uniformly random slice out of a uniformly random glyph.
///
/// Length is drawn from `2..=glyph_bits`, then a start position that keeps
/// the slice in bounds. Candidate replacements all come from here, so the
/// dictionary can only ever contain pixel runs that actually occur.
fn random_substring(datafile: &DataFile, rng: &mut ChaCha8Rng) -> Bitstring {
    let index = rng.gen_range(0..datafile.glyph_count());
    let bits = &datafile.glyph(index).data;

    let length = rng.gen_range(2..=bits.len());
    let start = rng.gen_range(0..=bits.len() - length);
    bits.substring(start, length)
}

/// Replaces the lowest-scoring entry with a fresh random substring.
fn optimize_worst(datafile: &mut DataFile, size: &mut usize, rng: &mut ChaCha8Rng) -> Result<()> {
    let mut trial = datafile.clone();
    let worst = trial.low_score_index();
    let mut entry = trial.dictionary_entry(worst).clone();
    entry.replacement = random_substring(datafile, rng);
    trial.set_dictionary_entry(worst, entry.clone());

    let new_size = encoded_size(&trial)?;
    if new_size < *size {
        entry.score = (*size - new_size) as i32;
        log::debug!("optimize_worst: replaced {worst}, score {}", entry.score);
        datafile.set_dictionary_entry(worst, entry);
        *size = new_size;
    }
    Ok(())
}

/// Replaces a uniformly random entry with a fresh random substring.
fn optimize_any(datafile: &mut DataFile, size: &mut usize, rng: &mut ChaCha8Rng) -> Result<()> {
    let mut trial = datafile.clone();
    let index = rng.gen_range(0..DICTIONARY_SIZE);
    let mut entry = trial.dictionary_entry(index).clone();
    entry.replacement = random_substring(datafile, rng);
    trial.set_dictionary_entry(index, entry.clone());

    let new_size = encoded_size(&trial)?;
    if new_size < *size {
        entry.score = (*size - new_size) as i32;
        log::debug!("optimize_any: replaced {index}, score {}", entry.score);
        datafile.set_dictionary_entry(index, entry);
        *size = new_size;
    }
    Ok(())
}

/// Grows a random entry by 1..=10 random bits, each prepended or appended.
fn optimize_expand(datafile: &mut DataFile, size: &mut usize, rng: &mut ChaCha8Rng) -> Result<()> {
    let mut trial = datafile.clone();
    let index = rng.gen_range(0..DICTIONARY_SIZE);
    let mut entry = trial.dictionary_entry(index).clone();

    let count = rng.gen_range(1..=10);
    for _ in 0..count {
        let bit = rng.gen::<bool>();
        if rng.gen::<bool>() {
            entry.replacement.prepend(bit);
        } else {
            entry.replacement.push(bit);
        }
    }
    trial.set_dictionary_entry(index, entry.clone());

    let new_size = encoded_size(&trial)?;
    if new_size < *size {
        entry.score = (*size - new_size) as i32;
        log::debug!(
            "optimize_expand: expanded {index} by {count} bits, score {}",
            entry.score
        );
        datafile.set_dictionary_entry(index, entry);
        *size = new_size;
    }
    Ok(())
}

/// Cuts up to `min(len/2, 5)` bits off each end of a random entry.
///
/// The end-side cut stops one bit short, so the final bit of the
/// replacement always survives. Entries of two bits or fewer are left
/// alone.
fn optimize_trim(datafile: &mut DataFile, size: &mut usize, rng: &mut ChaCha8Rng) -> Result<()> {
    let mut trial = datafile.clone();
    let index = rng.gen_range(0..DICTIONARY_SIZE);
    let mut entry = trial.dictionary_entry(index).clone();

    if entry.replacement.len() <= 2 {
        return Ok(());
    }

    let limit = (entry.replacement.len() / 2).min(5);
    let start = rng.gen_range(0..=limit);
    let end = rng.gen_range(0..=limit);

    if start > 0 {
        entry.replacement.erase(0..start);
    }
    if end > 0 {
        let len = entry.replacement.len();
        entry.replacement.erase(len - end..len - 1);
    }
    trial.set_dictionary_entry(index, entry.clone());

    let new_size = encoded_size(&trial)?;
    if new_size < *size {
        entry.score = (*size - new_size) as i32;
        log::debug!(
            "optimize_trim: trimmed {index} by {start}+{end} bits, score {}",
            entry.score
        );
        datafile.set_dictionary_entry(index, entry);
        *size = new_size;
    }
    Ok(())
}

/// Flips a random entry between RLE and ref encoding.
fn optimize_refdict(datafile: &mut DataFile, size: &mut usize, rng: &mut ChaCha8Rng) -> Result<()> {
    let mut trial = datafile.clone();
    let index = rng.gen_range(0..DICTIONARY_SIZE);
    let mut entry = trial.dictionary_entry(index).clone();
    entry.ref_encode = !entry.ref_encode;
    trial.set_dictionary_entry(index, entry.clone());

    let new_size = encoded_size(&trial)?;
    if new_size < *size {
        entry.score = (*size - new_size) as i32;
        log::debug!(
            "optimize_refdict: switched {index} to {}, score {}",
            if entry.ref_encode { "ref" } else { "RLE" },
            entry.score
        );
        datafile.set_dictionary_entry(index, entry);
        *size = new_size;
    }
    Ok(())
}

/// Concatenates two random entries into the lowest-scoring slot as a
/// ref-encoded entry.
fn optimize_combine(datafile: &mut DataFile, size: &mut usize, rng: &mut ChaCha8Rng) -> Result<()> {
    let mut trial = datafile.clone();
    let worst = datafile.low_score_index();
    let first = rng.gen_range(0..DICTIONARY_SIZE);
    let second = rng.gen_range(0..DICTIONARY_SIZE);

    let mut replacement = datafile.dictionary_entry(first).replacement.clone();
    replacement.extend_from(&datafile.dictionary_entry(second).replacement);
    let mut entry = DictEntry {
        replacement,
        ref_encode: true,
        score: 0,
    };
    trial.set_dictionary_entry(worst, entry.clone());

    let new_size = encoded_size(&trial)?;
    if new_size < *size {
        entry.score = (*size - new_size) as i32;
        log::debug!(
            "optimize_combine: combined {first} and {second} into {worst}, score {}",
            entry.score
        );
        datafile.set_dictionary_entry(worst, entry);
        *size = new_size;
    }
    Ok(())
}

/// Clears 1..=20 random entries, then lets the cheaper operators rebuild
/// the dictionary for 25 rounds. The whole result is swapped in only if it
/// beats the original, so this can escape local minima the single-slot
/// moves are stuck in.
fn bigjump(datafile: &mut DataFile, size: &mut usize, rng: &mut ChaCha8Rng) -> Result<()> {
    let mut trial = datafile.clone();
    let drop_count = rng.gen_range(1..=20);
    for _ in 0..drop_count {
        let index = rng.gen_range(0..DICTIONARY_SIZE);
        let mut entry = trial.dictionary_entry(index).clone();
        entry.replacement.clear();
        entry.score = 0;
        trial.set_dictionary_entry(index, entry);
    }

    let mut new_size = encoded_size(&trial)?;
    for _ in 0..25 {
        optimize_worst(&mut trial, &mut new_size, rng)?;
        optimize_any(&mut trial, &mut new_size, rng)?;
        optimize_expand(&mut trial, &mut new_size, rng)?;
        optimize_refdict(&mut trial, &mut new_size, rng)?;
        optimize_combine(&mut trial, &mut new_size, rng)?;
    }

    if new_size < *size {
        log::debug!(
            "optimize_bigjump: rebuilt {drop_count} entries, score {}",
            *size - new_size
        );
        *datafile = trial;
        *size = new_size;
    }
    Ok(())
}

/// Re-measures what every entry is worth and drops the freeloaders.
///
/// Each slot is cleared in a trial encode; the size growth becomes the
/// entry's score. Entries whose removal does not grow the font are cleared
/// for good.
fn update_scores(datafile: &mut DataFile) -> Result<()> {
    let old_size = encoded_size(datafile)?;

    for index in 0..DICTIONARY_SIZE {
        let mut trial = datafile.clone();
        trial.set_dictionary_entry(index, DictEntry::default());
        let new_size = encoded_size(&trial)?;

        let score = new_size as i32 - old_size as i32;
        if score > 0 {
            let mut entry = datafile.dictionary_entry(index).clone();
            entry.score = score;
            datafile.set_dictionary_entry(index, entry);
        } else {
            if !datafile.dictionary_entry(index).replacement.is_empty() {
                log::debug!("update_scores: dropped {index}, score {}", -score);
            }
            datafile.set_dictionary_entry(index, DictEntry::default());
        }
    }
    Ok(())
}

/// Seeds every dictionary slot with a substring that occurs at least twice.
///
/// Substrings are sampled at random; the first sighting only records them,
/// the second installs them. Repeated substructure is exactly what the
/// dictionary is for, so this starts the search well away from noise.
pub fn init_dictionary(datafile: &mut DataFile) {
    let mut rng = ChaCha8Rng::seed_from_u64(u64::from(datafile.seed()));

    let mut seen = FnvHashSet::default();
    let mut added = FnvHashSet::default();

    let mut index = 0;
    while index < DICTIONARY_SIZE {
        let substring = random_substring(datafile, &mut rng);
        if !seen.contains(&substring) {
            seen.insert(substring);
        } else if !added.contains(&substring) {
            datafile.set_dictionary_entry(
                index,
                DictEntry {
                    replacement: substring.clone(),
                    ref_encode: false,
                    score: 0,
                },
            );
            index += 1;
            added.insert(substring);
        }
    }
}

/// Runs `iterations` rounds of the mutation operators.
///
/// The run is fully determined by the datafile's seed. Afterwards a fresh
/// seed is stored back, so optimizing the same file again continues along a
/// new trajectory instead of repeating the old one.
pub fn optimize(datafile: &mut DataFile, iterations: usize) -> Result<()> {
    let mut rng = ChaCha8Rng::seed_from_u64(u64::from(datafile.seed()));

    update_scores(datafile)?;
    let mut size = encoded_size(datafile)?;
    log::trace!(
        "optimizing {} glyphs over {iterations} iterations, starting at {size} bytes",
        datafile.glyph_count()
    );

    for _ in 0..iterations {
        optimize_worst(datafile, &mut size, &mut rng)?;
        optimize_any(datafile, &mut size, &mut rng)?;
        optimize_expand(datafile, &mut size, &mut rng)?;
        optimize_trim(datafile, &mut size, &mut rng)?;
        optimize_refdict(datafile, &mut size, &mut rng)?;
        optimize_combine(datafile, &mut size, &mut rng)?;
    }

    log::trace!("finished at {size} bytes");
    datafile.set_seed(rng.gen());
    Ok(())
}

/// One escape attempt: clear a batch of entries and rebuild (see
/// [`bigjump`]). Not part of the regular rotation; run it between
/// [`optimize`] calls when the search has flattened out.
pub fn optimize_bigjump(datafile: &mut DataFile) -> Result<()> {
    let mut rng = ChaCha8Rng::seed_from_u64(u64::from(datafile.seed()));
    let mut size = encoded_size(datafile)?;

    bigjump(datafile, &mut size, &mut rng)?;

    datafile.set_seed(rng.gen());
    Ok(())
}
