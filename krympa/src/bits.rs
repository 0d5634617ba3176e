//! Sequences of monochrome pixels.

use std::fmt;
use std::ops::{Deref, Range};
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// An ordered sequence of pixels; `true` is foreground.
///
/// Glyph bitmaps and dictionary replacements are both bitstrings. The text
/// form is a run of `'0'`/`'1'` characters, which is also how bitstrings are
/// stored in datafiles.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Bitstring {
    bits: Vec<bool>,
}

impl Bitstring {
    pub fn new() -> Bitstring {
        Bitstring::default()
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.bits
    }

    pub fn push(&mut self, bit: bool) {
        self.bits.push(bit);
    }

    pub fn prepend(&mut self, bit: bool) {
        self.bits.insert(0, bit);
    }

    /// Appends all bits of `other`.
    pub fn extend_from(&mut self, other: &Bitstring) {
        self.bits.extend_from_slice(&other.bits);
    }

    /// Removes the bits in `range`, shifting the tail down.
    pub fn erase(&mut self, range: Range<usize>) {
        self.bits.drain(range);
    }

    pub fn clear(&mut self) {
        self.bits.clear();
    }

    /// Copies out the `len` bits starting at `start`.
    pub fn substring(&self, start: usize, len: usize) -> Bitstring {
        Bitstring {
            bits: self.bits[start..start + len].to_vec(),
        }
    }
}

impl From<Vec<bool>> for Bitstring {
    fn from(bits: Vec<bool>) -> Bitstring {
        Bitstring { bits }
    }
}

impl Deref for Bitstring {
    type Target = [bool];

    fn deref(&self) -> &[bool] {
        &self.bits
    }
}

impl fmt::Display for Bitstring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.bits {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl fmt::Debug for Bitstring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bitstring(\"{self}\")")
    }
}

impl FromStr for Bitstring {
    type Err = Error;

    fn from_str(s: &str) -> Result<Bitstring, Error> {
        let mut bits = Vec::with_capacity(s.len());
        for c in s.chars() {
            match c {
                '0' => bits.push(false),
                '1' => bits.push(true),
                _ => return Err(Error::InvalidBitChar(c)),
            }
        }
        Ok(Bitstring { bits })
    }
}

impl Serialize for Bitstring {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Bitstring {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Bitstring, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_and_display() {
        let bits: Bitstring = "0110".parse().unwrap();
        assert_eq!(bits.as_slice(), &[false, true, true, false]);
        assert_eq!(bits.to_string(), "0110");

        assert!("01x0".parse::<Bitstring>().is_err());
        assert!("".parse::<Bitstring>().unwrap().is_empty());
    }

    #[test]
    fn edit_ops() {
        let mut bits: Bitstring = "0110".parse().unwrap();
        bits.push(true);
        bits.prepend(true);
        assert_eq!(bits.to_string(), "101101");

        bits.erase(1..3);
        assert_eq!(bits.to_string(), "1101");

        let other: Bitstring = "00".parse().unwrap();
        bits.extend_from(&other);
        assert_eq!(bits.to_string(), "110100");

        assert_eq!(bits.substring(1, 3).to_string(), "101");
    }

    #[test]
    fn json_round_trip() {
        let bits: Bitstring = "10010".parse().unwrap();
        let json = serde_json::to_string(&bits).unwrap();
        assert_eq!(json, "\"10010\"");
        let back: Bitstring = serde_json::from_str(&json).unwrap();
        assert_eq!(bits, back);

        assert!(serde_json::from_str::<Bitstring>("\"012\"").is_err());
    }
}
