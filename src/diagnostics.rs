//! Non-fatal diagnostics emitted while decoding.
//!
//! Decoding a record in the wild routinely encounters small, recoverable
//! anomalies: missing indicators, a stray non-ASCII subfield code, a MARC-8
//! byte with no mapping. None of these should fail the decode. Instead they
//! are collected into a plain `Vec<Warning>` returned alongside the decoded
//! value as a structured enum rather than free-text strings, so callers can
//! match on the kind of anomaly instead of scraping messages.

/// A single non-fatal anomaly observed while decoding a record or field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A subfield's leading byte was not ASCII; it was normalized via NFKD
    /// and the first resulting ASCII letter was used as the subfield code.
    BadSubfieldCode {
        /// The field tag the subfield belongs to.
        tag: String,
        /// The code substituted after normalization.
        normalized_to: char,
    },
    /// A data field's indicator bytes did not number exactly two.
    IndicatorCountMismatch {
        /// The field tag.
        tag: String,
        /// The number of indicator bytes actually found before repair.
        found: usize,
    },
    /// A MARC-8 byte (or byte pair, for EACC) had no entry in the active
    /// character set's translation table.
    UnmappedMarc8Code {
        /// The designated character set the byte was read against.
        set: String,
        /// The unmapped code point within that set.
        code: u32,
    },
    /// An `ESC` byte was not followed by a recognized designator sequence.
    MalformedEscape {
        /// The bytes following `ESC` that could not be interpreted.
        bytes: Vec<u8>,
    },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::BadSubfieldCode { tag, normalized_to } => write!(
                f,
                "field {tag}: non-ASCII subfield code normalized to '{normalized_to}'"
            ),
            Warning::IndicatorCountMismatch { tag, found } => {
                write!(f, "field {tag}: expected 2 indicator bytes, found {found}")
            }
            Warning::UnmappedMarc8Code { set, code } => {
                write!(f, "no MARC-8 mapping for code {code:#x} in set {set}")
            }
            Warning::MalformedEscape { bytes } => {
                write!(f, "malformed MARC-8 escape sequence: {bytes:?}")
            }
        }
    }
}

/// A decoded value paired with the warnings collected while producing it.
///
/// This is the diagnostic channel mentioned throughout the codec: rather
/// than routing anomalies through a global logger, `decode` returns one of
/// these so the caller decides whether to inspect, log, or ignore them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded<T> {
    /// The successfully decoded value.
    pub value: T,
    /// Warnings accumulated while decoding it, in the order encountered.
    pub warnings: Vec<Warning>,
}

impl<T> Decoded<T> {
    /// Wrap a value with an empty warning list.
    #[must_use]
    pub fn clean(value: T) -> Self {
        Decoded {
            value,
            warnings: Vec::new(),
        }
    }
}
