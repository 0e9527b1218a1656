//! MARC fields and subfields.
//!
//! A field is either a *control field* (tag below `"010"`, a single opaque
//! value with no indicators or subfields) or a *data field* (two indicators
//! plus an ordered list of subfields). Both are modeled as one generic type
//! parameterized over the subfield/data value representation: `String` for
//! text that has already been translated out of MARC-8/UTF-8, or `Vec<u8>`
//! for the untranslated bytes a caller asked to keep raw. This mirrors the
//! leader/record split between [`crate::record::Record`] and
//! [`crate::record::RawRecord`] — one generic skeleton, two value types,
//! rather than two independently-maintained structs with duplicated logic.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::codec::{Codepage, Utf8Handling};
use crate::error::{MarcError, Result};
use crate::marc8;

/// A single `(code, value)` pair inside a data field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subfield<V = String> {
    /// The one-character subfield code (the byte after `0x1F`).
    pub code: char,
    /// The subfield's value, in whatever representation `V` is.
    pub value: V,
}

impl<V> Subfield<V> {
    /// Build a new subfield.
    pub fn new(code: char, value: impl Into<V>) -> Self {
        Subfield {
            code,
            value: value.into(),
        }
    }
}

/// A small-vector bound matching the common case of a handful of subfields
/// per field; most MARC data fields carry well under eight.
pub type SubfieldList<V> = SmallVec<[Subfield<V>; 4]>;

/// A MARC field: either a control field or a data field.
///
/// `V` is `String` for a decoded [`crate::record::Record`] and `Vec<u8>`
/// for a raw [`crate::record::RawRecord`] produced with `to_unicode: false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Field<V = String> {
    /// A control field (tag `000`-`009`): opaque data, no structure.
    Control {
        /// The three-character tag.
        tag: String,
        /// The field's opaque value.
        data: V,
    },
    /// A data field: two indicators plus an ordered subfield list.
    Data {
        /// The three-character tag.
        tag: String,
        /// First indicator.
        ind1: char,
        /// Second indicator.
        ind2: char,
        /// Subfields in stored order; duplicate codes are permitted.
        subfields: SubfieldList<V>,
    },
}

impl<V> Field<V> {
    /// Construct a control field.
    pub fn new_control(tag: impl Into<String>, data: impl Into<V>) -> Self {
        Field::Control {
            tag: tag.into(),
            data: data.into(),
        }
    }

    /// Construct a data field from an indicator pair and subfield list.
    pub fn new_data(
        tag: impl Into<String>,
        ind1: char,
        ind2: char,
        subfields: impl IntoIterator<Item = Subfield<V>>,
    ) -> Self {
        Field::Data {
            tag: tag.into(),
            ind1,
            ind2,
            subfields: subfields.into_iter().collect(),
        }
    }

    /// The field's tag, regardless of variant.
    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            Field::Control { tag, .. } | Field::Data { tag, .. } => tag,
        }
    }

    /// Whether this is a control field (tag `< "010"`, numeric).
    #[must_use]
    pub fn is_control(&self) -> bool {
        matches!(self, Field::Control { .. })
    }

    /// The value of the first subfield with the given code, if present.
    /// Returns `None` for control fields.
    #[must_use]
    pub fn subfield(&self, code: char) -> Option<&V> {
        match self {
            Field::Control { .. } => None,
            Field::Data { subfields, .. } => subfields
                .iter()
                .find(|sf| sf.code == code)
                .map(|sf| &sf.value),
        }
    }

    /// Iterate over all `(code, value)` pairs in stored order. Empty for
    /// control fields.
    pub fn subfields(&self) -> impl Iterator<Item = (char, &V)> {
        let slice: &[Subfield<V>] = match self {
            Field::Control { .. } => &[],
            Field::Data { subfields, .. } => subfields.as_slice(),
        };
        slice.iter().map(|sf| (sf.code, &sf.value))
    }
}

impl Field<String> {
    /// All subfield values concatenated with single spaces, in stored order.
    /// Used by higher-level cataloging helpers outside this crate's scope;
    /// kept here because it operates purely on the structural model.
    #[must_use]
    pub fn format(&self) -> String {
        match self {
            Field::Control { data, .. } => data.clone(),
            Field::Data { subfields, .. } => subfields
                .iter()
                .map(|sf| sf.value.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    /// Serialize this field to its MARC 21 byte representation, ending in
    /// `END_OF_FIELD`.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::EncodingError`] if a value cannot be represented
    /// under `codepage` with the given `utf8_handling` policy.
    pub fn as_marc(&self, codepage: Codepage, utf8_handling: Utf8Handling) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        match self {
            Field::Control { data, .. } => {
                out.extend(encode_value(data, codepage, utf8_handling)?);
            }
            Field::Data {
                ind1,
                ind2,
                subfields,
                ..
            } => {
                out.push(*ind1 as u8);
                out.push(*ind2 as u8);
                for sf in subfields {
                    out.push(crate::codec::SUBFIELD_INDICATOR);
                    out.push(sf.code as u8);
                    out.extend(encode_value(&sf.value, codepage, utf8_handling)?);
                }
            }
        }
        out.push(crate::codec::END_OF_FIELD);
        Ok(out)
    }
}

/// Encode a single text value under the record's chosen output codepage.
///
/// Per the record codec's encode algorithm, this never re-derives MARC-8:
/// UTF-8 records re-encode as UTF-8; everything else is emitted as
/// ISO-8859-1, on the assumption that values not already round-tripped
/// through the MARC-8 decoder are already single-byte text.
fn encode_value(value: &str, codepage: Codepage, utf8_handling: Utf8Handling) -> Result<Vec<u8>> {
    match codepage {
        Codepage::Utf8 => Ok(value.as_bytes().to_vec()),
        Codepage::Iso8859_1 => value
            .chars()
            .filter_map(|c| {
                if (c as u32) <= 0xFF {
                    Some(Ok(c as u8))
                } else {
                    match utf8_handling {
                        Utf8Handling::Strict => Some(Err(MarcError::EncodingError(format!(
                            "character {c:?} has no ISO-8859-1 representation"
                        )))),
                        Utf8Handling::Replace => Some(Ok(b'?')),
                        // Dropped entirely: no sentinel byte is emitted, so a
                        // literal NUL in the input is never mistaken for one.
                        Utf8Handling::Ignore => None,
                    }
                }
            })
            .collect(),
    }
}

impl Field<Vec<u8>> {
    /// Decode this raw field into a text field, returning any warnings
    /// alongside the value.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::EncodingError`] if `utf8_handling` is
    /// [`Utf8Handling::Strict`] and a value is not valid UTF-8. MARC-8
    /// decoding never fails; unmapped codes become warnings instead.
    pub fn decode(
        &self,
        codepage: Codepage,
        utf8_handling: Utf8Handling,
    ) -> Result<(Field<String>, Vec<crate::diagnostics::Warning>)> {
        let mut warnings = Vec::new();
        let field = match self {
            Field::Control { tag, data } => {
                let (text, w) = decode_value(data, codepage, utf8_handling)?;
                warnings.extend(w);
                Field::Control {
                    tag: tag.clone(),
                    data: text,
                }
            }
            Field::Data {
                tag,
                ind1,
                ind2,
                subfields,
            } => {
                let mut decoded = SubfieldList::<String>::new();
                for sf in subfields {
                    let (text, w) = decode_value(&sf.value, codepage, utf8_handling)?;
                    warnings.extend(w);
                    decoded.push(Subfield::new(sf.code, text));
                }
                Field::Data {
                    tag: tag.clone(),
                    ind1: *ind1,
                    ind2: *ind2,
                    subfields: decoded,
                }
            }
        };
        Ok((field, warnings))
    }
}

fn decode_value(
    bytes: &[u8],
    codepage: Codepage,
    utf8_handling: Utf8Handling,
) -> Result<(String, Vec<crate::diagnostics::Warning>)> {
    match codepage {
        Codepage::Utf8 => {
            let text = match utf8_handling {
                Utf8Handling::Strict => std::str::from_utf8(bytes)
                    .map(str::to_owned)
                    .map_err(|e| MarcError::EncodingError(format!("invalid UTF-8: {e}")))?,
                Utf8Handling::Replace => String::from_utf8_lossy(bytes).into_owned(),
                Utf8Handling::Ignore => String::from_utf8_lossy(bytes)
                    .chars()
                    .filter(|c| *c != '\u{FFFD}')
                    .collect(),
            };
            Ok((text, Vec::new()))
        }
        Codepage::Iso8859_1 => Ok(marc8::decode(bytes)),
    }
}
