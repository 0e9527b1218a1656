//! MARC record leader parsing and manipulation.
//!
//! The MARC leader is a 24-byte fixed-length field at the start of every MARC record.
//! It contains metadata describing the record's structure, content type, and encoding.
//!
//! # Structure
//!
//! - Positions 0-4: Record length (5 digits)
//! - Position 5: Record status
//! - Position 6: Record type (a = language material, c = music, etc.)
//! - Position 7: Bibliographic level (m = monograph, s = serial, etc.)
//! - Position 8: Control record type
//! - Position 9: Character coding (space = MARC-8, a = UTF-8)
//! - Position 10: Indicator count (usually 2)
//! - Position 11: Subfield code count (usually 2)
//! - Positions 12-16: Base address of data (5 digits)
//! - Positions 17-19: Encoding level, cataloging form, multipart level
//! - Positions 20-23: Reserved (usually "4500")

use crate::error::{MarcError, Result};
use serde::{Deserialize, Serialize};

/// Length of a MARC leader in bytes. Always exactly this size on the wire.
pub const LEADER_LEN: usize = 24;

/// MARC Leader - 24 bytes at the start of every MARC record.
///
/// Contains metadata about the record structure and content.
/// All MARC records must begin with exactly 24 bytes of leader information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leader {
    /// Record length (5 digits) - positions 0-4
    pub record_length: u32,
    /// Record status (1 char) - position 5
    pub record_status: char,
    /// Type of record (1 char) - position 6
    pub record_type: char,
    /// Bibliographic level (1 char) - position 7
    pub bibliographic_level: char,
    /// Type of control record (1 char) - position 8
    pub control_record_type: char,
    /// Character coding scheme (1 char) - position 9: `' '` for MARC-8, `'a'` for UTF-8.
    pub character_coding: char,
    /// Indicator count (1 digit) - position 10 (always 2)
    pub indicator_count: u8,
    /// Subfield code count (1 digit) - position 11 (always 2)
    pub subfield_code_count: u8,
    /// Base address of data (5 digits) - positions 12-16
    pub data_base_address: u32,
    /// Encoding level (1 char) - position 17
    pub encoding_level: char,
    /// Cataloging form (1 char) - position 18
    pub cataloging_form: char,
    /// Multipart resource record level (1 char) - position 19
    pub multipart_level: char,
    /// Entry map (4 chars) - positions 20-23, always "4500"
    pub reserved: String,
}

impl Default for Leader {
    /// A synthetic leader for a freshly-created, empty record.
    ///
    /// Forces the fixed positions (10-11, 20-23) the same way a lenient
    /// construction from a partial leader would.
    fn default() -> Self {
        Leader {
            record_length: 0,
            record_status: 'n',
            record_type: 'a',
            bibliographic_level: 'm',
            control_record_type: ' ',
            character_coding: ' ',
            indicator_count: 2,
            subfield_code_count: 2,
            data_base_address: 0,
            encoding_level: ' ',
            cataloging_form: ' ',
            multipart_level: ' ',
            reserved: "4500".to_string(),
        }
    }
}

impl Leader {
    /// Build a leader from a byte slice, padding or forcing the structural
    /// invariants rather than failing.
    ///
    /// Bytes beyond the first 24 are ignored; a shorter slice is padded with
    /// spaces. Positions 10-11 and 20-23 are always forced to `"22"` and
    /// `"4500"` regardless of what the input contains, since those positions
    /// carry no information in MARC 21 records.
    #[must_use]
    pub fn from_partial_bytes(bytes: &[u8]) -> Self {
        let mut padded = [b' '; LEADER_LEN];
        let take = bytes.len().min(LEADER_LEN);
        padded[..take].copy_from_slice(&bytes[..take]);

        let mut leader = Self::from_bytes(&padded).unwrap_or_default();
        leader.indicator_count = 2;
        leader.subfield_code_count = 2;
        leader.reserved = "4500".to_string();
        leader
    }

    /// Parse a strict 24-byte leader.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::RecordLeaderInvalid`] if `bytes` is shorter than
    /// [`LEADER_LEN`] or contains a non-decimal digit count field.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < LEADER_LEN {
            return Err(MarcError::RecordLeaderInvalid(format!(
                "leader must be at least {LEADER_LEN} bytes, got {}",
                bytes.len()
            )));
        }

        let record_length = parse_digits(&bytes[0..5])?;
        let record_status = bytes[5] as char;
        let record_type = bytes[6] as char;
        let bibliographic_level = bytes[7] as char;
        let control_record_type = bytes[8] as char;
        let character_coding = bytes[9] as char;

        let indicator_count = u8::try_from((bytes[10] as char).to_digit(10).ok_or_else(|| {
            MarcError::RecordLeaderInvalid(format!(
                "invalid indicator count at position 10: {:?}",
                bytes[10] as char
            ))
        })?)
        .map_err(|_| MarcError::RecordLeaderInvalid("indicator count out of range".to_string()))?;

        let subfield_code_count =
            u8::try_from((bytes[11] as char).to_digit(10).ok_or_else(|| {
                MarcError::RecordLeaderInvalid(format!(
                    "invalid subfield code count at position 11: {:?}",
                    bytes[11] as char
                ))
            })?)
            .map_err(|_| {
                MarcError::RecordLeaderInvalid("subfield code count out of range".to_string())
            })?;

        let data_base_address = parse_digits(&bytes[12..17])?;
        let encoding_level = bytes[17] as char;
        let cataloging_form = bytes[18] as char;
        let multipart_level = bytes[19] as char;
        let reserved = String::from_utf8_lossy(&bytes[20..24]).to_string();

        Ok(Leader {
            record_length,
            record_status,
            record_type,
            bibliographic_level,
            control_record_type,
            character_coding,
            indicator_count,
            subfield_code_count,
            data_base_address,
            encoding_level,
            cataloging_form,
            multipart_level,
            reserved,
        })
    }

    /// Validate that the leader is suitable for binary record reading.
    ///
    /// Checks that `record_length` is at least 24 and `data_base_address` is
    /// strictly greater than 24 (the directory needs at least one terminator
    /// byte after the leader), which is required before performing
    /// arithmetic on these fields during binary ISO 2709 parsing.
    ///
    /// # Errors
    ///
    /// Returns an error if `record_length` is less than 24, or
    /// `data_base_address` is not greater than 24.
    pub fn validate_for_reading(&self) -> Result<()> {
        if self.record_length < LEADER_LEN as u32 {
            return Err(MarcError::RecordLeaderInvalid(format!(
                "record length must be at least {LEADER_LEN}, got {}",
                self.record_length
            )));
        }
        if self.data_base_address <= LEADER_LEN as u32 {
            return Err(MarcError::RecordLeaderInvalid(format!(
                "base address of data must be greater than {LEADER_LEN}, got {}",
                self.data_base_address
            )));
        }
        Ok(())
    }

    /// Serialize leader to its 24-byte wire representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the reserved field is not exactly 4 bytes.
    pub fn as_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(LEADER_LEN);

        bytes.extend_from_slice(format!("{:05}", self.record_length).as_bytes());
        bytes.push(self.record_status as u8);
        bytes.push(self.record_type as u8);
        bytes.push(self.bibliographic_level as u8);
        bytes.push(self.control_record_type as u8);
        bytes.push(self.character_coding as u8);
        bytes.push(b'0' + self.indicator_count);
        bytes.push(b'0' + self.subfield_code_count);

        bytes.extend_from_slice(format!("{:05}", self.data_base_address).as_bytes());
        bytes.push(self.encoding_level as u8);
        bytes.push(self.cataloging_form as u8);
        bytes.push(self.multipart_level as u8);

        let reserved_bytes = self.reserved.as_bytes();
        if reserved_bytes.len() != 4 {
            return Err(MarcError::RecordLeaderInvalid(format!(
                "reserved field must be 4 characters, got {}",
                reserved_bytes.len()
            )));
        }
        bytes.extend_from_slice(reserved_bytes);

        Ok(bytes)
    }
}

/// Parse a 5-digit ASCII number from bytes.
fn parse_digits(bytes: &[u8]) -> Result<u32> {
    if bytes.len() != 5 {
        return Err(MarcError::RecordLeaderInvalid(format!(
            "expected 5-digit field, got {} bytes",
            bytes.len()
        )));
    }

    let s = String::from_utf8_lossy(bytes);
    s.parse::<u32>()
        .map_err(|_| MarcError::RecordLeaderInvalid(format!("invalid numeric field: '{s}'")))
}
