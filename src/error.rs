//! Error types for MARC operations.
//!
//! This module provides the [`MarcError`] type for all MARC library operations
//! and the [`Result`] convenience type. Every variant matches a failure mode
//! named in the record codec's decode/encode algorithms; none of them are
//! triggered by cataloging semantics, which this crate does not validate.

use thiserror::Error;

/// Error type for all MARC library operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarcError {
    /// The leader slice is shorter than 24 bytes, or a structural position
    /// (indicator count, subfield code count) holds a non-digit byte.
    #[error("invalid record leader: {0}")]
    RecordLeaderInvalid(String),

    /// Leader bytes 12-16 parsed to zero.
    #[error("base address of data not found in leader")]
    BaseAddressNotFound,

    /// The declared base address falls beyond the end of the buffer.
    #[error("base address {base_address} is beyond the end of a {buffer_len}-byte buffer")]
    BaseAddressInvalid {
        /// The base address read from the leader.
        base_address: usize,
        /// The actual length of the supplied buffer.
        buffer_len: usize,
    },

    /// The buffer is shorter than the length declared in the leader.
    #[error("record declares length {declared} but buffer is only {actual} bytes")]
    TruncatedRecord {
        /// Length declared in leader bytes 0-4.
        declared: usize,
        /// Actual buffer length.
        actual: usize,
    },

    /// The directory's byte length is not a multiple of 12.
    #[error("directory length {0} is not a multiple of 12")]
    RecordDirectoryInvalid(usize),

    /// The directory contained zero entries.
    #[error("no fields found in record")]
    NoFieldsFound,

    /// A removal was requested for a field tag not present in the record.
    #[error("field not found: {0}")]
    FieldNotFound(String),

    /// A length or offset exceeded what the fixed-width decimal directory
    /// field can represent (4 digits per field length, 5 digits for the
    /// overall record length).
    #[error("record too large to encode: {0}")]
    RecordTooLarge(String),

    /// A subfield or control field value could not be decoded under a
    /// `strict` [`crate::codec::Utf8Handling`] policy.
    #[error("encoding error: {0}")]
    EncodingError(String),
}

/// Convenience type alias for [`std::result::Result`] with [`MarcError`].
pub type Result<T> = std::result::Result<T, MarcError>;
