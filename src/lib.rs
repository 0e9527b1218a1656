#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # marc21
//!
//! A library for MARC 21 bibliographic records: a byte-exact ISO 2709
//! codec ([`codec`]) and a MARC-8 to Unicode translation layer ([`marc8`]).
//!
//! ## Modules
//!
//! - [`leader`] — the 24-byte MARC leader.
//! - [`field`] / [`record`] — the generic field/record data model, shared
//!   between decoded (`String`) and raw (`Vec<u8>`) representations.
//! - [`codec`] — the record-level decode/encode entry points.
//! - [`marc8`] — the stateful MARC-8 character encoding.
//! - [`diagnostics`] — the non-fatal warning channel decoding produces.
//! - [`error`] — the error type for every fallible operation in this crate.

pub mod codec;
pub mod diagnostics;
pub mod error;
pub mod field;
pub mod leader;
pub mod marc8;
pub mod record;

pub use codec::{decode, decode_raw, encode, Codepage, DecodeOptions, FileEncoding, Utf8Handling};
pub use diagnostics::{Decoded, Warning};
pub use error::{MarcError, Result};
pub use field::{Field, Subfield, SubfieldList};
pub use leader::Leader;
pub use record::{RawRecord, Record};
