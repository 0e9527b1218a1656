//! The MARC record: a leader plus an ordered sequence of fields.
//!
//! [`Record`] is generic over the field value representation so that the
//! decoded (`String`) and raw (`Vec<u8>`) shapes share one implementation of
//! everything that doesn't care about text vs. bytes: field lookup,
//! insertion-order tracking, and the grouped/ordered insertion policies of
//! §4.6. [`RawRecord`] is `Record<Vec<u8>>`.

use serde::{Deserialize, Serialize};

use crate::error::{MarcError, Result};
use crate::field::Field;
use crate::leader::Leader;

/// A MARC record: a leader and an ordered sequence of fields.
///
/// `V` is `String` for a fully decoded record (the default) or `Vec<u8>`
/// for a [`RawRecord`] produced by decoding with `to_unicode: false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record<V = String> {
    /// The record's 24-byte leader.
    pub leader: Leader,
    /// Fields in insertion order; insertion order is observable and
    /// preserved across decode.
    pub fields: Vec<Field<V>>,
    /// Whether this record should be treated (and re-encoded) as UTF-8
    /// regardless of what `leader.character_coding` currently holds.
    pub force_utf8: bool,
}

/// A record whose field values have not been translated out of their
/// source byte encoding. Produced by decoding with `to_unicode: false`.
pub type RawRecord = Record<Vec<u8>>;

impl<V> Default for Record<V> {
    fn default() -> Self {
        Record {
            leader: Leader::default(),
            fields: Vec::new(),
            force_utf8: false,
        }
    }
}

impl<V> Record<V> {
    /// Create an empty record with the given leader.
    #[must_use]
    pub fn new(leader: Leader) -> Self {
        Record {
            leader,
            fields: Vec::new(),
            force_utf8: false,
        }
    }

    /// Append a field verbatim, preserving whatever order the caller (or
    /// the decoder, reproducing the source record's own field order)
    /// passes fields in. Neither insertion policy in §4.6 applies here.
    pub fn add_field(&mut self, field: Field<V>) {
        self.fields.push(field);
    }

    /// The first field with the given tag, if any.
    #[must_use]
    pub fn get_field(&self, tag: &str) -> Option<&Field<V>> {
        self.fields.iter().find(|f| f.tag() == tag)
    }

    /// All fields with the given tag, in stored order.
    pub fn get_fields<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Field<V>> {
        self.fields.iter().filter(move |f| f.tag() == tag)
    }

    /// Remove and return the first field with the given tag.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::FieldNotFound`] if no field has that tag.
    pub fn remove_field(&mut self, tag: &str) -> Result<Field<V>> {
        let index = self
            .fields
            .iter()
            .position(|f| f.tag() == tag)
            .ok_or_else(|| MarcError::FieldNotFound(tag.to_string()))?;
        Ok(self.fields.remove(index))
    }

    /// Number of fields in the record.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Insert a field using the "grouped" policy of §4.6: compare the first
    /// digit of the tag, inserting before the first existing field whose
    /// leading digit is greater, or before the first non-digit tag. Falls
    /// back to appending when no such field exists. Non-digit new tags are
    /// always appended.
    pub fn insert_field_grouped(&mut self, field: Field<V>) {
        self.insert_sorted(field, |tag| tag.chars().next().and_then(|c| c.to_digit(10)));
    }

    /// Insert a field using the "ordered" policy of §4.6: compare the full
    /// three-digit tag numerically, with the same tie-break as grouped
    /// insertion.
    pub fn insert_field_ordered(&mut self, field: Field<V>) {
        self.insert_sorted(field, |tag| tag.parse::<u32>().ok());
    }

    fn insert_sorted(&mut self, field: Field<V>, key: impl Fn(&str) -> Option<u32>) {
        let Some(new_key) = key(field.tag()) else {
            self.fields.push(field);
            return;
        };

        for (index, existing) in self.fields.iter().enumerate() {
            match key(existing.tag()) {
                None => {
                    self.fields.insert(index, field);
                    return;
                }
                Some(existing_key) if existing_key > new_key => {
                    self.fields.insert(index, field);
                    return;
                }
                _ => {}
            }
        }
        self.fields.push(field);
    }
}

impl Record<String> {
    /// The value of the first control field with the given tag.
    #[must_use]
    pub fn control_value(&self, tag: &str) -> Option<&str> {
        match self.get_field(tag) {
            Some(Field::Control { data, .. }) => Some(data.as_str()),
            _ => None,
        }
    }
}
