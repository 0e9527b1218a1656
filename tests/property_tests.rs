//! Property tests for the record codec and the MARC-8 decoder.
//!
//! Each test targets one of the structural guarantees the decode/encode
//! algorithms are supposed to hold for every record, not just the
//! hand-picked scenarios in the unit tests.

use proptest::prelude::*;

use marc21::codec::{decode, encode, DecodeOptions};
use marc21::field::{Field, Subfield};
use marc21::leader::Leader;
use marc21::record::Record;

/// Printable ASCII only: keeps subfield values clear of the 0x1D/0x1E/0x1F
/// delimiter bytes and the MARC-8 escape byte, none of which this strategy
/// needs to exercise (those are covered by the MARC-8 unit tests directly).
fn subfield_value() -> impl Strategy<Value = String> {
    "[ -~]{0,24}"
}

fn tag() -> impl Strategy<Value = String> {
    (100u32..999).prop_map(|n| format!("{n:03}"))
}

fn subfield() -> impl Strategy<Value = Subfield<String>> {
    ('a'..='z', subfield_value()).prop_map(|(code, value)| Subfield::new(code, value))
}

fn data_field() -> impl Strategy<Value = Field<String>> {
    (tag(), proptest::collection::vec(subfield(), 0..5)).prop_map(|(tag, subfields)| {
        Field::new_data(tag, '0', '0', subfields)
    })
}

fn record() -> impl Strategy<Value = Record<String>> {
    proptest::collection::vec(data_field(), 0..8).prop_map(|fields| {
        let mut leader = Leader::default();
        leader.character_coding = 'a';
        let mut record = Record::new(leader);
        record.add_field(Field::new_control("001", "proptest"));
        for field in fields {
            record.add_field(field);
        }
        record
    })
}

proptest! {
    /// Property 1: encoding then decoding a record reproduces every field's
    /// tag, indicators, and subfields exactly.
    #[test]
    fn structural_round_trip(record in record()) {
        let bytes = encode(&record).unwrap();
        let decoded = decode(&bytes, &DecodeOptions::default()).unwrap();
        prop_assert!(decoded.warnings.is_empty());
        prop_assert_eq!(decoded.value.fields, record.fields);
    }

    /// Property 2: the leader's declared record length and base address
    /// always match the buffer `encode` actually produced.
    #[test]
    fn length_self_consistency(record in record()) {
        let bytes = encode(&record).unwrap();
        let leader = Leader::from_bytes(&bytes).unwrap();
        prop_assert_eq!(leader.record_length as usize, bytes.len());
        prop_assert!((leader.data_base_address as usize) < bytes.len());
    }

    /// Property 3: the directory has exactly one entry per field, in the
    /// same order the fields were added.
    #[test]
    fn directory_completeness(record in record()) {
        let bytes = encode(&record).unwrap();
        let decoded = decode(&bytes, &DecodeOptions::default()).unwrap().value;
        prop_assert_eq!(decoded.fields.len(), record.fields.len());
        let original_tags: Vec<&str> = record.fields.iter().map(Field::tag).collect();
        let decoded_tags: Vec<&str> = decoded.fields.iter().map(Field::tag).collect();
        prop_assert_eq!(decoded_tags, original_tags);
    }

    /// Property 5: grouped insertion always leaves digit-tagged fields in
    /// non-decreasing leading-digit order.
    #[test]
    fn grouped_insertion_stays_sorted(tags in proptest::collection::vec(tag(), 1..10)) {
        let mut record = Record::<String>::default();
        for t in tags {
            record.insert_field_grouped(Field::new_data(t, ' ', ' ', Vec::<Subfield<String>>::new()));
        }
        let leading_digits: Vec<u32> = record
            .fields
            .iter()
            .filter_map(|f| f.tag().chars().next().and_then(|c| c.to_digit(10)))
            .collect();
        let mut sorted = leading_digits.clone();
        sorted.sort_unstable();
        prop_assert_eq!(leading_digits, sorted);
    }

    /// Property 6: MARC-8 decoding is stateless per call — decoding two
    /// byte sequences back to back gives the same result as decoding each
    /// in isolation.
    #[test]
    fn marc8_decode_is_stateless_per_call(
        a in "[ -~]{0,16}", b in "[ -~]{0,16}"
    ) {
        let bytes_a = marc21::marc8::encode(&a);
        let bytes_b = marc21::marc8::encode(&b);

        let (decoded_a_alone, _) = marc21::marc8::decode(&bytes_a);
        let (decoded_b_alone, _) = marc21::marc8::decode(&bytes_b);

        // Decoding `a` and then `b` as two separate calls must not let any
        // state from the first call leak into the second.
        let (decoded_a_again, _) = marc21::marc8::decode(&bytes_a);
        let (decoded_b_again, _) = marc21::marc8::decode(&bytes_b);

        prop_assert_eq!(decoded_a_alone, decoded_a_again);
        prop_assert_eq!(decoded_b_alone, decoded_b_again);
    }
}

#[test]
fn indicator_repair_is_idempotent() {
    // A field missing both indicators repairs to spaces; re-encoding and
    // decoding the repaired field again must not change it further.
    let mut leader = Leader::default();
    leader.character_coding = 'a';
    let mut record = Record::new(leader);
    record.add_field(Field::new_control("001", "x"));
    record.add_field(Field::new_data(
        "245",
        ' ',
        ' ',
        [Subfield::new('a', "Title")],
    ));
    let bytes = encode(&record).unwrap();
    let once = decode(&bytes, &DecodeOptions::default()).unwrap().value;

    let bytes_again = encode(&once).unwrap();
    let twice = decode(&bytes_again, &DecodeOptions::default()).unwrap().value;

    assert_eq!(once.fields, twice.fields);
}
