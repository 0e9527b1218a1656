//! Benchmarks for the record codec and the MARC-8 decoder.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use marc21::codec::{decode, encode, DecodeOptions};
use marc21::field::{Field, Subfield};
use marc21::leader::Leader;
use marc21::record::Record;

fn sample_record() -> Record {
    let mut leader = Leader::default();
    leader.character_coding = 'a';
    let mut record = Record::new(leader);
    record.add_field(Field::new_control("001", "ocm00000001"));
    record.add_field(Field::new_data(
        "100",
        '1',
        ' ',
        [Subfield::new('a', "Fitzgerald, F. Scott")],
    ));
    record.add_field(Field::new_data(
        "245",
        '1',
        '0',
        [
            Subfield::new('a', "The Great Gatsby /"),
            Subfield::new('c', "F. Scott Fitzgerald."),
        ],
    ));
    for i in 0..5 {
        record.add_field(Field::new_data(
            "650",
            ' ',
            '0',
            [Subfield::new('a', format!("Subject heading {i}"))],
        ));
    }
    record
}

fn benchmark_decode(c: &mut Criterion) {
    let bytes = encode(&sample_record()).unwrap();
    let options = DecodeOptions::default();

    c.bench_function("decode_single_record", |b| {
        b.iter(|| decode(black_box(&bytes), &options).unwrap());
    });
}

fn benchmark_encode(c: &mut Criterion) {
    let record = sample_record();

    c.bench_function("encode_single_record", |b| {
        b.iter(|| encode(black_box(&record)).unwrap());
    });
}

fn benchmark_marc8_decode(c: &mut Criterion) {
    let bytes = marc21::marc8::encode(
        "A title with combining diacritics: Caf\u{00E9}, na\u{00EF}ve, r\u{00E9}sum\u{00E9}.",
    );

    c.bench_function("marc8_decode_mixed_text", |b| {
        b.iter(|| marc21::marc8::decode(black_box(&bytes)));
    });
}

criterion_group!(
    benches,
    benchmark_decode,
    benchmark_encode,
    benchmark_marc8_decode
);
criterion_main!(benches);
