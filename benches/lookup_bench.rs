//! Criterion benchmarks for container load and lookup.

use std::io::Cursor;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use glossa::testing::{build_index_over, pair_entry};
use glossa::{CancelFlag, Dictionary, EntrySource, LanguageRegistry};

/// A dictionary with `n` generated entries and an index over every lang1
/// token.
fn build_dictionary(n: u32) -> Vec<u8> {
    let mut registry = LanguageRegistry::with_defaults();
    let mut dictionary = Dictionary::new("bench dictionary");
    dictionary.sources.push(EntrySource {
        name: "bench".to_string(),
        num_entries: n,
    });
    let mut tokens: Vec<(String, Vec<u32>)> = Vec::with_capacity(n as usize);
    for i in 0..n {
        let lang1 = format!("word{:05}", i);
        let lang2 = format!("mot{:05}", i);
        dictionary
            .entries
            .push(pair_entry(0, &[(lang1.as_str(), lang2.as_str())]))
            .expect("bench entries are valid");
        tokens.push((lang1, vec![i]));
    }
    let token_refs: Vec<(&str, &[u32])> = tokens
        .iter()
        .map(|(token, refs)| (token.as_str(), refs.as_slice()))
        .collect();
    let english = registry.lookup_or_create("EN").clone();
    dictionary
        .indices
        .push(build_index_over(english, "EN", false, &token_refs));

    let mut buf = Vec::new();
    dictionary.write(&mut buf).expect("bench dictionary saves");
    buf
}

fn bench_load(c: &mut Criterion) {
    let buf = build_dictionary(2000);
    c.bench_function("load_2000_entries", |b| {
        b.iter(|| {
            let mut registry = LanguageRegistry::with_defaults();
            let dictionary =
                Dictionary::read(Cursor::new(buf.clone()), &mut registry).expect("loads");
            black_box(dictionary.entries.len())
        })
    });
}

fn bench_lookup(c: &mut Criterion) {
    let buf = build_dictionary(2000);
    let mut registry = LanguageRegistry::with_defaults();
    let dictionary = Dictionary::read(Cursor::new(buf), &mut registry).expect("loads");
    let cancel = CancelFlag::new();

    c.bench_function("lookup_hit", |b| {
        b.iter(|| {
            let groups = dictionary
                .lookup_all(black_box("word01000"), &cancel)
                .expect("lookup succeeds");
            black_box(groups)
        })
    });

    c.bench_function("lookup_miss", |b| {
        b.iter(|| {
            let groups = dictionary
                .lookup_all(black_box("zzzzz"), &cancel)
                .expect("lookup succeeds");
            black_box(groups)
        })
    });
}

fn bench_summary(c: &mut Criterion) {
    let buf = build_dictionary(2000);
    c.bench_function("summary_without_entries", |b| {
        b.iter(|| {
            let mut registry = LanguageRegistry::with_defaults();
            let dictionary =
                Dictionary::read(Cursor::new(buf.clone()), &mut registry).expect("loads");
            black_box(dictionary.dictionary_info())
        })
    });
}

criterion_group!(benches, bench_load, bench_lookup, bench_summary);
criterion_main!(benches);
