//! End-to-end lookup tests: normalization, ranking, grouping,
//! cancellation.

use std::io::Cursor;

use glossa::testing::{build_index_over, pair_entry, sample_dictionary};
use glossa::{
    CancelFlag, Dictionary, EntrySource, LanguageRegistry, RowMatch,
};

fn reload(dictionary: &Dictionary) -> Dictionary {
    let mut buf = Vec::new();
    dictionary.write(&mut buf).unwrap();
    let mut registry = LanguageRegistry::with_defaults();
    Dictionary::read(Cursor::new(buf), &mut registry).unwrap()
}

#[test]
fn lookup_all_returns_one_group_per_index() {
    let dictionary = reload(&sample_dictionary());
    let groups = dictionary.lookup_all("world", &CancelFlag::new()).unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].language_code, "EN");
    assert_eq!(groups[0].index_name, "EN->FR");
    assert_eq!(groups[1].language_code, "FR");
    // "world" is an English token; the French group stays empty.
    assert_eq!(groups[0].results.len(), 2);
    assert!(groups[1].results.is_empty());
}

#[test]
fn ordered_matches_sort_before_bag_of_words() {
    let mut registry = LanguageRegistry::with_defaults();
    let mut dictionary = Dictionary::new("ranking");
    dictionary.sources.push(EntrySource {
        name: "src".to_string(),
        num_entries: 2,
    });
    // Entry 0 has the tokens out of order, entry 1 in order.
    dictionary
        .entries
        .push(pair_entry(0, &[("world hello", "monde bonjour")]))
        .unwrap();
    dictionary
        .entries
        .push(pair_entry(0, &[("hello world", "bonjour monde")]))
        .unwrap();
    let english = registry.lookup_or_create("EN").clone();
    dictionary.indices.push(build_index_over(
        english,
        "EN",
        false,
        &[("hello", &[0, 1]), ("world", &[0, 1])],
    ));

    let dictionary = reload(&dictionary);
    let groups = dictionary
        .lookup_all("hello world", &CancelFlag::new())
        .unwrap();
    let results = &groups[0].results;
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].entry_index, 1);
    assert_eq!(results[0].row_match, RowMatch::OrderedMatch);
    assert_eq!(results[1].entry_index, 0);
    assert_eq!(results[1].row_match, RowMatch::BagOfWordsMatch);
}

#[test]
fn german_queries_reach_umlaut_tokens_through_normalization() {
    let mut registry = LanguageRegistry::with_defaults();
    let mut dictionary = Dictionary::new("DE-EN");
    dictionary.sources.push(EntrySource {
        name: "src".to_string(),
        num_entries: 1,
    });
    dictionary
        .entries
        .push(pair_entry(0, &[("schön", "beautiful")]))
        .unwrap();
    let german = registry.lookup_or_create("DE").clone();
    // The index stores the normalized token.
    dictionary.indices.push(build_index_over(
        german,
        "DE->EN",
        false,
        &[("schön", &[0])],
    ));

    let dictionary = reload(&dictionary);
    // ASCII digraph query normalizes to the umlaut form.
    let groups = dictionary.lookup_all("Schoen", &CancelFlag::new()).unwrap();
    assert_eq!(groups[0].results.len(), 1);
    assert_eq!(groups[0].results[0].row_match, RowMatch::OrderedMatch);
}

#[test]
fn queries_with_punctuation_still_tokenize() {
    let dictionary = reload(&sample_dictionary());
    let groups = dictionary
        .lookup_all("hello, world!", &CancelFlag::new())
        .unwrap();
    assert_eq!(groups[0].results.len(), 1);
    assert_eq!(groups[0].results[0].row_match, RowMatch::OrderedMatch);
}

#[test]
fn cancellation_before_lookup_yields_nothing() {
    let dictionary = reload(&sample_dictionary());
    let cancel = CancelFlag::new();
    cancel.cancel();
    assert!(dictionary.lookup_all("hello", &cancel).unwrap().is_empty());
}

#[test]
fn per_index_lookup_matches_grouped_lookup() {
    let dictionary = reload(&sample_dictionary());
    let cancel = CancelFlag::new();
    let groups = dictionary.lookup_all("goodbye", &cancel).unwrap();
    let direct = dictionary.indices[0]
        .lookup(&dictionary.entries, "goodbye", &cancel)
        .unwrap();
    assert_eq!(groups[0].results, direct);
}
