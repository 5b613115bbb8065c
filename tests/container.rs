//! Integration tests for the binary container: real files, full round
//! trips, corruption gates.

use std::io::{Cursor, Seek, SeekFrom, Write};

use glossa::testing::{build_index_over, pair_entry, sample_dictionary};
use glossa::{
    CancelFlag, DictError, Dictionary, EntryPayload, EntrySource, LanguageRegistry, RowMatch,
    CURRENT_DICT_VERSION,
};

fn save(dictionary: &Dictionary) -> Vec<u8> {
    let mut buf = Vec::new();
    dictionary.write(&mut buf).expect("save must succeed");
    buf
}

fn load(buf: Vec<u8>) -> Result<Dictionary, DictError> {
    let mut registry = LanguageRegistry::with_defaults();
    Dictionary::read(Cursor::new(buf), &mut registry)
}

// ============================================================================
// ROUND TRIP
// ============================================================================

#[test]
fn roundtrip_through_a_real_file() {
    let dictionary = sample_dictionary();
    let mut file = tempfile::tempfile().expect("tempfile");
    {
        let mut buf = Vec::new();
        dictionary.write(&mut buf).unwrap();
        file.write_all(&buf).unwrap();
    }
    file.seek(SeekFrom::Start(0)).unwrap();

    let mut registry = LanguageRegistry::with_defaults();
    let back = Dictionary::read(file, &mut registry).unwrap();

    assert_eq!(back.format_version(), dictionary.format_version());
    assert_eq!(back.creation_millis(), dictionary.creation_millis());
    assert_eq!(back.info(), dictionary.info());
    assert_eq!(back.sources, dictionary.sources);
    assert_eq!(back.indices, dictionary.indices);
    assert_eq!(back.entries.len(), dictionary.entries.len());
    for index in 0..dictionary.entries.len() {
        assert_eq!(
            back.entries.get(index).unwrap(),
            dictionary.entries.get(index).unwrap()
        );
    }
}

#[test]
fn save_load_save_is_byte_identical() {
    let first = save(&sample_dictionary());
    let reloaded = load(first.clone()).unwrap();
    let second = save(&reloaded);
    assert_eq!(first, second);
}

#[test]
fn a_dictionary_spanning_many_blocks_roundtrips() {
    let mut registry = LanguageRegistry::with_defaults();
    let mut dictionary = Dictionary::new("block-spanning dictionary");
    dictionary.sources.push(EntrySource {
        name: "generated".to_string(),
        num_entries: 500,
    });
    for i in 0..500u32 {
        dictionary
            .entries
            .push(pair_entry(
                0,
                &[(
                    format!("word{}", i).as_str(),
                    format!("mot{}", i).as_str(),
                )],
            ))
            .unwrap();
    }
    // One index over a handful of the generated tokens.
    let english = registry.lookup_or_create("EN").clone();
    dictionary.indices.push(build_index_over(
        english,
        "EN->FR",
        false,
        &[("word0", &[0]), ("word250", &[250]), ("word499", &[499])],
    ));

    let back = load(save(&dictionary)).unwrap();
    assert_eq!(back.entries.len(), 500);
    // Entries from different compressed blocks decode correctly.
    for probe in [0usize, 63, 64, 250, 499] {
        let entry = back.entries.get(probe).unwrap();
        let text = match &entry.payload {
            EntryPayload::Pair(pair_entry) => pair_entry.raw_text(true),
            _ => panic!("expected a pair entry"),
        };
        assert_eq!(text, format!("word{}\tmot{}", probe, probe));
    }

    // And the index still resolves into them.
    let groups = back.lookup_all("word250", &CancelFlag::new()).unwrap();
    assert_eq!(groups[0].results.len(), 1);
    assert_eq!(groups[0].results[0].entry_index, 250);
    assert_eq!(groups[0].results[0].row_match, RowMatch::OrderedMatch);
}

// ============================================================================
// CORRUPTION GATES
// ============================================================================

#[test]
fn version_below_zero_is_corrupt() {
    let mut buf = save(&sample_dictionary());
    buf[..4].copy_from_slice(&(-1i32).to_le_bytes());
    assert!(matches!(
        load(buf).unwrap_err(),
        DictError::CorruptFormat(_)
    ));
}

#[test]
fn version_above_current_is_corrupt() {
    let mut buf = save(&sample_dictionary());
    buf[..4].copy_from_slice(&(CURRENT_DICT_VERSION + 1).to_le_bytes());
    assert!(matches!(
        load(buf).unwrap_err(),
        DictError::CorruptFormat(_)
    ));
}

#[test]
fn every_supported_version_loads() {
    for version in 0..=CURRENT_DICT_VERSION {
        let mut buf = save(&sample_dictionary());
        buf[..4].copy_from_slice(&version.to_le_bytes());
        assert!(load(buf).is_ok(), "version {} must load", version);
    }
}

#[test]
fn altered_sentinel_is_corrupt() {
    let mut buf = save(&sample_dictionary());
    let last = buf.len() - 1;
    buf[last] = b'X';
    let err = load(buf).unwrap_err();
    assert!(matches!(err, DictError::CorruptFormat(_)));
}

#[test]
fn flipped_entry_block_byte_fails_on_entry_access() {
    // No indices, so the file tail is fixed: an empty indices directory
    // (count + one offset = 12 bytes) followed by the 18-byte sentinel.
    // The byte just before that tail is the last byte of the compressed
    // entry region.
    let mut dictionary = sample_dictionary();
    dictionary.indices.clear();
    let mut buf = save(&dictionary);
    let target = buf.len() - 12 - 18 - 1;
    buf[target] ^= 0x40;

    // Directories are intact, so the load itself succeeds; the checksum
    // catches the corruption when the block is first decoded.
    let loaded = load(buf).expect("directories are untouched");
    let err = loaded.entries.get(0).unwrap_err();
    assert!(matches!(err, DictError::CorruptFormat(_)));
}

#[test]
fn truncation_is_rejected() {
    let buf = save(&sample_dictionary());
    for keep in [4usize, 12, buf.len() / 3, buf.len() - 3] {
        let mut cut = buf.clone();
        cut.truncate(keep);
        assert!(load(cut).is_err(), "truncation at {} must fail", keep);
    }
}

// ============================================================================
// AUTHORING-SIDE INVARIANTS
// ============================================================================

#[test]
fn writing_an_entry_with_a_dangling_source_fails() {
    let mut dictionary = Dictionary::new("broken");
    dictionary.sources.push(EntrySource {
        name: "only".to_string(),
        num_entries: 1,
    });
    dictionary.entries.push(pair_entry(7, &[("a", "b")])).unwrap();
    let mut buf = Vec::new();
    let err = dictionary.write(&mut buf).unwrap_err();
    assert!(matches!(err, DictError::InvariantViolation(_)));
}

#[test]
fn writing_an_index_with_a_dangling_entry_ref_fails() {
    let mut registry = LanguageRegistry::with_defaults();
    let mut dictionary = Dictionary::new("broken");
    dictionary.sources.push(EntrySource {
        name: "only".to_string(),
        num_entries: 1,
    });
    dictionary.entries.push(pair_entry(0, &[("a", "b")])).unwrap();
    let english = registry.lookup_or_create("EN").clone();
    dictionary
        .indices
        .push(build_index_over(english, "EN", false, &[("a", &[5])]));
    let mut buf = Vec::new();
    let err = dictionary.write(&mut buf).unwrap_err();
    assert!(matches!(err, DictError::InvariantViolation(_)));
}
