mod common;

use glideforge::loader::{load_layout, load_trace, load_words};
use glideforge::{GlideClassifier, GlideError, KeyboardGeometry};
use std::fs::File;
use std::io::Write;
use tempfile::TempDir;

#[test]
fn test_bundled_layout_matches_builtin_qwerty() {
    let loaded = load_layout("data/layouts/qwerty.json").unwrap();
    let builtin = KeyboardGeometry::qwerty(100.0, 100.0);
    for key in builtin.keys() {
        assert_eq!(loaded.key_for_code(key.code), Some(key));
    }
    assert!(loaded.key_for_code(' ' as u32).is_some());
}

#[test]
fn test_bundled_word_list_loads() {
    let table = load_words("data/words/en_sample.csv").unwrap();
    assert_eq!(table.name(), "en_sample");
    assert_eq!(table.frequency("the"), Some(255));
    assert!(table.contains("café"));
}

#[test]
fn test_trace_file_drives_classifier() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("we.csv");
    let mut f = File::create(&path).unwrap();
    writeln!(f, "x,y,t").unwrap();
    writeln!(f, "150,50,0").unwrap();
    writeln!(f, "200,52,16").unwrap();
    writeln!(f, "250,50,32").unwrap();

    let mut classifier = GlideClassifier::new(Default::default()).unwrap();
    classifier.set_layout(common::row_layout());
    classifier.set_word_data(common::we_words());
    assert_eq!(classifier.init_gesture_from_points(load_trace(&path).unwrap()), 3);
    assert_eq!(classifier.get_suggestions(3, true)[0], "we");
}

#[test]
fn test_missing_files_are_io_errors() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.json");
    assert!(matches!(load_layout(&missing), Err(GlideError::Io(_))));
    assert!(matches!(load_words(&missing), Err(GlideError::Io(_))));
    assert!(matches!(load_trace(&missing), Err(GlideError::Io(_))));
}

#[test]
fn test_malformed_layout_is_json_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, "{ \"name\": \"x\", \"keys\": [ { \"label\": \"a\" } ] }").unwrap();
    assert!(matches!(load_layout(&path), Err(GlideError::Json(_))));
}

#[test]
fn test_empty_word_list_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.csv");
    std::fs::write(&path, "word,frequency\n").unwrap();
    assert!(matches!(load_words(&path), Err(GlideError::Validation(_))));
}
