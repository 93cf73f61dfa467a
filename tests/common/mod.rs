#![allow(dead_code)]

use glideforge::config::ClassifierConfig;
use glideforge::{GlideClassifier, KeyboardGeometry, Point2D, WordFrequencyTable};

pub const KEY: f32 = 100.0;

/// One row of keys q w e r t y, 100 units wide, centers at x = 50, 150, ...
pub fn row_layout() -> KeyboardGeometry {
    KeyboardGeometry::from_rows("row", &["qwerty"], &[0.0], KEY, KEY)
}

pub fn words(name: &str, entries: &[(&str, u64)]) -> WordFrequencyTable {
    WordFrequencyTable::new(name, entries.iter().map(|&(w, f)| (w, f)))
}

pub fn we_words() -> WordFrequencyTable {
    words("en", &[("we", 200), ("wet", 150), ("tree", 50)])
}

pub fn classifier_with(
    config: ClassifierConfig,
    geometry: KeyboardGeometry,
    table: WordFrequencyTable,
) -> GlideClassifier {
    let mut classifier = GlideClassifier::new(config).unwrap();
    classifier.set_layout(geometry);
    classifier.set_word_data(table);
    classifier
}

pub fn ready_classifier(geometry: KeyboardGeometry, table: WordFrequencyTable) -> GlideClassifier {
    classifier_with(ClassifierConfig::default(), geometry, table)
}

pub fn key_center(geometry: &KeyboardGeometry, c: char) -> Point2D {
    geometry.key_for_code(c as u32).unwrap().center()
}

/// Key centers of `word`, in order.
pub fn centers(geometry: &KeyboardGeometry, word: &str) -> Vec<Point2D> {
    word.chars().map(|c| key_center(geometry, c)).collect()
}

/// Splits every leg between consecutive points into `parts` equal pieces.
pub fn subdivide(points: &[Point2D], parts: usize) -> Vec<Point2D> {
    let mut out = Vec::new();
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        for i in 0..parts {
            let t = i as f32 / parts as f32;
            out.push(Point2D::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t));
        }
    }
    if let Some(&last) = points.last() {
        out.push(last);
    }
    out
}
