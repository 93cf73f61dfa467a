use crate::config::ClassifierConfig;
use crate::dictionary::WordFrequencyTable;
use crate::geometry::{fold_case, KeyboardGeometry};
use crate::gesture::ideal::{IdealGesture, IdealGestureCache};
use crate::gesture::GesturePath;
use fnv::{FnvHashMap, FnvHashSet};
use std::sync::Arc;
use tracing::debug;

/// (start key code, end key code)
pub type ExtremityKey = (u32, u32);

/// Words bucketed by the keys of their first and last letter.
#[derive(Debug, Default)]
pub struct ExtremityIndex {
    buckets: FnvHashMap<ExtremityKey, Vec<String>>,
    indexed: usize,
    skipped: usize,
}

impl ExtremityIndex {
    /// Words whose first or last letter has no key on this layout are left out.
    pub fn build(words: &WordFrequencyTable, geometry: &KeyboardGeometry) -> Self {
        let mut index = Self::default();
        for (word, _) in words.iter() {
            match extremity_keys(word, geometry) {
                Some(key) => {
                    index.buckets.entry(key).or_default().push(word.to_string());
                    index.indexed += 1;
                }
                None => index.skipped += 1,
            }
        }
        index
    }

    pub fn get(&self, start: u32, end: u32) -> &[String] {
        self.buckets
            .get(&(start, end))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn indexed_words(&self) -> usize {
        self.indexed
    }

    pub fn skipped_words(&self) -> usize {
        self.skipped
    }
}

/// Key codes of the first and last letter of `word`, if both resolve.
pub fn extremity_keys(word: &str, geometry: &KeyboardGeometry) -> Option<ExtremityKey> {
    let first = word.chars().next().map(fold_case)?;
    let last = word.chars().next_back().map(fold_case)?;
    let start = geometry.resolve_char(first)?;
    let end = geometry.resolve_char(last)?;
    Some((start.code, end.code))
}

/// Two-stage candidate filter built once per (word table, layout) activation.
#[derive(Debug)]
pub struct Pruner {
    index: ExtremityIndex,
    ideals: IdealGestureCache,
    length_threshold: f32,
    neighbors: usize,
}

impl Pruner {
    pub fn new(
        words: &WordFrequencyTable,
        geometry: &KeyboardGeometry,
        config: &ClassifierConfig,
    ) -> Self {
        let index = ExtremityIndex::build(words, geometry);
        debug!(
            "Pruner built for '{}'/'{}': {} words in {} buckets, {} skipped",
            geometry.name(),
            words.name(),
            index.indexed_words(),
            index.bucket_count(),
            index.skipped_words()
        );

        Self {
            index,
            ideals: IdealGestureCache::new(
                geometry.id().clone(),
                config.sampling_points,
                config.ideal_cache_size,
            ),
            length_threshold: config.length_threshold,
            neighbors: config.extremity_neighbors,
        }
    }

    pub fn index(&self) -> &ExtremityIndex {
        &self.index
    }

    pub fn ideal(&self, word: &str, geometry: &KeyboardGeometry) -> Arc<IdealGesture> {
        self.ideals.get_or_generate(word, geometry)
    }

    pub fn cached_ideals(&self) -> usize {
        self.ideals.len()
    }

    /// Union of the buckets for every pairing of the keys nearest the gesture's first
    /// point with the keys nearest its last point. May contain duplicates.
    pub fn prune_by_extremities<'a>(
        &'a self,
        gesture: &GesturePath,
        geometry: &KeyboardGeometry,
    ) -> Vec<&'a str> {
        let (Some(first), Some(last)) = (gesture.first(), gesture.last()) else {
            return Vec::new();
        };

        let start_keys = geometry.nearest_codes(first, self.neighbors);
        let end_keys = geometry.nearest_codes(last, self.neighbors);

        let mut remaining = Vec::new();
        for &start in &start_keys {
            for &end in &end_keys {
                remaining.extend(self.index.get(start, end).iter().map(String::as_str));
            }
        }
        remaining
    }

    /// Keeps words with at least one ideal variant whose length is within
    /// `length_threshold * key radius` of the gesture length. Output is duplicate-free
    /// and keeps first-seen order.
    pub fn prune_by_length<'a>(
        &self,
        gesture: &GesturePath,
        words: &[&'a str],
        geometry: &KeyboardGeometry,
    ) -> Vec<(&'a str, Arc<IdealGesture>)> {
        let Some(radius) = geometry.representative_radius() else {
            return Vec::new();
        };
        let tolerance = self.length_threshold * radius;
        let user_length = gesture.length();

        let mut seen = FnvHashSet::default();
        let mut remaining = Vec::new();
        for &word in words {
            if !seen.insert(word) {
                continue;
            }
            let ideal = self.ideal(word, geometry);
            if ideal
                .variants
                .iter()
                .any(|v| (user_length - v.length).abs() < tolerance)
            {
                remaining.push((word, ideal));
            }
        }
        remaining
    }
}
