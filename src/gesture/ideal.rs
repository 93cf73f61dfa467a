use super::GesturePath;
use crate::geometry::{fold_case, KeyboardGeometry, LayoutId};
use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, PoisonError, RwLock};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use tracing::trace;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
pub enum VariantKind {
    Plain,
    Looped,
}

/// One theoretical trace of a word, with the forms the scorer compares against.
#[derive(Debug, Clone)]
pub struct IdealVariant {
    pub kind: VariantKind,
    pub path: GesturePath,
    pub length: f32,
    pub sampled: GesturePath,
    pub normalized: GesturePath,
}

impl IdealVariant {
    fn new(kind: VariantKind, path: GesturePath, sampling_points: usize) -> Self {
        let sampled = path.resample(sampling_points);
        let normalized = sampled.normalize_by_bounding_box();
        Self {
            kind,
            length: path.length(),
            path,
            sampled,
            normalized,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IdealGesture {
    pub word: String,
    pub variants: Vec<IdealVariant>,
}

impl IdealGesture {
    /// Empty when no character of the word resolves to a key.
    pub fn generate(word: &str, geometry: &KeyboardGeometry, sampling_points: usize) -> Self {
        let (plain, looped) = trace_word(word, geometry);
        let mut variants = Vec::with_capacity(2);
        if !plain.is_empty() {
            variants.push(IdealVariant::new(VariantKind::Plain, plain, sampling_points));
            if let Some(looped) = looped {
                variants.push(IdealVariant::new(VariantKind::Looped, looped, sampling_points));
            }
        }
        Self {
            word: word.to_string(),
            variants,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

/// Traces the key centers a perfect swipe of `word` would visit.
///
/// Returns the plain path and, when the word repeats a letter, a second path with a
/// small diamond drawn on the repeated key so that e.g. "pool" and "poll" differ.
/// Characters without a key are skipped.
pub fn trace_word(word: &str, geometry: &KeyboardGeometry) -> (GesturePath, Option<GesturePath>) {
    // A repeated letter becomes four diamond points
    let letters = word.chars().count();
    let mut plain = GesturePath::with_capacity(letters);
    let mut looped = GesturePath::with_capacity(letters * 4);
    let mut previous: Option<char> = None;
    let mut has_loops = false;

    for c in word.chars().map(fold_case) {
        let Some(key) = geometry.resolve_char(c) else {
            trace!("No key for '{}' in '{}'", c, word);
            continue;
        };
        let (cx, cy) = (key.center_x, key.center_y);

        if previous == Some(c) {
            let dx = key.width / 4.0;
            let dy = key.height / 4.0;
            // bottom right, top right, top left, bottom left
            looped.add_point(cx + dx, cy + dy);
            looped.add_point(cx + dx, cy - dy);
            looped.add_point(cx - dx, cy - dy);
            looped.add_point(cx - dx, cy + dy);
            has_loops = true;
        } else {
            looped.add_point(cx, cy);
        }
        plain.add_point(cx, cy);
        previous = Some(c);
    }

    (plain, has_loops.then_some(looped))
}

#[derive(Debug, Default)]
struct Entries {
    map: FnvHashMap<String, Arc<IdealGesture>>,
    order: VecDeque<String>,
}

/// Memoized ideal gestures for one layout.
///
/// Bound to a single `LayoutId`; a new layout gets a new cache, so entries are
/// invalidated wholesale. Lookups against any other layout bypass the cache.
/// Holds at most `capacity` words, dropping the oldest insertion when full.
#[derive(Debug)]
pub struct IdealGestureCache {
    layout: LayoutId,
    sampling_points: usize,
    capacity: usize,
    entries: RwLock<Entries>,
}

impl IdealGestureCache {
    pub fn new(layout: LayoutId, sampling_points: usize, capacity: usize) -> Self {
        Self {
            layout,
            sampling_points,
            capacity,
            entries: RwLock::new(Entries::default()),
        }
    }

    pub fn layout(&self) -> &LayoutId {
        &self.layout
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get_or_generate(&self, word: &str, geometry: &KeyboardGeometry) -> Arc<IdealGesture> {
        if geometry.id() != &self.layout {
            return Arc::new(IdealGesture::generate(word, geometry, self.sampling_points));
        }

        if let Some(hit) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .map
            .get(word)
        {
            return hit.clone();
        }

        let ideal = Arc::new(IdealGesture::generate(word, geometry, self.sampling_points));
        if self.capacity == 0 {
            return ideal;
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(hit) = entries.map.get(word) {
            return hit.clone();
        }
        while entries.map.len() >= self.capacity {
            let Some(oldest) = entries.order.pop_front() else {
                break;
            };
            entries.map.remove(&oldest);
        }
        entries.order.push_back(word.to_string());
        entries.map.insert(word.to_string(), Arc::clone(&ideal));
        ideal
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .map
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::Point2D;

    fn row() -> KeyboardGeometry {
        KeyboardGeometry::from_rows("row", &["polk"], &[0.0], 40.0, 40.0)
    }

    #[test]
    fn test_plain_path_visits_key_centers() {
        let geom = row();
        let (plain, looped) = trace_word("Pol", &geom);
        assert!(looped.is_none());
        assert_eq!(plain.capacity(), 3);
        let pts: Vec<Point2D> = plain.points().collect();
        assert_eq!(
            pts,
            vec![
                Point2D::new(20.0, 20.0),
                Point2D::new(60.0, 20.0),
                Point2D::new(100.0, 20.0)
            ]
        );
    }

    #[test]
    fn test_repeated_letter_adds_diamond() {
        let geom = row();
        let (plain, looped) = trace_word("pool", &geom);
        let looped = looped.expect("repeated letter must produce a looped variant");
        assert_eq!(plain.len(), 4);
        // p, o, 4 diamond points, l
        assert_eq!(looped.len(), 7);
        assert_eq!(looped.capacity(), 16);
        assert_eq!(looped.point(2), Some(Point2D::new(70.0, 30.0)));
        assert_eq!(looped.point(5), Some(Point2D::new(50.0, 30.0)));
    }

    #[test]
    fn test_unresolvable_characters_are_skipped() {
        let geom = row();
        let (plain, _) = trace_word("p?o", &geom);
        assert_eq!(plain.len(), 2);
        let ideal = IdealGesture::generate("???", &geom, 50);
        assert!(ideal.is_empty());
    }

    #[test]
    fn test_accented_letters_use_base_key() {
        let geom = row();
        let (a, _) = trace_word("pól", &geom);
        let (b, _) = trace_word("pol", &geom);
        assert_eq!(a, b);
    }

    #[test]
    fn test_cache_memoizes_per_layout() {
        let geom = row();
        let cache = IdealGestureCache::new(geom.id().clone(), 50, 10);
        let a = cache.get_or_generate("pool", &geom);
        let b = cache.get_or_generate("pool", &geom);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.variants.len(), 2);
        assert_eq!(a.variants[0].sampled.len(), 50);

        let other = KeyboardGeometry::from_rows("row", &["polk"], &[0.0], 50.0, 50.0);
        let c = cache.get_or_generate("pool", &other);
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_is_bounded() {
        let geom = row();
        let cache = IdealGestureCache::new(geom.id().clone(), 20, 2);
        let first = cache.get_or_generate("pol", &geom);
        cache.get_or_generate("lop", &geom);
        cache.get_or_generate("kol", &geom);
        assert_eq!(cache.len(), 2);

        // Oldest entry was dropped, so it is generated again
        let again = cache.get_or_generate("pol", &geom);
        assert!(!Arc::ptr_eq(&first, &again));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_long_word_fits_its_own_path() {
        let geom = row();
        let word = "pool".repeat(30);
        let (plain, looped) = trace_word(&word, &geom);
        assert_eq!(plain.len(), 120);
        // 7 points per "pool"
        assert_eq!(looped.unwrap().len(), 210);
    }
}
