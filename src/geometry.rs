use crate::gesture::Point2D;
use fnv::FnvHashMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use unicode_normalization::UnicodeNormalization;

/// One key of the active layout, in view coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyGeometry {
    pub code: u32, // Unicode scalar of the key's primary character
    pub center_x: f32,
    pub center_y: f32,
    pub width: f32,
    pub height: f32,
}

impl KeyGeometry {
    pub fn new(code: u32, center_x: f32, center_y: f32, width: f32, height: f32) -> Self {
        Self {
            code,
            center_x,
            center_y,
            width,
            height,
        }
    }

    pub fn for_char(c: char, center_x: f32, center_y: f32, width: f32, height: f32) -> Self {
        Self::new(c as u32, center_x, center_y, width, height)
    }

    #[inline(always)]
    pub fn center(&self) -> Point2D {
        Point2D::new(self.center_x, self.center_y)
    }

    #[inline(always)]
    pub fn radius(&self) -> f32 {
        self.width.min(self.height)
    }

    pub fn label(&self) -> Option<char> {
        char::from_u32(self.code)
    }
}

/// Identity of a layout snapshot: the subtype label plus a digest of the key content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LayoutId {
    pub name: String,
    pub fingerprint: String,
}

/// Immutable code -> key mapping for one layout activation.
#[derive(Debug, Clone)]
pub struct KeyboardGeometry {
    name: String,
    keys: Vec<KeyGeometry>,
    by_code: FnvHashMap<u32, usize>,
    id: LayoutId,
}

impl KeyboardGeometry {
    pub fn new(name: impl Into<String>, keys: Vec<KeyGeometry>) -> Self {
        let name = name.into();

        let mut by_code = FnvHashMap::default();
        let mut hasher = Sha256::new();
        for (idx, k) in keys.iter().enumerate() {
            // Later keys win for duplicate codes
            by_code.insert(k.code, idx);
            hasher.update(k.code.to_le_bytes());
            for v in [k.center_x, k.center_y, k.width, k.height] {
                hasher.update(v.to_bits().to_le_bytes());
            }
        }

        let id = LayoutId {
            name: name.clone(),
            fingerprint: hex::encode(hasher.finalize()),
        };

        Self {
            name,
            keys,
            by_code,
            id,
        }
    }

    /// Builds a row-staggered grid. Each row string lists the key characters left to
    /// right; `stagger[r]` shifts row `r` by that many key widths.
    pub fn from_rows(
        name: impl Into<String>,
        rows: &[&str],
        stagger: &[f32],
        key_width: f32,
        key_height: f32,
    ) -> Self {
        let mut keys = Vec::new();
        for (r, row) in rows.iter().enumerate() {
            let offset = stagger.get(r).copied().unwrap_or(0.0) * key_width;
            for (c, ch) in row.chars().enumerate() {
                keys.push(KeyGeometry::for_char(
                    ch,
                    offset + (c as f32 + 0.5) * key_width,
                    (r as f32 + 0.5) * key_height,
                    key_width,
                    key_height,
                ));
            }
        }
        Self::new(name, keys)
    }

    /// Standard 3-row QWERTY letter block.
    pub fn qwerty(key_width: f32, key_height: f32) -> Self {
        Self::from_rows(
            "qwerty",
            &["qwertyuiop", "asdfghjkl", "zxcvbnm"],
            &[0.0, 0.5, 1.5],
            key_width,
            key_height,
        )
    }

    pub fn id(&self) -> &LayoutId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn keys(&self) -> &[KeyGeometry] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn key_for_code(&self, code: u32) -> Option<&KeyGeometry> {
        self.by_code.get(&code).map(|&i| &self.keys[i])
    }

    /// Finds the key for an already case-folded character, falling back to its
    /// canonical-decomposition base ("é" -> "e").
    pub fn resolve_char(&self, c: char) -> Option<&KeyGeometry> {
        self.key_for_code(c as u32)
            .or_else(|| self.key_for_code(base_char(c) as u32))
    }

    /// Key size used to scale tolerances. Keys are near-uniform, so the first key stands in.
    pub fn representative_radius(&self) -> Option<f32> {
        self.keys.first().map(KeyGeometry::radius)
    }

    /// Codes of the `n` keys whose centers are closest to `p`. Ties keep layout order.
    pub fn nearest_codes(&self, p: Point2D, n: usize) -> Vec<u32> {
        self.keys
            .iter()
            .map(|k| (k.code, k.center().distance(&p)))
            .sorted_by(|a, b| a.1.total_cmp(&b.1))
            .take(n)
            .map(|(code, _)| code)
            .collect()
    }
}

/// First character of the canonical decomposition of `c`.
pub fn base_char(c: char) -> char {
    std::iter::once(c).nfd().next().unwrap_or(c)
}

/// Lower-cases `c`, keeping the first character of multi-char foldings.
pub fn fold_case(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_char() {
        assert_eq!(base_char('é'), 'e');
        assert_eq!(base_char('ñ'), 'n');
        assert_eq!(base_char('q'), 'q');
    }

    #[test]
    fn test_resolve_falls_back_to_base() {
        let geom = KeyboardGeometry::qwerty(10.0, 10.0);
        let e = geom.resolve_char('e').unwrap();
        let e_acute = geom.resolve_char('é').unwrap();
        assert_eq!(e, e_acute);
        assert!(geom.resolve_char('ß').is_none());
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let a = KeyboardGeometry::qwerty(10.0, 10.0);
        let b = KeyboardGeometry::qwerty(10.0, 10.0);
        let c = KeyboardGeometry::qwerty(12.0, 10.0);
        assert_eq!(a.id(), b.id());
        assert_ne!(a.id(), c.id());
        assert_eq!(a.id().name, c.id().name);
    }

    #[test]
    fn test_nearest_codes() {
        let geom = KeyboardGeometry::from_rows("row", &["qwe"], &[0.0], 10.0, 10.0);
        let near = geom.nearest_codes(Point2D::new(16.0, 5.0), 2);
        assert_eq!(near, vec!['w' as u32, 'e' as u32]);
    }

    #[test]
    fn test_duplicate_code_last_wins() {
        let geom = KeyboardGeometry::new(
            "dup",
            vec![
                KeyGeometry::for_char('a', 0.0, 0.0, 1.0, 1.0),
                KeyGeometry::for_char('a', 5.0, 0.0, 1.0, 1.0),
            ],
        );
        assert_eq!(geom.key_for_code('a' as u32).unwrap().center_x, 5.0);
        assert_eq!(geom.keys().len(), 2);
    }
}
