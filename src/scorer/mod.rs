pub mod pruner;
pub mod topk;

pub use self::pruner::{ExtremityIndex, Pruner};
pub use self::topk::TopKSelector;
use crate::config::ClassifierConfig;
use crate::dictionary::WordFrequencyTable;
use crate::gesture::ideal::{IdealGesture, VariantKind};
use crate::gesture::{distance, GesturePath};
use rayon::prelude::*;
use serde::Serialize;
use std::f64::consts::PI;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    pub word: String,
    /// Log-likelihood; higher is better.
    pub confidence: f64,
    pub variant: VariantKind,
    pub shape_distance: f32,
    pub location_distance: f32,
}

impl ScoredCandidate {
    pub fn new(word: &str, confidence: f64) -> Self {
        Self {
            word: word.to_string(),
            confidence,
            variant: VariantKind::Plain,
            shape_distance: 0.0,
            location_distance: 0.0,
        }
    }
}

/// The user gesture in the two forms every candidate is compared against.
#[derive(Debug, Clone)]
pub struct PreparedGesture {
    pub sampled: GesturePath,
    pub normalized: GesturePath,
}

#[derive(Debug, Clone)]
pub struct ScoringEngine {
    pub sampling_points: usize,
    pub shape_std: f32,
    pub location_std: f32,
    pub parallel: bool,
}

impl ScoringEngine {
    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self {
            sampling_points: config.sampling_points,
            shape_std: config.shape_std,
            location_std: config.location_std,
            parallel: config.parallel_scoring,
        }
    }

    pub fn prepare(&self, gesture: &GesturePath) -> PreparedGesture {
        let sampled = gesture.resample(self.sampling_points);
        let normalized = sampled.normalize_by_bounding_box();
        PreparedGesture {
            sampled,
            normalized,
        }
    }

    /// Scores every ideal variant of a word and keeps the best one.
    ///
    /// `confidence = ln N(shape) + ln N(location) + ln(frequency)`, so a better fit
    /// or a more frequent word always ranks higher.
    pub fn score_word(
        &self,
        ideal: &IdealGesture,
        frequency: u8,
        user: &PreparedGesture,
        key_radius: f32,
    ) -> Option<ScoredCandidate> {
        let location_std = self.location_std * key_radius;
        let log_frequency = (frequency.max(1) as f64).ln();

        let mut best: Option<ScoredCandidate> = None;
        for variant in &ideal.variants {
            let shape = shape_distance(&variant.normalized, &user.normalized);
            let location = location_distance(&variant.sampled, &user.sampled);
            let confidence = gaussian_log_likelihood(shape, self.shape_std)
                + gaussian_log_likelihood(location, location_std)
                + log_frequency;

            if best.as_ref().map_or(true, |b| confidence > b.confidence) {
                best = Some(ScoredCandidate {
                    word: ideal.word.clone(),
                    confidence,
                    variant: variant.kind,
                    shape_distance: shape,
                    location_distance: location,
                });
            }
        }
        best
    }

    /// Scores candidates in input order. Words missing from the table are dropped.
    pub fn score_candidates(
        &self,
        candidates: &[(&str, Arc<IdealGesture>)],
        words: &WordFrequencyTable,
        user: &PreparedGesture,
        key_radius: f32,
    ) -> Vec<ScoredCandidate> {
        let score = |(word, ideal): &(&str, Arc<IdealGesture>)| {
            let frequency = words.frequency(word)?;
            self.score_word(ideal, frequency, user, key_radius)
        };

        if self.parallel {
            // Indexed collect keeps input order, so ranking stays deterministic
            candidates.par_iter().filter_map(score).collect()
        } else {
            candidates.iter().filter_map(score).collect()
        }
    }

    pub fn rank(
        &self,
        candidates: &[(&str, Arc<IdealGesture>)],
        words: &WordFrequencyTable,
        user: &PreparedGesture,
        key_radius: f32,
        max_count: usize,
    ) -> Vec<ScoredCandidate> {
        let mut top = TopKSelector::new(max_count);
        for candidate in self.score_candidates(candidates, words, user, key_radius) {
            top.insert(candidate);
        }
        top.into_vec()
    }
}

/// Sum of point-wise Euclidean distances between two normalized gestures.
pub fn shape_distance(a: &GesturePath, b: &GesturePath) -> f32 {
    a.xs()
        .iter()
        .zip(a.ys())
        .zip(b.xs().iter().zip(b.ys()))
        .map(|((&x1, &y1), (&x2, &y2))| distance(x1, y1, x2, y2))
        .sum()
}

/// Mean L1 distance between two un-normalized gestures, halved.
pub fn location_distance(a: &GesturePath, b: &GesturePath) -> f32 {
    let n = a.len().min(b.len());
    if n == 0 {
        return 0.0;
    }
    let total: f32 = a
        .xs()
        .iter()
        .zip(a.ys())
        .zip(b.xs().iter().zip(b.ys()))
        .map(|((&x1, &y1), (&x2, &y2))| (x1 - x2).abs() + (y1 - y2).abs())
        .sum();
    total / n as f32 / 2.0
}

/// Zero-mean normal density.
pub fn gaussian_probability(value: f32, std: f32) -> f64 {
    gaussian_log_likelihood(value, std).exp()
}

/// Natural log of the zero-mean normal density; stays finite where the density underflows.
pub fn gaussian_log_likelihood(value: f32, std: f32) -> f64 {
    let std = std as f64;
    let z = value as f64 / std;
    -(std * (2.0 * PI).sqrt()).ln() - 0.5 * z * z
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::KeyboardGeometry;
    use crate::gesture::Point2D;

    #[test]
    fn test_gaussian_peak() {
        let p = gaussian_probability(0.0, 1.0);
        assert!((p - 1.0 / (2.0 * PI).sqrt()).abs() < 1e-9);
        assert!(gaussian_probability(1.0, 1.0) < p);
    }

    #[test]
    fn test_log_likelihood_does_not_underflow() {
        let ll = gaussian_log_likelihood(5000.0, 22.08);
        assert!(ll.is_finite());
        assert!(ll < gaussian_log_likelihood(50.0, 22.08));
    }

    #[test]
    fn test_distances_of_identical_paths() {
        let g = GesturePath::from_points([Point2D::new(0.0, 0.0), Point2D::new(4.0, 3.0)]);
        assert_eq!(shape_distance(&g, &g), 0.0);
        assert_eq!(location_distance(&g, &g), 0.0);
    }

    #[test]
    fn test_location_distance_formula() {
        let a = GesturePath::from_points([Point2D::new(0.0, 0.0), Point2D::new(0.0, 0.0)]);
        let b = GesturePath::from_points([Point2D::new(2.0, 2.0), Point2D::new(2.0, 2.0)]);
        // (4 + 4) / 2 / 2
        assert_eq!(location_distance(&a, &b), 2.0);
    }

    #[test]
    fn test_frequency_raises_confidence() {
        let geom = KeyboardGeometry::from_rows("row", &["qwe"], &[0.0], 10.0, 10.0);
        let engine = ScoringEngine::from_config(&ClassifierConfig::default());
        let ideal = IdealGesture::generate("we", &geom, engine.sampling_points);
        let user = engine.prepare(&ideal.variants[0].path);
        let rare = engine.score_word(&ideal, 1, &user, 10.0).unwrap();
        let common = engine.score_word(&ideal, 200, &user, 10.0).unwrap();
        assert!(common.confidence > rare.confidence);
    }
}
