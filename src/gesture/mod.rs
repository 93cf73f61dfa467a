pub mod ideal;

use crate::consts::{MAX_GESTURE_POINTS, MIN_BOX_SIDE};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f32,
    pub y: f32,
}

impl Point2D {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline(always)]
    pub fn distance(&self, other: &Point2D) -> f32 {
        distance(self.x, self.y, other.x, other.y)
    }
}

#[inline(always)]
pub fn distance(x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    let dx = x1 - x2;
    let dy = y1 - y2;
    (dx * dx + dy * dy).sqrt()
}

/// A point trace stored as two parallel coordinate arrays.
///
/// The buffer has a fixed capacity: once full, further points are silently dropped
/// (the gesture is truncated, older points are never evicted). Equality and hashing
/// look at the stored points only, so a clone can serve as a cache key.
#[derive(Debug, Clone)]
pub struct GesturePath {
    xs: Vec<f32>,
    ys: Vec<f32>,
    capacity: usize,
}

impl Default for GesturePath {
    fn default() -> Self {
        Self::new()
    }
}

impl GesturePath {
    pub fn new() -> Self {
        Self::with_capacity(MAX_GESTURE_POINTS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            xs: Vec::with_capacity(capacity),
            ys: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Builds a path from existing points. Capacity grows to fit them if needed.
    pub fn from_points<I: IntoIterator<Item = Point2D>>(points: I) -> Self {
        let points: Vec<Point2D> = points.into_iter().collect();
        let mut path = Self::with_capacity(points.len().max(MAX_GESTURE_POINTS));
        for p in points {
            path.add_point(p.x, p.y);
        }
        path
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline(always)]
    pub fn is_full(&self) -> bool {
        self.xs.len() >= self.capacity
    }

    /// Appends a point. Returns false when the buffer is full or the point is not finite.
    pub fn add_point(&mut self, x: f32, y: f32) -> bool {
        if self.is_full() || !x.is_finite() || !y.is_finite() {
            return false;
        }
        self.xs.push(x);
        self.ys.push(y);
        true
    }

    /// Live-input variant: also rejects points within `min_distance_sq` of the last one.
    pub fn add_point_filtered(&mut self, x: f32, y: f32, min_distance_sq: f32) -> bool {
        if let Some(last) = self.last() {
            let dx = last.x - x;
            let dy = last.y - y;
            if dx * dx + dy * dy <= min_distance_sq {
                return false;
            }
        }
        self.add_point(x, y)
    }

    pub fn clear(&mut self) {
        self.xs.clear();
        self.ys.clear();
    }

    pub fn point(&self, i: usize) -> Option<Point2D> {
        Some(Point2D::new(*self.xs.get(i)?, *self.ys.get(i)?))
    }

    pub fn first(&self) -> Option<Point2D> {
        self.point(0)
    }

    pub fn last(&self) -> Option<Point2D> {
        self.len().checked_sub(1).and_then(|i| self.point(i))
    }

    pub fn xs(&self) -> &[f32] {
        &self.xs
    }

    pub fn ys(&self) -> &[f32] {
        &self.ys
    }

    pub fn points(&self) -> impl Iterator<Item = Point2D> + '_ {
        self.xs
            .iter()
            .zip(self.ys.iter())
            .map(|(&x, &y)| Point2D::new(x, y))
    }

    /// Sum of the distances between consecutive points.
    pub fn length(&self) -> f32 {
        let mut length = 0.0;
        for i in 1..self.len() {
            length += distance(self.xs[i - 1], self.ys[i - 1], self.xs[i], self.ys[i]);
        }
        length
    }

    /// Resamples the trace into exactly `n` points spaced evenly along its length.
    ///
    /// Each segment contributes `segment_length / spacing` points; the fractional
    /// parts are accumulated and flushed as extra points once they add up to a whole
    /// one. Any shortfall left by rounding is padded with the final point.
    pub fn resample(&self, n: usize) -> GesturePath {
        let mut out = GesturePath::with_capacity(n);
        let (Some(first), Some(end)) = (self.first(), self.last()) else {
            return out;
        };

        let total = self.length();
        if self.len() == 1 || !(total > 0.0) {
            while out.add_point(first.x, first.y) {}
            return out;
        }

        let spacing = total / n as f32;
        out.add_point(first.x, first.y);
        let mut last_x = first.x;
        let mut last_y = first.y;
        let mut cumulative_error = 0.0f32;

        'segments: for i in 0..self.len() - 1 {
            let dx = self.xs[i + 1] - self.xs[i];
            let dy = self.ys[i + 1] - self.ys[i];
            let norm = (dx * dx + dy * dy).sqrt();
            if norm <= 0.0 {
                continue;
            }
            let ux = dx / norm;
            let uy = dy / norm;

            let exact = norm / spacing;
            let mut count = exact.trunc();
            cumulative_error += exact - count;
            if cumulative_error >= 1.0 {
                count += cumulative_error.trunc();
                cumulative_error = cumulative_error.fract();
            }

            for _ in 0..count as usize {
                if out.is_full() {
                    break 'segments;
                }
                last_x += ux * spacing;
                last_y += uy * spacing;
                out.add_point(last_x, last_y);
            }
        }

        while out.add_point(end.x, end.y) {}
        out
    }

    /// Maps the trace into its own bounding box: `(p - min) / longest_side - centroid`.
    /// Removes translation and scale, keeps rotation.
    pub fn normalize_by_bounding_box(&self) -> GesturePath {
        let mut out = GesturePath::with_capacity(self.len().max(1));
        if self.is_empty() {
            return out;
        }

        let (mut min_x, mut min_y) = (f32::INFINITY, f32::INFINITY);
        let (mut max_x, mut max_y) = (f32::NEG_INFINITY, f32::NEG_INFINITY);
        for (&x, &y) in self.xs.iter().zip(self.ys.iter()) {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }

        let width = max_x - min_x;
        let height = max_y - min_y;
        let longest_side = width.max(height).max(MIN_BOX_SIDE);
        let centroid_x = (width / 2.0) / longest_side;
        let centroid_y = (height / 2.0) / longest_side;

        for (&x, &y) in self.xs.iter().zip(self.ys.iter()) {
            out.add_point(
                (x - min_x) / longest_side - centroid_x,
                (y - min_y) / longest_side - centroid_y,
            );
        }
        out
    }
}

impl PartialEq for GesturePath {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .xs
                .iter()
                .zip(other.xs.iter())
                .all(|(a, b)| a.to_bits() == b.to_bits())
            && self
                .ys
                .iter()
                .zip(other.ys.iter())
                .all(|(a, b)| a.to_bits() == b.to_bits())
    }
}

impl Eq for GesturePath {}

impl Hash for GesturePath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for (x, y) in self.xs.iter().zip(self.ys.iter()) {
            x.to_bits().hash(state);
            y.to_bits().hash(state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: usize, step: f32) -> GesturePath {
        GesturePath::from_points((0..n).map(|i| Point2D::new(i as f32 * step, 0.0)))
    }

    #[test]
    fn test_capacity_truncates_silently() {
        let mut g = GesturePath::with_capacity(3);
        assert!(g.add_point(0.0, 0.0));
        assert!(g.add_point(1.0, 0.0));
        assert!(g.add_point(2.0, 0.0));
        assert!(!g.add_point(3.0, 0.0));
        assert_eq!(g.len(), 3);
        assert_eq!(g.last(), Some(Point2D::new(2.0, 0.0)));
    }

    #[test]
    fn test_filtered_add_rejects_close_points() {
        let mut g = GesturePath::new();
        assert!(g.add_point_filtered(0.0, 0.0, 1000.0));
        assert!(!g.add_point_filtered(10.0, 10.0, 1000.0));
        assert!(g.add_point_filtered(40.0, 0.0, 1000.0));
        assert_eq!(g.len(), 2);
    }

    #[test]
    fn test_rejects_non_finite() {
        let mut g = GesturePath::new();
        assert!(!g.add_point(f32::NAN, 0.0));
        assert!(!g.add_point(0.0, f32::INFINITY));
        assert!(g.is_empty());
    }

    #[test]
    fn test_length() {
        let g = GesturePath::from_points([
            Point2D::new(0.0, 0.0),
            Point2D::new(3.0, 4.0),
            Point2D::new(3.0, 0.0),
        ]);
        assert!((g.length() - 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_resample_single_point_replicates() {
        let g = GesturePath::from_points([Point2D::new(5.0, 7.0)]);
        let r = g.resample(10);
        assert_eq!(r.len(), 10);
        assert!(r.points().all(|p| p == Point2D::new(5.0, 7.0)));
    }

    #[test]
    fn test_resample_zero_length_path() {
        let g = GesturePath::from_points([Point2D::new(1.0, 1.0); 4]);
        let r = g.resample(25);
        assert_eq!(r.len(), 25);
    }

    #[test]
    fn test_resample_keeps_endpoints() {
        let r = line(5, 10.0).resample(200);
        assert_eq!(r.len(), 200);
        assert_eq!(r.first(), Some(Point2D::new(0.0, 0.0)));
        let last = r.last().unwrap();
        assert!((last.x - 40.0).abs() < 0.5, "last x = {}", last.x);
    }

    #[test]
    fn test_resample_empty() {
        assert!(GesturePath::new().resample(10).is_empty());
        assert!(line(3, 1.0).resample(0).is_empty());
    }

    #[test]
    fn test_normalize_unit_box() {
        let g = GesturePath::from_points([Point2D::new(10.0, 10.0), Point2D::new(30.0, 20.0)]);
        let n = g.normalize_by_bounding_box();
        assert_eq!(n.point(0), Some(Point2D::new(-0.5, -0.25)));
        assert_eq!(n.point(1), Some(Point2D::new(0.5, 0.25)));
    }

    #[test]
    fn test_normalize_degenerate_box() {
        let g = GesturePath::from_points([Point2D::new(3.0, 3.0); 3]);
        let n = g.normalize_by_bounding_box();
        assert!(n.points().all(|p| p.x.is_finite() && p.y.is_finite()));
    }

    #[test]
    fn test_content_equality_ignores_capacity() {
        let mut a = GesturePath::with_capacity(10);
        let mut b = GesturePath::with_capacity(300);
        a.add_point(1.0, 2.0);
        b.add_point(1.0, 2.0);
        assert_eq!(a, b);
        b.add_point(3.0, 4.0);
        assert_ne!(a, b);
    }
}
