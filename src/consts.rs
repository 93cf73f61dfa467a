/// Number of points user and ideal gestures are resampled to before scoring.
pub const SAMPLING_POINTS: usize = 200;

/// Standard deviation of the shape distance between two traces of the same word.
/// Expressed for normalized gestures, so it does not depend on the key size.
pub const SHAPE_STD: f32 = 22.08;

/// Standard deviation of the location distance between two traces of the same word,
/// as a factor of the key radius (applied to un-normalized gestures).
pub const LOCATION_STD: f32 = 0.5109;

/// Allowed difference between user and ideal gesture length, as a factor of the key radius.
pub const PRUNING_LENGTH_THRESHOLD: f32 = 8.42;

/// Keys considered around the first and last point of a gesture when pruning.
pub const EXTREMITY_NEIGHBORS: usize = 2;

/// Capacity of the live gesture buffer. Points past this are dropped.
pub const MAX_GESTURE_POINTS: usize = 300;

pub const SUGGESTION_CACHE_SIZE: usize = 5;
pub const PRUNER_CACHE_SIZE: usize = 5;

/// Ideal gestures memoized per pruner. Oldest entries are evicted first.
pub const IDEAL_CACHE_SIZE: usize = 10_000;

/// Minimum time between two in-progress suggestion queries of a session.
pub const UPDATE_INTERVAL_MS: i64 = 100;

/// Floor for the bounding box side used by normalization.
pub const MIN_BOX_SIDE: f32 = 0.00001;

/// Word frequencies are clamped into this range.
pub const MIN_FREQUENCY: u8 = 1;
pub const MAX_FREQUENCY: u8 = 255;

/// Suggestions requested per query when the caller does not say otherwise.
pub const DEFAULT_SUGGESTION_COUNT: usize = 5;
