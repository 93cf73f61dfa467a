use crate::consts;
use crate::error::{GlideError, GlideResult};
use clap::{parser::ValueSource, ArgAction, ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    // === SCORING ===
    #[arg(long, default_value_t = consts::SAMPLING_POINTS)]
    pub sampling_points: usize,
    #[arg(long, default_value_t = consts::SHAPE_STD)]
    pub shape_std: f32,
    #[arg(long, default_value_t = consts::LOCATION_STD)]
    pub location_std: f32,

    // === PRUNING ===
    #[arg(long, default_value_t = consts::PRUNING_LENGTH_THRESHOLD)]
    pub length_threshold: f32,
    #[arg(long, default_value_t = consts::EXTREMITY_NEIGHBORS)]
    pub extremity_neighbors: usize,

    // === LIVE INPUT ===
    #[arg(long, default_value_t = consts::MAX_GESTURE_POINTS)]
    pub max_gesture_points: usize,

    // Unset: derived from the active layout as (key width / 4)^2
    #[arg(long)]
    pub min_point_distance_sq: Option<f32>,

    // === CACHES ===
    #[arg(long, default_value_t = consts::SUGGESTION_CACHE_SIZE)]
    pub suggestion_cache_size: usize,
    #[arg(long, default_value_t = consts::PRUNER_CACHE_SIZE)]
    pub pruner_cache_size: usize,
    #[arg(long, default_value_t = consts::IDEAL_CACHE_SIZE)]
    pub ideal_cache_size: usize,

    // === SESSION ===
    #[arg(long, default_value_t = consts::UPDATE_INTERVAL_MS)]
    pub update_interval_ms: i64,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub parallel_scoring: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            sampling_points: consts::SAMPLING_POINTS,
            shape_std: consts::SHAPE_STD,
            location_std: consts::LOCATION_STD,
            length_threshold: consts::PRUNING_LENGTH_THRESHOLD,
            extremity_neighbors: consts::EXTREMITY_NEIGHBORS,
            max_gesture_points: consts::MAX_GESTURE_POINTS,
            min_point_distance_sq: None,
            suggestion_cache_size: consts::SUGGESTION_CACHE_SIZE,
            pruner_cache_size: consts::PRUNER_CACHE_SIZE,
            ideal_cache_size: consts::IDEAL_CACHE_SIZE,
            update_interval_ms: consts::UPDATE_INTERVAL_MS,
            parallel_scoring: true,
        }
    }
}

impl ClassifierConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> GlideResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: ClassifierConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> GlideResult<()> {
        if self.sampling_points == 0 {
            return Err(GlideError::Config("sampling_points must be > 0".into()));
        }
        if !(self.shape_std > 0.0) || !(self.location_std > 0.0) {
            return Err(GlideError::Config(
                "shape_std and location_std must be positive".into(),
            ));
        }
        if !(self.length_threshold > 0.0) {
            return Err(GlideError::Config("length_threshold must be positive".into()));
        }
        if self.extremity_neighbors == 0 {
            return Err(GlideError::Config("extremity_neighbors must be > 0".into()));
        }
        if self.max_gesture_points == 0 {
            return Err(GlideError::Config("max_gesture_points must be > 0".into()));
        }
        if self.suggestion_cache_size == 0
            || self.pruner_cache_size == 0
            || self.ideal_cache_size == 0
        {
            return Err(GlideError::Config("cache sizes must be > 0".into()));
        }
        if let Some(d) = self.min_point_distance_sq {
            if !d.is_finite() || d < 0.0 {
                return Err(GlideError::Config(
                    "min_point_distance_sq must be a non-negative number".into(),
                ));
            }
        }
        Ok(())
    }

    /// Overwrites fields that were given explicitly on the command line.
    pub fn merge_from_cli(&mut self, cli: &ClassifierConfig, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($field:ident) => {
                if matches.value_source(stringify!($field)) == Some(ValueSource::CommandLine) {
                    self.$field = cli.$field.clone();
                }
            };
        }

        update_if_present!(sampling_points);
        update_if_present!(shape_std);
        update_if_present!(location_std);
        update_if_present!(length_threshold);
        update_if_present!(extremity_neighbors);
        update_if_present!(max_gesture_points);
        update_if_present!(min_point_distance_sq);
        update_if_present!(suggestion_cache_size);
        update_if_present!(pruner_cache_size);
        update_if_present!(ideal_cache_size);
        update_if_present!(update_interval_ms);
        update_if_present!(parallel_scoring);
    }
}
