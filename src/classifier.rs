use crate::cache::{ModelId, QueryKey, ResultCache};
use crate::config::ClassifierConfig;
use crate::dictionary::WordFrequencyTable;
use crate::error::GlideResult;
use crate::geometry::KeyboardGeometry;
use crate::gesture::{GesturePath, Point2D};
use crate::scorer::{Pruner, ScoredCandidate, ScoringEngine};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, debug_span, info, trace};

/// Everything a query needs, frozen at activation time.
#[derive(Debug)]
pub struct ActiveModel {
    pub id: ModelId,
    pub geometry: Arc<KeyboardGeometry>,
    pub words: Arc<WordFrequencyTable>,
    pub pruner: Arc<Pruner>,
}

#[derive(Debug, Default)]
struct ModelState {
    layout: Option<Arc<KeyboardGeometry>>,
    words: Option<Arc<WordFrequencyTable>>,
    active: Option<Arc<ActiveModel>>,
}

/// Thread-safe recognition core. Holds the active layout and word table plus the
/// caches, and answers queries for any gesture snapshot.
///
/// Shared between input surfaces through `Arc`; each surface keeps its own
/// `GlideClassifier` (and therefore its own gesture buffer).
#[derive(Debug)]
pub struct Recognizer {
    config: ClassifierConfig,
    engine: ScoringEngine,
    state: RwLock<ModelState>,
    cache: ResultCache,
    // f32 bits of the live point filter for the active layout
    min_distance_sq: AtomicU32,
}

impl Recognizer {
    pub fn new(config: ClassifierConfig) -> GlideResult<Self> {
        config.validate()?;
        Ok(Self {
            engine: ScoringEngine::from_config(&config),
            cache: ResultCache::new(config.suggestion_cache_size, config.pruner_cache_size),
            state: RwLock::new(ModelState::default()),
            min_distance_sq: AtomicU32::new(
                config.min_point_distance_sq.unwrap_or(0.0).to_bits(),
            ),
            config,
        })
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    fn read_state(&self) -> RwLockReadGuard<'_, ModelState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, ModelState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn layout(&self) -> Option<Arc<KeyboardGeometry>> {
        self.read_state().layout.clone()
    }

    pub fn words(&self) -> Option<Arc<WordFrequencyTable>> {
        self.read_state().words.clone()
    }

    pub fn active(&self) -> Option<Arc<ActiveModel>> {
        self.read_state().active.clone()
    }

    pub fn is_ready(&self) -> bool {
        self.read_state().active.is_some()
    }

    /// Squared distance under which a live point is dropped as a duplicate of the
    /// previous one. Configured, or `(first key width / 4)²` of the active layout.
    pub fn min_point_distance_sq(&self) -> f32 {
        f32::from_bits(self.min_distance_sq.load(Ordering::Acquire))
    }

    /// Activates a layout. Returns false (and does nothing) when the identity is unchanged.
    pub fn set_layout(&self, geometry: KeyboardGeometry) -> bool {
        let mut state = self.write_state();
        if let Some(current) = &state.layout {
            if current.id() == geometry.id() {
                return false;
            }
            if current.name() == geometry.name() {
                // Same subtype, new key positions: nothing built for it is reusable
                self.cache.evict_layout(geometry.name());
            }
        }

        info!(
            "Layout '{}' active: {} keys ({})",
            geometry.name(),
            geometry.keys().len(),
            &geometry.id().fingerprint[..12]
        );
        if self.config.min_point_distance_sq.is_none() {
            let derived = geometry
                .keys()
                .first()
                .map_or(0.0, |key| (key.width / 4.0).powi(2));
            self.min_distance_sq.store(derived.to_bits(), Ordering::Release);
        }
        state.layout = Some(Arc::new(geometry));
        self.activate(&mut state);
        true
    }

    /// Activates a word table. Returns false (and does nothing) when the identity is unchanged.
    pub fn set_word_data(&self, words: WordFrequencyTable) -> bool {
        let mut state = self.write_state();
        if let Some(current) = &state.words {
            if current.id() == words.id() {
                return false;
            }
            if current.name() == words.name() {
                self.cache.evict_words(words.name());
            }
        }

        info!(
            "Word table '{}' active: {} words ({})",
            words.name(),
            words.len(),
            &words.id().fingerprint[..12]
        );
        state.words = Some(Arc::new(words));
        self.activate(&mut state);
        true
    }

    // Caller holds the state write lock, so no query can store results for the old model
    fn activate(&self, state: &mut ModelState) {
        self.cache.invalidate_queries();

        state.active = match (&state.layout, &state.words) {
            (Some(geometry), Some(words)) => {
                let id = ModelId {
                    layout: geometry.id().clone(),
                    words: words.id().clone(),
                };
                let pruner = match self.cache.pruner(&id) {
                    Some(pruner) => {
                        debug!("Reusing cached pruner for '{}'/'{}'", id.layout.name, id.words.name);
                        pruner
                    }
                    None => {
                        let pruner = Arc::new(Pruner::new(words, geometry, &self.config));
                        self.cache.store_pruner(id.clone(), Arc::clone(&pruner));
                        pruner
                    }
                };
                Some(Arc::new(ActiveModel {
                    id,
                    geometry: Arc::clone(geometry),
                    words: Arc::clone(words),
                    pruner,
                }))
            }
            _ => None,
        };
    }

    /// Ranked, duplicate-free words for `gesture`, best first, at most `max_count`.
    ///
    /// Never fails: missing model, empty gesture and zero `max_count` all give `[]`.
    pub fn suggest(&self, gesture: &GesturePath, max_count: usize, completed: bool) -> Vec<String> {
        let span = debug_span!("suggest", points = gesture.len(), max_count, completed);
        let _enter = span.enter();

        if max_count == 0 || gesture.is_empty() {
            return Vec::new();
        }
        let Some(model) = self.active() else {
            debug!("No active layout/word table");
            return Vec::new();
        };

        let key = QueryKey {
            model: model.id.clone(),
            gesture: gesture.clone(),
            max_count,
        };
        if let Some(hit) = self.cache.suggestions(&key) {
            debug!("Query cache hit");
            return hit;
        }

        let words: Vec<String> = self
            .rank_with(&model, gesture, max_count)
            .into_iter()
            .map(|c| c.word)
            .collect();

        let state = self.read_state();
        if state.active.as_ref().is_some_and(|a| a.id == model.id) {
            self.cache.store_suggestions(key, words.clone());
        }
        words
    }

    /// Like `suggest` but uncached and with full scores.
    pub fn rank(&self, gesture: &GesturePath, max_count: usize) -> Vec<ScoredCandidate> {
        if max_count == 0 || gesture.is_empty() {
            return Vec::new();
        }
        match self.active() {
            Some(model) => self.rank_with(&model, gesture, max_count),
            None => Vec::new(),
        }
    }

    fn rank_with(
        &self,
        model: &ActiveModel,
        gesture: &GesturePath,
        max_count: usize,
    ) -> Vec<ScoredCandidate> {
        let geometry = &model.geometry;
        let Some(radius) = geometry.representative_radius() else {
            return Vec::new();
        };

        let by_extremities = model.pruner.prune_by_extremities(gesture, geometry);
        let by_length = model
            .pruner
            .prune_by_length(gesture, &by_extremities, geometry);
        debug!(
            "Candidates: {} after extremities, {} after length",
            by_extremities.len(),
            by_length.len()
        );
        if by_length.is_empty() {
            return Vec::new();
        }

        let user = self.engine.prepare(gesture);
        self.engine
            .rank(&by_length, &model.words, &user, radius, max_count)
    }
}

/// Per-surface façade: one live gesture buffer in front of a shared `Recognizer`.
///
/// Single writer: points are appended through `&mut self`, queries borrow the buffer
/// (or a `snapshot`) immutably.
#[derive(Debug)]
pub struct GlideClassifier {
    gesture: GesturePath,
    recognizer: Arc<Recognizer>,
}

impl GlideClassifier {
    pub fn new(config: ClassifierConfig) -> GlideResult<Self> {
        Ok(Self::from_recognizer(Arc::new(Recognizer::new(config)?)))
    }

    pub fn from_recognizer(recognizer: Arc<Recognizer>) -> Self {
        Self {
            gesture: GesturePath::with_capacity(recognizer.config().max_gesture_points),
            recognizer,
        }
    }

    /// Appends one live point unless it is too close to the previous one or the
    /// buffer is full.
    pub fn add_gesture_point(&mut self, x: f32, y: f32) -> bool {
        let min_distance_sq = self.recognizer.min_point_distance_sq();
        let accepted = self.gesture.add_point_filtered(x, y, min_distance_sq);
        if !accepted {
            trace!("Point ({}, {}) rejected", x, y);
        }
        accepted
    }

    /// Replaces the buffer with a recorded trace, filtered like live input.
    /// Returns how many points were kept.
    pub fn init_gesture_from_points<I: IntoIterator<Item = Point2D>>(&mut self, points: I) -> usize {
        self.gesture.clear();
        points
            .into_iter()
            .filter(|p| self.add_gesture_point(p.x, p.y))
            .count()
    }

    pub fn set_layout(&mut self, geometry: KeyboardGeometry) -> bool {
        self.recognizer.set_layout(geometry)
    }

    pub fn set_word_data(&mut self, words: WordFrequencyTable) -> bool {
        self.recognizer.set_word_data(words)
    }

    pub fn get_suggestions(&self, max_count: usize, gesture_completed: bool) -> Vec<String> {
        self.recognizer
            .suggest(&self.gesture, max_count, gesture_completed)
    }

    pub fn rank(&self, max_count: usize) -> Vec<ScoredCandidate> {
        self.recognizer.rank(&self.gesture, max_count)
    }

    /// Resets the live gesture only. Caches and the active model are kept.
    pub fn clear(&mut self) {
        self.gesture.clear();
    }

    pub fn gesture(&self) -> &GesturePath {
        &self.gesture
    }

    pub fn snapshot(&self) -> GesturePath {
        self.gesture.clone()
    }

    pub fn min_distance_sq(&self) -> f32 {
        self.recognizer.min_point_distance_sq()
    }

    pub fn recognizer(&self) -> &Arc<Recognizer> {
        &self.recognizer
    }

    pub fn is_ready(&self) -> bool {
        self.recognizer.is_ready()
    }
}
