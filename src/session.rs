use crate::classifier::GlideClassifier;
use crate::config::ClassifierConfig;
use crate::consts;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};
use strum_macros::{AsRefStr, Display, EnumString};
use tracing::{debug, trace};
use typed_builder::TypedBuilder;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TouchPhase {
    Begin,
    Move,
    End,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    pub x: f32,
    pub y: f32,
    pub timestamp_ms: i64,
    pub phase: TouchPhase,
}

impl TouchEvent {
    pub fn new(x: f32, y: f32, timestamp_ms: i64, phase: TouchPhase) -> Self {
        Self {
            x,
            y,
            timestamp_ms,
            phase,
        }
    }
}

/// Result of one background query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionUpdate {
    /// Dispatch order within the session; newer queries have larger numbers.
    pub seq: u64,
    pub timestamp_ms: i64,
    pub completed: bool,
    pub words: Vec<String>,
}

#[derive(Debug, Clone, TypedBuilder)]
pub struct SessionOptions {
    #[builder(default = consts::DEFAULT_SUGGESTION_COUNT)]
    pub max_suggestions: usize,
    #[builder(default = consts::UPDATE_INTERVAL_MS)]
    pub update_interval_ms: i64,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl SessionOptions {
    /// Session tuning taken from a classifier configuration.
    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self::builder()
            .update_interval_ms(config.update_interval_ms)
            .build()
    }
}

/// Drives a classifier from a touch stream.
///
/// Point appends happen on the caller's thread; suggestion queries run on the rayon
/// pool against a snapshot of the gesture and report through a `SuggestionReceiver`.
pub struct GlideSession {
    classifier: GlideClassifier,
    options: SessionOptions,
    tx: Sender<SuggestionUpdate>,
    seq: u64,
    last_dispatch: Option<i64>,
}

impl GlideSession {
    pub fn new(classifier: GlideClassifier, options: SessionOptions) -> (Self, SuggestionReceiver) {
        let (tx, rx) = mpsc::channel();
        let session = Self {
            classifier,
            options,
            tx,
            seq: 0,
            last_dispatch: None,
        };
        (session, SuggestionReceiver::new(rx))
    }

    /// Session throttled by the `update_interval_ms` of the classifier's own config.
    pub fn for_classifier(classifier: GlideClassifier) -> (Self, SuggestionReceiver) {
        let options = SessionOptions::from_config(classifier.recognizer().config());
        Self::new(classifier, options)
    }

    /// Feeds one event. Returns the sequence number of the query it dispatched, if any.
    pub fn handle(&mut self, event: TouchEvent) -> Option<u64> {
        match event.phase {
            TouchPhase::Begin => {
                self.classifier.clear();
                self.classifier.add_gesture_point(event.x, event.y);
                self.last_dispatch = Some(event.timestamp_ms);
                None
            }
            TouchPhase::Move => {
                self.classifier.add_gesture_point(event.x, event.y);
                let due = self
                    .last_dispatch
                    .map_or(true, |t| event.timestamp_ms - t >= self.options.update_interval_ms);
                due.then(|| self.dispatch(event.timestamp_ms, false))
            }
            TouchPhase::End => {
                self.classifier.add_gesture_point(event.x, event.y);
                Some(self.dispatch(event.timestamp_ms, true))
            }
            TouchPhase::Cancel => {
                self.classifier.clear();
                self.last_dispatch = None;
                let seq = self.next_seq();
                // Supersedes anything still in flight
                let _ = self.tx.send(SuggestionUpdate {
                    seq,
                    timestamp_ms: event.timestamp_ms,
                    completed: true,
                    words: Vec::new(),
                });
                Some(seq)
            }
        }
    }

    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    fn dispatch(&mut self, timestamp_ms: i64, completed: bool) -> u64 {
        let seq = self.next_seq();
        self.last_dispatch = Some(timestamp_ms);

        let snapshot = self.classifier.snapshot();
        let recognizer = Arc::clone(self.classifier.recognizer());
        let max_count = self.options.max_suggestions;
        let tx = self.tx.clone();
        debug!(seq, completed, points = snapshot.len(), "Dispatching query");

        rayon::spawn(move || {
            let words = recognizer.suggest(&snapshot, max_count, completed);
            // Receiver dropped means nobody is listening any more
            let _ = tx.send(SuggestionUpdate {
                seq,
                timestamp_ms,
                completed,
                words,
            });
        });
        seq
    }

    pub fn classifier(&self) -> &GlideClassifier {
        &self.classifier
    }

    pub fn classifier_mut(&mut self) -> &mut GlideClassifier {
        &mut self.classifier
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }
}

/// Consumer side of a session. Hands out updates in increasing `seq` order and drops
/// any result that arrives after a newer one was delivered.
pub struct SuggestionReceiver {
    rx: Receiver<SuggestionUpdate>,
    newest: Option<u64>,
}

impl SuggestionReceiver {
    fn new(rx: Receiver<SuggestionUpdate>) -> Self {
        Self { rx, newest: None }
    }

    pub fn newest(&self) -> Option<u64> {
        self.newest
    }

    fn accept(&mut self, update: SuggestionUpdate) -> Option<SuggestionUpdate> {
        if self.newest.is_some_and(|n| update.seq <= n) {
            trace!("Discarding superseded result #{}", update.seq);
            return None;
        }
        self.newest = Some(update.seq);
        Some(update)
    }

    /// Next fresh update that is already available, without blocking.
    pub fn try_next(&mut self) -> Option<SuggestionUpdate> {
        while let Ok(update) = self.rx.try_recv() {
            if let Some(update) = self.accept(update) {
                return Some(update);
            }
        }
        None
    }

    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<SuggestionUpdate> {
        let deadline = Instant::now() + timeout;
        loop {
            let left = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(left) {
                Ok(update) => {
                    if let Some(update) = self.accept(update) {
                        return Some(update);
                    }
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return None
                }
            }
        }
    }

    /// Blocks until a completion result (end or cancel) arrives.
    pub fn wait_for_completion(&mut self, timeout: Duration) -> Option<SuggestionUpdate> {
        let deadline = Instant::now() + timeout;
        loop {
            let left = deadline.saturating_duration_since(Instant::now());
            let update = self.recv_timeout(left)?;
            if update.completed {
                return Some(update);
            }
        }
    }
}
