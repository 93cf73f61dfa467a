pub mod cache;
pub mod classifier;
pub mod config;
pub mod consts;
pub mod dictionary;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod loader;
pub mod scorer;
pub mod session;

pub use classifier::{GlideClassifier, Recognizer};
pub use config::ClassifierConfig;
pub use dictionary::WordFrequencyTable;
pub use error::{GlideError, GlideResult};
pub use geometry::{KeyGeometry, KeyboardGeometry};
pub use gesture::{GesturePath, Point2D};
pub use scorer::ScoredCandidate;
pub use session::{GlideSession, SessionOptions, SuggestionReceiver, TouchEvent, TouchPhase};
