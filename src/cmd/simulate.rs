use crate::reports;
use clap::Args;
use glideforge::config::ClassifierConfig;
use glideforge::consts::DEFAULT_SUGGESTION_COUNT;
use glideforge::error::{GlideError, GlideResult};
use glideforge::geometry::KeyboardGeometry;
use glideforge::gesture::ideal::{trace_word, VariantKind};
use glideforge::{GlideClassifier, Point2D};
use std::sync::Arc;
use tracing::{debug, warn};

/// Spacing of synthesized touch samples, in layout units.
const SAMPLE_SPACING: f32 = 30.0;

#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub config: ClassifierConfig,

    /// Words to trace; defaults to the most frequent words of the list
    #[arg(long = "word")]
    pub targets: Vec<String>,

    /// Maximum random offset applied to every synthesized point
    #[arg(long, default_value_t = 8.0)]
    pub jitter: f32,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    #[arg(long, default_value_t = 20)]
    pub limit: usize,

    #[arg(short = 'n', long, default_value_t = DEFAULT_SUGGESTION_COUNT)]
    pub count: usize,
}

#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub word: String,
    pub points: usize,
    pub rank: Option<usize>,
    /// Ideal path the target was matched against, when it was ranked at all.
    pub variant: Option<VariantKind>,
    pub top: Option<String>,
}

pub fn run(args: SimulateArgs, mut classifier: GlideClassifier) -> GlideResult<()> {
    let recognizer = Arc::clone(classifier.recognizer());
    let (Some(geometry), Some(table)) = (recognizer.layout(), recognizer.words()) else {
        return Err(GlideError::Config(
            "simulate needs both a layout and a word list".into(),
        ));
    };

    let targets: Vec<String> = if args.targets.is_empty() {
        table
            .by_frequency()
            .into_iter()
            .take(args.limit)
            .map(|(w, _)| w.to_string())
            .collect()
    } else {
        args.targets.clone()
    };

    let mut rng = fastrand::Rng::with_seed(args.seed);
    let mut results = Vec::with_capacity(targets.len());
    for word in &targets {
        let Some(trace) = synthesize(word, &geometry, args.jitter, &mut rng) else {
            warn!("'{}' has no keys on layout '{}'", word, geometry.name());
            continue;
        };
        let points = classifier.init_gesture_from_points(trace);
        let ranked = classifier.rank(args.count);
        debug!(
            "{} -> {:?}",
            word,
            ranked.iter().map(|c| c.word.as_str()).collect::<Vec<_>>()
        );

        let hit = ranked.iter().position(|c| &c.word == word);
        results.push(SimulationResult {
            word: word.clone(),
            points,
            rank: hit.map(|i| i + 1),
            variant: hit.map(|i| ranked[i].variant),
            top: ranked.into_iter().next().map(|c| c.word),
        });
    }

    reports::print_simulation_report(&results, args.count);
    Ok(())
}

/// Noisy trace along the ideal path of `word`, sampled roughly every `SAMPLE_SPACING`.
fn synthesize(
    word: &str,
    geometry: &KeyboardGeometry,
    jitter: f32,
    rng: &mut fastrand::Rng,
) -> Option<Vec<Point2D>> {
    let (plain, _) = trace_word(word, geometry);
    if plain.is_empty() {
        return None;
    }

    let steps = ((plain.length() / SAMPLE_SPACING).ceil() as usize).max(2);
    let mut offset = || jitter * (rng.f32() * 2.0 - 1.0);
    Some(
        plain
            .resample(steps)
            .points()
            .map(|p| Point2D::new(p.x + offset(), p.y + offset()))
            .collect(),
    )
}
