use crate::reports;
use clap::Args;
use glideforge::config::ClassifierConfig;
use glideforge::consts::DEFAULT_SUGGESTION_COUNT;
use glideforge::error::GlideResult;
use glideforge::{loader, GlideClassifier};
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct SuggestArgs {
    #[command(flatten)]
    pub config: ClassifierConfig,

    /// Recorded gesture, one `x,y[,t]` row per point
    #[arg(short, long)]
    pub trace: String,

    #[arg(short = 'n', long, default_value_t = DEFAULT_SUGGESTION_COUNT)]
    pub count: usize,
}

pub fn run(args: SuggestArgs, mut classifier: GlideClassifier) -> GlideResult<()> {
    let points = loader::load_trace(&args.trace)?;
    let kept = classifier.init_gesture_from_points(points.iter().copied());
    info!(
        "Trace '{}': {} points, {} kept after filtering",
        args.trace,
        points.len(),
        kept
    );

    let ranked = classifier.rank(args.count);
    reports::print_suggestions(&args.trace, &ranked);
    Ok(())
}
