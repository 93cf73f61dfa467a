use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use glideforge::config::ClassifierConfig;
use glideforge::loader;
use glideforge::GlideClassifier;
use std::fmt::Display;
use std::process;
use tracing::{error, info, Level};

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(
        global = true,
        short = 'l',
        long,
        default_value = "data/layouts/qwerty.json"
    )]
    layout: String,

    #[arg(global = true, long, default_value = "data/words/en_sample.csv")]
    words: String,

    #[arg(global = true, long = "config")]
    config_file: Option<String>,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Suggest(cmd::suggest::SuggestArgs),
    Simulate(cmd::simulate::SimulateArgs),
}

fn fatal(e: impl Display) -> ! {
    error!("{}", e);
    process::exit(1);
}

fn main() {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let level = if cli.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let (cli_config, sub_matches) = match &cli.command {
        Commands::Suggest(args) => (&args.config, matches.subcommand_matches("suggest")),
        Commands::Simulate(args) => (&args.config, matches.subcommand_matches("simulate")),
    };

    // A config file is the base; flags given explicitly on the command line win
    let config = match &cli.config_file {
        Some(path) => {
            info!("Loading config from: {}", path);
            let mut file_config =
                ClassifierConfig::load_from_file(path).unwrap_or_else(|e| fatal(e));
            if let Some(sub) = sub_matches {
                file_config.merge_from_cli(cli_config, sub);
            }
            file_config
        }
        None => cli_config.clone(),
    };

    info!("Loading layout: {}", cli.layout);
    let geometry = loader::load_layout(&cli.layout).unwrap_or_else(|e| fatal(e));
    info!("Loading words: {}", cli.words);
    let words = loader::load_words(&cli.words).unwrap_or_else(|e| fatal(e));

    let mut classifier = GlideClassifier::new(config).unwrap_or_else(|e| fatal(e));
    classifier.set_layout(geometry);
    classifier.set_word_data(words);

    let result = match cli.command {
        Commands::Suggest(args) => cmd::suggest::run(args, classifier),
        Commands::Simulate(args) => cmd::simulate::run(args, classifier),
    };
    if let Err(e) = result {
        fatal(e);
    }
}
