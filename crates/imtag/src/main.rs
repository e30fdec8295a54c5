//! imtag CLI - zero-shot image tagging with user-registered labels.
//!
//! A pretrained classifier tags an image with its own labels; imtag maps
//! those into a word vector space and reports the nearest labels you
//! registered, even ones the classifier was never trained on.
//!
//! # Usage
//!
//! ```bash
//! # Register labels (all WordNet senses of each word)
//! imtag add-label dog cat vehicle
//!
//! # Tag a single image or a directory
//! imtag tag image.jpg -k 5
//! imtag tag ./photos/ --format jsonl --output tags.jsonl
//!
//! # Inspect what the engine knows about a word
//! imtag search retriever
//! imtag hierarchy dog
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// imtag - tag images with labels the classifier was never trained on.
#[derive(Parser, Debug)]
#[command(name = "imtag")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "IMTAG_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Tag images with the nearest registered labels
    Tag(cli::tag::TagArgs),

    /// Register one or more labels
    AddLabel(cli::labels::AddLabelArgs),

    /// List or remove registered labels
    Labels(cli::labels::LabelsArgs),

    /// Show whether a word has a vector and which senses it has
    Search(cli::lookup::SearchArgs),

    /// Show the broader concepts of a word, by level
    Hierarchy(cli::lookup::HierarchyArgs),

    /// List known classifiers and whether their files are installed
    Classifiers,

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match cli::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default logging settings. Check your config file with `imtag config path`."
            );
            imtag_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("imtag v{}", imtag_core::VERSION);

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Tag(args) => cli::tag::execute(args, cli::load_config(config_path)?).await,
        Commands::AddLabel(args) => cli::labels::add(args, cli::load_config(config_path)?),
        Commands::Labels(args) => cli::labels::execute(args, cli::load_config(config_path)?),
        Commands::Search(args) => cli::lookup::search(args, cli::load_config(config_path)?),
        Commands::Hierarchy(args) => cli::lookup::hierarchy(args, cli::load_config(config_path)?),
        Commands::Classifiers => cli::classifiers::execute(&cli::load_config(config_path)?),
        Commands::Config(args) => cli::config::execute(args, config_path),
    }
}
