//! CLI module for postforge
//!
//! Command-line interface definitions and handlers.
//!
//! # Commands
//!
//! - `generate` - Generate one post from a topic
//! - `batch` - Generate posts for every topic in a file
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Generate a post and write it as JSON
//! postforge generate "Intermittent Fasting" -o fasting.json
//!
//! # Generate shell completions
//! postforge completions bash > ~/.bash_completion.d/postforge
//! ```

pub mod batch;
pub mod completions;
pub mod config;
pub mod generate;
pub mod output;

pub use completions::handle_completions;
pub use config::handle_config_init;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// postforge - long-form post generation pipeline
#[derive(Parser, Debug)]
#[command(
    name = "postforge",
    version,
    about = "Generate structured blog posts from a topic"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate one post
    Generate(GenerateArgs),
    /// Generate posts for a list of topics
    Batch(BatchArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Options shared by every command that runs the pipeline
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "postforge.toml")]
    pub config: PathBuf,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "POSTFORGE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Skip the delays between generation calls
    #[arg(long)]
    pub no_throttle: bool,

    /// Do not generate image URLs
    #[arg(long)]
    pub no_images: bool,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Topic of the post
    pub topic: String,

    /// Write the post as JSON to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the full result as JSON instead of a summary
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// File with one topic per line (# starts a comment)
    pub file: PathBuf,

    /// Directory for generated posts, one <NNN>-<slug>.json per topic
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Print batch results as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = "postforge.toml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
