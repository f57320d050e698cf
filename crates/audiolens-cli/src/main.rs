//! Audiolens CLI - audio understanding and batch evaluation

use anyhow::Result;
use clap::{Parser, Subcommand};
use audiolens_core::Config;

mod commands;

#[derive(Parser)]
#[command(name = "audiolens")]
#[command(version)]
#[command(about = "Offline audio understanding with batch evaluation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Runtime daemon endpoint (overrides config file and AUDIOLENS_ENDPOINT)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Verbose output (show timings and debug info)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Describe audio file(s)
    Transcribe {
        /// Path to a single audio file
        #[arg(long)]
        path: Option<String>,

        /// Paths to multiple audio files
        #[arg(long, num_args = 1..)]
        paths: Vec<String>,

        /// Optional prompt for conditioning
        #[arg(long)]
        prompt: Option<String>,

        /// Maximum number of tokens to generate
        #[arg(long, default_value_t = 128)]
        max_new_tokens: u32,

        /// Output JSON file (default: transcribe_results.json)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Evaluate the model on a folder of labeled audio
    Evaluate {
        /// Directory containing audio files (or category subdirectories)
        #[arg(long)]
        audio_dir: String,

        /// Directory containing ground-truth .txt files (not needed with
        /// --use-folder-as-label)
        #[arg(long)]
        gt_dir: Option<String>,

        /// Use subfolder names as ground-truth labels
        /// (e.g. audio_dir/piano/*.wav, audio_dir/guitar/*.wav)
        #[arg(long)]
        use_folder_as_label: bool,

        /// Optional prompt for conditioning
        #[arg(long)]
        prompt: Option<String>,

        /// Maximum number of tokens to generate
        #[arg(long, default_value_t = 128)]
        max_new_tokens: u32,

        /// Matching mode: 'exact', or 'contains' when the ground truth
        /// should appear inside the prediction
        #[arg(long, default_value = "exact")]
        match_mode: String,

        /// Output JSON file (default: evaluation_results.json)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Check the runtime daemon and print model/device info
    Health,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show config file path
    Path,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = Config::load(cli.config.as_deref())?;
    let endpoint = cli.endpoint.as_deref();

    match cli.command {
        Commands::Transcribe {
            path,
            paths,
            prompt,
            max_new_tokens,
            output,
        } => commands::transcribe::run(
            &config,
            endpoint,
            path.as_deref(),
            &paths,
            prompt.as_deref(),
            max_new_tokens,
            output.as_deref(),
        ),

        Commands::Evaluate {
            audio_dir,
            gt_dir,
            use_folder_as_label,
            prompt,
            max_new_tokens,
            match_mode,
            output,
        } => commands::evaluate::run(
            &config,
            endpoint,
            commands::evaluate::Args {
                audio_dir,
                gt_dir,
                use_folder_as_label,
                prompt,
                max_new_tokens,
                match_mode,
                output,
            },
        ),

        Commands::Health => commands::health::run(&config, endpoint),

        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(&config),
            ConfigAction::Path => commands::config::show_path(),
        },
    }
}
