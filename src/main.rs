use clap::{Parser, Subcommand};
use std::path::PathBuf;
use stems2seg::{Config, SegmentPipeline};

/// Lyric-Aligned Stem Segmentation
#[derive(Parser)]
#[command(name = "stems2seg")]
#[command(about = "Cut multi-track song recordings into lyric-labeled training segments")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Segment every song directory under a dataset root
    Process {
        /// Dataset directory (one subdirectory per song)
        dataset: PathBuf,

        /// Output directory for segment artifacts
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Custom configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// One channel per known stem instead of the grouped layout
        #[arg(long)]
        flat_channels: bool,

        /// Quiet output
        #[arg(short, long)]
        quiet: bool,
    },
    /// Validate configuration file
    ValidateConfig {
        /// Configuration file to validate
        config: PathBuf,
    },
    /// Show default configuration
    ShowConfig,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            dataset,
            output,
            config,
            flat_channels,
            quiet,
        } => {
            let mut config = if let Some(config_path) = config {
                stems2seg::config::load_config(config_path)?
            } else {
                Config::default()
            };
            if let Some(output) = output {
                config.segment_output_dir = Some(output);
            }
            if flat_channels {
                config.use_grouped_channels = false;
            }

            let pipeline = SegmentPipeline::new(config)?;

            if !quiet {
                println!("Processing dataset {}...", dataset.display());
            }

            let summary = pipeline.process_dataset(&dataset)?;

            if !quiet {
                println!(
                    "Done: {} songs processed, {} skipped, {} failed, {} windows written",
                    summary.songs_processed,
                    summary.songs_skipped,
                    summary.songs_failed,
                    summary.windows_written
                );
            }
        }
        Commands::ValidateConfig { config } => {
            let config = stems2seg::config::load_config(config)?;
            println!("Configuration is valid");
            if let Ok(json) = serde_json::to_string_pretty(&config) {
                println!("{}", json);
            }
        }
        Commands::ShowConfig => {
            let config = Config::default();
            let json = serde_json::to_string_pretty(&config)?;
            println!("{}", json);
        }
    }

    Ok(())
}
