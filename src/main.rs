use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use activity_clusters::commands;
use activity_clusters::commands::cluster::OutputFormat;
use activity_clusters::config::PipelineConfig;

#[derive(Parser)]
#[command(name = "activity-clusters", version)]
#[command(about = "Monthly developer activity series, elite labelling and KSC clustering")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the activity dataset from per-project monthly event logs
    Aggregate {
        /// Directory holding one sub-directory per project
        #[arg(long)]
        projects: PathBuf,
        /// CSV file to write
        #[arg(long)]
        output: PathBuf,
        /// Pipeline config (JSON); defaults apply to missing fields
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Cluster a dataset and report cohesion, centroids and cluster summaries
    Cluster {
        /// CSV file produced by `aggregate`
        #[arg(long)]
        dataset: PathBuf,
        /// Pipeline config (JSON); defaults apply to missing fields
        #[arg(long)]
        config: Option<PathBuf>,
        /// Cluster count of the detailed run
        #[arg(long)]
        k: Option<usize>,
        /// Smallest k of the cohesion sweep
        #[arg(long)]
        sweep_min: Option<usize>,
        /// Largest k of the cohesion sweep (inclusive)
        #[arg(long)]
        sweep_max: Option<usize>,
        /// RNG seed of the clusterer
        #[arg(long)]
        seed: Option<u64>,
        /// Keep zero counts as zero in the clustering input
        #[arg(long)]
        no_epsilon: bool,
        /// Output format: text or json
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Print the default pipeline config as JSON
    ConfigDefaults,
}

fn load_config(path: Option<&PathBuf>) -> Result<PipelineConfig> {
    match path {
        Some(p) => PipelineConfig::load_from_file(p),
        None => Ok(PipelineConfig::default()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("activity_clusters=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Aggregate {
            projects,
            output,
            config,
        } => {
            let config = load_config(config.as_ref())?;
            config.validate()?;
            commands::aggregate::run(&projects, &output, &config)?;
        }
        Commands::Cluster {
            dataset,
            config,
            k,
            sweep_min,
            sweep_max,
            seed,
            no_epsilon,
            format,
        } => {
            let format: OutputFormat = format.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            let mut config = load_config(config.as_ref())?;
            config.apply_overrides(k, sweep_min, sweep_max, seed, no_epsilon);
            config.validate()?;
            commands::cluster::run(&dataset, &config, format)?;
        }
        Commands::ConfigDefaults => {
            println!("{}", PipelineConfig::defaults_json()?);
        }
    }

    Ok(())
}
