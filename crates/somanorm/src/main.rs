mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{DatasetSource, OutputFormat};
use somanorm_dataset::{BodyMeasurements, Reference};
use somanorm_loader::{DatasetLoader, LoaderConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "somanorm")]
#[command(author, version, about = "Body-metric percentiles against reference populations")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory dataset paths are relative to (default: $SOMANORM_DATA_ROOT or .)
    #[arg(long, global = true)]
    data_root: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List population and model datasets
    Datasets,

    /// Print a dataset in canonical form
    Inspect {
        #[command(flatten)]
        source: DatasetSource,
    },

    /// Percentile rank of a value for one metric
    Pr {
        #[command(flatten)]
        source: DatasetSource,

        /// Metric key (bmi, whtR, whr, shoulderHeightRatio, ...)
        #[arg(short, long)]
        metric: String,

        /// Value to rank
        value: f64,
    },

    /// Shoulder width percentile given height
    Shoulder {
        #[command(flatten)]
        source: DatasetSource,

        /// Height in cm
        #[arg(long)]
        height: f64,

        /// Shoulder (biacromial) width in cm
        #[arg(long)]
        shoulder: Option<f64>,

        /// Reference population: female, male or neutral
        #[arg(short, long, default_value = "neutral")]
        reference: Reference,

        /// Cohort key, overriding the reference's preference
        #[arg(short, long)]
        cohort: Option<String>,
    },

    /// Target range for a model segment
    Range {
        /// Model dataset file
        #[arg(short, long)]
        file: String,

        /// Segment type (flat, runway, ...)
        #[arg(short = 't', long = "type")]
        model_type: String,

        /// Metric key as used in the model file
        #[arg(short, long)]
        metric: String,

        /// Check whether this value falls inside the range
        #[arg(long)]
        value: Option<f64>,
    },

    /// Compute every ratio for a set of measurements and rank it
    Profile {
        #[command(flatten)]
        source: DatasetSource,

        /// Reference population: female, male or neutral
        #[arg(short, long, default_value = "neutral")]
        reference: Reference,

        #[arg(long)]
        height: f64,

        #[arg(long)]
        weight: Option<f64>,

        #[arg(long)]
        waist: Option<f64>,

        #[arg(long)]
        hip: Option<f64>,

        #[arg(long)]
        shoulder: Option<f64>,

        #[arg(long)]
        bust: Option<f64>,

        #[arg(long)]
        thigh: Option<f64>,

        #[arg(long)]
        calf: Option<f64>,

        /// Body fat percentage
        #[arg(long)]
        body_fat: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = LoaderConfig::from_env();
    if let Some(root) = cli.data_root {
        config = config.with_data_root(root);
    }
    let loader = DatasetLoader::new(config);
    let format = OutputFormat::from_flag(cli.json);

    match cli.command {
        Commands::Datasets => commands::datasets(&loader, format).await,
        Commands::Inspect { source } => commands::inspect(&loader, &source, format).await,
        Commands::Pr {
            source,
            metric,
            value,
        } => commands::pr(&loader, &source, &metric, value, format).await,
        Commands::Shoulder {
            source,
            height,
            shoulder,
            reference,
            cohort,
        } => {
            commands::shoulder(
                &loader,
                &source,
                height,
                shoulder,
                reference,
                cohort.as_deref(),
                format,
            )
            .await
        }
        Commands::Range {
            file,
            model_type,
            metric,
            value,
        } => commands::range(&loader, &file, &model_type, &metric, value, format).await,
        Commands::Profile {
            source,
            reference,
            height,
            weight,
            waist,
            hip,
            shoulder,
            bust,
            thigh,
            calf,
            body_fat,
        } => {
            let measurements = BodyMeasurements {
                height_cm: Some(height),
                weight_kg: weight,
                waist_cm: waist,
                hip_cm: hip,
                shoulder_cm: shoulder,
                bust_cm: bust,
                thigh_cm: thigh,
                calf_cm: calf,
                body_fat_pct: body_fat,
            };
            commands::profile(&loader, &source, reference, &measurements, format).await
        }
    }
}
