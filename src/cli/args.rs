use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "envmon-processor")]
#[command(about = "Grid-quantized aggregation and temperature classification for sensor streams")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Hide progress bars")]
    pub quiet: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(long, global = true, help = "Settings file (TOML, YAML or JSON)")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Map raw readings to grid-quantized measurement lines
    Map {
        #[arg(short, long, help = "Raw reading file [default: stdin]")]
        input: Option<PathBuf>,

        #[arg(short, long)]
        grid_size: Option<f64>,
    },

    /// Aggregate measurements per device and write training/test datasets
    Aggregate {
        #[arg(short, long, help = "Measurement file [default: stdin]")]
        input: Option<PathBuf>,

        #[arg(
            short,
            long,
            help = "Dataset directory [default: output/dataset-{YYMMDD}]"
        )]
        output_dir: Option<PathBuf>,

        #[arg(short, long)]
        grid_size: Option<f64>,

        #[arg(long, help = "Count each line once, ignoring its occurrence field")]
        single: bool,

        #[arg(short, long, help = "Output delimiter: ',' or 'tab'")]
        delimiter: Option<String>,
    },

    /// Print the current aggregate of one device as JSON
    Inspect {
        #[arg(long)]
        device: String,

        #[arg(short, long, help = "Measurement file [default: stdin]")]
        input: Option<PathBuf>,

        #[arg(long, help = "Count each line once, ignoring its occurrence field")]
        single: bool,
    },

    /// Report the peak temperature of each device and where it occurred
    Peaks {
        #[arg(short, long, help = "Measurement file [default: stdin]")]
        input: Option<PathBuf>,
    },

    /// Collapse instantaneous readings into hourly averaged readings
    Summarize {
        #[arg(short, long, help = "Instantaneous reading file [default: stdin]")]
        input: Option<PathBuf>,

        #[arg(short, long)]
        window_size: Option<usize>,
    },

    /// Classify averaged readings and print an alert signal for each
    Classify {
        #[arg(short, long, help = "Labelled training CSV")]
        training: PathBuf,

        #[arg(short, long, help = "Averaged reading file [default: stdin]")]
        input: Option<PathBuf>,
    },

    /// Stream measurements, classify each device's running aggregate and raise alerts
    Monitor {
        #[arg(short, long, help = "Labelled training CSV")]
        training: PathBuf,

        #[arg(short, long, help = "Measurement file [default: stdin]")]
        input: Option<PathBuf>,

        #[arg(long, help = "Write classified records to this file")]
        records_out: Option<PathBuf>,
    },

    /// Fit on a training CSV and score a labelled test CSV
    Evaluate {
        #[arg(short, long, help = "Labelled training CSV")]
        training: PathBuf,

        #[arg(long, help = "Labelled test CSV")]
        test: PathBuf,

        #[arg(long, default_value_t = num_cpus::get())]
        max_workers: usize,
    },
}
