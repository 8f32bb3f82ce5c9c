use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "brc-processor")]
#[command(about = "High-throughput min/mean/max aggregation of station temperature measurements")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(long, global = true, help = "Configuration file (TOML, YAML or JSON)")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Aggregate a measurements file and print min/mean/max per station
    Process {
        #[arg(short, long, help = "Measurements file, or '-' for standard input")]
        input: PathBuf,

        #[arg(short, long, help = "Write results to this file instead of stdout")]
        output: Option<PathBuf>,

        #[arg(short, long, default_value = "text", help = "Output format: text or json")]
        format: String,

        #[arg(short, long, help = "Hide the progress bar")]
        quiet: bool,

        #[command(flatten)]
        tuning: TuningArgs,
    },

    /// Aggregate a measurements file and check the result's integrity
    Validate {
        #[arg(short, long, help = "Measurements file, or '-' for standard input")]
        input: PathBuf,

        #[arg(short, long, help = "Hide the progress bar")]
        quiet: bool,

        #[command(flatten)]
        tuning: TuningArgs,
    },
}

/// Overrides applied on top of the loaded configuration.
#[derive(Args, Debug, Clone, Default)]
pub struct TuningArgs {
    #[arg(long, help = "Bytes per chunk")]
    pub chunk_size: Option<usize>,

    #[arg(long, help = "Number of reader workers [default: logical CPUs]")]
    pub max_workers: Option<usize>,

    #[arg(long, help = "Expected input size in bytes, used to presize storage")]
    pub size_hint: Option<u64>,

    #[arg(long, help = "Fold shards sequentially instead of a parallel reduce")]
    pub sequential_merge: bool,

    #[arg(long, help = "Memory-map the input file")]
    pub mmap: bool,
}
