use crate::cli::args::{Cli, Commands, TuningArgs};
use crate::config::ProcessingConfig;
use crate::processors::{IntegrityChecker, ParallelProcessor, ProcessingOutput};
use crate::utils::constants::STDIN_PATH;
use crate::utils::progress::ProgressReporter;
use crate::writers::ResultWriter;
use anyhow::{anyhow, bail, Context};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;
use std::sync::Mutex;
use tracing::{info, Level};
use validator::Validate;

pub fn run(cli: Cli) -> anyhow::Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    match cli.command {
        Commands::Process {
            input,
            output,
            format,
            quiet,
            tuning,
        } => {
            let writer = ResultWriter::new().with_format(&format)?;
            let config = load_config(cli.config.as_deref(), &tuning)?;
            let result = aggregate(&input, config, &tuning, quiet)?;

            match output {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("creating output file {}", path.display()))?;
                    writer.write(&result.stations, BufWriter::new(file))?;
                    info!(path = %path.display(), "results written");
                }
                None => writer.write(&result.stations, io::stdout().lock())?,
            }
        }

        Commands::Validate {
            input,
            quiet,
            tuning,
        } => {
            let config = load_config(cli.config.as_deref(), &tuning)?;
            let result = aggregate(&input, config, &tuning, quiet)?;

            let checker = IntegrityChecker::new();
            let report = checker.check_integrity(&result.stations, result.statistics.total_rows());

            println!("{}", result.statistics.summary());
            println!("\n{}", checker.generate_summary(&report));

            if !report.is_clean() {
                bail!("integrity check found {} violations", report.violations.len());
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool, log_file: Option<&Path>) -> anyhow::Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false);

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating log file {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(io::stderr).try_init(),
    }
    .map_err(|e| anyhow!(e))
}

/// Defaults, config file and environment, then CLI overrides.
fn load_config(path: Option<&Path>, tuning: &TuningArgs) -> anyhow::Result<ProcessingConfig> {
    let mut config = ProcessingConfig::load(path).context("loading configuration")?;

    if let Some(chunk_size) = tuning.chunk_size {
        config = config.with_chunk_size(chunk_size);
    }
    if let Some(workers) = tuning.max_workers {
        config = config.with_workers(workers);
    }
    if tuning.size_hint.is_some() {
        config = config.with_size_hint(tuning.size_hint);
    }
    if tuning.sequential_merge {
        config = config.with_parallel_merge(false);
    }

    config.validate().context("validating configuration")?;
    Ok(config)
}

fn aggregate(
    input: &Path,
    config: ProcessingConfig,
    tuning: &TuningArgs,
    quiet: bool,
) -> anyhow::Result<ProcessingOutput> {
    let processor = ParallelProcessor::new(config);
    let progress = progress_for(input, quiet)?;

    if input == Path::new(STDIN_PATH) {
        info!("reading measurements from stdin");
        return Ok(processor.process(io::stdin(), progress.as_ref())?);
    }

    processor
        .process_file(input, tuning.mmap, progress.as_ref())
        .with_context(|| format!("processing {}", input.display()))
}

/// Byte progress for a file input. Stdin and `--quiet` run without one.
fn progress_for(input: &Path, quiet: bool) -> anyhow::Result<Option<ProgressReporter>> {
    if quiet || input == Path::new(STDIN_PATH) {
        return Ok(None);
    }

    let total = std::fs::metadata(input)
        .with_context(|| format!("reading metadata of {}", input.display()))?
        .len();
    Ok(Some(ProgressReporter::new_bytes(
        Some(total),
        "Aggregating measurements...",
        false,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_stdin_runs_without_progress() -> anyhow::Result<()> {
        assert!(progress_for(Path::new(STDIN_PATH), false)?.is_none());
        Ok(())
    }

    #[test]
    fn test_quiet_file_runs_without_progress() -> anyhow::Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "Oslo;1.0")?;
        assert!(progress_for(file.path(), true)?.is_none());
        assert!(progress_for(file.path(), false)?.is_some());
        Ok(())
    }

    #[test]
    fn test_missing_input_is_reported() {
        let err = progress_for(Path::new("/nonexistent/measurements.txt"), false).unwrap_err();
        assert!(err.to_string().contains("reading metadata"));
    }
}
