use crate::config::ProcessingConfig;
use crate::error::Result;
use crate::models::StationStats;
use crate::processors::{sort_stations, ClippingReconciler, ShardMerger};
use crate::readers::ChunkReaderPool;
use crate::utils::progress::ProgressReporter;
use memmap2::Mmap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Counters and phase timings of one run.
#[derive(Debug, Clone, Default)]
pub struct RunStatistics {
    pub chunks: usize,
    pub bytes_read: u64,
    /// Lines parsed by the reader workers inside chunk bodies.
    pub rows_parsed: u64,
    /// Lines rebuilt from clippings.
    pub lines_stitched: u64,
    pub spanning_chunks: usize,
    pub shards: usize,
    pub read_time: Duration,
    pub reconcile_time: Duration,
    pub merge_time: Duration,
    pub sort_time: Duration,
}

impl RunStatistics {
    /// Every line of the input, counted once.
    pub fn total_rows(&self) -> u64 {
        self.rows_parsed + self.lines_stitched
    }

    pub fn summary(&self) -> String {
        format!(
            "Read {} bytes in {} chunks ({} rows, {} stitched, {} spanning chunks, {} shards)\n\
             read: {:?}, reconcile: {:?}, merge: {:?}, sort: {:?}",
            self.bytes_read,
            self.chunks,
            self.total_rows(),
            self.lines_stitched,
            self.spanning_chunks,
            self.shards,
            self.read_time,
            self.reconcile_time,
            self.merge_time,
            self.sort_time
        )
    }
}

#[derive(Debug)]
pub struct ProcessingOutput {
    /// Stations sorted by name.
    pub stations: Vec<StationStats>,
    pub statistics: RunStatistics,
}

/// Runs read, reconcile, merge and sort over one input stream.
pub struct ParallelProcessor {
    config: ProcessingConfig,
}

impl ParallelProcessor {
    pub fn new(config: ProcessingConfig) -> Self {
        Self { config }
    }

    /// Aggregate every line of `reader`.
    pub fn process<R: Read + Send>(
        &self,
        reader: R,
        progress: Option<&ProgressReporter>,
    ) -> Result<ProcessingOutput> {
        let mut statistics = RunStatistics::default();

        info!(
            workers = self.config.workers,
            chunk_size = self.config.chunk_size,
            "reading measurements"
        );
        let started = Instant::now();
        let read_output = ChunkReaderPool::from_config(&self.config).read_all(reader, progress)?;
        statistics.read_time = started.elapsed();
        statistics.chunks = read_output.clippings.len();
        statistics.bytes_read = read_output.bytes_read;
        statistics.rows_parsed = read_output.rows_parsed;

        if let Some(p) = progress {
            p.set_message("Reconciling chunk boundaries...");
        }
        let started = Instant::now();
        let reconciliation = ClippingReconciler::with_table_capacity(self.config.table_capacity)
            .reconcile(&read_output.clippings)?;
        statistics.reconcile_time = started.elapsed();
        statistics.lines_stitched = reconciliation.lines_stitched;
        statistics.spanning_chunks = reconciliation.spanning_chunks;

        let mut shards = read_output.shards;
        shards.push(reconciliation.table);
        statistics.shards = shards.len();

        if let Some(p) = progress {
            p.set_message("Merging shards...");
        }
        let started = Instant::now();
        let merged = ShardMerger::with_parallel(self.config.parallel_merge).merge(shards)?;
        statistics.merge_time = started.elapsed();

        let started = Instant::now();
        let stations = sort_stations(merged);
        statistics.sort_time = started.elapsed();

        debug!("{}", statistics.summary());
        info!(
            stations = stations.len(),
            rows = statistics.total_rows(),
            "aggregation complete"
        );

        if let Some(p) = progress {
            p.finish_with_message(&format!(
                "Aggregated {} rows into {} stations",
                statistics.total_rows(),
                stations.len()
            ));
        }

        Ok(ProcessingOutput {
            stations,
            statistics,
        })
    }

    /// Aggregate a file, optionally through a memory map.
    ///
    /// The file length is used as the size hint unless one is configured.
    pub fn process_file(
        &self,
        path: &Path,
        use_mmap: bool,
        progress: Option<&ProgressReporter>,
    ) -> Result<ProcessingOutput> {
        let file = File::open(path)?;
        let file_size = file.metadata()?.len();

        let processor = if self.config.size_hint.is_none() {
            ParallelProcessor::new(self.config.clone().with_size_hint(Some(file_size)))
        } else {
            ParallelProcessor::new(self.config.clone())
        };

        if use_mmap && file_size > 0 {
            let mmap = unsafe { Mmap::map(&file)? };
            processor.process(&mmap[..], progress)
        } else {
            processor.process(file, progress)
        }
    }
}

impl Default for ParallelProcessor {
    fn default() -> Self {
        Self::new(ProcessingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn small_config(workers: usize, chunk_size: usize) -> ProcessingConfig {
        ProcessingConfig::default()
            .with_workers(workers)
            .with_chunk_size(chunk_size)
    }

    #[test]
    fn test_process_counts_every_line_once() {
        let input = b"Oslo;1.0\nRome;20.5\nOslo;-3.0\nLima;18.0\nRome;31.5\n";
        let processor = ParallelProcessor::new(small_config(3, 11));
        let output = processor.process(&input[..], None).unwrap();

        assert_eq!(output.statistics.total_rows(), 5);
        assert_eq!(output.statistics.shards, 4);
        let names: Vec<&[u8]> = output.stations.iter().map(|s| s.name.as_slice()).collect();
        assert_eq!(names, vec![&b"Lima"[..], &b"Oslo"[..], &b"Rome"[..]]);
    }

    #[test]
    fn test_single_line_input() {
        let processor = ParallelProcessor::new(small_config(4, 1024));
        let output = processor.process(&b"Suva;15.0\n"[..], None).unwrap();

        assert_eq!(output.stations.len(), 1);
        assert_eq!(output.stations[0].to_string(), "Suva=15.0/15.0/15.0");
        assert_eq!(output.statistics.chunks, 1);
        assert_eq!(output.statistics.lines_stitched, 1);
        assert_eq!(output.statistics.rows_parsed, 0);
    }

    #[test]
    fn test_empty_input() {
        let output = ParallelProcessor::new(small_config(2, 16))
            .process(&b""[..], None)
            .unwrap();
        assert!(output.stations.is_empty());
        assert_eq!(output.statistics.chunks, 0);
    }

    #[test]
    fn test_process_file_with_and_without_mmap() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        write!(file, "Kabul;6.0\nPhoenix;7.0\nKabul;-2.0\n")?;
        file.flush()?;

        let processor = ParallelProcessor::new(small_config(2, 8));
        let buffered = processor.process_file(file.path(), false, None)?;
        let mapped = processor.process_file(file.path(), true, None)?;

        assert_eq!(buffered.stations, mapped.stations);
        assert_eq!(buffered.stations[0].to_string(), "Kabul=-2.0/2.0/6.0");
        Ok(())
    }

    #[test]
    fn test_size_hint_never_changes_the_result() {
        for chunk_size in [1, 1 << 20] {
            let config = small_config(2, chunk_size).with_size_hint(Some(u64::MAX));
            let output = ParallelProcessor::new(config)
                .process(&b"A;1.0\n"[..], None)
                .unwrap();
            assert_eq!(output.stations.len(), 1);
            assert_eq!(output.stations[0].to_string(), "A=1.0/1.0/1.0");
        }
    }
}
