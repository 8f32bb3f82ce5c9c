use crate::config::ProcessingConfig;
use crate::error::{ProcessingError, Result};
use crate::models::{AggregationTable, Clipping, ClippingStore};
use crate::readers::tokenizer::tokenize_line;
use crate::utils::constants::{
    DEFAULT_CHUNK_SIZE, DEFAULT_TABLE_CAPACITY, LINE_TERMINATOR, MAX_PRESIZED_CLIPPINGS,
};
use crate::utils::progress::ProgressReporter;
use memchr::{memchr, memrchr};
use std::io::{self, Read};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};

/// A chunk handed out by [`ChunkSource::claim`]: its stream-order index and byte length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimedChunk {
    pub index: usize,
    pub len: usize,
}

/// Shared read cursor over the input stream.
///
/// The stream and the chunk counter sit behind one mutex, so chunk indices
/// follow the order in which bytes were actually read. The lock covers the
/// read call and the index increment only.
pub struct ChunkSource<R> {
    state: Mutex<SourceState<R>>,
}

struct SourceState<R> {
    reader: R,
    next_index: usize,
    bytes_read: u64,
    halted: bool,
    failure: Option<ProcessingError>,
}

impl<R: Read> ChunkSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            state: Mutex::new(SourceState {
                reader,
                next_index: 0,
                bytes_read: 0,
                halted: false,
                failure: None,
            }),
        }
    }

    /// Fill `buffer` with the next chunk of the stream.
    ///
    /// Returns `Ok(None)` at end of stream, or once the source has been halted.
    pub fn claim(&self, buffer: &mut [u8]) -> Result<Option<ClaimedChunk>> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.halted {
            return Ok(None);
        }

        let len = match fill_buffer(&mut state.reader, buffer) {
            Ok(len) => len,
            Err(err) => {
                state.halted = true;
                return Err(err.into());
            }
        };

        if len == 0 {
            state.halted = true;
            return Ok(None);
        }
        // A short fill means the reader is exhausted.
        if len < buffer.len() {
            state.halted = true;
        }

        let index = state.next_index;
        state.next_index += 1;
        state.bytes_read += len as u64;

        Ok(Some(ClaimedChunk { index, len }))
    }

    /// Stop handing out chunks and keep `err` if it is the first failure.
    pub fn fail(&self, err: ProcessingError) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.halted = true;
        if state.failure.is_none() {
            state.failure = Some(err);
        }
    }

    /// Chunks claimed, bytes read, and the first recorded failure.
    pub fn finish(self) -> (usize, u64, Option<ProcessingError>) {
        let state = self
            .state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        (state.next_index, state.bytes_read, state.failure)
    }
}

/// Read until `buffer` is full or the reader reports end of stream.
fn fill_buffer<R: Read>(reader: &mut R, buffer: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}

/// Parse every complete line of `chunk` into `table` and cut out its clipping.
///
/// Returns the clipping and the number of rows parsed. A chunk without any
/// newline is deferred whole as a spanning clipping.
pub fn process_chunk(
    index: usize,
    chunk: &[u8],
    table: &mut AggregationTable,
) -> Result<(Clipping, u64)> {
    let Some(head_end) = memchr(LINE_TERMINATOR, chunk) else {
        warn!(
            chunk = index,
            len = chunk.len(),
            "chunk contains no newline, deferring it whole as a clipping"
        );
        return Ok((Clipping::spanning(chunk), 0));
    };
    let tail_start = memrchr(LINE_TERMINATOR, chunk).unwrap_or(head_end);

    let clipping = Clipping::new(&chunk[..=head_end], &chunk[tail_start + 1..]);

    let mut rows = 0;
    let mut pos = head_end + 1;
    while pos <= tail_start {
        let line = &chunk[pos..=tail_start];
        let token = tokenize_line(line)?;
        table.upsert(token.hash, &line[..token.delimiter], token.temperature)?;
        pos += token.newline + 1;
        rows += 1;
    }

    Ok((clipping, rows))
}

/// Everything the reader pool produced once every worker has finished.
#[derive(Debug)]
pub struct ReadOutput {
    /// One table per worker.
    pub shards: Vec<AggregationTable>,
    /// Clippings in stream order, one per chunk.
    pub clippings: Vec<Clipping>,
    pub bytes_read: u64,
    pub rows_parsed: u64,
}

struct WorkerOutcome {
    table: AggregationTable,
    rows: u64,
}

/// Fixed pool of reader threads pulling chunks from one [`ChunkSource`].
#[derive(Debug, Clone)]
pub struct ChunkReaderPool {
    workers: usize,
    chunk_size: usize,
    table_capacity: usize,
    clipping_capacity: usize,
}

impl ChunkReaderPool {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            chunk_size: DEFAULT_CHUNK_SIZE,
            table_capacity: DEFAULT_TABLE_CAPACITY,
            clipping_capacity: 0,
        }
    }

    pub fn from_config(config: &ProcessingConfig) -> Self {
        Self::new(config.workers)
            .with_chunk_size(config.chunk_size)
            .with_table_capacity(config.table_capacity)
            .with_size_hint(config.size_hint)
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn with_table_capacity(mut self, table_capacity: usize) -> Self {
        self.table_capacity = table_capacity;
        self
    }

    /// Presize the clipping store for an input of roughly `size_hint` bytes.
    pub fn with_size_hint(mut self, size_hint: Option<u64>) -> Self {
        self.clipping_capacity = size_hint
            .map(|size| {
                let chunks = (size / self.chunk_size as u64).saturating_add(1);
                usize::try_from(chunks)
                    .unwrap_or(usize::MAX)
                    .min(MAX_PRESIZED_CLIPPINGS)
            })
            .unwrap_or(0);
        self
    }

    /// Run every worker to completion over `reader`.
    ///
    /// The first failure of any worker stops the others from claiming further
    /// chunks and is returned; no partial output is produced.
    pub fn read_all<R: Read + Send>(
        &self,
        reader: R,
        progress: Option<&ProgressReporter>,
    ) -> Result<ReadOutput> {
        let source = ChunkSource::new(reader);
        let store = ClippingStore::with_capacity(self.clipping_capacity);

        let outcomes = crossbeam::thread::scope(|scope| {
            let handles: Vec<_> = (0..self.workers)
                .map(|worker_id| {
                    let source = &source;
                    let store = &store;
                    scope.spawn(move |_| {
                        match self.run_worker(worker_id, source, store, progress) {
                            Ok(outcome) => Some(outcome),
                            Err(err) => {
                                source.fail(err);
                                None
                            }
                        }
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| handle.join().map_err(|_| ProcessingError::WorkerPanicked))
                .collect::<Result<Vec<_>>>()
        })
        .map_err(|_| ProcessingError::WorkerPanicked)??;

        let (chunks, bytes_read, failure) = source.finish();
        if let Some(err) = failure {
            return Err(err);
        }

        let clippings = store.into_ordered()?;
        if clippings.len() != chunks {
            return Err(ProcessingError::MissingClipping(clippings.len()));
        }

        let mut shards = Vec::with_capacity(outcomes.len());
        let mut rows_parsed = 0;
        for outcome in outcomes.into_iter().flatten() {
            rows_parsed += outcome.rows;
            shards.push(outcome.table);
        }

        debug!(chunks, bytes_read, rows_parsed, "reader pool finished");

        Ok(ReadOutput {
            shards,
            clippings,
            bytes_read,
            rows_parsed,
        })
    }

    fn run_worker<R: Read>(
        &self,
        worker_id: usize,
        source: &ChunkSource<R>,
        store: &ClippingStore,
        progress: Option<&ProgressReporter>,
    ) -> Result<WorkerOutcome> {
        let mut buffer = vec![0u8; self.chunk_size];
        let mut table = AggregationTable::with_capacity(self.table_capacity);
        let mut rows = 0;
        let mut chunks = 0usize;

        while let Some(chunk) = source.claim(&mut buffer)? {
            let (clipping, parsed) = process_chunk(chunk.index, &buffer[..chunk.len], &mut table)?;
            store.record(chunk.index, clipping);

            rows += parsed;
            chunks += 1;
            if let Some(p) = progress {
                p.increment(chunk.len as u64);
            }
        }

        debug!(
            worker_id,
            chunks,
            rows,
            stations = table.len(),
            "reader worker finished"
        );

        Ok(WorkerOutcome { table, rows })
    }
}

impl Default for ChunkReaderPool {
    fn default() -> Self {
        Self::new(num_cpus::get())
    }
}
