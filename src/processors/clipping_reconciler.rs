use crate::error::{ProcessingError, Result};
use crate::models::{AggregationTable, Clipping};
use crate::readers::tokenizer::tokenize_line;
use crate::utils::constants::DEFAULT_TABLE_CAPACITY;
use tracing::debug;

/// Lines rebuilt from clippings, aggregated into their own shard.
#[derive(Debug)]
pub struct Reconciliation {
    pub table: AggregationTable,
    /// Complete lines rebuilt, including the first line of the stream.
    pub lines_stitched: u64,
    /// Chunks that held no newline and were carried into the next boundary.
    pub spanning_chunks: usize,
}

/// Rebuilds the lines cut by chunk boundaries.
///
/// Chunk `i`'s tail followed by chunk `i + 1`'s head is exactly one line. The
/// first chunk's head has no preceding tail and is the first line of the
/// stream. A spanning clipping (chunk without newline) is appended to the
/// pending bytes and the line is completed at the next boundary instead.
pub struct ClippingReconciler {
    table_capacity: usize,
}

impl ClippingReconciler {
    pub fn new() -> Self {
        Self {
            table_capacity: DEFAULT_TABLE_CAPACITY,
        }
    }

    pub fn with_table_capacity(table_capacity: usize) -> Self {
        Self { table_capacity }
    }

    /// `clippings` must be in stream order, one per chunk.
    pub fn reconcile(&self, clippings: &[Clipping]) -> Result<Reconciliation> {
        let mut table = AggregationTable::with_capacity(self.table_capacity);
        let mut pending: Vec<u8> = Vec::new();
        let mut lines_stitched = 0;
        let mut spanning_chunks = 0;

        for clipping in clippings {
            pending.extend_from_slice(&clipping.head);
            if clipping.is_spanning() {
                spanning_chunks += 1;
                continue;
            }

            let token = tokenize_line(&pending)?;
            table.upsert(token.hash, &pending[..token.delimiter], token.temperature)?;
            lines_stitched += 1;

            pending.clear();
            pending.extend_from_slice(&clipping.tail);
        }

        if !pending.is_empty() {
            return Err(ProcessingError::MissingTrailingNewline {
                tail_len: pending.len(),
            });
        }

        debug!(
            chunks = clippings.len(),
            lines_stitched,
            spanning_chunks,
            "clippings reconciled"
        );

        Ok(Reconciliation {
            table,
            lines_stitched,
            spanning_chunks,
        })
    }
}

impl Default for ClippingReconciler {
    fn default() -> Self {
        Self::new()
    }
}
