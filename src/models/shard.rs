use crate::error::{ProcessingError, Result};
use crate::models::StationStats;
use crate::utils::constants::DEFAULT_TABLE_CAPACITY;
use fxhash::FxHashMap;
use std::collections::hash_map::Entry;

/// Aggregation table keyed by station-name hash.
///
/// One table per reader worker plus one for reconciled boundary lines. A table
/// has a single writer until it is moved into the merger, so no locking is
/// involved. The stored name is compared on every hit: two names sharing a
/// hash are reported as [`ProcessingError::HashCollision`].
#[derive(Debug, Default)]
pub struct AggregationTable {
    stations: FxHashMap<u64, StationStats>,
}

impl AggregationTable {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_TABLE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            stations: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Insert a first sample for `hash` or fold the sample into the existing entry.
    #[inline]
    pub fn upsert(&mut self, hash: u64, name: &[u8], temperature: i32) -> Result<()> {
        match self.stations.entry(hash) {
            Entry::Occupied(mut entry) => {
                let stats = entry.get_mut();
                if stats.name.as_slice() != name {
                    return Err(collision(hash, &stats.name, name));
                }
                stats.record(temperature);
            }
            Entry::Vacant(entry) => {
                entry.insert(StationStats::new(name, temperature));
            }
        }
        Ok(())
    }

    /// Merge a whole aggregate for `hash` into the table.
    pub fn merge_stats(&mut self, hash: u64, stats: StationStats) -> Result<()> {
        match self.stations.entry(hash) {
            Entry::Occupied(mut entry) => {
                let existing = entry.get_mut();
                if existing.name != stats.name {
                    return Err(collision(hash, &existing.name, &stats.name));
                }
                existing.merge(&stats);
            }
            Entry::Vacant(entry) => {
                entry.insert(stats);
            }
        }
        Ok(())
    }

    /// Consume `other` into this table. The smaller table is folded into the larger one.
    pub fn absorb(self, other: AggregationTable) -> Result<AggregationTable> {
        let (mut into, from) = if self.len() >= other.len() {
            (self, other)
        } else {
            (other, self)
        };

        for (hash, stats) in from.stations {
            into.merge_stats(hash, stats)?;
        }

        Ok(into)
    }

    pub fn get(&self, hash: u64) -> Option<&StationStats> {
        self.stations.get(&hash)
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn stations(&self) -> impl Iterator<Item = &StationStats> {
        self.stations.values()
    }

    /// Number of samples folded into this table.
    pub fn total_samples(&self) -> u64 {
        self.stations.values().map(|s| s.count).sum()
    }

    pub fn into_stations(self) -> Vec<StationStats> {
        self.stations.into_values().collect()
    }
}

fn collision(hash: u64, existing: &[u8], incoming: &[u8]) -> ProcessingError {
    ProcessingError::HashCollision {
        hash,
        existing: String::from_utf8_lossy(existing).into_owned(),
        incoming: String::from_utf8_lossy(incoming).into_owned(),
    }
}
