use crate::error::{ProcessingError, Result};
use crate::models::AggregationTable;
use rayon::prelude::*;

/// Folds every shard into a single table.
///
/// Combining two aggregates is associative and commutative, so the shards
/// can be reduced in any order or as a parallel tree.
pub struct ShardMerger {
    parallel: bool,
}

impl ShardMerger {
    pub fn new() -> Self {
        Self { parallel: true }
    }

    pub fn with_parallel(parallel: bool) -> Self {
        Self { parallel }
    }

    /// Merge shards, consuming them.
    pub fn merge(&self, shards: Vec<AggregationTable>) -> Result<AggregationTable> {
        if self.parallel {
            shards
                .into_par_iter()
                .map(Ok::<_, ProcessingError>)
                .try_reduce(AggregationTable::default, AggregationTable::absorb)
        } else {
            shards
                .into_iter()
                .try_fold(AggregationTable::default(), AggregationTable::absorb)
        }
    }
}

impl Default for ShardMerger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StationStats;
    use crate::readers::tokenizer::station_hash;

    fn shard(samples: &[(&str, i32)]) -> AggregationTable {
        let mut table = AggregationTable::new();
        for (name, temp) in samples {
            table
                .upsert(station_hash(name.as_bytes()), name.as_bytes(), *temp)
                .unwrap();
        }
        table
    }

    fn sample_shards() -> Vec<Vec<(&'static str, i32)>> {
        vec![
            vec![("Oslo", -30), ("Rome", 200), ("Oslo", 12)],
            vec![("Rome", 315), ("Lima", 180)],
            vec![("Oslo", -95), ("Lima", 170), ("Lima", 230)],
            vec![],
        ]
    }

    fn sorted(table: AggregationTable) -> Vec<StationStats> {
        let mut stations = table.into_stations();
        stations.sort_by(|a, b| a.name.cmp(&b.name));
        stations
    }

    fn permutations(items: &[usize]) -> Vec<Vec<usize>> {
        if items.len() <= 1 {
            return vec![items.to_vec()];
        }
        let mut result = Vec::new();
        for i in 0..items.len() {
            let mut rest = items.to_vec();
            let first = rest.remove(i);
            for mut tail in permutations(&rest) {
                tail.insert(0, first);
                result.push(tail);
            }
        }
        result
    }

    #[test]
    fn test_merge_combines_stations() {
        let shards = sample_shards().iter().map(|s| shard(s)).collect();
        let merged = ShardMerger::new().merge(shards).unwrap();

        let oslo = merged.get(station_hash(b"Oslo")).unwrap();
        assert_eq!((oslo.min, oslo.max, oslo.sum, oslo.count), (-95, 12, -113, 3));
        let lima = merged.get(station_hash(b"Lima")).unwrap();
        assert_eq!((lima.min, lima.max, lima.sum, lima.count), (170, 230, 580, 3));
        assert_eq!(merged.total_samples(), 8);
    }

    #[test]
    fn test_merge_order_independent() {
        let samples = sample_shards();
        let reference = sorted(
            ShardMerger::with_parallel(false)
                .merge(samples.iter().map(|s| shard(s)).collect())
                .unwrap(),
        );

        let order: Vec<usize> = (0..samples.len()).collect();
        for permutation in permutations(&order) {
            for parallel in [false, true] {
                let shards = permutation.iter().map(|&i| shard(&samples[i])).collect();
                let merged = ShardMerger::with_parallel(parallel).merge(shards).unwrap();
                assert_eq!(sorted(merged), reference, "order {:?}", permutation);
            }
        }
    }

    #[test]
    fn test_merge_empty() {
        let merged = ShardMerger::new().merge(Vec::new()).unwrap();
        assert!(merged.is_empty());
    }
}
