pub mod clipping_reconciler;
pub mod integrity_checker;
pub mod parallel_processor;
pub mod shard_merger;
pub mod station_sorter;

pub use clipping_reconciler::{ClippingReconciler, Reconciliation};
pub use integrity_checker::{IntegrityChecker, IntegrityReport, IntegrityViolation, ViolationType};
pub use parallel_processor::{ParallelProcessor, ProcessingOutput, RunStatistics};
pub use shard_merger::ShardMerger;
pub use station_sorter::sort_stations;
