pub mod clipping;
pub mod shard;
pub mod station;

pub use clipping::{Clipping, ClippingStore};
pub use shard::AggregationTable;
pub use station::{StationStats, StationSummary, Tenths};
