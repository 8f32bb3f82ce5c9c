use crate::error::Result;
use crate::utils::constants::{CONFIG_ENV_PREFIX, DEFAULT_CHUNK_SIZE, DEFAULT_TABLE_CAPACITY};
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

/// Runtime tuning of the aggregation pipeline.
///
/// Layered as: built-in defaults, then an optional config file, then `BRC_*`
/// environment variables. CLI flags are applied on top by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Bytes per chunk claimed by a reader worker.
    #[validate(range(min = 1))]
    pub chunk_size: usize,

    /// Number of reader workers.
    #[validate(range(min = 1, max = 1024))]
    pub workers: usize,

    /// Expected input size in bytes, only used to presize storage.
    pub size_hint: Option<u64>,

    /// Tree-reduce shards on the rayon pool instead of folding them in order.
    pub parallel_merge: bool,

    /// Initial entries per aggregation table.
    #[validate(range(min = 1))]
    pub table_capacity: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            workers: num_cpus::get(),
            size_hint: None,
            parallel_merge: true,
            table_capacity: DEFAULT_TABLE_CAPACITY,
        }
    }
}

impl ProcessingConfig {
    /// Load from an optional file plus the environment, then validate.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        builder = builder
            .add_source(config::Environment::with_prefix(CONFIG_ENV_PREFIX).try_parsing(true));

        let config: ProcessingConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_size_hint(mut self, size_hint: Option<u64>) -> Self {
        self.size_hint = size_hint;
        self
    }

    pub fn with_parallel_merge(mut self, parallel_merge: bool) -> Self {
        self.parallel_merge = parallel_merge;
        self
    }

    pub fn with_table_capacity(mut self, table_capacity: usize) -> Self {
        self.table_capacity = table_capacity;
        self
    }
}
