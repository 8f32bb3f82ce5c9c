/// Record delimiters
pub const FIELD_DELIMITER: u8 = b';';
pub const LINE_TERMINATOR: u8 = b'\n';

/// Seed of the djb2 station-name hash
pub const STATION_HASH_SEED: u64 = 5381;

/// Processing defaults
pub const DEFAULT_CHUNK_SIZE: usize = 4 * 1024 * 1024; // 4MB
pub const DEFAULT_TABLE_CAPACITY: usize = 2048;

/// Upper bound on clipping slots reserved from a size hint; the store grows past it on demand
pub const MAX_PRESIZED_CLIPPINGS: usize = 1 << 20;

/// Environment variable prefix for configuration overrides (BRC_CHUNK_SIZE, ...)
pub const CONFIG_ENV_PREFIX: &str = "BRC";

/// Output formats
pub const FORMAT_TEXT: &str = "text";
pub const FORMAT_JSON: &str = "json";

/// Input path meaning standard input
pub const STDIN_PATH: &str = "-";
