use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed record ({reason}): {line:?}")]
    MalformedRecord { reason: &'static str, line: String },

    #[error("Input does not end with a newline ({tail_len} trailing bytes)")]
    MissingTrailingNewline { tail_len: usize },

    #[error("Station hash collision {hash:#018x} between {existing:?} and {incoming:?}")]
    HashCollision {
        hash: u64,
        existing: String,
        incoming: String,
    },

    #[error("Clipping for chunk {0} was never recorded")]
    MissingClipping(usize),

    #[error("Reader worker panicked")]
    WorkerPanicked,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ProcessingError {
    pub(crate) fn malformed(reason: &'static str, line: &[u8]) -> Self {
        ProcessingError::MalformedRecord {
            reason,
            line: String::from_utf8_lossy(line).into_owned(),
        }
    }
}

impl From<config::ConfigError> for ProcessingError {
    fn from(err: config::ConfigError) -> Self {
        ProcessingError::Config(err.to_string())
    }
}
