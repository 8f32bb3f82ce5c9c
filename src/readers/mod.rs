pub mod chunk_reader;
pub mod tokenizer;

pub use chunk_reader::{process_chunk, ChunkReaderPool, ChunkSource, ClaimedChunk, ReadOutput};
pub use tokenizer::{station_hash, tokenize_line, Token};
