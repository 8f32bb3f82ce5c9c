pub mod result_writer;

pub use result_writer::{OutputFormat, ResultWriter};
