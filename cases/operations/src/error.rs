use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkloadError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

/// A line that does not follow the `i`/`s`/`d` line grammar.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("malformed operation line")]
pub struct OpDecodeError;

#[derive(Debug, Error)]
pub enum OpReaderError {
    #[error(transparent)]
    Decode(#[from] OpDecodeError),
    #[error("i/o error: {0}")]
    IO(#[from] io::Error),
}
