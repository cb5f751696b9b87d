//! Error types shared by the Huffman codec core and every backend.

use std::any::Any;
use std::io;

/// Every failure mode the codec and its CLI front end can produce.
#[derive(thiserror::Error, Debug)]
pub enum HuffmanError {
    /// Reading the input or writing the output failed.
    #[error("I/O failure: {0}")]
    IoFailure(#[from] io::Error),

    /// A buffer could not be grown to the requested size.
    #[error("allocation failure: requested {requested} bytes")]
    AllocFailure {
        /// The size, in bytes, that could not be allocated.
        requested: usize,
    },

    /// The container is too short to contain a valid header.
    #[error("bad header: {0}")]
    BadHeader(String),

    /// The code table is internally inconsistent.
    #[error("malformed code table: {0}")]
    MalformedTable(String),

    /// The bit-stream ended before `decoded_byte_count` symbols were emitted.
    #[error("truncated stream: expected {expected} more bytes, got {got}")]
    Truncated {
        /// Bytes still owed by the stream.
        expected: u32,
        /// Bytes actually produced before the stream ran dry.
        got: u32,
    },

    /// A caller supplied an invalid combination of arguments.
    #[error("bad arguments: {0}")]
    BadArgs(String),

    /// A worker thread panicked before reporting its result.
    #[error("worker panicked: {0}")]
    WorkerPanicked(String),
}

/// Convenience alias used throughout the codec and its backends.
pub type HuffmanResult<T> = Result<T, HuffmanError>;

/// Converts a panic payload caught at a worker join boundary (`thread::Result`'s
/// `Err` side) into a [`HuffmanError::WorkerPanicked`], recovering the panic
/// message when the payload is a `&str` or `String` as `std::panic!` produces.
pub fn worker_panicked(payload: Box<dyn Any + Send>) -> HuffmanError {
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked with a non-string payload".to_string()
    };
    HuffmanError::WorkerPanicked(message)
}
