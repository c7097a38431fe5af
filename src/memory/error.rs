// Fri Oct 16 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid memory range")]
    InvalidRange,
    #[error("Out of bounds: address {0:#x} not in image")]
    OutOfBounds(u64),
    #[error("Image is empty: {0}")]
    EmptyImage(String),
}
