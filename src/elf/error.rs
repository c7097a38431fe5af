// Fri Oct 16 2026 - Alex

use crate::memory::MemoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ElfError {
    #[error("ELF parse error: {0}")]
    Parse(#[from] goblin::error::Error),
    #[error("Not a 64-bit ELF image")]
    NotElf64,
    #[error("Image has no PT_LOAD segments")]
    NoLoadSegments,
    #[error("Section not found: {0}")]
    SectionNotFound(String),
    #[error("Section {0} has no file contents")]
    EmptySection(String),
    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),
}
