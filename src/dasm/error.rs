// Fri Oct 16 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Empty code window")]
    EmptyWindow,
    #[error("Instruction at {address:#x} runs past the end of the window")]
    Truncated { address: u64 },
    #[error("Unsupported opcode {opcode:#x} at {address:#x}")]
    UnsupportedOpcode { address: u64, opcode: u32 },
    #[error("Instruction at {address:#x} is longer than 15 bytes")]
    TooLong { address: u64 },
}
