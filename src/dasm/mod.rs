// Fri Oct 16 2026 - Alex

pub mod decoder;
pub mod error;
pub mod layout;
pub mod opcode;
pub mod record;

pub use decoder::{decode_instruction, instructions, x86_dasm, Instructions};
pub use error::DecodeError;
pub use opcode::{opcodes, OpcodeMap, ENDBR64, NOP_BYTE, OPCODE_BIAS};
pub use record::{DecodeRecord, DetailFlags, ModRm, ModRmMode, PrefixFlags};
