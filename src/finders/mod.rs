// Fri Oct 16 2026 - Alex

//! Instruction-pattern searches over a code window.
//!
//! Every finder walks the window one decoded instruction at a time and stops
//! at the first match, at the first instruction that fails to decode, or when
//! the window is exhausted. There is no byte-wise resynchronisation after a
//! decode failure.

pub mod call;
pub mod lea;
pub mod prologue;
pub mod result;

pub use call::{call_sites, find_call_instruction};
pub use lea::{find_lea_instruction, find_lea_instruction_with_record};
pub use prologue::{
    find_endbr64_prologue, find_function_prologue, find_function_prologue_aligned,
    find_padding_prologue, is_endbr64_instruction, PrologueMode,
};
pub use result::FinderResult;

use crate::dasm::{decode_instruction, DecodeRecord};
use crate::memory::CodeWindow;

/// Shared scan loop. On `true`, `record` describes the matching instruction.
pub(crate) fn scan_window<F>(window: CodeWindow<'_>, record: &mut DecodeRecord, mut predicate: F) -> bool
where
    F: FnMut(&DecodeRecord) -> bool,
{
    let mut cursor = window;
    while !cursor.is_empty() {
        if let Err(e) = decode_instruction(record, cursor) {
            log::debug!("Scan of {:?} stopped: {}", window, e);
            return false;
        }
        if predicate(record) {
            return true;
        }
        cursor = cursor.advance(record.instruction_length as usize);
    }
    false
}

/// First instruction whose logical (unbiased) opcode equals `opcode`.
pub fn find_instruction_with_opcode(window: CodeWindow<'_>, opcode: u32, record: &mut DecodeRecord) -> bool {
    scan_window(window, record, |r| r.logical_opcode() == opcode)
}
