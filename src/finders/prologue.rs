// Fri Oct 16 2026 - Alex

use crate::dasm::{decode_instruction, DecodeRecord, NOP_BYTE};
use crate::finders::scan_window;
use crate::memory::{Address, CodeWindow};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a function start is recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrologueMode {
    /// The function starts at an `endbr64` landing pad.
    Endbr64,
    /// The function starts right after a run of single-byte `nop` padding.
    Nop,
}

impl Default for PrologueMode {
    fn default() -> Self {
        Self::Endbr64
    }
}

impl FromStr for PrologueMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "endbr64" | "endbr" => Ok(Self::Endbr64),
            "nop" | "padding" => Ok(Self::Nop),
            other => Err(format!("unknown prologue mode: {}", other)),
        }
    }
}

impl fmt::Display for PrologueMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Endbr64 => write!(f, "endbr64"),
            Self::Nop => write!(f, "nop"),
        }
    }
}

pub fn find_function_prologue(window: CodeWindow<'_>, mode: PrologueMode) -> Option<Address> {
    find_function_prologue_aligned(window, mode, 1)
}

/// Like [`find_function_prologue`], but a candidate start must also be a
/// multiple of `alignment` (0 and 1 disable the check).
pub fn find_function_prologue_aligned(window: CodeWindow<'_>, mode: PrologueMode, alignment: u64) -> Option<Address> {
    let found = match mode {
        PrologueMode::Endbr64 => find_endbr64_prologue_aligned(window, alignment),
        PrologueMode::Nop => find_padding_prologue_aligned(window, alignment),
    };
    log::debug!("{} prologue search in {:?}: {:?}", mode, window, found);
    found
}

fn is_aligned(addr: Address, alignment: u64) -> bool {
    alignment <= 1 || addr.as_u64() % alignment == 0
}

/// Address of the first `endbr64` on an instruction boundary.
pub fn find_endbr64_prologue(window: CodeWindow<'_>) -> Option<Address> {
    find_endbr64_prologue_aligned(window, 1)
}

fn find_endbr64_prologue_aligned(window: CodeWindow<'_>, alignment: u64) -> Option<Address> {
    let mut record = DecodeRecord::new();
    if scan_window(window, &mut record, |r| r.is_endbr64() && is_aligned(r.instruction_start, alignment)) {
        Some(record.instruction_start)
    } else {
        None
    }
}

/// Address just past the first run of `nop` padding found on an instruction
/// boundary. Padding bytes are skipped without decoding them; padding that
/// runs to the end of the window does not count.
pub fn find_padding_prologue(window: CodeWindow<'_>) -> Option<Address> {
    find_padding_prologue_aligned(window, 1)
}

fn find_padding_prologue_aligned(window: CodeWindow<'_>, alignment: u64) -> Option<Address> {
    let mut record = DecodeRecord::new();
    let mut cursor = window;

    while !cursor.is_empty() {
        let run = cursor.bytes().iter().take_while(|&&b| b == NOP_BYTE).count();
        if run > 0 {
            cursor = cursor.advance(run);
            if cursor.is_empty() {
                return None;
            }
            if is_aligned(cursor.start(), alignment) {
                return Some(cursor.start());
            }
            continue;
        }

        if let Err(e) = decode_instruction(&mut record, cursor) {
            log::debug!("Padding scan stopped at {}: {}", cursor.start(), e);
            return None;
        }
        cursor = cursor.advance(record.instruction_length as usize);
    }
    None
}

/// True if `window` starts with `endbr64`.
pub fn is_endbr64_instruction(window: CodeWindow<'_>) -> bool {
    let mut record = DecodeRecord::new();
    decode_instruction(&mut record, window).is_ok() && record.is_endbr64()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endbr64_at_offset() {
        let code = [
            0x31, 0xC0, // xor eax, eax
            0xC3, // ret
            0xF3, 0x0F, 0x1E, 0xFA, // endbr64
            0x55, // push rbp
        ];
        let window = CodeWindow::new(&code, 0x7000u64);
        assert_eq!(find_function_prologue(window, PrologueMode::Endbr64), Some(Address::new(0x7003)));
        assert!(!is_endbr64_instruction(window));
        assert!(is_endbr64_instruction(window.advance(3)));
    }

    #[test]
    fn test_endbr64_inside_other_instruction_is_skipped() {
        // mov eax, 0xfa1e0ff3 carries the marker bytes in its immediate
        let code = [0xB8, 0xF3, 0x0F, 0x1E, 0xFA, 0xC3];
        assert_eq!(find_endbr64_prologue(CodeWindow::new(&code, 0u64)), None);
    }

    #[test]
    fn test_endbr32_is_not_endbr64() {
        let code = [0xF3, 0x0F, 0x1E, 0xFB];
        assert_eq!(find_endbr64_prologue(CodeWindow::new(&code, 0u64)), None);
    }

    #[test]
    fn test_padding_run() {
        let code = [
            0xC3, // ret
            0x90, 0x90, 0x90, // padding
            0x55, // push rbp
        ];
        let window = CodeWindow::new(&code, 0x100u64);
        assert_eq!(find_function_prologue(window, PrologueMode::Nop), Some(Address::new(0x104)));
        assert_eq!(find_padding_prologue(window.advance(2)), Some(Address::new(0x104)));
    }

    #[test]
    fn test_padding_reaching_window_end_fails() {
        let code = [0xC3, 0x90, 0x90];
        assert_eq!(find_padding_prologue(CodeWindow::new(&code, 0u64)), None);
    }

    #[test]
    fn test_nop_byte_inside_instruction_is_not_padding() {
        // mov eax, 0x90909090 ; push rbp
        let code = [0xB8, 0x90, 0x90, 0x90, 0x90, 0x55];
        assert_eq!(find_padding_prologue(CodeWindow::new(&code, 0u64)), None);
    }

    #[test]
    fn test_aligned_search_resumes_after_misaligned_candidates() {
        let code = [
            0x90, // padding ending at 0x1001 (misaligned)
            0x55, // push rbp
            0x48, 0x89, 0xE5, // mov rbp, rsp
            0x5D, // pop rbp
            0xC3, // ret
            0x90, 0x90, 0x90, 0x90, 0x90, 0x90, 0x90, 0x90, 0x90, // padding to 0x1010
            0xF3, 0x0F, 0x1E, 0xFA, // endbr64
        ];
        let window = CodeWindow::new(&code, 0x1000u64);
        assert_eq!(find_function_prologue(window, PrologueMode::Nop), Some(Address::new(0x1001)));
        assert_eq!(
            find_function_prologue_aligned(window, PrologueMode::Nop, 16),
            Some(Address::new(0x1010))
        );
        assert_eq!(
            find_function_prologue_aligned(window, PrologueMode::Endbr64, 16),
            Some(Address::new(0x1010))
        );
        assert_eq!(find_function_prologue_aligned(window, PrologueMode::Endbr64, 32), None);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("endbr64".parse::<PrologueMode>(), Ok(PrologueMode::Endbr64));
        assert_eq!("NOP".parse::<PrologueMode>(), Ok(PrologueMode::Nop));
        assert!("ret".parse::<PrologueMode>().is_err());
        assert_eq!(PrologueMode::Nop.to_string(), "nop");
    }
}
