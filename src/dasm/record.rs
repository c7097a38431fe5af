// Fri Oct 16 2026 - Alex

use crate::dasm::opcode::{opcodes, OPCODE_BIAS};
use crate::memory::Address;
use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Legacy and REX prefixes seen before the opcode.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PrefixFlags: u8 {
        const LOCK = 0x01;
        /// Any segment override.
        const ESEG = 0x02;
        const OSIZE = 0x04;
        const ASIZE = 0x08;
        const REX = 0x20;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DetailFlags: u8 {
        const HAS_MODRM = 0x01;
        const HAS_SIB = 0x02;
        const RIP_RELATIVE = 0x04;
        const HAS_IMMEDIATE = 0x08;
        const RELATIVE_BRANCH = 0x10;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ModRmMode {
    /// `00`: register-indirect, no displacement (or RIP/SIB-base disp32)
    IndirectNoDisp = 0,
    /// `01`: indirect with disp8
    IndirectDisp8 = 1,
    /// `10`: indirect with disp32
    IndirectDisp32 = 2,
    /// `11`: direct register
    Register = 3,
}

impl ModRmMode {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => Self::IndirectNoDisp,
            1 => Self::IndirectDisp8,
            2 => Self::IndirectDisp32,
            _ => Self::Register,
        }
    }

    /// Width of the displacement implied by the mode alone.
    pub fn displacement_size(self) -> u8 {
        match self {
            Self::IndirectDisp8 => 1,
            Self::IndirectDisp32 => 4,
            Self::IndirectNoDisp | Self::Register => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModRm {
    pub byte: u8,
    pub mode: ModRmMode,
    pub reg: u8,
    pub rm: u8,
}

impl ModRm {
    pub fn from_byte(byte: u8) -> Self {
        Self {
            byte,
            mode: ModRmMode::from_bits(byte >> 6),
            reg: (byte >> 3) & 0x07,
            rm: byte & 0x07,
        }
    }

    pub fn is_memory(&self) -> bool {
        self.mode != ModRmMode::Register
    }
}

/// Everything the decoder learned about one instruction. Reset at the start
/// of every decode; no field carries over between instructions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeRecord {
    pub instruction_start: Address,
    pub instruction_length: u64,
    pub prefix_flags: PrefixFlags,
    pub detail_flags: DetailFlags,
    pub lock_byte: u8,
    pub last_prefix_byte: u8,
    pub rex_byte: u8,
    pub modrm: Option<ModRm>,
    pub sib: Option<u8>,
    /// Opcode plus [`OPCODE_BIAS`]; see [`DecodeRecord::logical_opcode`].
    pub opcode: u32,
    /// Prefix bytes preceding the opcode.
    pub opcode_offset: u8,
    pub memory_displacement: i64,
    pub displacement_size: u8,
    pub immediate_size: u8,
    /// Absolute target for relative branches, otherwise the sign-extended
    /// immediate, otherwise zero.
    pub operand: u64,
}

impl DecodeRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn logical_opcode(&self) -> u32 {
        self.opcode.wrapping_sub(OPCODE_BIAS)
    }

    pub fn next_instruction(&self) -> Address {
        self.instruction_start + self.instruction_length
    }

    pub fn has_prefix(&self, flag: PrefixFlags) -> bool {
        self.prefix_flags.contains(flag)
    }

    pub fn rex_w(&self) -> bool {
        self.has_prefix(PrefixFlags::REX) && self.rex_byte & 0x08 != 0
    }

    /// ModRM.reg extended by REX.R.
    pub fn reg_index(&self) -> Option<u8> {
        self.modrm.map(|m| m.reg | ((self.rex_byte & 0x04) << 1))
    }

    /// ModRM.rm extended by REX.B.
    pub fn rm_index(&self) -> Option<u8> {
        self.modrm.map(|m| m.rm | ((self.rex_byte & 0x01) << 3))
    }

    pub fn is_call(&self) -> bool {
        self.logical_opcode() == opcodes::CALL_REL32
    }

    pub fn is_lea(&self) -> bool {
        self.logical_opcode() == opcodes::LEA
    }

    pub fn is_relative_branch(&self) -> bool {
        self.detail_flags.contains(DetailFlags::RELATIVE_BRANCH)
    }

    pub fn is_endbr64(&self) -> bool {
        self.logical_opcode() == opcodes::ENDBR
            && self.last_prefix_byte == 0xF3
            && self.instruction_length == 4
            && self.modrm.map(|m| m.byte) == Some(0xFA)
    }

    /// Plain single-byte `nop` (not `pause`, not `xchg eax, r8d`).
    pub fn is_nop(&self) -> bool {
        self.logical_opcode() == opcodes::NOP && self.instruction_length == 1
    }

    pub fn rip_relative_target(&self) -> Option<Address> {
        if self.detail_flags.contains(DetailFlags::RIP_RELATIVE) {
            Some(self.next_instruction().offset(self.memory_displacement))
        } else {
            None
        }
    }
}

impl fmt::Display for DecodeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} len={} opcode={:#x}",
            self.instruction_start,
            self.instruction_length,
            self.logical_opcode()
        )?;
        if let Some(modrm) = self.modrm {
            write!(f, " modrm={:#04x}", modrm.byte)?;
        }
        if self.displacement_size > 0 {
            write!(f, " disp={:#x}", self.memory_displacement)?;
        }
        if self.operand != 0 {
            write!(f, " operand={:#x}", self.operand)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dasm::opcode::biased;

    #[test]
    fn test_modrm_split() {
        let modrm = ModRm::from_byte(0x44);
        assert_eq!(modrm.mode, ModRmMode::IndirectDisp8);
        assert_eq!(modrm.reg, 0);
        assert_eq!(modrm.rm, 4);
        assert!(modrm.is_memory());
        assert!(!ModRm::from_byte(0xE5).is_memory());
    }

    #[test]
    fn test_register_extension() {
        let record = DecodeRecord {
            prefix_flags: PrefixFlags::REX,
            rex_byte: 0x4D,
            modrm: Some(ModRm::from_byte(0xC8)),
            ..Default::default()
        };
        assert!(record.rex_w());
        assert_eq!(record.reg_index(), Some(9));
        assert_eq!(record.rm_index(), Some(8));
    }

    #[test]
    fn test_classification_removes_bias_once() {
        let record = DecodeRecord {
            opcode: biased(opcodes::CALL_REL32),
            ..Default::default()
        };
        assert!(record.is_call());
        assert!(!record.is_lea());
        assert!(!DecodeRecord::new().is_call());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut record = DecodeRecord {
            instruction_start: Address::new(0x1000),
            instruction_length: 5,
            operand: 0x401000,
            ..Default::default()
        };
        record.reset();
        assert_eq!(record, DecodeRecord::default());
    }
}
