// Fri Oct 16 2026 - Alex

//! Opcode maps for the instruction subset the decoder understands.
//!
//! Each recognised opcode is described by its shape: whether a ModRM byte
//! follows and which immediate (if any) trails the addressing bytes. That is
//! enough to size every general-purpose instruction a compiler emits outside
//! of VEX/EVEX space.

/// Fixed offset added to every opcode the decoder stores in a record.
pub const OPCODE_BIAS: u32 = 0x80;

/// Single-byte padding instruction.
pub const NOP_BYTE: u8 = 0x90;

/// `endbr64`, the indirect-branch landing pad at protected function entries.
pub const ENDBR64: [u8; 4] = [0xF3, 0x0F, 0x1E, 0xFA];

pub const MAX_INSTRUCTION_LENGTH: usize = 15;

/// Logical (unbiased) opcode values.
pub mod opcodes {
    pub const LEA: u32 = 0x8D;
    pub const MOV_STORE: u32 = 0x89;
    pub const MOV_LOAD: u32 = 0x8B;
    pub const NOP: u32 = 0x90;
    pub const RET: u32 = 0xC3;
    pub const CALL_REL32: u32 = 0xE8;
    pub const JMP_REL32: u32 = 0xE9;
    pub const JMP_REL8: u32 = 0xEB;
    pub const GROUP5: u32 = 0xFF;
    pub const ENDBR: u32 = 0x0F1E;
    pub const JCC_REL32_FIRST: u32 = 0x0F80;
    pub const JCC_REL32_LAST: u32 = 0x0F8F;

    pub const TWO_BYTE_ESCAPE: u8 = 0x0F;
    pub const THREE_BYTE_38: u8 = 0x38;
    pub const THREE_BYTE_3A: u8 = 0x3A;
}

pub const fn biased(logical: u32) -> u32 {
    logical + OPCODE_BIAS
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpcodeMap {
    OneByte,
    TwoByte,
    ThreeByte38,
    ThreeByte3A,
}

impl OpcodeMap {
    pub fn logical(self, byte: u8) -> u32 {
        let byte = byte as u32;
        match self {
            Self::OneByte => byte,
            Self::TwoByte => 0x0F00 | byte,
            Self::ThreeByte38 => 0x0F_3800 | byte,
            Self::ThreeByte3A => 0x0F_3A00 | byte,
        }
    }

    pub(crate) fn shape(self, byte: u8) -> Option<OpcodeShape> {
        match self {
            Self::OneByte => one_byte_shape(byte),
            Self::TwoByte => two_byte_shape(byte),
            Self::ThreeByte38 => Some(OpcodeShape::modrm(Immediate::None)),
            Self::ThreeByte3A => Some(OpcodeShape::modrm(Immediate::Byte)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Immediate {
    None,
    Byte,
    Word,
    /// 16 bits under an operand-size override, 32 otherwise.
    Z,
    /// `enter imm16, imm8`
    Enter,
    /// Absolute `moffs`: 8 bytes, 4 under an address-size override.
    Moffs,
    /// `mov r, imm`: 8 bytes with REX.W.
    MovImm,
    Rel8,
    Rel32,
    /// Group 3 `test r/m8, imm8` (reg 0 and 1 only).
    Group3Byte,
    /// Group 3 `test r/m, immz` (reg 0 and 1 only).
    Group3Z,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct OpcodeShape {
    pub modrm: bool,
    pub immediate: Immediate,
}

impl OpcodeShape {
    const fn plain(immediate: Immediate) -> Self {
        Self { modrm: false, immediate }
    }

    const fn modrm(immediate: Immediate) -> Self {
        Self { modrm: true, immediate }
    }
}

fn one_byte_shape(op: u8) -> Option<OpcodeShape> {
    use Immediate::*;
    let shape = match op {
        // ALU block: r/m,r / r,r/m forms then AL/eAX immediates. Slots 6 and
        // 7 are segment pushes (invalid in long mode) or prefixes.
        0x00..=0x3F => match op & 0x07 {
            0..=3 => OpcodeShape::modrm(None),
            4 => OpcodeShape::plain(Byte),
            5 => OpcodeShape::plain(Z),
            _ => return Option::None,
        },
        0x50..=0x5F => OpcodeShape::plain(None),
        0x63 => OpcodeShape::modrm(None),
        0x68 => OpcodeShape::plain(Z),
        0x69 => OpcodeShape::modrm(Z),
        0x6A => OpcodeShape::plain(Byte),
        0x6B => OpcodeShape::modrm(Byte),
        0x6C..=0x6F => OpcodeShape::plain(None),
        0x70..=0x7F => OpcodeShape::plain(Rel8),
        0x80 | 0x83 => OpcodeShape::modrm(Byte),
        0x81 => OpcodeShape::modrm(Z),
        0x84..=0x8F => OpcodeShape::modrm(None),
        0x90..=0x99 | 0x9B..=0x9F => OpcodeShape::plain(None),
        0xA0..=0xA3 => OpcodeShape::plain(Moffs),
        0xA4..=0xA7 | 0xAA..=0xAF => OpcodeShape::plain(None),
        0xA8 => OpcodeShape::plain(Byte),
        0xA9 => OpcodeShape::plain(Z),
        0xB0..=0xB7 => OpcodeShape::plain(Byte),
        0xB8..=0xBF => OpcodeShape::plain(MovImm),
        0xC0 | 0xC1 | 0xC6 => OpcodeShape::modrm(Byte),
        0xC2 | 0xCA => OpcodeShape::plain(Word),
        0xC3 | 0xC9 | 0xCB | 0xCC | 0xCF => OpcodeShape::plain(None),
        0xC7 => OpcodeShape::modrm(Z),
        0xC8 => OpcodeShape::plain(Enter),
        0xCD => OpcodeShape::plain(Byte),
        0xD0..=0xD3 => OpcodeShape::modrm(None),
        0xD7 => OpcodeShape::plain(None),
        0xD8..=0xDF => OpcodeShape::modrm(None),
        0xE0..=0xE3 | 0xEB => OpcodeShape::plain(Rel8),
        0xE4..=0xE7 => OpcodeShape::plain(Byte),
        0xE8 | 0xE9 => OpcodeShape::plain(Rel32),
        0xEC..=0xEF | 0xF1 | 0xF4 | 0xF5 | 0xF8..=0xFD => OpcodeShape::plain(None),
        0xF6 => OpcodeShape::modrm(Group3Byte),
        0xF7 => OpcodeShape::modrm(Group3Z),
        0xFE | 0xFF => OpcodeShape::modrm(None),
        // VEX/EVEX escapes, far transfers, BCD and other long-mode-invalid
        // opcodes.
        _ => return Option::None,
    };
    Some(shape)
}

fn two_byte_shape(op: u8) -> Option<OpcodeShape> {
    use Immediate::*;
    let shape = match op {
        0x00..=0x03 | 0x0D => OpcodeShape::modrm(None),
        0x05..=0x09 | 0x0B | 0x0E => OpcodeShape::plain(None),
        // 0F 18-1F is the hint-nop space; endbr64 lives at 0F 1E.
        0x10..=0x1F => OpcodeShape::modrm(None),
        0x20..=0x23 | 0x28..=0x2F => OpcodeShape::modrm(None),
        0x30..=0x35 | 0x37 => OpcodeShape::plain(None),
        0x40..=0x6F => OpcodeShape::modrm(None),
        0x70..=0x73 => OpcodeShape::modrm(Byte),
        0x74..=0x76 | 0x78 | 0x79 | 0x7C..=0x7F => OpcodeShape::modrm(None),
        0x77 => OpcodeShape::plain(None),
        0x80..=0x8F => OpcodeShape::plain(Rel32),
        0x90..=0x9F => OpcodeShape::modrm(None),
        0xA0..=0xA2 | 0xA8..=0xAA => OpcodeShape::plain(None),
        0xA3 | 0xA5 | 0xAB | 0xAD..=0xAF => OpcodeShape::modrm(None),
        0xA4 | 0xAC => OpcodeShape::modrm(Byte),
        0xB0..=0xB9 | 0xBB..=0xBF => OpcodeShape::modrm(None),
        0xBA => OpcodeShape::modrm(Byte),
        0xC0 | 0xC1 | 0xC3 | 0xC7 => OpcodeShape::modrm(None),
        0xC2 | 0xC4..=0xC6 => OpcodeShape::modrm(Byte),
        0xC8..=0xCF => OpcodeShape::plain(None),
        0xD0..=0xFF => OpcodeShape::modrm(None),
        _ => return Option::None,
    };
    Some(shape)
}
