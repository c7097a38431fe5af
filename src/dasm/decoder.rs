// Fri Oct 16 2026 - Alex

use crate::dasm::error::DecodeError;
use crate::dasm::opcode::{opcodes, Immediate, OpcodeMap, MAX_INSTRUCTION_LENGTH, OPCODE_BIAS};
use crate::dasm::record::{DecodeRecord, DetailFlags, ModRm, ModRmMode, PrefixFlags};
use crate::memory::CodeWindow;

struct DecodeCursor<'a> {
    window: CodeWindow<'a>,
    pos: usize,
}

impl<'a> DecodeCursor<'a> {
    fn new(window: CodeWindow<'a>) -> Self {
        Self { window, pos: 0 }
    }

    fn fetch_u8(&mut self) -> Result<u8, DecodeError> {
        if self.pos >= MAX_INSTRUCTION_LENGTH {
            return Err(DecodeError::TooLong {
                address: self.window.start().as_u64(),
            });
        }
        let byte = *self
            .window
            .bytes()
            .get(self.pos)
            .ok_or(DecodeError::Truncated {
                address: self.window.start().as_u64(),
            })?;
        self.pos += 1;
        Ok(byte)
    }

    /// Little-endian field of `size` bytes, zero-extended.
    fn fetch_le(&mut self, size: u8) -> Result<u64, DecodeError> {
        let mut value = 0u64;
        for i in 0..size {
            value |= (self.fetch_u8()? as u64) << (8 * i as u32);
        }
        Ok(value)
    }

    fn consumed(&self) -> usize {
        self.pos
    }
}

fn sign_extend(value: u64, size: u8) -> i64 {
    match size {
        1 => value as u8 as i8 as i64,
        2 => value as u16 as i16 as i64,
        4 => value as u32 as i32 as i64,
        _ => value as i64,
    }
}

/// Decodes the single instruction at the start of `window` into `record`.
///
/// The record is reset first. Only bytes inside the window are read; an
/// instruction that would need bytes past the end fails with
/// [`DecodeError::Truncated`].
pub fn decode_instruction(record: &mut DecodeRecord, window: CodeWindow<'_>) -> Result<(), DecodeError> {
    record.reset();
    if window.is_empty() {
        return Err(DecodeError::EmptyWindow);
    }
    record.instruction_start = window.start();

    let mut cursor = DecodeCursor::new(window);
    let byte = decode_prefixes(record, &mut cursor)?;
    record.opcode_offset = (cursor.consumed() - 1) as u8;

    let (map, op) = if byte == opcodes::TWO_BYTE_ESCAPE {
        match cursor.fetch_u8()? {
            opcodes::THREE_BYTE_38 => (OpcodeMap::ThreeByte38, cursor.fetch_u8()?),
            opcodes::THREE_BYTE_3A => (OpcodeMap::ThreeByte3A, cursor.fetch_u8()?),
            second => (OpcodeMap::TwoByte, second),
        }
    } else {
        (OpcodeMap::OneByte, byte)
    };

    let logical = map.logical(op);
    let shape = map.shape(op).ok_or(DecodeError::UnsupportedOpcode {
        address: window.start().as_u64(),
        opcode: logical,
    })?;
    record.opcode = logical + OPCODE_BIAS;

    if shape.modrm {
        decode_modrm(record, &mut cursor)?;
    }
    decode_immediate(record, &mut cursor, shape.immediate)?;

    record.instruction_length = cursor.consumed() as u64;
    if record.is_relative_branch() {
        record.operand = record.next_instruction().offset(record.operand as i64).as_u64();
    }

    log::trace!("decoded {}", record);
    Ok(())
}

/// Boolean form of [`decode_instruction`].
pub fn x86_dasm(record: &mut DecodeRecord, window: CodeWindow<'_>) -> bool {
    match decode_instruction(record, window) {
        Ok(()) => true,
        Err(e) => {
            log::trace!("decode failed: {}", e);
            false
        }
    }
}

/// Consumes legacy and REX prefixes and returns the first opcode byte.
fn decode_prefixes(record: &mut DecodeRecord, cursor: &mut DecodeCursor<'_>) -> Result<u8, DecodeError> {
    loop {
        let byte = cursor.fetch_u8()?;
        let flag = match byte {
            0xF0 => {
                record.lock_byte = byte;
                PrefixFlags::LOCK
            }
            0x26 | 0x2E | 0x36 | 0x3E | 0x64 | 0x65 => PrefixFlags::ESEG,
            0x66 => PrefixFlags::OSIZE,
            0x67 => PrefixFlags::ASIZE,
            0xF2 | 0xF3 => PrefixFlags::empty(),
            0x40..=0x4F => {
                record.prefix_flags |= PrefixFlags::REX;
                record.rex_byte = byte;
                continue;
            }
            _ => return Ok(byte),
        };
        // A legacy prefix after REX makes the CPU ignore the REX.
        if record.prefix_flags.contains(PrefixFlags::REX) {
            record.prefix_flags.remove(PrefixFlags::REX);
            record.rex_byte = 0;
        }
        record.prefix_flags |= flag;
        record.last_prefix_byte = byte;
    }
}

fn decode_modrm(record: &mut DecodeRecord, cursor: &mut DecodeCursor<'_>) -> Result<(), DecodeError> {
    let modrm = ModRm::from_byte(cursor.fetch_u8()?);
    record.modrm = Some(modrm);
    record.detail_flags |= DetailFlags::HAS_MODRM;

    let mut disp_size = modrm.mode.displacement_size();
    if modrm.is_memory() {
        if modrm.rm == 0b100 {
            let sib = cursor.fetch_u8()?;
            record.sib = Some(sib);
            record.detail_flags |= DetailFlags::HAS_SIB;
            if sib & 0x07 == 0b101 && modrm.mode == ModRmMode::IndirectNoDisp {
                disp_size = 4;
            }
        } else if modrm.rm == 0b101 && modrm.mode == ModRmMode::IndirectNoDisp {
            disp_size = 4;
            record.detail_flags |= DetailFlags::RIP_RELATIVE;
        }
    }

    if disp_size > 0 {
        let raw = cursor.fetch_le(disp_size)?;
        record.memory_displacement = sign_extend(raw, disp_size);
        record.displacement_size = disp_size;
    }
    Ok(())
}

fn decode_immediate(record: &mut DecodeRecord, cursor: &mut DecodeCursor<'_>, immediate: Immediate) -> Result<(), DecodeError> {
    let osize = record.has_prefix(PrefixFlags::OSIZE);
    let z_size = if osize { 2 } else { 4 };
    let group3_test = record.modrm.map_or(false, |m| m.reg < 2);

    let (size, signed, relative) = match immediate {
        Immediate::None => return Ok(()),
        Immediate::Byte => (1, true, false),
        Immediate::Word => (2, false, false),
        Immediate::Z => (z_size, true, false),
        Immediate::Enter => (3, false, false),
        Immediate::Moffs => (if record.has_prefix(PrefixFlags::ASIZE) { 4 } else { 8 }, false, false),
        Immediate::MovImm => (if record.rex_w() { 8 } else { z_size }, true, false),
        Immediate::Rel8 => (1, true, true),
        Immediate::Rel32 => (4, true, true),
        Immediate::Group3Byte if group3_test => (1, true, false),
        Immediate::Group3Z if group3_test => (z_size, true, false),
        Immediate::Group3Byte | Immediate::Group3Z => return Ok(()),
    };

    let raw = cursor.fetch_le(size)?;
    record.immediate_size = size;
    record.detail_flags |= DetailFlags::HAS_IMMEDIATE;
    record.operand = if signed { sign_extend(raw, size) as u64 } else { raw };
    if relative {
        record.detail_flags |= DetailFlags::RELATIVE_BRANCH;
    }
    Ok(())
}

/// Sequential decoder over a window. Yields one record per instruction and
/// stops after the first failure; it never resynchronises.
pub struct Instructions<'a> {
    window: CodeWindow<'a>,
    failed: bool,
}

impl<'a> Instructions<'a> {
    pub fn new(window: CodeWindow<'a>) -> Self {
        Self { window, failed: false }
    }

    /// The not-yet-decoded remainder of the window.
    pub fn remaining(&self) -> CodeWindow<'a> {
        self.window
    }
}

impl<'a> Iterator for Instructions<'a> {
    type Item = Result<DecodeRecord, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.window.is_empty() {
            return None;
        }
        let mut record = DecodeRecord::new();
        match decode_instruction(&mut record, self.window) {
            Ok(()) => {
                self.window = self.window.advance(record.instruction_length as usize);
                Some(Ok(record))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

pub fn instructions(window: CodeWindow<'_>) -> Instructions<'_> {
    Instructions::new(window)
}
