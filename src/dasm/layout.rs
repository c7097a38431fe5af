// Fri Oct 16 2026 - Alex

//! 128-byte little-endian image of a [`DecodeRecord`], laid out like the
//! decoder state captured in external memory dumps.

use crate::dasm::record::{DecodeRecord, DetailFlags, ModRm, PrefixFlags};
use crate::memory::Address;

pub const FIXTURE_SIZE: usize = 128;

pub const OFFSET_INSTRUCTION_START: usize = 0x00;
pub const OFFSET_INSTRUCTION_LENGTH: usize = 0x08;
pub const OFFSET_PREFIX_FLAGS: usize = 0x10;
pub const OFFSET_DETAIL_FLAGS: usize = 0x11;
pub const OFFSET_LOCK_BYTE: usize = 0x14;
pub const OFFSET_LAST_PREFIX: usize = 0x16;
pub const OFFSET_REX: usize = 0x1B;
pub const OFFSET_MODRM: usize = 0x1C;
pub const OFFSET_MODRM_MOD: usize = 0x1D;
pub const OFFSET_MODRM_REG: usize = 0x1E;
pub const OFFSET_MODRM_RM: usize = 0x1F;
pub const OFFSET_OPCODE: usize = 0x28;
pub const OFFSET_DISPLACEMENT: usize = 0x30;
pub const OFFSET_OPERAND: usize = 0x38;
pub const OFFSET_OPCODE_OFFSET: usize = 0x50;

fn put_u64(buf: &mut [u8; FIXTURE_SIZE], offset: usize, value: u64) {
    buf[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
}

fn get_u64(buf: &[u8; FIXTURE_SIZE], offset: usize) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&buf[offset..offset + 8]);
    u64::from_le_bytes(raw)
}

impl DecodeRecord {
    pub fn to_fixture(&self) -> [u8; FIXTURE_SIZE] {
        let mut buf = [0u8; FIXTURE_SIZE];
        put_u64(&mut buf, OFFSET_INSTRUCTION_START, self.instruction_start.as_u64());
        put_u64(&mut buf, OFFSET_INSTRUCTION_LENGTH, self.instruction_length);
        buf[OFFSET_PREFIX_FLAGS] = self.prefix_flags.bits();
        buf[OFFSET_DETAIL_FLAGS] = self.detail_flags.bits();
        buf[OFFSET_LOCK_BYTE] = self.lock_byte;
        buf[OFFSET_LAST_PREFIX] = self.last_prefix_byte;
        buf[OFFSET_REX] = self.rex_byte;
        if let Some(modrm) = self.modrm {
            buf[OFFSET_MODRM] = modrm.byte;
            buf[OFFSET_MODRM_MOD] = modrm.mode as u8;
            buf[OFFSET_MODRM_REG] = modrm.reg;
            buf[OFFSET_MODRM_RM] = modrm.rm;
        }
        buf[OFFSET_OPCODE..OFFSET_OPCODE + 4].copy_from_slice(&self.opcode.to_le_bytes());
        put_u64(&mut buf, OFFSET_DISPLACEMENT, self.memory_displacement as u64);
        put_u64(&mut buf, OFFSET_OPERAND, self.operand);
        buf[OFFSET_OPCODE_OFFSET] = self.opcode_offset;
        buf
    }

    /// Rebuilds a record from a fixture. The SIB byte and operand sizes are
    /// not part of the layout and come back empty.
    pub fn from_fixture(buf: &[u8; FIXTURE_SIZE]) -> Self {
        let detail_flags = DetailFlags::from_bits_truncate(buf[OFFSET_DETAIL_FLAGS]);
        let modrm = if detail_flags.contains(DetailFlags::HAS_MODRM) {
            Some(ModRm::from_byte(buf[OFFSET_MODRM]))
        } else {
            None
        };
        let mut opcode = [0u8; 4];
        opcode.copy_from_slice(&buf[OFFSET_OPCODE..OFFSET_OPCODE + 4]);

        Self {
            instruction_start: Address::new(get_u64(buf, OFFSET_INSTRUCTION_START)),
            instruction_length: get_u64(buf, OFFSET_INSTRUCTION_LENGTH),
            prefix_flags: PrefixFlags::from_bits_truncate(buf[OFFSET_PREFIX_FLAGS]),
            detail_flags,
            lock_byte: buf[OFFSET_LOCK_BYTE],
            last_prefix_byte: buf[OFFSET_LAST_PREFIX],
            rex_byte: buf[OFFSET_REX],
            modrm,
            sib: None,
            opcode: u32::from_le_bytes(opcode),
            opcode_offset: buf[OFFSET_OPCODE_OFFSET],
            memory_displacement: get_u64(buf, OFFSET_DISPLACEMENT) as i64,
            displacement_size: 0,
            immediate_size: 0,
            operand: get_u64(buf, OFFSET_OPERAND),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dasm::decode_instruction;
    use crate::memory::CodeWindow;

    #[test]
    fn test_fixture_offsets() {
        // lea rax, [rip - 0x10]
        let bytes = [0x48, 0x8D, 0x05, 0xF0, 0xFF, 0xFF, 0xFF];
        let mut record = DecodeRecord::new();
        decode_instruction(&mut record, CodeWindow::new(&bytes, 0x1000u64)).unwrap();

        let fixture = record.to_fixture();
        assert_eq!(fixture.len(), 128);
        assert_eq!(get_u64(&fixture, 0), 0x1000);
        assert_eq!(get_u64(&fixture, 8), 7);
        assert_eq!(fixture[0x10], PrefixFlags::REX.bits());
        assert_eq!(fixture[0x1B], 0x48);
        assert_eq!(fixture[0x1C], 0x05);
        assert_eq!(fixture[0x1D], 0);
        assert_eq!(fixture[0x1F], 5);
        assert_eq!(&fixture[0x28..0x2C], &0x10Du32.to_le_bytes());
        assert_eq!(get_u64(&fixture, 0x30), (-0x10i64) as u64);
        assert_eq!(fixture[0x50], 1);
    }

    #[test]
    fn test_fixture_restores_semantic_fields() {
        // call +0
        let bytes = [0xE8, 0x00, 0x00, 0x00, 0x00];
        let mut record = DecodeRecord::new();
        decode_instruction(&mut record, CodeWindow::new(&bytes, 0x2000u64)).unwrap();

        let restored = DecodeRecord::from_fixture(&record.to_fixture());
        assert!(restored.is_call());
        assert_eq!(restored.instruction_start, record.instruction_start);
        assert_eq!(restored.instruction_length, 5);
        assert_eq!(restored.operand, 0x2005);
        assert_eq!(restored.modrm, None);
    }
}
