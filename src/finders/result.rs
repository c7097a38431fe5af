// Fri Oct 16 2026 - Alex

use crate::dasm::DecodeRecord;
use crate::memory::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One hit reported by the command-line driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinderResult {
    pub kind: String,
    pub address: Address,
    pub length: u64,
    pub opcode: Option<u32>,
    pub displacement: Option<i64>,
    pub operand: Option<u64>,
}

impl FinderResult {
    pub fn new(kind: &str, address: Address) -> Self {
        Self {
            kind: kind.to_string(),
            address,
            length: 0,
            opcode: None,
            displacement: None,
            operand: None,
        }
    }

    pub fn from_record(kind: &str, record: &DecodeRecord) -> Self {
        Self {
            kind: kind.to_string(),
            address: record.instruction_start,
            length: record.instruction_length,
            opcode: Some(record.logical_opcode()),
            displacement: (record.displacement_size > 0).then_some(record.memory_displacement),
            operand: (record.operand != 0).then_some(record.operand),
        }
    }
}

impl fmt::Display for FinderResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<9} {}", self.kind, self.address)?;
        if self.length > 0 {
            write!(f, " len={}", self.length)?;
        }
        if let Some(opcode) = self.opcode {
            write!(f, " opcode={:#x}", opcode)?;
        }
        if let Some(disp) = self.displacement {
            write!(f, " disp={}{:#x}", if disp < 0 { "-" } else { "" }, disp.unsigned_abs())?;
        }
        if let Some(operand) = self.operand {
            write!(f, " operand={:#x}", operand)?;
        }
        Ok(())
    }
}
