// Fri Oct 16 2026 - Alex

use crate::dasm::DecodeRecord;
use crate::finders::scan_window;
use crate::memory::CodeWindow;

/// True if `window` contains a `lea` whose memory displacement equals
/// `displacement`, before any decode failure.
pub fn find_lea_instruction(window: CodeWindow<'_>, displacement: i64) -> bool {
    let mut record = DecodeRecord::new();
    find_lea_instruction_with_record(window, displacement, &mut record)
}

pub fn find_lea_instruction_with_record(window: CodeWindow<'_>, displacement: i64, record: &mut DecodeRecord) -> bool {
    let found = scan_window(window, record, |r| r.is_lea() && r.memory_displacement == displacement);
    if found {
        log::debug!("lea with displacement {:#x} at {}", displacement, record.instruction_start);
    }
    found
}
