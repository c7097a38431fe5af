// Fri Oct 16 2026 - Alex

use crate::dasm::DecodeRecord;
use crate::finders::scan_window;
use crate::memory::{Address, CodeWindow};

/// Finds the first direct `call rel32` in `window`.
///
/// `call_target` of `None` (or a null address) matches any call; otherwise
/// the resolved call destination must equal it. On success `record` holds the
/// call instruction.
pub fn find_call_instruction(window: CodeWindow<'_>, call_target: Option<Address>, record: &mut DecodeRecord) -> bool {
    let target = call_target.filter(|t| !t.is_null());
    let found = scan_window(window, record, |r| {
        r.is_call() && target.map_or(true, |t| r.operand == t.as_u64())
    });

    match (found, target) {
        (true, _) => log::debug!("Call at {} -> {:#x}", record.instruction_start, record.operand),
        (false, Some(t)) => log::debug!("No call to {} in {:?}", t, window),
        (false, None) => log::debug!("No call in {:?}", window),
    }
    found
}

/// Every direct call site in `window` matching `call_target`, in address
/// order. Stops at the first instruction that fails to decode.
pub fn call_sites(window: CodeWindow<'_>, call_target: Option<Address>) -> Vec<DecodeRecord> {
    let mut sites = Vec::new();
    let mut cursor = window;
    let mut record = DecodeRecord::new();

    while find_call_instruction(cursor, call_target, &mut record) {
        let next = record.next_instruction();
        sites.push(record.clone());
        cursor = match cursor.from_address(next) {
            Some(rest) => rest,
            None => break,
        };
    }
    sites
}
