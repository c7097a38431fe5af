// Fri Oct 16 2026 - Alex

use crate::elf::ElfImageInfo;
use crate::memory::{Address, SegmentFlags};
use goblin::elf::program_header::{ProgramHeader, PT_LOAD};
use serde::Serialize;
use std::fmt;

/// Runtime view of one `PT_LOAD` program header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SegmentView {
    pub index: usize,
    pub start: Address,
    pub end: Address,
    #[serde(serialize_with = "serialize_flags")]
    pub flags: SegmentFlags,
}

fn serialize_flags<S: serde::Serializer>(flags: &SegmentFlags, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(flags)
}

impl SegmentView {
    fn from_header(info: &ElfImageInfo<'_>, index: usize, ph: &ProgramHeader) -> Option<Self> {
        let start = info.relocate(ph.p_vaddr);
        let end = start.checked_add(ph.p_memsz)?;
        Some(Self {
            index,
            start,
            end,
            flags: SegmentFlags::from_p_flags(ph.p_flags),
        })
    }

    pub fn size(&self) -> u64 {
        self.end - self.start
    }

    /// `[start, end)` lies entirely inside the segment.
    pub fn contains_range(&self, start: Address, end: Address) -> bool {
        self.start <= start && end <= self.end
    }
}

impl fmt::Display for SegmentView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:<3} [{}, {}) {}", self.index, self.start, self.end, self.flags)
    }
}

impl<'a> ElfImageInfo<'a> {
    /// Every `PT_LOAD` segment, in header order.
    pub fn segments(&self) -> impl Iterator<Item = SegmentView> + 'a {
        self.segments_with_step(1)
    }

    /// `PT_LOAD` segments among headers `0, step, 2 * step, ...`.
    pub fn segments_with_step(&self, step: usize) -> impl Iterator<Item = SegmentView> + 'a {
        let info = *self;
        let headers = self.program_headers().unwrap_or(&[]);
        headers
            .iter()
            .enumerate()
            .step_by(step.max(1))
            .filter(|(_, ph)| ph.p_type == PT_LOAD)
            .filter_map(move |(index, ph)| SegmentView::from_header(&info, index, ph))
    }
}

/// The first visited segment that fully covers `[vaddr, vaddr + size)` with
/// at least the protection in `p_flags`.
///
/// Empty ranges, a zero `step`, a missing header table and ranges that wrap
/// the address space never match.
pub fn find_containing_segment(info: &ElfImageInfo<'_>, vaddr: Address, size: u64, p_flags: SegmentFlags, step: usize) -> Option<SegmentView> {
    if size == 0 || step == 0 || info.program_headers().is_none() {
        return None;
    }
    let end = vaddr.checked_add(size)?;

    info.segments_with_step(step)
        .find(|seg| seg.contains_range(vaddr, end) && seg.flags.contains(p_flags))
}

pub fn elf_contains_segment(info: &ElfImageInfo<'_>, vaddr: Address, size: u64, p_flags: SegmentFlags, step: usize) -> bool {
    let found = find_containing_segment(info, vaddr, size, p_flags, step);
    match &found {
        Some(seg) => log::trace!("[{}, +{:#x}) {} inside segment {}", vaddr, size, p_flags, seg),
        None => log::debug!("[{}, +{:#x}) {} not contained in any segment", vaddr, size, p_flags),
    }
    found.is_some()
}
