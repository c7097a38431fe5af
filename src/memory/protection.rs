// Fri Oct 16 2026 - Alex

use bitflags::bitflags;
use goblin::elf::program_header::{PF_R, PF_W, PF_X};
use std::fmt;

bitflags! {
    /// ELF segment protection (`PF_*`) bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SegmentFlags: u32 {
        const EXECUTE = PF_X;
        const WRITE = PF_W;
        const READ = PF_R;
    }
}

impl SegmentFlags {
    pub fn from_p_flags(p_flags: u32) -> Self {
        Self::from_bits_truncate(p_flags)
    }

    pub fn can_read(self) -> bool {
        self.contains(Self::READ)
    }

    pub fn can_write(self) -> bool {
        self.contains(Self::WRITE)
    }

    pub fn can_execute(self) -> bool {
        self.contains(Self::EXECUTE)
    }

    /// Parses `rwx`-style strings; `-` is a placeholder. Returns `None` on any
    /// other character.
    pub fn parse(s: &str) -> Option<Self> {
        let mut flags = Self::empty();
        for c in s.chars() {
            match c.to_ascii_lowercase() {
                'r' => flags |= Self::READ,
                'w' => flags |= Self::WRITE,
                'x' => flags |= Self::EXECUTE,
                '-' => {}
                _ => return None,
            }
        }
        Some(flags)
    }
}

impl fmt::Display for SegmentFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            if self.can_read() { 'r' } else { '-' },
            if self.can_write() { 'w' } else { '-' },
            if self.can_execute() { 'x' } else { '-' },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_match_elf_bits() {
        assert_eq!(SegmentFlags::EXECUTE.bits(), 1);
        assert_eq!(SegmentFlags::WRITE.bits(), 2);
        assert_eq!(SegmentFlags::READ.bits(), 4);
        assert_eq!(SegmentFlags::from_p_flags(0xF0 | 5), SegmentFlags::READ | SegmentFlags::EXECUTE);
    }

    #[test]
    fn test_flags_parse_and_display() {
        let rx = SegmentFlags::parse("r-x").unwrap();
        assert!(rx.can_read() && rx.can_execute() && !rx.can_write());
        assert_eq!(rx.to_string(), "r-x");
        assert_eq!(SegmentFlags::parse("RW").unwrap().to_string(), "rw-");
        assert!(SegmentFlags::parse("rq").is_none());
        assert_eq!(SegmentFlags::empty().to_string(), "---");
    }
}
