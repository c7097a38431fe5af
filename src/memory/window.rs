// Fri Oct 16 2026 - Alex

use crate::memory::{Address, MemoryError};
use std::fmt;

/// A borrowed `[start, end)` byte window. `start` is the virtual address of
/// `bytes[0]`; nothing outside `bytes` is ever read through a window.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct CodeWindow<'a> {
    bytes: &'a [u8],
    start: Address,
}

impl<'a> CodeWindow<'a> {
    pub fn new(bytes: &'a [u8], start: impl Into<Address>) -> Self {
        Self {
            bytes,
            start: start.into(),
        }
    }

    /// Builds a window over live memory, addressed by the pointers
    /// themselves. An inverted range yields an empty window.
    ///
    /// # Safety
    /// `[start, end)` must be readable and must not be written to while the
    /// window is alive.
    pub unsafe fn from_raw_parts(start: *const u8, end: *const u8) -> Self {
        let len = (end as usize).saturating_sub(start as usize);
        let bytes = if len == 0 || start.is_null() {
            &[]
        } else {
            std::slice::from_raw_parts(start, len)
        };
        Self {
            bytes,
            start: Address::from_ptr(start),
        }
    }

    /// Window over `bytes[offset..offset + len]` of an image whose first byte
    /// lives at `base`.
    pub fn from_image(bytes: &'a [u8], base: Address, offset: usize, len: usize) -> Result<Self, MemoryError> {
        let end = offset.checked_add(len).ok_or(MemoryError::InvalidRange)?;
        let slice = bytes
            .get(offset..end)
            .ok_or(MemoryError::OutOfBounds(base.as_u64().wrapping_add(end as u64)))?;
        Ok(Self::new(slice, base + offset as u64))
    }

    pub fn start(&self) -> Address {
        self.start
    }

    pub fn end(&self) -> Address {
        self.start + self.bytes.len() as u64
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn contains(&self, addr: Address) -> bool {
        addr >= self.start && (addr - self.start) < self.bytes.len() as u64
    }

    pub fn byte_at(&self, addr: Address) -> Option<u8> {
        if !self.contains(addr) {
            return None;
        }
        self.bytes.get((addr - self.start) as usize).copied()
    }

    /// The tail `[addr, end)`. `addr == end` gives an empty window; anything
    /// outside the window gives `None`.
    pub fn from_address(&self, addr: Address) -> Option<CodeWindow<'a>> {
        if addr < self.start {
            return None;
        }
        let offset = addr - self.start;
        if offset > self.bytes.len() as u64 {
            return None;
        }
        Some(self.advance(offset as usize))
    }

    /// Drops the first `count` bytes, saturating at the end.
    pub fn advance(&self, count: usize) -> CodeWindow<'a> {
        let count = count.min(self.bytes.len());
        CodeWindow {
            bytes: &self.bytes[count..],
            start: self.start + count as u64,
        }
    }

    /// Clamps the window so it ends no later than `end`.
    pub fn truncate_to(&self, end: Address) -> CodeWindow<'a> {
        let keep = if end <= self.start {
            0
        } else {
            (end - self.start).min(self.bytes.len() as u64) as usize
        };
        CodeWindow {
            bytes: &self.bytes[..keep],
            start: self.start,
        }
    }
}

impl fmt::Debug for CodeWindow<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CodeWindow[{}, {})", self.start, self.end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_bounds() {
        let bytes = [0x90u8, 0x90, 0xC3];
        let window = CodeWindow::new(&bytes, 0x1000u64);

        assert_eq!(window.start(), Address::new(0x1000));
        assert_eq!(window.end(), Address::new(0x1003));
        assert!(window.contains(Address::new(0x1002)));
        assert!(!window.contains(Address::new(0x1003)));
        assert_eq!(window.byte_at(Address::new(0x1002)), Some(0xC3));
        assert_eq!(window.byte_at(Address::new(0x0fff)), None);
    }

    #[test]
    fn test_window_slicing() {
        let bytes = [0u8; 16];
        let window = CodeWindow::new(&bytes, 0x2000u64);

        let tail = window.from_address(Address::new(0x2004)).unwrap();
        assert_eq!(tail.start(), Address::new(0x2004));
        assert_eq!(tail.len(), 12);
        assert!(window.from_address(Address::new(0x2010)).unwrap().is_empty());
        assert!(window.from_address(Address::new(0x2011)).is_none());

        let head = window.truncate_to(Address::new(0x2008));
        assert_eq!(head.len(), 8);
        assert!(window.truncate_to(Address::new(0x1000)).is_empty());
        assert_eq!(window.advance(100).len(), 0);
    }

    #[test]
    fn test_window_from_raw_parts() {
        let bytes = [1u8, 2, 3, 4];
        let range = bytes.as_ptr_range();
        let window = unsafe { CodeWindow::from_raw_parts(range.start, range.end) };
        assert_eq!(window.len(), 4);
        assert_eq!(window.start(), Address::from_ptr(bytes.as_ptr()));

        let inverted = unsafe { CodeWindow::from_raw_parts(range.end, range.start) };
        assert!(inverted.is_empty());
    }

    #[test]
    fn test_window_from_image() {
        let image = [0u8; 32];
        let window = CodeWindow::from_image(&image, Address::new(0x400000), 8, 8).unwrap();
        assert_eq!(window.start(), Address::new(0x400008));
        assert!(CodeWindow::from_image(&image, Address::new(0x400000), 30, 8).is_err());
    }
}
