// Fri Oct 16 2026 - Alex

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::fmt;

/// Named slot of the allocator-shaped table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AllocatorSlot {
    Alloc,
    Free,
    Opaque,
}

impl AllocatorSlot {
    pub const ALL: [AllocatorSlot; 3] = [AllocatorSlot::Alloc, AllocatorSlot::Free, AllocatorSlot::Opaque];

    fn index(self) -> usize {
        match self {
            AllocatorSlot::Alloc => 0,
            AllocatorSlot::Free => 1,
            AllocatorSlot::Opaque => 2,
        }
    }
}

impl fmt::Display for AllocatorSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocatorSlot::Alloc => write!(f, "alloc"),
            AllocatorSlot::Free => write!(f, "free"),
            AllocatorSlot::Opaque => write!(f, "opaque"),
        }
    }
}

/// C layout of the table: three pointer-width words in slot order.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawAllocator {
    pub alloc: usize,
    pub free: usize,
    pub opaque: usize,
}

/// Allocator-shaped table whose slots carry resolved addresses rather than
/// allocation callbacks. The contents are never interpreted here.
///
/// Meant to be populated from the single-threaded initialisation context
/// that first calls [`get_import_allocator`].
pub struct ImportAllocator {
    slots: Mutex<[Option<u64>; 3]>,
}

impl ImportAllocator {
    fn new() -> Self {
        Self {
            slots: Mutex::new([None; 3]),
        }
    }

    /// Stores `addr` in `slot`, returning the previous value.
    pub fn bind(&self, slot: AllocatorSlot, addr: u64) -> Option<u64> {
        let previous = self.slots.lock()[slot.index()].replace(addr);
        log::trace!("bound {} slot to {:#x}", slot, addr);
        previous
    }

    pub fn unbind(&self, slot: AllocatorSlot) -> Option<u64> {
        self.slots.lock()[slot.index()].take()
    }

    pub fn resolved(&self, slot: AllocatorSlot) -> Option<u64> {
        self.slots.lock()[slot.index()]
    }

    pub fn is_populated(&self) -> bool {
        self.slots.lock().iter().all(Option::is_some)
    }

    /// Unbound slots read as zero.
    pub fn snapshot(&self) -> RawAllocator {
        let slots = self.slots.lock();
        let word = |slot: AllocatorSlot| slots[slot.index()].unwrap_or(0) as usize;
        RawAllocator {
            alloc: word(AllocatorSlot::Alloc),
            free: word(AllocatorSlot::Free),
            opaque: word(AllocatorSlot::Opaque),
        }
    }
}

impl fmt::Debug for ImportAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = *self.slots.lock();
        f.debug_struct("ImportAllocator")
            .field("alloc", &slots[0])
            .field("free", &slots[1])
            .field("opaque", &slots[2])
            .finish()
    }
}

/// Process-wide allocator table, created on first use. Every call returns
/// the same instance.
pub fn get_import_allocator() -> &'static ImportAllocator {
    static INSTANCE: OnceCell<ImportAllocator> = OnceCell::new();
    INSTANCE.get_or_init(|| {
        log::debug!("creating import allocator table");
        ImportAllocator::new()
    })
}
