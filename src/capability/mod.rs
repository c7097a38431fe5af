// Fri Oct 16 2026 - Alex

pub mod allocator;

pub use allocator::{get_import_allocator, AllocatorSlot, ImportAllocator, RawAllocator};
