// Fri Oct 16 2026 - Alex

pub mod error;
pub mod image;
pub mod segment;

pub use error::ElfError;
pub use image::{first_load_vaddr, section_window, ElfImageInfo, PAGE_SIZE};
pub use segment::{elf_contains_segment, find_containing_segment, SegmentView};
