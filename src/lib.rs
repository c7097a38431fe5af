// Fri Oct 16 2026 - Alex

pub mod capability;
pub mod config;
pub mod dasm;
pub mod elf;
pub mod finders;
pub mod memory;
pub mod ui;

pub use capability::{get_import_allocator, ImportAllocator};
pub use config::ScanConfig;
pub use dasm::{decode_instruction, x86_dasm, DecodeError, DecodeRecord};
pub use elf::{elf_contains_segment, ElfImageInfo};
pub use finders::{find_call_instruction, find_function_prologue, find_lea_instruction, PrologueMode};
pub use memory::{Address, CodeWindow, SegmentFlags};
