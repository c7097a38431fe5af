// Fri Oct 16 2026 - Alex

pub mod address;
pub mod error;
pub mod mmap;
pub mod protection;
pub mod window;

pub use address::Address;
pub use error::MemoryError;
pub use mmap::MappedImage;
pub use protection::SegmentFlags;
pub use window::CodeWindow;
