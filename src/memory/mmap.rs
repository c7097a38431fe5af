// Fri Oct 16 2026 - Alex

use crate::memory::MemoryError;
use memmap2::Mmap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Read-only mapping of an image file.
pub struct MappedImage {
    mmap: Arc<Mmap>,
    path: PathBuf,
}

impl MappedImage {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, MemoryError> {
        let path_buf = path.as_ref().to_path_buf();
        let file = File::open(&path_buf)?;
        if file.metadata()?.len() == 0 {
            return Err(MemoryError::EmptyImage(path_buf.display().to_string()));
        }
        // The mapping is private and read-only; concurrent truncation of the
        // file by another process is outside our control.
        let mmap = unsafe { Mmap::map(&file) }?;
        log::debug!("Mapped {} ({} bytes)", path_buf.display(), mmap.len());
        Ok(Self {
            mmap: Arc::new(mmap),
            path: path_buf,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> usize {
        self.mmap.len()
    }

    pub fn as_slice(&self) -> &[u8] {
        self.mmap.as_ref()
    }
}
