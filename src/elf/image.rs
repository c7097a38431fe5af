// Fri Oct 16 2026 - Alex

use crate::elf::ElfError;
use crate::memory::{Address, CodeWindow};
use goblin::elf::program_header::{ProgramHeader, PT_LOAD};
use goblin::elf::section_header::SHT_NOBITS;
use goblin::elf::Elf;

pub const PAGE_SIZE: u64 = 0x1000;

/// Caller-owned description of a loaded ELF image.
///
/// `first_vaddr` is the link-time address that maps to `base_address` at
/// runtime, so a header's `p_vaddr` lives at
/// `base_address + (p_vaddr - first_vaddr)`.
#[derive(Debug, Clone, Copy)]
pub struct ElfImageInfo<'a> {
    base_address: Address,
    first_vaddr: u64,
    program_headers: Option<&'a [ProgramHeader]>,
}

impl<'a> ElfImageInfo<'a> {
    pub fn new(base_address: Address, first_vaddr: u64, program_headers: Option<&'a [ProgramHeader]>) -> Self {
        Self {
            base_address,
            first_vaddr,
            program_headers,
        }
    }

    /// Describes `elf` as loaded at `base_address`.
    pub fn from_elf(elf: &'a Elf<'_>, base_address: Address) -> Result<Self, ElfError> {
        if !elf.is_64 {
            return Err(ElfError::NotElf64);
        }
        let first_vaddr = first_load_vaddr(&elf.program_headers).ok_or(ElfError::NoLoadSegments)?;
        Ok(Self::new(base_address, first_vaddr, Some(elf.program_headers.as_slice())))
    }

    /// Describes `elf` at its link-time addresses.
    pub fn unrelocated(elf: &'a Elf<'_>) -> Result<Self, ElfError> {
        let first_vaddr = first_load_vaddr(&elf.program_headers).ok_or(ElfError::NoLoadSegments)?;
        Self::from_elf(elf, Address::new(first_vaddr))
    }

    pub fn base_address(&self) -> Address {
        self.base_address
    }

    pub fn first_vaddr(&self) -> u64 {
        self.first_vaddr
    }

    pub fn program_headers(&self) -> Option<&'a [ProgramHeader]> {
        self.program_headers
    }

    pub fn load_bias(&self) -> u64 {
        self.base_address.as_u64().wrapping_sub(self.first_vaddr)
    }

    /// Runtime address of link-time address `vaddr`.
    pub fn relocate(&self, vaddr: u64) -> Address {
        self.base_address + vaddr.wrapping_sub(self.first_vaddr)
    }
}

/// Lowest `PT_LOAD` virtual address, rounded down to a page.
pub fn first_load_vaddr(headers: &[ProgramHeader]) -> Option<u64> {
    headers
        .iter()
        .filter(|ph| ph.p_type == PT_LOAD)
        .map(|ph| ph.p_vaddr)
        .min()
        .map(|vaddr| Address::new(vaddr).align_down(PAGE_SIZE).as_u64())
}

/// Window over the file contents of section `name`, addressed where the
/// section sits in the image described by `info`.
pub fn section_window<'d>(elf: &Elf<'_>, data: &'d [u8], name: &str, info: &ElfImageInfo<'_>) -> Result<CodeWindow<'d>, ElfError> {
    let section = elf
        .section_headers
        .iter()
        .find(|sh| elf.shdr_strtab.get_at(sh.sh_name) == Some(name))
        .ok_or_else(|| ElfError::SectionNotFound(name.to_string()))?;

    if section.sh_type == SHT_NOBITS || section.sh_size == 0 {
        return Err(ElfError::EmptySection(name.to_string()));
    }

    let window = CodeWindow::from_image(
        data,
        Address::zero(),
        section.sh_offset as usize,
        section.sh_size as usize,
    )?;
    Ok(CodeWindow::new(window.bytes(), info.relocate(section.sh_addr)))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use goblin::elf::program_header::{PF_R, PF_W, PF_X, PT_NULL};

    pub(crate) fn load(vaddr: u64, memsz: u64, flags: u32) -> ProgramHeader {
        ProgramHeader {
            p_type: PT_LOAD,
            p_flags: flags,
            p_offset: vaddr,
            p_vaddr: vaddr,
            p_paddr: vaddr,
            p_filesz: memsz,
            p_memsz: memsz,
            p_align: PAGE_SIZE,
        }
    }

    /// Minimal little-endian ELF64 executable containing only program
    /// headers.
    fn build_elf(headers: &[ProgramHeader]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&[0x7F, b'E', b'L', b'F', 2, 1, 1, 0]);
        out.extend_from_slice(&[0; 8]);
        out.extend_from_slice(&2u16.to_le_bytes()); // ET_EXEC
        out.extend_from_slice(&0x3Eu16.to_le_bytes()); // EM_X86_64
        out.extend_from_slice(&1u32.to_le_bytes());
        out.extend_from_slice(&0x401000u64.to_le_bytes()); // e_entry
        out.extend_from_slice(&64u64.to_le_bytes()); // e_phoff
        out.extend_from_slice(&0u64.to_le_bytes()); // e_shoff
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&64u16.to_le_bytes()); // e_ehsize
        out.extend_from_slice(&56u16.to_le_bytes()); // e_phentsize
        out.extend_from_slice(&(headers.len() as u16).to_le_bytes());
        out.extend_from_slice(&64u16.to_le_bytes()); // e_shentsize
        out.extend_from_slice(&0u16.to_le_bytes()); // e_shnum
        out.extend_from_slice(&0u16.to_le_bytes()); // e_shstrndx
        assert_eq!(out.len(), 64);

        for ph in headers {
            out.extend_from_slice(&ph.p_type.to_le_bytes());
            out.extend_from_slice(&ph.p_flags.to_le_bytes());
            out.extend_from_slice(&0u64.to_le_bytes());
            out.extend_from_slice(&ph.p_vaddr.to_le_bytes());
            out.extend_from_slice(&ph.p_paddr.to_le_bytes());
            out.extend_from_slice(&0u64.to_le_bytes());
            out.extend_from_slice(&ph.p_memsz.to_le_bytes());
            out.extend_from_slice(&ph.p_align.to_le_bytes());
        }
        out
    }

    #[test]
    fn test_first_load_vaddr() {
        let mut null = load(0, 0, 0);
        null.p_type = PT_NULL;
        let headers = [null, load(0x401000, 0x100, PF_R | PF_X), load(0x400040, 0x40, PF_R)];
        assert_eq!(first_load_vaddr(&headers), Some(0x400000));
        assert_eq!(first_load_vaddr(&[]), None);
    }

    #[test]
    fn test_relocation() {
        let headers = [load(0x0, 0x1000, PF_R), load(0x1000, 0x2000, PF_R | PF_X)];
        let info = ElfImageInfo::new(Address::new(0x7f00_0000_0000), 0, Some(&headers[..]));
        assert_eq!(info.relocate(0x1234), Address::new(0x7f00_0000_1234));
        assert_eq!(info.load_bias(), 0x7f00_0000_0000);
        assert_eq!(info.program_headers().map(|h| h.len()), Some(2));
    }

    #[test]
    fn test_from_parsed_elf() {
        let headers = [load(0x400000, 0x1000, PF_R), load(0x401000, 0x1000, PF_R | PF_X), load(0x403000, 0x800, PF_R | PF_W)];
        let bytes = build_elf(&headers);
        let elf = Elf::parse(&bytes).unwrap();

        let info = ElfImageInfo::unrelocated(&elf).unwrap();
        assert_eq!(info.first_vaddr(), 0x400000);
        assert_eq!(info.base_address(), Address::new(0x400000));
        assert_eq!(info.program_headers().unwrap().len(), 3);

        let moved = ElfImageInfo::from_elf(&elf, Address::new(0x5555_0000_0000)).unwrap();
        assert_eq!(moved.relocate(0x401000), Address::new(0x5555_0000_1000));
    }

    #[test]
    fn test_missing_load_segments() {
        let bytes = build_elf(&[]);
        let elf = Elf::parse(&bytes).unwrap();
        assert!(matches!(ElfImageInfo::unrelocated(&elf), Err(ElfError::NoLoadSegments)));
        assert!(matches!(
            section_window(&elf, &bytes, ".text", &ElfImageInfo::new(Address::zero(), 0, None)),
            Err(ElfError::SectionNotFound(_))
        ));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_own_text_section() {
        let path = std::env::current_exe().unwrap();
        let data = std::fs::read(path).unwrap();
        let elf = Elf::parse(&data).unwrap();
        let info = ElfImageInfo::unrelocated(&elf).unwrap();

        let text = section_window(&elf, &data, ".text", &info).unwrap();
        assert!(!text.is_empty());
        assert!(crate::elf::elf_contains_segment(
            &info,
            text.start(),
            text.len() as u64,
            crate::memory::SegmentFlags::READ | crate::memory::SegmentFlags::EXECUTE,
            1
        ));
    }
}
