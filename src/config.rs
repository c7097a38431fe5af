// Fri Oct 16 2026 - Alex

use crate::finders::PrologueMode;
use crate::memory::{Address, SegmentFlags};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub section: String,
    pub segment_step: usize,
    pub required_flags: String,
    pub prologue_mode: PrologueMode,
    pub prologue_alignment: u64,
    pub base_address: Option<Address>,
    pub max_instructions: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            section: ".text".to_string(),
            segment_step: 1,
            required_flags: "rx".to_string(),
            prologue_mode: PrologueMode::default(),
            prologue_alignment: 0,
            base_address: None,
            max_instructions: 64,
        }
    }
}

impl ScanConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: ScanConfig = serde_json::from_str(&text)?;
        config.validate().map_err(|e| anyhow::anyhow!(e))?;
        log::debug!("Loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn with_section(mut self, section: &str) -> Self {
        self.section = section.to_string();
        self
    }

    pub fn with_segment_step(mut self, step: usize) -> Self {
        self.segment_step = step;
        self
    }

    pub fn with_required_flags(mut self, flags: &str) -> Self {
        self.required_flags = flags.to_string();
        self
    }

    pub fn with_prologue_mode(mut self, mode: PrologueMode) -> Self {
        self.prologue_mode = mode;
        self
    }

    pub fn with_base_address(mut self, base: Address) -> Self {
        self.base_address = Some(base);
        self
    }

    pub fn with_max_instructions(mut self, max: usize) -> Self {
        self.max_instructions = max;
        self
    }

    /// `required_flags` parsed; invalid strings fall back to read+execute.
    pub fn segment_flags(&self) -> SegmentFlags {
        SegmentFlags::parse(&self.required_flags).unwrap_or(SegmentFlags::READ | SegmentFlags::EXECUTE)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.section.is_empty() {
            return Err("section must not be empty".to_string());
        }
        if self.segment_step == 0 {
            return Err("segment_step must be greater than 0".to_string());
        }
        if SegmentFlags::parse(&self.required_flags).is_none() {
            return Err(format!("required_flags must use r, w, x or -: {:?}", self.required_flags));
        }
        if self.prologue_alignment > 1 && !self.prologue_alignment.is_power_of_two() {
            return Err("prologue_alignment must be a power of two".to_string());
        }
        if self.max_instructions == 0 {
            return Err("max_instructions must be greater than 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ScanConfig::new();
        assert!(config.validate().is_ok());
        assert_eq!(config.section, ".text");
        assert_eq!(config.segment_flags(), SegmentFlags::READ | SegmentFlags::EXECUTE);
        assert_eq!(config.prologue_mode, PrologueMode::Endbr64);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(ScanConfig::new().with_segment_step(0).validate().is_err());
        assert!(ScanConfig::new().with_required_flags("rq").validate().is_err());
        assert!(ScanConfig::new().with_section("").validate().is_err());
        assert!(ScanConfig::new().with_max_instructions(0).validate().is_err());

        let mut config = ScanConfig::new();
        config.prologue_alignment = 12;
        assert!(config.validate().is_err());
        config.prologue_alignment = 16;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config: ScanConfig = serde_json::from_str(r#"{"section": ".init", "prologue_mode": "nop", "base_address": 4194304}"#).unwrap();
        assert_eq!(config.section, ".init");
        assert_eq!(config.prologue_mode, PrologueMode::Nop);
        assert_eq!(config.base_address, Some(Address::new(0x400000)));
        assert_eq!(config.segment_step, 1);
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("elf-code-finder-config-{}.json", std::process::id()));
        let config = ScanConfig::new().with_section(".plt").with_required_flags("r-x");
        std::fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = ScanConfig::load(&path).unwrap();
        assert_eq!(loaded, config);

        std::fs::write(&path, r#"{"segment_step": 0}"#).unwrap();
        assert!(ScanConfig::load(&path).is_err());
        std::fs::remove_file(&path).unwrap();
    }
}
