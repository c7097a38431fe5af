// Fri Oct 16 2026 - Alex

use super::args::{Args, CallArgs, Command, ContainsArgs, DecodeArgs, ImageArgs, LeaArgs, PrologueArgs};
use crate::config::ScanConfig;
use crate::dasm::{instructions, DecodeRecord};
use crate::elf::{elf_contains_segment, find_containing_segment, section_window, ElfImageInfo, SegmentView};
use crate::finders::{call_sites, find_call_instruction, find_function_prologue_aligned, find_lea_instruction_with_record, FinderResult};
use crate::memory::{Address, CodeWindow, MappedImage, SegmentFlags};
use anyhow::{anyhow, bail, Context};
use colored::Colorize;
use goblin::elf::Elf;

pub struct CommandHandler {
    config: ScanConfig,
    json: bool,
    quiet: bool,
}

impl CommandHandler {
    pub fn new() -> Self {
        Self {
            config: ScanConfig::default(),
            json: false,
            quiet: false,
        }
    }

    pub fn with_config(config: ScanConfig) -> Self {
        Self {
            config,
            ..Self::new()
        }
    }

    pub fn execute(mut self, args: Args) -> anyhow::Result<()> {
        self.setup_logging(&args)?;

        if args.no_color {
            colored::control::set_override(false);
        }
        if let Some(path) = &args.config {
            self.config = ScanConfig::load(path).with_context(|| format!("Failed to load config {}", path.display()))?;
        }
        self.json = args.json;
        self.quiet = args.quiet;

        match args.command {
            Command::Decode(decode_args) => self.handle_decode(decode_args),
            Command::Call(call_args) => self.handle_call(call_args),
            Command::Lea(lea_args) => self.handle_lea(lea_args),
            Command::Prologue(prologue_args) => self.handle_prologue(prologue_args),
            Command::Segments(image_args) => self.handle_segments(image_args),
            Command::Contains(contains_args) => self.handle_contains(contains_args),
        }
    }

    fn setup_logging(&self, args: &Args) -> anyhow::Result<()> {
        let level = match args.log_level.to_lowercase().as_str() {
            "trace" => log::LevelFilter::Trace,
            "debug" => log::LevelFilter::Debug,
            "info" => log::LevelFilter::Info,
            "warn" => log::LevelFilter::Warn,
            "error" => log::LevelFilter::Error,
            "off" => log::LevelFilter::Off,
            _ => log::LevelFilter::Warn,
        };

        env_logger::Builder::new()
            .filter_level(level)
            .format_timestamp(None)
            .try_init()
            .map_err(|e| anyhow!("Failed to install logger: {}", e))?;

        Ok(())
    }

    /// Maps the image and hands `f` the parsed ELF and its runtime layout.
    fn with_image<T, F>(&self, image: &ImageArgs, f: F) -> anyhow::Result<T>
    where
        F: FnOnce(&Elf<'_>, &[u8], &ElfImageInfo<'_>) -> anyhow::Result<T>,
    {
        let mapped = MappedImage::open(&image.binary).with_context(|| format!("Failed to map {}", image.binary.display()))?;
        let data = mapped.as_slice();
        let elf = Elf::parse(data).with_context(|| format!("Failed to parse {}", image.binary.display()))?;

        let info = match image.base.or(self.config.base_address) {
            Some(base) => ElfImageInfo::from_elf(&elf, base)?,
            None => ElfImageInfo::unrelocated(&elf)?,
        };
        log::info!(
            "Loaded {} ({} bytes, {} program headers, base {})",
            mapped.path().display(),
            mapped.size(),
            elf.program_headers.len(),
            info.base_address()
        );
        f(&elf, data, &info)
    }

    /// The configured section, refused unless one segment covers it with the
    /// required protection.
    fn code_window<'d>(&self, elf: &Elf<'_>, data: &'d [u8], info: &ElfImageInfo<'_>, image: &ImageArgs) -> anyhow::Result<CodeWindow<'d>> {
        let section = image.section.as_deref().unwrap_or(&self.config.section);
        let window = section_window(elf, data, section, info)?;
        let flags = self.config.segment_flags();

        if !elf_contains_segment(info, window.start(), window.len() as u64, flags, self.config.segment_step) {
            bail!("Section {} at {:?} is not inside a single {} segment", section, window, flags);
        }
        log::debug!("Scanning {} {:?}", section, window);
        Ok(window)
    }

    fn start_at<'d>(window: CodeWindow<'d>, from: Option<Address>) -> anyhow::Result<CodeWindow<'d>> {
        match from {
            Some(addr) => window
                .from_address(addr)
                .ok_or_else(|| anyhow!("Address {} is outside {:?}", addr, window)),
            None => Ok(window),
        }
    }

    fn handle_decode(&self, args: DecodeArgs) -> anyhow::Result<()> {
        let count = args.count.unwrap_or(self.config.max_instructions);
        self.with_image(&args.image, |elf, data, info| {
            let window = Self::start_at(self.code_window(elf, data, info, &args.image)?, args.address)?;

            let mut results = Vec::new();
            let mut failure = None;
            for decoded in instructions(window).take(count) {
                match decoded {
                    Ok(record) => results.push(FinderResult::from_record("insn", &record)),
                    Err(e) => failure = Some(e),
                }
            }
            self.report(&results)?;
            if let Some(e) = failure {
                if !self.json {
                    eprintln!("{} {}", "[!]".yellow(), e);
                }
            }
            Ok(())
        })
    }

    fn handle_call(&self, args: CallArgs) -> anyhow::Result<()> {
        self.with_image(&args.image, |elf, data, info| {
            let window = Self::start_at(self.code_window(elf, data, info, &args.image)?, args.from)?;

            let results: Vec<FinderResult> = if args.all {
                call_sites(window, args.target)
                    .iter()
                    .map(|record| FinderResult::from_record("call", record))
                    .collect()
            } else {
                let mut record = DecodeRecord::new();
                if find_call_instruction(window, args.target, &mut record) {
                    vec![FinderResult::from_record("call", &record)]
                } else {
                    Vec::new()
                }
            };
            self.report(&results)
        })
    }

    fn handle_lea(&self, args: LeaArgs) -> anyhow::Result<()> {
        self.with_image(&args.image, |elf, data, info| {
            let window = Self::start_at(self.code_window(elf, data, info, &args.image)?, args.from)?;

            let mut record = DecodeRecord::new();
            let results = if find_lea_instruction_with_record(window, args.displacement, &mut record) {
                vec![FinderResult::from_record("lea", &record)]
            } else {
                Vec::new()
            };
            self.report(&results)
        })
    }

    fn handle_prologue(&self, args: PrologueArgs) -> anyhow::Result<()> {
        let mode = args.mode.unwrap_or(self.config.prologue_mode);
        let alignment = args.alignment.unwrap_or(self.config.prologue_alignment);
        self.with_image(&args.image, |elf, data, info| {
            let window = Self::start_at(self.code_window(elf, data, info, &args.image)?, args.from)?;

            let results: Vec<FinderResult> = find_function_prologue_aligned(window, mode, alignment)
                .map(|addr| FinderResult::new(&mode.to_string(), addr))
                .into_iter()
                .collect();
            self.report(&results)
        })
    }

    fn handle_segments(&self, args: ImageArgs) -> anyhow::Result<()> {
        self.with_image(&args, |_, _, info| {
            let segments: Vec<SegmentView> = info.segments().collect();
            if self.json {
                println!("{}", serde_json::to_string_pretty(&segments)?);
                return Ok(());
            }
            if !self.quiet {
                println!("{}", format!("{} PT_LOAD segments", segments.len()).cyan());
            }
            for segment in &segments {
                let line = segment.to_string();
                if segment.flags.can_execute() {
                    println!("  {}", line.green());
                } else {
                    println!("  {}", line);
                }
            }
            Ok(())
        })
    }

    fn handle_contains(&self, args: ContainsArgs) -> anyhow::Result<()> {
        let flags = match &args.flags {
            Some(text) => SegmentFlags::parse(text).ok_or_else(|| anyhow!("Invalid protection: {}", text))?,
            None => self.config.segment_flags(),
        };
        let step = args.step.unwrap_or(self.config.segment_step);

        self.with_image(&args.image, |_, _, info| {
            let found = find_containing_segment(info, args.address, args.size, flags, step);
            if self.json {
                let report = serde_json::json!({
                    "address": args.address,
                    "size": args.size,
                    "flags": flags.to_string(),
                    "contained": found.is_some(),
                    "segment": found,
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }
            match found {
                Some(segment) => println!("{} [{}, +{:#x}) {} in {}", "[+]".green(), args.address, args.size, flags, segment),
                None => println!("{} [{}, +{:#x}) {} not contained", "[-]".red(), args.address, args.size, flags),
            }
            Ok(())
        })
    }

    fn report(&self, results: &[FinderResult]) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(results)?);
            return Ok(());
        }
        if results.is_empty() {
            println!("{}", "No match".yellow());
            return Ok(());
        }
        for result in results {
            println!("{} {}", "[+]".green(), result);
        }
        if !self.quiet && results.len() > 1 {
            println!("{}", format!("{} results", results.len()).cyan());
        }
        Ok(())
    }
}

impl Default for CommandHandler {
    fn default() -> Self {
        Self::new()
    }
}
