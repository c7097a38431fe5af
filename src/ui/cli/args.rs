// Fri Oct 16 2026 - Alex

use crate::finders::PrologueMode;
use crate::memory::Address;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "elf-code-finder")]
#[command(author = "Alex")]
#[command(version = "1.0.0")]
#[command(about = "x86-64 code landmark finder for ELF images", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true, default_value = "warn")]
    pub log_level: String,

    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[arg(long, global = true)]
    pub no_color: bool,

    #[arg(long, global = true)]
    pub json: bool,

    /// JSON scan configuration
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode instructions from an address
    Decode(DecodeArgs),
    /// Find direct call sites
    Call(CallArgs),
    /// Find a lea with a given displacement
    Lea(LeaArgs),
    /// Find the first function prologue
    Prologue(PrologueArgs),
    /// List PT_LOAD segments
    Segments(ImageArgs),
    /// Check that a range lies inside one segment
    Contains(ContainsArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ImageArgs {
    pub binary: PathBuf,

    /// Section to scan, overriding the configured one
    #[arg(short, long)]
    pub section: Option<String>,

    /// Runtime address of the lowest PT_LOAD page
    #[arg(long, value_parser = parse_address)]
    pub base: Option<Address>,
}

#[derive(ClapArgs, Debug)]
pub struct DecodeArgs {
    #[command(flatten)]
    pub image: ImageArgs,

    #[arg(short, long, value_parser = parse_address)]
    pub address: Option<Address>,

    #[arg(short = 'n', long)]
    pub count: Option<usize>,
}

#[derive(ClapArgs, Debug)]
pub struct CallArgs {
    #[command(flatten)]
    pub image: ImageArgs,

    /// Required call destination; any call matches when omitted
    #[arg(short, long, value_parser = parse_address)]
    pub target: Option<Address>,

    #[arg(long, value_parser = parse_address)]
    pub from: Option<Address>,

    /// Report every matching call instead of the first
    #[arg(long)]
    pub all: bool,
}

#[derive(ClapArgs, Debug)]
pub struct LeaArgs {
    #[command(flatten)]
    pub image: ImageArgs,

    #[arg(short, long, value_parser = parse_displacement, allow_hyphen_values = true)]
    pub displacement: i64,

    #[arg(long, value_parser = parse_address)]
    pub from: Option<Address>,
}

#[derive(ClapArgs, Debug)]
pub struct PrologueArgs {
    #[command(flatten)]
    pub image: ImageArgs,

    #[arg(short, long)]
    pub mode: Option<PrologueMode>,

    #[arg(long, value_parser = parse_address)]
    pub from: Option<Address>,

    #[arg(long)]
    pub alignment: Option<u64>,
}

#[derive(ClapArgs, Debug)]
pub struct ContainsArgs {
    #[command(flatten)]
    pub image: ImageArgs,

    #[arg(short, long, value_parser = parse_address)]
    pub address: Address,

    #[arg(long)]
    pub size: u64,

    /// Required protection, e.g. "r-x"
    #[arg(short, long)]
    pub flags: Option<String>,

    #[arg(long)]
    pub step: Option<usize>,
}

pub fn parse_address(s: &str) -> Result<Address, String> {
    Address::parse(s).ok_or_else(|| format!("invalid address: {}", s))
}

/// Signed hex or decimal, e.g. `-0x10`.
pub fn parse_displacement(s: &str) -> Result<i64, String> {
    let (negative, magnitude) = match s.trim().strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.trim()),
    };
    let value = Address::parse(magnitude)
        .map(|a| a.as_u64())
        .ok_or_else(|| format!("invalid displacement: {}", s))?;
    if negative {
        if value > i64::MAX as u64 + 1 {
            return Err(format!("displacement out of range: {}", s));
        }
        Ok((value as i64).wrapping_neg())
    } else {
        i64::try_from(value).map_err(|_| format!("displacement out of range: {}", s))
    }
}
