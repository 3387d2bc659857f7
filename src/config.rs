use std::convert::Infallible;
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::str::FromStr;

use log::LevelFilter;

use crate::error::{Error, Result};

/// Word width used for every evaluation of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitWidth {
    bits: u32,
    max_val: u64,
    mask: u64,
}

impl BitWidth {
    pub const DEFAULT_BITS: u32 = 1;
    pub const MAX_BITS: u32 = 32;

    pub fn new(bits: u32) -> Result<Self> {
        if !(1..=Self::MAX_BITS).contains(&bits) {
            return Err(Error::UnsupportedWidth(bits));
        }
        let max_val = 1u64 << bits;
        Ok(BitWidth {
            bits,
            max_val,
            mask: max_val - 1,
        })
    }

    #[inline]
    pub fn bits(self) -> u32 {
        self.bits
    }

    /// Number of distinct values a variable takes, `2^bits`.
    #[inline]
    pub fn max_val(self) -> u64 {
        self.max_val
    }

    #[inline]
    pub fn mask(self) -> u64 {
        self.mask
    }

    #[inline]
    pub fn apply(self, value: u64) -> u64 {
        value & self.mask
    }
}

impl Default for BitWidth {
    fn default() -> Self {
        let max_val = 1u64 << Self::DEFAULT_BITS;
        BitWidth {
            bits: Self::DEFAULT_BITS,
            max_val,
            mask: max_val - 1,
        }
    }
}

impl fmt::Display for BitWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits)
    }
}

/// Where the result sequence and digest are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputTarget {
    #[default]
    Stdout,
    File(PathBuf),
}

impl FromStr for OutputTarget {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "-" => OutputTarget::Stdout,
            path => OutputTarget::File(PathBuf::from(path)),
        })
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputTarget::Stdout => f.write_str("-"),
            OutputTarget::File(path) => write!(f, "{}", path.display()),
        }
    }
}

impl OutputTarget {
    pub fn open(&self) -> io::Result<Box<dyn Write>> {
        Ok(match self {
            OutputTarget::Stdout => Box::new(BufWriter::new(io::stdout().lock())),
            OutputTarget::File(path) => Box::new(BufWriter::new(File::create(path)?)),
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
    Trace,
}

impl Verbosity {
    /// `quiet` wins over any number of `-v`.
    pub fn from_flags(quiet: bool, verbose: u8) -> Self {
        match (quiet, verbose) {
            (true, _) => Verbosity::Quiet,
            (false, 0) => Verbosity::Normal,
            (false, 1) => Verbosity::Verbose,
            (false, _) => Verbosity::Trace,
        }
    }

    pub fn level_filter(self) -> LevelFilter {
        match self {
            Verbosity::Quiet => LevelFilter::Warn,
            Verbosity::Normal => LevelFilter::Info,
            Verbosity::Verbose => LevelFilter::Debug,
            Verbosity::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub width: BitWidth,
    pub output: OutputTarget,
    pub verbosity: Verbosity,
}

impl Config {
    pub fn new(bits: u32, output: OutputTarget, verbosity: Verbosity) -> Result<Self> {
        Ok(Config {
            width: BitWidth::new(bits)?,
            output,
            verbosity,
        })
    }
}
