//! Options for the compressor and the command line that fills them in.
//!
//! The library takes a `BzOpts` and clamps anything out of range. The binary goes through `Args`, which
//! rejects out of range values instead so the user hears about them.
use clap::Parser;
use log::LevelFilter;

use crate::error::{BzError, Result};

pub const DEFAULT_WORK_FACTOR: u32 = 50;
pub const DEFAULT_ITERATIONS: usize = 4;
const MAX_WORK_FACTOR: u32 = 250;
const MAX_ITERATIONS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BzOpts {
    /// Block size level 1-9, in units of 100k
    pub block_size: u8,
    /// Comparisons allowed per block byte before a block is randomised
    pub work_factor: u32,
    /// Huffman table refinement passes
    pub iterations: usize,
    /// Write the "BZ" container magic before the stream header
    pub prepend_magic: bool,
}

impl BzOpts {
    pub fn new() -> Self {
        Self {
            block_size: 9,
            work_factor: DEFAULT_WORK_FACTOR,
            iterations: DEFAULT_ITERATIONS,
            prepend_magic: false,
        }
    }

    /// Block size level forced into 1-9.
    pub fn level(&self) -> u8 {
        self.block_size.clamp(1, 9)
    }

    /// Work factor forced into 1-250.
    pub fn work_factor(&self) -> u32 {
        self.work_factor.clamp(1, MAX_WORK_FACTOR)
    }

    /// Refinement passes forced into 1-10.
    pub fn iterations(&self) -> usize {
        self.iterations.clamp(1, MAX_ITERATIONS)
    }

    /// Reject any option the clamping accessors would have to change.
    pub fn validate(&self) -> Result<()> {
        if !(1..=9).contains(&self.block_size) {
            return Err(BzError::InvalidLevel(self.block_size));
        }
        if !(1..=MAX_WORK_FACTOR).contains(&self.work_factor) {
            return Err(BzError::InvalidWorkFactor(self.work_factor));
        }
        if !(1..=MAX_ITERATIONS).contains(&self.iterations) {
            return Err(BzError::InvalidIterations(self.iterations));
        }
        Ok(())
    }
}

impl Default for BzOpts {
    fn default() -> Self {
        Self::new()
    }
}

/// Command Line Interpretation - uses external CLAP crate.
#[derive(Parser, Debug)]
#[clap(
    version,
    about = "A block-sorting bzip2 stream compressor",
    long_about = None)]
pub struct Args {
    /// File to compress. Standard input is used when absent
    #[clap()]
    pub filename: Option<String>,

    /// Write the compressed stream here instead of standard output
    #[clap(short = 'o', long = "output")]
    pub output: Option<String>,

    /// 1..9 - Set the block size from 100-900k
    #[clap(short = 'b', long = "block-size", default_value_t = 9)]
    pub block_size: u8,

    /// -1 .. -9 pick the block size directly, as in bzip2
    #[clap(short = '1')]
    pub level_1: bool,

    #[clap(short = '2', hide = true)]
    pub level_2: bool,

    #[clap(short = '3', hide = true)]
    pub level_3: bool,

    #[clap(short = '4', hide = true)]
    pub level_4: bool,

    #[clap(short = '5', hide = true)]
    pub level_5: bool,

    #[clap(short = '6', hide = true)]
    pub level_6: bool,

    #[clap(short = '7', hide = true)]
    pub level_7: bool,

    #[clap(short = '8', hide = true)]
    pub level_8: bool,

    #[clap(short = '9', hide = true)]
    pub level_9: bool,

    /// Alias for 100k block mode
    #[clap(long = "fast")]
    pub fast: bool,

    /// Alias for 900k block mode
    #[clap(long = "best")]
    pub best: bool,

    /// How hard to try sorting repetitive blocks before randomising them (1-250)
    #[clap(long = "workfactor", default_value_t = DEFAULT_WORK_FACTOR)]
    pub workfactor: u32,

    /// Huffman table refinement passes (1-10)
    #[clap(short = 'i', long = "iterations", default_value_t = DEFAULT_ITERATIONS)]
    pub iterations: usize,

    /// Sets verbosity. -v shows progress, -vvv is chatty
    #[clap(short = 'v', parse(from_occurrences))]
    pub v: u64,
}

impl Args {
    /// Copy the command line into our internal structure, refusing bad values.
    pub fn to_opts(&self) -> Result<BzOpts> {
        let digits = [
            self.level_1,
            self.level_2,
            self.level_3,
            self.level_4,
            self.level_5,
            self.level_6,
            self.level_7,
            self.level_8,
            self.level_9,
        ];
        let block_size = if self.fast {
            1
        } else if self.best {
            9
        } else if let Some(i) = digits.iter().rposition(|&set| set) {
            i as u8 + 1
        } else {
            self.block_size
        };
        let opts = BzOpts {
            block_size,
            work_factor: self.workfactor,
            iterations: self.iterations,
            prepend_magic: true,
        };
        opts.validate()?;
        Ok(opts)
    }

    /// Log level from the -v count. Warnings are always shown.
    pub fn log_level(&self) -> LevelFilter {
        match self.v {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}
