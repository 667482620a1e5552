//! CLI definitions and argument types.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use xtrc::{Endianness, RecordCompat};

/// Exit code for success.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for failure.
pub const EXIT_FAILURE: i32 = 1;

#[derive(Parser)]
#[command(name = "xtrc")]
#[command(about = "Execution trace recorder - writes and inspects xtrc trace files")]
#[command(version)]
pub struct Cli {
    /// Show metrics summary after execution
    #[arg(long, global = true)]
    pub metrics: bool,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output (only show errors)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub silent: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write the demonstration trace of a tiny register VM
    Demo {
        /// Output trace file
        #[arg(short, long, default_value = "demo.trc")]
        output: PathBuf,

        /// Byte order of the simulated machine
        #[arg(long, value_enum, default_value = "little")]
        endianness: EndiannessArg,

        /// Encoding of map thread ids and unmap results
        #[arg(long, value_enum, default_value = "legacy")]
        compat: CompatArg,
    },
    /// Decode a trace file and print its events
    Dump {
        /// Input trace file
        #[arg(value_name = "TRACE")]
        input: PathBuf,

        /// Print per-record-type counts instead of every event
        #[arg(long)]
        summary: bool,

        /// Stop after this many events
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum EndiannessArg {
    Little,
    Big,
}

impl From<EndiannessArg> for Endianness {
    fn from(arg: EndiannessArg) -> Self {
        match arg {
            EndiannessArg::Little => Self::Little,
            EndiannessArg::Big => Self::Big,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CompatArg {
    /// Byte-compatible with existing viewers
    Legacy,
    /// Record map thread ids and unmap results as given
    Strict,
}

impl From<CompatArg> for RecordCompat {
    fn from(arg: CompatArg) -> Self {
        match arg {
            CompatArg::Legacy => Self::Legacy,
            CompatArg::Strict => Self::Strict,
        }
    }
}
