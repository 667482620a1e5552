//! Command implementations.

mod demo;
mod dump;

use crate::cli::{Cli, Commands};

/// Dispatch CLI command to the appropriate handler.
pub fn run_command(cli: &Cli) -> i32 {
    match &cli.command {
        Commands::Demo {
            output,
            endianness,
            compat,
        } => demo::cmd_demo(output, (*endianness).into(), (*compat).into(), cli.silent),
        Commands::Dump {
            input,
            summary,
            limit,
        } => dump::cmd_dump(input, *summary, *limit),
    }
}
