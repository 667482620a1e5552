//! Demo command.

use std::path::Path;

use tracing::{error, info};
use xtrc::demo::{demo_header, write_demo};
use xtrc::{Endianness, RecordCompat, TraceWriter, WriterOptions};

use crate::cli::{EXIT_FAILURE, EXIT_SUCCESS};
use crate::terminal;

/// Handle the `demo` command.
pub fn cmd_demo(
    output: &Path,
    endianness: Endianness,
    compat: RecordCompat,
    silent: bool,
) -> i32 {
    let header = demo_header(endianness);
    let options = WriterOptions::new().with_compat(compat);

    let result = TraceWriter::create_with_options(output, &header, options).and_then(
        |mut writer| {
            write_demo(&mut writer)?;
            let stats = writer.stats();
            writer.close()?;
            Ok(stats)
        },
    );

    match result {
        Ok(stats) => {
            info!(
                path = %output.display(),
                records = stats.records,
                bytes = stats.bytes,
                "demo trace written"
            );
            if !silent {
                terminal::success(&format!("Wrote {}", output.display()));
            }
            EXIT_SUCCESS
        }
        Err(e) => {
            error!(error = %e, path = %output.display(), "failed to write demo trace");
            terminal::error(&format!("Failed to write {}: {e}", output.display()));
            EXIT_FAILURE
        }
    }
}
