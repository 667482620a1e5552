//! Styled terminal output helpers.

use console::{StyledObject, style};
use xtrc::RecordTag;

/// Print an info message to stderr.
pub fn info(message: &str) {
    eprintln!("{} {message}", style("→").cyan());
}

/// Print a success message to stderr.
pub fn success(message: &str) {
    eprintln!("{} {message}", style("✓").green().bold());
}

/// Print an error message to stderr.
pub fn error(message: &str) {
    eprintln!("{} {message}", style("✗").red().bold());
}

/// Record tag, colored by record family.
pub fn tag(tag: RecordTag) -> StyledObject<&'static str> {
    let styled = style(tag.as_str()).bold();
    match tag {
        RecordTag::Step => styled.cyan(),
        RecordTag::Map | RecordTag::Unmap => styled.magenta(),
        RecordTag::MemWrite => styled.yellow(),
        RecordTag::MemRead => styled.green(),
    }
}

/// Dimmed secondary text.
pub fn dim<D>(value: D) -> StyledObject<D> {
    style(value).dim()
}
