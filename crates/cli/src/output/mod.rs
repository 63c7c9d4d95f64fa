//! Output configuration and formatting

mod formatter;

pub use formatter::Formatter;

/// Global output configuration derived from CLI flags
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// Emit strict JSON instead of human-readable output
    pub json: bool,
    /// Suppress non-error output
    pub quiet: bool,
    /// Disable colored output
    pub no_color: bool,
}
