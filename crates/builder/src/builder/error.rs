//! Error taxonomy for the builder.
//!
//! Most plumbing goes through `anyhow`; these are the failures callers need
//! to tell apart (an interrupt is a clean exit, everything else aborts).

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

#[derive(Debug)]
pub enum BuildError {
    /// The saved configuration exists but could not be read or parsed.
    ConfigRead { path: PathBuf, reason: String },
    /// The saved configuration could not be written back.
    ConfigWrite { path: PathBuf, source: io::Error },
    /// An external build tool exited unsuccessfully.
    ToolFailed { program: String, status: ExitStatus },
    /// An external build tool could not be started at all.
    ToolMissing { program: String, source: io::Error },
    /// The operator aborted an interactive prompt.
    Interrupted,
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigRead { path, reason } => {
                write!(f, "failed to read config {}: {reason}", path.display())
            }
            Self::ConfigWrite { path, source } => {
                write!(f, "failed to write config {}: {source}", path.display())
            }
            Self::ToolFailed { program, status } => write!(f, "{program} failed ({status})"),
            Self::ToolMissing { program, source } => {
                write!(f, "failed to run {program}: {source}")
            }
            Self::Interrupted => write!(f, "build interrupted"),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ConfigWrite { source, .. } | Self::ToolMissing { source, .. } => Some(source),
            Self::ConfigRead { .. } | Self::ToolFailed { .. } | Self::Interrupted => None,
        }
    }
}

/// True if `err` (or anything in its chain) is an operator interrupt.
pub fn is_interrupt(err: &anyhow::Error) -> bool {
    err.chain()
        .any(|e| matches!(e.downcast_ref::<BuildError>(), Some(BuildError::Interrupted)))
}
