//! Scoped working directory changes.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Changes the process working directory and puts it back on drop,
/// including when the scope is left through `?`.
pub struct DirGuard {
    previous: PathBuf,
}

impl DirGuard {
    pub fn enter(dir: &Path) -> Result<Self> {
        let previous = std::env::current_dir().context("Failed to get current directory")?;
        std::env::set_current_dir(dir)
            .with_context(|| format!("Failed to enter {}", dir.display()))?;
        log::debug!("Entered {}", dir.display());
        Ok(Self { previous })
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        if let Err(e) = std::env::set_current_dir(&self.previous) {
            log::error!("Failed to return to {}: {e}", self.previous.display());
        }
    }
}
