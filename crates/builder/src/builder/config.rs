//! Saved builder configuration (`config/saved_config.ini`).
//!
//! A single `[PATHS]` section mapping path identifiers to the paths the user
//! gave us last time. Other sections in the file are carried through
//! untouched.
//!
//! Values are stored as written: no quote stripping and no backslash escapes,
//! so Windows-style paths from the old Python tool survive. Surrounding
//! whitespace is trimmed on load, as configparser does.

use super::error::BuildError;
use ini::{EscapePolicy, Ini, ParseOption};
use std::path::Path;
use tempfile::NamedTempFile;

pub const DEFAULT_CONFIG_FILE: &str = "config/saved_config.ini";

/// Section holding every path identifier.
pub const PATHS_SECTION: &str = "PATHS";

pub struct SavedConfig {
    ini: Ini,
}

impl SavedConfig {
    /// An empty configuration with no `[PATHS]` values.
    pub fn new() -> Self {
        Self { ini: Ini::new() }
    }

    /// Load from `path`, or start empty if the file doesn't exist yet.
    pub fn load(path: &Path) -> Result<Self, BuildError> {
        if !path.exists() {
            log::info!("No saved config at {}, starting empty", path.display());
            return Ok(Self::new());
        }

        let ini = Ini::load_from_file_opt(path, parse_options()).map_err(|e| BuildError::ConfigRead {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Self { ini })
    }

    /// Replace `path`, creating its parent directory if needed.
    ///
    /// The new contents go to a temporary file beside `path` which is then
    /// renamed over it, so an interrupted save leaves the old file intact.
    pub fn save(&self, path: &Path) -> Result<(), BuildError> {
        let write_err = |source| BuildError::ConfigWrite {
            path: path.to_path_buf(),
            source,
        };

        let parent = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                std::fs::create_dir_all(parent).map_err(write_err)?;
                parent
            }
            None => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(parent).map_err(write_err)?;
        self.ini
            .write_to_policy(&mut tmp, EscapePolicy::Nothing)
            .map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(path).map_err(|e| write_err(e.error))?;

        log::info!("Saved config to {}", path.display());
        for (key, value) in self.entries() {
            log::debug!("  {key} = {value}");
        }
        Ok(())
    }

    /// Stored value for `key`, treating an empty string as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.ini
            .section(Some(PATHS_SECTION))
            .and_then(|s| s.get(key))
            .filter(|v| !v.is_empty())
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.ini.with_section(Some(PATHS_SECTION)).set(key, value);
    }

    /// All `[PATHS]` entries in file order.
    pub fn entries(&self) -> Vec<(String, String)> {
        self.ini
            .section(Some(PATHS_SECTION))
            .map(|s| {
                s.iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn parse_options() -> ParseOption {
    ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        ..ParseOption::default()
    }
}

impl Default for SavedConfig {
    fn default() -> Self {
        Self::new()
    }
}
