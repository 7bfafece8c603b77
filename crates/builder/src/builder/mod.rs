//! Kernel-mode C++ runtime builder for Project Azalea.
//!
//! Structure:
//! - `config` - saved paths (`config/saved_config.ini`)
//! - `paths` - CLI / saved / prompted path resolution
//! - `components/` - per-library flags (libc++abi, libunwind, libc++)
//! - `pipeline` - stage state machine
//! - `kernel` - scons re-link after libc++abi
//! - `headers` - include tree copy for libunwind
//! - `runner` - external tool invocation
//! - `workdir` - scoped working directory

pub mod components;
pub mod config;
pub mod error;
pub mod headers;
pub mod kernel;
pub mod paths;
pub mod pipeline;
pub mod runner;
pub mod workdir;

use anyhow::{Context, Result};
use config::SavedConfig;
use paths::{PathId, Prompt, ResolvedPaths};
use pipeline::BuildSettings;
use runner::Runner;
use std::collections::HashMap;
use std::path::PathBuf;

/// Everything one run needs from the command line.
pub struct Options {
    pub config_file: PathBuf,
    /// Paths given on the command line; these beat anything saved.
    pub overrides: HashMap<PathId, String>,
    pub settings: BuildSettings,
}

/// Resolve paths, build everything, then save the config.
///
/// The config is only written once the whole pipeline has succeeded.
pub fn run(options: &Options, prompt: &mut dyn Prompt, runner: &mut dyn Runner) -> Result<()> {
    let mut config = SavedConfig::load(&options.config_file)?;
    paths::resolve(&mut config, &options.overrides, &PathId::REQUIRED, prompt)?;

    let base = std::env::current_dir().context("Failed to get current directory")?;
    let resolved = ResolvedPaths::from_config(&config, &base)?;
    let settings = options.settings.absolute(&base);

    pipeline::run_all(&resolved, &settings, runner)?;

    config.save(&options.config_file)?;

    println!("\n=== Build complete ===");
    Ok(())
}
