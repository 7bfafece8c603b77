//! Source and install paths the build needs.
//!
//! Each path comes from, in order of preference: the command line, the saved
//! config, or an interactive prompt. Whatever wins is written back into the
//! config so the next run doesn't have to ask again.

use super::config::SavedConfig;
use super::error::BuildError;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// A path the build needs from the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PathId {
    KernelBase,
    LibcxxBase,
    LibcxxabiBase,
    LibunwindBase,
    LlvmBase,
    SysImageRoot,
}

impl PathId {
    /// Every path the pipeline needs, in the order we ask for them.
    pub const REQUIRED: [PathId; 6] = [
        PathId::KernelBase,
        PathId::LibcxxBase,
        PathId::LibcxxabiBase,
        PathId::LibunwindBase,
        PathId::LlvmBase,
        PathId::SysImageRoot,
    ];

    /// Key in the `[PATHS]` section and name of the CLI flag.
    pub fn key(self) -> &'static str {
        match self {
            PathId::KernelBase => "kernel_base",
            PathId::LibcxxBase => "libcxx_base",
            PathId::LibcxxabiBase => "libcxxabi_base",
            PathId::LibunwindBase => "libunwind_base",
            PathId::LlvmBase => "llvm_base",
            PathId::SysImageRoot => "sys_image_root",
        }
    }

    /// Human-readable name used when prompting.
    pub fn label(self) -> &'static str {
        match self {
            PathId::KernelBase => "Kernel source base directory",
            PathId::LibcxxBase => "LLVM Libc++ base directory",
            PathId::LibcxxabiBase => "LLVM Libc++abi base directory",
            PathId::LibunwindBase => "LLVM libunwind base directory",
            PathId::LlvmBase => "LLVM source base directory",
            PathId::SysImageRoot => "Azalea system image root directory",
        }
    }
}

/// Asks the operator for a value.
pub trait Prompt {
    fn ask(&mut self, label: &str) -> Result<String>;
}

/// Prompts on stdout and reads one line from stdin.
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn ask(&mut self, label: &str) -> Result<String> {
        let mut stdout = std::io::stdout();
        writeln!(stdout, "Enter the following: {label}")?;
        stdout.flush()?;

        let mut line = String::new();
        let read = std::io::stdin()
            .lock()
            .read_line(&mut line)
            .context("Failed to read from stdin")?;
        if read == 0 {
            return Err(BuildError::Interrupted.into());
        }

        Ok(trim_line_ending(&line).to_string())
    }
}

fn trim_line_ending(line: &str) -> &str {
    line.strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line)
}

/// Pick one value: a non-empty override, else a non-empty stored value,
/// else whatever `prompt` returns (taken verbatim).
///
/// A blank answer would be dropped when the config is reloaded, so the
/// prompt is repeated until it gets something.
pub fn resolve_value<F>(override_value: Option<&str>, stored: Option<&str>, mut prompt: F) -> Result<String>
where
    F: FnMut() -> Result<String>,
{
    if let Some(v) = override_value.filter(|v| !v.is_empty()) {
        return Ok(v.to_string());
    }
    if let Some(v) = stored.filter(|v| !v.is_empty()) {
        return Ok(v.to_string());
    }
    loop {
        let answer = prompt()?;
        if !answer.trim().is_empty() {
            return Ok(answer);
        }
        log::warn!("An empty path was entered, please enter a value");
    }
}

/// Fill in every `required` path in `config`, in order.
///
/// Only mutates `config`; the caller decides when to save it.
pub fn resolve(
    config: &mut SavedConfig,
    overrides: &HashMap<PathId, String>,
    required: &[PathId],
    prompt: &mut dyn Prompt,
) -> Result<()> {
    for &id in required {
        let value = resolve_value(
            overrides.get(&id).map(String::as_str),
            config.get(id.key()),
            || prompt.ask(id.label()),
        )
        .with_context(|| format!("Resolving {}", id.key()))?;

        log::debug!("{} = {value}", id.key());
        config.set(id.key(), &value);
    }
    Ok(())
}

/// Absolute forms of every required path, ready for the pipeline.
#[derive(Clone, Debug)]
pub struct ResolvedPaths {
    paths: HashMap<PathId, PathBuf>,
}

impl ResolvedPaths {
    /// Absolutize every required path from `config` against `base`.
    ///
    /// Fails if `resolve` hasn't filled in a value yet.
    pub fn from_config(config: &SavedConfig, base: &Path) -> Result<Self> {
        let mut paths = HashMap::new();
        for id in PathId::REQUIRED {
            let value = config
                .get(id.key())
                .with_context(|| format!("{} has not been resolved", id.key()))?;
            paths.insert(id, base.join(value));
        }
        Ok(Self { paths })
    }

    pub fn get(&self, id: PathId) -> &Path {
        // `from_config` is the only constructor and fills every id.
        &self.paths[&id]
    }
}
