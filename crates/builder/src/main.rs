//! # Azalea libc++ builder
//!
//! Builds kernel-mode libc++abi, libunwind and libc++ for Project Azalea and
//! installs them into the system image.
//!
//! ## Usage
//!
//! ```bash
//! libcxx-builder                                  # prompts for anything not saved
//! libcxx-builder --kernel_base ../azalea -j 8     # fix one saved path, 8 make jobs
//! ```
//!
//! Paths are remembered in `config/saved_config.ini` after a successful run.

use anyhow::{Context, Result};
use clap::Parser;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::path::PathBuf;

mod builder;

use builder::config::DEFAULT_CONFIG_FILE;
use builder::paths::{PathId, StdinPrompt};
use builder::pipeline::{self, BuildSettings};
use builder::runner::SystemRunner;

#[derive(Parser)]
#[command(name = "libcxx-builder", about = "Project Azalea kernel libc++ builder")]
struct Cli {
    /// Location of the base of the Azalea kernel source code tree
    #[arg(long = "kernel_base")]
    kernel_base: Option<String>,

    /// Location of LLVM Libc++ source code tree
    #[arg(long = "libcxx_base")]
    libcxx_base: Option<String>,

    /// Location of LLVM Libc++abi source code tree
    #[arg(long = "libcxxabi_base")]
    libcxxabi_base: Option<String>,

    /// Location of LLVM libunwind source code tree
    #[arg(long = "libunwind_base")]
    libunwind_base: Option<String>,

    /// Location of the LLVM source code tree
    #[arg(long = "llvm_base")]
    llvm_base: Option<String>,

    /// Root of the Azalea system image's filesystem
    #[arg(long = "sys_image_root")]
    sys_image_root: Option<String>,

    /// Config file location
    #[arg(long = "config_file", default_value = DEFAULT_CONFIG_FILE)]
    config_file: PathBuf,

    /// Where each library's build directory is created
    #[arg(long = "output_dir", default_value = "output")]
    output_dir: PathBuf,

    /// Threading adapter directory (its cxx_include/ goes on the include path)
    #[arg(long = "threading_adapter", default_value = "threading_adapter")]
    threading_adapter: PathBuf,

    /// Parallel make jobs (defaults to the number of CPUs)
    #[arg(short, long)]
    jobs: Option<NonZeroUsize>,

    /// Request verbosity from tools we shell out to.
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_options(self) -> builder::Options {
        let overrides: HashMap<PathId, String> = [
            (PathId::KernelBase, self.kernel_base),
            (PathId::LibcxxBase, self.libcxx_base),
            (PathId::LibcxxabiBase, self.libcxxabi_base),
            (PathId::LibunwindBase, self.libunwind_base),
            (PathId::LlvmBase, self.llvm_base),
            (PathId::SysImageRoot, self.sys_image_root),
        ]
        .into_iter()
        .filter_map(|(id, value)| value.map(|v| (id, v)))
        .collect();

        builder::Options {
            config_file: self.config_file,
            overrides,
            settings: BuildSettings {
                output_dir: self.output_dir,
                threading_adapter: self.threading_adapter,
                jobs: self.jobs.map_or_else(pipeline::default_jobs, NonZeroUsize::get),
                verbose: self.verbose,
            },
        }
    }
}

fn main() -> Result<()> {
    let env = env_logger::Env::default().filter_or("RUST_LOG", "info");
    env_logger::init_from_env(env);

    // Exits straight from the handler so a half-resolved config is never saved.
    ctrlc::set_handler(|| {
        println!("Build interrupted");
        std::process::exit(0);
    })
    .context("Error setting Ctrl-C handler")?;

    let options = Cli::parse().into_options();

    match builder::run(&options, &mut StdinPrompt, &mut SystemRunner) {
        Err(e) if builder::error::is_interrupt(&e) => {
            println!("Build interrupted");
            Ok(())
        }
        result => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = Cli::try_parse_from(["libcxx-builder"]).unwrap().into_options();
        assert_eq!(opts.config_file, PathBuf::from("config/saved_config.ini"));
        assert_eq!(opts.settings.output_dir, PathBuf::from("output"));
        assert!(opts.overrides.is_empty());
        assert!(opts.settings.jobs >= 1);
    }

    #[test]
    fn test_underscore_path_flags() {
        let opts = Cli::try_parse_from([
            "libcxx-builder",
            "--kernel_base",
            "../azalea",
            "--sys_image_root",
            "/srv/image",
            "--config_file",
            "alt.ini",
            "-j",
            "3",
        ])
        .unwrap()
        .into_options();

        assert_eq!(opts.overrides.len(), 2);
        assert_eq!(opts.overrides[&PathId::KernelBase], "../azalea");
        assert_eq!(opts.overrides[&PathId::SysImageRoot], "/srv/image");
        assert_eq!(opts.config_file, PathBuf::from("alt.ini"));
        assert_eq!(opts.settings.jobs, 3);
    }

    #[test]
    fn test_zero_jobs_rejected() {
        assert!(Cli::try_parse_from(["libcxx-builder", "-j", "0"]).is_err());
        assert!(Cli::try_parse_from(["libcxx-builder", "--jobs", "0"]).is_err());
    }

    #[test]
    fn test_empty_override_is_passed_through() {
        // Resolution, not parsing, decides that an empty value doesn't count.
        let opts = Cli::try_parse_from(["libcxx-builder", "--llvm_base", ""])
            .unwrap()
            .into_options();
        assert_eq!(opts.overrides[&PathId::LlvmBase], "");
    }
}
