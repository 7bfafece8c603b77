//! Kernel re-link.
//!
//! The kernel links against the freshly installed libc++abi, so it has to be
//! rebuilt and reinstalled before the rest of the pipeline continues.

use crate::builder::paths::{PathId, ResolvedPaths};
use crate::builder::runner::{Invocation, Runner};
use anyhow::{Context, Result};

/// Rebuild and reinstall the kernel with scons.
pub fn relink(paths: &ResolvedPaths, runner: &mut dyn Runner) -> Result<()> {
    println!("=== Re-linking kernel ===");

    let params = [
        format!("sys_image_root={}", paths.get(PathId::SysImageRoot).display()),
        format!("kernel_base={}", paths.get(PathId::KernelBase).display()),
    ];

    runner
        .run(&Invocation::new("scons").args(params.clone()))
        .context("Kernel build failed")?;
    runner
        .run(&Invocation::new("scons").arg("install").args(params))
        .context("Kernel install failed")?;

    Ok(())
}
