//! The three runtime libraries we build, and the flags each one gets.
//!
//! A [`Library`] only describes a build; [`crate::builder::pipeline`] runs it.
//! Flags are recomputed from the resolved paths every time, nothing is
//! carried from one stage to the next.

pub mod libcxx;
pub mod libcxxabi;
pub mod libunwind;

use crate::builder::paths::{PathId, ResolvedPaths};
use std::path::{Path, PathBuf};

pub const C_COMPILER: &str = "/usr/bin/clang";
pub const CXX_COMPILER: &str = "/usr/bin/clang++";

/// A library built by one pipeline stage.
pub trait Library {
    /// Directory-friendly name, e.g. `libcxxabi`.
    fn name(&self) -> &'static str;

    /// Name for banners, e.g. `libc++abi`.
    fn title(&self) -> &'static str;

    /// Source tree handed to cmake.
    fn source_dir(&self, paths: &ResolvedPaths) -> PathBuf;

    /// Library-specific `-D` options, as (name, value).
    fn cmake_options(&self, paths: &ResolvedPaths) -> Vec<(&'static str, String)>;

    /// Extra `-isystem` directories for C++ sources.
    fn cxx_includes(&self, _paths: &ResolvedPaths) -> Vec<PathBuf> {
        Vec::new()
    }

    /// Header tree the install step misses, copied to `<prefix>/include`.
    fn header_source(&self, _paths: &ResolvedPaths) -> Option<PathBuf> {
        None
    }
}

/// Where `name` is installed inside the system image.
pub fn install_prefix(paths: &ResolvedPaths, name: &str) -> PathBuf {
    paths
        .get(PathId::SysImageRoot)
        .join("apps")
        .join("developer")
        .join(format!("{name}-kernel"))
}

pub fn on_off(enabled: bool) -> String {
    String::from(if enabled { "ON" } else { "OFF" })
}

fn path_arg(path: &Path) -> String {
    path.display().to_string()
}

fn isystem(dirs: &[PathBuf]) -> Vec<String> {
    dirs.iter()
        .map(|d| format!("-isystem {}", d.display()))
        .collect()
}

/// Everything the external tools see for one stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageFlags {
    pub prefix: PathBuf,
    pub cmake_args: Vec<String>,
    /// Always `CFLAGS`, `CXXFLAGS` and `LDFLAGS`, in that order.
    pub env: Vec<(String, String)>,
}

impl StageFlags {
    pub fn compute(lib: &dyn Library, paths: &ResolvedPaths, threading_adapter: &Path) -> Self {
        let prefix = install_prefix(paths, lib.name());
        let kernel_headers = paths.get(PathId::KernelBase).join("kernel");

        let mut cxx_dirs = vec![threading_adapter.join("cxx_include"), kernel_headers.clone()];
        cxx_dirs.extend(lib.cxx_includes(paths));

        let mut cxxflags = vec![
            "-fno-threadsafe-statics".to_string(),
            "-ffreestanding".to_string(),
        ];
        cxxflags.extend(isystem(&cxx_dirs));

        let mut cflags = vec!["-ffreestanding".to_string()];
        cflags.extend(isystem(&[kernel_headers]));

        let env = vec![
            ("CFLAGS".to_string(), cflags.join(" ")),
            ("CXXFLAGS".to_string(), cxxflags.join(" ")),
            ("LDFLAGS".to_string(), "-nostdlib".to_string()),
        ];

        let mut options = vec![
            ("CMAKE_C_COMPILER", C_COMPILER.to_string()),
            ("CMAKE_CXX_COMPILER", CXX_COMPILER.to_string()),
            ("CMAKE_INSTALL_PREFIX", path_arg(&prefix)),
            ("CMAKE_POSITION_INDEPENDENT_CODE", on_off(false)),
            ("LLVM_PATH", path_arg(paths.get(PathId::LlvmBase))),
        ];
        options.extend(lib.cmake_options(paths));

        let mut cmake_args = vec![path_arg(&lib.source_dir(paths))];
        cmake_args.extend(options.into_iter().map(|(k, v)| format!("-D{k}={v}")));

        Self {
            prefix,
            cmake_args,
            env,
        }
    }
}
