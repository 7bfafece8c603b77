//! libc++, built last against the installed libc++abi.

use super::{install_prefix, libcxxabi::Libcxxabi, on_off, Library};
use crate::builder::paths::{PathId, ResolvedPaths};
use std::path::PathBuf;

pub struct Libcxx;

impl Library for Libcxx {
    fn name(&self) -> &'static str {
        "libcxx"
    }

    fn title(&self) -> &'static str {
        "libc++"
    }

    fn source_dir(&self, paths: &ResolvedPaths) -> PathBuf {
        paths.get(PathId::LibcxxBase).to_path_buf()
    }

    fn cmake_options(&self, paths: &ResolvedPaths) -> Vec<(&'static str, String)> {
        let abi_prefix = install_prefix(paths, Libcxxabi.name());
        vec![
            ("LIBCXX_ENABLE_EXCEPTIONS", on_off(false)),
            ("LIBCXX_ENABLE_SHARED", on_off(false)),
            ("LIBCXX_ENABLE_STATIC", on_off(true)),
            ("LIBCXX_ENABLE_STDIN", on_off(false)),
            ("LIBCXX_ENABLE_STDOUT", on_off(false)),
            ("LIBCXX_HAS_EXTERNAL_THREAD_API", on_off(true)),
            ("LIBCXX_HAS_PTHREAD_API", on_off(false)),
            ("LIBCXX_CXX_ABI", "libcxxabi".to_string()),
            (
                "LIBCXX_CXX_ABI_INCLUDE_PATHS",
                paths
                    .get(PathId::LibcxxabiBase)
                    .join("include")
                    .display()
                    .to_string(),
            ),
            (
                "LIBCXX_CXX_ABI_LIBRARY_PATH",
                abi_prefix.join("lib").display().to_string(),
            ),
        ]
    }

    fn cxx_includes(&self, paths: &ResolvedPaths) -> Vec<PathBuf> {
        vec![paths.get(PathId::LibcxxBase).join("src")]
    }
}
