//! libc++abi, built first so the kernel and libc++ can link against it.

use super::{on_off, Library};
use crate::builder::paths::{PathId, ResolvedPaths};
use std::path::PathBuf;

pub struct Libcxxabi;

impl Library for Libcxxabi {
    fn name(&self) -> &'static str {
        "libcxxabi"
    }

    fn title(&self) -> &'static str {
        "libc++abi"
    }

    fn source_dir(&self, paths: &ResolvedPaths) -> PathBuf {
        paths.get(PathId::LibcxxabiBase).to_path_buf()
    }

    fn cmake_options(&self, paths: &ResolvedPaths) -> Vec<(&'static str, String)> {
        let libcxx = paths.get(PathId::LibcxxBase);
        vec![
            ("LIBCXXABI_ENABLE_EXCEPTIONS", on_off(false)),
            ("LIBCXXABI_ENABLE_SHARED", on_off(false)),
            ("LIBCXXABI_ENABLE_STATIC", on_off(true)),
            ("LIBCXXABI_ENABLE_PIC", on_off(false)),
            ("LIBCXXABI_HAS_EXTERNAL_THREAD_API", on_off(true)),
            ("LIBCXXABI_HAS_PTHREAD_API", on_off(false)),
            ("LIBCXXABI_BAREMETAL", on_off(true)),
            // libunwind isn't built yet at this point.
            ("LIBCXXABI_USE_LLVM_UNWINDER", on_off(false)),
            ("LIBCXXABI_LIBCXX_PATH", libcxx.display().to_string()),
            (
                "LIBCXXABI_LIBCXX_INCLUDES",
                libcxx.join("include").display().to_string(),
            ),
        ]
    }

    fn cxx_includes(&self, paths: &ResolvedPaths) -> Vec<PathBuf> {
        vec![paths.get(PathId::LibcxxBase).join("src")]
    }
}
