//! libunwind.
//!
//! Its `make install` doesn't install the public headers, so the pipeline
//! copies `include/` into the prefix afterwards.

use super::{on_off, Library};
use crate::builder::paths::{PathId, ResolvedPaths};
use std::path::PathBuf;

pub struct Libunwind;

impl Library for Libunwind {
    fn name(&self) -> &'static str {
        "libunwind"
    }

    fn title(&self) -> &'static str {
        "libunwind"
    }

    fn source_dir(&self, paths: &ResolvedPaths) -> PathBuf {
        paths.get(PathId::LibunwindBase).to_path_buf()
    }

    fn cmake_options(&self, _paths: &ResolvedPaths) -> Vec<(&'static str, String)> {
        vec![
            ("LIBUNWIND_ENABLE_SHARED", on_off(false)),
            ("LIBUNWIND_ENABLE_STATIC", on_off(true)),
            ("LIBUNWIND_ENABLE_THREADS", on_off(false)),
            ("LIBUNWIND_IS_BAREMETAL", on_off(true)),
            ("LIBUNWIND_ENABLE_CROSS_UNWINDING", on_off(false)),
        ]
    }

    fn header_source(&self, paths: &ResolvedPaths) -> Option<PathBuf> {
        Some(paths.get(PathId::LibunwindBase).join("include"))
    }
}
