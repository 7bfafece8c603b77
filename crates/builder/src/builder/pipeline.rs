//! The build pipeline: libc++abi, kernel re-link, libunwind, libc++.
//!
//! Each stage goes PREPARE -> CONFIGURE -> COMPILE -> INSTALL, plus
//! COPY_HEADERS for libraries that need it. The first failure stops the
//! whole pipeline; there is no resuming a partial run.

use crate::builder::components::{
    libcxx::Libcxx, libcxxabi::Libcxxabi, libunwind::Libunwind, Library, StageFlags,
};
use crate::builder::headers;
use crate::builder::kernel;
use crate::builder::paths::ResolvedPaths;
use crate::builder::runner::{Invocation, Runner};
use crate::builder::workdir::DirGuard;
use anyhow::{Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Abi,
    Unwinder,
    Runtime,
}

impl Stage {
    /// libc++ needs libc++abi's installed headers and library, so the ABI
    /// goes first.
    pub const ORDER: [Stage; 3] = [Stage::Abi, Stage::Unwinder, Stage::Runtime];

    pub fn library(self) -> &'static dyn Library {
        match self {
            Stage::Abi => &Libcxxabi,
            Stage::Unwinder => &Libunwind,
            Stage::Runtime => &Libcxx,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Abi => "ABI",
            Stage::Unwinder => "UNWINDER",
            Stage::Runtime => "RUNTIME",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Prepare,
    Configure,
    Compile,
    Install,
    CopyHeaders,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Step::Prepare => "PREPARE",
            Step::Configure => "CONFIGURE",
            Step::Compile => "COMPILE",
            Step::Install => "INSTALL",
            Step::CopyHeaders => "COPY_HEADERS",
        })
    }
}

/// Knobs that aren't paths from the saved config.
#[derive(Clone, Debug)]
pub struct BuildSettings {
    /// Parent of each stage's build directory.
    pub output_dir: PathBuf,
    /// Root of the threading adapter; `cxx_include/` under it is put on the
    /// include path.
    pub threading_adapter: PathBuf,
    pub jobs: usize,
    /// Ask make to echo the commands it runs.
    pub verbose: bool,
}

impl BuildSettings {
    /// Relative directories resolved against `base`. Stages change the
    /// working directory, so everything must be absolute before they run.
    #[must_use]
    pub fn absolute(&self, base: &Path) -> Self {
        Self {
            output_dir: base.join(&self.output_dir),
            threading_adapter: base.join(&self.threading_adapter),
            ..self.clone()
        }
    }

    pub fn work_dir(&self, lib: &dyn Library) -> PathBuf {
        self.output_dir.join(format!("{}-kernel", lib.name()))
    }
}

pub fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(std::num::NonZero::get)
        .unwrap_or(1)
}

/// Run every stage in order, re-linking the kernel after the ABI.
pub fn run_all(
    paths: &ResolvedPaths,
    settings: &BuildSettings,
    runner: &mut dyn Runner,
) -> Result<()> {
    for stage in Stage::ORDER {
        run_stage(stage, paths, settings, runner)?;

        if stage == Stage::Abi {
            kernel::relink(paths, runner)?;
        }
    }
    Ok(())
}

/// Configure, build and install one library.
///
/// The working directory is the stage's build directory for the configure,
/// compile and install steps and is restored however the stage ends.
pub fn run_stage(
    stage: Stage,
    paths: &ResolvedPaths,
    settings: &BuildSettings,
    runner: &mut dyn Runner,
) -> Result<()> {
    let lib = stage.library();
    println!("=== Building {} ===", lib.title());

    let work_dir = settings.work_dir(lib);
    log::info!("{stage}: {}", Step::Prepare);
    std::fs::create_dir_all(&work_dir)
        .with_context(|| format!("Creating {}", work_dir.display()))?;

    let flags = StageFlags::compute(lib, paths, &settings.threading_adapter);
    {
        let _cwd = DirGuard::enter(&work_dir)?;

        log::info!("{stage}: {}", Step::Configure);
        runner
            .run(
                &Invocation::new("cmake")
                    .args(flags.cmake_args.iter().cloned())
                    .envs(&flags.env),
            )
            .with_context(|| format!("{stage} {} failed", Step::Configure))?;

        log::info!("{stage}: {}", Step::Compile);
        let jobs = ["-j".to_string(), settings.jobs.to_string()];
        runner
            .run(&make(settings, &jobs).envs(&flags.env))
            .with_context(|| format!("{stage} {} failed", Step::Compile))?;

        log::info!("{stage}: {}", Step::Install);
        runner
            .run(&make(settings, &["install".to_string()]).envs(&flags.env))
            .with_context(|| format!("{stage} {} failed", Step::Install))?;
    }

    if let Some(include) = lib.header_source(paths) {
        log::info!("{stage}: {}", Step::CopyHeaders);
        headers::copy_tree(&include, &flags.prefix.join("include"))
            .with_context(|| format!("{stage} {} failed", Step::CopyHeaders))?;
    }

    println!("  Installed: {}", flags.prefix.display());
    Ok(())
}

fn make(settings: &BuildSettings, args: &[String]) -> Invocation {
    let inv = Invocation::new("make").args(args.iter().cloned());
    if settings.verbose {
        inv.arg("VERBOSE=1")
    } else {
        inv
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::config::SavedConfig;
    use crate::builder::paths::PathId;
    use crate::builder::runner::tests::RecordingRunner;
    use crate::builder::workdir::tests::lock_cwd;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::TempDir;

    struct Fixture {
        tmp: TempDir,
        paths: ResolvedPaths,
        settings: BuildSettings,
    }

    impl Fixture {
        fn new() -> Self {
            let tmp = TempDir::new().unwrap();
            let root = tmp.path();

            let mut config = SavedConfig::new();
            for id in PathId::REQUIRED {
                config.set(id.key(), &root.join(id.key()).display().to_string());
            }
            let include = root.join("libunwind_base/include");
            std::fs::create_dir_all(&include).unwrap();
            std::fs::write(include.join("libunwind.h"), "// libunwind\n").unwrap();

            let paths = ResolvedPaths::from_config(&config, root).unwrap();
            let settings = BuildSettings {
                output_dir: root.join("output"),
                threading_adapter: root.join("threading_adapter"),
                jobs: 4,
                verbose: false,
            };
            Self { tmp, paths, settings }
        }

        fn prefix(&self, name: &str) -> PathBuf {
            self.tmp
                .path()
                .join("sys_image_root/apps/developer")
                .join(format!("{name}-kernel"))
        }
    }

    #[test]
    fn test_stage_steps_in_order() {
        let _lock = lock_cwd();
        let fx = Fixture::new();
        let mut runner = RecordingRunner::default();

        run_stage(Stage::Abi, &fx.paths, &fx.settings, &mut runner).unwrap();

        let programs: Vec<_> = runner
            .calls
            .iter()
            .map(|c| format!("{} {}", c.program, c.args.first().cloned().unwrap_or_default()))
            .collect();
        assert_eq!(
            programs,
            [
                format!("cmake {}", fx.tmp.path().join("libcxxabi_base").display()),
                "make -j".to_string(),
                "make install".to_string(),
            ]
        );
        assert!(fx.settings.work_dir(&Libcxxabi).is_dir());
    }

    #[test]
    fn test_tools_run_inside_work_dir() {
        let _lock = lock_cwd();
        let fx = Fixture::new();
        let before = std::env::current_dir().unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let mut runner = RecordingRunner::default();
        let sink = Rc::clone(&seen);
        runner.on_call = Some(Box::new(move |_: &Invocation| {
            sink.borrow_mut().push(std::env::current_dir().unwrap());
        }));

        run_stage(Stage::Runtime, &fx.paths, &fx.settings, &mut runner).unwrap();

        let expected = fx.settings.work_dir(&Libcxx).canonicalize().unwrap();
        assert_eq!(seen.borrow().len(), 3);
        assert!(seen.borrow().iter().all(|d| *d == expected));
        assert_eq!(std::env::current_dir().unwrap(), before);
    }

    #[test]
    fn test_failed_stage_restores_cwd() {
        let _lock = lock_cwd();
        let fx = Fixture::new();
        let before = std::env::current_dir().unwrap();
        let mut runner = RecordingRunner::failing_on("make", &["-j", "4"]);

        let err = run_stage(Stage::Unwinder, &fx.paths, &fx.settings, &mut runner).unwrap_err();

        assert!(err.to_string().contains("UNWINDER COMPILE failed"));
        assert_eq!(std::env::current_dir().unwrap(), before);
        // Install never ran, so neither did the header copy.
        assert_eq!(runner.calls.len(), 2);
        assert!(!fx.prefix("libunwind").join("include").exists());
    }

    #[test]
    fn test_every_call_gets_stage_flags() {
        let _lock = lock_cwd();
        let fx = Fixture::new();
        let mut runner = RecordingRunner::default();

        run_stage(Stage::Abi, &fx.paths, &fx.settings, &mut runner).unwrap();

        let expected = StageFlags::compute(&Libcxxabi, &fx.paths, &fx.settings.threading_adapter);
        assert!(runner.calls.iter().all(|c| c.env == expected.env));
    }

    #[test]
    fn test_verbose_make() {
        let _lock = lock_cwd();
        let mut fx = Fixture::new();
        fx.settings.verbose = true;
        let mut runner = RecordingRunner::default();

        run_stage(Stage::Abi, &fx.paths, &fx.settings, &mut runner).unwrap();

        assert_eq!(runner.lines()[1], "make -j 4 VERBOSE=1");
        assert_eq!(runner.lines()[2], "make install VERBOSE=1");
    }

    #[test]
    fn test_unwinder_copies_headers() {
        let _lock = lock_cwd();
        let fx = Fixture::new();
        let mut runner = RecordingRunner::default();

        run_stage(Stage::Unwinder, &fx.paths, &fx.settings, &mut runner).unwrap();
        run_stage(Stage::Unwinder, &fx.paths, &fx.settings, &mut runner).unwrap();

        let header = fx.prefix("libunwind").join("include/libunwind.h");
        assert_eq!(std::fs::read_to_string(header).unwrap(), "// libunwind\n");
    }

    #[test]
    fn test_full_order_with_relink_between_abi_and_unwinder() {
        let _lock = lock_cwd();
        let fx = Fixture::new();
        let unwind_dir = fx.settings.work_dir(&Libunwind);

        let mut runner = RecordingRunner::default();
        let relink_saw_unwind_dir = Rc::new(RefCell::new(None));
        let flag = Rc::clone(&relink_saw_unwind_dir);
        runner.on_call = Some(Box::new(move |inv: &Invocation| {
            if inv.program == "scons" && flag.borrow().is_none() {
                *flag.borrow_mut() = Some(unwind_dir.exists());
            }
        }));

        run_all(&fx.paths, &fx.settings, &mut runner).unwrap();

        let lines = runner.lines();
        assert_eq!(lines.len(), 11);
        assert!(lines[0].starts_with("cmake ") && lines[0].contains("libcxxabi_base"));
        assert_eq!(lines[2], "make install");
        assert!(lines[3].starts_with("scons sys_image_root="));
        assert!(lines[4].starts_with("scons install "));
        assert!(lines[5].contains("libunwind_base"));
        assert!(lines[8].contains("libcxx_base"));
        assert_eq!(*relink_saw_unwind_dir.borrow(), Some(false));
    }

    #[test]
    fn test_abi_install_failure_stops_pipeline() {
        let _lock = lock_cwd();
        let fx = Fixture::new();
        let mut runner = RecordingRunner::failing_on("make", &["install"]);

        assert!(run_all(&fx.paths, &fx.settings, &mut runner).is_err());

        assert_eq!(runner.calls.len(), 3);
        assert!(runner.calls.iter().all(|c| c.program != "scons"));
        assert!(!fx.settings.work_dir(&Libunwind).exists());
        assert!(!fx.settings.work_dir(&Libcxx).exists());
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(Stage::Unwinder.to_string(), "UNWINDER");
        assert_eq!(Step::CopyHeaders.to_string(), "COPY_HEADERS");
        assert_eq!(Stage::Runtime.library().name(), "libcxx");
    }

    #[test]
    fn test_absolute_settings() {
        let settings = BuildSettings {
            output_dir: PathBuf::from("output"),
            threading_adapter: PathBuf::from("/opt/adapter"),
            jobs: 1,
            verbose: false,
        };
        let abs = settings.absolute(Path::new("/builder"));
        assert_eq!(abs.output_dir, Path::new("/builder/output"));
        assert_eq!(abs.threading_adapter, Path::new("/opt/adapter"));
    }
}
