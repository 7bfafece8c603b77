//! Running external build tools.
//!
//! Every shell-out goes through a [`Runner`] so stages can be driven against
//! a fake in tests. An [`Invocation`] carries the complete environment a tool
//! gets from us; nothing is set on the builder's own process. Tools run in
//! the builder's current directory.

use super::error::BuildError;
use anyhow::Result;
use std::fmt;
use std::process::Command;

/// One command line, plus the environment to run it with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

impl Invocation {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn envs(mut self, env: &[(String, String)]) -> Self {
        self.env.extend_from_slice(env);
        self
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        for (key, value) in &self.env {
            cmd.env(key, value);
        }
        cmd
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Something that can run an [`Invocation`] to completion.
pub trait Runner {
    /// Run and wait. A non-zero exit is an error.
    fn run(&mut self, invocation: &Invocation) -> Result<()>;
}

/// Runs tools for real, inheriting stdio so their output reaches the console.
pub struct SystemRunner;

impl Runner for SystemRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<()> {
        log::debug!("Running: {invocation}");
        for (key, value) in &invocation.env {
            log::debug!("  {key}={value}");
        }

        let status = invocation
            .to_command()
            .status()
            .map_err(|source| BuildError::ToolMissing {
                program: invocation.program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(BuildError::ToolFailed {
                program: invocation.program.clone(),
                status,
            }
            .into());
        }
        Ok(())
    }
}
