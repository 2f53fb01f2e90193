use crate::command::CancelToken;
use crate::env::Environment;
use crate::error::ShellError;
use crate::expand::expand_variables;
use std::ffi::OsStr;
use std::io;
use std::path::PathBuf;
use std::process::{Child, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;

/// How often a running child is checked for exit or cancellation.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Command that is not a builtin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    name: String,
    args: Vec<String>,
}

impl ExternalCommand {
    pub fn new(name: String, args: Vec<String>) -> Self {
        Self { name, args }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Runs the program with the shell's standard streams.
    ///
    /// The environment overlay is added on top of the inherited process
    /// environment. When `cancel` fires the child is killed.
    pub fn execute(self, cancel: &CancelToken, env: &Environment) -> Result<(), ShellError> {
        let search_paths = env.get_var("PATH").unwrap_or_default();
        let program = resolve_program(&self.name, OsStr::new(&search_paths))
            .ok_or_else(|| ShellError::CommandNotFound(self.name.clone()))?;
        tracing::debug!(program = %program.display(), args = ?self.args, "spawning");

        let mut child = std::process::Command::new(&program)
            .args(&self.args)
            .envs(env.vars())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| match source.kind() {
                io::ErrorKind::NotFound => ShellError::CommandNotFound(self.name.clone()),
                _ => ShellError::ExecutionFailed {
                    name: self.name.clone(),
                    source,
                },
            })?;

        let exit_status = self.wait(&mut child, cancel)?;
        let code = match exit_status.code() {
            Some(x) => x,
            None => terminated_by_signal(exit_status),
        };
        if code == 0 {
            Ok(())
        } else {
            Err(ShellError::CommandFailed {
                name: self.name,
                code,
            })
        }
    }

    fn wait(&self, child: &mut Child, cancel: &CancelToken) -> Result<ExitStatus, ShellError> {
        let failed = |source| ShellError::ExecutionFailed {
            name: self.name.clone(),
            source,
        };
        loop {
            if let Some(status) = child.try_wait().map_err(failed)? {
                return Ok(status);
            }
            if cancel.is_cancelled() {
                tracing::debug!(name = %self.name, "killing cancelled child");
                // The child may already be gone; reaping is all that matters.
                let _ = child.kill();
                child.wait().map_err(failed)?;
                return Err(ShellError::Cancelled(self.name.clone()));
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

/// Builds an external command from tokens, expanding `$VAR` in each of them.
///
/// `tokens` must not be empty.
pub fn build_external(tokens: &[String], env: &Environment) -> ExternalCommand {
    let mut expanded = tokens.iter().map(|t| expand_variables(t, env));
    let name = expanded.next().unwrap_or_default();
    ExternalCommand::new(name, expanded.collect())
}

/// Exit code reported for a child that did not exit normally.
#[cfg(unix)]
fn terminated_by_signal(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    match status.signal() {
        Some(signal) => 128 + signal,
        None if status.core_dumped() => 255,
        None => -1,
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_status: ExitStatus) -> i32 {
    -1
}

/// Locates the program for `name`.
///
/// A name with a `/` in it is taken as a path (relative to the working
/// directory unless absolute) and must exist. A bare name is looked up in
/// each directory of `search_paths`, first regular file wins.
pub fn resolve_program(name: &str, search_paths: &OsStr) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }
    if name.contains('/') {
        let path = PathBuf::from(name);
        return path.exists().then_some(path);
    }
    std::env::split_paths(search_paths)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}
