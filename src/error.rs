use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Every failure the shell core can report for a single input line.
///
/// None of these end the interactive loop; the interpreter prints them and
/// shows the next prompt.
#[derive(Error, Debug)]
pub enum ShellError {
    /// A `"` or `'` was opened and never closed.
    #[error("unclosed quote")]
    UnclosedQuote,

    /// `alias` / `export` argument without a `name=value` shape.
    #[error("{command}: invalid format, use: {usage}")]
    InvalidFormat {
        command: &'static str,
        usage: &'static str,
    },

    /// A builtin rejected its flags; `output` is argh's usage text.
    #[error("{output}")]
    Usage { output: String },

    #[error("cd: {}: no such file or directory", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("cd: {}: permission denied", .0.display())]
    PermissionDenied(PathBuf),

    #[error("cd: {}: {source}", path.display())]
    ChangeDirectory { path: PathBuf, source: io::Error },

    #[error("failed to get home directory")]
    HomeDirectoryUnresolvable,

    #[error("export: cannot set {name}: invalid name or value")]
    ExportFailed { name: String },

    #[error("command not found: {0}")]
    CommandNotFound(String),

    #[error("command '{name}' exited with code {code}")]
    CommandFailed { name: String, code: i32 },

    #[error("failed to execute '{name}': {source}")]
    ExecutionFailed { name: String, source: io::Error },

    #[error("command '{0}' was cancelled")]
    Cancelled(String),

    #[error("cannot read directory {}: {source}", path.display())]
    DirectoryRead { path: PathBuf, source: io::Error },

    #[error(transparent)]
    History(#[from] crate::history::HistoryError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ShellError {
    /// Coarse category used when a failure is shown to the user.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ShellError::CommandNotFound(_) => ErrorCategory::NotFound,
            ShellError::DirectoryNotFound(_) => ErrorCategory::NoSuchFile,
            ShellError::PermissionDenied(_) => ErrorCategory::Permission,
            ShellError::ExecutionFailed { source, .. }
            | ShellError::ChangeDirectory { source, .. }
            | ShellError::DirectoryRead { source, .. }
            | ShellError::Io(source) => match source.kind() {
                io::ErrorKind::PermissionDenied => ErrorCategory::Permission,
                io::ErrorKind::NotFound => ErrorCategory::NoSuchFile,
                _ => ErrorCategory::Generic,
            },
            ShellError::UnclosedQuote => ErrorCategory::Syntax,
            _ => ErrorCategory::Generic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    NotFound,
    NoSuchFile,
    Permission,
    Syntax,
    Generic,
}
