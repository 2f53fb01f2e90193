//! Core of `marsh`, an interactive shell with git-aware tab completion.
//!
//! A line goes through [`expand_alias`], [`tokenize`] and [`parse`] to
//! become a [`Command`]: a builtin run in-process or an external program
//! resolved through `PATH`. [`CompletionEngine`] answers Tab requests from
//! the raw line and cursor. [`Interpreter`] ties both to a `rustyline`
//! editor.
//!
//! The crate never installs signal handlers; the binary wires SIGTERM to the
//! interpreter's [`CancelToken`].

pub mod alias;
pub mod builtin;
pub mod command;
pub mod completion;
pub mod config;
mod editor;
pub mod env;
pub mod error;
pub mod expand;
pub mod external;
pub mod git;
pub mod history;
mod interpreter;
pub mod lexer;
pub mod parser;
pub mod prompt;

pub use alias::{AliasTable, expand_alias};
pub use builtin::{BUILTIN_NAMES, Builtin, resolve_builtin};
pub use command::{CancelToken, Command, ExecContext};
pub use completion::{
    CompletionContext, CompletionEngine, CompletionResult, common_prefix, format_completions,
    remove_duplicates,
};
pub use config::{Config, ConfigError};
pub use env::Environment;
pub use error::{ErrorCategory, ShellError};
pub use expand::expand_variables;
pub use external::{ExternalCommand, build_external};
pub use git::{GitLookup, LiveGit, StaticGit};
pub use history::{History, HistoryError, HistoryStore};
pub use interpreter::Interpreter;
pub use lexer::tokenize;
pub use parser::parse;
