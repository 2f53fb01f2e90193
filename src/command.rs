use crate::builtin::Builtin;
use crate::config::Config;
use crate::error::ShellError;
use crate::external::ExternalCommand;
use crate::history::HistoryStore;
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared stop signal for work started from the foreground loop.
///
/// Cloning yields a handle on the same flag. Once cancelled it stays
/// cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Everything a command may touch while it runs, apart from the config.
pub struct ExecContext<'a> {
    pub stdout: &'a mut dyn Write,
    pub history: &'a mut dyn HistoryStore,
    pub cancel: &'a CancelToken,
}

/// One parsed input line, ready to run once.
#[derive(Debug)]
pub enum Command {
    /// Blank line.
    NoOp,
    Builtin(Builtin),
    External(ExternalCommand),
}

impl Command {
    pub fn execute(self, ctx: &mut ExecContext<'_>, config: &mut Config) -> Result<(), ShellError> {
        match self {
            Command::NoOp => Ok(()),
            Command::Builtin(builtin) => builtin.execute(ctx, config),
            Command::External(external) => external.execute(ctx.cancel, &config.env),
        }
    }
}
