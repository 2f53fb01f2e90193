use crate::builtin::BUILTIN_NAMES;
use crate::command::{CancelToken, ExecContext};
use crate::config::Config;
use crate::editor::ShellHelper;
use crate::error::{ErrorCategory, ShellError};
use crate::history::HistoryStore;
use crate::parser::parse;
use crate::prompt;
use anyhow::Context;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{CompletionType, Editor};
use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// The interactive shell: owns the configuration, the history and the
/// cancellation token shared with the signal listener.
///
/// Example
/// ```
/// use marsh::{Config, History, Interpreter};
/// let config = Config::default();
/// let history = History::in_memory(100, false);
/// let mut sh = Interpreter::new(config, Box::new(history));
/// let mut out = Vec::new();
/// sh.execute_line("alias hi='echo hi'", &mut out).unwrap();
/// assert_eq!(sh.config().aliases["hi"], "echo hi");
/// ```
pub struct Interpreter {
    config: Config,
    history: Box<dyn HistoryStore>,
    cancel: CancelToken,
    busy: Arc<AtomicBool>,
}

impl Interpreter {
    pub fn new(config: Config, history: Box<dyn HistoryStore>) -> Self {
        Self {
            config,
            history,
            cancel: CancelToken::new(),
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn history(&self) -> &dyn HistoryStore {
        self.history.as_ref()
    }

    /// Handle that stops a running child (and the loop) when cancelled.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Set while a line is executing, clear while waiting for input.
    pub fn busy_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.busy)
    }

    /// Parses and runs one line. Nothing is printed on failure; see
    /// [`Interpreter::report_error`].
    pub fn execute_line(&mut self, line: &str, out: &mut dyn Write) -> Result<(), ShellError> {
        let command = parse(line, &self.config)?;
        tracing::debug!(?command, "executing");
        let mut ctx = ExecContext {
            stdout: out,
            history: self.history.as_mut(),
            cancel: &self.cancel,
        };
        command.execute(&mut ctx, &mut self.config)
    }

    /// Prints `err` for the user, with a hint when debug is on and
    /// suggestions for unknown commands.
    pub fn report_error(&self, err: &ShellError, line: &str, out: &mut dyn Write) -> io::Result<()> {
        let debug = self.config.debug;
        match err.category() {
            ErrorCategory::NotFound => {
                writeln!(out, "marsh: {err}")?;
                if debug {
                    writeln!(out, "Debug: Input was '{line}'")?;
                }
                let suggestions = self.suggestions(line);
                if !suggestions.is_empty() {
                    writeln!(out, "Did you mean: {}?", suggestions.join(", "))?;
                }
            }
            ErrorCategory::NoSuchFile => {
                writeln!(out, "marsh: {err}")?;
                if debug {
                    writeln!(out, "Debug: Check if the path exists and you have permission")?;
                }
            }
            ErrorCategory::Permission => {
                writeln!(out, "marsh: {err}")?;
                if debug {
                    writeln!(out, "Debug: Check file permissions or try with sudo")?;
                }
            }
            ErrorCategory::Syntax => {
                writeln!(out, "marsh: syntax error: {err}")?;
                if debug {
                    writeln!(out, "Debug: Check your command syntax")?;
                }
            }
            ErrorCategory::Generic => {
                writeln!(out, "marsh: {}", err.to_string().trim_end())?;
                if debug {
                    writeln!(out, "Debug: {err:?}")?;
                }
            }
        }
        Ok(())
    }

    /// Builtins and aliases that look like the first word of `line`.
    fn suggestions(&self, line: &str) -> Vec<String> {
        let Some(command) = line.split_whitespace().next() else {
            return Vec::new();
        };
        BUILTIN_NAMES
            .iter()
            .copied()
            .chain(self.config.aliases.keys().map(String::as_str))
            .filter(|candidate| is_similar(command, candidate))
            .map(str::to_string)
            .collect()
    }

    /// Reads lines until EOF, `exit` or cancellation.
    pub fn repl(&mut self) -> anyhow::Result<()> {
        let rl_config = rustyline::Config::builder()
            .history_ignore_space(true)
            .completion_type(CompletionType::List)
            .auto_add_history(false)
            .build();
        let mut rl: Editor<ShellHelper, DefaultHistory> =
            Editor::with_config(rl_config).context("failed to create the line editor")?;
        rl.set_helper(Some(ShellHelper::new(&self.config)));
        for entry in self.history.all() {
            rl.add_history_entry(entry.command.as_str())?;
        }

        let mut stdout = io::stdout();
        if self.config.show_welcome {
            writeln!(stdout, "Welcome to marsh")?;
            writeln!(stdout, "Type 'help' for available commands.\n")?;
        }

        while !self.cancel.is_cancelled() {
            if let Some(helper) = rl.helper_mut() {
                helper.refresh(&self.config);
            }
            let prompt = prompt::render(&self.config);
            match rl.readline(&prompt) {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    self.history.append(&line);
                    rl.add_history_entry(line.as_str())?;

                    self.busy.store(true, Ordering::SeqCst);
                    let res = self.execute_line(&line, &mut stdout);
                    self.busy.store(false, Ordering::SeqCst);
                    if let Err(e) = res {
                        self.report_error(&e, &line, &mut stdout)?;
                    }
                    stdout.flush()?;
                }
                // Ctrl-C at the prompt only discards the line being typed.
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => {
                    writeln!(stdout, "Goodbye!")?;
                    break;
                }
                Err(e) => return Err(e).context("failed to read input"),
            }
        }
        Ok(())
    }
}

/// Same first character and lengths within two, or the same first two
/// characters.
fn is_similar(a: &str, b: &str) -> bool {
    let (mut ac, mut bc) = (a.chars(), b.chars());
    let (Some(a0), Some(b0)) = (ac.next(), bc.next()) else {
        return false;
    };
    let (a_len, b_len) = (a.chars().count(), b.chars().count());
    if a0 == b0 && a_len.abs_diff(b_len) <= 2 {
        return true;
    }
    match (ac.next(), bc.next()) {
        (Some(a1), Some(b1)) => a0 == b0 && a1 == b1,
        _ => false,
    }
}
