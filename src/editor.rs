//! `rustyline` glue: the line editor helper that routes Tab to the
//! completion engine.

use crate::completion::CompletionEngine;
use crate::config::Config;
use crate::git::LiveGit;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

pub struct ShellHelper {
    engine: CompletionEngine,
}

impl ShellHelper {
    pub fn new(config: &Config) -> Self {
        Self {
            engine: CompletionEngine::new(config, Box::new(LiveGit)),
        }
    }

    /// Picks up aliases and settings changed since the last prompt.
    pub fn refresh(&mut self, config: &Config) {
        self.engine = CompletionEngine::new(config, Box::new(LiveGit));
    }
}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let result = match self.engine.complete(line, pos) {
            Ok(result) => result,
            Err(e) => {
                tracing::debug!("completion failed: {e}");
                return Ok((pos, Vec::new()));
            }
        };
        let start = result.replace_start(line, pos);
        let pairs = result
            .candidates
            .into_iter()
            .map(|candidate| Pair {
                display: candidate.clone(),
                replacement: candidate,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for ShellHelper {
    type Hint = String;
}

impl Highlighter for ShellHelper {}

impl Validator for ShellHelper {}

impl Helper for ShellHelper {}
