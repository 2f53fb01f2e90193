use crate::alias::expand_alias;
use crate::builtin::resolve_builtin;
use crate::command::Command;
use crate::config::Config;
use crate::error::ShellError;
use crate::external::build_external;
use crate::lexer::tokenize;

/// Turns one input line into a [`Command`].
///
/// The alias on the first word is expanded before tokenizing, so an alias
/// value may itself contain quotes. Variables are only expanded for
/// external commands.
pub fn parse(line: &str, config: &Config) -> Result<Command, ShellError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Command::NoOp);
    }

    let (line, expanded) = expand_alias(line, &config.aliases);
    if expanded {
        tracing::debug!(%line, "alias expanded");
    }

    let tokens = tokenize(&line)?;
    if tokens.is_empty() {
        return Ok(Command::NoOp);
    }

    if let Some(builtin) = resolve_builtin(&tokens) {
        return Ok(Command::Builtin(builtin));
    }
    Ok(Command::External(build_external(&tokens, &config.env)))
}
