use crate::command::ExecContext;
use crate::config::{Config, split_assignment};
use crate::error::ShellError;
use crate::history::Entry;
use argh::{EarlyExit, FromArgs};
use std::env;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Names recognised by [`resolve_builtin`], in help order.
pub const BUILTIN_NAMES: &[&str] = &["cd", "pwd", "exit", "help", "history", "alias", "export"];

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed directly
/// in-process without spawning a child process.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "history" or "cd".
    fn name() -> &'static str;

    fn execute(self, ctx: &mut ExecContext<'_>, config: &mut Config) -> Result<(), ShellError>;
}

/// A resolved builtin with its parsed arguments.
#[derive(Debug, PartialEq)]
pub enum Builtin {
    Cd(Cd),
    Pwd(Pwd),
    Exit(Exit),
    Help(Help),
    History(HistoryCommand),
    Alias(Alias),
    Export(Export),
    /// argh stopped before the command could run: `--help` output, or a
    /// rejected flag when `is_error` is set.
    InvalidArgs { output: String, is_error: bool },
}

impl Builtin {
    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Cd(_) => Cd::name(),
            Builtin::Pwd(_) => Pwd::name(),
            Builtin::Exit(_) => Exit::name(),
            Builtin::Help(_) => Help::name(),
            Builtin::History(_) => HistoryCommand::name(),
            Builtin::Alias(_) => Alias::name(),
            Builtin::Export(_) => Export::name(),
            Builtin::InvalidArgs { .. } => "",
        }
    }

    pub fn execute(self, ctx: &mut ExecContext<'_>, config: &mut Config) -> Result<(), ShellError> {
        match self {
            Builtin::Cd(cmd) => cmd.execute(ctx, config),
            Builtin::Pwd(cmd) => cmd.execute(ctx, config),
            Builtin::Exit(cmd) => cmd.execute(ctx, config),
            Builtin::Help(cmd) => cmd.execute(ctx, config),
            Builtin::History(cmd) => cmd.execute(ctx, config),
            Builtin::Alias(cmd) => cmd.execute(ctx, config),
            Builtin::Export(cmd) => cmd.execute(ctx, config),
            Builtin::InvalidArgs { output, is_error } => {
                if is_error {
                    return Err(ShellError::Usage { output });
                }
                writeln!(ctx.stdout, "{}", output.trim_end())?;
                Ok(())
            }
        }
    }
}

fn parse_args<T: BuiltinCommand>(args: &[&str], wrap: fn(T) -> Builtin) -> Builtin {
    match T::from_args(&[T::name()], args) {
        Ok(cmd) => wrap(cmd),
        Err(EarlyExit { output, status }) => Builtin::InvalidArgs {
            output,
            is_error: status.is_err(),
        },
    }
}

/// Maps the first token to a builtin, parsing the rest as its arguments.
///
/// Returns `None` for anything that is not a builtin name.
pub fn resolve_builtin(tokens: &[String]) -> Option<Builtin> {
    let (name, rest) = tokens.split_first()?;
    let args: Vec<&str> = rest.iter().map(String::as_str).collect();
    let builtin = match name.as_str() {
        // Operands such as `-` or `-x` are directory names, not flags.
        "cd" if args != ["--help"] => Builtin::Cd(Cd {
            args: rest.to_vec(),
        }),
        "cd" => parse_args(&args, Builtin::Cd),
        "pwd" => parse_args(&args, Builtin::Pwd),
        "exit" => parse_args(&args, Builtin::Exit),
        "help" => parse_args(&args, Builtin::Help),
        "history" => parse_args(&args, Builtin::History),
        "alias" => parse_args(&args, Builtin::Alias),
        "export" => parse_args(&args, Builtin::Export),
        _ => return None,
    };
    tracing::debug!(%name, "resolved builtin");
    Some(builtin)
}

#[derive(FromArgs, Debug, PartialEq)]
/// Print the current working directory to standard output.
pub struct Pwd {}

impl BuiltinCommand for Pwd {
    fn name() -> &'static str {
        "pwd"
    }

    fn execute(self, ctx: &mut ExecContext<'_>, _config: &mut Config) -> Result<(), ShellError> {
        writeln!(ctx.stdout, "{}", env::current_dir()?.display())?;
        Ok(())
    }
}

#[derive(FromArgs, Debug, PartialEq)]
/// Change the current working directory.
/// Without a target, changes to the home directory. A leading `~/` is relative to home.
pub struct Cd {
    #[argh(positional, greedy)]
    /// directory to switch to; only the first one is used.
    pub args: Vec<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn execute(self, _ctx: &mut ExecContext<'_>, config: &mut Config) -> Result<(), ShellError> {
        let home = || config.env.home_dir().ok_or(ShellError::HomeDirectoryUnresolvable);
        let target = match self.args.first() {
            None => home()?,
            // Bare `~` is taken literally; only `~/...` is rewritten.
            Some(dir) => match dir.strip_prefix("~/") {
                Some(rest) => home()?.join(rest),
                None => PathBuf::from(dir),
            },
        };

        tracing::debug!(target = %target.display(), "changing directory");
        env::set_current_dir(&target).map_err(|source| match source.kind() {
            ErrorKind::NotFound => ShellError::DirectoryNotFound(target.clone()),
            ErrorKind::PermissionDenied => ShellError::PermissionDenied(target.clone()),
            _ => ShellError::ChangeDirectory {
                path: target.clone(),
                source,
            },
        })
    }
}

#[derive(FromArgs, Debug, PartialEq)]
/// Exit the shell with status 0.
pub struct Exit {
    #[argh(positional, greedy)]
    /// ignored.
    pub _args: Vec<String>,
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn execute(self, ctx: &mut ExecContext<'_>, _config: &mut Config) -> Result<(), ShellError> {
        ctx.stdout.flush()?;
        std::process::exit(0)
    }
}

#[derive(FromArgs, Debug, PartialEq)]
/// Show the list of builtin commands.
pub struct Help {
    #[argh(positional, greedy)]
    /// ignored.
    pub _args: Vec<String>,
}

const HELP_TEXT: &str = "\
marsh - an interactive shell

Built-in commands:
  cd [dir]     Change directory
  pwd          Print working directory
  exit         Exit the shell
  help         Show this help message
  history      Show command history
  alias        Manage command aliases
  export       Set environment variables

Features:
  - Tab completion (press Tab)
  - Command history (use arrow keys)
  - Git integration in prompt
  - Customizable configuration";

impl BuiltinCommand for Help {
    fn name() -> &'static str {
        "help"
    }

    fn execute(self, ctx: &mut ExecContext<'_>, _config: &mut Config) -> Result<(), ShellError> {
        writeln!(ctx.stdout, "{HELP_TEXT}")?;
        Ok(())
    }
}

#[derive(FromArgs, Debug, PartialEq)]
/// Show, search, clear or export the command history.
pub struct HistoryCommand {
    #[argh(switch, short = 'c')]
    /// clear the history.
    pub clear: bool,

    #[argh(positional, greedy)]
    /// clear, a count N, export FILE [bash|json], or a search term.
    pub args: Vec<String>,
}

fn write_numbered(out: &mut dyn Write, entries: &[Entry], first: usize) -> io::Result<()> {
    for (i, entry) in entries.iter().enumerate() {
        writeln!(out, "{:4}  {}", first + i, entry.command)?;
    }
    Ok(())
}

impl BuiltinCommand for HistoryCommand {
    fn name() -> &'static str {
        "history"
    }

    fn execute(self, ctx: &mut ExecContext<'_>, _config: &mut Config) -> Result<(), ShellError> {
        if self.clear {
            return Ok(ctx.history.clear()?);
        }

        let Some(first) = self.args.first() else {
            write_numbered(ctx.stdout, ctx.history.all(), 1)?;
            return Ok(());
        };

        match first.as_str() {
            "clear" => ctx.history.clear()?,
            "export" => {
                let file = self.args.get(1).ok_or(ShellError::InvalidFormat {
                    command: "history",
                    usage: "history export FILE [bash|json]",
                })?;
                let format = self.args.get(2).map_or("bash", String::as_str);
                ctx.history.export(Path::new(file), format)?;
                writeln!(ctx.stdout, "History exported to {file}")?;
            }
            arg => match arg.parse::<usize>() {
                Ok(n) => {
                    let total = ctx.history.all().len();
                    let recent = ctx.history.recent(n);
                    write_numbered(ctx.stdout, recent, total - recent.len() + 1)?;
                }
                Err(_) => {
                    let term = self.args.join(" ");
                    for entry in ctx.history.search(&term) {
                        writeln!(ctx.stdout, "  {}", entry.command)?;
                    }
                }
            },
        }
        Ok(())
    }
}

/// Joins the words of a `name=value` definition and splits it.
///
/// `None` when there is no `=` or the name is empty.
fn parse_definition(args: &[String]) -> Option<(String, String)> {
    let joined = args.join(" ");
    let (name, value) = split_assignment(&joined)?;
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), value.to_string()))
}

#[derive(FromArgs, Debug, PartialEq)]
/// List aliases, or define one with `alias name=value`.
pub struct Alias {
    #[argh(positional, greedy)]
    /// definition in the form name=value.
    pub args: Vec<String>,
}

impl BuiltinCommand for Alias {
    fn name() -> &'static str {
        "alias"
    }

    fn execute(self, ctx: &mut ExecContext<'_>, config: &mut Config) -> Result<(), ShellError> {
        if self.args.is_empty() {
            for (name, value) in &config.aliases {
                writeln!(ctx.stdout, "alias {name}='{value}'")?;
            }
            return Ok(());
        }

        let (name, value) = parse_definition(&self.args).ok_or(ShellError::InvalidFormat {
            command: "alias",
            usage: "alias name=value",
        })?;
        tracing::debug!(%name, %value, "defining alias");
        config.aliases.insert(name, value);
        Ok(())
    }
}

#[derive(FromArgs, Debug, PartialEq)]
/// List exported variables, or set one with `export NAME=value`.
pub struct Export {
    #[argh(positional, greedy)]
    /// assignment in the form NAME=value.
    pub args: Vec<String>,
}

impl BuiltinCommand for Export {
    fn name() -> &'static str {
        "export"
    }

    fn execute(self, ctx: &mut ExecContext<'_>, config: &mut Config) -> Result<(), ShellError> {
        if self.args.is_empty() {
            let mut vars: Vec<_> = config.env.vars().collect();
            vars.sort_unstable();
            for (key, value) in vars {
                writeln!(ctx.stdout, "export {key}='{value}'")?;
            }
            return Ok(());
        }

        let (name, value) = parse_definition(&self.args).ok_or(ShellError::InvalidFormat {
            command: "export",
            usage: "export NAME=value",
        })?;
        if !config.export_var(&name, &value) {
            return Err(ShellError::ExportFailed { name });
        }
        Ok(())
    }
}
