use anyhow::{Context, Result};
use argh::FromArgs;
use marsh::{CancelToken, Config, ConfigError, History, Interpreter};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(FromArgs)]
/// marsh - an interactive shell with git-aware tab completion.
struct Cli {
    #[argh(switch)]
    /// show version information and exit.
    version: bool,

    #[argh(option)]
    /// configuration directory, ~/.config/marsh by default.
    config: Option<PathBuf>,

    #[argh(switch)]
    /// enable debug output and hints.
    debug: bool,
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_target(false),
        )
        .init();
}

/// Loads the rc file from `dir`, falling back to defaults (and creating the
/// directory) when there is none.
fn load_config(dir: Option<PathBuf>) -> Result<Config> {
    let dir = dir.unwrap_or_else(|| Config::default().config_dir);
    match Config::load(&dir) {
        Ok(config) => Ok(config),
        Err(ConfigError::NotFound(_)) => {
            tracing::debug!(dir = %dir.display(), "no configuration file, using defaults");
            fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create config directory {}", dir.display()))?;
            Ok(Config {
                config_dir: dir,
                ..Config::default()
            })
        }
        Err(e) => Err(e).context("failed to load configuration"),
    }
}

/// SIGTERM cancels the running child, or ends an idle shell right away.
/// SIGINT is left to the foreground child.
fn spawn_signal_listener(cancel: CancelToken, busy: Arc<AtomicBool>) -> Result<()> {
    let mut signals =
        Signals::new([SIGINT, SIGTERM]).context("failed to install signal handlers")?;
    thread::Builder::new()
        .name("signals".to_string())
        .spawn(move || {
            for signal in signals.forever() {
                if signal != SIGTERM {
                    tracing::debug!(signal, "ignoring interrupt");
                    continue;
                }
                cancel.cancel();
                if !busy.load(Ordering::SeqCst) {
                    eprintln!("\nTerminating marsh...");
                    std::process::exit(0);
                }
                tracing::debug!("terminate requested while a command runs");
            }
        })
        .context("failed to start the signal listener")?;
    Ok(())
}

fn main() -> Result<()> {
    let cli: Cli = argh::from_env();
    if cli.version {
        println!("marsh version {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    init_logging(cli.debug);
    let mut config = load_config(cli.config)?;
    if cli.debug {
        config.debug = true;
    }

    let history = History::from_config(&config);
    let mut shell = Interpreter::new(config, Box::new(history));
    spawn_signal_listener(shell.cancel_token(), shell.busy_flag())?;
    shell.repl()
}
