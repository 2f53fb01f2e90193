//! The single mutable configuration handle of the shell and its rc-file loader.
//!
//! The interpreter owns one [`Config`]; builtins receive it as `&mut` and the
//! completion engine takes a snapshot of it before each prompt.

use crate::alias::AliasTable;
use crate::env::Environment;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Prefix that routes a `KEY=value` rc line to a shell setting.
const SETTING_PREFIX: &str = "MARSH_";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no configuration file found in {}", .0.display())]
    NotFound(PathBuf),

    #[error("{}: line {line}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("cannot read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub config_dir: PathBuf,
    pub debug: bool,
    pub show_welcome: bool,

    pub prompt_format: String,
    pub show_git_info: bool,
    pub show_timestamp: bool,
    /// One of `auto`, `default`, `minimal`, `bright`, `none`, `off`.
    pub prompt_color: String,

    pub history_size: usize,
    pub history_file: Option<PathBuf>,
    pub save_history: bool,
    pub history_duplicates: bool,

    pub completion_enabled: bool,
    pub completion_case_insensitive: bool,
    pub completion_show_hidden: bool,

    pub git_enabled: bool,
    pub git_show_status: bool,
    pub git_show_branch: bool,
    pub git_show_ahead: bool,

    pub env: Environment,
    pub aliases: AliasTable,
    /// Directories scanned for command completion, in `$PATH` order.
    pub path_dirs: Vec<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let home = dirs::home_dir();
        let mut aliases = AliasTable::new();
        for (name, value) in [("ll", "ls -la"), ("la", "ls -A"), ("l", "ls -CF")] {
            aliases.insert(name.to_string(), value.to_string());
        }
        let path_dirs = std::env::var_os("PATH")
            .map(|p| split_path_var(&p))
            .unwrap_or_default();

        Self {
            config_dir: home
                .as_ref()
                .map(|h| h.join(".config").join("marsh"))
                .unwrap_or_else(|| PathBuf::from(".marsh")),
            debug: false,
            show_welcome: true,

            prompt_format: "%u@%h:%w%g$ ".to_string(),
            show_git_info: true,
            show_timestamp: false,
            prompt_color: "auto".to_string(),

            history_size: 10_000,
            history_file: home.as_ref().map(|h| h.join(".marsh_history")),
            save_history: true,
            history_duplicates: false,

            completion_enabled: true,
            completion_case_insensitive: true,
            completion_show_hidden: false,

            git_enabled: true,
            git_show_status: true,
            git_show_branch: true,
            git_show_ahead: true,

            env: Environment::new(),
            aliases,
            path_dirs,
        }
    }
}

impl Config {
    /// Loads the first rc file that exists in `dir` (`config`, then `marshrc`)
    /// or in the home directory (`.marshrc`), on top of the defaults.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let mut cfg = Config {
            config_dir: dir.to_path_buf(),
            ..Config::default()
        };

        let mut candidates = vec![dir.join("config"), dir.join("marshrc")];
        if let Some(home) = dirs::home_dir() {
            candidates.push(home.join(".marshrc"));
        }

        for path in candidates {
            match fs::read_to_string(&path) {
                Ok(text) => {
                    tracing::debug!(path = %path.display(), "loading configuration");
                    cfg.apply_rc(&path, &text)?;
                    return Ok(cfg);
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(source) => return Err(ConfigError::Read { path, source }),
            }
        }
        Err(ConfigError::NotFound(dir.to_path_buf()))
    }

    /// Applies every line of an rc file. `path` is used for error messages.
    pub fn apply_rc(&mut self, path: &Path, text: &str) -> Result<(), ConfigError> {
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            self.apply_line(line).map_err(|message| ConfigError::Parse {
                path: path.to_path_buf(),
                line: idx + 1,
                message,
            })?;
        }
        Ok(())
    }

    fn apply_line(&mut self, line: &str) -> Result<(), String> {
        if let Some(rest) = line.strip_prefix("export ") {
            let (key, value) = split_assignment(rest)
                .ok_or_else(|| format!("invalid export statement: {rest}"))?;
            self.set_env_var(key, value);
        } else if let Some(rest) = line.strip_prefix("alias ") {
            let (key, value) = split_assignment(rest)
                .ok_or_else(|| format!("invalid alias statement: {rest}"))?;
            self.aliases.insert(key.to_string(), value.to_string());
        } else if let Some(rest) = line.strip_prefix("set ") {
            let (key, value) =
                split_assignment(rest).ok_or_else(|| format!("invalid set statement: {rest}"))?;
            self.set_value(key, value)?;
        } else if let Some((key, value)) = split_assignment(line) {
            match key.strip_prefix(SETTING_PREFIX) {
                Some(setting) => self.set_value(setting, value)?,
                None => self.set_env_var(key, value),
            }
        }
        Ok(())
    }

    /// Sets an overlay variable. Setting `PATH` also replaces `path_dirs`.
    pub fn set_env_var(&mut self, key: &str, value: &str) {
        self.env.set_var(key, value);
        self.sync_path_dirs(key, value);
    }

    /// Like [`Environment::export`], keeping `path_dirs` in step with `PATH`.
    pub fn export_var(&mut self, key: &str, value: &str) -> bool {
        if !self.env.export(key, value) {
            return false;
        }
        self.sync_path_dirs(key, value);
        true
    }

    fn sync_path_dirs(&mut self, key: &str, value: &str) {
        if key == "PATH" {
            self.path_dirs = split_path_var(OsStr::new(value));
            tracing::debug!(dirs = self.path_dirs.len(), "command search path changed");
        }
    }

    /// Sets one shell option by its (case-insensitive) key.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key.to_ascii_uppercase().as_str() {
            "DEBUG" => self.debug = parse_bool(value),
            "SHOW_WELCOME" => self.show_welcome = parse_bool(value),
            "PROMPT_FORMAT" => self.prompt_format = value.to_string(),
            "SHOW_GIT_INFO" => self.show_git_info = parse_bool(value),
            "SHOW_TIMESTAMP" => self.show_timestamp = parse_bool(value),
            "PROMPT_COLOR" => self.prompt_color = value.to_string(),
            "HISTORY_SIZE" => {
                // A malformed size keeps the previous value.
                if let Ok(size) = value.parse() {
                    self.history_size = size;
                }
            }
            "HISTORY_FILE" => self.history_file = Some(PathBuf::from(value)),
            "SAVE_HISTORY" => self.save_history = parse_bool(value),
            "HISTORY_DUPLICATES" => self.history_duplicates = parse_bool(value),
            "COMPLETION_ENABLED" => self.completion_enabled = parse_bool(value),
            "COMPLETION_CASE_INSENSITIVE" => self.completion_case_insensitive = parse_bool(value),
            "COMPLETION_SHOW_HIDDEN" => self.completion_show_hidden = parse_bool(value),
            "GIT_ENABLED" => self.git_enabled = parse_bool(value),
            "GIT_SHOW_STATUS" => self.git_show_status = parse_bool(value),
            "GIT_SHOW_BRANCH" => self.git_show_branch = parse_bool(value),
            "GIT_SHOW_AHEAD" => self.git_show_ahead = parse_bool(value),
            _ => return Err(format!("unknown configuration key: {key}")),
        }
        Ok(())
    }
}

fn split_path_var(value: &OsStr) -> Vec<PathBuf> {
    std::env::split_paths(value).collect()
}

/// Splits `name=value` on the first `=`; both sides trimmed, one layer of
/// matching quotes removed from the value.
pub fn split_assignment(text: &str) -> Option<(&str, &str)> {
    let (name, value) = text.split_once('=')?;
    Some((name.trim(), unquote(value.trim())))
}

/// Removes one layer of matching `"` or `'` around `value`.
pub fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "true" | "yes" | "1" | "on"
    )
}
