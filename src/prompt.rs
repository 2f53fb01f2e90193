//! Prompt rendering from the configured format string.
//!
//! | escape | expands to                                   |
//! |--------|----------------------------------------------|
//! | `%u`   | user name                                    |
//! | `%h`   | host name                                    |
//! | `%w`   | working directory, home shown as `~`         |
//! | `%W`   | last component of the working directory      |
//! | `%g`   | git summary such as ` (main *+ ↑1)`          |
//! | `%t`   | `HH:MM:SS`, when timestamps are enabled      |
//! | `%$`   | `#` for root, `$` otherwise                  |
//! | `%%`   | a literal `%`                                |

use crate::config::Config;
use crate::git::{GitInfo, LiveGit};
use chrono::{DateTime, Local};
use std::path::PathBuf;

const UNKNOWN: &str = "unknown";

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const BLUE: &str = "\x1b[34m";

/// Everything outside the config that a prompt can show.
#[derive(Debug, Clone)]
pub struct PromptValues {
    pub user: String,
    pub host: String,
    pub cwd: Option<PathBuf>,
    pub home: Option<PathBuf>,
    pub git: Option<GitInfo>,
    pub now: DateTime<Local>,
}

impl PromptValues {
    /// Reads the current user, host, directory, time and, when enabled,
    /// repository state.
    pub fn gather(config: &Config) -> Self {
        let git = if config.show_git_info && config.git_enabled {
            LiveGit.info()
        } else {
            None
        };
        Self {
            user: whoami::fallible::username().unwrap_or_else(|_| UNKNOWN.to_string()),
            host: whoami::fallible::hostname().unwrap_or_else(|_| "localhost".to_string()),
            cwd: std::env::current_dir().ok(),
            home: config.env.home_dir(),
            git,
            now: Local::now(),
        }
    }

    fn is_root(&self) -> bool {
        self.user == "root"
    }

    fn working_dir(&self) -> String {
        let Some(cwd) = &self.cwd else {
            return UNKNOWN.to_string();
        };
        match self.home.as_deref().and_then(|home| cwd.strip_prefix(home).ok()) {
            Some(rest) if rest.as_os_str().is_empty() => "~".to_string(),
            Some(rest) => format!("~/{}", rest.display()),
            None => cwd.display().to_string(),
        }
    }

    fn working_dir_basename(&self) -> String {
        let Some(cwd) = &self.cwd else {
            return UNKNOWN.to_string();
        };
        if self.home.as_deref() == Some(cwd.as_path()) {
            return "~".to_string();
        }
        cwd.file_name()
            .map_or_else(|| cwd.display().to_string(), |n| n.to_string_lossy().into_owned())
    }
}

/// Renders the prompt for the current process state.
pub fn render(config: &Config) -> String {
    render_with(config, &PromptValues::gather(config))
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Palette {
    Plain,
    Default,
    Minimal,
    Bright,
}

impl Palette {
    fn from_name(name: &str) -> Self {
        match name {
            "auto" | "default" => Palette::Default,
            "minimal" => Palette::Minimal,
            "bright" => Palette::Bright,
            _ => Palette::Plain,
        }
    }
}

fn paint(text: String, color: &str, enabled: bool) -> String {
    if enabled && !text.is_empty() {
        format!("{color}{text}{RESET}")
    } else {
        text
    }
}

/// Renders `config.prompt_format` from already gathered values.
pub fn render_with(config: &Config, values: &PromptValues) -> String {
    let palette = Palette::from_name(&config.prompt_color);
    let default_colors = palette == Palette::Default;

    let mut out = String::new();
    let mut chars = config.prompt_format.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let Some(escape) = chars.next() else {
            out.push('%');
            break;
        };
        let expansion = match escape {
            'u' => paint(values.user.clone(), GREEN, default_colors),
            'h' => paint(values.host.clone(), GREEN, default_colors),
            'w' => paint(values.working_dir(), BLUE, default_colors),
            'W' => paint(values.working_dir_basename(), BLUE, default_colors),
            'g' => paint(git_segment(config, values.git.as_ref()), YELLOW, default_colors),
            't' if config.show_timestamp => values.now.format("%H:%M:%S").to_string(),
            't' => String::new(),
            '$' => {
                let (symbol, color) = if values.is_root() { ("#", RED) } else { ("$", GREEN) };
                paint(symbol.to_string(), color, palette == Palette::Minimal)
            }
            '%' => "%".to_string(),
            other => format!("%{other}"),
        };
        out.push_str(&expansion);
    }

    if palette == Palette::Bright {
        format!("{BOLD}{out}{RESET}")
    } else {
        out
    }
}

/// ` (branch flags ↑ahead ↓behind)`, or empty when there is nothing to show.
fn git_segment(config: &Config, info: Option<&GitInfo>) -> String {
    let Some(info) = info else {
        return String::new();
    };
    if !config.show_git_info || !config.git_enabled {
        return String::new();
    }

    let mut parts = Vec::new();
    if config.git_show_branch && !info.branch.is_empty() {
        parts.push(info.branch.clone());
    }
    if config.git_show_status {
        let flags: String = [
            (info.has_uncommitted, '*'),
            (info.has_untracked, '?'),
            (info.has_staged, '+'),
        ]
        .iter()
        .filter(|(set, _)| *set)
        .map(|(_, flag)| *flag)
        .collect();
        if !flags.is_empty() {
            parts.push(flags);
        }
    }
    if config.git_show_ahead {
        if info.ahead > 0 {
            parts.push(format!("↑{}", info.ahead));
        }
        if info.behind > 0 {
            parts.push(format!("↓{}", info.behind));
        }
    }

    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn values() -> PromptValues {
        PromptValues {
            user: "alice".into(),
            host: "box".into(),
            cwd: Some(PathBuf::from("/home/alice/src/marsh")),
            home: Some(PathBuf::from("/home/alice")),
            git: None,
            now: Local.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap(),
        }
    }

    fn plain(format: &str) -> Config {
        Config {
            prompt_format: format.into(),
            prompt_color: "none".into(),
            ..Config::default()
        }
    }

    #[test]
    fn test_default_format_without_colors() {
        let cfg = plain("%u@%h:%w%g$ ");
        assert_eq!(render_with(&cfg, &values()), "alice@box:~/src/marsh$ ");
    }

    #[test]
    fn test_directory_escapes() {
        let cfg = plain("%W|%w");
        assert_eq!(render_with(&cfg, &values()), "marsh|~/src/marsh");

        let mut at_home = values();
        at_home.cwd = at_home.home.clone();
        assert_eq!(render_with(&cfg, &at_home), "~|~");

        let mut elsewhere = values();
        elsewhere.cwd = Some(PathBuf::from("/home/alicebob"));
        assert_eq!(render_with(&cfg, &elsewhere), "alicebob|/home/alicebob");

        let mut root = values();
        root.cwd = Some(PathBuf::from("/"));
        assert_eq!(render_with(&cfg, &root), "/|/");
    }

    #[test]
    fn test_literal_and_unknown_escapes() {
        let cfg = plain("100%% %x %$ %");
        assert_eq!(render_with(&cfg, &values()), "100% %x $ %");

        let mut root = values();
        root.user = "root".into();
        assert_eq!(render_with(&plain("%$"), &root), "#");
    }

    #[test]
    fn test_timestamp_only_when_enabled() {
        let mut cfg = plain("[%t]");
        assert_eq!(render_with(&cfg, &values()), "[]");
        cfg.show_timestamp = true;
        assert_eq!(render_with(&cfg, &values()), "[07:08:09]");
    }

    #[test]
    fn test_git_segment() {
        let mut v = values();
        v.git = Some(GitInfo {
            branch: "main".into(),
            has_uncommitted: true,
            has_untracked: true,
            has_staged: true,
            ahead: 2,
            behind: 1,
        });
        let mut cfg = plain("%g");
        assert_eq!(render_with(&cfg, &v), " (main *?+ ↑2 ↓1)");

        cfg.git_show_status = false;
        cfg.git_show_ahead = false;
        assert_eq!(render_with(&cfg, &v), " (main)");

        cfg.git_show_branch = false;
        assert_eq!(render_with(&cfg, &v), "");

        cfg.git_show_branch = true;
        cfg.show_git_info = false;
        assert_eq!(render_with(&cfg, &v), "");
    }

    #[test]
    fn test_color_palettes() {
        let mut cfg = plain("%u %$");
        cfg.prompt_color = "default".into();
        assert_eq!(
            render_with(&cfg, &values()),
            format!("{GREEN}alice{RESET} $")
        );

        cfg.prompt_color = "minimal".into();
        assert_eq!(render_with(&cfg, &values()), format!("alice {GREEN}${RESET}"));

        cfg.prompt_color = "bright".into();
        assert_eq!(render_with(&cfg, &values()), format!("{BOLD}alice ${RESET}"));

        cfg.prompt_color = "off".into();
        assert_eq!(render_with(&cfg, &values()), "alice $");
    }
}
