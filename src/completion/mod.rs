//! Tab completion.
//!
//! [`CompletionEngine::complete`] classifies the text before the cursor into a
//! [`CompletionContext`], generates full candidate strings for it and reports
//! how many characters of the typed word they replace.

mod context;
mod files;
mod format;

pub use context::CompletionContext;
pub use files::{FileOptions, file_candidates, path_executables};
pub use format::{common_prefix, format_completions, remove_duplicates};

use crate::builtin::BUILTIN_NAMES;
use crate::config::Config;
use crate::error::ShellError;
use crate::git::GitLookup;
use std::path::PathBuf;

const GIT_SUBCOMMANDS: &[&str] = &[
    "add", "branch", "checkout", "clone", "commit", "diff", "fetch", "init", "log", "merge", "pull",
    "push", "rebase", "remote", "reset", "show", "status", "switch", "tag",
];
const GIT_COMMIT_OPTIONS: &[&str] = &["-m", "--message", "-a", "--all", "--amend", "-v", "--verbose"];
const GIT_REMOTE_SUBCOMMANDS: &[&str] = &["add", "remove", "rename", "show", "prune", "update"];

/// Candidates for one completion request.
///
/// Each candidate is the whole replacement for the last `replace_len`
/// characters before the cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionResult {
    pub candidates: Vec<String>,
    pub replace_len: usize,
}

impl CompletionResult {
    /// Byte offset in `line` where the replaced word starts.
    ///
    /// `cursor` is clamped the same way [`CompletionEngine::complete`] does.
    pub fn replace_start(&self, line: &str, cursor: usize) -> usize {
        let cursor = floor_char_boundary(line, cursor);
        line[..cursor]
            .char_indices()
            .rev()
            .take(self.replace_len)
            .last()
            .map_or(cursor, |(idx, _)| idx)
    }

    /// `line` with the word before `cursor` replaced by `candidate`.
    pub fn apply(&self, line: &str, cursor: usize, candidate: &str) -> String {
        let cursor = floor_char_boundary(line, cursor);
        let start = self.replace_start(line, cursor);
        format!("{}{}{}", &line[..start], candidate, &line[cursor..])
    }
}

/// Snapshot of the configuration needed to answer completion requests.
pub struct CompletionEngine {
    enabled: bool,
    git_enabled: bool,
    aliases: Vec<String>,
    path_dirs: Vec<PathBuf>,
    file_options: FileOptions,
    git: Box<dyn GitLookup>,
}

impl CompletionEngine {
    pub fn new(config: &Config, git: Box<dyn GitLookup>) -> Self {
        Self {
            enabled: config.completion_enabled,
            git_enabled: config.git_enabled,
            aliases: config.aliases.keys().cloned().collect(),
            path_dirs: config.path_dirs.clone(),
            file_options: FileOptions {
                case_insensitive: config.completion_case_insensitive,
                show_hidden: config.completion_show_hidden,
                home: config.env.home_dir(),
            },
            git,
        }
    }

    /// Completes the word ending at byte offset `cursor` of `line`.
    ///
    /// A cursor past the end or inside a character is moved back to the
    /// nearest character boundary.
    pub fn complete(&self, line: &str, cursor: usize) -> Result<CompletionResult, ShellError> {
        if !self.enabled {
            return Ok(CompletionResult::default());
        }

        let before = &line[..floor_char_boundary(line, cursor)];
        let word = current_word(before);
        let context = CompletionContext::classify(before);
        tracing::debug!(?context, word, "completing");

        let candidates = match context {
            CompletionContext::EmptyOrFirstToken => self.commands(word),
            CompletionContext::GitSubcommand => filter_prefix(GIT_SUBCOMMANDS, word),
            CompletionContext::GitBranchish => {
                if self.git_enabled {
                    filter_prefix(&self.git.branches(), word)
                } else {
                    Vec::new()
                }
            }
            CompletionContext::GitFileish => self.changed_files(word)?,
            CompletionContext::GitCommitOption => filter_prefix(GIT_COMMIT_OPTIONS, word),
            CompletionContext::GitRemote => filter_prefix(&self.git.remotes(), word),
            CompletionContext::GitRemoteSubcommand => filter_prefix(GIT_REMOTE_SUBCOMMANDS, word),
            CompletionContext::GitRef => filter_prefix(&self.git.refs(), word),
            CompletionContext::GenericFile => file_candidates(word, &self.file_options)?,
        };

        Ok(CompletionResult {
            candidates,
            replace_len: word.chars().count(),
        })
    }

    fn commands(&self, prefix: &str) -> Vec<String> {
        let mut names = filter_prefix(BUILTIN_NAMES, prefix);
        names.extend(filter_prefix(&self.aliases, prefix));
        names.extend(path_executables(&self.path_dirs, prefix));
        let mut names = remove_duplicates(names);
        names.sort();
        names
    }

    /// Modified files matching `word`, or plain file completion when none do.
    fn changed_files(&self, word: &str) -> Result<Vec<String>, ShellError> {
        if let Some(modified) = self.git.modified_files() {
            let matching = filter_prefix(&modified, word);
            if !matching.is_empty() {
                return Ok(matching);
            }
        }
        file_candidates(word, &self.file_options)
    }
}

fn filter_prefix<S: AsRef<str>>(items: &[S], prefix: &str) -> Vec<String> {
    let matching = items
        .iter()
        .map(AsRef::as_ref)
        .filter(|item| item.starts_with(prefix))
        .map(str::to_string)
        .collect();
    remove_duplicates(matching)
}

/// The word being typed: everything after the last whitespace.
fn current_word(before_cursor: &str) -> &str {
    match before_cursor.rfind(char::is_whitespace) {
        Some(idx) => {
            let ws_len = before_cursor[idx..].chars().next().map_or(1, char::len_utf8);
            &before_cursor[idx + ws_len..]
        }
        None => before_cursor,
    }
}

fn floor_char_boundary(line: &str, cursor: usize) -> usize {
    let mut idx = cursor.min(line.len());
    while !line.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::StaticGit;
    use std::fs;

    fn engine(config: &Config) -> CompletionEngine {
        CompletionEngine::new(config, Box::new(StaticGit))
    }

    /// Defaults without any PATH directories.
    fn quiet_config() -> Config {
        Config {
            path_dirs: Vec::new(),
            ..Config::default()
        }
    }

    fn complete(config: &Config, line: &str) -> CompletionResult {
        engine(config).complete(line, line.len()).unwrap()
    }

    #[test]
    fn test_git_st_replaces_only_typed_word() {
        let cfg = quiet_config();
        for (line, typed) in [("git st", 2), ("git sta", 3)] {
            let res = complete(&cfg, line);
            assert_eq!(res.replace_len, typed, "{line}");
            assert!(res.candidates.contains(&"status".to_string()));
            assert_eq!(res.apply(line, line.len(), "status"), "git status");
        }
    }

    #[test]
    fn test_trailing_space_completes_a_new_word() {
        let cfg = quiet_config();
        let res = complete(&cfg, "git ");
        assert_eq!(res.replace_len, 0);
        assert_eq!(res.candidates.len(), GIT_SUBCOMMANDS.len());
        assert_eq!(res.apply("git ", 4, "push"), "git push");
    }

    #[test]
    fn test_disabled_completion_is_empty() {
        let cfg = Config {
            completion_enabled: false,
            ..quiet_config()
        };
        assert_eq!(complete(&cfg, "git st"), CompletionResult::default());
    }

    #[test]
    fn test_commands_merge_builtins_aliases_and_path() {
        let bin = tempfile::tempdir().unwrap();
        let tool = bin.path().join("hello-tool");
        fs::write(&tool, "").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();
        }
        let mut cfg = quiet_config();
        cfg.path_dirs = vec![bin.path().to_path_buf()];
        cfg.aliases.insert("hello".into(), "echo hi".into());
        cfg.aliases.insert("help".into(), "man man".into());

        let res = complete(&cfg, "hel");
        assert_eq!(res.candidates, vec!["hello", "hello-tool", "help"]);
        assert_eq!(res.replace_len, 3);

        let all = complete(&cfg, "");
        assert!(BUILTIN_NAMES.iter().all(|b| all.candidates.contains(&b.to_string())));
        let mut sorted = all.candidates.clone();
        sorted.sort();
        assert_eq!(all.candidates, sorted);
    }

    #[test]
    fn test_git_argument_contexts() {
        let cfg = quiet_config();
        assert_eq!(complete(&cfg, "git checkout fe").candidates, vec!["feature/"]);
        assert_eq!(complete(&cfg, "git commit --a").candidates, vec!["--all", "--amend"]);
        assert_eq!(complete(&cfg, "git push ").candidates, vec!["origin", "upstream"]);
        assert_eq!(complete(&cfg, "git remote re").candidates, vec!["remove", "rename"]);

        let refs = complete(&cfg, "git log origin/");
        assert_eq!(refs.candidates, vec!["origin/main", "origin/master"]);
        assert_eq!(refs.replace_len, 7);
    }

    #[test]
    fn test_branches_need_git_enabled() {
        let cfg = Config {
            git_enabled: false,
            ..quiet_config()
        };
        assert!(complete(&cfg, "git checkout ").candidates.is_empty());
    }

    struct Modified(Vec<String>);

    impl GitLookup for Modified {
        fn branches(&self) -> Vec<String> {
            Vec::new()
        }

        fn remotes(&self) -> Vec<String> {
            Vec::new()
        }

        fn modified_files(&self) -> Option<Vec<String>> {
            Some(self.0.clone())
        }
    }

    #[test]
    fn test_git_add_prefers_modified_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("untracked.rs"), "").unwrap();
        let base = format!("{}/", dir.path().display());
        let modified = format!("{base}changed.rs");

        let cfg = quiet_config();
        let engine = CompletionEngine::new(&cfg, Box::new(Modified(vec![modified.clone()])));

        let line = format!("git add {base}c");
        let res = engine.complete(&line, line.len()).unwrap();
        assert_eq!(res.candidates, vec![modified]);

        let line = format!("git add {base}u");
        let res = engine.complete(&line, line.len()).unwrap();
        assert_eq!(res.candidates, vec![format!("{base}untracked.rs")]);
    }

    #[test]
    fn test_generic_file_completion_and_errors() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::write(dir.path().join(".secret"), "").unwrap();
        let base = format!("{}/", dir.path().display());

        let cfg = quiet_config();
        let line = format!("cat {base}");
        let res = complete(&cfg, &line);
        assert_eq!(res.candidates, vec![format!("{base}notes.txt")]);
        assert_eq!(res.replace_len, base.chars().count());

        let shown = Config {
            completion_show_hidden: true,
            ..quiet_config()
        };
        assert!(complete(&shown, &line).candidates.contains(&format!("{base}.secret")));

        assert!(matches!(
            engine(&cfg).complete("cat /definitely/not/here/", 25),
            Err(ShellError::DirectoryRead { .. })
        ));
    }

    #[test]
    fn test_cursor_in_the_middle_of_the_line() {
        let cfg = quiet_config();
        let line = "git st --short";
        let res = engine(&cfg).complete(line, 6).unwrap();
        assert_eq!(res.replace_len, 2);
        assert_eq!(res.apply(line, 6, "status"), "git status --short");
    }

    #[test]
    fn test_replace_len_counts_characters() {
        let res = CompletionResult {
            candidates: vec!["héllo".into()],
            replace_len: 2,
        };
        let line = "echo hé";
        assert_eq!(res.replace_start(line, line.len()), 5);
        assert_eq!(res.apply(line, line.len(), "héllo"), "echo héllo");
        assert_eq!(current_word("echo hé"), "hé");
        assert_eq!(current_word("echo "), "");
        assert_eq!(floor_char_boundary("é", 1), 0);
        assert_eq!(floor_char_boundary("ab", 10), 2);
    }

    #[test]
    fn test_out_of_range_cursor_is_clamped_before_replacing() {
        let res = CompletionResult {
            candidates: vec!["héllo".into()],
            replace_len: 2,
        };
        let line = "echo hé";
        assert_eq!(res.replace_start(line, 99), 5);
        assert_eq!(res.apply(line, 99, "héllo"), "echo héllo");

        let one = CompletionResult {
            candidates: vec!["hi".into()],
            replace_len: 1,
        };
        // Byte 7 is inside `é`; the cursor falls back to byte 6.
        assert_eq!(one.replace_start(line, 7), 5);
        assert_eq!(one.apply(line, 7, "hi"), "echo hié");
    }
}
