//! Git lookups used by completion and by the prompt.

use std::process::{Command, Stdio};

/// Source of branch, remote and ref names for git completion.
pub trait GitLookup {
    fn branches(&self) -> Vec<String>;

    fn remotes(&self) -> Vec<String>;

    /// `HEAD`, the branches and their `origin/` counterparts.
    fn refs(&self) -> Vec<String> {
        refs_from(&self.branches())
    }

    /// Files with unstaged changes, or `None` when unknown.
    fn modified_files(&self) -> Option<Vec<String>> {
        None
    }
}

/// Fixed lists used when no repository information is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticGit;

const STATIC_BRANCHES: &[&str] = &["main", "master", "develop", "feature/", "bugfix/", "hotfix/"];
const STATIC_REMOTES: &[&str] = &["origin", "upstream"];
const STATIC_REFS: &[&str] = &[
    "HEAD",
    "main",
    "master",
    "develop",
    "origin/main",
    "origin/master",
];

fn refs_from(branches: &[String]) -> Vec<String> {
    let mut refs = Vec::with_capacity(branches.len() * 2 + 1);
    refs.push("HEAD".to_string());
    refs.extend(branches.iter().cloned());
    refs.extend(branches.iter().map(|b| format!("origin/{b}")));
    refs
}

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl GitLookup for StaticGit {
    fn branches(&self) -> Vec<String> {
        owned(STATIC_BRANCHES)
    }

    fn remotes(&self) -> Vec<String> {
        owned(STATIC_REMOTES)
    }

    fn refs(&self) -> Vec<String> {
        owned(STATIC_REFS)
    }
}

/// Repository summary rendered by the `%g` prompt escape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitInfo {
    pub branch: String,
    pub has_uncommitted: bool,
    pub has_untracked: bool,
    pub has_staged: bool,
    pub ahead: u32,
    pub behind: u32,
}

/// Asks the `git` binary, in the current directory, falling back to
/// [`StaticGit`] when that fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiveGit;

impl LiveGit {
    fn git_lines(args: &[&str]) -> Option<Vec<String>> {
        let output = Command::new("git")
            .args(args)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .ok()?;
        if !output.status.success() {
            tracing::debug!(?args, status = ?output.status, "git lookup failed");
            return None;
        }
        Some(
            String::from_utf8_lossy(&output.stdout)
                .lines()
                .map(str::trim_end)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    fn is_repo() -> bool {
        Self::git_lines(&["rev-parse", "--git-dir"]).is_some()
    }

    /// Current repository state, or `None` outside a work tree.
    pub fn info(&self) -> Option<GitInfo> {
        if !Self::is_repo() {
            return None;
        }
        let mut info = GitInfo {
            branch: Self::current_branch().unwrap_or_default(),
            ..GitInfo::default()
        };
        if let Some(status) = Self::git_lines(&["status", "--porcelain"]) {
            apply_porcelain(&mut info, &status);
        }
        if let Some(counts) =
            Self::git_lines(&["rev-list", "--count", "--left-right", "@{upstream}...HEAD"])
        {
            if let Some((behind, ahead)) = parse_left_right(counts.first().map_or("", |s| s)) {
                info.behind = behind;
                info.ahead = ahead;
            }
        }
        Some(info)
    }

    fn current_branch() -> Option<String> {
        if let Some(name) = Self::git_lines(&["symbolic-ref", "--short", "HEAD"]) {
            return name.into_iter().next();
        }
        let hash = Self::git_lines(&["rev-parse", "--short", "HEAD"])?;
        hash.into_iter().next().map(|h| format!("({h})"))
    }
}

impl GitLookup for LiveGit {
    fn branches(&self) -> Vec<String> {
        Self::git_lines(&["branch", "--format=%(refname:short)"])
            .unwrap_or_else(|| StaticGit.branches())
    }

    fn remotes(&self) -> Vec<String> {
        Self::git_lines(&["remote"]).unwrap_or_else(|| StaticGit.remotes())
    }

    fn refs(&self) -> Vec<String> {
        match Self::git_lines(&["branch", "--format=%(refname:short)"]) {
            Some(branches) => refs_from(&branches),
            None => StaticGit.refs(),
        }
    }

    fn modified_files(&self) -> Option<Vec<String>> {
        Self::git_lines(&["diff", "--name-only", "--relative"])
    }
}

/// Folds `git status --porcelain` lines into the change flags of `info`.
pub fn apply_porcelain(info: &mut GitInfo, lines: &[String]) {
    for line in lines {
        let mut chars = line.chars();
        let (Some(staged), Some(unstaged)) = (chars.next(), chars.next()) else {
            continue;
        };
        if staged == '?' && unstaged == '?' {
            info.has_untracked = true;
            continue;
        }
        if staged != ' ' {
            info.has_staged = true;
        }
        if unstaged != ' ' {
            info.has_uncommitted = true;
        }
    }
}

/// Parses `behind<TAB>ahead` as printed by `git rev-list --left-right --count`.
pub fn parse_left_right(line: &str) -> Option<(u32, u32)> {
    let mut parts = line.split_whitespace();
    let behind = parts.next()?.parse().ok()?;
    let ahead = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((behind, ahead))
}
