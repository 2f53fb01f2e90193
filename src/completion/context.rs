/// What the word under the cursor is expected to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionContext {
    /// Nothing typed yet, or the first word is still being typed.
    EmptyOrFirstToken,
    /// `git <subcommand>` is still being typed.
    GitSubcommand,
    /// Argument of `checkout`, `co`, `switch`, `branch` or `merge`.
    GitBranchish,
    /// Argument of `add`.
    GitFileish,
    /// Argument of `commit`.
    GitCommitOption,
    /// Argument of `push` or `pull`.
    GitRemote,
    /// Argument of `remote`.
    GitRemoteSubcommand,
    /// Argument of `log`, `show` or `diff`.
    GitRef,
    GenericFile,
}

impl CompletionContext {
    /// Classifies the text before the cursor.
    ///
    /// Words are split on whitespace only; quotes are not interpreted.
    pub fn classify(before_cursor: &str) -> Self {
        let tokens: Vec<&str> = before_cursor.split_whitespace().collect();
        let at_word_boundary = before_cursor.ends_with(char::is_whitespace);

        match tokens.as_slice() {
            [] => CompletionContext::EmptyOrFirstToken,
            [_] if !at_word_boundary => CompletionContext::EmptyOrFirstToken,
            ["git"] => CompletionContext::GitSubcommand,
            ["git", _] if !at_word_boundary => CompletionContext::GitSubcommand,
            ["git", subcommand, ..] => Self::for_git_subcommand(subcommand),
            _ => CompletionContext::GenericFile,
        }
    }

    fn for_git_subcommand(subcommand: &str) -> Self {
        match subcommand {
            "checkout" | "co" | "switch" | "branch" | "merge" => CompletionContext::GitBranchish,
            "add" => CompletionContext::GitFileish,
            "commit" => CompletionContext::GitCommitOption,
            "push" | "pull" => CompletionContext::GitRemote,
            "remote" => CompletionContext::GitRemoteSubcommand,
            "log" | "show" | "diff" => CompletionContext::GitRef,
            _ => CompletionContext::GenericFile,
        }
    }
}
