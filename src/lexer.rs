//! Lexical analysis of one input line into fully unescaped shell words.

use crate::error::ShellError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexingState {
    Start,
    ReadingWord,
    /// Inside a quoted region closed by the contained character.
    ReadingQuote(char),
}

struct LexingFSM {
    input: Vec<char>,
    pos: usize,
    state: LexingState,
    escaped: bool,
    buffer: String,
}

impl LexingFSM {
    fn new(line: &str) -> Self {
        LexingFSM {
            input: line.chars().collect(),
            pos: 0,
            state: LexingState::Start,
            escaped: false,
            buffer: String::new(),
        }
    }

    /// Runs the machine over the whole input.
    ///
    /// A backslash escapes the next character in every state, quotes are never
    /// part of a word and unquoted blanks separate words.
    fn make_tokens(&mut self) -> Result<Vec<String>, ShellError> {
        let mut out = Vec::new();

        while let Some(ch) = self.read_char() {
            if self.escaped {
                self.buffer.push(ch);
                self.escaped = false;
                if self.state == LexingState::Start {
                    self.state = LexingState::ReadingWord;
                }
                continue;
            }
            if ch == '\\' {
                self.escaped = true;
                continue;
            }
            match self.state {
                LexingState::Start => self.handle_start(ch),
                LexingState::ReadingWord => self.handle_word(ch, &mut out),
                LexingState::ReadingQuote(close) => self.handle_quote(ch, close),
            }
        }

        if let LexingState::ReadingQuote(_) = self.state {
            return Err(ShellError::UnclosedQuote);
        }

        // A trailing lone backslash has nothing to escape and is dropped.
        self.finalize_word(&mut out);
        Ok(out)
    }

    fn read_char(&mut self) -> Option<char> {
        let ch = self.input.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn handle_start(&mut self, ch: char) {
        match ch {
            ' ' | '\t' => {}
            '"' | '\'' => self.state = LexingState::ReadingQuote(ch),
            c => {
                self.buffer.push(c);
                self.state = LexingState::ReadingWord;
            }
        }
    }

    fn handle_word(&mut self, ch: char, out: &mut Vec<String>) {
        match ch {
            ' ' | '\t' => {
                self.finalize_word(out);
                self.state = LexingState::Start;
            }
            '"' | '\'' => self.state = LexingState::ReadingQuote(ch),
            c => self.buffer.push(c),
        }
    }

    fn handle_quote(&mut self, ch: char, close: char) {
        if ch == close {
            self.state = LexingState::ReadingWord;
        } else {
            self.buffer.push(ch);
        }
    }

    /// Empty words (e.g. a bare `""`) are not emitted.
    fn finalize_word(&mut self, out: &mut Vec<String>) {
        if !self.buffer.is_empty() {
            out.push(std::mem::take(&mut self.buffer));
        }
    }
}

/// Splits `line` into words, honouring quotes and backslash escapes.
///
/// Fails with [`ShellError::UnclosedQuote`] when the line ends inside a quoted
/// region. Empty and blank-only input yields an empty vector.
pub fn tokenize(line: &str) -> Result<Vec<String>, ShellError> {
    let mut lexer = LexingFSM::new(line);
    lexer.make_tokens()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(line: &str) -> Vec<String> {
        tokenize(line).unwrap()
    }

    #[test]
    fn test_simple_words() {
        assert_eq!(toks("ls -la"), vec!["ls", "-la"]);
        assert_eq!(toks("  ls \t  -la   /tmp "), vec!["ls", "-la", "/tmp"]);
    }

    #[test]
    fn test_quotes_keep_whitespace() {
        assert_eq!(toks(r#"echo "hello world""#), vec!["echo", "hello world"]);
        assert_eq!(toks("echo 'hello world'"), vec!["echo", "hello world"]);
    }

    #[test]
    fn test_escaped_space_and_quote() {
        assert_eq!(toks(r"echo hello\ world"), vec!["echo", "hello world"]);
        assert_eq!(
            toks(r#"echo "hello \"world\"""#),
            vec!["echo", r#"hello "world""#]
        );
        assert_eq!(toks(r#"echo \"x"#), vec!["echo", "\"x"]);
    }

    #[test]
    fn test_other_quote_char_is_literal_inside_quotes() {
        assert_eq!(toks(r#"echo "it's""#), vec!["echo", "it's"]);
        assert_eq!(toks(r#"echo 'say "hi"'"#), vec!["echo", r#"say "hi""#]);
    }

    #[test]
    fn test_quotes_join_adjacent_text() {
        assert_eq!(toks(r#"a"b c"d"#), vec!["ab cd"]);
    }

    #[test]
    fn test_unclosed_quote_errors() {
        assert!(matches!(
            tokenize(r#"echo "unclosed"#),
            Err(ShellError::UnclosedQuote)
        ));
        assert!(matches!(
            tokenize("echo 'nope"),
            Err(ShellError::UnclosedQuote)
        ));
    }

    #[test]
    fn test_empty_and_blank_input() {
        assert!(toks("").is_empty());
        assert!(toks("   \t  ").is_empty());
        assert!(toks(r#""""#).is_empty());
    }

    #[test]
    fn test_trailing_backslash_is_dropped() {
        assert_eq!(toks(r"echo abc\"), vec!["echo", "abc"]);
        assert_eq!(toks(r"echo \"), vec!["echo"]);
    }

    #[test]
    fn test_unicode_words() {
        assert_eq!(toks("echo привет 'мир ок'"), vec!["echo", "привет", "мир ок"]);
    }

    #[test]
    fn test_rejoin_is_stable_for_plain_words() {
        let first = toks("git  commit   -m msg");
        let again = toks(&first.join(" "));
        assert_eq!(first, again);
    }
}
