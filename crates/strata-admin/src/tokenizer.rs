//! Splits a typed line into a fixed-width command.

/// Number of token slots every command carries.
pub(crate) const MAX_TOKENS: usize = 20;
/// Longest line accepted from the terminal, in bytes.
pub(crate) const MAX_LINE_BYTES: usize = 2999;

/// A verb and its positional arguments. Unused slots are empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Command {
    tokens: Vec<String>,
}

impl Command {
    /// Build a command from words, dropping anything past [`MAX_TOKENS`].
    pub(crate) fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tokens: Vec<String> = words.into_iter().take(MAX_TOKENS).map(Into::into).collect();
        tokens.resize(MAX_TOKENS, String::new());
        Self { tokens }
    }

    /// What end-of-input turns into.
    pub(crate) fn quit() -> Self {
        Self::from_words(["quit"])
    }

    pub(crate) fn verb(&self) -> &str {
        self.arg(0)
    }

    /// Token at `index`; `""` when unused.
    pub(crate) fn arg(&self, index: usize) -> &str {
        self.tokens.get(index).map_or("", String::as_str)
    }

    /// Leading tokens up to the first empty slot.
    pub(crate) fn words(&self) -> impl Iterator<Item = &str> {
        self.tokens
            .iter()
            .map(String::as_str)
            .take_while(|token| !token.is_empty())
    }
}

impl Default for Command {
    fn default() -> Self {
        Self::from_words(std::iter::empty::<String>())
    }
}

#[derive(Clone, Copy)]
enum State {
    Between,
    Bare,
    Quoted(char),
}

/// Tokenize one line of input.
///
/// Spaces separate bare words. A token opened by `'` or `"` runs to the
/// matching quote, spaces included. The first newline, or the end of the
/// string, ends the command.
pub(crate) fn tokenize(line: &str, max_tokens: usize) -> Command {
    let line = truncate(line, MAX_LINE_BYTES);
    let line = line.split('\n').next().unwrap_or_default();
    let line = line.strip_suffix('\r').unwrap_or(line);

    let mut tokens = Vec::new();
    let mut state = State::Between;
    let mut start = 0;
    for (index, ch) in line.char_indices() {
        let next = index + ch.len_utf8();
        match state {
            State::Between => match ch {
                '\'' | '"' => {
                    state = State::Quoted(ch);
                    start = next;
                }
                ' ' => start = next,
                _ => state = State::Bare,
            },
            State::Bare if ch == ' ' => {
                tokens.push(&line[start..index]);
                start = next;
                state = State::Between;
            }
            State::Quoted(quote) if ch == quote => {
                tokens.push(&line[start..index]);
                start = next;
                state = State::Between;
            }
            State::Bare | State::Quoted(_) => {}
        }
    }
    tokens.push(&line[start..]);

    Command::from_words(tokens.into_iter().take(max_tokens.min(MAX_TOKENS)))
}

fn truncate(line: &str, max_bytes: usize) -> &str {
    if line.len() <= max_bytes {
        return line;
    }
    let mut end = max_bytes;
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    &line[..end]
}
