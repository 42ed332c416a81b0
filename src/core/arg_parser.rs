// src/core/arg_parser.rs

//! Console line tokenizer.

/// One submitted console line, split into a command name and its raw arguments.
///
/// Tokens are separated by any run of whitespace. There is no quoting or
/// escaping, so an argument can never contain whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedInvocation<'a> {
    /// The command name, lowercased.
    pub command: String,
    /// Positional arguments, exactly as typed.
    pub args: Vec<&'a str>,
}

impl<'a> ParsedInvocation<'a> {
    /// Tokenizes a line. Returns `None` for empty or whitespace-only input.
    pub fn parse(line: &'a str) -> Option<Self> {
        let mut tokens = line.split_whitespace();
        let command = tokens.next()?.to_lowercase();
        let args = tokens.collect();

        Some(Self { command, args })
    }

    /// Number of positional arguments.
    pub fn arg_count(&self) -> usize {
        self.args.len()
    }
}
