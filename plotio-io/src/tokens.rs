//! Whitespace tokenizer shared by the text formats

use plotio_core::{Error, Result};
use std::iter::Peekable;
use std::str::FromStr;

/// Whitespace tokens paired with their 1-based line number
pub(crate) struct Tokens<'a> {
    inner: Peekable<Box<dyn Iterator<Item = (usize, &'a str)> + 'a>>,
    line: usize,
}

impl<'a> Tokens<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self::starting_at(text, 1)
    }

    /// Tokenize `text` whose first line is line `first_line` of the file
    pub(crate) fn starting_at(text: &'a str, first_line: usize) -> Self {
        let inner: Box<dyn Iterator<Item = (usize, &'a str)> + 'a> = Box::new(
            text.lines()
                .enumerate()
                .flat_map(move |(i, line)| line.split_whitespace().map(move |t| (i + first_line, t))),
        );
        Self {
            inner: inner.peekable(),
            line: first_line,
        }
    }

    /// Line of the last token handed out
    pub(crate) fn line(&self) -> usize {
        self.line
    }

    pub(crate) fn peek(&mut self) -> Option<&'a str> {
        self.inner.peek().map(|&(_, t)| t)
    }

    pub(crate) fn word(&mut self) -> Option<&'a str> {
        let (line, token) = self.inner.next()?;
        self.line = line;
        Some(token)
    }

    pub(crate) fn expect_word(&mut self, what: &str) -> Result<&'a str> {
        self.word()
            .ok_or_else(|| Error::parse(self.line, format!("unexpected end of file, expected {}", what)))
    }

    pub(crate) fn next<T: FromStr>(&mut self, what: &str) -> Result<T> {
        let token = self.expect_word(what)?;
        token
            .parse()
            .map_err(|_| Error::parse(self.line, format!("invalid {} '{}'", what, token)))
    }

    pub(crate) fn skip(&mut self, count: usize, what: &str) -> Result<()> {
        for _ in 0..count {
            self.expect_word(what)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_numbers_follow_tokens() {
        let mut tokens = Tokens::starting_at("1 2\n\n x", 5);
        assert_eq!(tokens.next::<u32>("a").unwrap(), 1);
        assert_eq!(tokens.next::<u32>("b").unwrap(), 2);
        assert_eq!(tokens.line(), 5);
        assert_eq!(tokens.peek(), Some("x"));
        match tokens.next::<u32>("c").unwrap_err() {
            Error::Parse { line, .. } => assert_eq!(line, 7),
            other => panic!("unexpected error {:?}", other),
        }
        assert!(tokens.word().is_none());
    }
}
