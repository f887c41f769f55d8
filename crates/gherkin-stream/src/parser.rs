use core::fmt;

use anyhow::Result;

use crate::scanner;
use crate::token::{Token, TokenKind};

/// Receiver of the token stream. One `build` call per source line,
/// then one for the EOF token.
pub trait Builder {
    /// Receive the next token. `None` is a protocol violation the
    /// builder reports as an error.
    ///
    /// # Errors
    ///
    /// Implementations may fail the parse by returning an error; it
    /// aborts tokenization immediately.
    fn build(&mut self, token: Option<Token>) -> Result<bool>;

    /// # Errors
    ///
    /// Must succeed; part of the callback surface for parity with
    /// grammar-driven consumers.
    fn start_rule(&mut self) -> Result<bool>;

    /// # Errors
    ///
    /// Must succeed; see [`Builder::start_rule`].
    fn end_rule(&mut self) -> Result<bool>;

    fn reset(&mut self);
}

/// A single parse error with its one-based source location.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("({line}:{column}): {message}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

/// All parse errors of one run, rendered under a `Parser errors:`
/// heading like the upstream Cucumber parsers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeParserError {
    pub errors: Vec<ParseError>,
}

impl fmt::Display for CompositeParserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parser errors:")?;
        for error in &self.errors {
            write!(f, "\n{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for CompositeParserError {}

// Expected-set strings shown in parse errors, in the order the
// upstream parser lists them.
const EXPECTED_AT_START: &str = "#EOF, #Language, #TagLine, #FeatureLine, #Comment, #Empty";
const EXPECTED_IN_DOCSTRING: &str = "#DocStringSeparator, #Other";

/// Feeds scanned tokens to a [`Builder`], enforcing the pre-feature
/// grammar and collecting located errors.
///
/// Everything after the feature line is accepted as-is: the stream
/// consumer is a formatter, not a linter, and the upstream parser
/// has already shaped the token kinds.
pub struct Parser<B> {
    builder: B,
    stop_at_first_error: bool,
}

impl<B: Builder> Parser<B> {
    pub fn new(builder: B) -> Self {
        Self {
            builder,
            stop_at_first_error: false,
        }
    }

    pub fn stop_at_first_error(&mut self, stop: bool) {
        self.stop_at_first_error = stop;
    }

    /// Tokenize `content` and stream it into the builder.
    ///
    /// # Errors
    ///
    /// Returns a [`CompositeParserError`] when the content violates
    /// the grammar, or the builder's own error if a callback fails.
    pub fn parse(&mut self, content: &str) -> Result<()> {
        self.builder.reset();
        self.builder.start_rule()?;

        let scanned = scanner::scan(content);
        let mut errors = Vec::new();
        let mut seen_feature = false;

        for token in scanned.tokens {
            if let Some(error) = check_token(&token, seen_feature, content) {
                errors.push(error);
                if self.stop_at_first_error {
                    break;
                }
                continue;
            }
            seen_feature = seen_feature || token.kind == TokenKind::FeatureLine;
            self.builder.build(Some(token))?;
        }

        if scanned.open_docstring.is_some() && !(self.stop_at_first_error && !errors.is_empty()) {
            errors.push(ParseError {
                line: scanned.line_count + 1,
                column: 0,
                message: format!("unexpected end of file, expected: {EXPECTED_IN_DOCSTRING}"),
            });
        }

        if !errors.is_empty() {
            return Err(CompositeParserError { errors }.into());
        }

        self.builder.build(Some(Token::eof(scanned.line_count + 1)))?;
        self.builder.end_rule()?;
        Ok(())
    }

    pub fn into_builder(self) -> B {
        self.builder
    }
}

fn check_token(token: &Token, seen_feature: bool, content: &str) -> Option<ParseError> {
    if seen_feature {
        return None;
    }
    match token.kind {
        TokenKind::FeatureLine
        | TokenKind::TagLine
        | TokenKind::Comment
        | TokenKind::Empty
        | TokenKind::Eof => None,
        TokenKind::Language => {
            if token.text == "en" {
                None
            } else {
                Some(ParseError {
                    line: token.line,
                    column: 1,
                    message: format!("Language not supported: {}", token.text),
                })
            }
        }
        _ => {
            let raw = content.split('\n').nth(token.line - 1).unwrap_or_default();
            let column = raw.chars().take_while(|c| c.is_whitespace()).count() + 1;
            Some(ParseError {
                line: token.line,
                column,
                message: format!(
                    "expected: {EXPECTED_AT_START}, got '{}'",
                    raw.trim()
                ),
            })
        }
    }
}
