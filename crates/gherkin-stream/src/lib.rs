#![doc = include_str!("../README.md")]

mod parser;
mod scanner;
mod token;

pub use parser::{Builder, CompositeParserError, ParseError, Parser};
pub use token::{LineItem, Token, TokenKind};
