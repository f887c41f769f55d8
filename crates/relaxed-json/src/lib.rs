#![doc = include_str!("../README.md")]

mod indent;
mod scanner;

pub use indent::{compact, indent};
pub use scanner::{Class, Scanner, SyntaxError, valid};
