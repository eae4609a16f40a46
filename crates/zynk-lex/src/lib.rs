//! zynk-lex - Lexical analysis for Zynk source code.
//!
//! The lexer transforms a source string into an ordered sequence of
//! line-tagged [`Token`]s, always terminated by an `Eof` token. It is a
//! deterministic single-pass scanner: whitespace is skipped, `//` comments
//! run to end of line, and anything unrecognizable becomes an `Unknown`
//! token instead of an error; whether an `Unknown` token is fatal is the
//! parser's call.
//!
//! # Example
//!
//! ```
//! use zynk_lex::{Lexer, TokenKind};
//!
//! let tokens = Lexer::new("var a: int = 5;").tokenize();
//! assert_eq!(tokens.first().unwrap().kind, TokenKind::Var);
//! assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
//! ```

pub mod cursor;
pub mod lexer;
pub mod token;

pub use cursor::Cursor;
pub use lexer::Lexer;
pub use token::{Token, TokenKind};
