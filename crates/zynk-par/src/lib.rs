//! zynk-par - Parsing for the Zynk language.
//!
//! Consumes the token stream produced by `zynk-lex` and builds the typed
//! AST defined in [`ast`]. Statements are parsed by recursive descent with
//! one token of lookahead; expressions use a Pratt parser driven by the
//! binding powers in [`expr::bp`].
//!
//! Parsing is fail-fast: the first unexpected token aborts with a
//! `SyntaxError` / `ExpressionError` / `TypeError` carrying the offending
//! token's line.
//!
//! # Example
//!
//! ```
//! use zynk_lex::Lexer;
//! use zynk_par::Parser;
//!
//! let tokens = Lexer::new("var a: int = 1 + 2;").tokenize();
//! let program = Parser::new(tokens).parse().unwrap();
//! assert_eq!(program.body.len(), 1);
//! ```

pub mod ast;
pub mod expr;
mod parser;

pub use parser::Parser;
