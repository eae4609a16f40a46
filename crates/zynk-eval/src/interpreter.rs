//! The interpreter front door: source text in, effects out.

use std::fs;
use std::path::Path;

use zynk_lex::Lexer;
use zynk_par::Parser;
use zynk_util::{Result, ZynkError};

use crate::evaluator::Evaluator;

/// Runs Zynk programs through the full lex -> parse -> evaluate pipeline.
#[derive(Debug, Default)]
pub struct Interpreter;

impl Interpreter {
    /// Creates an interpreter.
    pub fn new() -> Self {
        Self
    }

    /// Interprets a source string.
    pub fn interpret(&self, source: &str) -> Result<()> {
        let tokens = Lexer::new(source).tokenize();
        tracing::debug!(tokens = tokens.len(), "tokenized source");

        let program = Parser::new(tokens).parse()?;
        tracing::debug!(statements = program.body.len(), "parsed program");

        let mut evaluator = Evaluator::new();
        evaluator.evaluate(&program)
    }

    /// Loads and interprets a script file.
    pub fn interpret_file(&self, path: &Path) -> Result<()> {
        let source =
            fs::read_to_string(path).map_err(|_| ZynkError::file_open("Failed to open a file."))?;
        self.interpret(&source)
    }
}
