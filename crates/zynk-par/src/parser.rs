//! Statement-level parsing.
//!
//! The expression grammar lives in [`crate::expr`]; this module owns the
//! `Parser` state and everything from statements upward.

use std::rc::Rc;

use zynk_lex::{Token, TokenKind};
use zynk_util::{Result, ZynkError};

use crate::ast::{FunctionCall, FunctionDecl, If, Param, Program, Stmt, ValueType, While};
use crate::expr::bp;

/// The Zynk parser.
pub struct Parser {
    /// Token stream from the lexer, terminated by `Eof`.
    pub(crate) tokens: Vec<Token>,

    /// Current position in the token stream.
    pub(crate) position: usize,
}

impl Parser {
    /// Creates a parser over a token stream.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// Parses a complete program.
    pub fn parse(&mut self) -> Result<Program> {
        let mut body = Vec::new();
        while !self.is_eof() {
            body.push(self.parse_statement()?);
        }
        Ok(Program { body })
    }

    /// Parses a single statement at the current position.
    pub fn parse_statement(&mut self) -> Result<Stmt> {
        let current = self.current();
        match current.kind {
            TokenKind::Def => self.parse_function_declaration(),
            TokenKind::Var => self.parse_variable_declaration(),
            TokenKind::Print => self.parse_print(false),
            TokenKind::Println => self.parse_print(true),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Break => {
                let line = current.line;
                self.advance();
                self.expect(TokenKind::Semicolon, ";")?;
                Ok(Stmt::Break { line })
            }
            TokenKind::Return => self.parse_return(),
            TokenKind::ReadInput => {
                let line = current.line;
                self.advance();
                let prompt = self.parse_read_arguments()?;
                self.expect(TokenKind::Semicolon, ";")?;
                Ok(Stmt::ReadInput { prompt, line })
            }
            // An identifier opens either a call statement or an assignment;
            // one token of lookahead decides which.
            TokenKind::Identifier => match self.peek_kind(1) {
                TokenKind::LParen => {
                    let call = self.parse_call()?;
                    self.expect(TokenKind::Semicolon, ";")?;
                    Ok(Stmt::FunctionCall(call))
                }
                TokenKind::Assign => self.parse_assignment(),
                _ => Err(ZynkError::unknown(
                    format!("Not implemented: '{}'.", current.text),
                    current.line,
                )),
            },
            _ => Err(ZynkError::unknown(
                format!("Not implemented: '{}'.", current.text),
                current.line,
            )),
        }
    }

    /// `def name(param: type, ...) -> type { body }`
    fn parse_function_declaration(&mut self) -> Result<Stmt> {
        let line = self.current().line;
        self.expect(TokenKind::Def, "def")?;

        let name = self.expect(TokenKind::Identifier, "identifier")?.text;
        self.expect(TokenKind::LParen, "(")?;

        let mut params = Vec::new();
        if self.current().kind != TokenKind::RParen {
            loop {
                let param = self.expect(TokenKind::Identifier, "identifier")?;
                self.expect(TokenKind::Colon, ":")?;
                let value_type = self.parse_type()?;
                params.push(Param {
                    name: param.text,
                    value_type,
                    line: param.line,
                });
                if !self.match_kind(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, ")")?;

        // There is no arrow token in the language; the return type clause
        // is the two tokens '-' '>' followed by a type name.
        let return_type = if self.match_kind(TokenKind::Minus) {
            self.expect(TokenKind::Gt, ">")?;
            self.parse_return_type()?
        } else {
            ValueType::None
        };

        self.expect(TokenKind::LBrace, "{")?;
        let mut body = Vec::new();
        while self.current().kind != TokenKind::RBrace && !self.is_eof() {
            body.push(self.parse_statement()?);
        }
        self.expect(TokenKind::RBrace, "}")?;

        Ok(Stmt::FunctionDecl(Rc::new(FunctionDecl {
            name,
            params,
            return_type,
            body,
            line,
        })))
    }

    /// `var name: type (= expr)?;`
    fn parse_variable_declaration(&mut self) -> Result<Stmt> {
        let line = self.current().line;
        self.expect(TokenKind::Var, "var")?;

        let name = self.expect(TokenKind::Identifier, "identifier")?.text;
        self.expect(TokenKind::Colon, ":")?;
        let declared = self.parse_type()?;

        let value = if self.match_kind(TokenKind::Assign) {
            Some(self.parse_expression_bp(bp::MIN)?)
        } else {
            None
        };
        self.expect(TokenKind::Semicolon, ";")?;

        Ok(Stmt::VarDecl {
            name,
            declared,
            value,
            line,
        })
    }

    /// `name = expr;`
    fn parse_assignment(&mut self) -> Result<Stmt> {
        let name_token = self.expect(TokenKind::Identifier, "identifier")?;
        self.expect(TokenKind::Assign, "=")?;
        let value = self.parse_expression_bp(bp::MIN)?;
        self.expect(TokenKind::Semicolon, ";")?;

        Ok(Stmt::VarAssign {
            name: name_token.text,
            value,
            line: name_token.line,
        })
    }

    /// `print(expr);` / `println(expr);`
    fn parse_print(&mut self, newline: bool) -> Result<Stmt> {
        let line = self.current().line;
        self.advance();

        self.expect(TokenKind::LParen, "(")?;
        let expr = self.parse_expression_bp(bp::MIN)?;
        self.expect(TokenKind::RParen, ")")?;
        self.expect(TokenKind::Semicolon, ";")?;

        Ok(Stmt::Print {
            expr,
            newline,
            line,
        })
    }

    /// `if (cond) block (else block)?`
    fn parse_if(&mut self) -> Result<Stmt> {
        let line = self.current().line;
        self.advance();

        self.expect(TokenKind::LParen, "(")?;
        let condition = self.parse_expression_bp(bp::MIN)?;
        self.expect(TokenKind::RParen, ")")?;

        let body = self.parse_block()?;
        let else_body = if self.match_kind(TokenKind::Else) {
            self.parse_block()?
        } else {
            Vec::new()
        };

        Ok(Stmt::If(If {
            condition,
            body,
            else_body,
            line,
        }))
    }

    /// `while (cond) block`
    fn parse_while(&mut self) -> Result<Stmt> {
        let line = self.current().line;
        self.advance();

        self.expect(TokenKind::LParen, "(")?;
        let condition = self.parse_expression_bp(bp::MIN)?;
        self.expect(TokenKind::RParen, ")")?;
        let body = self.parse_block()?;

        Ok(Stmt::While(While {
            condition,
            body,
            line,
        }))
    }

    /// `return expr?;`
    fn parse_return(&mut self) -> Result<Stmt> {
        let line = self.current().line;
        self.advance();

        let value = if self.current().kind != TokenKind::Semicolon {
            Some(self.parse_expression_bp(bp::MIN)?)
        } else {
            None
        };
        self.expect(TokenKind::Semicolon, ";")?;

        Ok(Stmt::Return { value, line })
    }

    /// A braced statement list, or a single statement.
    fn parse_block(&mut self) -> Result<Vec<Stmt>> {
        if self.match_kind(TokenKind::LBrace) {
            let mut body = Vec::new();
            while self.current().kind != TokenKind::RBrace && !self.is_eof() {
                body.push(self.parse_statement()?);
            }
            self.expect(TokenKind::RBrace, "}")?;
            Ok(body)
        } else {
            Ok(vec![self.parse_statement()?])
        }
    }

    /// `name(arg, ...)` with the parser positioned on the name.
    pub(crate) fn parse_call(&mut self) -> Result<FunctionCall> {
        let name_token = self.expect(TokenKind::Identifier, "identifier")?;
        self.expect(TokenKind::LParen, "(")?;

        let mut args = Vec::new();
        if self.current().kind != TokenKind::RParen {
            loop {
                args.push(self.parse_expression_bp(bp::MIN)?);
                if !self.match_kind(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, ")")?;

        Ok(FunctionCall {
            name: name_token.text,
            args,
            line: name_token.line,
        })
    }

    /// The parenthesized optional prompt of `readInput`, with the parser
    /// positioned just past the keyword.
    pub(crate) fn parse_read_arguments(&mut self) -> Result<Option<crate::ast::Expr>> {
        self.expect(TokenKind::LParen, "(")?;
        let prompt = if self.current().kind != TokenKind::RParen {
            Some(self.parse_expression_bp(bp::MIN)?)
        } else {
            None
        };
        self.expect(TokenKind::RParen, ")")?;
        Ok(prompt)
    }

    /// A concrete type name: `int`, `float`, `string` or `bool`.
    fn parse_type(&mut self) -> Result<ValueType> {
        let token = self.current();
        let value_type = match token.kind {
            TokenKind::KwInt => ValueType::Integer,
            TokenKind::KwFloat => ValueType::Float,
            TokenKind::KwString => ValueType::String,
            TokenKind::KwBool => ValueType::Bool,
            _ => {
                return Err(ZynkError::type_error(
                    format!(
                        "Expected: String, bool, float or int. Found: '{}' instead.",
                        token.text
                    ),
                    token.line,
                ))
            }
        };
        self.advance();
        Ok(value_type)
    }

    /// A return type: any concrete type, or `null` for value-less functions.
    fn parse_return_type(&mut self) -> Result<ValueType> {
        if self.current().kind == TokenKind::Null {
            self.advance();
            return Ok(ValueType::None);
        }
        self.parse_type()
    }

    // =========================================================================
    // Token stream helpers
    // =========================================================================

    /// The token at the current position (`Eof` past the end).
    pub(crate) fn current(&self) -> Token {
        match self.tokens.get(self.position) {
            Some(token) => token.clone(),
            None => Token::new(TokenKind::Eof, "EOF", self.last_line()),
        }
    }

    /// The kind of the token `offset` positions ahead.
    pub(crate) fn peek_kind(&self, offset: usize) -> TokenKind {
        self.tokens
            .get(self.position + offset)
            .map(|token| token.kind)
            .unwrap_or(TokenKind::Eof)
    }

    /// True once the parser sits on the `Eof` token.
    pub(crate) fn is_eof(&self) -> bool {
        self.current().kind == TokenKind::Eof
    }

    /// Moves past the current token.
    pub(crate) fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    /// Consumes the current token if it has the given kind.
    pub(crate) fn match_kind(&mut self, kind: TokenKind) -> bool {
        if self.current().kind == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consumes a token of the given kind or fails with a `SyntaxError`.
    pub(crate) fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token> {
        let token = self.current();
        if token.kind == kind {
            self.advance();
            return Ok(token);
        }
        Err(ZynkError::syntax(
            format!("Expected '{}', found: '{}' instead.", expected, token.text),
            token.line,
        ))
    }

    fn last_line(&self) -> u32 {
        self.tokens.last().map(|token| token.line).unwrap_or(1)
    }
}
