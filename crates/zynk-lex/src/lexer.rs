//! The Zynk lexer.
//!
//! Transforms source text into a `Vec<Token>` terminated by `Eof`. The
//! lexer never fails: unrecognized input is emitted as `Unknown` tokens
//! and left for the parser to reject.

use crate::cursor::Cursor;
use crate::token::{keyword_from_ident, Token, TokenKind};

/// The lexer state machine.
///
/// # Example
///
/// ```
/// use zynk_lex::{Lexer, TokenKind};
///
/// let tokens = Lexer::new("println(10);").tokenize();
/// let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
/// assert_eq!(
///     kinds,
///     vec![
///         TokenKind::Println,
///         TokenKind::LParen,
///         TokenKind::Int,
///         TokenKind::RParen,
///         TokenKind::Semicolon,
///         TokenKind::Eof,
///     ]
/// );
/// ```
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer over `source`.
    pub fn new(source: &'a str) -> Self {
        Self {
            cursor: Cursor::new(source),
        }
    }

    /// Consumes the whole input and returns the token stream.
    ///
    /// The result always holds at least one token and always ends with
    /// `Eof`.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }

    /// Scans and returns the next token.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        if self.cursor.is_at_end() {
            return Token::new(TokenKind::Eof, "EOF", self.cursor.line());
        }

        match self.cursor.current_char() {
            '"' => self.lex_string(),
            c if c.is_ascii_alphabetic() || c == '_' => self.lex_identifier(),
            c if c.is_ascii_digit() => self.lex_number(),
            _ => self.lex_operator(),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.cursor.current_char().is_whitespace() && !self.cursor.is_at_end() {
            self.cursor.advance();
        }
    }

    /// Scans an identifier or keyword: `[A-Za-z_][A-Za-z0-9_]*`.
    fn lex_identifier(&mut self) -> Token {
        let start = self.cursor.position();
        while matches!(self.cursor.current_char(), c if c.is_ascii_alphanumeric() || c == '_') {
            self.cursor.advance();
        }
        let text = self.cursor.slice_from(start);
        let line = self.cursor.line();

        match keyword_from_ident(text) {
            Some(kind) => Token::new(kind, text, line),
            None => Token::new(TokenKind::Identifier, text, line),
        }
    }

    /// Scans a numeric literal: digits with optional `.` separators.
    ///
    /// Any lexeme containing a dot is a float literal, everything else an
    /// integer literal.
    fn lex_number(&mut self) -> Token {
        let start = self.cursor.position();
        while matches!(self.cursor.current_char(), c if c.is_ascii_digit() || c == '.') {
            self.cursor.advance();
        }
        let text = self.cursor.slice_from(start);
        let line = self.cursor.line();

        if text.contains('.') {
            Token::new(TokenKind::Float, text, line)
        } else {
            Token::new(TokenKind::Int, text, line)
        }
    }

    /// Scans a string literal. No escape sequences are processed; the
    /// quotes are stripped from the token text.
    fn lex_string(&mut self) -> Token {
        self.cursor.advance(); // opening quote

        let start = self.cursor.position();
        while self.cursor.current_char() != '"' && !self.cursor.is_at_end() {
            self.cursor.advance();
        }

        if self.cursor.is_at_end() {
            return Token::new(TokenKind::Unknown, "Unterminated string", self.cursor.line());
        }

        let text = self.cursor.slice_from(start).to_owned();
        self.cursor.advance(); // closing quote
        Token::new(TokenKind::Str, text, self.cursor.line())
    }

    /// Scans punctuation and operators, including the two-character forms.
    fn lex_operator(&mut self) -> Token {
        let c = self.cursor.current_char();
        self.cursor.advance();
        let line = self.cursor.line();

        match c {
            ',' => Token::new(TokenKind::Comma, ",", line),
            ':' => Token::new(TokenKind::Colon, ":", line),
            ';' => Token::new(TokenKind::Semicolon, ";", line),
            '{' => Token::new(TokenKind::LBrace, "{", line),
            '}' => Token::new(TokenKind::RBrace, "}", line),
            '(' => Token::new(TokenKind::LParen, "(", line),
            ')' => Token::new(TokenKind::RParen, ")", line),
            '+' => Token::new(TokenKind::Plus, "+", line),
            '-' => Token::new(TokenKind::Minus, "-", line),
            '*' => Token::new(TokenKind::Star, "*", line),
            '/' => {
                if self.cursor.match_char('/') {
                    // Line comment: discard the rest of the line.
                    while self.cursor.current_char() != '\n' && !self.cursor.is_at_end() {
                        self.cursor.advance();
                    }
                    return self.next_token();
                }
                Token::new(TokenKind::Slash, "/", line)
            }
            '=' => {
                if self.cursor.match_char('=') {
                    Token::new(TokenKind::EqEq, "==", line)
                } else {
                    Token::new(TokenKind::Assign, "=", line)
                }
            }
            '<' => {
                if self.cursor.match_char('=') {
                    Token::new(TokenKind::LtEq, "<=", line)
                } else {
                    Token::new(TokenKind::Lt, "<", line)
                }
            }
            '>' => {
                if self.cursor.match_char('=') {
                    Token::new(TokenKind::GtEq, ">=", line)
                } else {
                    Token::new(TokenKind::Gt, ">", line)
                }
            }
            '!' => {
                if self.cursor.match_char('=') {
                    Token::new(TokenKind::NotEq, "!=", line)
                } else {
                    Token::new(TokenKind::Unknown, "!", line)
                }
            }
            '|' => {
                if self.cursor.match_char('|') {
                    Token::new(TokenKind::Or, "||", line)
                } else {
                    Token::new(TokenKind::Unknown, "|", line)
                }
            }
            '&' => {
                if self.cursor.match_char('&') {
                    Token::new(TokenKind::And, "&&", line)
                } else {
                    Token::new(TokenKind::Unknown, "&", line)
                }
            }
            c => Token::new(TokenKind::Unknown, c.to_string(), line),
        }
    }
}
