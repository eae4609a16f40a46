//! Expression parsing using Pratt parsing (top-down operator precedence).
//!
//! # Operator precedence (lowest to highest)
//!
//! | Level | Operators | Associativity |
//! |-------|-----------|---------------|
//! | 1 | `\|\|` / `or` | Left |
//! | 2 | `&&` / `and` | Left |
//! | 3 | `==`, `!=` | Left |
//! | 4 | `<`, `<=`, `>`, `>=` | Left |
//! | 5 | `+`, `-` | Left |
//! | 6 | `*`, `/` | Left |
//! | 7 | unary `-` (folds into numeric literals) | - |

use zynk_lex::TokenKind;
use zynk_util::{Result, ZynkError};

use crate::ast::{BinOp, CmpOp, Expr, ValueType};
use crate::parser::Parser;

/// Binding power levels for Pratt parsing.
/// Higher numbers = tighter binding (higher precedence).
pub mod bp {
    /// Minimum binding power (start of expression).
    pub const MIN: u8 = 0;

    /// Logical OR: `||` / `or`.
    pub const LOGICAL_OR: u8 = 2;

    /// Logical AND: `&&` / `and`.
    pub const LOGICAL_AND: u8 = 4;

    /// Equality: `==`, `!=`.
    pub const EQUALITY: u8 = 6;

    /// Ordering: `<`, `<=`, `>`, `>=`.
    pub const COMPARISON: u8 = 8;

    /// Additive: `+`, `-`.
    pub const ADDITIVE: u8 = 10;

    /// Multiplicative: `*`, `/`.
    pub const MULTIPLICATIVE: u8 = 12;
}

impl Parser {
    /// Parses a complete expression.
    ///
    /// This is also the entry point for f-string holes, which are re-lexed
    /// and parsed as stand-alone expressions at evaluation time.
    pub fn parse_expression(&mut self) -> Result<Expr> {
        self.parse_expression_bp(bp::MIN)
    }

    /// The Pratt core: parses an expression consuming only operators whose
    /// left binding power is at least `min_bp`.
    ///
    /// Left-associativity comes from the right binding power being one
    /// higher than the left.
    pub(crate) fn parse_expression_bp(&mut self, min_bp: u8) -> Result<Expr> {
        let mut lhs = self.parse_primary()?;

        loop {
            let (lbp, rbp) = match self.infix_binding_power() {
                Some(bp) if bp.0 >= min_bp => bp,
                _ => break,
            };
            debug_assert!(rbp == lbp + 1);

            let op = self.current();
            self.advance();
            let rhs = self.parse_expression_bp(rbp)?;
            lhs = build_infix(op.kind, lhs, rhs, op.line);
        }

        Ok(lhs)
    }

    /// Binding powers `(left, right)` of the current token, when it is an
    /// infix operator.
    fn infix_binding_power(&self) -> Option<(u8, u8)> {
        let bp = match self.current().kind {
            TokenKind::Or => (bp::LOGICAL_OR, bp::LOGICAL_OR + 1),
            TokenKind::And => (bp::LOGICAL_AND, bp::LOGICAL_AND + 1),
            TokenKind::EqEq | TokenKind::NotEq => (bp::EQUALITY, bp::EQUALITY + 1),
            TokenKind::Lt | TokenKind::LtEq | TokenKind::Gt | TokenKind::GtEq => {
                (bp::COMPARISON, bp::COMPARISON + 1)
            }
            TokenKind::Plus | TokenKind::Minus => (bp::ADDITIVE, bp::ADDITIVE + 1),
            TokenKind::Star | TokenKind::Slash => {
                (bp::MULTIPLICATIVE, bp::MULTIPLICATIVE + 1)
            }
            _ => return None,
        };
        Some(bp)
    }

    /// Parses a primary expression: literal, variable, call, cast,
    /// `readInput`, f-string, parenthesized expression, or a negated
    /// numeric literal.
    fn parse_primary(&mut self) -> Result<Expr> {
        let token = self.current();
        match token.kind {
            // A unary minus attaches the sign to the literal itself; it is
            // only valid in front of numeric literals.
            TokenKind::Minus => {
                self.advance();
                let literal = self.current();
                match literal.kind {
                    TokenKind::Int | TokenKind::Float => {
                        self.advance();
                        Ok(Expr::Value {
                            text: format!("-{}", literal.text),
                            value_type: literal_type(literal.kind),
                            line: literal.line,
                        })
                    }
                    _ => Err(ZynkError::syntax(
                        format!(
                            "Expected a numeric literal after '-', found: '{}' instead.",
                            literal.text
                        ),
                        literal.line,
                    )),
                }
            }
            TokenKind::Int | TokenKind::Float | TokenKind::Bool => {
                self.advance();
                Ok(Expr::Value {
                    text: token.text,
                    value_type: literal_type(token.kind),
                    line: token.line,
                })
            }
            // A string literal with an interpolation hole becomes an
            // f-string; otherwise it is a plain value.
            TokenKind::Str => {
                self.advance();
                if token.text.contains('{') {
                    Ok(Expr::FString {
                        template: token.text,
                        line: token.line,
                    })
                } else {
                    Ok(Expr::Value {
                        text: token.text,
                        value_type: ValueType::String,
                        line: token.line,
                    })
                }
            }
            TokenKind::Identifier => {
                if self.peek_kind(1) == TokenKind::LParen {
                    Ok(Expr::Call(self.parse_call()?))
                } else {
                    self.advance();
                    Ok(Expr::Variable {
                        name: token.text,
                        line: token.line,
                    })
                }
            }
            TokenKind::ReadInput => {
                self.advance();
                let prompt = self.parse_read_arguments()?.map(Box::new);
                Ok(Expr::ReadInput {
                    prompt,
                    line: token.line,
                })
            }
            // A type keyword followed by '(' is a cast; bare type keywords
            // are not values.
            TokenKind::KwInt | TokenKind::KwFloat | TokenKind::KwString | TokenKind::KwBool
                if self.peek_kind(1) == TokenKind::LParen =>
            {
                self.advance();
                self.expect(TokenKind::LParen, "(")?;
                let value = self.parse_expression_bp(bp::MIN)?;
                self.expect(TokenKind::RParen, ")")?;
                Ok(Expr::TypeCast {
                    target: cast_target(token.kind),
                    value: Box::new(value),
                    line: token.line,
                })
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression_bp(bp::MIN)?;
                self.expect(TokenKind::RParen, ")")?;
                Ok(expr)
            }
            _ => Err(ZynkError::expression(
                format!(
                    "Invalid expression. Expected value or variable, found: '{}' instead.",
                    token.text
                ),
                token.line,
            )),
        }
    }
}

fn build_infix(op: TokenKind, left: Expr, right: Expr, line: u32) -> Expr {
    let left = Box::new(left);
    let right = Box::new(right);
    match op {
        TokenKind::Or => Expr::Or { left, right, line },
        TokenKind::And => Expr::And { left, right, line },
        TokenKind::EqEq => comparison(CmpOp::Eq, left, right, line),
        TokenKind::NotEq => comparison(CmpOp::Ne, left, right, line),
        TokenKind::Lt => comparison(CmpOp::Lt, left, right, line),
        TokenKind::LtEq => comparison(CmpOp::Le, left, right, line),
        TokenKind::Gt => comparison(CmpOp::Gt, left, right, line),
        TokenKind::GtEq => comparison(CmpOp::Ge, left, right, line),
        TokenKind::Plus => binary(BinOp::Add, left, right, line),
        TokenKind::Minus => binary(BinOp::Sub, left, right, line),
        TokenKind::Star => binary(BinOp::Mul, left, right, line),
        TokenKind::Slash => binary(BinOp::Div, left, right, line),
        // infix_binding_power admits no other kinds.
        _ => unreachable!("not an infix operator: {op:?}"),
    }
}

fn comparison(op: CmpOp, left: Box<Expr>, right: Box<Expr>, line: u32) -> Expr {
    Expr::Comparison {
        op,
        left,
        right,
        line,
    }
}

fn binary(op: BinOp, left: Box<Expr>, right: Box<Expr>, line: u32) -> Expr {
    Expr::Binary {
        op,
        left,
        right,
        line,
    }
}

fn literal_type(kind: TokenKind) -> ValueType {
    match kind {
        TokenKind::Int => ValueType::Integer,
        TokenKind::Float => ValueType::Float,
        TokenKind::Str => ValueType::String,
        TokenKind::Bool => ValueType::Bool,
        _ => ValueType::None,
    }
}

fn cast_target(kind: TokenKind) -> ValueType {
    match kind {
        TokenKind::KwInt => ValueType::Integer,
        TokenKind::KwFloat => ValueType::Float,
        TokenKind::KwString => ValueType::String,
        TokenKind::KwBool => ValueType::Bool,
        _ => ValueType::None,
    }
}
