//! Static type rules.
//!
//! The checker is a pure function over AST nodes given the current
//! environment: it never evaluates anything, it only derives types and
//! compares them. Numeric widening follows the lattice: any `float`
//! operand makes an arithmetic result `float`, otherwise it stays `int`.

use zynk_par::ast::{Expr, FunctionDecl, ValueType};
use zynk_util::{Result, ZynkError};

use crate::scope::Environment;

/// Computes the static type of an expression.
///
/// Non-numeric operands of an arithmetic node are returned as-is rather
/// than rejected here; the evaluator raises the `ExpressionError` when the
/// operation actually runs.
pub fn determine_type(expr: &Expr, env: &Environment) -> Result<ValueType> {
    match expr {
        Expr::Value { value_type, .. } => Ok(*value_type),
        Expr::TypeCast { target, .. } => Ok(*target),
        Expr::Comparison { .. } => Ok(ValueType::Bool),
        Expr::FString { .. } | Expr::ReadInput { .. } => Ok(ValueType::String),
        Expr::Variable { name, line } => {
            Ok(env.get_variable(name, *line)?.declared)
        }
        Expr::Call(call) => Ok(env.get_function(&call.name, call.line)?.return_type),
        Expr::Binary { left, right, .. } => {
            let left = determine_type(left, env)?;
            let right = determine_type(right, env)?;
            if !left.is_numeric() {
                return Ok(left);
            }
            if !right.is_numeric() {
                return Ok(right);
            }
            if left == ValueType::Float || right == ValueType::Float {
                Ok(ValueType::Float)
            } else {
                Ok(ValueType::Integer)
            }
        }
        Expr::And { left, right, line } => {
            logical_operand_type("and", left, right, *line, env)
        }
        Expr::Or { left, right, line } => {
            logical_operand_type("or", left, right, *line, env)
        }
    }
}

/// `and`/`or` require both sides to share one type, which is also the type
/// of the whole expression.
fn logical_operand_type(
    op: &str,
    left: &Expr,
    right: &Expr,
    line: u32,
    env: &Environment,
) -> Result<ValueType> {
    let left = determine_type(left, env)?;
    let right = determine_type(right, env)?;
    if left != right {
        return Err(ZynkError::type_error(
            format!("Operands of the '{op}' operation must be of the same type."),
            line,
        ));
    }
    Ok(left)
}

/// Checks an expression against a declared type.
pub fn check_type(declared: ValueType, value: &Expr, env: &Environment) -> Result<()> {
    let actual = determine_type(value, env)?;
    if declared != actual {
        return Err(ZynkError::type_error(
            format!(
                "Type mismatch. Declared type is {declared}, but assigned value is of type {actual}."
            ),
            value.line(),
        ));
    }
    Ok(())
}

/// Checks a returned value type against the function's declared return type.
pub fn check_return(func: &FunctionDecl, returned: ValueType, line: u32) -> Result<()> {
    if returned != func.return_type {
        return Err(ZynkError::type_error(
            format!(
                "Function '{}' does not return a value of type {}. Instead, it returned {} type.",
                func.name, func.return_type, returned
            ),
            line,
        ));
    }
    Ok(())
}
