//! The tree-walking evaluator.

use std::io::{self, BufRead, BufReader, Write};

use zynk_lex::Lexer;
use zynk_par::ast::{
    BinOp, CmpOp, Expr, FunctionCall, If, Program, Stmt, ValueType, While,
};
use zynk_par::Parser;
use zynk_sem::{check_return, check_type, determine_type, Binding, Environment};
use zynk_util::{Result, ZynkError};

/// How a statement finished.
///
/// Any non-`Normal` outcome makes the enclosing block stop iterating and
/// hand the same outcome to its parent. A `while` loop consumes `Break`;
/// a function call consumes `Return`.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// Execution continues with the next statement.
    Normal,
    /// A `break` is looking for the nearest enclosing loop.
    Break,
    /// A `return` is looking for the enclosing function call.
    Return {
        /// The rendered text of the returned value.
        text: String,
        /// The static type of the returned expression.
        value_type: ValueType,
        /// Line of the `return` statement, for the return-type check.
        line: u32,
    },
}

/// Textual truthiness: everything is truthy except the empty string,
/// `"0"`, `"null"` and `"false"`.
pub fn truthy(text: &str) -> bool {
    !text.is_empty() && text != "0" && text != "null" && text != "false"
}

/// The evaluator: owns the environment and the I/O handles.
///
/// Output and input are injectable so tests can capture `print` output and
/// feed `readInput` without touching the process's stdio.
pub struct Evaluator {
    env: Environment,
    out: Box<dyn Write>,
    input: Box<dyn BufRead>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    /// Creates an evaluator wired to the process stdio.
    pub fn new() -> Self {
        Self::with_io(
            Box::new(io::stdout()),
            Box::new(BufReader::new(io::stdin())),
        )
    }

    /// Creates an evaluator with explicit output and input handles.
    pub fn with_io(out: Box<dyn Write>, input: Box<dyn BufRead>) -> Self {
        Self {
            env: Environment::new(),
            out,
            input,
        }
    }

    /// The environment, for inspection.
    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Mutable access to the environment.
    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    /// Runs a whole program in a fresh top-level block.
    ///
    /// A `break` or `return` that escapes to the top level simply stops
    /// execution.
    pub fn evaluate(&mut self, program: &Program) -> Result<()> {
        self.env.enter_block(false);
        for stmt in &program.body {
            if self.execute(stmt)? != Outcome::Normal {
                break;
            }
        }
        self.env.exit_block(false);
        Ok(())
    }

    /// Executes one statement.
    pub fn execute(&mut self, stmt: &Stmt) -> Result<Outcome> {
        match stmt {
            Stmt::FunctionDecl(func) => {
                self.env.declare_function(func.clone())?;
                Ok(Outcome::Normal)
            }
            Stmt::VarDecl {
                name,
                declared,
                value,
                line,
            } => {
                let value = match value {
                    Some(expr) => {
                        check_type(*declared, expr, &self.env)?;
                        Some(self.eval_expr(expr)?)
                    }
                    // Declaring without a value leaves the variable null.
                    None => None,
                };
                self.env.declare_variable(
                    name,
                    Binding {
                        declared: *declared,
                        value,
                    },
                    *line,
                )?;
                Ok(Outcome::Normal)
            }
            Stmt::VarAssign { name, value, line } => {
                let declared = self.env.get_variable(name, *line)?.declared;
                check_type(declared, value, &self.env)?;
                let text = self.eval_expr(value)?;
                self.env.get_variable_mut(name, *line)?.value = Some(text);
                Ok(Outcome::Normal)
            }
            Stmt::Print {
                expr,
                newline,
                line,
            } => {
                let text = self.eval_expr(expr)?;
                self.write_text(&text, *line)?;
                if *newline {
                    self.write_text("\n", *line)?;
                }
                Ok(Outcome::Normal)
            }
            Stmt::ReadInput { prompt, line } => {
                if let Some(prompt) = prompt {
                    let text = self.eval_expr(prompt)?;
                    self.write_text(&text, *line)?;
                }
                self.read_line(*line)?;
                Ok(Outcome::Normal)
            }
            Stmt::FunctionCall(call) => {
                self.eval_call(call)?;
                Ok(Outcome::Normal)
            }
            Stmt::If(stmt) => self.execute_if(stmt),
            Stmt::While(stmt) => self.execute_while(stmt),
            Stmt::Break { .. } => Ok(Outcome::Break),
            Stmt::Return { value, line } => {
                let (text, value_type) = match value {
                    Some(expr) => {
                        let value_type = determine_type(expr, &self.env)?;
                        (self.eval_expr(expr)?, value_type)
                    }
                    None => ("null".to_owned(), ValueType::None),
                };
                Ok(Outcome::Return {
                    text,
                    value_type,
                    line: *line,
                })
            }
        }
    }

    /// Executes statements until one produces a non-`Normal` outcome.
    fn execute_block(&mut self, body: &[Stmt]) -> Result<Outcome> {
        for stmt in body {
            let outcome = self.execute(stmt)?;
            if outcome != Outcome::Normal {
                return Ok(outcome);
            }
        }
        Ok(Outcome::Normal)
    }

    fn execute_if(&mut self, stmt: &If) -> Result<Outcome> {
        let condition = self.eval_expr(&stmt.condition)?;
        let branch = if truthy(&condition) {
            &stmt.body
        } else {
            &stmt.else_body
        };

        self.env.enter_block(false);
        let outcome = self.execute_block(branch)?;
        self.env.exit_block(false);
        Ok(outcome)
    }

    fn execute_while(&mut self, stmt: &While) -> Result<Outcome> {
        // One block for the whole loop: bindings made in the body persist
        // across iterations.
        self.env.enter_block(false);
        loop {
            let condition = self.eval_expr(&stmt.condition)?;
            if !truthy(&condition) {
                break;
            }
            match self.execute_block(&stmt.body)? {
                Outcome::Normal => {}
                Outcome::Break => break,
                outcome @ Outcome::Return { .. } => {
                    self.env.exit_block(false);
                    return Ok(outcome);
                }
            }
        }
        self.env.exit_block(false);
        Ok(Outcome::Normal)
    }

    /// Evaluates an expression to its rendered text.
    pub fn eval_expr(&mut self, expr: &Expr) -> Result<String> {
        match expr {
            Expr::Value { text, .. } => Ok(text.clone()),
            Expr::Variable { name, line } => {
                Ok(self.env.get_variable(name, *line)?.text().to_owned())
            }
            Expr::ReadInput { prompt, line } => {
                if let Some(prompt) = prompt {
                    let text = self.eval_expr(prompt)?;
                    self.write_text(&text, *line)?;
                }
                self.read_line(*line)
            }
            Expr::TypeCast {
                target,
                value,
                line,
            } => {
                let base = self.eval_expr(value)?;
                cast(*target, base, *line)
            }
            Expr::FString { template, line } => self.eval_fstring(template, *line),
            Expr::Binary {
                op,
                left,
                right,
                line,
            } => self.eval_binary(*op, left, right, *line),
            Expr::Comparison {
                op, left, right, ..
            } => {
                let left = self.eval_expr(left)?;
                let right = self.eval_expr(right)?;
                Ok(render_bool(compare(*op, &left, &right)))
            }
            Expr::Or { left, right, .. } => {
                let left = self.eval_expr(left)?;
                if truthy(&left) {
                    return Ok(left);
                }
                self.eval_expr(right)
            }
            Expr::And { left, right, .. } => {
                let left = self.eval_expr(left)?;
                if !truthy(&left) {
                    return Ok(left);
                }
                self.eval_expr(right)
            }
            Expr::Call(call) => self.eval_call(call),
        }
    }

    /// Arithmetic: both operands must be statically numeric; the result is
    /// rendered as an integer unless either operand's text carries a `.`.
    fn eval_binary(&mut self, op: BinOp, left: &Expr, right: &Expr, line: u32) -> Result<String> {
        for operand in [left, right] {
            let value_type = determine_type(operand, &self.env)?;
            if !value_type.is_numeric() {
                return Err(ZynkError::expression(
                    format!("Cannot perform BinaryOperation on '{value_type}' type."),
                    line,
                ));
            }
        }

        let left = self.eval_expr(left)?;
        let right = self.eval_expr(right)?;
        calculate_text(&left, &right, op, line)
    }

    /// Calls a function: arity and recursion checks, per-parameter type
    /// checks, then the body in a fresh depth-counted scope.
    fn eval_call(&mut self, call: &FunctionCall) -> Result<String> {
        let func = self.env.get_function(&call.name, call.line)?;
        tracing::trace!(name = %call.name, args = call.args.len(), "calling function");

        if func.params.len() != call.args.len() {
            return Err(ZynkError::runtime(
                format!("Invalid number of arguments for function '{}'.", call.name),
                call.line,
            ));
        }
        if self.env.recursion_exceeded() {
            return Err(ZynkError::recursion(
                format!(
                    "Exceeded maximum recursion depth of {}.",
                    Environment::MAX_DEPTH
                ),
                call.line,
            ));
        }

        // Arguments are checked and evaluated in the caller's scope before
        // the parameter bindings exist.
        let mut arguments = Vec::with_capacity(func.params.len());
        for (param, arg) in func.params.iter().zip(&call.args) {
            check_type(param.value_type, arg, &self.env)?;
            let text = self.eval_expr(arg)?;
            arguments.push((
                param.name.clone(),
                Binding {
                    declared: param.value_type,
                    value: Some(text),
                },
                param.line,
            ));
        }

        self.env.enter_block(true);
        for (name, binding, line) in arguments {
            self.env.declare_variable(&name, binding, line)?;
        }

        let outcome = self.execute_block(&func.body)?;
        self.env.exit_block(true);

        match outcome {
            Outcome::Return {
                text,
                value_type,
                line,
            } => {
                check_return(&func, value_type, line)?;
                Ok(text)
            }
            Outcome::Normal | Outcome::Break => {
                if func.return_type != ValueType::None {
                    return Err(ZynkError::type_error(
                        format!(
                            "Function '{}' does not return a value of type {} in all control paths.",
                            func.name, func.return_type
                        ),
                        func.line,
                    ));
                }
                Ok("null".to_owned())
            }
        }
    }

    /// Interpolates an f-string: literal text is copied, each `{...}` hole
    /// is lexed, parsed and evaluated as a fresh compilation unit with the
    /// host string's line stamped on it.
    fn eval_fstring(&mut self, template: &str, line: u32) -> Result<String> {
        let mut result = String::new();
        let mut start = 0;

        while start < template.len() {
            let Some(open) = template[start..].find('{').map(|i| start + i) else {
                result.push_str(&template[start..]);
                break;
            };
            result.push_str(&template[start..open]);

            let close = template[open..]
                .find('}')
                .map(|i| open + i)
                .ok_or_else(|| ZynkError::runtime("Unclosed '{' in f-string.", line))?;

            let text = self.eval_embedded(&template[open + 1..close], line)?;
            result.push_str(&text);
            start = close + 1;
        }
        Ok(result)
    }

    /// Runs one `{...}` hole through the full lex/parse/evaluate pipeline.
    fn eval_embedded(&mut self, source: &str, line: u32) -> Result<String> {
        let tokens = Lexer::new(source).tokenize();
        let mut parser = Parser::new(tokens);
        let mut expr = parser.parse_expression()?;

        // The sub-parser only saw the hole, so it stamped line 1 on the
        // expression; restore the host string's line for error messages.
        expr.set_line(line);
        self.eval_expr(&expr)
    }

    fn write_text(&mut self, text: &str, line: u32) -> Result<()> {
        self.out
            .write_all(text.as_bytes())
            .and_then(|_| self.out.flush())
            .map_err(|err| ZynkError::runtime(format!("Failed to write output: {err}."), line))
    }

    fn read_line(&mut self, line: u32) -> Result<String> {
        let mut buffer = String::new();
        self.input
            .read_line(&mut buffer)
            .map_err(|err| ZynkError::runtime(format!("Failed to read input: {err}."), line))?;
        if buffer.ends_with('\n') {
            buffer.pop();
            if buffer.ends_with('\r') {
                buffer.pop();
            }
        }
        Ok(buffer)
    }
}

/// Renders a bool in the language's textual form.
fn render_bool(value: bool) -> String {
    if value { "true" } else { "false" }.to_owned()
}

/// Compares two rendered values: numerically when both parse as numbers,
/// lexicographically on the text otherwise.
fn compare(op: CmpOp, left: &str, right: &str) -> bool {
    if let (Ok(l), Ok(r)) = (left.parse::<f64>(), right.parse::<f64>()) {
        return match op {
            CmpOp::Eq => l == r,
            CmpOp::Ne => l != r,
            CmpOp::Lt => l < r,
            CmpOp::Le => l <= r,
            CmpOp::Gt => l > r,
            CmpOp::Ge => l >= r,
        };
    }
    match op {
        CmpOp::Eq => left == right,
        CmpOp::Ne => left != right,
        CmpOp::Lt => left < right,
        CmpOp::Le => left <= right,
        CmpOp::Gt => left > right,
        CmpOp::Ge => left >= right,
    }
}

/// Arithmetic over rendered values.
///
/// Both sides are computed as floats. When neither operand's text contains
/// a decimal point the result is truncated toward zero and rendered as an
/// integer.
fn calculate_text(left: &str, right: &str, op: BinOp, line: u32) -> Result<String> {
    let l = parse_number(left, line)?;
    let r = parse_number(right, line)?;

    let result = match op {
        BinOp::Add => l + r,
        BinOp::Sub => l - r,
        BinOp::Mul => l * r,
        BinOp::Div => {
            if r == 0.0 {
                return Err(ZynkError::runtime("Division by zero.", line));
            }
            l / r
        }
    };

    if left.contains('.') || right.contains('.') {
        Ok(result.to_string())
    } else {
        Ok((result.trunc() as i64).to_string())
    }
}

fn parse_number(text: &str, line: u32) -> Result<f64> {
    text.parse::<f64>().map_err(|_| {
        ZynkError::runtime(format!("Invalid numeric value '{text}'."), line)
    })
}

/// Casts a rendered value to the target type.
fn cast(target: ValueType, base: String, line: u32) -> Result<String> {
    match target {
        ValueType::Integer => {
            let trimmed = base.trim();
            if let Ok(value) = trimmed.parse::<i64>() {
                return Ok(value.to_string());
            }
            // "3.7" casts to 3: fall back to a float parse, truncating.
            match trimmed.parse::<f64>() {
                Ok(value) => Ok((value.trunc() as i64).to_string()),
                Err(_) => Err(ZynkError::type_cast(
                    "Invalid argument. Unable to convert the provided value to an integer.",
                    line,
                )),
            }
        }
        ValueType::Float => match base.trim().parse::<f64>() {
            Ok(value) => Ok(value.to_string()),
            Err(_) => Err(ZynkError::type_cast(
                "Invalid argument. Unable to convert the provided value to a float.",
                line,
            )),
        },
        // Expressions are already strings.
        ValueType::String => Ok(base),
        ValueType::Bool => Ok(render_bool(truthy(&base))),
        ValueType::None => Err(ZynkError::runtime("Invalid type cast encountered.", line)),
    }
}
