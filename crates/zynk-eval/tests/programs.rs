//! Whole-pipeline tests: lex, parse and evaluate small programs, capturing
//! the output and inspecting the environment.

use std::cell::RefCell;
use std::io::{self, Cursor, Write};
use std::rc::Rc;

use zynk_eval::Evaluator;
use zynk_lex::Lexer;
use zynk_par::ast::Program;
use zynk_par::Parser;
use zynk_util::{ErrorKind, Result, ZynkError};

/// A clonable in-memory sink standing in for stdout.
#[derive(Clone, Default)]
struct SharedBuf(Rc<RefCell<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuf {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

fn parse(source: &str) -> Result<Program> {
    Parser::new(Lexer::new(source).tokenize()).parse()
}

fn evaluator_with(out: SharedBuf, input: &str) -> Evaluator {
    Evaluator::with_io(Box::new(out), Box::new(Cursor::new(input.to_owned())))
}

/// Runs a program, returning the result and everything it printed.
fn run_with_input(source: &str, input: &str) -> (Result<()>, String) {
    let out = SharedBuf::default();
    let mut evaluator = evaluator_with(out.clone(), input);
    let result = parse(source).and_then(|program| evaluator.evaluate(&program));
    (result, out.contents())
}

fn run(source: &str) -> (Result<()>, String) {
    run_with_input(source, "")
}

/// Asserts a successful run and returns the output.
fn output_of(source: &str) -> String {
    let (result, output) = run(source);
    result.unwrap();
    output
}

fn error_of(source: &str) -> ZynkError {
    let (result, _) = run(source);
    result.unwrap_err()
}

#[test]
fn test_variable_declarations_bind_values() {
    let program = parse("var a: int = 10;\nvar b: int = a * 100;").unwrap();

    let mut evaluator = evaluator_with(SharedBuf::default(), "");
    evaluator.env_mut().enter_block(false);
    for stmt in &program.body {
        evaluator.execute(stmt).unwrap();
    }

    let env = evaluator.env();
    assert_eq!(env.get_variable("a", 1).unwrap().text(), "10");
    assert_eq!(env.get_variable("b", 2).unwrap().text(), "1000");
    assert_eq!(env.current_variable_count(), 2);
}

#[test]
fn test_fstring_interpolates_variable() {
    let output = output_of("var name: string = \"World\";\nprintln(\"Hello, {name}!\");");
    assert_eq!(output, "Hello, World!\n");
}

#[test]
fn test_fstring_interpolates_expression() {
    assert_eq!(output_of("println(\"{2 * 3}\");"), "6\n");
    assert_eq!(
        output_of("var x: int = 4;\nprintln(\"x={x}, next={x + 1}\");"),
        "x=4, next=5\n"
    );
}

#[test]
fn test_fstring_unclosed_brace() {
    let err = error_of("println(\"oops {x\");");
    assert_eq!(err.kind, ErrorKind::Runtime);
    assert_eq!(err.message, "Unclosed '{' in f-string.");
    assert_eq!(err.line, Some(1));
}

#[test]
fn test_function_call_with_arguments() {
    let output = output_of("def add(x: int, y: int) -> int { return x + y; }\nprintln(add(2, 3));");
    assert_eq!(output, "5\n");
}

#[test]
fn test_while_loop_counts() {
    let output = output_of("var x: int = 0; while (x < 3) { println(x); x = x + 1; }");
    assert_eq!(output, "0\n1\n2\n");
}

#[test]
fn test_while_break() {
    let output = output_of(
        "var x: int = 0;\nwhile (true) {\n    if (x == 2) { break; }\n    println(x);\n    x = x + 1;\n}\nprintln(\"done\");",
    );
    assert_eq!(output, "0\n1\ndone\n");
}

#[test]
fn test_if_else() {
    let output = output_of("if (1 == 1) { println(\"yes\"); } else { println(\"no\"); }");
    assert_eq!(output, "yes\n");

    let output = output_of("if (1 == 2) { println(\"yes\"); } else { println(\"no\"); }");
    assert_eq!(output, "no\n");
}

#[test]
fn test_failed_integer_cast() {
    let err = error_of("var a: int = int(\"xyz\");");
    assert_eq!(err.kind, ErrorKind::TypeCast);
    assert_eq!(err.line, Some(1));
}

#[test]
fn test_successful_casts() {
    assert_eq!(output_of("println(int(\"42\") + 1);"), "43\n");
    assert_eq!(output_of("println(string(123));"), "123\n");
    assert_eq!(output_of("println(bool(1));"), "true\n");
    assert_eq!(output_of("println(bool(0));"), "false\n");
}

#[test]
fn test_short_circuit_skips_right_side() {
    // The right-hand calls do not exist; short-circuiting means they are
    // never looked up.
    assert_eq!(output_of("println(true || missing());"), "true\n");
    assert_eq!(output_of("println(false && missing());"), "false\n");
}

#[test]
fn test_logical_results() {
    assert_eq!(output_of("println(true && false);"), "false\n");
    assert_eq!(output_of("println(false || true);"), "true\n");
}

#[test]
fn test_shadowing_restores_outer_binding() {
    let output = output_of(
        "var x: int = 1;\nif (true) {\n    var x: int = 2;\n    println(x);\n}\nprintln(x);",
    );
    assert_eq!(output, "2\n1\n");
}

#[test]
fn test_assignment_mutates_outer_binding() {
    let output = output_of("var x: int = 0;\nif (true) { x = 5; }\nprintln(x);");
    assert_eq!(output, "5\n");
}

#[test]
fn test_duplicate_declaration_in_same_block() {
    let err = error_of("var x: int = 1;\nvar x: int = 2;");
    assert_eq!(err.kind, ErrorKind::DuplicateDeclaration);
    assert_eq!(err.message, "Variable 'x' is already declared.");
}

#[test]
fn test_arity_mismatch() {
    let err = error_of("def f(x: int) -> int { return x; }\nf(1, 2);");
    assert_eq!(err.kind, ErrorKind::Runtime);
    assert_eq!(err.message, "Invalid number of arguments for function 'f'.");
}

#[test]
fn test_argument_type_mismatch() {
    let err = error_of("def f(x: int) -> int { return x; }\nf(\"no\");");
    assert_eq!(err.kind, ErrorKind::Type);
}

#[test]
fn test_undefined_variable_and_function() {
    assert_eq!(error_of("println(ghost);").kind, ErrorKind::NotDefined);
    assert_eq!(error_of("ghost();").kind, ErrorKind::NotDefined);
}

#[test]
fn test_return_propagates_through_nested_control_flow() {
    let output = output_of(
        "def find() -> int {\n    var i: int = 0;\n    while (true) {\n        if (i == 3) {\n            return i;\n        }\n        i = i + 1;\n    }\n}\nprintln(find());",
    );
    assert_eq!(output, "3\n");
}

#[test]
fn test_missing_return_in_all_control_paths() {
    let err = error_of("def f(x: int) -> int {\n    if (x > 0) { return x; }\n}\nf(0);");
    assert_eq!(err.kind, ErrorKind::Type);
    assert_eq!(
        err.message,
        "Function 'f' does not return a value of type int in all control paths."
    );
}

#[test]
fn test_return_type_mismatch() {
    let err = error_of("def f() -> int { return \"text\"; }\nf();");
    assert_eq!(err.kind, ErrorKind::Type);
    assert_eq!(
        err.message,
        "Function 'f' does not return a value of type int. Instead, it returned string type."
    );
}

#[test]
fn test_void_function_returns_null_text() {
    assert_eq!(output_of("def f() -> null { println(\"hi\"); }\nprintln(f());"), "hi\nnull\n");
}

#[test]
fn test_division_by_zero() {
    let err = error_of("println(1 / 0);");
    assert_eq!(err.kind, ErrorKind::Runtime);
    assert_eq!(err.message, "Division by zero.");
}

#[test]
fn test_integer_division_truncates() {
    assert_eq!(output_of("println(7 / 2);"), "3\n");
    assert_eq!(output_of("println(-7 / 2);"), "-3\n");
}

#[test]
fn test_mixed_arithmetic_widens_to_float() {
    assert_eq!(output_of("println(1 + 2.5);"), "3.5\n");
    assert_eq!(output_of("var a: float = 7.0 / 2;\nprintln(a);"), "3.5\n");
}

#[test]
fn test_string_operand_rejected_in_arithmetic() {
    let err = error_of("println(\"a\" + \"b\");");
    assert_eq!(err.kind, ErrorKind::Expression);
    assert_eq!(err.message, "Cannot perform BinaryOperation on 'string' type.");
}

#[test]
fn test_comparison_falls_back_to_text() {
    assert_eq!(output_of("println(\"abc\" < \"abd\");"), "true\n");
    assert_eq!(output_of("println(10 > 9);"), "true\n");
    assert_eq!(output_of("println(\"5\" == 5);"), "true\n");
}

#[test]
fn test_declaration_type_mismatch() {
    let err = error_of("var a: int = \"text\";");
    assert_eq!(err.kind, ErrorKind::Type);
    assert_eq!(
        err.message,
        "Type mismatch. Declared type is int, but assigned value is of type string."
    );
}

#[test]
fn test_assignment_type_mismatch() {
    let err = error_of("var a: int = 1;\na = \"text\";");
    assert_eq!(err.kind, ErrorKind::Type);
}

#[test]
fn test_uninitialized_variable_reads_null_and_accepts_assignment() {
    let output = output_of("var x: int;\nprintln(x);\nx = 5;\nprintln(x);");
    assert_eq!(output, "null\n5\n");
}

#[test]
fn test_read_input_expression() {
    let (result, output) = run_with_input(
        "var name: string = readInput(\"? \");\nprintln(\"Hello, {name}!\");",
        "World\n",
    );
    result.unwrap();
    assert_eq!(output, "? Hello, World!\n");
}

#[test]
fn test_read_input_statement_discards_line() {
    let (result, output) = run_with_input("readInput();\nprintln(\"after\");", "ignored\n");
    result.unwrap();
    assert_eq!(output, "after\n");
}

#[test]
fn test_or_returns_operand_text() {
    // `or` yields the deciding operand itself, not a canonical bool.
    assert_eq!(output_of("var a: int = 0;\nvar b: int = 7;\nprintln(a or b);"), "7\n");
    assert_eq!(output_of("var a: int = 3;\nvar b: int = 7;\nprintln(a and b);"), "7\n");
}

#[test]
fn test_duplicate_function_declaration() {
    let err = error_of("def f() -> null {}\ndef f() -> null {}");
    assert_eq!(err.kind, ErrorKind::DuplicateDeclaration);
    assert_eq!(err.message, "Function 'f' is already declared.");
}

#[test]
fn test_functions_resolve_against_live_scope() {
    // Function bodies re-resolve names at call time, so a global declared
    // after the function still resolves.
    let output = output_of(
        "def show() -> null { println(g); }\nvar g: int = 9;\nshow();",
    );
    assert_eq!(output, "9\n");
}

#[test]
fn test_recursive_function() {
    let output = output_of(
        "def fib(n: int) -> int {\n    if (n < 2) { return n; }\n    return fib(n - 1) + fib(n - 2);\n}\nprintln(fib(10));",
    );
    assert_eq!(output, "55\n");
}

#[test]
fn test_loop_variables_persist_across_iterations() {
    // The loop body shares one block, so redeclaring inside it collides on
    // the second iteration.
    let err = error_of("var i: int = 0;\nwhile (i < 2) {\n    var t: int = 1;\n    i = i + 1;\n}");
    assert_eq!(err.kind, ErrorKind::DuplicateDeclaration);
}
