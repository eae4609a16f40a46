//! End-to-end tests driving the `zynk` binary.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn zynk() -> Command {
    Command::cargo_bin("zynk").unwrap()
}

/// Writes `source` to a temp script and returns the invocation for it.
fn run_script(source: &str) -> (tempfile::TempDir, Command) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("script.zk");
    fs::write(&path, source).unwrap();

    let mut cmd = zynk();
    cmd.arg(path.to_str().unwrap());
    (dir, cmd)
}

#[test]
fn test_no_arguments() {
    zynk().assert().failure().stderr(predicate::str::contains(
        "Error[CLIError]: No argument was given. Consider using --help.",
    ));
}

#[test]
fn test_too_many_arguments() {
    zynk()
        .args(["main.zk", "--help"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error[CLIError]: Too many arguments."));
}

#[test]
fn test_help_banner() {
    zynk()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("<----- Zynk Help ----->"))
        .stdout(predicate::str::contains("--init"));
}

#[test]
fn test_version() {
    zynk()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("Version: 1.0.0"));
}

#[test]
fn test_init_writes_template() {
    let dir = tempdir().unwrap();
    zynk()
        .arg("init")
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Successfully created a new main.zk file.",
        ));

    let template = fs::read_to_string(dir.path().join("main.zk")).unwrap();
    assert!(template.contains("def main() -> null {"));
    assert!(template.contains("println(\"Hello Pimpki!\");"));
    assert!(template.ends_with("main();"));

    // The generated template is itself runnable.
    zynk()
        .arg("main.zk")
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout("Hello Pimpki!\n");
}

#[test]
fn test_missing_script_file() {
    zynk()
        .arg("nowhere.zk")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Error[FileOpenError]: Failed to open a file.",
        ));
}

#[test]
fn test_function_call_program() {
    let (_dir, mut cmd) =
        run_script("def add(x: int, y: int) -> int { return x + y; }\nprintln(add(2, 3));");
    cmd.assert().success().stdout("5\n");
}

#[test]
fn test_while_loop_program() {
    let (_dir, mut cmd) = run_script("var x: int = 0; while (x < 3) { println(x); x = x + 1; }");
    cmd.assert().success().stdout("0\n1\n2\n");
}

#[test]
fn test_if_else_program() {
    let (_dir, mut cmd) =
        run_script("if (1 == 1) { println(\"yes\"); } else { println(\"no\"); }");
    cmd.assert().success().stdout("yes\n");
}

#[test]
fn test_fstring_program() {
    let (_dir, mut cmd) =
        run_script("var name: string = \"World\";\nprintln(\"Hello, {name}!\");");
    cmd.assert().success().stdout("Hello, World!\n");
}

#[test]
fn test_failed_cast_reports_line() {
    let (_dir, mut cmd) = run_script("var a: int = int(\"xyz\");");
    cmd.assert().failure().stderr(predicate::str::contains(
        "Error[TypeCastError]: At line: 1. Invalid argument. Unable to convert the provided value to an integer.",
    ));
}

#[test]
fn test_error_line_points_into_script() {
    let (_dir, mut cmd) = run_script("var a: int = 1;\nprintln(ghost);");
    cmd.assert().failure().stderr(predicate::str::contains(
        "Error[NotDefinedError]: At line: 2. Variable named 'ghost' is not defined.",
    ));
}

#[test]
fn test_read_input_round_trip() {
    let (_dir, mut cmd) = run_script(
        "var name: string = readInput(\"name: \");\nprintln(\"Hello, {name}!\");",
    );
    cmd.write_stdin("World\n")
        .assert()
        .success()
        .stdout("name: Hello, World!\n");
}

#[test]
fn test_unconditional_recursion_hits_ceiling() {
    let (_dir, mut cmd) = run_script("def spin() -> null {\n    spin();\n}\nspin();");
    cmd.assert().failure().stderr(predicate::str::contains(
        "Error[RecursionError]: At line: 2. Exceeded maximum recursion depth of 1000.",
    ));
}

#[test]
fn test_print_without_newline() {
    let (_dir, mut cmd) = run_script("print(\"a\");\nprint(\"b\");");
    cmd.assert().success().stdout("ab");
}

#[test]
fn test_division_by_zero_program() {
    let (_dir, mut cmd) = run_script("println(10 / 0);");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Error[RuntimeError]: At line: 1. Division by zero."));
}

#[test]
fn test_comments_are_ignored() {
    let (_dir, mut cmd) =
        run_script("// a greeting\nprintln(\"hi\"); // inline\n// done\n");
    cmd.assert().success().stdout("hi\n");
}

#[test]
fn test_script_named_like_a_flag_is_a_script() {
    // "help.zk" contains both ".zk" and "help"; the script path wins.
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("help.zk"), "println(\"scripted\");").unwrap();
    zynk()
        .arg("help.zk")
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout("scripted\n");
}
