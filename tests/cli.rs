use std::{
    fs,
    process::{Command, Output},
};

fn loxwalk(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_loxwalk"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("loxwalk binary runs")
}

fn exit_code(output: &Output) -> Option<i32> {
    output.status.code()
}

#[test]
fn run_prints_program_output() {
    let output = loxwalk(&["run", "demos/scopes.lox"]);
    let expected = fs::read_to_string("demos/scopes.out").expect("expected output exists");

    assert_eq!(exit_code(&output), Some(0));
    assert_eq!(String::from_utf8_lossy(&output.stdout), expected);
    assert!(output.stderr.is_empty());
}

#[test]
fn missing_file_exits_with_no_input() {
    let output = loxwalk(&["run", "tests/fixtures/does_not_exist.lox"]);

    assert_eq!(exit_code(&output), Some(66));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("does_not_exist.lox"));

    let output = loxwalk(&["check", "tests/fixtures/does_not_exist.lox"]);
    assert_eq!(exit_code(&output), Some(66));
}

#[test]
fn bad_invocation_exits_with_usage() {
    assert_eq!(exit_code(&loxwalk(&["run", "a.lox", "b.lox"])), Some(64));
    assert_eq!(exit_code(&loxwalk(&["run"])), Some(64));
    assert_eq!(exit_code(&loxwalk(&["frobnicate"])), Some(64));
    assert_eq!(exit_code(&loxwalk(&["--help"])), Some(0));
}

#[test]
fn static_errors_exit_with_data_error() {
    let output = loxwalk(&["check", "tests/fixtures/missing_semicolon.lox"]);
    assert_eq!(exit_code(&output), Some(65));
    assert!(String::from_utf8_lossy(&output.stderr)
        .contains("[line 2] Error at end: Expected ';' after value."));

    let output = loxwalk(&["run", "tests/fixtures/missing_semicolon.lox"]);
    assert_eq!(exit_code(&output), Some(65));
    assert!(output.stdout.is_empty());
}

#[test]
fn check_accepts_a_clean_file() {
    let output = loxwalk(&["check", "demos/arithmetic.lox"]);
    assert_eq!(exit_code(&output), Some(0));
    assert!(output.stderr.is_empty());
}
