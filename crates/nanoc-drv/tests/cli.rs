use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn nanoc() -> Command {
    Command::cargo_bin("nanoc").unwrap()
}

#[test]
fn compiles_stdin_to_stdout() {
    nanoc()
        .write_stdin("fun main() { return 42; }")
        .assert()
        .success()
        .stdout(predicate::str::contains("%FILE = type opaque"))
        .stdout(predicate::str::contains("ret i32 %"));
}

#[test]
fn debug_flag_emits_token_and_tree_dumps_on_stderr() {
    nanoc()
        .arg("-d")
        .write_stdin("fun main() { return 1; }")
        .assert()
        .success()
        .stderr(predicate::str::contains("NUM: pos ="))
        .stderr(predicate::str::contains("SyntaxType: FUNC"));
}

#[test]
fn debug_off_has_no_ir_comments() {
    let output = nanoc()
        .write_stdin("fun main() { return 1; }")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).unwrap();
    assert!(!text.lines().any(|l| l.trim_start().starts_with(';')));
}

#[test]
fn reads_from_input_file_and_writes_to_output_file() {
    let mut input = NamedTempFile::new().unwrap();
    write!(input, "fun main() {{ return 7; }}").unwrap();
    let output = NamedTempFile::new().unwrap();

    nanoc()
        .arg("-i")
        .arg(input.path())
        .arg("-o")
        .arg(output.path())
        .assert()
        .success();

    let written = std::fs::read_to_string(output.path()).unwrap();
    assert!(written.contains("ret i32 %"));
}

#[test]
fn missing_input_file_is_a_nonzero_exit() {
    nanoc()
        .arg("-i")
        .arg("/nonexistent/path/for/nanoc-tests")
        .assert()
        .failure();
}

#[test]
fn lexical_error_is_a_nonzero_exit_with_diagnostic() {
    nanoc()
        .write_stdin("fun main() { return 1 @ 2; }")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn syntax_error_is_a_nonzero_exit_with_diagnostic() {
    nanoc()
        .write_stdin("fun main() { return ; }")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn empty_program_emits_preamble_only() {
    nanoc()
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("define i32 @print"));
}
