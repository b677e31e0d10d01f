use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

fn loxide() -> Command {
    Command::new(env!("CARGO_BIN_EXE_loxide"))
}

fn source_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write source");
    file.flush().expect("Failed to flush source");
    file
}

/// Runs `loxide <command> <file>` with `content` as the source file.
fn run(command: &str, content: &str) -> (String, String, i32) {
    let file = source_file(content);
    let output = loxide()
        .arg(command)
        .arg(file.path())
        .output()
        .expect("Failed to execute loxide");
    (
        String::from_utf8(output.stdout).expect("stdout should be UTF-8"),
        String::from_utf8(output.stderr).expect("stderr should be UTF-8"),
        output.status.code().expect("process should exit normally"),
    )
}

#[test]
fn tokenize_emits_one_line_per_token() {
    let (stdout, stderr, code) = run("tokenize", "((){}*.,+*-;");
    assert_eq!(
        stdout,
        "LEFT_PAREN ( null\n\
         LEFT_PAREN ( null\n\
         RIGHT_PAREN ) null\n\
         LEFT_BRACE { null\n\
         RIGHT_BRACE } null\n\
         STAR * null\n\
         DOT . null\n\
         COMMA , null\n\
         PLUS + null\n\
         STAR * null\n\
         MINUS - null\n\
         SEMICOLON ; null\n\
         EOF  null\n"
    );
    assert_eq!(stderr, "");
    assert_eq!(code, 0);
}

#[test]
fn tokenize_empty_file_prints_only_eof() {
    let (stdout, stderr, code) = run("tokenize", "");
    assert_eq!(stdout, "EOF  null\n");
    assert_eq!(stderr, "");
    assert_eq!(code, 0);
}

#[test]
fn tokenize_reports_unexpected_characters_and_exits_65() {
    let (stdout, stderr, code) = run("tokenize", ",.$(#");
    assert_eq!(
        stdout,
        "COMMA , null\nDOT . null\nLEFT_PAREN ( null\nEOF  null\n"
    );
    assert_eq!(
        stderr,
        "[line 1] Error: Unexpected character: $\n\
         [line 1] Error: Unexpected character: #\n"
    );
    assert_eq!(code, 65);
}

#[test]
fn tokenize_reports_unterminated_strings() {
    let (stdout, stderr, code) = run("tokenize", "\"open");
    assert_eq!(stdout, "EOF  null\n");
    assert_eq!(stderr, "[line 1] Error: Unterminated string.\n");
    assert_eq!(code, 65);
}

#[test]
fn parse_prints_the_canonical_form() {
    let (stdout, stderr, code) = run("parse", "16 * 38 / 58");
    assert_eq!(stdout, "(/ (* 16.0 38.0) 58.0)\n");
    assert_eq!(stderr, "");
    assert_eq!(code, 0);
}

#[test]
fn parse_errors_go_to_stderr_with_exit_65() {
    let (stdout, stderr, code) = run("parse", "(72 + )");
    assert_eq!(stdout, "");
    assert_eq!(stderr, "[line 1] Error at ')': Expect expression.\n");
    assert_eq!(code, 65);
}

#[test]
fn evaluate_prints_program_output() {
    let (stdout, stderr, code) = run("evaluate", "print \"hello\" + \" \" + \"world\";");
    assert_eq!(stdout, "hello world\n");
    assert_eq!(stderr, "");
    assert_eq!(code, 0);
}

#[test]
fn evaluate_respects_block_scoping() {
    let (stdout, _, code) = run("evaluate", "var a = 1;\n{ var a = 2; print a; }\nprint a;");
    assert_eq!(stdout, "2\n1\n");
    assert_eq!(code, 0);
}

#[test]
fn evaluate_runs_while_loops() {
    let (stdout, _, code) = run("evaluate", "var b = 0; while (b < 3) print b = b + 1;");
    assert_eq!(stdout, "1\n2\n3\n");
    assert_eq!(code, 0);
}

#[test]
fn evaluate_preserves_or_operands() {
    let (stdout, _, code) = run("evaluate", "print false or 41;");
    assert_eq!(stdout, "41\n");
    assert_eq!(code, 0);
}

#[test]
fn runtime_errors_exit_70() {
    let (stdout, stderr, code) = run("evaluate", "-\"hello\";");
    assert_eq!(stdout, "");
    assert_eq!(stderr, "Operand must be a number.\n");
    assert_eq!(code, 70);
}

#[test]
fn parse_errors_block_evaluation_with_exit_65() {
    let (stdout, stderr, code) = run("evaluate", "print \"ok\"; (1 + )");
    assert_eq!(stdout, "");
    assert_eq!(stderr, "[line 1] Error at ')': Expect expression.\n");
    assert_eq!(code, 65);
}

#[test]
fn run_is_an_alias_for_evaluate() {
    let (stdout, _, code) = run("run", "print 1 + 2;");
    assert_eq!(stdout, "3\n");
    assert_eq!(code, 0);
}

#[test]
fn missing_file_exits_1() {
    let output = loxide()
        .arg("evaluate")
        .arg("does-not-exist.lox")
        .output()
        .expect("Failed to execute loxide");
    assert_eq!(output.status.code(), Some(1));
    assert!(!output.stderr.is_empty());
}

#[test]
fn missing_arguments_exit_1() {
    let output = loxide().output().expect("Failed to execute loxide");
    assert_eq!(output.status.code(), Some(1));
    assert!(!output.stderr.is_empty());

    let output = loxide()
        .arg("tokenize")
        .output()
        .expect("Failed to execute loxide");
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn unknown_command_is_rejected() {
    let output = loxide()
        .arg("transmogrify")
        .arg("x.lox")
        .output()
        .expect("Failed to execute loxide");
    assert_ne!(output.status.code(), Some(0));
}

#[test]
fn version_flag_succeeds() {
    let output = loxide()
        .arg("--version")
        .output()
        .expect("Failed to execute loxide");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("loxide"));
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}
