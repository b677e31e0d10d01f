#![allow(dead_code)]

use loxide::interpreter::{self, Interpreter, RuntimeError};
use loxide::lexer;
use loxide::token::Token;

pub fn tokens_of(source: &str) -> Vec<Token> {
    lexer::tokens(source)
}

/// Tokenize-mode rendering: one `<KIND> <lexeme> <literal>` line per
/// token, including the final `EOF  null`.
pub fn token_lines(source: &str) -> Vec<String> {
    lexer::tokens(source)
        .iter()
        .map(|t| t.to_string())
        .collect()
}

pub fn canonical(source: &str) -> String {
    interpreter::parse(source)
        .expect("source should parse cleanly")
        .to_string()
}

pub fn parse_errors(source: &str) -> Vec<String> {
    interpreter::parse(source).expect_err("source should fail to parse")
}

/// Runs a program against an in-memory stdout, returning what it
/// printed and how it ended.
pub fn run_program(source: &str) -> (String, Result<(), RuntimeError>) {
    let program = interpreter::parse(source).expect("source should parse cleanly");
    let mut out = Vec::new();
    let result = Interpreter::new(&mut out).run(&program);
    (String::from_utf8(out).expect("program output should be UTF-8"), result)
}

pub fn stdout_of(source: &str) -> String {
    let (out, result) = run_program(source);
    result.expect("program should run cleanly");
    out
}

pub fn runtime_error(source: &str) -> RuntimeError {
    let (_, result) = run_program(source);
    result.expect_err("program should hit a runtime error")
}
