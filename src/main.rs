use clap::Parser;
use loxide::cli::{generate_completions, Args, Commands};
use loxide::config::AppConfig;
use loxide::interpreter;
use loxide::interpreter::Interpreter;
use loxide::lexer::Lexer;
use loxide::token::TokenKind;
use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            use clap::error::ErrorKind;
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(1),
            };
        }
    };

    let config = AppConfig::from_args(&args);
    verbose_log(&config, "Starting loxide");

    let code = match &args.command {
        Commands::Complete { shell } => {
            generate_completions(*shell);
            0
        }
        Commands::Tokenize { file } => match read_source(file, &config) {
            Ok(source) => run_tokenize(&source, &config),
            Err(code) => code,
        },
        Commands::Parse { file } => match read_source(file, &config) {
            Ok(source) => run_parse(&source, &config),
            Err(code) => code,
        },
        Commands::Evaluate { file } | Commands::Run { file } => match read_source(file, &config) {
            Ok(source) => run_evaluate(&source, &config),
            Err(code) => code,
        },
    };
    ExitCode::from(code)
}

fn read_source(path: &Path, config: &AppConfig) -> Result<String, u8> {
    match std::fs::read_to_string(path) {
        Ok(source) => {
            verbose_log(
                config,
                &format!("Read {} bytes from {}", source.len(), path.display()),
            );
            Ok(source)
        }
        Err(err) => {
            error_message(
                config,
                &format!("error reading file {}: {}", path.display(), err),
            );
            Err(1)
        }
    }
}

fn run_tokenize(source: &str, config: &AppConfig) -> u8 {
    verbose_log(config, "Tokenizing");
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut lexer = Lexer::new(source);
    let mut had_error = false;
    loop {
        let token = lexer.next_token();
        match token.kind {
            TokenKind::Eof => break,
            TokenKind::UnterminatedString => {
                error_message(
                    config,
                    &format!("[line {}] Error: Unterminated string.", token.line),
                );
                had_error = true;
            }
            TokenKind::Illegal => {
                error_message(
                    config,
                    &format!(
                        "[line {}] Error: Unexpected character: {}",
                        token.line, token.lexeme
                    ),
                );
                had_error = true;
            }
            _ => {
                let _ = writeln!(out, "{}", token);
            }
        }
    }
    let _ = writeln!(out, "EOF  null");
    let _ = out.flush();

    if had_error {
        65
    } else {
        0
    }
}

fn run_parse(source: &str, config: &AppConfig) -> u8 {
    verbose_log(config, "Parsing");
    match interpreter::parse(source) {
        Ok(program) => {
            println!("{}", program);
            0
        }
        Err(errors) => {
            report_errors(config, &errors);
            65
        }
    }
}

fn run_evaluate(source: &str, config: &AppConfig) -> u8 {
    verbose_log(config, "Evaluating");
    let program = match interpreter::parse(source) {
        Ok(program) => program,
        Err(errors) => {
            report_errors(config, &errors);
            return 65;
        }
    };

    let stdout = io::stdout();
    let mut interpreter = Interpreter::new(stdout.lock());
    match interpreter.run(&program) {
        Ok(()) => 0,
        Err(err) => {
            error_message(config, &err.to_string());
            70
        }
    }
}

fn report_errors(config: &AppConfig, errors: &[String]) {
    for error in errors {
        error_message(config, error);
    }
}

fn verbose_log(config: &AppConfig, message: &str) {
    if config.verbose {
        eprintln!("[loxide:debug] {}", message);
    }
}

fn error_message(config: &AppConfig, message: &str) {
    if config.color_enabled {
        eprintln!("{}", message.red().bold());
    } else {
        eprintln!("{}", message);
    }
}
