use crate::tokenizer::{Token, TokenType};
use nu_ansi_term::Color;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("io error: {0}")]
    IO(#[from] std::io::Error),
    #[error("[line {line}] Error: {message}")]
    Tokenizer { line: usize, message: String },
    #[error("[line {line}] Error{location}: {message}")]
    Parser {
        line: usize,
        location: String,
        message: String,
    },
    #[error("{message}\n[line {line}]")]
    Runtime { line: usize, message: String },
}

impl Error {
    /// Lexical and parse errors, i.e. everything found before execution starts.
    pub fn is_static(&self) -> bool {
        matches!(self, Error::Tokenizer { .. } | Error::Parser { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

pub fn parser_error<T>(message: &str, token: &Token) -> Result<T> {
    let location = match token.token_type {
        TokenType::EOF => " at end".to_string(),
        _ => format!(" at '{}'", token.lexeme),
    };

    Err(Error::Parser {
        line: token.line,
        location,
        message: message.to_string(),
    })
}

pub fn runtime_error<T>(message: impl Into<String>, token: &Token) -> Result<T> {
    Err(Error::Runtime {
        line: token.line,
        message: message.into(),
    })
}

/// Receives every diagnostic produced while running source text.
pub trait Reporter {
    fn report(&mut self, error: &Error);
}

pub struct StderrReporter;

impl Reporter for StderrReporter {
    fn report(&mut self, error: &Error) {
        eprintln!("{}", Color::Red.paint(error.to_string()));
    }
}

impl Reporter for Vec<String> {
    fn report(&mut self, error: &Error) {
        self.push(error.to_string());
    }
}
