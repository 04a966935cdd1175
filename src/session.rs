use crate::{
    ast::Stmt,
    error::Reporter,
    parser::parse,
    runtime::Interpreter,
    tokenizer::tokenize,
};
use log::debug;
use std::io::Write;

/// How a single run of source text ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    StaticError,
    RuntimeError,
}

impl Status {
    pub fn exit_code(self) -> u8 {
        match self {
            Status::Ok => 0,
            Status::StaticError => 65,
            Status::RuntimeError => 70,
        }
    }
}

/// Drives lex → parse → interpret. The interpreter outlives individual runs,
/// so variables defined on one REPL line are visible on the next, while each
/// run's status is computed from scratch.
pub struct Session<W: Write, R: Reporter> {
    interpreter: Interpreter<W>,
    reporter: R,
}

impl<W: Write, R: Reporter> Session<W, R> {
    pub fn new(out: W, reporter: R) -> Self {
        Session {
            interpreter: Interpreter::new(out),
            reporter,
        }
    }

    pub fn interpreter(&self) -> &Interpreter<W> {
        &self.interpreter
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn into_parts(self) -> (W, R) {
        (self.interpreter.into_output(), self.reporter)
    }

    pub fn run(&mut self, source: &str) -> Status {
        match self.front_end(source) {
            Some(statements) => self.execute(&statements, false),
            None => Status::StaticError,
        }
    }

    /// Like [`Session::run`], but a line holding a single expression
    /// statement also prints the expression's value.
    pub fn run_interactive(&mut self, line: &str) -> Status {
        match self.front_end(line) {
            Some(statements) => self.execute(&statements, true),
            None => Status::StaticError,
        }
    }

    fn front_end(&mut self, source: &str) -> Option<Vec<Stmt>> {
        let (tokens, lex_errors) = tokenize(source);
        let (statements, parse_errors) = parse(&tokens);

        let mut had_error = false;
        for err in lex_errors.iter().chain(parse_errors.iter()) {
            self.reporter.report(err);
            had_error = true;
        }

        if had_error {
            debug!(
                "{} lexical and {} parse error(s); skipping execution",
                lex_errors.len(),
                parse_errors.len()
            );
            None
        } else {
            Some(statements)
        }
    }

    fn execute(&mut self, statements: &[Stmt], echo: bool) -> Status {
        let result = match statements {
            [Stmt::Expression(expr)] if echo => self
                .interpreter
                .evaluate(expr)
                .and_then(|value| self.interpreter.emit(&value)),
            _ => self.interpreter.interpret(statements),
        };

        match result {
            Ok(()) => Status::Ok,
            Err(err) => {
                debug!("run aborted: {:?}", err);
                self.reporter.report(&err);
                Status::RuntimeError
            }
        }
    }
}
