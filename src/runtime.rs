use crate::ast::{BinaryOp, Expr, Literal, Stmt, UnaryOp};
use crate::error::runtime_error;
use crate::tokenizer::Token;
use crate::{
    environment::{assign, Environment},
    error::Result,
};
use log::trace;
use std::{
    fmt::{self, Debug, Display, Formatter},
    io::Write,
};

#[derive(Clone, PartialEq)]
pub enum Value {
    Number(f64),
    String(String),
    Boolean(bool),
    Nil,
}

impl Value {
    /// Only `nil` and `false` are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Boolean(false))
    }
}

impl From<&Literal> for Value {
    fn from(lit: &Literal) -> Self {
        match lit {
            Literal::Number(n) => Value::Number(*n),
            Literal::String(s) => Value::String(s.clone()),
            Literal::Boolean(b) => Value::Boolean(*b),
            Literal::Nil => Value::Nil,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Value::Number(n) => {
                let text = n.to_string();
                write!(f, "{}", text.strip_suffix(".0").unwrap_or(text.as_str()))
            }
            Value::String(s) => write!(f, "{}", s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Nil => write!(f, "nil"),
        }
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Value::String(s) = self {
            write!(f, "\"{}\"", s)
        } else {
            write!(f, "{}", self)
        }
    }
}

/// Tree-walking interpreter. `print` output goes to `out`; the global scope
/// lives as long as the interpreter does.
pub struct Interpreter<W: Write> {
    globals: Environment,
    out: W,
}

impl<W: Write> Interpreter<W> {
    pub fn new(out: W) -> Self {
        Interpreter {
            globals: Environment::new(),
            out,
        }
    }

    pub fn globals(&self) -> &Environment {
        &self.globals
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Executes statements in order, stopping at the first runtime error.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<()> {
        execute_all(statements, &mut self.globals, &mut self.out)
    }

    /// Writes the textual form of `value` followed by a newline.
    pub fn emit(&mut self, value: &Value) -> Result<()> {
        emit(&mut self.out, value)
    }

    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        evaluate(expr, &mut self.globals)
    }
}

fn emit(out: &mut impl Write, value: &Value) -> Result<()> {
    writeln!(out, "{}", value)?;
    Ok(())
}

fn execute_all(statements: &[Stmt], env: &mut Environment, out: &mut impl Write) -> Result<()> {
    for stmt in statements {
        execute(stmt, env, out)?;
    }
    Ok(())
}

fn execute(stmt: &Stmt, env: &mut Environment, out: &mut impl Write) -> Result<()> {
    match stmt {
        Stmt::Expression(expr) => {
            evaluate(expr, env)?;
        }
        Stmt::Print(expr) => {
            let value = evaluate(expr, env)?;
            emit(out, &value)?;
        }
        Stmt::Var { name, initializer } => {
            let value = match initializer {
                Some(init) => evaluate(init, env)?,
                None => Value::Nil,
            };
            trace!("define {} = {:?}", name.lexeme, value);
            env.insert(name.lexeme.clone(), value);
        }
        Stmt::Block(statements) => {
            trace!("entering block of {} statement(s)", statements.len());
            // Dropped on every exit path, taking the block's bindings with it.
            let mut block_env = env.extend();
            execute_all(statements, &mut block_env, out)?;
        }
    }
    Ok(())
}

fn evaluate(expr: &Expr, env: &mut Environment) -> Result<Value> {
    match expr {
        Expr::Literal(lit) => Ok(Value::from(lit)),
        Expr::Grouping(expr) => evaluate(expr, env),
        Expr::Unary {
            operator,
            token,
            right,
        } => {
            let right_val = evaluate(right, env)?;
            evaluate_unary(*operator, token, right_val)
        }
        Expr::Binary {
            left,
            operator,
            token,
            right,
        } => {
            let left_val = evaluate(left, env)?;
            let right_val = evaluate(right, env)?;
            evaluate_binary(*operator, token, left_val, right_val)
        }
        Expr::Variable(name) => match env.get(&name.lexeme) {
            Some(value) => Ok(value),
            None => undefined_variable(name),
        },
        Expr::Assign { name, value } => {
            let new_value = evaluate(value, env)?;
            if assign(env, &name.lexeme, new_value.clone()) {
                Ok(new_value)
            } else {
                undefined_variable(name)
            }
        }
    }
}

fn undefined_variable<T>(name: &Token) -> Result<T> {
    runtime_error(format!("Undefined variable '{}'.", name.lexeme), name)
}

fn evaluate_unary(operator: UnaryOp, token: &Token, right_val: Value) -> Result<Value> {
    match operator {
        UnaryOp::Negate => match right_val {
            Value::Number(n) => Ok(Value::Number(-n)),
            _ => runtime_error("Operand must be a number.", token),
        },
        UnaryOp::Not => Ok(Value::Boolean(!right_val.is_truthy())),
    }
}

fn evaluate_binary(
    operator: BinaryOp,
    token: &Token,
    left_val: Value,
    right_val: Value,
) -> Result<Value> {
    match operator {
        BinaryOp::Equal => return Ok(Value::Boolean(left_val == right_val)),
        BinaryOp::NotEqual => return Ok(Value::Boolean(left_val != right_val)),
        BinaryOp::Add => {
            return match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
                _ => runtime_error("Operands must be two numbers or two strings.", token),
            }
        }
        _ => (),
    }

    let (a, b) = match (left_val, right_val) {
        (Value::Number(a), Value::Number(b)) => (a, b),
        _ => return runtime_error("Operands must be numbers.", token),
    };

    Ok(match operator {
        BinaryOp::Subtract => Value::Number(a - b),
        BinaryOp::Multiply => Value::Number(a * b),
        // IEEE semantics: x / 0 is infinite, 0 / 0 is NaN.
        BinaryOp::Divide => Value::Number(a / b),
        BinaryOp::Less => Value::Boolean(a < b),
        BinaryOp::LessEqual => Value::Boolean(a <= b),
        BinaryOp::Greater => Value::Boolean(a > b),
        BinaryOp::GreaterEqual => Value::Boolean(a >= b),
        BinaryOp::Add | BinaryOp::Equal | BinaryOp::NotEqual => unreachable!(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::parser::parse;
    use crate::tokenizer::tokenize;

    fn statements(source: &str) -> Vec<Stmt> {
        let (tokens, lex_errors) = tokenize(source);
        assert!(lex_errors.is_empty());
        let (statements, errors) = parse(&tokens);
        assert!(errors.is_empty());
        statements
    }

    fn run(source: &str) -> (Result<()>, String) {
        let mut interpreter = Interpreter::new(Vec::new());
        let result = interpreter.interpret(&statements(source));
        let output = String::from_utf8(interpreter.into_output()).unwrap_or_default();
        (result, output)
    }

    fn eval(source: &str) -> Result<Value> {
        let mut interpreter = Interpreter::new(Vec::new());
        match statements(&format!("{};", source)).as_slice() {
            [Stmt::Expression(expr)] => interpreter.evaluate(expr),
            _ => panic!("Expected a single expression"),
        }
    }

    fn runtime_message(result: Result<Value>) -> String {
        match result {
            Err(Error::Runtime { message, .. }) => message,
            other => panic!("Expected runtime error, got {:?}", other.map(|v| v.to_string())),
        }
    }

    #[test]
    fn test_basic_arithmetic() -> Result<()> {
        assert_eq!(eval("2 + 3")?, Value::Number(5.0));
        assert_eq!(eval("10 - 4 - 3")?, Value::Number(3.0));
        assert_eq!(eval("2 * 3 + 4")?, Value::Number(10.0));
        assert_eq!(eval("7 / 2")?, Value::Number(3.5));
        assert_eq!(eval("-(1 + 2)")?, Value::Number(-3.0));
        Ok(())
    }

    #[test]
    fn test_comparison_and_equality() -> Result<()> {
        assert_eq!(eval("1 < 2")?, Value::Boolean(true));
        assert_eq!(eval("2 <= 2")?, Value::Boolean(true));
        assert_eq!(eval("1 > 2")?, Value::Boolean(false));
        assert_eq!(eval("3 >= 4")?, Value::Boolean(false));
        assert_eq!(eval("1 == 1")?, Value::Boolean(true));
        assert_eq!(eval("\"a\" == \"a\"")?, Value::Boolean(true));
        assert_eq!(eval("1 == \"1\"")?, Value::Boolean(false));
        assert_eq!(eval("nil == nil")?, Value::Boolean(true));
        assert_eq!(eval("nil == false")?, Value::Boolean(false));
        assert_eq!(eval("true != false")?, Value::Boolean(true));
        Ok(())
    }

    #[test]
    fn test_truthiness() -> Result<()> {
        assert_eq!(eval("!nil")?, Value::Boolean(true));
        assert_eq!(eval("!false")?, Value::Boolean(true));
        assert_eq!(eval("!0")?, Value::Boolean(false));
        assert_eq!(eval("!\"\"")?, Value::Boolean(false));
        assert_eq!(eval("!!true")?, Value::Boolean(true));
        Ok(())
    }

    #[test]
    fn test_string_concatenation() -> Result<()> {
        assert_eq!(
            eval("\"foo\" + \"bar\"")?,
            Value::String("foobar".to_string())
        );
        assert_eq!(eval("\"\" + \"\"")?, Value::String(String::new()));
        Ok(())
    }

    #[test]
    fn test_type_errors() {
        assert_eq!(
            runtime_message(eval("\"s\" + 1")),
            "Operands must be two numbers or two strings."
        );
        assert_eq!(
            runtime_message(eval("true + nil")),
            "Operands must be two numbers or two strings."
        );
        assert_eq!(
            runtime_message(eval("1 - \"x\"")),
            "Operands must be numbers."
        );
        assert_eq!(runtime_message(eval("\"a\" < \"b\"")), "Operands must be numbers.");
        assert_eq!(runtime_message(eval("-\"x\"")), "Operand must be a number.");
    }

    #[test]
    fn test_error_line_comes_from_operator() {
        match eval("1 +\n\n\"x\"") {
            Err(Error::Runtime { line, .. }) => assert_eq!(line, 1),
            _ => panic!("Expected runtime error"),
        }
    }

    #[test]
    fn test_division_by_zero_follows_ieee() -> Result<()> {
        assert_eq!(eval("1 / 0")?, Value::Number(f64::INFINITY));
        assert_eq!(eval("-1 / 0")?, Value::Number(f64::NEG_INFINITY));
        match eval("0 / 0")? {
            Value::Number(n) => assert!(n.is_nan()),
            other => panic!("Expected number, got {}", other),
        }
        Ok(())
    }

    #[test]
    fn test_grouping_is_transparent() -> Result<()> {
        for source in ["1 + 2 * 3", "\"a\" + \"b\"", "!nil", "-4.5", "1 < 2"] {
            assert_eq!(eval(source)?, eval(&format!("({})", source))?);
        }
        Ok(())
    }

    #[test]
    fn test_variable_binding() -> Result<()> {
        let (result, output) = run("var x = 42; print x; x = 24; print x; var y; print y;");
        result?;
        assert_eq!(output, "42\n24\nnil\n");
        Ok(())
    }

    #[test]
    fn test_lexical_scoping() -> Result<()> {
        let (result, output) = run("var x = 1; { var x = 2; print x; } print x;");
        result?;
        assert_eq!(output, "2\n1\n");

        let (result, output) = run("var x = 1; { x = 2; } print x;");
        result?;
        assert_eq!(output, "2\n");

        let (result, output) = run(
            "var a = \"global\"; { var b = \"outer\"; { var c = \"inner\"; print a + b + c; } }",
        );
        result?;
        assert_eq!(output, "globalouterinner\n");
        Ok(())
    }

    #[test]
    fn test_undefined_variables() {
        let (result, output) = run("print 1; print missing; print 2;");
        assert_eq!(output, "1\n");
        match result {
            Err(Error::Runtime { message, line }) => {
                assert_eq!(message, "Undefined variable 'missing'.");
                assert_eq!(line, 1);
            }
            _ => panic!("Expected runtime error"),
        }

        let (result, output) = run("{ var inner = 1; } inner = 2;");
        assert!(matches!(result, Err(Error::Runtime { .. })));
        assert_eq!(output, "");
    }

    #[test]
    fn test_failed_block_restores_scope() {
        let mut interpreter = Interpreter::new(Vec::new());
        let source = "var x = 1; { var x = 2; var z = 0; { -nil; } }";
        let result = interpreter.interpret(&statements(source));
        assert!(result.is_err());

        let globals = interpreter.globals();
        assert_eq!(globals.get(&"x".to_string()), Some(Value::Number(1.0)));
        assert_eq!(globals.get(&"z".to_string()), None);

        // The global scope is the one still in use after the failed block.
        interpreter
            .interpret(&statements("var y = 3;"))
            .expect("global definition succeeds");
        assert_eq!(
            interpreter.globals().get(&"y".to_string()),
            Some(Value::Number(3.0))
        );
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Number(4.0).to_string(), "4");
        assert_eq!(Value::Number(4.5).to_string(), "4.5");
        assert_eq!(Value::Number(-0.25).to_string(), "-0.25");
        assert_eq!(Value::Number(1e21).to_string(), "1000000000000000000000");
        assert_eq!(Value::Number(f64::INFINITY).to_string(), "inf");
        assert_eq!(Value::String("hello".to_string()).to_string(), "hello");
        assert_eq!(Value::Boolean(true).to_string(), "true");
        assert_eq!(Value::Nil.to_string(), "nil");
    }

    #[test]
    fn test_value_debug() {
        assert_eq!(format!("{:?}", Value::Number(42.0)), "42");
        assert_eq!(format!("{:?}", Value::String("hello".to_string())), "\"hello\"");
        assert_eq!(format!("{:?}", Value::Nil), "nil");
    }
}
