use crate::{
    ast::{BinaryOp, Expr, Literal, Stmt, UnaryOp},
    error::{parser_error, Error, Result},
    tokenizer::{Token, TokenType},
};
use log::debug;

/// Parses a whole program. Every malformed declaration is reported in the
/// returned error list and skipped; the statements around it are kept.
pub fn parse(tokens: &[Token]) -> (Vec<Stmt>, Vec<Error>) {
    // Assert tokens end with EOF
    assert!(
        tokens
            .last()
            .is_some_and(|t| t.token_type == TokenType::EOF),
        "Token slice must be terminated by EOF"
    );

    let mut parser = Parser {
        tokens,
        current: 0,
        errors: Vec::new(),
    };

    let mut statements = Vec::new();
    while !parser.ended() {
        if let Some(stmt) = parser.parse_declaration() {
            statements.push(stmt);
        }
    }

    (statements, parser.errors)
}

struct Parser<'a> {
    tokens: &'a [Token],
    current: usize,
    errors: Vec<Error>,
}

impl Parser<'_> {
    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn ended(&self) -> bool {
        self.peek().token_type == TokenType::EOF
    }

    fn check(&self, token_type: TokenType) -> bool {
        self.peek().token_type == token_type
    }

    fn advance(&mut self) -> Token {
        if !self.ended() {
            self.current += 1;
        }
        self.previous().clone()
    }

    /// Consumes the next token if it is any of `types`.
    fn match_any(&mut self, types: &[TokenType]) -> Option<Token> {
        if types.contains(&self.peek().token_type) {
            Some(self.advance())
        } else {
            None
        }
    }

    fn consume(&mut self, token_type: TokenType, message: &str) -> Result<Token> {
        if self.check(token_type) {
            Ok(self.advance())
        } else {
            parser_error(message, self.peek())
        }
    }

    // Failed declarations yield `None` after the error is recorded and the
    // parser has moved on to the next statement boundary.
    fn parse_declaration(&mut self) -> Option<Stmt> {
        let start = self.current;
        let result = if self.match_any(&[TokenType::Var]).is_some() {
            self.parse_var()
        } else {
            self.parse_statement()
        };

        match result {
            Ok(stmt) => Some(stmt),
            Err(err) => {
                debug!("{}", err);
                self.errors.push(err);
                self.synchronize(start);
                None
            }
        }
    }

    /// Discards tokens from the error point up to the next statement
    /// boundary. A declaration that failed on its very first token always
    /// gives that token up, so the parser keeps making progress.
    fn synchronize(&mut self, start: usize) {
        if self.current == start {
            self.advance();
        }

        while !self.ended() {
            if self.previous().token_type == TokenType::Semicolon {
                break;
            }

            match self.peek().token_type {
                TokenType::Class
                | TokenType::Fun
                | TokenType::Var
                | TokenType::For
                | TokenType::If
                | TokenType::While
                | TokenType::Print
                | TokenType::Return => break,
                _ => {
                    self.advance();
                }
            }
        }

        debug!(
            "synchronized: resuming at line {} after skipping from token {}",
            self.peek().line,
            start
        );
    }

    fn parse_var(&mut self) -> Result<Stmt> {
        let name = self.consume(TokenType::Identifier, "Expected variable name.")?;

        let initializer = if self.match_any(&[TokenType::Equal]).is_some() {
            Some(self.parse_expression()?)
        } else {
            None
        };

        self.consume(
            TokenType::Semicolon,
            "Expected ';' after variable declaration.",
        )?;

        Ok(Stmt::Var { name, initializer })
    }

    fn parse_statement(&mut self) -> Result<Stmt> {
        if self.match_any(&[TokenType::Print]).is_some() {
            let value = self.parse_expression()?;
            self.consume(TokenType::Semicolon, "Expected ';' after value.")?;
            return Ok(Stmt::Print(value));
        }

        if self.match_any(&[TokenType::LeftBrace]).is_some() {
            return Ok(Stmt::Block(self.parse_block()?));
        }

        let expr = self.parse_expression()?;
        self.consume(TokenType::Semicolon, "Expected ';' after expression.")?;
        Ok(Stmt::Expression(expr))
    }

    fn parse_block(&mut self) -> Result<Vec<Stmt>> {
        let mut statements = Vec::new();

        while !self.check(TokenType::RightBrace) && !self.ended() {
            if let Some(stmt) = self.parse_declaration() {
                statements.push(stmt);
            }
        }

        self.consume(TokenType::RightBrace, "Expected '}' after block.")?;
        Ok(statements)
    }

    fn parse_expression(&mut self) -> Result<Expr> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Result<Expr> {
        let expr = self.parse_equality()?;

        if let Some(equals) = self.match_any(&[TokenType::Equal]) {
            let value = self.parse_assignment()?;

            return match expr {
                Expr::Variable(name) => Ok(Expr::Assign {
                    name,
                    value: Box::new(value),
                }),
                _ => {
                    // Reported, but the statement itself stays parseable.
                    if let Err(err) = parser_error::<()>("Invalid assignment target.", &equals) {
                        debug!("{}", err);
                        self.errors.push(err);
                    }
                    Ok(expr)
                }
            };
        }

        Ok(expr)
    }

    /// One left-associative precedence level: `operand ( op operand )*`.
    fn parse_binary(
        &mut self,
        operators: &[TokenType],
        operand: fn(&mut Self) -> Result<Expr>,
    ) -> Result<Expr> {
        let mut expr = operand(self)?;

        while let Some(token) = self.match_any(operators) {
            let right = operand(self)?;
            expr = Expr::Binary {
                left: Box::new(expr),
                operator: binary_op(token.token_type),
                token,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn parse_equality(&mut self) -> Result<Expr> {
        self.parse_binary(
            &[TokenType::BangEqual, TokenType::EqualEqual],
            Self::parse_comparison,
        )
    }

    fn parse_comparison(&mut self) -> Result<Expr> {
        self.parse_binary(
            &[
                TokenType::Greater,
                TokenType::GreaterEqual,
                TokenType::Less,
                TokenType::LessEqual,
            ],
            Self::parse_term,
        )
    }

    fn parse_term(&mut self) -> Result<Expr> {
        self.parse_binary(&[TokenType::Minus, TokenType::Plus], Self::parse_factor)
    }

    fn parse_factor(&mut self) -> Result<Expr> {
        self.parse_binary(&[TokenType::Slash, TokenType::Star], Self::parse_unary)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        if let Some(token) = self.match_any(&[TokenType::Bang, TokenType::Minus]) {
            let operator = match token.token_type {
                TokenType::Bang => UnaryOp::Not,
                _ => UnaryOp::Negate,
            };
            let right = self.parse_unary()?;

            return Ok(Expr::Unary {
                operator,
                token,
                right: Box::new(right),
            });
        }

        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let token = self.peek().clone();

        let expr = match token.token_type {
            TokenType::False => Expr::Literal(Literal::Boolean(false)),
            TokenType::True => Expr::Literal(Literal::Boolean(true)),
            TokenType::Nil => Expr::Literal(Literal::Nil),
            TokenType::Number | TokenType::String => {
                Expr::Literal(token.literal.clone().unwrap_or(Literal::Nil))
            }
            TokenType::Identifier => Expr::Variable(token),
            TokenType::LeftParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.consume(TokenType::RightParen, "Expected ')' after expression.")?;
                return Ok(Expr::Grouping(Box::new(expr)));
            }
            _ => return parser_error("Expected expression.", &token),
        };

        self.advance();
        Ok(expr)
    }
}

fn binary_op(token_type: TokenType) -> BinaryOp {
    match token_type {
        TokenType::Plus => BinaryOp::Add,
        TokenType::Minus => BinaryOp::Subtract,
        TokenType::Star => BinaryOp::Multiply,
        TokenType::Slash => BinaryOp::Divide,
        TokenType::EqualEqual => BinaryOp::Equal,
        TokenType::BangEqual => BinaryOp::NotEqual,
        TokenType::Less => BinaryOp::Less,
        TokenType::LessEqual => BinaryOp::LessEqual,
        TokenType::Greater => BinaryOp::Greater,
        TokenType::GreaterEqual => BinaryOp::GreaterEqual,
        _ => unreachable!("not a binary operator: {:?}", token_type),
    }
}
