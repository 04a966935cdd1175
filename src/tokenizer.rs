use log::debug;

use crate::ast::Literal;
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,

    Comma,
    Dot,
    Semicolon,

    Plus,
    Minus,
    Star,
    Slash,

    Bang,
    Equal,
    Greater,
    Less,

    BangEqual,
    EqualEqual,
    GreaterEqual,
    LessEqual,

    Identifier,
    String,
    Number,

    And,
    Class,
    Else,
    False,
    For,
    Fun,
    If,
    Nil,
    Or,
    Print,
    Return,
    Super,
    This,
    True,
    Var,
    While,

    EOF,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    pub lexeme: String,
    pub literal: Option<Literal>,
    pub line: usize,
    /// Byte offset of the lexeme in the source.
    pub offset: usize,
}

/// Outcome of scanning from the cursor.
enum Scan {
    Token(TokenType, Option<Literal>),
    Skip,
    Error(String),
    EOF,
}

/// Scans the whole source. Lexical errors are collected and scanning carries
/// on, so the token list always covers every valid part of the input and ends
/// with a single `EOF`.
pub fn tokenize(source: &str) -> (Vec<Token>, Vec<Error>) {
    let mut cursor = 0;
    let mut line_number = 1;
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    loop {
        let (bytes_read, scan) = next_token(&source[cursor..]);
        let offset = cursor;
        let lexeme = &source[cursor..cursor + bytes_read];
        cursor += bytes_read;

        // Strings may span lines; their token carries the closing line.
        line_number += lexeme.bytes().filter(|&b| b == b'\n').count();

        match scan {
            Scan::Token(token_type, literal) => tokens.push(Token {
                token_type,
                lexeme: lexeme.to_string(),
                literal,
                line: line_number,
                offset,
            }),
            Scan::Skip => (),
            Scan::Error(message) => {
                debug!("{} on line {}", message, line_number);
                errors.push(Error::Tokenizer {
                    line: line_number,
                    message,
                });
            }
            Scan::EOF => {
                tokens.push(Token {
                    token_type: TokenType::EOF,
                    lexeme: String::new(),
                    literal: None,
                    line: line_number,
                    offset,
                });

                assert_eq!(cursor, source.len());

                return (tokens, errors);
            }
        }
    }
}

fn next_token(rest: &str) -> (usize, Scan) {
    let bytes = rest.as_bytes();
    let n = bytes.len();
    if n == 0 {
        return (0, Scan::EOF);
    }

    let cursor = bytes
        .iter()
        .take_while(|&&b| matches!(b, b' ' | b'\t' | b'\r' | b'\n'))
        .count();

    if cursor > 0 {
        return (cursor, Scan::Skip);
    }

    if n > 1 {
        let token_type = match &bytes[..2] {
            b"!=" => Some(TokenType::BangEqual),
            b"==" => Some(TokenType::EqualEqual),
            b"<=" => Some(TokenType::LessEqual),
            b">=" => Some(TokenType::GreaterEqual),
            _ => None,
        };

        if let Some(token_type) = token_type {
            return (2, Scan::Token(token_type, None));
        }

        if &bytes[..2] == b"//" {
            let end = bytes.iter().position(|&b| b == b'\n').unwrap_or(n);
            return (end, Scan::Skip);
        }
    }

    let token_type = match bytes[0] {
        b'(' => Some(TokenType::LeftParen),
        b')' => Some(TokenType::RightParen),
        b'{' => Some(TokenType::LeftBrace),
        b'}' => Some(TokenType::RightBrace),
        b',' => Some(TokenType::Comma),
        b'.' => Some(TokenType::Dot),
        b';' => Some(TokenType::Semicolon),
        b'+' => Some(TokenType::Plus),
        b'-' => Some(TokenType::Minus),
        b'*' => Some(TokenType::Star),
        b'/' => Some(TokenType::Slash),
        b'=' => Some(TokenType::Equal),
        b'!' => Some(TokenType::Bang),
        b'<' => Some(TokenType::Less),
        b'>' => Some(TokenType::Greater),
        _ => None,
    };

    if let Some(token_type) = token_type {
        return (1, Scan::Token(token_type, None));
    }

    if bytes[0] == b'"' {
        return match bytes[1..].iter().position(|&b| b == b'"') {
            Some(offset) => {
                let end_byte = offset + 1;
                (
                    end_byte + 1,
                    Scan::Token(
                        TokenType::String,
                        Some(Literal::String(rest[1..end_byte].to_string())),
                    ),
                )
            }
            None => (n, Scan::Error("Unterminated string.".to_string())),
        };
    }

    if bytes[0].is_ascii_digit() {
        let mut end_byte = digits(bytes, 0);

        // A dot only belongs to the number when a digit follows it.
        if end_byte + 1 < n && bytes[end_byte] == b'.' && bytes[end_byte + 1].is_ascii_digit() {
            end_byte = digits(bytes, end_byte + 1);
        }

        return match rest[..end_byte].parse() {
            Ok(number) => (
                end_byte,
                Scan::Token(TokenType::Number, Some(Literal::Number(number))),
            ),
            Err(err) => (end_byte, Scan::Error(err.to_string())),
        };
    }

    if bytes[0].is_ascii_alphabetic() || bytes[0] == b'_' {
        let end_byte = bytes
            .iter()
            .take_while(|&&b| b.is_ascii_alphanumeric() || b == b'_')
            .count();

        return (end_byte, Scan::Token(keyword(&bytes[..end_byte]), None));
    }

    // Skip the whole scalar so the cursor stays on a char boundary.
    let unexpected = rest.chars().next().unwrap_or('\0');
    (
        unexpected.len_utf8(),
        Scan::Error(format!("Unexpected character '{}'.", unexpected)),
    )
}

fn digits(bytes: &[u8], start: usize) -> usize {
    start
        + bytes[start..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
}

fn keyword(text: &[u8]) -> TokenType {
    match text {
        b"and" => TokenType::And,
        b"class" => TokenType::Class,
        b"else" => TokenType::Else,
        b"false" => TokenType::False,
        b"for" => TokenType::For,
        b"fun" => TokenType::Fun,
        b"if" => TokenType::If,
        b"nil" => TokenType::Nil,
        b"or" => TokenType::Or,
        b"print" => TokenType::Print,
        b"return" => TokenType::Return,
        b"super" => TokenType::Super,
        b"this" => TokenType::This,
        b"true" => TokenType::True,
        b"var" => TokenType::Var,
        b"while" => TokenType::While,
        _ => TokenType::Identifier,
    }
}
