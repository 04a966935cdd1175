use nu_ansi_term::{Color, Style};
use reedline::{
    Highlighter, Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus,
    StyledText, ValidationResult, Validator,
};
use std::borrow::Cow;

use crate::tokenizer::{tokenize, TokenType};

#[derive(Clone)]
pub struct REPLPrompt;

impl Prompt for REPLPrompt {
    fn render_prompt_left(&self) -> Cow<str> {
        Cow::Borrowed("loxwalk")
    }

    fn render_prompt_right(&self) -> Cow<str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, _edit_mode: PromptEditMode) -> Cow<str> {
        Cow::Borrowed("❯ ")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<str> {
        Cow::Borrowed("  ... ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };
        Cow::Owned(format!(
            "({}reverse-search: {}) ",
            prefix, history_search.term
        ))
    }
}

/// Keeps reading lines while a string or a `(`/`{` group is still open.
pub struct REPLValidator;

impl Validator for REPLValidator {
    fn validate(&self, line: &str) -> ValidationResult {
        let mut delimiters = Vec::new();
        let mut in_string = false;
        let mut chars = line.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '"' => in_string = !in_string,
                _ if in_string => (),
                '/' if chars.peek() == Some(&'/') => {
                    for next in chars.by_ref() {
                        if next == '\n' {
                            break;
                        }
                    }
                }
                '{' | '(' => delimiters.push(c),
                '}' => {
                    if delimiters.pop() != Some('{') {
                        return ValidationResult::Complete;
                    }
                }
                ')' => {
                    if delimiters.pop() != Some('(') {
                        return ValidationResult::Complete;
                    }
                }
                _ => (),
            }
        }

        if in_string || !delimiters.is_empty() {
            ValidationResult::Incomplete
        } else {
            ValidationResult::Complete
        }
    }
}

pub static KEYWORD_COLOR: Color = Color::LightBlue;
pub static LITERAL_COLOR: Color = Color::Yellow;
pub static DEFAULT_COLOR: Color = Color::White;
pub static OPERATOR_COLOR: Color = Color::DarkGray;

pub struct SyntaxHighlighter;

fn token_color(token_type: TokenType) -> Color {
    match token_type {
        TokenType::And
        | TokenType::Class
        | TokenType::Else
        | TokenType::False
        | TokenType::For
        | TokenType::Fun
        | TokenType::If
        | TokenType::Nil
        | TokenType::Or
        | TokenType::Print
        | TokenType::Return
        | TokenType::Super
        | TokenType::This
        | TokenType::True
        | TokenType::Var
        | TokenType::While => KEYWORD_COLOR,
        TokenType::String | TokenType::Number => LITERAL_COLOR,
        TokenType::Identifier | TokenType::EOF => DEFAULT_COLOR,
        _ => OPERATOR_COLOR,
    }
}

impl Highlighter for SyntaxHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let mut styled_text = StyledText::new();

        // Lexical errors are ignored here; the offending text stays uncoloured.
        let (tokens, _) = tokenize(line);

        let mut cursor = 0;

        for token in tokens {
            if token.token_type == TokenType::EOF {
                break;
            }

            // Comments, whitespace and unexpected characters between tokens.
            if token.offset > cursor {
                styled_text.push((
                    Style::new().fg(DEFAULT_COLOR),
                    line[cursor..token.offset].to_string(),
                ));
            }

            styled_text.push((
                Style::new().fg(token_color(token.token_type)),
                token.lexeme.clone(),
            ));
            cursor = token.offset + token.lexeme.len();
        }

        if cursor < line.len() {
            styled_text.push((Style::new().fg(DEFAULT_COLOR), line[cursor..].to_string()));
        }

        styled_text
    }
}
