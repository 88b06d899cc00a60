use itertools::{Itertools, PeekingNext};

use super::{CompileErrorType, Result};

#[derive(PartialEq, Debug)]
pub enum Token {
    Arrow,
    Or,
    Lambda,
    Variable(String),
    Terminal(String)
}

// Lexes a bracketed variable such as `<X1>`, starting at the open bracket
pub fn lex_variable(line: &mut impl PeekingNext<Item = char>) -> Result<Token> {
    line.next(); // Consume open bracket
    let name: String = line.peeking_take_while(|&c| c != '>').collect();

    // Check if there is a close bracket and consume it if there is
    if line.next() != Some('>') {
        return Err(CompileErrorType::UnmatchedBracket);
    }
    if name.trim().is_empty() {
        return Err(CompileErrorType::MissingVariable);
    }

    Ok(Token::Variable(name))
}

pub fn lex_line(line: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();

    let mut line_chars = line.chars().peekable();

    while let Some(&c) = line_chars.peek() {
        if c == '<' {
            tokens.push(lex_variable(&mut line_chars)?);
            continue;
        }

        line_chars.next();
        if c == '|' {
            tokens.push(Token::Or);
        } else if c == '→' {
            tokens.push(Token::Arrow);
        } else if c == '-' {
            // A lone dash is an ordinary terminal
            if line_chars.next_if_eq(&'>').is_some() {
                tokens.push(Token::Arrow);
            } else {
                tokens.push(Token::Terminal(c.to_string()));
            }
        } else if c == 'λ' {
            tokens.push(Token::Lambda);
        } else if c.is_uppercase() {
            tokens.push(Token::Variable(c.to_string()));
        } else if !c.is_whitespace() {
            tokens.push(Token::Terminal(c.to_string()));
        }
    }

    Ok(tokens)
}
