/*
    This module parses grammar files
*/

mod lexer;
mod verifier;

use std::fmt::Display;
use std::fs::File;
use std::io::BufRead;
use std::path::Path;

use crate::grammar::*;
use crate::error_handling::*;
use itertools::Itertools;
use lexer::*;
use verifier::verify_rules;

// Where errors point when the grammar did not come from a file
const INLINE_SOURCE: &str = "<inline>";

#[derive(Debug)]
pub enum CompileErrorType {
    // A line which should contain a rule does not have an arrow
    MissingArrow,
    // A rule has multiple arrows
    UnexpectedArrow,
    // The user starts a rule line with something other than a variable
    MissingVariable,
    // There is an unclosed `<`
    UnmatchedBracket,
    // A variable is used but never defined
    UndefinedVariable(String),
    // Somehow a full rule body was parsed as a single alternative
    // This is a problem with the parser, not the grammar
    UnsplitRewrite,
    // A blank line got too deep into the parser
    // This is a problem with the parser, not the grammar
    UnexpectedBlankLine,
    // There was an issue with reading a file
    FileError(std::io::Error),
    // The file holds no rules at all
    EmptyGrammar,
}

impl ErrorType for CompileErrorType {}

impl PartialEq for CompileErrorType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CompileErrorType::FileError(a), CompileErrorType::FileError(b)) => a.kind() == b.kind(),
            (CompileErrorType::UndefinedVariable(a), CompileErrorType::UndefinedVariable(b)) => a == b,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

impl Display for CompileErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileErrorType::MissingArrow => write!(f, "Expected `->` after variable"),
            CompileErrorType::UnexpectedArrow => write!(f, "Unexpected `->` encountered"),
            CompileErrorType::MissingVariable => write!(f, "Tried to define something other than a variable"),
            CompileErrorType::UnmatchedBracket => write!(f, "Unmatched `<`"),
            CompileErrorType::UndefinedVariable(variable) => write!(f, "Could not find definition for `{}`", variable),
            CompileErrorType::UnsplitRewrite => write!(f, "Rule body was not fully split (this is a problem with the parser, not the grammar)"),
            CompileErrorType::UnexpectedBlankLine => write!(f, "Blank line encountered in rule parser (this is a problem with the parser, not the grammar)"),
            CompileErrorType::FileError(e) => write!(f, "File error: {}", e),
            CompileErrorType::EmptyGrammar => write!(f, "No rules found"),
        }
    }
}

pub type CompileError = Error<CompileErrorType>;
pub type CompileErrors = Errors<CompileErrorType>;

fn io_error(error: std::io::Error, file: &Path) -> CompileError {
    CompileError::at_file(file.to_path_buf(), CompileErrorType::FileError(error))
}

pub type Result<T> = std::result::Result<T, CompileErrorType>;
pub type LineResult<T> = std::result::Result<T, CompileError>;
pub type FileResult<T> = std::result::Result<T, CompileErrors>;

// One line of the file: a variable and its alternatives
#[derive(PartialEq, Debug)]
pub struct Rule {
    variable: String,
    alternatives: Vec<Vec<Symbol>>,
    location: Location
}

fn parse_alternative(tokens: &[Token]) -> Result<Vec<Symbol>> {
    // `λ` stands for nothing, so it simply drops out
    tokens.iter().filter_map(|t| match t {
        Token::Arrow => Some(Err(CompileErrorType::UnexpectedArrow)),
        Token::Or => Some(Err(CompileErrorType::UnsplitRewrite)),
        Token::Lambda => None,
        Token::Variable(s) => Some(Ok(Symbol::Variable(s.clone()))),
        Token::Terminal(s) => Some(Ok(Symbol::Terminal(s.clone())))
    }).collect()
}

fn parse_alternatives(tokens: &[Token]) -> Result<Vec<Vec<Symbol>>> {
    tokens.split(|t| *t == Token::Or).map(parse_alternative).collect()
}

fn parse_line(tokens: &[Token], location: Location) -> Result<Rule> {
    let variable = match tokens.first() {
        Some(Token::Variable(s)) => Ok(s.clone()),
        Some(_) => Err(CompileErrorType::MissingVariable),
        None => Err(CompileErrorType::UnexpectedBlankLine)
    }?;

    if tokens.get(1) != Some(&Token::Arrow) {
        return Err(CompileErrorType::MissingArrow);
    }

    let alternatives = parse_alternatives(&tokens[2..])?;

    Ok(Rule {
        variable,
        alternatives,
        location
    })
}

fn parse_lex_line(line: &str, location: Location) -> LineResult<Rule> {
    lexer::lex_line(line)
        .and_then(|lexed_line| parse_line(&lexed_line, location.clone()))
        .map_err(|error| CompileError { location, error })
}

fn is_rule_line(line: &String) -> bool {
    let line = line.trim();
    !line.is_empty() && !line.starts_with(';')
}

// Returns an iterator over the rule lines of a reader, with the io errors
// wrapped in CompileError and the lines numbered from one
fn numbered_lines<'a>(reader: impl BufRead + 'a, path: &'a Path) -> impl Iterator<Item = (usize, LineResult<String>)> + 'a {
    reader
        .lines()
        .map(move |line| line.map_err(|e| io_error(e, path)))
        .enumerate()
        .filter(|(_, line)| line.as_ref().map_or(true, is_rule_line))
        .map(|(num, line)| (num + 1, line))
}

fn grammar_from_rules(rules: Vec<Rule>, start: Option<&str>, path: &Path) -> FileResult<Grammar> {
    let Some(first) = rules.first() else {
        return Err(vec![CompileError::at_file(path.to_path_buf(), CompileErrorType::EmptyGrammar)]);
    };
    let start = start.map_or_else(|| first.variable.clone(), str::to_string);

    verify_rules(&rules, &start, path)?;

    let productions = rules.into_iter().flat_map(|rule| {
        let variable = rule.variable;
        rule.alternatives.into_iter().map(move |rhs| Production::new(&variable, rhs))
    });

    Ok(Grammar::new(&start, productions))
}

// Parses every rule read from `reader`. Line errors are all collected
// before any is returned; `path` is only used for error locations.
pub fn parse_reader(reader: impl BufRead, path: &Path, start: Option<&str>) -> FileResult<Grammar> {
    let parsed_lines = numbered_lines(reader, path).map(|(num, line_res)| {
        line_res.and_then(|line| parse_lex_line(&line, Location {
            file: path.to_path_buf(),
            line: num
        }))
    });

    let (rules, errors): (Vec<_>, Vec<_>) = parsed_lines.partition_result();
    if !errors.is_empty() {
        return Err(errors);
    }

    grammar_from_rules(rules, start, path)
}

pub fn parse_file(path: &Path, start: Option<&str>) -> FileResult<Grammar> {
    let file = File::open(path).map_err(|e| vec![io_error(e, path)])?;
    parse_reader(std::io::BufReader::new(file), path, start)
}

pub fn parse_str(text: &str, start: Option<&str>) -> FileResult<Grammar> {
    parse_reader(text.as_bytes(), Path::new(INLINE_SOURCE), start)
}
