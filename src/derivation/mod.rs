/*
    This module replays derivation traces
*/

use std::fmt::Display;

use crate::error_handling::*;
use crate::grammar::*;

#[derive(Debug, PartialEq)]
pub enum ReplayErrorType {
    // The leftmost variable is not the one the production rewrites
    Mismatch { step: usize, expected: String, production: Production },
    // The sentential form has no variable left to rewrite
    Exhausted { step: usize, production: Production },
}

impl ErrorType for ReplayErrorType {}

impl Display for ReplayErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplayErrorType::Mismatch { step, expected, production } => write!(
                f,
                "Step {} applies `{}` but the leftmost variable is {}",
                step + 1,
                production,
                Symbol::variable(expected)
            ),
            ReplayErrorType::Exhausted { step, production } => {
                write!(f, "Step {} applies `{}` to a form without variables", step + 1, production)
            }
        }
    }
}

pub type ReplayError = Error<ReplayErrorType>;

// Applies `trace` as a leftmost derivation from `start` and returns the
// sentential form it ends in.
pub fn leftmost(start: &str, trace: &[Production]) -> Result<Vec<Symbol>, ReplayErrorType> {
    let mut form = vec![Symbol::variable(start)];

    for (step, production) in trace.iter().enumerate() {
        let (position, expected) = form
            .iter()
            .enumerate()
            .find_map(|(i, symbol)| symbol.as_variable().map(|v| (i, v.to_string())))
            .ok_or_else(|| ReplayErrorType::Exhausted { step, production: production.clone() })?;

        if expected != production.lhs {
            return Err(ReplayErrorType::Mismatch { step, expected, production: production.clone() });
        }
        form.splice(position..position + 1, production.rhs.iter().cloned());
    }

    Ok(form)
}

// Writes a sentential form the way a right-hand side is written
pub fn sentence(form: &[Symbol]) -> String {
    form.iter().map(Symbol::to_string).collect()
}
