/*
    This module generates random sentences together with their derivations
*/

use rand::prelude::*;
use std::collections::HashMap;
use std::fmt::Display;

use crate::error_handling::*;
use crate::grammar::*;

#[derive(Debug, PartialEq)]
pub enum GenerateErrorType {
    // A variable without any production was reached
    UndefinedVariable(String),
    // The start symbol derives no terminal string at all
    EmptyLanguage(String),
}

impl ErrorType for GenerateErrorType {}

impl Display for GenerateErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerateErrorType::UndefinedVariable(variable) => {
                write!(f, "No production for variable `{}`", variable)
            }
            GenerateErrorType::EmptyLanguage(start) => {
                write!(f, "`{}` derives no terminal string", start)
            }
        }
    }
}

pub type GenerateError = Error<GenerateErrorType>;
pub type GenResult<T> = Result<T, GenerateErrorType>;

#[derive(Debug, PartialEq)]
pub struct Sentence {
    pub text: String,
    // Leftmost derivation of `text`
    pub derivation: DerivationTrace,
}

// The height of the lowest derivation tree each variable has. Variables
// missing from the map derive no terminal string.
fn heights(grammar: &Grammar) -> HashMap<&str, usize> {
    let mut heights: HashMap<&str, usize> = HashMap::new();

    let mut changed = true;
    while changed {
        changed = false;
        for production in grammar.productions() {
            let Some(height) = production_height(production, &heights) else {
                continue;
            };
            let known = heights.get(production.lhs.as_str());
            if known.map_or(true, |&k| height < k) {
                heights.insert(production.lhs.as_str(), height);
                changed = true;
            }
        }
    }

    heights
}

fn production_height(production: &Production, heights: &HashMap<&str, usize>) -> Option<usize> {
    production
        .rhs_variables()
        .map(|v| heights.get(v).copied())
        .try_fold(0, |highest, height| height.map(|h| highest.max(h)))
        .map(|highest| highest + 1)
}

struct Generator<'g, 'r, R: Rng + ?Sized> {
    grammar: &'g Grammar,
    heights: HashMap<&'g str, usize>,
    rng: &'r mut R,
    max_depth: usize,
    text: String,
    derivation: DerivationTrace,
}

impl<'g, 'r, R: Rng + ?Sized> Generator<'g, 'r, R> {
    fn variable(&mut self, variable: &str, depth: usize) -> GenResult<()> {
        let candidates: Vec<(&'g Production, usize)> = self
            .grammar
            .productions_of(variable)
            .filter_map(|p| production_height(p, &self.heights).map(|h| (p, h)))
            .collect();
        if candidates.is_empty() {
            return Err(GenerateErrorType::UndefinedVariable(variable.to_string()));
        }

        // Past the depth limit, only productions that lead to the lowest
        // possible tree are allowed, so generation always ends
        let chosen = if depth < self.max_depth {
            candidates.choose(&mut *self.rng).map(|(p, _)| *p)
        } else {
            let lowest = candidates.iter().map(|(_, h)| *h).min();
            let lowest_candidates: Vec<&'g Production> = candidates
                .iter()
                .filter(|(_, h)| Some(*h) == lowest)
                .map(|(p, _)| *p)
                .collect();
            lowest_candidates.choose(&mut *self.rng).copied()
        };
        let production = chosen.ok_or_else(|| GenerateErrorType::UndefinedVariable(variable.to_string()))?;

        self.derivation.push(production.clone());
        for symbol in &production.rhs {
            self.symbol(symbol, depth + 1)?;
        }
        Ok(())
    }

    fn symbol(&mut self, symbol: &Symbol, depth: usize) -> GenResult<()> {
        match symbol {
            Symbol::Variable(v) => self.variable(v, depth),
            Symbol::Terminal(t) => {
                self.text.push_str(t);
                Ok(())
            }
        }
    }
}

// Generates a random sentence of `grammar` by a leftmost derivation from
// its start symbol. After `max_depth` levels the generator heads for the
// shortest way out.
pub fn generate<R: Rng + ?Sized>(grammar: &Grammar, rng: &mut R, max_depth: usize) -> GenResult<Sentence> {
    let heights = heights(grammar);
    if grammar.productions_of(grammar.start()).next().is_none() {
        return Err(GenerateErrorType::UndefinedVariable(grammar.start().to_string()));
    }
    if !heights.contains_key(grammar.start()) {
        return Err(GenerateErrorType::EmptyLanguage(grammar.start().to_string()));
    }

    let mut generator = Generator {
        grammar,
        heights,
        rng,
        max_depth,
        text: String::new(),
        derivation: Vec::new(),
    };
    generator.variable(grammar.start(), 0)?;

    Ok(Sentence {
        text: generator.text,
        derivation: generator.derivation,
    })
}

// Generates a sentence with the thread's random number generator
pub fn generate_with_thread_rng(grammar: &Grammar, max_depth: usize) -> GenResult<Sentence> {
    generate(grammar, &mut thread_rng(), max_depth)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;

    use super::*;
    use crate::derivation::{leftmost, sentence};
    use crate::grammar::fixtures::*;

    #[test]
    fn heights_of_variables() {
        let g = grammar("S", &[("S", "AB"), ("A", "aA"), ("A", "a"), ("B", "S"), ("C", "cC")]);
        let heights = heights(&g);

        assert_eq!(heights.get("A"), Some(&1));
        assert_eq!(heights.get("C"), None);
        assert_eq!(heights.get("B"), None);
        assert_eq!(heights.get("S"), None);
    }

    #[test]
    fn derivation_matches_text() {
        let g = grammar("S", &[("S", "aSb"), ("S", "A"), ("A", "cA"), ("A", "")]);
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..50 {
            let generated = generate(&g, &mut rng, 5).unwrap();
            assert_eq!(sentence(&leftmost("S", &generated.derivation).unwrap()), generated.text);
        }
    }

    #[test]
    fn deep_recursion_still_ends() {
        let g = grammar("S", &[("S", "SS"), ("S", "SSS"), ("S", "a")]);
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..20 {
            let generated = generate(&g, &mut rng, 4).unwrap();
            assert!(generated.text.chars().all(|c| c == 'a'));
        }
    }

    #[test]
    fn dead_ends_are_avoided() {
        let g = grammar("S", &[("S", "aA"), ("S", "b"), ("A", "aA")]);
        let mut rng = StdRng::seed_from_u64(5);

        for _ in 0..10 {
            assert_eq!(generate(&g, &mut rng, 3).unwrap().text, "b");
        }
    }

    #[test]
    fn empty_language_and_missing_start() {
        let mut rng = StdRng::seed_from_u64(0);

        assert_eq!(
            generate(&grammar("S", &[("S", "aS")]), &mut rng, 3),
            Err(GenerateErrorType::EmptyLanguage("S".to_string()))
        );
        assert_eq!(
            generate(&grammar("S", &[("A", "a")]), &mut rng, 3),
            Err(GenerateErrorType::UndefinedVariable("S".to_string()))
        );
    }
}
