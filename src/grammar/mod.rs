/*
    This module is for storing and inspecting grammars
*/

mod step_map;

use std::fmt::Display;

use itertools::Itertools;

pub use step_map::*;

// The base unit in a production
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbol {
    Terminal(String),
    Variable(String),
}

impl Symbol {
    pub fn variable(name: &str) -> Self {
        Symbol::Variable(name.to_string())
    }

    pub fn terminal(text: &str) -> Self {
        Symbol::Terminal(text.to_string())
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Symbol::Variable(_))
    }

    pub fn as_variable(&self) -> Option<&str> {
        match self {
            Symbol::Variable(name) => Some(name),
            Symbol::Terminal(_) => None,
        }
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // Machine-made variables have long names, bracket them so that
            // a right-hand side stays readable (and parseable)
            Symbol::Variable(name) if name.chars().count() > 1 => write!(f, "<{}>", name),
            Symbol::Variable(name) => write!(f, "{}", name),
            Symbol::Terminal(text) => write!(f, "{}", text),
        }
    }
}

// Writes a right-hand side, using `λ` for the empty one.
pub fn write_rhs(f: &mut std::fmt::Formatter<'_>, rhs: &[Symbol]) -> std::fmt::Result {
    if rhs.is_empty() {
        return write!(f, "λ");
    }
    rhs.iter().try_for_each(|symbol| write!(f, "{}", symbol))
}

// A single rewrite rule `lhs → rhs`. An empty `rhs` is a λ-production.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Production {
    pub lhs: String,
    pub rhs: Vec<Symbol>,
}

impl Production {
    pub fn new(lhs: &str, rhs: Vec<Symbol>) -> Self {
        Production { lhs: lhs.to_string(), rhs }
    }

    pub fn is_lambda(&self) -> bool {
        self.rhs.is_empty()
    }

    pub fn is_unit(&self) -> bool {
        self.rhs.len() == 1 && self.rhs[0].is_variable()
    }

    // `A → BC` or `A → a`
    pub fn is_chomsky(&self) -> bool {
        match self.rhs.as_slice() {
            [Symbol::Terminal(_)] => true,
            [Symbol::Variable(_), Symbol::Variable(_)] => true,
            _ => false,
        }
    }

    // The variables on the right-hand side, left to right
    pub fn rhs_variables(&self) -> impl Iterator<Item = &str> + '_ {
        self.rhs.iter().filter_map(Symbol::as_variable)
    }
}

impl Display for Production {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} → ", Symbol::Variable(self.lhs.clone()))?;
        write_rhs(f, &self.rhs)
    }
}

// The productions used by one derivation, repetitions included
pub type DerivationTrace = Vec<Production>;

// A context-free grammar. The productions form an ordered set: insertion
// order is kept and duplicates are dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Grammar {
    start: String,
    productions: Vec<Production>,
}

impl Grammar {
    pub fn new(start: &str, productions: impl IntoIterator<Item = Production>) -> Self {
        Grammar {
            start: start.to_string(),
            productions: productions.into_iter().unique().collect(),
        }
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn len(&self) -> usize {
        self.productions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.productions.is_empty()
    }

    pub fn contains(&self, production: &Production) -> bool {
        self.productions.contains(production)
    }

    pub fn productions_of<'a>(&'a self, variable: &str) -> impl Iterator<Item = &'a Production> + 'a {
        let variable = variable.to_string();
        self.productions.iter().filter(move |p| p.lhs == variable)
    }

    // Every variable of the grammar, the start symbol first and the rest
    // in order of first appearance.
    pub fn variables(&self) -> Vec<&str> {
        std::iter::once(self.start.as_str())
            .chain(self.productions.iter().flat_map(|p| {
                std::iter::once(p.lhs.as_str()).chain(p.rhs_variables())
            }))
            .unique()
            .collect()
    }

    // The variables that head at least one production, in order of first appearance.
    pub fn defined_variables(&self) -> Vec<&str> {
        self.productions.iter().map(|p| p.lhs.as_str()).unique().collect()
    }

    pub fn terminals(&self) -> Vec<&str> {
        self.productions
            .iter()
            .flat_map(|p| p.rhs.iter())
            .filter_map(|symbol| match symbol {
                Symbol::Terminal(text) => Some(text.as_str()),
                Symbol::Variable(_) => None,
            })
            .unique()
            .collect()
    }

    pub fn has_lambda_productions(&self) -> bool {
        self.productions.iter().any(Production::is_lambda)
    }

    pub fn has_unit_productions(&self) -> bool {
        self.productions.iter().any(Production::is_unit)
    }

    pub fn is_chomsky(&self) -> bool {
        self.productions.iter().all(Production::is_chomsky)
    }

    // Same start symbol, new productions
    pub fn with_productions(&self, productions: impl IntoIterator<Item = Production>) -> Self {
        Grammar::new(&self.start, productions)
    }
}

impl Display for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.productions.is_empty() {
            return writeln!(f, "; no productions for {}", Symbol::Variable(self.start.clone()));
        }
        for variable in self.defined_variables() {
            write!(f, "{} →", Symbol::variable(variable))?;
            for (i, production) in self.productions_of(variable).enumerate() {
                write!(f, "{}", if i == 0 { " " } else { " | " })?;
                write_rhs(f, &production.rhs)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn productions_are_an_ordered_set() {
        let g = grammar("S", &[("S", "aS"), ("S", "b"), ("S", "aS")]);
        assert_eq!(g.productions(), &prods(&[("S", "aS"), ("S", "b")])[..]);
    }

    #[test]
    fn production_shapes() {
        assert!(prod("A", "").is_lambda());
        assert!(prod("A", "B").is_unit());
        assert!(!prod("A", "b").is_unit());
        assert!(prod("A", "b").is_chomsky());
        assert!(prod("A", "BC").is_chomsky());
        assert!(!prod("A", "B").is_chomsky());
        assert!(!prod("A", "aB").is_chomsky());
        assert!(!prod("A", "BCD").is_chomsky());
        assert!(!prod("A", "").is_chomsky());
    }

    #[test]
    fn variables_in_first_appearance_order() {
        let g = grammar("S", &[("A", "aB"), ("S", "AC"), ("C", "c")]);
        assert_eq!(g.variables(), vec!["S", "A", "B", "C"]);
        assert_eq!(g.defined_variables(), vec!["A", "S", "C"]);
        assert_eq!(g.terminals(), vec!["a", "c"]);
    }

    #[test]
    fn display_production() {
        assert_eq!(prod("S", "AbA").to_string(), "S → AbA");
        assert_eq!(prod("A", "").to_string(), "A → λ");
        assert_eq!(prod("S", "<X1><X2>").to_string(), "S → <X1><X2>");
    }

    #[test]
    fn display_grammar() {
        let g = grammar("S", &[("S", "AbA"), ("A", "aA"), ("S", "b"), ("A", "")]);
        assert_eq!(g.to_string(), "S → AbA | b\nA → aA | λ\n");
        assert_eq!(Grammar::new("S", vec![]).to_string(), "; no productions for S\n");
    }
}
