/*
    Step maps record how a transformed grammar relates to the grammar it
    was built from, so that derivations can be carried back across a stage
*/

use std::fmt::Display;

use itertools::Itertools;

use super::Production;

// The rewrites that leave a step map behind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Lambda,
    Unit,
    Chomsky,
}

impl Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepKind::Lambda => write!(f, "λ-removal"),
            StepKind::Unit => write!(f, "unit removal"),
            StepKind::Chomsky => write!(f, "CNF conversion"),
        }
    }
}

// What a step undoes, with the data only that rewrite needs
#[derive(Debug, Clone, PartialEq)]
pub enum Rewrite {
    // Right-hand side positions of the original production that were erased
    Erase(Vec<usize>),
    // A unit chain was followed to a non-unit production
    Unfold,
    // One production was broken into several in Chomsky form
    Split,
}

impl Rewrite {
    pub fn kind(&self) -> StepKind {
        match self {
            Rewrite::Erase(_) => StepKind::Lambda,
            Rewrite::Unfold => StepKind::Unit,
            Rewrite::Split => StepKind::Chomsky,
        }
    }
}

// One entry of a step map: `group` stands for `production`.
//
// For λ and unit steps, `production` is new and `group` lists the
// productions of the previous grammar that justify it, in the order they
// are applied. For CNF steps it is the other way round: `group` holds the
// new productions, in preorder of the tree they form, and `production` is
// the one they replace.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub group: Vec<Production>,
    pub production: Production,
    pub rewrite: Rewrite,
}

impl Step {
    pub fn erase(group: Vec<Production>, production: Production, erased: Vec<usize>) -> Self {
        Step { group, production, rewrite: Rewrite::Erase(erased) }
    }

    pub fn unfold(group: Vec<Production>, production: Production) -> Self {
        Step { group, production, rewrite: Rewrite::Unfold }
    }

    pub fn split(group: Vec<Production>, production: Production) -> Self {
        Step { group, production, rewrite: Rewrite::Split }
    }

    // Positions of `group[0]` erased by a λ step, none for other steps
    pub fn erased(&self) -> &[usize] {
        match &self.rewrite {
            Rewrite::Erase(erased) => erased,
            Rewrite::Unfold | Rewrite::Split => &[],
        }
    }
}

impl Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}  ⇐  {}", self.production, self.group.iter().join(", "))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepMap {
    kind: StepKind,
    steps: Vec<Step>,
    // Productions found verbatim in both grammars
    unchanged: Vec<Production>,
}

impl StepMap {
    pub fn new(kind: StepKind) -> Self {
        StepMap {
            kind,
            steps: Vec::new(),
            unchanged: Vec::new(),
        }
    }

    pub fn kind(&self) -> StepKind {
        self.kind
    }

    // Steps in creation order, which follows the production order of the
    // grammar the stage started from.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn unchanged(&self) -> &[Production] {
        &self.unchanged
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn push(&mut self, step: Step) {
        debug_assert_eq!(step.rewrite.kind(), self.kind);
        self.steps.push(step);
    }

    pub fn keep(&mut self, production: Production) {
        if !self.unchanged.contains(&production) {
            self.unchanged.push(production);
        }
    }

    // Whether a step already explains `production`, that is `production`
    // is the subject of a λ/unit step or a member of a CNF group.
    pub fn explains(&self, production: &Production) -> bool {
        match self.kind {
            StepKind::Chomsky => self.steps.iter().any(|s| s.group.contains(production)),
            StepKind::Lambda | StepKind::Unit => self.steps.iter().any(|s| s.production == *production),
        }
    }
}

impl Display for StepMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "; {} ({} steps)", self.kind, self.steps.len())?;
        for step in &self.steps {
            writeln!(f, "{}", step)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::fixtures::*;

    #[test]
    fn explains_follows_direction_of_kind() {
        let group = prods(&[("S", "A"), ("A", "b")]);

        let mut unit = StepMap::new(StepKind::Unit);
        unit.push(Step::unfold(group.clone(), prod("S", "b")));
        assert!(unit.explains(&prod("S", "b")));
        assert!(!unit.explains(&prod("A", "b")));

        let mut cnf = StepMap::new(StepKind::Chomsky);
        cnf.push(Step::split(group, prod("S", "b")));
        assert!(cnf.explains(&prod("A", "b")));
        assert!(!cnf.explains(&prod("S", "b")));
    }

    #[test]
    fn keep_is_a_set() {
        let mut map = StepMap::new(StepKind::Lambda);
        map.keep(prod("S", "a"));
        map.keep(prod("S", "a"));
        assert_eq!(map.unchanged(), &[prod("S", "a")][..]);
        assert!(map.is_empty());
    }

    #[test]
    fn display_step() {
        let step = Step::erase(prods(&[("S", "AbA"), ("A", "")]), prod("S", "Ab"), vec![2]);
        assert_eq!(step.to_string(), "S → Ab  ⇐  S → AbA, A → λ");
    }

    #[test]
    fn only_lambda_steps_erase() {
        let erase = Step::erase(prods(&[("S", "aA"), ("A", "")]), prod("S", "a"), vec![1]);
        let unfold = Step::unfold(prods(&[("S", "A"), ("A", "a")]), prod("S", "a"));

        assert_eq!(erase.erased(), &[1]);
        assert_eq!(erase.rewrite.kind(), StepKind::Lambda);
        assert!(unfold.erased().is_empty());
        assert_eq!(unfold.rewrite.kind(), StepKind::Unit);
    }
}
