/*
    Conversion to Chomsky Normal Form
*/

use std::collections::HashSet;

use super::{PipelineErrorType, Stage};
use crate::grammar::*;

// Hands out variable names the grammar does not use yet
struct FreshVariables {
    used: HashSet<String>,
    counter: usize,
}

impl FreshVariables {
    fn new(grammar: &Grammar) -> Self {
        FreshVariables {
            used: grammar.variables().into_iter().map(String::from).collect(),
            counter: 0,
        }
    }

    fn next_name(&mut self) -> String {
        loop {
            self.counter += 1;
            let name = format!("X{}", self.counter);
            if self.used.insert(name.clone()) {
                return name;
            }
        }
    }
}

// One round of rewriting: isolate the terminals of a long right-hand side,
// then split off its first symbol. The production heading the result is
// always the first one returned.
fn rewrite_once(production: Production, fresh: &mut FreshVariables) -> Vec<Production> {
    let Production { lhs, mut rhs } = production;
    let mut produced = Vec::new();

    if rhs.len() >= 2 {
        for symbol in rhs.iter_mut() {
            if let Symbol::Terminal(text) = symbol {
                let name = fresh.next_name();
                produced.push(Production::new(&name, vec![Symbol::terminal(text)]));
                *symbol = Symbol::Variable(name);
            }
        }
    }

    if rhs.len() > 2 {
        let name = fresh.next_name();
        let rest = rhs.split_off(1);
        rhs.push(Symbol::Variable(name.clone()));
        produced.push(Production::new(&name, rest));
    }

    produced.insert(0, Production { lhs, rhs });
    produced
}

// Rewrites until every production is in Chomsky form, collecting only the
// leaves of the recursion
fn rewrite(production: Production, fresh: &mut FreshVariables, leaves: &mut Vec<Production>) {
    if production.is_chomsky() {
        leaves.push(production);
        return;
    }
    for next in rewrite_once(production, fresh) {
        rewrite(next, fresh, leaves);
    }
}

// Orders the leaves as the tree they form, root first. Only the root is
// headed by `root`; every other leaf is headed by a fresh variable.
fn push_preorder(variable: &str, root: &str, leaves: &[Production], ordered: &mut Vec<Production>) {
    let Some(leaf) = leaves.iter().find(|p| p.lhs == variable) else {
        return;
    };
    ordered.push(leaf.clone());
    for child in leaf.rhs_variables().filter(|&v| v != root) {
        push_preorder(child, root, leaves, ordered);
    }
}

// Brings every production into the form `A → BC` or `A → a`. The step for
// an original production groups all the productions that replace it.
// Conversion stops as soon as more than `limit` productions are made.
//
// λ-productions and unit productions cannot be expressed this way; they
// must be removed beforehand and are passed through untouched otherwise.
pub fn convert(grammar: &Grammar, limit: usize) -> Result<(Grammar, Option<StepMap>), PipelineErrorType> {
    if grammar.is_chomsky() {
        return Ok((grammar.clone(), None));
    }

    let mut fresh = FreshVariables::new(grammar);
    let mut map = StepMap::new(StepKind::Chomsky);
    let mut productions = Vec::new();

    for production in grammar.productions() {
        if production.is_chomsky() || production.is_lambda() || production.is_unit() {
            map.keep(production.clone());
            productions.push(production.clone());
        } else {
            let mut leaves = Vec::new();
            rewrite(production.clone(), &mut fresh, &mut leaves);

            let mut group = Vec::with_capacity(leaves.len());
            push_preorder(&production.lhs, &production.lhs, &leaves, &mut group);

            productions.extend(group.iter().cloned());
            map.push(Step::split(group, production.clone()));
        }

        if productions.len() > limit {
            return Err(PipelineErrorType::TooManyProductions {
                stage: Stage::Chomsky,
                count: productions.len(),
                limit,
            });
        }
    }

    Ok((grammar.with_productions(productions), Some(map)))
}
