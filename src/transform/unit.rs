/*
    Removal of unit productions (A → B)
*/

use std::collections::HashSet;

use crate::grammar::*;

// The variables reachable from `from` through unit productions, in
// breadth-first discovery order, each with the unit chain that reached it
// first. `from` itself comes first with an empty chain.
pub fn unit_closure<'a>(grammar: &'a Grammar, from: &'a str) -> Vec<(&'a str, Vec<Production>)> {
    let mut reached: Vec<(&str, Vec<Production>)> = vec![(from, Vec::new())];

    // `reached` doubles as the queue
    let mut next = 0;
    while next < reached.len() {
        let (current, chain) = reached[next].clone();
        next += 1;

        for unit in grammar.productions_of(current).filter(|p| p.is_unit()) {
            let Some(target) = unit.rhs[0].as_variable() else {
                continue;
            };
            if reached.iter().any(|(variable, _)| *variable == target) {
                continue;
            }
            let mut extended = chain.clone();
            extended.push(unit.clone());
            reached.push((target, extended));
        }
    }

    reached
}

// Builds the unit-free grammar: `A → α` for every non-unit `C → α` with
// `C` reachable from `A` through unit productions. A new production's group
// is the shortest unit chain from `A` to `C` followed by `C → α`.
pub fn eliminate(grammar: &Grammar) -> (Grammar, Option<StepMap>) {
    if !grammar.has_unit_productions() {
        return (grammar.clone(), None);
    }

    let mut map = StepMap::new(StepKind::Unit);
    let mut seen = HashSet::new();
    let mut productions = Vec::new();

    for variable in grammar.defined_variables() {
        for (reached, chain) in unit_closure(grammar, variable) {
            for production in grammar.productions_of(reached).filter(|p| !p.is_unit()) {
                let derived = Production::new(variable, production.rhs.clone());
                if !seen.insert(derived.clone()) {
                    continue;
                }

                if grammar.contains(&derived) {
                    map.keep(derived.clone());
                } else {
                    let group = chain.iter().cloned().chain(std::iter::once(production.clone())).collect();
                    map.push(Step::unfold(group, derived.clone()));
                }
                productions.push(derived);
            }
        }
    }

    (grammar.with_productions(productions), Some(map))
}
