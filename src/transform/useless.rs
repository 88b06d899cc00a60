/*
    Removal of useless productions: those mentioning a variable that derives
    no terminal string or that the start symbol never reaches
*/

use std::collections::HashSet;

use crate::grammar::*;

pub fn generating_variables(grammar: &Grammar) -> HashSet<&str> {
    let mut generating = HashSet::new();

    let mut changed = true;
    while changed {
        changed = false;
        for production in grammar.productions() {
            if generating.contains(production.lhs.as_str()) {
                continue;
            }
            if production.rhs_variables().all(|v| generating.contains(v)) {
                generating.insert(production.lhs.as_str());
                changed = true;
            }
        }
    }

    generating
}

pub fn reachable_variables(grammar: &Grammar) -> HashSet<&str> {
    let mut reachable = HashSet::from([grammar.start()]);
    let mut pending = vec![grammar.start()];

    while let Some(variable) = pending.pop() {
        for production in grammar.productions_of(variable) {
            for next in production.rhs_variables() {
                if reachable.insert(next) {
                    pending.push(next);
                }
            }
        }
    }

    reachable
}

// Keeps the productions whose variables all generate, then of those the
// ones the start symbol reaches. The generating pass has to run first:
// dropping dead ends can make more variables unreachable.
pub fn eliminate(grammar: &Grammar) -> Grammar {
    let generating = generating_variables(grammar);
    let productive = grammar.with_productions(
        grammar
            .productions()
            .iter()
            .filter(|p| generating.contains(p.lhs.as_str()) && p.rhs_variables().all(|v| generating.contains(v)))
            .cloned(),
    );

    let reachable = reachable_variables(&productive);
    productive.with_productions(
        productive
            .productions()
            .iter()
            .filter(|p| reachable.contains(p.lhs.as_str()))
            .cloned(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::fixtures::*;

    #[test]
    fn unreachable_variable_is_dropped() {
        let g = grammar("S", &[("S", "a"), ("C", "c")]);
        let useful = eliminate(&g);

        assert_eq!(useful.productions(), &prods(&[("S", "a")])[..]);
        assert!(!useful.variables().contains(&"C"));
    }

    #[test]
    fn non_generating_variable_is_dropped() {
        let g = grammar("S", &[("S", "AB"), ("S", "a"), ("A", "aA"), ("B", "b")]);
        assert_eq!(generating_variables(&g), HashSet::from(["S", "B"]));
        assert_eq!(eliminate(&g).productions(), &prods(&[("S", "a")])[..]);
    }

    #[test]
    fn generating_pass_runs_before_reachability() {
        // B is reachable only through the dead end A
        let g = grammar("S", &[("S", "a"), ("S", "AB"), ("A", "aA"), ("B", "b")]);
        let useful = eliminate(&g);

        assert_eq!(useful.productions(), &prods(&[("S", "a")])[..]);
        assert_eq!(reachable_variables(&g), HashSet::from(["S", "A", "B"]));
    }

    #[test]
    fn empty_language_keeps_no_productions() {
        let g = grammar("S", &[("S", "aS")]);
        let useful = eliminate(&g);

        assert!(useful.is_empty());
        assert_eq!(useful.start(), "S");
    }

    #[test]
    fn useful_grammar_is_unchanged() {
        let g = grammar("S", &[("S", "AB"), ("A", "a"), ("B", "b")]);
        assert_eq!(eliminate(&g), g);
    }
}
