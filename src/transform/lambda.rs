/*
    Removal of λ-productions
*/

use std::collections::{HashMap, HashSet};

use itertools::Itertools;

use super::{PipelineErrorType, Stage};
use crate::grammar::*;

// The nullable variables of `grammar`, each with the λ-derivation (in
// preorder) that first showed it nullable. Direct λ-productions are
// preferred over longer chains.
pub fn nullable_variables(grammar: &Grammar) -> HashMap<String, Vec<Production>> {
    let mut nullable: HashMap<String, Vec<Production>> = HashMap::new();
    for production in grammar.productions().iter().filter(|p| p.is_lambda()) {
        nullable
            .entry(production.lhs.clone())
            .or_insert_with(|| vec![production.clone()]);
    }

    let mut changed = true;
    while changed {
        changed = false;
        for production in grammar.productions() {
            if nullable.contains_key(&production.lhs) {
                continue;
            }
            let all_nullable = production
                .rhs
                .iter()
                .all(|symbol| symbol.as_variable().is_some_and(|v| nullable.contains_key(v)));
            if !all_nullable {
                continue;
            }

            let chain: Vec<Production> = std::iter::once(production.clone())
                .chain(production.rhs_variables().flat_map(|v| nullable[v].clone()))
                .collect();
            nullable.insert(production.lhs.clone(), chain);
            changed = true;
        }
    }

    nullable
}

// Right-hand side positions holding a nullable variable
fn nullable_positions(production: &Production, nullable: &HashMap<String, Vec<Production>>) -> Vec<usize> {
    production
        .rhs
        .iter()
        .positions(|symbol| symbol.as_variable().is_some_and(|v| nullable.contains_key(v)))
        .collect_vec()
}

// How many variants the non-λ productions expand to before duplicates and
// empty ones are dropped: 2^k for k nullable occurrences. None when that
// does not fit in a usize.
fn variant_count(grammar: &Grammar, nullable: &HashMap<String, Vec<Production>>) -> Option<usize> {
    grammar
        .productions()
        .iter()
        .filter(|p| !p.is_lambda())
        .try_fold(0usize, |total, production| {
            let k = u32::try_from(nullable_positions(production, nullable).len()).ok()?;
            total.checked_add(1usize.checked_shl(k)?)
        })
}

// Every way of erasing nullable occurrences from the production, paired with
// the erased positions. The untouched production comes first, then the
// subsets in counting order with the last occurrence as the lowest bit.
// Variants with nothing left are skipped. The caller makes sure 2^k fits.
fn variants(production: &Production, nullable: &HashMap<String, Vec<Production>>) -> Vec<(Production, Vec<usize>)> {
    let occurrences = nullable_positions(production, nullable);
    let k = occurrences.len();

    (0..1usize << k)
        .filter_map(|mask| {
            let erased = (0..k)
                .filter(|j| mask & (1 << (k - 1 - j)) != 0)
                .map(|j| occurrences[j])
                .collect_vec();
            let rhs = production
                .rhs
                .iter()
                .enumerate()
                .filter(|(i, _)| !erased.contains(i))
                .map(|(_, symbol)| symbol.clone())
                .collect_vec();

            if rhs.is_empty() {
                None
            } else {
                Some((Production::new(&production.lhs, rhs), erased))
            }
        })
        .collect()
}

// Builds the λ-free grammar. Every new production gets a step whose group
// is the production it came from followed by the λ-derivation of each
// erased occurrence, left to right.
//
// The variants are counted before any is built, so a grammar that would
// expand past `limit` fails without the enumeration ever running.
pub fn eliminate(grammar: &Grammar, limit: usize) -> Result<(Grammar, Option<StepMap>), PipelineErrorType> {
    if !grammar.has_lambda_productions() {
        return Ok((grammar.clone(), None));
    }

    let nullable = nullable_variables(grammar);
    match variant_count(grammar, &nullable) {
        Some(count) if count <= limit => {}
        count => {
            return Err(PipelineErrorType::TooManyProductions {
                stage: Stage::LambdaFree,
                count: count.unwrap_or(usize::MAX),
                limit,
            })
        }
    }

    let mut map = StepMap::new(StepKind::Lambda);
    let mut seen = HashSet::new();
    let mut productions = Vec::new();

    for production in grammar.productions().iter().filter(|p| !p.is_lambda()) {
        for (variant, erased) in variants(production, &nullable) {
            if !seen.insert(variant.clone()) {
                continue;
            }

            if grammar.contains(&variant) {
                map.keep(variant.clone());
            } else {
                let group = std::iter::once(production.clone())
                    .chain(erased.iter().flat_map(|&i| {
                        production.rhs[i]
                            .as_variable()
                            .and_then(|v| nullable.get(v))
                            .cloned()
                            .unwrap_or_default()
                    }))
                    .collect();
                map.push(Step::erase(group, variant.clone(), erased));
            }
            productions.push(variant);
        }
    }

    Ok((grammar.with_productions(productions), Some(map)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::fixtures::*;
    use crate::transform::NO_LIMIT;

    #[test]
    fn nullable_closure_prefers_direct_productions() {
        let g = grammar("S", &[("S", "AB"), ("A", "BB"), ("A", ""), ("B", "")]);
        let nullable = nullable_variables(&g);

        assert_eq!(nullable["A"], prods(&[("A", "")]));
        assert_eq!(nullable["B"], prods(&[("B", "")]));
        assert_eq!(nullable["S"], prods(&[("S", "AB"), ("A", ""), ("B", "")]));
    }

    #[test]
    fn nullable_closure_records_indirect_chains() {
        let g = grammar("S", &[("S", "aB"), ("B", "CD"), ("C", ""), ("D", "C")]);
        let nullable = nullable_variables(&g);

        assert_eq!(nullable["D"], prods(&[("D", "C"), ("C", "")]));
        assert_eq!(nullable["B"], prods(&[("B", "CD"), ("C", ""), ("D", "C"), ("C", "")]));
        assert!(!nullable.contains_key("S"));
    }

    #[test]
    fn erases_every_subset_of_nullable_occurrences() {
        let g = grammar("S", &[("S", "AbA"), ("A", "aA"), ("A", "")]);
        let (lambda_free, map) = eliminate(&g, NO_LIMIT).unwrap();

        assert_eq!(
            lambda_free.productions(),
            &prods(&[("S", "AbA"), ("S", "Ab"), ("S", "bA"), ("S", "b"), ("A", "aA"), ("A", "a")])[..]
        );

        let map = map.unwrap();
        assert_eq!(map.kind(), StepKind::Lambda);
        assert_eq!(
            map.steps()[0],
            Step::erase(prods(&[("S", "AbA"), ("A", "")]), prod("S", "Ab"), vec![2])
        );
        let both = map.steps().iter().find(|s| s.production == prod("S", "b")).unwrap();
        assert_eq!(both.group, prods(&[("S", "AbA"), ("A", ""), ("A", "")]));
        assert_eq!(both.erased(), &[0, 2]);
    }

    #[test]
    fn indirect_nullable_group_holds_the_whole_chain() {
        let g = grammar("S", &[("S", "aBc"), ("B", "CC"), ("B", "b"), ("C", "")]);
        let (_, map) = eliminate(&g, NO_LIMIT).unwrap();
        let map = map.unwrap();

        let step = map.steps().iter().find(|s| s.production == prod("S", "ac")).unwrap();
        assert_eq!(step.group, prods(&[("S", "aBc"), ("B", "CC"), ("C", ""), ("C", "")]));
        assert_eq!(step.erased(), &[1]);
    }

    #[test]
    fn verbatim_productions_are_not_steps() {
        let g = grammar("S", &[("S", "aA"), ("S", "a"), ("A", "b"), ("A", "")]);
        let (lambda_free, map) = eliminate(&g, NO_LIMIT).unwrap();
        let map = map.unwrap();

        assert_eq!(lambda_free.productions(), &prods(&[("S", "aA"), ("S", "a"), ("A", "b")])[..]);
        assert!(map.is_empty());
        assert_eq!(map.unchanged(), lambda_free.productions());
    }

    #[test]
    fn lambda_only_variable_disappears() {
        let g = grammar("S", &[("S", "")]);
        let (lambda_free, map) = eliminate(&g, NO_LIMIT).unwrap();

        assert!(lambda_free.is_empty());
        assert_eq!(lambda_free.start(), "S");
        assert!(map.unwrap().is_empty());
    }

    #[test]
    fn no_lambda_productions_is_a_no_op() {
        let g = grammar("S", &[("S", "AB"), ("A", "a"), ("B", "b")]);
        assert_eq!(eliminate(&g, NO_LIMIT), Ok((g.clone(), None)));
    }

    #[test]
    fn every_new_production_has_exactly_one_step() {
        let g = grammar("S", &[("S", "ABA"), ("A", "aA"), ("A", ""), ("B", "AA"), ("B", "b")]);
        let (lambda_free, map) = eliminate(&g, NO_LIMIT).unwrap();
        let map = map.unwrap();

        for production in lambda_free.productions() {
            let owners = map.steps().iter().filter(|s| s.production == *production).count();
            if g.contains(production) {
                assert_eq!(owners, 0, "{}", production);
                assert!(!map.explains(production));
            } else {
                assert_eq!(owners, 1, "{}", production);
                assert!(map.explains(production));
            }
        }
    }

    #[test]
    fn variants_are_counted_before_they_are_built() {
        let g = grammar("S", &[("S", "AAAAAAAAAAAAAAAAAAAA"), ("A", "a"), ("A", "")]);

        // 2^20 ways to erase from S's side plus A → a
        assert_eq!(
            eliminate(&g, 100),
            Err(PipelineErrorType::TooManyProductions { stage: Stage::LambdaFree, count: (1 << 20) + 1, limit: 100 })
        );
    }

    #[test]
    fn too_many_nullable_occurrences_to_count() {
        let side = "A".repeat(64);
        let g = grammar("S", &[("S", side.as_str()), ("A", "a"), ("A", "")]);

        assert_eq!(
            eliminate(&g, NO_LIMIT),
            Err(PipelineErrorType::TooManyProductions { stage: Stage::LambdaFree, count: usize::MAX, limit: NO_LIMIT })
        );
    }

    #[test]
    fn ceiling_counts_duplicate_variants() {
        // AA counts four variants, the empty one and a repeated A included,
        // and A → a one more, though only three productions are kept
        let g = grammar("S", &[("S", "AA"), ("A", "a"), ("A", "")]);

        assert!(eliminate(&g, 4).is_err());
        let (lambda_free, _) = eliminate(&g, 5).unwrap();
        assert_eq!(lambda_free.productions(), &prods(&[("S", "AA"), ("S", "A"), ("A", "a")])[..]);
    }
}
