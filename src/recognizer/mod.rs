/*
    CYK recognition over a grammar in Chomsky normal form
*/

use std::collections::HashMap;

use crate::grammar::*;

// How a variable covers a span of the word: by a terminal production, or by
// a binary production split after `left` letters
#[derive(Debug, Clone, Copy)]
enum Entry {
    Leaf(usize),
    Split(usize, usize),
}

// table[start][length - 1] maps each variable covering the span to the
// first way found to derive it
type Table<'g> = Vec<Vec<HashMap<&'g str, Entry>>>;

fn fill<'g>(grammar: &'g Grammar, letters: &[String]) -> Table<'g> {
    let n = letters.len();
    let mut table: Table = vec![vec![HashMap::new(); n]; n];

    for (i, letter) in letters.iter().enumerate() {
        for (index, production) in grammar.productions().iter().enumerate() {
            if let [Symbol::Terminal(text)] = production.rhs.as_slice() {
                if text == letter {
                    table[i][0].entry(production.lhs.as_str()).or_insert(Entry::Leaf(index));
                }
            }
        }
    }

    for length in 2..=n {
        for start in 0..=n - length {
            for left in 1..length {
                for (index, production) in grammar.productions().iter().enumerate() {
                    let [Symbol::Variable(b), Symbol::Variable(c)] = production.rhs.as_slice() else {
                        continue;
                    };
                    if table[start][left - 1].contains_key(b.as_str())
                        && table[start + left][length - left - 1].contains_key(c.as_str())
                    {
                        table[start][length - 1]
                            .entry(production.lhs.as_str())
                            .or_insert(Entry::Split(index, left));
                    }
                }
            }
        }
    }

    table
}

// Walks back pointers from `variable` over the span, root first
fn backtrack(
    grammar: &Grammar,
    table: &Table,
    variable: &str,
    start: usize,
    length: usize,
    trace: &mut DerivationTrace,
) -> Option<()> {
    let entry = *table[start][length - 1].get(variable)?;
    match entry {
        Entry::Leaf(index) => trace.push(grammar.productions()[index].clone()),
        Entry::Split(index, left) => {
            let production = &grammar.productions()[index];
            trace.push(production.clone());
            let b = production.rhs[0].as_variable()?;
            let c = production.rhs[1].as_variable()?;
            backtrack(grammar, table, b, start, left, trace)?;
            backtrack(grammar, table, c, start + left, length - left, trace)?;
        }
    }
    Some(())
}

// Parses `word` (one terminal per character) with a CNF grammar and
// returns one leftmost derivation of it. The empty word is never accepted:
// whether λ is in the language is known from the normalization.
pub fn parse(grammar: &Grammar, word: &str) -> Option<DerivationTrace> {
    let letters: Vec<String> = word.chars().map(String::from).collect();
    if letters.is_empty() {
        return None;
    }

    let table = fill(grammar, &letters);
    let mut trace = Vec::new();
    backtrack(grammar, &table, grammar.start(), 0, letters.len(), &mut trace)?;
    Some(trace)
}

pub fn recognizes(grammar: &Grammar, word: &str) -> bool {
    parse(grammar, word).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::fixtures::*;

    #[test]
    fn parses_into_a_leftmost_derivation() {
        let g = grammar("S", &[("S", "AB"), ("A", "a"), ("B", "BB"), ("B", "b")]);

        assert_eq!(parse(&g, "ab"), Some(prods(&[("S", "AB"), ("A", "a"), ("B", "b")])));
        assert_eq!(
            parse(&g, "abb"),
            Some(prods(&[("S", "AB"), ("A", "a"), ("B", "BB"), ("B", "b"), ("B", "b")]))
        );
    }

    #[test]
    fn rejects_words_outside_the_language() {
        let g = grammar("S", &[("S", "AB"), ("A", "a"), ("B", "b")]);

        for word in ["", "a", "ba", "abb", "c"] {
            assert!(!recognizes(&g, word), "{}", word);
        }
    }

    #[test]
    fn long_variable_names() {
        let g = grammar("S", &[("S", "<X1><X2>"), ("X1", "a"), ("X2", "S<X3>"), ("X2", "b"), ("X3", "b")]);

        assert!(recognizes(&g, "ab"));
        assert!(recognizes(&g, "aabb"));
        assert!(!recognizes(&g, "aab"));
    }

    #[test]
    fn empty_grammar_accepts_nothing() {
        assert_eq!(parse(&Grammar::new("S", vec![]), "a"), None);
    }
}
