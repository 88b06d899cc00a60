/*
    This module carries a derivation over the CNF grammar back to the
    grammar the user wrote, undoing CNF conversion, unit removal and
    λ-removal in that order
*/

use std::collections::{HashMap, HashSet};
use std::fmt::Display;

use crate::error_handling::*;
use crate::grammar::*;

// The trace and the step maps disagree. This means the recognizer ran over
// a grammar other than the one the maps were built for.
#[derive(Debug, PartialEq)]
pub enum TraceErrorType {
    // A production no step accounts for and that is not carried over either
    UnknownProduction { stage: StepKind, production: Production },
    // Part of a CNF group was used but another part never shows up
    IncompleteGroup { production: Production, missing: Production },
}

impl ErrorType for TraceErrorType {}

impl Display for TraceErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TraceErrorType::UnknownProduction { stage, production } => {
                write!(f, "`{}` is not known to the {} step map", production, stage)
            }
            TraceErrorType::IncompleteGroup { production, missing } => {
                write!(f, "`{}` is needed to rebuild `{}` but is missing from the trace", missing, production)
            }
        }
    }
}

pub type TraceError = Error<TraceErrorType>;
pub type TraceResult<T> = std::result::Result<T, TraceErrorType>;

// Rewrites `raw`, a derivation over the CNF grammar, into a derivation over
// the original grammar. Absent maps are skipped. Multiplicities are kept,
// and a leftmost derivation stays leftmost.
pub fn trace(
    raw: &[Production],
    chomsky_map: Option<&StepMap>,
    unit_map: Option<&StepMap>,
    lambda_map: Option<&StepMap>,
) -> TraceResult<DerivationTrace> {
    [chomsky_map, unit_map, lambda_map]
        .into_iter()
        .flatten()
        .try_fold(raw.to_vec(), |answer, map| undo(&answer, map))
}

// Undoes a single stage.
pub fn undo(trace: &[Production], map: &StepMap) -> TraceResult<DerivationTrace> {
    match map.kind() {
        StepKind::Chomsky => contract(trace, map),
        StepKind::Unit | StepKind::Lambda => Expander::new(trace, map).run(),
    }
}

// Replaces every CNF group found in the trace by the production it stands
// for, at the position of its first member. Positions, not values, are
// consumed: the same production may be used several times.
fn contract(trace: &[Production], map: &StepMap) -> TraceResult<DerivationTrace> {
    let mut owners: HashMap<&Production, &Step> = HashMap::new();
    for step in map.steps() {
        for member in &step.group {
            owners.entry(member).or_insert(step);
        }
    }
    let unchanged: HashSet<&Production> = map.unchanged().iter().collect();

    let mut consumed = HashSet::new();
    let mut answer = Vec::new();

    for (position, production) in trace.iter().enumerate() {
        if consumed.contains(&position) {
            continue;
        }
        consumed.insert(position);

        if let Some(step) = owners.get(production) {
            let mut own_slot_used = false;
            for member in &step.group {
                if member == production && !own_slot_used {
                    own_slot_used = true;
                    continue;
                }
                let found = (position + 1..trace.len())
                    .find(|i| trace[*i] == *member && !consumed.contains(i))
                    .ok_or_else(|| TraceErrorType::IncompleteGroup {
                        production: step.production.clone(),
                        missing: member.clone(),
                    })?;
                consumed.insert(found);
            }
            answer.push(step.production.clone());
        } else if unchanged.contains(production) {
            answer.push(production.clone());
        } else {
            return Err(TraceErrorType::UnknownProduction {
                stage: map.kind(),
                production: production.clone(),
            });
        }
    }

    Ok(answer)
}

// Cuts the λ-derivations that follow the original production in a λ group
// apart, using the number of variables each production opens
fn split_chains(members: &[Production]) -> Vec<&[Production]> {
    let mut chains = Vec::new();
    let mut start = 0;
    while start < members.len() {
        let mut open = 1;
        let mut end = start;
        while open > 0 && end < members.len() {
            open = open - 1 + members[end].rhs_variables().count();
            end += 1;
        }
        chains.push(&members[start..end]);
        start = end;
    }
    chains
}

// Walks the trace as a sequence of preorder subtrees and replaces each
// step's production by its group. A trace that stops early is fine: the
// missing subtrees are just not there.
struct Expander<'a> {
    trace: &'a [Production],
    cursor: usize,
    kind: StepKind,
    steps: HashMap<&'a Production, &'a Step>,
    unchanged: HashSet<&'a Production>,
    answer: DerivationTrace,
}

impl<'a> Expander<'a> {
    fn new(trace: &'a [Production], map: &'a StepMap) -> Self {
        let mut steps = HashMap::new();
        for step in map.steps() {
            steps.entry(&step.production).or_insert(step);
        }

        Expander {
            trace,
            cursor: 0,
            kind: map.kind(),
            steps,
            unchanged: map.unchanged().iter().collect(),
            answer: Vec::with_capacity(trace.len()),
        }
    }

    fn run(mut self) -> TraceResult<DerivationTrace> {
        while self.cursor < self.trace.len() {
            self.subtree()?;
        }
        Ok(self.answer)
    }

    fn subtree(&mut self) -> TraceResult<()> {
        let trace = self.trace;
        let Some(production) = trace.get(self.cursor) else {
            return Ok(());
        };
        self.cursor += 1;

        if let Some(step) = self.steps.get(production).copied() {
            match self.kind {
                StepKind::Lambda => self.restore_erased(step),
                _ => {
                    // The unit chain, then what its last production opens
                    self.answer.extend(step.group.iter().cloned());
                    self.children(production)
                }
            }
        } else if self.unchanged.contains(production) {
            self.answer.push(production.clone());
            self.children(production)
        } else {
            Err(TraceErrorType::UnknownProduction {
                stage: self.kind,
                production: production.clone(),
            })
        }
    }

    fn children(&mut self, production: &Production) -> TraceResult<()> {
        for _ in production.rhs_variables() {
            self.subtree()?;
        }
        Ok(())
    }

    // Emits the original production, then for each of its right-hand side
    // positions either the λ-derivation of the erased occurrence or the
    // subtree of the kept one
    fn restore_erased(&mut self, step: &'a Step) -> TraceResult<()> {
        let Some((original, rest)) = step.group.split_first() else {
            return Ok(());
        };
        self.answer.push(original.clone());

        let mut chains = split_chains(rest).into_iter();
        for (position, symbol) in original.rhs.iter().enumerate() {
            if step.erased().contains(&position) {
                if let Some(chain) = chains.next() {
                    self.answer.extend(chain.iter().cloned());
                }
            } else if symbol.is_variable() {
                self.subtree()?;
            }
        }
        Ok(())
    }
}
