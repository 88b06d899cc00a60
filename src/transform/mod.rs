/*
    This module normalizes grammars: λ-removal, unit removal, useless
    removal and CNF conversion, in that order
*/

pub mod chomsky;
pub mod lambda;
pub mod unit;
pub mod useless;

use std::fmt::Display;

use crate::error_handling::*;
use crate::grammar::*;
use crate::tracer::{self, TraceErrorType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    LambdaFree,
    UnitFree,
    Useful,
    Chomsky,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::LambdaFree => write!(f, "λ-free"),
            Stage::UnitFree => write!(f, "unit-free"),
            Stage::Useful => write!(f, "useless-free"),
            Stage::Chomsky => write!(f, "Chomsky normal form"),
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum PipelineErrorType {
    // A stage grew the grammar past the configured ceiling
    TooManyProductions { stage: Stage, count: usize, limit: usize },
}

impl ErrorType for PipelineErrorType {}

impl Display for PipelineErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineErrorType::TooManyProductions { stage, count, limit } => write!(
                f,
                "Building the {} grammar takes {} productions, more than the limit of {}",
                stage, count, limit
            ),
        }
    }
}

pub type PipelineError = Error<PipelineErrorType>;

// Every grammar of the normalization chain together with the step maps
// needed to carry derivations back to the original grammar.
#[derive(Debug, Clone)]
pub struct Normalization {
    pub original: Grammar,
    pub lambda_free: Grammar,
    pub unit_free: Grammar,
    pub useful: Grammar,
    pub chomsky: Grammar,
    pub lambda_map: Option<StepMap>,
    pub unit_map: Option<StepMap>,
    pub chomsky_map: Option<StepMap>,
    // How the original start symbol derives λ, if it does
    pub empty_derivation: Option<DerivationTrace>,
}

impl Normalization {
    pub fn accepts_empty(&self) -> bool {
        self.empty_derivation.is_some()
    }

    pub fn stages(&self) -> [(Stage, &Grammar, Option<&StepMap>); 4] {
        [
            (Stage::LambdaFree, &self.lambda_free, self.lambda_map.as_ref()),
            (Stage::UnitFree, &self.unit_free, self.unit_map.as_ref()),
            (Stage::Useful, &self.useful, None),
            (Stage::Chomsky, &self.chomsky, self.chomsky_map.as_ref()),
        ]
    }

    // Carries a derivation over the CNF grammar back to the original grammar.
    pub fn trace(&self, raw: &[Production]) -> Result<DerivationTrace, TraceErrorType> {
        tracer::trace(
            raw,
            self.chomsky_map.as_ref(),
            self.unit_map.as_ref(),
            self.lambda_map.as_ref(),
        )
    }
}

// The ceiling used when none is given
pub const NO_LIMIT: usize = usize::MAX;

fn within_limit(stage: Stage, grammar: &Grammar, limit: usize) -> Result<(), PipelineErrorType> {
    if grammar.len() > limit {
        Err(PipelineErrorType::TooManyProductions { stage, count: grammar.len(), limit })
    } else {
        Ok(())
    }
}

// Runs every stage without a ceiling. It can still fail when a right-hand
// side holds too many nullable occurrences to enumerate at all.
pub fn normalize(grammar: &Grammar) -> Result<Normalization, PipelineErrorType> {
    normalize_with_limit(grammar, NO_LIMIT)
}

// Like `normalize`, but gives up as soon as a stage would hold more than
// `limit` productions. The λ and CNF stages stop before doing the work;
// unit removal grows at most quadratically and is checked once it is done.
pub fn normalize_with_limit(grammar: &Grammar, limit: usize) -> Result<Normalization, PipelineErrorType> {
    let (lambda_free, lambda_map) = lambda::eliminate(grammar, limit)?;
    within_limit(Stage::LambdaFree, &lambda_free, limit)?;
    let (unit_free, unit_map) = unit::eliminate(&lambda_free);
    within_limit(Stage::UnitFree, &unit_free, limit)?;
    let useful = useless::eliminate(&unit_free);
    let (chomsky, chomsky_map) = chomsky::convert(&useful, limit)?;

    let empty_derivation = lambda::nullable_variables(grammar).remove(grammar.start());

    Ok(Normalization {
        original: grammar.clone(),
        lambda_free,
        unit_free,
        useful,
        chomsky,
        lambda_map,
        unit_map,
        chomsky_map,
        empty_derivation,
    })
}
