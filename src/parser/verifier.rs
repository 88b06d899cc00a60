use std::collections::HashSet;
use std::path::Path;

use super::CompileErrorType::UndefinedVariable;
use super::{CompileError, CompileErrors, FileResult, Rule};
use crate::grammar::Symbol;

fn get_alternative_undefined_variables(alternative: &[Symbol], rule: &Rule, defined: &HashSet<&str>) -> CompileErrors {
    // Keep only the variables of the alternative, then only the undefined ones
    alternative.iter()
        .filter_map(Symbol::as_variable)
        .filter(|variable| !defined.contains(variable))
        .map(|variable| CompileError {
            location: rule.location.clone(),
            error: UndefinedVariable(variable.to_owned())
        })
        .collect()
}

fn get_undefined_variables(rules: &[Rule], defined: &HashSet<&str>) -> CompileErrors {
    rules.iter()
        .flat_map(|rule| {
            rule.alternatives.iter()
                .flat_map(move |alternative| get_alternative_undefined_variables(alternative, rule, defined))
        })
        .collect()
}

// Checks that every variable used, the start symbol included, has a rule
pub fn verify_rules(rules: &[Rule], start: &str, file: &Path) -> FileResult<()> {
    let defined: HashSet<&str> = rules.iter().map(|rule| rule.variable.as_str()).collect();

    let mut errors = Vec::new();

    if !defined.contains(start) {
        errors.push(CompileError::at_file(file.to_path_buf(), UndefinedVariable(start.to_owned())));
    }
    errors.extend(get_undefined_variables(rules, &defined));

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
