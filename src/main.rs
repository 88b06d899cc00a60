mod cli;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;

use chomsky::derivation::{leftmost, sentence, ReplayError};
use chomsky::generator::{self, GenerateError};
use chomsky::grammar::*;
use chomsky::parser;
use chomsky::recognizer;
use chomsky::tracer::TraceError;
use chomsky::transform::{self, Normalization, PipelineError};
use cli::Cli;

fn print_stages(normalization: &Normalization) {
    println!("; original");
    println!("{}", normalization.original);
    for (stage, grammar, map) in normalization.stages() {
        println!("; {}", stage);
        print!("{}", grammar);
        if let Some(map) = map {
            print!("{}", map);
        }
        println!();
    }
}

fn print_derivation(title: &str, derivation: &[Production]) {
    println!("  {}:", title);
    for production in derivation {
        println!("    {}", production);
    }
}

fn shown(word: &str) -> &str {
    if word.is_empty() { "λ" } else { word }
}

// Parses one word over the CNF grammar and carries the derivation back to
// the original grammar. Returns false if anything went wrong.
fn parse_word(normalization: &Normalization, word: &str, file: &Path, quiet: bool) -> bool {
    println!("{}:", shown(word));

    // λ never reaches the CNF grammar, its derivation is kept aside
    let derivation = if word.is_empty() {
        let Some(derivation) = normalization.empty_derivation.clone() else {
            eprintln!("`λ` is not in the language");
            return false;
        };
        derivation
    } else {
        let Some(raw) = recognizer::parse(&normalization.chomsky, word) else {
            eprintln!("`{}` is not in the language", word);
            return false;
        };
        if !quiet {
            print_derivation("CNF derivation", &raw);
        }
        match normalization.trace(&raw) {
            Ok(derivation) => derivation,
            Err(error) => {
                eprintln!("{}", TraceError::at_file(file.to_path_buf(), error));
                return false;
            }
        }
    };

    print_derivation("derivation", &derivation);

    match leftmost(normalization.original.start(), &derivation) {
        Ok(form) if sentence(&form) == word => true,
        Ok(form) => {
            eprintln!("The derivation of `{}` ends in `{}`", shown(word), shown(&sentence(&form)));
            false
        }
        Err(error) => {
            eprintln!("{}", ReplayError::at_file(file.to_path_buf(), error));
            false
        }
    }
}

fn generate(normalization: &Normalization, cli: &Cli) -> bool {
    for _ in 0..cli.amount {
        match generator::generate_with_thread_rng(&normalization.original, cli.depth) {
            Ok(generated) => {
                println!("{}", shown(&generated.text));
                if !cli.quiet {
                    print_derivation("derivation", &generated.derivation);
                }
            }
            Err(error) => {
                eprintln!("{}", GenerateError::at_file(cli.file.clone(), error));
                return false;
            }
        }
    }
    true
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let grammar = match parser::parse_file(&cli.file, cli.start.as_deref()) {
        Ok(grammar) => grammar,
        Err(errors) => {
            for error in errors {
                eprintln!("{}", error);
            }
            return ExitCode::FAILURE;
        }
    };

    let normalization = match transform::normalize_with_limit(&grammar, cli.max_productions) {
        Ok(normalization) => normalization,
        Err(error) => {
            eprintln!("{}", PipelineError::at_file(cli.file.clone(), error));
            return ExitCode::FAILURE;
        }
    };

    if !cli.quiet {
        print_stages(&normalization);
    }
    if normalization.chomsky.is_empty() {
        if normalization.accepts_empty() {
            eprintln!("warning: the language is only {{λ}}");
        } else {
            eprintln!("warning: the language is empty");
        }
    }

    let mut success = true;
    for word in &cli.words {
        success &= parse_word(&normalization, word, &cli.file, cli.quiet);
    }
    success &= generate(&normalization, &cli);

    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
