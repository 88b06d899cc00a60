use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// File containing the grammar
    pub file: PathBuf,

    /// Start symbol (default: first in the file)
    #[arg(short, long, value_name = "SYMBOL")]
    pub start: Option<String>,

    /// Word to parse and trace back to the original grammar (repeatable)
    #[arg(short = 'p', long = "parse", value_name = "WORD")]
    pub words: Vec<String>,

    /// Amount of random sentences to generate
    #[arg(short = 'n', long, value_name = "AMOUNT", default_value_t = 0)]
    pub amount: u32,

    /// Derivation depth after which generation heads for the shortest way out
    #[arg(short, long, value_name = "DEPTH", default_value_t = 12)]
    pub depth: usize,

    /// Give up when a normalization stage grows past this many productions
    #[arg(long, value_name = "COUNT", default_value_t = 10_000)]
    pub max_productions: usize,

    /// Only print results, not the grammar of every stage
    #[arg(short, long)]
    pub quiet: bool
}
