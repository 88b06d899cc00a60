/*
    Grammar normalization: λ-removal, unit removal, useless removal and
    Chomsky normal form, with derivations traced back through each stage
*/

pub mod derivation;
pub mod error_handling;
pub mod generator;
pub mod grammar;
pub mod parser;
pub mod recognizer;
pub mod tracer;
pub mod transform;
