//! # tinsel
//!
//! tinsel is a small functional, expression-oriented language for solving
//! per-puzzle coding challenges. This crate contains the whole core: the
//! lexer, a Pratt-style parser, the tree-walking evaluator with its
//! persistent value model and tail-call trampoline, and the solution
//! runner that drives `input`/`part_one`/`part_two`/`test` sections.

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
)]
#![allow(clippy::missing_errors_doc, clippy::result_large_err, clippy::module_name_repetitions)]

/// Defines the structure of parsed code.
///
/// Declares the `Program`, `Statement`, `Expr` and `Pattern` types that
/// represent source text as a tree, with a `SourceLocation` on every node
/// for error reporting.
pub mod ast;
/// Provides unified error types for parsing and evaluation.
///
/// Every error carries a 1-based line and column; parse errors and
/// runtime errors share the top-level [`error::Error`] type the public
/// entry points return.
pub mod error;
/// Orchestrates the entire process of code execution.
///
/// Ties together lexing, parsing, evaluation, the value model, the
/// environment arena and the solution runner, and exposes the public API
/// for running sources.
pub mod interpreter;
/// General utilities shared across phases.
pub mod util;

pub use error::Error;
pub use interpreter::io::{ConsoleIo, IoHandle, NullIo};
pub use interpreter::runner::{run, run_tests, PartResult, RunOutcome, TestResult};
