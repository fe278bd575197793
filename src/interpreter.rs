/// Lexically-scoped environments, held in a per-run arena.
///
/// Scopes are addressed by handle rather than owning pointers, so the
/// reference cycles between closures and their defining scopes need no
/// collector: the arena is dropped wholesale when a run ends.
pub mod environment;
/// The evaluator executes AST nodes and computes results.
///
/// The evaluator walks the tree, tracks control-flow carriers, trampolines
/// tail calls, matches patterns and dispatches builtins. It is the core
/// execution engine of the interpreter.
pub mod evaluator;
/// The injected I/O handle and its standard implementations.
///
/// The interpreter never touches the file system or console directly;
/// `read` and `puts` delegate to whatever handle the embedding injects.
pub mod io;
/// The lexer tokenizes source code for further parsing.
///
/// Token definitions live in a `logos`-derived enum; tokens carry their raw
/// lexeme and source position. This is the first stage of interpretation.
pub mod lexer;
/// The parser builds the abstract syntax tree (AST) from tokens.
///
/// A Pratt-style expression parser plus a statement recogniser. Produces
/// `Program` nodes for the evaluator and reports syntax errors with
/// locations.
pub mod parser;
/// Byte-offset to line/column translation for source positions.
pub mod position;
/// The solution runner: section discovery, solve and test modes, timings.
pub mod runner;
/// The runtime value model: the `Value` enum and its supporting types.
///
/// Declares all value kinds used during execution, including persistent
/// collections, lazy ranges and sequences, closures and partial
/// applications, with methods for truthiness, rendering, equality, hashing
/// and ordering.
pub mod value;
