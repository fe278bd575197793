/// The builtin registry and its operation groups.
pub mod builtin;
/// Function application: closures, builtins, partials and compositions.
pub mod call;
/// The node dispatch, block evaluation and the tail-call trampoline.
pub mod core;
/// The pattern matching engine.
pub mod matcher;
