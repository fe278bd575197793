use std::rc::Rc;

use crate::{
    ast::{Block, Pattern, SourceLocation},
    interpreter::{
        environment::EnvRef,
        evaluator::core::{EvalResult, Evaluator},
        value::core::Value,
    },
};

/// A user-defined function together with its captured defining scope.
///
/// Calling a closure opens a child scope of `env`, binds the parameter
/// patterns there, and evaluates the body in it.
#[derive(Debug, Clone)]
pub struct Closure {
    pub parameters: Rc<Vec<Pattern>>,
    pub body:       Rc<Block>,
    pub env:        EnvRef,
    pub location:   SourceLocation,
}

impl Closure {
    #[must_use]
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }
}

/// The signature shared by every builtin: the evaluator (for callbacks and
/// I/O), the evaluated arguments, and the call site for error reporting.
pub type BuiltinFn = fn(&mut Evaluator, Vec<Value>, SourceLocation) -> EvalResult<Value>;

/// Specifies the allowed number of arguments for a builtin.
#[derive(Debug, Clone, Copy)]
pub enum BuiltinArity {
    /// The builtin takes exactly `n` arguments; fewer curry into a partial
    /// application, more is an arity error.
    Exact(usize),
    /// The builtin accepts any arity listed, e.g. `assert` with or without a
    /// message. The first entry is the smallest.
    OneOf(&'static [usize]),
    /// The builtin accepts any number of arguments and never curries.
    Variadic,
}

impl BuiltinArity {
    /// Tests whether the given argument count satisfies this arity.
    #[must_use]
    pub fn accepts(&self, count: usize) -> bool {
        match self {
            Self::Exact(n) => count == *n,
            Self::OneOf(choices) => choices.contains(&count),
            Self::Variadic => true,
        }
    }

    /// The smallest argument count that completes a call; partial
    /// application fires below this.
    #[must_use]
    pub const fn required(&self) -> usize {
        match self {
            Self::Exact(n) => *n,
            Self::OneOf(choices) => {
                if let Some(first) = choices.first() { *first } else { 0 }
            },
            Self::Variadic => 0,
        }
    }
}

/// A native operation registered in the root scope.
#[derive(Debug)]
pub struct BuiltinDef {
    pub name:  &'static str,
    pub arity: BuiltinArity,
    pub func:  BuiltinFn,
}

/// A function with some argument slots already filled.
///
/// `args` always has exactly the callee's declared arity; unfilled slots
/// hold [`Value::Placeholder`]. Under-application and explicit `_` holes
/// both land here, so the two spellings share one code path.
#[derive(Debug, Clone)]
pub struct PartialApplication {
    pub callee: Value,
    pub args:   Vec<Value>,
}

impl PartialApplication {
    /// The number of still-unfilled slots.
    #[must_use]
    pub fn holes(&self) -> usize {
        self.args
            .iter()
            .filter(|arg| matches!(arg, Value::Placeholder))
            .count()
    }
}
