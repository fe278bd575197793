use crate::ast::SourceLocation;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Represents all errors that can be raised during evaluation.
///
/// Within the evaluator these flow outward as values, short-circuiting any
/// enclosing expression; there is no catch construct in the language, so the
/// first error raised surfaces as the result of the run.
pub enum RuntimeError {
    /// A reference to an identifier with no binding in scope.
    UnknownIdentifier {
        /// The name of the identifier.
        name:     String,
        /// Where the reference occurred.
        location: SourceLocation,
    },
    /// A `let` for a name already declared in the same scope.
    Redeclaration {
        /// The name of the binding.
        name:     String,
        /// Where the second declaration occurred.
        location: SourceLocation,
    },
    /// An assignment to a binding declared without `mut`.
    AssignToImmutable {
        /// The name of the binding.
        name:     String,
        /// Where the assignment occurred.
        location: SourceLocation,
    },
    /// An assignment to a name with no binding in scope.
    AssignToUnbound {
        /// The name of the binding.
        name:     String,
        /// Where the assignment occurred.
        location: SourceLocation,
    },
    /// An operator or builtin applied to an operand of the wrong type.
    TypeMismatch {
        /// Details about the mismatch.
        details:  String,
        /// Where the operation occurred.
        location: SourceLocation,
    },
    /// A value that is not callable was called.
    NotCallable {
        /// The type name of the value.
        type_name: &'static str,
        /// Where the call occurred.
        location:  SourceLocation,
    },
    /// A builtin with strict arity received the wrong number of arguments.
    WrongArity {
        /// The name of the function.
        name:     String,
        /// The expected number of arguments.
        expected: usize,
        /// The number of arguments actually supplied.
        found:    usize,
        /// Where the call occurred.
        location: SourceLocation,
    },
    /// Integer division by zero.
    DivisionByZero {
        /// Where the division occurred.
        location: SourceLocation,
    },
    /// An operation that must observe length was applied to an unbounded
    /// range or sequence.
    UnboundedRange {
        /// The name of the offending operation.
        operation: &'static str,
        /// Where the operation occurred.
        location:  SourceLocation,
    },
    /// No arm of a `match` matched the scrutinee.
    UnmatchedPattern {
        /// Where the scrutinee was evaluated.
        location: SourceLocation,
    },
    /// An `assert` was handed a falsy condition.
    AssertionFailed {
        /// The message supplied to `assert`, when present.
        message:  Option<String>,
        /// Where the assertion occurred.
        location: SourceLocation,
    },
    /// A value without a hash was used as a dictionary or set key.
    UnhashableKey {
        /// The type name of the offending key.
        type_name: &'static str,
        /// Where the key was supplied.
        location:  SourceLocation,
    },
    /// A `!`-suffixed operation received a persistent collection, or a plain
    /// operation received a transient one.
    WrongPersistence {
        /// Details about the receiver mismatch.
        details:  String,
        /// Where the operation occurred.
        location: SourceLocation,
    },
    /// A value was of the right type but outside the permitted domain.
    DomainError {
        /// Details about the violation.
        details:  String,
        /// Where the operation occurred.
        location: SourceLocation,
    },
    /// A `break` evaluated outside any fold-style callback.
    BreakOutsideCallback {
        /// Where the break occurred.
        location: SourceLocation,
    },
    /// The injected I/O handle reported a failure.
    Io {
        /// The failure reported by the handle.
        details:  String,
        /// Where the I/O call occurred.
        location: SourceLocation,
    },
}

impl RuntimeError {
    /// The source position the error points at.
    #[must_use]
    pub const fn location(&self) -> SourceLocation {
        match self {
            Self::UnknownIdentifier { location, .. }
            | Self::Redeclaration { location, .. }
            | Self::AssignToImmutable { location, .. }
            | Self::AssignToUnbound { location, .. }
            | Self::TypeMismatch { location, .. }
            | Self::NotCallable { location, .. }
            | Self::WrongArity { location, .. }
            | Self::DivisionByZero { location }
            | Self::UnboundedRange { location, .. }
            | Self::UnmatchedPattern { location }
            | Self::AssertionFailed { location, .. }
            | Self::UnhashableKey { location, .. }
            | Self::WrongPersistence { location, .. }
            | Self::DomainError { location, .. }
            | Self::BreakOutsideCallback { location }
            | Self::Io { location, .. } => *location,
        }
    }
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownIdentifier { name, location } => {
                write!(f, "Runtime error at {location}: Identifier '{name}' is not bound.")
            },

            Self::Redeclaration { name, location } => {
                write!(f, "Runtime error at {location}: '{name}' is already declared in this scope.")
            },

            Self::AssignToImmutable { name, location } => {
                write!(f, "Runtime error at {location}: Binding '{name}' is not mutable.")
            },

            Self::AssignToUnbound { name, location } => {
                write!(f, "Runtime error at {location}: Cannot assign to undeclared name '{name}'.")
            },

            Self::TypeMismatch { details, location } => {
                write!(f, "Runtime error at {location}: Type mismatch: {details}.")
            },

            Self::NotCallable { type_name, location } => {
                write!(f, "Runtime error at {location}: A {type_name} is not callable.")
            },

            Self::WrongArity { name, expected, found, location } => {
                write!(
                    f,
                    "Runtime error at {location}: '{name}' expects {expected} arguments, found {found}."
                )
            },

            Self::DivisionByZero { location } => {
                write!(f, "Runtime error at {location}: Division by zero.")
            },

            Self::UnboundedRange { operation, location } => {
                write!(
                    f,
                    "Runtime error at {location}: '{operation}' is undefined for an unbounded range."
                )
            },

            Self::UnmatchedPattern { location } => {
                write!(f, "Runtime error at {location}: No match arm matched the value.")
            },

            Self::AssertionFailed { message, location } => match message {
                Some(message) => {
                    write!(f, "Runtime error at {location}: Assertion failed: {message}.")
                },
                None => write!(f, "Runtime error at {location}: Assertion failed."),
            },

            Self::UnhashableKey { type_name, location } => {
                write!(f, "Runtime error at {location}: A {type_name} cannot be used as a key.")
            },

            Self::WrongPersistence { details, location } => {
                write!(f, "Runtime error at {location}: {details}.")
            },

            Self::DomainError { details, location } => {
                write!(f, "Runtime error at {location}: {details}.")
            },

            Self::BreakOutsideCallback { location } => {
                write!(f, "Runtime error at {location}: 'break' outside of a fold-style callback.")
            },

            Self::Io { details, location } => {
                write!(f, "Runtime error at {location}: I/O failed: {details}.")
            },
        }
    }
}

impl std::error::Error for RuntimeError {}
