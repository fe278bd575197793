use num_bigint::BigInt;

/// A position in the source text, as surfaced to users.
///
/// Both fields are 1-based; the zero-indexed byte-offset bookkeeping lives in
/// [`crate::interpreter::position::LineIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SourceLocation {
    /// The 1-based source line.
    pub line:   usize,
    /// The 1-based column, counted in Unicode scalar values.
    pub column: usize,
}

impl SourceLocation {
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// A parsed source file: an ordered sequence of statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
}

/// A brace-delimited sequence of statements, evaluated to its final value.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub location:   SourceLocation,
}

/// Represents a single statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// A `let` binding, optionally `mut`, binding through a pattern.
    Let {
        mutable:  bool,
        pattern:  Pattern,
        value:    Expr,
        location: SourceLocation,
    },
    /// A `return` from the enclosing function body.
    Return {
        value:    Expr,
        location: SourceLocation,
    },
    /// A `break` out of the enclosing fold-style callback.
    Break {
        value:    Expr,
        location: SourceLocation,
    },
    /// A named section, `name: { … }` or `name: expr`.
    Section {
        name:     String,
        body:     Block,
        location: SourceLocation,
    },
    /// A statement prefixed by an `@name` annotation (e.g. `@slow`).
    Annotated {
        name:     String,
        target:   Box<Statement>,
        location: SourceLocation,
    },
    /// A bare expression used as a statement.
    Expression {
        expr:     Expr,
        location: SourceLocation,
    },
}

impl Statement {
    /// The source position the statement starts at.
    #[must_use]
    pub const fn location(&self) -> SourceLocation {
        match self {
            Self::Let { location, .. }
            | Self::Return { location, .. }
            | Self::Break { location, .. }
            | Self::Section { location, .. }
            | Self::Annotated { location, .. }
            | Self::Expression { location, .. } => *location,
        }
    }
}

/// One piece of a string literal: literal text, or an embedded `{expr}`.
#[derive(Debug, Clone, PartialEq)]
pub enum StringPart {
    Text(String),
    Interpolation(Expr),
}

/// One arm of a `match` expression: `pattern if guard => body`.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchArm {
    pub pattern:  Pattern,
    pub guard:    Option<Expr>,
    pub body:     Block,
    pub location: SourceLocation,
}

/// Represents an expression node.
///
/// Binary operators are not separate variants: the parser encodes `a + b` as
/// `Call` with callee `Identifier("+")`, so operators resolve through the
/// environment like any other function and can be passed around as values.
/// Only `&&` and `||` are recognised structurally by the evaluator, keeping
/// them short-circuiting.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// An integer literal; arbitrary precision.
    Integer {
        value:    BigInt,
        location: SourceLocation,
    },
    /// A decimal literal.
    Decimal {
        value:    f64,
        location: SourceLocation,
    },
    /// A string literal, escape-decoded and split on `{expr}` interpolations.
    StringLit {
        parts:    Vec<StringPart>,
        location: SourceLocation,
    },
    Boolean {
        value:    bool,
        location: SourceLocation,
    },
    Nil {
        location: SourceLocation,
    },
    Identifier {
        name:     String,
        location: SourceLocation,
    },
    /// The `_` placeholder in argument position, driving partial application.
    Placeholder {
        location: SourceLocation,
    },
    List {
        elements: Vec<Expr>,
        location: SourceLocation,
    },
    /// A `#{k: v, …}` dictionary literal.
    Dict {
        entries:  Vec<(Expr, Expr)>,
        location: SourceLocation,
    },
    /// A `{a, b, …}` set literal.
    Set {
        elements: Vec<Expr>,
        location: SourceLocation,
    },
    /// A range literal `start..end`, `start..=end` or the unbounded `start..`.
    Range {
        start:     Box<Expr>,
        end:       Option<Box<Expr>>,
        inclusive: bool,
        location:  SourceLocation,
    },
    /// A function literal `|p1, p2, …| body`.
    Function {
        parameters: Vec<Pattern>,
        body:       Block,
        location:   SourceLocation,
    },
    Call {
        callee:    Box<Expr>,
        arguments: Vec<Expr>,
        location:  SourceLocation,
    },
    /// A unary prefix operation, `-x` or `!x`.
    Prefix {
        operator: PrefixOperator,
        operand:  Box<Expr>,
        location: SourceLocation,
    },
    /// An assignment `name = expr` to an existing mutable binding.
    Assign {
        target:   Box<Expr>,
        value:    Box<Expr>,
        location: SourceLocation,
    },
    Index {
        receiver: Box<Expr>,
        index:    Box<Expr>,
        location: SourceLocation,
    },
    If {
        condition:   Box<Expr>,
        consequence: Block,
        alternative: Option<Block>,
        location:    SourceLocation,
    },
    Match {
        subject:  Box<Expr>,
        arms:     Vec<MatchArm>,
        location: SourceLocation,
    },
}

/// The two prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOperator {
    Negate,
    Not,
}

impl std::fmt::Display for PrefixOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Negate => write!(f, "-"),
            Self::Not => write!(f, "!"),
        }
    }
}

impl Expr {
    /// The source position the expression starts at.
    #[must_use]
    pub const fn location(&self) -> SourceLocation {
        match self {
            Self::Integer { location, .. }
            | Self::Decimal { location, .. }
            | Self::StringLit { location, .. }
            | Self::Boolean { location, .. }
            | Self::Nil { location }
            | Self::Identifier { location, .. }
            | Self::Placeholder { location }
            | Self::List { location, .. }
            | Self::Dict { location, .. }
            | Self::Set { location, .. }
            | Self::Range { location, .. }
            | Self::Function { location, .. }
            | Self::Call { location, .. }
            | Self::Prefix { location, .. }
            | Self::Assign { location, .. }
            | Self::Index { location, .. }
            | Self::If { location, .. }
            | Self::Match { location, .. } => *location,
        }
    }
}

/// A destructuring pattern, used by `let`, function parameters and `match`
/// arms.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    /// Binds the whole candidate unconditionally.
    Identifier {
        name:     String,
        location: SourceLocation,
    },
    /// `_`: matches anything, binds nothing.
    Wildcard {
        location: SourceLocation,
    },
    /// A literal expression compared by structural equality.
    Literal {
        value:    Box<Expr>,
        location: SourceLocation,
    },
    /// `[p1, p2, ..rest]`: the rest binding, when present, captures the tail.
    List {
        elements: Vec<Pattern>,
        rest:     Option<RestPattern>,
        location: SourceLocation,
    },
    /// `#{key: p, …}`: matches dictionaries containing every listed key.
    Dict {
        entries:  Vec<(Expr, Pattern)>,
        location: SourceLocation,
    },
}

/// The `..name` (or bare `.._`) tail capture of a list pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct RestPattern {
    /// `None` for `.._`: the tail is matched but not bound.
    pub name:     Option<String>,
    pub location: SourceLocation,
}

impl Pattern {
    /// The source position the pattern starts at.
    #[must_use]
    pub const fn location(&self) -> SourceLocation {
        match self {
            Self::Identifier { location, .. }
            | Self::Wildcard { location }
            | Self::Literal { location, .. }
            | Self::List { location, .. }
            | Self::Dict { location, .. } => *location,
        }
    }
}
