use crate::{
    ast::{Block, Expr, MatchArm, PrefixOperator, Program, SourceLocation, Statement, StringPart},
    error::ParseError,
    interpreter::lexer::{Lexer, Token, TokenKind},
    util::num::{parse_decimal_literal, parse_integer_literal},
};

/// Result type used by all parsing functions.
pub type ParseResult<T> = Result<T, ParseError>;

/// Binding strength of expression constructs, ascending.
///
/// An infix parser runs only while the next token binds more tightly than
/// the context it appears in, which is what makes `a + b * c` associate as
/// `a + (b * c)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    /// `&&`, `||`
    AndOr,
    /// `==`, `!=`, `=`
    Equals,
    /// Bare literal and identifier contexts, `if`, `match`.
    Identifier,
    /// `<`, `>`, `<=`, `>=`
    LessGreater,
    /// `>>`, `|>`, `..`, `..=`
    Composition,
    /// `+`, `-`
    Sum,
    /// `*`, `/`, `%`, backtick infix
    Product,
    /// `(` as a call
    Call,
    /// Unary `-`, `!`
    Prefix,
    /// `[` as an index
    Index,
}

/// The infix binding strength of a token, or `None` when the token cannot
/// extend an expression.
const fn infix_precedence(kind: TokenKind) -> Option<Precedence> {
    match kind {
        TokenKind::AndAnd | TokenKind::OrOr => Some(Precedence::AndOr),
        TokenKind::Eq | TokenKind::NotEq | TokenKind::Assign => Some(Precedence::Equals),
        TokenKind::Lt | TokenKind::Gt | TokenKind::LtEq | TokenKind::GtEq => {
            Some(Precedence::LessGreater)
        },
        TokenKind::Compose
        | TokenKind::PipeArrow
        | TokenKind::DotDot
        | TokenKind::DotDotEq => Some(Precedence::Composition),
        TokenKind::Plus | TokenKind::Minus => Some(Precedence::Sum),
        TokenKind::Star | TokenKind::Slash | TokenKind::Percent | TokenKind::Backtick => {
            Some(Precedence::Product)
        },
        TokenKind::LParen => Some(Precedence::Call),
        TokenKind::LBracket => Some(Precedence::Index),
        _ => None,
    }
}

/// Whether a token may start an expression; used to tell `1..` apart from
/// `1..end` after a range operator.
const fn starts_expression(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Integer
            | TokenKind::Decimal
            | TokenKind::Str
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Nil
            | TokenKind::Identifier
            | TokenKind::Underscore
            | TokenKind::Minus
            | TokenKind::Bang
            | TokenKind::LParen
            | TokenKind::LBracket
            | TokenKind::HashBrace
            | TokenKind::LBrace
            | TokenKind::If
            | TokenKind::Match
            | TokenKind::Pipe
            | TokenKind::OrOr
    )
}

/// A Pratt parser over the token stream.
///
/// The cursor convention is that `current` is the next unconsumed token;
/// `None` is the end-of-input sentinel.
pub struct Parser<'src> {
    lexer:         Lexer<'src>,
    current:       Option<Token>,
    /// One token of buffered lookahead; `Some(None)` buffers the EOF.
    peeked:        Option<Option<Token>>,
    last_location: SourceLocation,
}

impl<'src> Parser<'src> {
    /// Creates a parser over `source`.
    ///
    /// # Errors
    /// Fails when the first token is already malformed.
    pub fn new(source: &'src str) -> ParseResult<Self> {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token()?;

        Ok(Self { lexer,
                  current,
                  peeked: None,
                  last_location: SourceLocation::new(1, 1) })
    }

    /// Parses a whole source file.
    ///
    /// # Errors
    /// Returns the first lexical or syntactic error encountered.
    pub fn parse_program(&mut self) -> ParseResult<Program> {
        let mut statements = Vec::new();
        loop {
            while self.at(TokenKind::Semicolon) {
                self.advance()?;
            }
            if self.current.is_none() {
                break;
            }
            statements.push(self.parse_statement()?);
        }

        Ok(Program { statements })
    }

    /// Parses one expression and requires it to consume all input; used for
    /// string interpolation fragments.
    pub(in crate::interpreter::parser) fn parse_complete_expression(&mut self) -> ParseResult<Expr> {
        let expr = self.parse_expression(Precedence::Lowest)?;
        if let Some(token) = &self.current {
            return Err(ParseError::UnexpectedToken { token:    format!("{} after expression",
                                                                       token.describe()),
                                                     location: token.location });
        }
        Ok(expr)
    }

    // ---- cursor helpers ----

    pub(in crate::interpreter::parser) fn advance(&mut self) -> ParseResult<()> {
        if let Some(token) = &self.current {
            self.last_location = token.location;
        }
        self.current = match self.peeked.take() {
            Some(buffered) => buffered,
            None => self.lexer.next_token()?,
        };
        Ok(())
    }

    /// Consumes and returns the current token; end of input is an error.
    pub(in crate::interpreter::parser) fn bump(&mut self) -> ParseResult<Token> {
        let token = self.current
                        .clone()
                        .ok_or(ParseError::UnexpectedEndOfInput { location: self.last_location })?;
        self.advance()?;
        Ok(token)
    }

    pub(in crate::interpreter::parser) fn current_kind(&self) -> Option<TokenKind> {
        self.current.as_ref().map(|token| token.kind)
    }

    pub(in crate::interpreter::parser) fn at(&self, kind: TokenKind) -> bool {
        self.current_kind() == Some(kind)
    }

    /// Peeks one token past the current one.
    pub(in crate::interpreter::parser) fn peek_kind(&mut self) -> ParseResult<Option<TokenKind>> {
        if self.peeked.is_none() {
            self.peeked = Some(self.lexer.next_token()?);
        }
        Ok(self.peeked
               .as_ref()
               .and_then(|buffered| buffered.as_ref().map(|token| token.kind)))
    }

    /// Consumes the current token when it matches.
    pub(in crate::interpreter::parser) fn eat(&mut self, kind: TokenKind) -> ParseResult<bool> {
        if self.at(kind) {
            self.advance()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Requires and consumes a token of the given kind.
    pub(in crate::interpreter::parser) fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        match &self.current {
            Some(token) if token.kind == kind => self.bump(),
            Some(token) => Err(ParseError::UnexpectedToken { token: format!("{} where {} was expected",
                                                                            token.describe(),
                                                                            kind.describe()),
                                                             location: token.location }),
            None => Err(ParseError::UnexpectedEndOfInput { location: self.last_location }),
        }
    }

    /// The location parse errors should point at right now.
    pub(in crate::interpreter::parser) fn location(&self) -> SourceLocation {
        self.current
            .as_ref()
            .map_or(self.last_location, |token| token.location)
    }

    /// Builds the literal expression for an already-consumed literal token.
    pub(in crate::interpreter::parser) fn literal_expr_from(&self, token: &Token) -> ParseResult<Expr> {
        match token.kind {
            TokenKind::Integer => {
                let value = parse_integer_literal(&token.literal).ok_or_else(|| {
                                ParseError::MalformedNumber { literal:  token.literal.clone(),
                                                              location: token.location }
                            })?;
                Ok(Expr::Integer { value, location: token.location })
            },
            TokenKind::Decimal => {
                let value = parse_decimal_literal(&token.literal).ok_or_else(|| {
                                ParseError::MalformedNumber { literal:  token.literal.clone(),
                                                              location: token.location }
                            })?;
                Ok(Expr::Decimal { value, location: token.location })
            },
            TokenKind::Str => self.parse_string_literal(token),
            _ => Err(ParseError::UnexpectedToken { token:    format!("{} where a literal was \
                                                                     expected",
                                                                    token.describe()),
                                                   location: token.location }),
        }
    }

    // ---- expressions ----

    /// Parses an expression at the given minimum binding strength.
    pub(in crate::interpreter::parser) fn parse_expression(&mut self,
                                                           min: Precedence)
                                                           -> ParseResult<Expr> {
        let mut left = self.parse_prefix()?;

        while let Some(kind) = self.current_kind() {
            let Some(precedence) = infix_precedence(kind) else {
                break;
            };
            if precedence <= min {
                break;
            }
            left = self.parse_infix(left, precedence)?;
        }

        Ok(left)
    }

    /// Parses the tokens that may start an expression.
    fn parse_prefix(&mut self) -> ParseResult<Expr> {
        let Some(token) = self.current.clone() else {
            return Err(ParseError::UnexpectedEndOfInput { location: self.last_location });
        };

        match token.kind {
            TokenKind::Integer | TokenKind::Decimal | TokenKind::Str => {
                self.advance()?;
                self.literal_expr_from(&token)
            },

            TokenKind::True | TokenKind::False => {
                self.advance()?;
                Ok(Expr::Boolean { value:    token.kind == TokenKind::True,
                                   location: token.location })
            },

            TokenKind::Nil => {
                self.advance()?;
                Ok(Expr::Nil { location: token.location })
            },

            TokenKind::Identifier => {
                self.advance()?;
                Ok(Expr::Identifier { name:     token.literal.clone(),
                                      location: token.location })
            },

            TokenKind::Underscore => {
                self.advance()?;
                Ok(Expr::Placeholder { location: token.location })
            },

            TokenKind::Minus | TokenKind::Bang => {
                self.advance()?;
                let operator = if token.kind == TokenKind::Minus {
                    PrefixOperator::Negate
                } else {
                    PrefixOperator::Not
                };
                let operand = self.parse_expression(Precedence::Prefix)?;
                Ok(Expr::Prefix { operator,
                                  operand: Box::new(operand),
                                  location: token.location })
            },

            TokenKind::LParen => {
                self.advance()?;
                let inner = self.parse_expression(Precedence::Lowest)?;
                if !self.eat(TokenKind::RParen)? {
                    return Err(ParseError::MissingClosingDelimiter { delimiter: ")",
                                                                     location:  token.location });
                }
                Ok(inner)
            },

            TokenKind::LBracket => {
                self.advance()?;
                let elements = self.parse_comma_separated(|p| {
                                       p.parse_expression(Precedence::Lowest)
                                   },
                                   TokenKind::RBracket,
                                   "]",
                                   token.location)?;
                Ok(Expr::List { elements, location: token.location })
            },

            TokenKind::LBrace => {
                self.advance()?;
                let elements = self.parse_comma_separated(|p| {
                                       p.parse_expression(Precedence::Lowest)
                                   },
                                   TokenKind::RBrace,
                                   "}",
                                   token.location)?;
                Ok(Expr::Set { elements, location: token.location })
            },

            TokenKind::HashBrace => self.parse_dict_literal(),

            TokenKind::If => self.parse_if(),

            TokenKind::Match => self.parse_match(),

            TokenKind::Pipe | TokenKind::OrOr => self.parse_function_literal(),

            _ => Err(ParseError::InvalidOperatorPosition { token: format!("{} in expression position",
                                                                          token.describe()),
                                                           location: token.location }),
        }
    }

    /// Parses the tokens that extend an expression to the left.
    fn parse_infix(&mut self, left: Expr, precedence: Precedence) -> ParseResult<Expr> {
        let token = self.current
                        .clone()
                        .ok_or(ParseError::UnexpectedEndOfInput { location: self.last_location })?;

        match token.kind {
            // A call: `callee(args…)`, with optional trailing lambda.
            TokenKind::LParen => {
                self.advance()?;
                let mut arguments = self.parse_comma_separated(|p| {
                                            p.parse_expression(Precedence::Lowest)
                                        },
                                        TokenKind::RParen,
                                        ")",
                                        token.location)?;
                if matches!(self.current_kind(), Some(TokenKind::Pipe | TokenKind::OrOr)) {
                    arguments.push(self.parse_function_literal()?);
                }
                let location = left.location();
                Ok(Expr::Call { callee: Box::new(left),
                                arguments,
                                location })
            },

            // An index: `receiver[index]`.
            TokenKind::LBracket => {
                self.advance()?;
                let index = self.parse_expression(Precedence::Lowest)?;
                if !self.eat(TokenKind::RBracket)? {
                    return Err(ParseError::MissingClosingDelimiter { delimiter: "]",
                                                                     location:  token.location });
                }
                Ok(Expr::Index { receiver: Box::new(left),
                                 index:    Box::new(index),
                                 location: token.location })
            },

            // Assignment to an existing binding.
            TokenKind::Assign => {
                self.advance()?;
                let value = self.parse_expression(precedence)?;
                Ok(Expr::Assign { target:   Box::new(left),
                                  value:    Box::new(value),
                                  location: token.location })
            },

            // Range constructors; the end is optional, `start..` is
            // unbounded.
            TokenKind::DotDot | TokenKind::DotDotEq => {
                self.advance()?;
                let inclusive = token.kind == TokenKind::DotDotEq;
                let end = match self.current_kind() {
                    Some(kind) if starts_expression(kind) => {
                        Some(Box::new(self.parse_expression(Precedence::Composition)?))
                    },
                    _ => None,
                };
                Ok(Expr::Range { start: Box::new(left),
                                 end,
                                 inclusive,
                                 location: token.location })
            },

            // A backtick-quoted identifier used as an infix operator.
            TokenKind::Backtick => {
                self.advance()?;
                let name = self.expect(TokenKind::Identifier)?;
                self.expect(TokenKind::Backtick)?;
                let right = self.parse_expression(Precedence::Product)?;
                Ok(Expr::Call { callee: Box::new(Expr::Identifier { name: name.literal.clone(),
                                                                    location: name.location }),
                                arguments: vec![left, right],
                                location: name.location })
            },

            // Every other operator is a plain binary call on the operator's
            // name.
            _ => {
                self.advance()?;
                let right = self.parse_expression(precedence)?;
                Ok(Expr::Call { callee: Box::new(Expr::Identifier { name: token.literal.clone(),
                                                                    location: token.location }),
                                arguments: vec![left, right],
                                location: token.location })
            },
        }
    }

    /// Parses a `{ … }` block.
    pub(in crate::interpreter::parser) fn parse_block(&mut self) -> ParseResult<Block> {
        let open = self.expect(TokenKind::LBrace)?;
        let mut statements = Vec::new();
        loop {
            while self.at(TokenKind::Semicolon) {
                self.advance()?;
            }
            if self.at(TokenKind::RBrace) {
                break;
            }
            if self.current.is_none() {
                return Err(ParseError::MissingClosingDelimiter { delimiter: "}",
                                                                 location:  open.location });
            }
            statements.push(self.parse_statement()?);
        }
        self.advance()?;

        Ok(Block { statements, location: open.location })
    }

    /// Parses `if cond { … }` with optional `else`/`else if`.
    fn parse_if(&mut self) -> ParseResult<Expr> {
        let keyword = self.bump()?;
        let condition = self.parse_expression(Precedence::Lowest)?;
        let consequence = self.parse_block()?;

        let alternative = if self.eat(TokenKind::Else)? {
            if self.at(TokenKind::If) {
                let nested = self.parse_if()?;
                let location = nested.location();
                Some(Block { statements: vec![Statement::Expression { expr: nested, location }],
                             location })
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };

        Ok(Expr::If { condition: Box::new(condition),
                      consequence,
                      alternative,
                      location: keyword.location })
    }

    /// Parses `match subject { pattern if guard => body, … }`.
    fn parse_match(&mut self) -> ParseResult<Expr> {
        let keyword = self.bump()?;
        let subject = self.parse_expression(Precedence::Lowest)?;
        let open = self.expect(TokenKind::LBrace)?;

        let mut arms = Vec::new();
        loop {
            if self.at(TokenKind::RBrace) {
                self.advance()?;
                break;
            }
            if self.current.is_none() {
                return Err(ParseError::MissingClosingDelimiter { delimiter: "}",
                                                                 location:  open.location });
            }

            let pattern = self.parse_pattern()?;
            let location = pattern.location();
            let guard = if self.eat(TokenKind::If)? {
                Some(self.parse_expression(Precedence::Lowest)?)
            } else {
                None
            };
            self.expect(TokenKind::FatArrow)?;
            let body = self.parse_expression_or_block()?;
            arms.push(MatchArm { pattern, guard, body, location });

            self.eat(TokenKind::Comma)?;
        }

        Ok(Expr::Match { subject: Box::new(subject),
                         arms,
                         location: keyword.location })
    }

    /// Parses `|p1, p2, …| body`; the body is a block or a bare expression.
    pub(in crate::interpreter::parser) fn parse_function_literal(&mut self) -> ParseResult<Expr> {
        let open = self.bump()?;
        let parameters = match open.kind {
            // `||` lexes as one token, so a parameterless literal arrives
            // here already "closed".
            TokenKind::OrOr => Vec::new(),
            _ => self.parse_comma_separated(Self::parse_pattern,
                                            TokenKind::Pipe,
                                            "|",
                                            open.location)?,
        };

        let body = self.parse_expression_or_block()?;
        Ok(Expr::Function { parameters,
                            body,
                            location: open.location })
    }

    /// A block when braces follow, otherwise a single expression wrapped as
    /// a one-statement block.
    pub(in crate::interpreter::parser) fn parse_expression_or_block(&mut self) -> ParseResult<Block> {
        if self.at(TokenKind::LBrace) {
            return self.parse_block();
        }
        let expr = self.parse_expression(Precedence::Lowest)?;
        let location = expr.location();
        Ok(Block { statements: vec![Statement::Expression { expr, location }],
                   location })
    }

    /// Parses `#{key: value, …}` with identifier keys as string keys and
    /// `#{name}` shorthand binding the identifier's value under its name.
    fn parse_dict_literal(&mut self) -> ParseResult<Expr> {
        let open = self.bump()?;
        let mut entries = Vec::new();

        loop {
            if self.at(TokenKind::RBrace) {
                self.advance()?;
                break;
            }
            if self.current.is_none() {
                return Err(ParseError::MissingClosingDelimiter { delimiter: "}",
                                                                 location:  open.location });
            }

            let entry = if self.at(TokenKind::Identifier) {
                let name = self.bump()?;
                let key = Expr::StringLit { parts:    vec![StringPart::Text(name.literal.clone())],
                                            location: name.location };
                if self.eat(TokenKind::Colon)? {
                    (key, self.parse_expression(Precedence::Lowest)?)
                } else {
                    // Shorthand `#{name}`.
                    let value = Expr::Identifier { name:     name.literal.clone(),
                                                   location: name.location };
                    (key, value)
                }
            } else {
                let key = self.parse_expression(Precedence::Lowest)?;
                self.expect(TokenKind::Colon)?;
                (key, self.parse_expression(Precedence::Lowest)?)
            };
            entries.push(entry);

            if self.eat(TokenKind::Comma)? {
                continue;
            }
            if !self.at(TokenKind::RBrace) {
                return Err(ParseError::UnexpectedToken { token: format!("{} where ',' or '}}' was expected",
                                                                        self.describe_current()),
                                                         location: self.location() });
            }
        }

        Ok(Expr::Dict { entries, location: open.location })
    }

    pub(in crate::interpreter::parser) fn describe_current(&self) -> String {
        self.current
            .as_ref()
            .map_or_else(|| "end of input".to_string(), Token::describe)
    }

    /// Parses a comma-separated list of items up to a closing token.
    ///
    /// Shared by list and set literals, call arguments and parameter lists.
    /// An immediately encountered closing token produces an empty list.
    pub(in crate::interpreter::parser) fn parse_comma_separated<T>(
        &mut self,
        parse_item: impl Fn(&mut Self) -> ParseResult<T>,
        closing: TokenKind,
        delimiter: &'static str,
        open_location: SourceLocation)
        -> ParseResult<Vec<T>> {
        let mut items = Vec::new();
        if self.at(closing) {
            self.advance()?;
            return Ok(items);
        }

        loop {
            items.push(parse_item(self)?);
            if self.eat(TokenKind::Comma)? {
                continue;
            }
            if self.at(closing) {
                self.advance()?;
                break;
            }
            return match &self.current {
                Some(token) => {
                    Err(ParseError::UnexpectedToken { token: format!("{} where ',' or '{delimiter}' was expected",
                                                                     token.describe()),
                                                      location: token.location })
                },
                None => Err(ParseError::MissingClosingDelimiter { delimiter,
                                                                  location: open_location }),
            };
        }

        Ok(items)
    }
}
