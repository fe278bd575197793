use logos::Logos;

use crate::{ast::SourceLocation, error::ParseError, interpreter::position::LineIndex};

/// Represents the kind of a lexical token.
///
/// A token is a minimal but meaningful unit of text produced by the lexer.
/// Raw lexeme text travels alongside the kind in [`Token`], so concatenating
/// the `literal` fields of a token stream reconstructs the source modulo
/// comments and whitespace.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
pub enum TokenKind {
    /// Decimal literal tokens such as `3.14` or `1_000.5`.
    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*")]
    Decimal,
    /// Integer literal tokens such as `42` or `1_000_000`.
    #[regex(r"[0-9][0-9_]*")]
    Integer,
    /// A quote-delimited string literal, interpolations included: a `{expr}`
    /// may itself contain string literals, so the closing quote is found by
    /// the [`lex_string`] callback rather than a regex. The whole literal is
    /// one token whose lexeme records the raw text; escape decoding and
    /// interpolation splitting stay in the parser.
    #[token("\"", lex_string)]
    Str,
    /// `let`
    #[token("let")]
    Let,
    /// `mut`
    #[token("mut")]
    Mut,
    /// `if`
    #[token("if")]
    If,
    /// `else`
    #[token("else")]
    Else,
    /// `match`
    #[token("match")]
    Match,
    /// `return`
    #[token("return")]
    Return,
    /// `break`
    #[token("break")]
    Break,
    /// `true`
    #[token("true")]
    True,
    /// `false`
    #[token("false")]
    False,
    /// `nil`
    #[token("nil")]
    Nil,
    /// The `_` wildcard/placeholder.
    #[token("_")]
    Underscore,
    /// Identifier tokens; names such as `x` or `part_one`.
    #[regex(r"[a-zA-Z][a-zA-Z0-9_]*")]
    Identifier,
    /// `==`
    #[token("==")]
    Eq,
    /// `!=`
    #[token("!=")]
    NotEq,
    /// `<=`
    #[token("<=")]
    LtEq,
    /// `>=`
    #[token(">=")]
    GtEq,
    /// `&&`
    #[token("&&")]
    AndAnd,
    /// `||`
    #[token("||")]
    OrOr,
    /// `|>`
    #[token("|>")]
    PipeArrow,
    /// `>>`
    #[token(">>")]
    Compose,
    /// `..=`
    #[token("..=")]
    DotDotEq,
    /// `..`
    #[token("..")]
    DotDot,
    /// `#{`
    #[token("#{")]
    HashBrace,
    /// `=>`
    #[token("=>")]
    FatArrow,
    /// `->`
    #[token("->")]
    Arrow,
    /// `::`
    #[token("::")]
    ColonColon,
    /// `+`
    #[token("+")]
    Plus,
    /// `-`
    #[token("-")]
    Minus,
    /// `*`
    #[token("*")]
    Star,
    /// `/`
    #[token("/")]
    Slash,
    /// `%`
    #[token("%")]
    Percent,
    /// `<`
    #[token("<")]
    Lt,
    /// `>`
    #[token(">")]
    Gt,
    /// `=`
    #[token("=")]
    Assign,
    /// `!`
    #[token("!")]
    Bang,
    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `[`
    #[token("[")]
    LBracket,
    /// `]`
    #[token("]")]
    RBracket,
    /// `{`
    #[token("{")]
    LBrace,
    /// `}`
    #[token("}")]
    RBrace,
    /// `,`
    #[token(",")]
    Comma,
    /// `;`
    #[token(";")]
    Semicolon,
    /// `:`
    #[token(":")]
    Colon,
    /// `|`
    #[token("|")]
    Pipe,
    /// `.`
    #[token(".")]
    Dot,
    /// A backtick, delimiting a user-defined infix identifier.
    #[token("`")]
    Backtick,
    /// `@`, introducing a statement annotation such as `@slow`.
    #[token("@")]
    At,
}

impl TokenKind {
    /// A short human-readable rendering used in parse error messages.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Decimal => "decimal literal",
            Self::Integer => "integer literal",
            Self::Str => "string literal",
            Self::Let => "'let'",
            Self::Mut => "'mut'",
            Self::If => "'if'",
            Self::Else => "'else'",
            Self::Match => "'match'",
            Self::Return => "'return'",
            Self::Break => "'break'",
            Self::True => "'true'",
            Self::False => "'false'",
            Self::Nil => "'nil'",
            Self::Underscore => "'_'",
            Self::Identifier => "identifier",
            Self::Eq => "'=='",
            Self::NotEq => "'!='",
            Self::LtEq => "'<='",
            Self::GtEq => "'>='",
            Self::AndAnd => "'&&'",
            Self::OrOr => "'||'",
            Self::PipeArrow => "'|>'",
            Self::Compose => "'>>'",
            Self::DotDotEq => "'..='",
            Self::DotDot => "'..'",
            Self::HashBrace => "'#{'",
            Self::FatArrow => "'=>'",
            Self::Arrow => "'->'",
            Self::ColonColon => "'::'",
            Self::Plus => "'+'",
            Self::Minus => "'-'",
            Self::Star => "'*'",
            Self::Slash => "'/'",
            Self::Percent => "'%'",
            Self::Lt => "'<'",
            Self::Gt => "'>'",
            Self::Assign => "'='",
            Self::Bang => "'!'",
            Self::LParen => "'('",
            Self::RParen => "')'",
            Self::LBracket => "'['",
            Self::RBracket => "']'",
            Self::LBrace => "'{'",
            Self::RBrace => "'}'",
            Self::Comma => "','",
            Self::Semicolon => "';'",
            Self::Colon => "':'",
            Self::Pipe => "'|'",
            Self::Dot => "'.'",
            Self::Backtick => "'`'",
            Self::At => "'@'",
        }
    }
}

/// Consumes the rest of a string literal; the opening quote has already
/// been matched.
///
/// A plain regex cannot delimit these literals: an interpolation may
/// contain string arguments of its own (`"{join(", ", parts)}"`), whose
/// quotes must not terminate the outer literal. The scan therefore tracks
/// interpolation depth and whether the cursor sits inside a nested string;
/// the token ends at the first unescaped quote at depth zero. Running out
/// of input leaves the string unterminated.
fn lex_string(lex: &mut logos::Lexer<TokenKind>) -> bool {
    let mut depth = 0usize;
    let mut in_nested = false;
    let mut escaped = false;

    for (offset, c) in lex.remainder().char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if depth == 0 || in_nested => escaped = true,
            '"' if depth == 0 => {
                lex.bump(offset + 1);
                return true;
            },
            '"' => in_nested = !in_nested,
            '{' if !in_nested => depth += 1,
            '}' if !in_nested && depth > 0 => depth -= 1,
            _ => {},
        }
    }
    false
}

/// A single token: kind, raw lexeme and source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind:     TokenKind,
    /// The raw source text of the token, exactly as written.
    pub literal:  String,
    pub location: SourceLocation,
}

impl Token {
    /// A short human-readable rendering used in parse error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Identifier => format!("identifier '{}'", self.literal),
            TokenKind::Integer | TokenKind::Decimal => format!("number '{}'", self.literal),
            TokenKind::Str => "string literal".to_string(),
            kind => kind.describe().to_string(),
        }
    }
}

/// Streams tokens from source text, one per request.
///
/// The end of input is signalled by `Ok(None)`; the parser treats that as
/// its EOF sentinel.
pub struct Lexer<'src> {
    inner: logos::Lexer<'src, TokenKind>,
    index: LineIndex<'src>,
}

impl<'src> Lexer<'src> {
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self { inner: TokenKind::lexer(source),
               index: LineIndex::new(source) }
    }

    /// Produces the next token, or `None` at the end of input.
    ///
    /// # Errors
    /// Returns a `ParseError` when the source contains text no token
    /// matches: an unterminated string, or a stray character.
    pub fn next_token(&mut self) -> Result<Option<Token>, ParseError> {
        let Some(result) = self.inner.next() else {
            return Ok(None);
        };

        let span = self.inner.span();
        let location = self.index.location(span.start);

        match result {
            Ok(kind) => Ok(Some(Token { kind,
                                        literal: self.inner.slice().to_string(),
                                        location })),
            Err(()) => {
                let slice = self.inner.slice();
                if slice.starts_with('"') {
                    Err(ParseError::UnterminatedString { location })
                } else {
                    Err(ParseError::UnexpectedCharacter { character: slice.to_string(),
                                                          location })
                }
            },
        }
    }
}
