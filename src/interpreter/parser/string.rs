use crate::{
    ast::{Block, Expr, MatchArm, Pattern, SourceLocation, Statement, StringPart},
    error::ParseError,
    interpreter::{lexer::Token, parser::core::{ParseResult, Parser}},
};

/// Walks a string literal's raw text, tracking the 1-based position of each
/// character within the original source.
struct Cursor {
    line:   usize,
    column: usize,
}

impl Cursor {
    const fn advance(&mut self, c: char) {
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }

    const fn location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

impl Parser<'_> {
    /// Decodes a string token into literal text and embedded `{expr}`
    /// interpolations.
    ///
    /// The lexer hands over the raw lexeme untouched; escapes are decoded
    /// here, and each interpolation fragment is parsed with a fresh parser
    /// and its locations shifted back into the enclosing source.
    pub(in crate::interpreter::parser) fn parse_string_literal(&self,
                                                               token: &Token)
                                                               -> ParseResult<Expr> {
        let inner = &token.literal[1..token.literal.len() - 1];
        // Past the opening quote.
        let mut cursor = Cursor { line:   token.location.line,
                                  column: token.location.column + 1, };

        let mut parts = Vec::new();
        let mut text = String::new();
        let mut rest = inner;

        while let Some(c) = rest.chars().next() {
            match c {
                '\\' => {
                    let escape_location = cursor.location();
                    let (decoded, consumed) = decode_escape(rest, escape_location)?;
                    text.push(decoded);
                    for consumed_char in rest[..consumed].chars() {
                        cursor.advance(consumed_char);
                    }
                    rest = &rest[consumed..];
                },

                '{' => {
                    let brace_location = cursor.location();
                    cursor.advance('{');
                    let fragment_length =
                        interpolation_length(&rest[1..]).ok_or(ParseError::UnterminatedInterpolation {
                            location: brace_location,
                        })?;
                    let fragment = &rest[1..1 + fragment_length];

                    if !text.is_empty() {
                        parts.push(StringPart::Text(std::mem::take(&mut text)));
                    }

                    let base = cursor.location();
                    let mut sub_parser = Parser::new(fragment).map_err(|e| rebase_error(e, base))?;
                    let mut expr = sub_parser.parse_complete_expression()
                                             .map_err(|e| rebase_error(e, base))?;
                    rebase_expr(&mut expr, base);
                    parts.push(StringPart::Interpolation(expr));

                    for fragment_char in fragment.chars() {
                        cursor.advance(fragment_char);
                    }
                    cursor.advance('}');
                    rest = &rest[1 + fragment_length + 1..];
                },

                c => {
                    text.push(c);
                    cursor.advance(c);
                    rest = &rest[c.len_utf8()..];
                },
            }
        }

        if !text.is_empty() || parts.is_empty() {
            parts.push(StringPart::Text(text));
        }

        Ok(Expr::StringLit { parts,
                             location: token.location })
    }
}

/// Decodes one escape sequence at the start of `rest`, returning the
/// character and how many bytes the sequence occupies.
fn decode_escape(rest: &str, location: SourceLocation) -> ParseResult<(char, usize)> {
    let invalid = |sequence: &str| {
        ParseError::InvalidEscape { sequence: sequence.to_string(),
                                    location }
    };

    let mut chars = rest.chars();
    chars.next();
    let Some(marker) = chars.next() else {
        return Err(invalid("\\"));
    };

    let simple = |c: char| Ok((c, 2));
    match marker {
        'n' => simple('\n'),
        't' => simple('\t'),
        'r' => simple('\r'),
        '\\' => simple('\\'),
        '"' => simple('"'),
        '0' => simple('\0'),
        '{' => simple('{'),
        '}' => simple('}'),
        'u' => {
            // \u{XXXX}
            if chars.next() != Some('{') {
                return Err(invalid("\\u"));
            }
            let digits: String = chars.by_ref().take_while(|c| *c != '}').collect();
            let consumed = 4 + digits.len();
            let sequence = rest.get(..consumed).unwrap_or(rest);
            if !sequence.ends_with('}') {
                return Err(invalid(sequence));
            }
            let scalar = u32::from_str_radix(&digits, 16).ok()
                                                         .and_then(char::from_u32)
                                                         .ok_or_else(|| invalid(sequence))?;
            Ok((scalar, consumed))
        },
        other => Err(invalid(&format!("\\{other}"))),
    }
}

/// The byte length of the interpolation fragment starting just after `{`,
/// up to (not including) the matching `}`. Braces inside nested string
/// literals do not count: the lexer guarantees the raw lexeme runs to the
/// true closing quote, so a fragment like `join(", ", parts)` arrives here
/// whole and its quoted arguments must be skipped over.
fn interpolation_length(rest: &str) -> Option<usize> {
    let mut depth = 1usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in rest.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(offset);
                }
            },
            _ => {},
        }
    }
    None
}

/// Shifts a fragment-relative location by the fragment's position in the
/// enclosing source.
const fn rebase_location(location: SourceLocation, base: SourceLocation) -> SourceLocation {
    if location.line == 1 {
        SourceLocation::new(base.line, base.column + location.column - 1)
    } else {
        SourceLocation::new(base.line + location.line - 1, location.column)
    }
}

fn rebase_error(error: ParseError, base: SourceLocation) -> ParseError {
    let rebased = rebase_location(error.location(), base);
    error.with_location(rebased)
}

fn rebase_block(block: &mut Block, base: SourceLocation) {
    block.location = rebase_location(block.location, base);
    for statement in &mut block.statements {
        rebase_statement(statement, base);
    }
}

fn rebase_statement(statement: &mut Statement, base: SourceLocation) {
    match statement {
        Statement::Let { pattern, value, location, .. } => {
            *location = rebase_location(*location, base);
            rebase_pattern(pattern, base);
            rebase_expr(value, base);
        },
        Statement::Return { value, location } | Statement::Break { value, location } => {
            *location = rebase_location(*location, base);
            rebase_expr(value, base);
        },
        Statement::Section { body, location, .. } => {
            *location = rebase_location(*location, base);
            rebase_block(body, base);
        },
        Statement::Annotated { target, location, .. } => {
            *location = rebase_location(*location, base);
            rebase_statement(target, base);
        },
        Statement::Expression { expr, location } => {
            *location = rebase_location(*location, base);
            rebase_expr(expr, base);
        },
    }
}

fn rebase_pattern(pattern: &mut Pattern, base: SourceLocation) {
    match pattern {
        Pattern::Identifier { location, .. } | Pattern::Wildcard { location } => {
            *location = rebase_location(*location, base);
        },
        Pattern::Literal { value, location } => {
            *location = rebase_location(*location, base);
            rebase_expr(value, base);
        },
        Pattern::List { elements, rest, location } => {
            *location = rebase_location(*location, base);
            for element in elements {
                rebase_pattern(element, base);
            }
            if let Some(rest) = rest {
                rest.location = rebase_location(rest.location, base);
            }
        },
        Pattern::Dict { entries, location } => {
            *location = rebase_location(*location, base);
            for (key, value) in entries {
                rebase_expr(key, base);
                rebase_pattern(value, base);
            }
        },
    }
}

fn rebase_expr(expr: &mut Expr, base: SourceLocation) {
    match expr {
        Expr::Integer { location, .. }
        | Expr::Decimal { location, .. }
        | Expr::Boolean { location, .. }
        | Expr::Nil { location }
        | Expr::Identifier { location, .. }
        | Expr::Placeholder { location } => {
            *location = rebase_location(*location, base);
        },

        Expr::StringLit { parts, location } => {
            *location = rebase_location(*location, base);
            for part in parts {
                if let StringPart::Interpolation(inner) = part {
                    rebase_expr(inner, base);
                }
            }
        },

        Expr::List { elements, location } | Expr::Set { elements, location } => {
            *location = rebase_location(*location, base);
            for element in elements {
                rebase_expr(element, base);
            }
        },

        Expr::Dict { entries, location } => {
            *location = rebase_location(*location, base);
            for (key, value) in entries {
                rebase_expr(key, base);
                rebase_expr(value, base);
            }
        },

        Expr::Range { start, end, location, .. } => {
            *location = rebase_location(*location, base);
            rebase_expr(start, base);
            if let Some(end) = end {
                rebase_expr(end, base);
            }
        },

        Expr::Function { parameters, body, location } => {
            *location = rebase_location(*location, base);
            for parameter in parameters {
                rebase_pattern(parameter, base);
            }
            rebase_block(body, base);
        },

        Expr::Call { callee, arguments, location } => {
            *location = rebase_location(*location, base);
            rebase_expr(callee, base);
            for argument in arguments {
                rebase_expr(argument, base);
            }
        },

        Expr::Prefix { operand, location, .. } => {
            *location = rebase_location(*location, base);
            rebase_expr(operand, base);
        },

        Expr::Assign { target, value, location } => {
            *location = rebase_location(*location, base);
            rebase_expr(target, base);
            rebase_expr(value, base);
        },

        Expr::Index { receiver, index, location } => {
            *location = rebase_location(*location, base);
            rebase_expr(receiver, base);
            rebase_expr(index, base);
        },

        Expr::If { condition, consequence, alternative, location } => {
            *location = rebase_location(*location, base);
            rebase_expr(condition, base);
            rebase_block(consequence, base);
            if let Some(alternative) = alternative {
                rebase_block(alternative, base);
            }
        },

        Expr::Match { subject, arms, location } => {
            *location = rebase_location(*location, base);
            rebase_expr(subject, base);
            for MatchArm { pattern, guard, body, location } in arms {
                *location = rebase_location(*location, base);
                rebase_pattern(pattern, base);
                if let Some(guard) = guard {
                    rebase_expr(guard, base);
                }
                rebase_block(body, base);
            }
        },
    }
}
