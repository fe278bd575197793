use crate::{
    ast::{Expr, Pattern, PrefixOperator, RestPattern, StringPart},
    error::ParseError,
    interpreter::{
        lexer::TokenKind,
        parser::core::{ParseResult, Parser},
    },
};

impl Parser<'_> {
    /// Parses a destructuring pattern.
    ///
    /// Grammar:
    /// - `_` matches anything,
    /// - an identifier binds the whole candidate,
    /// - a literal matches by equality (a leading `-` is allowed on
    ///   numbers),
    /// - `[p1, p2, ..rest]` destructures lists,
    /// - `#{key: p, …}` destructures dictionaries.
    pub(in crate::interpreter::parser) fn parse_pattern(&mut self) -> ParseResult<Pattern> {
        match self.current_kind() {
            Some(TokenKind::Underscore) => {
                let token = self.bump()?;
                Ok(Pattern::Wildcard { location: token.location })
            },

            Some(TokenKind::Identifier) => {
                let token = self.bump()?;
                Ok(Pattern::Identifier { name:     token.literal.clone(),
                                         location: token.location })
            },

            Some(TokenKind::Integer
                 | TokenKind::Decimal
                 | TokenKind::Str
                 | TokenKind::True
                 | TokenKind::False
                 | TokenKind::Nil
                 | TokenKind::Minus) => {
                let value = self.parse_literal_pattern_value()?;
                let location = value.location();
                Ok(Pattern::Literal { value: Box::new(value),
                                      location })
            },

            Some(TokenKind::LBracket) => self.parse_list_pattern(),

            Some(TokenKind::HashBrace) => self.parse_dict_pattern(),

            Some(_) | None => {
                Err(ParseError::MalformedPattern { details:  format!("{} cannot start a pattern",
                                                                     self.describe_current()),
                                                   location: self.location() })
            },
        }
    }

    /// A literal usable inside a pattern: one literal token, or a `-` and a
    /// numeric literal.
    fn parse_literal_pattern_value(&mut self) -> ParseResult<Expr> {
        let token = self.bump()?;
        match token.kind {
            TokenKind::Integer | TokenKind::Decimal | TokenKind::Str => {
                self.literal_expr_from(&token)
            },
            TokenKind::True | TokenKind::False => {
                Ok(Expr::Boolean { value:    token.kind == TokenKind::True,
                                   location: token.location })
            },
            TokenKind::Nil => Ok(Expr::Nil { location: token.location }),
            TokenKind::Minus => {
                let number = self.bump()?;
                if !matches!(number.kind, TokenKind::Integer | TokenKind::Decimal) {
                    return Err(ParseError::MalformedPattern { details:  "'-' in a pattern must be \
                                                                        followed by a number"
                                                                                 .to_string(),
                                                              location: number.location });
                }
                let operand = self.literal_expr_from(&number)?;
                Ok(Expr::Prefix { operator: PrefixOperator::Negate,
                                  operand:  Box::new(operand),
                                  location: token.location })
            },
            _ => Err(ParseError::MalformedPattern { details:  format!("{} is not a literal",
                                                                      token.describe()),
                                                    location: token.location }),
        }
    }

    /// `[a, b, ..rest]`; the rest capture must come last.
    fn parse_list_pattern(&mut self) -> ParseResult<Pattern> {
        let open = self.bump()?;
        let mut elements = Vec::new();
        let mut rest = None;

        loop {
            if self.at(TokenKind::RBracket) {
                self.advance()?;
                break;
            }
            if self.current_kind().is_none() {
                return Err(ParseError::MissingClosingDelimiter { delimiter: "]",
                                                                 location:  open.location });
            }

            if self.at(TokenKind::DotDot) {
                let dots = self.bump()?;
                let name = match self.current_kind() {
                    Some(TokenKind::Identifier) => Some(self.bump()?.literal.clone()),
                    Some(TokenKind::Underscore) => {
                        self.advance()?;
                        None
                    },
                    _ => {
                        return Err(ParseError::MalformedPattern { details:  "'..' in a list \
                                                                            pattern must bind a \
                                                                            name or '_'"
                                                                                    .to_string(),
                                                                  location: self.location() });
                    },
                };
                rest = Some(RestPattern { name, location: dots.location });

                self.eat(TokenKind::Comma)?;
                if !self.at(TokenKind::RBracket) {
                    return Err(ParseError::MalformedPattern { details:  "the '..' rest capture \
                                                                        must be the final element"
                                                                                 .to_string(),
                                                              location: dots.location });
                }
                continue;
            }

            elements.push(self.parse_pattern()?);
            if self.eat(TokenKind::Comma)? {
                continue;
            }
            if !self.at(TokenKind::RBracket) {
                return Err(ParseError::MalformedPattern { details:  format!("{} where ',' or ']' \
                                                                             was expected",
                                                                            self.describe_current()),
                                                          location: self.location() });
            }
        }

        Ok(Pattern::List { elements,
                           rest,
                           location: open.location })
    }

    /// `#{key: p, …}`; identifier keys mean string keys, and a bare
    /// identifier is shorthand for `"name": name`.
    fn parse_dict_pattern(&mut self) -> ParseResult<Pattern> {
        let open = self.bump()?;
        let mut entries = Vec::new();

        loop {
            if self.at(TokenKind::RBrace) {
                self.advance()?;
                break;
            }
            if self.current_kind().is_none() {
                return Err(ParseError::MissingClosingDelimiter { delimiter: "}",
                                                                 location:  open.location });
            }

            let entry = if self.at(TokenKind::Identifier) {
                let name = self.bump()?;
                let key = Expr::StringLit { parts:    vec![StringPart::Text(name.literal.clone())],
                                            location: name.location };
                if self.eat(TokenKind::Colon)? {
                    (key, self.parse_pattern()?)
                } else {
                    let pattern = Pattern::Identifier { name:     name.literal.clone(),
                                                        location: name.location };
                    (key, pattern)
                }
            } else {
                let key = self.parse_literal_pattern_value()?;
                self.expect(TokenKind::Colon)?;
                (key, self.parse_pattern()?)
            };
            entries.push(entry);

            if self.eat(TokenKind::Comma)? {
                continue;
            }
            if !self.at(TokenKind::RBrace) {
                return Err(ParseError::MalformedPattern { details:  format!("{} where ',' or '}}' \
                                                                             was expected",
                                                                            self.describe_current()),
                                                          location: self.location() });
            }
        }

        Ok(Pattern::Dict { entries,
                           location: open.location })
    }
}
