use crate::{
    ast::{Expr, Statement},
    error::ParseError,
    interpreter::{
        lexer::TokenKind,
        parser::core::{ParseResult, Parser, Precedence},
    },
};

impl Parser<'_> {
    /// Parses a single statement.
    ///
    /// A statement may be one of:
    /// - a `let` binding, optionally `mut`, binding through a pattern,
    /// - a `return` or `break`,
    /// - a section declaration, `name: { … }` or `name: expr`,
    /// - an `@name` annotation attached to the following statement,
    /// - an expression used as a statement.
    ///
    /// A trailing semicolon is consumed when present; semicolons are
    /// otherwise optional before `}` and at the end of input.
    pub(in crate::interpreter::parser) fn parse_statement(&mut self) -> ParseResult<Statement> {
        let statement = match self.current_kind() {
            Some(TokenKind::Let) => self.parse_let()?,
            Some(TokenKind::Return) => self.parse_return()?,
            Some(TokenKind::Break) => self.parse_break()?,
            Some(TokenKind::At) => self.parse_annotated()?,
            Some(TokenKind::Identifier) if self.peek_kind()? == Some(TokenKind::Colon) => {
                self.parse_section()?
            },
            _ => {
                let expr = self.parse_expression(Precedence::Lowest)?;
                let location = expr.location();
                Statement::Expression { expr, location }
            },
        };

        self.eat(TokenKind::Semicolon)?;
        Ok(statement)
    }

    /// `let [mut] pattern = expression`
    fn parse_let(&mut self) -> ParseResult<Statement> {
        let keyword = self.bump()?;
        let mutable = self.eat(TokenKind::Mut)?;
        let pattern = self.parse_pattern()?;
        self.expect(TokenKind::Assign)?;
        let value = self.parse_expression(Precedence::Lowest)?;

        Ok(Statement::Let { mutable,
                            pattern,
                            value,
                            location: keyword.location })
    }

    /// `return [expression]`
    fn parse_return(&mut self) -> ParseResult<Statement> {
        let keyword = self.bump()?;
        let value = self.parse_optional_value()?;
        Ok(Statement::Return { value, location: keyword.location })
    }

    /// `break [expression]`
    fn parse_break(&mut self) -> ParseResult<Statement> {
        let keyword = self.bump()?;
        let value = self.parse_optional_value()?;
        Ok(Statement::Break { value, location: keyword.location })
    }

    /// The optional value of `return`/`break`; defaults to `nil` when the
    /// statement ends immediately.
    fn parse_optional_value(&mut self) -> ParseResult<Expr> {
        match self.current_kind() {
            None | Some(TokenKind::Semicolon | TokenKind::RBrace) => {
                Ok(Expr::Nil { location: self.location() })
            },
            _ => self.parse_expression(Precedence::Lowest),
        }
    }

    /// `name: { … }` or `name: expression`
    ///
    /// The lexer produces a plain identifier and colon; it is the statement
    /// position that turns the pair into a section declaration.
    fn parse_section(&mut self) -> ParseResult<Statement> {
        let name = self.bump()?;
        self.expect(TokenKind::Colon)?;
        let body = self.parse_expression_or_block()?;

        Ok(Statement::Section { name:     name.literal.clone(),
                                body,
                                location: name.location })
    }

    /// `@name statement`; `@slow` is the only annotation the language
    /// recognises.
    fn parse_annotated(&mut self) -> ParseResult<Statement> {
        let at = self.bump()?;
        let name = self.expect(TokenKind::Identifier)?;
        if name.literal != "slow" {
            return Err(ParseError::UnknownAnnotation { name:     name.literal.clone(),
                                                       location: name.location });
        }

        let target = self.parse_statement()?;
        Ok(Statement::Annotated { name:     name.literal.clone(),
                                  target:   Box::new(target),
                                  location: at.location })
    }
}
