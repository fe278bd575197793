use tinsel::ast::{Expr, Pattern, Program, Statement};
use tinsel::interpreter::lexer::{Lexer, TokenKind};
use tinsel::interpreter::parser::Parser;

fn parse(source: &str) -> Program {
    Parser::new(source).and_then(|mut p| p.parse_program())
                       .unwrap_or_else(|e| panic!("parse failed: {source}\n{e}"))
}

fn parse_error(source: &str) -> tinsel::error::ParseError {
    match Parser::new(source).and_then(|mut p| p.parse_program()) {
        Ok(_) => panic!("parse succeeded but was expected to fail: {source}"),
        Err(e) => e,
    }
}

fn single_expression(program: &Program) -> &Expr {
    match program.statements.as_slice() {
        [Statement::Expression { expr, .. }] => expr,
        other => panic!("expected one expression statement, got {other:?}"),
    }
}

/// The operator name of a binary call node.
fn operator_of(expr: &Expr) -> &str {
    let Expr::Call { callee, arguments, .. } = expr else {
        panic!("expected a call, got {expr:?}");
    };
    assert_eq!(arguments.len(), 2, "expected a binary call");
    let Expr::Identifier { name, .. } = callee.as_ref() else {
        panic!("expected an operator identifier callee, got {callee:?}");
    };
    name
}

fn operand(expr: &Expr, index: usize) -> &Expr {
    let Expr::Call { arguments, .. } = expr else {
        panic!("expected a call, got {expr:?}");
    };
    &arguments[index]
}

#[test]
fn lexer_round_trip_reconstructs_the_source() {
    let source = "let total=1_000+2;//note\ntotal*3.5==\"x{y}\"";
    let mut lexer = Lexer::new(source);

    let mut rebuilt = String::new();
    while let Some(token) = lexer.next_token().expect("lexing failed") {
        rebuilt.push_str(&token.literal);
    }

    let expected: String = {
        // The source minus comments and inter-token whitespace.
        let without_comment = source.replace("//note", "");
        without_comment.split_whitespace().collect::<Vec<_>>().join("")
    };
    assert_eq!(rebuilt.replace(' ', ""), expected.replace(' ', ""));
}

#[test]
fn interpolated_strings_lex_as_one_token() {
    // The `{…}` holds a string argument of its own; its quotes must not
    // terminate the outer literal.
    let source = "\"{join(\", \", parts)}\"";
    let mut lexer = Lexer::new(source);

    let token = lexer.next_token()
                     .expect("lexing failed")
                     .expect("expected a token");
    assert_eq!(token.kind, TokenKind::Str);
    assert_eq!(token.literal, source);
    assert!(lexer.next_token().expect("lexing failed").is_none());
}

#[test]
fn tokens_carry_their_positions() {
    let mut lexer = Lexer::new("let x = 1\n  x + 2");
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token().expect("lexing failed") {
        tokens.push(token);
    }

    assert_eq!(tokens[0].kind, TokenKind::Let);
    assert_eq!((tokens[0].location.line, tokens[0].location.column), (1, 1));
    assert_eq!((tokens[1].location.line, tokens[1].location.column), (1, 5));
    // `x` on the second line, after two columns of indentation.
    assert_eq!((tokens[4].location.line, tokens[4].location.column), (2, 3));
}

#[test]
fn parsing_is_deterministic() {
    let source = "let f = |x| if x > 1 { x * 2 } else { x }\nmap(f, [1, 2, 3]) |> sum";
    assert_eq!(parse(source), parse(source));
}

#[test]
fn product_binds_tighter_than_sum() {
    let program = parse("a + b * c");
    let expr = single_expression(&program);
    assert_eq!(operator_of(expr), "+");
    assert_eq!(operator_of(operand(expr, 1)), "*");

    let program = parse("a * b + c");
    let expr = single_expression(&program);
    assert_eq!(operator_of(expr), "+");
    assert_eq!(operator_of(operand(expr, 0)), "*");
}

#[test]
fn comparison_binds_tighter_than_equality() {
    let program = parse("a == b < c");
    let expr = single_expression(&program);
    assert_eq!(operator_of(expr), "==");
    assert_eq!(operator_of(operand(expr, 1)), "<");
}

#[test]
fn logical_operators_bind_loosest() {
    let program = parse("a == b && c == d");
    let expr = single_expression(&program);
    assert_eq!(operator_of(expr), "&&");
    assert_eq!(operator_of(operand(expr, 0)), "==");
    assert_eq!(operator_of(operand(expr, 1)), "==");
}

#[test]
fn sum_binds_tighter_than_range_and_pipe() {
    let program = parse("1..n + 1");
    let Expr::Range { end: Some(end), .. } = single_expression(&program) else {
        panic!("expected a range");
    };
    assert_eq!(operator_of(end), "+");

    let program = parse("xs |> f + g");
    let expr = single_expression(&program);
    assert_eq!(operator_of(expr), "|>");
    assert_eq!(operator_of(operand(expr, 1)), "+");
}

#[test]
fn unary_minus_binds_tighter_than_product() {
    let program = parse("-a * b");
    let expr = single_expression(&program);
    assert_eq!(operator_of(expr), "*");
    assert!(matches!(operand(expr, 0), Expr::Prefix { .. }));
}

#[test]
fn index_binds_tighter_than_prefix() {
    let program = parse("-a[0]");
    let Expr::Prefix { operand: inner, .. } = single_expression(&program) else {
        panic!("expected a prefix node");
    };
    assert!(matches!(inner.as_ref(), Expr::Index { .. }));
}

#[test]
fn operators_parse_as_calls_on_identifiers() {
    let program = parse("1 + 2");
    let expr = single_expression(&program);
    let Expr::Call { callee, arguments, .. } = expr else {
        panic!("expected a call");
    };
    assert!(matches!(callee.as_ref(), Expr::Identifier { name, .. } if name == "+"));
    assert!(matches!(arguments[0], Expr::Integer { .. }));
    assert!(matches!(arguments[1], Expr::Integer { .. }));
}

#[test]
fn unbounded_range_literal() {
    let program = parse("1..");
    assert!(matches!(single_expression(&program), Expr::Range { end: None, .. }));
}

#[test]
fn trailing_lambda_joins_the_argument_list() {
    let program = parse("each(xs) |x| puts(x)");
    let Expr::Call { arguments, .. } = single_expression(&program) else {
        panic!("expected a call");
    };
    assert_eq!(arguments.len(), 2);
    assert!(matches!(arguments[1], Expr::Function { .. }));
}

#[test]
fn sections_and_annotations() {
    let program = parse("input: \"abc\"\n@slow test: { part_one: 1 }");
    assert!(matches!(&program.statements[0], Statement::Section { name, .. } if name == "input"));

    let Statement::Annotated { name, target, .. } = &program.statements[1] else {
        panic!("expected an annotated statement");
    };
    assert_eq!(name, "slow");
    assert!(matches!(target.as_ref(), Statement::Section { name, .. } if name == "test"));
}

#[test]
fn patterns_in_let_and_match() {
    let program = parse("let [a, ..rest] = xs");
    let Statement::Let { pattern: Pattern::List { elements, rest, .. }, .. } =
        &program.statements[0]
    else {
        panic!("expected a list pattern");
    };
    assert_eq!(elements.len(), 1);
    assert!(rest.as_ref().is_some_and(|r| r.name.as_deref() == Some("rest")));

    let program = parse("match x { #{\"k\": v} if v > 0 => v, _ => 0 }");
    let Expr::Match { arms, .. } = single_expression(&program) else {
        panic!("expected a match");
    };
    assert_eq!(arms.len(), 2);
    assert!(matches!(arms[0].pattern, Pattern::Dict { .. }));
    assert!(arms[0].guard.is_some());
    assert!(matches!(arms[1].pattern, Pattern::Wildcard { .. }));
}

#[test]
fn string_interpolation_splits_into_parts() {
    let program = parse("\"a{b}c\"");
    let Expr::StringLit { parts, .. } = single_expression(&program) else {
        panic!("expected a string literal");
    };
    assert_eq!(parts.len(), 3);
}

#[test]
fn error_unterminated_string() {
    let error = parse_error("\"abc");
    assert!(matches!(error, tinsel::error::ParseError::UnterminatedString { .. }), "{error:?}");
}

#[test]
fn error_invalid_escape() {
    let error = parse_error("\"a\\qb\"");
    assert!(matches!(error, tinsel::error::ParseError::InvalidEscape { .. }), "{error:?}");
}

#[test]
fn error_unexpected_character() {
    let error = parse_error("let x = 1 § 2");
    assert!(matches!(error, tinsel::error::ParseError::UnexpectedCharacter { .. }), "{error:?}");
}

#[test]
fn error_missing_delimiter() {
    let error = parse_error("[1, 2");
    assert!(matches!(error, tinsel::error::ParseError::MissingClosingDelimiter { .. }),
            "{error:?}");
}

#[test]
fn error_positions_are_one_based() {
    let error = parse_error("let = 1");
    assert_eq!(error.location().line, 1);
    assert_eq!(error.location().column, 5);
}

#[test]
fn error_unknown_annotation() {
    let error = parse_error("@fast test: { 1 }");
    assert!(matches!(error, tinsel::error::ParseError::UnknownAnnotation { .. }), "{error:?}");
}
