use std::fs;
use std::rc::Rc;

use tinsel::{run, NullIo, RunOutcome};
use walkdir::WalkDir;

fn script_value(source: &str) -> String {
    match run(source, Rc::new(NullIo)) {
        Ok(RunOutcome::Script { value, .. }) => value,
        Ok(RunOutcome::Solution { .. }) => panic!("expected a script, got a solution: {source}"),
        Err(e) => panic!("script failed: {source}\n{e}"),
    }
}

fn assert_value(source: &str, expected: &str) {
    assert_eq!(script_value(source), expected, "source: {source}");
}

fn assert_failure(source: &str) {
    assert!(run(source, Rc::new(NullIo)).is_err(),
            "script succeeded but was expected to fail: {source}");
}

#[test]
fn sample_solutions_work() {
    let mut count = 0;

    for entry in WalkDir::new("tests/solutions").into_iter()
                                                .filter_map(Result::ok)
                                                .filter(|e| {
                                                    e.path()
                                                     .extension()
                                                     .is_some_and(|ext| ext == "tnsl")
                                                })
    {
        let path = entry.path();
        let source =
            fs::read_to_string(path).unwrap_or_else(|e| panic!("failed to read {path:?}: {e}"));
        count += 1;

        if let Err(e) = run(&source, Rc::new(NullIo)) {
            panic!("solution {path:?} failed: {e}");
        }
    }

    assert!(count > 0, "no sample solutions found in tests/solutions");
}

#[test]
fn arithmetic_and_precedence() {
    assert_value("1 + 2", "3");
    assert_value("2 + 3 * 4", "14");
    assert_value("(2 + 3) * 4", "20");
    assert_value("10 - 2 - 3", "5");
    assert_value("-3 + 10", "7");
    assert_value("2 * 3 + 4 * 5", "26");
}

#[test]
fn integer_division_falls_over_to_decimal() {
    assert_value("6 / 2", "3");
    assert_value("7 / 2", "3.5");
    assert_value("1.0 + 2", "3.0");
    assert_value("2.5 * 2", "5.0");
}

#[test]
fn modulo_takes_the_divisor_sign() {
    assert_value("7 % 3", "1");
    assert_value("-7 % 3", "2");
    assert_value("7 % -3", "-2");
}

#[test]
fn arbitrary_precision_integers() {
    assert_value("9_223_372_036_854_775_807 + 1", "9223372036854775808");
    assert_value("1_000_000_000_000 * 1_000_000_000_000", "1000000000000000000000000");
}

#[test]
fn division_by_zero_is_an_error() {
    assert_failure("1 / 0");
    assert_failure("1 % 0");
}

#[test]
fn comparisons_and_equality() {
    assert_value("2 < 3", "true");
    assert_value("2 >= 3", "false");
    assert_value("1 < 1.5", "true");
    assert_value("1 == 1", "true");
    // Equality is type-strict: an Integer never equals a Decimal.
    assert_value("1 == 1.0", "false");
    assert_value("[1, 2] == [1, 2]", "true");
    assert_value("\"a\" != \"b\"", "true");
}

#[test]
fn let_bindings_and_assignment() {
    assert_value("let x = 1 + 2; x", "3");
    assert_value("let mut x = 1; x = x + 1; x", "2");
    assert_failure("let x = 1; x = 2");
    assert_failure("let x = 1; let x = 2");
    assert_failure("y = 1");
    assert_failure("unknown");
}

#[test]
fn destructuring_bindings() {
    assert_value("let [a, b] = [1, 2]; a + b", "3");
    assert_value("let [head, ..tail] = [1, 2, 3]; tail", "[2, 3]");
    assert_value("let [a, .._] = [1, 2, 3]; a", "1");
    assert_value("let #{x, y} = #{x: 3, y: 4}; x * y", "12");
    assert_value("let #{\"k\": v} = #{\"k\": 9}; v", "9");
    assert_failure("let [a, b] = [1]");
}

#[test]
fn strings_and_interpolation() {
    assert_value("\"ab\" + \"cd\"", "\"abcd\"");
    assert_value("let name = \"elf\"; \"hi {name}!\"", "\"hi elf!\"");
    assert_value("\"{1 + 2} wishes\"", "\"3 wishes\"");
    assert_value("\"line\\nbreak\"", "\"line\\nbreak\"");
    assert_value("\"\\u{1F384}\"", "\"\u{1F384}\"");
    assert_value("\"abc\"[1]", "\"b\"");
    assert_value("\"abcdef\"[1..3]", "\"bc\"");
    assert_value("\"abc\"[-1]", "\"c\"");
    assert_value("size(\"héllo\")", "5");
}

#[test]
fn interpolations_may_contain_string_arguments() {
    assert_value("\"{join(\", \", [1, 2])}\"", "\"1, 2\"");
    assert_value("\"{size(\"ab\")} items\"", "\"2 items\"");
    assert_value("\"{ \"a}b\" }\"", "\"a}b\"");
    assert_value("\"{ \"a\\\"b\" }\"", "\"a\\\"b\"");
}

#[test]
fn list_access_and_slicing() {
    assert_value("[1, 2, 3][0]", "1");
    assert_value("[1, 2, 3][-1]", "3");
    assert_value("[1, 2, 3][9]", "nil");
    assert_value("[1, 2, 3, 4][1..3]", "[2, 3]");
    assert_value("[1, 2, 3, 4][2..]", "[3, 4]");
}

#[test]
fn dict_and_set_literals() {
    assert_value("#{\"a\": 1, \"b\": 2}[\"b\"]", "2");
    assert_value("#{\"a\": 1}[\"missing\"]", "nil");
    assert_value("#{a: 1, b: 2}", "#{\"a\": 1, \"b\": 2}");
    assert_value("let x = 5; #{x}", "#{\"x\": 5}");
    assert_value("{1, 2, 2, 3}", "{1, 2, 3}");
    assert_value("{1, 2}[2]", "true");
    assert_value("{1, 2}[9]", "false");
    assert_value("keys(#{\"b\": 1, \"a\": 2})", "[\"b\", \"a\"]");
}

#[test]
fn unhashable_keys_are_rejected() {
    assert_failure("#{(|x| x): 1}");
    assert_failure("{|x| x}");
}

#[test]
fn truthiness_in_conditions() {
    assert_value("if 0 { \"t\" } else { \"f\" }", "\"f\"");
    assert_value("if \"\" { \"t\" } else { \"f\" }", "\"f\"");
    assert_value("if [] { \"t\" } else { \"f\" }", "\"f\"");
    assert_value("if 0.0 { \"t\" } else { \"f\" }", "\"f\"");
    assert_value("if nil { \"t\" } else { \"f\" }", "\"f\"");
    assert_value("if \"no\" { \"t\" } else { \"f\" }", "\"t\"");
    assert_value("if 1..1 { \"t\" } else { \"f\" }", "\"f\"");
}

#[test]
fn logical_operators_return_the_deciding_operand() {
    assert_value("1 && 2", "2");
    assert_value("0 && 2", "0");
    assert_value("nil || \"fallback\"", "\"fallback\"");
    assert_value("\"first\" || \"second\"", "\"first\"");
}

#[test]
fn if_is_an_expression() {
    assert_value("let x = if 2 < 3 { 7 } else { 11 }; x", "7");
    assert_value("if false { 1 }", "nil");
    assert_value("if false { 1 } else if true { 2 } else { 3 }", "2");
}

#[test]
fn match_expressions() {
    assert_value("match 2 { 1 => \"one\", 2 => \"two\", _ => \"many\" }", "\"two\"");
    assert_value("match [1, 2, 3] { [] => 0, [_] => 1, [_, ..rest] => size(rest) + 1 }", "3");
    assert_value("match 5 { n if n > 3 => \"big\", _ => \"small\" }", "\"big\"");
    assert_value("match #{\"x\": 1} { #{\"x\": v} => v, _ => nil }", "1");
    assert_value("match -1 { -1 => \"neg\", _ => \"other\" }", "\"neg\"");
    assert_failure("match 9 { 1 => 1, 2 => 2 }");
}

#[test]
fn functions_and_closures() {
    assert_value("let double = |x| x * 2; double(21)", "42");
    assert_value("let add = |a, b| a + b; add(1, 2)", "3");
    assert_value("let make = |n| |x| x + n; let inc = make(1); inc(41)", "42");
    assert_value("let constant = || 7; constant()", "7");
    assert_value("let apply = |f, x| f(x); apply(|n| n + 1, 5)", "6");
}

#[test]
fn partial_application() {
    assert_value("let add = |a, b| a + b; add(1)(2)", "3");
    assert_value("let add = |a, b| a + b; add(_, 10)(5)", "15");
    assert_value("let sub = |a, b| a - b; sub(_, 1)(10)", "9");
    assert_value("map(_ * 2, [1, 2, 3])", "[2, 4, 6]");
    assert_value("let add3 = |a, b, c| a + b + c; add3(1)(2)(3)", "6");
    assert_value("let add3 = |a, b, c| a + b + c; add3(_, 2, _)(1, 3)", "6");
}

#[test]
fn pipelines_and_composition() {
    assert_value("5 |> (|x| x * 2)", "10");
    assert_value("[1, 2, 3] |> map(_ + 1) |> sum", "9");
    assert_value("let f = (|x| x + 1) >> (|x| x * 2); f(3)", "8");
    assert_value("[\"a\", \"b\"] |> join(\"-\")", "\"a-b\"");
}

#[test]
fn backtick_infix_and_trailing_lambda() {
    assert_value("let add = |a, b| a + b; 1 `add` 2", "3");
    assert_value("map([1, 2, 3]) |x| x * 10", "[10, 20, 30]");
    assert_value("fold(0, [1, 2, 3, 4]) |acc, x| acc + x", "10");
}

#[test]
fn higher_order_builtins() {
    assert_value("map(|x| x * 2, [1, 2, 3])", "[2, 4, 6]");
    assert_value("map(|x, i| x * i, [10, 20, 30])", "[0, 20, 60]");
    assert_value("filter(|x| x % 2 == 0, [1, 2, 3, 4])", "[2, 4]");
    assert_value("fold(0, |acc, x| acc + x, [1, 2, 3])", "6");
    assert_value("reduce(|a, b| a + b, [1, 2, 3, 4])", "10");
    assert_value("flat_map(|x| [x, x], [1, 2])", "[1, 1, 2, 2]");
    assert_value("find(|x| x > 2, [1, 2, 3, 4])", "3");
    assert_value("find(|x| x > 9, [1, 2])", "nil");
    assert_value("count(|x| x > 1, [1, 2, 3])", "2");
    assert_value("map(|v, k| \"{k}={v}\", #{\"a\": 1})", "[\"a=1\"]");
    assert_failure("reduce(|a, b| a + b, [])");
}

#[test]
fn fold_supports_early_break() {
    assert_value("fold(0, |acc, x| if x == 3 { break acc } else { acc + x }, 1..=10)", "3");
    assert_value("fold(0, |acc, x| if acc > 5 { break \"done\" } else { acc + x }, 1..)", "\"done\"");
    assert_failure("break 1");
}

#[test]
fn collection_builtins() {
    assert_value("size([1, 2, 3])", "3");
    assert_value("first([9, 8])", "9");
    assert_value("last([9, 8])", "8");
    assert_value("rest([1, 2, 3])", "[2, 3]");
    assert_value("reverse([1, 2, 3])", "[3, 2, 1]");
    assert_value("sort(|a, b| a < b, [3, 1, 2])", "[1, 2, 3]");
    assert_value("sort(|a, b| a > b, [3, 1, 2])", "[3, 2, 1]");
    assert_value("unique([1, 2, 1, 3, 2])", "[1, 2, 3]");
    assert_value("contains(2, [1, 2])", "true");
    assert_value("contains(\"el\", \"hello\")", "true");
    assert_value("sum([1, 2, 3])", "6");
    assert_value("min([3, 1, 2])", "1");
    assert_value("max([3, 1, 2])", "3");
    assert_value("zip([1, 2], [\"a\", \"b\"])", "[[1, \"a\"], [2, \"b\"]]");
    assert_value("assoc(\"k\", 1, #{})", "#{\"k\": 1}");
    assert_value("assoc(1, \"x\", [\"a\", \"b\"])", "[\"a\", \"x\"]");
    assert_value("update(\"n\", |v| if v { v + 1 } else { 1 }, #{})", "#{\"n\": 1}");
    assert_value("to_set([1, 2, 2])", "{1, 2}");
    assert_value("to_dict([[\"a\", 1], [\"b\", 2]])", "#{\"a\": 1, \"b\": 2}");
    assert_value("entries(#{\"a\": 1})", "[[\"a\", 1]]");
}

#[test]
fn persistence_of_collections() {
    assert_value("let a = [1, 2]; let b = push(3, a); a", "[1, 2]");
    assert_value("let a = [1, 2]; let b = push(3, a); b", "[1, 2, 3]");
    assert_value("let d = #{\"a\": 1}; let e = assoc(\"b\", 2, d); d", "#{\"a\": 1}");
    assert_value("let s = {1}; let t = push(2, s); s", "{1}");
}

#[test]
fn transient_collections() {
    assert_value("let t = asMutable([1]); push!(2, t); asImmutable(t)", "[1, 2]");
    assert_failure("push!(1, [1, 2])");
    assert_failure("let t = asMutable([1]); push(2, t)");
    assert_failure("asImmutable([1])");
}

#[test]
fn ranges_and_laziness() {
    assert_value("to_list(1..5)", "[1, 2, 3, 4]");
    assert_value("to_list(1..=5)", "[1, 2, 3, 4, 5]");
    assert_value("to_list(5..1)", "[5, 4, 3, 2]");
    assert_value("to_list(range(1, 10, 3))", "[1, 4, 7]");
    assert_value("size(1..=10)", "10");
    assert_value("take(5, map(_ * 2, 1..))", "[2, 4, 6, 8, 10]");
    assert_value("take(3, filter(|x| x % 2 == 0, 1..))", "[2, 4, 6]");
    assert_value("take(4, iterate(_ * 2, 1))", "[1, 2, 4, 8]");
    assert_value("take(5, cycle([1, 2]))", "[1, 2, 1, 2, 1]");
    assert_value("take(2, repeat(\"x\"))", "[\"x\", \"x\"]");
    assert_value("take(3, drop(2, 1..))", "[3, 4, 5]");
    assert_value("first(zip(1.., [\"a\", \"b\"]))", "[1, \"a\"]");
    assert_failure("size(1..)");
    assert_failure("last(1..)");
    assert_failure("sum(1..)");
}

#[test]
fn sequences_memoise_their_elements() {
    // The mapped sequence is consumed twice; memoisation keeps the second
    // pass from recomputing (and the count stable).
    let source = "let mut calls = 0;
                  let seq = map(|x| { calls = calls + 1; x * 2 }, 1..);
                  let a = take(3, seq);
                  let b = take(3, seq);
                  [calls, a == b]";
    assert_value(source, "[3, true]");
}

#[test]
fn string_builtins() {
    assert_value("split(\",\", \"a,b,c\")", "[\"a\", \"b\", \"c\"]");
    assert_value("split(\"\", \"ab\")", "[\"a\", \"b\"]");
    assert_value("trim(\"  hi  \")", "\"hi\"");
    assert_value("lines(\"a\\nb\")", "[\"a\", \"b\"]");
    assert_value("chars(\"ab\")", "[\"a\", \"b\"]");
    assert_value("int(\"42\")", "42");
    assert_value("int(\" -7 \")", "-7");
    assert_value("int(3.9)", "3");
    assert_value("str(42)", "\"42\"");
    assert_value("str([1, 2])", "\"[1, 2]\"");
    assert_failure("int(\"xyz\")");
}

#[test]
fn misc_builtins() {
    assert_value("type(1)", "\"Integer\"");
    assert_value("type(1.5)", "\"Decimal\"");
    assert_value("type(\"s\")", "\"String\"");
    assert_value("type([])", "\"List\"");
    assert_value("type(1..)", "\"Range\"");
    assert_value("type(|x| x)", "\"Function\"");
    assert_value("assert(1 == 1)", "nil");
    assert_failure("assert(1 == 2)");
    assert_failure("assert(false, \"should be true\")");
}

#[test]
fn builtins_are_ordinary_bindings() {
    assert_value("let plus = |a, b| a + b; plus(1, 2)", "3");
    assert_value("let size = |x| 99; size([1])", "99");
    assert_value("let f = |a, b| a * b; [1, 2] |> fold(1) |acc, x| f(acc, x)", "2");
}

#[test]
fn recursion_and_tail_calls() {
    assert_value("let fib = |n| if n < 2 { n } else { fib(n - 1) + fib(n - 2) }; fib(15)", "610");
    assert_value("let count = |n| if n == 0 { \"done\" } else { count(n - 1) }; count(1_000_000)",
                 "\"done\"");

    let mutual = "let is_even = |n| if n == 0 { true } else { is_odd(n - 1) }
                  let is_odd = |n| if n == 0 { false } else { is_even(n - 1) }
                  is_even(1_000_000)";
    assert_value(mutual, "true");
}

#[test]
fn returns_exit_the_function_only() {
    assert_value("let f = |x| { if x { return 1 }; 2 }; f(true)", "1");
    assert_value("let f = |x| { if x { return 1 }; 2 }; f(false)", "2");
}
