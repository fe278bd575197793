use std::cell::RefCell;
use std::rc::Rc;

use tinsel::error::{Error, RuntimeError};
use tinsel::{run, run_tests, IoHandle, NullIo, RunOutcome};

/// Records every `puts` line and serves canned `read` content.
#[derive(Default)]
struct CaptureIo {
    lines: RefCell<Vec<String>>,
    files: RefCell<Vec<(String, String)>>,
}

impl CaptureIo {
    fn with_file(path: &str, contents: &str) -> Self {
        let io = Self::default();
        io.files
          .borrow_mut()
          .push((path.to_string(), contents.to_string()));
        io
    }

    fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }
}

impl IoHandle for CaptureIo {
    fn input(&self, path: &str) -> Result<String, String> {
        self.files
            .borrow()
            .iter()
            .find(|(name, _)| name == path)
            .map(|(_, contents)| contents.clone())
            .ok_or_else(|| format!("unknown resource '{path}'"))
    }

    fn output(&self, args: &[String]) {
        self.lines.borrow_mut().push(args.join(" "));
    }
}

fn solution_parts(source: &str) -> Vec<(String, String)> {
    match run(source, Rc::new(NullIo)) {
        Ok(RunOutcome::Solution { parts }) => {
            parts.into_iter().map(|p| (p.name, p.value)).collect()
        },
        Ok(RunOutcome::Script { .. }) => panic!("expected a solution: {source}"),
        Err(e) => panic!("solution failed: {source}\n{e}"),
    }
}

#[test]
fn a_bare_expression_runs_as_a_script() {
    let outcome = run("1 + 2", Rc::new(NullIo)).expect("script failed");
    let RunOutcome::Script { value, .. } = outcome else {
        panic!("expected a script outcome");
    };
    assert_eq!(value, "3");
}

#[test]
fn a_part_section_makes_a_solution() {
    assert_eq!(solution_parts("part_one: { 42 }"), vec![("part_one".to_string(),
                                                         "42".to_string())]);
}

#[test]
fn both_parts_run_with_the_shared_input() {
    let source = "input: \"abcd\"\n\
                  part_one: { size(input) }\n\
                  part_two: { input |> reverse }";
    assert_eq!(solution_parts(source),
               vec![("part_one".to_string(), "4".to_string()),
                    ("part_two".to_string(), "\"dcba\"".to_string())]);
}

#[test]
fn parenthesis_counting_solution() {
    let source = "input: \"()())\"\n\
                  part_one: { input |> fold(0) |f, d| { if d == \"(\" { f + 1 } else { f - 1 } } }";
    assert_eq!(solution_parts(source), vec![("part_one".to_string(), "-1".to_string())]);
}

#[test]
fn top_level_bindings_are_visible_to_parts() {
    let source = "let factor = 6\n\
                  input: \"7\"\n\
                  part_one: { int(input) * factor }";
    assert_eq!(solution_parts(source), vec![("part_one".to_string(), "42".to_string())]);
}

#[test]
fn the_last_duplicate_section_wins() {
    let source = "part_one: { 1 }\n\
                  part_one: { 2 }";
    assert_eq!(solution_parts(source), vec![("part_one".to_string(), "2".to_string())]);
}

#[test]
fn read_goes_through_the_injected_handle() {
    let io = Rc::new(CaptureIo::with_file("notes.txt", "hello"));
    let outcome = run("read(\"notes.txt\")", io).expect("script failed");
    let RunOutcome::Script { value, .. } = outcome else {
        panic!("expected a script outcome");
    };
    assert_eq!(value, "\"hello\"");
}

#[test]
fn a_failed_read_is_an_io_error() {
    let error = run("read(\"missing\")", Rc::new(CaptureIo::default())).unwrap_err();
    assert!(matches!(error, Error::Runtime(RuntimeError::Io { .. })), "{error:?}");
}

#[test]
fn puts_lines_arrive_in_order() {
    let io = Rc::new(CaptureIo::default());
    run("puts(1); puts(\"two\", 3); puts()", Rc::clone(&io) as Rc<dyn IoHandle>)
        .expect("script failed");
    // The zero-argument call produces no event at all.
    assert_eq!(io.lines(), vec!["1", "two 3"]);
}

#[test]
fn short_circuiting_skips_the_right_hand_side() {
    let io = Rc::new(CaptureIo::default());
    run("false && puts(\"and\"); true || puts(\"or\"); true && puts(\"yes\")",
        Rc::clone(&io) as Rc<dyn IoHandle>).expect("script failed");
    assert_eq!(io.lines(), vec!["yes"]);
}

#[test]
fn type_errors_carry_their_operator_position() {
    let error = run("1 * \"x\"", Rc::new(NullIo)).unwrap_err();
    let Error::Runtime(RuntimeError::TypeMismatch { location, .. }) = &error else {
        panic!("expected a type mismatch, got {error:?}");
    };
    assert_eq!((location.line, location.column), (1, 3));
}

#[test]
fn unmatched_match_reports_the_scrutinee() {
    let error = run("let x = 9\nmatch x { 1 => 1 }", Rc::new(NullIo)).unwrap_err();
    let Error::Runtime(RuntimeError::UnmatchedPattern { location }) = &error else {
        panic!("expected an unmatched pattern error, got {error:?}");
    };
    assert_eq!((location.line, location.column), (2, 7));
}

#[test]
fn passing_tests_report_no_failures() {
    let source = "input: \"real\"\n\
                  part_one: { size(input) }\n\
                  test: {\n\
                      input: \"abc\"\n\
                      part_one: 3\n\
                  }";
    let results = run_tests(source, Rc::new(NullIo), false).expect("test run failed");
    assert_eq!(results.len(), 1);
    assert!(!results[0].skipped);
    assert!(!results[0].slow);
    assert!(results[0].passed());
}

#[test]
fn failing_tests_report_expected_and_actual() {
    let source = "part_one: { 41 }\n\
                  test: { part_one: 42 }";
    let results = run_tests(source, Rc::new(NullIo), false).expect("test run failed");
    assert_eq!(results.len(), 1);
    assert!(!results[0].passed());
    assert_eq!(results[0].failures[0].part, "part_one");
    assert_eq!(results[0].failures[0].expected, "42");
    assert_eq!(results[0].failures[0].actual, "41");
}

#[test]
fn slow_tests_are_skipped_unless_requested() {
    let source = "part_one: { 1 }\n\
                  @slow test: { part_one: 1 }";

    let skipped = run_tests(source, Rc::new(NullIo), false).expect("test run failed");
    assert_eq!(skipped.len(), 1);
    assert!(skipped[0].slow);
    assert!(skipped[0].skipped);
    assert!(skipped[0].passed());

    let ran = run_tests(source, Rc::new(NullIo), true).expect("test run failed");
    assert_eq!(ran.len(), 1);
    assert!(ran[0].slow);
    assert!(!ran[0].skipped);
    assert!(ran[0].passed());
}

#[test]
fn every_test_section_runs() {
    let source = "input: \"xy\"\n\
                  part_one: { size(input) }\n\
                  test: { input: \"a\"; part_one: 1 }\n\
                  test: { input: \"abc\"; part_one: 3 }";
    let results = run_tests(source, Rc::new(NullIo), false).expect("test run failed");
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(tinsel::TestResult::passed));
}

#[test]
fn tests_fall_back_to_the_solution_input() {
    let source = "input: \"abcd\"\n\
                  part_one: { size(input) }\n\
                  test: { part_one: 4 }";
    let results = run_tests(source, Rc::new(NullIo), false).expect("test run failed");
    assert!(results[0].passed());
}

#[test]
fn part_two_expectations_are_checked_too() {
    let source = "part_one: { 1 }\n\
                  part_two: { \"two\" }\n\
                  test: { part_one: 1; part_two: \"two\" }";
    let results = run_tests(source, Rc::new(NullIo), false).expect("test run failed");
    assert!(results[0].passed());
}
