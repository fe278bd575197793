use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::{
    ast::Program,
    error::Error,
    interpreter::{
        environment::{EnvRef, Section},
        evaluator::core::{flow_into_value, Evaluator},
        io::IoHandle,
        parser::Parser,
        value::core::Value,
    },
};

/// The canonical section names the runner recognises.
const PART_NAMES: [&str; 2] = ["part_one", "part_two"];

/// One timed part of a solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartResult {
    pub name:     String,
    /// The canonical rendering of the part's value.
    pub value:    String,
    pub duration: Duration,
}

/// What running a source produced.
///
/// A source declaring `part_one` or `part_two` is a solution; anything
/// else is a script whose value is its final expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Solution { parts: Vec<PartResult> },
    Script { value: String, duration: Duration },
}

/// One expectation that did not hold in a test section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestFailure {
    pub part:     String,
    pub expected: String,
    pub actual:   String,
}

/// The outcome of one `test` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestResult {
    pub name:     String,
    /// Whether the section carried the `@slow` annotation.
    pub slow:     bool,
    /// Set when a slow test was not requested; nothing was evaluated.
    pub skipped:  bool,
    pub failures: Vec<TestFailure>,
}

impl TestResult {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Parses and evaluates a source in solve mode.
///
/// Top-level bindings and the `input` section evaluate once; each present
/// part then runs in a child scope with `input` bound, and is timed
/// individually.
///
/// # Errors
/// Returns the first parse or runtime error, carrying its source location.
pub fn run(source: &str, io: Rc<dyn IoHandle>) -> Result<RunOutcome, Error> {
    let program = parse(source)?;
    let mut evaluator = Evaluator::new(io);
    let env = evaluator.program_env();

    let started = Instant::now();
    let last = evaluator.eval_program(&program, env)?;
    let elapsed = started.elapsed();

    let sections: Vec<Rc<Section>> = PART_NAMES.iter()
                                               .filter_map(|name| {
                                                   last_section(&evaluator, env, name)
                                               })
                                               .collect();
    if sections.is_empty() {
        return Ok(RunOutcome::Script { value:    last.inspect(),
                                       duration: elapsed });
    }

    let input = eval_input(&mut evaluator, env)?;
    let mut parts = Vec::new();
    for section in sections {
        let started = Instant::now();
        let value = eval_part(&mut evaluator, &section, env, input.as_ref())?;
        parts.push(PartResult { name:     section.name.clone(),
                                value:    value.inspect(),
                                duration: started.elapsed() });
    }
    Ok(RunOutcome::Solution { parts })
}

/// Parses and evaluates a source in test mode.
///
/// Each `test` section provides an `input` and expected part values; the
/// enclosing parts are re-evaluated against that input and compared by
/// canonical rendering. Slow tests are skipped unless requested.
///
/// # Errors
/// Returns the first parse or runtime error, carrying its source location.
pub fn run_tests(source: &str,
                 io: Rc<dyn IoHandle>,
                 include_slow: bool)
                 -> Result<Vec<TestResult>, Error> {
    let program = parse(source)?;
    let mut evaluator = Evaluator::new(io);
    let env = evaluator.program_env();
    evaluator.eval_program(&program, env)?;

    let tests = evaluator.envs.sections(env, "test");
    let mut results = Vec::new();

    for (index, test) in tests.iter().enumerate() {
        let name = format!("test {}", index + 1);
        if test.slow && !include_slow {
            results.push(TestResult { name,
                                      slow: true,
                                      skipped: true,
                                      failures: Vec::new() });
            continue;
        }

        // The test body declares its sections into a child scope; `input`
        // resolution walks outward, so a test without its own input falls
        // back to the solution's.
        let test_env = evaluator.envs.child(env);
        let flow = evaluator.eval_block(&test.body, test_env, false)?;
        flow_into_value(flow, test.location)?;

        let input = eval_input(&mut evaluator, test_env)?;
        let mut failures = Vec::new();
        for part_name in PART_NAMES {
            let Some(expected_section) =
                evaluator.envs.sections_local(test_env, part_name).into_iter().next_back()
            else {
                continue;
            };
            let Some(part_section) = last_section(&evaluator, env, part_name) else {
                continue;
            };

            let expected = eval_section_body(&mut evaluator, &expected_section, test_env)?;
            let actual = eval_part(&mut evaluator, &part_section, env, input.as_ref())?;
            if expected.inspect() != actual.inspect() {
                failures.push(TestFailure { part:     part_name.to_string(),
                                            expected: expected.inspect(),
                                            actual:   actual.inspect() });
            }
        }

        results.push(TestResult { name,
                                  slow: test.slow,
                                  skipped: false,
                                  failures });
    }
    Ok(results)
}

fn parse(source: &str) -> Result<Program, Error> {
    Ok(Parser::new(source)?.parse_program()?)
}

/// The governing declaration of a section name: the last one in scope.
fn last_section(evaluator: &Evaluator, env: EnvRef, name: &str) -> Option<Rc<Section>> {
    evaluator.envs.sections(env, name).into_iter().next_back()
}

/// Evaluates the `input` section visible from `env`, when there is one.
fn eval_input(evaluator: &mut Evaluator, env: EnvRef) -> Result<Option<Value>, Error> {
    match last_section(evaluator, env, "input") {
        Some(section) => Ok(Some(eval_section_body(evaluator, &section, env)?)),
        None => Ok(None),
    }
}

fn eval_section_body(evaluator: &mut Evaluator,
                     section: &Section,
                     env: EnvRef)
                     -> Result<Value, Error> {
    let child = evaluator.envs.child(env);
    let flow = evaluator.eval_block(&section.body, child, false)?;
    Ok(flow_into_value(flow, section.location)?)
}

/// Runs one part in a child scope of the solution, with `input` bound.
fn eval_part(evaluator: &mut Evaluator,
             section: &Section,
             env: EnvRef,
             input: Option<&Value>)
             -> Result<Value, Error> {
    let child = evaluator.envs.child(env);
    if let Some(input) = input {
        evaluator.envs.declare(child, "input", input.clone(), false);
    }
    let flow = evaluator.eval_block(&section.body, child, false)?;
    Ok(flow_into_value(flow, section.location)?)
}
