use std::rc::Rc;

use num_traits::ToPrimitive;

use crate::{
    ast::SourceLocation,
    error::RuntimeError,
    interpreter::{
        evaluator::{
            builtin::{collections::eager_pairs, one, two},
            core::{EvalResult, Evaluator},
        },
        value::{
            core::Value,
            range::RangeValue,
            sequence::{Sequence, SequenceSource},
        },
    },
};

fn count_of(value: &Value, operation: &'static str, location: SourceLocation) -> EvalResult<usize> {
    match value {
        // Negative counts clamp to zero.
        Value::Integer(n) => Ok(n.to_usize().unwrap_or(0)),
        other => Err(RuntimeError::TypeMismatch { details: format!("'{operation}' expects an \
                                                                    Integer count, found {}",
                                                                   other.type_name()),
                                                  location }),
    }
}

/// `iterate(f, seed)`: the unbounded sequence seed, f(seed), f(f(seed)), …
pub fn iterate(_: &mut Evaluator, args: Vec<Value>, _: SourceLocation) -> EvalResult<Value> {
    let (func, seed) = two(args);
    Ok(Value::Sequence(Sequence::new(SequenceSource::Iterate { func,
                                                               current: seed,
                                                               started: false })))
}

/// The first `n` elements, materialised. Strings stay strings; everything
/// else produces a list.
pub fn take(evaluator: &mut Evaluator,
            args: Vec<Value>,
            location: SourceLocation)
            -> EvalResult<Value> {
    let (n, collection) = two(args);
    let n = count_of(&n, "take", location)?;

    match collection {
        Value::Str(s) => Ok(Value::from(s.chars().take(n).collect::<String>())),
        Value::List(items) => Ok(Value::List(items.into_iter().take(n).collect())),
        Value::Sequence(handle) => {
            let mut items = im_rc::Vector::new();
            for index in 0..n {
                let Some(value) = Sequence::get(&handle, index, evaluator, location)? else {
                    break;
                };
                items.push_back(value);
            }
            Ok(Value::List(items))
        },
        Value::Range(range) => {
            let mut items = im_rc::Vector::new();
            for value in range.iter().take(n) {
                items.push_back(Value::Integer(value));
            }
            Ok(Value::List(items))
        },
        other => {
            let pairs = eager_pairs(evaluator, &other, "take", location)?;
            Ok(Value::List(pairs.into_iter().take(n).map(|(v, _)| v).collect()))
        },
    }
}

/// Everything after the first `n` elements. Ranges advance their start and
/// sequences stay lazy, so dropping from an unbounded source is fine.
pub fn drop(evaluator: &mut Evaluator,
            args: Vec<Value>,
            location: SourceLocation)
            -> EvalResult<Value> {
    let (n, collection) = two(args);
    let n = count_of(&n, "drop", location)?;

    match collection {
        Value::Str(s) => Ok(Value::from(s.chars().skip(n).collect::<String>())),
        Value::List(items) => {
            if n >= items.len() {
                return Ok(Value::List(im_rc::Vector::new()));
            }
            Ok(Value::List(items.clone().split_off(n)))
        },
        Value::Range(range) => {
            let advanced = RangeValue { start:     &range.start
                                                   + &range.step * num_bigint::BigInt::from(n),
                                        end:       range.end.clone(),
                                        inclusive: range.inclusive,
                                        step:      range.step.clone(), };
            Ok(Value::Range(Rc::new(advanced)))
        },
        Value::Sequence(handle) => {
            let source = SequenceSource::Drop { inner:     Box::new(SequenceSource::Handle {
                                                    handle,
                                                    index: 0,
                                                }),
                                                remaining: n, };
            Ok(Value::Sequence(Sequence::new(source)))
        },
        other => {
            let pairs = eager_pairs(evaluator, &other, "drop", location)?;
            Ok(Value::List(pairs.into_iter().skip(n).map(|(v, _)| v).collect()))
        },
    }
}

/// Repeats a bounded collection's elements endlessly.
pub fn cycle(evaluator: &mut Evaluator,
             args: Vec<Value>,
             location: SourceLocation)
             -> EvalResult<Value> {
    let collection = one(args);
    let items: Vec<Value> = eager_pairs(evaluator, &collection, "cycle", location)?.into_iter()
                                                                                   .map(|(v, _)| v)
                                                                                   .collect();
    Ok(Value::Sequence(Sequence::new(SequenceSource::Cycle { items, index: 0 })))
}

/// The unbounded sequence of one repeated value.
pub fn repeat(_: &mut Evaluator, args: Vec<Value>, _: SourceLocation) -> EvalResult<Value> {
    Ok(Value::Sequence(Sequence::new(SequenceSource::Repeat { value: one(args) })))
}
