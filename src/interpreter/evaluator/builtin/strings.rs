use num_bigint::BigInt;
use num_traits::FromPrimitive;

use crate::{
    ast::SourceLocation,
    error::RuntimeError,
    interpreter::{
        evaluator::{
            builtin::{collections::eager_pairs, one, two},
            core::{EvalResult, Evaluator},
        },
        value::core::Value,
    },
};

fn string_only(value: Value,
               operation: &'static str,
               location: SourceLocation)
               -> EvalResult<std::rc::Rc<str>> {
    match value {
        Value::Str(s) => Ok(s),
        other => Err(RuntimeError::TypeMismatch { details: format!("'{operation}' expects a \
                                                                    String, found {}",
                                                                   other.type_name()),
                                                  location }),
    }
}

/// Splits on a separator; the empty separator splits into characters.
pub fn split(_: &mut Evaluator, args: Vec<Value>, location: SourceLocation) -> EvalResult<Value> {
    let (separator, subject) = two(args);
    let separator = string_only(separator, "split", location)?;
    let subject = string_only(subject, "split", location)?;

    let parts: Vec<Value> = if separator.is_empty() {
        subject.chars().map(|c| Value::from(c.to_string())).collect()
    } else {
        subject.split(separator.as_ref()).map(Value::from).collect()
    };
    Ok(Value::from(parts))
}

pub fn join(evaluator: &mut Evaluator,
            args: Vec<Value>,
            location: SourceLocation)
            -> EvalResult<Value> {
    let (separator, collection) = two(args);
    let separator = string_only(separator, "join", location)?;

    let rendered: Vec<String> = eager_pairs(evaluator, &collection, "join", location)?.into_iter()
                                                                                      .map(|(v, _)| {
                                                                                          v.to_string()
                                                                                      })
                                                                                      .collect();
    Ok(Value::from(rendered.join(&separator)))
}

pub fn trim(_: &mut Evaluator, args: Vec<Value>, location: SourceLocation) -> EvalResult<Value> {
    let subject = string_only(one(args), "trim", location)?;
    Ok(Value::from(subject.trim()))
}

pub fn lines(_: &mut Evaluator, args: Vec<Value>, location: SourceLocation) -> EvalResult<Value> {
    let subject = string_only(one(args), "lines", location)?;
    let lines: Vec<Value> = subject.lines().map(Value::from).collect();
    Ok(Value::from(lines))
}

pub fn chars(_: &mut Evaluator, args: Vec<Value>, location: SourceLocation) -> EvalResult<Value> {
    let subject = string_only(one(args), "chars", location)?;
    let chars: Vec<Value> = subject.chars().map(|c| Value::from(c.to_string())).collect();
    Ok(Value::from(chars))
}

/// Parses or truncates its argument to an Integer.
pub fn int(_: &mut Evaluator, args: Vec<Value>, location: SourceLocation) -> EvalResult<Value> {
    match one(args) {
        integer @ Value::Integer(_) => Ok(integer),
        Value::Decimal(d) => {
            BigInt::from_f64(d.0.trunc()).map(Value::Integer)
                                         .ok_or(RuntimeError::DomainError {
                                             details:  format!("cannot convert {} to an integer",
                                                               d.0),
                                             location,
                                         })
        },
        Value::Str(s) => {
            s.trim()
             .parse::<BigInt>()
             .map(Value::Integer)
             .map_err(|_| RuntimeError::DomainError { details: format!("cannot parse \"{s}\" as \
                                                                        an integer"),
                                                      location })
        },
        other => Err(RuntimeError::TypeMismatch { details: format!("'int' expects a String or \
                                                                    number, found {}",
                                                                   other.type_name()),
                                                  location }),
    }
}

/// The user-facing rendering of any value: strings stay bare, everything
/// else uses its canonical form.
pub fn str(_: &mut Evaluator, args: Vec<Value>, _: SourceLocation) -> EvalResult<Value> {
    Ok(Value::from(one(args).to_string()))
}
