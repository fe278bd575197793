use std::rc::Rc;

use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};

use crate::{
    ast::SourceLocation,
    error::RuntimeError,
    interpreter::{
        evaluator::{
            builtin::two,
            core::{EvalResult, Evaluator},
        },
        value::{core::Value, range::RangeValue},
    },
    util::num::bigint_to_f64,
};

/// Promotes a numeric pair to `f64` when at least one side is a decimal.
fn decimal_pair(a: &Value, b: &Value) -> Option<(f64, f64)> {
    match (a, b) {
        (Value::Decimal(a), Value::Decimal(b)) => Some((a.0, b.0)),
        (Value::Integer(a), Value::Decimal(b)) => Some((bigint_to_f64(a), b.0)),
        (Value::Decimal(a), Value::Integer(b)) => Some((a.0, bigint_to_f64(b))),
        _ => None,
    }
}

fn operand_error(op: &str, a: &Value, b: &Value, location: SourceLocation) -> RuntimeError {
    RuntimeError::TypeMismatch { details: format!("cannot apply '{op}' to {} and {}",
                                                  a.type_name(),
                                                  b.type_name()),
                                 location }
}

pub fn add(_: &mut Evaluator, args: Vec<Value>, location: SourceLocation) -> EvalResult<Value> {
    let (a, b) = two(args);
    if let Some((a, b)) = decimal_pair(&a, &b) {
        return Ok(Value::from(a + b));
    }
    match (a, b) {
        (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(a + b)),
        (Value::Str(a), Value::Str(b)) => Ok(Value::from(format!("{a}{b}"))),
        (Value::List(a), Value::List(b)) => {
            let mut joined = a;
            joined.append(b);
            Ok(Value::List(joined))
        },
        (Value::Dict(a), Value::Dict(b)) => Ok(Value::Dict(a.merge(&b))),
        (Value::Set(a), Value::Set(b)) => Ok(Value::Set(a.union(&b))),
        (a, b) => Err(operand_error("+", &a, &b, location)),
    }
}

pub fn subtract(_: &mut Evaluator, args: Vec<Value>, location: SourceLocation) -> EvalResult<Value> {
    let (a, b) = two(args);
    if let Some((a, b)) = decimal_pair(&a, &b) {
        return Ok(Value::from(a - b));
    }
    match (a, b) {
        (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(a - b)),
        (Value::Set(a), Value::Set(b)) => Ok(Value::Set(a.difference(&b))),
        (a, b) => Err(operand_error("-", &a, &b, location)),
    }
}

pub fn multiply(_: &mut Evaluator, args: Vec<Value>, location: SourceLocation) -> EvalResult<Value> {
    let (a, b) = two(args);
    if let Some((a, b)) = decimal_pair(&a, &b) {
        return Ok(Value::from(a * b));
    }
    match (a, b) {
        (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(a * b)),
        (Value::Str(s), Value::Integer(n)) | (Value::Integer(n), Value::Str(s)) => {
            let count = n.to_usize().unwrap_or(0);
            Ok(Value::from(s.repeat(count)))
        },
        (a, b) => Err(operand_error("*", &a, &b, location)),
    }
}

pub fn divide(_: &mut Evaluator, args: Vec<Value>, location: SourceLocation) -> EvalResult<Value> {
    let (a, b) = two(args);
    if let Some((a, b)) = decimal_pair(&a, &b) {
        if b == 0.0 {
            return Err(RuntimeError::DivisionByZero { location });
        }
        return Ok(Value::from(a / b));
    }
    match (a, b) {
        (Value::Integer(a), Value::Integer(b)) => {
            if b.is_zero() {
                return Err(RuntimeError::DivisionByZero { location });
            }
            // An even division stays an integer; otherwise fall over to
            // decimal.
            if (&a % &b).is_zero() {
                Ok(Value::Integer(a / b))
            } else {
                Ok(Value::from(bigint_to_f64(&a) / bigint_to_f64(&b)))
            }
        },
        (a, b) => Err(operand_error("/", &a, &b, location)),
    }
}

/// Mathematical modulo: the result takes the divisor's sign.
pub fn modulo(_: &mut Evaluator, args: Vec<Value>, location: SourceLocation) -> EvalResult<Value> {
    let (a, b) = two(args);
    if let Some((a, b)) = decimal_pair(&a, &b) {
        if b == 0.0 {
            return Err(RuntimeError::DivisionByZero { location });
        }
        return Ok(Value::from(((a % b) + b) % b));
    }
    match (a, b) {
        (Value::Integer(a), Value::Integer(b)) => {
            if b.is_zero() {
                return Err(RuntimeError::DivisionByZero { location });
            }
            Ok(Value::Integer(((&a % &b) + &b) % &b))
        },
        (a, b) => Err(operand_error("%", &a, &b, location)),
    }
}

pub fn equal(_: &mut Evaluator, args: Vec<Value>, _: SourceLocation) -> EvalResult<Value> {
    let (a, b) = two(args);
    Ok(Value::Boolean(a == b))
}

pub fn not_equal(_: &mut Evaluator, args: Vec<Value>, _: SourceLocation) -> EvalResult<Value> {
    let (a, b) = two(args);
    Ok(Value::Boolean(a != b))
}

fn compare(op: &str,
           args: Vec<Value>,
           location: SourceLocation,
           keep: impl Fn(std::cmp::Ordering) -> bool)
           -> EvalResult<Value> {
    let (a, b) = two(args);
    a.compare(&b)
     .map(|ordering| Value::Boolean(keep(ordering)))
     .ok_or_else(|| {
         RuntimeError::TypeMismatch { details: format!("cannot compare {} and {} with '{op}'",
                                                       a.type_name(),
                                                       b.type_name()),
                                      location }
     })
}

pub fn less(_: &mut Evaluator, args: Vec<Value>, location: SourceLocation) -> EvalResult<Value> {
    compare("<", args, location, std::cmp::Ordering::is_lt)
}

pub fn less_eq(_: &mut Evaluator, args: Vec<Value>, location: SourceLocation) -> EvalResult<Value> {
    compare("<=", args, location, std::cmp::Ordering::is_le)
}

pub fn greater(_: &mut Evaluator, args: Vec<Value>, location: SourceLocation) -> EvalResult<Value> {
    compare(">", args, location, std::cmp::Ordering::is_gt)
}

pub fn greater_eq(_: &mut Evaluator,
                  args: Vec<Value>,
                  location: SourceLocation)
                  -> EvalResult<Value> {
    compare(">=", args, location, std::cmp::Ordering::is_ge)
}

fn range_bounds(args: Vec<Value>, location: SourceLocation) -> EvalResult<(BigInt, BigInt)> {
    let (a, b) = two(args);
    match (a, b) {
        (Value::Integer(a), Value::Integer(b)) => Ok((a, b)),
        (a, b) => Err(RuntimeError::TypeMismatch { details: format!("range bounds must be \
                                                                     Integers, found {} and {}",
                                                                    a.type_name(),
                                                                    b.type_name()),
                                                   location }),
    }
}

pub fn range_exclusive(_: &mut Evaluator,
                       args: Vec<Value>,
                       location: SourceLocation)
                       -> EvalResult<Value> {
    let (start, end) = range_bounds(args, location)?;
    Ok(Value::Range(Rc::new(RangeValue::new(start, Some(end), false))))
}

pub fn range_inclusive(_: &mut Evaluator,
                       args: Vec<Value>,
                       location: SourceLocation)
                       -> EvalResult<Value> {
    let (start, end) = range_bounds(args, location)?;
    Ok(Value::Range(Rc::new(RangeValue::new(start, Some(end), true))))
}

/// `x |> f` applies `f` to `x`; with `f` partially applied this chains
/// naturally, e.g. `input |> map(parse) |> sum`.
pub fn pipeline(evaluator: &mut Evaluator,
                args: Vec<Value>,
                location: SourceLocation)
                -> EvalResult<Value> {
    let (value, func) = two(args);
    evaluator.call_function(&func, vec![value], location)
}

fn is_callable(value: &Value) -> bool {
    matches!(value,
             Value::Function(_) | Value::Builtin(_) | Value::Partial(_) | Value::Composition(_))
}

/// `f >> g` composes left to right: `(f >> g)(x)` is `g(f(x))`.
pub fn compose(_: &mut Evaluator, args: Vec<Value>, location: SourceLocation) -> EvalResult<Value> {
    let (f, g) = two(args);
    for func in [&f, &g] {
        if !is_callable(func) {
            return Err(RuntimeError::NotCallable { type_name: func.type_name(),
                                                   location });
        }
    }

    let mut chain = Vec::new();
    for func in [f, g] {
        match func {
            Value::Composition(inner) => chain.extend(inner.iter().cloned()),
            other => chain.push(other),
        }
    }
    Ok(Value::Composition(Rc::new(chain)))
}
