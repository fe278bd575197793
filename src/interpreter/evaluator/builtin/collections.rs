use std::cell::RefCell;
use std::rc::Rc;

use im_rc::Vector;
use num_traits::{ToPrimitive, Zero};

use crate::{
    ast::SourceLocation,
    error::RuntimeError,
    interpreter::{
        evaluator::{
            builtin::{one, operators, three, two},
            call::CallbackFlow,
            core::{EvalResult, Evaluator},
        },
        value::{
            core::{TransientValue, Value},
            dict::{DictValue, SetValue},
            range::RangeValue,
            sequence::{Sequence, SequenceHandle, SequenceSource},
        },
    },
};

/// Streams the elements of a collection one at a time, pairing each with
/// its positional context (the index, or the key for dictionaries).
///
/// Unbounded ranges and sequences stream forever; callers that must see
/// the whole collection go through [`eager_pairs`] instead.
pub(crate) enum Iteration {
    Pairs {
        items:    std::vec::IntoIter<(Value, Value)>,
    },
    Range {
        iter:     crate::interpreter::value::range::RangeIter,
        position: usize,
    },
    Seq {
        handle:   SequenceHandle,
        position: usize,
    },
}

impl Iteration {
    /// Builds an iteration over any iterable collection.
    pub(crate) fn over(collection: &Value,
                       operation: &'static str,
                       location: SourceLocation)
                       -> EvalResult<Self> {
        match collection {
            Value::List(items) => {
                Ok(Self::pairs(items.iter()
                                    .enumerate()
                                    .map(|(i, v)| (v.clone(), Value::from(i as i64)))
                                    .collect()))
            },
            Value::Str(s) => {
                Ok(Self::pairs(s.chars()
                                .enumerate()
                                .map(|(i, c)| (Value::from(c.to_string()), Value::from(i as i64)))
                                .collect()))
            },
            Value::Set(set) => {
                Ok(Self::pairs(set.iter()
                                  .enumerate()
                                  .map(|(i, v)| (v.clone(), Value::from(i as i64)))
                                  .collect()))
            },
            Value::Dict(dict) => {
                Ok(Self::pairs(dict.iter()
                                   .map(|(k, v)| (v.clone(), k.clone()))
                                   .collect()))
            },
            Value::Range(range) => Ok(Self::Range { iter: range.iter(), position: 0 }),
            Value::Sequence(handle) => {
                Ok(Self::Seq { handle: Rc::clone(handle), position: 0 })
            },
            other => Err(RuntimeError::TypeMismatch { details: format!("'{operation}' expects a \
                                                                       collection, found {}",
                                                                      other.type_name()),
                                                      location }),
        }
    }

    fn pairs(items: Vec<(Value, Value)>) -> Self {
        Self::Pairs { items: items.into_iter() }
    }

    /// The next (element, index-or-key) pair.
    pub(crate) fn next(&mut self,
                       evaluator: &mut Evaluator,
                       location: SourceLocation)
                       -> EvalResult<Option<(Value, Value)>> {
        match self {
            Self::Pairs { items } => Ok(items.next()),
            Self::Range { iter, position } => {
                let Some(value) = iter.next() else {
                    return Ok(None);
                };
                let index = Value::from(*position as i64);
                *position += 1;
                Ok(Some((Value::Integer(value), index)))
            },
            Self::Seq { handle, position } => {
                let Some(value) = Sequence::get(&Rc::clone(handle), *position, evaluator, location)?
                else {
                    return Ok(None);
                };
                let index = Value::from(*position as i64);
                *position += 1;
                Ok(Some((value, index)))
            },
        }
    }
}

/// Whether draining the collection may never terminate.
fn is_unbounded(collection: &Value) -> bool {
    match collection {
        Value::Range(range) => range.is_unbounded(),
        Value::Sequence(handle) => Sequence::is_unbounded(handle),
        _ => false,
    }
}

/// Materialises every (element, context) pair of a bounded collection.
pub(crate) fn eager_pairs(evaluator: &mut Evaluator,
                          collection: &Value,
                          operation: &'static str,
                          location: SourceLocation)
                          -> EvalResult<Vec<(Value, Value)>> {
    if is_unbounded(collection) {
        return Err(RuntimeError::UnboundedRange { operation, location });
    }
    let mut iteration = Iteration::over(collection, operation, location)?;
    let mut items = Vec::new();
    while let Some(pair) = iteration.next(evaluator, location)? {
        items.push(pair);
    }
    Ok(items)
}

/// A lazy producer reading the elements of `collection`; used when a
/// transform over a range or sequence must itself stay lazy.
fn lazy_source(evaluator: &mut Evaluator,
               collection: &Value,
               operation: &'static str,
               location: SourceLocation)
               -> EvalResult<SequenceSource> {
    match collection {
        Value::Range(range) => Ok(SequenceSource::Range(range.iter())),
        Value::Sequence(handle) => {
            Ok(SequenceSource::Handle { handle: Rc::clone(handle), index: 0 })
        },
        other => {
            let items = eager_pairs(evaluator, other, operation, location)?.into_iter()
                                                                           .map(|(v, _)| v)
                                                                           .collect();
            Ok(SequenceSource::Items { items, index: 0 })
        },
    }
}

/// The argument list for a callback: the element alone, or element plus
/// positional context when the callback declares enough parameters.
fn callback_args(wanted: usize, declared: usize, element: Value, context: Value) -> Vec<Value> {
    if declared >= wanted {
        vec![element, context]
    } else {
        vec![element]
    }
}

pub fn map(evaluator: &mut Evaluator,
           args: Vec<Value>,
           location: SourceLocation)
           -> EvalResult<Value> {
    let (func, collection) = two(args);

    // Transforms over ranges and sequences stay lazy.
    if matches!(collection, Value::Range(_) | Value::Sequence(_)) {
        let inner = lazy_source(evaluator, &collection, "map", location)?;
        let source = SequenceSource::Map { inner: Box::new(inner), func, emitted: 0 };
        return Ok(Value::Sequence(Sequence::new(source)));
    }

    let declared = evaluator.callback_arity(&func);
    let pairs = eager_pairs(evaluator, &collection, "map", location)?;
    let mut mapped = Vector::new();
    for (element, context) in pairs {
        let call = callback_args(2, declared, element, context);
        mapped.push_back(evaluator.call_function(&func, call, location)?);
    }
    Ok(Value::List(mapped))
}

pub fn filter(evaluator: &mut Evaluator,
              args: Vec<Value>,
              location: SourceLocation)
              -> EvalResult<Value> {
    let (func, collection) = two(args);

    if matches!(collection, Value::Range(_) | Value::Sequence(_)) {
        let inner = lazy_source(evaluator, &collection, "filter", location)?;
        let source = SequenceSource::Filter { inner: Box::new(inner), func, consumed: 0 };
        return Ok(Value::Sequence(Sequence::new(source)));
    }

    let declared = evaluator.callback_arity(&func);
    let pairs = eager_pairs(evaluator, &collection, "filter", location)?;
    let mut kept = Vector::new();
    for (element, context) in pairs {
        let call = callback_args(2, declared, element.clone(), context);
        if evaluator.call_function(&func, call, location)?.is_truthy() {
            kept.push_back(element);
        }
    }
    Ok(Value::List(kept))
}

/// Folds a collection left to right. A `break` inside the callback ends
/// the fold immediately with the broken value as the result.
pub fn fold(evaluator: &mut Evaluator,
            args: Vec<Value>,
            location: SourceLocation)
            -> EvalResult<Value> {
    let (initial, func, collection) = three(args);
    let declared = evaluator.callback_arity(&func);

    let mut iteration = Iteration::over(&collection, "fold", location)?;
    let mut accumulator = initial;
    while let Some((element, context)) = iteration.next(evaluator, location)? {
        let mut call = vec![accumulator, element];
        if declared >= 3 {
            call.push(context);
        }
        match evaluator.call_callback(&func, call, location)? {
            CallbackFlow::Value(value) => accumulator = value,
            CallbackFlow::Break(value) => return Ok(value),
        }
    }
    Ok(accumulator)
}

/// Like `fold`, but seeds the accumulator with the first element.
pub fn reduce(evaluator: &mut Evaluator,
              args: Vec<Value>,
              location: SourceLocation)
              -> EvalResult<Value> {
    let (func, collection) = two(args);
    let declared = evaluator.callback_arity(&func);

    let mut iteration = Iteration::over(&collection, "reduce", location)?;
    let Some((seed, _)) = iteration.next(evaluator, location)? else {
        return Err(RuntimeError::DomainError { details:  "reduce of an empty collection"
                                                             .to_string(),
                                               location });
    };

    let mut accumulator = seed;
    while let Some((element, context)) = iteration.next(evaluator, location)? {
        let mut call = vec![accumulator, element];
        if declared >= 3 {
            call.push(context);
        }
        match evaluator.call_callback(&func, call, location)? {
            CallbackFlow::Value(value) => accumulator = value,
            CallbackFlow::Break(value) => return Ok(value),
        }
    }
    Ok(accumulator)
}

/// Visits each element for its side effects; `break` stops the walk.
pub fn each(evaluator: &mut Evaluator,
            args: Vec<Value>,
            location: SourceLocation)
            -> EvalResult<Value> {
    let (func, collection) = two(args);
    let declared = evaluator.callback_arity(&func);

    let mut iteration = Iteration::over(&collection, "each", location)?;
    while let Some((element, context)) = iteration.next(evaluator, location)? {
        let call = callback_args(2, declared, element, context);
        if let CallbackFlow::Break(_) = evaluator.call_callback(&func, call, location)? {
            break;
        }
    }
    Ok(Value::Nil)
}

pub fn flat_map(evaluator: &mut Evaluator,
                args: Vec<Value>,
                location: SourceLocation)
                -> EvalResult<Value> {
    let (func, collection) = two(args);
    let declared = evaluator.callback_arity(&func);

    let pairs = eager_pairs(evaluator, &collection, "flat_map", location)?;
    let mut flattened = Vector::new();
    for (element, context) in pairs {
        let call = callback_args(2, declared, element, context);
        match evaluator.call_function(&func, call, location)? {
            Value::List(items) => flattened.append(items),
            other => flattened.push_back(other),
        }
    }
    Ok(Value::List(flattened))
}

/// The first element the predicate accepts, or `nil`. Streams lazily, so
/// it may search an unbounded range or sequence.
pub fn find(evaluator: &mut Evaluator,
            args: Vec<Value>,
            location: SourceLocation)
            -> EvalResult<Value> {
    let (func, collection) = two(args);
    let declared = evaluator.callback_arity(&func);

    let mut iteration = Iteration::over(&collection, "find", location)?;
    while let Some((element, context)) = iteration.next(evaluator, location)? {
        let call = callback_args(2, declared, element.clone(), context);
        if evaluator.call_function(&func, call, location)?.is_truthy() {
            return Ok(element);
        }
    }
    Ok(Value::Nil)
}

pub fn count(evaluator: &mut Evaluator,
             args: Vec<Value>,
             location: SourceLocation)
             -> EvalResult<Value> {
    let (func, collection) = two(args);
    let declared = evaluator.callback_arity(&func);

    let pairs = eager_pairs(evaluator, &collection, "count", location)?;
    let mut total: i64 = 0;
    for (element, context) in pairs {
        let call = callback_args(2, declared, element, context);
        if evaluator.call_function(&func, call, location)?.is_truthy() {
            total += 1;
        }
    }
    Ok(Value::from(total))
}

pub fn size(evaluator: &mut Evaluator,
            args: Vec<Value>,
            location: SourceLocation)
            -> EvalResult<Value> {
    match one(args) {
        Value::List(items) => Ok(Value::from(items.len() as i64)),
        Value::Dict(dict) => Ok(Value::from(dict.len() as i64)),
        Value::Set(set) => Ok(Value::from(set.len() as i64)),
        Value::Str(s) => Ok(Value::from(s.chars().count() as i64)),
        Value::Range(range) => {
            range.len()
                 .map(Value::Integer)
                 .ok_or(RuntimeError::UnboundedRange { operation: "size", location })
        },
        sequence @ Value::Sequence(_) => {
            let pairs = eager_pairs(evaluator, &sequence, "size", location)?;
            Ok(Value::from(pairs.len() as i64))
        },
        other => Err(RuntimeError::TypeMismatch { details: format!("'size' expects a collection, \
                                                                    found {}",
                                                                   other.type_name()),
                                                  location }),
    }
}

pub fn get(evaluator: &mut Evaluator,
           args: Vec<Value>,
           location: SourceLocation)
           -> EvalResult<Value> {
    let (key, collection) = two(args);
    evaluator.index_value(&collection, &key, location)
}

pub fn push(_: &mut Evaluator, args: Vec<Value>, location: SourceLocation) -> EvalResult<Value> {
    let (value, collection) = two(args);
    match collection {
        Value::List(mut items) => {
            items.push_back(value);
            Ok(Value::List(items))
        },
        Value::Set(set) => {
            if !value.is_hashable() {
                return Err(RuntimeError::UnhashableKey { type_name: value.type_name(),
                                                         location });
            }
            Ok(Value::Set(set.insert(value)))
        },
        Value::Transient(_) => {
            Err(RuntimeError::WrongPersistence { details:  "'push' expects a persistent \
                                                           collection; use 'push!' on a transient"
                                                               .to_string(),
                                                 location })
        },
        other => Err(RuntimeError::TypeMismatch { details: format!("cannot push onto a {}",
                                                                   other.type_name()),
                                                  location }),
    }
}

/// In-place push for transients created by `asMutable`.
pub fn push_mut(_: &mut Evaluator, args: Vec<Value>, location: SourceLocation) -> EvalResult<Value> {
    let (value, collection) = two(args);
    let Value::Transient(inner) = &collection else {
        return Err(RuntimeError::WrongPersistence { details:  "'push!' expects a transient \
                                                              collection; use 'asMutable' first"
                                                                  .to_string(),
                                                    location });
    };

    match &mut *inner.borrow_mut() {
        TransientValue::List(items) => items.push_back(value),
        TransientValue::Set(set) => {
            if !value.is_hashable() {
                return Err(RuntimeError::UnhashableKey { type_name: value.type_name(),
                                                         location });
            }
            set.insert_mut(value);
        },
        TransientValue::Dict(_) => {
            return Err(RuntimeError::TypeMismatch { details: "'push!' cannot add to a \
                                                              dictionary; use 'assoc'"
                                                                 .to_string(),
                                                    location });
        },
    }
    Ok(collection)
}

pub fn assoc(_: &mut Evaluator, args: Vec<Value>, location: SourceLocation) -> EvalResult<Value> {
    let (key, value, collection) = three(args);
    match collection {
        Value::Dict(dict) => {
            if !key.is_hashable() {
                return Err(RuntimeError::UnhashableKey { type_name: key.type_name(),
                                                         location });
            }
            Ok(Value::Dict(dict.insert(key, value)))
        },
        Value::List(items) => {
            let Value::Integer(position) = &key else {
                return Err(RuntimeError::TypeMismatch { details: format!("list positions must \
                                                                          be Integers, found {}",
                                                                         key.type_name()),
                                                        location });
            };
            match position.to_usize().filter(|i| *i < items.len()) {
                Some(index) => Ok(Value::List(items.update(index, value))),
                None => Err(RuntimeError::DomainError { details: format!("position {position} is \
                                                                          out of bounds"),
                                                        location }),
            }
        },
        other => Err(RuntimeError::TypeMismatch { details: format!("cannot assoc into a {}",
                                                                   other.type_name()),
                                                  location }),
    }
}

/// Applies a function to the value at a key; missing keys present as
/// `nil` to the callback.
pub fn update(evaluator: &mut Evaluator,
              args: Vec<Value>,
              location: SourceLocation)
              -> EvalResult<Value> {
    let (key, func, collection) = three(args);
    let current = evaluator.index_value(&collection, &key, location)?;
    let updated = evaluator.call_function(&func, vec![current], location)?;
    assoc(evaluator, vec![key, updated, collection], location)
}

pub fn zip(evaluator: &mut Evaluator,
           args: Vec<Value>,
           location: SourceLocation)
           -> EvalResult<Value> {
    let (a, b) = two(args);

    if matches!(a, Value::Range(_) | Value::Sequence(_))
        || matches!(b, Value::Range(_) | Value::Sequence(_))
    {
        let sources = vec![lazy_source(evaluator, &a, "zip", location)?,
                           lazy_source(evaluator, &b, "zip", location)?];
        return Ok(Value::Sequence(Sequence::new(SequenceSource::Zip { inners: sources })));
    }

    let left = eager_pairs(evaluator, &a, "zip", location)?;
    let right = eager_pairs(evaluator, &b, "zip", location)?;
    let zipped: Vector<Value> =
        left.into_iter()
            .zip(right)
            .map(|((x, _), (y, _))| Value::from(vec![x, y]))
            .collect();
    Ok(Value::List(zipped))
}

/// `range(start, end, step)`: an explicit-step progression, exclusive of
/// its end.
pub fn range(_: &mut Evaluator, args: Vec<Value>, location: SourceLocation) -> EvalResult<Value> {
    let (start, end, step) = three(args);
    let (Value::Integer(start), Value::Integer(end), Value::Integer(step)) = (start, end, step)
    else {
        return Err(RuntimeError::TypeMismatch { details: "'range' expects Integer start, end \
                                                          and step"
                                                             .to_string(),
                                                location });
    };
    if step.is_zero() {
        return Err(RuntimeError::DomainError { details:  "'range' step cannot be zero".to_string(),
                                               location });
    }
    Ok(Value::Range(Rc::new(RangeValue::with_step(start, end, false, step))))
}

pub fn first(evaluator: &mut Evaluator,
             args: Vec<Value>,
             location: SourceLocation)
             -> EvalResult<Value> {
    match one(args) {
        Value::List(items) => Ok(items.front().cloned().unwrap_or(Value::Nil)),
        Value::Str(s) => Ok(s.chars()
                             .next()
                             .map_or(Value::Nil, |c| Value::from(c.to_string()))),
        Value::Set(set) => Ok(set.iter().next().cloned().unwrap_or(Value::Nil)),
        Value::Range(range) => {
            if range.is_empty() {
                Ok(Value::Nil)
            } else {
                Ok(Value::Integer(range.start.clone()))
            }
        },
        Value::Sequence(handle) => {
            Ok(Sequence::get(&handle, 0, evaluator, location)?.unwrap_or(Value::Nil))
        },
        other => Err(RuntimeError::TypeMismatch { details: format!("'first' expects a \
                                                                    collection, found {}",
                                                                   other.type_name()),
                                                  location }),
    }
}

pub fn last(evaluator: &mut Evaluator,
            args: Vec<Value>,
            location: SourceLocation)
            -> EvalResult<Value> {
    match one(args) {
        Value::List(items) => Ok(items.back().cloned().unwrap_or(Value::Nil)),
        Value::Str(s) => Ok(s.chars()
                             .next_back()
                             .map_or(Value::Nil, |c| Value::from(c.to_string()))),
        Value::Set(set) => Ok(set.iter().last().cloned().unwrap_or(Value::Nil)),
        Value::Range(range) => {
            let Some(len) = range.len() else {
                return Err(RuntimeError::UnboundedRange { operation: "last", location });
            };
            if len.is_zero() {
                return Ok(Value::Nil);
            }
            Ok(Value::Integer(&range.start + &range.step * (len - 1)))
        },
        sequence @ Value::Sequence(_) => {
            let pairs = eager_pairs(evaluator, &sequence, "last", location)?;
            Ok(pairs.into_iter().next_back().map_or(Value::Nil, |(v, _)| v))
        },
        other => Err(RuntimeError::TypeMismatch { details: format!("'last' expects a collection, \
                                                                    found {}",
                                                                   other.type_name()),
                                                  location }),
    }
}

pub fn rest(_: &mut Evaluator, args: Vec<Value>, location: SourceLocation) -> EvalResult<Value> {
    match one(args) {
        Value::List(items) => {
            if items.is_empty() {
                Ok(Value::List(items))
            } else {
                Ok(Value::List(items.clone().split_off(1)))
            }
        },
        Value::Str(s) => {
            let rest: String = s.chars().skip(1).collect();
            Ok(Value::from(rest))
        },
        Value::Range(range) => {
            let advanced = RangeValue { start:     &range.start + &range.step,
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
                                                remaining: 1, };
            Ok(Value::Sequence(Sequence::new(source)))
        },
        other => Err(RuntimeError::TypeMismatch { details: format!("'rest' expects a list, \
                                                                    string, range or sequence, \
                                                                    found {}",
                                                                   other.type_name()),
                                                  location }),
    }
}

/// Sorts with a binary "comes before" predicate, e.g.
/// `sort(|a, b| a < b, xs)`. The sort is a stable merge.
pub fn sort(evaluator: &mut Evaluator,
            args: Vec<Value>,
            location: SourceLocation)
            -> EvalResult<Value> {
    let (func, collection) = two(args);
    let items: Vec<Value> = eager_pairs(evaluator, &collection, "sort", location)?.into_iter()
                                                                                  .map(|(v, _)| v)
                                                                                  .collect();
    let sorted = merge_sort(evaluator, &func, items, location)?;
    Ok(Value::List(sorted.into_iter().collect()))
}

fn is_before(evaluator: &mut Evaluator,
             func: &Value,
             a: &Value,
             b: &Value,
             location: SourceLocation)
             -> EvalResult<bool> {
    Ok(evaluator.call_function(func, vec![a.clone(), b.clone()], location)?
                .is_truthy())
}

fn merge_sort(evaluator: &mut Evaluator,
              func: &Value,
              mut items: Vec<Value>,
              location: SourceLocation)
              -> EvalResult<Vec<Value>> {
    if items.len() <= 1 {
        return Ok(items);
    }

    let right = items.split_off(items.len() / 2);
    let left = merge_sort(evaluator, func, items, location)?;
    let right = merge_sort(evaluator, func, right, location)?;

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    while let (Some(a), Some(b)) = (left.peek(), right.peek()) {
        // Take from the right only when it strictly precedes, keeping the
        // sort stable.
        if is_before(evaluator, func, b, a, location)? {
            let b = right.next().unwrap_or(Value::Nil);
            merged.push(b);
        } else {
            let a = left.next().unwrap_or(Value::Nil);
            merged.push(a);
        }
    }
    merged.extend(left);
    merged.extend(right);
    Ok(merged)
}

pub fn reverse(_: &mut Evaluator, args: Vec<Value>, location: SourceLocation) -> EvalResult<Value> {
    match one(args) {
        Value::List(items) => Ok(Value::List(items.into_iter().rev().collect())),
        Value::Str(s) => Ok(Value::from(s.chars().rev().collect::<String>())),
        other => Err(RuntimeError::TypeMismatch { details: format!("'reverse' expects a list or \
                                                                    string, found {}",
                                                                   other.type_name()),
                                                  location }),
    }
}

fn dict_only(value: Value,
             operation: &'static str,
             location: SourceLocation)
             -> EvalResult<DictValue> {
    match value {
        Value::Dict(dict) => Ok(dict),
        other => Err(RuntimeError::TypeMismatch { details: format!("'{operation}' expects a \
                                                                    dictionary, found {}",
                                                                   other.type_name()),
                                                  location }),
    }
}

pub fn keys(_: &mut Evaluator, args: Vec<Value>, location: SourceLocation) -> EvalResult<Value> {
    let dict = dict_only(one(args), "keys", location)?;
    Ok(Value::List(dict.keys().cloned().collect()))
}

pub fn values(_: &mut Evaluator, args: Vec<Value>, location: SourceLocation) -> EvalResult<Value> {
    let dict = dict_only(one(args), "values", location)?;
    Ok(Value::List(dict.iter().map(|(_, v)| v.clone()).collect()))
}

pub fn entries(_: &mut Evaluator, args: Vec<Value>, location: SourceLocation) -> EvalResult<Value> {
    let dict = dict_only(one(args), "entries", location)?;
    Ok(Value::List(dict.iter()
                       .map(|(k, v)| Value::from(vec![k.clone(), v.clone()]))
                       .collect()))
}

pub fn sum(evaluator: &mut Evaluator,
           args: Vec<Value>,
           location: SourceLocation)
           -> EvalResult<Value> {
    let collection = one(args);
    let pairs = eager_pairs(evaluator, &collection, "sum", location)?;
    let mut total = Value::from(0);
    for (element, _) in pairs {
        total = operators::add(evaluator, vec![total, element], location)?;
    }
    Ok(total)
}

fn extremum(evaluator: &mut Evaluator,
            args: Vec<Value>,
            location: SourceLocation,
            operation: &'static str,
            keep: impl Fn(std::cmp::Ordering) -> bool)
            -> EvalResult<Value> {
    let collection = one(args);
    let pairs = eager_pairs(evaluator, &collection, operation, location)?;

    let mut best: Option<Value> = None;
    for (element, _) in pairs {
        match &best {
            None => best = Some(element),
            Some(current) => {
                let ordering = element.compare(current).ok_or_else(|| {
                                   RuntimeError::TypeMismatch { details: format!("cannot compare \
                                                                                 {} and {}",
                                                                                element.type_name(),
                                                                                current.type_name()),
                                                                location }
                               })?;
                if keep(ordering) {
                    best = Some(element);
                }
            },
        }
    }
    Ok(best.unwrap_or(Value::Nil))
}

pub fn min(evaluator: &mut Evaluator,
           args: Vec<Value>,
           location: SourceLocation)
           -> EvalResult<Value> {
    extremum(evaluator, args, location, "min", std::cmp::Ordering::is_lt)
}

pub fn max(evaluator: &mut Evaluator,
           args: Vec<Value>,
           location: SourceLocation)
           -> EvalResult<Value> {
    extremum(evaluator, args, location, "max", std::cmp::Ordering::is_gt)
}

pub fn contains(_: &mut Evaluator, args: Vec<Value>, location: SourceLocation) -> EvalResult<Value> {
    let (item, collection) = two(args);
    match collection {
        Value::List(items) => Ok(Value::Boolean(items.iter().any(|v| *v == item))),
        Value::Set(set) => Ok(Value::Boolean(set.contains(&item))),
        Value::Dict(dict) => Ok(Value::Boolean(dict.contains_key(&item))),
        Value::Str(s) => match &item {
            Value::Str(needle) => Ok(Value::Boolean(s.contains(needle.as_ref()))),
            other => Err(RuntimeError::TypeMismatch { details: format!("cannot search a String \
                                                                       for a {}",
                                                                      other.type_name()),
                                                      location }),
        },
        other => Err(RuntimeError::TypeMismatch { details: format!("'contains' expects a \
                                                                    collection, found {}",
                                                                   other.type_name()),
                                                  location }),
    }
}

pub fn unique(evaluator: &mut Evaluator,
              args: Vec<Value>,
              location: SourceLocation)
              -> EvalResult<Value> {
    let collection = one(args);
    let pairs = eager_pairs(evaluator, &collection, "unique", location)?;
    let mut seen: Vec<Value> = Vec::new();
    for (element, _) in pairs {
        if !seen.contains(&element) {
            seen.push(element);
        }
    }
    Ok(Value::from(seen))
}

pub fn to_list(evaluator: &mut Evaluator,
               args: Vec<Value>,
               location: SourceLocation)
               -> EvalResult<Value> {
    match one(args) {
        list @ Value::List(_) => Ok(list),
        Value::Dict(dict) => {
            Ok(Value::List(dict.iter()
                               .map(|(k, v)| Value::from(vec![k.clone(), v.clone()]))
                               .collect()))
        },
        other => {
            let pairs = eager_pairs(evaluator, &other, "to_list", location)?;
            Ok(Value::List(pairs.into_iter().map(|(v, _)| v).collect()))
        },
    }
}

pub fn to_set(evaluator: &mut Evaluator,
              args: Vec<Value>,
              location: SourceLocation)
              -> EvalResult<Value> {
    let collection = one(args);
    let pairs = eager_pairs(evaluator, &collection, "to_set", location)?;
    let mut set = SetValue::new();
    for (element, _) in pairs {
        if !element.is_hashable() {
            return Err(RuntimeError::UnhashableKey { type_name: element.type_name(),
                                                     location });
        }
        set.insert_mut(element);
    }
    Ok(Value::Set(set))
}

/// Builds a dictionary from a list of `[key, value]` pairs.
pub fn to_dict(evaluator: &mut Evaluator,
               args: Vec<Value>,
               location: SourceLocation)
               -> EvalResult<Value> {
    match one(args) {
        dict @ Value::Dict(_) => Ok(dict),
        collection => {
            let pairs = eager_pairs(evaluator, &collection, "to_dict", location)?;
            let mut dict = DictValue::new();
            for (element, _) in pairs {
                let Value::List(entry) = &element else {
                    return Err(RuntimeError::TypeMismatch { details: format!("'to_dict' expects \
                                                                              [key, value] \
                                                                              pairs, found {}",
                                                                             element.type_name()),
                                                            location });
                };
                let (Some(key), Some(value), 2) = (entry.front(), entry.get(1), entry.len())
                else {
                    return Err(RuntimeError::TypeMismatch { details: "'to_dict' expects [key, \
                                                                      value] pairs"
                                                                         .to_string(),
                                                            location });
                };
                if !key.is_hashable() {
                    return Err(RuntimeError::UnhashableKey { type_name: key.type_name(),
                                                             location });
                }
                dict.insert_mut(key.clone(), value.clone());
            }
            Ok(Value::Dict(dict))
        },
    }
}

/// Wraps a persistent collection in a single-owner mutable view.
pub fn as_mutable(_: &mut Evaluator,
                  args: Vec<Value>,
                  location: SourceLocation)
                  -> EvalResult<Value> {
    let transient = match one(args) {
        Value::List(items) => TransientValue::List(items),
        Value::Dict(dict) => TransientValue::Dict(dict),
        Value::Set(set) => TransientValue::Set(set),
        other => {
            return Err(RuntimeError::WrongPersistence { details: format!("'asMutable' expects a \
                                                                          persistent collection, \
                                                                          found {}",
                                                                         other.type_name()),
                                                        location });
        },
    };
    Ok(Value::Transient(Rc::new(RefCell::new(transient))))
}

/// Freezes a transient view back into a persistent collection.
pub fn as_immutable(_: &mut Evaluator,
                    args: Vec<Value>,
                    location: SourceLocation)
                    -> EvalResult<Value> {
    match one(args) {
        Value::Transient(inner) => Ok(inner.borrow().to_persistent()),
        other => Err(RuntimeError::WrongPersistence { details: format!("'asImmutable' expects a \
                                                                       transient collection, \
                                                                       found {}",
                                                                      other.type_name()),
                                                      location }),
    }
}
