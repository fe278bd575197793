use std::cell::RefCell;
use std::rc::Rc;

use num_bigint::BigInt;

use crate::{
    ast::SourceLocation,
    interpreter::{
        evaluator::core::{EvalResult, Evaluator},
        value::{core::Value, range::RangeIter},
    },
};

/// Shared handle to a lazy sequence.
pub type SequenceHandle = Rc<RefCell<Sequence>>;

/// A lazy stream of values with a memoisation buffer.
///
/// Elements are produced on demand and recorded in `memo`, so every consumer
/// observes the same values in the same order and nothing is recomputed.
#[derive(Debug)]
pub struct Sequence {
    /// Taken while an element is being produced, so re-entrant reads of the
    /// same sequence observe only the memoised prefix.
    source:    Option<SequenceSource>,
    memo:      Vec<Value>,
    done:      bool,
    unbounded: bool,
}

impl Sequence {
    /// Wraps a producer into a shareable sequence handle.
    #[must_use]
    pub fn new(source: SequenceSource) -> SequenceHandle {
        let unbounded = source.unbounded();
        Rc::new(RefCell::new(Self { source: Some(source),
                                    memo: Vec::new(),
                                    done: false,
                                    unbounded }))
    }

    /// Whether producing all elements may never terminate.
    #[must_use]
    pub fn is_unbounded(handle: &SequenceHandle) -> bool {
        handle.borrow().unbounded
    }

    /// The element at `index`, materialising and memoising as needed.
    /// `None` once the sequence is exhausted before `index`.
    pub fn get(handle: &SequenceHandle,
               index: usize,
               evaluator: &mut Evaluator,
               location: SourceLocation)
               -> EvalResult<Option<Value>> {
        loop {
            {
                let sequence = handle.borrow();
                if index < sequence.memo.len() {
                    return Ok(Some(sequence.memo[index].clone()));
                }
                if sequence.done {
                    return Ok(None);
                }
            }

            let Some(mut source) = handle.borrow_mut().source.take() else {
                // A callback is already producing from this sequence; only
                // the memoised prefix is visible to it.
                return Ok(None);
            };
            let produced = source.next(evaluator, location);

            let mut sequence = handle.borrow_mut();
            sequence.source = Some(source);
            match produced? {
                Some(value) => sequence.memo.push(value),
                None => sequence.done = true,
            }
        }
    }

}

/// The producing half of a sequence: where the next element comes from.
#[derive(Debug)]
pub enum SequenceSource {
    /// The elements of a range, yielded as integers.
    Range(RangeIter),
    /// `iterate(f, seed)`: seed, f(seed), f(f(seed)), …
    Iterate {
        func:    Value,
        current: Value,
        started: bool,
    },
    /// A finite, already-materialised item list.
    Items { items: Vec<Value>, index: usize },
    /// Endless repetition of a finite item list.
    Cycle { items: Vec<Value>, index: usize },
    /// Endless repetition of one value.
    Repeat { value: Value },
    /// Reads an existing sequence through its shared memo.
    Handle {
        handle: SequenceHandle,
        index:  usize,
    },
    /// Applies `func` to each inner element.
    Map {
        inner:   Box<SequenceSource>,
        func:    Value,
        emitted: usize,
    },
    /// Keeps inner elements on which `func` is truthy.
    Filter {
        inner:    Box<SequenceSource>,
        func:     Value,
        consumed: usize,
    },
    /// Pairs up elements of several sources, ending with the shortest.
    Zip { inners: Vec<SequenceSource> },
    /// Discards a fixed prefix of the inner source.
    Drop {
        inner:     Box<SequenceSource>,
        remaining: usize,
    },
}

impl SequenceSource {
    /// Whether fully draining this source may never terminate.
    #[must_use]
    pub fn unbounded(&self) -> bool {
        match self {
            Self::Range(iter) => iter.is_unbounded(),
            Self::Items { .. } => false,
            Self::Iterate { .. } | Self::Repeat { .. } => true,
            Self::Cycle { items, .. } => !items.is_empty(),
            Self::Handle { handle, .. } => Sequence::is_unbounded(handle),
            Self::Map { inner, .. } | Self::Filter { inner, .. } | Self::Drop { inner, .. } => {
                inner.unbounded()
            },
            Self::Zip { inners } => inners.iter().all(Self::unbounded),
        }
    }

    /// Produces the next element, or `None` when the source is exhausted.
    pub fn next(&mut self,
                evaluator: &mut Evaluator,
                location: SourceLocation)
                -> EvalResult<Option<Value>> {
        match self {
            Self::Range(iter) => Ok(iter.next().map(Value::Integer)),

            Self::Items { items, index } => {
                let value = items.get(*index).cloned();
                if value.is_some() {
                    *index += 1;
                }
                Ok(value)
            },

            Self::Iterate { func, current, started } => {
                if !*started {
                    *started = true;
                    return Ok(Some(current.clone()));
                }
                let next = evaluator.call_function(&func.clone(),
                                                   vec![current.clone()],
                                                   location)?;
                *current = next.clone();
                Ok(Some(next))
            },

            Self::Cycle { items, index } => {
                if items.is_empty() {
                    return Ok(None);
                }
                let value = items[*index % items.len()].clone();
                *index += 1;
                Ok(Some(value))
            },

            Self::Repeat { value } => Ok(Some(value.clone())),

            Self::Handle { handle, index } => {
                let value = Sequence::get(&handle.clone(), *index, evaluator, location)?;
                if value.is_some() {
                    *index += 1;
                }
                Ok(value)
            },

            Self::Map { inner, func, emitted } => {
                let Some(value) = inner.next(evaluator, location)? else {
                    return Ok(None);
                };
                let func = func.clone();
                let args = callback_args(evaluator, &func, value, *emitted);
                *emitted += 1;
                Ok(Some(evaluator.call_function(&func, args, location)?))
            },

            Self::Filter { inner, func, consumed } => loop {
                let Some(value) = inner.next(evaluator, location)? else {
                    return Ok(None);
                };
                let func = func.clone();
                let args = callback_args(evaluator, &func, value.clone(), *consumed);
                *consumed += 1;
                if evaluator.call_function(&func, args, location)?.is_truthy() {
                    return Ok(Some(value));
                }
            },

            Self::Zip { inners } => {
                let mut items = Vec::with_capacity(inners.len());
                for inner in inners.iter_mut() {
                    match inner.next(evaluator, location)? {
                        Some(value) => items.push(value),
                        None => return Ok(None),
                    }
                }
                Ok(Some(Value::List(items.into_iter().collect())))
            },

            Self::Drop { inner, remaining } => {
                while *remaining > 0 {
                    if inner.next(evaluator, location)?.is_none() {
                        return Ok(None);
                    }
                    *remaining -= 1;
                }
                inner.next(evaluator, location)
            },
        }
    }
}

/// Builds the argument list for a higher-order callback: the element alone,
/// or element plus position when the callback declares a second parameter.
fn callback_args(evaluator: &Evaluator, func: &Value, value: Value, position: usize) -> Vec<Value> {
    if evaluator.callback_arity(func) >= 2 {
        vec![value, Value::Integer(BigInt::from(position))]
    } else {
        vec![value]
    }
}

