use std::rc::Rc;

use num_bigint::{BigInt, Sign};
use num_traits::ToPrimitive;

use crate::{
    ast::{Expr, SourceLocation},
    error::RuntimeError,
    interpreter::{
        environment::EnvRef,
        evaluator::core::{flow_value, EvalResult, Evaluator, Flow, TailCall},
        value::{
            core::Value,
            function::{BuiltinArity, Closure, PartialApplication},
            range::RangeValue,
        },
    },
};

/// What a callback invocation produced: a value, or a `break` escaping to
/// the fold-style boundary the caller owns.
pub(crate) enum CallbackFlow {
    Value(Value),
    Break(Value),
}

impl Evaluator {
    /// Evaluates a call expression.
    ///
    /// `&&` and `||` are handled structurally here so the right-hand side
    /// is only evaluated when required; every other operator resolves
    /// through the environment like an ordinary function.
    pub(crate) fn eval_call(&mut self,
                            callee: &Expr,
                            arguments: &[Expr],
                            env: EnvRef,
                            tail: bool,
                            location: SourceLocation)
                            -> EvalResult<Flow> {
        if let Expr::Identifier { name, .. } = callee
            && (name == "&&" || name == "||")
            && arguments.len() == 2
        {
            let left = flow_value!(self.eval_expression(&arguments[0], env, false)?);
            let short_circuits = if name == "&&" {
                !left.is_truthy()
            } else {
                left.is_truthy()
            };
            if short_circuits {
                return Ok(Flow::Value(left));
            }
            let right = flow_value!(self.eval_expression(&arguments[1], env, false)?);
            return Ok(Flow::Value(right));
        }

        let callee = flow_value!(self.eval_expression(callee, env, false)?);
        let mut args = Vec::with_capacity(arguments.len());
        for argument in arguments {
            args.push(flow_value!(self.eval_expression(argument, env, false)?));
        }

        // A complete call to a user function in tail position becomes a
        // tail-call request for the trampoline instead of a native
        // recursion.
        if tail
            && let Value::Function(closure) = &callee
            && args.len() == closure.arity()
            && !args.iter().any(|arg| matches!(arg, Value::Placeholder))
        {
            return Ok(Flow::TailCall(TailCall { closure: Rc::clone(closure),
                                                arguments: args,
                                                location }));
        }

        self.call_value(&callee, args, location)
    }

    /// Applies any callable value to already-evaluated arguments.
    ///
    /// Under-application and placeholder arguments produce a partial
    /// application instead of invoking the callee; this is the single code
    /// path behind both `f(_, y)` and `f(x)` on a binary `f`.
    ///
    /// The returned flow is a value or a `Break` unwinding out of a
    /// callback body; `Return` never escapes a call.
    pub(crate) fn call_value(&mut self,
                             callee: &Value,
                             args: Vec<Value>,
                             location: SourceLocation)
                             -> EvalResult<Flow> {
        match callee {
            Value::Function(closure) => {
                if let Some(partial) = partial_for(callee, &args, closure.arity()) {
                    return Ok(Flow::Value(partial));
                }
                if args.len() > closure.arity() {
                    return Err(RuntimeError::WrongArity { name:     "function".to_string(),
                                                          expected: closure.arity(),
                                                          found:    args.len(),
                                                          location });
                }
                self.apply_closure(Rc::clone(closure), args, location)
            },

            Value::Builtin(def) => {
                if !matches!(def.arity, BuiltinArity::Variadic)
                    && let Some(partial) = partial_for(callee, &args, def.arity.required())
                {
                    return Ok(Flow::Value(partial));
                }
                if !def.arity.accepts(args.len()) {
                    return Err(RuntimeError::WrongArity { name:     def.name.to_string(),
                                                          expected: def.arity.required(),
                                                          found:    args.len(),
                                                          location });
                }
                Ok(Flow::Value((def.func)(self, args, location)?))
            },

            Value::Partial(partial) => {
                let mut filled = partial.args.clone();
                let mut supply = args.into_iter();
                for slot in &mut filled {
                    if matches!(slot, Value::Placeholder) {
                        match supply.next() {
                            Some(arg) => *slot = arg,
                            None => break,
                        }
                    }
                }
                let leftover = supply.count();
                if leftover > 0 {
                    return Err(RuntimeError::WrongArity { name:     "function".to_string(),
                                                          expected: partial.holes(),
                                                          found:    partial.holes() + leftover,
                                                          location });
                }

                if filled.iter().any(|slot| matches!(slot, Value::Placeholder)) {
                    let callee = partial.callee.clone();
                    return Ok(Flow::Value(Value::Partial(Rc::new(PartialApplication {
                        callee,
                        args: filled,
                    }))));
                }
                self.call_value(&partial.callee.clone(), filled, location)
            },

            Value::Composition(chain) => {
                let chain = Rc::clone(chain);
                let mut current: Option<Value> = None;
                for func in chain.iter() {
                    let step_args = match current.take() {
                        None => args.clone(),
                        Some(value) => vec![value],
                    };
                    match self.call_value(func, step_args, location)? {
                        Flow::Value(value) => current = Some(value),
                        other => return Ok(other),
                    }
                }
                Ok(Flow::Value(current.unwrap_or(Value::Nil)))
            },

            other => Err(RuntimeError::NotCallable { type_name: other.type_name(),
                                                     location }),
        }
    }

    /// Applies a callable and requires a plain value back; a `break`
    /// unwinding past this point has left its callback boundary.
    pub(crate) fn call_function(&mut self,
                                callee: &Value,
                                args: Vec<Value>,
                                location: SourceLocation)
                                -> EvalResult<Value> {
        match self.call_value(callee, args, location)? {
            Flow::Value(value) => Ok(value),
            Flow::Break(_) => Err(RuntimeError::BreakOutsideCallback { location }),
            Flow::Return(_) | Flow::TailCall(_) => {
                Err(RuntimeError::DomainError { details:  "unexpected control flow escaped a call"
                                                              .to_string(),
                                                location })
            },
        }
    }

    /// Applies a callback for a fold-style builtin, surfacing `break` to
    /// the caller instead of treating it as an error.
    pub(crate) fn call_callback(&mut self,
                                callee: &Value,
                                args: Vec<Value>,
                                location: SourceLocation)
                                -> EvalResult<CallbackFlow> {
        match self.call_value(callee, args, location)? {
            Flow::Value(value) => Ok(CallbackFlow::Value(value)),
            Flow::Break(value) => Ok(CallbackFlow::Break(value)),
            Flow::Return(_) | Flow::TailCall(_) => {
                Err(RuntimeError::DomainError { details:  "unexpected control flow escaped a call"
                                                              .to_string(),
                                                location })
            },
        }
    }

    /// Runs a closure body, consuming tail-call requests in place.
    ///
    /// The loop re-binds the (possibly different) callee's parameters in a
    /// fresh child scope and restarts the body, so self- and mutual tail
    /// recursion run in constant native stack depth.
    pub(crate) fn apply_closure(&mut self,
                                mut closure: Rc<Closure>,
                                mut args: Vec<Value>,
                                location: SourceLocation)
                                -> EvalResult<Flow> {
        loop {
            if args.len() != closure.arity() {
                return Err(RuntimeError::WrongArity { name:     "function".to_string(),
                                                      expected: closure.arity(),
                                                      found:    args.len(),
                                                      location });
            }

            let env = self.envs.child(closure.env);
            let parameters = Rc::clone(&closure.parameters);
            for (parameter, arg) in parameters.iter().zip(&args) {
                let Some(bindings) = self.match_pattern(parameter, arg, env)? else {
                    return Err(RuntimeError::UnmatchedPattern { location:
                                                                    parameter.location() });
                };
                self.declare_bindings(bindings, env, false, parameter.location())?;
            }

            let body = Rc::clone(&closure.body);
            match self.eval_block(&body, env, true)? {
                Flow::Value(value) | Flow::Return(value) => return Ok(Flow::Value(value)),
                Flow::Break(value) => return Ok(Flow::Break(value)),
                Flow::TailCall(tail) => {
                    closure = tail.closure;
                    args = tail.arguments;
                },
            }
        }
    }

    /// The declared parameter count of a callable, used by higher-order
    /// builtins to decide whether to pass positional context to callbacks.
    #[must_use]
    pub(crate) fn callback_arity(&self, callee: &Value) -> usize {
        match callee {
            Value::Function(closure) => closure.arity(),
            Value::Builtin(def) => def.arity.required(),
            Value::Partial(partial) => partial.holes(),
            Value::Composition(chain) => {
                chain.first().map_or(0, |first| self.callback_arity(first))
            },
            _ => 0,
        }
    }

    /// Indexes into a collection; shared by `receiver[index]` syntax and
    /// the `get` builtin.
    pub(crate) fn index_value(&mut self,
                              receiver: &Value,
                              index: &Value,
                              location: SourceLocation)
                              -> EvalResult<Value> {
        match (receiver, index) {
            (Value::List(items), Value::Integer(position)) => {
                Ok(list_position(items.len(), position).and_then(|i| items.get(i).cloned())
                                                       .unwrap_or(Value::Nil))
            },

            (Value::List(items), Value::Range(range)) => {
                Ok(Value::List(slice_indices(range, items.len()).into_iter()
                                                                .filter_map(|i| {
                                                                    items.get(i).cloned()
                                                                })
                                                                .collect()))
            },

            (Value::Str(s), Value::Integer(position)) => {
                let count = s.chars().count();
                Ok(list_position(count, position).and_then(|i| s.chars().nth(i))
                                                 .map_or(Value::Nil, |c| {
                                                     Value::from(c.to_string())
                                                 }))
            },

            (Value::Str(s), Value::Range(range)) => {
                let chars: Vec<char> = s.chars().collect();
                let sliced: String = slice_indices(range, chars.len()).into_iter()
                                                                      .map(|i| chars[i])
                                                                      .collect();
                Ok(Value::from(sliced))
            },

            (Value::Dict(dict), key) => {
                if !key.is_hashable() {
                    return Err(RuntimeError::UnhashableKey { type_name: key.type_name(),
                                                             location });
                }
                Ok(dict.get(key).cloned().unwrap_or(Value::Nil))
            },

            (Value::Set(set), key) => {
                if !key.is_hashable() {
                    return Err(RuntimeError::UnhashableKey { type_name: key.type_name(),
                                                             location });
                }
                Ok(Value::Boolean(set.contains(key)))
            },

            (receiver, index) => {
                Err(RuntimeError::TypeMismatch { details:  format!("cannot index a {} with a {}",
                                                                   receiver.type_name(),
                                                                   index.type_name()),
                                                 location })
            },
        }
    }
}

/// Builds the padded partial application for an under-applied or
/// placeholder-bearing call, or `None` when the call is complete.
fn partial_for(callee: &Value, args: &[Value], arity: usize) -> Option<Value> {
    let has_holes = args.iter().any(|arg| matches!(arg, Value::Placeholder));
    if !has_holes && args.len() >= arity {
        return None;
    }
    if args.len() > arity {
        // Too many arguments is an arity error, not a partial.
        return None;
    }

    let mut slots = args.to_vec();
    slots.resize(arity, Value::Placeholder);
    Some(Value::Partial(Rc::new(PartialApplication { callee: callee.clone(),
                                                     args:   slots })))
}

/// Resolves a (possibly negative) integer position within `len` elements.
fn list_position(len: usize, position: &BigInt) -> Option<usize> {
    if position.sign() == Sign::Minus {
        let back = (-position).to_usize()?;
        len.checked_sub(back)
    } else {
        position.to_usize().filter(|i| *i < len)
    }
}

/// The element indices selected by a range used as a slice.
///
/// Endpoints are resolved once against `len` (negative endpoints count from
/// the back); an open end runs to the edge the step walks towards.
fn slice_indices(range: &RangeValue, len: usize) -> Vec<usize> {
    let len = i128::try_from(len).unwrap_or(i128::MAX);
    let resolve = |value: &BigInt| {
        let value = value.to_i128().unwrap_or(i128::MAX);
        if value < 0 { len + value } else { value }
    };

    let step = range.step.to_i128().unwrap_or(1);
    if step == 0 {
        return Vec::new();
    }
    let start = resolve(&range.start);
    let (end, inclusive) = match &range.end {
        Some(end) => (resolve(end), range.inclusive),
        None => (if step > 0 { len - 1 } else { 0 }, true),
    };

    let mut indices = Vec::new();
    let mut position = start;
    loop {
        let within = match (step > 0, inclusive) {
            (true, true) => position <= end,
            (true, false) => position < end,
            (false, true) => position >= end,
            (false, false) => position > end,
        };
        if !within {
            break;
        }
        if (0..len).contains(&position) {
            #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
            indices.push(position as usize);
        } else if (step > 0 && position >= len) || (step < 0 && position < 0) {
            break;
        }
        position += step;
    }
    indices
}
