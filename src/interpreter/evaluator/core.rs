use std::rc::Rc;

use ordered_float::OrderedFloat;

use im_rc::Vector;

use crate::{
    ast::{Block, Expr, PrefixOperator, Program, SourceLocation, Statement, StringPart},
    error::RuntimeError,
    interpreter::{
        environment::{AssignOutcome, EnvArena, EnvRef, Section},
        evaluator::builtin,
        io::IoHandle,
        value::{
            core::Value,
            dict::{DictValue, SetValue},
            function::Closure,
            range::RangeValue,
        },
    },
};

/// Result type used by the evaluator.
///
/// All evaluation functions return either a `T` or a `RuntimeError`
/// describing the failure; errors short-circuit every enclosing expression.
pub type EvalResult<T> = Result<T, RuntimeError>;

/// What flowed out of evaluating a node: a plain value, or a control-flow
/// carrier on its way to the construct that absorbs it.
///
/// `Return` is absorbed by function application, `Break` by the nearest
/// fold-style callback boundary, and `TailCall` by the trampoline in
/// [`Evaluator::apply_closure`]. None of these ever reach user code.
#[derive(Debug, Clone)]
pub enum Flow {
    Value(Value),
    Return(Value),
    Break(Value),
    TailCall(TailCall),
}

/// A pending self- or mutual-recursive call, unwound into iteration by the
/// trampoline instead of growing the native stack.
#[derive(Debug, Clone)]
pub struct TailCall {
    pub closure:   Rc<Closure>,
    pub arguments: Vec<Value>,
    pub location:  SourceLocation,
}

/// Extracts the value from a [`Flow`], or returns the carrier to the
/// enclosing evaluation.
macro_rules! flow_value {
    ($flow:expr) => {
        match $flow {
            $crate::interpreter::evaluator::core::Flow::Value(value) => value,
            other => return Ok(other),
        }
    };
}
pub(crate) use flow_value;

/// The tree-walking evaluator.
///
/// Owns the scope arena and the injected I/O handle for the duration of one
/// run.
pub struct Evaluator {
    pub envs: EnvArena,
    io:       Rc<dyn IoHandle>,
    root:     EnvRef,
}

impl Evaluator {
    /// Creates an evaluator whose root scope holds the builtin library.
    #[must_use]
    pub fn new(io: Rc<dyn IoHandle>) -> Self {
        let mut envs = EnvArena::new();
        let root = envs.root();
        builtin::register(&mut envs, root);

        Self { envs, io, root }
    }

    /// The injected I/O handle.
    #[must_use]
    pub fn io(&self) -> Rc<dyn IoHandle> {
        Rc::clone(&self.io)
    }

    /// Creates the scope a program should evaluate in: a child of the
    /// builtin scope, so user bindings may shadow builtins.
    pub fn program_env(&mut self) -> EnvRef {
        self.envs.child(self.root)
    }

    /// Evaluates a whole program, producing the value of its final
    /// statement.
    pub fn eval_program(&mut self, program: &Program, env: EnvRef) -> EvalResult<Value> {
        let mut result = Value::Nil;
        for statement in &program.statements {
            match self.eval_statement(statement, env, false)? {
                Flow::Value(value) => result = value,
                Flow::Return(value) => return Ok(value),
                Flow::Break(_) => {
                    return Err(RuntimeError::BreakOutsideCallback { location:
                                                                        statement.location() });
                },
                // Only tail positions inside a function body emit these.
                Flow::TailCall(tail) => {
                    result = flow_into_value(self.apply_closure(tail.closure,
                                                                tail.arguments,
                                                                tail.location)?,
                                             tail.location)?;
                },
            }
        }
        Ok(result)
    }

    /// Evaluates the statements of a block in `env`.
    ///
    /// The block's value is its final statement's value; carriers stop the
    /// block early and propagate. With `tail` set, the final statement is
    /// in tail position.
    pub(crate) fn eval_block(&mut self, block: &Block, env: EnvRef, tail: bool) -> EvalResult<Flow> {
        let mut result = Value::Nil;
        let last = block.statements.len().saturating_sub(1);
        for (index, statement) in block.statements.iter().enumerate() {
            match self.eval_statement(statement, env, tail && index == last)? {
                Flow::Value(value) => result = value,
                other => return Ok(other),
            }
        }
        Ok(Flow::Value(result))
    }

    /// Evaluates a single statement.
    fn eval_statement(&mut self,
                      statement: &Statement,
                      env: EnvRef,
                      tail: bool)
                      -> EvalResult<Flow> {
        match statement {
            Statement::Let { mutable, pattern, value, location } => {
                let value = flow_value!(self.eval_expression(value, env, false)?);
                let Some(bindings) = self.match_pattern(pattern, &value, env)? else {
                    return Err(RuntimeError::UnmatchedPattern { location: pattern.location() });
                };
                self.declare_bindings(bindings, env, *mutable, *location)?;
                Ok(Flow::Value(value))
            },

            Statement::Return { value, .. } => {
                match self.eval_expression(value, env, tail)? {
                    Flow::Value(value) => Ok(Flow::Return(value)),
                    other => Ok(other),
                }
            },

            Statement::Break { value, .. } => {
                let value = flow_value!(self.eval_expression(value, env, false)?);
                Ok(Flow::Break(value))
            },

            Statement::Section { name, body, location } => {
                self.declare_section(name, body, false, *location, env);
                Ok(Flow::Value(Value::Nil))
            },

            Statement::Annotated { target, .. } => {
                // `@slow` is the only annotation; it marks the section it
                // precedes.
                if let Statement::Section { name, body, location } = target.as_ref() {
                    self.declare_section(name, body, true, *location, env);
                    return Ok(Flow::Value(Value::Nil));
                }
                self.eval_statement(target, env, tail)
            },

            Statement::Expression { expr, .. } => self.eval_expression(expr, env, tail),
        }
    }

    fn declare_section(&mut self,
                       name: &str,
                       body: &Block,
                       slow: bool,
                       location: SourceLocation,
                       env: EnvRef) {
        self.envs.add_section(env,
                              Section { name: name.to_string(),
                                        body: Rc::new(body.clone()),
                                        slow,
                                        location });
    }

    /// Declares pattern bindings into `env`, rejecting same-scope
    /// redeclaration.
    pub(crate) fn declare_bindings(&mut self,
                                   bindings: Vec<(String, Value)>,
                                   env: EnvRef,
                                   mutable: bool,
                                   location: SourceLocation)
                                   -> EvalResult<()> {
        for (name, value) in bindings {
            if self.envs.declared_here(env, &name) {
                return Err(RuntimeError::Redeclaration { name, location });
            }
            self.envs.declare(env, &name, value, mutable);
        }
        Ok(())
    }

    /// Evaluates an expression node.
    pub(crate) fn eval_expression(&mut self,
                                  expr: &Expr,
                                  env: EnvRef,
                                  tail: bool)
                                  -> EvalResult<Flow> {
        match expr {
            Expr::Integer { value, .. } => Ok(Flow::Value(Value::Integer(value.clone()))),
            Expr::Decimal { value, .. } => Ok(Flow::Value(Value::Decimal(OrderedFloat(*value)))),
            Expr::Boolean { value, .. } => Ok(Flow::Value(Value::Boolean(*value))),
            Expr::Nil { .. } => Ok(Flow::Value(Value::Nil)),
            Expr::Placeholder { .. } => Ok(Flow::Value(Value::Placeholder)),

            Expr::StringLit { parts, .. } => self.eval_string(parts, env),

            Expr::Identifier { name, location } => {
                match self.envs.lookup(env, name) {
                    Some(value) => Ok(Flow::Value(value.clone())),
                    None => Err(RuntimeError::UnknownIdentifier { name:     name.clone(),
                                                                  location: *location }),
                }
            },

            Expr::List { elements, .. } => {
                let mut items = Vector::new();
                for element in elements {
                    items.push_back(flow_value!(self.eval_expression(element, env, false)?));
                }
                Ok(Flow::Value(Value::List(items)))
            },

            Expr::Dict { entries, .. } => {
                let mut dict = DictValue::new();
                for (key_expr, value_expr) in entries {
                    let key = flow_value!(self.eval_expression(key_expr, env, false)?);
                    if !key.is_hashable() {
                        return Err(RuntimeError::UnhashableKey { type_name: key.type_name(),
                                                                 location:  key_expr.location() });
                    }
                    let value = flow_value!(self.eval_expression(value_expr, env, false)?);
                    dict.insert_mut(key, value);
                }
                Ok(Flow::Value(Value::Dict(dict)))
            },

            Expr::Set { elements, .. } => {
                let mut set = SetValue::new();
                for element in elements {
                    let value = flow_value!(self.eval_expression(element, env, false)?);
                    if !value.is_hashable() {
                        return Err(RuntimeError::UnhashableKey { type_name: value.type_name(),
                                                                 location:  element.location() });
                    }
                    set.insert_mut(value);
                }
                Ok(Flow::Value(Value::Set(set)))
            },

            Expr::Range { start, end, inclusive, location } => {
                let start_value = flow_value!(self.eval_expression(start, env, false)?);
                let end_value = match end {
                    Some(end) => Some(flow_value!(self.eval_expression(end, env, false)?)),
                    None => None,
                };
                Ok(Flow::Value(build_range(start_value, end_value, *inclusive, *location)?))
            },

            Expr::Function { parameters, body, location } => {
                let closure = Closure { parameters: Rc::new(parameters.clone()),
                                        body:       Rc::new(body.clone()),
                                        env,
                                        location:   *location, };
                Ok(Flow::Value(Value::Function(Rc::new(closure))))
            },

            Expr::Prefix { operator, operand, location } => {
                let value = flow_value!(self.eval_expression(operand, env, false)?);
                Ok(Flow::Value(eval_prefix(*operator, value, *location)?))
            },

            Expr::Assign { target, value, location } => {
                let Expr::Identifier { name, .. } = target.as_ref() else {
                    return Err(RuntimeError::TypeMismatch { details:  "only names can be assigned \
                                                                      to"
                                                                               .to_string(),
                                                            location: *location, });
                };
                let value = flow_value!(self.eval_expression(value, env, false)?);
                match self.envs.assign(env, name, value.clone()) {
                    AssignOutcome::Assigned => Ok(Flow::Value(value)),
                    AssignOutcome::Immutable => {
                        Err(RuntimeError::AssignToImmutable { name:     name.clone(),
                                                              location: *location })
                    },
                    AssignOutcome::NotFound => {
                        Err(RuntimeError::AssignToUnbound { name:     name.clone(),
                                                            location: *location })
                    },
                }
            },

            Expr::Index { receiver, index, location } => {
                let receiver = flow_value!(self.eval_expression(receiver, env, false)?);
                let index = flow_value!(self.eval_expression(index, env, false)?);
                Ok(Flow::Value(self.index_value(&receiver, &index, *location)?))
            },

            Expr::If { condition, consequence, alternative, .. } => {
                let condition = flow_value!(self.eval_expression(condition, env, false)?);
                if condition.is_truthy() {
                    let child = self.envs.child(env);
                    self.eval_block(consequence, child, tail)
                } else if let Some(alternative) = alternative {
                    let child = self.envs.child(env);
                    self.eval_block(alternative, child, tail)
                } else {
                    Ok(Flow::Value(Value::Nil))
                }
            },

            Expr::Match { subject, arms, .. } => {
                let candidate = flow_value!(self.eval_expression(subject, env, false)?);
                for arm in arms {
                    let child = self.envs.child(env);
                    let Some(bindings) = self.match_pattern(&arm.pattern, &candidate, child)?
                    else {
                        continue;
                    };
                    self.declare_bindings(bindings, child, false, arm.location)?;
                    if let Some(guard) = &arm.guard {
                        let guard = flow_value!(self.eval_expression(guard, child, false)?);
                        if !guard.is_truthy() {
                            continue;
                        }
                    }
                    return self.eval_block(&arm.body, child, tail);
                }
                Err(RuntimeError::UnmatchedPattern { location: subject.location() })
            },

            Expr::Call { callee, arguments, location } => {
                self.eval_call(callee, arguments, env, tail, *location)
            },
        }
    }

    /// Builds a string from its literal and interpolated parts. Interpolated
    /// values render like `puts` output: strings bare, everything else in
    /// canonical form.
    fn eval_string(&mut self, parts: &[StringPart], env: EnvRef) -> EvalResult<Flow> {
        if let [StringPart::Text(text)] = parts {
            return Ok(Flow::Value(Value::from(text.as_str())));
        }

        let mut out = String::new();
        for part in parts {
            match part {
                StringPart::Text(text) => out.push_str(text),
                StringPart::Interpolation(expr) => {
                    let value = flow_value!(self.eval_expression(expr, env, false)?);
                    out.push_str(&value.to_string());
                },
            }
        }
        Ok(Flow::Value(Value::from(out)))
    }

}

fn eval_prefix(operator: PrefixOperator,
               value: Value,
               location: SourceLocation)
               -> EvalResult<Value> {
    match (operator, value) {
        (PrefixOperator::Not, value) => Ok(Value::Boolean(!value.is_truthy())),
        (PrefixOperator::Negate, Value::Integer(n)) => Ok(Value::Integer(-n)),
        (PrefixOperator::Negate, Value::Decimal(d)) => Ok(Value::Decimal(-d)),
        (PrefixOperator::Negate, value) => {
            Err(RuntimeError::TypeMismatch { details:  format!("cannot negate a {}",
                                                               value.type_name()),
                                             location })
        },
    }
}

fn build_range(start: Value,
               end: Option<Value>,
               inclusive: bool,
               location: SourceLocation)
               -> EvalResult<Value> {
    let Value::Integer(start) = start else {
        return Err(RuntimeError::TypeMismatch { details:  format!("range bounds must be \
                                                                   Integers, found {}",
                                                                  start.type_name()),
                                                location });
    };
    let end = match end {
        Some(Value::Integer(end)) => Some(end),
        Some(other) => {
            return Err(RuntimeError::TypeMismatch { details:  format!("range bounds must be \
                                                                       Integers, found {}",
                                                                      other.type_name()),
                                                    location });
        },
        None => None,
    };
    Ok(Value::Range(Rc::new(RangeValue::new(start, end, inclusive))))
}

/// Unwraps a flow that must be a plain value; stray carriers at the top of
/// a run are reported as errors rather than reaching the embedding.
pub(crate) fn flow_into_value(flow: Flow, location: SourceLocation) -> EvalResult<Value> {
    match flow {
        Flow::Value(value) | Flow::Return(value) => Ok(value),
        Flow::Break(_) => Err(RuntimeError::BreakOutsideCallback { location }),
        Flow::TailCall(_) => Err(RuntimeError::DomainError { details:  "unexpected tail call \
                                                                       outside a function body"
                                                                                .to_string(),
                                                             location }),
    }
}
