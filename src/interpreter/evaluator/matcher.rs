use crate::{
    ast::{Expr, Pattern},
    error::RuntimeError,
    interpreter::{
        environment::EnvRef,
        evaluator::core::{EvalResult, Evaluator, Flow},
        value::core::Value,
    },
};

impl Evaluator {
    /// Matches a pattern against a candidate value.
    ///
    /// `Some(bindings)` lists the names the pattern introduces, in source
    /// order; `None` means the candidate does not match. Guards are not
    /// handled here: a `match` arm evaluates its guard after declaring
    /// these bindings into the arm's scope.
    pub(crate) fn match_pattern(&mut self,
                                pattern: &Pattern,
                                candidate: &Value,
                                env: EnvRef)
                                -> EvalResult<Option<Vec<(String, Value)>>> {
        match pattern {
            Pattern::Identifier { name, .. } => {
                Ok(Some(vec![(name.clone(), candidate.clone())]))
            },

            Pattern::Wildcard { .. } => Ok(Some(Vec::new())),

            Pattern::Literal { value, .. } => {
                let expected = self.eval_pattern_expr(value, env)?;
                Ok((expected == *candidate).then(Vec::new))
            },

            Pattern::List { elements, rest, .. } => {
                let Value::List(items) = candidate else {
                    return Ok(None);
                };

                match rest {
                    None if items.len() != elements.len() => return Ok(None),
                    Some(_) if items.len() < elements.len() => return Ok(None),
                    _ => {},
                }

                let mut bindings = Vec::new();
                for (element, item) in elements.iter().zip(items.iter()) {
                    let Some(nested) = self.match_pattern(element, item, env)? else {
                        return Ok(None);
                    };
                    bindings.extend(nested);
                }

                if let Some(rest) = rest
                    && let Some(name) = &rest.name
                {
                    let tail = items.clone().split_off(elements.len());
                    bindings.push((name.clone(), Value::List(tail)));
                }
                Ok(Some(bindings))
            },

            Pattern::Dict { entries, .. } => {
                let Value::Dict(dict) = candidate else {
                    return Ok(None);
                };

                let mut bindings = Vec::new();
                for (key_expr, sub_pattern) in entries {
                    let key = self.eval_pattern_expr(key_expr, env)?;
                    if !key.is_hashable() {
                        return Err(RuntimeError::UnhashableKey { type_name: key.type_name(),
                                                                 location:  key_expr.location() });
                    }
                    let Some(value) = dict.get(&key).cloned() else {
                        return Ok(None);
                    };
                    let Some(nested) = self.match_pattern(sub_pattern, &value, env)? else {
                        return Ok(None);
                    };
                    bindings.extend(nested);
                }
                Ok(Some(bindings))
            },
        }
    }

    /// Evaluates the restricted expressions patterns may embed: literals
    /// and negated numbers. These cannot produce control-flow carriers.
    fn eval_pattern_expr(&mut self, expr: &Expr, env: EnvRef) -> EvalResult<Value> {
        match self.eval_expression(expr, env, false)? {
            Flow::Value(value) => Ok(value),
            _ => Err(RuntimeError::DomainError { details:  "unexpected control flow in a pattern \
                                                           literal"
                                                               .to_string(),
                                                 location: expr.location(), }),
        }
    }
}
