use crate::{
    ast::SourceLocation,
    error::RuntimeError,
    interpreter::{
        evaluator::core::{EvalResult, Evaluator},
        value::core::Value,
    },
};

/// The type name of a value, as a string.
pub fn type_of(_: &mut Evaluator, args: Vec<Value>, _: SourceLocation) -> EvalResult<Value> {
    let value = args.into_iter().next().unwrap_or(Value::Nil);
    Ok(Value::from(value.type_name()))
}

/// Fails the run with a domain error when the condition is falsy. The
/// optional second argument becomes the failure message.
pub fn assert(_: &mut Evaluator, args: Vec<Value>, location: SourceLocation) -> EvalResult<Value> {
    let mut args = args.into_iter();
    let condition = args.next().unwrap_or(Value::Nil);
    let message = args.next();

    if condition.is_truthy() {
        return Ok(Value::Nil);
    }
    Err(RuntimeError::AssertionFailed { message: message.map(|m| m.to_string()),
                                        location })
}
