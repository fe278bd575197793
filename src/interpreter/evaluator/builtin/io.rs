use crate::{
    ast::SourceLocation,
    error::RuntimeError,
    interpreter::{
        evaluator::{
            builtin::one,
            core::{EvalResult, Evaluator},
        },
        value::core::Value,
    },
};

/// Emits one line through the injected I/O handle.
///
/// The zero-argument call is a no-op and produces no output event at all.
pub fn puts(evaluator: &mut Evaluator, args: Vec<Value>, _: SourceLocation) -> EvalResult<Value> {
    if args.is_empty() {
        return Ok(Value::Nil);
    }

    let rendered: Vec<String> = args.iter().map(Value::to_string).collect();
    evaluator.io().output(&rendered);
    Ok(Value::Nil)
}

/// Resolves a resource path through the injected I/O handle.
pub fn read(evaluator: &mut Evaluator,
            args: Vec<Value>,
            location: SourceLocation)
            -> EvalResult<Value> {
    let Value::Str(path) = one(args) else {
        return Err(RuntimeError::TypeMismatch { details:  "'read' expects a String path"
                                                              .to_string(),
                                                location });
    };

    match evaluator.io().input(&path) {
        Ok(contents) => Ok(Value::from(contents)),
        Err(details) => Err(RuntimeError::Io { details, location }),
    }
}
