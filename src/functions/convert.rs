use super::{ArgsValidator, Function, FunctionRegistry};
use crate::{
    evaluator::EvalError,
    value::{Data, Value},
};

pub(super) fn register(registry: &mut FunctionRegistry) {
    registry.register(Function::new("toString", ArgsValidator::Exactly(1), |_, args| {
        to_string(&args[0]).map(Value::string)
    }));
    registry.register(Function::new("toInt", ArgsValidator::Exactly(1), |_, args| {
        to_int(&args[0]).map(Value::int)
    }));
    registry.register(Function::new("toFloat", ArgsValidator::Exactly(1), |_, args| {
        to_float(&args[0]).map(Value::float)
    }));
    registry.register(Function::new("typeOf", ArgsValidator::Exactly(1), |_, args| {
        Ok(Value::string(args[0].kind().as_str()))
    }));
}

fn cannot_convert(value: &Value, target: &str) -> EvalError {
    EvalError::InvalidArgument(format!("cannot convert {} to {target}", value.kind()))
}

fn to_string(value: &Value) -> Result<String, EvalError> {
    match value.data() {
        Data::String(s) => Ok(s),
        Data::Int(i) => Ok(i.to_string()),
        Data::Float(f) => Ok(f.to_string()),
        Data::Bool(b) => Ok(b.to_string()),
        Data::Null => Ok("null".to_string()),
        Data::Slice(_) | Data::Map(_) => Err(cannot_convert(value, "string")),
    }
}

/// Floats truncate toward zero; strings are trimmed and parsed.
fn to_int(value: &Value) -> Result<i64, EvalError> {
    match value.data() {
        Data::Int(i) => Ok(i),
        Data::Float(f) => Ok(f.trunc() as i64),
        Data::Bool(b) => Ok(i64::from(b)),
        Data::String(s) => s
            .trim()
            .parse()
            .map_err(|_| EvalError::InvalidArgument(format!("cannot convert {s:?} to int"))),
        Data::Null | Data::Slice(_) | Data::Map(_) => Err(cannot_convert(value, "int")),
    }
}

fn to_float(value: &Value) -> Result<f64, EvalError> {
    match value.data() {
        Data::Float(f) => Ok(f),
        Data::Int(i) => Ok(i as f64),
        Data::Bool(b) => Ok(if b { 1.0 } else { 0.0 }),
        Data::String(s) => s
            .trim()
            .parse()
            .map_err(|_| EvalError::InvalidArgument(format!("cannot convert {s:?} to float"))),
        Data::Null | Data::Slice(_) | Data::Map(_) => Err(cannot_convert(value, "float")),
    }
}
