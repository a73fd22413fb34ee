use std::cmp::Ordering;

use super::{ArgsValidator, Function, FunctionRegistry};
use crate::{
    evaluator::EvalError,
    value::{Type, Value},
};

pub(super) fn register(registry: &mut FunctionRegistry) {
    registry.register(Function::new("len", ArgsValidator::Exactly(1), |_, args| {
        Ok(Value::int(args[0].len()? as i64))
    }));
    registry.register(Function::new("add", ArgsValidator::Min(1), |_, args| {
        total("add", args)
    }));
    registry.register(Function::new("sum", ArgsValidator::Min(1), |_, args| {
        total("sum", args)
    }));
    registry.register(Function::new("max", ArgsValidator::Min(1), |_, args| {
        extreme("max", args, Ordering::Greater)
    }));
    registry.register(Function::new("min", ArgsValidator::Min(1), |_, args| {
        extreme("min", args, Ordering::Less)
    }));
}

fn expect_numbers(function: &str, args: &[Value]) -> Result<(), EvalError> {
    for arg in args {
        if !matches!(arg.kind(), Type::Int | Type::Float) {
            return Err(EvalError::InvalidArgument(format!(
                "{function} expects numbers, got {}",
                arg.kind()
            )));
        }
    }
    Ok(())
}

/// Int if every argument is an int, float otherwise.
fn total(function: &str, args: &[Value]) -> Result<Value, EvalError> {
    expect_numbers(function, args)?;
    let mut sum = Value::int(0);
    for arg in args {
        sum = sum.add(arg)?;
    }
    Ok(sum)
}

/// The first argument that wins against all others in `direction`, as a
/// float when any argument is a float.
fn extreme(function: &str, args: &[Value], direction: Ordering) -> Result<Value, EvalError> {
    expect_numbers(function, args)?;

    let mut best = &args[0];
    for arg in &args[1..] {
        if arg.compare(best) == direction {
            best = arg;
        }
    }

    if best.kind() == Type::Int && args.iter().any(|a| a.kind() == Type::Float) {
        return Ok(Value::float(best.as_int()? as f64));
    }
    Ok(best.deep_copy())
}
