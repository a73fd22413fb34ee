use std::fs;

use base64::{Engine as _, engine::general_purpose::STANDARD};

use super::{ArgsValidator, Function, FunctionRegistry};
use crate::{
    evaluator::EvalError,
    format::{Format, new_reader},
    value::Value,
};

pub(super) fn register(registry: &mut FunctionRegistry) {
    registry.register(Function::new("base64e", ArgsValidator::Exactly(1), |_, args| {
        Ok(Value::string(STANDARD.encode(args[0].as_string()?)))
    }));
    registry.register(Function::new("base64d", ArgsValidator::Exactly(1), |_, args| {
        base64_decode(&args[0].as_string()?).map(Value::string)
    }));
    registry.register(Function::new("parse", ArgsValidator::Exactly(2), |_, args| {
        let format: Format = args[0].as_string()?.parse()?;
        let content = args[1].as_string()?;
        Ok(new_reader(format).read(content.as_bytes())?)
    }));
    registry.register(Function::new("readFile", ArgsValidator::Exactly(1), |_, args| {
        let path = args[0].as_string()?;
        tracing::debug!(path = %path, "reading file");
        Ok(Value::string(fs::read_to_string(path)?))
    }));
}

fn base64_decode(encoded: &str) -> Result<String, EvalError> {
    let bytes = STANDARD
        .decode(encoded)
        .map_err(|e| EvalError::InvalidArgument(format!("invalid base64: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|_| EvalError::InvalidArgument("decoded base64 is not valid utf-8".to_string()))
}
