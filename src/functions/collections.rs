use super::{ArgsValidator, Function, FunctionRegistry};
use crate::{
    evaluator::EvalError,
    value::{Type, Value},
};

pub(super) fn register(registry: &mut FunctionRegistry) {
    registry.register(Function::new("has", ArgsValidator::Exactly(1), |subject, args| {
        has(subject, &args[0]).map(Value::bool)
    }));
    registry.register(Function::new("get", ArgsValidator::Exactly(1), |subject, args| {
        get(subject, &args[0])
    }));
    registry.register(Function::new("contains", ArgsValidator::Exactly(1), |subject, args| {
        let items = subject.slice_items()?;
        Ok(Value::bool(items.iter().any(|item| item.equal(&args[0]))))
    }));
    registry.register(Function::new("merge", ArgsValidator::Min(1), |_, args| merge(args)));
    registry.register(Function::new("reverse", ArgsValidator::Exactly(1), |_, args| {
        reverse(&args[0])
    }));
    registry.register(Function::new("join", ArgsValidator::Min(1), |subject, args| {
        join(subject, args)
    }));
    registry.register(Function::new("ignore", ArgsValidator::Exactly(0), |subject, _| {
        subject.mark_as_ignored();
        Ok(subject.clone())
    }));
}

/// A string key on a map or an in-range int on a slice. Anything else is
/// simply absent.
fn has(subject: &Value, key: &Value) -> Result<bool, EvalError> {
    Ok(match (subject.kind(), key.kind()) {
        (Type::Map, Type::String) => subject.map_key_exists(&key.as_string()?)?,
        (Type::Slice, Type::Int) => {
            let index = key.as_int()?;
            index >= 0 && (index as usize) < subject.len()?
        }
        _ => false,
    })
}

/// Key or index lookup. A key of the wrong kind for the subject yields
/// `false` instead of an error.
fn get(subject: &Value, key: &Value) -> Result<Value, EvalError> {
    match (subject.kind(), key.kind()) {
        (Type::Map, Type::String) => Ok(subject.get_map_key(&key.as_string()?)?),
        (Type::Slice, Type::Int) => Ok(subject.get_slice_index(key.as_int()?)?),
        (_, Type::String | Type::Int) => Ok(Value::bool(false)),
        (_, other) => Err(EvalError::InvalidIndex(other)),
    }
}

/// Combines maps left to right. Later keys win but keep their first
/// position.
fn merge(args: &[Value]) -> Result<Value, EvalError> {
    let merged = Value::new_map();
    for arg in args {
        if !arg.is_map() {
            return Err(EvalError::InvalidArgument(format!(
                "merge expects maps, got {}",
                arg.kind()
            )));
        }
        for (key, value) in arg.map_entries()? {
            merged.set_map_key(key, value)?;
        }
    }
    Ok(merged)
}

fn reverse(value: &Value) -> Result<Value, EvalError> {
    match value.kind() {
        Type::Slice | Type::String => Ok(value.index_range(Some(-1), Some(0))?),
        other => Err(EvalError::InvalidArgument(format!(
            "cannot reverse {other}"
        ))),
    }
}

/// `join(separator, parts...)`. A single array part is joined element-wise,
/// and with no parts the subject array is joined.
fn join(subject: &Value, args: &[Value]) -> Result<Value, EvalError> {
    let separator = args[0].as_string()?;

    let parts = match &args[1..] {
        [] => subject.slice_items()?,
        [single] if single.is_slice() => single.slice_items()?,
        rest => rest.to_vec(),
    };

    let mut strings = Vec::with_capacity(parts.len());
    for (i, part) in parts.iter().enumerate() {
        let s = part.as_string().map_err(|_| {
            EvalError::InvalidArgument(format!(
                "join expects strings, argument {} is {}",
                i + 1,
                part.kind()
            ))
        })?;
        strings.push(s);
    }

    Ok(Value::string(strings.join(&separator)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<Value> {
        values.iter().copied().map(Value::string).collect()
    }

    #[test]
    fn test_has() {
        let map = Value::map_from([("a", Value::int(1))]);
        assert!(has(&map, &Value::string("a")).unwrap());
        assert!(!has(&map, &Value::string("b")).unwrap());
        assert!(!has(&map, &Value::int(0)).unwrap());

        let list = Value::slice(vec![Value::int(1)]);
        assert!(has(&list, &Value::int(0)).unwrap());
        assert!(!has(&list, &Value::int(1)).unwrap());
        assert!(!has(&list, &Value::int(-1)).unwrap());
    }

    #[test]
    fn test_reverse_string_and_empty() {
        assert_eq!(reverse(&Value::string("abc")).unwrap(), Value::string("cba"));
        assert_eq!(reverse(&Value::new_slice()).unwrap().len().unwrap(), 0);
        assert!(reverse(&Value::int(1)).is_err());
    }

    #[test]
    fn test_merge_overrides_in_place() {
        let a = Value::map_from([("x", Value::int(1)), ("y", Value::int(2))]);
        let b = Value::map_from([("x", Value::int(3))]);
        let merged = merge(&[a, b]).unwrap();
        assert_eq!(merged.map_keys().unwrap(), ["x", "y"]);
        assert_eq!(merged.get_map_key("x").unwrap(), Value::int(3));
    }

    #[test]
    fn test_join() {
        let mut args = strings(&[","]);
        args.extend(strings(&["a", "b"]));
        assert_eq!(join(&Value::null(), &args).unwrap(), Value::string("a,b"));

        let list = Value::slice(strings(&["x", "y", "z"]));
        assert_eq!(
            join(&Value::null(), &[Value::string("-"), list.clone()]).unwrap(),
            Value::string("x-y-z")
        );
        assert_eq!(join(&list, &strings(&["+"])).unwrap(), Value::string("x+y+z"));
    }

    #[test]
    fn test_get_mismatched_key_is_false() {
        let list = Value::slice(vec![Value::int(7)]);
        assert_eq!(get(&list, &Value::int(0)).unwrap(), Value::int(7));
        assert_eq!(get(&list, &Value::string("a")).unwrap(), Value::bool(false));
        assert!(get(&list, &Value::int(3)).is_err());
    }
}
