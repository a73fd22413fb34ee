//! Named functions callable from selectors.
//!
//! A [`FunctionRegistry`] maps names to [`Function`]s. Each function carries
//! an [`ArgsValidator`] that is checked before its handler runs, and the
//! handler receives the current subject alongside the evaluated arguments.
//!
//! ```
//! use selector_lang::{ArgsValidator, Evaluator, Function, Value};
//!
//! let mut evaluator = Evaluator::new();
//! evaluator.functions_mut().register(Function::new(
//!     "double",
//!     ArgsValidator::Exactly(1),
//!     |_, args| Ok(args[0].multiply(&Value::int(2))?),
//! ));
//!
//! let out = evaluator.execute_selector("double(21)", &Value::null()).unwrap();
//! assert_eq!(out, Value::int(42));
//! ```

use std::{collections::HashMap, fmt, rc::Rc};

use crate::{evaluator::EvalError, value::Value};

mod collections;
mod convert;
mod encoding;
mod numeric;

type Handler = dyn Fn(&Value, &[Value]) -> Result<Value, EvalError>;

/// Accepted argument counts for a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgsValidator {
    Any,
    Exactly(usize),
    Min(usize),
    Max(usize),
    MinMax(usize, usize),
}

impl ArgsValidator {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            ArgsValidator::Any => true,
            ArgsValidator::Exactly(n) => count == n,
            ArgsValidator::Min(min) => count >= min,
            ArgsValidator::Max(max) => count <= max,
            ArgsValidator::MinMax(min, max) => (min..=max).contains(&count),
        }
    }

    pub fn validate(self, function: &str, count: usize) -> Result<(), EvalError> {
        if self.accepts(count) {
            return Ok(());
        }
        Err(EvalError::ArgumentCount {
            function: function.to_string(),
            expected: self,
            actual: count,
        })
    }
}

impl fmt::Display for ArgsValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsValidator::Any => f.write_str("any number"),
            ArgsValidator::Exactly(n) => write!(f, "exactly {n}"),
            ArgsValidator::Min(n) => write!(f, "at least {n}"),
            ArgsValidator::Max(n) => write!(f, "at most {n}"),
            ArgsValidator::MinMax(min, max) => write!(f, "between {min} and {max}"),
        }
    }
}

/// A named, validated handler.
///
/// Cloning is cheap; the handler is shared.
#[derive(Clone)]
pub struct Function {
    name: String,
    validator: ArgsValidator,
    handler: Rc<Handler>,
}

impl Function {
    pub fn new(
        name: impl Into<String>,
        validator: ArgsValidator,
        handler: impl Fn(&Value, &[Value]) -> Result<Value, EvalError> + 'static,
    ) -> Self {
        Function {
            name: name.into(),
            validator,
            handler: Rc::new(handler),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn validator(&self) -> ArgsValidator {
        self.validator
    }

    /// Validates the argument count, then runs the handler.
    pub fn call(&self, subject: &Value, args: &[Value]) -> Result<Value, EvalError> {
        self.validator.validate(&self.name, args.len())?;
        (self.handler)(subject, args)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("validator", &self.validator)
            .finish_non_exhaustive()
    }
}

/// Functions by name.
///
/// [`Clone`] produces an independent registry: registering into the copy
/// leaves the original untouched.
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Function>,
}

impl FunctionRegistry {
    pub fn empty() -> Self {
        FunctionRegistry::default()
    }

    /// A registry holding every built-in function.
    pub fn builtins() -> Self {
        let mut registry = FunctionRegistry::empty();
        numeric::register(&mut registry);
        convert::register(&mut registry);
        collections::register(&mut registry);
        encoding::register(&mut registry);
        registry
    }

    /// Adds a function, returning any function it replaced.
    pub fn register(&mut self, function: Function) -> Option<Function> {
        tracing::debug!(function = %function.name, "registering function");
        self.functions.insert(function.name.clone(), function)
    }

    pub fn get(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    pub fn delete(&mut self, name: &str) -> Option<Function> {
        self.functions.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
