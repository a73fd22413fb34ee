use std::{collections::HashMap, env};

use thiserror::Error;

use crate::{
    ast::{BinOp, Expr, ObjectEntry, UnaryOp},
    format::FormatError,
    functions::{ArgsValidator, FunctionRegistry},
    lexer::Lexer,
    parser::Parser,
    value::{Type, Value, ValueError},
};

mod binary;
mod traversal;

/// Tree-walking evaluator.
///
/// Holds the variables bound during execution and the functions that calls
/// resolve against. Variables persist across [`Evaluator::evaluate`] calls on
/// the same evaluator.
pub struct Evaluator {
    variables: HashMap<String, Value>,
    functions: FunctionRegistry,
}

/// Errors that can occur while evaluating a selector.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error(transparent)]
    Value(#[from] ValueError),

    #[error("variable {0} not found")]
    UndefinedVariable(String),

    #[error("function {0:?} not found")]
    UndefinedFunction(String),

    #[error(
        "invalid number of arguments for function {function:?}: expected {expected}, got {actual}"
    )]
    ArgumentCount {
        function: String,
        expected: ArgsValidator,
        actual: usize,
    },

    #[error("{0}")]
    InvalidArgument(String),

    #[error("cannot {operation} over non-array, got {actual}")]
    NotIterable {
        operation: &'static str,
        actual: Type,
    },

    #[error("cannot spread on type {0}")]
    CannotSpread(Type),

    #[error("object keys must be strings, got {0}")]
    InvalidObjectKey(Type),

    #[error("index must be a string or int, got {0}")]
    InvalidIndex(Type),

    #[error("right side of {0} must be a regex literal")]
    RegexExpected(BinOp),

    #[error("regex literal is only valid on the right of =~ or !~")]
    UnexpectedRegex,

    #[error("operator {0} cannot be applied here")]
    UnsupportedOperator(BinOp),

    #[error("invalid regex: {0}")]
    Regex(#[from] regex::Error),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("error evaluating {node}: {source}")]
    Node {
        node: &'static str,
        source: Box<EvalError>,
    },

    #[error("error executing function {name:?}: {source}")]
    Function {
        name: String,
        source: Box<EvalError>,
    },
}

impl EvalError {
    fn within(self, node: &'static str) -> Self {
        EvalError::Node {
            node,
            source: Box::new(self),
        }
    }

    /// The innermost error beneath any node or function wrapping.
    pub fn root_cause(&self) -> &EvalError {
        let mut err = self;
        loop {
            match err {
                EvalError::Node { source, .. } | EvalError::Function { source, .. } => {
                    err = source
                }
                _ => return err,
            }
        }
    }

    /// Whether the failure means "nothing there", which `??` and `search`
    /// treat as a miss rather than an error.
    pub fn is_lookup_failure(&self) -> bool {
        matches!(
            self.root_cause(),
            EvalError::Value(
                ValueError::MapKeyNotFound(_)
                    | ValueError::SliceIndexOutOfRange { .. }
                    | ValueError::UnexpectedType { .. }
                    | ValueError::IncompatibleTypes { .. }
            ) | EvalError::UndefinedVariable(_)
        )
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    /// An evaluator with the built-in functions.
    pub fn new() -> Self {
        Self::with_functions(FunctionRegistry::builtins())
    }

    pub fn with_functions(functions: FunctionRegistry) -> Self {
        Evaluator {
            variables: HashMap::new(),
            functions,
        }
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    pub fn functions_mut(&mut self) -> &mut FunctionRegistry {
        &mut self.functions
    }

    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    /// Parses and runs a selector against a document.
    ///
    /// An empty selector returns the document itself.
    pub fn execute_selector(&mut self, selector: &str, document: &Value) -> Result<Value, crate::Error> {
        if selector.trim().is_empty() {
            return Ok(document.clone());
        }

        let span = tracing::debug_span!("execute_selector", selector);
        let _guard = span.enter();

        let expr = Parser::new(Lexer::new(selector))?.parse()?;
        let result = self.evaluate(&expr, document)?;
        tracing::debug!(kind = %result.kind(), branch = result.is_branch(), "selector executed");
        Ok(result)
    }

    /// Evaluates an expression against a subject.
    ///
    /// A branch subject runs the expression once per element and collects
    /// the results into a new branch, dropping results marked as ignored.
    pub fn evaluate(&mut self, expr: &Expr, subject: &Value) -> Result<Value, EvalError> {
        if !subject.is_branch() {
            return self.evaluate_node(expr, subject);
        }

        let results = new_branch();
        for item in subject.slice_items()? {
            let result = self.evaluate_node(expr, &item)?;
            if result.is_ignored() {
                continue;
            }
            results.append(result)?;
        }
        Ok(results)
    }

    fn evaluate_node(&mut self, expr: &Expr, subject: &Value) -> Result<Value, EvalError> {
        self.dispatch(expr, subject)
            .map_err(|err| err.within(expr.kind_name()))
    }

    fn dispatch(&mut self, expr: &Expr, subject: &Value) -> Result<Value, EvalError> {
        match expr {
            Expr::Float(n) => Ok(Value::float(*n)),
            Expr::Integer(n) => Ok(Value::int(*n)),
            Expr::String(s) => Ok(Value::string(s.as_str())),
            Expr::Boolean(b) => Ok(Value::bool(*b)),
            Expr::Null => Ok(Value::null()),
            Expr::Regex(_) => Err(EvalError::UnexpectedRegex),

            Expr::Property(name) => Ok(subject.get_map_key(name)?),
            Expr::Index(key) => self.index(key, subject),
            Expr::Range { start, end } => {
                let start = self.range_bound(start.as_deref(), subject)?;
                let end = self.range_bound(end.as_deref(), subject)?;
                Ok(subject.index_range(start, end)?)
            }
            Expr::Variable(name) => self.lookup_variable(name, subject),

            Expr::BinaryOp { op, left, right } => self.binary(*op, left, right, subject),
            Expr::UnaryOp {
                op: UnaryOp::Not,
                operand,
            } => {
                let value = self.evaluate(operand, subject)?;
                if !value.is_branch() {
                    return Ok(Value::bool(!value.as_bool()?));
                }
                let results = new_branch();
                for item in value.slice_items()? {
                    results.append(Value::bool(!item.as_bool()?))?;
                }
                Ok(results)
            }
            Expr::Assign { target, op, value } => self.assign(target, *op, value, subject),
            Expr::Call { function, args } => self.call(function, args, subject),

            Expr::Object(entries) => self.object(entries, subject),
            Expr::Array(items) => {
                let array = Value::new_slice();
                for item in items {
                    let value = self.evaluate(item, subject)?;
                    if value.is_spread() {
                        for element in value.slice_items()? {
                            array.append(element)?;
                        }
                    } else {
                        array.append(value)?;
                    }
                }
                Ok(array)
            }

            Expr::Chained(steps) => {
                let mut current = subject.clone();
                for step in steps {
                    current = self.evaluate(step, &current)?;
                }
                Ok(current)
            }
            Expr::Spread => spread(subject),
            Expr::Group(inner) => self.evaluate(inner, subject),
            Expr::Conditional {
                condition,
                then,
                otherwise,
            } => {
                if self.evaluate(condition, subject)?.as_bool()? {
                    self.evaluate(then, subject)
                } else if let Some(otherwise) = otherwise {
                    self.evaluate(otherwise, subject)
                } else {
                    Ok(Value::null())
                }
            }

            Expr::Branch(args) => self.branch(args, subject),
            Expr::Map(inner) => self.map(inner, subject),
            Expr::Each(inner) => self.each(inner, subject),
            Expr::Filter(predicate) => self.filter(predicate, subject),
            Expr::Search(predicate) => self.search(predicate, subject),
            Expr::SortBy { key, direction } => self.sort_by(key, *direction, subject),
            Expr::RecursiveDescent(target) => traversal::recursive_descent(target, subject),
        }
    }

    fn index(&mut self, key: &Expr, subject: &Value) -> Result<Value, EvalError> {
        let key = self.evaluate(key, subject)?;
        match key.kind() {
            Type::String => Ok(subject.get_map_key(&key.as_string()?)?),
            Type::Int => Ok(subject.get_slice_index(key.as_int()?)?),
            other => Err(EvalError::InvalidIndex(other)),
        }
    }

    fn range_bound(&mut self, bound: Option<&Expr>, subject: &Value) -> Result<Option<i64>, EvalError> {
        match bound {
            Some(expr) => Ok(Some(self.evaluate(expr, subject)?.as_int()?)),
            None => Ok(None),
        }
    }

    /// `$this` is the subject. Unbound names fall back to a non-empty
    /// environment variable of the same name.
    fn lookup_variable(&self, name: &str, subject: &Value) -> Result<Value, EvalError> {
        if name == "this" {
            return Ok(subject.clone());
        }
        if let Some(value) = self.variables.get(name) {
            return Ok(value.clone());
        }
        match env::var(name) {
            Ok(value) if !value.is_empty() => {
                tracing::debug!(variable = name, "resolved from environment");
                Ok(Value::string(value))
            }
            _ => Err(EvalError::UndefinedVariable(name.to_string())),
        }
    }

    fn call(&mut self, name: &str, args: &[Expr], subject: &Value) -> Result<Value, EvalError> {
        let function = self
            .functions
            .get(name)
            .cloned()
            .ok_or_else(|| EvalError::UndefinedFunction(name.to_string()))?;

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            let value = self.evaluate(arg, subject)?;
            if value.is_spread() || value.is_branch() {
                values.extend(value.slice_items()?);
            } else {
                values.push(value);
            }
        }

        tracing::trace!(function = name, args = values.len(), "calling function");
        function
            .call(subject, &values)
            .map_err(|source| EvalError::Function {
                name: name.to_string(),
                source: Box::new(source),
            })
    }

    fn object(&mut self, entries: &[ObjectEntry], subject: &Value) -> Result<Value, EvalError> {
        let object = Value::new_map();

        for entry in entries {
            match entry {
                ObjectEntry::Spread(source) => {
                    let source = match source {
                        Some(expr) => self.evaluate(expr, subject)?,
                        None => subject.clone(),
                    };
                    for (key, value) in source.map_entries()? {
                        object.set_map_key(key, value)?;
                    }
                }
                ObjectEntry::Pair { key, value } => {
                    let key = self.evaluate(key, subject)?;
                    let key = key
                        .as_string()
                        .map_err(|_| EvalError::InvalidObjectKey(key.kind()))?;
                    let value = self.evaluate(value, subject)?;
                    // Stored values are plain data, not pending spreads.
                    value.clear_spread();
                    object.set_map_key(key, value)?;
                }
            }
        }

        Ok(object)
    }

    /// With no arguments the subject's elements become the branch, otherwise
    /// each argument is one branch element.
    fn branch(&mut self, args: &[Expr], subject: &Value) -> Result<Value, EvalError> {
        let branch = Value::new_slice();

        if args.is_empty() {
            if !subject.is_slice() {
                return Err(EvalError::NotIterable {
                    operation: "branch",
                    actual: subject.kind(),
                });
            }
            for item in subject.slice_items()? {
                branch.append(item)?;
            }
        } else {
            for arg in args {
                let value = self.evaluate(arg, subject)?;
                if value.is_spread() {
                    for item in value.slice_items()? {
                        branch.append(item)?;
                    }
                } else {
                    branch.append(value)?;
                }
            }
        }

        branch.mark_as_branch();
        Ok(branch)
    }
}

fn new_branch() -> Value {
    let branch = Value::new_slice();
    branch.mark_as_branch();
    branch
}

/// A slice's elements or a map's values, marked for flattening.
fn spread(subject: &Value) -> Result<Value, EvalError> {
    let items = match subject.kind() {
        Type::Slice => subject.slice_items()?,
        Type::Map => subject
            .map_entries()?
            .into_iter()
            .map(|(_, value)| value)
            .collect(),
        other => return Err(EvalError::CannotSpread(other)),
    };
    let spread = Value::slice(items);
    spread.mark_as_spread();
    Ok(spread)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(selector: &str, doc: &Value) -> Result<Value, crate::Error> {
        Evaluator::new().execute_selector(selector, doc)
    }

    #[test]
    fn test_root_cause_unwraps_nesting() {
        let err = EvalError::UndefinedVariable("x".into())
            .within("variable")
            .within("chain");
        assert!(matches!(err.root_cause(), EvalError::UndefinedVariable(_)));
        assert!(err.is_lookup_failure());
        assert!(!EvalError::UnexpectedRegex.is_lookup_failure());
    }

    #[test]
    fn test_variables_persist_between_runs() {
        let mut evaluator = Evaluator::new();
        let doc = Value::null();
        evaluator.execute_selector("$x = 5", &doc).unwrap();
        assert_eq!(evaluator.variable("x"), Some(&Value::int(5)));

        let out = evaluator.execute_selector("$x + 1", &doc).unwrap();
        assert_eq!(out, Value::int(6));
    }

    #[test]
    fn test_set_variable_is_visible() {
        let mut evaluator = Evaluator::new();
        evaluator.set_variable("name", Value::string("Tom"));
        let out = evaluator.execute_selector("$name", &Value::null()).unwrap();
        assert_eq!(out, Value::string("Tom"));
    }

    #[test]
    fn test_empty_selector_returns_document() {
        let doc = Value::map_from([("a", Value::int(1))]);
        let out = run("  ", &doc).unwrap();
        assert!(out.ptr_eq(&doc));
    }

    #[test]
    fn test_ignored_results_are_dropped_from_branch() {
        let out = run("branch(1, 2, 3).if ($this == 2) { ignore() } else { $this }", &Value::null())
            .unwrap();
        assert!(out.is_branch());
        assert_eq!(out.slice_items().unwrap(), vec![Value::int(1), Value::int(3)]);
    }

    #[test]
    fn test_errors_name_the_failing_node() {
        let doc = Value::new_map();
        let err = run("nope", &doc).unwrap_err();
        assert_eq!(
            err.to_string(),
            "error executing selector: error evaluating property: map key not found: \"nope\""
        );
    }
}
