//! Collection operations: map, each, filter, search, sortBy and recursive
//! descent.

use super::{EvalError, Evaluator};
use crate::{
    ast::{DescentTarget, Expr, SortDirection},
    value::{Type, Value},
};

fn require_slice(subject: &Value, operation: &'static str) -> Result<Vec<Value>, EvalError> {
    if subject.kind() != Type::Slice {
        return Err(EvalError::NotIterable {
            operation,
            actual: subject.kind(),
        });
    }
    Ok(subject.slice_items()?)
}

/// Direct children of a container, in order. Scalars have none.
fn children(node: &Value) -> Result<Vec<Value>, EvalError> {
    Ok(match node.kind() {
        Type::Slice => node.slice_items()?,
        Type::Map => node
            .map_entries()?
            .into_iter()
            .map(|(_, value)| value)
            .collect(),
        _ => Vec::new(),
    })
}

impl Evaluator {
    pub(super) fn map(&mut self, expr: &Expr, subject: &Value) -> Result<Value, EvalError> {
        let items = require_slice(subject, "map")?;
        let mapped = items
            .iter()
            .map(|item| {
                let result = self.evaluate(expr, item)?;
                result.clear_spread();
                Ok(result)
            })
            .collect::<Result<Vec<_>, EvalError>>()?;
        Ok(Value::slice(mapped))
    }

    /// Runs `expr` against every element and returns the subject.
    pub(super) fn each(&mut self, expr: &Expr, subject: &Value) -> Result<Value, EvalError> {
        for item in require_slice(subject, "each")? {
            self.evaluate(expr, &item)?;
        }
        Ok(subject.clone())
    }

    /// Keeps the elements whose predicate is `true`. Kept elements alias the
    /// originals.
    pub(super) fn filter(&mut self, predicate: &Expr, subject: &Value) -> Result<Value, EvalError> {
        let mut kept = Vec::new();
        for item in require_slice(subject, "filter")? {
            if self.evaluate(predicate, &item)?.as_bool()? {
                kept.push(item);
            }
        }
        Ok(Value::slice(kept))
    }

    /// Collects every descendant, in pre-order, for which the predicate is
    /// `true`. Lookup failures count as no match, a non-bool result is an
    /// error.
    pub(super) fn search(&mut self, predicate: &Expr, subject: &Value) -> Result<Value, EvalError> {
        let mut found = Vec::new();
        self.search_into(predicate, subject, &mut found)?;
        Ok(Value::slice(found))
    }

    fn search_into(
        &mut self,
        predicate: &Expr,
        node: &Value,
        found: &mut Vec<Value>,
    ) -> Result<(), EvalError> {
        for child in children(node)? {
            match self.evaluate(predicate, &child) {
                Ok(result) => {
                    if result.as_bool()? {
                        found.push(child.clone());
                    }
                }
                Err(err) if err.is_lookup_failure() => {}
                Err(err) => return Err(err),
            }
            self.search_into(predicate, &child, found)?;
        }
        Ok(())
    }

    /// Stable sort by a key evaluated against each element.
    pub(super) fn sort_by(
        &mut self,
        key: &Expr,
        direction: SortDirection,
        subject: &Value,
    ) -> Result<Value, EvalError> {
        let items = require_slice(subject, "sort")?;
        let keys = items
            .iter()
            .map(|item| self.evaluate(key, item))
            .collect::<Result<Vec<_>, _>>()?;

        let mut order: Vec<usize> = (0..items.len()).collect();
        order.sort_by(|&a, &b| {
            let ordering = keys[a].compare(&keys[b]);
            match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });

        Ok(Value::slice(
            order.into_iter().map(|i| items[i].clone()).collect(),
        ))
    }
}

/// Collects nested values matching `target`, parents before children.
pub(super) fn recursive_descent(target: &DescentTarget, subject: &Value) -> Result<Value, EvalError> {
    let mut found = Vec::new();
    descend(target, subject, &mut found)?;
    Ok(Value::slice(found))
}

fn descend(target: &DescentTarget, node: &Value, found: &mut Vec<Value>) -> Result<(), EvalError> {
    let entries: Vec<(Option<String>, Value)> = match node.kind() {
        Type::Map => node
            .map_entries()?
            .into_iter()
            .map(|(key, value)| (Some(key), value))
            .collect(),
        Type::Slice => node.slice_items()?.into_iter().map(|v| (None, v)).collect(),
        _ => return Ok(()),
    };

    for (position, (key, value)) in entries.into_iter().enumerate() {
        let matched = match target {
            DescentTarget::Key(name) => key.as_deref() == Some(name.as_str()),
            DescentTarget::Index(index) => key.is_none() && *index == position as i64,
            DescentTarget::Wildcard => value.is_scalar(),
        };
        if matched {
            found.push(value.clone());
        }
        descend(target, &value, found)?;
    }
    Ok(())
}
