//! Binary operators and assignment.

use regex::Regex;

use super::{EvalError, Evaluator, new_branch};
use crate::{
    ast::{BinOp, Expr},
    value::Value,
};

impl Evaluator {
    /// Evaluates `left op right`.
    ///
    /// When the left side yields a branch the right side is evaluated once per
    /// element, with that element as the subject.
    pub(super) fn binary(
        &mut self,
        op: BinOp,
        left: &Expr,
        right: &Expr,
        subject: &Value,
    ) -> Result<Value, EvalError> {
        if op == BinOp::NullCoalesce {
            return self.coalesce(left, right, subject);
        }

        let left = self.evaluate(left, subject)?;
        if !left.is_branch() {
            return self.apply_binary(op, &left, right, subject);
        }

        let results = new_branch();
        for item in left.slice_items()? {
            results.append(self.apply_binary(op, &item, right, &item)?)?;
        }
        Ok(results)
    }

    fn apply_binary(
        &mut self,
        op: BinOp,
        left: &Value,
        right: &Expr,
        subject: &Value,
    ) -> Result<Value, EvalError> {
        if matches!(op, BinOp::Like | BinOp::NotLike) {
            let Expr::Regex(pattern) = right else {
                return Err(EvalError::RegexExpected(op));
            };
            let matched = Regex::new(pattern)?.is_match(&left.as_string()?);
            return Ok(Value::bool(matched == (op == BinOp::Like)));
        }

        let right = self.evaluate(right, subject)?;
        apply_op(op, left, &right)
    }

    /// `left ?? right` falls back when the left side is null or fails a lookup.
    fn coalesce(&mut self, left: &Expr, right: &Expr, subject: &Value) -> Result<Value, EvalError> {
        match self.evaluate(left, subject) {
            Ok(value) if value.is_branch() => {
                let results = new_branch();
                for item in value.slice_items()? {
                    if item.is_null() {
                        results.append(self.evaluate(right, &item)?)?;
                    } else {
                        results.append(item)?;
                    }
                }
                Ok(results)
            }
            Ok(value) if !value.is_null() => Ok(value),
            Ok(_) => self.evaluate(right, subject),
            Err(err) if err.is_lookup_failure() => {
                tracing::trace!(error = %err, "coalescing failed lookup");
                self.evaluate(right, subject)
            }
            Err(err) => Err(err),
        }
    }

    /// Evaluates an assignment and writes the result through the target.
    ///
    /// Unbound variables are bound to null before the target is read, so
    /// `$x = 1` creates `$x`. The result is the updated container when the
    /// target ends up a map or slice, otherwise the assigned value.
    pub(super) fn assign(
        &mut self,
        target: &Expr,
        op: Option<BinOp>,
        value: &Expr,
        subject: &Value,
    ) -> Result<Value, EvalError> {
        if let Expr::Variable(name) = target
            && name != "this"
            && !self.variables.contains_key(name)
        {
            tracing::trace!(variable = %name, "binding variable");
            self.variables.insert(name.clone(), Value::null());
        }

        let target = self.evaluate(target, subject)?;
        if !target.is_branch() {
            let value = self.evaluate(value, subject)?;
            return write_through(&target, op, &value);
        }

        let results = new_branch();
        for item in target.slice_items()? {
            let value = self.evaluate(value, &item)?;
            results.append(write_through(&item, op, &value)?)?;
        }
        Ok(results)
    }
}

fn write_through(target: &Value, op: Option<BinOp>, value: &Value) -> Result<Value, EvalError> {
    let value = match op {
        Some(op) => apply_op(op, target, value)?,
        None => value.clone(),
    };
    target.set(&value);
    if target.is_scalar() {
        Ok(value)
    } else {
        Ok(target.clone())
    }
}

/// Applies an operator to two evaluated operands.
pub(crate) fn apply_op(op: BinOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    let result = match op {
        BinOp::Add => left.add(right)?,
        BinOp::Subtract => left.subtract(right)?,
        BinOp::Multiply => left.multiply(right)?,
        BinOp::Divide => left.divide(right)?,
        BinOp::Modulo => left.modulo(right)?,
        BinOp::Equal => Value::bool(left.equal(right)),
        BinOp::NotEqual => Value::bool(!left.equal(right)),
        BinOp::LessThan => Value::bool(left.less_than(right)?),
        BinOp::LessEqual => Value::bool(left.less_than_or_equal(right)?),
        BinOp::GreaterThan => Value::bool(left.greater_than(right)?),
        BinOp::GreaterEqual => Value::bool(left.greater_than_or_equal(right)?),
        BinOp::And => Value::bool(left.as_bool()? && right.as_bool()?),
        BinOp::Or => Value::bool(left.as_bool()? || right.as_bool()?),
        BinOp::Like | BinOp::NotLike | BinOp::NullCoalesce => {
            return Err(EvalError::UnsupportedOperator(op));
        }
    };
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_op_logic_is_strict() {
        let err = apply_op(BinOp::And, &Value::int(1), &Value::bool(true)).unwrap_err();
        assert_eq!(err.to_string(), "expected bool, got int");
    }

    #[test]
    fn test_apply_op_equality_across_types() {
        let out = apply_op(BinOp::Equal, &Value::string("1"), &Value::int(1)).unwrap();
        assert_eq!(out, Value::bool(false));
        let out = apply_op(BinOp::Equal, &Value::int(1), &Value::float(1.0)).unwrap();
        assert_eq!(out, Value::bool(true));
    }

    #[test]
    fn test_compound_write_through() {
        let target = Value::int(4);
        let out = write_through(&target, Some(BinOp::Subtract), &Value::int(1)).unwrap();
        assert_eq!(out, Value::int(3));
        assert_eq!(target, Value::int(3));
    }
}
