//! Arithmetic over values.
//!
//! Int with int stays int (checked). Anything involving a float produces a
//! float, computed through `rust_decimal` where both operands survive the
//! conversion unchanged so that `1.1 + 2.2` lands on `3.3`. Magnitudes past
//! the 28 decimal places `Decimal` holds stay in `f64`.

use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};

use super::{Type, Value, ValueError};

#[derive(Clone, Copy)]
enum Operand {
    Int(i64),
    Float(f64),
}

impl Operand {
    fn of(value: &Value) -> Option<Operand> {
        match value.kind() {
            Type::Int => value.as_int().ok().map(Operand::Int),
            Type::Float => value.as_float().ok().map(Operand::Float),
            _ => None,
        }
    }

    fn to_f64(self) -> f64 {
        match self {
            Operand::Int(i) => i as f64,
            Operand::Float(f) => f,
        }
    }

    fn to_decimal(self) -> Option<Decimal> {
        match self {
            Operand::Int(i) => Decimal::from_i64(i),
            Operand::Float(f) => Decimal::from_f64(f).filter(|d| d.to_f64() == Some(f)),
        }
    }
}

#[derive(Clone, Copy)]
enum Op {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl Op {
    fn ints(self, a: i64, b: i64) -> Result<i64, ValueError> {
        if matches!(self, Op::Divide | Op::Modulo) && b == 0 {
            return Err(ValueError::DivisionByZero);
        }
        let result = match self {
            Op::Add => a.checked_add(b),
            Op::Subtract => a.checked_sub(b),
            Op::Multiply => a.checked_mul(b),
            Op::Divide => a.checked_div(b),
            Op::Modulo => a.checked_rem(b),
        };
        result.ok_or(ValueError::IntegerOverflow)
    }

    fn floats(self, a: Operand, b: Operand) -> Result<f64, ValueError> {
        if matches!(self, Op::Divide | Op::Modulo) && b.to_f64() == 0.0 {
            return Err(ValueError::DivisionByZero);
        }
        let fallback = {
            let (a, b) = (a.to_f64(), b.to_f64());
            match self {
                Op::Add => a + b,
                Op::Subtract => a - b,
                Op::Multiply => a * b,
                Op::Divide => a / b,
                Op::Modulo => a % b,
            }
        };

        if let Some(da) = a.to_decimal()
            && let Some(db) = b.to_decimal()
        {
            let rd = match self {
                Op::Add => da.checked_add(db),
                Op::Subtract => da.checked_sub(db),
                Op::Multiply => da.checked_mul(db),
                Op::Divide => da.checked_div(db),
                Op::Modulo => da.checked_rem(db),
            };
            // A product or quotient can still fall below Decimal's scale.
            if let Some(r) = rd.and_then(|r| r.to_f64())
                && (r - fallback).abs() <= fallback.abs() * 1e-12
            {
                return Ok(r);
            }
        }

        Ok(fallback)
    }
}

fn numeric(left: &Value, right: &Value, op: Op) -> Result<Value, ValueError> {
    match (Operand::of(left), Operand::of(right)) {
        (Some(Operand::Int(a)), Some(Operand::Int(b))) => op.ints(a, b).map(Value::int),
        (Some(a), Some(b)) => op.floats(a, b).map(Value::float),
        _ => Err(incompatible(left, right)),
    }
}

fn incompatible(left: &Value, right: &Value) -> ValueError {
    ValueError::IncompatibleTypes {
        left: left.kind(),
        right: right.kind(),
    }
}

impl Value {
    /// Numeric addition or string concatenation.
    pub fn add(&self, other: &Value) -> Result<Value, ValueError> {
        if self.kind() == Type::String && other.kind() == Type::String {
            return Ok(Value::string(self.as_string()? + &other.as_string()?));
        }
        numeric(self, other, Op::Add)
    }

    pub fn subtract(&self, other: &Value) -> Result<Value, ValueError> {
        numeric(self, other, Op::Subtract)
    }

    pub fn multiply(&self, other: &Value) -> Result<Value, ValueError> {
        numeric(self, other, Op::Multiply)
    }

    /// Division. Int by int truncates.
    pub fn divide(&self, other: &Value) -> Result<Value, ValueError> {
        numeric(self, other, Op::Divide)
    }

    pub fn modulo(&self, other: &Value) -> Result<Value, ValueError> {
        numeric(self, other, Op::Modulo)
    }
}
