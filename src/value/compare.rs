use std::cmp::Ordering;

use super::{Data, Type, Value, ValueError};

/// Rank used to order values of unrelated types.
fn type_rank(data: &Data) -> u8 {
    match data {
        Data::Null => 0,
        Data::Bool(_) => 1,
        Data::Int(_) | Data::Float(_) => 2,
        Data::String(_) => 3,
        Data::Slice(_) => 4,
        Data::Map(_) => 5,
    }
}

fn compare_data(a: &Data, b: &Data) -> Ordering {
    match (a, b) {
        (Data::Null, Data::Null) => Ordering::Equal,
        (Data::Bool(x), Data::Bool(y)) => x.cmp(y),
        (Data::Int(x), Data::Int(y)) => x.cmp(y),
        (Data::Int(x), Data::Float(y)) => (*x as f64).total_cmp(y),
        (Data::Float(x), Data::Int(y)) => x.total_cmp(&(*y as f64)),
        (Data::Float(x), Data::Float(y)) => x.total_cmp(y),
        (Data::String(x), Data::String(y)) => x.cmp(y),
        (Data::Slice(xs), Data::Slice(ys)) => {
            for (x, y) in xs.iter().zip(ys) {
                let ord = x.compare(y);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            xs.len().cmp(&ys.len())
        }
        (Data::Map(xs), Data::Map(ys)) => {
            let ord = xs.len().cmp(&ys.len());
            if ord != Ordering::Equal {
                return ord;
            }
            // Key order is ignored, as in equality.
            let mut kxs: Vec<&String> = xs.keys().collect();
            let mut kys: Vec<&String> = ys.keys().collect();
            kxs.sort();
            kys.sort();
            let ord = kxs.cmp(&kys);
            if ord != Ordering::Equal {
                return ord;
            }
            for key in kxs {
                if let (Some(vx), Some(vy)) = (xs.get(key), ys.get(key)) {
                    let ord = vx.compare(vy);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
            }
            Ordering::Equal
        }
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn equal_data(a: &Data, b: &Data) -> bool {
    match (a, b) {
        (Data::Null, Data::Null) => true,
        (Data::Bool(x), Data::Bool(y)) => x == y,
        (Data::Int(x), Data::Int(y)) => x == y,
        (Data::Int(x), Data::Float(y)) | (Data::Float(y), Data::Int(x)) => *x as f64 == *y,
        (Data::Float(x), Data::Float(y)) => x == y,
        (Data::String(x), Data::String(y)) => x == y,
        (Data::Slice(xs), Data::Slice(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| x.equal(y))
        }
        (Data::Map(xs), Data::Map(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, vx)| ys.get(k).is_some_and(|vy| vx.equal(vy)))
        }
        _ => false,
    }
}

impl Value {
    /// Deep equality. Ints and floats compare numerically, map key order is
    /// ignored, values of different types are never equal.
    pub fn equal(&self, other: &Value) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        equal_data(&self.node.borrow().data, &other.node.borrow().data)
    }

    /// Total order over all values, used for sorting.
    ///
    /// Numbers compare numerically, strings lexically, slices element-wise.
    /// Values of unrelated types order by type:
    /// null < bool < number < string < array < map.
    pub fn compare(&self, other: &Value) -> Ordering {
        if self.ptr_eq(other) {
            return Ordering::Equal;
        }
        compare_data(&self.node.borrow().data, &other.node.borrow().data)
    }

    /// Ordering for relational operators, defined for number pairs and
    /// string pairs only.
    fn relational(&self, other: &Value) -> Result<Ordering, ValueError> {
        let numeric = |t: Type| matches!(t, Type::Int | Type::Float);
        let (left, right) = (self.kind(), other.kind());
        if (numeric(left) && numeric(right)) || (left == Type::String && right == Type::String) {
            Ok(self.compare(other))
        } else {
            Err(ValueError::IncompatibleTypes { left, right })
        }
    }

    pub fn less_than(&self, other: &Value) -> Result<bool, ValueError> {
        Ok(self.relational(other)? == Ordering::Less)
    }

    pub fn less_than_or_equal(&self, other: &Value) -> Result<bool, ValueError> {
        Ok(self.relational(other)? != Ordering::Greater)
    }

    pub fn greater_than(&self, other: &Value) -> Result<bool, ValueError> {
        Ok(self.relational(other)? == Ordering::Greater)
    }

    pub fn greater_than_or_equal(&self, other: &Value) -> Result<bool, ValueError> {
        Ok(self.relational(other)? != Ordering::Less)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equal(other)
    }
}
