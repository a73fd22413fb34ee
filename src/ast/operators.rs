use std::fmt;

use super::TokenKind;

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Comparison
    /// Equal (`==`)
    Equal,
    /// Not equal (`!=`)
    NotEqual,
    /// Less than (`<`)
    LessThan,
    /// Greater than (`>`)
    GreaterThan,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than or equal (`>=`)
    GreaterEqual,
    /// Regex match (`=~`), right side must be a regex literal
    Like,
    /// Negated regex match (`!~`)
    NotLike,

    // Arithmetic
    /// Addition or string concatenation (`+`)
    Add,
    /// Subtraction (`-`)
    Subtract,
    /// Multiplication (`*`)
    Multiply,
    /// Division (`/`)
    Divide,
    /// Modulo (`%`)
    Modulo,

    // Logical, both sides are always evaluated
    /// Logical AND (`&&`)
    And,
    /// Logical OR (`||`)
    Or,

    // Null-coalescing
    /// Null-coalescing (`??`)
    NullCoalesce,
}

impl BinOp {
    pub fn from_token(kind: TokenKind) -> Option<BinOp> {
        let op = match kind {
            TokenKind::Equal => BinOp::Equal,
            TokenKind::NotEqual => BinOp::NotEqual,
            TokenKind::LessThan => BinOp::LessThan,
            TokenKind::GreaterThan => BinOp::GreaterThan,
            TokenKind::LessThanOrEqual => BinOp::LessEqual,
            TokenKind::GreaterThanOrEqual => BinOp::GreaterEqual,
            TokenKind::Like => BinOp::Like,
            TokenKind::NotLike => BinOp::NotLike,
            TokenKind::Plus => BinOp::Add,
            TokenKind::Dash => BinOp::Subtract,
            TokenKind::Star => BinOp::Multiply,
            TokenKind::Slash => BinOp::Divide,
            TokenKind::Percent => BinOp::Modulo,
            TokenKind::And => BinOp::And,
            TokenKind::Or => BinOp::Or,
            TokenKind::DoubleQuestionMark => BinOp::NullCoalesce,
            _ => return None,
        };
        Some(op)
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinOp::Equal => "==",
            BinOp::NotEqual => "!=",
            BinOp::LessThan => "<",
            BinOp::GreaterThan => ">",
            BinOp::LessEqual => "<=",
            BinOp::GreaterEqual => ">=",
            BinOp::Like => "=~",
            BinOp::NotLike => "!~",
            BinOp::Add => "+",
            BinOp::Subtract => "-",
            BinOp::Multiply => "*",
            BinOp::Divide => "/",
            BinOp::Modulo => "%",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::NullCoalesce => "??",
        };
        f.write_str(s)
    }
}

/// Prefix operators. Only logical not exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Logical NOT (`!`)
    Not,
}

/// Ordering requested by `sortBy(expr, asc|desc)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Binding power of infix and prefix operators, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BindingPower {
    Default,
    Assignment,
    Coalesce,
    Logical,
    Relational,
    Additive,
    Multiplicative,
    Unary,
}

impl BindingPower {
    /// Binding power of an infix token, `None` if the token is not infix.
    pub fn of(kind: TokenKind) -> Option<BindingPower> {
        let bp = match kind {
            TokenKind::Equals | TokenKind::IncrementBy | TokenKind::DecrementBy => {
                BindingPower::Assignment
            }
            TokenKind::DoubleQuestionMark => BindingPower::Coalesce,
            TokenKind::And | TokenKind::Or => BindingPower::Logical,
            TokenKind::Equal
            | TokenKind::NotEqual
            | TokenKind::Like
            | TokenKind::NotLike
            | TokenKind::GreaterThan
            | TokenKind::GreaterThanOrEqual
            | TokenKind::LessThan
            | TokenKind::LessThanOrEqual => BindingPower::Relational,
            TokenKind::Plus | TokenKind::Dash => BindingPower::Additive,
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent => {
                BindingPower::Multiplicative
            }
            _ => return None,
        };
        Some(bp)
    }
}
