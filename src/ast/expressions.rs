use crate::ast::{BinOp, SortDirection, UnaryOp};

/// Abstract Syntax Tree node representing a parsed selector.
///
/// Nodes are immutable once built and own their children exclusively.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    // Literals
    /// Literal floating point number
    ///
    /// # Example
    /// ```text
    /// 42.5
    /// 2f
    /// ```
    Float(f64),

    /// Literal integer
    ///
    /// # Example
    /// ```text
    /// 42
    /// -1
    /// ```
    Integer(i64),

    /// String literal
    ///
    /// # Example
    /// ```text
    /// "hello"
    /// ```
    String(String),

    /// Boolean literal
    Boolean(bool),

    /// Null literal
    Null,

    /// Regex literal, only meaningful as the right side of `=~` or `!~`
    ///
    /// # Example
    /// ```text
    /// r/^Tom/
    /// ```
    Regex(String),

    // Access
    /// Map key lookup by bare name
    ///
    /// # Example
    /// ```text
    /// name
    /// ```
    Property(String),

    /// Bracket lookup. A string key reads a map, an integer reads a slice.
    ///
    /// # Examples
    /// ```text
    /// [0]
    /// ["first name"]
    /// [len($this) - 1]
    /// ```
    Index(Box<Expr>),

    /// Inclusive range over a slice or string
    ///
    /// An omitted bound means the first (start) or last (end) element.
    ///
    /// # Examples
    /// ```text
    /// [1:3]
    /// [2:]
    /// [:1]
    /// [3:0]
    /// ```
    Range {
        start: Option<Box<Expr>>,
        end: Option<Box<Expr>>,
    },

    /// Variable reference; `$this` is always the current subject
    Variable(String),

    // Operations
    /// Binary operation
    ///
    /// # Examples
    /// ```text
    /// price * quantity
    /// name =~ r/^A/
    /// nope ?? 1
    /// ```
    BinaryOp {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Prefix operation
    UnaryOp { op: UnaryOp, operand: Box<Expr> },

    /// Assignment, writes through to the target in place
    ///
    /// `op` is set for compound forms: `+=` carries `Add`, `-=` carries `Subtract`.
    ///
    /// # Examples
    /// ```text
    /// title = "Mrs"
    /// $x = 1
    /// count += 1
    /// ```
    Assign {
        target: Box<Expr>,
        op: Option<BinOp>,
        value: Box<Expr>,
    },

    /// Function call resolved through the function registry
    ///
    /// # Examples
    /// ```text
    /// len($this)
    /// add(numbers...)
    /// ```
    Call { function: String, args: Vec<Expr> },

    // Constructors
    /// Object literal
    Object(Vec<ObjectEntry>),

    /// Array literal
    Array(Vec<Expr>),

    // Structure
    /// `.`-separated pipeline, each step receives the previous result
    Chained(Vec<Expr>),

    /// Spread (`...`) of the subject's elements or values
    Spread,

    /// Parenthesized expression
    Group(Box<Expr>),

    /// Conditional
    ///
    /// `elseif` arms are folded into nested conditionals.
    ///
    /// # Example
    /// ```text
    /// if (age > 30) { "old" } elseif (age > 20) { "mid" } else { "young" }
    /// ```
    Conditional {
        condition: Box<Expr>,
        then: Box<Expr>,
        otherwise: Option<Box<Expr>>,
    },

    // Collection operations
    /// Multi-document result
    Branch(Vec<Expr>),

    /// Transform each element of a slice
    Map(Box<Expr>),

    /// Evaluate an expression against each element for its side effects
    Each(Box<Expr>),

    /// Keep elements matching a predicate
    Filter(Box<Expr>),

    /// Collect every nested node matching a predicate
    Search(Box<Expr>),

    /// Reorder elements by a computed key
    SortBy {
        key: Box<Expr>,
        direction: SortDirection,
    },

    /// Collect every nested value under a key or index (`..name`, `..[0]`, `..*`)
    RecursiveDescent(DescentTarget),
}

/// One entry of an object literal.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectEntry {
    /// `...` spreads the subject's map, `expr...` spreads that expression's map.
    Spread(Option<Expr>),
    /// `key: value`, where the key must evaluate to a string.
    Pair { key: Expr, value: Expr },
}

/// What a recursive descent collects.
#[derive(Debug, Clone, PartialEq)]
pub enum DescentTarget {
    Key(String),
    Index(i64),
    /// Every scalar leaf
    Wildcard,
}

impl Expr {
    /// Builds a chain from a sequence of steps.
    ///
    /// A single step is returned as-is and nested chains are flattened.
    pub fn chain(exprs: Vec<Expr>) -> Expr {
        let mut flat = Vec::with_capacity(exprs.len());
        for expr in exprs {
            match expr {
                Expr::Chained(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        match flat.len() {
            1 => flat.pop().unwrap_or(Expr::Null),
            _ => Expr::Chained(flat),
        }
    }

    /// The final step of a chain, or the expression itself.
    pub fn last(&self) -> &Expr {
        match self {
            Expr::Chained(exprs) => exprs.last().unwrap_or(self),
            _ => self,
        }
    }

    /// Everything but the final step of a chain.
    ///
    /// Returns `None` when nothing would be left.
    pub fn remove_last(self) -> Option<Expr> {
        match self {
            Expr::Chained(mut exprs) => {
                exprs.pop();
                if exprs.is_empty() {
                    None
                } else {
                    Some(Expr::chain(exprs))
                }
            }
            _ => None,
        }
    }

    /// Short node name used in error wrapping and tracing.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::Float(_) => "float literal",
            Expr::Integer(_) => "integer literal",
            Expr::String(_) => "string literal",
            Expr::Boolean(_) => "bool literal",
            Expr::Null => "null literal",
            Expr::Regex(_) => "regex literal",
            Expr::Property(_) => "property",
            Expr::Index(_) => "index",
            Expr::Range { .. } => "range",
            Expr::Variable(_) => "variable",
            Expr::BinaryOp { .. } => "binary expression",
            Expr::UnaryOp { .. } => "unary expression",
            Expr::Assign { .. } => "assignment",
            Expr::Call { .. } => "call",
            Expr::Object(_) => "object",
            Expr::Array(_) => "array",
            Expr::Chained(_) => "chain",
            Expr::Spread => "spread",
            Expr::Group(_) => "group",
            Expr::Conditional { .. } => "conditional",
            Expr::Branch(_) => "branch",
            Expr::Map(_) => "map",
            Expr::Each(_) => "each",
            Expr::Filter(_) => "filter",
            Expr::Search(_) => "search",
            Expr::SortBy { .. } => "sortBy",
            Expr::RecursiveDescent(_) => "recursive descent",
        }
    }
}
