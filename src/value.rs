use std::{
    cell::RefCell,
    collections::HashMap,
    fmt,
    rc::Rc,
};

use indexmap::IndexMap;
use thiserror::Error;

mod compare;
mod math;

/// A structured document value.
///
/// `Value` is a shared handle: cloning it produces an alias to the same node,
/// not a copy. Lookups such as [`Value::get_map_key`] and
/// [`Value::get_slice_index`] return aliases into the owning container, so
/// [`Value::set`] on the result rewrites the original document in place.
/// Use [`Value::deep_copy`] for an independent value.
///
/// Besides its data every node carries two flags and a metadata table:
///
/// - **branch** - the value is a slice standing for several result documents
/// - **spread** - the slice should be flattened into the surrounding context
///
/// Neither the flags nor the metadata take part in equality or ordering.
///
/// # Examples
///
/// ```
/// use selector_lang::Value;
///
/// let doc = Value::map_from([("name", Value::string("Tom"))]);
///
/// // Lookups alias the document
/// let name = doc.get_map_key("name").unwrap();
/// name.set(&Value::string("Tim"));
///
/// assert_eq!(doc.get_map_key("name").unwrap(), Value::string("Tim"));
/// ```
#[derive(Clone)]
pub struct Value {
    node: Rc<RefCell<Node>>,
}

struct Node {
    data: Data,
    metadata: Metadata,
}

/// The payload of a value.
#[derive(Debug, Clone)]
pub enum Data {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Slice(Vec<Value>),
    Map(IndexMap<String, Value>),
}

#[derive(Debug, Clone, Default)]
struct Metadata {
    branch: bool,
    spread: bool,
    ignore: bool,
    entries: HashMap<String, Value>,
}

/// Type tag of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Type {
    Null,
    Bool,
    Int,
    Float,
    String,
    Slice,
    Map,
}

impl Type {
    pub fn as_str(self) -> &'static str {
        match self {
            Type::Null => "null",
            Type::Bool => "bool",
            Type::Int => "int",
            Type::Float => "float",
            Type::String => "string",
            Type::Slice => "array",
            Type::Map => "map",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by value model operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    #[error("map key not found: {0:?}")]
    MapKeyNotFound(String),

    #[error("slice index out of range: {index} (length {len})")]
    SliceIndexOutOfRange { index: i64, len: usize },

    #[error("expected {expected}, got {actual}")]
    UnexpectedType { expected: Type, actual: Type },

    #[error("incompatible types: {left} and {right}")]
    IncompatibleTypes { left: Type, right: Type },

    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow")]
    IntegerOverflow,
}

impl Value {
    fn from_data(data: Data) -> Self {
        Value {
            node: Rc::new(RefCell::new(Node {
                data,
                metadata: Metadata::default(),
            })),
        }
    }

    pub fn null() -> Self {
        Self::from_data(Data::Null)
    }

    pub fn bool(b: bool) -> Self {
        Self::from_data(Data::Bool(b))
    }

    pub fn int(i: i64) -> Self {
        Self::from_data(Data::Int(i))
    }

    pub fn float(f: f64) -> Self {
        Self::from_data(Data::Float(f))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Self::from_data(Data::String(s.into()))
    }

    pub fn slice(items: Vec<Value>) -> Self {
        Self::from_data(Data::Slice(items))
    }

    pub fn map(entries: IndexMap<String, Value>) -> Self {
        Self::from_data(Data::Map(entries))
    }

    /// Builds a map from key/value pairs, keeping their order.
    pub fn map_from<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Self::map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn new_slice() -> Self {
        Self::slice(Vec::new())
    }

    pub fn new_map() -> Self {
        Self::map(IndexMap::new())
    }

    /// Snapshot of the data. Container children stay aliases.
    pub fn data(&self) -> Data {
        self.node.borrow().data.clone()
    }

    pub fn kind(&self) -> Type {
        match &self.node.borrow().data {
            Data::Null => Type::Null,
            Data::Bool(_) => Type::Bool,
            Data::Int(_) => Type::Int,
            Data::Float(_) => Type::Float,
            Data::String(_) => Type::String,
            Data::Slice(_) => Type::Slice,
            Data::Map(_) => Type::Map,
        }
    }

    pub fn is_null(&self) -> bool {
        self.kind() == Type::Null
    }

    pub fn is_slice(&self) -> bool {
        self.kind() == Type::Slice
    }

    pub fn is_map(&self) -> bool {
        self.kind() == Type::Map
    }

    /// Anything other than a slice or map.
    pub fn is_scalar(&self) -> bool {
        !matches!(self.kind(), Type::Slice | Type::Map)
    }

    /// Whether both handles point at the same node.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }

    fn unexpected(&self, expected: Type) -> ValueError {
        ValueError::UnexpectedType {
            expected,
            actual: self.kind(),
        }
    }

    // Scalar accessors

    pub fn as_bool(&self) -> Result<bool, ValueError> {
        match &self.node.borrow().data {
            Data::Bool(b) => Ok(*b),
            _ => Err(self.unexpected(Type::Bool)),
        }
    }

    pub fn as_int(&self) -> Result<i64, ValueError> {
        match &self.node.borrow().data {
            Data::Int(i) => Ok(*i),
            _ => Err(self.unexpected(Type::Int)),
        }
    }

    pub fn as_float(&self) -> Result<f64, ValueError> {
        match &self.node.borrow().data {
            Data::Float(f) => Ok(*f),
            _ => Err(self.unexpected(Type::Float)),
        }
    }

    pub fn as_string(&self) -> Result<String, ValueError> {
        match &self.node.borrow().data {
            Data::String(s) => Ok(s.clone()),
            _ => Err(self.unexpected(Type::String)),
        }
    }

    /// Length of a slice, map or string (in characters).
    pub fn len(&self) -> Result<usize, ValueError> {
        match &self.node.borrow().data {
            Data::Slice(items) => Ok(items.len()),
            Data::Map(entries) => Ok(entries.len()),
            Data::String(s) => Ok(s.chars().count()),
            _ => Err(self.unexpected(Type::Slice)),
        }
    }

    pub fn is_empty(&self) -> Result<bool, ValueError> {
        self.len().map(|n| n == 0)
    }

    // Map operations

    pub fn get_map_key(&self, key: &str) -> Result<Value, ValueError> {
        match &self.node.borrow().data {
            Data::Map(entries) => entries
                .get(key)
                .cloned()
                .ok_or_else(|| ValueError::MapKeyNotFound(key.to_string())),
            _ => Err(self.unexpected(Type::Map)),
        }
    }

    /// Inserts or replaces a key. A replaced key keeps its original position.
    pub fn set_map_key(&self, key: impl Into<String>, value: Value) -> Result<(), ValueError> {
        let actual = self.kind();
        match &mut self.node.borrow_mut().data {
            Data::Map(entries) => {
                entries.insert(key.into(), value);
                Ok(())
            }
            _ => Err(ValueError::UnexpectedType {
                expected: Type::Map,
                actual,
            }),
        }
    }

    pub fn map_key_exists(&self, key: &str) -> Result<bool, ValueError> {
        match &self.node.borrow().data {
            Data::Map(entries) => Ok(entries.contains_key(key)),
            _ => Err(self.unexpected(Type::Map)),
        }
    }

    pub fn delete_map_key(&self, key: &str) -> Result<Option<Value>, ValueError> {
        let actual = self.kind();
        match &mut self.node.borrow_mut().data {
            Data::Map(entries) => Ok(entries.shift_remove(key)),
            _ => Err(ValueError::UnexpectedType {
                expected: Type::Map,
                actual,
            }),
        }
    }

    pub fn map_keys(&self) -> Result<Vec<String>, ValueError> {
        match &self.node.borrow().data {
            Data::Map(entries) => Ok(entries.keys().cloned().collect()),
            _ => Err(self.unexpected(Type::Map)),
        }
    }

    /// Snapshot of a map's entries in order. Values are aliases.
    pub fn map_entries(&self) -> Result<Vec<(String, Value)>, ValueError> {
        match &self.node.borrow().data {
            Data::Map(entries) => Ok(entries
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()),
            _ => Err(self.unexpected(Type::Map)),
        }
    }

    // Slice operations

    /// Resolves a possibly negative index against a length.
    fn resolve_index(index: i64, len: usize) -> Result<usize, ValueError> {
        let resolved = if index < 0 { len as i64 + index } else { index };
        if resolved < 0 || resolved >= len as i64 {
            return Err(ValueError::SliceIndexOutOfRange { index, len });
        }
        Ok(resolved as usize)
    }

    /// Index lookup. Negative indices count back from the end.
    pub fn get_slice_index(&self, index: i64) -> Result<Value, ValueError> {
        match &self.node.borrow().data {
            Data::Slice(items) => {
                let i = Self::resolve_index(index, items.len())?;
                Ok(items[i].clone())
            }
            _ => Err(self.unexpected(Type::Slice)),
        }
    }

    pub fn set_slice_index(&self, index: i64, value: Value) -> Result<(), ValueError> {
        let actual = self.kind();
        match &mut self.node.borrow_mut().data {
            Data::Slice(items) => {
                let i = Self::resolve_index(index, items.len())?;
                items[i] = value;
                Ok(())
            }
            _ => Err(ValueError::UnexpectedType {
                expected: Type::Slice,
                actual,
            }),
        }
    }

    /// Appends to a slice. A branch value contributes each of its elements.
    pub fn append(&self, value: Value) -> Result<(), ValueError> {
        if value.is_branch() {
            for item in value.slice_items()? {
                self.append(item)?;
            }
            return Ok(());
        }

        let actual = self.kind();
        match &mut self.node.borrow_mut().data {
            Data::Slice(items) => {
                items.push(value);
                Ok(())
            }
            _ => Err(ValueError::UnexpectedType {
                expected: Type::Slice,
                actual,
            }),
        }
    }

    /// Snapshot of a slice's elements. Elements are aliases.
    pub fn slice_items(&self) -> Result<Vec<Value>, ValueError> {
        match &self.node.borrow().data {
            Data::Slice(items) => Ok(items.clone()),
            _ => Err(self.unexpected(Type::Slice)),
        }
    }

    /// Inclusive index range over a slice or string.
    ///
    /// `None` for `start` means the first element and `None` for `end` the
    /// last. An explicit negative bound counts back from the end, so `-1` is
    /// the last index. When the start lies after the end the result runs
    /// backwards.
    pub fn index_range(&self, start: Option<i64>, end: Option<i64>) -> Result<Value, ValueError> {
        match self.kind() {
            Type::Slice => {
                let items = self.slice_items()?;
                let indices = Self::range_indices(start, end, items.len())?;
                Ok(Value::slice(
                    indices.into_iter().map(|i| items[i].clone()).collect(),
                ))
            }
            Type::String => {
                let chars: Vec<char> = self.as_string()?.chars().collect();
                let indices = Self::range_indices(start, end, chars.len())?;
                Ok(Value::string(indices.into_iter().map(|i| chars[i]).collect::<String>()))
            }
            _ => Err(self.unexpected(Type::Slice)),
        }
    }

    fn range_indices(
        start: Option<i64>,
        end: Option<i64>,
        len: usize,
    ) -> Result<Vec<usize>, ValueError> {
        if len == 0 {
            return Ok(Vec::new());
        }
        let start = match start {
            Some(i) => Self::resolve_index(i, len)?,
            None => 0,
        };
        let end = match end {
            Some(i) => Self::resolve_index(i, len)?,
            None => len - 1,
        };
        if start <= end {
            Ok((start..=end).collect())
        } else {
            Ok((end..=start).rev().collect())
        }
    }

    // Mutation and copying

    /// Replaces this node's data in place with a deep copy of `other`'s.
    ///
    /// Every alias of this node observes the change. Flags and metadata on
    /// this node are left as they were.
    pub fn set(&self, other: &Value) {
        let data = other.deep_data();
        self.node.borrow_mut().data = data;
    }

    fn deep_data(&self) -> Data {
        match &self.node.borrow().data {
            Data::Slice(items) => Data::Slice(items.iter().map(Value::deep_copy).collect()),
            Data::Map(entries) => Data::Map(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.deep_copy()))
                    .collect(),
            ),
            scalar => scalar.clone(),
        }
    }

    /// A fully independent copy, flags and metadata included.
    pub fn deep_copy(&self) -> Value {
        let data = self.deep_data();
        let metadata = self.node.borrow().metadata.clone();
        Value {
            node: Rc::new(RefCell::new(Node { data, metadata })),
        }
    }

    // Flags and metadata

    pub fn is_branch(&self) -> bool {
        self.node.borrow().metadata.branch
    }

    pub fn mark_as_branch(&self) {
        self.node.borrow_mut().metadata.branch = true;
    }

    pub fn is_spread(&self) -> bool {
        self.node.borrow().metadata.spread
    }

    pub fn mark_as_spread(&self) {
        self.node.borrow_mut().metadata.spread = true;
    }

    pub fn clear_spread(&self) {
        self.node.borrow_mut().metadata.spread = false;
    }

    pub fn is_ignored(&self) -> bool {
        self.node.borrow().metadata.ignore
    }

    pub fn mark_as_ignored(&self) {
        self.node.borrow_mut().metadata.ignore = true;
    }

    pub fn metadata(&self, key: &str) -> Option<Value> {
        self.node.borrow().metadata.entries.get(key).cloned()
    }

    pub fn set_metadata(&self, key: impl Into<String>, value: Value) {
        self.node
            .borrow_mut()
            .metadata
            .entries
            .insert(key.into(), value);
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.node.borrow();
        if node.metadata.branch {
            f.write_str("branch ")?;
        }
        if node.metadata.spread {
            f.write_str("spread ")?;
        }
        match &node.data {
            Data::Null => f.write_str("null"),
            Data::Bool(b) => write!(f, "{b}"),
            Data::Int(i) => write!(f, "{i}"),
            Data::Float(x) => write!(f, "{x:?}"),
            Data::String(s) => write!(f, "{s:?}"),
            Data::Slice(items) => f.debug_list().entries(items).finish(),
            Data::Map(entries) => f.debug_map().entries(entries).finish(),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::slice(items)
    }
}
