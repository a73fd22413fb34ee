//! # Selector Language - Abstract Syntax Tree
//!
//! This module defines the tokens and syntax tree for the selector language,
//! a small expression language for selecting, computing, and rewriting values
//! inside structured documents.
//!
//! ## Architecture Overview
//!
//! The AST module is organized into focused submodules:
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[expressions]** - Expression nodes (literals, access, operations, constructors)
//! - **[operators]** - Binary and prefix operators plus the binding-power table
//!
//! ## Quick Start
//!
//! ```text
//! users.filter(age > 30).map(name)
//! ```
//!
//! This selects the `users` slice, keeps entries older than 30 and returns their names.
//!
//! ## Core Concepts
//!
//! ### Chains
//!
//! A `.` separates the steps of a pipeline. Each step is evaluated against the
//! result of the previous one, its *subject*:
//!
//! ```text
//! name.first
//! numbers.add(two, three)
//! ```
//!
//! ### Branches and Spread
//!
//! - **Branch** `branch(a, b)` - several independent result documents
//! - **Spread** `xs...` - flatten into the surrounding argument list, array or object
//!
//! ### Aliasing
//!
//! Map and slice lookups return aliases into the document, so assignment
//! writes through:
//!
//! ```text
//! title = "Mrs"
//! [1, 2, 3].each($this = $this + 1)
//! ```
//!
//! ## Examples
//!
//! ### Ranges
//!
//! ```text
//! $this[1:]          // second element onwards
//! $this[len($this)-1:0]  // reversed
//! ```
//!
//! ### Objects
//!
//! ```text
//! {..., title: "Mrs"}
//! {a..., b..., x: 1}
//! ```
//!
//! ### Variables
//!
//! ```text
//! $x = 1; $x = $x * 2
//! ```
pub mod expressions;
pub mod operators;
pub mod tokens;

pub use expressions::{DescentTarget, Expr, ObjectEntry};
pub use operators::{BinOp, BindingPower, SortDirection, UnaryOp};
pub use tokens::{Token, TokenKind, Tokens};
