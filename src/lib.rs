pub mod ast;
#[cfg(feature = "cli")]
pub mod cli;
pub mod evaluator;
pub mod format;
pub mod functions;
pub mod lexer;
pub mod parser;
pub mod value;

pub use ast::{BinOp, Expr, Token, TokenKind, Tokens};
pub use evaluator::{EvalError, Evaluator};
pub use format::{Format, FormatError, Reader, Writer, WriterOptions};
pub use functions::{ArgsValidator, Function, FunctionRegistry};
pub use lexer::{LexError, Lexer};
pub use parser::{ParseError, Parser};
pub use value::{Type, Value, ValueError};

use thiserror::Error;

/// Failure to run a selector: it either did not parse or did not evaluate.
#[derive(Debug, Error)]
pub enum Error {
    #[error("error parsing selector: {0}")]
    Parse(#[from] ParseError),

    #[error("error executing selector: {0}")]
    Eval(#[from] EvalError),
}

/// Tokenizes a selector.
pub fn tokenize(selector: &str) -> Result<Tokens, LexError> {
    Lexer::new(selector).tokenize()
}

/// Parses a selector into its AST.
pub fn parse(selector: &str) -> Result<Expr, ParseError> {
    Parser::new(Lexer::new(selector))?.parse()
}

/// Runs a selector and returns the selected values.
///
/// A branch result is expanded into its documents. The returned values alias
/// nodes of `document` wherever the selector did not build new values.
///
/// ```
/// use selector_lang::{Value, query};
///
/// let doc = Value::slice(vec![Value::int(1), Value::int(2)]);
/// let out = query("branch().$this * 10", &doc).unwrap();
/// assert_eq!(out, vec![Value::int(10), Value::int(20)]);
/// ```
pub fn query(selector: &str, document: &Value) -> Result<Vec<Value>, Error> {
    let result = Evaluator::new().execute_selector(selector, document)?;
    if result.is_branch() {
        return Ok(result.slice_items().map_err(EvalError::from)?);
    }
    Ok(vec![result])
}

/// Sets every node selected by `selector` to a copy of `value`, in place.
///
/// Returns how many nodes were set.
pub fn modify(document: &Value, selector: &str, value: &Value) -> Result<usize, Error> {
    let selected = query(selector, document)?;
    for node in &selected {
        node.set(value);
    }
    Ok(selected.len())
}
