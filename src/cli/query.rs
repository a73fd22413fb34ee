//! Execute selectors against documents

use super::CliError;
use crate::{
    Evaluator, Lexer, Parser, Value,
    format::{Format, WriterOptions, new_reader, new_writer},
};

/// Options for the query command
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// The selector to execute
    pub selector: String,
    /// Document input; `None` means a null document
    pub input: Option<String>,
    pub read: Format,
    pub write: Format,
    /// Single-line output
    pub compact: bool,
    /// Only validate syntax, don't execute
    pub syntax_only: bool,
}

/// Result of a query operation
#[derive(Debug)]
pub enum QueryResult {
    /// Syntax validation passed
    SyntaxValid,
    /// Selector executed; the written document(s)
    Output(Vec<u8>),
}

/// Execute a selector as the `query` command would
pub fn execute_query(options: &QueryOptions) -> Result<QueryResult, CliError> {
    let expr = Parser::new(Lexer::new(&options.selector))?.parse()?;

    if options.syntax_only {
        return Ok(QueryResult::SyntaxValid);
    }

    let document = match &options.input {
        Some(input) => new_reader(options.read).read(input.as_bytes())?,
        None => Value::null(),
    };

    let result = Evaluator::new().evaluate(&expr, &document)?;

    let writer = new_writer(
        options.write,
        WriterOptions {
            compact: options.compact,
        },
    );
    Ok(QueryResult::Output(writer.write(&result)?))
}
