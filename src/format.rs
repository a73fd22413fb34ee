//! Document formats at the boundary of the engine.
//!
//! A [`Reader`] turns bytes into a [`Value`]; a [`Writer`] turns an engine
//! result back into bytes. Writers honour the branch flag: a branch is written
//! as several documents.

use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::value::Value;

mod json;

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Json,
}

impl Format {
    pub fn name(self) -> &'static str {
        match self {
            Format::Json => "json",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Format {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            _ => Err(FormatError::Unsupported(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("unsupported file format: {0}")]
    Unsupported(String),

    #[error("invalid {format} document: {source}")]
    Decode {
        format: Format,
        source: serde_json::Error,
    },

    #[error("could not write {format} document: {source}")]
    Encode {
        format: Format,
        source: serde_json::Error,
    },
}

pub trait Reader {
    fn read(&self, bytes: &[u8]) -> Result<Value, FormatError>;
}

pub trait Writer {
    fn write(&self, value: &Value) -> Result<Vec<u8>, FormatError>;
}

/// Output settings shared by every writer.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriterOptions {
    /// Single-line output instead of indented.
    pub compact: bool,
}

pub fn new_reader(format: Format) -> Box<dyn Reader> {
    match format {
        Format::Json => Box::new(json::JsonReader),
    }
}

pub fn new_writer(format: Format, options: WriterOptions) -> Box<dyn Writer> {
    match format {
        Format::Json => Box::new(json::JsonWriter::new(options)),
    }
}
