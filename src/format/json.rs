//! JSON <-> Value conversion

use serde_json::{Map, Number};

use super::{Format, FormatError, Reader, Writer, WriterOptions};
use crate::value::{Data, Value};

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::null(),
            serde_json::Value::Bool(b) => Value::bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::int(i),
                None => n.as_f64().map(Value::float).unwrap_or_else(Value::null),
            },
            serde_json::Value::String(s) => Value::string(s),
            serde_json::Value::Array(items) => {
                Value::slice(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(entries) => {
                Value::map_from(entries.into_iter().map(|(k, v)| (k, Value::from(v))))
            }
        }
    }
}

impl Value {
    /// Converts to JSON. Non-finite floats become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self.data() {
            Data::Null => serde_json::Value::Null,
            Data::Bool(b) => serde_json::Value::Bool(b),
            Data::Int(i) => serde_json::Value::Number(i.into()),
            Data::Float(f) => Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Data::String(s) => serde_json::Value::String(s),
            Data::Slice(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Data::Map(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect::<Map<_, _>>(),
            ),
        }
    }
}

pub(super) struct JsonReader;

impl Reader for JsonReader {
    fn read(&self, bytes: &[u8]) -> Result<Value, FormatError> {
        let doc: serde_json::Value =
            serde_json::from_slice(bytes).map_err(|source| FormatError::Decode {
                format: Format::Json,
                source,
            })?;
        Ok(Value::from(doc))
    }
}

pub(super) struct JsonWriter {
    options: WriterOptions,
}

impl JsonWriter {
    pub(super) fn new(options: WriterOptions) -> Self {
        JsonWriter { options }
    }

    fn write_document(&self, value: &Value, out: &mut Vec<u8>) -> Result<(), FormatError> {
        let json = value.to_json();
        let result = if self.options.compact {
            serde_json::to_writer(&mut *out, &json)
        } else {
            serde_json::to_writer_pretty(&mut *out, &json)
        };
        result.map_err(|source| FormatError::Encode {
            format: Format::Json,
            source,
        })?;
        out.push(b'\n');
        Ok(())
    }
}

impl Writer for JsonWriter {
    /// One document per branch element, otherwise a single document.
    fn write(&self, value: &Value) -> Result<Vec<u8>, FormatError> {
        let mut out = Vec::new();
        match value.data() {
            Data::Slice(items) if value.is_branch() => {
                for item in &items {
                    self.write_document(item, &mut out)?;
                }
            }
            _ => self.write_document(value, &mut out)?,
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn write(value: &Value, compact: bool) -> String {
        let bytes = JsonWriter::new(WriterOptions { compact }).write(value).unwrap();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_read_keeps_key_order() {
        let doc = JsonReader.read(br#"{"z": 1, "a": 2.5, "m": null}"#).unwrap();
        assert_eq!(doc.map_keys().unwrap(), ["z", "a", "m"]);
        assert_eq!(doc.get_map_key("z").unwrap().kind().as_str(), "int");
        assert_eq!(doc.get_map_key("a").unwrap().kind().as_str(), "float");
    }

    #[test]
    fn test_read_invalid() {
        let err = JsonReader.read(b"{").unwrap_err();
        assert!(err.to_string().starts_with("invalid json document"));
    }

    #[test]
    fn test_write_compact_and_pretty() {
        let value = Value::from(json!({"a": [1, 2]}));
        assert_eq!(write(&value, true), "{\"a\":[1,2]}\n");
        assert_eq!(write(&value, false), "{\n  \"a\": [\n    1,\n    2\n  ]\n}\n");
    }

    #[test]
    fn test_write_branch_as_documents() {
        let branch = Value::slice(vec![Value::int(1), Value::string("x")]);
        branch.mark_as_branch();
        assert_eq!(write(&branch, true), "1\n\"x\"\n");
    }

    #[test]
    fn test_non_finite_float_is_null() {
        assert_eq!(Value::float(f64::NAN).to_json(), serde_json::Value::Null);
    }
}
